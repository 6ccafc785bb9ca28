mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::error_copy::{login_error_message, signup_error_message};
use crate::state::match_stream::{MatchStreamWorker, StreamCommand, StreamEvent};
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent, dispatch};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::refresher::PeriodicRefresher;
use crate::state::settings_watcher::SettingsWatcher;
use anyhow::Context;
use crossterm::event::{self as crossterm_event, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, execute, terminal};
use log::{error, info};
use scorebook_api::client::ScorebookApi;
use std::io::{BufRead, IsTerminal, Stdout, Write};
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Ui,
    Help,
    Version,
    Login { username: String },
    Signup { username: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    match command {
        Command::Ui => {}
        Command::Help => {
            println!("{}", usage_text());
            return Ok(());
        }
        Command::Version => {
            println!("scorebook {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        Command::Login { username } => return authenticate(AuthKind::Login, username).await,
        Command::Signup { username } => return authenticate(AuthKind::Signup, username).await,
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    tui_logger::init_logger(log::LevelFilter::Info)?;
    tui_logger::set_default_level(log::LevelFilter::Info);

    let app = App::new();
    let api = ScorebookApi::new(app.settings.api_url.clone())
        .with_token(app.settings.user.token.clone());
    let settings_path = app.settings.path.clone();
    info!("using {} with settings at {}", api.base_url(), settings_path.display());
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);
    let (stream_cmd_tx, stream_cmd_rx) = mpsc::channel::<StreamCommand>(16);
    let (stream_evt_tx, stream_evt_rx) = mpsc::channel::<StreamEvent>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(api.clone(), network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Live match thread
    let stream_worker = MatchStreamWorker::new(api, stream_cmd_rx, stream_evt_tx);
    let stream_task = tokio::spawn(stream_worker.run());

    // Periodic refresh thread (every 30s)
    let periodic_updater = PeriodicRefresher::new(ui_event_tx.clone());
    let periodic_task = tokio::spawn(periodic_updater.run());

    // Settings file watcher
    let watcher = SettingsWatcher::new(settings_path, ui_event_tx.clone());
    let watcher_task = tokio::spawn(watcher.run());

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(
        terminal,
        app,
        ui_event_rx,
        network_req_tx,
        network_resp_rx,
        stream_cmd_tx,
        stream_evt_rx,
    )
    .await;

    input_handler.abort();
    network_task.abort();
    stream_task.abort();
    periodic_task.abort();
    watcher_task.abort();

    Ok(())
}

fn parse_args<I>(args: I) -> Result<Command, String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(arg) = args.next() else {
        return Ok(Command::Ui);
    };

    let command = match arg.as_str() {
        "-h" | "--help" => Command::Help,
        "-V" | "--version" => Command::Version,
        "login" | "signup" => {
            let username = args
                .next()
                .map(|u| u.trim().to_string())
                .filter(|u| !u.is_empty())
                .ok_or_else(|| format!("{arg} needs a username"))?;
            if arg == "login" {
                Command::Login { username }
            } else {
                Command::Signup { username }
            }
        }
        _ => return Err(format!("Unknown argument: {arg}")),
    };

    if let Some(extra) = args.next() {
        return Err(format!("Unexpected argument: {extra}"));
    }
    Ok(command)
}

fn usage_text() -> &'static str {
    "scorebook - terminal client for the scorebook match tracker

Usage:
  scorebook
  scorebook login <username>     prompts for the password without echo,
  scorebook signup <username>    or reads one line when stdin is a pipe
  scorebook --help
  scorebook --version

Environment:
  SCOREBOOK_API_URL    Backend base URL (default http://localhost:8000)
  SCOREBOOK_LOCALE     Locale override for this session, e.g. en-AU
  SCOREBOOK_TIMEZONE   IANA timezone override for this session
  SCOREBOOK_LOG        Log level: error, warn, info, debug, trace"
}

#[derive(Debug, Clone, Copy)]
enum AuthKind {
    Login,
    Signup,
}

/// Logs in or signs up, then stores the token in the settings file so a
/// running UI picks it up.
async fn authenticate(kind: AuthKind, username: String) -> anyhow::Result<()> {
    let mut settings = AppSettings::load();
    let password = read_password().context("could not read password from stdin")?;
    let api = ScorebookApi::new(settings.api_url.clone());

    let result = match kind {
        AuthKind::Login => api.login(&username, &password).await,
        AuthKind::Signup => api.signup(&username, &password).await,
    };
    let session = match result {
        Ok(session) => session,
        Err(e) => {
            let message = match kind {
                AuthKind::Login => login_error_message(&e),
                AuthKind::Signup => signup_error_message(&e),
            };
            eprintln!("{message}");
            std::process::exit(1);
        }
    };

    settings.user.username = Some(username.clone());
    settings.user.token = Some(session.access_token);
    settings.save()?;
    match kind {
        AuthKind::Login => println!("Logged in as {username}."),
        AuthKind::Signup => println!("Account {username} created and logged in."),
    }
    Ok(())
}

fn read_password() -> io::Result<String> {
    let stdin = io::stdin();
    if !stdin.is_terminal() {
        let mut line = String::new();
        stdin.lock().read_line(&mut line)?;
        return Ok(line.trim_end_matches(['\r', '\n']).to_string());
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    terminal::enable_raw_mode()?;
    let result = read_hidden_line();
    let _ = terminal::disable_raw_mode();
    eprintln!();
    result
}

#[derive(Debug, PartialEq, Eq)]
enum PasswordKey {
    Continue,
    Done,
    Cancel,
}

/// Raw mode is on, so nothing typed is echoed.
fn read_hidden_line() -> io::Result<String> {
    let mut password = String::new();
    loop {
        let Event::Key(key_event) = crossterm_event::read()? else {
            continue;
        };
        match password_key(&mut password, key_event) {
            PasswordKey::Continue => {}
            PasswordKey::Done => return Ok(password),
            PasswordKey::Cancel => {
                return Err(io::Error::new(io::ErrorKind::Interrupted, "password entry cancelled"));
            }
        }
    }
}

fn password_key(buffer: &mut String, key_event: KeyEvent) -> PasswordKey {
    if key_event.kind != KeyEventKind::Press {
        return PasswordKey::Continue;
    }
    match (key_event.code, key_event.modifiers) {
        (KeyCode::Enter, _) => PasswordKey::Done,
        (KeyCode::Esc, _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => PasswordKey::Cancel,
        (KeyCode::Backspace, _) => {
            buffer.pop();
            PasswordKey::Continue
        }
        (KeyCode::Char(c), _) => {
            buffer.push(c);
            PasswordKey::Continue
        }
        _ => PasswordKey::Continue,
    }
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    stream_commands: mpsc::Sender<StreamCommand>,
    mut stream_events: mpsc::Receiver<StreamEvent>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &network_requests, &stream_commands).await;
                if !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                if let NetworkResponse::LoadingStateChanged { loading_state } = &response {
                    loading = *loading_state;
                }
                let effects = {
                    let mut guard = app.lock().await;
                    guard.on_network_response(response)
                };
                dispatch(effects, &network_requests, &stream_commands).await;
                let mut app_guard = app.lock().await;
                draw::draw(&mut terminal, &mut app_guard, loading);
            }

            Some(stream_event) = stream_events.recv() => {
                if let StreamEvent::Error(message) = &stream_event {
                    error!("match stream: {message}");
                }
                app.lock().await.on_stream_event(stream_event);
                if !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            else => break,
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    stream_commands: &mpsc::Sender<StreamCommand>,
) {
    let effects = match ui_event {
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests, stream_commands).await;
            return;
        }
        UiEvent::Resize => return,
        UiEvent::AppStarted => app.lock().await.on_app_started(),
        UiEvent::RefreshTick => app.lock().await.on_refresh_tick(),
        UiEvent::SettingsFileChanged => app.lock().await.on_settings_file_changed(),
    };
    dispatch(effects, network_requests, stream_commands).await;
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                error!("terminal input failed: {e}");
                continue;
            }
            Err(_) => break,
        };
        let ui_event = match event {
            Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                Some(UiEvent::KeyPressed(key_event))
            }
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_args(args(&[])), Ok(Command::Ui));
        assert_eq!(parse_args(args(&["--version"])), Ok(Command::Version));
        assert_eq!(parse_args(args(&["-h"])), Ok(Command::Help));
        assert_eq!(
            parse_args(args(&["login", "ana"])),
            Ok(Command::Login { username: "ana".into() })
        );
        assert_eq!(
            parse_args(args(&["signup", "bo"])),
            Ok(Command::Signup { username: "bo".into() })
        );
    }

    #[test]
    fn password_keys_edit_a_hidden_buffer() {
        let press = |code| KeyEvent::new(code, KeyModifiers::NONE);
        let mut buffer = String::new();
        for c in "pwx".chars() {
            assert_eq!(password_key(&mut buffer, press(KeyCode::Char(c))), PasswordKey::Continue);
        }
        password_key(&mut buffer, press(KeyCode::Backspace));
        assert_eq!(password_key(&mut buffer, press(KeyCode::Enter)), PasswordKey::Done);
        assert_eq!(buffer, "pw");

        let ctrl_c = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(password_key(&mut buffer, ctrl_c), PasswordKey::Cancel);
        assert_eq!(buffer, "pw");
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["login"])).is_err());
        assert!(parse_args(args(&["login", "ana", "extra"])).is_err());
        assert!(parse_args(args(&["--frobnicate"])).is_err());
    }
}
