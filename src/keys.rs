use crate::app::{App, MenuItem};
use crate::state::app_state::InputMode;
use crate::state::match_stream::StreamCommand;
use crate::state::messages::{Effect, NetworkRequest, dispatch};
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    stream_commands: &mpsc::Sender<StreamCommand>,
) {
    let mut guard = app.lock().await;
    let Some(effects) = apply_key(&mut guard, key_event) else {
        crate::cleanup_terminal();
        std::process::exit(0);
    };
    drop(guard);
    dispatch(effects, network_requests, stream_commands).await;
}

/// Applies one key press. `None` means quit.
pub fn apply_key(app: &mut App, key_event: KeyEvent) -> Option<Vec<Effect>> {
    app.state.notice = None;

    if app.state.input.is_some() {
        return Some(handle_input_key(app, key_event));
    }

    if let (Char('c'), KeyModifiers::CONTROL) = (key_event.code, key_event.modifiers) {
        return None;
    }

    let form_open = app.state.tournaments.form.is_some();
    let effects = match (app.state.active_tab, key_event.code, form_open) {
        (_, Char('q'), _) => return None,

        // Tournament form: tab keys are swallowed while it is open.
        (MenuItem::Tournaments, KeyCode::Esc, true) => {
            app.close_tournament_form();
            Vec::new()
        }
        (MenuItem::Tournaments, Char(' '), true) => {
            app.toggle_form_player();
            Vec::new()
        }
        (MenuItem::Tournaments, Char('+') | Char('='), true) => {
            app.adjust_form_courts(true);
            Vec::new()
        }
        (MenuItem::Tournaments, Char('-'), true) => {
            app.adjust_form_courts(false);
            Vec::new()
        }
        (MenuItem::Tournaments, Char('i'), true) => {
            app.begin_input(InputMode::TournamentName);
            Vec::new()
        }
        (MenuItem::Tournaments, KeyCode::Enter, true) => app.submit_tournament_form(),
        (MenuItem::Tournaments, Char('1'..='6' | '?'), true) => Vec::new(),

        // Tab switching
        (_, Char('1'), _) => app.update_tab(MenuItem::Matches),
        (_, Char('2'), _) => app.update_tab(MenuItem::Match),
        (_, Char('3'), _) => app.update_tab(MenuItem::Leaderboard),
        (_, Char('4'), _) => app.update_tab(MenuItem::Players),
        (_, Char('5'), _) => app.update_tab(MenuItem::Tournaments),
        (_, Char('6'), _) => app.update_tab(MenuItem::Settings),
        (_, Char('?'), _) => app.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => {
            app.exit_help();
            Vec::new()
        }

        // Lists
        (_, Char('j') | KeyCode::Down, _) => {
            app.select_next();
            Vec::new()
        }
        (_, Char('k') | KeyCode::Up, _) => {
            app.select_prev();
            Vec::new()
        }

        // Matches
        (MenuItem::Matches | MenuItem::Leaderboard, Char('s'), _) => app.cycle_sport(),
        (MenuItem::Matches, KeyCode::Enter, _) => app.open_selected_match(),

        // Match detail
        (MenuItem::Match, Char('c'), _) => {
            app.begin_input(InputMode::Chat);
            Vec::new()
        }
        (MenuItem::Match, Char('m'), _) => {
            app.begin_input(InputMode::Comment);
            Vec::new()
        }
        (MenuItem::Match, Char('e'), _) => {
            app.begin_input(InputMode::Sets);
            Vec::new()
        }
        (MenuItem::Match, Char('x'), _) => app.delete_selected_comment(),
        (MenuItem::Match, KeyCode::Esc, _) => app.close_match(),

        // Players
        (MenuItem::Players, Char('/'), _) => {
            app.begin_input(InputMode::PlayerSearch);
            Vec::new()
        }
        (MenuItem::Players, Char('a'), _) => {
            app.begin_input(InputMode::NewPlayer);
            Vec::new()
        }

        // Tournaments
        (MenuItem::Tournaments, Char('n'), false) => {
            app.open_tournament_form();
            Vec::new()
        }
        (MenuItem::Tournaments, KeyCode::Esc, false) => {
            app.state.tournaments.schedule = None;
            Vec::new()
        }

        // Settings
        (MenuItem::Settings, Char('l'), _) => app.cycle_locale(),
        (MenuItem::Settings, Char('t'), _) => {
            app.begin_input(InputMode::Timezone);
            Vec::new()
        }

        // Global
        (_, Char('R'), _) => app.retry(),
        (_, Char('f'), _) => {
            app.toggle_full_screen();
            Vec::new()
        }
        (_, Char('"'), _) => {
            app.toggle_show_logs();
            Vec::new()
        }

        _ => Vec::new(),
    };
    Some(effects)
}

fn handle_input_key(app: &mut App, key_event: KeyEvent) -> Vec<Effect> {
    match (key_event.code, key_event.modifiers) {
        (KeyCode::Esc, _) | (Char('c'), KeyModifiers::CONTROL) => {
            app.cancel_input();
            Vec::new()
        }
        (KeyCode::Enter, _) => app.submit_input(),
        (KeyCode::Backspace, _) => {
            app.input_backspace();
            Vec::new()
        }
        (Char(c), _) => {
            app.input_char(c);
            Vec::new()
        }
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::app_settings::{AppSettings, UserSettings};
    use crate::state::locale::LocaleSignals;
    use crossterm::event::KeyEventKind;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> App {
        let settings = AppSettings {
            user: UserSettings { token: Some("tok".into()), ..Default::default() },
            api_url: "http://localhost:8000".into(),
            log_level: None,
            path: std::env::temp_dir().join(format!("scorebook-keys-{}.json", std::process::id())),
        };
        App::with_settings(settings, |_| LocaleSignals::default())
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(apply_key(&mut app, key(Char('q'))).is_none());
        let ctrl_c = KeyEvent::new(Char('c'), KeyModifiers::CONTROL);
        assert!(apply_key(&mut app, ctrl_c).is_none());
    }

    #[test]
    fn typing_goes_to_the_input_buffer() {
        let mut app = app();
        apply_key(&mut app, key(Char('4')));
        assert_eq!(app.state.active_tab, MenuItem::Players);
        apply_key(&mut app, key(Char('/')));
        for c in "q1".chars() {
            let outcome = apply_key(&mut app, key(Char(c)));
            assert!(outcome.is_some(), "q is text while typing");
        }
        assert_eq!(app.state.active_tab, MenuItem::Players);
        let effects = apply_key(&mut app, key(KeyCode::Enter)).unwrap();
        assert_eq!(
            effects,
            vec![Effect::Network(NetworkRequest::SearchPlayers { query: "q1".into() })]
        );
        assert!(app.state.input.is_none());
    }

    #[test]
    fn add_player_from_players_tab() {
        let mut app = app();
        apply_key(&mut app, key(Char('4')));
        apply_key(&mut app, key(Char('a')));
        assert_eq!(app.state.input.as_ref().map(|i| i.mode), Some(InputMode::NewPlayer));
        for c in "Cy".chars() {
            apply_key(&mut app, key(Char(c)));
        }
        assert_eq!(
            apply_key(&mut app, key(KeyCode::Enter)),
            Some(vec![Effect::Network(NetworkRequest::CreatePlayer { name: "Cy".into() })])
        );
    }

    #[test]
    fn open_form_keeps_the_tournaments_tab() {
        let mut app = app();
        apply_key(&mut app, key(Char('5')));
        apply_key(&mut app, key(Char('n')));
        assert!(app.state.tournaments.form.is_some());
        for c in ['1', '3', '?'] {
            assert_eq!(apply_key(&mut app, key(Char(c))), Some(Vec::new()));
        }
        assert_eq!(app.state.active_tab, MenuItem::Tournaments);
        apply_key(&mut app, key(KeyCode::Esc));
        assert!(app.state.tournaments.form.is_none());
        apply_key(&mut app, key(Char('1')));
        assert_eq!(app.state.active_tab, MenuItem::Matches);
    }

    #[test]
    fn escape_cancels_input() {
        let mut app = app();
        apply_key(&mut app, key(Char('6')));
        apply_key(&mut app, key(Char('t')));
        assert!(app.state.input.is_some());
        let mut esc = key(KeyCode::Esc);
        esc.kind = KeyEventKind::Press;
        assert_eq!(apply_key(&mut app, esc), Some(Vec::new()));
        assert!(app.state.input.is_none());
    }

    #[test]
    fn help_returns_to_previous_tab() {
        let mut app = app();
        apply_key(&mut app, key(Char('6')));
        apply_key(&mut app, key(Char('?')));
        assert_eq!(app.state.active_tab, MenuItem::Help);
        apply_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.state.active_tab, MenuItem::Settings);
    }
}
