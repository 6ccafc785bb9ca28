use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, InputMode, InputState, Loadable, parse_set_scores};
use crate::state::locale::{self, LocaleSignals, ResolvedLocale, normalize_timezone};
use crate::state::match_stream::{StreamCommand, StreamEvent, StreamMode};
use crate::state::messages::{Effect, NetworkRequest, NetworkResponse};
use crate::state::tournament_form::TournamentForm;
use log::{debug, info, warn};
use scorebook_api::MatchDetail;

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Matches,
    Match,
    Leaderboard,
    Players,
    Tournaments,
    Settings,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
    /// Locale signals are read once per resolution; tests swap this out.
    signals: fn(&AppSettings) -> LocaleSignals,
}

fn environment_signals(settings: &AppSettings) -> LocaleSignals {
    LocaleSignals::from_environment(&settings.user)
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();

        if let Some(level) = settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        Self::with_settings(settings, environment_signals)
    }

    pub fn with_settings(settings: AppSettings, signals: fn(&AppSettings) -> LocaleSignals) -> Self {
        let mut state = AppState::default();
        state.directory.sport_filter = settings.user.default_sport.clone();
        let mut app = Self { settings, state, signals };
        app.state.locale = app.resolve_locale();
        app
    }

    fn resolve_locale(&self) -> ResolvedLocale {
        locale::resolve(&(self.signals)(&self.settings))
    }

    fn session_effect(&self) -> Effect {
        Effect::Network(NetworkRequest::UpdateSession {
            token: self.settings.user.token.clone(),
            accept_language: Some(self.state.locale.accept_language()),
        })
    }

    /// Re-run locale resolution. The backend only hears about it when the
    /// outcome changed.
    pub fn refresh_locale(&mut self) -> Vec<Effect> {
        let resolved = self.resolve_locale();
        if resolved == self.state.locale {
            return Vec::new();
        }
        info!(
            "locale now {} ({}), timezone {} ({})",
            resolved.locale,
            resolved.locale_source.label(),
            resolved.timezone,
            resolved.timezone_source.label()
        );
        self.state.locale = resolved;
        vec![self.session_effect()]
    }

    // -----------------------------------------------------------------------
    // Lifecycle events
    // -----------------------------------------------------------------------

    pub fn on_app_started(&mut self) -> Vec<Effect> {
        self.state.directory_load = Loadable::Pending;
        self.state.matches.rows.begin();
        vec![
            self.session_effect(),
            Effect::Network(NetworkRequest::LoadDirectory),
            self.load_matches_request(),
        ]
    }

    pub fn on_refresh_tick(&mut self) -> Vec<Effect> {
        let mut effects = vec![self.load_matches_request()];
        if let Some(match_id) = self.state.match_detail.match_id.clone() {
            effects.push(Effect::Network(NetworkRequest::LoadChat { match_id: match_id.clone() }));
            effects.push(Effect::Network(NetworkRequest::LoadComments { match_id }));
        }
        if self.state.active_tab == MenuItem::Leaderboard
            && let Some(effect) = self.load_leaderboard_request()
        {
            effects.push(effect);
        }
        effects
    }

    /// The settings file changed under us, typically another running instance.
    /// The token may have changed too, so the session is always re-sent.
    pub fn on_settings_file_changed(&mut self) -> Vec<Effect> {
        match self.settings.reload() {
            Ok(true) => {
                debug!("settings reloaded from {}", self.settings.path.display());
                let mut effects = self.refresh_locale();
                if effects.is_empty() {
                    effects.push(self.session_effect());
                }
                effects
            }
            Ok(false) => Vec::new(),
            Err(e) => {
                warn!("ignoring unreadable settings change: {e:#}");
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    pub fn update_tab(&mut self, next: MenuItem) -> Vec<Effect> {
        if self.state.active_tab == next {
            return Vec::new();
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;

        match next {
            MenuItem::Leaderboard if self.state.leaderboard.board.is_idle() => {
                self.load_leaderboard_request().into_iter().collect()
            }
            MenuItem::Players if self.state.players.page.is_idle() => {
                self.state.players.page = Loadable::Pending;
                vec![Effect::Network(NetworkRequest::SearchPlayers { query: String::new() })]
            }
            MenuItem::Tournaments if self.state.tournaments.list.is_idle() => {
                self.state.tournaments.list = Loadable::Pending;
                vec![Effect::Network(NetworkRequest::LoadTournaments)]
            }
            _ => Vec::new(),
        }
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.user.full_screen = !self.settings.user.full_screen;
        self.persist_settings();
    }

    /// Reload whatever the current view shows.
    pub fn retry(&mut self) -> Vec<Effect> {
        self.state.last_error = None;
        let mut effects = Vec::new();
        if matches!(self.state.directory_load, Loadable::Failed(_)) {
            self.state.directory_load = Loadable::Pending;
            effects.push(Effect::Network(NetworkRequest::LoadDirectory));
        }
        match self.state.active_tab {
            MenuItem::Matches => {
                self.state.matches.rows.begin();
                effects.push(self.load_matches_request());
            }
            MenuItem::Match => {
                if let Some(match_id) = self.state.match_detail.match_id.clone() {
                    self.state.match_detail.detail.begin();
                    effects.extend(self.match_detail_requests(&match_id));
                }
            }
            MenuItem::Leaderboard => effects.extend(self.load_leaderboard_request()),
            MenuItem::Players => {
                self.state.players.page.begin();
                effects.push(Effect::Network(NetworkRequest::SearchPlayers {
                    query: self.state.players.query.clone(),
                }));
            }
            MenuItem::Tournaments => {
                self.state.tournaments.list.begin();
                effects.push(Effect::Network(NetworkRequest::LoadTournaments));
            }
            MenuItem::Settings | MenuItem::Help => {}
        }
        effects
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    fn load_matches_request(&self) -> Effect {
        Effect::Network(NetworkRequest::LoadMatches {
            sport: self.state.directory.sport_filter.clone(),
        })
    }

    fn load_leaderboard_request(&mut self) -> Option<Effect> {
        let sport = self.state.directory.focused_sport()?;
        self.state.leaderboard.board.begin();
        Some(Effect::Network(NetworkRequest::LoadLeaderboard { sport }))
    }

    fn match_detail_requests(&self, match_id: &str) -> Vec<Effect> {
        vec![
            Effect::Network(NetworkRequest::LoadMatchDetail { match_id: match_id.to_string() }),
            Effect::Network(NetworkRequest::LoadChat { match_id: match_id.to_string() }),
            Effect::Network(NetworkRequest::LoadComments { match_id: match_id.to_string() }),
        ]
    }

    pub fn cycle_sport(&mut self) -> Vec<Effect> {
        self.state.directory.cycle_sport();
        self.state.matches.selected = 0;
        self.state.matches.rows = Loadable::Pending;
        self.state.leaderboard.board = Loadable::Idle;

        let mut effects = vec![self.load_matches_request()];
        if self.state.active_tab == MenuItem::Leaderboard {
            effects.extend(self.load_leaderboard_request());
        }
        effects
    }

    pub fn select_next(&mut self) {
        match self.state.active_tab {
            MenuItem::Matches => self.state.matches.select_next(),
            MenuItem::Match => self.state.match_detail.select_next_comment(),
            MenuItem::Leaderboard => {
                let len = self.state.leaderboard.board.ready().map_or(0, |b| b.entries.len());
                if self.state.leaderboard.scroll + 1 < len {
                    self.state.leaderboard.scroll += 1;
                }
            }
            MenuItem::Players => self.state.players.select_next(),
            MenuItem::Tournaments => {
                let roster = self.state.directory.players.len();
                if let Some(form) = self.state.tournaments.form.as_mut() {
                    if form.cursor + 1 < roster {
                        form.cursor += 1;
                    }
                } else {
                    let len = self.state.tournaments.list.ready().map_or(0, Vec::len);
                    if self.state.tournaments.selected + 1 < len {
                        self.state.tournaments.selected += 1;
                    }
                }
            }
            MenuItem::Settings | MenuItem::Help => {}
        }
    }

    pub fn select_prev(&mut self) {
        match self.state.active_tab {
            MenuItem::Matches => self.state.matches.select_prev(),
            MenuItem::Match => self.state.match_detail.select_prev_comment(),
            MenuItem::Leaderboard => {
                self.state.leaderboard.scroll = self.state.leaderboard.scroll.saturating_sub(1);
            }
            MenuItem::Players => self.state.players.select_prev(),
            MenuItem::Tournaments => match self.state.tournaments.form.as_mut() {
                Some(form) => form.cursor = form.cursor.saturating_sub(1),
                None => {
                    self.state.tournaments.selected =
                        self.state.tournaments.selected.saturating_sub(1);
                }
            },
            MenuItem::Settings | MenuItem::Help => {}
        }
    }

    /// Opens the highlighted match and starts following it live.
    pub fn open_selected_match(&mut self) -> Vec<Effect> {
        let Some(match_id) = self.state.matches.selected_id() else {
            return Vec::new();
        };
        self.state.match_detail.open(&match_id);
        let mut effects = self.update_tab(MenuItem::Match);
        effects.extend(self.match_detail_requests(&match_id));
        effects.push(Effect::Stream(StreamCommand::Watch { match_id }));
        effects
    }

    pub fn close_match(&mut self) -> Vec<Effect> {
        if self.state.match_detail.match_id.is_none() {
            return Vec::new();
        }
        self.state.match_detail.close();
        self.update_tab(MenuItem::Matches);
        vec![Effect::Stream(StreamCommand::Stop)]
    }

    fn current_username(&self) -> Option<&str> {
        self.settings.user.username.as_deref()
    }

    pub fn delete_selected_comment(&mut self) -> Vec<Effect> {
        let Some(match_id) = self.state.match_detail.match_id.clone() else {
            return Vec::new();
        };
        let Some(comment) = self.state.match_detail.selected_comment() else {
            return Vec::new();
        };
        if self.current_username() != Some(comment.username.as_str()) {
            self.state.notice = Some("You can only delete your own comments.".to_string());
            return Vec::new();
        }
        vec![Effect::Network(NetworkRequest::DeleteComment {
            match_id,
            comment_id: comment.id.clone(),
        })]
    }

    // -----------------------------------------------------------------------
    // Text input
    // -----------------------------------------------------------------------

    pub fn begin_input(&mut self, mode: InputMode) {
        let needs_match = matches!(mode, InputMode::Chat | InputMode::Comment | InputMode::Sets);
        if needs_match && self.state.match_detail.match_id.is_none() {
            return;
        }
        let needs_login = matches!(
            mode,
            InputMode::Chat | InputMode::Comment | InputMode::Sets | InputMode::NewPlayer
        );
        if needs_login && self.settings.user.token.is_none()
        {
            self.state.notice = Some("Log in first: scorebook login <username>".to_string());
            return;
        }
        let buffer = match mode {
            InputMode::PlayerSearch => self.state.players.query.clone(),
            InputMode::TournamentName => self
                .state
                .tournaments
                .form
                .as_ref()
                .map(|f| f.name.clone())
                .unwrap_or_default(),
            InputMode::Timezone => self.settings.user.timezone.clone().unwrap_or_default(),
            _ => String::new(),
        };
        self.state.input = Some(InputState { mode, buffer });
    }

    pub fn input_char(&mut self, c: char) {
        if let Some(input) = self.state.input.as_mut() {
            input.buffer.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if let Some(input) = self.state.input.as_mut() {
            input.buffer.pop();
        }
    }

    pub fn cancel_input(&mut self) {
        self.state.input = None;
    }

    pub fn submit_input(&mut self) -> Vec<Effect> {
        let Some(InputState { mode, buffer }) = self.state.input.take() else {
            return Vec::new();
        };
        let text = buffer.trim().to_string();
        let match_id = self.state.match_detail.match_id.clone();

        match (mode, match_id) {
            (InputMode::Chat, Some(match_id)) if !text.is_empty() => {
                vec![Effect::Network(NetworkRequest::PostChat { match_id, body: text })]
            }
            (InputMode::Comment, Some(match_id)) if !text.is_empty() => {
                vec![Effect::Network(NetworkRequest::PostComment { match_id, body: text })]
            }
            (InputMode::Sets, Some(match_id)) => match parse_set_scores(&text) {
                Ok(sets) => vec![Effect::Network(NetworkRequest::RecordSets { match_id, sets })],
                Err(message) => {
                    self.state.last_error = Some(message);
                    Vec::new()
                }
            },
            (InputMode::PlayerSearch, _) => {
                self.state.players.query = text.clone();
                self.state.players.selected = 0;
                self.state.players.page = Loadable::Pending;
                vec![Effect::Network(NetworkRequest::SearchPlayers { query: text })]
            }
            (InputMode::NewPlayer, _) if !text.is_empty() => {
                vec![Effect::Network(NetworkRequest::CreatePlayer { name: text })]
            }
            (InputMode::TournamentName, _) => {
                if let Some(form) = self.state.tournaments.form.as_mut() {
                    form.name = text;
                    form.error = None;
                }
                Vec::new()
            }
            (InputMode::Timezone, _) => self.set_timezone_preference(&text),
            _ => Vec::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    fn persist_settings(&mut self) {
        if let Err(e) = self.settings.save() {
            warn!("could not save settings: {e:#}");
            self.state.last_error = Some(format!("Could not save settings: {e}"));
        }
    }

    pub fn cycle_locale(&mut self) -> Vec<Effect> {
        self.settings.user.locale =
            locale::next_locale_preference(self.settings.user.locale.as_deref());
        self.persist_settings();
        self.refresh_locale()
    }

    /// Empty input clears the preference; anything else must be a known IANA zone.
    pub fn set_timezone_preference(&mut self, raw: &str) -> Vec<Effect> {
        let value = raw.trim();
        if value.is_empty() {
            self.settings.user.timezone = None;
        } else {
            let Some(tz) = normalize_timezone(value) else {
                self.state.last_error = Some(format!("Unknown timezone '{value}'"));
                return Vec::new();
            };
            self.settings.user.timezone = Some(tz);
        }
        self.persist_settings();
        self.refresh_locale()
    }

    // -----------------------------------------------------------------------
    // Tournaments
    // -----------------------------------------------------------------------

    pub fn open_tournament_form(&mut self) {
        if self.settings.user.token.is_none() {
            self.state.notice = Some("Log in first: scorebook login <username>".to_string());
            return;
        }
        let mut form = TournamentForm::new(self.state.directory.focused_sport());
        form.club_id = match self.state.directory.clubs.as_slice() {
            [only] => Some(only.id.clone()),
            _ => None,
        };
        self.state.tournaments.form = Some(form);
        self.state.tournaments.schedule = None;
    }

    pub fn close_tournament_form(&mut self) {
        self.state.tournaments.form = None;
    }

    pub fn toggle_form_player(&mut self) {
        let Some(form) = self.state.tournaments.form.as_mut() else {
            return;
        };
        if let Some(player) = self.state.directory.players.get(form.cursor) {
            form.toggle_player(&player.id);
        }
    }

    pub fn adjust_form_courts(&mut self, more: bool) {
        if let Some(form) = self.state.tournaments.form.as_mut() {
            if more {
                form.add_court();
            } else {
                form.remove_court();
            }
            form.error = None;
        }
    }

    pub fn submit_tournament_form(&mut self) -> Vec<Effect> {
        let Some(form) = self.state.tournaments.form.as_mut() else {
            return Vec::new();
        };
        if form.submitting {
            return Vec::new();
        }
        match form.validate() {
            Ok(request) => {
                form.submitting = true;
                form.error = None;
                vec![Effect::Network(NetworkRequest::CreateAmericano { request })]
            }
            Err(e) => {
                form.error = Some(e.to_string());
                Vec::new()
            }
        }
    }

    // -----------------------------------------------------------------------
    // Worker responses
    // -----------------------------------------------------------------------

    pub fn on_network_response(&mut self, response: NetworkResponse) -> Vec<Effect> {
        match response {
            NetworkResponse::LoadingStateChanged { .. } | NetworkResponse::SessionUpdated => {}
            NetworkResponse::DirectoryLoaded { sports, clubs, players } => {
                self.state.directory.load(sports, clubs, players);
                self.state.directory_load = Loadable::Ready(());
                if self.state.active_tab == MenuItem::Leaderboard {
                    return self.load_leaderboard_request().into_iter().collect();
                }
            }
            NetworkResponse::MatchesLoaded { rows } => {
                self.state.last_error = None;
                self.state.matches.load(rows);
            }
            NetworkResponse::MatchDetailLoaded { detail } => self.on_snapshot(detail),
            NetworkResponse::ChatLoaded { match_id, messages } => {
                if self.state.match_detail.is_open(&match_id) {
                    self.state.match_detail.merge_chat(messages);
                }
            }
            NetworkResponse::ChatPosted { message } => {
                if self.state.match_detail.is_open(&message.match_id) {
                    self.state.match_detail.push_chat(message);
                }
            }
            NetworkResponse::CommentsLoaded { match_id, comments } => {
                if self.state.match_detail.is_open(&match_id) {
                    self.state.match_detail.set_comments(comments);
                }
            }
            NetworkResponse::CommentPosted { comment } => {
                if self.state.match_detail.is_open(&comment.match_id) {
                    self.state.match_detail.push_comment(comment);
                }
                self.state.notice = Some("Comment posted.".to_string());
            }
            NetworkResponse::CommentDeleted { match_id, comment_id } => {
                if self.state.match_detail.is_open(&match_id) {
                    self.state.match_detail.remove_comment(&comment_id);
                }
                self.state.notice = Some("Comment deleted.".to_string());
            }
            NetworkResponse::SetsRecorded { match_id } => {
                self.state.notice = Some("Sets recorded.".to_string());
                return vec![
                    Effect::Network(NetworkRequest::LoadMatchDetail { match_id }),
                    self.load_matches_request(),
                ];
            }
            NetworkResponse::LeaderboardLoaded { leaderboard } => {
                self.state.leaderboard.scroll = 0;
                self.state.leaderboard.board = Loadable::Ready(leaderboard);
            }
            NetworkResponse::PlayersLoaded { page } => {
                self.state.directory.remember_players(&page.players);
                self.state.players.page = Loadable::Ready(page);
            }
            NetworkResponse::PlayerCreated { player } => {
                info!("created player {}", player.id);
                self.state.notice = Some(format!("Added {}.", player.name));
                self.state.directory.remember_players(std::slice::from_ref(&player));
                let query = self.state.players.query.clone();
                self.state.players.page.begin();
                return vec![Effect::Network(NetworkRequest::SearchPlayers { query })];
            }
            NetworkResponse::TournamentsLoaded { tournaments } => {
                self.state.tournaments.selected = self
                    .state
                    .tournaments
                    .selected
                    .min(tournaments.len().saturating_sub(1));
                self.state.tournaments.list = Loadable::Ready(tournaments);
            }
            NetworkResponse::AmericanoCreated { schedule } => {
                info!(
                    "created americano {} with {} matches",
                    schedule.tournament.id,
                    schedule.matches.len()
                );
                self.state.notice = Some(format!("Created {}.", schedule.tournament.name));
                self.state.tournaments.form = None;
                self.state.tournaments.schedule = Some(schedule);
                return vec![Effect::Network(NetworkRequest::LoadTournaments)];
            }
            NetworkResponse::Failed { request, message } => self.on_request_failed(request, message),
        }
        Vec::new()
    }

    fn on_snapshot(&mut self, detail: MatchDetail) {
        self.state.matches.apply_snapshot(&detail);
        self.state.match_detail.apply_snapshot(detail);
    }

    fn on_request_failed(&mut self, request: NetworkRequest, message: String) {
        warn!("request failed: {message}");
        match request {
            NetworkRequest::LoadDirectory => {
                self.state.directory_load = Loadable::Failed(message.clone());
            }
            NetworkRequest::LoadMatches { .. } => self.state.matches.rows.fail(&message),
            NetworkRequest::LoadMatchDetail { match_id } => {
                if self.state.match_detail.is_open(&match_id) {
                    self.state.match_detail.detail.fail(&message);
                }
            }
            NetworkRequest::LoadLeaderboard { .. } => self.state.leaderboard.board.fail(&message),
            NetworkRequest::SearchPlayers { .. } => self.state.players.page.fail(&message),
            NetworkRequest::LoadTournaments => self.state.tournaments.list.fail(&message),
            NetworkRequest::CreateAmericano { .. } => {
                if let Some(form) = self.state.tournaments.form.as_mut() {
                    form.submitting = false;
                    form.error = Some(message.clone());
                }
            }
            _ => {}
        }
        self.state.last_error = Some(message);
    }

    pub fn on_stream_event(&mut self, event: StreamEvent) {
        match event {
            StreamEvent::Mode { match_id, mode } => {
                let current = self.state.match_detail.match_id.as_deref();
                if mode == StreamMode::Idle || match_id.as_deref() == current {
                    self.state.match_detail.stream_mode = mode;
                }
            }
            StreamEvent::Snapshot(detail) => self.on_snapshot(detail),
            StreamEvent::Error(message) => debug!("match stream: {message}"),
        }
    }
}
