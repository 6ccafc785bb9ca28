use crate::app::MenuItem;
use crate::state::locale::ResolvedLocale;
use crate::state::match_stream::StreamMode;
use crate::state::tournament_form::TournamentForm;
use scorebook_api::{
    AmericanoSchedule, ChatMessage, Club, Leaderboard, MatchComment, MatchDetail, MatchRow,
    Player, PlayerPage, SetScore, Sport, TournamentSummary,
};
use std::collections::{HashMap, HashSet};

/// Chat history kept per open match.
const CHAT_HISTORY_LIMIT: usize = 200;

// ---------------------------------------------------------------------------
// Remote data wrapper
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum Loadable<T> {
    Idle,
    Pending,
    Ready(T),
    Failed(String),
}

impl<T> Default for Loadable<T> {
    fn default() -> Self {
        Loadable::Idle
    }
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Loadable::Idle)
    }

    /// A failed refresh leaves already loaded data in place.
    pub fn fail(&mut self, message: &str) {
        if !matches!(self, Loadable::Ready(_)) {
            *self = Loadable::Failed(message.to_string());
        }
    }

    /// Keeps stale data on screen while a refresh is in flight.
    pub fn begin(&mut self) {
        if !matches!(self, Loadable::Ready(_)) {
            *self = Loadable::Pending;
        }
    }
}

// ---------------------------------------------------------------------------
// Directory: sports, clubs and player names used across every view
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct Directory {
    pub sports: Vec<Sport>,
    pub clubs: Vec<Club>,
    /// Roster sorted by name; the tournament form selects from it.
    pub players: Vec<Player>,
    pub player_names: HashMap<String, String>,
    /// `None` shows every sport.
    pub sport_filter: Option<String>,
}

impl Directory {
    pub fn load(&mut self, sports: Vec<Sport>, clubs: Vec<Club>, page: PlayerPage) {
        self.sports = sports;
        self.clubs = clubs;
        self.remember_players(&page.players);
        let mut players = page.players;
        players.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        self.players = players;

        if let Some(filter) = &self.sport_filter
            && !self.sports.iter().any(|s| &s.id == filter)
        {
            self.sport_filter = None;
        }
    }

    pub fn remember_players(&mut self, players: &[Player]) {
        for p in players {
            self.player_names.insert(p.id.clone(), p.name.clone());
        }
    }

    pub fn player_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.player_names.get(id).map(String::as_str).unwrap_or(id)
    }

    pub fn sport_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.sports
            .iter()
            .find(|s| s.id == id)
            .map(|s| s.name.as_str())
            .unwrap_or(id)
    }

    pub fn club_name(&self, id: &str) -> Option<&str> {
        self.clubs.iter().find(|c| c.id == id).map(|c| c.name.as_str())
    }

    /// All sports → each sport in turn → all sports.
    pub fn cycle_sport(&mut self) {
        let next = match &self.sport_filter {
            None => self.sports.first(),
            Some(current) => self
                .sports
                .iter()
                .position(|s| &s.id == current)
                .and_then(|idx| self.sports.get(idx + 1)),
        };
        self.sport_filter = next.map(|s| s.id.clone());
    }

    /// Sport used by views that need exactly one (leaderboard, new tournaments).
    pub fn focused_sport(&self) -> Option<String> {
        self.sport_filter
            .clone()
            .or_else(|| self.sports.first().map(|s| s.id.clone()))
    }

    /// Names for a side, joined for display.
    pub fn side_label(&self, ids: &[String]) -> String {
        if ids.is_empty() {
            return "TBD".to_string();
        }
        ids.iter()
            .map(|id| self.player_name(id))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

// ---------------------------------------------------------------------------
// Per-view state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct MatchListState {
    pub rows: Loadable<Vec<MatchRow>>,
    pub selected: usize,
}

impl MatchListState {
    pub fn load(&mut self, rows: Vec<MatchRow>) {
        self.selected = self.selected.min(rows.len().saturating_sub(1));
        self.rows = Loadable::Ready(rows);
    }

    pub fn selected_id(&self) -> Option<String> {
        self.rows.ready()?.get(self.selected).map(|r| r.id.clone())
    }

    pub fn select_next(&mut self) {
        let len = self.rows.ready().map_or(0, Vec::len);
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Live snapshots refresh the matching list row in place.
    pub fn apply_snapshot(&mut self, detail: &MatchDetail) {
        if let Loadable::Ready(rows) = &mut self.rows
            && let Some(row) = rows.iter_mut().find(|r| r.id == detail.id)
        {
            *row = detail.row();
        }
    }
}

#[derive(Debug, Default)]
pub struct MatchDetailState {
    pub match_id: Option<String>,
    pub detail: Loadable<MatchDetail>,
    pub chat: Vec<ChatMessage>,
    pub comments: Vec<MatchComment>,
    pub selected_comment: usize,
    pub stream_mode: StreamMode,
    seen_chat: HashSet<String>,
}

impl MatchDetailState {
    pub fn open(&mut self, match_id: &str) {
        *self = Self {
            match_id: Some(match_id.to_string()),
            detail: Loadable::Pending,
            ..Self::default()
        };
    }

    pub fn close(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self, match_id: &str) -> bool {
        self.match_id.as_deref() == Some(match_id)
    }

    /// Last snapshot wins, as long as it is for the open match.
    pub fn apply_snapshot(&mut self, detail: MatchDetail) -> bool {
        if !self.is_open(&detail.id) {
            return false;
        }
        self.detail = Loadable::Ready(detail);
        true
    }

    pub fn merge_chat(&mut self, messages: Vec<ChatMessage>) {
        for message in messages {
            self.push_chat(message);
        }
    }

    pub fn push_chat(&mut self, message: ChatMessage) {
        if !message.id.is_empty() && !self.seen_chat.insert(message.id.clone()) {
            return;
        }
        self.chat.push(message);
        if self.chat.len() > CHAT_HISTORY_LIMIT {
            let excess = self.chat.len() - CHAT_HISTORY_LIMIT;
            self.chat.drain(0..excess);
        }
    }

    pub fn set_comments(&mut self, comments: Vec<MatchComment>) {
        self.selected_comment = self.selected_comment.min(comments.len().saturating_sub(1));
        self.comments = comments;
    }

    pub fn push_comment(&mut self, comment: MatchComment) {
        if self.comments.iter().any(|c| c.id == comment.id) {
            return;
        }
        self.comments.push(comment);
    }

    pub fn remove_comment(&mut self, comment_id: &str) {
        self.comments.retain(|c| c.id != comment_id);
        self.selected_comment = self.selected_comment.min(self.comments.len().saturating_sub(1));
    }

    pub fn selected_comment(&self) -> Option<&MatchComment> {
        self.comments.get(self.selected_comment)
    }

    pub fn select_next_comment(&mut self) {
        if self.selected_comment + 1 < self.comments.len() {
            self.selected_comment += 1;
        }
    }

    pub fn select_prev_comment(&mut self) {
        self.selected_comment = self.selected_comment.saturating_sub(1);
    }
}

#[derive(Debug, Default)]
pub struct LeaderboardState {
    pub board: Loadable<Leaderboard>,
    pub scroll: usize,
}

#[derive(Debug, Default)]
pub struct PlayersState {
    pub page: Loadable<PlayerPage>,
    pub query: String,
    pub selected: usize,
}

impl PlayersState {
    pub fn select_next(&mut self) {
        let len = self.page.ready().map_or(0, |p| p.players.len());
        if self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }
}

#[derive(Debug, Default)]
pub struct TournamentsState {
    pub list: Loadable<Vec<TournamentSummary>>,
    pub selected: usize,
    pub form: Option<TournamentForm>,
    /// Schedule of the Americano created in this session.
    pub schedule: Option<AmericanoSchedule>,
}

// ---------------------------------------------------------------------------
// Text input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Chat,
    Comment,
    Sets,
    PlayerSearch,
    NewPlayer,
    TournamentName,
    Timezone,
}

impl InputMode {
    pub fn prompt(&self) -> &'static str {
        match self {
            InputMode::Chat => "chat",
            InputMode::Comment => "comment",
            InputMode::Sets => "sets (e.g. 6-4 3-6 7-5)",
            InputMode::PlayerSearch => "search players",
            InputMode::NewPlayer => "new player name",
            InputMode::TournamentName => "tournament name",
            InputMode::Timezone => "timezone (IANA, empty clears)",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub mode: InputMode,
    pub buffer: String,
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub last_error: Option<String>,
    /// Transient confirmation, cleared on the next key press.
    pub notice: Option<String>,
    pub locale: ResolvedLocale,
    pub directory: Directory,
    pub directory_load: Loadable<()>,
    pub matches: MatchListState,
    pub match_detail: MatchDetailState,
    pub leaderboard: LeaderboardState,
    pub players: PlayersState,
    pub tournaments: TournamentsState,
    pub input: Option<InputState>,
}

/// Parses `6-4 3-6 7-5` (commas also separate sets) into set scores.
pub fn parse_set_scores(input: &str) -> Result<Vec<SetScore>, String> {
    let mut sets = Vec::new();
    for token in input.split(|c: char| c.is_whitespace() || c == ',').filter(|t| !t.is_empty()) {
        let Some((a, b)) = token.split_once(['-', ':']) else {
            return Err(format!("'{token}' is not a set score like 6-4"));
        };
        let a = a
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("'{token}' is not a set score like 6-4"))?;
        let b = b
            .trim()
            .parse::<u16>()
            .map_err(|_| format!("'{token}' is not a set score like 6-4"))?;
        sets.push(SetScore::new(a, b));
    }
    if sets.is_empty() {
        return Err("Enter at least one set, e.g. 6-4".to_string());
    }
    Ok(sets)
}
