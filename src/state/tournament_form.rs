use scorebook_api::AmericanoRequest;
use std::collections::HashSet;
use std::fmt;

/// Americano needs two pairs per court.
pub const PLAYERS_PER_COURT: usize = 4;
pub const MIN_AMERICANO_PLAYERS: usize = PLAYERS_PER_COURT;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingName,
    MissingSport,
    NoCourts,
    TooFewPlayers { have: usize },
    DuplicatePlayer(String),
    TooManyCourts { courts: u32, max: u32 },
}

impl fmt::Display for FormError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormError::MissingName => write!(f, "Give the tournament a name."),
            FormError::MissingSport => write!(f, "Pick a sport first."),
            FormError::NoCourts => write!(f, "At least one court is required."),
            FormError::TooFewPlayers { have } => write!(
                f,
                "Americano needs at least {MIN_AMERICANO_PLAYERS} players ({have} selected)."
            ),
            FormError::DuplicatePlayer(id) => write!(f, "Player {id} is selected twice."),
            FormError::TooManyCourts { courts, max } => {
                write!(f, "{courts} courts need more players; at most {max} with this roster.")
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TournamentForm {
    pub name: String,
    pub sport_id: Option<String>,
    pub club_id: Option<String>,
    pub court_count: u32,
    /// Selection order is kept; it is the order sent to the scheduler.
    pub selected_players: Vec<String>,
    /// Cursor into the roster shown beside the form.
    pub cursor: usize,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Default for TournamentForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            sport_id: None,
            club_id: None,
            court_count: 1,
            selected_players: Vec::new(),
            cursor: 0,
            submitting: false,
            error: None,
        }
    }
}

impl TournamentForm {
    pub fn new(sport_id: Option<String>) -> Self {
        Self {
            sport_id,
            ..Self::default()
        }
    }

    pub fn toggle_player(&mut self, player_id: &str) {
        if let Some(idx) = self.selected_players.iter().position(|p| p == player_id) {
            self.selected_players.remove(idx);
        } else {
            self.selected_players.push(player_id.to_string());
        }
        self.error = None;
    }

    pub fn is_selected(&self, player_id: &str) -> bool {
        self.selected_players.iter().any(|p| p == player_id)
    }

    pub fn add_court(&mut self) {
        self.court_count = self.court_count.saturating_add(1);
    }

    pub fn remove_court(&mut self) {
        self.court_count = self.court_count.saturating_sub(1).max(1);
    }

    pub fn max_courts(&self) -> u32 {
        (self.selected_players.len() / PLAYERS_PER_COURT) as u32
    }

    pub fn validate(&self) -> Result<AmericanoRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let Some(sport_id) = self.sport_id.clone().filter(|s| !s.trim().is_empty()) else {
            return Err(FormError::MissingSport);
        };
        if self.court_count == 0 {
            return Err(FormError::NoCourts);
        }

        let mut seen = HashSet::new();
        for id in &self.selected_players {
            if !seen.insert(id.as_str()) {
                return Err(FormError::DuplicatePlayer(id.clone()));
            }
        }
        if self.selected_players.len() < MIN_AMERICANO_PLAYERS {
            return Err(FormError::TooFewPlayers { have: self.selected_players.len() });
        }
        let max = self.max_courts();
        if self.court_count > max {
            return Err(FormError::TooManyCourts { courts: self.court_count, max });
        }

        Ok(AmericanoRequest {
            name: name.to_string(),
            sport_id,
            club_id: self.club_id.clone(),
            court_count: self.court_count,
            player_ids: self.selected_players.clone(),
        })
    }
}
