pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Domain types, independent of the /v0 wire format
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sport {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Club {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub club_id: Option<String>,
    pub badges: Vec<Badge>,
}

#[derive(Debug, Clone, Default)]
pub struct PlayerPage {
    pub players: Vec<Player>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    #[default]
    A,
    B,
}

impl Side {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "A" | "a" => Some(Side::A),
            "B" | "b" => Some(Side::B),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Side::A => "A",
            Side::B => "B",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Participant {
    pub side: Side,
    pub player_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetScore {
    pub a: u16,
    pub b: u16,
}

impl SetScore {
    pub fn new(a: u16, b: u16) -> Self {
        Self { a, b }
    }

    /// Drawn sets have no winner.
    pub fn winner(&self) -> Option<Side> {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Some(Side::A),
            std::cmp::Ordering::Less => Some(Side::B),
            std::cmp::Ordering::Equal => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchStatus {
    #[default]
    Scheduled,
    InProgress,
    Final,
}

impl MatchStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::InProgress => "Live",
            MatchStatus::Final => "Final",
        }
    }
}

/// Row shown in match lists.
#[derive(Debug, Clone, Default)]
pub struct MatchRow {
    pub id: String,
    pub sport_id: String,
    pub stage_id: Option<String>,
    pub best_of: Option<u8>,
    pub played_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub is_friendly: bool,
    pub participants: Vec<Participant>,
    /// Sets won per side, absent until the match has a result.
    pub summary: Option<BTreeMap<Side, u16>>,
}

impl MatchRow {
    pub fn players_on(&self, side: Side) -> &[String] {
        self.participants
            .iter()
            .find(|p| p.side == side)
            .map(|p| p.player_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn sets_won(&self, side: Side) -> Option<u16> {
        self.summary.as_ref().and_then(|s| s.get(&side).copied())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MatchDetail {
    pub id: String,
    pub sport_id: String,
    pub stage_id: Option<String>,
    pub best_of: Option<u8>,
    pub played_at: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub is_friendly: bool,
    pub participants: Vec<Participant>,
    pub summary: Option<BTreeMap<Side, u16>>,
    pub sets: Vec<SetScore>,
    pub status: MatchStatus,
}

impl MatchDetail {
    /// Project the detail back onto a list row so live updates can refresh lists.
    pub fn row(&self) -> MatchRow {
        MatchRow {
            id: self.id.clone(),
            sport_id: self.sport_id.clone(),
            stage_id: self.stage_id.clone(),
            best_of: self.best_of,
            played_at: self.played_at,
            location: self.location.clone(),
            is_friendly: self.is_friendly,
            participants: self.participants.clone(),
            summary: self.summary.clone(),
        }
    }

    pub fn players_on(&self, side: Side) -> &[String] {
        self.participants
            .iter()
            .find(|p| p.side == side)
            .map(|p| p.player_ids.as_slice())
            .unwrap_or_default()
    }

    pub fn is_live(&self) -> bool {
        self.status == MatchStatus::InProgress
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatMessage {
    pub id: String,
    pub match_id: String,
    pub user_id: Option<String>,
    pub username: String,
    pub body: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchComment {
    pub id: String,
    pub match_id: String,
    pub user_id: Option<String>,
    pub username: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub player_id: String,
    pub player_name: String,
    pub rating: Option<f64>,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub matches_played: u32,
}

#[derive(Debug, Clone, Default)]
pub struct Leaderboard {
    pub sport_id: String,
    pub entries: Vec<LeaderboardEntry>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TournamentSummary {
    pub id: String,
    pub sport_id: String,
    pub name: String,
    pub club_id: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stage {
    pub id: String,
    pub tournament_id: String,
    pub stage_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageScheduleMatch {
    pub id: String,
    pub round: u32,
    pub court: u32,
    pub participants: Vec<Participant>,
}

impl StageScheduleMatch {
    pub fn players_on(&self, side: Side) -> &[String] {
        self.participants
            .iter()
            .find(|p| p.side == side)
            .map(|p| p.player_ids.as_slice())
            .unwrap_or_default()
    }
}

/// Everything the tournament form needs to render after a successful submit.
#[derive(Debug, Clone, Default)]
pub struct AmericanoSchedule {
    pub tournament: TournamentSummary,
    pub stage: Stage,
    pub matches: Vec<StageScheduleMatch>,
}

impl AmericanoSchedule {
    /// Matches grouped by round, rounds ascending, courts ascending within a round.
    pub fn rounds(&self) -> Vec<(u32, Vec<&StageScheduleMatch>)> {
        let mut grouped: BTreeMap<u32, Vec<&StageScheduleMatch>> = BTreeMap::new();
        for m in &self.matches {
            grouped.entry(m.round).or_default().push(m);
        }
        grouped
            .into_iter()
            .map(|(round, mut matches)| {
                matches.sort_by_key(|m| m.court);
                (round, matches)
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSession {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Input for the three-step Americano setup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AmericanoRequest {
    pub name: String,
    pub sport_id: String,
    pub club_id: Option<String>,
    pub court_count: u32,
    pub player_ids: Vec<String>,
}
