/// Raw wire types for the scorebook `/v0` backend.
/// These map to the clean domain types via the mapping functions in client.rs.
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayer {
    pub id: String,
    pub name: Option<String>,
    pub club_id: Option<String>,
    #[serde(default)]
    pub badges: Vec<crate::Badge>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WirePlayerPage {
    #[serde(default)]
    pub players: Vec<WirePlayer>,
    pub total: Option<usize>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CreatePlayerBody<'a> {
    pub name: &'a str,
}

// ---------------------------------------------------------------------------
// Matches
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Serialize, Default, Clone)]
pub struct WireParticipant {
    pub side: String,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireSummary {
    /// Keyed by side: `{"A": 2, "B": 1}`.
    #[serde(default)]
    pub sets: HashMap<String, u16>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireMatch {
    pub id: String,
    #[serde(alias = "sport_id")]
    pub sport: Option<String>,
    pub stage_id: Option<String>,
    pub best_of: Option<u8>,
    pub played_at: Option<String>, // ISO 8601
    pub location: Option<String>,
    pub is_friendly: Option<bool>,
    #[serde(default)]
    pub participants: Vec<WireParticipant>,
    pub summary: Option<WireSummary>,
    /// Only present on the detail endpoint and the live stream.
    #[serde(default)]
    pub sets: Vec<WireSet>,
    /// "scheduled" | "in_progress" | "completed"; derived when absent.
    pub status: Option<String>,
}

/// Sets arrive either as `{"A": 6, "B": 4}` or as `[6, 4]`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireSet {
    Keyed(HashMap<String, u16>),
    Pair([u16; 2]),
}

#[derive(Debug, Serialize)]
pub struct RecordSetsBody {
    pub sets: Vec<[u16; 2]>,
}

// ---------------------------------------------------------------------------
// Chat + comments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireChatMessage {
    pub id: String,
    pub match_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    #[serde(alias = "body")]
    pub message: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PostChatBody<'a> {
    pub message: &'a str,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireComment {
    pub id: String,
    pub match_id: Option<String>,
    pub user_id: Option<String>,
    pub username: Option<String>,
    pub content: Option<String>,
    pub created_at: Option<String>,
}

/// Comments are listed either as a bare array or wrapped in `{"items": [...]}`.
#[derive(Debug, Deserialize, Clone)]
#[serde(untagged)]
pub enum WireCommentList {
    Bare(Vec<WireComment>),
    Wrapped { items: Vec<WireComment> },
}

impl Default for WireCommentList {
    fn default() -> Self {
        WireCommentList::Bare(Vec::new())
    }
}

impl WireCommentList {
    pub fn into_items(self) -> Vec<WireComment> {
        match self {
            WireCommentList::Bare(items) | WireCommentList::Wrapped { items } => items,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PostCommentBody<'a> {
    pub content: &'a str,
}

// ---------------------------------------------------------------------------
// Leaderboards
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireLeaderboard {
    pub sport: Option<String>,
    #[serde(default)]
    pub leaders: Vec<WireLeader>,
    pub total: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireLeader {
    pub rank: Option<u32>,
    pub player_id: String,
    pub player_name: Option<String>,
    pub rating: Option<f64>,
    pub sets_won: Option<u32>,
    pub sets_lost: Option<u32>,
    pub matches_played: Option<u32>,
}

// ---------------------------------------------------------------------------
// Tournaments
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireTournament {
    pub id: String,
    #[serde(alias = "sport_id")]
    pub sport: Option<String>,
    pub name: Option<String>,
    pub club_id: Option<String>,
    pub created_by_user_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateTournamentBody<'a> {
    pub sport: &'a str,
    pub name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub club_id: Option<&'a str>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireStage {
    pub id: String,
    pub tournament_id: Option<String>,
    #[serde(rename = "type")]
    pub stage_type: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateStageBody<'a> {
    #[serde(rename = "type")]
    pub stage_type: &'a str,
    pub config: StageConfig,
}

#[derive(Debug, Serialize)]
pub struct StageConfig {
    pub court_count: u32,
}

#[derive(Debug, Serialize)]
pub struct ScheduleBody<'a> {
    pub player_ids: &'a [String],
    pub court_count: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireScheduleMatch {
    pub id: String,
    pub round: Option<u32>,
    pub court: Option<u32>,
    #[serde(default)]
    pub participants: Vec<WireParticipant>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireScheduleResponse {
    #[serde(default)]
    pub matches: Vec<WireScheduleMatch>,
}

// ---------------------------------------------------------------------------
// Auth + errors
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CredentialsBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireAuthResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
}

/// Error body: `{"code": "...", "detail": "..."}`. FastAPI-style validation
/// errors send `detail` as an array, which is kept as raw JSON.
#[derive(Debug, Deserialize, Default, Clone)]
pub struct WireError {
    pub code: Option<String>,
    pub detail: Option<serde_json::Value>,
}
