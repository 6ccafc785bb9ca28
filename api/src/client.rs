use crate::wire::{
    CreatePlayerBody, CreateStageBody, CreateTournamentBody, CredentialsBody, PostChatBody,
    PostCommentBody, RecordSetsBody, ScheduleBody, StageConfig, WireAuthResponse,
    WireChatMessage, WireComment, WireCommentList, WireError, WireLeaderboard, WireMatch,
    WireParticipant, WirePlayer, WirePlayerPage, WireScheduleMatch, WireScheduleResponse,
    WireSet, WireStage, WireTournament,
};
use crate::{
    AmericanoRequest, AmericanoSchedule, AuthSession, Badge, ChatMessage, Club, Leaderboard,
    LeaderboardEntry, MatchComment, MatchDetail, MatchRow, MatchStatus, Participant, Player,
    PlayerPage, SetScore, Side, Sport, Stage, StageScheduleMatch, TournamentSummary,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const API_PREFIX: &str = "/v0";
const AMERICANO_STAGE_TYPE: &str = "americano";

/// Client for the scorebook `/v0` REST API.
#[derive(Debug, Clone)]
pub struct ScorebookApi {
    client: Client,
    base_url: String,
    timeout: Duration,
    token: Option<String>,
    accept_language: Option<String>,
}

impl Default for ScorebookApi {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmericanoStep {
    CreateTournament,
    CreateStage,
    Schedule,
}

impl AmericanoStep {
    pub fn label(&self) -> &'static str {
        match self {
            AmericanoStep::CreateTournament => "create tournament",
            AmericanoStep::CreateStage => "create stage",
            AmericanoStep::Schedule => "schedule stage",
        }
    }
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Status {
        status: u16,
        code: Option<String>,
        detail: Option<String>,
        url: String,
    },
    Parsing(reqwest::Error, String),
    Americano {
        step: AmericanoStep,
        source: Box<ApiError>,
    },
    Other(String),
}

impl ApiError {
    /// HTTP status of the failing response, looking through Americano wrapping.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Americano { source, .. } => source.status(),
            _ => None,
        }
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            ApiError::Status { code, .. } => code.as_deref(),
            ApiError::Americano { source, .. } => source.code(),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail, .. } => detail.as_deref(),
            ApiError::Americano { source, .. } => source.detail(),
            _ => None,
        }
    }

    pub fn is_network(&self) -> bool {
        match self {
            ApiError::Network(..) => true,
            ApiError::Americano { source, .. } => source.is_network(),
            _ => false,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Status { status, detail, url, .. } => match detail {
                Some(detail) => write!(f, "HTTP {status} for {url}: {detail}"),
                None => write!(f, "HTTP {status} for {url}"),
            },
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::Americano { step, source } => {
                write!(f, "Americano setup failed at {}: {source}", step.label())
            }
            ApiError::Other(msg) => write!(f, "Error: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl ScorebookApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::builder()
                .user_agent(concat!("scorebook/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            base_url,
            timeout: Duration::from_secs(10),
            token: None,
            accept_language: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Bearer token attached to every request. Blank tokens clear it.
    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token.filter(|t| !t.trim().is_empty());
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn set_accept_language(&mut self, value: Option<String>) {
        self.accept_language = value.filter(|v| !v.trim().is_empty());
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    // -----------------------------------------------------------------------
    // Sports, clubs, badges
    // -----------------------------------------------------------------------

    pub async fn list_sports(&self) -> ApiResult<Vec<Sport>> {
        self.get(&self.url("/sports")).await
    }

    pub async fn list_clubs(&self) -> ApiResult<Vec<Club>> {
        self.get(&self.url("/clubs")).await
    }

    pub async fn list_badges(&self) -> ApiResult<Vec<Badge>> {
        self.get(&self.url("/badges")).await
    }

    // -----------------------------------------------------------------------
    // Players
    // -----------------------------------------------------------------------

    pub async fn list_players(
        &self,
        query: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> ApiResult<PlayerPage> {
        let limit_s = limit.to_string();
        let offset_s = offset.to_string();
        let mut params = vec![("limit", limit_s.as_str()), ("offset", offset_s.as_str())];
        if let Some(q) = query.map(str::trim).filter(|q| !q.is_empty()) {
            params.push(("q", q));
        }
        let url = self.url_with_params("/players", &params)?;
        let raw: WirePlayerPage = self.get(&url).await?;
        Ok(PlayerPage {
            total: raw.total.unwrap_or(raw.players.len()),
            limit: raw.limit.unwrap_or(limit),
            offset: raw.offset.unwrap_or(offset),
            players: raw.players.into_iter().map(map_player).collect(),
        })
    }

    pub async fn get_player(&self, player_id: &str) -> ApiResult<Player> {
        let raw: WirePlayer = self.get(&self.url(&format!("/players/{player_id}"))).await?;
        Ok(map_player(raw))
    }

    pub async fn create_player(&self, name: &str) -> ApiResult<Player> {
        let url = self.url("/players");
        let raw: WirePlayer = self
            .send(self.request(Method::POST, &url).json(&CreatePlayerBody { name }), &url)
            .await?;
        Ok(map_player(raw))
    }

    // -----------------------------------------------------------------------
    // Matches
    // -----------------------------------------------------------------------

    pub async fn list_matches(
        &self,
        sport: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> ApiResult<Vec<MatchRow>> {
        let limit_s = limit.to_string();
        let offset_s = offset.to_string();
        let mut params = vec![("limit", limit_s.as_str()), ("offset", offset_s.as_str())];
        if let Some(sport) = sport {
            params.push(("sport", sport));
        }
        let url = self.url_with_params("/matches", &params)?;
        let raw: Vec<WireMatch> = self.get(&url).await?;
        Ok(raw.into_iter().map(|m| map_match(m).row()).collect())
    }

    pub async fn get_match(&self, match_id: &str) -> ApiResult<MatchDetail> {
        let raw: WireMatch = self.get(&self.url(&format!("/matches/{match_id}"))).await?;
        Ok(map_match(raw))
    }

    pub async fn record_sets(&self, match_id: &str, sets: &[SetScore]) -> ApiResult<()> {
        let url = self.url(&format!("/matches/{match_id}/sets"));
        let body = RecordSetsBody {
            sets: sets.iter().map(|s| [s.a, s.b]).collect(),
        };
        self.send_empty(self.request(Method::POST, &url).json(&body), &url)
            .await
    }

    /// WebSocket endpoint streaming snapshots of a single match.
    pub fn match_stream_url(&self, match_id: &str) -> String {
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        format!("{ws_base}{API_PREFIX}/matches/{match_id}/stream")
    }

    // -----------------------------------------------------------------------
    // Chat + comments
    // -----------------------------------------------------------------------

    pub async fn list_chat(&self, match_id: &str) -> ApiResult<Vec<ChatMessage>> {
        let raw: Vec<WireChatMessage> =
            self.get(&self.url(&format!("/matches/{match_id}/chat"))).await?;
        Ok(raw.into_iter().map(|m| map_chat(m, match_id)).collect())
    }

    pub async fn post_chat(&self, match_id: &str, body: &str) -> ApiResult<ChatMessage> {
        let url = self.url(&format!("/matches/{match_id}/chat"));
        let raw: WireChatMessage = self
            .send(self.request(Method::POST, &url).json(&PostChatBody { message: body }), &url)
            .await?;
        Ok(map_chat(raw, match_id))
    }

    pub async fn list_comments(&self, match_id: &str) -> ApiResult<Vec<MatchComment>> {
        let raw: WireCommentList =
            self.get(&self.url(&format!("/matches/{match_id}/comments"))).await?;
        Ok(raw
            .into_items()
            .into_iter()
            .map(|c| map_comment(c, match_id))
            .collect())
    }

    pub async fn post_comment(&self, match_id: &str, content: &str) -> ApiResult<MatchComment> {
        let url = self.url(&format!("/matches/{match_id}/comments"));
        let raw: WireComment = self
            .send(self.request(Method::POST, &url).json(&PostCommentBody { content }), &url)
            .await?;
        Ok(map_comment(raw, match_id))
    }

    pub async fn delete_comment(&self, match_id: &str, comment_id: &str) -> ApiResult<()> {
        let url = self.url(&format!("/matches/{match_id}/comments/{comment_id}"));
        self.send_empty(self.request(Method::DELETE, &url), &url).await
    }

    // -----------------------------------------------------------------------
    // Leaderboards
    // -----------------------------------------------------------------------

    pub async fn leaderboard(&self, sport: &str, limit: usize) -> ApiResult<Leaderboard> {
        let limit_s = limit.to_string();
        let url = self.url_with_params("/leaderboards", &[("sport", sport), ("limit", limit_s.as_str())])?;
        let raw: WireLeaderboard = self.get(&url).await?;
        Ok(map_leaderboard(raw, sport))
    }

    // -----------------------------------------------------------------------
    // Tournaments
    // -----------------------------------------------------------------------

    pub async fn list_tournaments(&self) -> ApiResult<Vec<TournamentSummary>> {
        let raw: Vec<WireTournament> = self.get(&self.url("/tournaments")).await?;
        Ok(raw.into_iter().map(map_tournament).collect())
    }

    pub async fn create_tournament(
        &self,
        sport_id: &str,
        name: &str,
        club_id: Option<&str>,
    ) -> ApiResult<TournamentSummary> {
        let url = self.url("/tournaments");
        let body = CreateTournamentBody { sport: sport_id, name, club_id };
        let raw: WireTournament = self
            .send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        let mut tournament = map_tournament(raw);
        if tournament.sport_id.is_empty() {
            tournament.sport_id = sport_id.to_string();
        }
        if tournament.name.is_empty() {
            tournament.name = name.to_string();
        }
        Ok(tournament)
    }

    pub async fn create_stage(&self, tournament_id: &str, court_count: u32) -> ApiResult<Stage> {
        let url = self.url(&format!("/tournaments/{tournament_id}/stages"));
        let body = CreateStageBody {
            stage_type: AMERICANO_STAGE_TYPE,
            config: StageConfig { court_count },
        };
        let raw: WireStage = self
            .send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        Ok(map_stage(raw, tournament_id))
    }

    /// Ask the backend to generate the Americano round robin for a stage.
    pub async fn schedule_americano_stage(
        &self,
        tournament_id: &str,
        stage_id: &str,
        player_ids: &[String],
        court_count: u32,
    ) -> ApiResult<Vec<StageScheduleMatch>> {
        let url = self.url(&format!("/tournaments/{tournament_id}/stages/{stage_id}/schedule"));
        let body = ScheduleBody { player_ids, court_count };
        let raw: WireScheduleResponse = self
            .send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        Ok(raw.matches.into_iter().map(map_schedule_match).collect())
    }

    pub async fn list_stage_matches(
        &self,
        tournament_id: &str,
        stage_id: &str,
    ) -> ApiResult<Vec<StageScheduleMatch>> {
        let url = self.url(&format!("/tournaments/{tournament_id}/stages/{stage_id}/matches"));
        let raw: Vec<WireScheduleMatch> = self.get(&url).await?;
        Ok(raw.into_iter().map(map_schedule_match).collect())
    }

    /// Create tournament → create Americano stage → schedule it.
    ///
    /// The calls run strictly in sequence; the first failure aborts the rest
    /// and is reported with the step it happened in. If the schedule call
    /// returns no matches the stage's match list is fetched instead.
    pub async fn create_americano(&self, request: &AmericanoRequest) -> ApiResult<AmericanoSchedule> {
        let tournament = self
            .create_tournament(&request.sport_id, &request.name, request.club_id.as_deref())
            .await
            .map_err(|e| americano_error(AmericanoStep::CreateTournament, e))?;

        let stage = self
            .create_stage(&tournament.id, request.court_count)
            .await
            .map_err(|e| americano_error(AmericanoStep::CreateStage, e))?;

        let mut matches = self
            .schedule_americano_stage(&tournament.id, &stage.id, &request.player_ids, request.court_count)
            .await
            .map_err(|e| americano_error(AmericanoStep::Schedule, e))?;

        if matches.is_empty() {
            matches = self
                .list_stage_matches(&tournament.id, &stage.id)
                .await
                .map_err(|e| americano_error(AmericanoStep::Schedule, e))?;
        }

        Ok(AmericanoSchedule { tournament, stage, matches })
    }

    // -----------------------------------------------------------------------
    // Auth
    // -----------------------------------------------------------------------

    pub async fn login(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        self.authenticate("/auth/login", username, password).await
    }

    pub async fn signup(&self, username: &str, password: &str) -> ApiResult<AuthSession> {
        self.authenticate("/auth/signup", username, password).await
    }

    async fn authenticate(&self, path: &str, username: &str, password: &str) -> ApiResult<AuthSession> {
        let url = self.url(path);
        let body = CredentialsBody { username, password };
        let raw: WireAuthResponse = self
            .send(self.request(Method::POST, &url).json(&body), &url)
            .await?;
        Ok(AuthSession {
            access_token: raw.access_token,
            refresh_token: raw.refresh_token,
        })
    }

    // -----------------------------------------------------------------------
    // Plumbing
    // -----------------------------------------------------------------------

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url)
    }

    fn url_with_params(&self, path: &str, params: &[(&str, &str)]) -> ApiResult<String> {
        let base = self.url(path);
        Url::parse_with_params(&base, params)
            .map(String::from)
            .map_err(|e| ApiError::Other(format!("invalid url {base}: {e}")))
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let mut builder = self.client.request(method, url).timeout(self.timeout);
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        if let Some(lang) = &self.accept_language {
            builder = builder.header(reqwest::header::ACCEPT_LANGUAGE, lang);
        }
        builder
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> ApiResult<T> {
        self.send(self.request(Method::GET, url), url).await
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, url: &str) -> ApiResult<T> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        check_status(response, url)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_owned()))
    }

    async fn send_empty(&self, builder: RequestBuilder, url: &str) -> ApiResult<()> {
        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_owned()))?;
        check_status(response, url).await.map(|_| ())
    }
}

async fn check_status(response: Response, url: &str) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let (code, detail) = parse_error_body(&body);
    Err(ApiError::Status {
        status: status.as_u16(),
        code,
        detail,
        url: url.to_owned(),
    })
}

fn parse_error_body(body: &str) -> (Option<String>, Option<String>) {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return (None, None);
    }
    match serde_json::from_str::<WireError>(trimmed) {
        Ok(err) => {
            let detail = err.detail.and_then(|d| match d {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });
            (err.code, detail)
        }
        Err(_) => (None, Some(trimmed.to_string())),
    }
}

fn americano_error(step: AmericanoStep, source: ApiError) -> ApiError {
    ApiError::Americano { step, source: Box::new(source) }
}

/// Decode one frame of the match stream.
pub fn parse_match_snapshot(text: &str) -> ApiResult<MatchDetail> {
    serde_json::from_str::<WireMatch>(text)
        .map(map_match)
        .map_err(|e| ApiError::Other(format!("invalid match snapshot: {e}")))
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn parse_time(s: Option<&str>) -> Option<DateTime<Utc>> {
    let s = s?.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    // Naive timestamps from the backend are UTC.
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn map_player(p: WirePlayer) -> Player {
    Player {
        name: p.name.unwrap_or_else(|| p.id.clone()),
        id: p.id,
        club_id: p.club_id,
        badges: p.badges,
    }
}

fn map_participants(raw: Vec<WireParticipant>) -> Vec<Participant> {
    let mut participants: Vec<Participant> = raw
        .into_iter()
        .filter_map(|p| {
            Some(Participant {
                side: Side::parse(&p.side)?,
                player_ids: p.player_ids,
            })
        })
        .collect();
    participants.sort_by_key(|p| p.side);
    participants
}

fn map_set(set: WireSet) -> SetScore {
    match set {
        WireSet::Pair([a, b]) => SetScore { a, b },
        WireSet::Keyed(map) => SetScore {
            a: map.get("A").copied().unwrap_or(0),
            b: map.get("B").copied().unwrap_or(0),
        },
    }
}

fn parse_status(s: &str) -> Option<MatchStatus> {
    match s.to_ascii_lowercase().as_str() {
        "scheduled" | "pending" => Some(MatchStatus::Scheduled),
        "in_progress" | "live" | "ongoing" => Some(MatchStatus::InProgress),
        "completed" | "final" | "finished" => Some(MatchStatus::Final),
        _ => None,
    }
}

/// Status when the backend omits it: recorded sets with a summary are final,
/// recorded sets without one are still being played. No sets means scheduled.
fn derive_status(sets: &[SetScore], has_summary: bool) -> MatchStatus {
    match (sets.is_empty(), has_summary) {
        (false, true) => MatchStatus::Final,
        (false, false) => MatchStatus::InProgress,
        (true, _) => MatchStatus::Scheduled,
    }
}

fn map_match(m: WireMatch) -> MatchDetail {
    let summary = m.summary.and_then(|s| {
        let sets: BTreeMap<Side, u16> = s
            .sets
            .into_iter()
            .filter_map(|(side, won)| Some((Side::parse(&side)?, won)))
            .collect();
        (!sets.is_empty()).then_some(sets)
    });
    let sets: Vec<SetScore> = m.sets.into_iter().map(map_set).collect();
    let status = m
        .status
        .as_deref()
        .and_then(parse_status)
        .unwrap_or_else(|| derive_status(&sets, summary.is_some()));

    MatchDetail {
        id: m.id,
        sport_id: m.sport.unwrap_or_default(),
        stage_id: m.stage_id,
        best_of: m.best_of,
        played_at: parse_time(m.played_at.as_deref()),
        location: m.location.filter(|l| !l.trim().is_empty()),
        is_friendly: m.is_friendly.unwrap_or(false),
        participants: map_participants(m.participants),
        summary,
        sets,
        status,
    }
}

fn map_chat(m: WireChatMessage, match_id: &str) -> ChatMessage {
    ChatMessage {
        id: m.id,
        match_id: m.match_id.unwrap_or_else(|| match_id.to_string()),
        username: m
            .username
            .or_else(|| m.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string()),
        user_id: m.user_id,
        body: m.message.unwrap_or_default(),
        created_at: parse_time(m.created_at.as_deref()),
    }
}

fn map_comment(c: WireComment, match_id: &str) -> MatchComment {
    MatchComment {
        id: c.id,
        match_id: c.match_id.unwrap_or_else(|| match_id.to_string()),
        username: c
            .username
            .or_else(|| c.user_id.clone())
            .unwrap_or_else(|| "anonymous".to_string()),
        user_id: c.user_id,
        content: c.content.unwrap_or_default(),
        created_at: parse_time(c.created_at.as_deref()),
    }
}

fn map_leaderboard(raw: WireLeaderboard, sport: &str) -> Leaderboard {
    let total = raw.total.unwrap_or(raw.leaders.len());
    let mut entries: Vec<LeaderboardEntry> = raw
        .leaders
        .into_iter()
        .enumerate()
        .map(|(idx, l)| LeaderboardEntry {
            rank: l.rank.unwrap_or(idx as u32 + 1),
            player_name: l.player_name.unwrap_or_else(|| l.player_id.clone()),
            player_id: l.player_id,
            rating: l.rating,
            sets_won: l.sets_won.unwrap_or(0),
            sets_lost: l.sets_lost.unwrap_or(0),
            matches_played: l.matches_played.unwrap_or(0),
        })
        .collect();
    entries.sort_by_key(|e| e.rank);
    Leaderboard {
        sport_id: raw.sport.unwrap_or_else(|| sport.to_string()),
        entries,
        total,
    }
}

fn map_tournament(t: WireTournament) -> TournamentSummary {
    TournamentSummary {
        id: t.id,
        sport_id: t.sport.unwrap_or_default(),
        name: t.name.unwrap_or_default(),
        club_id: t.club_id,
        created_by: t.created_by_user_id,
    }
}

fn map_stage(s: WireStage, tournament_id: &str) -> Stage {
    Stage {
        id: s.id,
        tournament_id: s.tournament_id.unwrap_or_else(|| tournament_id.to_string()),
        stage_type: s.stage_type.unwrap_or_else(|| AMERICANO_STAGE_TYPE.to_string()),
    }
}

fn map_schedule_match(m: WireScheduleMatch) -> StageScheduleMatch {
    StageScheduleMatch {
        id: m.id,
        round: m.round.unwrap_or(1),
        court: m.court.unwrap_or(1),
        participants: map_participants(m.participants),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    async fn api_for(server: &mockito::ServerGuard) -> ScorebookApi {
        ScorebookApi::new(server.url())
    }

    #[test]
    fn stream_url_swaps_scheme() {
        let api = ScorebookApi::new("https://scores.example.com/");
        assert_eq!(
            api.match_stream_url("m1"),
            "wss://scores.example.com/v0/matches/m1/stream"
        );
        let api = ScorebookApi::new("http://localhost:8000");
        assert_eq!(api.match_stream_url("m2"), "ws://localhost:8000/v0/matches/m2/stream");
    }

    #[test]
    fn blank_token_is_ignored() {
        let api = ScorebookApi::default().with_token(Some("   ".into()));
        assert!(!api.has_token());
        let api = api.with_token(Some("abc".into()));
        assert!(api.has_token());
    }

    #[test]
    fn status_is_derived_when_missing() {
        let detail = parse_match_snapshot(r#"{"id":"m1","sets":[[6,4]]}"#).unwrap();
        assert_eq!(detail.status, MatchStatus::InProgress);

        let detail =
            parse_match_snapshot(r#"{"id":"m1","sets":[{"A":6,"B":4}],"summary":{"sets":{"A":1,"B":0}}}"#)
                .unwrap();
        assert_eq!(detail.status, MatchStatus::Final);
        assert_eq!(detail.sets, vec![SetScore::new(6, 4)]);

        let detail = parse_match_snapshot(r#"{"id":"m1"}"#).unwrap();
        assert_eq!(detail.status, MatchStatus::Scheduled);

        let detail =
            parse_match_snapshot(r#"{"id":"m1","summary":{"sets":{"A":1,"B":0}}}"#).unwrap();
        assert_eq!(detail.status, MatchStatus::Scheduled);
    }

    #[test]
    fn explicit_status_wins_over_derivation() {
        let detail =
            parse_match_snapshot(r#"{"id":"m1","status":"in_progress","summary":{"sets":{"A":1}}}"#)
                .unwrap();
        assert_eq!(detail.status, MatchStatus::InProgress);
    }

    #[test]
    fn snapshot_maps_participants_and_time() {
        let detail = parse_match_snapshot(
            r#"{
                "id": "m9",
                "sport": "padel",
                "played_at": "2024-05-01T18:30:00",
                "participants": [
                    {"side": "B", "player_ids": ["p3", "p4"]},
                    {"side": "A", "player_ids": ["p1", "p2"]},
                    {"side": "Z", "player_ids": ["ghost"]}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(detail.sport_id, "padel");
        assert_eq!(detail.participants.len(), 2);
        assert_eq!(detail.participants[0].side, Side::A);
        assert_eq!(detail.row().players_on(Side::B), ["p3", "p4"]);
        assert_eq!(
            detail.played_at.map(|t| t.to_rfc3339()),
            Some("2024-05-01T18:30:00+00:00".to_string())
        );
    }

    #[test]
    fn bad_snapshot_is_an_error() {
        assert!(parse_match_snapshot("not json").is_err());
    }

    #[test]
    fn error_body_variants() {
        assert_eq!(
            parse_error_body(r#"{"code":"username_taken","detail":"taken"}"#),
            (Some("username_taken".into()), Some("taken".into()))
        );
        let (code, detail) = parse_error_body(r#"{"detail":[{"loc":["body","name"]}]}"#);
        assert!(code.is_none());
        assert!(detail.unwrap().contains("loc"));
        assert_eq!(parse_error_body("Bad Gateway"), (None, Some("Bad Gateway".into())));
        assert_eq!(parse_error_body(""), (None, None));
    }

    #[tokio::test]
    async fn list_sports_sends_token_and_language() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/sports")
            .match_header("authorization", "Bearer secret")
            .match_header("accept-language", "en-AU,en;q=0.9")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"padel","name":"Padel"},{"id":"bowling","name":"Bowling"}]"#)
            .create_async()
            .await;

        let mut api = api_for(&server).await.with_token(Some("secret".into()));
        api.set_accept_language(Some("en-AU,en;q=0.9".into()));
        let sports = api.list_sports().await.unwrap();

        mock.assert_async().await;
        assert_eq!(sports.len(), 2);
        assert_eq!(sports[1].name, "Bowling");
    }

    #[tokio::test]
    async fn create_then_fetch_player() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/v0/players")
            .match_body(Matcher::Json(json!({"name": "Ana"})))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"p7","name":"Ana"}"#)
            .create_async()
            .await;
        let fetch = server
            .mock("GET", "/v0/players/p7")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"id": "p7", "club_id": "c1", "badges": [{"id": "b1", "name": "Rookie"}]})
                    .to_string(),
            )
            .create_async()
            .await;

        let api = api_for(&server).await;
        let created = api.create_player("Ana").await.unwrap();
        assert_eq!(created.id, "p7");
        assert!(created.badges.is_empty());

        let player = api.get_player("p7").await.unwrap();
        create.assert_async().await;
        fetch.assert_async().await;
        assert_eq!(player.name, "p7");
        assert_eq!(player.club_id.as_deref(), Some("c1"));
        assert_eq!(player.badges[0].name, "Rookie");
        assert_eq!(player.badges[0].icon, None);
    }

    #[tokio::test]
    async fn list_badges_reads_icons() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/badges")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"b1","name":"Rookie","icon":"*"},{"id":"b2","name":"Veteran"}]"#)
            .create_async()
            .await;

        let badges = api_for(&server).await.list_badges().await.unwrap();
        assert_eq!(badges.len(), 2);
        assert_eq!(badges[0].icon.as_deref(), Some("*"));
        assert_eq!(badges[1].icon, None);
    }

    #[tokio::test]
    async fn list_matches_filters_by_sport() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v0/matches")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sport".into(), "disc golf".into()),
                Matcher::UrlEncoded("limit".into(), "25".into()),
                Matcher::UrlEncoded("offset".into(), "0".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!([{
                    "id": "m1",
                    "sport": "disc golf",
                    "participants": [{"side": "A", "player_ids": ["p1"]}],
                    "summary": {"sets": {"A": 1, "B": 0}}
                }])
                .to_string(),
            )
            .create_async()
            .await;

        let rows = api_for(&server)
            .await
            .list_matches(Some("disc golf"), 25, 0)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].sets_won(Side::A), Some(1));
    }

    #[tokio::test]
    async fn error_status_carries_code_and_detail() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v0/auth/login")
            .with_status(401)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":"invalid_credentials","detail":"Invalid credentials"}"#)
            .create_async()
            .await;

        let err = api_for(&server).await.login("ann", "wrong").await.unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.code(), Some("invalid_credentials"));
        assert_eq!(err.detail(), Some("Invalid credentials"));
        assert!(!err.is_network());
    }

    #[tokio::test]
    async fn login_returns_session() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v0/auth/login")
            .match_body(Matcher::Json(json!({"username": "ann", "password": "pw"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"tok","refresh_token":"ref"}"#)
            .create_async()
            .await;

        let session = api_for(&server).await.login("ann", "pw").await.unwrap();
        mock.assert_async().await;
        assert_eq!(session.access_token, "tok");
        assert_eq!(session.refresh_token.as_deref(), Some("ref"));
    }

    #[tokio::test]
    async fn record_sets_posts_pairs() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v0/matches/m1/sets")
            .match_body(Matcher::Json(json!({"sets": [[6, 4], [3, 6]]})))
            .with_status(204)
            .create_async()
            .await;

        api_for(&server)
            .await
            .record_sets("m1", &[SetScore::new(6, 4), SetScore::new(3, 6)])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn comments_accept_wrapped_list() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/matches/m1/comments")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"items":[{"id":"c1","user_id":"u1","content":"gg"}]}"#)
            .create_async()
            .await;

        let comments = api_for(&server).await.list_comments("m1").await.unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].match_id, "m1");
        assert_eq!(comments[0].username, "u1");
        assert_eq!(comments[0].content, "gg");
    }

    #[tokio::test]
    async fn leaderboard_ranks_missing_are_positional() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/v0/leaderboards")
            .match_query(Matcher::UrlEncoded("sport".into(), "padel".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"leaders": [
                    {"player_id": "p1", "player_name": "Ann", "rating": 1510.5},
                    {"player_id": "p2", "rating": 1490.0}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let board = api_for(&server).await.leaderboard("padel", 50).await.unwrap();
        assert_eq!(board.sport_id, "padel");
        assert_eq!(board.total, 2);
        assert_eq!(board.entries[0].rank, 1);
        assert_eq!(board.entries[1].rank, 2);
        assert_eq!(board.entries[1].player_name, "p2");
    }

    #[tokio::test]
    async fn americano_runs_three_calls_in_order() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/v0/tournaments")
            .match_body(Matcher::Json(json!({"sport": "padel", "name": "Friday"})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"t1","sport":"padel","name":"Friday"}"#)
            .create_async()
            .await;
        let stage = server
            .mock("POST", "/v0/tournaments/t1/stages")
            .match_body(Matcher::Json(json!({"type": "americano", "config": {"court_count": 1}})))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"s1","tournament_id":"t1","type":"americano"}"#)
            .create_async()
            .await;
        let schedule = server
            .mock("POST", "/v0/tournaments/t1/stages/s1/schedule")
            .match_body(Matcher::Json(
                json!({"player_ids": ["p1", "p2", "p3", "p4"], "court_count": 1}),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({"stage_id": "s1", "matches": [
                    {"id": "x2", "round": 2, "court": 1, "participants": [
                        {"side": "A", "player_ids": ["p1", "p3"]},
                        {"side": "B", "player_ids": ["p2", "p4"]}
                    ]},
                    {"id": "x1", "round": 1, "court": 1, "participants": [
                        {"side": "A", "player_ids": ["p1", "p2"]},
                        {"side": "B", "player_ids": ["p3", "p4"]}
                    ]}
                ]})
                .to_string(),
            )
            .create_async()
            .await;

        let request = AmericanoRequest {
            name: "Friday".into(),
            sport_id: "padel".into(),
            club_id: None,
            court_count: 1,
            player_ids: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
        };
        let result = api_for(&server).await.create_americano(&request).await.unwrap();

        create.assert_async().await;
        stage.assert_async().await;
        schedule.assert_async().await;
        assert_eq!(result.tournament.id, "t1");
        assert_eq!(result.stage.id, "s1");
        let rounds = result.rounds();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].1[0].id, "x1");
    }

    #[tokio::test]
    async fn americano_stops_at_first_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v0/tournaments")
            .with_status(403)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"forbidden"}"#)
            .create_async()
            .await;
        let stage = server
            .mock("POST", Matcher::Regex(r"^/v0/tournaments/.+/stages".into()))
            .expect(0)
            .create_async()
            .await;

        let request = AmericanoRequest {
            name: "Friday".into(),
            sport_id: "padel".into(),
            court_count: 1,
            player_ids: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
            ..Default::default()
        };
        let err = api_for(&server).await.create_americano(&request).await.unwrap_err();

        stage.assert_async().await;
        assert_eq!(err.status(), Some(403));
        assert!(matches!(
            err,
            ApiError::Americano { step: AmericanoStep::CreateTournament, .. }
        ));
    }

    #[tokio::test]
    async fn empty_schedule_falls_back_to_stage_matches() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v0/tournaments")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"t1"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v0/tournaments/t1/stages")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"s1"}"#)
            .create_async()
            .await;
        server
            .mock("POST", "/v0/tournaments/t1/stages/s1/schedule")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"stage_id":"s1"}"#)
            .create_async()
            .await;
        let list = server
            .mock("GET", "/v0/tournaments/t1/stages/s1/matches")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"id":"x1","round":1,"court":1}]"#)
            .create_async()
            .await;

        let request = AmericanoRequest {
            name: "Friday".into(),
            sport_id: "padel".into(),
            court_count: 1,
            player_ids: vec!["p1".into(), "p2".into(), "p3".into(), "p4".into()],
            ..Default::default()
        };
        let result = api_for(&server).await.create_americano(&request).await.unwrap();
        list.assert_async().await;
        assert_eq!(result.tournament.name, "Friday");
        assert_eq!(result.tournament.sport_id, "padel");
        assert_eq!(result.stage.stage_type, "americano");
        assert_eq!(result.matches.len(), 1);
    }
}
