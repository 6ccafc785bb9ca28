use crate::state::error_copy::tournament_error_message;
use crate::state::messages::{NetworkRequest, NetworkResponse};
use log::{debug, error};
use scorebook_api::client::{ApiError, ScorebookApi};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

/// Enough for name lookups on a club-sized roster.
const DIRECTORY_PLAYER_LIMIT: usize = 500;
const MATCH_PAGE_SIZE: usize = 50;
const LEADERBOARD_SIZE: usize = 100;
const SEARCH_PAGE_SIZE: usize = 100;

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

pub struct NetworkWorker {
    client: ScorebookApi,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    is_loading: Arc<AtomicBool>,
}

impl NetworkWorker {
    pub fn new(
        client: ScorebookApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client,
            requests,
            responses,
            is_loading: Arc::new(AtomicBool::new(false)),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if let NetworkRequest::UpdateSession { token, accept_language } = request {
                self.client.set_token(token);
                self.client.set_accept_language(accept_language);
                if self.responses.send(NetworkResponse::SessionUpdated).await.is_err() {
                    break;
                }
                continue;
            }

            self.start_loading_animation().await;
            let result = self.handle(request.clone()).await;
            debug!("network request complete");
            self.stop_loading_animation(result.is_ok()).await;

            let response = result.unwrap_or_else(|err| {
                let message = match &request {
                    NetworkRequest::CreateAmericano { .. } => tournament_error_message(&err),
                    _ => err.to_string(),
                };
                NetworkResponse::Failed { request, message }
            });

            if let Err(e) = self.responses.send(response).await {
                error!("Failed to send network response: {e}");
                break;
            }
        }
    }

    async fn handle(&self, request: NetworkRequest) -> Result<NetworkResponse, ApiError> {
        match request {
            NetworkRequest::LoadDirectory => self.handle_load_directory().await,
            NetworkRequest::LoadMatches { sport } => {
                debug!("loading matches (sport={sport:?})");
                let rows = self.client.list_matches(sport.as_deref(), MATCH_PAGE_SIZE, 0).await?;
                Ok(NetworkResponse::MatchesLoaded { rows })
            }
            NetworkRequest::LoadMatchDetail { match_id } => {
                debug!("loading match {match_id}");
                let detail = self.client.get_match(&match_id).await?;
                Ok(NetworkResponse::MatchDetailLoaded { detail })
            }
            NetworkRequest::LoadChat { match_id } => {
                let messages = self.client.list_chat(&match_id).await?;
                Ok(NetworkResponse::ChatLoaded { match_id, messages })
            }
            NetworkRequest::PostChat { match_id, body } => {
                let message = self.client.post_chat(&match_id, &body).await?;
                Ok(NetworkResponse::ChatPosted { message })
            }
            NetworkRequest::LoadComments { match_id } => {
                let comments = self.client.list_comments(&match_id).await?;
                Ok(NetworkResponse::CommentsLoaded { match_id, comments })
            }
            NetworkRequest::PostComment { match_id, body } => {
                let comment = self.client.post_comment(&match_id, &body).await?;
                Ok(NetworkResponse::CommentPosted { comment })
            }
            NetworkRequest::DeleteComment { match_id, comment_id } => {
                self.client.delete_comment(&match_id, &comment_id).await?;
                Ok(NetworkResponse::CommentDeleted { match_id, comment_id })
            }
            NetworkRequest::RecordSets { match_id, sets } => {
                debug!("recording {} sets for {match_id}", sets.len());
                self.client.record_sets(&match_id, &sets).await?;
                Ok(NetworkResponse::SetsRecorded { match_id })
            }
            NetworkRequest::LoadLeaderboard { sport } => {
                let leaderboard = self.client.leaderboard(&sport, LEADERBOARD_SIZE).await?;
                Ok(NetworkResponse::LeaderboardLoaded { leaderboard })
            }
            NetworkRequest::SearchPlayers { query } => {
                let page = self
                    .client
                    .list_players(Some(query.as_str()), SEARCH_PAGE_SIZE, 0)
                    .await?;
                Ok(NetworkResponse::PlayersLoaded { page })
            }
            NetworkRequest::CreatePlayer { name } => {
                let player = self.client.create_player(&name).await?;
                Ok(NetworkResponse::PlayerCreated { player })
            }
            NetworkRequest::LoadTournaments => {
                let tournaments = self.client.list_tournaments().await?;
                Ok(NetworkResponse::TournamentsLoaded { tournaments })
            }
            NetworkRequest::CreateAmericano { request } => {
                debug!(
                    "creating americano '{}' with {} players on {} courts",
                    request.name,
                    request.player_ids.len(),
                    request.court_count
                );
                let schedule = self.client.create_americano(&request).await?;
                Ok(NetworkResponse::AmericanoCreated { schedule })
            }
            NetworkRequest::UpdateSession { .. } => Ok(NetworkResponse::SessionUpdated),
        }
    }

    async fn handle_load_directory(&self) -> Result<NetworkResponse, ApiError> {
        debug!("loading sports, clubs and roster");
        let sports = self.client.list_sports().await?;
        // Clubs are decoration; a backend without them still works.
        let clubs = match self.client.list_clubs().await {
            Ok(clubs) => clubs,
            Err(e) => {
                debug!("clubs unavailable: {e}");
                Vec::new()
            }
        };
        let players = self.client.list_players(None, DIRECTORY_PLAYER_LIMIT, 0).await?;
        Ok(NetworkResponse::DirectoryLoaded { sports, clubs, players })
    }

    async fn start_loading_animation(&self) {
        self.is_loading.store(true, Ordering::Relaxed);

        let mut loading_state =
            LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged { loading_state })
            .await;

        let responses = self.responses.clone();
        let is_loading = self.is_loading.clone();

        tokio::spawn(async move {
            let mut spinner_index = 1;
            let mut interval = tokio::time::interval(Duration::from_millis(33));
            loop {
                interval.tick().await;
                if !is_loading.load(Ordering::Relaxed) {
                    break;
                }
                loading_state.spinner_char = SPINNER_CHARS[spinner_index];
                spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
                let _ = responses
                    .send(NetworkResponse::LoadingStateChanged { loading_state })
                    .await;
            }
        });
    }

    async fn stop_loading_animation(&self, is_ok: bool) {
        self.is_loading.store(false, Ordering::Relaxed);
        tokio::time::sleep(Duration::from_millis(15)).await;

        let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
        let _ = self
            .responses
            .send(NetworkResponse::LoadingStateChanged {
                loading_state: LoadingState { is_loading: false, spinner_char },
            })
            .await;
    }
}
