use crate::state::match_stream::StreamCommand;
use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use scorebook_api::{
    AmericanoRequest, AmericanoSchedule, ChatMessage, Club, Leaderboard, MatchComment,
    MatchDetail, MatchRow, Player, PlayerPage, SetScore, Sport, TournamentSummary,
};
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
pub enum NetworkRequest {
    /// Sports, clubs and the player roster used for name lookups.
    LoadDirectory,
    LoadMatches { sport: Option<String> },
    LoadMatchDetail { match_id: String },
    LoadChat { match_id: String },
    PostChat { match_id: String, body: String },
    LoadComments { match_id: String },
    PostComment { match_id: String, body: String },
    DeleteComment { match_id: String, comment_id: String },
    RecordSets { match_id: String, sets: Vec<SetScore> },
    LoadLeaderboard { sport: String },
    SearchPlayers { query: String },
    CreatePlayer { name: String },
    LoadTournaments,
    CreateAmericano { request: AmericanoRequest },
    /// Token or locale changed; applies to every later request.
    UpdateSession { token: Option<String>, accept_language: Option<String> },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    DirectoryLoaded { sports: Vec<Sport>, clubs: Vec<Club>, players: PlayerPage },
    MatchesLoaded { rows: Vec<MatchRow> },
    MatchDetailLoaded { detail: MatchDetail },
    ChatLoaded { match_id: String, messages: Vec<ChatMessage> },
    ChatPosted { message: ChatMessage },
    CommentsLoaded { match_id: String, comments: Vec<MatchComment> },
    CommentPosted { comment: MatchComment },
    CommentDeleted { match_id: String, comment_id: String },
    SetsRecorded { match_id: String },
    LeaderboardLoaded { leaderboard: Leaderboard },
    PlayersLoaded { page: PlayerPage },
    PlayerCreated { player: Player },
    TournamentsLoaded { tournaments: Vec<TournamentSummary> },
    AmericanoCreated { schedule: AmericanoSchedule },
    SessionUpdated,
    /// The request is echoed back so the UI can mark the right view as failed.
    Failed { request: NetworkRequest, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RefreshTick,
    SettingsFileChanged,
}

/// Work the app state asks the workers to do.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Network(NetworkRequest),
    Stream(StreamCommand),
}

pub async fn dispatch(
    effects: Vec<Effect>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    stream_commands: &mpsc::Sender<StreamCommand>,
) {
    for effect in effects {
        match effect {
            Effect::Network(request) => {
                let _ = network_requests.send(request).await;
            }
            Effect::Stream(command) => {
                let _ = stream_commands.send(command).await;
            }
        }
    }
}
