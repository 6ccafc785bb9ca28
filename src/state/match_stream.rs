use futures_util::StreamExt;
use log::{debug, warn};
use scorebook_api::MatchDetail;
use scorebook_api::client::{ScorebookApi, parse_match_snapshot};
use tokio::sync::mpsc;
use tokio::time::{Duration, interval, timeout};
use tokio_tungstenite::{connect_async, tungstenite::Message};

/// Polling cadence once the live socket is gone.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);
/// A handshake slower than this counts as a failed connect.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamCommand {
    Watch { match_id: String },
    Stop,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StreamMode {
    #[default]
    Idle,
    Live,
    Polling,
}

#[derive(Debug, Clone)]
pub enum StreamEvent {
    Mode { match_id: Option<String>, mode: StreamMode },
    Snapshot(MatchDetail),
    Error(String),
}

/// Follows one match at a time: WebSocket first, then 5 s polling of the
/// detail endpoint after the socket fails or closes. No reconnect attempts.
pub struct MatchStreamWorker {
    api: ScorebookApi,
    commands: mpsc::Receiver<StreamCommand>,
    events: mpsc::Sender<StreamEvent>,
    connect_timeout: Duration,
}

impl MatchStreamWorker {
    pub fn new(
        api: ScorebookApi,
        commands: mpsc::Receiver<StreamCommand>,
        events: mpsc::Sender<StreamEvent>,
    ) -> Self {
        Self { api, commands, events, connect_timeout: CONNECT_TIMEOUT }
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub async fn run(mut self) {
        let mut watching: Option<String> = None;
        loop {
            let Some(match_id) = watching.take() else {
                match self.commands.recv().await {
                    Some(StreamCommand::Watch { match_id }) => watching = Some(match_id),
                    Some(StreamCommand::Stop) => {}
                    None => return,
                }
                continue;
            };

            match self.follow(&match_id).await {
                Some(StreamCommand::Watch { match_id }) => watching = Some(match_id),
                Some(StreamCommand::Stop) => {
                    self.emit(StreamEvent::Mode { match_id: None, mode: StreamMode::Idle }).await;
                }
                None => return,
            }
        }
    }

    /// Returns the command that interrupted following, or None once the
    /// command channel closes.
    async fn follow(&mut self, match_id: &str) -> Option<StreamCommand> {
        let url = self.api.match_stream_url(match_id);
        debug!("opening match stream {url}");

        let connect = timeout(self.connect_timeout, connect_async(url.as_str()));
        let connected = tokio::select! {
            cmd = self.commands.recv() => return cmd,
            result = connect => result,
        };

        match connected {
            Ok(Ok((mut stream, _))) => {
                self.emit(StreamEvent::Mode {
                    match_id: Some(match_id.to_string()),
                    mode: StreamMode::Live,
                })
                .await;

                loop {
                    tokio::select! {
                        cmd = self.commands.recv() => return cmd,
                        inbound = stream.next() => {
                            match inbound {
                                Some(Ok(Message::Text(text))) => match parse_match_snapshot(&text) {
                                    Ok(detail) if detail.id == match_id => {
                                        self.emit(StreamEvent::Snapshot(detail)).await;
                                    }
                                    Ok(_) => {}
                                    Err(e) => self.emit(StreamEvent::Error(e.to_string())).await,
                                },
                                Some(Ok(Message::Close(_))) | None => {
                                    debug!("match stream {match_id} closed");
                                    break;
                                }
                                Some(Ok(_)) => {}
                                Some(Err(e)) => {
                                    self.emit(StreamEvent::Error(format!("match stream failed: {e}"))).await;
                                    break;
                                }
                            }
                        }
                    }
                }
            }
            Ok(Err(e)) => {
                warn!("match stream unavailable for {match_id}: {e}");
                self.emit(StreamEvent::Error(format!("live updates unavailable: {e}")))
                    .await;
            }
            Err(_) => {
                warn!("match stream handshake for {match_id} timed out");
                self.emit(StreamEvent::Error("live updates unavailable: handshake timed out".into()))
                    .await;
            }
        }

        self.emit(StreamEvent::Mode {
            match_id: Some(match_id.to_string()),
            mode: StreamMode::Polling,
        })
        .await;
        self.poll(match_id).await
    }

    async fn poll(&mut self, match_id: &str) -> Option<StreamCommand> {
        let mut ticker = interval(POLL_INTERVAL);
        loop {
            tokio::select! {
                cmd = self.commands.recv() => return cmd,
                _ = ticker.tick() => {
                    match self.api.get_match(match_id).await {
                        Ok(detail) => self.emit(StreamEvent::Snapshot(detail)).await,
                        Err(e) => self.emit(StreamEvent::Error(e.to_string())).await,
                    }
                }
            }
        }
    }

    async fn emit(&self, event: StreamEvent) {
        let _ = self.events.send(event).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::SinkExt;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    /// Accepts TCP connections and never answers the WebSocket handshake.
    async fn stalled_server() -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((tcp, _)) = listener.accept().await {
                held.push(tcp);
            }
        });
        addr
    }

    async fn next_event(events: &mut mpsc::Receiver<StreamEvent>) -> StreamEvent {
        timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("timed out waiting for stream event")
            .expect("stream worker hung up")
    }

    async fn next_non_error(events: &mut mpsc::Receiver<StreamEvent>) -> StreamEvent {
        loop {
            match next_event(events).await {
                StreamEvent::Error(_) => continue,
                other => return other,
            }
        }
    }

    #[tokio::test]
    async fn falls_back_to_polling_when_socket_is_refused() {
        let mut server = mockito::Server::new_async().await;
        let detail = server
            .mock("GET", "/v0/matches/m1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"m1","status":"in_progress","sets":[[3,2]]}"#)
            .create_async()
            .await;

        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (evt_tx, mut evt_rx) = mpsc::channel(16);
        let worker = MatchStreamWorker::new(ScorebookApi::new(server.url()), cmd_rx, evt_tx);
        let task = tokio::spawn(worker.run());

        cmd_tx.send(StreamCommand::Watch { match_id: "m1".into() }).await.unwrap();

        match next_non_error(&mut evt_rx).await {
            StreamEvent::Mode { match_id, mode } => {
                assert_eq!(match_id.as_deref(), Some("m1"));
                assert_eq!(mode, StreamMode::Polling);
            }
            other => panic!("expected polling mode, got {other:?}"),
        }
        match next_non_error(&mut evt_rx).await {
            StreamEvent::Snapshot(d) => {
                assert_eq!(d.id, "m1");
                assert!(d.is_live());
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
        detail.assert_async().await;

        cmd_tx.send(StreamCommand::Stop).await.unwrap();
        match next_non_error(&mut evt_rx).await {
            StreamEvent::Mode { mode, .. } => assert_eq!(mode, StreamMode::Idle),
            other => panic!("expected idle mode, got {other:?}"),
        }
        task.abort();
    }

    #[tokio::test]
    async fn live_snapshots_then_polling_after_close() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (tcp, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(tcp).await.unwrap();
            ws.send(Message::Text(r#"{"id":"other","sets":[[1,0]]}"#.into()))
                .await
                .unwrap();
            ws.send(Message::Text(r#"{"id":"m7","sets":[[6,4]]}"#.into()))
                .await
                .unwrap();
            ws.close(None).await.unwrap();
        });

        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (evt_tx, mut evt_rx) = mpsc::channel(16);
        let api = ScorebookApi::new(format!("http://{addr}"));
        let task = tokio::spawn(MatchStreamWorker::new(api, cmd_rx, evt_tx).run());

        cmd_tx.send(StreamCommand::Watch { match_id: "m7".into() }).await.unwrap();

        match next_event(&mut evt_rx).await {
            StreamEvent::Mode { mode, .. } => assert_eq!(mode, StreamMode::Live),
            other => panic!("expected live mode, got {other:?}"),
        }
        match next_event(&mut evt_rx).await {
            StreamEvent::Snapshot(d) => {
                assert_eq!(d.id, "m7", "snapshots for other matches are dropped");
                assert_eq!(d.sets.len(), 1);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }
        match next_non_error(&mut evt_rx).await {
            StreamEvent::Mode { mode, .. } => assert_eq!(mode, StreamMode::Polling),
            other => panic!("expected polling mode, got {other:?}"),
        }

        server.await.unwrap();
        task.abort();
    }

    #[tokio::test]
    async fn stop_interrupts_a_stalled_handshake() {
        let addr = stalled_server().await;
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (evt_tx, mut evt_rx) = mpsc::channel(16);
        let api = ScorebookApi::new(format!("http://{addr}"));
        let task = tokio::spawn(MatchStreamWorker::new(api, cmd_rx, evt_tx).run());

        cmd_tx.send(StreamCommand::Watch { match_id: "m1".into() }).await.unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
        cmd_tx.send(StreamCommand::Stop).await.unwrap();

        match next_non_error(&mut evt_rx).await {
            StreamEvent::Mode { match_id, mode } => {
                assert_eq!(match_id, None);
                assert_eq!(mode, StreamMode::Idle);
            }
            other => panic!("expected idle mode, got {other:?}"),
        }
        task.abort();
    }

    #[tokio::test]
    async fn stalled_handshake_falls_back_to_polling() {
        let addr = stalled_server().await;
        let (cmd_tx, cmd_rx) = mpsc::channel(4);
        let (evt_tx, mut evt_rx) = mpsc::channel(16);
        let api = ScorebookApi::new(format!("http://{addr}"));
        let worker = MatchStreamWorker::new(api, cmd_rx, evt_tx)
            .with_connect_timeout(Duration::from_millis(100));
        let task = tokio::spawn(worker.run());

        cmd_tx.send(StreamCommand::Watch { match_id: "m1".into() }).await.unwrap();

        match next_event(&mut evt_rx).await {
            StreamEvent::Error(message) => assert!(message.contains("timed out")),
            other => panic!("expected handshake error, got {other:?}"),
        }
        match next_event(&mut evt_rx).await {
            StreamEvent::Mode { match_id, mode } => {
                assert_eq!(match_id.as_deref(), Some("m1"));
                assert_eq!(mode, StreamMode::Polling);
            }
            other => panic!("expected polling mode, got {other:?}"),
        }
        task.abort();
    }
}
