use crate::state::messages::UiEvent;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::sync::mpsc;
use tokio::time::interval;

/// Polls the settings file and reports edits made outside this process,
/// e.g. `scorebook login` in another terminal.
pub struct SettingsWatcher {
    path: PathBuf,
    ui_events: mpsc::Sender<UiEvent>,
    period: Duration,
}

impl SettingsWatcher {
    pub fn new(path: PathBuf, ui_events: mpsc::Sender<UiEvent>) -> Self {
        Self { path, ui_events, period: Duration::from_secs(2) }
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    pub async fn run(self) {
        let mut last_seen = modified_at(&self.path);
        let mut ticker = interval(self.period);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let current = modified_at(&self.path);
            if current != last_seen {
                last_seen = current;
                if self.ui_events.send(UiEvent::SettingsFileChanged).await.is_err() {
                    break;
                }
            }
        }
    }
}

fn modified_at(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
