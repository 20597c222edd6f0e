use async_trait::async_trait;
use respawn_core::RespawnEvent;
use respawn_core::domain::NotifyError;
use respawn_core::ports::Notifier;
use tokio::io::{AsyncWriteExt, Stdout};
use tokio::sync::Mutex;

use crate::messages::render_event;

/// Broadcasts rendered events to stdout, one line each.
pub struct ConsoleNotifier {
    out: Mutex<Stdout>,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self {
            out: Mutex::new(tokio::io::stdout()),
        }
    }
}

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, event: &RespawnEvent) -> Result<(), NotifyError> {
        let line = format!("{}\n", render_event(event));
        let mut out = self.out.lock().await;
        out.write_all(line.as_bytes())
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        out.flush()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))
    }
}
