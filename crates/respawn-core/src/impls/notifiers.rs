//! Notifier 実装
//!
//! - TracingNotifier: イベントを info ログに出すだけ（adapter 未接続時のデフォルト）
//! - ChannelNotifier: イベントを mpsc で受信側に渡す

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::info;

use crate::domain::{NotifyError, RespawnEvent};
use crate::ports::Notifier;

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

#[async_trait]
impl Notifier for TracingNotifier {
    async fn notify(&self, event: &RespawnEvent) -> Result<(), NotifyError> {
        match event {
            RespawnEvent::Registered {
                boss,
                interval_hours,
            } => info!(boss = %boss, interval_hours, "boss marked dead"),
            RespawnEvent::WarningDue {
                boss,
                lead_time_minutes,
            } => info!(boss = %boss, lead_time_minutes, "respawn warning"),
            RespawnEvent::Respawned { boss } => info!(boss = %boss, "boss respawned"),
        }
        Ok(())
    }
}

/// ChannelNotifier は受信側が drop されると `NotifyError::Closed` を返す
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<RespawnEvent>,
}

impl ChannelNotifier {
    pub fn new(tx: mpsc::UnboundedSender<RespawnEvent>) -> Self {
        Self { tx }
    }

    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RespawnEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

#[async_trait]
impl Notifier for ChannelNotifier {
    async fn notify(&self, event: &RespawnEvent) -> Result<(), NotifyError> {
        self.tx.send(event.clone()).map_err(|_| NotifyError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BossId;

    #[tokio::test]
    async fn channel_notifier_forwards_events() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let event = RespawnEvent::Respawned {
            boss: BossId::new("ego"),
        };
        notifier.notify(&event).await.unwrap();
        assert_eq!(rx.recv().await, Some(event));
    }

    #[tokio::test]
    async fn channel_notifier_reports_closed_receiver() {
        let (notifier, rx) = ChannelNotifier::channel();
        drop(rx);
        let err = notifier
            .notify(&RespawnEvent::Respawned {
                boss: BossId::new("ego"),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::Closed));
    }
}
