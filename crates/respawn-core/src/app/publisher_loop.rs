//! PublisherLoop - イベントを Notifier に配送
//!
//! # フロー
//! 1. mpsc からイベントを受け取る（発行順）
//! 2. Notifier::notify() で配送
//! 3. 失敗は warn ログに残して捨てる（状態は既に保存済み。リトライはしない）
//!
//! 送信側が全て drop されると、残りを配送し切ってから終了します。

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::domain::RespawnEvent;
use crate::ports::Notifier;

pub(crate) async fn run(
    mut events_rx: mpsc::UnboundedReceiver<RespawnEvent>,
    notifier: Arc<dyn Notifier>,
) {
    let mut delivered = 0usize;
    let mut failed = 0usize;
    while let Some(event) = events_rx.recv().await {
        match notifier.notify(&event).await {
            Ok(()) => delivered += 1,
            Err(e) => {
                failed += 1;
                warn!(boss = %event.boss(), error = %e, ?event, "notification delivery failed");
            }
        }
    }
    info!(delivered, failed, "publisher stopped");
}
