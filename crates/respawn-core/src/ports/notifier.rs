//! Notifier port - イベントをユーザー向けメッセージとして配送
//!
//! 配送はエンジンから見て fire-and-forget です。
//! 失敗は publisher_loop がログに残して握りつぶします（リトライしない）。

use async_trait::async_trait;

use crate::domain::{NotifyError, RespawnEvent};

/// Notifier はイベントをチャンネルに配送
///
/// # 実装
/// - TracingNotifier: ログに出すだけ
/// - ChannelNotifier: mpsc で別タスク（チャット adapter, テスト）に渡す
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, event: &RespawnEvent) -> Result<(), NotifyError>;
}
