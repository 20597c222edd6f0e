//! TimerStore port - BossTimer の永続化（正本のスナップショット）
//!
//! # 実装
//! - JsonFileTimerStore（本番用、temp + rename による atomic write）
//! - InMemoryTimerStore（テスト用）

use crate::domain::{StoreError, TimerSnapshot};

/// TimerStore は boss id -> respawn 状態のスナップショットを保存・復元
///
/// # 設計原則
/// - Save は常に全体を書き込む（差分ではない）
/// - 書き込み途中のクラッシュで半端なファイルを残さない
/// - Load はスナップショットが無ければ空を返す
/// - 壊れていれば `StoreError::CorruptSnapshot`（呼び出し側は空として続行）
pub trait TimerStore: Send + Sync {
    fn load(&self) -> Result<TimerSnapshot, StoreError>;

    fn save(&self, snapshot: &TimerSnapshot) -> Result<(), StoreError>;
}
