//! Errors - エラー型と分類
//!
//! どのエラーもプロセスにとって致命的ではありません。
//! - UnknownBoss / AlreadyActive / NotActive: 呼び出し側に返す（拒否）
//! - CorruptSnapshot: 空の状態で起動を続ける（warn ログ）
//! - NotifyFailure: ログに残して握りつぶす（リトライしない）

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::ids::BossId;

/// Errors surfaced to the command-handling layer.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RespawnError {
    #[error("unknown boss: {0}")]
    UnknownBoss(String),

    #[error("boss {boss} is already active (respawns at {respawn_at})")]
    AlreadyActive {
        boss: BossId,
        respawn_at: DateTime<Utc>,
    },

    #[error("boss {0} is not active")]
    NotActive(BossId),

    #[error("respawn interval of {interval_hours}h for {boss} is out of range")]
    IntervalOutOfRange { boss: BossId, interval_hours: u32 },
}

/// TimerStore の操作エラー
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("corrupt snapshot at {path}: {source}")]
    CorruptSnapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("cannot serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("snapshot io failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl StoreError {
    pub fn is_corrupt(&self) -> bool {
        matches!(self, StoreError::CorruptSnapshot { .. })
    }
}

/// Notifier の配送エラー（NotifyFailure）
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notifier channel closed")]
    Closed,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}
