//! Events - Notifier に渡すドメインイベント
//!
//! エンジンはメッセージではなくイベントを発行します。
//! 文面の組み立て（ローカライズ含む）は Notifier 側の責務です。

use serde::{Deserialize, Serialize};

use crate::domain::ids::BossId;

/// RespawnEvent はエンジンの状態遷移で発生したイベント
///
/// # イベント種類
/// - Registered: kill が登録された（「倒した」報告）
/// - WarningDue: respawn の lead time 前になった
/// - Respawned: boss が再出現した（終端）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RespawnEvent {
    Registered { boss: BossId, interval_hours: u32 },
    WarningDue { boss: BossId, lead_time_minutes: u32 },
    Respawned { boss: BossId },
}

impl RespawnEvent {
    pub fn boss(&self) -> &BossId {
        match self {
            RespawnEvent::Registered { boss, .. }
            | RespawnEvent::WarningDue { boss, .. }
            | RespawnEvent::Respawned { boss } => boss,
        }
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, RespawnEvent::WarningDue { .. })
    }

    pub fn is_respawn(&self) -> bool {
        matches!(self, RespawnEvent::Respawned { .. })
    }
}
