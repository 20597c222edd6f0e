//! Snapshot - BossTimer の永続化用プロジェクション
//!
//! 永続化されるのは (id, respawnAt, 各警告の sent フラグ) のみです。
//!
//! ```json
//! {
//!   "venatus": {
//!     "respawnAt": 36000000,
//!     "warnings": [
//!       { "leadTimeMinutes": 10, "sent": false },
//!       { "leadTimeMinutes": 5, "sent": false }
//!     ]
//!   }
//! }
//! ```

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::boss::LeadTime;
use crate::domain::ids::BossId;
use crate::domain::timer::{BossTimer, Warning};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WarningRecord {
    pub lead_time_minutes: u32,
    pub sent: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerRecord {
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub respawn_at: DateTime<Utc>,
    #[serde(default)]
    pub warnings: Vec<WarningRecord>,
}

impl From<&BossTimer> for TimerRecord {
    fn from(timer: &BossTimer) -> Self {
        Self {
            respawn_at: timer.respawn_at(),
            warnings: timer
                .warnings()
                .iter()
                .map(|w| WarningRecord {
                    lead_time_minutes: w.lead_time.as_minutes(),
                    sent: w.is_sent(),
                })
                .collect(),
        }
    }
}

impl TimerRecord {
    pub fn into_timer(self, id: BossId) -> BossTimer {
        let warnings = self
            .warnings
            .into_iter()
            .map(|w| Warning::restored(LeadTime::minutes(w.lead_time_minutes), w.sent))
            .collect();
        BossTimer::restore(id, self.respawn_at, warnings)
    }
}

/// 全アクティブタイマーの永続化スナップショット
///
/// BTreeMap なのでキー順が安定し、Save -> Load -> Save がバイト単位で一致します。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimerSnapshot {
    pub timers: BTreeMap<BossId, TimerRecord>,
}

impl TimerSnapshot {
    pub fn from_timers<'a>(timers: impl IntoIterator<Item = &'a BossTimer>) -> Self {
        Self {
            timers: timers
                .into_iter()
                .map(|t| (t.id().clone(), TimerRecord::from(t)))
                .collect(),
        }
    }

    pub fn into_timers(self) -> impl Iterator<Item = BossTimer> {
        self.timers
            .into_iter()
            .map(|(id, record)| record.into_timer(id))
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
