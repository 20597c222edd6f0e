//! BossTimer - 倒された boss 1 体分の動的な状態
//!
//! # 不変条件
//! - `respawn_at` は作成時に一度だけ設定され、以後変更されない
//! - 各 Warning の `sent` は false -> true に一度だけ遷移し、戻らない
//! - コールバックのハンドルは持たない（ScheduleTable 側が保持する）

use chrono::{DateTime, Duration, Utc};
use std::fmt;

use crate::domain::boss::LeadTime;
use crate::domain::ids::BossId;

/// A lead-time warning and whether it has already been sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Warning {
    pub lead_time: LeadTime,
    sent: bool,
}

impl Warning {
    pub fn new(lead_time: LeadTime) -> Self {
        Self {
            lead_time,
            sent: false,
        }
    }

    pub(crate) fn restored(lead_time: LeadTime, sent: bool) -> Self {
        Self { lead_time, sent }
    }

    pub fn is_sent(&self) -> bool {
        self.sent
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossTimer {
    id: BossId,
    respawn_at: DateTime<Utc>,
    warnings: Vec<Warning>,
}

impl BossTimer {
    /// 全ての警告が未送信の状態で作成
    pub fn new(id: BossId, respawn_at: DateTime<Utc>, plan: &[LeadTime]) -> Self {
        Self {
            id,
            respawn_at,
            warnings: plan.iter().copied().map(Warning::new).collect(),
        }
    }

    pub(crate) fn restore(id: BossId, respawn_at: DateTime<Utc>, warnings: Vec<Warning>) -> Self {
        Self {
            id,
            respawn_at,
            warnings,
        }
    }

    pub fn id(&self) -> &BossId {
        &self.id
    }

    pub fn respawn_at(&self) -> DateTime<Utc> {
        self.respawn_at
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// `respawn_at - lead_time`
    pub fn warning_deadline(&self, index: usize) -> Option<DateTime<Utc>> {
        self.warnings
            .get(index)
            .map(|w| self.respawn_at - w.lead_time.as_duration())
    }

    /// Mark a warning as sent.
    ///
    /// Returns the lead time only on the false -> true transition; an unknown
    /// index or an already-sent warning yields `None`.
    pub fn mark_warning_sent(&mut self, index: usize) -> Option<LeadTime> {
        let warning = self.warnings.get_mut(index)?;
        if warning.sent {
            return None;
        }
        warning.sent = true;
        Some(warning.lead_time)
    }

    pub fn is_warning_sent(&self, index: usize) -> bool {
        self.warnings.get(index).is_some_and(Warning::is_sent)
    }

    /// Indices of warnings still waiting to be sent, earliest deadline first.
    pub fn unsent_warnings(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.warnings.len())
            .filter(|&i| !self.warnings[i].sent)
            .collect();
        indices.sort_by_key(|&i| self.warning_deadline(i));
        indices
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.respawn_at <= now
    }

    pub fn remaining(&self, now: DateTime<Utc>) -> Remaining {
        Remaining::from_delta(self.respawn_at - now)
    }
}

/// Remaining は respawn までの残り時間（負にならない）
///
/// `0` は「今すぐ」を意味します。表示は `{h}h {m}m`（切り捨て）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Remaining(Duration);

impl Remaining {
    pub fn from_delta(delta: Duration) -> Self {
        Self(delta.max(Duration::zero()))
    }

    pub fn as_duration(self) -> Duration {
        self.0
    }

    pub fn as_millis(self) -> i64 {
        self.0.num_milliseconds()
    }

    pub fn is_due(self) -> bool {
        self.0 <= Duration::zero()
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hours = self.0.num_hours();
        let minutes = self.0.num_minutes() % 60;
        write!(f, "{hours}h {minutes}m")
    }
}
