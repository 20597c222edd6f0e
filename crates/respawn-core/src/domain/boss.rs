//! Boss - 静的な boss 設定（BossConfig）
//!
//! 起動時に一度だけ読み込まれ、以後は変更されません。

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::errors::RespawnError;
use crate::domain::ids::BossId;

/// 1 体の boss の静的設定
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BossSpec {
    pub id: BossId,
    pub interval_hours: u32,
}

impl BossSpec {
    pub fn new(id: impl Into<BossId>, interval_hours: u32) -> Self {
        Self {
            id: id.into(),
            interval_hours,
        }
    }

    /// Respawn interval after a kill.
    pub fn interval(&self) -> Duration {
        Duration::hours(i64::from(self.interval_hours))
    }
}

/// BossRoster は boss id -> respawn interval の静的マッピング
///
/// # 設計原則
/// - immutable（構築後は変更しない）
/// - 構築時の順序を保持（一覧表示用）
/// - 未知の id はここで `UnknownBoss` として弾く（エンジン本体には届かない）
#[derive(Debug, Clone, Default)]
pub struct BossRoster {
    specs: Vec<BossSpec>,
}

impl BossRoster {
    pub fn new(specs: Vec<BossSpec>) -> Self {
        Self { specs }
    }

    /// (name, hours) のペアから roster を構築
    pub fn from_hours<'a>(entries: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        let specs = entries
            .into_iter()
            .map(|(name, hours)| BossSpec::new(BossId::normalize(name), hours))
            .collect();
        Self { specs }
    }

    pub fn get(&self, id: &BossId) -> Option<&BossSpec> {
        self.specs.iter().find(|spec| &spec.id == id)
    }

    /// ユーザー入力の名前を解決
    ///
    /// 表示名（`LADY DALIAH`）も受け付けます。
    pub fn resolve(&self, name: &str) -> Result<&BossSpec, RespawnError> {
        let id = BossId::normalize(name);
        self.get(&id)
            .ok_or_else(|| RespawnError::UnknownBoss(name.trim().to_string()))
    }

    pub fn contains(&self, id: &BossId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BossSpec> {
        self.specs.iter()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// LeadTime は respawn の何分前に警告するか
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadTime(u32);

impl LeadTime {
    pub fn minutes(minutes: u32) -> Self {
        Self(minutes)
    }

    pub fn as_minutes(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> Duration {
        Duration::minutes(i64::from(self.0))
    }
}

/// Normalize a set of lead times: drop zeros, dedupe, order by earliest deadline
/// (largest lead time first).
pub fn warning_plan(minutes: &[u32]) -> Vec<LeadTime> {
    let mut plan: Vec<LeadTime> = minutes
        .iter()
        .copied()
        .filter(|m| *m > 0)
        .map(LeadTime::minutes)
        .collect();
    plan.sort_by(|a, b| b.cmp(a));
    plan.dedup();
    plan
}
