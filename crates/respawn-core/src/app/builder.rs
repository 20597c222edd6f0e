//! RespawnBuilder - サービスの構築とワイヤリング
//!
//! # 学習ポイント
//! - Builder パターン（port の差し替えはテストでも本番でも同じ入口）
//! - 起動時検証（Fail-fast: 空の roster や store 未指定は build() で弾く）

use std::sync::Arc;

use crate::app::engine::RespawnEngine;
use crate::app::service::RespawnService;
use crate::config::RespawnConfig;
use crate::domain::{BossRoster, LeadTime, warning_plan};
use crate::impls::{JsonFileTimerStore, TracingNotifier};
use crate::ports::{Clock, Notifier, SystemClock, TimerStore};

/// # 使用例
/// ```ignore
/// let service = RespawnBuilder::from_config(&config)
///     .notifier(Arc::new(my_notifier))
///     .start()?;
/// ```
pub struct RespawnBuilder {
    roster: BossRoster,
    plan: Vec<LeadTime>,
    store: Option<Box<dyn TimerStore>>,
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("boss roster is empty")]
    EmptyRoster,

    #[error("no timer store configured")]
    MissingStore,
}

impl RespawnBuilder {
    /// Defaults: `SystemClock`, `TracingNotifier`, no warnings, no store.
    pub fn new(roster: BossRoster) -> Self {
        Self {
            roster,
            plan: Vec::new(),
            store: None,
            clock: Arc::new(SystemClock),
            notifier: Arc::new(TracingNotifier),
        }
    }

    /// Roster, warning plan and a JSON store at `config.state_path`.
    pub fn from_config(config: &RespawnConfig) -> Self {
        Self::new(config.roster())
            .warnings(&config.warning_minutes)
            .store(JsonFileTimerStore::new(config.state_path.clone()))
    }

    pub fn warnings(mut self, minutes: &[u32]) -> Self {
        self.plan = warning_plan(minutes);
        self
    }

    pub fn store(mut self, store: impl TimerStore + 'static) -> Self {
        self.store = Some(Box::new(store));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Engine only, not reconciled. Useful when driving it by hand.
    pub fn build_engine(self) -> Result<RespawnEngine, BuildError> {
        let (engine, _, _) = self.build_parts()?;
        Ok(engine)
    }

    /// Build the engine, reconcile it and spawn the service loops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(self) -> Result<RespawnService, BuildError> {
        let (engine, clock, notifier) = self.build_parts()?;
        Ok(RespawnService::start(engine, clock, notifier))
    }

    fn build_parts(
        self,
    ) -> Result<(RespawnEngine, Arc<dyn Clock>, Arc<dyn Notifier>), BuildError> {
        if self.roster.is_empty() {
            return Err(BuildError::EmptyRoster);
        }
        let store = self.store.ok_or(BuildError::MissingStore)?;
        let engine = RespawnEngine::new(self.roster, self.plan, store);
        Ok((engine, self.clock, self.notifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BossId, RespawnEvent};
    use crate::impls::{ChannelNotifier, InMemoryTimerStore};
    use crate::ports::FixedClock;

    fn roster() -> BossRoster {
        BossRoster::from_hours([("venatus", 10), ("ego", 21)])
    }

    #[test]
    fn build_requires_store() {
        let result = RespawnBuilder::new(roster()).build_engine();
        assert!(matches!(result, Err(BuildError::MissingStore)));
    }

    #[test]
    fn build_rejects_empty_roster() {
        let result = RespawnBuilder::new(BossRoster::new(Vec::new()))
            .store(InMemoryTimerStore::new())
            .build_engine();
        assert!(matches!(result, Err(BuildError::EmptyRoster)));
    }

    #[test]
    fn build_applies_warning_plan() {
        let engine = RespawnBuilder::new(roster())
            .warnings(&[5, 10, 5])
            .store(InMemoryTimerStore::new())
            .build_engine()
            .unwrap();
        assert_eq!(
            engine.warning_plan(),
            &[LeadTime::minutes(10), LeadTime::minutes(5)]
        );
    }

    #[test]
    fn from_config_uses_state_path() {
        let dir = tempfile::tempdir().unwrap();
        let config = RespawnConfig {
            state_path: dir.path().join("timers.json"),
            ..RespawnConfig::default()
        };
        let mut engine = RespawnBuilder::from_config(&config).build_engine().unwrap();
        engine
            .register_kill(&BossId::new("venatus"), chrono::DateTime::<chrono::Utc>::UNIX_EPOCH)
            .unwrap();
        assert!(config.state_path.exists());
    }

    #[tokio::test]
    async fn start_wires_notifier_and_clock() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let service = RespawnBuilder::new(roster())
            .warnings(&[10, 5])
            .store(InMemoryTimerStore::new())
            .clock(Arc::new(FixedClock::at_epoch()))
            .notifier(Arc::new(notifier))
            .start()
            .unwrap();

        let receipt = service.register_kill("Venatus").await.unwrap();
        assert_eq!(receipt.respawn_at.timestamp_millis(), 36_000_000);
        assert_eq!(
            rx.recv().await,
            Some(RespawnEvent::Registered {
                boss: BossId::new("venatus"),
                interval_hours: 10,
            })
        );
        service.shutdown().await;
    }
}
