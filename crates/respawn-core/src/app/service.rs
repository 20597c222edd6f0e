//! RespawnService - エンジンを async な世界に接続する
//!
//! - エンジンは 1 つの Mutex の内側にだけ存在する（全ての変更を直列化）
//! - DeadlineLoop と PublisherLoop を spawn する
//! - コマンド層（チャット adapter）はこの型だけを使う

use std::sync::Arc;

use tokio::sync::{Mutex, Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::info;

use crate::app::deadline_loop::{self, forward};
use crate::app::engine::{KillReceipt, RespawnEngine};
use crate::app::publisher_loop;
use crate::domain::{BossId, BossRoster, Remaining, RespawnError, RespawnEvent};
use crate::ports::{Clock, Notifier};

/// Service handle.
/// - `shutdown()` でループを止め、最後のスナップショットを保存する
pub struct RespawnService {
    engine: Arc<Mutex<RespawnEngine>>,
    clock: Arc<dyn Clock>,
    events_tx: mpsc::UnboundedSender<RespawnEvent>,
    wake: Arc<Notify>,
    shutdown_tx: watch::Sender<bool>,
    deadline_join: JoinHandle<()>,
    publisher_join: JoinHandle<()>,
}

impl RespawnService {
    /// Reconcile the engine against `clock.now()` and spawn both loops.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(
        mut engine: RespawnEngine,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let active = engine.reconcile(clock.now());
        forward(&events_tx, engine.take_events());

        let engine = Arc::new(Mutex::new(engine));
        let wake = Arc::new(Notify::new());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let publisher_join = tokio::spawn(publisher_loop::run(events_rx, notifier));
        let deadline_join = tokio::spawn(deadline_loop::run(
            Arc::clone(&engine),
            Arc::clone(&clock),
            events_tx.clone(),
            Arc::clone(&wake),
            shutdown_rx,
        ));

        info!(active, "respawn service started");
        Self {
            engine,
            clock,
            events_tx,
            wake,
            shutdown_tx,
            deadline_join,
            publisher_join,
        }
    }

    /// RegisterKill at the current time. `name` may be a display name.
    pub async fn register_kill(&self, name: &str) -> Result<KillReceipt, RespawnError> {
        let receipt = {
            let mut engine = self.engine.lock().await;
            let boss = engine.roster().resolve(name)?.id.clone();
            let receipt = engine.register_kill(&boss, self.clock.now())?;
            forward(&self.events_tx, engine.take_events());
            receipt
        };
        self.wake.notify_one();
        Ok(receipt)
    }

    /// QueryRemaining at the current time.
    pub async fn remaining(&self, name: &str) -> Result<(BossId, Remaining), RespawnError> {
        let engine = self.engine.lock().await;
        let boss = engine.roster().resolve(name)?.id.clone();
        let remaining = engine.remaining(&boss, self.clock.now())?;
        Ok((boss, remaining))
    }

    /// QueryAll at the current time, soonest first.
    pub async fn all_remaining(&self) -> Vec<(BossId, Remaining)> {
        let engine = self.engine.lock().await;
        engine.all_remaining(self.clock.now()).collect()
    }

    pub async fn roster(&self) -> BossRoster {
        self.engine.lock().await.roster().clone()
    }

    /// Run one deadline pass right now, without waiting for the loop.
    pub async fn run_due(&self) -> usize {
        let (fired, _) =
            deadline_loop::run_pass(&self.engine, self.clock.as_ref(), &self.events_tx).await;
        fired
    }

    /// Ask the deadline loop to re-check the clock (e.g. after it was adjusted).
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    /// Stop the deadline loop, save once more and drain pending notifications.
    pub async fn shutdown(self) {
        let Self {
            engine,
            events_tx,
            shutdown_tx,
            deadline_join,
            publisher_join,
            ..
        } = self;

        let _ = shutdown_tx.send(true);
        let _ = deadline_join.await;
        engine.lock().await.flush();

        drop(events_tx);
        let _ = publisher_join.await;
        info!("respawn service stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NotifyError, TimerRecord, TimerSnapshot, WarningRecord, warning_plan};
    use crate::impls::{ChannelNotifier, InMemoryTimerStore};
    use crate::ports::FixedClock;
    use async_trait::async_trait;
    use chrono::Duration;
    use std::time::Duration as StdDuration;

    fn roster() -> BossRoster {
        BossRoster::from_hours([("venatus", 10), ("lady_daliah", 18)])
    }

    fn start_with(
        store: InMemoryTimerStore,
        clock: Arc<FixedClock>,
    ) -> (RespawnService, mpsc::UnboundedReceiver<RespawnEvent>) {
        let (notifier, rx) = ChannelNotifier::channel();
        let engine = RespawnEngine::new(roster(), warning_plan(&[10, 5]), Box::new(store));
        let service = RespawnService::start(engine, clock, Arc::new(notifier));
        (service, rx)
    }

    async fn recv(rx: &mut mpsc::UnboundedReceiver<RespawnEvent>) -> RespawnEvent {
        tokio::time::timeout(StdDuration::from_secs(5), rx.recv())
            .await
            .expect("event in time")
            .expect("channel open")
    }

    #[tokio::test]
    async fn register_kill_delivers_registered_event() {
        let clock = Arc::new(FixedClock::at_epoch());
        let (service, mut rx) = start_with(InMemoryTimerStore::new(), clock);

        let receipt = service.register_kill("LADY DALIAH").await.unwrap();
        assert_eq!(receipt.boss, BossId::new("lady_daliah"));
        assert_eq!(receipt.interval_hours, 18);
        assert_eq!(
            recv(&mut rx).await,
            RespawnEvent::Registered {
                boss: BossId::new("lady_daliah"),
                interval_hours: 18
            }
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn unknown_and_duplicate_kills_are_rejected() {
        let clock = Arc::new(FixedClock::at_epoch());
        let (service, _rx) = start_with(InMemoryTimerStore::new(), clock);

        assert_eq!(
            service.register_kill("dragon").await,
            Err(RespawnError::UnknownBoss("dragon".to_string()))
        );
        service.register_kill("venatus").await.unwrap();
        assert!(matches!(
            service.register_kill("venatus").await,
            Err(RespawnError::AlreadyActive { .. })
        ));
        service.shutdown().await;
    }

    #[tokio::test]
    async fn run_due_delivers_warnings_then_respawn() {
        let clock = Arc::new(FixedClock::at_epoch());
        let store = InMemoryTimerStore::new();
        let (service, mut rx) = start_with(store.clone(), Arc::clone(&clock));

        service.register_kill("venatus").await.unwrap();
        assert!(matches!(recv(&mut rx).await, RespawnEvent::Registered { .. }));

        clock.advance(Duration::milliseconds(35_000_000));
        let (_, remaining) = service.remaining("venatus").await.unwrap();
        assert_eq!(remaining.to_string(), "0h 16m");

        clock.advance(Duration::hours(1));
        service.run_due().await;
        assert_eq!(
            recv(&mut rx).await,
            RespawnEvent::WarningDue {
                boss: BossId::new("venatus"),
                lead_time_minutes: 10
            }
        );
        assert_eq!(
            recv(&mut rx).await,
            RespawnEvent::WarningDue {
                boss: BossId::new("venatus"),
                lead_time_minutes: 5
            }
        );
        assert_eq!(
            recv(&mut rx).await,
            RespawnEvent::Respawned {
                boss: BossId::new("venatus")
            }
        );
        assert!(store.snapshot().is_empty());
        assert_eq!(
            service.remaining("venatus").await,
            Err(RespawnError::NotActive(BossId::new("venatus")))
        );
        service.shutdown().await;
    }

    #[tokio::test]
    async fn deadline_loop_fires_after_wake() {
        let clock = Arc::new(FixedClock::at_epoch());
        let (service, mut rx) = start_with(InMemoryTimerStore::new(), Arc::clone(&clock));

        service.register_kill("venatus").await.unwrap();
        recv(&mut rx).await;

        clock.advance(Duration::hours(11));
        service.wake();

        let mut kinds = Vec::new();
        for _ in 0..3 {
            kinds.push(recv(&mut rx).await);
        }
        assert!(kinds[0].is_warning());
        assert!(kinds[1].is_warning());
        assert!(kinds[2].is_respawn());
        service.shutdown().await;
    }

    #[tokio::test]
    async fn start_reconciles_persisted_timers() {
        let clock = Arc::new(FixedClock::at_epoch());
        clock.advance(Duration::hours(1));
        let mut snapshot = TimerSnapshot::default();
        snapshot.timers.insert(
            BossId::new("venatus"),
            TimerRecord {
                respawn_at: clock.now() - Duration::minutes(5),
                warnings: vec![
                    WarningRecord {
                        lead_time_minutes: 10,
                        sent: false,
                    },
                    WarningRecord {
                        lead_time_minutes: 5,
                        sent: false,
                    },
                ],
            },
        );
        let store = InMemoryTimerStore::with_snapshot(snapshot);
        let (service, mut rx) = start_with(store.clone(), clock);

        assert_eq!(
            recv(&mut rx).await,
            RespawnEvent::Respawned {
                boss: BossId::new("venatus")
            }
        );
        assert!(store.snapshot().is_empty());
        assert!(service.all_remaining().await.is_empty());
        service.shutdown().await;
    }

    #[tokio::test]
    async fn all_remaining_is_sorted() {
        let clock = Arc::new(FixedClock::at_epoch());
        let (service, _rx) = start_with(InMemoryTimerStore::new(), clock);

        service.register_kill("lady_daliah").await.unwrap();
        service.register_kill("venatus").await.unwrap();

        let ids: Vec<String> = service
            .all_remaining()
            .await
            .into_iter()
            .map(|(id, _)| id.to_string())
            .collect();
        assert_eq!(ids, vec!["venatus", "lady_daliah"]);
        service.shutdown().await;
    }

    #[tokio::test]
    async fn concurrent_kills_for_same_boss_accept_exactly_one() {
        let clock = Arc::new(FixedClock::at_epoch());
        let (service, _rx) = start_with(InMemoryTimerStore::new(), clock);
        let service = Arc::new(service);

        let mut joins = Vec::new();
        for _ in 0..8 {
            let service = Arc::clone(&service);
            joins.push(tokio::spawn(async move {
                service.register_kill("venatus").await.is_ok()
            }));
        }
        let mut accepted = 0;
        for join in joins {
            if join.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
    }

    struct DownNotifier;

    #[async_trait]
    impl Notifier for DownNotifier {
        async fn notify(&self, _event: &RespawnEvent) -> Result<(), NotifyError> {
            Err(NotifyError::Delivery("channel unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn notifier_failure_does_not_block_state() {
        let clock = Arc::new(FixedClock::at_epoch());
        let store = InMemoryTimerStore::new();
        let engine = RespawnEngine::new(roster(), warning_plan(&[10, 5]), Box::new(store.clone()));
        let service = RespawnService::start(engine, clock.clone(), Arc::new(DownNotifier));

        service.register_kill("venatus").await.unwrap();
        clock.advance(Duration::minutes(592));
        service.run_due().await;
        assert!(store.snapshot().timers[&BossId::new("venatus")].warnings[0].sent);

        clock.advance(Duration::minutes(8));
        service.run_due().await;
        assert!(store.snapshot().is_empty());
        service.shutdown().await;
    }

    #[tokio::test]
    async fn shutdown_flushes_snapshot() {
        let clock = Arc::new(FixedClock::at_epoch());
        let store = InMemoryTimerStore::new();
        let (service, _rx) = start_with(store.clone(), clock);
        service.register_kill("venatus").await.unwrap();
        let saves = store.saves();

        service.shutdown().await;
        assert_eq!(store.saves(), saves + 1);
        assert_eq!(store.snapshot().len(), 1);
    }
}
