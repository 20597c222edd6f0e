//! DeadlineLoop - 期限が来たコールバックを発火させる唯一のスケジューラ
//!
//! # フロー
//! 1. エンジンをロックして `fire_due(now)`
//! 2. 発生したイベントをロックを持ったまま publisher に送る（順序を保つ）
//! 3. 次の期限まで sleep（最大 60 秒）、または wake / shutdown で起きる

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, Notify, mpsc, watch};
use tracing::{debug, info, warn};

use crate::app::engine::RespawnEngine;
use crate::domain::RespawnEvent;
use crate::ports::Clock;

/// Upper bound on a single sleep, so wall-clock jumps are noticed.
pub const MAX_SLEEP: Duration = Duration::from_secs(60);

pub(crate) async fn run(
    engine: Arc<Mutex<RespawnEngine>>,
    clock: Arc<dyn Clock>,
    events_tx: mpsc::UnboundedSender<RespawnEvent>,
    wake: Arc<Notify>,
    mut shutdown_rx: watch::Receiver<bool>,
) {
    info!("deadline loop started");
    loop {
        if *shutdown_rx.borrow() {
            break;
        }
        let (_, next) = run_pass(&engine, clock.as_ref(), &events_tx).await;
        let sleep_for = sleep_duration(next, clock.now());

        tokio::select! {
            _ = wake.notified() => {},
            _ = tokio::time::sleep(sleep_for) => {},
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
        }
    }
    info!("deadline loop stopped");
}

/// One scheduling pass. Returns how many transitions fired and the next
/// armed deadline.
pub(crate) async fn run_pass(
    engine: &Mutex<RespawnEngine>,
    clock: &dyn Clock,
    events_tx: &mpsc::UnboundedSender<RespawnEvent>,
) -> (usize, Option<DateTime<Utc>>) {
    let mut engine = engine.lock().await;
    let fired = engine.fire_due(clock.now());
    if fired > 0 {
        debug!(fired, "deadlines fired");
    }
    forward(events_tx, engine.take_events());
    (fired, engine.next_deadline())
}

pub(crate) fn forward(events_tx: &mpsc::UnboundedSender<RespawnEvent>, events: Vec<RespawnEvent>) {
    for event in events {
        if let Err(e) = events_tx.send(event) {
            warn!(boss = %e.0.boss(), "publisher stopped, dropping event");
        }
    }
}

fn sleep_duration(next: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Duration {
    match next {
        Some(due_at) => (due_at - now).to_std().unwrap_or(Duration::ZERO).min(MAX_SLEEP),
        None => MAX_SLEEP,
    }
}
