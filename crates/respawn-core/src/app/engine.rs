//! RespawnEngine - boss タイマーの状態機械
//!
//! # ライフサイクル
//! `new` -> `reconcile(now)`（起動時に一度）-> 各種操作 -> `flush`（終了時）
//!
//! # 設計原則
//! - BossTimer はエンジンだけが所有する（TimerStore は永続化用の写しのみ）
//! - 状態遷移は「変更 -> Save -> イベント発行」の順
//! - 発火したコールバックは必ず現在の状態を再確認してから動く
//!   （取り消しとの競合は no-op に縮退させる）
//! - イベントは outbox に積むだけ。配送は呼び出し側（publisher_loop）が行う
//!
//! エンジン自体は同期的で、排他制御は持ちません。
//! 並行アクセスは RespawnService が 1 つの Mutex で直列化します。

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::app::schedule::{DeadlineKind, ScheduleTable};
use crate::domain::{
    BossId, BossRoster, BossTimer, LeadTime, Remaining, RespawnError, RespawnEvent, TimerSnapshot,
};
use crate::ports::TimerStore;

/// Result of an accepted kill registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KillReceipt {
    pub boss: BossId,
    pub respawn_at: DateTime<Utc>,
    pub remaining: Remaining,
    pub interval_hours: u32,
}

pub struct RespawnEngine {
    roster: BossRoster,
    plan: Vec<LeadTime>,
    store: Box<dyn TimerStore>,
    timers: BTreeMap<BossId, BossTimer>,
    schedule: ScheduleTable,
    outbox: Vec<RespawnEvent>,
    /// false after a load failed for a reason other than corruption.
    /// Saving would overwrite timers we could not read.
    store_writable: bool,
}

impl RespawnEngine {
    /// `plan` is the set of lead-time warnings given to every new timer.
    pub fn new(roster: BossRoster, plan: Vec<LeadTime>, store: Box<dyn TimerStore>) -> Self {
        Self {
            roster,
            plan,
            store,
            timers: BTreeMap::new(),
            schedule: ScheduleTable::new(),
            outbox: Vec::new(),
            store_writable: true,
        }
    }

    pub fn roster(&self) -> &BossRoster {
        &self.roster
    }

    pub fn warning_plan(&self) -> &[LeadTime] {
        &self.plan
    }

    /// Accept a "killed at `now`" fact.
    ///
    /// Warnings whose deadline has already passed (lead time >= interval) are
    /// marked sent before the first Save and emitted right after `Registered`.
    pub fn register_kill(
        &mut self,
        boss: &BossId,
        now: DateTime<Utc>,
    ) -> Result<KillReceipt, RespawnError> {
        if let Some(existing) = self.timers.get(boss) {
            return Err(RespawnError::AlreadyActive {
                boss: boss.clone(),
                respawn_at: existing.respawn_at(),
            });
        }
        let interval_hours = self
            .roster
            .get(boss)
            .ok_or_else(|| RespawnError::UnknownBoss(boss.to_string()))?
            .interval_hours;

        let respawn_at = now
            .checked_add_signed(chrono::Duration::hours(i64::from(interval_hours)))
            .ok_or_else(|| RespawnError::IntervalOutOfRange {
                boss: boss.clone(),
                interval_hours,
            })?;
        let mut timer = BossTimer::new(boss.clone(), respawn_at, &self.plan);

        let mut overdue = Vec::new();
        for index in timer.unsent_warnings() {
            if timer.warning_deadline(index).is_some_and(|d| d <= now)
                && let Some(lead) = timer.mark_warning_sent(index)
            {
                overdue.push(lead);
            }
        }

        let receipt = KillReceipt {
            boss: boss.clone(),
            respawn_at,
            remaining: timer.remaining(now),
            interval_hours,
        };

        for index in timer.unsent_warnings() {
            if let Some(deadline) = timer.warning_deadline(index) {
                self.schedule
                    .arm(boss, DeadlineKind::Warning(index), deadline);
            }
        }
        self.schedule.arm(boss, DeadlineKind::Respawn, respawn_at);
        self.timers.insert(boss.clone(), timer);
        self.persist();

        info!(boss = %boss, %respawn_at, interval_hours, "kill registered");
        self.outbox.push(RespawnEvent::Registered {
            boss: boss.clone(),
            interval_hours,
        });
        for lead in overdue {
            self.outbox.push(RespawnEvent::WarningDue {
                boss: boss.clone(),
                lead_time_minutes: lead.as_minutes(),
            });
        }

        Ok(receipt)
    }

    /// Time left until `boss` respawns (never negative).
    pub fn remaining(&self, boss: &BossId, now: DateTime<Utc>) -> Result<Remaining, RespawnError> {
        self.timers
            .get(boss)
            .map(|timer| timer.remaining(now))
            .ok_or_else(|| RespawnError::NotActive(boss.clone()))
    }

    /// Every active timer, soonest respawn first (ties by id).
    ///
    /// Pure read: call again to re-derive from the current state.
    pub fn all_remaining(
        &self,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = (BossId, Remaining)> + use<> {
        let mut entries: Vec<(BossId, Remaining)> = self
            .timers
            .values()
            .map(|timer| (timer.id().clone(), timer.remaining(now)))
            .collect();
        entries.sort_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| a_id.cmp(b_id)));
        entries.into_iter()
    }

    /// A warning deadline elapsed.
    ///
    /// Returns false (and does nothing) when the timer is gone or the warning
    /// was already sent.
    pub fn on_threshold_fired(&mut self, boss: &BossId, index: usize, now: DateTime<Utc>) -> bool {
        let Some(timer) = self.timers.get_mut(boss) else {
            debug!(boss = %boss, index, "stale warning callback, timer gone");
            return false;
        };
        let Some(lead) = timer.mark_warning_sent(index) else {
            debug!(boss = %boss, index, "warning already sent, skipping");
            return false;
        };
        self.schedule.disarm(boss, DeadlineKind::Warning(index));
        self.persist();

        info!(boss = %boss, lead_time_minutes = lead.as_minutes(), %now, "warning due");
        self.outbox.push(RespawnEvent::WarningDue {
            boss: boss.clone(),
            lead_time_minutes: lead.as_minutes(),
        });
        true
    }

    /// The respawn deadline elapsed. Terminal for this timer.
    pub fn on_respawn_fired(&mut self, boss: &BossId, now: DateTime<Utc>) -> bool {
        if self.timers.remove(boss).is_none() {
            debug!(boss = %boss, "stale respawn callback, timer gone");
            return false;
        }
        self.schedule.cancel_all(boss);
        self.persist();

        info!(boss = %boss, %now, "boss respawned");
        self.outbox.push(RespawnEvent::Respawned { boss: boss.clone() });
        true
    }

    /// Rebuild timers and schedules from the persisted snapshot.
    ///
    /// - `respawn_at <= now`: one `Respawned`, no warnings, timer removed
    /// - missed unsent warnings: the earliest is emitted now and marked sent,
    ///   any further missed ones are armed at `now`
    /// - future warnings and the respawn are armed at their deadlines
    ///
    /// Returns the number of timers left active.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> usize {
        let snapshot = match self.store.load() {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_corrupt() => {
                warn!(error = %e, "corrupt timer snapshot, starting with no active timers");
                TimerSnapshot::default()
            }
            Err(e) => {
                error!(
                    error = %e,
                    "cannot read timer snapshot, running without saving until restart"
                );
                self.store_writable = false;
                TimerSnapshot::default()
            }
        };

        let mut changed = false;
        for mut timer in snapshot.into_timers() {
            let boss = timer.id().clone();
            if self.timers.contains_key(&boss) {
                continue;
            }

            if timer.is_due(now) {
                info!(boss = %boss, respawn_at = %timer.respawn_at(), "respawned while offline");
                self.schedule.cancel_all(&boss);
                self.outbox.push(RespawnEvent::Respawned { boss });
                changed = true;
                continue;
            }

            let mut emitted_missed = false;
            for index in timer.unsent_warnings() {
                let Some(deadline) = timer.warning_deadline(index) else {
                    continue;
                };
                if deadline > now {
                    self.schedule
                        .arm(&boss, DeadlineKind::Warning(index), deadline);
                } else if !emitted_missed {
                    if let Some(lead) = timer.mark_warning_sent(index) {
                        self.outbox.push(RespawnEvent::WarningDue {
                            boss: boss.clone(),
                            lead_time_minutes: lead.as_minutes(),
                        });
                        emitted_missed = true;
                        changed = true;
                    }
                } else {
                    self.schedule.arm(&boss, DeadlineKind::Warning(index), now);
                }
            }
            self.schedule
                .arm(&boss, DeadlineKind::Respawn, timer.respawn_at());
            debug!(boss = %boss, respawn_at = %timer.respawn_at(), "timer re-armed");
            self.timers.insert(boss, timer);
        }

        if changed {
            self.persist();
        }
        info!(active = self.timers.len(), "reconciled timers");
        self.timers.len()
    }

    /// Run every deadline due at `now`. Returns how many transitions happened.
    pub fn fire_due(&mut self, now: DateTime<Utc>) -> usize {
        let mut fired = 0;
        while let Some((boss, kind)) = self.schedule.pop_due(now) {
            let transitioned = match kind {
                DeadlineKind::Warning(index) => self.on_threshold_fired(&boss, index, now),
                DeadlineKind::Respawn => self.on_respawn_fired(&boss, now),
            };
            if transitioned {
                fired += 1;
            }
        }
        fired
    }

    /// Earliest armed deadline.
    pub fn next_deadline(&mut self) -> Option<DateTime<Utc>> {
        self.schedule.next_due()
    }

    pub fn pending(&self, boss: &BossId) -> Vec<(DeadlineKind, DateTime<Utc>)> {
        self.schedule.pending(boss)
    }

    pub fn timer(&self, boss: &BossId) -> Option<&BossTimer> {
        self.timers.get(boss)
    }

    pub fn active_count(&self) -> usize {
        self.timers.len()
    }

    /// Drain events produced since the last call, in emission order.
    pub fn take_events(&mut self) -> Vec<RespawnEvent> {
        std::mem::take(&mut self.outbox)
    }

    /// Save the current state. Used on shutdown.
    pub fn flush(&self) -> bool {
        self.persist()
    }

    fn persist(&self) -> bool {
        if !self.store_writable {
            warn!("timer snapshot left untouched, it could not be read at startup");
            return false;
        }
        let snapshot = TimerSnapshot::from_timers(self.timers.values());
        match self.store.save(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "cannot persist timer snapshot");
                false
            }
        }
    }
}
