//! ScheduleTable - (boss, 種類) ごとの期限付きコールバック台帳
//!
//! 永続化はしません。起動時に TimerStore から Reconcile で再構築されます。
//!
//! # 実装詳細
//! - BinaryHeap を min-heap として使い、最も早い期限から取り出す
//! - `arm` は同じ (boss, kind) の既存ハンドルを置き換える
//! - 取り消しは lazy: heap のエントリは残し、handles に無い seq は pop 時に捨てる

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use chrono::{DateTime, Utc};

use crate::domain::BossId;

/// What a deadline fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DeadlineKind {
    /// Index into the timer's warnings.
    Warning(usize),
    Respawn,
}

/// Scheduled deadline entry for the priority queue.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    due_at: DateTime<Utc>,
    seq: u64,
    boss: BossId,
    kind: DeadlineKind,
}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering: earlier deadlines (then earlier arms) have higher priority
        other
            .due_at
            .cmp(&self.due_at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Handle {
    seq: u64,
    due_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
pub struct ScheduleTable {
    heap: BinaryHeap<Entry>,
    handles: HashMap<(BossId, DeadlineKind), Handle>,
    next_seq: u64,
}

impl ScheduleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `kind` for `boss` at `due_at`, replacing any existing handle.
    pub fn arm(&mut self, boss: &BossId, kind: DeadlineKind, due_at: DateTime<Utc>) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.handles
            .insert((boss.clone(), kind), Handle { seq, due_at });
        self.heap.push(Entry {
            due_at,
            seq,
            boss: boss.clone(),
            kind,
        });
    }

    /// Cancel a single handle. Returns true if one was armed.
    pub fn disarm(&mut self, boss: &BossId, kind: DeadlineKind) -> bool {
        self.handles.remove(&(boss.clone(), kind)).is_some()
    }

    /// Cancel every pending handle for `boss`.
    pub fn cancel_all(&mut self, boss: &BossId) -> usize {
        let before = self.handles.len();
        self.handles.retain(|(b, _), _| b != boss);
        before - self.handles.len()
    }

    pub fn is_armed(&self, boss: &BossId, kind: DeadlineKind) -> bool {
        self.handles.contains_key(&(boss.clone(), kind))
    }

    pub fn due_at(&self, boss: &BossId, kind: DeadlineKind) -> Option<DateTime<Utc>> {
        self.handles.get(&(boss.clone(), kind)).map(|h| h.due_at)
    }

    /// Armed deadlines for `boss`, earliest first.
    pub fn pending(&self, boss: &BossId) -> Vec<(DeadlineKind, DateTime<Utc>)> {
        let mut pending: Vec<_> = self
            .handles
            .iter()
            .filter(|((b, _), _)| b == boss)
            .map(|((_, kind), handle)| (*kind, handle.due_at, handle.seq))
            .collect();
        pending.sort_by_key(|(_, due_at, seq)| (*due_at, *seq));
        pending
            .into_iter()
            .map(|(kind, due_at, _)| (kind, due_at))
            .collect()
    }

    /// Earliest live deadline, discarding cancelled entries on the way.
    pub fn next_due(&mut self) -> Option<DateTime<Utc>> {
        self.drop_stale();
        self.heap.peek().map(|entry| entry.due_at)
    }

    /// Pop the earliest live deadline if it is due at `now`.
    pub fn pop_due(&mut self, now: DateTime<Utc>) -> Option<(BossId, DeadlineKind)> {
        self.drop_stale();
        if self.heap.peek()?.due_at > now {
            return None;
        }
        let entry = self.heap.pop()?;
        self.handles.remove(&(entry.boss.clone(), entry.kind));
        Some((entry.boss, entry.kind))
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    fn drop_stale(&mut self) {
        while let Some(entry) = self.heap.peek() {
            let live = self
                .handles
                .get(&(entry.boss.clone(), entry.kind))
                .is_some_and(|h| h.seq == entry.seq);
            if live {
                break; // Heap is sorted, so the first live entry is the earliest
            }
            self.heap.pop();
        }
    }
}
