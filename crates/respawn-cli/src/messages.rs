//! User-facing text for events and command replies.

use respawn_core::domain::BossRoster;
use respawn_core::{BossId, KillReceipt, Remaining, RespawnError, RespawnEvent};

pub fn render_event(event: &RespawnEvent) -> String {
    match event {
        RespawnEvent::Registered {
            boss,
            interval_hours,
        } => format!(
            "⏳ {} marked dead. Respawn in {interval_hours} hours.",
            boss.display_name()
        ),
        RespawnEvent::WarningDue {
            boss,
            lead_time_minutes,
        } => format!(
            "⚠️ {} respawns within {lead_time_minutes} minutes!",
            boss.display_name()
        ),
        RespawnEvent::Respawned { boss } => {
            format!("💥 {} has respawned!", boss.display_name())
        }
    }
}

pub fn render_receipt(receipt: &KillReceipt) -> String {
    format!(
        "{} registered. Respawn at {} UTC ({}).",
        receipt.boss.display_name(),
        receipt.respawn_at.format("%Y-%m-%d %H:%M"),
        receipt.remaining
    )
}

pub fn render_remaining(boss: &BossId, remaining: Remaining) -> String {
    format!("⏳ {} respawns in {remaining}", boss.display_name())
}

pub fn render_all(entries: &[(BossId, Remaining)]) -> String {
    if entries.is_empty() {
        return "No active timers.".to_string();
    }
    entries
        .iter()
        .map(|(boss, remaining)| format!("{:<18} {remaining}", boss.display_name()))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_roster(roster: &BossRoster) -> String {
    roster
        .iter()
        .map(|spec| format!("{:<18} {}h", spec.id.display_name(), spec.interval_hours))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_error(err: &RespawnError) -> String {
    match err {
        RespawnError::UnknownBoss(name) => format!("❌ Unknown boss: {name}"),
        RespawnError::AlreadyActive { boss, respawn_at } => format!(
            "❌ {} is already dead. Respawn at {} UTC.",
            boss.display_name(),
            respawn_at.format("%Y-%m-%d %H:%M")
        ),
        RespawnError::NotActive(boss) => format!("❌ {} is not active.", boss.display_name()),
        RespawnError::IntervalOutOfRange {
            boss,
            interval_hours,
        } => format!(
            "❌ {} has an invalid respawn interval ({interval_hours}h).",
            boss.display_name()
        ),
    }
}
