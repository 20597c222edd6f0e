//! Domain model (boss config, timers, snapshot projection, events, errors).

pub mod boss;
pub mod errors;
pub mod events;
pub mod ids;
pub mod snapshot;
pub mod timer;

pub use self::boss::{BossRoster, BossSpec, LeadTime, warning_plan};
pub use self::errors::{NotifyError, RespawnError, StoreError};
pub use self::events::RespawnEvent;
pub use self::ids::BossId;
pub use self::snapshot::{TimerRecord, TimerSnapshot, WarningRecord};
pub use self::timer::{BossTimer, Remaining, Warning};
