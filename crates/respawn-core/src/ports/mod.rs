//! Ports - 抽象化レイヤー
//!
//! エンジンが外部（時刻・ディスク・チャットプラットフォーム）に触れる境界です。

pub mod clock;
pub mod notifier;
pub mod timer_store;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::notifier::Notifier;
pub use self::timer_store::TimerStore;
