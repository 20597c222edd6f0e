//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **JsonFileTimerStore**: 本番用のスナップショット保存先
//! - **InMemoryTimerStore**: テスト用
//! - **TracingNotifier** / **ChannelNotifier**

pub mod json_store;
pub mod memory_store;
pub mod notifiers;

pub use self::json_store::JsonFileTimerStore;
pub use self::memory_store::InMemoryTimerStore;
pub use self::notifiers::{ChannelNotifier, TracingNotifier};
