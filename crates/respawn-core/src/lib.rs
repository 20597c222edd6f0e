//! respawn-core
//!
//! Boss respawn timers: kill registration, warnings before respawn,
//! durable snapshots and restart reconciliation.
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, boss, timer, snapshot, events, errors）
//! - **ports**: 抽象化レイヤー（Clock, TimerStore, Notifier）
//! - **app**: アプリケーションロジック（engine, schedule, deadline_loop, publisher_loop, service）
//! - **impls**: 実装（JSON ファイル store, in-memory store, notifier）
//! - **config**: TOML 設定

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;

pub use crate::app::{KillReceipt, RespawnBuilder, RespawnEngine, RespawnService};
pub use crate::config::{ConfigError, RespawnConfig};
pub use crate::domain::{BossId, Remaining, RespawnError, RespawnEvent};
