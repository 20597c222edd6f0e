//! App - アプリケーション層
//!
//! ports を組み合わせてタイマーのライフサイクルを実装します。
//!
//! # 主要コンポーネント
//! - **RespawnBuilder**: サービスの構築とワイヤリング
//! - **RespawnEngine**: 状態遷移（RegisterKill, 警告, 湧き, Reconcile）
//! - **ScheduleTable**: 期限付きコールバックの台帳
//! - **DeadlineLoop**: 期限が来たエントリを発火させる
//! - **PublisherLoop**: Outbox イベントの配送
//! - **RespawnService**: 上記をまとめた async なハンドル

pub mod builder;
pub mod deadline_loop;
pub mod engine;
pub mod publisher_loop;
pub mod schedule;
pub mod service;

// 主要な型を再エクスポート
pub use self::builder::{BuildError, RespawnBuilder};
pub use self::engine::{KillReceipt, RespawnEngine};
pub use self::schedule::{DeadlineKind, ScheduleTable};
pub use self::service::RespawnService;
