//! Domain identifiers.
//!
//! BossId は boss の識別子です（例: `venatus`, `lady_daliah`）。
//! 永続化スナップショットのキーとしても使われるため、文字列そのものを
//! `#[serde(transparent)]` でシリアライズします。

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a boss (unique key of a BossTimer).
///
/// 正規形は小文字 + アンダースコア区切り。
/// 表示名（`LADY DALIAH`）からの変換は [`BossId::normalize`] を使います。
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BossId(String);

impl BossId {
    /// 正規形の文字列から BossId を作成
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// 表示名やユーザー入力を正規形に変換
    ///
    /// - 前後の空白を除去
    /// - 小文字化
    /// - 空白とハイフンを `_` に置換
    pub fn normalize(input: &str) -> Self {
        let value = input
            .trim()
            .to_lowercase()
            .split(|c: char| c.is_whitespace() || c == '-')
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join("_");
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name used by chat messages (`lady_daliah` -> `LADY DALIAH`).
    pub fn display_name(&self) -> String {
        self.0.replace('_', " ").to_uppercase()
    }
}

impl fmt::Display for BossId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BossId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
