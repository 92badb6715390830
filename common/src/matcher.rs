//! 店舗照合モジュール
//!
//! OCRで読み取ったテキストに既知のキー（店舗名の一部や店舗番号）が
//! 含まれているかを調べ、正規化された店舗IDに変換する。
//!
//! テーブルの順序は設定の一部として扱う。複数のキーが一致した場合は
//! テーブル上で後にあるキーが勝つ。

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// テーブルの1行: 部分文字列 → 店舗ID
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntry {
    pub pattern: String,
    pub location: String,
}

impl LocationEntry {
    pub fn new(pattern: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            location: location.into(),
        }
    }
}

/// 既知店舗テーブル（順序付き、実行中は不変）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocationTable {
    entries: Vec<LocationEntry>,
}

/// 照合結果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// 店舗IDが確定
    Matched(String),
    /// どのキーも含まれていない
    Indeterminate,
    /// OCRエンジンが使えなかった
    RecognizerUnavailable,
}

impl MatchOutcome {
    pub fn location(&self) -> Option<&str> {
        match self {
            MatchOutcome::Matched(location) => Some(location),
            _ => None,
        }
    }

    pub fn is_matched(&self) -> bool {
        matches!(self, MatchOutcome::Matched(_))
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchOutcome::Matched(location) => write!(f, "{}", location),
            MatchOutcome::Indeterminate => write!(f, "INDETERMINATE"),
            MatchOutcome::RecognizerUnavailable => write!(f, "RECOGNIZER_UNAVAILABLE"),
        }
    }
}

impl Default for LocationTable {
    fn default() -> Self {
        Self::builtin()
    }
}

impl LocationTable {
    pub fn new(entries: Vec<LocationEntry>) -> Self {
        Self { entries }
    }

    /// 組み込みテーブル
    pub fn builtin() -> Self {
        Self::new(vec![
            LocationEntry::new("River Falls", "Regal_Cinemas_River_Falls"),
            LocationEntry::new("#1537", "Regal_Cinemas_River_Falls"),
            LocationEntry::new("New Albany", "Regal_Cinemas_New_Albany"),
            LocationEntry::new("#1522", "Regal_Cinemas_New_Albany"),
            LocationEntry::new("Hamburg", "Regal_Cinemas_Hamburg"),
            LocationEntry::new("#728", "Regal_Cinemas_Hamburg"),
            LocationEntry::new("Wilder", "Regal_Cinemas_Wilder"),
            LocationEntry::new("#1526", "Regal_Cinemas_Wilder"),
        ])
    }

    /// JSON文字列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        table.validate()?;
        Ok(table)
    }

    pub fn entries(&self) -> &[LocationEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 重複を除いた店舗IDの一覧（テーブル順）
    pub fn locations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !seen.contains(&entry.location.as_str()) {
                seen.push(&entry.location);
            }
        }
        seen
    }

    /// テキストを照合（後勝ち、早期終了しない）
    pub fn find_match(&self, text: &str) -> MatchOutcome {
        let mut outcome = MatchOutcome::Indeterminate;
        for entry in &self.entries {
            if text.contains(entry.pattern.as_str()) {
                outcome = MatchOutcome::Matched(entry.location.clone());
            }
        }
        outcome
    }

    /// 空キーと、ファイル名に使えない店舗IDを拒否
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            return Err(Error::Config("location table is empty".into()));
        }
        for entry in &self.entries {
            if entry.pattern.is_empty() {
                return Err(Error::Config(format!(
                    "empty pattern for location '{}'",
                    entry.location
                )));
            }
            if !is_valid_location_id(&entry.location) {
                return Err(Error::Config(format!(
                    "location '{}' cannot be used in a file name",
                    entry.location
                )));
            }
        }
        Ok(())
    }
}

/// 店舗IDとしてファイル名に埋め込めるか
pub fn is_valid_location_id(location: &str) -> bool {
    !location.trim().is_empty()
        && !location
            .chars()
            .any(|c| matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        && location != "."
        && location != ".."
}
