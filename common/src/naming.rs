//! 出力ファイル名の決定ルール
//!
//! - 日付トークン: 拡張子を除いたファイル名の固定位置（4文字目から8文字）
//!   例: "IMG_20190724_102855.jpg" → "20190724"
//! - 日付フォルダ: "Regal_Collections_<日付>"
//! - 店舗確定時: "<日付>_<店舗ID>.pdf"
//! - 店舗不明時: "<日付>_<日付>_<ランダムID>.pdf"

use crate::error::{Error, Result};
use rand::Rng;
use std::fmt;
use std::path::Path;

const DATE_OFFSET: usize = 4;
const DATE_LEN: usize = 8;
const BUCKET_PREFIX: &str = "Regal_Collections_";
const FALLBACK_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// ランダムIDの長さ
pub const FALLBACK_ID_LEN: usize = 6;

/// 8文字の日付トークン（暦としての妥当性は検証しない）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DateToken(String);

impl DateToken {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.chars().count() != DATE_LEN {
            return Err(Error::InvalidDate(value));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DateToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// ファイル名から日付トークンを取り出す
///
/// 拡張子は数えない。拡張子を除いた名前が短すぎる場合は `None`。
pub fn extract_date_token(file_name: &str) -> Option<DateToken> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let token: String = stem.chars().skip(DATE_OFFSET).take(DATE_LEN).collect();
    if token.chars().count() == DATE_LEN {
        Some(DateToken(token))
    } else {
        None
    }
}

/// [A-Z0-9] から6文字
pub fn fallback_id<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..FALLBACK_ID_LEN)
        .map(|_| FALLBACK_CHARSET[rng.gen_range(0..FALLBACK_CHARSET.len())] as char)
        .collect()
}

pub fn bucket_dir_name(date: &DateToken) -> String {
    format!("{}{}", BUCKET_PREFIX, date)
}

pub fn matched_file_name(date: &DateToken, location: &str) -> String {
    format!("{}_{}.pdf", date, location)
}

/// 日付が2回入るのは旧来の命名に合わせるため
pub fn fallback_file_name(date: &DateToken, fallback_id: &str) -> String {
    format!("{}_{}_{}.pdf", date, date, fallback_id)
}
