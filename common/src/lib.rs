//! Slip PDF Common Library
//!
//! OCRテキストからの店舗照合と出力ファイル名の決定ルール（I/Oなし）

pub mod error;
pub mod matcher;
pub mod naming;

pub use error::{Error, Result};
pub use matcher::{LocationEntry, LocationTable, MatchOutcome};
pub use naming::{
    bucket_dir_name, extract_date_token, fallback_file_name, fallback_id, matched_file_name,
    DateToken, FALLBACK_ID_LEN,
};
