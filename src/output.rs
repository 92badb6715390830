//! 出力先の決定
//!
//! `<出力ルート>/Regal_Collections_<日付>/` を作成し、照合結果からファイル名を決める。

use crate::error::{Result, SlipPdfError};
use clap::ValueEnum;
use rand::Rng;
use serde::{Deserialize, Serialize};
use slip_pdf_common::{
    bucket_dir_name, fallback_file_name, fallback_id, matched_file_name, DateToken, MatchOutcome,
};
use std::path::{Path, PathBuf};
use tracing::{debug, error, warn};

/// 出力先に同名ファイルがある場合の扱い
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// 上書き（従来動作）
    #[default]
    Overwrite,
    /// そのファイルをスキップ
    Skip,
    /// エラーにして停止
    Fail,
}

impl CollisionPolicy {
    /// 書き込んでよいか判定（false ならスキップ）
    pub fn permits_write(&self, path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(true);
        }
        match self {
            CollisionPolicy::Overwrite => {
                warn!(path = %path.display(), "既存ファイルを上書きします");
                Ok(true)
            }
            CollisionPolicy::Skip => {
                warn!(path = %path.display(), "既存ファイルがあるためスキップします");
                Ok(false)
            }
            CollisionPolicy::Fail => Err(SlipPdfError::OutputExists(path.display().to_string())),
        }
    }
}

/// 1ファイル分の出力先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDescriptor {
    pub dir: PathBuf,
    pub file_name: String,
    /// ランダムIDで命名したか
    pub fallback_named: bool,
}

impl OutputDescriptor {
    pub fn path(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

#[derive(Debug, Clone)]
pub struct OutputDeriver {
    base: PathBuf,
}

impl OutputDeriver {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    /// 日付フォルダのパス（作成はしない）
    pub fn bucket_dir(&self, date: &DateToken) -> PathBuf {
        self.base.join(bucket_dir_name(date))
    }

    pub fn derive(&self, date: &DateToken, outcome: &MatchOutcome) -> Result<OutputDescriptor> {
        self.derive_with_rng(date, outcome, &mut rand::thread_rng())
    }

    pub fn derive_with_rng<R: Rng + ?Sized>(
        &self,
        date: &DateToken,
        outcome: &MatchOutcome,
        rng: &mut R,
    ) -> Result<OutputDescriptor> {
        ensure_dir(&self.base)?;
        let descriptor = self.describe(date, outcome, rng);
        ensure_dir(&descriptor.dir)?;
        Ok(descriptor)
    }

    /// フォルダを作らずに出力先だけ決める（ドライラン用）
    pub fn describe<R: Rng + ?Sized>(
        &self,
        date: &DateToken,
        outcome: &MatchOutcome,
        rng: &mut R,
    ) -> OutputDescriptor {
        let dir = self.bucket_dir(date);
        let (file_name, fallback_named) = match outcome {
            MatchOutcome::Matched(location) => (matched_file_name(date, location), false),
            MatchOutcome::Indeterminate | MatchOutcome::RecognizerUnavailable => {
                error!("店舗名を特定できませんでした ({})", outcome);
                let id = fallback_id(rng);
                debug!(id = %id, "ランダムIDを生成");
                (fallback_file_name(date, &id), true)
            }
        };

        OutputDescriptor {
            dir,
            file_name,
            fallback_named,
        }
    }
}

/// 既にあればそのまま
fn ensure_dir(path: &Path) -> Result<()> {
    if path.is_dir() {
        return Ok(());
    }
    std::fs::create_dir_all(path).map_err(|source| SlipPdfError::DirectoryCreation {
        path: path.display().to_string(),
        source,
    })
}
