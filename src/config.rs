use crate::error::{Result, SlipPdfError};
use crate::output::CollisionPolicy;
use crate::resolver::{RotationMode, DEFAULT_MAX_ATTEMPTS};
use serde::{Deserialize, Serialize};
use slip_pdf_common::LocationTable;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 入力写真フォルダ
    pub input_dir: PathBuf,
    /// 出力ルート（この下に日付フォルダを作る）
    pub output_dir: PathBuf,
    /// 対象拡張子（末尾一致、大文字小文字を区別）
    pub input_extension: String,
    /// 出力時に縦横を割る値
    pub reduction_factor: u32,
    pub pdf_dpi: f32,
    /// tesseract実行ファイル
    pub tesseract_cmd: PathBuf,
    /// 既知店舗テーブル（順序に意味あり）
    pub locations: LocationTable,
    pub rotation_mode: RotationMode,
    pub max_attempts: u32,
    pub on_existing: CollisionPolicy,
    pub log_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            input_extension: ".jpg".into(),
            reduction_factor: 3,
            pdf_dpi: 100.0,
            tesseract_cmd: default_tesseract_cmd(),
            locations: LocationTable::builtin(),
            rotation_mode: RotationMode::Fixed,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            on_existing: CollisionPolicy::Overwrite,
            log_dir: PathBuf::from("logs"),
        }
    }
}

// Windowsのインストーラは PATH に追加しない
#[cfg(windows)]
fn default_tesseract_cmd() -> PathBuf {
    PathBuf::from(r"C:\Program Files\Tesseract-OCR\tesseract.exe")
}

#[cfg(not(windows))]
fn default_tesseract_cmd() -> PathBuf {
    PathBuf::from("tesseract")
}

impl Config {
    /// 設定ファイルを読み込み（なければデフォルト）
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        let config: Config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            serde_json::from_str(&content)?
        } else if path.is_some() {
            return Err(SlipPdfError::Config(format!(
                "設定ファイルが見つかりません: {}",
                config_path.display()
            )));
        } else {
            Self::default()
        };

        Ok(config)
    }

    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(config_path)
    }

    /// デフォルト設定を書き出す（既存ファイルは読まずに置き換える）
    pub fn init_file(path: Option<&Path>) -> Result<(Self, PathBuf)> {
        let config = Self::default();
        let written = config.save(path)?;
        Ok((config, written))
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SlipPdfError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("slip-pdf").join("config.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.reduction_factor == 0 {
            return Err(SlipPdfError::Config("reduction_factor は1以上".into()));
        }
        if self.max_attempts == 0 {
            return Err(SlipPdfError::Config("max_attempts は1以上".into()));
        }
        if !(self.pdf_dpi.is_finite() && self.pdf_dpi > 0.0) {
            return Err(SlipPdfError::Config(format!("pdf_dpi が不正: {}", self.pdf_dpi)));
        }
        if self.input_extension.is_empty() {
            return Err(SlipPdfError::Config("input_extension が空です".into()));
        }
        self.locations.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.reduction_factor, 3);
        assert_eq!(config.max_attempts, 4);
        assert_eq!(config.input_extension, ".jpg");
    }

    #[test]
    fn test_validate_rejects_zero_factor() {
        let config = Config {
            reduction_factor: 0,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(SlipPdfError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_table() {
        let config = Config {
            locations: LocationTable::new(vec![]),
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(SlipPdfError::Common(_))));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"output_dir": "/srv/slips", "rotation_mode": "cumulative", "on_existing": "skip"}"#,
        )
        .unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/srv/slips"));
        assert_eq!(config.rotation_mode, RotationMode::Cumulative);
        assert_eq!(config.on_existing, CollisionPolicy::Skip);
        assert_eq!(config.reduction_factor, 3);
        assert_eq!(config.locations, LocationTable::builtin());
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            reduction_factor: 2,
            ..Config::default()
        };

        config.save(Some(path.as_path())).unwrap();
        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.reduction_factor, 2);
        assert_eq!(loaded.locations.entries()[0].pattern, "River Falls");
    }

    #[test]
    fn test_init_file_creates_missing_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new").join("config.json");

        let (config, written) = Config::init_file(Some(path.as_path())).unwrap();
        assert_eq!(written, path);
        assert_eq!(config.reduction_factor, 3);

        let loaded = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded.locations, LocationTable::builtin());
    }

    #[test]
    fn test_init_file_replaces_broken_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(
            Config::load(Some(path.as_path())),
            Err(SlipPdfError::JsonParse(_))
        ));

        Config::init_file(Some(path.as_path())).unwrap();
        assert!(Config::load(Some(path.as_path())).is_ok());
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let dir = tempdir().unwrap();
        let result = Config::load(Some(dir.path().join("none.json").as_path()));
        assert!(matches!(result, Err(SlipPdfError::Config(_))));
    }
}
