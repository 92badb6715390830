//! Tesseract CLI連携モジュール
//!
//! 画像を一時PNGに書き出し、`tesseract <png> stdout` の標準出力を認識結果とする。

use super::{RecognizeError, TextRecognizer};
use image::{GrayImage, ImageFormat};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

const TEMP_IMAGE_NAME: &str = "page.png";

#[derive(Debug, Clone)]
pub struct TesseractCli {
    command: PathBuf,
}

impl TesseractCli {
    pub fn new(command: impl Into<PathBuf>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn command(&self) -> &Path {
        &self.command
    }

    /// `--version` を実行して起動できるか確認
    pub fn version(&self) -> Result<String, RecognizeError> {
        let output = Command::new(&self.command)
            .arg("--version")
            .output()
            .map_err(|e| self.spawn_error(e))?;

        // 古いtesseractはバージョンをstderrに出す
        let text = if output.stdout.is_empty() {
            String::from_utf8_lossy(&output.stderr).to_string()
        } else {
            String::from_utf8_lossy(&output.stdout).to_string()
        };

        Ok(text.lines().next().unwrap_or_default().trim().to_string())
    }

    fn spawn_error(&self, e: std::io::Error) -> RecognizeError {
        match e.kind() {
            ErrorKind::NotFound | ErrorKind::PermissionDenied => RecognizeError::Unavailable(
                format!("{}: {}", self.command.display(), e),
            ),
            _ => RecognizeError::Failed(format!("{}: {}", self.command.display(), e)),
        }
    }

    fn run(&self, image_path: &Path) -> Result<String, RecognizeError> {
        let output = Command::new(&self.command)
            .arg(image_path)
            .arg("stdout")
            .output()
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognizeError::Failed(format!(
                "tesseract failed (code {:?}): {}",
                output.status.code(),
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

impl TextRecognizer for TesseractCli {
    fn recognize(&self, image: &GrayImage) -> Result<String, RecognizeError> {
        let temp_dir = tempfile::Builder::new()
            .prefix("slip-pdf-")
            .tempdir()
            .map_err(|e| RecognizeError::Failed(format!("一時フォルダ作成エラー: {}", e)))?;
        let image_path = temp_dir.path().join(TEMP_IMAGE_NAME);

        image
            .save_with_format(&image_path, ImageFormat::Png)
            .map_err(|e| RecognizeError::Failed(format!("一時画像の保存に失敗: {}", e)))?;

        let text = self.run(&image_path)?;
        debug!(chars = text.len(), "tesseract応答");
        Ok(text)
    }
}
