//! OCRエンジン連携
//!
//! 画像を受け取り認識テキストを返す。エンジン本体は外部プロセス。

mod tesseract_cli;

pub use tesseract_cli::TesseractCli;

use image::GrayImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecognizeError {
    /// エンジンが見つからない/起動できない
    #[error("OCRエンジンを起動できません: {0}")]
    Unavailable(String),

    /// 起動はできたが認識に失敗
    #[error("OCR失敗: {0}")]
    Failed(String),
}

pub trait TextRecognizer {
    fn recognize(&self, image: &GrayImage) -> Result<String, RecognizeError>;
}
