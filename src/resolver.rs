//! 回転リトライによる店舗判定
//!
//! 画像を270°回転させてOCR → 照合、を最大4回まで繰り返す。
//! 店舗が確定した時点で打ち切り、その回転画像を返す。

use crate::recognizer::{RecognizeError, TextRecognizer};
use clap::ValueEnum;
use image::imageops;
use image::GrayImage;
use serde::{Deserialize, Serialize};
use slip_pdf_common::{LocationTable, MatchOutcome};
use tracing::{debug, error, info, warn};

pub const DEFAULT_MAX_ATTEMPTS: u32 = 4;

/// 回転のかけ方
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationMode {
    /// 毎回、元画像を270°回転（従来動作）
    #[default]
    Fixed,
    /// 前回の回転画像をさらに270°回転（4回で全方向）
    Cumulative,
}

/// 判定結果
#[derive(Debug)]
pub struct Resolution {
    /// 保存対象の画像
    pub image: GrayImage,
    pub outcome: MatchOutcome,
    /// OCR呼び出し回数
    pub attempts: u32,
    /// 最後に得られた認識テキスト
    pub text: String,
}

pub struct Resolver<'a> {
    table: &'a LocationTable,
    recognizer: &'a dyn TextRecognizer,
    mode: RotationMode,
    max_attempts: u32,
}

impl<'a> Resolver<'a> {
    pub fn new(table: &'a LocationTable, recognizer: &'a dyn TextRecognizer) -> Self {
        Self {
            table,
            recognizer,
            mode: RotationMode::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    pub fn with_mode(mut self, mode: RotationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// 色情報を除いた画像から店舗を判定
    pub fn resolve(&self, image: GrayImage) -> Resolution {
        let mut last: Option<GrayImage> = None;
        let mut last_text = String::new();

        for attempt in 1..=self.max_attempts {
            let source = match (self.mode, &last) {
                (RotationMode::Cumulative, Some(prev)) => prev,
                _ => &image,
            };
            info!(attempt, "画像を回転中...");
            let rotated = imageops::rotate270(source);

            info!(attempt, "OCR実行中...");
            let text = match self.recognizer.recognize(&rotated) {
                Ok(text) => text,
                Err(RecognizeError::Unavailable(msg)) => {
                    error!("{}", msg);
                    return Resolution {
                        image,
                        outcome: MatchOutcome::RecognizerUnavailable,
                        attempts: attempt,
                        text: String::new(),
                    };
                }
                Err(RecognizeError::Failed(msg)) => {
                    warn!(attempt, "{}", msg);
                    String::new()
                }
            };
            debug!(attempt, "認識テキスト:\n{}", text);

            let outcome = self.table.find_match(&text);
            if outcome.is_matched() {
                info!(attempt, location = %outcome, "店舗を特定");
                return Resolution {
                    image: rotated,
                    outcome,
                    attempts: attempt,
                    text,
                };
            }

            info!(attempt, "一致なし");
            last = Some(rotated);
            last_text = text;
        }

        Resolution {
            image: last.unwrap_or(image),
            outcome: MatchOutcome::Indeterminate,
            attempts: self.max_attempts,
            text: last_text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// 呼び出し順に応答を返すOCR
    struct ScriptedRecognizer {
        responses: Vec<Result<String, ()>>,
        calls: Cell<usize>,
        sizes: RefCell<Vec<(u32, u32)>>,
    }

    impl ScriptedRecognizer {
        fn new(responses: Vec<&str>) -> Self {
            Self {
                responses: responses.into_iter().map(|s| Ok(s.to_string())).collect(),
                calls: Cell::new(0),
                sizes: RefCell::new(Vec::new()),
            }
        }

        fn unavailable() -> Self {
            Self {
                responses: vec![Err(())],
                calls: Cell::new(0),
                sizes: RefCell::new(Vec::new()),
            }
        }
    }

    impl TextRecognizer for ScriptedRecognizer {
        fn recognize(&self, image: &GrayImage) -> Result<String, RecognizeError> {
            let n = self.calls.get();
            self.calls.set(n + 1);
            self.sizes.borrow_mut().push(image.dimensions());
            match self.responses.get(n).or(self.responses.last()) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(())) => Err(RecognizeError::Unavailable("tesseract not found".into())),
                None => Ok(String::new()),
            }
        }
    }

    struct FailingRecognizer;

    impl TextRecognizer for FailingRecognizer {
        fn recognize(&self, _image: &GrayImage) -> Result<String, RecognizeError> {
            Err(RecognizeError::Failed("exit 1".into()))
        }
    }

    fn image() -> GrayImage {
        GrayImage::new(30, 10)
    }

    #[test]
    fn test_no_match_after_four_attempts() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::new(vec!["nothing useful"]);
        let res = Resolver::new(&table, &ocr).resolve(image());

        assert_eq!(ocr.calls.get(), 4);
        assert_eq!(res.attempts, 4);
        assert_eq!(res.outcome, MatchOutcome::Indeterminate);
        assert_eq!(res.text, "nothing useful");
        // 最後の回転画像を返す
        assert_eq!(res.image.dimensions(), (10, 30));
    }

    #[test]
    fn test_stops_on_first_match() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::new(vec!["garbage", "...Hamburg...", "Wilder"]);
        let res = Resolver::new(&table, &ocr).resolve(image());

        assert_eq!(ocr.calls.get(), 2);
        assert_eq!(res.attempts, 2);
        assert_eq!(res.outcome.location(), Some("Regal_Cinemas_Hamburg"));
        assert_eq!(res.image.dimensions(), (10, 30));
    }

    #[test]
    fn test_fixed_mode_rotates_source_each_time() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::new(vec![""]);
        Resolver::new(&table, &ocr).resolve(image());

        assert_eq!(*ocr.sizes.borrow(), vec![(10, 30); 4]);
    }

    #[test]
    fn test_cumulative_mode_covers_all_orientations() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::new(vec![""]);
        let res = Resolver::new(&table, &ocr)
            .with_mode(RotationMode::Cumulative)
            .resolve(image());

        assert_eq!(
            *ocr.sizes.borrow(),
            vec![(10, 30), (30, 10), (10, 30), (30, 10)]
        );
        // 4回転で元の向きに戻る
        assert_eq!(res.image.dimensions(), (30, 10));
    }

    #[test]
    fn test_unavailable_returns_original_image() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::unavailable();
        let res = Resolver::new(&table, &ocr).resolve(image());

        assert_eq!(ocr.calls.get(), 1);
        assert_eq!(res.outcome, MatchOutcome::RecognizerUnavailable);
        assert_eq!(res.image.dimensions(), (30, 10));
    }

    #[test]
    fn test_failed_recognition_counts_as_no_match() {
        let table = LocationTable::builtin();
        let res = Resolver::new(&table, &FailingRecognizer).resolve(image());

        assert_eq!(res.outcome, MatchOutcome::Indeterminate);
        assert_eq!(res.attempts, 4);
        assert!(res.text.is_empty());
    }

    #[test]
    fn test_custom_attempt_budget() {
        let table = LocationTable::builtin();
        let ocr = ScriptedRecognizer::new(vec!["x"]);
        let res = Resolver::new(&table, &ocr).with_max_attempts(2).resolve(image());

        assert_eq!(ocr.calls.get(), 2);
        assert_eq!(res.attempts, 2);
    }
}
