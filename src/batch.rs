//! 一括処理
//!
//! 1ファイルずつ: 日付抽出 → 読み込み(白黒化) → 回転OCRで店舗判定 →
//! 出力先決定 → PDF保存 → 元ファイルを日付フォルダへ移動。
//! 既定では最初のエラーで残りを中断する。

use crate::config::Config;
use crate::disambiguator::{Decision, Disambiguator};
use crate::error::{Result, SlipPdfError};
use crate::export::pdf::save_as_pdf;
use crate::output::OutputDeriver;
use crate::recognizer::TextRecognizer;
use crate::resolver::Resolver;
use crate::scanner::{scan_inputs, InputFile};
use image::GrayImage;
use slip_pdf_common::MatchOutcome;
use std::path::Path;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct BatchOptions {
    /// 書き込み・移動をしない
    pub dry_run: bool,
    /// エラーのファイルを飛ばして続行
    pub continue_on_error: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub found: usize,
    pub written: usize,
    /// written のうちランダムIDで命名した数
    pub fallback_named: usize,
    pub skipped: usize,
    pub failed: usize,
}

enum FileOutcome {
    Written { fallback_named: bool },
    Skipped,
}

pub struct BatchRunner<'a> {
    config: &'a Config,
    recognizer: &'a dyn TextRecognizer,
    disambiguator: Option<&'a dyn Disambiguator>,
    options: BatchOptions,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a Config, recognizer: &'a dyn TextRecognizer) -> Self {
        Self {
            config,
            recognizer,
            disambiguator: None,
            options: BatchOptions::default(),
        }
    }

    pub fn with_disambiguator(mut self, disambiguator: &'a dyn Disambiguator) -> Self {
        self.disambiguator = Some(disambiguator);
        self
    }

    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn run(&self) -> Result<BatchReport> {
        let config = self.config;
        info!(folder = %config.input_dir.display(), "入力フォルダをスキャン中...");
        let inputs = scan_inputs(&config.input_dir, &config.input_extension)?;

        let mut report = BatchReport {
            found: inputs.len(),
            ..Default::default()
        };

        if inputs.is_empty() {
            info!("処理対象のファイルがありません");
            return Ok(report);
        }
        debug!(files = ?inputs.iter().map(|i| i.file_name.as_str()).collect::<Vec<_>>());

        let resolver = Resolver::new(&config.locations, self.recognizer)
            .with_mode(config.rotation_mode)
            .with_max_attempts(config.max_attempts);
        let deriver = OutputDeriver::new(&config.output_dir);

        for (idx, input) in inputs.iter().enumerate() {
            info!("処理中: {}/{} {}", idx + 1, inputs.len(), input.file_name);

            match self.process_file(&resolver, &deriver, input) {
                Ok(FileOutcome::Written { fallback_named }) => {
                    report.written += 1;
                    if fallback_named {
                        report.fallback_named += 1;
                    }
                }
                Ok(FileOutcome::Skipped) => report.skipped += 1,
                Err(e) if self.options.continue_on_error => {
                    error!(file = %input.file_name, "{}", e);
                    report.failed += 1;
                }
                Err(e) => {
                    error!(file = %input.file_name, "{} (残りの処理を中断します)", e);
                    return Err(e);
                }
            }
        }

        info!(
            found = report.found,
            written = report.written,
            fallback = report.fallback_named,
            skipped = report.skipped,
            failed = report.failed,
            "一括処理終了"
        );
        Ok(report)
    }

    fn process_file(
        &self,
        resolver: &Resolver<'_>,
        deriver: &OutputDeriver,
        input: &InputFile,
    ) -> Result<FileOutcome> {
        let Some(date) = input.date.clone() else {
            warn!(file = %input.file_name, "ファイル名から日付を取得できないためスキップ");
            return Ok(FileOutcome::Skipped);
        };
        debug!(date = %date);

        let image = load_grayscale(&input.path)?;
        let resolution = resolver.resolve(image);

        let outcome = match (resolution.outcome, self.disambiguator) {
            (MatchOutcome::Matched(location), _) => MatchOutcome::Matched(location),
            (unresolved, Some(disambiguator)) => {
                match disambiguator.decide(&input.file_name, &resolution.text)? {
                    Decision::Use(location) => MatchOutcome::Matched(location),
                    Decision::Skip => {
                        info!(file = %input.file_name, "スキップ");
                        return Ok(FileOutcome::Skipped);
                    }
                    Decision::Fallback => unresolved,
                }
            }
            (unresolved, None) => unresolved,
        };

        if self.options.dry_run {
            let desc = deriver.describe(&date, &outcome, &mut rand::thread_rng());
            info!(path = %desc.path().display(), "ドライラン: 書き込みません");
            return Ok(FileOutcome::Written {
                fallback_named: desc.fallback_named,
            });
        }

        let desc = deriver.derive(&date, &outcome)?;
        let out_path = desc.path();
        debug!(file_name = %desc.file_name, "出力ファイル名");

        let existed = out_path.exists();
        if !self.config.on_existing.permits_write(&out_path)? {
            return Ok(FileOutcome::Skipped);
        }

        save_as_pdf(
            &resolution.image,
            &out_path,
            self.config.reduction_factor,
            self.config.pdf_dpi,
        )?;
        info!("完了: {}", desc.file_name);

        if let Err(e) = move_file(&input.path, &desc.dir.join(&input.file_name)) {
            // 元ファイルが残るなら出力も残さない
            if !existed {
                std::fs::remove_file(&out_path).ok();
            }
            return Err(e);
        }

        Ok(FileOutcome::Written {
            fallback_named: desc.fallback_named,
        })
    }
}

/// 画像を読み込み、色情報を除く
pub fn load_grayscale(path: &Path) -> Result<GrayImage> {
    let img = image::open(path)
        .map_err(|e| SlipPdfError::ImageLoad(format!("{}: {}", path.display(), e)))?;
    debug!(width = img.width(), height = img.height(), color = ?img.color(), "画像読み込み");
    Ok(img.to_luma8())
}

/// 別ドライブへは rename できないのでコピー＋削除
pub fn move_file(from: &Path, to: &Path) -> Result<()> {
    info!("移動: {} → {}", from.display(), to.display());
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)
        .and_then(|_| std::fs::remove_file(from))
        .map_err(|source| SlipPdfError::MoveFailed {
            from: from.display().to_string(),
            to: to.display().to_string(),
            source,
        })
}
