//! ログ初期化
//!
//! 標準エラーへの人間向け出力と、日次ローテーションのJSONログファイル。
//! `RUST_LOG` があればそちらを優先する。
//! 返される `WorkerGuard` を落とすと未書き込みのログが失われるので、
//! 呼び出し側で処理終了まで保持すること。

use crate::error::{Result, SlipPdfError};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_FILE_PREFIX: &str = "slip-pdf.log";

pub fn default_level(verbose: bool) -> &'static str {
    if verbose {
        "debug"
    } else {
        "info"
    }
}

pub fn init(log_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level(verbose)));

    std::fs::create_dir_all(log_dir)?;
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .build(log_dir)
        .map_err(|e| SlipPdfError::Config(format!("ログファイルを開けません: {}", e)))?;
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let file_layer = fmt::layer()
        .json()
        .with_writer(file_writer)
        .with_ansi(false);

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| SlipPdfError::Config(format!("ログ初期化エラー: {}", e)))?;

    Ok(guard)
}
