use crate::config::Config;
use crate::output::CollisionPolicy;
use crate::resolver::RotationMode;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slip-pdf")]
#[command(about = "レシート写真をOCRで店舗判定し、白黒PDFに一括変換", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 設定ファイル（デフォルト: ~/.config/slip-pdf/config.json）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 入力フォルダの写真をPDFに変換
    Run(RunArgs),

    /// テキストを店舗テーブルと照合（動作確認用）
    Match {
        /// 照合するテキスト
        #[arg(required = true)]
        text: String,
    },

    /// 設定を表示/初期化
    Config {
        /// 設定を表示
        #[arg(long)]
        show: bool,

        /// デフォルト設定をファイルに書き出す
        #[arg(long)]
        init: bool,
    },

    /// tesseractが使えるか確認
    Doctor,
}

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// 入力フォルダ
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// 出力ルートフォルダ
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 対象拡張子（例: .jpg）
    #[arg(long)]
    pub ext: Option<String>,

    /// 縮小率（縦横をこの値で割る）
    #[arg(long)]
    pub reduce: Option<u32>,

    /// tesseract実行ファイル
    #[arg(long)]
    pub tesseract: Option<PathBuf>,

    /// 回転方法 (fixed/cumulative)
    #[arg(long, value_enum)]
    pub rotation: Option<RotationMode>,

    /// 同名ファイルがある場合 (overwrite/skip/fail)
    #[arg(long, value_enum)]
    pub on_existing: Option<CollisionPolicy>,

    /// 店舗不明時に対話で入力
    #[arg(long)]
    pub ask: bool,

    /// 書き込み・移動をせずに結果だけ表示
    #[arg(long)]
    pub dry_run: bool,

    /// エラーのファイルを飛ばして続行
    #[arg(long)]
    pub continue_on_error: bool,
}

impl RunArgs {
    /// コマンドライン指定で設定を上書き
    pub fn apply(&self, config: &mut Config) {
        if let Some(input) = &self.input {
            config.input_dir = input.clone();
        }
        if let Some(output) = &self.output {
            config.output_dir = output.clone();
        }
        if let Some(ext) = &self.ext {
            config.input_extension = ext.clone();
        }
        if let Some(reduce) = self.reduce {
            config.reduction_factor = reduce;
        }
        if let Some(tesseract) = &self.tesseract {
            config.tesseract_cmd = tesseract.clone();
        }
        if let Some(rotation) = self.rotation {
            config.rotation_mode = rotation;
        }
        if let Some(policy) = self.on_existing {
            config.on_existing = policy;
        }
    }
}
