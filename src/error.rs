use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlipPdfError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("フォルダが見つかりません: {0}")]
    FolderNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("フォルダ作成エラー: {path}: {source}")]
    DirectoryCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("PDF生成エラー: {0}")]
    PdfGeneration(String),

    #[error("出力ファイルが既に存在します: {0}")]
    OutputExists(String),

    #[error("ファイル移動エラー: {from} → {to}: {source}")]
    MoveFailed {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CLI実行エラー: {0}")]
    CliExecution(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] slip_pdf_common::Error),
}

pub type Result<T> = std::result::Result<T, SlipPdfError>;
