use thiserror::Error;

use crate::capture::CaptureError;
use crate::classifier::ClassifyError;
use crate::conversation::SessionError;
use crate::pipeline::PipelineError;

#[derive(Error, Debug)]
pub enum EcopotError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`ecopot config --set-api-key YOUR_KEY` で設定するか PLANT_ID_API_KEY を指定してください")]
    MissingApiKey,

    #[error("画像取得エラー: {0}")]
    Capture(#[from] CaptureError),

    #[error("判定エラー: {0}")]
    Classify(#[from] ClassifyError),

    #[error("判定パイプラインエラー: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("会話エラー: {0}")]
    Session(#[from] SessionError),

    #[error("HTTPクライアント初期化エラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error("入力エラー: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Common(#[from] ecopot_common::Error),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EcopotError>;
