//! 植物判定クライアント
//!
//! 画像1枚につきリモート呼び出しを1回だけ行い、確信度の高い順に並んだ
//! 候補列を返す（並べ替えはしない）。リトライはしない。

mod plant_id;

pub use plant_id::PlantIdClient;

use async_trait::async_trait;
use ecopot_common::CandidateResult;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// 接続不可・タイムアウト・2xx以外のステータス
    #[error("通信エラー: {0}")]
    Transport(String),

    /// 正常応答だが候補が0件
    #[error("候補がありません")]
    EmptyResult,

    /// レスポンスが期待する形でない
    #[error("レスポンス形式エラー: {0}")]
    MalformedResponse(String),
}

#[async_trait]
pub trait ClassificationClient: Send + Sync {
    /// Base64画像を判定し、空でない候補列を返す
    async fn classify(&self, image_base64: &str) -> Result<Vec<CandidateResult>, ClassifyError>;
}
