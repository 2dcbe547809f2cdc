//! `identify` コマンドの前処理
//!
//! APIキーの確認は画像選択より先に行う。キーが無ければピッカーは開かない。

use crate::capture::{CaptureError, CapturedImage, ImagePicker};
use crate::classifier::PlantIdClient;
use crate::config::Config;
use crate::error::Result;

/// クライアントを作ってから画像を取得する
///
/// 取得結果（キャンセル含む）はそのまま返し、扱いは
/// `IdentificationPipeline::start_from_capture` に任せる。
pub fn prepare_identify(
    config: &Config,
    picker: &dyn ImagePicker,
) -> Result<(PlantIdClient, std::result::Result<CapturedImage, CaptureError>)> {
    let client = PlantIdClient::new(config)?;

    let captured = picker.pick();
    let client = match &captured {
        Ok(image) => client.with_mime(image.mime.clone()),
        Err(_) => client,
    };
    Ok((client, captured))
}
