//! 画像取得モジュール
//!
//! 端末の画像ピッカーに相当する部分。成功時は参照URIとBase64データを返し、
//! キャンセル・失敗は `CaptureError` で通知する。

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use dialoguer::Input;
use image::ImageFormat;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// 対応する画像フォーマット
const SUPPORTED_FORMATS: &[ImageFormat] = &[
    ImageFormat::Jpeg,
    ImageFormat::Png,
    ImageFormat::WebP,
    ImageFormat::Gif,
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("画像の選択がキャンセルされました")]
    Cancelled,

    #[error("{0}")]
    Failed(String),
}

/// 取得した画像
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedImage {
    /// ローカル参照（表示用）
    pub uri: String,
    /// Base64エンコード済みデータ
    pub base64: String,
    pub mime: String,
}

/// 画像ピッカー
pub trait ImagePicker {
    fn pick(&self) -> Result<CapturedImage, CaptureError>;
}

/// 固定パスから読み込むピッカー
pub struct FilePicker {
    pub path: PathBuf,
}

impl ImagePicker for FilePicker {
    fn pick(&self) -> Result<CapturedImage, CaptureError> {
        capture_from_path(&self.path)
    }
}

/// 対話入力でパスを受け取るピッカー（空入力でキャンセル）
pub struct PromptPicker;

impl ImagePicker for PromptPicker {
    fn pick(&self) -> Result<CapturedImage, CaptureError> {
        let input: String = Input::new()
            .with_prompt("画像ファイルのパス（空でキャンセル）")
            .allow_empty(true)
            .interact_text()
            .map_err(|e| CaptureError::Failed(format!("入力エラー: {}", e)))?;

        let input = input.trim();
        if input.is_empty() {
            return Err(CaptureError::Cancelled);
        }
        capture_from_path(Path::new(input))
    }
}

/// ファイルから画像を読み込み、Base64にエンコードする
pub fn capture_from_path(path: &Path) -> Result<CapturedImage, CaptureError> {
    if !path.is_file() {
        return Err(CaptureError::Failed(format!(
            "ファイルが見つかりません: {}",
            path.display()
        )));
    }

    let bytes = std::fs::read(path)
        .map_err(|e| CaptureError::Failed(format!("{}: {}", path.display(), e)))?;

    let format = image::guess_format(&bytes)
        .map_err(|_| CaptureError::Failed(format!("画像形式を判定できません: {}", path.display())))?;

    if !SUPPORTED_FORMATS.contains(&format) {
        return Err(CaptureError::Failed(format!(
            "未対応の画像形式です: {:?}",
            format
        )));
    }

    let uri = std::fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string();

    tracing::debug!(uri = %uri, bytes = bytes.len(), ?format, "画像を読み込みました");

    Ok(CapturedImage {
        uri: format!("file://{}", uri.replace('\\', "/")),
        base64: STANDARD.encode(&bytes),
        mime: format.to_mime_type().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // PNGシグネチャ + IHDRの先頭
    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    const JPEG_HEADER: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F'];

    #[test]
    fn test_capture_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("leaf.png");
        std::fs::write(&path, PNG_HEADER).unwrap();

        let captured = capture_from_path(&path).unwrap();
        assert_eq!(captured.mime, "image/png");
        assert_eq!(STANDARD.decode(&captured.base64).unwrap(), PNG_HEADER);
        assert!(captured.uri.starts_with("file://"));
        assert!(captured.uri.ends_with("leaf.png"));
    }

    #[test]
    fn test_capture_jpeg_by_content_not_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("photo.bin");
        std::fs::write(&path, JPEG_HEADER).unwrap();

        let captured = FilePicker { path }.pick().unwrap();
        assert_eq!(captured.mime, "image/jpeg");
    }

    #[test]
    fn test_missing_file_fails() {
        let result = capture_from_path(Path::new("/nonexistent/leaf.jpg"));
        assert!(matches!(result, Err(CaptureError::Failed(_))));
    }

    #[test]
    fn test_non_image_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "watering schedule").unwrap();

        assert!(matches!(capture_from_path(&path), Err(CaptureError::Failed(_))));
    }
}
