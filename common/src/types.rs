//! 植物判定の型定義
//!
//! - CandidateResult: 判定サービスが返す候補1件
//! - IdentifyRequest: 判定サービスへのリクエストボディ

use crate::json::Json;
use serde::Serialize;

/// 判定サービスのエンドポイント（既定）
pub const DEFAULT_ENDPOINT: &str = "https://api.plant.id/v2/identify";

/// 既定のMIMEタイプ
pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// リクエストする判定モディファイア
pub const MODIFIERS: &[&str] = &["crops_fast", "similar_images", "health_all"];

/// リクエストする詳細フィールド
pub const PLANT_DETAILS: &[&str] = &[
    "common_names",
    "scientific_name",
    "wiki_description",
    "watering",
    "sunlight",
    "growth_rate",
    "temperature_minimum",
    "humidity",
    "propagation_methods",
    "edible_parts",
];

/// 判定候補（受信後は不変）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateResult {
    /// 候補の全フィールド（宣言順）
    pub attributes: Vec<(String, Json)>,
    /// 確信度（0.0〜1.0）
    pub confidence: f64,
}

impl CandidateResult {
    pub fn new(attributes: Vec<(String, Json)>, confidence: f64) -> Self {
        Self { attributes, confidence }
    }

    pub fn attribute(&self, key: &str) -> Option<&Json> {
        self.attributes.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// 表示名: plant_name → 一般名の先頭 → 学名
    pub fn display_name(&self) -> Option<String> {
        if let Some(name) = self.attribute("plant_name").and_then(Json::as_str) {
            return Some(name.to_string());
        }

        let details = self.attribute("plant_details")?;
        details
            .get("common_names")
            .and_then(Json::as_array)
            .and_then(|names| names.first())
            .and_then(Json::as_str)
            .or_else(|| details.get("scientific_name").and_then(Json::as_str))
            .map(str::to_string)
    }
}

/// 判定リクエストボディ
#[derive(Debug, Clone, Serialize)]
pub struct IdentifyRequest {
    pub api_key: String,
    pub images: Vec<String>,
    pub modifiers: Vec<String>,
    pub plant_language: String,
    pub plant_details: Vec<String>,
}

impl IdentifyRequest {
    /// 画像1枚分のリクエストを作る
    pub fn new(api_key: &str, data_uri: String, plant_language: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            images: vec![data_uri],
            modifiers: MODIFIERS.iter().map(|m| m.to_string()).collect(),
            plant_language: plant_language.to_string(),
            plant_details: PLANT_DETAILS.iter().map(|d| d.to_string()).collect(),
        }
    }
}

/// Base64データからData URIを作る
///
/// # Examples
/// ```
/// use ecopot_common::data_uri;
///
/// assert_eq!(data_uri(None, "AAAA"), "data:image/jpeg;base64,AAAA");
/// assert_eq!(data_uri(Some("image/png"), "AAAA"), "data:image/png;base64,AAAA");
/// ```
pub fn data_uri(mime: Option<&str>, base64: &str) -> String {
    format!("data:{};base64,{}", mime.unwrap_or(DEFAULT_MIME_TYPE), base64)
}
