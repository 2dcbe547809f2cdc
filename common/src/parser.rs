//! 判定APIレスポンスパーサー
//!
//! レスポンスボディ（`{"suggestions": [...]}`）から候補列を取り出す。
//! 並び順はサービスの返した順のまま（再ソートしない）。

use crate::error::{Error, Result};
use crate::json::Json;
use crate::types::CandidateResult;

/// 判定レスポンスをパース
///
/// # Returns
/// * `Ok(Vec<CandidateResult>)` - 候補列（`suggestions` が無い・nullなら空）
/// * `Err` - JSONとして読めない、または期待する形でない
///
/// # Examples
/// ```
/// use ecopot_common::parse_identify_response;
///
/// let body = r#"{"suggestions": [{"plant_name": "Rosa", "probability": 0.9}]}"#;
/// let candidates = parse_identify_response(body).unwrap();
/// assert_eq!(candidates.len(), 1);
/// assert_eq!(candidates[0].confidence, 0.9);
/// ```
pub fn parse_identify_response(body: &str) -> Result<Vec<CandidateResult>> {
    let root: Json = serde_json::from_str(body)?;

    let Json::Object(_) = root else {
        return Err(Error::Parse("レスポンスがオブジェクトではありません".into()));
    };

    let suggestions = match root.get("suggestions") {
        None | Some(Json::Null) => return Ok(Vec::new()),
        Some(Json::Array(items)) => items,
        Some(_) => return Err(Error::Parse("suggestionsが配列ではありません".into())),
    };

    suggestions
        .iter()
        .enumerate()
        .map(|(idx, suggestion)| match suggestion {
            Json::Object(entries) => {
                let confidence = suggestion
                    .get("probability")
                    .and_then(Json::as_f64)
                    .unwrap_or(0.0);
                Ok(CandidateResult::new(entries.clone(), confidence))
            }
            _ => Err(Error::Parse(format!(
                "suggestions[{}]がオブジェクトではありません",
                idx
            ))),
        })
        .collect()
}
