//! plant.id 判定APIクライアント

use super::{ClassificationClient, ClassifyError};
use crate::config::Config;
use crate::error::Result;
use async_trait::async_trait;
use ecopot_common::{data_uri, parse_identify_response, CandidateResult, IdentifyRequest};
use reqwest::Client;

pub struct PlantIdClient {
    http: Client,
    endpoint: String,
    api_key: String,
    plant_language: String,
    mime: Option<String>,
}

impl PlantIdClient {
    pub fn new(config: &Config) -> Result<Self> {
        let api_key = config.get_api_key()?;
        let http = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            api_key,
            plant_language: config.plant_language.clone(),
            mime: None,
        })
    }

    /// Data URIに載せるMIMEタイプ（既定は image/jpeg）
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }

    fn request_body(&self, image_base64: &str) -> IdentifyRequest {
        let uri = data_uri(self.mime.as_deref(), image_base64);
        IdentifyRequest::new(&self.api_key, uri, &self.plant_language)
    }
}

#[async_trait]
impl ClassificationClient for PlantIdClient {
    async fn classify(&self, image_base64: &str) -> std::result::Result<Vec<CandidateResult>, ClassifyError> {
        let body = self.request_body(image_base64);
        tracing::debug!(endpoint = %self.endpoint, payload_len = image_base64.len(), "判定リクエスト送信");

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(%status, "判定APIがエラーを返しました");
            return Err(ClassifyError::Transport(format!("HTTP {}", status)));
        }

        let text = response
            .text()
            .await
            .map_err(|e| ClassifyError::Transport(e.to_string()))?;
        tracing::debug!(len = text.len(), "判定レスポンス受信");

        candidates_from_body(&text)
    }
}

/// レスポンスボディを候補列に変換（0件は EmptyResult）
pub(crate) fn candidates_from_body(body: &str) -> std::result::Result<Vec<CandidateResult>, ClassifyError> {
    let candidates =
        parse_identify_response(body).map_err(|e| ClassifyError::MalformedResponse(e.to_string()))?;

    if candidates.is_empty() {
        return Err(ClassifyError::EmptyResult);
    }
    Ok(candidates)
}
