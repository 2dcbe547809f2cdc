//! アシスタント応答の生成元
//!
//! セッションは `ReplySource` だけに依存する。待ち時間つきの仮実装と、
//! 将来のネットワーク越しの診断バックエンドは同じ契約を満たす。

use crate::config::Config;
use async_trait::async_trait;
use ecopot_common::Turn;
use std::time::Duration;

const TEXT_DIAGNOSIS: &str = "Based on your description, this could be leaf spot disease. It's common in humid conditions. I recommend removing affected leaves and ensuring better air circulation around your plant.";

const IMAGE_DIAGNOSIS: &str = "I've analyzed your photo. It appears to be powdery mildew, a fungal disease. Try spraying with a mixture of water and baking soda, and keep the leaves dry when watering.";

#[async_trait]
pub trait ReplySource: Send + Sync {
    /// きっかけのユーザーターンに対する応答文を返す
    async fn reply(&self, trigger: &Turn) -> String;
}

/// 定型の診断文を返す仮の診断バックエンド
#[derive(Debug, Clone)]
pub struct SimulatedDiagnosis {
    pub text_latency: Duration,
    pub image_latency: Duration,
}

impl Default for SimulatedDiagnosis {
    fn default() -> Self {
        Self {
            text_latency: Duration::from_millis(1000),
            image_latency: Duration::from_millis(1500),
        }
    }
}

impl SimulatedDiagnosis {
    pub fn from_config(config: &Config) -> Self {
        Self {
            text_latency: config.reply_latency(),
            image_latency: config.image_reply_latency(),
        }
    }

    pub fn latency_for(&self, trigger: &Turn) -> Duration {
        if trigger.has_attachment() {
            self.image_latency
        } else {
            self.text_latency
        }
    }

    pub fn compose(trigger: &Turn) -> String {
        if trigger.has_attachment() {
            IMAGE_DIAGNOSIS.to_string()
        } else {
            TEXT_DIAGNOSIS.to_string()
        }
    }
}

#[async_trait]
impl ReplySource for SimulatedDiagnosis {
    async fn reply(&self, trigger: &Turn) -> String {
        tokio::time::sleep(self.latency_for(trigger)).await;
        Self::compose(trigger)
    }
}

/// 一定時間待ってから任意の関数で応答文を作る
pub struct DelayedReply {
    latency: Duration,
    compose: Box<dyn Fn(&Turn) -> String + Send + Sync>,
}

impl DelayedReply {
    pub fn new<F>(latency: Duration, compose: F) -> Self
    where
        F: Fn(&Turn) -> String + Send + Sync + 'static,
    {
        Self {
            latency,
            compose: Box::new(compose),
        }
    }
}

#[async_trait]
impl ReplySource for DelayedReply {
    async fn reply(&self, trigger: &Turn) -> String {
        tokio::time::sleep(self.latency).await;
        (self.compose)(trigger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ecopot_common::{Attachment, Author};
    use tokio::time::Instant;

    fn user_turn(attachment: Option<Attachment>) -> Turn {
        Turn {
            id: 1,
            author: Author::User,
            text: "my leaves have spots".into(),
            attachment,
            in_reply_to: None,
            created_at: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_text_reply_after_text_latency() {
        let source = SimulatedDiagnosis::default();
        let started = Instant::now();

        let reply = source.reply(&user_turn(None)).await;

        assert!(reply.contains("leaf spot"));
        assert_eq!(started.elapsed(), Duration::from_millis(1000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_image_reply_after_image_latency() {
        let source = SimulatedDiagnosis::default();
        let started = Instant::now();

        let reply = source.reply(&user_turn(Some(Attachment::new("file:///leaf.jpg")))).await;

        assert!(reply.contains("powdery mildew"));
        assert_eq!(started.elapsed(), Duration::from_millis(1500));
    }

    #[test]
    fn test_from_config() {
        let mut config = Config::default();
        config.reply_latency_ms = 10;
        config.image_reply_latency_ms = 20;

        let source = SimulatedDiagnosis::from_config(&config);
        assert_eq!(source.latency_for(&user_turn(None)), Duration::from_millis(10));
        assert_eq!(
            source.latency_for(&user_turn(Some(Attachment::new("x")))),
            Duration::from_millis(20)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_delayed_reply_uses_compose() {
        let source = DelayedReply::new(Duration::from_millis(50), |turn| format!("echo: {}", turn.text));
        assert_eq!(source.reply(&user_turn(None)).await, "echo: my leaves have spots");
    }
}
