//! 会話ログの型定義
//!
//! Transcriptは追記専用の不変スナップショット。追記のたびに新しい
//! スナップショットを作り、既存のターンは書き換えない。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 発言者
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Author {
    User,
    Assistant,
}

/// 添付画像への参照（中身は扱わない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub uri: String,
}

impl Attachment {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// 会話の1ターン
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Turn {
    pub id: u64,
    pub author: Author,
    pub text: String,
    #[serde(default)]
    pub attachment: Option<Attachment>,
    /// アシスタント応答のきっかけになったターンID
    #[serde(default)]
    pub in_reply_to: Option<u64>,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    pub fn is_user(&self) -> bool {
        self.author == Author::User
    }

    pub fn has_attachment(&self) -> bool {
        self.attachment.is_some()
    }
}

/// 会話ログのスナップショット
#[derive(Debug, Clone)]
pub struct Transcript {
    turns: Arc<[Turn]>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self { turns: Arc::from(Vec::new()) }
    }
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// 末尾に1ターン追加した新しいスナップショットを返す
    pub fn appended(&self, turn: Turn) -> Transcript {
        let mut turns = Vec::with_capacity(self.turns.len() + 1);
        turns.extend_from_slice(&self.turns);
        turns.push(turn);
        Transcript { turns: turns.into() }
    }

    /// 次に割り当てるID（空なら1）
    pub fn next_id(&self) -> u64 {
        self.turns.last().map_or(1, |t| t.id + 1)
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn get(&self, id: u64) -> Option<&Turn> {
        self.turns.iter().find(|t| t.id == id)
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
