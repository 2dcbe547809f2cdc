//! 診断チャットのセッション
//!
//! ユーザーターンは同期的に追記し、アシスタントターンは応答元の待ち時間の
//! 後で非同期に追記する。ターンIDは発言者に関係なく追記ごとに1ずつ増える。
//!
//! `reset()` は世代番号を進める。古い世代で予約された応答は、届いた時点で
//! 世代が一致しなければ追記されない。

mod reply;

pub use reply::{DelayedReply, ReplySource, SimulatedDiagnosis};

use chrono::Utc;
use ecopot_common::{Attachment, Author, Transcript, Turn};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// 既定のあいさつ文
pub const DEFAULT_GREETING: &str = "Hello! I'm your plant disease assistant. Upload a photo or describe your plant's symptoms, and I'll help diagnose the issue.";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("メッセージが空です")]
    EmptyMessage,

    #[error("ターンが見つかりません: {0}")]
    UnknownTurn(u64),
}

/// 世代番号と会話ログの組
#[derive(Debug, Clone, Default)]
pub struct SessionLog {
    pub generation: u64,
    pub transcript: Transcript,
}

pub struct ConversationSession {
    source: Arc<dyn ReplySource>,
    log: Arc<watch::Sender<SessionLog>>,
    greeting: Option<String>,
}

impl ConversationSession {
    pub fn new(source: Arc<dyn ReplySource>) -> Self {
        let (log, _) = watch::channel(SessionLog::default());
        Self {
            source,
            log: Arc::new(log),
            greeting: None,
        }
    }

    /// あいさつ文をターン1として置く（reset後も置き直す）
    pub fn with_greeting(mut self, greeting: impl Into<String>) -> Self {
        let greeting = greeting.into();
        let seeded = seed(Some(greeting.as_str()));
        self.log.send_modify(|log| log.transcript = seeded);
        self.greeting = Some(greeting);
        self
    }

    pub fn transcript(&self) -> Transcript {
        self.log.borrow().transcript.clone()
    }

    pub fn generation(&self) -> u64 {
        self.log.borrow().generation
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionLog> {
        self.log.subscribe()
    }

    /// ユーザーターンを追記し、新しいスナップショットを返す
    pub fn append_user_turn(
        &self,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Result<Transcript, SessionError> {
        if text.trim().is_empty() && attachment.is_none() {
            return Err(SessionError::EmptyMessage);
        }

        let mut snapshot = Transcript::new();
        self.log.send_modify(|log| {
            let turn = Turn {
                id: log.transcript.next_id(),
                author: Author::User,
                text: text.to_string(),
                attachment,
                in_reply_to: None,
                created_at: Utc::now(),
            };
            log.transcript = log.transcript.appended(turn);
            snapshot = log.transcript.clone();
        });

        tracing::debug!(len = snapshot.len(), "ユーザーターン追記");
        Ok(snapshot)
    }

    /// アシスタント応答を予約する
    ///
    /// ハンドルは追記したターンを返す。予約後に reset された場合は `None`。
    pub fn schedule_assistant_reply(
        &self,
        triggering_turn_id: u64,
    ) -> Result<JoinHandle<Option<Turn>>, SessionError> {
        let (generation, trigger) = {
            let log = self.log.borrow();
            let trigger = log
                .transcript
                .get(triggering_turn_id)
                .cloned()
                .ok_or(SessionError::UnknownTurn(triggering_turn_id))?;
            (log.generation, trigger)
        };

        let source = Arc::clone(&self.source);
        let log = Arc::clone(&self.log);

        Ok(tokio::spawn(async move {
            let text = source.reply(&trigger).await;

            let mut appended = None;
            log.send_if_modified(|log| {
                if log.generation != generation {
                    return false;
                }
                let turn = Turn {
                    id: log.transcript.next_id(),
                    author: Author::Assistant,
                    text,
                    attachment: None,
                    in_reply_to: Some(trigger.id),
                    created_at: Utc::now(),
                };
                log.transcript = log.transcript.appended(turn.clone());
                appended = Some(turn);
                true
            });

            if appended.is_none() {
                tracing::debug!(trigger = trigger.id, "破棄済みセッションへの応答を抑止");
            }
            appended
        }))
    }

    /// ユーザーターンを追記して応答を予約する
    pub fn send(
        &self,
        text: &str,
        attachment: Option<Attachment>,
    ) -> Result<(Transcript, JoinHandle<Option<Turn>>), SessionError> {
        let transcript = self.append_user_turn(text, attachment)?;
        let trigger_id = transcript.last().map(|t| t.id).unwrap_or_default();
        let handle = self.schedule_assistant_reply(trigger_id)?;
        Ok((transcript, handle))
    }

    /// 会話を破棄して新しいセッションを始める
    pub fn reset(&self) {
        let seeded = seed(self.greeting.as_deref());
        self.log.send_modify(|log| {
            log.generation += 1;
            log.transcript = seeded;
        });
        tracing::debug!("会話セッションをリセット");
    }
}

fn seed(greeting: Option<&str>) -> Transcript {
    let transcript = Transcript::new();
    match greeting {
        Some(text) => transcript.appended(Turn {
            id: transcript.next_id(),
            author: Author::Assistant,
            text: text.to_string(),
            attachment: None,
            in_reply_to: None,
            created_at: Utc::now(),
        }),
        None => transcript,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn echo_session(latency_ms: u64) -> ConversationSession {
        let source = DelayedReply::new(Duration::from_millis(latency_ms), |t| format!("re: {}", t.text));
        ConversationSession::new(Arc::new(source))
    }

    #[tokio::test(start_paused = true)]
    async fn test_user_turn_then_assistant_after_latency() {
        let session = echo_session(1000);

        let transcript = session.append_user_turn("hello", None).unwrap();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].author, Author::User);

        let handle = session.schedule_assistant_reply(1).unwrap();
        assert_eq!(session.transcript().len(), 1);

        let reply = handle.await.unwrap().expect("reply appended");
        assert_eq!(reply.author, Author::Assistant);
        assert_eq!(reply.in_reply_to, Some(1));
        assert_eq!(reply.text, "re: hello");

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.turns()[1].author, Author::Assistant);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reset_suppresses_pending_reply() {
        let session = echo_session(1000);
        let (_, handle) = session.send("hello", None).unwrap();

        session.reset();

        assert!(handle.await.unwrap().is_none());
        assert!(session.transcript().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_reply_does_not_leak_into_new_session() {
        let session = echo_session(1000);
        let (_, stale) = session.send("old question", None).unwrap();

        session.reset();
        let fresh = session.append_user_turn("new question", None).unwrap();
        assert_eq!(fresh.turns()[0].id, 1);

        assert!(stale.await.unwrap().is_none());
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].text, "new question");
    }

    #[tokio::test(start_paused = true)]
    async fn test_ids_strictly_increase_without_gaps() {
        let session = echo_session(10);

        for text in ["one", "two", "three"] {
            let (_, handle) = session.send(text, None).unwrap();
            handle.await.unwrap();
        }

        let ids: Vec<u64> = session.transcript().turns().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5, 6]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replies_follow_their_triggers() {
        let session = echo_session(100);

        let (_, first) = session.send("first", None).unwrap();
        let (_, second) = session.send("second", None).unwrap();
        first.await.unwrap();
        second.await.unwrap();

        let transcript = session.transcript();
        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript.turns()[0].text, "first");
        assert_eq!(transcript.turns()[1].text, "second");

        // 応答はきっかけのターンより後ろにあり、タグで対応が取れる
        for reply in &transcript.turns()[2..] {
            let trigger_id = reply.in_reply_to.expect("reply tagged");
            let trigger = transcript.get(trigger_id).unwrap();
            assert!(trigger.id < reply.id);
            assert_eq!(reply.text, format!("re: {}", trigger.text));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_greeting_is_turn_one_and_reseeded() {
        let session = echo_session(10).with_greeting(DEFAULT_GREETING);
        assert_eq!(session.transcript().len(), 1);
        assert_eq!(session.transcript().turns()[0].author, Author::Assistant);

        let transcript = session.append_user_turn("hi", None).unwrap();
        assert_eq!(transcript.turns()[1].id, 2);

        session.reset();
        let transcript = session.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript.turns()[0].text, DEFAULT_GREETING);
    }

    #[tokio::test]
    async fn test_snapshots_are_immutable() {
        let session = echo_session(0);
        let before = session.append_user_turn("a", None).unwrap();
        session.append_user_turn("b", None).unwrap();

        assert_eq!(before.len(), 1);
        assert_eq!(session.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_attachment_only_message_is_allowed() {
        let session = echo_session(0);
        let transcript = session
            .append_user_turn("", Some(Attachment::new("file:///leaf.jpg")))
            .unwrap();
        assert!(transcript.turns()[0].has_attachment());

        assert!(matches!(
            session.append_user_turn("   ", None),
            Err(SessionError::EmptyMessage)
        ));
    }

    #[tokio::test]
    async fn test_user_text_is_kept_as_typed() {
        let session = echo_session(0);
        let transcript = session.append_user_turn("  yellow leaves\n", None).unwrap();
        assert_eq!(transcript.turns()[0].text, "  yellow leaves\n");
    }

    #[tokio::test]
    async fn test_unknown_trigger_is_rejected() {
        let session = echo_session(0);
        assert!(matches!(
            session.schedule_assistant_reply(42),
            Err(SessionError::UnknownTurn(42))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribe_notified_on_reply() {
        let session = echo_session(500);
        let mut rx = session.subscribe();

        let (_, handle) = session.send("hello", None).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().transcript.len(), 1);

        handle.await.unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().transcript.len(), 2);
    }
}
