//! 診断チャットの会話シナリオテスト
//!
//! 仮の診断バックエンドで、待ち時間・応答文・リセット時の抑止を検証する。
//! 時間は `start_paused` で止めて進める。

use ecopot::config::Config;
use ecopot::conversation::{ConversationSession, SimulatedDiagnosis, DEFAULT_GREETING};
use ecopot_common::{Attachment, Author};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn session() -> ConversationSession {
    ConversationSession::new(Arc::new(SimulatedDiagnosis::default())).with_greeting(DEFAULT_GREETING)
}

#[tokio::test(start_paused = true)]
async fn test_text_then_photo_conversation() {
    let session = session();
    assert_eq!(session.transcript().len(), 1);

    let started = Instant::now();
    let (_, handle) = session.send("Spots on my leaves", None).unwrap();
    let reply = handle.await.unwrap().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1000));
    assert!(reply.text.contains("leaf spot"));
    assert_eq!(reply.in_reply_to, Some(2));

    let started = Instant::now();
    let (_, handle) = session
        .send("", Some(Attachment::new("file:///tmp/leaf.jpg")))
        .unwrap();
    let reply = handle.await.unwrap().unwrap();
    assert!(started.elapsed() >= Duration::from_millis(1500));
    assert!(reply.text.contains("powdery mildew"));

    let transcript = session.transcript();
    let ids: Vec<u64> = transcript.turns().iter().map(|t| t.id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4, 5]);

    let authors: Vec<Author> = transcript.turns().iter().map(|t| t.author).collect();
    assert_eq!(
        authors,
        vec![Author::Assistant, Author::User, Author::Assistant, Author::User, Author::Assistant]
    );
}

#[tokio::test(start_paused = true)]
async fn test_reset_while_waiting_drops_reply() {
    let session = session();
    let (_, handle) = session.send("Why are the tips brown?", None).unwrap();

    tokio::time::sleep(Duration::from_millis(400)).await;
    session.reset();

    assert_eq!(handle.await.unwrap(), None);
    let transcript = session.transcript();
    assert_eq!(transcript.len(), 1);
    assert_eq!(transcript.turns()[0].text, DEFAULT_GREETING);
}

#[tokio::test(start_paused = true)]
async fn test_latency_follows_config() {
    let config = Config {
        reply_latency_ms: 50,
        image_reply_latency_ms: 80,
        ..Config::default()
    };
    let session = ConversationSession::new(Arc::new(SimulatedDiagnosis::from_config(&config)));

    let started = Instant::now();
    let (_, handle) = session.send("hello", None).unwrap();
    handle.await.unwrap().unwrap();
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_millis(50));
    assert!(elapsed < Duration::from_millis(1000));
}

#[tokio::test(start_paused = true)]
async fn test_subscriber_sees_reply() {
    let session = session();
    let mut rx = session.subscribe();
    rx.borrow_and_update();

    let (_, handle) = session.send("Is overwatering bad?", None).unwrap();

    // ユーザーターン追記の通知
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().transcript.len(), 2);

    // 応答追記の通知
    rx.changed().await.unwrap();
    assert_eq!(rx.borrow_and_update().transcript.len(), 3);

    handle.await.unwrap();
}
