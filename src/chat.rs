//! 対話式診断チャット
//!
//! 操作: テキスト入力で相談、`/photo <path> [説明]` で写真を添付、
//! `/reset` で会話をやり直し、`/quit` で終了。

use crate::capture::capture_from_path;
use crate::conversation::ConversationSession;
use crate::error::Result;
use dialoguer::Input;
use ecopot_common::{Attachment, Author, Turn};
use indicatif::ProgressBar;
use std::path::Path;
use std::time::Duration;

/// 写真だけを送ったときの本文
const PHOTO_DEFAULT_TEXT: &str = "I've uploaded a photo of my plant leaves.";

/// 入力1行の解釈結果
#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Message(String),
    Photo { path: String, text: String },
    Reset,
    Quit,
    Empty,
}

/// 入力行を解釈する
pub fn parse_command(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }

    match line {
        "/quit" | "/exit" | "/q" => return ChatCommand::Quit,
        "/reset" => return ChatCommand::Reset,
        _ => {}
    }

    if let Some(rest) = line.strip_prefix("/photo") {
        let rest = rest.trim();
        let (path, text) = match rest.split_once(char::is_whitespace) {
            Some((path, text)) => (path, text.trim()),
            None => (rest, ""),
        };
        if path.is_empty() {
            return ChatCommand::Empty;
        }
        let text = if text.is_empty() { PHOTO_DEFAULT_TEXT } else { text };
        return ChatCommand::Photo {
            path: path.to_string(),
            text: text.to_string(),
        };
    }

    ChatCommand::Message(line.to_string())
}

/// ターン1件の表示用文字列
pub fn format_turn(turn: &Turn) -> String {
    let speaker = match turn.author {
        Author::User => "🧑 あなた",
        Author::Assistant => "🌿 アシスタント",
    };
    match &turn.attachment {
        Some(attachment) => format!("{}: [📷 {}] {}", speaker, attachment.uri, turn.text),
        None => format!("{}: {}", speaker, turn.text),
    }
}

/// 対話ループを実行
pub async fn run_interactive_chat(session: &ConversationSession) -> Result<()> {
    println!("🩺 植物診断チャット");
    println!("---");
    println!("操作: 文字入力で相談 / /photo <path> [説明] で写真添付 / /reset でやり直し / /quit で終了");
    println!("---\n");

    for turn in session.transcript().turns() {
        println!("{}\n", format_turn(turn));
    }

    loop {
        let line: String = Input::new()
            .with_prompt("あなた")
            .allow_empty(true)
            .interact_text()?;

        let (text, attachment) = match parse_command(&line) {
            ChatCommand::Empty => continue,
            ChatCommand::Quit => break,
            ChatCommand::Reset => {
                session.reset();
                println!("↺ 会話をリセットしました\n");
                for turn in session.transcript().turns() {
                    println!("{}\n", format_turn(turn));
                }
                continue;
            }
            ChatCommand::Photo { path, text } => match capture_from_path(Path::new(&path)) {
                Ok(image) => (text, Some(Attachment::new(image.uri))),
                Err(e) => {
                    println!("⚠ {}\n", e);
                    continue;
                }
            },
            ChatCommand::Message(text) => (text, None),
        };

        let (_, handle) = match session.send(&text, attachment) {
            Ok(sent) => sent,
            Err(e) => {
                println!("⚠ {}\n", e);
                continue;
            }
        };

        let spinner = ProgressBar::new_spinner();
        spinner.set_message("アシスタントが入力中...");
        spinner.enable_steady_tick(Duration::from_millis(100));

        let reply = handle.await;
        spinner.finish_and_clear();

        match reply {
            Ok(Some(turn)) => println!("{}\n", format_turn(&turn)),
            Ok(None) => {}
            Err(e) => tracing::error!(error = %e, "応答タスクが異常終了しました"),
        }
    }

    println!("\n✅ チャットを終了しました");
    Ok(())
}
