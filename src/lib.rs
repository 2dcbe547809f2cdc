//! Ecopot: 植物ケアアシスタントのコア
//!
//! - 写真から植物を判定するパイプライン（リモート判定サービス）
//! - 判定結果の表示用正規化（`ecopot_common::normalizer`）
//! - 診断チャットのセッション

pub mod capture;
pub mod chat;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod error;
pub mod identify;
pub mod pipeline;
