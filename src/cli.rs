use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ecopot")]
#[command(about = "植物ケアアシスタント（写真判定・診断チャット・植物リスト）", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 写真から植物を判定
    Identify {
        /// 画像ファイル（省略時は対話入力）
        image: Option<PathBuf>,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// 植物の病気診断チャット
    Chat {
        /// あいさつ文を表示しない
        #[arg(long)]
        no_greeting: bool,
    },

    /// 手持ちの植物リスト
    Plants {
        /// 指定日数以内に水やりが必要なものだけ表示
        #[arg(long)]
        due: Option<u32>,
    },

    /// お知らせ一覧
    Notifications {
        /// 指定IDを既読にする
        #[arg(long)]
        mark_read: Option<String>,

        /// すべて削除
        #[arg(long)]
        clear: bool,
    },

    /// アプリ設定の表示・切り替え
    Settings {
        /// 切り替える項目 (notifications/water-reminders/dark-mode/location)
        #[arg(long)]
        toggle: Option<String>,
    },

    /// 設定管理
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 現在の設定を表示
        #[arg(long)]
        show: bool,
    },
}
