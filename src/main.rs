use chrono::Utc;
use clap::Parser;
use ecopot::capture::{FilePicker, ImagePicker, PromptPicker};
use ecopot::conversation::{ConversationSession, SimulatedDiagnosis, DEFAULT_GREETING};
use ecopot::identify::prepare_identify;
use ecopot::pipeline::{IdentificationPipeline, IdentificationState};
use ecopot::{chat, cli, config, error};
use ecopot_common::{relative_time, render_lines, NotificationCenter, PlantInventory};
use cli::{Cli, Commands};
use config::{Config, Settings};
use error::Result;
use indicatif::ProgressBar;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = Config::load()?;

    match cli.command {
        Commands::Identify { image, json } => {
            println!("🌱 ecopot - 植物判定\n");

            let picker: Box<dyn ImagePicker> = match image {
                Some(path) => Box::new(FilePicker { path }),
                None => Box::new(PromptPicker),
            };
            let (client, captured) = prepare_identify(&config, picker.as_ref())?;
            let pipeline = IdentificationPipeline::new(Arc::new(client));

            let Some(handle) = pipeline.start_from_capture(captured)? else {
                println!("画像の選択をキャンセルしました");
                return Ok(());
            };

            let spinner = ProgressBar::new_spinner();
            spinner.set_message("判定中...");
            spinner.enable_steady_tick(Duration::from_millis(100));
            if let Err(e) = handle.await {
                tracing::error!(error = %e, "判定タスクが異常終了しました");
            }
            spinner.finish_and_clear();

            match pipeline.state() {
                IdentificationState::Success(found) => {
                    if json {
                        println!("{}", serde_json::to_string_pretty(&found.records)?);
                    } else {
                        println!("✔ Plant Details");
                        if let Some(name) = &found.name {
                            println!("  {} ({:.0}%)", name, found.confidence * 100.0);
                        }
                        println!("---");
                        for line in render_lines(&found.records) {
                            println!("{}", line);
                        }
                    }
                }
                IdentificationState::Failed(kind) => {
                    println!("✖ {}", kind.message());
                }
                IdentificationState::Idle | IdentificationState::Loading => {}
            }
        }

        Commands::Chat { no_greeting } => {
            let source = Arc::new(SimulatedDiagnosis::from_config(&config));
            let mut session = ConversationSession::new(source);
            if !no_greeting {
                session = session.with_greeting(DEFAULT_GREETING);
            }
            chat::run_interactive_chat(&session).await?;
        }

        Commands::Plants { due } => {
            let inventory = PlantInventory::sample();
            let plants = match due {
                Some(days) => inventory.due_within(days),
                None => inventory.plants().iter().collect(),
            };

            println!("🪴 My Plants ({}件)", plants.len());
            println!("---");
            for plant in plants {
                println!(
                    "[{}] {} ({}) - 次の水やり: {}日後 - 状態: {}",
                    plant.id, plant.name, plant.species, plant.days_until_watering, plant.health
                );
            }
        }

        Commands::Notifications { mark_read, clear } => {
            let now = Utc::now();
            let mut center = NotificationCenter::sample(now);

            if let Some(id) = mark_read {
                if !center.mark_read(&id) {
                    println!("お知らせが見つかりません: {}", id);
                }
            }
            if clear {
                center.clear_all();
            }

            if center.is_empty() {
                println!("お知らせはありません");
            } else {
                println!("🔔 お知らせ（未読 {}件）", center.unread_count());
                println!("---");
                for n in center.notifications() {
                    let marker = if n.read { " " } else { "●" };
                    println!("{} [{}] {}", marker, n.id, n.title);
                    println!("    {}", n.message);
                    println!("    {}", relative_time(n.created_at, now));
                }
            }
        }

        Commands::Settings { toggle } => {
            let mut config = config;

            if let Some(name) = toggle {
                let value = config.settings.toggle(&name)?;
                config.save()?;
                println!("✔ {} を {} にしました", name, if value { "ON" } else { "OFF" });
            }

            println!("設定:");
            for (name, enabled) in config.settings.entries() {
                println!("  {:<16} {}", name, if enabled { "ON" } else { "OFF" });
            }
            println!("  (切り替え可能: {})", Settings::NAMES.join(", "));
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  エンドポイント: {}", config.endpoint);
                println!("  言語: {}", config.plant_language);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                println!("  応答待ち時間: {}ms / 写真 {}ms", config.reply_latency_ms, config.image_reply_latency_ms);
                println!("  APIキー: {}", if config.get_api_key().is_ok() { "設定済み" } else { "未設定" });
            }
        }
    }

    Ok(())
}
