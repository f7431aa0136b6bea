// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

mod config;
mod download;
mod render;
mod session;
mod transport;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chat_contracts::AnalyticsResponse;
use clap::{Parser, Subcommand};
use tally::{ChatMessage, Conversation, PresentationAdapter};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::{AppConfig, ConfigOverrides};
use crate::session::ChatSession;
use crate::transport::HttpTransport;

#[derive(Subcommand, Debug, Clone)]
enum Commands {
    /// Send one question and print the reply.
    Ask {
        query: String,
    },
    /// Interactive session. `/export`, `/history` and `/quit` are available.
    Chat,
    /// Render a saved backend response without contacting the backend.
    Render {
        file: PathBuf,
    },
    /// Write the CSV for a saved backend response.
    Export {
        file: PathBuf,
        #[arg(long, default_value_t = false)]
        raw: bool,
    },
}

#[derive(Parser, Debug, Clone)]
#[command(name = "analytics-chat")]
#[command(about = "Chat with the analytics backend and render its charts in the terminal.")]
struct Cli {
    #[arg(long, default_value_t = false)]
    debug: bool,
    #[arg(long)]
    endpoint: Option<String>,
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long)]
    download_dir: Option<PathBuf>,
    #[arg(long)]
    locale: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            endpoint: self.endpoint.clone(),
            timeout_secs: self.timeout_secs,
            download_dir: self.download_dir.clone(),
            locale: self.locale.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let args = Cli::parse();

    let filter = if args.debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("debug,reqwest=info,hyper=info,h2=info,hyper_util=info,rustls=info")
        })
    } else {
        EnvFilter::new("info,reqwest=warn,hyper=warn,h2=warn,hyper_util=warn,rustls=warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let config = AppConfig::from_env(&args.overrides())?;
    info!(endpoint = %config.endpoint, "Starting analytics chat");
    let adapter = PresentationAdapter::with_config(config.presentation.clone())?;

    match args.command {
        Commands::Ask { query } => {
            let session = connect(&config)?;
            if let Some(id) = session.ask(&query).await {
                let conversation = session.conversation();
                let conversation = conversation.read().await;
                if let Some(entry) = conversation.get(id) {
                    print!("{}", render::render_entry(entry, &adapter));
                }
            }
        }
        Commands::Chat => {
            let session = connect(&config)?;
            run_chat(&session, &adapter, &config).await?;
        }
        Commands::Render { file } => {
            let conversation = load_saved(&file)?;
            for entry in conversation.iter() {
                print!("{}", render::render_entry(entry, &adapter));
            }
        }
        Commands::Export { file, raw } => {
            let conversation = load_saved(&file)?;
            let entry = conversation
                .iter()
                .last()
                .context("saved response produced no message")?;
            let export = download::export_entry(entry, raw)?;
            let path = download::write_export(&config.download_dir, &export)?;
            println!("{}", path.display());
        }
    }

    Ok(())
}

fn connect(config: &AppConfig) -> Result<ChatSession> {
    let transport = HttpTransport::new(config.endpoint.clone(), config.timeout)?;
    Ok(ChatSession::new(Arc::new(transport)))
}

fn load_saved(file: &Path) -> Result<Conversation> {
    let text = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    let response: AnalyticsResponse = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a backend response", file.display()))?;
    let mut conversation = Conversation::new();
    conversation.push(ChatMessage::from_response(response));
    Ok(conversation)
}

async fn run_chat(
    session: &ChatSession,
    adapter: &PresentationAdapter,
    config: &AppConfig,
) -> Result<()> {
    println!("📊 Analytics Assistant (type /quit to leave)");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line {
            "" => continue,
            "/quit" | "/exit" => break,
            "/history" => {
                let conversation = session.conversation();
                let conversation = conversation.read().await;
                for entry in conversation.iter() {
                    print!("{}", render::render_entry(entry, adapter));
                }
            }
            "/export" | "/export raw" => {
                let conversation = session.conversation();
                let conversation = conversation.read().await;
                let Some((entry, _)) = conversation.last_chart() else {
                    println!("Nothing to export yet.");
                    continue;
                };
                let written = download::export_entry(entry, line.ends_with("raw"))
                    .and_then(|export| download::write_export(&config.download_dir, &export));
                match written {
                    Ok(path) => println!("Saved {}", path.display()),
                    Err(e) if e.is_recoverable() => {
                        warn!(category = e.category(), error = %e, "export failed");
                        println!("{}", e.user_message());
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            query => {
                println!("thinking...");
                if let Some(id) = session.ask(query).await {
                    let conversation = session.conversation();
                    let conversation = conversation.read().await;
                    if let Some(entry) = conversation.get(id) {
                        print!("{}", render::render_entry(entry, adapter));
                    }
                }
            }
        }
    }
    Ok(())
}
