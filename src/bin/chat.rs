//! Interactive terminal chat against the proxy.
//! Run with: cargo run --bin codehelper
//!
//! Type a question and press Enter. `/quit` or Ctrl+D exits.

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use codehelper_chat::client::ChatClient;
use codehelper_chat::config::ClientConfig;
use codehelper_chat::conversation::{ChatSession, Message, Role};

const QUIT_COMMAND: &str = "/quit";

fn print_message(message: &Message) {
    let who = match message.role() {
        Role::User => "you",
        Role::Assistant => "codehelper",
    };
    let time = message.timestamp().with_timezone(&Local).format("%H:%M:%S");
    println!("[{time}] {who}:");
    for line in message.content().lines() {
        println!("  {line}");
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("> ");
    std::io::stdout().flush()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they don't interleave with the conversation.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = ClientConfig::from_env().context("loading client configuration")?;
    let client = ChatClient::new(&config).context("building HTTP client")?;
    let mut session = ChatSession::new(Arc::new(client));

    if !session.check_backend().await {
        eprintln!(
            "warning: {} is not responding; messages may fail until the backend is up",
            config.api_url()
        );
    }

    for message in session.state().messages() {
        print_message(message);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt()?;
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        if line.trim() == QUIT_COMMAND {
            break;
        }
        if !session.submit(&line) {
            continue;
        }

        println!("thinking...");
        if let Some(reply) = session.wait_for_reply().await {
            print_message(&reply);
        }
        println!("({} messages)", session.state().exchange_count());
    }

    Ok(())
}
