use anyhow::Context;
use campusbot::kernel::conversation::ConversationTurn;
use campusbot::kernel::telemetry::MemoryQueryLog;
use campusbot::{Engine, EngineConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("setting default subscriber")?;

    // 2. Config
    let config_path = std::env::var_os("CAMPUSBOT_CONFIG").map(PathBuf::from);
    let config = EngineConfig::load(config_path.as_deref())?;
    let history_turns = config.history_turns;

    // 3. Engine
    let query_log = Arc::new(MemoryQueryLog::new());
    let engine = Engine::with_query_log(config, query_log.clone());

    let available = engine.provider_status().iter().filter(|s| s.available).count();
    tracing::info!("Engine ready, {} generative providers available", available);

    // 4. Ctrl+C abandons the in-flight provider call and ends the loop
    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            signal.cancel();
        }
    });

    println!("Ask a question. '/status' shows providers, '/stats' shows telemetry, '/unanswered' lists review items.");

    // 5. Read-eval loop
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut history: Vec<ConversationTurn> = Vec::new();

    loop {
        let line = tokio::select! {
            _ = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        let Some(line) = line else { break };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        match message {
            "/status" => {
                println!("{}", serde_json::to_string_pretty(&engine.provider_status())?);
                continue;
            }
            "/stats" => {
                println!("{}", serde_json::to_string_pretty(&engine.telemetry_snapshot())?);
                continue;
            }
            "/unanswered" => {
                println!("{}", serde_json::to_string_pretty(&query_log.unanswered())?);
                continue;
            }
            _ => {}
        }

        let result = engine
            .process_with_cancel(message, Some("console"), &history, &shutdown.child_token())
            .await;

        println!("{}\n", result.text);
        println!(
            "[intent={} confidence={:.2} provider={} {}ms]",
            result.intent_name, result.confidence, result.provider_used, result.elapsed_ms
        );

        history.push(ConversationTurn::user(message));
        history.push(ConversationTurn::assistant(result.text));
        let keep = history.len().saturating_sub(history_turns);
        history.drain(..keep);
    }

    Ok(())
}
