//! `wabot run`: wire the session bridge, the dispatcher and the event loop.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use wabot_core::dispatch::{Dispatcher, PrivateReplyMode};
use wabot_core::llm::{AiResponder, ResponderSettings};
use wabot_core::runtime::EventRunner;
use wabot_infra::bridge::BridgeSession;
use wabot_infra::config::load_bot_config;
use wabot_infra::llm::OpenAiCompatibleProvider;
use wabot_infra::llm::openai_compat::config::OpenAiCompatConfig;
use wabot_infra::pairing::QrPairingSurface;
use wabot_infra::secret::resolve_api_key;
use wabot_types::config::BotConfig;

use super::RunArgs;

/// Run until the bridge goes away or a shutdown signal arrives.
pub async fn run(args: RunArgs, config_path: &Path) -> anyhow::Result<()> {
    let mut config = load_bot_config(config_path).await;
    apply_overrides(&mut config, &args);

    let private = private_reply_mode(&config)?;
    info!(mode = private.label(), "Private chat reply mode selected");

    let (session, events) =
        BridgeSession::spawn(&config.bridge).context("failed to start the session bridge")?;
    let session = Arc::new(session);

    let shutdown = CancellationToken::new();
    let dispatcher = Arc::new(Dispatcher::new(
        Arc::clone(&session),
        &config,
        private,
        shutdown.clone(),
    ));
    let runner = EventRunner::new(dispatcher, QrPairingSurface::new(args.qr_png.clone()));

    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        crate::shutdown_signal().await;
        info!("Shutdown signal received");
        signal_token.cancel();
    });

    println!(
        "  {} wabot is starting. Scan the QR code when it appears.",
        console::style("⚡").bold()
    );
    println!("  {}", console::style("Press Ctrl+C to stop").dim());

    let stats = runner.run(events, shutdown).await;
    session.kill();

    println!();
    println!(
        "  Stopped after {} messages, {} group joins ({} failed).",
        console::style(stats.messages).cyan(),
        console::style(stats.group_joins).cyan(),
        console::style(stats.failures).yellow()
    );
    Ok(())
}

/// Command-line bridge settings take precedence over the config file.
fn apply_overrides(config: &mut BotConfig, args: &RunArgs) {
    if let Some(bridge) = &args.bridge {
        config.bridge.command = Some(bridge.clone());
    }
    if !args.bridge_args.is_empty() {
        config.bridge.args = args.bridge_args.clone();
    }
}

/// AI replies when a credential is present, canned replies otherwise.
fn private_reply_mode(
    config: &BotConfig,
) -> anyhow::Result<PrivateReplyMode<OpenAiCompatibleProvider>> {
    let Some(api_key) = resolve_api_key(&config.ai.api_key_env) else {
        warn!(
            var = %config.ai.api_key_env,
            "No AI credential found, private chats get the canned greeting"
        );
        return Ok(PrivateReplyMode::canned(config));
    };

    let provider =
        OpenAiCompatibleProvider::new(OpenAiCompatConfig::from_ai_config(&config.ai, api_key))
            .context("failed to create AI provider")?;
    info!(base_url = %config.ai.base_url, model = provider.model(), "AI replies enabled");

    Ok(PrivateReplyMode::Ai(AiResponder::new(
        provider,
        ResponderSettings::from(&config.ai),
    )))
}
