//! # nlpthingd — NLP thing daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (config file, env vars)
//! - Install the `tracing` subscriber
//! - Build the NLP thing on top of the lexicon analyzer
//! - Build the axum router, injecting the thing
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;

use anyhow::Context;
use nlpthing_adapter_http_axum::state::AppState;
use nlpthing_adapter_lexicon::LexiconAnalyzer;
use nlpthing_app::nlp;
use nlpthing_app::thing::Thing;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load().context("loading configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.filter))
        .init();

    // Thing
    let thing = build_thing(&config)?;
    tracing::info!(
        id = %thing.info().id,
        properties = thing.properties().len(),
        "thing ready"
    );

    // HTTP
    let app = nlpthing_adapter_http_axum::router::build(AppState::new(thing));

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;
    tracing::info!(address = %bind_addr, "nlpthingd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("nlpthingd stopped");
    Ok(())
}

fn build_thing(config: &Config) -> anyhow::Result<Thing> {
    let info = nlp::thing_info(&config.thing.id, &config.thing.title)?;
    let thing = nlp::nlp_thing(info, Arc::new(LexiconAnalyzer::default()))?
        .executor_config(config.executor())
        .build()?;
    Ok(thing)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "unable to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "unable to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
