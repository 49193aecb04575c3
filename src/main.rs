use anyhow::{Context, Result};
use dictee::config::Config;
use dictee::input::ConsoleEngine;
use dictee::session::{DictationSession, EventSender, NoWakeLock, SessionHandle};
use dictee::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    println!("✓ Config loaded from ~/.dictee.toml");

    telemetry::init(&config.telemetry)?;
    tracing::info!("dictee starting");
    println!("✓ Telemetry initialized");

    let (events, receiver) = EventSender::channel();
    let (engine, console) = ConsoleEngine::pair(events.clone());

    let session = DictationSession::new(
        engine,
        NoWakeLock,
        config.session_settings(),
        |text: &str, value: Option<u32>| match value {
            Some(number) => println!("« {text} » → {number}"),
            None => println!("« {text} » → pas un nombre"),
        },
        |message: &str| tracing::info!(target: "dictee::session", "{message}"),
    );
    let handle = SessionHandle::new(events, session.subscribe());
    let driver = session.spawn(receiver);

    let mut status = handle.status();
    let indicator = tokio::spawn(async move {
        while status.changed().await.is_ok() {
            let listening = status.borrow_and_update().listening;
            println!("{}", if listening { "🎤 écoute..." } else { "🎤 arrêté" });
        }
    });

    handle.start()?;
    println!("\nSpeak by typing a line. `!no-speech` simulates an engine error.");
    println!("Commands: :start :stop :clear :hide :show :quit (Ctrl+C to exit)\n");

    tokio::select! {
        result = console.run() => result?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            println!("\nShutting down...");
        }
    }

    if handle.close().is_err() {
        tracing::debug!("session loop already exited");
    }
    driver.await.context("session task failed")?;
    indicator.abort();

    Ok(())
}
