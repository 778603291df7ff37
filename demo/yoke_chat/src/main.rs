mod config;
mod render;

use config::{Backend, ChatConfig, NarrationConfig};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tracing::{error, info, warn};
use yoke_core::audio::{AudioOutput, SilentOutput};
use yoke_core::llm::{CompletionApi, GeminiClient, OpenAiCompatClient};
use yoke_core::{
    EngineRegistry, ResponseOrchestrator, Role, VoiceController, YokeApp, YokeError, YokeState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging / tracing
    let filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "info,yoke_core=info,yoke_chat=info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    // Load configuration (defaults + env + optional TOML overlay)
    let cfg = ChatConfig::load();
    info!(target = "yoke_chat", backend = ?cfg.backend, "Starting YOKE chat");

    let state = Arc::new(YokeState::new(EngineRegistry::seeded()));

    let completion: Arc<dyn CompletionApi> = match cfg.backend {
        Backend::Gemini => Arc::new(GeminiClient::new(cfg.gemini.clone())?),
        Backend::OpenAiCompat => Arc::new(OpenAiCompatClient::new(cfg.llm.clone())?),
    };
    let mut orchestrator =
        ResponseOrchestrator::new(completion, Arc::clone(&state)).with_web_search(cfg.web_search);
    if let Some(prompt) = cfg.system_prompt.clone() {
        orchestrator = orchestrator.with_system_instruction(prompt);
    }

    let voice = build_voice(&cfg, &state)?;
    let app = Arc::new(YokeApp::new(Arc::clone(&state), orchestrator, voice));

    // Transcript printer: assistant and system messages arrive here
    let mut conv_rx = state.conversation.read().await.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match conv_rx.recv().await {
                Ok(msg) if msg.role != Role::User => render::message(&msg),
                Ok(_) => {}
                Err(RecvError::Lagged(n)) => {
                    warn!(target = "yoke_chat", skipped = n, "Transcript printer lagged")
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    render::banner();
    render::status_bar(&*state.engines.read().await, &*state.session.read().await);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = signal::ctrl_c() => {
                info!(target = "yoke_chat", "Ctrl-C received, shutting down");
                break;
            }
        };
        let Some(line) = line else { break };
        let input = line.trim();

        match input {
            "" => continue,
            "/quit" | "/exit" => break,
            "/engines" => render::engine_grid(&*state.engines.read().await),
            "/logs" => {
                for entry in state.logs.read().await.entries() {
                    render::log_entry(entry);
                }
            }
            "/status" => {
                let engines = state.engines.read().await;
                let session = state.session.read().await;
                render::status_bar(&engines, &session);
                render::session_stats(&session);
            }
            "/reset" => {
                if app.reset_engines().await == 0 {
                    println!("  all engines already linked");
                }
            }
            cmd if cmd.starts_with('/') => println!("  unknown command: {cmd}"),
            text => {
                // Rounds run in the background so commands stay responsive
                let app = Arc::clone(&app);
                let text = text.to_string();
                tokio::spawn(async move {
                    match app.submit(&text).await {
                        Ok(turn) => {
                            let state = app.state();
                            render::status_bar(
                                &*state.engines.read().await,
                                &*state.session.read().await,
                            );
                            if let Some(narration) = turn.narration {
                                if let Err(e) = narration.await {
                                    error!(target = "yoke_chat", error = %e, "Narration task panicked");
                                }
                            }
                        }
                        Err(YokeError::RoundInFlight) => {
                            println!("  a round is still in flight; wait for the reply")
                        }
                        Err(YokeError::Exhausted) => {
                            println!("  every engine is down; /reset to re-link them")
                        }
                        Err(e) => error!(target = "yoke_chat", error = %e, "Turn failed"),
                    }
                });
            }
        }
    }

    printer.abort();
    info!(target = "yoke_chat", "Exited");
    Ok(())
}

/// Narration always synthesizes through the Gemini speech endpoint
fn build_voice(
    cfg: &ChatConfig,
    state: &Arc<YokeState>,
) -> Result<Option<VoiceController>, Box<dyn std::error::Error>> {
    let NarrationConfig {
        enabled,
        voice,
        realtime,
        device,
    } = &cfg.narration;
    if !*enabled {
        return Ok(None);
    }
    if cfg.gemini.api_key.is_none() {
        warn!(target = "yoke_chat", "Narration disabled: no Gemini API key");
        return Ok(None);
    }
    let speech = Arc::new(GeminiClient::new(cfg.gemini.clone())?);
    let output = build_output(*device, *realtime);
    Ok(Some(VoiceController::new(
        speech,
        output,
        Arc::clone(state),
        voice.clone(),
    )))
}

#[cfg(feature = "playback")]
fn build_output(device: bool, realtime: bool) -> Arc<dyn AudioOutput> {
    if device {
        Arc::new(yoke_core::audio::RodioOutput::new())
    } else {
        Arc::new(SilentOutput::new(realtime))
    }
}

#[cfg(not(feature = "playback"))]
fn build_output(device: bool, realtime: bool) -> Arc<dyn AudioOutput> {
    if device {
        warn!(target = "yoke_chat", "Built without `playback`; narration is silent");
    }
    Arc::new(SilentOutput::new(realtime))
}
