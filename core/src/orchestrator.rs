//! Ordered-fallback response orchestrator.
//!
//! Walks the engine registry by descending priority weight, giving each
//! non-failed engine exactly one attempt per turn. The first success ends the
//! round; a failure marks the engine `Failed` for the rest of the session.

use crate::app::{SessionGuard, YokeState};
use crate::conversation::Citation;
use crate::llm::{CompletionApi, CompletionRequest, YOKE_SYSTEM_PROMPT};
use crate::log_stream::LogKind;
use crate::session::SessionState;
use crate::utils::preview;
use crate::{Result, YokeError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratedReply {
    pub text: String,
    pub engine_id: String,
    pub citations: Vec<Citation>,
}

#[derive(Clone)]
pub struct ResponseOrchestrator {
    api: Arc<dyn CompletionApi>,
    state: Arc<YokeState>,
    system_instruction: String,
    web_search: bool,
}

impl ResponseOrchestrator {
    pub fn new(api: Arc<dyn CompletionApi>, state: Arc<YokeState>) -> Self {
        Self {
            api,
            state,
            system_instruction: YOKE_SYSTEM_PROMPT.to_string(),
            web_search: true,
        }
    }

    /// Replace the persona directive sent with every request
    pub fn with_system_instruction(mut self, system_instruction: impl Into<String>) -> Self {
        self.system_instruction = system_instruction.into();
        self
    }

    pub fn with_web_search(mut self, enabled: bool) -> Self {
        self.web_search = enabled;
        self
    }

    /// Run one round for `text`. Fails with `YokeError::Exhausted` when no
    /// engine produced a reply.
    pub async fn orchestrate(&self, text: &str) -> Result<OrchestratedReply> {
        let candidates = self.state.engines.read().await.ranked();
        let active = SessionGuard::new(Arc::clone(&self.state), SessionState::clear_active_engine);
        self.log(
            LogKind::Infiltration,
            format!("Global search probe launched: target [{}...]", preview(text, 10)),
        )
        .await;

        for engine in candidates {
            // status is re-read so a failure recorded since the snapshot still counts
            if self.state.engines.read().await.is_failed(&engine.id) {
                debug!(target = "orchestrator", engine = %engine.id, "Skipping failed engine");
                continue;
            }

            self.state.session.write().await.activate_engine(&engine.id);
            self.log(
                LogKind::Logic,
                format!("Dispatching sub-consciousness cluster [{}]", engine.display_name),
            )
            .await;

            let request = CompletionRequest {
                prompt: text.to_string(),
                system_instruction: self.system_instruction.clone(),
                web_search: self.web_search,
                engine_id: engine.id.clone(),
            };

            match self.api.complete(&request).await {
                Ok(completion) => {
                    self.mutate_core().await;
                    self.state.session.write().await.clear_active_engine();
                    active.disarm();
                    info!(
                        target = "orchestrator",
                        engine = %engine.id,
                        citations = completion.citations.len(),
                        "Reply received"
                    );
                    return Ok(OrchestratedReply {
                        text: completion.text,
                        engine_id: engine.id,
                        citations: completion.citations,
                    });
                }
                Err(e) => {
                    warn!(target = "orchestrator", engine = %engine.id, error = %e, "Engine attempt failed");
                    self.log(
                        LogKind::Error,
                        format!("Node [{}] logic collapse: {}", engine.display_name, e),
                    )
                    .await;
                    self.state.engines.write().await.mark_failed(&engine.id);
                }
            }
        }

        self.state.session.write().await.clear_active_engine();
        active.disarm();
        warn!(target = "orchestrator", "All engines exhausted");
        Err(YokeError::Exhausted)
    }

    async fn mutate_core(&self) {
        {
            let mut session = self.state.session.write().await;
            let mut rng = rand::thread_rng();
            session.mutate(&mut rng);
        }
        self.log(
            LogKind::Mutation,
            "Recursive code rewrite executed: logic weights redistributed.",
        )
        .await;
    }

    async fn log(&self, kind: LogKind, text: impl Into<String>) {
        self.state.logs.write().await.push(kind, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{Engine, EngineCategory, EngineRegistry, EngineStatus};
    use crate::llm::{Completion, MockCompletionApi};
    use mockall::Sequence;

    fn engine(id: &str, weight: u32) -> Engine {
        Engine::new(id, id.to_uppercase(), "Test", 0, EngineCategory::Core, weight, false)
    }

    fn state_with(engines: Vec<Engine>) -> Arc<YokeState> {
        Arc::new(YokeState::new(EngineRegistry::new(engines)))
    }

    #[tokio::test]
    async fn first_success_stops_the_walk() {
        let state = state_with(vec![engine("a", 100), engine("b", 90), engine("c", 80)]);
        let mut api = MockCompletionApi::new();
        let mut seq = Sequence::new();
        api.expect_complete()
            .withf(|r| r.engine_id == "a" && r.web_search)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(YokeError::Api("503".into())));
        api.expect_complete()
            .withf(|r| r.engine_id == "b")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| {
                Ok(Completion {
                    text: "from b".into(),
                    citations: vec![],
                })
            });

        let orch = ResponseOrchestrator::new(Arc::new(api), Arc::clone(&state));
        let reply = orch.orchestrate("hello").await.unwrap();

        assert_eq!(reply.engine_id, "b");
        assert_eq!(reply.text, "from b");
        let engines = state.engines.read().await;
        assert_eq!(engines.get("a").unwrap().status, EngineStatus::Failed);
        assert_eq!(engines.get("b").unwrap().status, EngineStatus::Synced);
        assert_eq!(engines.get("c").unwrap().status, EngineStatus::Synced);
        assert!(state.session.read().await.active_engine_id.is_none());
    }

    #[tokio::test]
    async fn system_directive_is_sent() {
        let state = state_with(vec![engine("a", 1)]);
        let mut api = MockCompletionApi::new();
        api.expect_complete()
            .withf(|r| r.system_instruction == "be brief" && r.prompt == "q")
            .times(1)
            .returning(|_| Ok(Completion::default()));

        let orch = ResponseOrchestrator::new(Arc::new(api), state)
            .with_system_instruction("be brief");
        assert!(orch.orchestrate("q").await.is_ok());
    }
}
