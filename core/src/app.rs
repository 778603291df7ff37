//! Application facade: shared state plus the full user turn.

use crate::conversation::{Conversation, Message};
use crate::engine::EngineRegistry;
use crate::log_stream::{LogKind, LogStream};
use crate::orchestrator::ResponseOrchestrator;
use crate::session::SessionState;
use crate::voice::{SpeakOutcome, VoiceController};
use crate::{Result, YokeError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// All mutable state of one chat session. Guards are never held across an
/// external call.
#[derive(Debug, Default)]
pub struct YokeState {
    pub engines: RwLock<EngineRegistry>,
    pub session: RwLock<SessionState>,
    pub logs: RwLock<LogStream>,
    pub conversation: RwLock<Conversation>,
}

impl YokeState {
    pub fn new(engines: EngineRegistry) -> Self {
        Self {
            engines: RwLock::new(engines),
            ..Self::default()
        }
    }
}

/// What a successful turn produced
#[derive(Debug)]
pub struct TurnOutcome {
    pub reply: Message,
    /// Background narration, present when a voice controller is attached
    pub narration: Option<JoinHandle<SpeakOutcome>>,
}

pub struct YokeApp {
    state: Arc<YokeState>,
    orchestrator: ResponseOrchestrator,
    voice: Option<VoiceController>,
    in_flight: Arc<AtomicBool>,
}

/// Apply `fix` to the session from synchronous code such as `Drop`. When the
/// lock is contended the fix runs on a spawned task instead.
pub(crate) fn settle_session<F>(state: &Arc<YokeState>, fix: F)
where
    F: FnOnce(&mut SessionState) + Send + 'static,
{
    if let Ok(mut session) = state.session.try_write() {
        fix(&mut session);
        return;
    }
    match Handle::try_current() {
        Ok(handle) => {
            let state = Arc::clone(state);
            handle.spawn(async move {
                fix(&mut *state.session.write().await);
            });
        }
        Err(_) => warn!(target = "yoke_app", "No runtime to settle session state"),
    }
}

/// Runs a session fix-up if dropped before `disarm`, so a cancelled future
/// cannot leave a transient state behind.
pub(crate) struct SessionGuard<F>
where
    F: FnOnce(&mut SessionState) + Send + 'static,
{
    state: Arc<YokeState>,
    fix: Option<F>,
}

impl<F> SessionGuard<F>
where
    F: FnOnce(&mut SessionState) + Send + 'static,
{
    pub(crate) fn new(state: Arc<YokeState>, fix: F) -> Self {
        Self {
            state,
            fix: Some(fix),
        }
    }

    pub(crate) fn disarm(mut self) {
        self.fix = None;
    }
}

impl<F> Drop for SessionGuard<F>
where
    F: FnOnce(&mut SessionState) + Send + 'static,
{
    fn drop(&mut self) {
        if let Some(fix) = self.fix.take() {
            debug!(target = "yoke_app", "Settling session after cancellation");
            settle_session(&self.state, fix);
        }
    }
}

/// Clears the in-flight flag however the turn ends. A turn dropped before it
/// settled also has its thinking flag and active engine reset, and the flag
/// is only released after that reset.
struct RoundGuard {
    flag: Arc<AtomicBool>,
    state: Arc<YokeState>,
    settled: bool,
}

impl Drop for RoundGuard {
    fn drop(&mut self) {
        if self.settled {
            self.flag.store(false, Ordering::Release);
            return;
        }
        warn!(target = "yoke_app", "Turn cancelled mid-round");
        let flag = Arc::clone(&self.flag);
        settle_session(&self.state, move |session| {
            session.set_thinking(false);
            session.clear_active_engine();
            flag.store(false, Ordering::Release);
        });
    }
}

impl YokeApp {
    pub fn new(
        state: Arc<YokeState>,
        orchestrator: ResponseOrchestrator,
        voice: Option<VoiceController>,
    ) -> Self {
        Self {
            state,
            orchestrator,
            voice,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn state(&self) -> &Arc<YokeState> {
        &self.state
    }

    pub fn voice(&self) -> Option<&VoiceController> {
        self.voice.as_ref()
    }

    /// Whether an orchestration round is running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Handle one user submission.
    ///
    /// The user message is recorded before any engine is tried. A submission
    /// made while another round is running is rejected with `RoundInFlight`.
    pub async fn submit(&self, text: &str) -> Result<TurnOutcome> {
        if text.trim().is_empty() {
            return Err(YokeError::EmptyInput);
        }
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!(target = "yoke_app", "Submission rejected: round in flight");
            return Err(YokeError::RoundInFlight);
        }
        let mut round = RoundGuard {
            flag: Arc::clone(&self.in_flight),
            state: Arc::clone(&self.state),
            settled: false,
        };

        self.state
            .conversation
            .write()
            .await
            .append(Message::user(text));
        self.state.session.write().await.set_thinking(true);

        let result = self.orchestrator.orchestrate(text).await;
        self.state.session.write().await.set_thinking(false);
        round.settled = true;

        match result {
            Ok(reply) => {
                let message = Message::assistant(reply.text, reply.engine_id, reply.citations);
                self.state
                    .conversation
                    .write()
                    .await
                    .append(message.clone());
                info!(
                    target = "yoke_app",
                    engine = ?message.source_engine_id,
                    "Assistant reply appended"
                );

                let narration = self.voice.clone().map(|voice| {
                    let text = message.text.clone();
                    tokio::spawn(async move { voice.speak(&text).await })
                });
                Ok(TurnOutcome {
                    reply: message,
                    narration,
                })
            }
            Err(e) => {
                self.state.logs.write().await.push(
                    LogKind::Error,
                    "Consciousness stream forcibly interrupted; cold-starting redundant links.",
                );
                Err(e)
            }
        }
    }

    /// Operator command: bring failed engines back. Recorded as a system
    /// message so the transcript shows why they reappear.
    pub async fn reset_engines(&self) -> usize {
        let restored = self.state.engines.write().await.reset_failed();
        if restored > 0 {
            self.state.logs.write().await.push(
                LogKind::Evolution,
                format!("{} engine(s) re-linked by operator", restored),
            );
            self.state
                .conversation
                .write()
                .await
                .append(Message::system(format!("{} failed engine(s) restored", restored)));
        }
        restored
    }
}
