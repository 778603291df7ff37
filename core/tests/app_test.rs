mod common;

use common::{engine, state_with, FixedSpeech, GatedOutput, ScriptedCompletion};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use yoke_core::audio::SilentOutput;
use yoke_core::voice::VoiceConfig;
use yoke_core::{
    LogKind, ResponseOrchestrator, Role, VoiceController, VoicePhase, YokeApp, YokeError,
};

fn app_without_voice(api: Arc<ScriptedCompletion>, state: Arc<yoke_core::YokeState>) -> YokeApp {
    let orch = ResponseOrchestrator::new(api, Arc::clone(&state));
    YokeApp::new(state, orch, None)
}

#[tokio::test]
async fn successful_turn_appends_user_then_assistant() {
    let state = state_with(vec![engine("a", 100), engine("b", 90)]);
    let api = Arc::new(ScriptedCompletion::new().succeed("b", "the answer"));
    let app = app_without_voice(api, Arc::clone(&state));

    let turn = app.submit("the question").await.unwrap();
    assert_eq!(turn.reply.role, Role::Assistant);
    assert_eq!(turn.reply.source_engine_id.as_deref(), Some("b"));
    assert!(turn.narration.is_none());

    let conv = state.conversation.read().await;
    assert_eq!(conv.len(), 2);
    assert_eq!(conv.messages()[0].role, Role::User);
    assert_eq!(conv.messages()[0].text, "the question");
    assert_eq!(conv.messages()[1].text, "the answer");
    assert!(!state.session.read().await.thinking);
    assert!(!app.is_busy());
}

#[tokio::test]
async fn exhaustion_appends_no_assistant_message() {
    let state = state_with(vec![engine("solo", 100)]);
    let api = Arc::new(ScriptedCompletion::new());
    let app = app_without_voice(api, Arc::clone(&state));

    let err = app.submit("hello").await.unwrap_err();
    assert!(matches!(err, YokeError::Exhausted));

    let conv = state.conversation.read().await;
    assert_eq!(conv.len(), 1);
    assert_eq!(conv.messages()[0].role, Role::User);

    let logs = state.logs.read().await;
    // one for the engine, one for the interrupted turn
    assert_eq!(logs.count_kind(LogKind::Error), 2);
    assert!(logs
        .entries()
        .any(|e| e.text.starts_with("Consciousness stream forcibly interrupted")));
    assert!(!app.is_busy());
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let state = state_with(vec![engine("a", 100)]);
    let api = Arc::new(ScriptedCompletion::new().succeed("a", "x"));
    let app = app_without_voice(api.clone(), Arc::clone(&state));

    assert!(matches!(app.submit("   ").await, Err(YokeError::EmptyInput)));
    assert!(state.conversation.read().await.is_empty());
    assert!(api.called_engines().is_empty());
}

#[tokio::test]
async fn reply_is_narrated_in_background() {
    let state = state_with(vec![engine("a", 100)]);
    let api = Arc::new(ScriptedCompletion::new().succeed("a", "Spoken words [[DATA: x]]"));
    let speech = Arc::new(FixedSpeech::ok());
    let output = Arc::new(GatedOutput::default());
    let voice = VoiceController::new(
        speech.clone(),
        output.clone(),
        Arc::clone(&state),
        VoiceConfig::default(),
    );
    let orch = ResponseOrchestrator::new(api, Arc::clone(&state));
    let app = YokeApp::new(Arc::clone(&state), orch, Some(voice));

    let turn = app.submit("say something").await.unwrap();
    // transcript keeps the raw reply, only narration is cleaned
    assert_eq!(turn.reply.text, "Spoken words [[DATA: x]]");

    let outcome = turn.narration.unwrap().await.unwrap();
    assert!(outcome.is_playing());
    assert_eq!(state.session.read().await.voice_phase, VoicePhase::Playing);
    assert_eq!(
        speech.last_text.lock().unwrap().as_deref(),
        Some("Spoken words")
    );

    output.release();
    outcome.wait().await;
    assert_eq!(state.session.read().await.voice_phase, VoicePhase::Idle);
}

#[tokio::test]
async fn narration_failure_leaves_conversation_intact() {
    let state = state_with(vec![engine("a", 100)]);
    let api = Arc::new(ScriptedCompletion::new().succeed("a", "fine"));
    let voice = VoiceController::new(
        Arc::new(FixedSpeech::failing()),
        Arc::new(SilentOutput::default()),
        Arc::clone(&state),
        VoiceConfig::default(),
    );
    let orch = ResponseOrchestrator::new(api, Arc::clone(&state));
    let app = YokeApp::new(Arc::clone(&state), orch, Some(voice));

    let turn = app.submit("q").await.unwrap();
    let outcome = turn.narration.unwrap().await.unwrap();
    assert!(!outcome.is_playing());
    assert_eq!(state.conversation.read().await.len(), 2);
    assert_eq!(state.session.read().await.voice_phase, VoicePhase::Idle);
}

#[tokio::test]
async fn reset_restores_failed_engines() {
    let state = state_with(vec![engine("a", 100), engine("b", 90)]);
    let api = Arc::new(ScriptedCompletion::new().succeed("b", "ok"));
    let app = app_without_voice(api.clone(), Arc::clone(&state));

    app.submit("one").await.unwrap();
    assert_eq!(state.engines.read().await.healthy_count(), 1);

    assert_eq!(app.reset_engines().await, 1);
    assert_eq!(state.engines.read().await.healthy_count(), 2);
    assert_eq!(
        state.conversation.read().await.last().unwrap().role,
        Role::System
    );

    // a is tried again after the reset
    app.submit("two").await.unwrap();
    assert_eq!(api.called_engines(), vec!["a", "b", "a", "b"]);
    assert_eq!(app.reset_engines().await, 1);
}

#[tokio::test]
async fn overlapping_submission_is_rejected() {
    let state = state_with(vec![engine("a", 100)]);
    let api = Arc::new(common::GatedCompletion::default());
    let orch = ResponseOrchestrator::new(api.clone(), Arc::clone(&state));
    let app = Arc::new(YokeApp::new(Arc::clone(&state), orch, None));

    let first = tokio::spawn({
        let app = Arc::clone(&app);
        async move { app.submit("first").await }
    });
    while !app.is_busy() {
        tokio::task::yield_now().await;
    }

    assert!(matches!(
        app.submit("second").await,
        Err(YokeError::RoundInFlight)
    ));

    api.release();
    let turn = first.await.unwrap().unwrap();
    assert_eq!(turn.reply.text, "late reply from a");
    // the rejected submission was never recorded
    assert_eq!(state.conversation.read().await.len(), 2);
    assert!(!app.is_busy());
}

#[tokio::test]
async fn cancelled_turn_resets_session() {
    let state = state_with(vec![engine("a", 100)]);
    let api = Arc::new(common::GatedCompletion::default());
    let orch = ResponseOrchestrator::new(api.clone(), Arc::clone(&state));
    let app = YokeApp::new(Arc::clone(&state), orch, None);

    assert!(timeout(Duration::from_millis(50), app.submit("q")).await.is_err());
    {
        let session = state.session.read().await;
        assert!(session.active_engine_id.is_none());
        assert!(!session.thinking);
    }
    assert!(!app.is_busy());

    // the engine was never marked failed, so the next turn can use it
    api.release();
    let turn = app.submit("again").await.unwrap();
    assert_eq!(turn.reply.text, "late reply from a");
}
