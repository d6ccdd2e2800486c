//! Integration tests for whole calls driven through `CallService`.
//!
//! Flow under test:
//! 1. `start_call` opens a session, writes the call row and speaks the greeting
//! 2. `listen_and_respond` / `take_turn` advance the dialogue
//! 3. `end_call` (or `run_call`) finalizes the row and flushes the transcript
//!
//! Speech runs through the scripted adapters and calls are recorded in memory.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use call_script::adapters::{InMemoryCallRecorder, RecordingSynthesis, ScriptedCapture};
use call_script::application::{
    CallService, CallServiceError, CallSettings, EndCallCommand, Heard, StartCallCommand,
};
use call_script::domain::call::{CallOutcome, CallStatus};
use call_script::domain::dialogue::{DialogueEngine, DialogueState, Speaker};
use call_script::ports::SpeechError;

// =============================================================================
// Test Infrastructure
// =============================================================================

const FULL_CALL: &[&str] = &[
    "hello",
    "okay",
    "fine",
    "yes I am employed",
    "my salary is 55,000",
    "sounds great",
    "sure",
    "okay",
    "yes go ahead",
    "alright",
    "thank you",
];

struct Harness {
    service: CallService,
    capture: ScriptedCapture,
    synthesis: RecordingSynthesis,
    recorder: InMemoryCallRecorder,
}

fn harness(utterances: &[&str]) -> Harness {
    let capture = ScriptedCapture::new(utterances.iter().copied());
    let synthesis = RecordingSynthesis::new();
    let recorder = InMemoryCallRecorder::new();
    let settings = CallSettings {
        listen_timeout: Duration::from_millis(50),
        max_silent_turns: 2,
        ..CallSettings::default()
    };

    let service = CallService::new(
        DialogueEngine::reference().expect("built-in script is valid"),
        Arc::new(capture.clone()),
        Arc::new(synthesis.clone()),
        Arc::new(recorder.clone()),
        settings,
    );

    Harness {
        service,
        capture,
        synthesis,
        recorder,
    }
}

// =============================================================================
// Full Calls
// =============================================================================

#[tokio::test]
async fn full_call_is_recorded_with_transcript() {
    let h = harness(FULL_CALL);

    let record = h
        .service
        .run_call(StartCallCommand::for_customer("Asha Verma"))
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Completed);
    assert_eq!(record.outcome, CallOutcome::Interested);
    assert_eq!(record.final_state, DialogueState::Ended);
    assert_eq!(record.customer_name, "Asha Verma");
    assert_eq!(record.agent_name, "Rahul");
    assert_eq!(record.language, "en-IN");
    assert!(record.end_time.is_some());
    assert!(record.duration_secs.is_some());
    assert_eq!(record.customer_data["salary"], 55_000);

    assert_eq!(h.recorder.call_count().await, 1);
    let stored = h.recorder.call(record.call_id).await.unwrap();
    assert_eq!(stored, record);

    // greeting, two lines per turn, closing marker
    let transcript = h.recorder.transcript(record.call_id).await;
    assert_eq!(transcript.len(), 1 + 2 * FULL_CALL.len() + 1);
    for (i, line) in transcript.iter().enumerate() {
        assert_eq!(line.sequence as usize, i);
    }
    assert_eq!(transcript[1].speaker, Speaker::Customer);
    assert_eq!(transcript[1].text, "hello");
    assert_eq!(
        transcript.last().unwrap().text,
        "Call ended with outcome: interested"
    );

    // greeting plus one reply per turn
    assert_eq!(h.synthesis.spoken().await.len(), 1 + FULL_CALL.len());
    assert!(h.service.active_calls().is_empty().await);
}

#[tokio::test]
async fn every_listen_uses_configured_timing() {
    let h = harness(&["hello"]);

    h.service
        .run_call(StartCallCommand::for_customer("Asha"))
        .await
        .unwrap();

    let requests = h.capture.requests().await;
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.timeout, Duration::from_millis(50));
        assert_eq!(request.phrase_time_limit, Duration::from_secs(10));
        assert_eq!(request.language, "en-IN");
    }
}

#[tokio::test]
async fn hang_up_after_speaking_completes_with_unknown_outcome() {
    let h = harness(&["hello", "okay"]);

    let record = h
        .service
        .run_call(StartCallCommand::for_customer("Asha"))
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::Completed);
    assert_eq!(record.outcome, CallOutcome::Unknown);
    assert_eq!(record.final_state, DialogueState::Ended);
    assert_eq!(h.capture.remaining().await, 0);
}

#[tokio::test]
async fn silent_line_is_not_connected() {
    let h = harness(&["", "  "]);

    let record = h
        .service
        .run_call(StartCallCommand::for_customer("Asha"))
        .await
        .unwrap();

    assert_eq!(record.status, CallStatus::NotConnected);
    assert_eq!(record.outcome, CallOutcome::Unknown);
    // greeting and the closing marker only
    assert_eq!(h.recorder.transcript(record.call_id).await.len(), 2);
}

#[tokio::test]
async fn device_failure_fails_the_call() {
    let h = harness(&["hello"]);
    h.capture
        .push_error(SpeechError::DeviceUnavailable("no microphone".into()))
        .await;

    let err = h
        .service
        .run_call(StartCallCommand::for_customer("Asha"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        CallServiceError::Speech(SpeechError::DeviceUnavailable(_))
    ));

    assert_eq!(h.recorder.call_count().await, 1);
    assert!(h.service.active_calls().is_empty().await);
}

// =============================================================================
// Host-driven Calls
// =============================================================================

#[tokio::test]
async fn objection_mid_call_then_callback() {
    let h = harness(&[]);
    let started = h
        .service
        .start_call(StartCallCommand {
            customer_name: "Asha".into(),
            agent_name: Some("Priya".into()),
            language: Some("hi-IN".into()),
        })
        .await
        .unwrap();
    assert!(started.greeting.unwrap().contains("Priya"));

    for utterance in &FULL_CALL[..5] {
        h.service.take_turn(started.call_id, utterance).await.unwrap();
    }
    let outcome = h
        .service
        .take_turn(started.call_id, "let me think about it")
        .await
        .unwrap();
    assert_eq!(outcome.state, DialogueState::ObjectionHandling);

    let record = h
        .service
        .end_call(EndCallCommand {
            call_id: started.call_id,
            outcome: CallOutcome::CallBack,
            status: CallStatus::Completed,
        })
        .await
        .unwrap();

    assert_eq!(record.outcome, CallOutcome::CallBack);
    assert_eq!(record.final_state, DialogueState::Ended);
    assert_eq!(record.language, "hi-IN");

    let err = h.service.take_turn(started.call_id, "hello").await.unwrap_err();
    assert!(matches!(err, CallServiceError::CallNotFound(_)));
}

#[tokio::test]
async fn blank_capture_leaves_dialogue_untouched() {
    let h = harness(&[""]);
    let started = h
        .service
        .start_call(StartCallCommand::for_customer("Asha"))
        .await
        .unwrap();

    let heard = h.service.listen_and_respond(started.call_id).await.unwrap();
    assert_eq!(heard, Heard::Silence);

    let live = h.service.active_calls().get(started.call_id).await.unwrap();
    let live = live.lock().await;
    assert_eq!(live.session.state(), DialogueState::Greeting);
    assert_eq!(live.session.history().len(), 1);
}

#[tokio::test]
async fn concurrent_calls_do_not_share_state() {
    let h = harness(&[]);
    let names = ["Asha", "Vikram", "Meera", "Karan"];

    let started = join_all(
        names
            .iter()
            .map(|name| h.service.start_call(StartCallCommand::for_customer(*name))),
    )
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()
    .unwrap();
    assert_eq!(h.service.active_calls().len().await, names.len());

    // Only the first call gets past the greeting.
    h.service.take_turn(started[0].call_id, "hello").await.unwrap();

    let ended = join_all(started.iter().map(|s| {
        h.service.end_call(EndCallCommand {
            call_id: s.call_id,
            outcome: CallOutcome::NotInterested,
            status: CallStatus::Completed,
        })
    }))
    .await
    .into_iter()
    .collect::<Result<Vec<_>, _>>()
    .unwrap();

    assert_eq!(h.recorder.call_count().await, names.len());
    assert_eq!(ended[0].final_state, DialogueState::Ended);
    for (record, name) in ended.iter().zip(names) {
        assert_eq!(record.customer_name, name);
    }
    assert_eq!(h.recorder.transcript(started[0].call_id).await.len(), 4);
    assert_eq!(h.recorder.transcript(started[1].call_id).await.len(), 2);
}

#[tokio::test]
async fn end_call_racing_a_turn_keeps_history_whole() {
    for _ in 0..20 {
        let h = harness(&[]);
        let started = h
            .service
            .start_call(StartCallCommand::for_customer("Asha"))
            .await
            .unwrap();
        let call_id = started.call_id;
        let live = h.service.active_calls().get(call_id).await.unwrap();

        let (turn, ended) = tokio::join!(
            h.service.take_turn(call_id, "hello"),
            h.service.end_call(EndCallCommand {
                call_id,
                outcome: CallOutcome::NotInterested,
                status: CallStatus::Completed,
            }),
        );
        let record = ended.unwrap();
        assert_eq!(record.final_state, DialogueState::Ended);

        // The turn either landed before the end or found the call gone or ended.
        let landed = match turn {
            Ok(outcome) => outcome.message.is_some(),
            Err(err) => {
                assert!(matches!(err, CallServiceError::CallNotFound(_)));
                false
            }
        };

        let live = live.lock().await;
        let history = live.session.history();
        assert_eq!(history.len(), if landed { 4 } else { 2 });
        assert_eq!(
            history.last().unwrap().text,
            "Call ended with outcome: not_interested"
        );
        for pair in history.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }

        let transcript = h.recorder.transcript(call_id).await;
        assert_eq!(transcript.len(), history.len());
        assert_eq!(live.persisted, history.len());
    }
}
