//! CallService - Hosts scripted calls against the speech and recorder ports.
//!
//! The dialogue engine decides what to say; this service decides when to
//! listen, what to do with silence, and when the call is over.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use super::active_calls::{ActiveCalls, LiveCall, LiveCallHandle};
use crate::config::AppConfig;
use crate::domain::call::{transcript_since, CallOutcome, CallRecord, CallStatus};
use crate::domain::dialogue::{DialogueEngine, DialogueState, TurnOutcome};
use crate::domain::foundation::{CallId, DomainError, StateMachine};
use crate::ports::{
    CallRecorder, CaptureRequest, RecorderError, SpeechCapture, SpeechError, SpeechSynthesis,
};

/// Errors surfaced to the host
#[derive(Debug, Error)]
pub enum CallServiceError {
    #[error("Call not found: {0}")]
    CallNotFound(CallId),

    #[error("Speech capture failed: {0}")]
    Speech(#[from] SpeechError),

    #[error("Recorder failed: {0}")]
    Recorder(#[from] RecorderError),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Per-host call defaults and capture timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallSettings {
    pub default_agent_name: String,
    pub default_language: String,
    pub listen_timeout: Duration,
    pub phrase_time_limit: Duration,
    pub max_silent_turns: u32,
}

impl CallSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            default_agent_name: config.script.default_agent_name.clone(),
            default_language: config.script.default_language.clone(),
            listen_timeout: config.capture.listen_timeout(),
            phrase_time_limit: config.capture.phrase_time_limit(),
            max_silent_turns: config.capture.max_silent_turns,
        }
    }
}

impl Default for CallSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Command to place a call
#[derive(Debug, Clone)]
pub struct StartCallCommand {
    pub customer_name: String,
    /// Falls back to the configured agent name
    pub agent_name: Option<String>,
    /// Falls back to the configured language
    pub language: Option<String>,
}

impl StartCallCommand {
    pub fn for_customer(customer_name: impl Into<String>) -> Self {
        Self {
            customer_name: customer_name.into(),
            agent_name: None,
            language: None,
        }
    }
}

/// Result of placing a call
#[derive(Debug, Clone)]
pub struct StartCallResult {
    pub call_id: CallId,
    pub greeting: Option<String>,
    pub state: DialogueState,
}

/// Command to close a call
#[derive(Debug, Clone, Copy)]
pub struct EndCallCommand {
    pub call_id: CallId,
    pub outcome: CallOutcome,
    pub status: CallStatus,
}

/// What one listen produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Heard {
    /// Nothing intelligible; the dialogue was not touched.
    Silence,
    Turn(TurnOutcome),
}

/// Orchestrates calls across the engine and the ports.
pub struct CallService {
    engine: DialogueEngine,
    capture: Arc<dyn SpeechCapture>,
    synthesis: Arc<dyn SpeechSynthesis>,
    recorder: Arc<dyn CallRecorder>,
    calls: ActiveCalls,
    settings: CallSettings,
}

impl CallService {
    pub fn new(
        engine: DialogueEngine,
        capture: Arc<dyn SpeechCapture>,
        synthesis: Arc<dyn SpeechSynthesis>,
        recorder: Arc<dyn CallRecorder>,
        settings: CallSettings,
    ) -> Self {
        Self {
            engine,
            capture,
            synthesis,
            recorder,
            calls: ActiveCalls::new(),
            settings,
        }
    }

    pub fn engine(&self) -> &DialogueEngine {
        &self.engine
    }

    pub fn active_calls(&self) -> &ActiveCalls {
        &self.calls
    }

    /// Opens a session, records the call row and speaks the greeting.
    pub async fn start_call(&self, cmd: StartCallCommand) -> Result<StartCallResult, CallServiceError> {
        let customer_name = cmd.customer_name.trim();
        if customer_name.is_empty() {
            return Err(DomainError::validation("customer_name", "Customer name is required").into());
        }
        let agent_name = cmd
            .agent_name
            .unwrap_or_else(|| self.settings.default_agent_name.clone());
        let language = cmd
            .language
            .unwrap_or_else(|| self.settings.default_language.clone());

        let session = self.engine.start_session(customer_name, &agent_name, &language);
        let call_id = session.id();
        let greeting = self.engine.next_prompt(&session);
        let state = session.state();

        let live = LiveCall::new(session);
        self.recorder.record_call(&live.record).await?;
        let handle = self.calls.insert(live).await?;
        self.persist_new_lines(&handle).await;

        if let Some(text) = &greeting {
            self.say(call_id, text, &language).await;
        }

        Ok(StartCallResult {
            call_id,
            greeting,
            state,
        })
    }

    /// Runs one customer utterance through the engine and speaks the reply.
    pub async fn take_turn(&self, call_id: CallId, text: &str) -> Result<TurnOutcome, CallServiceError> {
        let handle = self.live(call_id).await?;

        let (outcome, language) = {
            let mut live = handle.lock().await;
            let outcome = self.engine.process_utterance(&mut live.session, text);
            (outcome, live.session.language().to_string())
        };
        self.persist_new_lines(&handle).await;

        if let Some(message) = &outcome.message {
            self.say(call_id, message, &language).await;
        }
        Ok(outcome)
    }

    /// Listens once. Silence leaves the dialogue untouched.
    pub async fn listen_and_respond(&self, call_id: CallId) -> Result<Heard, CallServiceError> {
        let handle = self.live(call_id).await?;
        let language = handle.lock().await.session.language().to_string();

        let request = CaptureRequest {
            call_id,
            language,
            timeout: self.settings.listen_timeout,
            phrase_time_limit: self.settings.phrase_time_limit,
        };

        match self.capture.listen(&request).await? {
            Some(text) if !text.trim().is_empty() => Ok(Heard::Turn(self.take_turn(call_id, &text).await?)),
            _ => {
                tracing::debug!(call_id = %call_id, "silence");
                Ok(Heard::Silence)
            }
        }
    }

    /// Closes the call, writes the final row and any unwritten transcript.
    ///
    /// The call stays registered until every write has succeeded, so a
    /// failed end can be retried. A rejected status leaves the call live
    /// and untouched.
    pub async fn end_call(&self, cmd: EndCallCommand) -> Result<CallRecord, CallServiceError> {
        let handle = self.live(cmd.call_id).await?;
        let mut live = handle.lock().await;

        if !live.record.status.is_terminal() {
            live.record.status.transition_to(cmd.status)?;
            self.engine.end_session(&mut live.session, cmd.outcome);

            let mut record = live.record.clone();
            record.finish(&live.session, cmd.status)?;
            self.recorder.record_call(&record).await?;
            live.record = record;
        }

        let pending = transcript_since(&live.session, live.persisted);
        for line in &pending {
            self.recorder.record_transcript(line).await?;
            live.persisted += 1;
        }

        let record = live.record.clone();
        drop(live);
        self.calls.remove(cmd.call_id).await;

        tracing::info!(
            call_id = %cmd.call_id,
            status = %record.status,
            outcome = %record.outcome,
            duration_secs = record.duration_secs.unwrap_or_default(),
            "call ended"
        );
        Ok(record)
    }

    /// Drives a whole call: greet, then listen and respond until the script
    /// ends, the customer hangs up, or they stay silent too long.
    ///
    /// A call that runs the script to its end is recorded as interested.
    pub async fn run_call(&self, cmd: StartCallCommand) -> Result<CallRecord, CallServiceError> {
        let started = self.start_call(cmd).await?;
        let call_id = started.call_id;
        let mut silent_turns = 0u32;

        loop {
            match self.listen_and_respond(call_id).await {
                Ok(Heard::Turn(outcome)) => {
                    silent_turns = 0;
                    if outcome.state == DialogueState::Ended {
                        return self
                            .end_call(EndCallCommand {
                                call_id,
                                outcome: CallOutcome::Interested,
                                status: CallStatus::Completed,
                            })
                            .await;
                    }
                }
                Ok(Heard::Silence) => {
                    silent_turns += 1;
                    if silent_turns >= self.settings.max_silent_turns {
                        let status = if self.customer_spoke(call_id).await? {
                            CallStatus::Failed
                        } else {
                            CallStatus::NotConnected
                        };
                        tracing::info!(call_id = %call_id, silent_turns, "giving up on silent call");
                        return self
                            .end_call(EndCallCommand {
                                call_id,
                                outcome: CallOutcome::Unknown,
                                status,
                            })
                            .await;
                    }
                }
                Err(CallServiceError::Speech(SpeechError::Closed)) => {
                    let status = if self.customer_spoke(call_id).await? {
                        CallStatus::Completed
                    } else {
                        CallStatus::NotConnected
                    };
                    tracing::info!(call_id = %call_id, "customer hung up");
                    return self
                        .end_call(EndCallCommand {
                            call_id,
                            outcome: CallOutcome::Unknown,
                            status,
                        })
                        .await;
                }
                Err(CallServiceError::Speech(err)) => {
                    tracing::warn!(call_id = %call_id, error = %err, "speech capture failed");
                    self.end_call(EndCallCommand {
                        call_id,
                        outcome: CallOutcome::Unknown,
                        status: CallStatus::Failed,
                    })
                    .await?;
                    return Err(err.into());
                }
                Err(other) => return Err(other),
            }
        }
    }

    async fn live(&self, call_id: CallId) -> Result<LiveCallHandle, CallServiceError> {
        self.calls
            .get(call_id)
            .await
            .ok_or(CallServiceError::CallNotFound(call_id))
    }

    async fn customer_spoke(&self, call_id: CallId) -> Result<bool, CallServiceError> {
        let handle = self.live(call_id).await?;
        let live = handle.lock().await;
        Ok(live.session.customer_turns() > 0)
    }

    /// Best-effort transcript write. Lines that fail stay pending and are
    /// retried when the call ends.
    async fn persist_new_lines(&self, handle: &LiveCallHandle) {
        let mut live = handle.lock().await;
        let pending = transcript_since(&live.session, live.persisted);
        for line in &pending {
            if let Err(err) = self.recorder.record_transcript(line).await {
                tracing::warn!(
                    call_id = %line.call_id,
                    sequence = line.sequence,
                    error = %err,
                    "transcript write deferred"
                );
                return;
            }
            live.persisted += 1;
        }
    }

    async fn say(&self, call_id: CallId, text: &str, language: &str) {
        if let Err(err) = self.synthesis.speak(text, language).await {
            tracing::warn!(call_id = %call_id, error = %err, "speech synthesis failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    use crate::adapters::{InMemoryCallRecorder, RecordingSynthesis, ScriptedCapture};
    use crate::domain::call::TranscriptRecord;
    use crate::domain::foundation::ErrorCode;

    struct Harness {
        service: CallService,
        recorder: InMemoryCallRecorder,
        synthesis: RecordingSynthesis,
    }

    fn harness(utterances: &[&str]) -> Harness {
        let recorder = InMemoryCallRecorder::new();
        let synthesis = RecordingSynthesis::new();
        let service = CallService::new(
            DialogueEngine::reference().unwrap(),
            Arc::new(ScriptedCapture::new(utterances.iter().copied())),
            Arc::new(synthesis.clone()),
            Arc::new(recorder.clone()),
            CallSettings::default(),
        );
        Harness {
            service,
            recorder,
            synthesis,
        }
    }

    mod start {
        use super::*;

        #[tokio::test]
        async fn start_call_greets_and_records() {
            let h = harness(&[]);
            let started = h
                .service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();

            assert_eq!(started.state, DialogueState::Greeting);
            let greeting = started.greeting.unwrap();
            assert!(greeting.contains("Asha") && greeting.contains("Rahul"));
            assert_eq!(h.synthesis.spoken().await, vec![greeting]);

            let record = h.recorder.call(started.call_id).await.unwrap();
            assert_eq!(record.status, CallStatus::InProgress);
            assert_eq!(h.recorder.transcript(started.call_id).await.len(), 1);
        }

        #[tokio::test]
        async fn blank_customer_name_is_rejected() {
            let h = harness(&[]);
            let err = h
                .service
                .start_call(StartCallCommand::for_customer("  "))
                .await
                .unwrap_err();
            assert!(matches!(err, CallServiceError::Domain(e) if e.code == ErrorCode::ValidationFailed));
        }
    }

    mod turns {
        use super::*;

        #[tokio::test]
        async fn unknown_call_is_not_found() {
            let h = harness(&[]);
            let err = h.service.take_turn(CallId::new(), "hello").await.unwrap_err();
            assert!(matches!(err, CallServiceError::CallNotFound(_)));
        }

        #[tokio::test]
        async fn silence_does_not_touch_dialogue() {
            let h = harness(&["", "   "]);
            let started = h
                .service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();

            assert_eq!(h.service.listen_and_respond(started.call_id).await.unwrap(), Heard::Silence);
            assert_eq!(h.service.listen_and_respond(started.call_id).await.unwrap(), Heard::Silence);

            let handle = h.service.active_calls().get(started.call_id).await.unwrap();
            assert_eq!(handle.lock().await.session.history().len(), 1);
        }

        #[tokio::test]
        async fn synthesis_failure_does_not_fail_turn() {
            let recorder = InMemoryCallRecorder::new();
            let service = CallService::new(
                DialogueEngine::reference().unwrap(),
                Arc::new(ScriptedCapture::new(["yes"])),
                Arc::new(RecordingSynthesis::failing()),
                Arc::new(recorder),
                CallSettings::default(),
            );
            let started = service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            let heard = service.listen_and_respond(started.call_id).await.unwrap();
            assert!(matches!(heard, Heard::Turn(o) if o.state == DialogueState::ScriptIntroduction));
        }
    }

    mod ending {
        use super::*;
        use std::sync::atomic::{AtomicBool, Ordering};

        #[tokio::test]
        async fn end_call_unregisters_and_finishes_record() {
            let h = harness(&[]);
            let started = h
                .service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            h.service.take_turn(started.call_id, "hello").await.unwrap();

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
            assert!(h.service.active_calls().is_empty().await);
            // greeting, customer, reply, end marker
            assert_eq!(h.recorder.transcript(started.call_id).await.len(), 4);

            let again = h
                .service
                .end_call(EndCallCommand {
                    call_id: started.call_id,
                    outcome: CallOutcome::Dnc,
                    status: CallStatus::Completed,
                })
                .await;
            assert!(matches!(again, Err(CallServiceError::CallNotFound(_))));
        }

        /// In-memory recorder whose writes can be switched off.
        #[derive(Default)]
        struct FlakyRecorder {
            inner: InMemoryCallRecorder,
            calls_down: AtomicBool,
            transcripts_down: AtomicBool,
        }

        #[async_trait]
        impl CallRecorder for FlakyRecorder {
            async fn record_call(&self, call: &CallRecord) -> Result<(), RecorderError> {
                if self.calls_down.load(Ordering::SeqCst) {
                    return Err(RecorderError::Unavailable("db down".into()));
                }
                self.inner.record_call(call).await
            }

            async fn record_transcript(&self, line: &TranscriptRecord) -> Result<(), RecorderError> {
                if self.transcripts_down.load(Ordering::SeqCst) {
                    return Err(RecorderError::Unavailable("db down".into()));
                }
                self.inner.record_transcript(line).await
            }
        }

        fn flaky_service() -> (CallService, Arc<FlakyRecorder>) {
            let recorder = Arc::new(FlakyRecorder::default());
            let service = CallService::new(
                DialogueEngine::reference().unwrap(),
                Arc::new(ScriptedCapture::new(Vec::<String>::new())),
                Arc::new(RecordingSynthesis::new()),
                recorder.clone(),
                CallSettings::default(),
            );
            (service, recorder)
        }

        fn completed(call_id: CallId) -> EndCallCommand {
            EndCallCommand {
                call_id,
                outcome: CallOutcome::Unknown,
                status: CallStatus::Completed,
            }
        }

        #[tokio::test]
        async fn deferred_transcripts_are_flushed_at_end() {
            let (service, recorder) = flaky_service();
            recorder.transcripts_down.store(true, Ordering::SeqCst);

            let started = service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            service.take_turn(started.call_id, "hello").await.unwrap();
            assert!(recorder.inner.transcript(started.call_id).await.is_empty());

            recorder.transcripts_down.store(false, Ordering::SeqCst);
            service.end_call(completed(started.call_id)).await.unwrap();

            let lines = recorder.inner.transcript(started.call_id).await;
            assert_eq!(lines.len(), 4);
            let sequences: Vec<u32> = lines.iter().map(|l| l.sequence).collect();
            assert_eq!(sequences, vec![0, 1, 2, 3]);
        }

        #[tokio::test]
        async fn rejected_status_leaves_call_live() {
            let h = harness(&[]);
            let started = h
                .service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            h.service.take_turn(started.call_id, "hello").await.unwrap();

            let err = h
                .service
                .end_call(EndCallCommand {
                    call_id: started.call_id,
                    outcome: CallOutcome::Interested,
                    status: CallStatus::InProgress,
                })
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                CallServiceError::Domain(ref e) if e.code == ErrorCode::InvalidStateTransition
            ));

            {
                let live = h.service.active_calls().get(started.call_id).await.unwrap();
                let live = live.lock().await;
                assert_eq!(live.session.state(), DialogueState::ScriptIntroduction);
                assert!(live.session.closure().is_none());
                assert_eq!(live.session.history().len(), 3);
            }

            let record = h.service.end_call(completed(started.call_id)).await.unwrap();
            assert_eq!(record.status, CallStatus::Completed);
            assert_eq!(h.recorder.call(started.call_id).await.unwrap(), record);
        }

        #[tokio::test]
        async fn failed_final_write_can_be_retried() {
            let (service, recorder) = flaky_service();
            let started = service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            service.take_turn(started.call_id, "hello").await.unwrap();

            recorder.calls_down.store(true, Ordering::SeqCst);
            let err = service
                .end_call(EndCallCommand {
                    call_id: started.call_id,
                    outcome: CallOutcome::CallBack,
                    status: CallStatus::Completed,
                })
                .await
                .unwrap_err();
            assert!(matches!(err, CallServiceError::Recorder(_)));
            assert!(service.active_calls().get(started.call_id).await.is_some());
            let stored = recorder.inner.call(started.call_id).await.unwrap();
            assert_eq!(stored.status, CallStatus::InProgress);

            recorder.calls_down.store(false, Ordering::SeqCst);
            let record = service.end_call(completed(started.call_id)).await.unwrap();

            // the outcome chosen by the first attempt sticks
            assert_eq!(record.outcome, CallOutcome::CallBack);
            assert_eq!(record.status, CallStatus::Completed);
            assert!(record.end_time.is_some());
            assert_eq!(recorder.inner.call(started.call_id).await.unwrap(), record);
            assert!(service.active_calls().is_empty().await);

            let lines = recorder.inner.transcript(started.call_id).await;
            assert_eq!(lines.len(), 4);
            assert_eq!(lines[3].text, "Call ended with outcome: call_back");
        }

        #[tokio::test]
        async fn failed_transcript_flush_can_be_retried() {
            let (service, recorder) = flaky_service();
            let started = service
                .start_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();

            recorder.transcripts_down.store(true, Ordering::SeqCst);
            let err = service.end_call(completed(started.call_id)).await.unwrap_err();
            assert!(matches!(err, CallServiceError::Recorder(_)));
            assert_eq!(
                recorder.inner.call(started.call_id).await.unwrap().status,
                CallStatus::Completed
            );

            recorder.transcripts_down.store(false, Ordering::SeqCst);
            service.end_call(completed(started.call_id)).await.unwrap();
            assert_eq!(recorder.inner.transcript(started.call_id).await.len(), 2);
        }
    }

    mod run {
        use super::*;

        #[tokio::test]
        async fn never_speaking_is_not_connected() {
            let h = harness(&["", "", ""]);
            let record = h
                .service
                .run_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            assert_eq!(record.status, CallStatus::NotConnected);
            assert_eq!(record.outcome, CallOutcome::Unknown);
        }

        #[tokio::test]
        async fn going_quiet_mid_call_fails() {
            let h = harness(&["hello", "", "", ""]);
            let record = h
                .service
                .run_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            assert_eq!(record.status, CallStatus::Failed);
            assert_eq!(record.final_state, DialogueState::Ended);
        }

        #[tokio::test]
        async fn hanging_up_completes_the_call() {
            let h = harness(&["hello", "okay"]);
            let record = h
                .service
                .run_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap();
            assert_eq!(record.status, CallStatus::Completed);
            assert_eq!(record.outcome, CallOutcome::Unknown);
        }

        #[tokio::test]
        async fn capture_failure_marks_call_failed() {
            let capture = ScriptedCapture::new(["hello"]);
            capture
                .push_error(SpeechError::DeviceUnavailable("mic unplugged".into()))
                .await;
            let recorder = InMemoryCallRecorder::new();
            let service = CallService::new(
                DialogueEngine::reference().unwrap(),
                Arc::new(capture),
                Arc::new(RecordingSynthesis::new()),
                Arc::new(recorder.clone()),
                CallSettings::default(),
            );

            let err = service
                .run_call(StartCallCommand::for_customer("Asha"))
                .await
                .unwrap_err();
            assert!(matches!(err, CallServiceError::Speech(SpeechError::DeviceUnavailable(_))));
            assert!(service.active_calls().is_empty().await);
        }
    }
}
