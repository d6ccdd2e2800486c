//! Registry of calls currently in progress.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::domain::call::CallRecord;
use crate::domain::dialogue::DialogueSession;
use crate::domain::foundation::{CallId, DomainError, ErrorCode};

/// A call being driven by the host.
#[derive(Debug)]
pub struct LiveCall {
    pub session: DialogueSession,
    pub record: CallRecord,
    /// History entries already handed to the recorder.
    pub persisted: usize,
}

impl LiveCall {
    pub fn new(session: DialogueSession) -> Self {
        let record = CallRecord::opened(&session);
        Self {
            session,
            record,
            persisted: 0,
        }
    }
}

/// Shared handle to one live call. Turns and end-call both take its lock.
pub type LiveCallHandle = Arc<Mutex<LiveCall>>;

/// Live calls keyed by call id.
#[derive(Debug, Clone, Default)]
pub struct ActiveCalls {
    calls: Arc<RwLock<HashMap<CallId, LiveCallHandle>>>,
}

impl ActiveCalls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a call.
    ///
    /// # Errors
    ///
    /// - `CallAlreadyActive` if the id is already registered
    pub async fn insert(&self, call: LiveCall) -> Result<LiveCallHandle, DomainError> {
        let call_id = call.session.id();
        let mut calls = self.calls.write().await;
        if calls.contains_key(&call_id) {
            return Err(DomainError::new(
                ErrorCode::CallAlreadyActive,
                format!("Call already active: {}", call_id),
            ));
        }
        let handle = Arc::new(Mutex::new(call));
        calls.insert(call_id, handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, call_id: CallId) -> Option<LiveCallHandle> {
        self.calls.read().await.get(&call_id).cloned()
    }

    /// Unregisters a call, returning its handle if it was live.
    pub async fn remove(&self, call_id: CallId) -> Option<LiveCallHandle> {
        self.calls.write().await.remove(&call_id)
    }

    pub async fn len(&self) -> usize {
        self.calls.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.calls.read().await.is_empty()
    }

    pub async fn ids(&self) -> Vec<CallId> {
        self.calls.read().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::dialogue::DialogueEngine;

    fn live_call() -> LiveCall {
        let engine = DialogueEngine::reference().unwrap();
        LiveCall::new(engine.start_session("Asha", "Rahul", "en-IN"))
    }

    #[tokio::test]
    async fn insert_get_remove() {
        let calls = ActiveCalls::new();
        let call = live_call();
        let id = call.session.id();

        calls.insert(call).await.unwrap();
        assert_eq!(calls.len().await, 1);
        assert!(calls.get(id).await.is_some());
        assert_eq!(calls.ids().await, vec![id]);

        assert!(calls.remove(id).await.is_some());
        assert!(calls.is_empty().await);
        assert!(calls.get(id).await.is_none());
    }

    #[tokio::test]
    async fn duplicate_insert_is_rejected() {
        let calls = ActiveCalls::new();
        let call = live_call();
        let copy = LiveCall::new(call.session.clone());

        calls.insert(call).await.unwrap();
        let err = calls.insert(copy).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::CallAlreadyActive);
    }

    #[tokio::test]
    async fn sessions_are_independent() {
        let calls = ActiveCalls::new();
        let engine = DialogueEngine::reference().unwrap();
        let a = calls.insert(live_call()).await.unwrap();
        let b = calls.insert(live_call()).await.unwrap();

        {
            let mut first = a.lock().await;
            engine.process_utterance(&mut first.session, "hello");
        }

        assert_eq!(a.lock().await.session.history().len(), 3);
        assert_eq!(b.lock().await.session.history().len(), 1);
    }
}
