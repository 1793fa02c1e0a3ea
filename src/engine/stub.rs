use tokio::sync::mpsc::UnboundedReceiver;

use crate::types::{DetailsPayload, RosterPayload};

use super::interface::{Endpoint, Engine, EngineHandle, Event, Request};

/// Serves pre-loaded fixture data without any network calls.
///
/// Used by integration tests and `skillfarm-board demo`. A `None` payload
/// answers its fetch with an error, which is how tests exercise failures.
#[derive(Default)]
pub struct StubEngine {
    pub details: Option<DetailsPayload>,
    pub roster: Option<RosterPayload>,
}

impl Engine for StubEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        std::thread::spawn(move || match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run_loop(rx)),
            Err(e) => tracing::error!("stub engine: cannot start tokio runtime: {e}"),
        });
        EngineHandle::new(tx)
    }
}

impl StubEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        while let Some(req) = rx.recv().await {
            match req {
                Request::FetchDetails { reply_tx } => {
                    let _ = reply_tx.send(match &self.details {
                        Some(payload) => Event::DetailsFetched {
                            payload: payload.clone(),
                        },
                        None => Event::FetchError {
                            endpoint: Endpoint::Details,
                            message: "no details in stub".into(),
                        },
                    });
                }
                Request::FetchRoster { reply_tx } => {
                    let _ = reply_tx.send(match &self.roster {
                        Some(payload) => Event::RosterFetched {
                            payload: payload.clone(),
                        },
                        None => Event::FetchError {
                            endpoint: Endpoint::Roster,
                            message: "no roster in stub".into(),
                        },
                    });
                }
                // Submissions succeed instantly and change nothing.
                Request::Submit {
                    description,
                    reply_tx,
                    ..
                } => {
                    let _ = reply_tx.send(Event::SubmissionSent { description });
                }
                Request::Shutdown => break,
            }
        }
    }
}
