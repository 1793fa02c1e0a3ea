use std::fmt;
use std::sync::mpsc::Sender;

use crate::confirm::Submission;
use crate::types::{DetailsPayload, RosterPayload};

/// Handle to the backend engine held by the UI layer.
///
/// Cheaply cloneable. When the last handle is dropped the sender channel
/// closes, signalling the engine to shut down.
#[derive(Clone)]
pub struct EngineHandle {
    tx: tokio::sync::mpsc::UnboundedSender<Request>,
}

impl EngineHandle {
    pub(super) fn new(tx: tokio::sync::mpsc::UnboundedSender<Request>) -> Self {
        Self { tx }
    }

    /// Send a request to the engine. Non-blocking.
    pub fn send(&self, req: Request) {
        // If the receiver is gone the engine has already shut down.
        let _ = self.tx.send(req);
    }
}

/// Implemented by `ServerEngine` and `StubEngine`.
pub trait Engine: Send + 'static {
    fn start(self) -> EngineHandle;
}

/// The two read endpoints. Their fetches succeed or fail independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Details,
    Roster,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Details => "details",
            Self::Roster => "roster",
        })
    }
}

/// All operations the UI layer can send to the engine.
pub enum Request {
    FetchDetails {
        reply_tx: Sender<Event>,
    },
    FetchRoster {
        reply_tx: Sender<Event>,
    },
    /// Fire-and-forget form post; the result is seen in the next fetch.
    Submit {
        submission: Submission,
        description: String,
        reply_tx: Sender<Event>,
    },
    Shutdown,
}

/// All events the engine can push back to the UI.
pub enum Event {
    DetailsFetched {
        payload: DetailsPayload,
    },
    RosterFetched {
        payload: RosterPayload,
    },
    FetchError {
        endpoint: Endpoint,
        message: String,
    },
    /// The post reached the server.
    SubmissionSent {
        description: String,
    },
    SubmissionError {
        description: String,
        message: String,
    },
}
