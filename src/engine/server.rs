use std::sync::Arc;
use std::sync::mpsc::Sender;

use tokio::sync::mpsc::UnboundedReceiver;

use crate::api::ApiClient;

use super::interface::{Endpoint, Engine, EngineHandle, Event, Request};

/// The engine talking to a real skillfarm server.
pub struct ServerEngine {
    client: ApiClient,
}

impl ServerEngine {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

impl Engine for ServerEngine {
    fn start(self) -> EngineHandle {
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel::<Request>();
        let handle = EngineHandle::new(tx);
        let spawned = std::thread::Builder::new()
            .name("skillfarm-engine".to_owned())
            .spawn(move || match tokio::runtime::Runtime::new() {
                Ok(rt) => rt.block_on(self.run_loop(rx)),
                Err(e) => tracing::error!("engine: cannot start tokio runtime: {e}"),
            });
        if let Err(e) = spawned {
            tracing::error!("engine: cannot spawn thread: {e}");
        }
        handle
    }
}

impl ServerEngine {
    async fn run_loop(self, mut rx: UnboundedReceiver<Request>) {
        let client = Arc::new(self.client);
        while let Some(req) = rx.recv().await {
            match req {
                Request::Shutdown => {
                    tracing::debug!("engine: shutting down");
                    break;
                }
                // Each request runs on its own task so a slow endpoint never
                // holds up the other one.
                req => {
                    tokio::spawn(handle_request(req, Arc::clone(&client)));
                }
            }
        }
    }
}

async fn handle_request(req: Request, client: Arc<ApiClient>) {
    match req {
        Request::FetchDetails { reply_tx } => match client.fetch_details().await {
            Ok(payload) => {
                tracing::debug!(
                    "engine: sending DetailsFetched details={} inactive={}",
                    payload.details.len(),
                    payload.inactive.len()
                );
                let _ = reply_tx.send(Event::DetailsFetched { payload });
            }
            Err(e) => send_fetch_error(&reply_tx, Endpoint::Details, &e),
        },
        Request::FetchRoster { reply_tx } => match client.fetch_roster().await {
            Ok(payload) => {
                tracing::debug!(
                    "engine: sending RosterFetched groups={}",
                    payload.groups.len()
                );
                let _ = reply_tx.send(Event::RosterFetched { payload });
            }
            Err(e) => send_fetch_error(&reply_tx, Endpoint::Roster, &e),
        },
        Request::Submit {
            submission,
            description,
            reply_tx,
        } => match client.submit(&submission).await {
            Ok(()) => {
                tracing::info!("engine: submitted {description}");
                let _ = reply_tx.send(Event::SubmissionSent { description });
            }
            Err(e) => {
                tracing::warn!("engine: submission {description:?} failed: {e:#}");
                let _ = reply_tx.send(Event::SubmissionError {
                    description,
                    message: format!("{e:#}"),
                });
            }
        },
        Request::Shutdown => {}
    }
}

fn send_fetch_error(reply_tx: &Sender<Event>, endpoint: Endpoint, err: &anyhow::Error) {
    tracing::warn!("engine: fetching {endpoint} failed: {err:#}");
    let _ = reply_tx.send(Event::FetchError {
        endpoint,
        message: format!("{err:#}"),
    });
}
