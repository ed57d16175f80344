use tokio::sync::mpsc;
use tracing::warn;

use crate::client::ApiClient;
use crate::error::SyncError;
use crate::op::{SyncOutcome, SyncRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncEnvelope {
    pub request_id: u64,
    pub request: SyncRequest,
}

#[derive(Debug)]
pub enum SyncEvent {
    Started {
        request_id: u64,
    },
    Finished {
        request_id: u64,
        result: Result<SyncOutcome, SyncError>,
    },
}

/// Runs requests for the UI thread.
///
/// Each request gets its own task, so a slow delete does not hold up a toggle.
/// Nothing is cancelled or de-duplicated and completions arrive in whatever
/// order the server answers: two toggles of the same task resolve to whichever
/// response lands last. The receiver of `tx` is the only writer of the board.
pub async fn run_worker(
    client: ApiClient,
    mut rx: mpsc::UnboundedReceiver<SyncEnvelope>,
    tx: std::sync::mpsc::Sender<SyncEvent>,
) {
    while let Some(SyncEnvelope { request_id, request }) = rx.recv().await {
        let client = client.clone();
        let tx2 = tx.clone();
        tokio::spawn(async move {
            let _ = tx2.send(SyncEvent::Started { request_id });

            let name = request.name();
            let result = request.execute(&client).await;
            if let Err(e) = &result {
                warn!(request_id, op = name, error = %e, "sync operation failed");
            }

            let _ = tx2.send(SyncEvent::Finished { request_id, result });
        });
    }
}
