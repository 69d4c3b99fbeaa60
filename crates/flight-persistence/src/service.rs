//! # Persistence Service
//!
//! Consumes named payloads from the simulator's transport and writes each
//! one through a [`DocumentStore`]. Nothing is acknowledged back to the
//! sender; a failed write is logged and the service moves on.

use flight_domain::Envelope;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::store::DocumentStore;

/// Outcome counters of a service run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ServiceReport {
    pub written: usize,
    pub failed: usize,
}

/// Envelope consumer writing payloads to a document store
pub struct PersistenceService<S> {
    store: S,
}

impl<S: DocumentStore> PersistenceService<S> {
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Write one envelope's payload under its channel name.
    ///
    /// # Errors
    ///
    /// Propagates the store's error.
    pub async fn handle(&self, envelope: &Envelope) -> Result<()> {
        self.store.put(&envelope.channel, &envelope.payload).await
    }

    /// Drain `rx` until every sender is dropped.
    pub async fn run(self, mut rx: mpsc::UnboundedReceiver<Envelope>) -> (Self, ServiceReport) {
        let mut report = ServiceReport::default();

        while let Some(envelope) = rx.recv().await {
            match self.handle(&envelope).await {
                Ok(()) => {
                    report.written += 1;
                    tracing::info!(channel = %envelope.channel, "Document written");
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(channel = %envelope.channel, error = %e, "Failed to write document");
                }
            }
        }

        tracing::debug!(written = report.written, failed = report.failed, "Persistence service drained");
        (self, report)
    }
}

impl<S: DocumentStore + 'static> PersistenceService<S> {
    /// Run the service on its own task.
    pub fn spawn(self, rx: mpsc::UnboundedReceiver<Envelope>) -> JoinHandle<(Self, ServiceReport)> {
        tokio::spawn(self.run(rx))
    }
}
