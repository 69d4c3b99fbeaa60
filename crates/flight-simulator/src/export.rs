//! One-shot export of trajectories and configuration.
//!
//! Each trajectory goes out on the channel named after its aircraft, the
//! configuration on [`CONFIG_CHANNEL`]. Fire-and-forget: nothing is
//! acknowledged and nothing is retried.

use flight_domain::{CONFIG_CHANNEL, EntityId, Envelope, SimulationConfig};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;

use crate::history::History;

/// Transport-level failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Transport channel closed")]
    Closed,

    #[error("Transport failure: {0}")]
    Other(String),
}

/// Outbound channel to the persistence collaborator.
pub trait Transport: Send {
    /// Hand `payload` to the transport under `channel`. Does not wait for
    /// delivery.
    fn emit(&self, channel: &str, payload: Value) -> Result<(), TransportError>;
}

/// Transport backed by an unbounded tokio channel of envelopes.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl ChannelTransport {
    pub const fn new(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Transport plus the receiving end for a persistence service.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Envelope>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }
}

impl Transport for ChannelTransport {
    fn emit(&self, channel: &str, payload: Value) -> Result<(), TransportError> {
        self.tx
            .send(Envelope {
                channel: channel.to_string(),
                payload,
            })
            .map_err(|_| TransportError::Closed)
    }
}

/// Transport that keeps every emission in memory. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    sent: Arc<Mutex<Vec<Envelope>>>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.log().clone()
    }

    /// Most recent payload emitted on `channel`.
    pub fn payload(&self, channel: &str) -> Option<Value> {
        self.log()
            .iter()
            .rev()
            .find(|e| e.channel == channel)
            .map(|e| e.payload.clone())
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<Envelope>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Transport for MemoryTransport {
    fn emit(&self, channel: &str, payload: Value) -> Result<(), TransportError> {
        self.log().push(Envelope {
            channel: channel.to_string(),
            payload,
        });
        Ok(())
    }
}

/// A channel that could not be exported.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelFailure {
    pub channel: String,
    pub reason: String,
}

/// Export finished with at least one failed channel.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("export failed on {}", describe(.failures))]
pub struct ExportError {
    pub failures: Vec<ChannelFailure>,
}

fn describe(failures: &[ChannelFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.channel, f.reason))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serializes histories and configuration and emits them once.
pub struct Exporter {
    transport: Box<dyn Transport>,
}

impl Exporter {
    pub fn new(transport: impl Transport + 'static) -> Self {
        Self {
            transport: Box::new(transport),
        }
    }

    /// Emit one payload per trajectory plus the configuration.
    ///
    /// Every channel is attempted even when an earlier one fails.
    ///
    /// # Errors
    ///
    /// Lists every channel that could not be serialized or emitted.
    pub fn export(
        &self,
        trajectories: &[(&EntityId, &History)],
        config: &SimulationConfig,
    ) -> Result<(), ExportError> {
        let mut failures = Vec::new();

        for (id, history) in trajectories {
            self.send(id.as_str(), serde_json::to_value(history.to_trajectory()), &mut failures);
        }
        self.send(CONFIG_CHANNEL, serde_json::to_value(config), &mut failures);

        tracing::info!(
            channels = trajectories.len() + 1,
            failed = failures.len(),
            "Export emitted"
        );

        if failures.is_empty() {
            Ok(())
        } else {
            Err(ExportError { failures })
        }
    }

    fn send(
        &self,
        channel: &str,
        payload: serde_json::Result<Value>,
        failures: &mut Vec<ChannelFailure>,
    ) {
        let outcome = payload
            .map_err(|e| e.to_string())
            .and_then(|p| self.transport.emit(channel, p).map_err(|e| e.to_string()));

        if let Err(reason) = outcome {
            tracing::warn!(channel, %reason, "Failed to emit export payload");
            failures.push(ChannelFailure {
                channel: channel.to_string(),
                reason,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flight_domain::{Action, Pose, TrajectoryPoint};

    struct RejectingTransport {
        reject: &'static str,
        inner: MemoryTransport,
    }

    impl Transport for RejectingTransport {
        fn emit(&self, channel: &str, payload: Value) -> Result<(), TransportError> {
            if channel == self.reject {
                return Err(TransportError::Other("socket reset".to_string()));
            }
            self.inner.emit(channel, payload)
        }
    }

    fn sample_history() -> History {
        let mut history = History::new();
        history.record(Pose::new(1.0, 2.0, 0.5), Action::new(2.0, 0.004));
        history.record(Pose::new(3.0, 4.0, 0.504), Action::new(2.2, 0.0));
        history
    }

    #[test]
    fn test_export_emits_three_named_payloads() {
        let transport = MemoryTransport::new();
        let exporter = Exporter::new(transport.clone());
        let a = EntityId::from("airplane1");
        let b = EntityId::from("airplane2");
        let history = sample_history();

        exporter
            .export(&[(&a, &history), (&b, &History::new())], &SimulationConfig::default())
            .unwrap();

        let channels: Vec<_> = transport.sent().into_iter().map(|e| e.channel).collect();
        assert_eq!(channels, vec!["airplane1", "airplane2", "config"]);

        let points: Vec<TrajectoryPoint> =
            serde_json::from_value(transport.payload("airplane1").unwrap()).unwrap();
        assert_eq!(points, history.to_trajectory());
        assert_eq!(transport.payload("airplane2").unwrap(), serde_json::json!([]));
        assert_eq!(transport.payload("config").unwrap()["launch_radius"], 20.0);
    }

    #[test]
    fn test_failed_channel_does_not_stop_others() {
        let inner = MemoryTransport::new();
        let exporter = Exporter::new(RejectingTransport {
            reject: "airplane1",
            inner: inner.clone(),
        });
        let a = EntityId::from("airplane1");
        let b = EntityId::from("airplane2");
        let history = sample_history();

        let err = exporter
            .export(&[(&a, &history), (&b, &history)], &SimulationConfig::default())
            .unwrap_err();

        assert_eq!(err.failures.len(), 1);
        assert_eq!(err.failures[0].channel, "airplane1");
        assert_eq!(err.to_string(), "export failed on airplane1 (Transport failure: socket reset)");
        assert_eq!(inner.sent().len(), 2);
    }

    #[test]
    fn test_closed_channel_reports_failure() {
        let (transport, rx) = ChannelTransport::channel();
        drop(rx);
        let exporter = Exporter::new(transport);

        let err = exporter.export(&[], &SimulationConfig::default()).unwrap_err();
        assert_eq!(err.failures[0].channel, CONFIG_CHANNEL);
    }
}
