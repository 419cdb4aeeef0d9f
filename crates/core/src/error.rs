//! Error types for configuration, dataset validation and the worker protocol.

use thiserror::Error;

use crate::threshold::ThresholdMode;

/// Errors raised while turning user intent into run parameters. Always
/// detected before any coefficient is computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("correlation and anti-correlation modes cannot be requested together")]
    ConflictingModes,

    #[error("either correlation or anti-correlation mode must be requested")]
    MissingMode,

    #[error("invalid {mode} range [{lower}, {upper}]: {reason}")]
    InvalidRange {
        mode: ThresholdMode,
        lower: f64,
        upper: f64,
        reason: &'static str,
    },

    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}

/// Errors raised by the engines.
#[derive(Debug, Error)]
pub enum CorrError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid dataset: {0}")]
    InvalidDataset(String),

    #[error("{what} mismatch: expected {expected}, actual {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },

    /// A peer sent a message whose declared contents do not match what its
    /// partition requires.
    #[error("protocol error during {stage}: worker {peer} sent {actual}, expected {expected}")]
    Protocol {
        peer: usize,
        expected: String,
        actual: String,
        stage: &'static str,
    },

    #[error("unexpected packet from worker {peer} during {stage}")]
    UnexpectedPacket { peer: usize, stage: &'static str },

    #[error("worker {peer} disconnected")]
    PeerDisconnected { peer: usize },

    #[error("worker {worker} holds a matrix that differs from the coordinator's")]
    ReplicaMismatch { worker: usize },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },

    #[error("failed to build worker thread pool: {0}")]
    ThreadPool(String),
}

impl CorrError {
    pub fn dimension_mismatch(what: &'static str, expected: usize, actual: usize) -> Self {
        Self::DimensionMismatch {
            what,
            expected,
            actual,
        }
    }

    pub fn protocol(
        peer: usize,
        stage: &'static str,
        expected: impl ToString,
        actual: impl ToString,
    ) -> Self {
        Self::Protocol {
            peer,
            expected: expected.to_string(),
            actual: actual.to_string(),
            stage,
        }
    }
}

pub type Result<T> = std::result::Result<T, CorrError>;
