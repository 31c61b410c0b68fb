use thiserror::Error;

use crate::compress::MccpVersion;

/// Errors surfaced by the engine.
///
/// Decoder, negotiation and subnegotiation anomalies are logged and
/// recovered in-stream; they never appear here. Everything below is either
/// a build-time configuration problem or a session-fatal condition.
#[derive(Debug, Error)]
pub enum Error {
    #[error("plugin {plugin:?} depends on unregistered plugin code {dependency}")]
    UnknownDependency {
        plugin: &'static str,
        dependency: u8,
    },

    #[error("plugin dependency cycle involving {0:?}")]
    DependencyCycle(&'static str),

    #[error("option {0} is claimed by more than one plugin")]
    DuplicateOption(u8),

    #[error("missing required callback: {0}")]
    MissingCallback(&'static str),

    #[error("plugin for option {option} has enabled dependents: {dependents:?}")]
    ActiveDependents {
        option: u8,
        dependents: Vec<&'static str>,
    },

    #[error("no registered plugin owns option {0}")]
    NoSuchPlugin(u8),

    #[error("session has been disposed")]
    Disposed,

    #[error("session is in a failed state and rejects further input")]
    Errored,

    #[error("{version} stream failure: {reason}")]
    Compression {
        version: MccpVersion,
        reason: String,
    },

    #[error("GMCP payload failed to serialize: {0}")]
    Gmcp(String),
}

pub type Result<T> = core::result::Result<T, Error>;
