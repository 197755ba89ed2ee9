use std::path::PathBuf;

use core_model::HostError;
use core_state::Mode;
use thiserror::Error;

use crate::dispatcher::Binding;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("dictionary {path} is unreadable: {source}")]
    DictionaryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary {path} is malformed at line {line}")]
    DictionaryMalformed { path: PathBuf, line: usize },
    #[error("no oracle could be built")]
    Unavailable,
}

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("no word motion protocol in {mode} mode")]
    UnsupportedMode { mode: Mode },
    #[error("binding {binding} cannot run in {mode} mode")]
    ModeMismatch { binding: Binding, mode: Mode },
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("unexpected key `{key}` at offset {offset}")]
    UnknownKey { key: String, offset: usize },
    #[error("operator `{op}` is missing its motion")]
    DanglingOperator { op: char },
    #[error(transparent)]
    Adapter(#[from] AdapterError),
    #[error(transparent)]
    Oracle(#[from] OracleError),
    #[error(transparent)]
    Host(#[from] HostError),
}
