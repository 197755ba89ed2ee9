//! Motion oracles and their (optionally lazy) construction.
//!
//! The adapter talks to a [`MotionOracle`]: a pure engine mapping buffer,
//! cursor and count (plus the pending operator) to a target. [`NativeOracle`]
//! reproduces the editor's own word motions over its character classes and
//! is the default engine.

use std::cell::OnceCell;
use std::fs;
use std::path::Path;

use core_config::{Config, DictionarySource};
use core_state::Operator;
use core_text::{BufferView, CursorPosition, MotionResult, word};
use tracing::{debug, info, warn};

use crate::OracleError;
use crate::dispatcher::MotionFamily;
use crate::normalize::Count;

pub trait MotionOracle {
    fn normal(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        count: Count,
        family: MotionFamily,
    ) -> Result<CursorPosition, OracleError>;

    fn visual(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        count: Count,
        family: MotionFamily,
    ) -> Result<MotionResult, OracleError>;

    fn operator_pending(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        operator: Operator,
        count: Count,
        family: MotionFamily,
    ) -> Result<MotionResult, OracleError>;
}

/// Word motions with the editor's native character classes.
#[derive(Debug, Clone, Default)]
pub struct NativeOracle {
    dictionary_entries: usize,
}

impl NativeOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries of the dictionary this oracle was built from (zero for the
    /// default dictionary).
    pub fn dictionary_entries(&self) -> usize {
        self.dictionary_entries
    }
}

impl MotionOracle for NativeOracle {
    fn normal(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        count: Count,
        family: MotionFamily,
    ) -> Result<CursorPosition, OracleError> {
        let (n, big) = (count.get(), family.is_big());
        Ok(match family {
            MotionFamily::Word | MotionFamily::BigWord => {
                word::forward_word_start(buffer, cursor, n, big)
            }
            MotionFamily::WordEnd | MotionFamily::BigWordEnd => {
                word::forward_word_end(buffer, cursor, n, big)
            }
            MotionFamily::WordBack | MotionFamily::BigWordBack => {
                word::backward_word_start(buffer, cursor, n, big)
            }
            MotionFamily::WordBackEnd | MotionFamily::BigWordBackEnd => {
                word::backward_word_end(buffer, cursor, n, big)
            }
        })
    }

    fn visual(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        count: Count,
        family: MotionFamily,
    ) -> Result<MotionResult, OracleError> {
        let (n, big) = (count.get(), family.is_big());
        let target = match family {
            MotionFamily::Word | MotionFamily::BigWord => {
                word::visual_word_start(buffer, cursor, n, big)
            }
            MotionFamily::WordEnd | MotionFamily::BigWordEnd => {
                word::visual_word_end(buffer, cursor, n, big)
            }
            _ => self.normal(buffer, cursor, count, family)?,
        };
        Ok(MotionResult::plain(target))
    }

    fn operator_pending(
        &self,
        buffer: &dyn BufferView,
        cursor: CursorPosition,
        operator: Operator,
        count: Count,
        family: MotionFamily,
    ) -> Result<MotionResult, OracleError> {
        let (n, big) = (count.get(), family.is_big());
        Ok(match family {
            MotionFamily::Word | MotionFamily::BigWord => match operator {
                Operator::Change => word::change_word(buffer, cursor, n, big),
                _ => word::operator_word_start(buffer, cursor, n, big),
            },
            MotionFamily::WordEnd | MotionFamily::BigWordEnd => {
                word::operator_word_end(buffer, cursor, n, big, operator == Operator::Delete)
            }
            MotionFamily::WordBack | MotionFamily::BigWordBack => {
                word::operator_word_back(buffer, cursor, n, big, operator == Operator::Change)
            }
            MotionFamily::WordBackEnd | MotionFamily::BigWordBackEnd => {
                word::operator_word_back_end(buffer, cursor, n, big, operator == Operator::Delete)
            }
        })
    }
}

/// Builds an oracle for a dictionary source.
pub trait OracleFactory {
    fn build(&self, source: &DictionarySource) -> Result<Box<dyn MotionOracle>, OracleError>;
}

/// Factory for [`NativeOracle`]. A user dictionary is validated (one entry
/// per line: `word [frequency] [tag]`) but the native classes do not consult
/// it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFactory;

impl OracleFactory for NativeFactory {
    fn build(&self, source: &DictionarySource) -> Result<Box<dyn MotionOracle>, OracleError> {
        let dictionary_entries = match source {
            DictionarySource::Default => 0,
            DictionarySource::File(path) => validate_dictionary(path)?,
        };
        debug!(target: "actions.oracle", entries = dictionary_entries, "oracle_built");
        Ok(Box::new(NativeOracle { dictionary_entries }))
    }
}

fn validate_dictionary(path: &Path) -> Result<usize, OracleError> {
    let content = fs::read_to_string(path).map_err(|source| OracleError::DictionaryUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    let mut entries = 0;
    for (idx, line) in content.lines().enumerate() {
        let mut fields = line.split_whitespace();
        let Some(_word) = fields.next() else { continue };
        if let Some(freq) = fields.next()
            && freq.parse::<u64>().is_err()
        {
            return Err(OracleError::DictionaryMalformed {
                path: path.to_path_buf(),
                line: idx + 1,
            });
        }
        entries += 1;
    }
    Ok(entries)
}

/// Build with `source`, falling back to the default dictionary when a user
/// dictionary cannot be used.
pub fn build_with_fallback(
    factory: &dyn OracleFactory,
    source: &DictionarySource,
) -> Result<Box<dyn MotionOracle>, OracleError> {
    match factory.build(source) {
        Ok(oracle) => Ok(oracle),
        Err(err) if *source != DictionarySource::Default => {
            warn!(target: "actions.oracle", error = %err, "dictionary_build_failed_fallback");
            factory.build(&DictionarySource::Default)
        }
        Err(err) => Err(err),
    }
}

/// An oracle that is either built or will be built on first use.
pub enum OracleHandle {
    Ready(Box<dyn MotionOracle>),
    Lazy {
        factory: Box<dyn OracleFactory>,
        source: DictionarySource,
        cell: OnceCell<Box<dyn MotionOracle>>,
    },
}

impl OracleHandle {
    pub fn ready(oracle: impl MotionOracle + 'static) -> Self {
        OracleHandle::Ready(Box::new(oracle))
    }

    pub fn lazy(factory: Box<dyn OracleFactory>, source: DictionarySource) -> Self {
        OracleHandle::Lazy {
            factory,
            source,
            cell: OnceCell::new(),
        }
    }

    pub fn is_built(&self) -> bool {
        match self {
            OracleHandle::Ready(_) => true,
            OracleHandle::Lazy { cell, .. } => cell.get().is_some(),
        }
    }

    /// The oracle, building it first if this handle is lazy. A failed build
    /// is retried on the next call.
    pub fn get(&self) -> Result<&dyn MotionOracle, OracleError> {
        match self {
            OracleHandle::Ready(oracle) => Ok(oracle.as_ref()),
            OracleHandle::Lazy {
                factory,
                source,
                cell,
            } => {
                if cell.get().is_none() {
                    info!(target: "actions.oracle", "lazy_oracle_init");
                    let built = build_with_fallback(factory.as_ref(), source)?;
                    let _ = cell.set(built);
                }
                cell.get().map(|o| o.as_ref()).ok_or(OracleError::Unavailable)
            }
        }
    }
}

impl std::fmt::Debug for OracleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleHandle::Ready(_) => f.write_str("OracleHandle::Ready"),
            OracleHandle::Lazy { source, cell, .. } => f
                .debug_struct("OracleHandle::Lazy")
                .field("source", source)
                .field("built", &cell.get().is_some())
                .finish(),
        }
    }
}

/// Resolve the configured dictionary and lazy flag into a handle.
pub fn init_oracle(
    config: &Config,
    factory: Box<dyn OracleFactory>,
) -> Result<OracleHandle, OracleError> {
    let source = config.dictionary_source();
    if config.lazy() {
        debug!(target: "actions.oracle", ?source, "oracle_deferred");
        return Ok(OracleHandle::lazy(factory, source));
    }
    Ok(OracleHandle::Ready(build_with_fallback(factory.as_ref(), &source)?))
}
