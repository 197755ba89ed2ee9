//! Mode dispatch.
//!
//! The protocol is chosen fresh from the host's mode on every invocation and
//! never remembered. Each protocol lives in its own sub-module:
//! * `normal`           - oracle target applied directly
//! * `visual`           - boundary correction, widened addressing, `m>` + `gv`
//! * `operator_pending` - widened addressing plus operator post-processing

use core_model::EditorHost;
use core_state::{AdapterSession, Mode, Operator, VisualKind};
use core_text::MotionResult;

use crate::AdapterError;
use crate::normalize::Count;
use crate::oracle::MotionOracle;

mod binding;
mod normal;
mod operator_pending;
mod visual;

pub use binding::{Binding, BindingPrefix, Direction, MotionFamily};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    Normal,
    Visual(VisualKind),
    OperatorPending(Operator),
}

impl Protocol {
    pub fn for_mode(mode: Mode) -> Result<Protocol, AdapterError> {
        match mode {
            Mode::Normal => Ok(Protocol::Normal),
            Mode::Visual(kind) => Ok(Protocol::Visual(kind)),
            Mode::OperatorPending(op) => Ok(Protocol::OperatorPending(op)),
            Mode::Insert => Err(AdapterError::UnsupportedMode { mode }),
        }
    }

    pub fn prefix(self) -> BindingPrefix {
        match self {
            Protocol::Normal => BindingPrefix::Normal,
            Protocol::Visual(_) => BindingPrefix::Visual,
            Protocol::OperatorPending(_) => BindingPrefix::OperatorPending,
        }
    }
}

/// A fully normalized motion request.
#[derive(Clone, Copy)]
pub(crate) struct Request<'a> {
    pub oracle: &'a dyn MotionOracle,
    pub family: MotionFamily,
    pub count: Count,
}

pub(crate) fn dispatch<H: EditorHost + ?Sized>(
    protocol: Protocol,
    host: &mut H,
    session: &mut AdapterSession,
    req: Request<'_>,
) -> Result<MotionResult, AdapterError> {
    match protocol {
        Protocol::Normal => normal::run(host, req),
        Protocol::Visual(_) => visual::run(host, session, req),
        Protocol::OperatorPending(op) => operator_pending::run(host, session, op, req),
    }
}
