//! Cursor motion adapter for word motions (`w W e E b B ge gE`).
//!
//! The adapter turns a pure "buffer + cursor + count (+ operator) -> target"
//! oracle call into editor-correct side effects for every modal protocol:
//! normal, the three visual sub-modes and operator-pending. Corrections the
//! host can only perform after the adapter returns are armed as one-shot
//! hooks on a per-buffer session and run by [`MotionAdapter::handle_event`].
//!
//! Module map:
//! * `normalize`    - count and cursor sanitizing
//! * `dispatcher`   - binding table, mode -> protocol selection, handlers
//! * `virtual_edit` - save-once / restore-once widening of addressing
//! * `boundary`     - visual `'>` correction
//! * `operator`     - operator-pending post-processing hooks
//! * `preview`      - lazy target preview
//! * `oracle`       - oracle trait, native engine, lazy construction
//! * `replay`       - key-script driver for the headless host

mod adapter;
pub mod boundary;
pub mod dispatcher;
mod error;
pub mod normalize;
mod operator;
pub mod oracle;
pub mod preview;
pub mod replay;
mod virtual_edit;

pub use adapter::MotionAdapter;
pub use dispatcher::{Binding, BindingPrefix, Direction, MotionFamily, Protocol};
pub use error::{AdapterError, OracleError, ReplayError};
pub use normalize::{Count, RawCount, normalize_count, normalize_cursor};
pub use oracle::{MotionOracle, NativeFactory, NativeOracle, OracleFactory, OracleHandle};
