//! Domain types.
//!
//! Pure data with no infrastructure concerns: signals, object classes and the
//! alert state vocabulary shared by the voice and web adapters.

pub mod alert;
pub mod object;
pub mod signal;

pub use alert::{AlertMode, AlertState};
pub use object::ObjectClass;
pub use signal::{InputError, SIGNAL_LEN, SignalVector, parse_signal};
