//! Classifier port.

use std::sync::Arc;

use crate::domain::{ObjectClass, SignalVector};

/// Anything that can label a validated signal.
///
/// Implementations must be deterministic: the same signal always yields the
/// same class for the lifetime of the instance.
pub trait SignalClassifier: Send + Sync {
    fn predict(&self, signal: &SignalVector) -> ObjectClass;
}

/// The model as seen by the rest of the application.
///
/// Training happens once at startup; when it fails the reason is kept so the
/// UI can show it and refuse to classify.
#[derive(Clone)]
pub enum ModelHandle {
    Ready(Arc<dyn SignalClassifier>),
    Unavailable(String),
}

impl ModelHandle {
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// The failure reason when no model is loaded.
    #[must_use]
    pub fn unavailable_reason(&self) -> Option<&str> {
        match self {
            Self::Ready(_) => None,
            Self::Unavailable(reason) => Some(reason),
        }
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ready(_) => f.write_str("ModelHandle::Ready"),
            Self::Unavailable(reason) => write!(f, "ModelHandle::Unavailable({reason})"),
        }
    }
}
