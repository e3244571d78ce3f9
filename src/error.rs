//! Error taxonomy for the runtime.
//!
//! Four failure classes cover everything the runtime can report:
//!
//! - [`UiError::NotFound`] - a handle refers to an entity or window that no
//!   longer exists (use-after-drop).
//! - [`UiError::Leased`] - an entity or window was accessed while its state
//!   was checked out by an in-progress update. Distinct from `NotFound` so a
//!   reentrancy bug never masquerades as a dropped handle.
//! - [`UiError::LifecycleViolation`] - a frame-protocol contract was broken,
//!   e.g. asking for layout bounds of a node not in the current frame.
//! - [`UiError::Unsupported`] - an operation the runtime deliberately does
//!   not implement.

use thiserror::Error;

/// Identifies what kind of object a failed lookup was for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Entity,
    Window,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectKind::Entity => write!(f, "entity"),
            ObjectKind::Window => write!(f, "window"),
        }
    }
}

#[derive(Debug, Error)]
pub enum UiError {
    /// The referenced object does not exist (anymore).
    #[error("{kind} {id} not found")]
    NotFound { kind: ObjectKind, id: u64 },

    /// The referenced object exists but its state is currently leased to an
    /// in-progress update.
    #[error("{kind} {id} is leased by an in-progress update")]
    Leased { kind: ObjectKind, id: u64 },

    /// A frame lifecycle contract was violated.
    #[error("lifecycle violation: {0}")]
    LifecycleViolation(String),

    /// The operation is deliberately unimplemented.
    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}

impl UiError {
    pub(crate) fn lifecycle(msg: impl Into<String>) -> Self {
        UiError::LifecycleViolation(msg.into())
    }

    /// True for the reentrancy error.
    pub fn is_leased(&self) -> bool {
        matches!(self, UiError::Leased { .. })
    }

    /// True for the dangling-handle error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UiError::NotFound { .. })
    }
}

pub type Result<T, E = UiError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = UiError::NotFound {
            kind: ObjectKind::Entity,
            id: 42,
        };
        assert_eq!(e.to_string(), "entity 42 not found");

        let e = UiError::Leased {
            kind: ObjectKind::Window,
            id: 7,
        };
        assert_eq!(e.to_string(), "window 7 is leased by an in-progress update");

        let e = UiError::lifecycle("layout requested outside a frame");
        assert_eq!(
            e.to_string(),
            "lifecycle violation: layout requested outside a frame"
        );

        let e = UiError::Unsupported("task cancellation");
        assert_eq!(e.to_string(), "unsupported: task cancellation");
    }

    #[test]
    fn test_error_predicates() {
        assert!(
            UiError::Leased {
                kind: ObjectKind::Entity,
                id: 1
            }
            .is_leased()
        );
        assert!(
            !UiError::NotFound {
                kind: ObjectKind::Entity,
                id: 1
            }
            .is_leased()
        );
        assert!(
            UiError::NotFound {
                kind: ObjectKind::Entity,
                id: 1
            }
            .is_not_found()
        );
    }
}
