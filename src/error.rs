//! Errors surfaced by the public API.

/// The recoverable errors of this crate. Broken tree invariants are not represented here; they
/// panic instead since the tree can't be trusted afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A cursor was dereferenced after it ran past its last node.
    #[error("cursor is exhausted and has no current value")]
    InvalidState,
}

/// Shorthand for results carrying this crate's [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_state_message() {
        assert_eq!(
            Error::InvalidState.to_string(),
            "cursor is exhausted and has no current value"
        );
    }
}
