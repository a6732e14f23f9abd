use std::fmt;

use thiserror::Error;

/// Unified error type for the LLKV schema bridge.
///
/// Every fallible operation in the workspace returns this enum. The variants
/// split into two groups:
///
/// - **Caller input errors** ([`Error::InvalidEncoding`], [`Error::InvalidInput`],
///   [`Error::LimitExceeded`], [`Error::UnknownHandle`], [`Error::KindMismatch`]):
///   raised when a producer hands the builder malformed data. They are always
///   recoverable and never leave partial state behind.
/// - **Everything else** ([`Error::Arrow`], [`Error::NotFound`], [`Error::Internal`]):
///   type-system failures, lookups that miss, and broken internal invariants.
///
/// # Error Handling Strategy
///
/// Errors propagate with `?` inside Rust code. At the C boundary they are
/// collapsed into the sentinel handle `0`, and the session remembers the last
/// failure so the producer can ask what went wrong.
#[derive(Error, Debug)]
pub enum Error {
    /// A text buffer handed across the boundary is not well-formed UTF-8.
    ///
    /// The message carries the decoder's description of the first invalid
    /// byte sequence.
    #[error("invalid text encoding: {0}")]
    InvalidEncoding(String),

    /// A structurally malformed argument.
    ///
    /// This covers:
    /// - A null pointer paired with a non-zero length or count
    /// - A misaligned handle array
    /// - An unknown primitive kind code
    /// - Duplicate sibling names when duplicate rejection is enabled
    /// - A projection that does not line up with the table it is applied to
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A caller-supplied count or length exceeds its configured ceiling.
    ///
    /// Checked before any allocation or loop proportional to the count, so an
    /// adversarial value never reaches memory.
    #[error("{what} of {count} exceeds the limit of {limit}")]
    LimitExceeded {
        what: &'static str,
        count: usize,
        limit: usize,
    },

    /// A handle does not name a live element in this session's table.
    ///
    /// The handle was never issued, was already consumed, or belongs to a
    /// different session.
    #[error("unknown schema handle {0}")]
    UnknownHandle(u64),

    /// A live handle names an element of the wrong variant.
    ///
    /// The element is left in place under its original handle.
    #[error("schema handle {handle} refers to a {found}, expected {expected}")]
    KindMismatch {
        handle: u64,
        expected: &'static str,
        found: &'static str,
    },

    /// Arrow rejected a type definition (for example, an out-of-range
    /// decimal precision).
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// A lookup by name or id found nothing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Reserved for broken builder invariants; no current code path
    /// constructs it.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create an [`Error::InvalidEncoding`] from any displayable decoder error.
    ///
    /// # Examples
    ///
    /// ```
    /// use llkv_result::Error;
    ///
    /// let bytes = [0x66, 0xff, 0x6f];
    /// let err = std::str::from_utf8(&bytes).map_err(Error::invalid_encoding).unwrap_err();
    /// assert!(matches!(err, Error::InvalidEncoding(_)));
    /// ```
    #[inline]
    pub fn invalid_encoding<E: fmt::Display>(err: E) -> Self {
        Error::InvalidEncoding(err.to_string())
    }

    /// Create an [`Error::InvalidInput`] from a message.
    #[inline]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create an [`Error::LimitExceeded`] for `what`.
    #[inline]
    pub fn limit_exceeded(what: &'static str, count: usize, limit: usize) -> Self {
        Error::LimitExceeded { what, count, limit }
    }

    /// Returns `true` for the caller input group: malformed data handed over
    /// by a producer.
    ///
    /// ```
    /// use llkv_result::Error;
    ///
    /// assert!(Error::UnknownHandle(7).is_caller_error());
    /// assert!(!Error::NotFound("age".into()).is_caller_error());
    /// ```
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidEncoding(_)
                | Error::InvalidInput(_)
                | Error::LimitExceeded { .. }
                | Error::UnknownHandle(_)
                | Error::KindMismatch { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::error::ArrowError;

    #[test]
    fn caller_group_is_exactly_the_input_variants() {
        let caller = [
            Error::invalid_encoding("bad byte"),
            Error::invalid_input("null pointer"),
            Error::limit_exceeded("handle count", 5, 4),
            Error::UnknownHandle(3),
            Error::KindMismatch {
                handle: 3,
                expected: "field",
                found: "type",
            },
        ];
        for err in &caller {
            assert!(err.is_caller_error(), "{err}");
        }

        let other = [
            Error::Arrow(ArrowError::InvalidArgumentError("precision".into())),
            Error::NotFound("age".into()),
            Error::Internal("invariant".into()),
        ];
        for err in &other {
            assert!(!err.is_caller_error(), "{err}");
        }
    }
}
