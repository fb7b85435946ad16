//! Error kinds returned by the Rope, delta, and patch APIs.
//!
//! Cancellation is deliberately not an error here: per the diff engine's
//! contract, a timed-out diff degrades to a less-optimal result instead of
//! failing (see [`crate::diff`]).

use thiserror::Error;

/// Errors surfaced by the rope core, the delta codec, and the patch text
/// format.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A null/empty argument was given where one was required, or a
    /// structurally malformed patch or rope was constructed.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// An index or range fell outside `[0, len)`.
    #[error("index {index} out of range for length {len}")]
    OutOfRange { index: usize, len: usize },

    /// A delta string failed to parse: a non-integer count, a negative
    /// count, an unknown operation prefix, or a count that didn't consume
    /// exactly the source rope.
    #[error("invalid delta: {0}")]
    InvalidDelta(String),
}

pub type Result<T> = std::result::Result<T, Error>;
