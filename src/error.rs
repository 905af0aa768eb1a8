//! Error type shared by every collection in the crate.
//!
//! Only three situations are errors: asking for more slots than the index type can address, handing
//! a [`HashConfig`](crate::HashConfig) out-of-range parameters, and keyed access that requires the
//! key to be present. Everything else is total: looking up or erasing an absent key and inserting a
//! duplicate report a flag instead of failing.
//!
//! Running out of index space while *growing* is not recoverable. Growth panics with the
//! [`Error::CapacityExhausted`] message; the variant exists so the message has one source and so
//! `try_reserve` can return it.

use thiserror::Error;

/// Errors reported by the collections in this crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum Error {
    /// A requested capacity does not fit the index type.
    #[error("requested capacity {requested} exceeds the maximum of {max} slots")]
    InvalidCapacity {
        /// The capacity that was asked for.
        requested: usize,
        /// The largest capacity a collection can have.
        max: usize,
    },

    /// A hash configuration parameter is out of range; the payload names it.
    #[error("invalid hash configuration: {0}")]
    InvalidConfig(&'static str),

    /// The collection is already at its maximum capacity and cannot grow.
    #[error("index space exhausted at {max} slots")]
    CapacityExhausted {
        /// The largest capacity a collection can have.
        max: usize,
    },

    /// Keyed access required a key that is not present.
    #[error("key not found")]
    KeyNotFound,
}
