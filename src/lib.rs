//! Red-black tree collections laid out in a single contiguous array.
//!
//! Every collection in this crate keeps its elements in one `Vec` and links the tree nodes by
//! index instead of by pointer. Two layouts are offered:
//!
//! - [`FlatMap`] and [`FlatSet`] keep the array packed: live elements occupy exactly the first
//!   `len` slots, and erasing moves the last element into the hole.
//! - [`HashFlatMap`] and [`HashFlatSet`] overlay an open hash table on the same array. Each
//!   element sits in its hash bucket or in a chained collision slot, so point lookups take O(1) on
//!   average while ordered iteration, ranges and bounds still walk the tree.
//!
//! All four cache the least and greatest elements, hand out [`Cursor`]s for positional walks in
//! either [`Direction`] (and [`CursorMut`]s that can erase as they go), and accept a custom
//! [`Comparator`].
//!
//! # Example
//!
//! ```
//! use flatrb::{FlatMap, HashFlatMap};
//!
//! let mut scores = FlatMap::new();
//! scores.insert("Carol", 92);
//! scores.insert("Alice", 100);
//! scores.insert("Bob", 85);
//!
//! // Sorted by key, whatever the insertion order.
//! assert_eq!(scores.keys().copied().collect::<Vec<_>>(), ["Alice", "Bob", "Carol"]);
//! assert_eq!(scores.first_key_value(), Some((&"Alice", &100)));
//!
//! // Cursors step through neighbours.
//! let mut cursor = scores.find(&"Alice");
//! cursor.move_next();
//! assert_eq!(cursor.value(), Some(&85));
//!
//! // The hashed map answers the same ordered queries.
//! let hashed: HashFlatMap<_, _> = scores.into_iter().collect();
//! assert_eq!(hashed.get("Carol"), Some(&92));
//! assert_eq!(hashed.lower_bound(&"B").key(), Some(&"Bob"));
//! ```
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **One allocation** - Nodes are array slots, links are 32-bit indices
//! - **O(1) extrema** - `first`/`last` and inserting a new minimum or maximum skip the descent
//! - **Logging** - Growth and rehashing are reported through the `log` facade at `debug` level
//!
//! # Index invalidation
//!
//! Slot indices are not stable: any insert may grow or rehash the array, and any erase may move an
//! element into another slot. Cursors borrow their collection, so the borrow checker rules out
//! holding one across a mutation.

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod comparator;
mod config;
mod cursor;
mod error;
mod iter;
mod raw;
mod set_iter;

pub mod flat_map;
pub mod flat_set;
pub mod hash_flat_map;
pub mod hash_flat_set;

pub use comparator::{Comparator, FnComparator, Natural, Reverse};
pub use config::HashConfig;
pub use cursor::{Cursor, CursorMut, Direction, SetCursor, SetCursorMut};
pub use error::Error;
pub use flat_map::FlatMap;
pub use flat_set::FlatSet;
pub use hash_flat_map::HashFlatMap;
pub use hash_flat_set::HashFlatSet;
