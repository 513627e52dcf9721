//! Shared utilities.
//!
//! Content hashing plus test fixtures.

pub mod hash;

#[cfg(test)]
pub mod testutil;
