//! sysp-lib: store access, expression evaluation and command plumbing for sysp
//!
//! - `store`: the `Store` trait, the local directory store and store paths
//! - `eval`: the Lua evaluator, search path and failure inspector
//! - `installable`: resolving command-line arguments to store outputs
//! - `profile`: numbered generations behind a profile symlink
//! - `command`: handles, resolvers and other capabilities commands compose

pub mod command;
pub mod consts;
pub mod eval;
pub mod installable;
pub mod platform;
pub mod profile;
pub mod settings;
pub mod store;
pub mod util;
