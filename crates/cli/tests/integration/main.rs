//! CLI integration tests, grouped by command.

mod common;

mod build_tests;
mod copy_tests;
mod edit_tests;
mod path_info_tests;
mod run_tests;
