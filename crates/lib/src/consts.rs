//! Crate-wide constants.

/// Application name, used for directory names under XDG/AppData roots.
pub const APP_NAME: &str = "sysp";

/// Length of the hash part of a store path (truncated hex SHA-256).
pub const OBJ_HASH_PREFIX_LEN: usize = 20;

/// Maximum length of the name part of a store path.
pub const STORE_PATH_MAX_NAME_LEN: usize = 211;

/// Output name used for single-output store objects.
pub const DEFAULT_OUTPUT: &str = "out";

/// Expression file used for bare attribute paths when no `--file` is given.
pub const DEFAULT_EXPR_FILE: &str = "default.lua";

/// Search path entry consulted for bare attribute paths before `DEFAULT_EXPR_FILE`.
pub const DEFAULT_EXPR_ENTRY: &str = "default";

/// Store URI override.
pub const STORE_ENV: &str = "SYSP_STORE";

/// Colon-separated search path entries (`name=path` or `path`).
pub const SEARCH_PATH_ENV: &str = "SYSP_PATH";

/// Default profile override.
pub const PROFILE_ENV: &str = "SYSP_PROFILE";

/// Editor preference.
pub const EDITOR_ENV: &str = "EDITOR";

/// Editor used when `EDITOR` is unset.
pub const DEFAULT_EDITOR: &str = "cat";
