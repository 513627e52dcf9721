//! Store path identifiers.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{OBJ_HASH_PREFIX_LEN, STORE_PATH_MAX_NAME_LEN};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid store path '{path}': {reason}")]
pub struct StorePathError {
  pub path: String,
  pub reason: &'static str,
}

/// The base name of a store object, `<hash>-<name>`.
///
/// Does not include the store directory; use `Store::print_store_path` for
/// the absolute form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StorePath(String);

impl StorePath {
  pub fn new(base: &str) -> Result<Self, StorePathError> {
    let invalid = |reason| StorePathError {
      path: base.to_string(),
      reason,
    };

    if base.len() < OBJ_HASH_PREFIX_LEN + 2 {
      return Err(invalid("too short"));
    }
    let Some((hash, rest)) = base.split_at_checked(OBJ_HASH_PREFIX_LEN) else {
      return Err(invalid("hash part is not lowercase hex"));
    };
    if !hash.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)) {
      return Err(invalid("hash part is not lowercase hex"));
    }
    let Some(name) = rest.strip_prefix('-') else {
      return Err(invalid("missing '-' after hash part"));
    };
    check_name(name).map_err(invalid)?;

    Ok(Self(base.to_string()))
  }

  pub fn from_parts(hash: &str, name: &str) -> Result<Self, StorePathError> {
    Self::new(&format!("{}-{}", hash, name))
  }

  pub fn hash_part(&self) -> &str {
    &self.0[..OBJ_HASH_PREFIX_LEN]
  }

  pub fn name(&self) -> &str {
    &self.0[OBJ_HASH_PREFIX_LEN + 1..]
  }

  pub fn is_derivation(&self) -> bool {
    self.name().ends_with(".drv")
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

/// Validate the name part of a store path.
pub fn check_name(name: &str) -> Result<(), &'static str> {
  if name.is_empty() {
    return Err("name is empty");
  }
  if name.len() > STORE_PATH_MAX_NAME_LEN {
    return Err("name is too long");
  }
  if name.starts_with('.') {
    return Err("name starts with '.'");
  }
  if !name
    .chars()
    .all(|c| c.is_ascii_alphanumeric() || "+-._?=".contains(c))
  {
    return Err("name contains a forbidden character");
  }
  Ok(())
}

impl fmt::Display for StorePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

impl FromStr for StorePath {
  type Err = StorePathError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::new(s)
  }
}

impl TryFrom<String> for StorePath {
  type Error = StorePathError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::new(&value)
  }
}

impl From<StorePath> for String {
  fn from(path: StorePath) -> Self {
    path.0
  }
}
