//! Validated branch names.
//!
//! Names typed by the user (new branches from `create`, `split` and `rename`)
//! go through [`BranchName`] before anything touches git, so a bad name is
//! rejected before any metadata is written.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::Error;

/// A branch name that git will accept and the shell cannot misread.
///
/// ```
/// use sprig_core::BranchName;
///
/// assert!(BranchName::new("stack/part-1").is_ok());
/// assert!(BranchName::new("part..two").is_err());
/// assert!(BranchName::new("x;y").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchName(String);

impl BranchName {
    /// Validate `name`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidBranchName`] naming the first rule violated.
    pub fn new(name: impl Into<String>) -> Result<Self, Error> {
        let name = name.into();
        if let Some(reason) = first_violation(&name) {
            return Err(Error::InvalidBranchName { name, reason });
        }
        Ok(Self(name))
    }

    /// Borrow the name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the name back out.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Default name for the branch a split carves out of `branch`.
    ///
    /// # Errors
    /// Returns an error if `branch` itself is not a valid name.
    pub fn split_base_of(branch: &str) -> Result<Self, Error> {
        Self::new(format!("{branch}-base"))
    }
}

impl AsRef<str> for BranchName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for BranchName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<str> for BranchName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for BranchName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl Serialize for BranchName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for BranchName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Self::new(s).map_err(serde::de::Error::custom)
    }
}

/// Characters `git check-ref-format` refuses.
const GIT_FORBIDDEN: &[char] = &[' ', '~', '^', ':', '?', '*', '[', '\\'];

/// Characters with meaning to a shell.
const SHELL_META: &[char] = &[
    '$', ';', '|', '&', '>', '<', '`', '"', '\'', '(', ')', '{', '}', '!',
];

/// Substrings git refuses anywhere in a ref name.
const FORBIDDEN_SEQUENCES: &[(&str, &str)] = &[
    ("..", "cannot contain '..'"),
    ("//", "cannot contain '//'"),
    ("@{", "cannot contain '@{'"),
    ("/.", "components cannot start with '.'"),
    (".lock/", "components cannot end with '.lock'"),
];

fn first_violation(name: &str) -> Option<String> {
    if name.is_empty() {
        return Some("name cannot be empty".into());
    }
    if name == "@" {
        return Some("name cannot be '@'".into());
    }
    if name.starts_with('-') {
        return Some("name cannot start with '-'".into());
    }
    if name.starts_with('.') || name.ends_with('.') {
        return Some("name cannot start or end with '.'".into());
    }
    if name.starts_with('/') || name.ends_with('/') {
        return Some("name cannot start or end with '/'".into());
    }
    #[allow(clippy::case_sensitive_file_extension_comparisons)]
    if name.ends_with(".lock") {
        return Some("name cannot end with '.lock'".into());
    }

    if let Some(c) = name.chars().find(char::is_ascii_control) {
        return Some(format!("name cannot contain control character {c:?}"));
    }
    if let Some(c) = name.chars().find(|c| GIT_FORBIDDEN.contains(c)) {
        return Some(format!("name cannot contain '{c}'"));
    }
    if let Some(c) = name.chars().find(|c| SHELL_META.contains(c)) {
        return Some(format!("name cannot contain shell metacharacter '{c}'"));
    }

    FORBIDDEN_SEQUENCES
        .iter()
        .find(|(seq, _)| name.contains(seq))
        .map(|(_, reason)| format!("name {reason}"))
}
