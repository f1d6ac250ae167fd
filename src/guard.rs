//! Protection for configurations this tool must never modify.

use std::collections::BTreeSet;
use thiserror::Error;

/// Configuration IDs that ship as protected.
///
/// These are always part of the deny-list, whatever the user configuration
/// adds on top.
pub const BUILTIN_RESERVED_IDS: [&str; 4] = [
    "4c1e0f5a-9b1d-4f3e-8a47-2d6b0c9e7f10",
    "8e2a6c3d-1f7b-4a95-b0d8-5c3e9f1a2b64",
    "b7d94e21-6a0c-4d8f-9e35-71f2a8c4d0e9",
    "f03a5b8c-2e6d-4917-a4c0-9d8e1b7f3a25",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("configuration {config_id} is reserved and cannot be modified")]
pub struct ReservedConfigurationError {
    pub config_id: String,
}

/// Deny-list check run before any remote access for a mutating operation.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct ReservedIdGuard {
    ids: BTreeSet<String>,
}

impl ReservedIdGuard {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Guard with the built-in IDs plus `extra`.
    pub fn with_builtin<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut guard = Self::new(BUILTIN_RESERVED_IDS);
        guard.ids.extend(extra.into_iter().map(Into::into));
        guard
    }

    pub fn is_reserved(&self, config_id: &str) -> bool {
        self.ids.contains(config_id)
    }

    pub fn assert_mutable(&self, config_id: &str) -> Result<(), ReservedConfigurationError> {
        if self.is_reserved(config_id) {
            return Err(ReservedConfigurationError {
                config_id: config_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
