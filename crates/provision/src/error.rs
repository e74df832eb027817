//! Error types for policy loading, resolution and execution.
//!
//! Resolution itself cannot fail once a [`PolicyStore`](crate::PolicyStore)
//! exists, so most variants are raised while reading or validating the
//! desired-state description. Install failures are not errors: they are
//! reported per action in the execution summary.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the provisioning crate.
#[derive(Debug, Error)]
pub enum Error {
    /// A source descriptor declares a checksum but no url to verify it against.
    #[error("malformed source for '{package}'{}: checksum set without url", scope(.platform))]
    MalformedSourceDescriptor {
        /// Package the descriptor belongs to
        package: String,
        /// Platform section the descriptor was declared under, if any
        platform: Option<String>,
    },

    /// A source names a cache file that would land outside the download cache.
    #[error("unsafe file_name {file_name:?} for '{package}'{}", scope(.platform))]
    UnsafeFileName {
        /// Package the descriptor belongs to
        package: String,
        /// The rejected file name
        file_name: String,
        /// Platform section the descriptor was declared under, if any
        platform: Option<String>,
    },

    /// A package key is empty or whitespace.
    #[error("invalid package name {name:?}{}", scope(.platform))]
    InvalidPackageName {
        /// The offending key
        name: String,
        /// Platform section the key was declared under, if any
        platform: Option<String>,
    },

    /// The policy document is not valid TOML or does not match the schema.
    #[error("invalid policy document: {0}")]
    Parse(String),

    /// Asking the user for confirmation failed.
    #[error("confirmation failed: {0}")]
    Confirmation(String),

    /// Reading the policy document failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn scope(platform: &Option<String>) -> String {
    platform
        .as_ref()
        .map(|p| format!(" (platform {p})"))
        .unwrap_or_default()
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Result alias for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;
