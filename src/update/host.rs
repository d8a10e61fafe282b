//! Access to the version of the running host plugin

#[cfg(test)]
use mockall::automock;

use crate::config::DEFAULT_VERSION_ENV;

/// Reads the currently running version from the host environment
#[cfg_attr(test, automock)]
pub trait HostVersion: Send + Sync {
    /// Returns `None` when the host has not published its version yet
    fn current_version(&self) -> Option<String>;
}

/// A version known up front, e.g. compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct FixedHostVersion(Option<String>);

impl FixedHostVersion {
    pub fn new(version: &str) -> Self {
        Self(Some(version.to_string()))
    }

    pub fn unset() -> Self {
        Self(None)
    }
}

impl HostVersion for FixedHostVersion {
    fn current_version(&self) -> Option<String> {
        self.0.clone()
    }
}

/// Reads the version from an environment variable on every call
#[derive(Debug, Clone)]
pub struct EnvHostVersion {
    var: String,
}

impl EnvHostVersion {
    pub fn new(var: &str) -> Self {
        Self {
            var: var.to_string(),
        }
    }
}

impl Default for EnvHostVersion {
    fn default() -> Self {
        Self::new(DEFAULT_VERSION_ENV)
    }
}

impl HostVersion for EnvHostVersion {
    fn current_version(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }
}
