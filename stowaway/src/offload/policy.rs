//! Offload task policies and configuration.

use std::time::Duration;

/// Policy for handling task timeouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TimeoutPolicy {
    /// No timeout - task runs until completion.
    #[default]
    None,
    /// Cancel task after specified duration.
    Cancel(Duration),
}

/// Configuration for the OffloadManager.
#[derive(Debug, Clone, Default)]
pub struct OffloadConfig {
    /// Timeout policy for spawned tasks.
    pub timeout_policy: TimeoutPolicy,
}

impl OffloadConfig {
    /// Create a new builder for OffloadConfig.
    pub fn builder() -> OffloadConfigBuilder {
        OffloadConfigBuilder::default()
    }

    /// Offload settings derived from the router configuration.
    ///
    /// A configured write timeout cancels background writes that exceed it.
    pub fn from_write_timeout(timeout: Option<Duration>) -> Self {
        match timeout {
            Some(duration) => Self::builder().timeout(duration).build(),
            None => Self::default(),
        }
    }
}

/// Builder for OffloadConfig.
#[derive(Debug, Clone, Default)]
pub struct OffloadConfigBuilder {
    timeout_policy: TimeoutPolicy,
}

impl OffloadConfigBuilder {
    /// Set timeout policy.
    pub fn timeout_policy(self, policy: TimeoutPolicy) -> Self {
        Self {
            timeout_policy: policy,
        }
    }

    /// Set timeout with cancel policy.
    pub fn timeout(self, duration: Duration) -> Self {
        self.timeout_policy(TimeoutPolicy::Cancel(duration))
    }

    /// Build the OffloadConfig.
    pub fn build(self) -> OffloadConfig {
        OffloadConfig {
            timeout_policy: self.timeout_policy,
        }
    }
}
