//! Configuration for response resolution.
//!
//! Built once at startup by the binary and shared read-only by every request.

use std::time::Duration;

use dust_client::MessageContext;

use crate::services::resolver::ResolverKind;

pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 15;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(2000);
pub const DEFAULT_STREAM_DEADLINE: Duration = Duration::from_secs(120);

/// Fixed-interval polling budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_POLL_MAX_ATTEMPTS,
            interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl PollSettings {
    /// Worst-case time spent sleeping between fetches.
    pub fn max_wait(&self) -> Duration {
        self.interval * self.max_attempts
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Upper bound on the whole streamed read.
    pub deadline: Duration,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            deadline: DEFAULT_STREAM_DEADLINE,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProxyConfig {
    pub default_resolver: ResolverKind,
    pub poll: PollSettings,
    pub stream: StreamSettings,
    pub message_context: MessageContext,
}

impl ProxyConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll.max_attempts == 0 {
            anyhow::bail!("poll max attempts must be at least 1");
        }
        if self.stream.deadline.is_zero() {
            anyhow::bail!("stream deadline must be greater than zero");
        }
        if self.message_context.timezone.trim().is_empty() {
            anyhow::bail!("message timezone must not be empty");
        }
        if self.message_context.username.trim().is_empty() {
            anyhow::bail!("message username must not be empty");
        }
        Ok(())
    }
}
