use std::time::Duration;

/// Settings for a [`CommandChannel`](crate::CommandChannel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelConfig {
    /// How long a request may wait for its ack. `None` waits forever.
    pub request_timeout: Option<Duration>,
    /// Buffer size of the unsolicited-event bus, per subscriber.
    pub event_capacity: usize,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
            event_capacity: 64,
        }
    }
}
