//! Link state and supervision timing
//!
//! The hub polls an attached device with a NACK byte roughly every
//! 100 ms. A device that has not heard one for more than 200 ms must
//! assume the hub is gone, drop the link and restart the descriptor
//! handshake from scratch. All state transitions here are pure; the
//! engine drives the transport.

/// Baud rate of the descriptor handshake
pub const LOW_BAUD: u32 = 2_400;

/// Baud rate after the hub acknowledges the descriptors
pub const HIGH_BAUD: u32 = 115_200;

/// The RX line must stay high this long before the hub counts as idle
pub const IDLE_DETECT_MS: u64 = 100;

/// Duration of each half of the wake pulse on the TX line
pub const WAKE_PULSE_MS: u32 = 100;

/// How long to wait for the hub to echo the ACK byte
pub const ACK_TIMEOUT_MS: u64 = 2_000;

/// Poll interval while waiting for the ACK byte
pub const ACK_POLL_MS: u32 = 10;

/// Silence longer than this drops the link
pub const LIVENESS_TIMEOUT_MS: u64 = 200;

/// Connection state of the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkState {
    /// No hub, or the link was dropped; the handshake runs on the next poll
    #[default]
    Disconnected,
    /// Descriptor sequence sent, waiting for the hub's acknowledgement
    Handshaking,
    /// Hub acknowledged; normal query/response traffic
    Connected,
}

/// Tracks the link state and the liveness window
///
/// Malformed or truncated frames never touch this state; the only way a
/// connected link ends is sustained silence.
#[derive(Debug, Clone)]
pub struct LinkSupervisor {
    state: LinkState,
    last_ack_ms: u64,
}

impl Default for LinkSupervisor {
    fn default() -> Self {
        Self::new()
    }
}

impl LinkSupervisor {
    /// Create a supervisor in the disconnected state
    pub fn new() -> Self {
        Self {
            state: LinkState::Disconnected,
            last_ack_ms: 0,
        }
    }

    /// Current link state
    pub fn state(&self) -> LinkState {
        self.state
    }

    /// True once the hub has acknowledged the handshake
    pub fn is_connected(&self) -> bool {
        self.state == LinkState::Connected
    }

    /// Mark the start of a handshake attempt
    pub fn begin_handshake(&mut self) {
        self.state = LinkState::Handshaking;
    }

    /// The hub acknowledged: the link is up as of `now_ms`
    pub fn established(&mut self, now_ms: u64) {
        self.state = LinkState::Connected;
        self.last_ack_ms = now_ms;
    }

    /// A NACK poll arrived; re-arm the liveness window
    pub fn ack(&mut self, now_ms: u64) {
        self.last_ack_ms = now_ms;
    }

    /// Timestamp of the last NACK (or of connection establishment)
    pub fn last_ack_ms(&self) -> u64 {
        self.last_ack_ms
    }

    /// True when a connected link has been silent past the liveness window
    pub fn expired(&self, now_ms: u64) -> bool {
        self.state == LinkState::Connected
            && now_ms.saturating_sub(self.last_ack_ms) > LIVENESS_TIMEOUT_MS
    }

    /// Drop back to the disconnected state
    pub fn drop_link(&mut self) {
        self.state = LinkState::Disconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let link = LinkSupervisor::new();
        assert_eq!(link.state(), LinkState::Disconnected);
        assert!(!link.is_connected());
    }

    #[test]
    fn test_handshake_flow() {
        let mut link = LinkSupervisor::new();
        link.begin_handshake();
        assert_eq!(link.state(), LinkState::Handshaking);
        assert!(!link.is_connected());

        link.established(1000);
        assert!(link.is_connected());
        assert_eq!(link.last_ack_ms(), 1000);
    }

    #[test]
    fn test_liveness_window_boundary() {
        let mut link = LinkSupervisor::new();
        link.established(1000);

        // Expires strictly after the window, not at it
        assert!(!link.expired(1000 + LIVENESS_TIMEOUT_MS));
        assert!(link.expired(1000 + LIVENESS_TIMEOUT_MS + 1));
    }

    #[test]
    fn test_ack_rearms_window() {
        let mut link = LinkSupervisor::new();
        link.established(1000);
        link.ack(1150);
        assert!(!link.expired(1300));
        assert!(link.expired(1150 + LIVENESS_TIMEOUT_MS + 1));
    }

    #[test]
    fn test_only_connected_links_expire() {
        let mut link = LinkSupervisor::new();
        assert!(!link.expired(u64::MAX));

        link.begin_handshake();
        assert!(!link.expired(u64::MAX));
    }

    #[test]
    fn test_drop_link() {
        let mut link = LinkSupervisor::new();
        link.established(0);
        link.drop_link();
        assert_eq!(link.state(), LinkState::Disconnected);
    }
}
