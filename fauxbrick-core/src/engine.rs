//! The generic protocol engine
//!
//! Owns the transport, the clock, a device profile and two fixed frame
//! buffers. [`Engine::poll`] must be called continuously by the embedding
//! application: while disconnected it runs the descriptor handshake,
//! while connected it serves at most one hub frame and supervises the
//! liveness window.
//!
//! Failure policy, straight from the wire protocol: short reads and
//! checksum mismatches abort the frame at hand and are otherwise
//! invisible; only 200 ms of hub silence ends a session.

use fauxbrick_hal::{Clock, Transport};
use fauxbrick_protocol::{
    data_header, decode_header, seal_frame, ExtMode, ACK, HEADER_COMBO_RESET, HEADER_COMBO_SET,
    HEADER_EXT_MODE, HEADER_GET_VALUE, MAX_FRAME_SIZE, NACK,
};

use crate::link::{
    LinkState, LinkSupervisor, ACK_POLL_MS, ACK_TIMEOUT_MS, HIGH_BAUD, IDLE_DETECT_MS, LOW_BAUD,
    WAKE_PULSE_MS,
};
use crate::profile::{ComboLayout, DeviceProfile, ModeInfo, ModeKind};

/// Receive buffer: sized for the largest body a write query's embedded
/// data header can claim (32-byte padded payload + checksum)
const RX_BUF_LEN: usize = 33;

// The only combo-reset packet observed on the wire is { 4C 20 00 93 }
const COMBO_RESET_TRAILER: u8 = 0x93;
const COMBO_RESET_ACK: [u8; 2] = [0x44, 0x20];

/// Protocol engine for one emulated device
///
/// Generic over the transport, the clock and the device profile; all
/// composition, no virtual dispatch. The embedding application owns the
/// engine and reaches the bound sensor values through
/// [`device`](Engine::device) / [`device_mut`](Engine::device_mut)
/// between polls.
pub struct Engine<T, C, P> {
    transport: T,
    clock: C,
    profile: P,
    link: LinkSupervisor,
    ext_mode: ExtMode,
    combo_enabled: bool,
    rx_buf: [u8; RX_BUF_LEN],
    tx_buf: [u8; MAX_FRAME_SIZE],
}

impl<T: Transport, C: Clock, P: DeviceProfile> Engine<T, C, P> {
    /// Create an engine; no bus activity until the first poll
    pub fn new(transport: T, clock: C, profile: P) -> Self {
        Self {
            transport,
            clock,
            profile,
            link: LinkSupervisor::new(),
            ext_mode: ExtMode::Mode0,
            combo_enabled: false,
            rx_buf: [0; RX_BUF_LEN],
            tx_buf: [0; MAX_FRAME_SIZE],
        }
    }

    /// The bound device values
    pub fn device(&self) -> &P {
        &self.profile
    }

    /// Mutable access to the bound device values
    ///
    /// Must only be used between polls; the poll loop is the only other
    /// writer.
    pub fn device_mut(&mut self) -> &mut P {
        &mut self.profile
    }

    /// True once the hub has acknowledged the handshake
    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    /// Current link state
    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    /// True while a hub-selected mode combination overrides the default
    /// NACK response
    pub fn combo_active(&self) -> bool {
        self.combo_enabled
    }

    /// Drive the connection: handshake while disconnected, serve one
    /// frame and check liveness while connected
    pub fn poll(&mut self) {
        if !self.link.is_connected() {
            self.connect_to_hub();
            return;
        }

        self.handle_frame();

        let now = self.clock.now_ms();
        if self.link.expired(now) {
            #[cfg(feature = "defmt")]
            defmt::info!(
                "link lost: {} ms since last NACK",
                now - self.link.last_ack_ms()
            );
            self.drop_link();
        }
    }

    // --- connection setup ---

    fn connect_to_hub(&mut self) {
        #[cfg(feature = "defmt")]
        defmt::debug!("starting hub handshake");

        self.link.begin_handshake();
        self.wait_for_hub_idle();
        self.send_init_sequence();

        if self.wait_for_ack() {
            self.transport.begin(HIGH_BAUD);
            let now = self.clock.now_ms();
            self.link.established(now);
            self.ext_mode = ExtMode::Mode0;
            self.combo_enabled = false;
            #[cfg(feature = "defmt")]
            defmt::info!("hub connection established");
        } else {
            // Not fatal: the next poll starts over, no backoff
            self.link.drop_link();
        }
    }

    /// Wait for the hub to release the RX line, then announce ourselves
    /// with a pulse on TX
    ///
    /// The wait is unbounded: without a hub there is nothing else for the
    /// device to do.
    fn wait_for_hub_idle(&mut self) {
        // UART off: the lines are driven as plain GPIO here
        self.transport.end();
        self.transport.set_tx(false);

        let mut idle_since = self.clock.now_ms();
        loop {
            if self.transport.rx_is_low() {
                idle_since = self.clock.now_ms();
            }
            if self.clock.now_ms().saturating_sub(idle_since) > IDLE_DETECT_MS {
                break;
            }
        }

        self.transport.set_tx(true);
        self.clock.delay_ms(WAKE_PULSE_MS);
        self.transport.set_tx(false);
        self.clock.delay_ms(WAKE_PULSE_MS);
    }

    fn send_init_sequence(&mut self) {
        self.transport.begin(LOW_BAUD);
        for block in self.profile.init_sequence() {
            for chunk in block.chunks {
                self.transport.write(chunk);
            }
            self.transport.flush();
            if block.delay_ms > 0 {
                self.clock.delay_ms(block.delay_ms);
            }
        }
    }

    fn wait_for_ack(&mut self) -> bool {
        let start = self.clock.now_ms();
        while self.clock.now_ms().saturating_sub(start) < ACK_TIMEOUT_MS {
            if self.transport.available() > 0 && self.transport.read() == Some(ACK) {
                return true;
            }
            self.clock.delay_ms(ACK_POLL_MS);
        }
        #[cfg(feature = "defmt")]
        defmt::debug!("no handshake ACK within {} ms", ACK_TIMEOUT_MS);
        false
    }

    // --- connected traffic ---

    fn handle_frame(&mut self) {
        if self.transport.available() == 0 {
            return;
        }
        let Some(header) = self.transport.read() else {
            return;
        };

        match header {
            NACK => self.handle_nack(),
            HEADER_GET_VALUE => self.handle_get(),
            HEADER_EXT_MODE => self.handle_set(),
            HEADER_COMBO_RESET => self.handle_combo_reset(),
            HEADER_COMBO_SET => self.handle_combo_set(),
            _ => {
                #[cfg(feature = "defmt")]
                defmt::debug!("ignoring header {=u8:x}", header);
            }
        }
    }

    /// NACK: the hub's keep-alive, answered with the default data frame
    /// (or the combo concatenation while a combination is selected)
    fn handle_nack(&mut self) {
        let now = self.clock.now_ms();
        self.link.ack(now);

        if self.combo_enabled {
            if let Some(layout) = self.profile.combo_layout() {
                self.send_combo_frame(layout);
                return;
            }
        }

        let mode = self.profile.default_mode();
        self.ext_mode = ExtMode::for_mode(mode);
        self.respond_to_mode(mode);
    }

    /// Get query: { 0x43, mode, checksum }; the header byte is consumed
    /// by the caller
    fn handle_get(&mut self) {
        let n = self.transport.read_bytes(&mut self.rx_buf[..2]);
        if n < 2 {
            #[cfg(feature = "defmt")]
            defmt::debug!("truncated get query");
            return;
        }
        let mode = self.rx_buf[0];
        self.ext_mode = ExtMode::for_mode(mode);
        self.respond_to_mode(mode);
    }

    /// Write query: an extended-mode prefix { value, checksum } followed
    /// by a data message whose header carries mode and size
    fn handle_set(&mut self) {
        let n = self.transport.read_bytes(&mut self.rx_buf[..3]);
        if n < 3 {
            return;
        }
        self.ext_mode = ExtMode::from_byte(self.rx_buf[0]);

        // rx_buf[1] is the prefix checksum; rx_buf[2] the data header.
        // The mode is taken from the 3-bit header field as-is - no write
        // mode of these devices lives above 7.
        let (mode, total) = decode_header(self.rx_buf[2]);
        let remaining = total - 1;
        if remaining > RX_BUF_LEN {
            // A hub-supplied size field never exceeds the 32-byte payload
            // class; anything larger is garbage
            return;
        }
        let n = self.transport.read_bytes(&mut self.rx_buf[..remaining]);
        if n < remaining {
            return;
        }

        let Some(info) = self.profile.mode_info(mode) else {
            #[cfg(feature = "defmt")]
            defmt::debug!("write for unknown mode {}", mode);
            return;
        };
        let data_len = info.data_len as usize;
        if info.kind != ModeKind::Write || data_len > total - 2 {
            #[cfg(feature = "defmt")]
            defmt::debug!("write for non-writable mode {}", mode);
            return;
        }
        self.profile.write_value(mode, &self.rx_buf[..data_len]);
    }

    /// Combo reset: { 0x4C, 0x20, 0x00, 0x93 }, checksum-validated but
    /// not parsed; acknowledged with a fixed two-byte reply
    fn handle_combo_reset(&mut self) {
        if self.profile.combo_layout().is_none() {
            return;
        }
        let n = self.transport.read_bytes(&mut self.rx_buf[..3]);
        if n < 3 {
            return;
        }
        if self.rx_buf[2] != COMBO_RESET_TRAILER {
            return;
        }

        self.combo_enabled = false;
        self.tx_buf[..2].copy_from_slice(&COMBO_RESET_ACK);
        self.send_frame(1);
    }

    /// Combo set: the profile's one accepted selection, validated by its
    /// trailing checksum and echoed back verbatim
    fn handle_combo_set(&mut self) {
        let Some(layout) = self.profile.combo_layout() else {
            return;
        };
        let n = self.transport.read_bytes(&mut self.rx_buf[..9]);
        if n < 9 {
            #[cfg(feature = "defmt")]
            defmt::debug!("truncated combo-set request");
            return;
        }
        if self.rx_buf[8] != layout.request_checksum {
            return;
        }

        self.combo_enabled = true;
        self.tx_buf[0] = HEADER_COMBO_SET;
        self.tx_buf[1..9].copy_from_slice(layout.request_echo);
        self.send_frame(8);
    }

    // --- responses ---

    fn respond_to_mode(&mut self, mode: u8) {
        let Some(info) = self.profile.mode_info(mode) else {
            // Observed hub behavior: unanswered, never an error frame
            #[cfg(feature = "defmt")]
            defmt::debug!("get for unknown mode {}", mode);
            return;
        };
        match info.kind {
            ModeKind::Read => {
                if info.mode >= 8 {
                    self.send_ext_mode_frame();
                }
                self.send_data_frame(info);
            }
            ModeKind::Write => {
                #[cfg(feature = "defmt")]
                defmt::debug!("get for write-only mode {}", mode);
            }
            ModeKind::Diagnostic => self.run_diagnostics(),
        }
    }

    fn send_data_frame(&mut self, info: &ModeInfo) {
        let wire = info.wire_len as usize;
        self.tx_buf[1..=wire].fill(0);
        self.profile
            .read_value(info.mode, &mut self.tx_buf[1..=wire]);
        self.tx_buf[0] = data_header(info.mode, info.wire_len);
        self.send_frame(wire);
    }

    fn send_combo_frame(&mut self, layout: &ComboLayout) {
        let wire = layout.wire_len as usize;
        self.tx_buf[1..=wire].fill(0);
        self.profile.compose_combo(&mut self.tx_buf[1..=wire]);
        // Concatenation frames go out as mode 0 data
        self.tx_buf[0] = data_header(0, layout.wire_len);
        self.send_frame(wire);
    }

    fn send_ext_mode_frame(&mut self) {
        self.tx_buf[0] = HEADER_EXT_MODE;
        self.tx_buf[1] = self.ext_mode.to_byte();
        self.send_frame(1);
    }

    /// Best-effort debug dump: replay the extended-mode default (if any),
    /// then every readable mode, then the write codecs with their canned
    /// samples. The real devices have debug modes with unknown semantics;
    /// this makes no claim to match them.
    fn run_diagnostics(&mut self) {
        self.send_ext_mode_frame();

        let default_mode = self.profile.default_mode();
        if default_mode >= 8 {
            self.respond_to_mode(default_mode);
        }
        self.ext_mode = ExtMode::Mode0;

        for info in self.profile.modes() {
            if info.kind == ModeKind::Read && info.mode < 8 {
                self.send_data_frame(info);
            }
        }
        for info in self.profile.modes() {
            if info.kind == ModeKind::Write {
                self.profile.write_value(info.mode, info.debug_sample);
            }
        }
    }

    /// Seal and transmit the frame staged in the tx buffer, blocking
    /// until the transport has drained it
    fn send_frame(&mut self, payload_len: usize) {
        let total = seal_frame(&mut self.tx_buf, payload_len);
        self.transport.write(&self.tx_buf[..total]);
        self.transport.flush();
    }

    fn drop_link(&mut self) {
        self.link.drop_link();
        // Combo selections and the extended-mode flag die with the session
        self.combo_enabled = false;
        self.ext_mode = ExtMode::Mode0;
    }
}
