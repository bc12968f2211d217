//! Deterministic simulated transport and clock for host tests
//!
//! A [`SimBus`] owns the simulated wires and the simulated time. The
//! [`SimSerial`] and [`SimClock`] handles borrow it, so a test can inject
//! hub bytes and inspect device output while the engine runs.
//!
//! Every transport operation advances time by a configurable tick
//! (default 1 ms). Combined with per-byte arrival times on the inbound
//! wire, this makes timeout paths (idle detection, handshake wait,
//! liveness) fully deterministic without any real sleeping.

use core::cell::{Cell, RefCell};

use heapless::{Deque, Vec};

use crate::gpio::LinePins;
use crate::serial::SerialPort;
use crate::time::Clock;

/// Capacity of the hub-to-device wire
pub const WIRE_CAPACITY: usize = 512;

/// Capacity of the device-to-hub capture buffer
pub const CAPTURE_CAPACITY: usize = 2048;

/// Shared simulation state: wires, line levels, baud rate and time
pub struct SimBus {
    now_ms: Cell<u64>,
    io_tick_ms: Cell<u64>,
    baud: Cell<Option<u32>>,
    bauds: RefCell<Vec<u32, 8>>,
    rx_line_low: Cell<bool>,
    tx_line_high: Cell<bool>,
    /// Hub-to-device bytes, each tagged with its arrival time
    inbound: RefCell<Deque<(u64, u8), WIRE_CAPACITY>>,
    /// Everything the device wrote
    outbound: RefCell<Vec<u8, CAPTURE_CAPACITY>>,
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl SimBus {
    /// Create a bus at t=0 with an idle (high) RX line
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            io_tick_ms: Cell::new(1),
            baud: Cell::new(None),
            bauds: RefCell::new(Vec::new()),
            rx_line_low: Cell::new(false),
            tx_line_high: Cell::new(false),
            inbound: RefCell::new(Deque::new()),
            outbound: RefCell::new(Vec::new()),
        }
    }

    /// Serial handle for the engine under test
    pub fn serial(&self) -> SimSerial<'_> {
        SimSerial { bus: self }
    }

    /// Clock handle for the engine under test
    pub fn clock(&self) -> SimClock<'_> {
        SimClock { bus: self }
    }

    /// Current simulated time
    pub fn now(&self) -> u64 {
        self.now_ms.get()
    }

    /// Advance simulated time
    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }

    /// Set the simulated cost of one transport operation (default 1 ms)
    pub fn set_io_tick(&self, ms: u64) {
        self.io_tick_ms.set(ms);
    }

    /// Make bytes from the hub available immediately
    pub fn queue_from_hub(&self, bytes: &[u8]) {
        self.queue_from_hub_at(self.now(), bytes);
    }

    /// Make bytes from the hub available once simulated time reaches `at_ms`
    pub fn queue_from_hub_at(&self, at_ms: u64, bytes: &[u8]) {
        let mut inbound = self.inbound.borrow_mut();
        for &b in bytes {
            // Test scripts are sized to the wire; overflow means a bad test
            let _ = inbound.push_back((at_ms, b));
        }
    }

    /// Drain and return everything the device has written so far
    pub fn take_sent(&self) -> Vec<u8, CAPTURE_CAPACITY> {
        let mut outbound = self.outbound.borrow_mut();
        let sent = outbound.clone();
        outbound.clear();
        sent
    }

    /// Bytes written by the device and not yet drained
    pub fn sent_len(&self) -> usize {
        self.outbound.borrow().len()
    }

    /// Current baud rate, if the UART is running
    pub fn baud(&self) -> Option<u32> {
        self.baud.get()
    }

    /// Every baud rate the device has opened, in order
    pub fn baud_history(&self) -> Vec<u32, 8> {
        self.bauds.borrow().clone()
    }

    /// Drive the simulated RX line level (true = hub holds it low)
    pub fn set_rx_low(&self, low: bool) {
        self.rx_line_low.set(low);
    }

    /// Last level the device drove on its TX line
    pub fn tx_line_high(&self) -> bool {
        self.tx_line_high.get()
    }

    fn tick(&self) {
        self.now_ms.set(self.now_ms.get() + self.io_tick_ms.get());
    }
}

/// Simulated serial port handle
pub struct SimSerial<'a> {
    bus: &'a SimBus,
}

impl SerialPort for SimSerial<'_> {
    fn begin(&mut self, baud: u32) {
        self.bus.baud.set(Some(baud));
        let _ = self.bus.bauds.borrow_mut().push(baud);
    }

    fn end(&mut self) {
        self.bus.baud.set(None);
    }

    fn available(&mut self) -> usize {
        self.bus.tick();
        let now = self.bus.now();
        self.bus
            .inbound
            .borrow()
            .iter()
            .filter(|(at, _)| *at <= now)
            .count()
    }

    fn read(&mut self) -> Option<u8> {
        self.bus.tick();
        let now = self.bus.now();
        let mut inbound = self.bus.inbound.borrow_mut();
        let ready = matches!(inbound.front(), Some((at, _)) if *at <= now);
        if ready {
            inbound.pop_front().map(|(_, b)| b)
        } else {
            None
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> usize {
        self.bus.tick();
        let now = self.bus.now();
        let mut inbound = self.bus.inbound.borrow_mut();
        let mut count = 0;
        while count < buf.len() {
            let ready = matches!(inbound.front(), Some((at, _)) if *at <= now);
            if !ready {
                // Nothing more arrives within the read timeout: short read
                break;
            }
            if let Some((_, b)) = inbound.pop_front() {
                buf[count] = b;
                count += 1;
            }
        }
        count
    }

    fn write(&mut self, data: &[u8]) {
        self.bus.tick();
        let _ = self.bus.outbound.borrow_mut().extend_from_slice(data);
    }

    fn flush(&mut self) {
        self.bus.tick();
    }
}

impl LinePins for SimSerial<'_> {
    fn rx_is_low(&mut self) -> bool {
        self.bus.tick();
        self.bus.rx_line_low.get()
    }

    fn set_tx(&mut self, high: bool) {
        self.bus.tx_line_high.set(high);
    }
}

/// Simulated clock handle
pub struct SimClock<'a> {
    bus: &'a SimBus,
}

impl Clock for SimClock<'_> {
    fn now_ms(&self) -> u64 {
        self.bus.now()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.bus.advance(ms as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_arrive_on_schedule() {
        let bus = SimBus::new();
        bus.queue_from_hub_at(100, &[0x04]);

        let mut serial = bus.serial();
        assert_eq!(serial.available(), 0);
        assert_eq!(serial.read(), None);

        bus.advance(100);
        assert_eq!(serial.available(), 1);
        assert_eq!(serial.read(), Some(0x04));
    }

    #[test]
    fn test_short_read() {
        let bus = SimBus::new();
        bus.queue_from_hub(&[0x01]);
        bus.queue_from_hub_at(500, &[0x02]);

        let mut serial = bus.serial();
        let mut buf = [0u8; 2];
        assert_eq!(serial.read_bytes(&mut buf), 1);
        assert_eq!(buf[0], 0x01);
    }

    #[test]
    fn test_io_advances_time() {
        let bus = SimBus::new();
        let mut serial = bus.serial();

        let before = bus.now();
        serial.available();
        serial.rx_is_low();
        assert_eq!(bus.now(), before + 2);
    }

    #[test]
    fn test_write_capture_and_baud() {
        let bus = SimBus::new();
        let mut serial = bus.serial();

        serial.begin(2400);
        serial.write(&[0x40, 0x22, 0x9D]);
        serial.flush();
        serial.begin(115200);

        assert_eq!(bus.baud(), Some(115200));
        assert_eq!(bus.baud_history().as_slice(), &[2400, 115200]);
        assert_eq!(bus.take_sent().as_slice(), &[0x40, 0x22, 0x9D]);
        assert_eq!(bus.sent_len(), 0);
    }

    #[test]
    fn test_delay_advances_clock() {
        let bus = SimBus::new();
        let mut clock = bus.clock();
        clock.delay_ms(250);
        assert_eq!(clock.now_ms(), 250);
    }
}
