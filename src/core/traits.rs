//! External collaborator interfaces. The core never talks to a physical
//! link, a network-layer queue, or a timer facility directly. It only calls
//! these traits, so any harness (simulation, test mock, real hardware
//! driver) can sit underneath it.

/// The physical/datalink service: hands framed, CRC-trailered bytes to the
/// medium and reports when it is ready for the next one.
pub trait PhysicalLayer {
    /// Submit a fully framed (CRC-trailered) buffer for transmission.
    fn send_frame(&mut self, bytes: &[u8]);
}

/// The network-layer packet source/sink.
pub trait NetworkLayer {
    /// Pull the next outbound packet, if the upper layer has one ready.
    fn get_packet(&mut self) -> Option<Vec<u8>>;
    /// Deliver an inbound packet to the upper layer, in order.
    fn put_packet(&mut self, data: &[u8]);
    /// Gate `NETWORK_LAYER_READY` emission on (window has room and the
    /// physical layer is idle).
    fn enable(&mut self);
    /// Stop `NETWORK_LAYER_READY` emission.
    fn disable(&mut self);
}

/// Per-slot retransmission timers plus the singleton delayed-ACK timer.
pub trait TimerService {
    /// Arm the data-retransmission timer for `slot`.
    fn start_timer(&mut self, slot: u8, ms: u64);
    /// Cancel the data-retransmission timer for `slot`, if any.
    fn stop_timer(&mut self, slot: u8);
    /// Arm the singleton delayed-ACK timer.
    fn start_ack_timer(&mut self, ms: u64);
    /// Cancel the delayed-ACK timer, if armed.
    fn stop_ack_timer(&mut self);
    /// Remaining time on `slot`'s data timer, or `None` if it is not armed.
    /// Used only by the `OldestScan` retransmit strategy.
    fn get_timer(&self, slot: u8) -> Option<u64>;
}
