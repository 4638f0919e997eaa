//! The events the endpoint's dispatch loop reacts to.

/// One event pushed into `Endpoint::step` by whatever harness drives the
/// loop (a live timer/physical-layer driver, or a simulation).
#[derive(Debug, Clone)]
pub enum Event {
    /// The network layer has a packet ready and admission is enabled.
    NetworkLayerReady,
    /// The physical layer finished the previous transmission.
    PhysicalLayerReady,
    /// A frame (possibly corrupt) arrived on the physical layer.
    FrameReceived(Vec<u8>),
    /// The per-slot data-retransmission timer for `slot` fired.
    DataTimeout { slot: u8 },
    /// The singleton delayed-ACK timer fired.
    AckTimeout,
}
