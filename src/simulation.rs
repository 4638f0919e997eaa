//! End-to-end simulation driver: wires a pair of [`Endpoint`]s, each running
//! one of the four protocol variants, over a pair of simulated physical
//! links, and drains the shared event loop until every packet of a
//! synthetic file has reached the receiver's network layer.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::common::{FORWARD_PATH, REVERSE_PATH};
use crate::core::policy::{GbnAck, GbnNak, GbnNoAck, SelectiveRepeat, SrRetransmitStrategy, VariantPolicy};
use crate::core::Endpoint;
use crate::event_loop::EventLoop;
use crate::layers::network::SimulatedNetwork;
use crate::layers::physical::SimulatedPhysical;
use crate::layers::timer::SimulatedTimers;
use crate::layers::peer_slot;

static FILE_SIZE_BYTES: u64 = 1_000_000;

/// Which protocol variant to run. `Sr` carries the `max_seq` knob and the
/// choice of retransmit-target strategy.
#[derive(Debug, Clone, Copy)]
pub enum Variant {
    /// Go-Back-N, cumulative ACK only.
    GbnAck,
    /// Go-Back-N with NAK-assisted fast retransmit.
    GbnNak,
    /// Go-Back-N, piggyback-only acknowledgement.
    GbnNoAck,
    /// Selective Repeat.
    Sr {
        /// Largest sequence number (must make `max_seq+1` even).
        max_seq: u8,
        /// How a data-timeout retransmit target is chosen.
        strategy: SrRetransmitStrategy,
    },
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Variant::GbnAck => write!(f, "gbn-ack"),
            Variant::GbnNak => write!(f, "gbn-nak"),
            Variant::GbnNoAck => write!(f, "gbn-noack"),
            Variant::Sr { max_seq, strategy } => write!(f, "sr(max_seq={max_seq}, {strategy:?})"),
        }
    }
}

/// Aggregate results of one simulated transfer.
#[derive(Debug, Clone, Copy)]
pub struct SimulationReport {
    /// Simulated wall-clock time to deliver every packet, in seconds.
    pub elapsed_seconds: f64,
    /// Useful payload bytes delivered.
    pub bytes_delivered: u64,
    /// Effective throughput, in bytes/second.
    pub goodput: f64,
    /// Data frames sent by the sender beyond the one-per-packet baseline.
    /// Approximate: counts every `send_frame` call on the sender's
    /// physical layer, so it also includes the stray duplicate resends
    /// GBN-nak's full-window retransmit produces.
    pub retransmissions: u64,
    /// Whether the transfer drained within the iteration budget. `false`
    /// means the event loop stalled or exceeded the stall guard before
    /// every packet arrived; a misconfigured loss model can do this.
    pub completed: bool,
}

/// Runs one simulated file transfer of `variant` with the given packet
/// size, returning throughput and retransmission statistics.
pub fn run_transfer(variant: Variant, packet_size: usize) -> SimulationReport {
    match variant {
        Variant::GbnAck => run_with(GbnAck, GbnAck, packet_size),
        Variant::GbnNak => run_with(GbnNak, GbnNak, packet_size),
        Variant::GbnNoAck => run_with(GbnNoAck, GbnNoAck, packet_size),
        Variant::Sr { max_seq, strategy } => run_with(
            SelectiveRepeat::new(max_seq, strategy),
            SelectiveRepeat::new(max_seq, strategy),
            packet_size,
        ),
    }
}

fn run_with<P: VariantPolicy + 'static>(sender_policy: P, receiver_policy: P, packet_size: usize) -> SimulationReport {
    let event_loop = Rc::new(RefCell::new(EventLoop::default()));

    let sender_slot = peer_slot::<P>();
    let receiver_slot = peer_slot::<P>();

    let num_packets = FILE_SIZE_BYTES.div_ceil(packet_size as u64).max(1);
    let mut outbound = VecDeque::with_capacity(num_packets as usize);
    for seq in 0..num_packets {
        let mut packet = vec![0u8; packet_size];
        let stamp = seq.to_le_bytes();
        let n = stamp.len().min(packet_size);
        packet[..n].copy_from_slice(&stamp[..n]);
        outbound.push_back(packet);
    }

    let frames_sent = Rc::new(RefCell::new(0u64));
    let delivered = Rc::new(RefCell::new(Vec::new()));

    let sender_physical = SimulatedPhysical::new(
        Rc::clone(&event_loop),
        FORWARD_PATH,
        sender_slot.clone(),
        receiver_slot.clone(),
        Some(Rc::clone(&frames_sent)),
    );
    let sender_network = SimulatedNetwork::new(
        outbound,
        Rc::new(RefCell::new(Vec::new())),
        Rc::clone(&event_loop),
        sender_slot.clone(),
    );
    let sender_timers = SimulatedTimers::new(Rc::clone(&event_loop), sender_slot.clone());

    let sender = Rc::new(RefCell::new(Endpoint::new(
        sender_policy,
        Box::new(sender_physical),
        Box::new(sender_network),
        Box::new(sender_timers),
    )));
    *sender_slot.borrow_mut() = Some(Rc::downgrade(&sender));

    let receiver_physical = SimulatedPhysical::new(
        Rc::clone(&event_loop),
        REVERSE_PATH,
        receiver_slot.clone(),
        sender_slot.clone(),
        None,
    );
    let receiver_network = SimulatedNetwork::new(
        VecDeque::new(),
        Rc::clone(&delivered),
        Rc::clone(&event_loop),
        receiver_slot.clone(),
    );
    let receiver_timers = SimulatedTimers::new(Rc::clone(&event_loop), receiver_slot.clone());

    let receiver = Rc::new(RefCell::new(Endpoint::new(
        receiver_policy,
        Box::new(receiver_physical),
        Box::new(receiver_network),
        Box::new(receiver_timers),
    )));
    *receiver_slot.borrow_mut() = Some(Rc::downgrade(&receiver));

    trace!(num_packets, packet_size, "Simulation initialized");

    let stall_limit = num_packets.max(16) * 64;
    let mut iterations = 0u64;
    let mut completed = false;

    loop {
        if delivered.borrow().len() as u64 >= num_packets {
            completed = true;
            break;
        }
        if event_loop.borrow().pending_count() == 0 {
            break;
        }
        event_loop.borrow_mut().advance();

        iterations += 1;
        if iterations > stall_limit {
            break;
        }
    }

    let elapsed = event_loop.borrow().now();
    let bytes_delivered: u64 = delivered.borrow().iter().map(|p| p.len() as u64).sum();
    let goodput = if elapsed > 0.0 { bytes_delivered as f64 / elapsed } else { 0.0 };
    let total_frames_sent = *frames_sent.borrow();
    let retransmissions = total_frames_sent.saturating_sub(num_packets);

    trace!(goodput, retransmissions, elapsed, completed, "Simulation stats");

    SimulationReport {
        elapsed_seconds: elapsed,
        bytes_delivered,
        goodput,
        retransmissions,
        completed,
    }
}
