//! Simulated physical layer: a [`GilbertElliotChannel`] decides per-frame
//! survival, and delivery to the peer plus the sender's own
//! `PhysicalLayerReady` notification are scheduled on the shared event loop
//! with the usual propagation/processing delays.

use std::cell::RefCell;
use std::rc::Rc;

use crate::channel::GilbertElliotChannel;
use crate::common::{BIT_RATE, FRAME_OVERHEAD, PROCESSING_DELAY};
use crate::core::event::Event;
use crate::core::policy::VariantPolicy;
use crate::core::traits::PhysicalLayer;
use crate::event_loop::EventLoop;

use super::{resolve, PeerSlot};

/// A physical layer backed by a Gilbert-Elliot channel, feeding frames to a
/// peer endpoint after a simulated propagation delay.
pub struct SimulatedPhysical<P: VariantPolicy> {
    channel: GilbertElliotChannel,
    event_loop: Rc<RefCell<EventLoop>>,
    propagation_delay: f64,
    owner: PeerSlot<P>,
    peer: PeerSlot<P>,
    frames_sent: Option<Rc<RefCell<u64>>>,
}

impl<P: VariantPolicy + 'static> SimulatedPhysical<P> {
    /// Builds a new simulated link. `propagation_delay` is the one-way
    /// wire delay in seconds (use [`crate::common::FORWARD_PATH`] or
    /// `REVERSE_PATH` depending on direction). `frames_sent`, if given, is
    /// incremented on every call to `send_frame`, used by the simulation
    /// driver to report a retransmission count.
    pub fn new(
        event_loop: Rc<RefCell<EventLoop>>,
        propagation_delay: f64,
        owner: PeerSlot<P>,
        peer: PeerSlot<P>,
        frames_sent: Option<Rc<RefCell<u64>>>,
    ) -> Self {
        Self {
            channel: GilbertElliotChannel::new(),
            event_loop,
            propagation_delay,
            owner,
            peer,
            frames_sent,
        }
    }
}

impl<P: VariantPolicy + 'static> PhysicalLayer for SimulatedPhysical<P> {
    fn send_frame(&mut self, bytes: &[u8]) {
        if let Some(counter) = &self.frames_sent {
            *counter.borrow_mut() += 1;
        }

        let total_bits = bytes.len() as u64 * 8 + FRAME_OVERHEAD;
        let survived = self.channel.frame_success(total_bits);

        let mut payload = bytes.to_vec();
        if !survived {
            if let Some(last) = payload.last_mut() {
                *last ^= 0x01;
            }
        }

        let transmit_time = total_bits as f64 / BIT_RATE as f64;
        let base = self.event_loop.borrow().now();

        let owner = self.owner.clone();
        self.event_loop.borrow_mut().schedule(
            Box::new(move || {
                if let Some(ep) = resolve(&owner) {
                    ep.borrow_mut().step(Event::PhysicalLayerReady);
                }
            }),
            base + transmit_time,
        );

        let peer = self.peer.clone();
        let arrival = base + transmit_time + self.propagation_delay + PROCESSING_DELAY;
        self.event_loop.borrow_mut().schedule(
            Box::new(move || {
                if let Some(ep) = resolve(&peer) {
                    ep.borrow_mut().step(Event::FrameReceived(payload));
                }
            }),
            arrival,
        );
    }
}
