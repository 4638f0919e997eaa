//! Simulated network layer: a finite outbound packet queue plus a
//! collecting inbound sink, driving `NetworkLayerReady` through the shared
//! event loop whenever the core re-enables it and a packet is waiting.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::core::event::Event;
use crate::core::policy::VariantPolicy;
use crate::core::traits::NetworkLayer;
use crate::event_loop::EventLoop;

use super::{resolve, PeerSlot};

/// A network layer fed by a fixed queue of outbound packets, collecting
/// whatever the core delivers from the far end into a shared buffer the
/// driver can observe without reaching through the trait object.
pub struct SimulatedNetwork<P: VariantPolicy> {
    outbound: VecDeque<Vec<u8>>,
    delivered: Rc<RefCell<Vec<Vec<u8>>>>,
    enabled: bool,
    ready_pending: bool,
    event_loop: Rc<RefCell<EventLoop>>,
    owner: PeerSlot<P>,
}

impl<P: VariantPolicy + 'static> SimulatedNetwork<P> {
    /// Builds a network layer with `outbound` queued for transmission and
    /// inbound packets appended to `delivered`.
    pub fn new(
        outbound: VecDeque<Vec<u8>>,
        delivered: Rc<RefCell<Vec<Vec<u8>>>>,
        event_loop: Rc<RefCell<EventLoop>>,
        owner: PeerSlot<P>,
    ) -> Self {
        Self {
            outbound,
            delivered,
            enabled: false,
            ready_pending: false,
            event_loop,
            owner,
        }
    }

    fn maybe_fire(&mut self) {
        if !self.enabled || self.ready_pending || self.outbound.is_empty() {
            return;
        }

        self.ready_pending = true;
        let now = self.event_loop.borrow().now();
        let owner = self.owner.clone();
        self.event_loop.borrow_mut().schedule(
            Box::new(move || {
                if let Some(ep) = resolve(&owner) {
                    ep.borrow_mut().step(Event::NetworkLayerReady);
                }
            }),
            now,
        );
    }
}

impl<P: VariantPolicy + 'static> NetworkLayer for SimulatedNetwork<P> {
    fn get_packet(&mut self) -> Option<Vec<u8>> {
        self.ready_pending = false;
        self.outbound.pop_front()
    }

    fn put_packet(&mut self, data: &[u8]) {
        self.delivered.borrow_mut().push(data.to_vec());
    }

    fn enable(&mut self) {
        self.enabled = true;
        self.maybe_fire();
    }

    fn disable(&mut self) {
        self.enabled = false;
    }
}
