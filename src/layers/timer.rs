//! Simulated timer service: per-slot data-retransmission timers plus the
//! singleton delayed-ACK timer, each backed by a scheduled event-loop
//! callback that re-enters the owning endpoint.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::core::event::Event;
use crate::core::policy::VariantPolicy;
use crate::core::traits::TimerService;
use crate::event_loop::EventLoop;

use super::{resolve, PeerSlot};

struct Armed {
    event_id: i64,
    deadline: f64,
}

/// A timer service whose deadlines are scheduled on the shared event loop.
pub struct SimulatedTimers<P: VariantPolicy> {
    event_loop: Rc<RefCell<EventLoop>>,
    owner: PeerSlot<P>,
    data_timers: HashMap<u8, Armed>,
    ack_timer: Option<Armed>,
}

impl<P: VariantPolicy + 'static> SimulatedTimers<P> {
    /// Builds a timer service for the endpoint identified by `owner`.
    pub fn new(event_loop: Rc<RefCell<EventLoop>>, owner: PeerSlot<P>) -> Self {
        Self {
            event_loop,
            owner,
            data_timers: HashMap::new(),
            ack_timer: None,
        }
    }
}

impl<P: VariantPolicy + 'static> TimerService for SimulatedTimers<P> {
    fn start_timer(&mut self, slot: u8, ms: u64) {
        self.stop_timer(slot);

        let now = self.event_loop.borrow().now();
        let deadline = now + ms as f64 / 1000.0;
        let owner = self.owner.clone();
        let event_id = self.event_loop.borrow_mut().schedule(
            Box::new(move || {
                if let Some(ep) = resolve(&owner) {
                    ep.borrow_mut().step(Event::DataTimeout { slot });
                }
            }),
            deadline,
        );

        self.data_timers.insert(slot, Armed { event_id, deadline });
    }

    fn stop_timer(&mut self, slot: u8) {
        if let Some(armed) = self.data_timers.remove(&slot) {
            self.event_loop.borrow_mut().cancel(armed.event_id);
        }
    }

    fn start_ack_timer(&mut self, ms: u64) {
        self.stop_ack_timer();

        let now = self.event_loop.borrow().now();
        let deadline = now + ms as f64 / 1000.0;
        let owner = self.owner.clone();
        let event_id = self.event_loop.borrow_mut().schedule(
            Box::new(move || {
                if let Some(ep) = resolve(&owner) {
                    ep.borrow_mut().step(Event::AckTimeout);
                }
            }),
            deadline,
        );

        self.ack_timer = Some(Armed { event_id, deadline });
    }

    fn stop_ack_timer(&mut self) {
        if let Some(armed) = self.ack_timer.take() {
            self.event_loop.borrow_mut().cancel(armed.event_id);
        }
    }

    fn get_timer(&self, slot: u8) -> Option<u64> {
        self.data_timers.get(&slot).map(|armed| {
            let now = self.event_loop.borrow().now();
            ((armed.deadline - now).max(0.0) * 1000.0) as u64
        })
    }
}
