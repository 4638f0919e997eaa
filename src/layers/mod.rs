//! Simulated external collaborators: the three traits the core dispatches
//! through (`PhysicalLayer`, `NetworkLayer`, `TimerService`), wired to a
//! shared [`EventLoop`](crate::event_loop::EventLoop) so the whole two-way
//! exchange between a pair of endpoints runs as one discrete-event
//! simulation.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::core::{Endpoint, VariantPolicy};

/// Physical layer implementations.
pub mod physical;

/// Network layer implementations.
pub mod network;

/// Timer service implementations.
pub mod timer;

/// A lazily-resolved handle to a peer endpoint.
///
/// Two endpoints that talk to each other need each other's address before
/// either can be fully constructed. Collaborators capture a clone of this
/// slot and resolve the weak reference only when a scheduled callback
/// actually fires, by which point the driver has filled every slot in.
pub type PeerSlot<P> = Rc<RefCell<Option<Weak<RefCell<Endpoint<P>>>>>>;

/// An empty, not-yet-bound peer slot.
pub fn peer_slot<P: VariantPolicy>() -> PeerSlot<P> {
    Rc::new(RefCell::new(None))
}

/// Resolves a slot to its endpoint, if the endpoint is still alive and the
/// slot has been bound.
pub(crate) fn resolve<P: VariantPolicy>(slot: &PeerSlot<P>) -> Option<Rc<RefCell<Endpoint<P>>>> {
    slot.borrow().as_ref().and_then(Weak::upgrade)
}
