use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap};

/// A callback that can be scheduled.
///
/// Single-threaded simulation, so no `Send` bound: callbacks routinely close
/// over `Rc<RefCell<..>>` endpoint handles.
pub type EventFn = Box<dyn FnOnce()>;

struct Event {
    time: f64,
    id: i64,
    event: EventFn,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        other.time == self.time
    }
}

impl Eq for Event {}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        other.time.total_cmp(&self.time)
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A min-time-first event scheduler for discrete time simulation.
///
/// The endpoint's dispatch loop is synchronous and non-preemptive: the only
/// suspension point is waiting for the next event, so the scheduler driving
/// it needs no async runtime underneath it.
#[derive(Default)]
pub struct EventLoop {
    events: BinaryHeap<Event>,
    cancelled_events: BTreeSet<i64>,
    event_id: i64,
    now: f64,
}

impl EventLoop {
    /// Run next event in the loop.
    pub fn advance(&mut self) {
        let Some(event) = self.events.pop() else {
            return;
        };

        self.now = event.time;
        if !self.cancelled_events.remove(&event.id) {
            (event.event)();
        }
    }

    /// The timestamp of the most recently fired event (0.0 before the loop
    /// has advanced at all).
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Cancels event with given id.
    pub fn cancel(&mut self, event_id: i64) {
        self.cancelled_events.insert(event_id);
    }

    /// Schedules a new event.
    pub fn schedule(&mut self, event: EventFn, time: f64) -> i64 {
        let id = self.event_id;
        self.events.push(Event { time, id, event });
        self.event_id += 1;
        id
    }

    /// Returns number of pending events.
    pub fn pending_count(&self) -> usize {
        self.events.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test_log::test]
    fn test_schedule_and_advance() {
        let mut event_loop = EventLoop::default();
        let executed = Rc::new(RefCell::new(false));

        let executed_clone = executed.clone();
        event_loop.schedule(Box::new(move || *executed_clone.borrow_mut() = true), 1.0);

        assert!(!*executed.borrow());

        event_loop.advance();

        assert!(*executed.borrow());
    }

    #[test_log::test]
    fn test_event_ordering() {
        let mut event_loop = EventLoop::default();
        let order = Rc::new(RefCell::new(Vec::new()));

        // Schedule events out of order
        let order_clone = order.clone();
        event_loop.schedule(Box::new(move || order_clone.borrow_mut().push(3)), 3.0);

        let order_clone = order.clone();
        event_loop.schedule(Box::new(move || order_clone.borrow_mut().push(1)), 1.0);

        let order_clone = order.clone();
        event_loop.schedule(Box::new(move || order_clone.borrow_mut().push(2)), 2.0);

        event_loop.advance();
        event_loop.advance();
        event_loop.advance();

        assert_eq!(*order.borrow(), vec![1, 2, 3]);
    }

    #[test_log::test]
    fn test_event_cancellation() {
        let mut event_loop = EventLoop::default();
        let executed = Rc::new(RefCell::new(Vec::new()));

        let executed_clone = executed.clone();
        let id1 = event_loop.schedule(Box::new(move || executed_clone.borrow_mut().push(1)), 1.0);

        let executed_clone = executed.clone();
        event_loop.schedule(Box::new(move || executed_clone.borrow_mut().push(2)), 2.0);

        event_loop.cancel(id1);

        event_loop.advance();
        event_loop.advance();

        assert_eq!(*executed.borrow(), vec![2]); // Only second event executed
    }

    #[test_log::test]
    fn test_multiple_events_same_time() {
        let mut event_loop = EventLoop::default();
        let executed = Rc::new(RefCell::new(Vec::new()));

        for i in 0..3 {
            let executed_clone = executed.clone();
            event_loop.schedule(Box::new(move || executed_clone.borrow_mut().push(i)), 1.0);
        }

        event_loop.advance();
        event_loop.advance();
        event_loop.advance();

        assert_eq!(executed.borrow().len(), 3);
    }

    #[test_log::test]
    fn test_pending_count() {
        let mut event_loop = EventLoop::default();

        assert_eq!(event_loop.pending_count(), 0);

        event_loop.schedule(Box::new(|| {}), 1.0);
        event_loop.schedule(Box::new(|| {}), 2.0);

        assert_eq!(event_loop.pending_count(), 2);

        event_loop.advance();

        assert_eq!(event_loop.pending_count(), 1);

        event_loop.advance();

        assert_eq!(event_loop.pending_count(), 0);
    }

    #[test_log::test]
    fn test_empty_advance() {
        let mut event_loop = EventLoop::default();

        // Should not panic on empty queue
        event_loop.advance();

        assert_eq!(event_loop.pending_count(), 0);
    }
}
