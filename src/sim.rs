/*!
Discrete-event scheduling

The switch never sleeps or spawns threads. Work that happens later, like
the flow lookup after a packet has been received, is handed to a
`Scheduler` and comes back through `SwitchDatapath::handle_event` once the
simulation clock has advanced far enough.
*/

use datapath::DatapathEvent;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;

/// Simulation time since the start of the run
pub type SimTime = Duration;

/// The simulator a switch runs in
pub trait Scheduler {
    fn now(&self) -> SimTime;

    fn schedule_after(&mut self, delay: Duration, event: DatapathEvent);
}

struct Scheduled<E> {
    at: SimTime,
    seq: u64,
    event: E,
}

impl<E> PartialEq for Scheduled<E> {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl<E> Eq for Scheduled<E> {}

impl<E> PartialOrd for Scheduled<E> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<E> Ord for Scheduled<E> {
    // BinaryHeap is a max heap, the earliest event has to compare greatest
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .at
            .cmp(&self.at)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A simulation clock with pending events.
/// Events scheduled for the same time are popped in the order they were scheduled.
pub struct EventQueue<E> {
    now: SimTime,
    seq: u64,
    pending: BinaryHeap<Scheduled<E>>,
}

impl<E> EventQueue<E> {
    pub fn new() -> EventQueue<E> {
        EventQueue {
            now: Duration::from_secs(0),
            seq: 0,
            pending: BinaryHeap::new(),
        }
    }

    /// Schedules `event` at `at`. Times in the past are moved to now.
    pub fn schedule_at(&mut self, at: SimTime, event: E) {
        let at = if at < self.now { self.now } else { at };
        self.seq += 1;
        self.pending.push(Scheduled {
            at: at,
            seq: self.seq,
            event: event,
        });
    }

    /// Takes the earliest event and advances the clock to its time
    pub fn pop(&mut self) -> Option<(SimTime, E)> {
        let scheduled = self.pending.pop()?;
        self.now = scheduled.at;
        Some((scheduled.at, scheduled.event))
    }

    /// Time of the earliest event
    pub fn peek_time(&self) -> Option<SimTime> {
        self.pending.peek().map(|scheduled| scheduled.at)
    }

    /// Moves the clock forward without running anything. The clock never goes back.
    pub fn advance_to(&mut self, at: SimTime) {
        if at > self.now {
            self.now = at;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }
}

impl<E> Default for EventQueue<E> {
    fn default() -> Self {
        EventQueue::new()
    }
}

impl<E: From<DatapathEvent>> Scheduler for EventQueue<E> {
    fn now(&self) -> SimTime {
        self.now
    }

    fn schedule_after(&mut self, delay: Duration, event: DatapathEvent) {
        let at = self.now + delay;
        self.schedule_at(at, E::from(event));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut testee = EventQueue::new();
        testee.schedule_at(Duration::from_millis(20), "late");
        testee.schedule_at(Duration::from_millis(10), "early");
        assert_eq!(2, testee.len());
        assert_eq!(Some(Duration::from_millis(10)), testee.peek_time());

        assert_eq!(Some((Duration::from_millis(10), "early")), testee.pop());
        assert_eq!(Duration::from_millis(10), testee.now);
        assert_eq!(Some((Duration::from_millis(20), "late")), testee.pop());
        assert!(testee.pop().is_none());
        assert!(testee.is_empty());
    }

    #[test]
    fn same_time_is_fifo() {
        let mut testee = EventQueue::new();
        for i in 0..10 {
            testee.schedule_at(Duration::from_millis(5), i);
        }
        let order: Vec<i32> = (0..10).filter_map(|_| testee.pop()).map(|(_, e)| e).collect();
        assert_eq!((0..10).collect::<Vec<_>>(), order);
    }

    #[test]
    fn clock_never_goes_back() {
        let mut testee = EventQueue::new();
        testee.advance_to(Duration::from_secs(2));
        testee.advance_to(Duration::from_secs(1));
        assert_eq!(Duration::from_secs(2), testee.now);
        testee.schedule_at(Duration::from_secs(1), ());
        assert_eq!(Some(Duration::from_secs(2)), testee.peek_time());
    }
}
