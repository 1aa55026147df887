//! Bounded event log backing `gab://<gameId>/events/logs` (§4.5, §9 "no
//! defined retention policy... bound left to the implementer").

use std::collections::VecDeque;

use gabs_protocol::GpEvent;
use parking_lot::Mutex;

/// Oldest events are dropped once the bound is reached.
pub const DEFAULT_CAPACITY: usize = 256;

pub struct EventLog {
    capacity: usize,
    events: Mutex<VecDeque<GpEvent>>,
}

impl EventLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            events: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn push(&self, event: GpEvent) {
        let mut events = self.events.lock();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event);
    }

    pub fn snapshot(&self) -> Vec<GpEvent> {
        self.events.lock().iter().cloned().collect()
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
