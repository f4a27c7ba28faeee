//! Call Context
//!
//! Who is calling, at what time, and where events go. The caller-observed
//! timestamp is the only clock the protocol reads.

use crate::events::EventLog;
use crate::types::Address;

/// Context for a single protocol call
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Account invoking the operation
    pub caller: Address,
    /// Current time in seconds
    pub timestamp: u64,
    /// Event log for emitting events
    pub events: EventLog,
}

impl CallContext {
    pub fn new(caller: Address, timestamp: u64) -> Self {
        Self {
            caller,
            timestamp,
            events: EventLog::new(),
        }
    }

    /// Switch the caller, keeping time and the event log
    pub fn as_caller(&mut self, caller: Address) -> &mut Self {
        self.caller = caller;
        self
    }

    /// Move the clock forward by `seconds`
    pub fn advance(&mut self, seconds: u64) -> &mut Self {
        self.timestamp = self.timestamp.saturating_add(seconds);
        self
    }
}
