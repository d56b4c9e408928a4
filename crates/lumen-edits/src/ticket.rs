//! Monotonic request tickets for discarding stale responses.
//!
//! Every outgoing request carries a [`Ticket`]. When its response comes
//! back, it is applied only if that ticket is still the tracker's
//! current one; anything older lost the race and is dropped.

use std::fmt;

/// Identifier of one issued request. Later tickets compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// The raw sequence number.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues tickets and remembers which one is current.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTracker {
    issued: u64,
    current: Option<Ticket>,
}

impl RequestTracker {
    /// A tracker that has issued nothing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            issued: 0,
            current: None,
        }
    }

    /// Issue a new ticket, superseding every earlier one.
    pub const fn issue(&mut self) -> Ticket {
        self.issued += 1;
        let ticket = Ticket(self.issued);
        self.current = Some(ticket);
        ticket
    }

    /// Supersede all outstanding tickets without issuing a new one.
    pub const fn invalidate(&mut self) {
        self.current = None;
    }

    /// The most recently issued ticket, unless invalidated since.
    #[must_use]
    pub const fn current(&self) -> Option<Ticket> {
        self.current
    }

    /// Whether a response for `ticket` may still be applied.
    #[must_use]
    pub fn is_current(&self, ticket: Ticket) -> bool {
        is_current_response(self.current, ticket)
    }
}

/// Decide whether a response for `response` is still wanted, given the
/// most recently issued ticket.
#[must_use]
pub fn is_current_response(latest: Option<Ticket>, response: Ticket) -> bool {
    latest == Some(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tickets_increase_monotonically() {
        let mut tracker = RequestTracker::new();
        let a = tracker.issue();
        let b = tracker.issue();
        assert!(b > a);
        assert_eq!(tracker.current(), Some(b));
    }

    #[test]
    fn only_latest_ticket_is_current() {
        let mut tracker = RequestTracker::new();
        let first = tracker.issue();
        assert!(tracker.is_current(first));
        let second = tracker.issue();
        assert!(!tracker.is_current(first));
        assert!(tracker.is_current(second));
    }

    #[test]
    fn invalidate_supersedes_without_issuing() {
        let mut tracker = RequestTracker::new();
        let ticket = tracker.issue();
        tracker.invalidate();
        assert!(!tracker.is_current(ticket));
        assert_eq!(tracker.current(), None);
        // Numbering continues past invalidated tickets.
        assert!(tracker.issue() > ticket);
    }

    #[test]
    fn nothing_is_current_before_first_issue() {
        assert!(!is_current_response(None, Ticket(1)));
    }
}
