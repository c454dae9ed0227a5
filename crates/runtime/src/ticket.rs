/// Identifies one outstanding host operation: a network request or a timer.
///
/// Tickets are small copyable handles, allocated monotonically so a later
/// ticket always compares greater than an earlier one.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// Monotonic ticket allocator. Hosts own one and hand out tickets for every
/// request and timer they start.
#[derive(Debug)]
pub struct TicketSource {
    next: u64,
}

impl Default for TicketSource {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl TicketSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_ticket(&mut self) -> Ticket {
        let t = Ticket(self.next);
        self.next = self.next.wrapping_add(1);
        t
    }
}
