use crate::ticket::Ticket;

/// Holds at most one live ticket.
///
/// Starting a new operation replaces the live ticket and hands back the one it
/// superseded so the caller can abort or clear it. A completion is applied only
/// if [`Slot::settle`] accepts its ticket; superseded completions are stale.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Slot {
    live: Option<Ticket>,
}

impl Slot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `ticket` the live one. Returns the superseded ticket, if any.
    pub fn replace(&mut self, ticket: Ticket) -> Option<Ticket> {
        self.live.replace(ticket)
    }

    /// Drops the live ticket without settling it.
    pub fn take(&mut self) -> Option<Ticket> {
        self.live.take()
    }

    /// Returns `true` and empties the slot if `ticket` is the live one.
    pub fn settle(&mut self, ticket: Ticket) -> bool {
        if self.live == Some(ticket) {
            self.live = None;
            true
        } else {
            false
        }
    }

    pub fn is_live(&self, ticket: Ticket) -> bool {
        self.live == Some(ticket)
    }

    pub fn live(&self) -> Option<Ticket> {
        self.live
    }

    pub fn is_pending(&self) -> bool {
        self.live.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::Slot;
    use crate::ticket::Ticket;

    #[test]
    fn replace_returns_superseded_ticket() {
        let mut slot = Slot::new();
        assert_eq!(slot.replace(Ticket(1)), None);
        assert_eq!(slot.replace(Ticket(2)), Some(Ticket(1)));
        assert_eq!(slot.live(), Some(Ticket(2)));
    }

    #[test]
    fn stale_ticket_does_not_settle() {
        let mut slot = Slot::new();
        slot.replace(Ticket(1));
        slot.replace(Ticket(2));
        assert!(!slot.settle(Ticket(1)));
        assert!(slot.is_pending());
        assert!(slot.settle(Ticket(2)));
        assert!(!slot.is_pending());
    }

    #[test]
    fn settle_is_single_shot() {
        let mut slot = Slot::new();
        slot.replace(Ticket(7));
        assert!(slot.settle(Ticket(7)));
        assert!(!slot.settle(Ticket(7)));
    }

    #[test]
    fn take_discards_live_ticket() {
        let mut slot = Slot::new();
        slot.replace(Ticket(3));
        assert_eq!(slot.take(), Some(Ticket(3)));
        assert!(!slot.settle(Ticket(3)));
    }
}
