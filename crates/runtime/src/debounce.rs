use crate::slot::Slot;
use crate::ticket::Ticket;

/// Delays an action until `delay_ms` have passed since the last trigger.
///
/// The debouncer does not own a clock. The caller starts a host timer for
/// [`Debouncer::delay_ms`], registers its ticket with [`Debouncer::arm`], and
/// clears whatever ticket `arm` or [`Debouncer::cancel`] hand back. When a timer
/// expires, [`Debouncer::fire`] says whether it is still the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer {
    delay_ms: u32,
    slot: Slot,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms,
            slot: Slot::new(),
        }
    }

    pub fn delay_ms(&self) -> u32 {
        self.delay_ms
    }

    /// Registers a freshly started timer. Returns the timer it replaces.
    pub fn arm(&mut self, timer: Ticket) -> Option<Ticket> {
        self.slot.replace(timer)
    }

    /// Cancels the pending timer, returning it so the host can clear it.
    pub fn cancel(&mut self) -> Option<Ticket> {
        self.slot.take()
    }

    /// `true` if `timer` is the armed one; disarms it.
    pub fn fire(&mut self, timer: Ticket) -> bool {
        self.slot.settle(timer)
    }

    pub fn is_armed(&self) -> bool {
        self.slot.is_pending()
    }

    pub fn owns(&self, timer: Ticket) -> bool {
        self.slot.is_live(timer)
    }
}
