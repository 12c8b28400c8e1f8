//! Compare-timer abstraction
//!
//! The timer instance named by a timer-relative trigger is owned by the
//! caller, who starts and stops it. The engine only programs compare
//! channels it has been granted, turning an instant into a hardware event
//! the fabric can route.

use crate::types::{EventId, TimerId};

/// Compare-channel programming on a caller-owned 1 us timer
pub trait CompareTimer {
    /// Program a compare channel to fire at `at_us` and get its event
    ///
    /// The caller must have started the timer and must not stop it before
    /// the programmed compare expires.
    fn program_compare(&mut self, timer: TimerId, channel: u8, at_us: u32) -> EventId;

    /// Clear a previously programmed compare channel
    fn clear_compare(&mut self, timer: TimerId, channel: u8);
}
