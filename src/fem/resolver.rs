//! Event binding resolution
//!
//! Validates an abstract trigger description and normalizes it into a
//! concrete subscription plan the sequencer can wire: which hardware event
//! fires, and how a routing channel is obtained for it.

use crate::hal::fabric::FabricCapabilities;
use crate::types::{ChannelId, Error, EventId, FemEvent, TimerId};

/// Role a trigger plays for an amplifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventRole {
    /// Drives the amplifier control line active
    Activate,
    /// Drives the amplifier control line inactive
    Deactivate,
}

#[cfg(feature = "embedded")]
impl defmt::Format for EventRole {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Activate => defmt::write!(f, "activate"),
            Self::Deactivate => defmt::write!(f, "deactivate"),
        }
    }
}

/// The hardware event a subscription is driven by
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventSource {
    /// A timer compare channel the sequencer must program
    TimerCompare {
        /// Caller-owned timer instance
        timer: TimerId,
        /// Compare channel to program
        channel: u8,
        /// Instant the compare fires, in microseconds
        at_us: u32,
    },
    /// An already-existing hardware event
    Hardware(EventId),
}

/// How the subscription obtains its routing channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelPlan {
    /// Allocate a dedicated channel from the fabric
    Allocate,
    /// Reuse a caller-provided channel
    UseExisting(ChannelId),
    /// Attach directly to the fan-out capable event source
    Fanout,
}

/// A validated, concrete subscription ready for wiring
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Subscription {
    /// The event that fires the transition
    pub source: EventSource,
    /// How the event reaches the amplifier task
    pub plan: ChannelPlan,
}

/// Resolve an abstract trigger into a subscription plan
///
/// `settle_us` is the amplifier's preparation time: activation compares
/// are scheduled at `end - settle_us` so the amplifier is ready no later
/// than `end`; deactivation compares fire at `end` itself.
///
/// Returns [`Error::Invalid`] for a generic trigger in the activate role,
/// an empty compare mask, an inverted window, or a window too short for
/// the settle time.
pub fn resolve(
    event: &FemEvent,
    role: EventRole,
    settle_us: u32,
    caps: FabricCapabilities,
) -> Result<Subscription, Error> {
    match *event {
        FemEvent::Timer {
            timer,
            window,
            compare_mask,
            channel_override,
        } => {
            if !window.is_valid() {
                return Err(Error::Invalid);
            }
            let channel = compare_mask.lowest().ok_or(Error::Invalid)?;
            if channel >= crate::config::COMPARE_CHANNEL_COUNT {
                return Err(Error::Invalid);
            }

            let at_us = match role {
                EventRole::Activate => {
                    let at = window.end_us.saturating_sub(settle_us);
                    if at < window.start_us {
                        // Settle time does not fit inside the window
                        return Err(Error::Invalid);
                    }
                    at
                }
                EventRole::Deactivate => window.end_us,
            };

            // Compare events are not pre-published, so even fan-out fabrics
            // need a channel of their own here
            let plan = match channel_override {
                Some(ch) => ChannelPlan::UseExisting(ch),
                None => ChannelPlan::Allocate,
            };

            Ok(Subscription {
                source: EventSource::TimerCompare {
                    timer,
                    channel,
                    at_us,
                },
                plan,
            })
        }
        FemEvent::Generic {
            event,
            channel_override,
        } => {
            if matches!(role, EventRole::Activate) {
                // Activation must be timer-relative
                return Err(Error::Invalid);
            }

            let plan = match channel_override {
                Some(ch) => ChannelPlan::UseExisting(ch),
                None if caps.supports_fanout => ChannelPlan::Fanout,
                None => ChannelPlan::Allocate,
            };

            Ok(Subscription {
                source: EventSource::Hardware(event),
                plan,
            })
        }
    }
}
