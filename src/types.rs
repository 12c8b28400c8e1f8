//! Shared types used across the front-end module engine
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

/// A single amplifier stage of the front-end module
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Amplifier {
    /// Power Amplifier (transmit path)
    Pa,
    /// Low-Noise Amplifier (receive path)
    Lna,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Amplifier {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Pa => defmt::write!(f, "PA"),
            Self::Lna => defmt::write!(f, "LNA"),
        }
    }
}

/// Functionality selector for operations that may address one or both amplifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Functionality {
    /// PA only
    Pa,
    /// LNA only
    Lna,
    /// Both PA and LNA
    All,
}

impl Functionality {
    /// Check whether this selector addresses the given amplifier
    #[must_use]
    pub const fn covers(self, amplifier: Amplifier) -> bool {
        match self {
            Self::Pa => matches!(amplifier, Amplifier::Pa),
            Self::Lna => matches!(amplifier, Amplifier::Lna),
            Self::All => true,
        }
    }

    /// Get the amplifiers addressed by this selector
    #[must_use]
    pub const fn amplifiers(self) -> &'static [Amplifier] {
        match self {
            Self::Pa => &[Amplifier::Pa],
            Self::Lna => &[Amplifier::Lna],
            Self::All => &[Amplifier::Pa, Amplifier::Lna],
        }
    }
}

impl From<Amplifier> for Functionality {
    fn from(amplifier: Amplifier) -> Self {
        match amplifier {
            Amplifier::Pa => Self::Pa,
            Amplifier::Lna => Self::Lna,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for Functionality {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Pa => defmt::write!(f, "PA"),
            Self::Lna => defmt::write!(f, "LNA"),
            Self::All => defmt::write!(f, "PA+LNA"),
        }
    }
}

/// TX power in dBm
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TxPower(i8);

impl TxPower {
    /// Create from a dBm value
    #[must_use]
    pub const fn from_dbm(dbm: i8) -> Self {
        Self(dbm)
    }

    /// Get the power in dBm
    #[must_use]
    pub const fn dbm(self) -> i8 {
        self.0
    }
}

impl fmt::Debug for TxPower {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TxPower({} dBm)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxPower {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{} dBm", self.0);
    }
}

/// Components of a requested on-air power, divided between the radio
/// output stage and the front-end module gain
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TxPowerSplit {
    /// TX power to be applied to the radio peripheral
    pub radio_power: TxPower,
    /// Gain contribution of the front-end module in dB
    pub fem_gain: i8,
}

impl TxPowerSplit {
    /// Total on-air power of this split in dBm
    #[must_use]
    pub const fn total_dbm(self) -> i16 {
        self.radio_power.dbm() as i16 + self.fem_gain as i16
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TxPowerSplit {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}+{}dB", self.radio_power, self.fem_gain);
    }
}

/// Identifier of a hardware timer instance
///
/// The timer itself is owned by the caller; the engine only programs the
/// compare channels it has been handed via [`CompareMask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerId(u8);

impl TimerId {
    /// Create from a raw instance number
    #[must_use]
    pub const fn new(instance: u8) -> Self {
        Self(instance)
    }

    /// Get the raw instance number
    #[must_use]
    pub const fn instance(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "TIMER{}", self.0);
    }
}

/// Identifier of a subscribable hardware event
///
/// On PPI-style fabrics this is an event address that may fan out to
/// multiple channels; on DPPI-style fabrics it is the number of a channel
/// the event publishes to. Either way, other consumers may already be
/// subscribed to the same source.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventId(u32);

impl EventId {
    /// Create from a raw event identifier
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw event identifier
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for EventId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Event(0x{:08X})", self.0);
    }
}

/// Identifier of a task endpoint on the routing fabric
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TaskId(u32);

impl TaskId {
    /// Create from a raw task identifier
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Get the raw task identifier
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TaskId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Task(0x{:08X})", self.0);
    }
}

/// Identifier of a routing channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelId(u8);

impl ChannelId {
    /// Create from a raw channel number
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Get the raw channel number
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for ChannelId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CH{}", self.0);
    }
}

/// Identifier of a routing channel group
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupId(u8);

impl GroupId {
    /// Create from a raw group number
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Get the raw group number
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for GroupId {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "GRP{}", self.0);
    }
}

/// Mask of timer compare channels the engine may use for its own scheduling
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompareMask(u8);

impl CompareMask {
    /// Create from a raw bitmask (bit N = compare channel N)
    #[must_use]
    pub const fn new(mask: u8) -> Self {
        Self(mask)
    }

    /// Get the raw bitmask
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Check whether the mask grants no channels at all
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Check whether a compare channel is granted by the mask
    #[must_use]
    pub const fn contains(self, channel: u8) -> bool {
        channel < 8 && (self.0 >> channel) & 1 != 0
    }

    /// Get the lowest-numbered granted compare channel
    #[must_use]
    pub const fn lowest(self) -> Option<u8> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros() as u8)
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for CompareMask {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "CC[0b{:08b}]", self.0);
    }
}

/// Counter window of a timer-relative trigger, in microseconds
///
/// `end` is the instant the controlled amplifier must be ready; the radio
/// operation is expected to begin at or after `end`. The engine schedules
/// inside `[start, end)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerWindow {
    /// Earliest instant at which amplifier preparation may start
    pub start_us: u32,
    /// Instant by which the amplifier must be ready
    pub end_us: u32,
}

impl TimerWindow {
    /// Create a new window
    #[must_use]
    pub const fn new(start_us: u32, end_us: u32) -> Self {
        Self { start_us, end_us }
    }

    /// Check that the window is non-empty
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.start_us < self.end_us
    }

    /// Get the window length in microseconds (zero for an inverted window)
    #[must_use]
    pub const fn duration_us(self) -> u32 {
        self.end_us.saturating_sub(self.start_us)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for TimerWindow {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "[{}us,{}us)", self.start_us, self.end_us);
    }
}

/// An abstract activation or deactivation trigger
///
/// Timer-relative triggers fire at an instant within a caller-owned timer's
/// counting window; generic triggers fire on an arbitrary hardware event.
/// Activation triggers must be timer-relative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FemEvent {
    /// Trigger at an instant inside a hardware timer's counter window
    Timer {
        /// The caller-owned 1 us resolution timer instance
        timer: TimerId,
        /// Window within which the amplifier transition must complete
        window: TimerWindow,
        /// Compare channels the engine may program for its own scheduling
        compare_mask: CompareMask,
        /// Routing channel to reuse instead of allocating one
        channel_override: Option<ChannelId>,
    },
    /// Trigger on an arbitrary subscribable hardware event
    Generic {
        /// The event source; other consumers may share it
        event: EventId,
        /// Routing channel to reuse instead of allocating one
        channel_override: Option<ChannelId>,
    },
}

impl FemEvent {
    /// Shorthand for a timer-relative trigger without a channel override
    #[must_use]
    pub const fn timer(timer: TimerId, window: TimerWindow, compare_mask: CompareMask) -> Self {
        Self::Timer {
            timer,
            window,
            compare_mask,
            channel_override: None,
        }
    }

    /// Shorthand for a generic trigger without a channel override
    #[must_use]
    pub const fn generic(event: EventId) -> Self {
        Self::Generic {
            event,
            channel_override: None,
        }
    }

    /// Check whether this is a timer-relative trigger
    #[must_use]
    pub const fn is_timer(self) -> bool {
        matches!(self, Self::Timer { .. })
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FemEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Timer { timer, window, .. } => defmt::write!(f, "Timer({}, {})", timer, window),
            Self::Generic { event, .. } => defmt::write!(f, "Generic({})", event),
        }
    }
}

/// Errors reported by the engine's fallible operations
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Error {
    /// The targeted functionality is in an incompatible enable or
    /// configuration state for the requested operation
    PermissionDenied,
    /// Structurally malformed or out-of-range input
    Invalid,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::PermissionDenied => defmt::write!(f, "EPERM"),
            Self::Invalid => defmt::write!(f, "EINVAL"),
        }
    }
}
