//! Event-routing fabric abstraction
//!
//! The fabric connects hardware events to hardware tasks without CPU
//! involvement. Channel provisioning is done by a lower layer; the engine
//! only decides which channels carry which event-to-task paths, and which
//! channels form the emergency-disable group.

use crate::types::{ChannelId, EventId, GroupId, TaskId};

/// Static capabilities of a routing fabric
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FabricCapabilities {
    /// Whether an event source can drive multiple consumers at once
    ///
    /// True for DPPI-style fabrics where tasks subscribe directly to a
    /// published channel; false for PPI-style fabrics where every
    /// event-to-task path needs a dedicated channel.
    pub supports_fanout: bool,
}

#[cfg(feature = "embedded")]
impl defmt::Format for FabricCapabilities {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Fabric(fanout={})", self.supports_fanout);
    }
}

/// Routing fabric operations used by the sequencer and the abort path
///
/// All operations are synchronous register-level writes on real hardware
/// and must not block.
pub trait EventFabric {
    /// Get the fabric's static capabilities
    fn capabilities(&self) -> FabricCapabilities;

    /// Allocate a dedicated routing channel, if any is free
    fn allocate_channel(&mut self) -> Option<ChannelId>;

    /// Return a previously allocated channel to the free pool
    fn release_channel(&mut self, channel: ChannelId);

    /// Route an event to a task over a dedicated channel
    fn connect(&mut self, channel: ChannelId, event: EventId, task: TaskId);

    /// Remove the event-to-task routing of a channel
    fn disconnect(&mut self, channel: ChannelId);

    /// Let a connected channel pass triggers
    fn enable_channel(&mut self, channel: ChannelId);

    /// Stop a channel from passing triggers; the routing stays in place
    fn disable_channel(&mut self, channel: ChannelId);

    /// Attach a task directly to a fan-out capable event source
    ///
    /// Only meaningful when [`FabricCapabilities::supports_fanout`] is set.
    fn subscribe(&mut self, event: EventId, task: TaskId);

    /// Detach a task from its fan-out event source
    fn unsubscribe(&mut self, task: TaskId);

    /// Wire a trigger event so that it disables every channel in a group
    fn group_bind(&mut self, group: GroupId, trigger: EventId);

    /// Add a channel to a group
    fn group_insert(&mut self, group: GroupId, channel: ChannelId);

    /// Remove a channel from a group
    fn group_remove(&mut self, group: GroupId, channel: ChannelId);

    /// Tear down a group's trigger wiring and empty its membership
    fn group_unbind(&mut self, group: GroupId);
}
