//! Emergency abort path
//!
//! Maintains a group of routing channels that a designated trigger event
//! disables as a unit, independent of the normal deactivation bindings.
//! This is the path for fault conditions where configured deactivate
//! timing cannot be trusted.

use heapless::Vec;

use crate::config::ABORT_GROUP_CAPACITY;
use crate::hal::fabric::EventFabric;
use crate::types::{ChannelId, Error, EventId, GroupId};

/// A trigger-bound group of channels disabled together
#[derive(Clone, Debug)]
pub struct AbortGroup {
    trigger: EventId,
    group: GroupId,
    members: Vec<ChannelId, ABORT_GROUP_CAPACITY>,
}

impl AbortGroup {
    /// The event that fires the group disable
    #[must_use]
    pub fn trigger(&self) -> EventId {
        self.trigger
    }

    /// The fabric group carrying the membership
    #[must_use]
    pub fn group(&self) -> GroupId {
        self.group
    }

    /// Current member channels (order is not meaningful)
    #[must_use]
    pub fn members(&self) -> &[ChannelId] {
        &self.members
    }
}

/// Manager for the single abort path of a front-end module
#[derive(Clone, Debug, Default)]
pub struct AbortManager {
    active: Option<AbortGroup>,
}

impl AbortManager {
    /// Create a manager with no abort path established
    #[must_use]
    pub const fn new() -> Self {
        Self { active: None }
    }

    /// Check whether an abort path is currently established
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.active.is_some()
    }

    /// Get the established group, if any
    #[must_use]
    pub const fn group(&self) -> Option<&AbortGroup> {
        self.active.as_ref()
    }

    /// Establish the abort path: `trigger` disables `group` when it fires
    ///
    /// Fails with [`Error::PermissionDenied`] if a path is already
    /// established; it must be cleared before a new one is set.
    pub fn set<H: EventFabric>(
        &mut self,
        hw: &mut H,
        trigger: EventId,
        group: GroupId,
    ) -> Result<(), Error> {
        if self.active.is_some() {
            return Err(Error::PermissionDenied);
        }
        hw.group_bind(group, trigger);
        self.active = Some(AbortGroup {
            trigger,
            group,
            members: Vec::new(),
        });
        Ok(())
    }

    /// Add a channel to the established group
    ///
    /// Membership is a set: adding a channel already present is a no-op
    /// success. Fails with [`Error::PermissionDenied`] when no path is
    /// established, when `group` does not match the established one, or
    /// when the member set is full.
    pub fn extend<H: EventFabric>(
        &mut self,
        hw: &mut H,
        channel: ChannelId,
        group: GroupId,
    ) -> Result<(), Error> {
        let active = self.active.as_mut().ok_or(Error::PermissionDenied)?;
        if active.group != group {
            return Err(Error::PermissionDenied);
        }
        if active.members.contains(&channel) {
            return Ok(());
        }
        active
            .members
            .push(channel)
            .map_err(|_| Error::PermissionDenied)?;
        hw.group_insert(group, channel);
        Ok(())
    }

    /// Remove a channel from the established group
    ///
    /// Removing a channel that is not a member is a no-op success.
    /// Fails with [`Error::PermissionDenied`] when no path is established
    /// or when `group` does not match the established one.
    pub fn reduce<H: EventFabric>(
        &mut self,
        hw: &mut H,
        channel: ChannelId,
        group: GroupId,
    ) -> Result<(), Error> {
        let active = self.active.as_mut().ok_or(Error::PermissionDenied)?;
        if active.group != group {
            return Err(Error::PermissionDenied);
        }
        if let Some(index) = active.members.iter().position(|&c| c == channel) {
            active.members.swap_remove(index);
            hw.group_remove(group, channel);
        }
        Ok(())
    }

    /// Tear down the trigger-to-group wiring entirely
    ///
    /// Clearing an established-but-empty group succeeds; the error is
    /// reserved for the case where no path was ever established.
    pub fn clear<H: EventFabric>(&mut self, hw: &mut H) -> Result<(), Error> {
        let active = self.active.take().ok_or(Error::PermissionDenied)?;
        hw.group_unbind(active.group);
        Ok(())
    }
}
