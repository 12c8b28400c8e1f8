//! Activation sequencing and transient wiring
//!
//! Wires resolved subscriptions through the routing fabric so amplifier
//! transitions happen autonomously, with no CPU involvement at trigger
//! time. Every allocated channel and programmed compare is recorded in a
//! wiring ledger so the whole arrangement can be torn back down without
//! touching the logical configuration.

use heapless::Vec;

use crate::config::WIRING_CAPACITY;
use crate::hal::fabric::EventFabric;
use crate::hal::outputs::FemOutputs;
use crate::hal::timer::CompareTimer;
use crate::types::{Amplifier, ChannelId, Error, Functionality, TaskId, TimerId};

use super::resolver::{ChannelPlan, EventRole, EventSource, Subscription};

/// Software-visible lifecycle phase of one amplifier
///
/// The active state itself is hardware-driven and deliberately not
/// modeled: once armed, the amplifier toggles without notifying software.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Not permitted to operate
    Disabled,
    /// Permitted; logical bindings may exist but no wiring is live
    Configured,
    /// Hardware wiring is live; transitions fire autonomously
    Armed,
}

#[cfg(feature = "embedded")]
impl defmt::Format for Phase {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Disabled => defmt::write!(f, "DISABLED"),
            Self::Configured => defmt::write!(f, "CONFIGURED"),
            Self::Armed => defmt::write!(f, "ARMED"),
        }
    }
}

/// How a wired path reaches its amplifier task
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PathRoute {
    /// Dedicated routing channel; `owned` channels go back to the pool
    Channel { id: ChannelId, owned: bool },
    /// Direct fan-out subscription of the task
    Subscribed { task: TaskId },
}

/// One live event-to-task path
#[derive(Clone, Copy, Debug)]
struct WiredPath {
    amplifier: Amplifier,
    role: EventRole,
    route: PathRoute,
    /// Compare channel programmed for this path, if timer-driven
    compare: Option<(TimerId, u8)>,
}

/// The activation sequencer: wiring ledger plus per-amplifier phases
#[derive(Debug)]
pub struct Sequencer {
    paths: Vec<WiredPath, WIRING_CAPACITY>,
    pa_phase: Phase,
    lna_phase: Phase,
}

impl Sequencer {
    /// Create a sequencer with nothing wired
    #[must_use]
    pub fn new(pa_enabled: bool, lna_enabled: bool) -> Self {
        let phase_for = |enabled| {
            if enabled {
                Phase::Configured
            } else {
                Phase::Disabled
            }
        };
        Self {
            paths: Vec::new(),
            pa_phase: phase_for(pa_enabled),
            lna_phase: phase_for(lna_enabled),
        }
    }

    /// Get an amplifier's lifecycle phase
    #[must_use]
    pub fn phase(&self, amplifier: Amplifier) -> Phase {
        match amplifier {
            Amplifier::Pa => self.pa_phase,
            Amplifier::Lna => self.lna_phase,
        }
    }

    fn set_phase(&mut self, amplifier: Amplifier, phase: Phase) {
        match amplifier {
            Amplifier::Pa => self.pa_phase = phase,
            Amplifier::Lna => self.lna_phase = phase,
        }
    }

    /// Wire a resolved subscription so the transition fires autonomously
    ///
    /// An existing path for the same amplifier and role is torn down
    /// first, so re-configuration replaces rather than accumulates.
    /// Fails with [`Error::PermissionDenied`] while the amplifier is
    /// disabled and [`Error::Invalid`] when the fabric has no free
    /// channel left for the plan.
    pub fn arm<H>(
        &mut self,
        hw: &mut H,
        amplifier: Amplifier,
        role: EventRole,
        subscription: &Subscription,
    ) -> Result<(), Error>
    where
        H: EventFabric + CompareTimer + FemOutputs,
    {
        if matches!(self.phase(amplifier), Phase::Disabled) {
            return Err(Error::PermissionDenied);
        }

        self.remove_path(hw, amplifier, role);

        let task = match role {
            EventRole::Activate => hw.activate_task(amplifier),
            EventRole::Deactivate => hw.deactivate_task(amplifier),
        };

        // Obtain the channel before touching the timer so a failed
        // allocation leaves no stray compare behind
        let route = match subscription.plan {
            ChannelPlan::Allocate => {
                let id = hw.allocate_channel().ok_or(Error::Invalid)?;
                PathRoute::Channel { id, owned: true }
            }
            ChannelPlan::UseExisting(id) => PathRoute::Channel { id, owned: false },
            ChannelPlan::Fanout => PathRoute::Subscribed { task },
        };

        let (event, compare) = match subscription.source {
            EventSource::TimerCompare {
                timer,
                channel,
                at_us,
            } => {
                let event = hw.program_compare(timer, channel, at_us);
                (event, Some((timer, channel)))
            }
            EventSource::Hardware(event) => (event, None),
        };

        match route {
            PathRoute::Channel { id, .. } => {
                hw.connect(id, event, task);
                hw.enable_channel(id);
            }
            PathRoute::Subscribed { task } => hw.subscribe(event, task),
        }

        let path = WiredPath {
            amplifier,
            role,
            route,
            compare,
        };
        self.paths.push(path).map_err(|_| Error::Invalid)?;
        self.set_phase(amplifier, Phase::Armed);
        Ok(())
    }

    /// Force the addressed amplifiers inactive right away
    ///
    /// Disables the live wiring first so a pending hardware trigger
    /// cannot re-activate behind the override, then forces the control
    /// lines down. Never fails; safe from interrupt context.
    pub fn deactivate_now<H>(&mut self, hw: &mut H, functionality: Functionality)
    where
        H: EventFabric + FemOutputs,
    {
        for path in &self.paths {
            if !functionality.covers(path.amplifier) {
                continue;
            }
            match path.route {
                PathRoute::Channel { id, .. } => hw.disable_channel(id),
                PathRoute::Subscribed { task } => hw.unsubscribe(task),
            }
        }

        hw.force_inactive(functionality);

        for &amplifier in functionality.amplifiers() {
            if matches!(self.phase(amplifier), Phase::Armed) {
                self.set_phase(amplifier, Phase::Configured);
            }
        }
    }

    /// Tear down one amplifier's wiring; its logical phase drops to
    /// [`Phase::Configured`]
    pub fn disarm_amplifier<H>(&mut self, hw: &mut H, amplifier: Amplifier)
    where
        H: EventFabric + CompareTimer,
    {
        self.remove_path(hw, amplifier, EventRole::Activate);
        self.remove_path(hw, amplifier, EventRole::Deactivate);
        if matches!(self.phase(amplifier), Phase::Armed) {
            self.set_phase(amplifier, Phase::Configured);
        }
    }

    /// Tear down every wired path, back to the unwired state
    ///
    /// Intended after the radio's terminal disabled signal; logical
    /// configuration is untouched and can be re-armed without being
    /// re-specified.
    pub fn cleanup<H>(&mut self, hw: &mut H)
    where
        H: EventFabric + CompareTimer,
    {
        while let Some(path) = self.paths.pop() {
            Self::unwire(hw, &path);
        }
        for amplifier in [Amplifier::Pa, Amplifier::Lna] {
            if matches!(self.phase(amplifier), Phase::Armed) {
                self.set_phase(amplifier, Phase::Configured);
            }
        }
    }

    /// Drop an amplifier's permission to operate
    pub fn shut_down(&mut self, amplifier: Amplifier) {
        self.set_phase(amplifier, Phase::Disabled);
    }

    /// Number of live wired paths (diagnostic)
    #[must_use]
    pub fn wired_paths(&self) -> usize {
        self.paths.len()
    }

    fn remove_path<H>(&mut self, hw: &mut H, amplifier: Amplifier, role: EventRole)
    where
        H: EventFabric + CompareTimer,
    {
        if let Some(index) = self
            .paths
            .iter()
            .position(|p| p.amplifier == amplifier && p.role == role)
        {
            let path = self.paths.swap_remove(index);
            Self::unwire(hw, &path);
        }
    }

    fn unwire<H>(hw: &mut H, path: &WiredPath)
    where
        H: EventFabric + CompareTimer,
    {
        match path.route {
            PathRoute::Channel { id, owned } => {
                hw.disable_channel(id);
                hw.disconnect(id);
                if owned {
                    hw.release_channel(id);
                }
            }
            PathRoute::Subscribed { task } => hw.unsubscribe(task),
        }
        if let Some((timer, channel)) = path.compare {
            hw.clear_compare(timer, channel);
        }
    }
}
