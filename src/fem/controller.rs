//! Front-end module controller
//!
//! The owned context object for one physical front-end module deployment.
//! Every public operation of the engine goes through here; there is no
//! global state. Callers sharing a controller across execution contexts
//! must serialize access themselves.

use crate::config::settle_time_us;
use crate::hal::fabric::EventFabric;
use crate::hal::outputs::FemOutputs;
use crate::hal::timer::CompareTimer;
use crate::types::{
    Amplifier, ChannelId, Error, EventId, FemEvent, Functionality, GroupId, TxPower, TxPowerSplit,
};

use super::abort::AbortManager;
use super::resolver::{resolve, EventRole, Subscription};
use super::sequencer::{Phase, Sequencer};
use super::split::{self, PowerOutOfRange};
use super::store::ConfigStore;

/// Which amplifiers the board's front-end module provides
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FemCapabilities {
    /// A PA is present on the transmit path
    pub pa: bool,
    /// An LNA is present on the receive path
    pub lna: bool,
}

impl FemCapabilities {
    /// A module with both amplifiers
    pub const FULL: Self = Self { pa: true, lna: true };
}

#[cfg(feature = "embedded")]
impl defmt::Format for FemCapabilities {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "Caps(pa={}, lna={})", self.pa, self.lna);
    }
}

/// Sequencing engine for one front-end module
///
/// Generic over the board's hardware handle, which provides the routing
/// fabric, the compare timer, and the amplifier control outputs.
///
/// Configuration calls for the PA and the LNA must be issued in the same
/// order as the corresponding radio operations occur (configure the LNA
/// first when the radio will listen before it transmits). The engine has
/// no visibility into future radio operations and cannot check this.
#[derive(Debug)]
pub struct FemController<H> {
    hw: H,
    store: ConfigStore,
    sequencer: Sequencer,
    abort: AbortManager,
}

impl<H> FemController<H>
where
    H: EventFabric + CompareTimer + FemOutputs,
{
    /// Create a controller for a module with the given amplifiers
    #[must_use]
    pub fn new(hw: H, caps: FemCapabilities) -> Self {
        Self {
            hw,
            store: ConfigStore::new(caps.pa, caps.lna),
            sequencer: Sequencer::new(caps.pa, caps.lna),
            abort: AbortManager::new(),
        }
    }

    /// Set up the PA for an upcoming radio transmission
    ///
    /// Partial updates are additive across calls: a binding passed as
    /// `None` here keeps whatever an earlier call established. Supplied
    /// bindings are validated, merged, and wired in the same call, so the
    /// amplifier toggles autonomously from then on.
    pub fn pa_configuration_set(
        &mut self,
        activate: Option<FemEvent>,
        deactivate: Option<FemEvent>,
    ) -> Result<(), Error> {
        self.configuration_set(Amplifier::Pa, activate, deactivate)
    }

    /// Remove the PA's bindings and tear down its wiring
    ///
    /// Gain and the enable flag persist.
    pub fn pa_configuration_clear(&mut self) -> Result<(), Error> {
        self.configuration_clear(Amplifier::Pa)
    }

    /// Set up the LNA for an upcoming radio reception
    ///
    /// Same additive-merge contract as [`Self::pa_configuration_set`].
    pub fn lna_configuration_set(
        &mut self,
        activate: Option<FemEvent>,
        deactivate: Option<FemEvent>,
    ) -> Result<(), Error> {
        self.configuration_set(Amplifier::Lna, activate, deactivate)
    }

    /// Remove the LNA's bindings and tear down its wiring
    pub fn lna_configuration_clear(&mut self) -> Result<(), Error> {
        self.configuration_clear(Amplifier::Lna)
    }

    /// Force the addressed amplifiers inactive with immediate effect
    ///
    /// Unlike the configuration-clear operations, which only unwire the
    /// events that would deactivate the amplifier, this overrides the
    /// control lines right away. Always succeeds; safe to call from
    /// interrupt context and deterministically wins the race against a
    /// pending hardware trigger.
    pub fn deactivate_now(&mut self, functionality: Functionality) {
        self.sequencer.deactivate_now(&mut self.hw, functionality);
    }

    /// Establish the emergency abort path
    ///
    /// When `trigger` fires, every channel later added to `group` is
    /// disabled as a unit, independent of the configured deactivation
    /// bindings.
    pub fn abort_set(&mut self, trigger: EventId, group: GroupId) -> Result<(), Error> {
        self.abort.set(&mut self.hw, trigger, group)
    }

    /// Add a routing channel to the abort group
    pub fn abort_extend(&mut self, channel: ChannelId, group: GroupId) -> Result<(), Error> {
        self.abort.extend(&mut self.hw, channel, group)
    }

    /// Remove a routing channel from the abort group
    pub fn abort_reduce(&mut self, channel: ChannelId, group: GroupId) -> Result<(), Error> {
        self.abort.reduce(&mut self.hw, channel, group)
    }

    /// Tear down the abort path
    pub fn abort_clear(&mut self) -> Result<(), Error> {
        self.abort.clear(&mut self.hw)
    }

    /// Reset the transient hardware wiring of the last radio operation
    ///
    /// Releases allocated channels and programmed compares; the logical
    /// configuration survives, so the next operation can re-use or
    /// override it without re-specifying everything. Intended after the
    /// radio's terminal disabled signal.
    pub fn cleanup(&mut self) {
        self.sequencer.cleanup(&mut self.hw);
    }

    /// Turn off front-end module handling entirely
    ///
    /// Synchronous and immediate. Fails with
    /// [`Error::PermissionDenied`] while either amplifier still holds
    /// bindings; both configurations must be cleared first.
    pub fn disable(&mut self) -> Result<(), Error> {
        let pa = self.store.get(Amplifier::Pa);
        let lna = self.store.get(Amplifier::Lna);
        if pa.has_bindings() || lna.has_bindings() {
            return Err(Error::PermissionDenied);
        }

        self.sequencer.deactivate_now(&mut self.hw, Functionality::All);
        self.sequencer.cleanup(&mut self.hw);
        for amplifier in [Amplifier::Pa, Amplifier::Lna] {
            self.store.get_mut(amplifier).shut_down();
            self.sequencer.shut_down(amplifier);
        }
        Ok(())
    }

    /// Split a requested on-air power between radio and amplifier
    ///
    /// Pure computation; see [`split::split`]. The out-of-range error
    /// carries the nearest achievable split, which callers should use
    /// rather than discard.
    pub fn tx_power_split(&self, requested: TxPower) -> Result<TxPowerSplit, PowerOutOfRange> {
        split::split(requested)
    }

    /// Set the PA gain applied to subsequent transmissions
    ///
    /// Fails with [`Error::Invalid`] when the gain is not one of the
    /// module's achievable steps. Calling this during a transmission or
    /// its ramp-up leaves it unspecified whether the gain applies to that
    /// transmission.
    pub fn pa_gain_set(&mut self, gain_db: i8) -> Result<(), Error> {
        if !split::gain_is_achievable(gain_db) {
            return Err(Error::Invalid);
        }
        self.store.get_mut(Amplifier::Pa).set_gain(gain_db);
        Ok(())
    }

    /// Get the configured PA gain in dB, or 0 when the PA is disabled or
    /// contributes no gain
    ///
    /// Read-only; never fails.
    #[must_use]
    pub fn pa_is_configured(&self) -> i8 {
        self.store.get(Amplifier::Pa).gain_if_enabled()
    }

    /// Get an amplifier's lifecycle phase (diagnostic)
    #[must_use]
    pub fn phase(&self, amplifier: Amplifier) -> Phase {
        self.sequencer.phase(amplifier)
    }

    /// Get an amplifier's logical configuration (diagnostic)
    #[must_use]
    pub fn configuration(&self, amplifier: Amplifier) -> &super::store::FunctionalityConfig {
        self.store.get(amplifier)
    }

    /// Borrow the hardware handle
    #[must_use]
    pub fn hardware(&self) -> &H {
        &self.hw
    }

    fn configuration_set(
        &mut self,
        amplifier: Amplifier,
        activate: Option<FemEvent>,
        deactivate: Option<FemEvent>,
    ) -> Result<(), Error> {
        if !self.store.get(amplifier).is_enabled() {
            return Err(Error::PermissionDenied);
        }

        // Validate both bindings before mutating anything
        let caps = self.hw.capabilities();
        let settle = settle_time_us(amplifier);
        let activate_sub: Option<Subscription> = activate
            .as_ref()
            .map(|event| resolve(event, EventRole::Activate, settle, caps))
            .transpose()?;
        let deactivate_sub: Option<Subscription> = deactivate
            .as_ref()
            .map(|event| resolve(event, EventRole::Deactivate, settle, caps))
            .transpose()?;

        self.store.get_mut(amplifier).merge(activate, deactivate)?;

        if let Some(subscription) = activate_sub {
            self.sequencer
                .arm(&mut self.hw, amplifier, EventRole::Activate, &subscription)?;
        }
        if let Some(subscription) = deactivate_sub {
            self.sequencer
                .arm(&mut self.hw, amplifier, EventRole::Deactivate, &subscription)?;
        }
        Ok(())
    }

    fn configuration_clear(&mut self, amplifier: Amplifier) -> Result<(), Error> {
        self.store.get_mut(amplifier).clear()?;
        self.sequencer.disarm_amplifier(&mut self.hw, amplifier);
        Ok(())
    }
}
