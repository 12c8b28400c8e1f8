//! Per-amplifier configuration store
//!
//! Holds the logical activate/deactivate bindings and gain for the PA and
//! the LNA independently. Configuration is additive: every call merges a
//! partial update, and bindings not mentioned persist. Clearing removes
//! bindings only; the enable flag and gain survive until changed
//! explicitly.

use crate::types::{Amplifier, Error, FemEvent};

/// Logical configuration of one amplifier
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionalityConfig {
    /// Whether this amplifier is permitted to operate
    enabled: bool,
    /// Activation binding, if any
    activate: Option<FemEvent>,
    /// Deactivation binding, if any
    deactivate: Option<FemEvent>,
    /// Amplifier gain contribution in dB
    gain_db: i8,
}

impl FunctionalityConfig {
    /// Create a configuration with no bindings and 0 dB gain
    #[must_use]
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            activate: None,
            deactivate: None,
            gain_db: 0,
        }
    }

    /// Check whether the amplifier is permitted to operate
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Get the activation binding
    #[must_use]
    pub const fn activate(&self) -> Option<FemEvent> {
        self.activate
    }

    /// Get the deactivation binding
    #[must_use]
    pub const fn deactivate(&self) -> Option<FemEvent> {
        self.deactivate
    }

    /// Check whether any binding is currently set
    #[must_use]
    pub const fn has_bindings(&self) -> bool {
        self.activate.is_some() || self.deactivate.is_some()
    }

    /// Merge a partial update into the configuration
    ///
    /// Last write wins per field; a `None` leaves the existing binding
    /// untouched. Fails with [`Error::PermissionDenied`] while the
    /// amplifier is disabled.
    pub fn merge(
        &mut self,
        activate: Option<FemEvent>,
        deactivate: Option<FemEvent>,
    ) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::PermissionDenied);
        }
        if let Some(event) = activate {
            self.activate = Some(event);
        }
        if let Some(event) = deactivate {
            self.deactivate = Some(event);
        }
        Ok(())
    }

    /// Remove all bindings; enable flag and gain persist
    ///
    /// Fails with [`Error::PermissionDenied`] while the amplifier is
    /// disabled.
    pub fn clear(&mut self) -> Result<(), Error> {
        if !self.enabled {
            return Err(Error::PermissionDenied);
        }
        self.activate = None;
        self.deactivate = None;
        Ok(())
    }

    /// Set the gain contribution in dB
    pub fn set_gain(&mut self, gain_db: i8) {
        self.gain_db = gain_db;
    }

    /// Get the gain in dB if the amplifier is enabled, otherwise 0
    ///
    /// Never fails; an unconfigured or disabled amplifier contributes
    /// nothing to the signal path.
    #[must_use]
    pub const fn gain_if_enabled(&self) -> i8 {
        if self.enabled {
            self.gain_db
        } else {
            0
        }
    }

    /// Drop the permission to operate; bindings must already be gone
    pub(crate) fn shut_down(&mut self) {
        self.enabled = false;
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for FunctionalityConfig {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(
            f,
            "Config(en={}, act={}, deact={}, gain={}dB)",
            self.enabled,
            self.activate.is_some(),
            self.deactivate.is_some(),
            self.gain_db
        );
    }
}

/// The two per-amplifier configurations of a front-end module
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConfigStore {
    pa: FunctionalityConfig,
    lna: FunctionalityConfig,
}

impl ConfigStore {
    /// Create a store with the given amplifier permissions
    #[must_use]
    pub const fn new(pa_enabled: bool, lna_enabled: bool) -> Self {
        Self {
            pa: FunctionalityConfig::new(pa_enabled),
            lna: FunctionalityConfig::new(lna_enabled),
        }
    }

    /// Get an amplifier's configuration
    #[must_use]
    pub const fn get(&self, amplifier: Amplifier) -> &FunctionalityConfig {
        match amplifier {
            Amplifier::Pa => &self.pa,
            Amplifier::Lna => &self.lna,
        }
    }

    /// Get an amplifier's configuration mutably
    pub fn get_mut(&mut self, amplifier: Amplifier) -> &mut FunctionalityConfig {
        match amplifier {
            Amplifier::Pa => &mut self.pa,
            Amplifier::Lna => &mut self.lna,
        }
    }
}
