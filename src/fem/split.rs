//! TX power split calculation
//!
//! Divides a requested on-air power between the radio output stage and
//! the front-end module gain. Both sides only offer discrete steps, so
//! the result is the combination whose sum comes closest to the request
//! without exceeding it.

use crate::config::{
    max_achievable_dbm, min_achievable_dbm, FEM_GAINS_DB, RADIO_TX_POWERS_DBM,
};
use crate::types::{TxPower, TxPowerSplit};

/// Requested power lies outside the achievable range
///
/// The nearest achievable split is carried along so callers can proceed
/// degraded instead of failing closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerOutOfRange {
    /// Closest achievable split (minimum or maximum of the range)
    pub nearest: TxPowerSplit,
}

#[cfg(feature = "embedded")]
impl defmt::Format for PowerOutOfRange {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "OutOfRange(nearest={})", self.nearest);
    }
}

/// Split a requested on-air power into radio and amplifier components
///
/// Picks the discrete `(radio_power, fem_gain)` pair with the greatest sum
/// not exceeding `requested`. Requests above the maximum achievable sum
/// yield the maximum split inside [`PowerOutOfRange`]; requests below the
/// minimum yield the minimum split. Pure computation, no side effects.
pub fn split(requested: TxPower) -> Result<TxPowerSplit, PowerOutOfRange> {
    let requested_dbm = i16::from(requested.dbm());

    if requested_dbm > max_achievable_dbm() {
        return Err(PowerOutOfRange {
            nearest: max_split(),
        });
    }
    if requested_dbm < min_achievable_dbm() {
        return Err(PowerOutOfRange {
            nearest: min_split(),
        });
    }

    let mut best: Option<TxPowerSplit> = None;
    for &gain in &FEM_GAINS_DB {
        for &radio in &RADIO_TX_POWERS_DBM {
            let sum = i16::from(radio) + i16::from(gain);
            if sum > requested_dbm {
                // Tables are ascending, no larger radio step can fit either
                break;
            }
            let candidate = TxPowerSplit {
                radio_power: TxPower::from_dbm(radio),
                fem_gain: gain,
            };
            // On equal sums the lower FEM gain wins
            let better = match best {
                None => true,
                Some(current) => sum > current.total_dbm(),
            };
            if better {
                best = Some(candidate);
            }
        }
    }

    // requested >= min_achievable_dbm, so the minimum pair always fits
    Ok(best.unwrap_or_else(min_split))
}

/// The minimum achievable split
fn min_split() -> TxPowerSplit {
    TxPowerSplit {
        radio_power: TxPower::from_dbm(RADIO_TX_POWERS_DBM[0]),
        fem_gain: FEM_GAINS_DB[0],
    }
}

/// The maximum achievable split
fn max_split() -> TxPowerSplit {
    TxPowerSplit {
        radio_power: TxPower::from_dbm(RADIO_TX_POWERS_DBM[RADIO_TX_POWERS_DBM.len() - 1]),
        fem_gain: FEM_GAINS_DB[FEM_GAINS_DB.len() - 1],
    }
}

/// Check whether a gain value is one of the module's achievable steps
#[must_use]
pub fn gain_is_achievable(gain_db: i8) -> bool {
    FEM_GAINS_DB.contains(&gain_db)
}
