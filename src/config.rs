//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the front-end module
//! deployment. Power tables, amplifier settle times, and routing fabric
//! sizing are centralized here.

/// Achievable radio TX power steps in dBm, ascending
///
/// Matches the discrete TXPOWER steps of the nRF52840 RADIO peripheral.
pub const RADIO_TX_POWERS_DBM: [i8; 14] = [-40, -20, -16, -12, -8, -4, 0, 2, 3, 4, 5, 6, 7, 8];

/// Achievable front-end module gain steps in dB, ascending
///
/// 0 dB is the bypass path; the remaining steps are the selectable PA
/// gain modes of the nRF21540-class module.
pub const FEM_GAINS_DB: [i8; 3] = [0, 10, 20];

/// Time the PA needs from its activation edge to full output, in microseconds
pub const PA_SETTLE_TIME_US: u32 = 13;

/// Time the LNA needs from its activation edge to stable gain, in microseconds
pub const LNA_SETTLE_TIME_US: u32 = 13;

/// Number of routing channels provided by the fabric
pub const ROUTING_CHANNEL_COUNT: usize = 20;

/// Number of compare channels a timer instance exposes
pub const COMPARE_CHANNEL_COUNT: u8 = 6;

/// Maximum number of routing channels an abort group can hold
pub const ABORT_GROUP_CAPACITY: usize = 16;

/// Maximum number of live event-to-task paths the sequencer tracks
///
/// One activate and one deactivate path per amplifier, with headroom for
/// a re-wire in flight.
pub const WIRING_CAPACITY: usize = 8;

/// Settle time for an amplifier in microseconds
#[must_use]
pub const fn settle_time_us(amplifier: crate::types::Amplifier) -> u32 {
    match amplifier {
        crate::types::Amplifier::Pa => PA_SETTLE_TIME_US,
        crate::types::Amplifier::Lna => LNA_SETTLE_TIME_US,
    }
}

/// Minimum achievable on-air power in dBm (lowest radio step, bypass gain)
#[must_use]
pub const fn min_achievable_dbm() -> i16 {
    RADIO_TX_POWERS_DBM[0] as i16 + FEM_GAINS_DB[0] as i16
}

/// Maximum achievable on-air power in dBm (highest radio step, highest gain)
#[must_use]
pub const fn max_achievable_dbm() -> i16 {
    RADIO_TX_POWERS_DBM[RADIO_TX_POWERS_DBM.len() - 1] as i16
        + FEM_GAINS_DB[FEM_GAINS_DB.len() - 1] as i16
}
