//! Controller tests
//!
//! Drives the full engine against a recording mock of the routing fabric,
//! compare timer, and amplifier outputs.
//! Run with: cargo test --target x86_64-unknown-linux-gnu --no-default-features --features std --test controller_tests

use fem_control::config::{LNA_SETTLE_TIME_US, PA_SETTLE_TIME_US};
use fem_control::fem::controller::{FemCapabilities, FemController};
use fem_control::fem::sequencer::Phase;
use fem_control::hal::fabric::{EventFabric, FabricCapabilities};
use fem_control::hal::outputs::FemOutputs;
use fem_control::hal::timer::CompareTimer;
use fem_control::types::{
    Amplifier, ChannelId, CompareMask, Error, EventId, FemEvent, Functionality, GroupId, TaskId,
    TimerId, TimerWindow, TxPower,
};

// =============================================================================
// Mock hardware
// =============================================================================

const PA_ACTIVATE_TASK: u32 = 0x0100;
const PA_DEACTIVATE_TASK: u32 = 0x0101;
const LNA_ACTIVATE_TASK: u32 = 0x0200;
const LNA_DEACTIVATE_TASK: u32 = 0x0201;

/// Recording fake of the fabric, timer, and amplifier outputs
#[derive(Debug, Default)]
struct MockFem {
    fanout: bool,
    next_channel: u8,
    released: Vec<u8>,
    /// (channel, event, task), live routings only
    connections: Vec<(u8, u32, u32)>,
    /// channels currently passing triggers
    enabled: Vec<u8>,
    /// (event, task), live fan-out subscriptions only
    subscriptions: Vec<(u32, u32)>,
    /// (timer, compare channel, at_us), live compares only
    compares: Vec<(u8, u8, u32)>,
    /// (group, trigger), live groups only
    groups: Vec<(u8, u32)>,
    /// (group, channel), live memberships only
    group_members: Vec<(u8, u8)>,
    forced: Vec<Functionality>,
}

impl MockFem {
    fn new() -> Self {
        Self::default()
    }

    fn with_fanout() -> Self {
        Self {
            fanout: true,
            ..Self::default()
        }
    }

    /// The compare event id reported for a timer compare channel
    fn compare_event(timer: u8, channel: u8) -> u32 {
        0x5000_0000 | u32::from(timer) << 8 | u32::from(channel)
    }

    fn connection_for_task(&self, task: u32) -> Option<(u8, u32)> {
        self.connections
            .iter()
            .find(|&&(_, _, t)| t == task)
            .map(|&(ch, ev, _)| (ch, ev))
    }

    fn channel_is_enabled(&self, channel: u8) -> bool {
        self.enabled.contains(&channel)
    }
}

impl EventFabric for MockFem {
    fn capabilities(&self) -> FabricCapabilities {
        FabricCapabilities {
            supports_fanout: self.fanout,
        }
    }

    fn allocate_channel(&mut self) -> Option<ChannelId> {
        let id = self.next_channel;
        self.next_channel += 1;
        Some(ChannelId::new(id))
    }

    fn release_channel(&mut self, channel: ChannelId) {
        self.released.push(channel.raw());
    }

    fn connect(&mut self, channel: ChannelId, event: EventId, task: TaskId) {
        self.connections
            .push((channel.raw(), event.raw(), task.raw()));
    }

    fn disconnect(&mut self, channel: ChannelId) {
        self.connections.retain(|&(ch, _, _)| ch != channel.raw());
    }

    fn enable_channel(&mut self, channel: ChannelId) {
        if !self.enabled.contains(&channel.raw()) {
            self.enabled.push(channel.raw());
        }
    }

    fn disable_channel(&mut self, channel: ChannelId) {
        self.enabled.retain(|&ch| ch != channel.raw());
    }

    fn subscribe(&mut self, event: EventId, task: TaskId) {
        self.subscriptions.push((event.raw(), task.raw()));
    }

    fn unsubscribe(&mut self, task: TaskId) {
        self.subscriptions.retain(|&(_, t)| t != task.raw());
    }

    fn group_bind(&mut self, group: GroupId, trigger: EventId) {
        self.groups.push((group.raw(), trigger.raw()));
    }

    fn group_insert(&mut self, group: GroupId, channel: ChannelId) {
        self.group_members.push((group.raw(), channel.raw()));
    }

    fn group_remove(&mut self, group: GroupId, channel: ChannelId) {
        self.group_members
            .retain(|&(g, ch)| g != group.raw() || ch != channel.raw());
    }

    fn group_unbind(&mut self, group: GroupId) {
        self.groups.retain(|&(g, _)| g != group.raw());
        self.group_members.retain(|&(g, _)| g != group.raw());
    }
}

impl CompareTimer for MockFem {
    fn program_compare(&mut self, timer: TimerId, channel: u8, at_us: u32) -> EventId {
        self.compares.push((timer.instance(), channel, at_us));
        EventId::new(Self::compare_event(timer.instance(), channel))
    }

    fn clear_compare(&mut self, timer: TimerId, channel: u8) {
        self.compares
            .retain(|&(t, ch, _)| t != timer.instance() || ch != channel);
    }
}

impl FemOutputs for MockFem {
    fn activate_task(&self, amplifier: Amplifier) -> TaskId {
        match amplifier {
            Amplifier::Pa => TaskId::new(PA_ACTIVATE_TASK),
            Amplifier::Lna => TaskId::new(LNA_ACTIVATE_TASK),
        }
    }

    fn deactivate_task(&self, amplifier: Amplifier) -> TaskId {
        match amplifier {
            Amplifier::Pa => TaskId::new(PA_DEACTIVATE_TASK),
            Amplifier::Lna => TaskId::new(LNA_DEACTIVATE_TASK),
        }
    }

    fn force_inactive(&mut self, functionality: Functionality) {
        self.forced.push(functionality);
    }
}

fn controller() -> FemController<MockFem> {
    FemController::new(MockFem::new(), FemCapabilities::FULL)
}

fn timer_event(start_us: u32, end_us: u32) -> FemEvent {
    FemEvent::timer(
        TimerId::new(0),
        TimerWindow::new(start_us, end_us),
        CompareMask::new(0b0001),
    )
}

fn generic_event(raw: u32) -> FemEvent {
    FemEvent::generic(EventId::new(raw))
}

// =============================================================================
// Arming
// =============================================================================

#[test]
fn pa_activation_is_wired_before_window_end() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    let hw = fem.hardware();
    // A compare was programmed early enough for the PA to settle by `end`
    let &(timer, cc, at_us) = hw.compares.first().expect("no compare programmed");
    assert_eq!(timer, 0);
    assert_eq!(cc, 0);
    assert_eq!(at_us, 500 - PA_SETTLE_TIME_US);
    assert!(at_us + PA_SETTLE_TIME_US <= 500);

    // The compare event drives the PA activate task over an enabled channel
    let (channel, event) = hw
        .connection_for_task(PA_ACTIVATE_TASK)
        .expect("PA activate task not connected");
    assert_eq!(event, MockFem::compare_event(0, 0));
    assert!(hw.channel_is_enabled(channel));

    assert_eq!(fem.phase(Amplifier::Pa), Phase::Armed);
}

#[test]
fn lna_uses_its_own_settle_time() {
    let mut fem = controller();
    fem.lna_configuration_set(Some(timer_event(0, 300)), None)
        .unwrap();

    let &(_, _, at_us) = fem.hardware().compares.first().unwrap();
    assert_eq!(at_us, 300 - LNA_SETTLE_TIME_US);
}

#[test]
fn deactivation_binding_is_wired_symmetrically() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), Some(generic_event(0x4000_2200)))
        .unwrap();

    let hw = fem.hardware();
    let (channel, event) = hw
        .connection_for_task(PA_DEACTIVATE_TASK)
        .expect("PA deactivate task not connected");
    assert_eq!(event, 0x4000_2200);
    assert!(hw.channel_is_enabled(channel));
}

#[test]
fn additive_calls_preserve_earlier_binding() {
    let mut fem = controller();
    fem.pa_configuration_set(None, Some(generic_event(0x4000_2200)))
        .unwrap();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    let config = fem.configuration(Amplifier::Pa);
    assert!(config.activate().is_some());
    assert!(config.deactivate().is_some());

    // Both paths stay wired
    let hw = fem.hardware();
    assert!(hw.connection_for_task(PA_ACTIVATE_TASK).is_some());
    assert!(hw.connection_for_task(PA_DEACTIVATE_TASK).is_some());
}

#[test]
fn reconfiguration_replaces_previous_wiring() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();
    fem.pa_configuration_set(Some(timer_event(0, 800)), None)
        .unwrap();

    let hw = fem.hardware();
    // The first path's channel went back to the pool, one compare is live
    assert_eq!(hw.released.len(), 1);
    assert_eq!(hw.compares.len(), 1);
    assert_eq!(hw.compares[0].2, 800 - PA_SETTLE_TIME_US);
    assert_eq!(hw.connections.len(), 1);
}

#[test]
fn generic_activation_rejected_without_touching_config() {
    let mut fem = controller();
    let result = fem.pa_configuration_set(Some(generic_event(7)), Some(generic_event(8)));

    assert_eq!(result, Err(Error::Invalid));
    let config = fem.configuration(Amplifier::Pa);
    assert!(config.activate().is_none());
    assert!(config.deactivate().is_none());
    assert_eq!(fem.hardware().connections.len(), 0);
}

#[test]
fn configuration_denied_for_absent_amplifier() {
    let caps = FemCapabilities {
        pa: true,
        lna: false,
    };
    let mut fem = FemController::new(MockFem::new(), caps);

    assert_eq!(
        fem.lna_configuration_set(Some(timer_event(0, 300)), None),
        Err(Error::PermissionDenied)
    );
    assert!(fem.pa_configuration_set(Some(timer_event(0, 300)), None).is_ok());
}

#[test]
fn fanout_fabric_subscribes_instead_of_allocating() {
    let mut fem = FemController::new(MockFem::with_fanout(), FemCapabilities::FULL);
    fem.pa_configuration_set(None, Some(generic_event(11)))
        .unwrap();

    let hw = fem.hardware();
    assert_eq!(hw.connections.len(), 0);
    assert_eq!(hw.subscriptions, vec![(11, PA_DEACTIVATE_TASK)]);
}

// =============================================================================
// Immediate Deactivation
// =============================================================================

#[test]
fn deactivate_now_forces_both_amplifiers_inactive() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();
    fem.lna_configuration_set(Some(timer_event(0, 300)), None)
        .unwrap();

    fem.deactivate_now(Functionality::All);

    let hw = fem.hardware();
    assert_eq!(hw.forced, vec![Functionality::All]);
    // No wired path can still pass a pending trigger
    assert!(hw.enabled.is_empty());
    assert_eq!(fem.phase(Amplifier::Pa), Phase::Configured);
    assert_eq!(fem.phase(Amplifier::Lna), Phase::Configured);
}

#[test]
fn deactivate_now_immediately_after_arm() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    fem.deactivate_now(Functionality::All);

    assert!(fem.hardware().enabled.is_empty());
    assert_eq!(fem.hardware().forced, vec![Functionality::All]);
}

#[test]
fn deactivate_now_is_selective_per_functionality() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();
    fem.lna_configuration_set(Some(timer_event(0, 300)), None)
        .unwrap();

    fem.deactivate_now(Functionality::Pa);

    let hw = fem.hardware();
    // The LNA path is untouched
    let (lna_channel, _) = hw.connection_for_task(LNA_ACTIVATE_TASK).unwrap();
    assert!(hw.channel_is_enabled(lna_channel));
    let (pa_channel, _) = hw.connection_for_task(PA_ACTIVATE_TASK).unwrap();
    assert!(!hw.channel_is_enabled(pa_channel));
    assert_eq!(fem.phase(Amplifier::Lna), Phase::Armed);
}

#[test]
fn deactivate_now_without_wiring_still_forces_outputs() {
    let mut fem = controller();
    fem.deactivate_now(Functionality::All);
    assert_eq!(fem.hardware().forced, vec![Functionality::All]);
}

// =============================================================================
// Cleanup and Clear
// =============================================================================

#[test]
fn cleanup_unwires_everything_but_keeps_configuration() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), Some(generic_event(9)))
        .unwrap();

    fem.cleanup();

    let hw = fem.hardware();
    assert!(hw.connections.is_empty());
    assert!(hw.compares.is_empty());
    assert!(hw.enabled.is_empty());
    // Allocated channels were handed back
    assert_eq!(hw.released.len(), 2);

    let config = fem.configuration(Amplifier::Pa);
    assert!(config.activate().is_some());
    assert!(config.deactivate().is_some());
    assert_eq!(fem.phase(Amplifier::Pa), Phase::Configured);
}

#[test]
fn rearm_after_cleanup_without_respecifying() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();
    fem.cleanup();

    // A later partial update re-arms what it mentions
    fem.pa_configuration_set(Some(timer_event(0, 900)), None)
        .unwrap();
    assert_eq!(fem.phase(Amplifier::Pa), Phase::Armed);
    assert_eq!(fem.hardware().compares.len(), 1);
}

#[test]
fn clear_tears_down_wiring_and_bindings() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    fem.pa_configuration_clear().unwrap();

    assert!(!fem.configuration(Amplifier::Pa).has_bindings());
    assert!(fem.hardware().connections.is_empty());
    assert!(fem.hardware().compares.is_empty());
    assert_eq!(fem.phase(Amplifier::Pa), Phase::Configured);
}

#[test]
fn clear_preserves_gain() {
    let mut fem = controller();
    fem.pa_gain_set(10).unwrap();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    fem.pa_configuration_clear().unwrap();

    assert_eq!(fem.pa_is_configured(), 10);
}

// =============================================================================
// Disable
// =============================================================================

#[test]
fn disable_denied_while_pa_configured() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();

    assert_eq!(fem.disable(), Err(Error::PermissionDenied));
}

#[test]
fn disable_denied_while_lna_configured() {
    let mut fem = controller();
    fem.lna_configuration_set(None, Some(generic_event(4)))
        .unwrap();

    assert_eq!(fem.disable(), Err(Error::PermissionDenied));
}

#[test]
fn disable_after_clearing_both() {
    let mut fem = controller();
    fem.pa_configuration_set(Some(timer_event(0, 500)), None)
        .unwrap();
    fem.pa_configuration_clear().unwrap();

    fem.disable().unwrap();

    assert_eq!(fem.phase(Amplifier::Pa), Phase::Disabled);
    assert_eq!(fem.phase(Amplifier::Lna), Phase::Disabled);
    assert_eq!(fem.hardware().forced, vec![Functionality::All]);
    // Everything rejects once disabled
    assert_eq!(
        fem.pa_configuration_set(Some(timer_event(0, 500)), None),
        Err(Error::PermissionDenied)
    );
    assert_eq!(fem.pa_configuration_clear(), Err(Error::PermissionDenied));
}

#[test]
fn disable_zeroes_reported_gain() {
    let mut fem = controller();
    fem.pa_gain_set(20).unwrap();
    fem.disable().unwrap();
    assert_eq!(fem.pa_is_configured(), 0);
}

// =============================================================================
// Abort Path
// =============================================================================

#[test]
fn abort_set_binds_trigger_to_group() {
    let mut fem = controller();
    fem.abort_set(EventId::new(0x4001_0000), GroupId::new(2))
        .unwrap();

    assert_eq!(fem.hardware().groups, vec![(2, 0x4001_0000)]);
}

#[test]
fn abort_set_twice_denied() {
    let mut fem = controller();
    fem.abort_set(EventId::new(1), GroupId::new(2)).unwrap();
    assert_eq!(
        fem.abort_set(EventId::new(1), GroupId::new(3)),
        Err(Error::PermissionDenied)
    );
}

#[test]
fn abort_extend_and_reduce_restore_membership() {
    let mut fem = controller();
    let group = GroupId::new(2);
    fem.abort_set(EventId::new(1), group).unwrap();
    fem.abort_extend(ChannelId::new(5), group).unwrap();

    fem.abort_extend(ChannelId::new(9), group).unwrap();
    fem.abort_reduce(ChannelId::new(9), group).unwrap();

    assert_eq!(fem.hardware().group_members, vec![(2, 5)]);
}

#[test]
fn abort_extend_is_idempotent() {
    let mut fem = controller();
    let group = GroupId::new(2);
    fem.abort_set(EventId::new(1), group).unwrap();

    fem.abort_extend(ChannelId::new(5), group).unwrap();
    fem.abort_extend(ChannelId::new(5), group).unwrap();

    assert_eq!(fem.hardware().group_members, vec![(2, 5)]);
}

#[test]
fn abort_reduce_of_non_member_is_noop() {
    let mut fem = controller();
    let group = GroupId::new(2);
    fem.abort_set(EventId::new(1), group).unwrap();

    fem.abort_reduce(ChannelId::new(5), group).unwrap();
    fem.abort_reduce(ChannelId::new(5), group).unwrap();

    assert!(fem.hardware().group_members.is_empty());
}

#[test]
fn abort_ops_denied_without_group() {
    let mut fem = controller();
    assert_eq!(
        fem.abort_extend(ChannelId::new(5), GroupId::new(2)),
        Err(Error::PermissionDenied)
    );
    assert_eq!(
        fem.abort_reduce(ChannelId::new(5), GroupId::new(2)),
        Err(Error::PermissionDenied)
    );
    assert_eq!(fem.abort_clear(), Err(Error::PermissionDenied));
}

#[test]
fn abort_ops_denied_for_mismatched_group() {
    let mut fem = controller();
    fem.abort_set(EventId::new(1), GroupId::new(2)).unwrap();

    assert_eq!(
        fem.abort_extend(ChannelId::new(5), GroupId::new(3)),
        Err(Error::PermissionDenied)
    );
}

#[test]
fn abort_clear_tears_down_even_empty_group() {
    let mut fem = controller();
    fem.abort_set(EventId::new(1), GroupId::new(2)).unwrap();

    fem.abort_clear().unwrap();

    assert!(fem.hardware().groups.is_empty());
    // A new group can be established afterwards
    assert!(fem.abort_set(EventId::new(6), GroupId::new(4)).is_ok());
}

#[test]
fn abort_clear_then_ops_denied_again() {
    let mut fem = controller();
    fem.abort_set(EventId::new(1), GroupId::new(2)).unwrap();
    fem.abort_clear().unwrap();

    assert_eq!(
        fem.abort_extend(ChannelId::new(5), GroupId::new(2)),
        Err(Error::PermissionDenied)
    );
}

#[test]
fn abort_path_survives_cleanup() {
    let mut fem = controller();
    fem.abort_set(EventId::new(1), GroupId::new(2)).unwrap();
    fem.abort_extend(ChannelId::new(5), GroupId::new(2)).unwrap();

    fem.cleanup();

    assert_eq!(fem.hardware().groups, vec![(2, 1)]);
    assert_eq!(fem.hardware().group_members, vec![(2, 5)]);
}

// =============================================================================
// Gain and Power Split
// =============================================================================

#[test]
fn pa_gain_set_accepts_achievable_steps() {
    let mut fem = controller();
    fem.pa_gain_set(10).unwrap();
    assert_eq!(fem.pa_is_configured(), 10);
    fem.pa_gain_set(20).unwrap();
    assert_eq!(fem.pa_is_configured(), 20);
}

#[test]
fn pa_gain_set_rejects_off_step_values() {
    let mut fem = controller();
    assert_eq!(fem.pa_gain_set(5), Err(Error::Invalid));
    assert_eq!(fem.pa_is_configured(), 0);
}

#[test]
fn pa_is_configured_defaults_to_zero() {
    let fem = controller();
    assert_eq!(fem.pa_is_configured(), 0);
}

#[test]
fn tx_power_split_through_controller() {
    let fem = controller();
    let split = fem.tx_power_split(TxPower::from_dbm(10)).unwrap();
    assert_eq!(split.total_dbm(), 10);

    let err = fem.tx_power_split(TxPower::from_dbm(50)).unwrap_err();
    assert_eq!(err.nearest.total_dbm(), 28);
}
