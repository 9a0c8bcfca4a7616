use letterbox_core::arming::EdgePolarity;
use letterbox_core::LetterboxState;
use letterbox_scenario_harness::{CycleOutcome, ScenarioHarness};

#[test]
fn offline_send_is_dropped_and_node_still_rearms() {
    let mut harness = ScenarioHarness::power_on(2000);
    harness.set_offline(true);

    assert_eq!(harness.drop_letter(), 1);
    assert_eq!(harness.messages().len(), 1);
    assert_eq!(harness.retained_state(), Some(LetterboxState::Open));
    assert_eq!(harness.armed_edge(), Some(EdgePolarity::RisingOnHigh));

    // No retry on the next wake: the reset is silent as usual.
    harness.set_offline(false);
    harness.reset_flap();
    assert_eq!(harness.messages().len(), 1);
}

#[test]
fn arming_failure_leaves_node_deaf_until_power_cycle() {
    let mut harness = ScenarioHarness::power_on(2000);
    harness.set_arming_failing(true);

    harness.drop_letter();
    assert_eq!(harness.outcomes().last(), Some(&CycleOutcome::ArmingFailed));
    assert_eq!(harness.retained_state(), Some(LetterboxState::Open));
    assert_eq!(harness.messages().len(), 1);

    harness.set_arming_failing(false);
    assert_eq!(harness.reset_flap(), 0);
    assert!(!harness.touch());

    harness.power_cycle();
    assert_eq!(harness.retained_state(), Some(LetterboxState::Closed));
    assert_eq!(harness.drop_letter(), 1);
    assert_eq!(harness.messages().len(), 2);
}

#[test]
fn power_loss_with_flap_pushed_in_waits_for_reset() {
    let mut harness = ScenarioHarness::power_on(2000);
    harness.drop_letter();

    // Power comes back while the flap is still pushed in (line low).
    harness.power_cycle();
    assert_eq!(harness.retained_state(), Some(LetterboxState::Open));
    assert_eq!(harness.armed_edge(), Some(EdgePolarity::RisingOnHigh));
    assert_eq!(harness.messages().len(), 1);

    assert_eq!(harness.reset_flap(), 1);
    assert_eq!(harness.retained_state(), Some(LetterboxState::Closed));
    assert_eq!(harness.drop_letter(), 1);
    assert_eq!(harness.messages().len(), 2);
}

#[test]
fn corrupt_retained_byte_self_heals_through_level_wake() {
    let mut harness = ScenarioHarness::power_on(2000);
    harness.node_mut().store_mut().corrupt(0x42);

    // Loaded as Open, the first ext1 wake is taken as a silent reset edge and
    // re-arms for low. The line is still low, so the node wakes again at once
    // and reports the letter.
    assert_eq!(harness.drop_letter(), 2);

    let outcomes = harness.outcomes();
    let CycleOutcome::Slept(first) = &outcomes[outcomes.len() - 2] else {
        panic!("expected the recovery wake to arm");
    };
    assert_eq!(first.previous, LetterboxState::Open);
    assert_eq!(first.next, LetterboxState::Closed);
    assert_eq!(first.message, None);

    assert_eq!(harness.messages(), ["We just got a letter!"]);
    assert_eq!(harness.retained_state(), Some(LetterboxState::Open));
}
