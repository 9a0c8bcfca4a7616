//! One wake cycle, from wake cause to armed wake sources.
//!
//! The order is fixed: classify, restore state, transition, notify, persist,
//! arm. Persisting and arming happen whatever the transport does; the node
//! cannot stay awake to retry a send.

use alloc::string::String;

use crate::arming::{self, ArmingPlan, WakeSources};
use crate::battery::BatteryMonitor;
use crate::compose::compose;
use crate::error::CycleError;
use crate::platform::{AnalogSource, Notifier, StateStore, WakeArming};
use crate::state::{self, LetterboxState, NotificationDecision, Transition};
use crate::wake::{self, BootKind, WakeCause, WakeTrigger};

/// What a cycle did, for the caller's log line and for tests.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub trigger: WakeTrigger,
    pub previous: LetterboxState,
    pub next: LetterboxState,
    pub decision: NotificationDecision,
    /// Text handed to the notifier, if any
    pub message: Option<String>,
    /// Battery reading, taken only when a message was composed
    pub battery_volts: Option<f32>,
    pub plan: ArmingPlan,
}

/// The node's per-wake logic bound to its platform.
pub struct WakeCycle<S, A, N, W> {
    store: S,
    battery: BatteryMonitor<A>,
    notifier: N,
    arming: W,
    sources: WakeSources,
}

impl<S, A, N, W> WakeCycle<S, A, N, W>
where
    S: StateStore,
    A: AnalogSource,
    N: Notifier,
    W: WakeArming,
{
    pub fn new(
        store: S,
        battery: BatteryMonitor<A>,
        notifier: N,
        arming: W,
        sources: WakeSources,
    ) -> Self {
        Self {
            store,
            battery,
            notifier,
            arming,
            sources,
        }
    }

    /// Run the cycle for this boot.
    ///
    /// # Errors
    ///
    /// Returns [`CycleError::Arming`] if the wake sources could not be
    /// written. The next state is already persisted at that point.
    pub fn run(
        &mut self,
        boot: BootKind,
        cause: WakeCause,
    ) -> Result<CycleReport, CycleError<W::Error>> {
        let trigger = wake::classify(boot, cause);
        let previous = self.restore(trigger);
        let Transition { next, decision } = state::transition(previous, trigger);

        let (message, battery_volts) = self.notify(&decision);

        self.store.persist(next);

        let plan = arming::plan(next);
        arming::apply(&plan, &self.sources, &mut self.arming).map_err(CycleError::Arming)?;

        Ok(CycleReport {
            trigger,
            previous,
            next,
            decision,
            message,
            battery_volts,
            plan,
        })
    }

    fn restore(&mut self, trigger: WakeTrigger) -> LetterboxState {
        if trigger == WakeTrigger::ColdBoot {
            log::info!("cold boot: letterbox state reset to Open");
            return LetterboxState::Open;
        }
        match self.store.load() {
            Some(state) => state,
            None => {
                log::warn!("retained letterbox state unreadable, assuming Open");
                LetterboxState::Open
            }
        }
    }

    fn notify(&mut self, decision: &NotificationDecision) -> (Option<String>, Option<f32>) {
        if !decision.is_send() {
            return (None, None);
        }

        let volts = self.battery.read_voltage();
        let message = compose(decision, volts);
        if let Some(text) = message.as_deref() {
            if let Err(err) = self.notifier.send(text) {
                log::warn!("notification dropped: {:?}", err);
            }
        }
        (message, Some(volts))
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn battery_mut(&mut self) -> &mut BatteryMonitor<A> {
        &mut self.battery
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn notifier_mut(&mut self) -> &mut N {
        &mut self.notifier
    }

    pub fn arming(&self) -> &W {
        &self.arming
    }

    pub fn arming_mut(&mut self) -> &mut W {
        &mut self.arming
    }

    pub fn sources(&self) -> &WakeSources {
        &self.sources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arming::{EdgeLine, EdgePolarity, TouchPad};
    use crate::battery::DividerRatio;
    use crate::mock::{MockAnalog, MockArming, MockNotifier, MockRetained};
    use crate::state::Notice;

    type TestCycle = WakeCycle<MockRetained, MockAnalog, MockNotifier, MockArming>;

    fn cycle(state: LetterboxState, millivolts: u32) -> TestCycle {
        WakeCycle::new(
            MockRetained::new(state),
            BatteryMonitor::new(MockAnalog::new(millivolts), DividerRatio::HALF),
            MockNotifier::default(),
            MockArming::default(),
            WakeSources {
                touch: TouchPad::new(3, 40).unwrap(),
                edge: EdgeLine::new(13).unwrap(),
            },
        )
    }

    #[test]
    fn letter_arrival_at_healthy_battery() {
        let mut node = cycle(LetterboxState::Closed, 2000);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Ext1)
            .unwrap();

        assert_eq!(report.trigger, WakeTrigger::EdgeSignal);
        assert_eq!(report.next, LetterboxState::Open);
        assert_eq!(report.message.as_deref(), Some("We just got a letter!"));
        assert_eq!(node.notifier().last(), Some("We just got a letter!"));
        assert_eq!(node.store().state(), Some(LetterboxState::Open));
        assert_eq!(report.plan.edge_polarity, EdgePolarity::RisingOnHigh);
    }

    #[test]
    fn flap_reset_is_silent_even_on_low_battery() {
        let mut node = cycle(LetterboxState::Open, 1750);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Ext1)
            .unwrap();

        assert_eq!(report.decision, NotificationDecision::Suppressed);
        assert_eq!(report.next, LetterboxState::Closed);
        assert_eq!(report.battery_volts, None);
        assert!(node.notifier().attempts().is_empty());
        assert_eq!(node.battery_mut().source_mut().reads(), 0);
        assert_eq!(
            node.arming().last_edge(),
            Some((0x2000, EdgePolarity::FallingOnLow))
        );
    }

    #[test]
    fn low_battery_letter_is_annotated() {
        let mut node = cycle(LetterboxState::Closed, 1500);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Ext1)
            .unwrap();
        assert_eq!(
            report.message.as_deref(),
            Some("We just got a letter! Battery low (3.0 V)")
        );
        assert_eq!(report.battery_volts, Some(3.0));
    }

    #[test]
    fn touch_probe_reports_voltage_and_keeps_state() {
        for state in [LetterboxState::Open, LetterboxState::Closed] {
            let mut node = cycle(state, 1950);
            let report = node
                .run(BootKind::DeepSleepWake, WakeCause::Touchpad)
                .unwrap();
            assert_eq!(
                report.decision,
                NotificationDecision::Send(Notice::BatteryStatus)
            );
            assert_eq!(report.message.as_deref(), Some("Battery voltage is 3.9 V"));
            assert_eq!(report.next, state);
            assert_eq!(node.store().state(), Some(state));
        }
    }

    #[test]
    fn cold_boot_resets_to_open_without_network() {
        let mut node = cycle(LetterboxState::Closed, 2000);
        let report = node
            .run(BootKind::ColdBoot, WakeCause::Undefined)
            .unwrap();

        assert_eq!(report.trigger, WakeTrigger::ColdBoot);
        assert_eq!(report.previous, LetterboxState::Open);
        assert_eq!(report.next, LetterboxState::Open);
        assert_eq!(node.store().state(), Some(LetterboxState::Open));
        assert!(node.notifier().attempts().is_empty());
        assert_eq!(
            node.arming().last_edge(),
            Some((0x2000, EdgePolarity::RisingOnHigh))
        );
    }

    #[test]
    fn other_wake_is_a_no_op() {
        let mut node = cycle(LetterboxState::Closed, 2000);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Timer)
            .unwrap();
        assert_eq!(report.trigger, WakeTrigger::Other(WakeCause::Timer));
        assert_eq!(report.next, LetterboxState::Closed);
        assert_eq!(report.message, None);
        assert!(node.notifier().attempts().is_empty());
    }

    #[test]
    fn corrupt_retained_byte_is_treated_as_open() {
        let mut node = cycle(LetterboxState::Open, 2000);
        node.store_mut().corrupt(0x7E);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Ext1)
            .unwrap();
        assert_eq!(report.previous, LetterboxState::Open);
        assert_eq!(report.next, LetterboxState::Closed);
        assert_eq!(node.store().state(), Some(LetterboxState::Closed));
    }

    #[test]
    fn failed_send_still_persists_and_arms() {
        let mut node = cycle(LetterboxState::Closed, 2000);
        node.notifier_mut().set_offline(true);
        let report = node
            .run(BootKind::DeepSleepWake, WakeCause::Ext1)
            .unwrap();

        assert_eq!(node.notifier().attempts().len(), 1);
        assert_eq!(report.next, LetterboxState::Open);
        assert_eq!(node.store().state(), Some(LetterboxState::Open));
        assert_eq!(node.arming().calls().len(), 2);
    }

    #[test]
    fn arming_failure_is_reported_after_persist() {
        let mut node = cycle(LetterboxState::Open, 2000);
        node.arming_mut().set_failing(true);
        let result = node.run(BootKind::DeepSleepWake, WakeCause::Ext1);

        assert!(matches!(result, Err(CycleError::Arming(_))));
        assert_eq!(node.store().state(), Some(LetterboxState::Closed));
        assert_eq!(node.store().persists(), 1);
    }

    #[test]
    fn state_is_written_once_per_cycle() {
        let mut node = cycle(LetterboxState::Open, 2000);
        node.run(BootKind::DeepSleepWake, WakeCause::Touchpad)
            .unwrap();
        node.run(BootKind::DeepSleepWake, WakeCause::Ext1).unwrap();
        assert_eq!(node.store().persists(), 2);
    }
}
