//! Host-side scenario harness for scripted wake-cycle flows.
//!
//! Models the bits of hardware the core never sees directly: the reed line
//! level, which wake sources are currently armed, and the fact that ext1 is
//! level-triggered (sleeping while the line already sits at the armed level
//! wakes the node straight away).
//!
//! The reed line reads low while a letter holds the flap pushed in and high
//! once the owner has reset it.

use letterbox_core::arming::{EdgeLine, EdgePolarity, TouchPad, WakeSources};
use letterbox_core::mock::{MockAnalog, MockArming, MockNotifier, MockRetained};
use letterbox_core::{
    BatteryMonitor, BootKind, CycleReport, DividerRatio, LetterboxState, WakeCause, WakeCycle,
};

pub type MockNode = WakeCycle<MockRetained, MockAnalog, MockNotifier, MockArming>;

/// Reed switch on GPIO13, touch pad T3 at threshold 40: the board layout.
pub const REED_GPIO: u8 = 13;
pub const TOUCH_CHANNEL: u8 = 3;
pub const TOUCH_THRESHOLD: u16 = 40;

/// Chained level wakes before we assume the node is stuck in a wake loop.
const MAX_SETTLE_WAKES: usize = 8;

/// What ended the most recent cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    Slept(CycleReport),
    /// Arming failed; the node sleeps with nothing armed.
    ArmingFailed,
}

/// Couples a mock node with a simulated reed line and wake hardware.
pub struct ScenarioHarness {
    node: MockNode,
    line_high: bool,
    armed_edge: Option<EdgePolarity>,
    touch_armed: bool,
    outcomes: Vec<CycleOutcome>,
}

impl ScenarioHarness {
    /// Power the node on with the flap reset and the battery pin at
    /// `pin_millivolts` behind a half divider.
    pub fn power_on(pin_millivolts: u32) -> Self {
        Self::power_on_with(pin_millivolts, DividerRatio::HALF)
    }

    pub fn power_on_with(pin_millivolts: u32, ratio: DividerRatio) -> Self {
        let sources = WakeSources {
            touch: TouchPad::new(TOUCH_CHANNEL, TOUCH_THRESHOLD)
                .expect("board touch pad is valid"),
            edge: EdgeLine::new(REED_GPIO).expect("board reed pin is an RTC GPIO"),
        };
        let node = WakeCycle::new(
            MockRetained::default(),
            BatteryMonitor::new(MockAnalog::new(pin_millivolts), ratio),
            MockNotifier::default(),
            MockArming::default(),
            sources,
        );
        let mut harness = Self {
            node,
            line_high: true,
            armed_edge: None,
            touch_armed: false,
            outcomes: Vec::new(),
        };
        harness.boot(BootKind::ColdBoot, WakeCause::Undefined);
        harness.settle();
        harness
    }

    /// Drop power and bring it back. Retained memory does not survive.
    pub fn power_cycle(&mut self) {
        self.node.store_mut().corrupt(0xFF);
        self.armed_edge = None;
        self.touch_armed = false;
        self.boot(BootKind::ColdBoot, WakeCause::Undefined);
        self.settle();
    }

    /// A letter pushes the flap in; the reed line goes low.
    pub fn drop_letter(&mut self) -> usize {
        self.line_high = false;
        self.settle()
    }

    /// The owner resets the flap; the reed line goes high.
    pub fn reset_flap(&mut self) -> usize {
        self.line_high = true;
        self.settle()
    }

    /// Touch the diagnostic pad. Returns whether the node woke.
    pub fn touch(&mut self) -> bool {
        if !self.touch_armed {
            return false;
        }
        self.boot(BootKind::DeepSleepWake, WakeCause::Touchpad);
        self.settle();
        true
    }

    /// Wake the node with an arbitrary cause, as a stray wake would.
    pub fn wake_with(&mut self, cause: WakeCause) {
        self.boot(BootKind::DeepSleepWake, cause);
        self.settle();
    }

    /// Run ext1 wakes for as long as the line sits at the armed level.
    /// Returns the number of wakes.
    pub fn settle(&mut self) -> usize {
        let mut wakes = 0;
        while self.edge_would_fire() {
            assert!(
                wakes < MAX_SETTLE_WAKES,
                "node keeps waking on ext1: line_high={} armed={:?}",
                self.line_high,
                self.armed_edge
            );
            self.boot(BootKind::DeepSleepWake, WakeCause::Ext1);
            wakes += 1;
        }
        wakes
    }

    fn edge_would_fire(&self) -> bool {
        match self.armed_edge {
            Some(EdgePolarity::RisingOnHigh) => self.line_high,
            Some(EdgePolarity::FallingOnLow) => !self.line_high,
            None => false,
        }
    }

    fn boot(&mut self, boot: BootKind, cause: WakeCause) {
        let outcome = match self.node.run(boot, cause) {
            Ok(report) => {
                self.armed_edge = Some(report.plan.edge_polarity);
                self.touch_armed = report.plan.enable_touch;
                CycleOutcome::Slept(report)
            }
            Err(err) => {
                log::error!("{}", err);
                self.armed_edge = None;
                self.touch_armed = false;
                CycleOutcome::ArmingFailed
            }
        };
        self.outcomes.push(outcome);
    }

    pub fn set_pin_millivolts(&mut self, millivolts: u32) {
        self.node
            .battery_mut()
            .source_mut()
            .set_millivolts(millivolts);
    }

    pub fn set_offline(&mut self, offline: bool) {
        self.node.notifier_mut().set_offline(offline);
    }

    pub fn set_arming_failing(&mut self, failing: bool) {
        self.node.arming_mut().set_failing(failing);
    }

    /// Retained state as the next wake would load it.
    pub fn retained_state(&self) -> Option<LetterboxState> {
        self.node.store().state()
    }

    pub fn armed_edge(&self) -> Option<EdgePolarity> {
        self.armed_edge
    }

    /// Every message handed to the transport so far.
    pub fn messages(&self) -> &[String] {
        self.node.notifier().attempts()
    }

    pub fn outcomes(&self) -> &[CycleOutcome] {
        &self.outcomes
    }

    pub fn last_report(&self) -> Option<&CycleReport> {
        self.outcomes.iter().rev().find_map(|outcome| match outcome {
            CycleOutcome::Slept(report) => Some(report),
            CycleOutcome::ArmingFailed => None,
        })
    }

    pub fn node(&self) -> &MockNode {
        &self.node
    }

    pub fn node_mut(&mut self) -> &mut MockNode {
        &mut self.node
    }
}
