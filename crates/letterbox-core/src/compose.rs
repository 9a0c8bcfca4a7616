//! Notification composer: turns a [`NotificationDecision`] into message text.

use alloc::format;
use alloc::string::String;

use crate::battery;
use crate::state::{Notice, NotificationDecision};

const LETTER_ARRIVED: &str = "We just got a letter!";

/// Decimal places used when printing a voltage.
const VOLTAGE_PRECISION: usize = 1;

/// Build the outgoing text, or `None` when the decision is suppressed.
pub fn compose(decision: &NotificationDecision, battery_volts: f32) -> Option<String> {
    let NotificationDecision::Send(notice) = decision else {
        return None;
    };

    let text = match notice {
        Notice::LetterArrived if battery::is_low(battery_volts) => format!(
            "{} Battery low ({} V)",
            LETTER_ARRIVED,
            format_volts(battery_volts)
        ),
        Notice::LetterArrived => String::from(LETTER_ARRIVED),
        Notice::BatteryStatus => {
            format!("Battery voltage is {} V", format_volts(battery_volts))
        }
    };
    Some(text)
}

fn format_volts(volts: f32) -> String {
    format!("{:.*}", VOLTAGE_PRECISION, volts)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppressed_builds_nothing() {
        assert_eq!(compose(&NotificationDecision::Suppressed, 3.0), None);
    }

    #[test]
    fn healthy_battery_letter_has_no_annotation() {
        let text = compose(&NotificationDecision::Send(Notice::LetterArrived), 4.0);
        assert_eq!(text.as_deref(), Some("We just got a letter!"));
    }

    #[test]
    fn low_battery_letter_is_annotated() {
        let text = compose(&NotificationDecision::Send(Notice::LetterArrived), 3.0);
        assert_eq!(
            text.as_deref(),
            Some("We just got a letter! Battery low (3.0 V)")
        );
    }

    #[test]
    fn annotation_triggers_exactly_at_threshold() {
        let at = compose(&NotificationDecision::Send(Notice::LetterArrived), 3.6);
        assert_eq!(
            at.as_deref(),
            Some("We just got a letter! Battery low (3.6 V)")
        );

        let above = compose(&NotificationDecision::Send(Notice::LetterArrived), 3.61);
        assert_eq!(above.as_deref(), Some("We just got a letter!"));
    }

    #[test]
    fn battery_status_reports_reading() {
        let text = compose(&NotificationDecision::Send(Notice::BatteryStatus), 3.9);
        assert_eq!(text.as_deref(), Some("Battery voltage is 3.9 V"));
    }

    #[test]
    fn battery_status_has_no_low_clause() {
        let text = compose(&NotificationDecision::Send(Notice::BatteryStatus), 2.5);
        assert_eq!(text.as_deref(), Some("Battery voltage is 2.5 V"));
    }
}
