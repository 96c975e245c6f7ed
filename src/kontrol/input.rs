//! Edge detection between consecutive input reports

use super::codec::RawInput;
use super::controls::ControlId;

/// Positions per knob revolution
const KNOB_RANGE: i32 = 1000;
const BIG_KNOB_RANGE: i32 = 16;

/// Discrete hardware event derived from two snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Pressed(ControlId),
    Released(ControlId),
    /// Knob moved by a signed number of steps
    KnobTurned(ControlId, i32),
    BigKnobTurned(i32),
}

/// Shortest signed distance between two positions on a wrapping dial
fn wrapped_delta(old: i32, new: i32, range: i32) -> i32 {
    (new - old + range / 2).rem_euclid(range) - range / 2
}

/// State of every control at one point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputSnapshot {
    pub raw: RawInput,
}

impl From<RawInput> for InputSnapshot {
    fn from(raw: RawInput) -> Self {
        Self { raw }
    }
}

impl InputSnapshot {
    pub fn is_held(&self, control: ControlId) -> bool {
        control.is_set_in(self.raw.buttons)
    }

    /// Knob indices (0..8) currently touched
    pub fn touched_knobs(&self) -> Vec<usize> {
        ControlId::KNOBS
            .iter()
            .enumerate()
            .filter(|(_, knob)| self.is_held(**knob))
            .map(|(i, _)| i)
            .collect()
    }

    /// Events leading from `previous` to this snapshot
    ///
    /// Button edges come first, in control declaration order. Without a previous snapshot
    /// every held control is reported as pressed and dial positions are only recorded.
    pub fn events_since(&self, previous: Option<&InputSnapshot>) -> Vec<InputEvent> {
        let old_mask = previous.map_or(0, |p| p.raw.buttons);
        let changed = old_mask ^ self.raw.buttons;

        let mut events: Vec<InputEvent> = ControlId::ALL
            .iter()
            .filter(|control| control.is_set_in(changed))
            .map(|control| {
                if self.is_held(*control) {
                    InputEvent::Pressed(*control)
                } else {
                    InputEvent::Released(*control)
                }
            })
            .collect();

        let Some(previous) = previous else {
            return events;
        };

        for (i, knob) in ControlId::KNOBS.iter().enumerate() {
            let (old, new) = (previous.raw.knobs[i], self.raw.knobs[i]);
            if old != new {
                events.push(InputEvent::KnobTurned(
                    *knob,
                    wrapped_delta(old as i32, new as i32, KNOB_RANGE),
                ));
            }
        }

        if previous.raw.big_knob != self.raw.big_knob {
            events.push(InputEvent::BigKnobTurned(wrapped_delta(
                previous.raw.big_knob as i32,
                self.raw.big_knob as i32,
                BIG_KNOB_RANGE,
            )));
        }

        events
    }
}
