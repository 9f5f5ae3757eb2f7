//! Timed input scripts for the training room.
//!
//! A script is a list of steps, each applied on the first tick at or after its
//! time. Attacks and jumps are one-shot; aim and block persist until a later
//! step changes them.

use brawl_combat::{AttackIntent, InputFrame};
use serde::{Deserialize, Serialize};

/// One scripted input change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptStep {
    /// Time the step applies (seconds).
    pub at: f32,
    /// Attack pressed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attack: Option<AttackIntent>,
    /// New aim axis.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aim: Option<f32>,
    /// Block pressed (`true`) or released (`false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<bool>,
    /// Jump pressed.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub jump: bool,
}

impl ScriptStep {
    /// Empty step at `at`.
    #[must_use]
    pub fn at(at: f32) -> Self {
        Self {
            at,
            attack: None,
            aim: None,
            block: None,
            jump: false,
        }
    }

    /// Press `intent`.
    #[must_use]
    pub fn attack(mut self, intent: AttackIntent) -> Self {
        self.attack = Some(intent);
        self
    }

    /// Set the aim axis.
    #[must_use]
    pub fn aim(mut self, aim: f32) -> Self {
        self.aim = Some(aim);
        self
    }

    /// Press or release block.
    #[must_use]
    pub fn block(mut self, held: bool) -> Self {
        self.block = Some(held);
        self
    }

    /// Jump.
    #[must_use]
    pub fn jump(mut self) -> Self {
        self.jump = true;
        self
    }
}

/// Input for one tick, as produced by a script.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScriptFrame {
    /// Combat input.
    pub input: InputFrame,
    /// Jump pressed this tick.
    pub jump: bool,
}

/// Plays back a list of steps.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    steps: Vec<ScriptStep>,
    cursor: usize,
    aim: f32,
    block: bool,
}

impl InputScript {
    /// Create a script; steps are ordered by time, ties keep their order.
    #[must_use]
    pub fn new(mut steps: Vec<ScriptStep>) -> Self {
        steps.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self {
            steps,
            ..Self::default()
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns true if the script has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Returns true once every step has been played.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.cursor >= self.steps.len()
    }

    /// Time of the last step.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.steps.last().map_or(0.0, |s| s.at)
    }

    /// Apply every step due by `now` and return this tick's input.
    pub fn frame_at(&mut self, now: f32) -> ScriptFrame {
        let mut frame = ScriptFrame::default();

        while let Some(step) = self.steps.get(self.cursor) {
            if step.at > now {
                break;
            }
            if let Some(intent) = step.attack {
                frame.input = frame.input.with_attack(intent);
            }
            if let Some(aim) = step.aim {
                self.aim = aim.clamp(-1.0, 1.0);
            }
            if let Some(held) = step.block {
                self.block = held;
            }
            frame.jump |= step.jump;
            self.cursor += 1;
        }

        frame.input.aim = self.aim;
        frame.input.block = self.block;
        frame
    }

    /// Rewind to the first step.
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.aim = 0.0;
        self.block = false;
    }

    /// The demo routine: a grounded three-hit combo, a heavy, a blocked
    /// attempt, then a jump into an aimed-down air heavy.
    #[must_use]
    pub fn demo() -> Self {
        use AttackIntent::{HeavyAttack, LightAttack};

        Self::new(vec![
            ScriptStep::at(0.0).attack(LightAttack),
            ScriptStep::at(0.5).attack(LightAttack),
            ScriptStep::at(1.0).attack(LightAttack),
            ScriptStep::at(1.5).attack(HeavyAttack),
            ScriptStep::at(3.0).block(true),
            ScriptStep::at(3.2).attack(LightAttack),
            ScriptStep::at(3.5).block(false),
            ScriptStep::at(3.6).jump(),
            ScriptStep::at(3.7).aim(-1.0).attack(HeavyAttack),
            ScriptStep::at(5.5).aim(0.0),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_apply_once() {
        let mut script = InputScript::new(vec![
            ScriptStep::at(0.5).attack(AttackIntent::HeavyAttack),
            ScriptStep::at(0.0).attack(AttackIntent::LightAttack),
        ]);

        assert!(script.frame_at(0.0).input.light);
        assert_eq!(script.frame_at(0.1).input, InputFrame::idle());
        assert!(script.frame_at(0.6).input.heavy);
        assert!(script.is_finished());
    }

    #[test]
    fn test_block_and_aim_persist() {
        let mut script = InputScript::new(vec![
            ScriptStep::at(0.0).block(true).aim(-3.0),
            ScriptStep::at(1.0).block(false),
        ]);

        let frame = script.frame_at(0.0);
        assert!(frame.input.block);
        assert_eq!(frame.input.aim, -1.0);
        assert!(script.frame_at(0.5).input.block);
        assert!(!script.frame_at(1.0).input.block);
        assert_eq!(script.frame_at(1.5).input.aim, -1.0);
    }

    #[test]
    fn test_skipped_steps_still_apply() {
        let mut script = InputScript::new(vec![
            ScriptStep::at(0.1).jump(),
            ScriptStep::at(0.2).attack(AttackIntent::LightAttack),
        ]);

        let frame = script.frame_at(1.0);
        assert!(frame.jump);
        assert!(frame.input.light);

        script.reset();
        assert!(!script.is_finished());
    }

    #[test]
    fn test_steps_parse_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            step: Vec<ScriptStep>,
        }

        let parsed: Wrapper = toml::from_str(
            r#"
            [[step]]
            at = 0.25
            attack = "heavy_attack"
            aim = 1.0

            [[step]]
            at = 1.0
            jump = true
            "#,
        )
        .expect("Failed to parse steps");

        assert_eq!(
            parsed.step[0],
            ScriptStep::at(0.25).attack(AttackIntent::HeavyAttack).aim(1.0)
        );
        assert!(parsed.step[1].jump);
    }
}
