//! Scripted input for the headless driver.
//!
//! A scenario is a list of steps, each holding one [`PlayerInput`] for a number
//! of ticks. Button presses (`jump_pressed`, `crouch_pressed`, `teleport`) fire on
//! the first tick of their step only; everything else is held for the whole step.

use locomotion::Vec2;

use crate::player::PlayerInput;

#[derive(Clone, Copy, Debug)]
pub struct ScriptStep {
    pub label: &'static str,
    pub ticks: u32,
    pub input: PlayerInput,
}

#[derive(Clone, Debug, Default)]
pub struct Scenario {
    steps: Vec<ScriptStep>,
}

impl Scenario {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self { steps }
    }

    /// Walk, slide under the low ceiling, try to stand, crawl out, sprint, jump.
    ///
    /// Tick counts assume 60 Hz against [`crate::world::demo_course`].
    pub fn obstacle_run() -> Self {
        let forward = Vec2::new(0.0, 1.0);
        let walk = PlayerInput {
            move_axis: forward,
            ..PlayerInput::default()
        };

        Self::new(vec![
            step("settle", 30, PlayerInput::default()),
            step("walk", 30, walk),
            step("slide", 1, PlayerInput {
                crouch_pressed: true,
                ..walk
            }),
            step("slide", 25, walk),
            step("coast under ceiling", 40, PlayerInput::default()),
            step("try to stand", 1, PlayerInput {
                crouch_pressed: true,
                ..PlayerInput::default()
            }),
            step("stay low", 30, PlayerInput::default()),
            step("crawl out", 160, PlayerInput {
                move_axis: Vec2::new(0.0, -1.0),
                ..PlayerInput::default()
            }),
            step("stand", 1, PlayerInput {
                crouch_pressed: true,
                ..PlayerInput::default()
            }),
            step("sprint", 40, PlayerInput {
                move_axis: Vec2::new(0.0, -1.0),
                sprint: true,
                ..PlayerInput::default()
            }),
            step("jump", 1, PlayerInput {
                jump_pressed: true,
                jump_held: true,
                ..PlayerInput::default()
            }),
            step("airborne", 60, PlayerInput {
                jump_held: true,
                look: Vec2::new(4.0, 0.0),
                ..PlayerInput::default()
            }),
        ])
    }

    pub fn total_ticks(&self) -> u32 {
        self.steps.iter().map(|s| s.ticks).sum()
    }

    /// Input for `tick`, or idle once the script has run out.
    pub fn input_at(&self, tick: u32) -> PlayerInput {
        self.step_at(tick)
            .map(|(step, first_tick)| {
                let mut input = step.input;
                if !first_tick {
                    input.jump_pressed = false;
                    input.crouch_pressed = false;
                    input.teleport = false;
                }
                input
            })
            .unwrap_or_default()
    }

    pub fn label_at(&self, tick: u32) -> Option<&'static str> {
        self.step_at(tick).map(|(step, _)| step.label)
    }

    fn step_at(&self, tick: u32) -> Option<(&ScriptStep, bool)> {
        let mut start = 0;
        for step in &self.steps {
            let end = start + step.ticks;
            if tick < end {
                return Some((step, tick == start));
            }
            start = end;
        }
        None
    }
}

fn step(label: &'static str, ticks: u32, input: PlayerInput) -> ScriptStep {
    ScriptStep { label, ticks, input }
}
