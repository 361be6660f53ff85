//! Timeline: per-actor scripts of frame-triggered actions.
//!
//! Every scripted actor owns its own `Script`: one queue of trigger frames per
//! action kind. The `Scheduler` walks the active actor's script with one
//! forward-only cursor per kind, consuming at most one event of each kind per
//! tick. A second event of the same kind on the same frame is therefore
//! deferred to the following tick; the reference choreography is timed
//! against that behavior.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

use super::actor::Actor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Rotate,
    MoveLeft,
    MoveRight,
    MoveDown,
    Stop,
}

impl ActionKind {
    pub const COUNT: usize = 5;

    /// Dispatch order within a tick. Stop is always checked last.
    pub const ALL: [ActionKind; ActionKind::COUNT] = [
        ActionKind::Rotate,
        ActionKind::MoveLeft,
        ActionKind::MoveRight,
        ActionKind::MoveDown,
        ActionKind::Stop,
    ];

    fn index(self) -> usize {
        self as usize
    }

    /// Apply a movement action. `Stop` is handled by the director.
    pub fn apply(self, actor: &mut Actor) {
        match self {
            ActionKind::Rotate => actor.advance_rotation(),
            ActionKind::MoveLeft => actor.move_left(),
            ActionKind::MoveRight => actor.move_right(),
            ActionKind::MoveDown => actor.move_drop(),
            ActionKind::Stop => {}
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::Rotate => "rotate",
            ActionKind::MoveLeft => "move-left",
            ActionKind::MoveRight => "move-right",
            ActionKind::MoveDown => "move-down",
            ActionKind::Stop => "stop",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub frame: u64,
    pub action: ActionKind,
}

impl ScheduledEvent {
    pub fn new(frame: u64, action: ActionKind) -> Self {
        Self { frame, action }
    }
}

/// One actor's events, grouped by kind in authored order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    queues: [Vec<u64>; ActionKind::COUNT],
}

impl Script {
    pub fn from_events(events: impl IntoIterator<Item = ScheduledEvent>) -> Self {
        let mut script = Script::default();
        for event in events {
            script.queues[event.action.index()].push(event.frame);
        }
        script
    }

    pub fn frames(&self, action: ActionKind) -> &[u64] {
        &self.queues[action.index()]
    }

    /// The frame on which this actor's active phase ends. Only meaningful
    /// once the timeline has been validated.
    pub fn stop_frame(&self) -> Option<u64> {
        self.frames(ActionKind::Stop).first().copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedActor {
    pub actor: Actor,
    pub script: Script,
}

/// A validated choreography: static background blocks plus scripted actors
/// in spawn order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timeline {
    background: Vec<Actor>,
    scripted: Vec<ScriptedActor>,
}

impl Timeline {
    pub fn new(background: Vec<Actor>, scripted: Vec<ScriptedActor>) -> Result<Self, ScheduleError> {
        validate(&scripted)?;
        Ok(Self {
            background,
            scripted,
        })
    }

    pub fn background(&self) -> &[Actor] {
        &self.background
    }

    pub fn scripted(&self) -> &[ScriptedActor] {
        &self.scripted
    }

    pub fn actor_count(&self) -> usize {
        self.scripted.len()
    }

    pub(crate) fn into_parts(self) -> (Vec<Actor>, Vec<ScriptedActor>) {
        (self.background, self.scripted)
    }
}

/// Reject any schedule the scheduler could not play back faithfully.
///
/// Besides the stop count and per-kind ordering, every event must be applied
/// inside its own actor's active window `(previous stop, own stop]`. An event
/// is applied on its trigger frame, or one tick after the previous event of
/// the same kind when several pile up, assuming the host ticks every frame.
/// An event that would only be applied after its actor stops is an error:
/// the scheduler moves on to the next script and the event would be lost.
fn validate(scripted: &[ScriptedActor]) -> Result<(), ScheduleError> {
    let mut last_seen: [Option<u64>; ActionKind::COUNT] = [None; ActionKind::COUNT];
    let mut previous_stop: Option<u64> = None;

    for (actor, entry) in scripted.iter().enumerate() {
        let stops = entry.script.frames(ActionKind::Stop);
        if stops.len() != 1 {
            return Err(ScheduleError::StopCount {
                actor,
                found: stops.len(),
            });
        }
        let stop = stops[0];

        for action in ActionKind::ALL {
            let mut applied_at: Option<u64> = None;

            for &frame in entry.script.frames(action) {
                if let Some(previous) = last_seen[action.index()] {
                    if frame < previous {
                        return Err(ScheduleError::OutOfOrder {
                            actor,
                            action,
                            frame,
                            previous,
                        });
                    }
                }
                last_seen[action.index()] = Some(frame);

                if let Some(previous_stop) = previous_stop {
                    if frame <= previous_stop {
                        return Err(ScheduleError::BeforeSpawn {
                            actor,
                            action,
                            frame,
                            previous_stop,
                        });
                    }
                }

                // One event per kind per tick: a pile-up spills onto later frames.
                let applied = match applied_at {
                    Some(previous) if frame <= previous => previous.checked_add(1),
                    _ => Some(frame),
                };
                match applied {
                    Some(applied) if applied <= stop => applied_at = Some(applied),
                    _ => {
                        return Err(ScheduleError::AfterStop {
                            actor,
                            action,
                            frame,
                            applied: applied.unwrap_or(u64::MAX),
                            stop,
                        });
                    }
                }
            }
        }

        previous_stop = Some(stop);
    }

    Ok(())
}

/// The kinds that fired on one tick, in dispatch order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DueActions([bool; ActionKind::COUNT]);

impl DueActions {
    pub fn contains(&self, action: ActionKind) -> bool {
        self.0[action.index()]
    }

    pub fn is_empty(&self) -> bool {
        !self.0.iter().any(|&due| due)
    }

    /// Due movement actions (everything except stop), in dispatch order.
    pub fn moves(&self) -> impl Iterator<Item = ActionKind> + '_ {
        ActionKind::ALL
            .into_iter()
            .filter(move |&a| a != ActionKind::Stop && self.contains(a))
    }

    pub fn stop(&self) -> bool {
        self.contains(ActionKind::Stop)
    }
}

/// Walks the scripts in spawn order, one actor at a time.
#[derive(Debug, Clone)]
pub struct Scheduler {
    scripts: Vec<Script>,
    active: usize,
    cursors: [usize; ActionKind::COUNT],
    auto_drop_period: u64,
}

impl Scheduler {
    pub fn new(scripts: Vec<Script>, auto_drop_period: u64) -> Self {
        Self {
            scripts,
            active: 0,
            cursors: [0; ActionKind::COUNT],
            auto_drop_period,
        }
    }

    pub fn active(&self) -> usize {
        self.active
    }

    pub fn is_finished(&self) -> bool {
        self.active >= self.scripts.len()
    }

    /// The periodic drop, independent of any scripted move-down.
    pub fn auto_drop_due(&self, frame: u64) -> bool {
        self.auto_drop_period != 0 && frame % self.auto_drop_period == 0
    }

    /// Consume, for the active actor, the front event of every kind whose
    /// trigger frame has been reached. Exhausted queues are never due.
    pub fn due_actions(&mut self, frame: u64) -> DueActions {
        let mut due = DueActions::default();
        let Some(script) = self.scripts.get(self.active) else {
            return due;
        };

        for action in ActionKind::ALL {
            let cursor = &mut self.cursors[action.index()];
            if let Some(&trigger) = script.frames(action).get(*cursor) {
                if trigger <= frame {
                    due.0[action.index()] = true;
                    *cursor += 1;
                }
            }
        }
        due
    }

    /// Hand control to the next actor's script.
    pub fn advance(&mut self) {
        self.active += 1;
        self.cursors = [0; ActionKind::COUNT];
    }
}
