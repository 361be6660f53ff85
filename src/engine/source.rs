//! Source timeline: the human-authored choreography format.
//!
//! Positions are offsets from the spawn origin and times are beats, so the
//! same source can be replayed at a different speed or origin by changing the
//! config alone. `build` resolves it into an absolute-frame `Timeline`.

use serde::{Deserialize, Serialize};

use crate::config::AnimationConfig;
use crate::error::ScheduleError;

use super::actor::{Actor, Rotation};
use super::shapes::ShapeKind;
use super::timeline::{ActionKind, ScheduledEvent, Script, ScriptedActor, Timeline};

const REFERENCE_LOGO: &str = include_str!("at_logo.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceTimeline {
    #[serde(default)]
    pub config: AnimationConfig,
    /// Static blocks, cleared at the end of the animation.
    #[serde(default)]
    pub background: Vec<ActorSpec>,
    /// Scripted blocks in spawn order. The last one is cleared with the
    /// background.
    pub actors: Vec<ScriptedActorSpec>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub shape: ShapeKind,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: Rotation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedActorSpec {
    pub shape: ShapeKind,
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub rotation: Rotation,
    /// `(beat, action)` pairs.
    pub script: Vec<(u64, ActionKind)>,
}

impl ActorSpec {
    fn resolve(&self, config: &AnimationConfig) -> Actor {
        place(self.shape, self.x, self.y, self.rotation, config)
    }
}

impl ScriptedActorSpec {
    fn resolve(&self, index: usize, config: &AnimationConfig) -> Result<ScriptedActor, ScheduleError> {
        let events = self
            .script
            .iter()
            .map(|&(beat, action)| {
                let frame = config.checked_frames(beat).ok_or(ScheduleError::FrameOverflow {
                    actor: index,
                    beat,
                    scale_speed: config.scale_speed,
                })?;
                Ok(ScheduledEvent::new(frame, action))
            })
            .collect::<Result<Vec<_>, ScheduleError>>()?;
        Ok(ScriptedActor {
            actor: place(self.shape, self.x, self.y, self.rotation, config),
            script: Script::from_events(events),
        })
    }
}

fn place(shape: ShapeKind, dx: i32, dy: i32, rotation: Rotation, config: &AnimationConfig) -> Actor {
    Actor::new(
        shape,
        config.x_start + dx,
        config.y_start + dy,
        config.unit,
        rotation,
    )
}

impl SourceTimeline {
    /// The embedded "A T" logo.
    pub fn reference() -> Result<Self, serde_json::Error> {
        Self::parse(REFERENCE_LOGO)
    }

    pub fn parse(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Resolve beats and offsets against `self.config` and validate the result.
    pub fn build(&self) -> Result<Timeline, ScheduleError> {
        self.config.validate()?;
        let background = self
            .background
            .iter()
            .map(|spec| spec.resolve(&self.config))
            .collect();
        let scripted = self
            .actors
            .iter()
            .enumerate()
            .map(|(index, spec)| spec.resolve(index, &self.config))
            .collect::<Result<Vec<_>, _>>()?;
        Timeline::new(background, scripted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_logo_parses_and_validates() {
        let source = SourceTimeline::reference().unwrap();
        assert_eq!(source.config, AnimationConfig::default());
        assert_eq!(source.background.len(), 8);

        let timeline = source.build().unwrap();
        assert_eq!(timeline.actor_count(), 9);
        assert_eq!(timeline.background().len(), 8);
    }

    #[test]
    fn beats_are_scaled_and_offsets_resolved() {
        let source = SourceTimeline::reference().unwrap();
        let timeline = source.build().unwrap();

        let first = &timeline.scripted()[0];
        assert_eq!((first.actor.x, first.actor.y), (140, 40));
        assert_eq!(first.actor.kind, ShapeKind::T);
        assert_eq!(first.script.frames(ActionKind::MoveDown), &[8, 16]);
        assert_eq!(first.script.stop_frame(), Some(96));

        let last = timeline.scripted().last().unwrap();
        assert_eq!(last.actor.kind, ShapeKind::L);
        assert_eq!(last.script.stop_frame(), Some(648));

        let back = timeline.background()[0];
        assert_eq!((back.x, back.y, back.rotation), (60, 220, Rotation::new(3)));
    }

    #[test]
    fn config_section_overrides_defaults() {
        let json = r#"{
            "config": { "scale_speed": 2, "x_start": 100 },
            "actors": [
                { "shape": "o", "x": 0, "y": 20, "script": [[3, "move_right"], [5, "stop"]] }
            ]
        }"#;
        let timeline = SourceTimeline::parse(json).unwrap().build().unwrap();
        let only = &timeline.scripted()[0];
        assert_eq!(only.actor.x, 100);
        assert_eq!(only.script.frames(ActionKind::MoveRight), &[6]);
        assert_eq!(only.script.stop_frame(), Some(10));
    }

    #[test]
    fn malformed_rotation_is_rejected_at_parse_time() {
        let json = r#"{ "actors": [ { "shape": "T", "x": 0, "y": 0, "rotation": 7, "script": [] } ] }"#;
        assert!(SourceTimeline::parse(json).is_err());
    }

    #[test]
    fn schedule_errors_surface_from_build() {
        let json = r#"{ "actors": [ { "shape": "T", "x": 0, "y": 0, "script": [[4, "rotate"]] } ] }"#;
        let err = SourceTimeline::parse(json).unwrap().build().unwrap_err();
        assert_eq!(err, ScheduleError::StopCount { actor: 0, found: 0 });
    }

    #[test]
    fn oversized_beats_are_reported_not_wrapped() {
        let json = r#"{ "actors": [
            { "shape": "O", "x": 0, "y": 0, "script": [[2, "stop"]] },
            { "shape": "T", "x": 0, "y": 0, "script": [[18446744073709551615, "stop"]] }
        ] }"#;
        let err = SourceTimeline::parse(json).unwrap().build().unwrap_err();
        assert_eq!(
            err,
            ScheduleError::FrameOverflow {
                actor: 1,
                beat: u64::MAX,
                scale_speed: 4,
            }
        );
    }
}
