use thiserror::Error;

use crate::engine::timeline::ActionKind;

/// Construction-time schedule and configuration errors.
///
/// None of these can surface during a tick: a timeline that fails validation
/// never reaches the director.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("actor {actor} has {found} stop events, expected exactly one")]
    StopCount { actor: usize, found: usize },

    #[error("actor {actor}: {action} at frame {frame} comes before the previous {action} at frame {previous}")]
    OutOfOrder {
        actor: usize,
        action: ActionKind,
        frame: u64,
        previous: u64,
    },

    #[error("actor {actor}: {action} scheduled at frame {frame} applies at frame {applied}, after the actor stops at frame {stop}")]
    AfterStop {
        actor: usize,
        action: ActionKind,
        frame: u64,
        /// The tick that would consume the event once earlier same-kind
        /// events have been applied.
        applied: u64,
        stop: u64,
    },

    #[error("actor {actor}: {action} at frame {frame} is not after the previous actor stops at frame {previous_stop}")]
    BeforeSpawn {
        actor: usize,
        action: ActionKind,
        frame: u64,
        previous_stop: u64,
    },

    #[error("actor {actor}: beat {beat} does not fit the frame counter at scale {scale_speed}")]
    FrameOverflow {
        actor: usize,
        beat: u64,
        scale_speed: u64,
    },

    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },
}
