//! Engine: the host frame loop.
//!
//! Initializes a `Director` from a validated `Timeline` and ticks it once per
//! frame, collecting one `ResolvedScene` per frame along with the frames on
//! which the director changed phase.
//!
//! The engine understands time and choreography. It never deals with
//! terminals, ANSI codes, or grids.

pub mod actor;
pub mod director;
pub mod shapes;
pub mod source;
pub mod timeline;

use tracing::debug;

use crate::config::{AnimationConfig, FIRST_FRAME};
use crate::error::ScheduleError;
use crate::renderer::canvas::SceneCanvas;
use crate::types::{Marker, ResolvedScene};
use director::{Director, Phase};
use timeline::Timeline;

pub struct Compiled {
    pub scenes: Vec<ResolvedScene>,
    /// Scene index where each phase begins.
    pub markers: Vec<Marker>,
}

pub struct Engine;

impl Engine {
    /// Run the whole choreography, from `FIRST_FRAME` through
    /// `config.last_frame()`.
    pub fn compile(timeline: Timeline, config: &AnimationConfig) -> Result<Compiled, ScheduleError> {
        let mut director = Director::new(timeline, config.clone())?;
        let last_frame = config.last_frame();

        let mut scenes = Vec::with_capacity((last_frame + 1 - FIRST_FRAME) as usize);
        let mut markers = Vec::new();
        let mut phase: Option<Phase> = None;

        for frame in FIRST_FRAME..=last_frame {
            let scene = Self::resolve_frame(&mut director, frame, config);
            if phase != Some(director.phase()) {
                phase = Some(director.phase());
                markers.push(Marker {
                    frame_index: scenes.len(),
                    label: director.phase().label().to_string(),
                });
            }
            scenes.push(scene);
        }

        debug!(frames = scenes.len(), markers = markers.len(), "timeline compiled");
        Ok(Compiled { scenes, markers })
    }

    /// Tick the director to `frame` and capture what it draws.
    pub fn resolve_frame(director: &mut Director, frame: u64, config: &AnimationConfig) -> ResolvedScene {
        director.tick(frame);
        let mut canvas = SceneCanvas::new(config.canvas_size, config.canvas_size);
        director.render(&mut canvas);
        canvas.finish()
    }
}
