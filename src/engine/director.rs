//! Director: the frame-driven state machine behind the animation.
//!
//! Each tick advances the active actor through its script, promotes finished
//! actors, and drives the two closing effects: the widening erase band that
//! clears the supporting rows, then the one-shot drop of the settled actors.

use tracing::{debug, info, warn};

use crate::config::AnimationConfig;
use crate::error::ScheduleError;
use crate::renderer::canvas::Canvas;
use crate::types::Rgb;

use super::actor::Actor;
use super::timeline::{Scheduler, Timeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Scripted actors remain.
    Spawning,
    /// Every actor has finished; the clear has not started yet.
    Waiting,
    /// The erase band is growing over the bottom rows.
    Clearing,
    /// The settle drop has been applied. Terminal.
    Settled,
}

impl Phase {
    pub fn label(self) -> &'static str {
        match self {
            Phase::Spawning => "spawning",
            Phase::Waiting => "waiting",
            Phase::Clearing => "clearing",
            Phase::Settled => "settled",
        }
    }
}

/// The black band drawn over the background during the clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

pub struct Director {
    config: AnimationConfig,
    scheduler: Scheduler,
    queue: Vec<Actor>,
    settled: Vec<Actor>,
    background: Vec<Actor>,
    /// Half-width of the erase band.
    clear_width: i32,
    erase: Option<EraseRect>,
    /// Set on the tick that promotes the active actor, which is then drawn
    /// from its new list only.
    promoted: bool,
    settle_applied: bool,
    last_frame: Option<u64>,
}

impl Director {
    pub fn new(timeline: Timeline, config: AnimationConfig) -> Result<Self, ScheduleError> {
        config.validate()?;

        let (background, scripted) = timeline.into_parts();
        let (queue, scripts): (Vec<_>, Vec<_>) =
            scripted.into_iter().map(|s| (s.actor, s.script)).unzip();

        debug!(
            actors = queue.len(),
            background = background.len(),
            "director initialized"
        );

        Ok(Self {
            scheduler: Scheduler::new(scripts, config.auto_drop_period()),
            clear_width: config.clear_initial_width,
            config,
            settled: Vec::with_capacity(queue.len()),
            queue,
            background,
            erase: None,
            promoted: false,
            settle_applied: false,
            last_frame: None,
        })
    }

    /// Advance the animation to `frame`. Frames must increase; a stale or
    /// repeated frame is ignored.
    pub fn tick(&mut self, frame: u64) {
        if let Some(last) = self.last_frame {
            if frame <= last {
                warn!(frame, last, "ignoring non-increasing frame");
                return;
            }
        }
        self.last_frame = Some(frame);
        self.promoted = false;

        self.step_active(frame);
        self.step_clear(frame);
    }

    fn step_active(&mut self, frame: u64) {
        let index = self.scheduler.active();
        let Some(actor) = self.queue.get_mut(index) else {
            return;
        };

        if self.scheduler.auto_drop_due(frame) {
            actor.move_drop();
        }

        let due = self.scheduler.due_actions(frame);
        for action in due.moves() {
            action.apply(actor);
        }
        if !due.stop() {
            return;
        }

        let actor = *actor;
        if index + 1 < self.queue.len() {
            debug!(frame, index, kind = ?actor.kind, x = actor.x, y = actor.y, "actor settled");
            self.settled.push(actor);
        } else {
            debug!(frame, index, kind = ?actor.kind, "final actor joins the background");
            self.background.push(actor);
        }
        self.scheduler.advance();
        self.promoted = true;
    }

    fn step_clear(&mut self, frame: u64) {
        self.erase = None;
        let (start, end) = (self.config.clear_start(), self.config.clear_end());

        if frame < end {
            if frame > start {
                if frame == start + 1 {
                    info!(frame, "clearing started");
                }
                self.erase = Some(EraseRect {
                    x: self.config.x_start - self.clear_width,
                    y: self.config.clear_band_y,
                    w: 2 * self.clear_width,
                    h: self.config.clear_band_height,
                });
                if frame % self.config.clear_step() == 0 {
                    self.clear_width += self.config.clear_growth;
                }
            }
        } else if !self.settle_applied && frame > end {
            for actor in &mut self.settled {
                actor.y += self.config.settle_drop;
            }
            self.settle_applied = true;
            info!(frame, actors = self.settled.len(), "settled actors dropped");
        }
    }

    /// Draw the current frame: walls, the active actor, settled actors,
    /// the background while it is still shown, and the erase band.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.render_walls(canvas);

        if !self.promoted {
            if let Some(actor) = self.active_actor() {
                actor.render(canvas);
            }
        }

        for actor in &self.settled {
            actor.render(canvas);
        }

        if self.background_visible() {
            for actor in &self.background {
                actor.render(canvas);
            }
        }

        if let Some(erase) = self.erase {
            canvas.set_fill(Rgb::BLACK);
            canvas.fill_rect(erase.x, erase.y, erase.w, erase.h);
            canvas.reset_fill();
        }
    }

    fn render_walls(&self, canvas: &mut dyn Canvas) {
        let config = &self.config;
        let unit = config.unit;

        canvas.set_fill(Rgb::WALL);
        for row in 0..config.wall_height() {
            let y = config.y_start + unit * row;
            canvas.fill_rect(config.left_wall_x(), y, unit, unit);
            canvas.fill_rect(config.right_wall_x(), y, unit, unit);
        }
        for col in 0..config.floor_width() {
            let x = config.left_wall_x() + unit * (col + 1);
            canvas.fill_rect(x, config.floor_y(), unit, unit);
        }
        canvas.reset_fill();
    }

    // -----------------------------------------------------------------------
    // Inspection
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        if self.settle_applied {
            Phase::Settled
        } else if self.last_frame.is_some_and(|f| f > self.config.clear_start()) {
            Phase::Clearing
        } else if !self.scheduler.is_finished() {
            Phase::Spawning
        } else {
            Phase::Waiting
        }
    }

    /// Index of the actor currently following its script; equals
    /// `actor_count()` once every actor has finished.
    pub fn active_index(&self) -> usize {
        self.scheduler.active()
    }

    pub fn active_actor(&self) -> Option<&Actor> {
        self.queue.get(self.scheduler.active())
    }

    pub fn actor_count(&self) -> usize {
        self.queue.len()
    }

    pub fn settled(&self) -> &[Actor] {
        &self.settled
    }

    pub fn background(&self) -> &[Actor] {
        &self.background
    }

    pub fn background_visible(&self) -> bool {
        self.last_frame
            .is_none_or(|f| f < self.config.clear_end())
    }

    /// Current half-width of the erase band.
    pub fn clear_width(&self) -> i32 {
        self.clear_width
    }

    /// The erase band drawn on the last tick, if any.
    pub fn erase_rect(&self) -> Option<EraseRect> {
        self.erase
    }

    pub fn last_frame(&self) -> Option<u64> {
        self.last_frame
    }
}
