use std::f64::consts::FRAC_PI_2;

use serde::{Deserialize, Serialize};

use crate::renderer::canvas::Canvas;

use super::shapes::{shape_for, ShapeKind};

/// Quarter-turn rotation state, always in `0..4`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rotation(u8);

impl Rotation {
    pub const fn new(quarter_turns: u8) -> Self {
        Rotation(quarter_turns % 4)
    }

    pub fn quarter_turns(self) -> u8 {
        self.0
    }

    pub fn next(self) -> Self {
        Rotation((self.0 + 1) % 4)
    }

    pub fn radians(self) -> f64 {
        f64::from(self.0) * FRAC_PI_2
    }
}

impl TryFrom<u8> for Rotation {
    type Error = String;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        if v < 4 {
            Ok(Rotation(v))
        } else {
            Err(format!("rotation must be 0..=3, got {v}"))
        }
    }
}

impl From<Rotation> for u8 {
    fn from(r: Rotation) -> u8 {
        r.0
    }
}

/// A positioned, rotatable tetromino.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub x: i32,
    pub y: i32,
    pub rotation: Rotation,
    pub unit: i32,
    pub kind: ShapeKind,
}

impl Actor {
    pub fn new(kind: ShapeKind, x: i32, y: i32, unit: i32, rotation: Rotation) -> Self {
        Self {
            x,
            y,
            rotation,
            unit,
            kind,
        }
    }

    pub fn advance_rotation(&mut self) {
        self.rotation = self.rotation.next();
    }

    pub fn move_left(&mut self) {
        self.x -= self.unit;
    }

    pub fn move_right(&mut self) {
        self.x += self.unit;
    }

    pub fn move_drop(&mut self) {
        self.y += self.unit;
    }

    /// Draw the shape rotated about the actor's own position.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        let shape = shape_for(self.kind);

        canvas.push();
        canvas.translate(self.x, self.y);
        canvas.rotate(self.rotation.radians());
        canvas.set_fill(shape.color);
        for (x, y, w, h) in shape.rects(self.unit) {
            canvas.fill_rect(x, y, w, h);
        }
        canvas.reset_fill();
        canvas.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::canvas::SceneCanvas;
    use crate::types::Rgb;

    fn t_block() -> Actor {
        Actor::new(ShapeKind::T, 140, 40, 20, Rotation::default())
    }

    #[test]
    fn rotation_cycles_through_four_states() {
        let mut actor = t_block();
        let seen: Vec<u8> = (0..9)
            .map(|_| {
                actor.advance_rotation();
                actor.rotation.quarter_turns()
            })
            .collect();
        assert_eq!(seen, vec![1, 2, 3, 0, 1, 2, 3, 0, 1]);
    }

    #[test]
    fn rotation_rejects_out_of_range_values() {
        assert!(Rotation::try_from(4).is_err());
        assert_eq!(Rotation::try_from(3), Ok(Rotation::new(3)));
        assert_eq!(Rotation::new(5), Rotation::new(1));
    }

    #[test]
    fn moves_are_one_unit_and_compose() {
        let mut actor = t_block();
        actor.move_left();
        actor.move_left();
        actor.move_right();
        actor.move_drop();
        actor.move_drop();
        actor.move_drop();
        assert_eq!((actor.x, actor.y), (120, 100));
    }

    #[test]
    fn render_draws_four_colored_squares_and_leaves_actor_untouched() {
        let actor = Actor::new(ShapeKind::O, 100, 100, 20, Rotation::new(1));
        let before = actor;
        let mut canvas = SceneCanvas::new(280, 280);
        actor.render(&mut canvas);
        canvas.fill_rect(0, 0, 20, 20);

        let scene = canvas.finish();
        assert_eq!(scene.ops.len(), 5);
        assert!(scene.ops[..4].iter().all(|op| op.fill == Rgb::new(255, 255, 0)));
        // Fill and transform are restored after the actor is drawn.
        assert_eq!(scene.ops[4].fill, Rgb::WHITE);
        assert_eq!((scene.ops[4].x, scene.ops[4].y), (0, 0));
        assert_eq!(actor, before);
    }

    #[test]
    fn quarter_turn_rotates_about_the_pivot() {
        let actor = Actor::new(ShapeKind::I, 100, 100, 20, Rotation::new(1));
        let mut canvas = SceneCanvas::new(280, 280);
        actor.render(&mut canvas);

        // Upright the I bar occupies x 80..100; turned it lies along y 80..100.
        let scene = canvas.finish();
        assert!(scene.ops.iter().all(|op| op.y == 80 && op.h == 20));
        let mut xs: Vec<i32> = scene.ops.iter().map(|op| op.x).collect();
        xs.sort();
        assert_eq!(xs, vec![60, 80, 100, 120]);
    }
}
