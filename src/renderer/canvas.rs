//! Canvas: the drawing surface actors and the director paint onto.
//!
//! `Canvas` mirrors an immediate-mode 2D API: a current fill color, a current
//! transform, and a stack for scoped transforms. `SceneCanvas` is the
//! implementation used by the engine; it records every rectangle, already
//! transformed into canvas coordinates, as a `DrawOp`.

use tracing::warn;

use crate::types::{DrawOp, ResolvedScene, Rgb};

pub trait Canvas {
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32);
    fn set_fill(&mut self, color: Rgb);
    /// Restore the default (white) fill.
    fn reset_fill(&mut self);
    fn translate(&mut self, dx: i32, dy: i32);
    /// Rotate clockwise (y points down) by `radians` around the current origin.
    fn rotate(&mut self, radians: f64);
    /// Save the current transform.
    fn push(&mut self);
    /// Restore the most recently saved transform.
    fn pop(&mut self);
}

/// 2D affine transform: `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.tx += self.a * dx + self.c * dy;
        self.ty += self.b * dx + self.d * dy;
    }

    pub fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        let Transform { a, b, c, d, .. } = *self;
        self.a = a * cos + c * sin;
        self.b = b * cos + d * sin;
        self.c = c * cos - a * sin;
        self.d = d * cos - b * sin;
    }

    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.a * x + self.c * y + self.tx,
            self.b * x + self.d * y + self.ty,
        )
    }
}

pub struct SceneCanvas {
    width: u16,
    height: u16,
    fill: Rgb,
    transform: Transform,
    stack: Vec<Transform>,
    ops: Vec<DrawOp>,
}

impl SceneCanvas {
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            fill: Rgb::WHITE,
            transform: Transform::IDENTITY,
            stack: Vec::new(),
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn finish(self) -> ResolvedScene {
        if !self.stack.is_empty() {
            warn!(depth = self.stack.len(), "scene finished with unbalanced push");
        }
        ResolvedScene {
            width: self.width,
            height: self.height,
            ops: self.ops,
        }
    }
}

impl Canvas for SceneCanvas {
    /// Transform all four corners and record their bounding box. Exact for
    /// quarter-turn rotations, which is all the animation uses.
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32) {
        let (x0, y0) = (f64::from(x), f64::from(y));
        let (x1, y1) = (f64::from(x + w), f64::from(y + h));
        let corners = [
            self.transform.apply(x0, y0),
            self.transform.apply(x1, y0),
            self.transform.apply(x1, y1),
            self.transform.apply(x0, y1),
        ];

        let mut min = (i32::MAX, i32::MAX);
        let mut max = (i32::MIN, i32::MIN);
        for (cx, cy) in corners {
            let (cx, cy) = (cx.round() as i32, cy.round() as i32);
            min = (min.0.min(cx), min.1.min(cy));
            max = (max.0.max(cx), max.1.max(cy));
        }

        self.ops.push(DrawOp {
            x: min.0,
            y: min.1,
            w: max.0 - min.0,
            h: max.1 - min.1,
            fill: self.fill,
        });
    }

    fn set_fill(&mut self, color: Rgb) {
        self.fill = color;
    }

    fn reset_fill(&mut self) {
        self.fill = Rgb::WHITE;
    }

    fn translate(&mut self, dx: i32, dy: i32) {
        self.transform.translate(f64::from(dx), f64::from(dy));
    }

    fn rotate(&mut self, radians: f64) {
        self.transform.rotate(radians);
    }

    fn push(&mut self) {
        self.stack.push(self.transform);
    }

    fn pop(&mut self) {
        match self.stack.pop() {
            Some(t) => self.transform = t,
            None => {
                warn!("pop without matching push, resetting transform");
                self.transform = Transform::IDENTITY;
            }
        }
    }
}
