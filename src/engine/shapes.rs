//! Shape catalog: the seven tetromino layouts.
//!
//! Each shape is four unit-sized squares laid out around the actor's pivot.
//! Offsets are in units; multiply by the unit size to get canvas coordinates.

use serde::{Deserialize, Serialize};

use crate::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    #[serde(alias = "i")]
    I,
    #[serde(alias = "s")]
    S,
    #[serde(alias = "z")]
    Z,
    #[serde(alias = "t")]
    T,
    #[serde(alias = "o")]
    O,
    #[serde(alias = "j")]
    J,
    #[serde(alias = "l")]
    L,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 7] = [
        ShapeKind::I,
        ShapeKind::S,
        ShapeKind::Z,
        ShapeKind::T,
        ShapeKind::O,
        ShapeKind::J,
        ShapeKind::L,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    /// Top-left corners of the four squares, in units, relative to the pivot.
    pub cells: [(i32, i32); 4],
    pub color: Rgb,
}

impl Shape {
    /// The four squares as `(x, y, w, h)` rectangles in canvas units.
    pub fn rects(&self, unit: i32) -> impl Iterator<Item = (i32, i32, i32, i32)> + '_ {
        self.cells
            .iter()
            .map(move |&(cx, cy)| (cx * unit, cy * unit, unit, unit))
    }
}

const I_SHAPE: Shape = Shape {
    cells: [(-1, -2), (-1, -1), (-1, 0), (-1, 1)],
    color: Rgb::new(0, 255, 255),
};

const S_SHAPE: Shape = Shape {
    cells: [(-2, -2), (-2, -1), (-1, 0), (-1, -1)],
    color: Rgb::new(255, 0, 0),
};

const Z_SHAPE: Shape = Shape {
    cells: [(-1, -2), (-2, -1), (-2, 0), (-1, -1)],
    color: Rgb::new(0, 255, 0),
};

const T_SHAPE: Shape = Shape {
    cells: [(-1, -2), (-2, -1), (-1, 0), (-1, -1)],
    color: Rgb::new(160, 0, 255),
};

const O_SHAPE: Shape = Shape {
    cells: [(0, -1), (0, 0), (-1, 0), (-1, -1)],
    color: Rgb::new(255, 255, 0),
};

const J_SHAPE: Shape = Shape {
    cells: [(0, -2), (-1, -2), (-1, -1), (-1, 0)],
    color: Rgb::new(0, 0, 255),
};

const L_SHAPE: Shape = Shape {
    cells: [(-2, -2), (-1, -2), (-1, -1), (-1, 0)],
    color: Rgb::new(255, 160, 0),
};

pub fn shape_for(kind: ShapeKind) -> &'static Shape {
    match kind {
        ShapeKind::I => &I_SHAPE,
        ShapeKind::S => &S_SHAPE,
        ShapeKind::Z => &Z_SHAPE,
        ShapeKind::T => &T_SHAPE,
        ShapeKind::O => &O_SHAPE,
        ShapeKind::J => &J_SHAPE,
        ShapeKind::L => &L_SHAPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_shape_has_four_distinct_cells() {
        for kind in ShapeKind::ALL {
            let cells: HashSet<_> = shape_for(kind).cells.iter().collect();
            assert_eq!(cells.len(), 4, "{kind:?}");
        }
    }

    #[test]
    fn rects_scale_by_unit() {
        let rects: Vec<_> = shape_for(ShapeKind::O).rects(20).collect();
        assert_eq!(
            rects,
            vec![(0, -20, 20, 20), (0, 0, 20, 20), (-20, 0, 20, 20), (-20, -20, 20, 20)]
        );
    }

    #[test]
    fn i_shape_is_a_vertical_bar() {
        let shape = shape_for(ShapeKind::I);
        assert!(shape.cells.iter().all(|&(x, _)| x == -1));
        assert_eq!(shape.color, Rgb::new(0, 255, 255));
    }

    #[test]
    fn kinds_deserialize_from_either_case() {
        let kinds: Vec<ShapeKind> = serde_json::from_str(r#"["T", "l", "o"]"#).unwrap();
        assert_eq!(kinds, vec![ShapeKind::T, ShapeKind::L, ShapeKind::O]);
    }
}
