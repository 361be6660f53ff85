//! Renderer: the deterministic rasterizer.
//!
//! Takes `ResolvedScene`s (in-memory, from the engine) and produces a
//! `Recording` of terminal cell frames for the player.
//!
//! The renderer is pure and stateless. Given the same input, it always
//! produces the same output. It knows nothing about time, actors, or
//! choreography.

pub mod canvas;

use crate::config::{AnimationConfig, MAX_BLOCKS};
use crate::types::{Cell, CellChange, Frame, Recording, ResolvedScene, Rgb, Style, TerminalContract};

/// Terminal columns per block; terminal cells are roughly twice as tall as wide.
const COLUMNS_PER_UNIT: u16 = 2;
const BLOCK_CHAR: char = '█';

pub struct Renderer;

impl Renderer {
    /// Terminal size needed to show the whole canvas at one row per block.
    /// A validated config stays within `MAX_BLOCKS`; anything else saturates.
    pub fn contract_for(config: &AnimationConfig) -> TerminalContract {
        let blocks = i32::from(config.canvas_size)
            .checked_div(config.unit)
            .unwrap_or(0)
            .clamp(0, MAX_BLOCKS) as u16;
        TerminalContract {
            width: blocks.saturating_mul(COLUMNS_PER_UNIT),
            height: blocks,
        }
    }

    /// Render a sequence of resolved scenes into a recording.
    ///
    /// The first frame is always a full frame. Subsequent frames are diffs
    /// against the previous frame.
    pub fn render(scenes: &[ResolvedScene], contract: TerminalContract, frame_rate: u32) -> Recording {
        let mut frames = Vec::with_capacity(scenes.len());
        let mut prev_grid: Option<Vec<Vec<Cell>>> = None;

        for scene in scenes {
            let grid = Self::rasterize(scene, &contract);
            let frame = match &prev_grid {
                None => Frame::Full {
                    cells: grid.clone(),
                },
                Some(prev) => Frame::Diff {
                    changes: Self::diff(prev, &grid),
                },
            };
            frames.push(frame);
            prev_grid = Some(grid);
        }

        Recording {
            contract,
            frame_rate,
            frames,
            markers: Vec::new(),
        }
    }

    /// Rasterize a resolved scene onto a fixed-size cell grid.
    ///
    /// Each cell takes the color of the last op covering its centre, so later
    /// draws paint over earlier ones. Black paints an empty cell.
    pub fn rasterize(scene: &ResolvedScene, contract: &TerminalContract) -> Vec<Vec<Cell>> {
        let w = contract.width as usize;
        let h = contract.height as usize;
        let mut grid = vec![vec![Cell::default(); w]; h];
        if w == 0 || h == 0 {
            return grid;
        }

        // Canvas coordinate of the centre of column `i` / row `i`.
        let sample = |i: usize, cells: usize, extent: u16| -> i32 {
            ((2 * i + 1) * extent as usize / (2 * cells)) as i32
        };

        for op in &scene.ops {
            let cell = Self::cell_for(op.fill);
            for (y, row) in grid.iter_mut().enumerate() {
                let py = sample(y, h, scene.height);
                if py < op.y || py >= op.y + op.h {
                    continue;
                }
                for (x, slot) in row.iter_mut().enumerate() {
                    if op.contains(sample(x, w, scene.width), py) {
                        *slot = cell;
                    }
                }
            }
        }

        grid
    }

    fn cell_for(fill: Rgb) -> Cell {
        if fill == Rgb::BLACK {
            Cell::default()
        } else {
            Cell {
                ch: BLOCK_CHAR,
                style: Style::solid(fill),
            }
        }
    }

    /// Compute a cell-level diff between two grids.
    fn diff(prev: &[Vec<Cell>], next: &[Vec<Cell>]) -> Vec<CellChange> {
        let mut changes = Vec::new();
        for (y, (prev_row, next_row)) in prev.iter().zip(next.iter()).enumerate() {
            for (x, (prev_cell, next_cell)) in prev_row.iter().zip(next_row.iter()).enumerate() {
                if prev_cell != next_cell {
                    changes.push(CellChange {
                        x: x as u16,
                        y: y as u16,
                        cell: *next_cell,
                    });
                }
            }
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DrawOp;

    const CONTRACT: TerminalContract = TerminalContract {
        width: 28,
        height: 14,
    };

    fn scene(ops: Vec<DrawOp>) -> ResolvedScene {
        ResolvedScene {
            width: 280,
            height: 280,
            ops,
        }
    }

    fn block(x: i32, y: i32, fill: Rgb) -> DrawOp {
        DrawOp { x, y, w: 20, h: 20, fill }
    }

    #[test]
    fn reference_contract_is_two_columns_per_block() {
        assert_eq!(Renderer::contract_for(&AnimationConfig::default()), CONTRACT);
    }

    #[test]
    fn oversized_playfield_contract_does_not_wrap() {
        let config = AnimationConfig {
            unit: 1,
            canvas_size: 60_000,
            ..Default::default()
        };
        let contract = Renderer::contract_for(&config);
        assert_eq!((contract.width, contract.height), (2048, 1024));
    }

    #[test]
    fn one_block_fills_two_cells() {
        let red = Rgb::new(255, 0, 0);
        let grid = Renderer::rasterize(&scene(vec![block(40, 60, red)]), &CONTRACT);

        let filled: Vec<(usize, usize)> = grid
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter()
                    .enumerate()
                    .filter(|(_, c)| c.ch == BLOCK_CHAR)
                    .map(move |(x, _)| (x, y))
            })
            .collect();
        assert_eq!(filled, vec![(4, 3), (5, 3)]);
        assert_eq!(grid[3][4].style.fg, Some(red));
    }

    #[test]
    fn later_ops_paint_over_earlier_ones() {
        let ops = vec![
            block(0, 0, Rgb::WALL),
            DrawOp { x: 0, y: 0, w: 40, h: 20, fill: Rgb::BLACK },
        ];
        let grid = Renderer::rasterize(&scene(ops), &CONTRACT);
        assert_eq!(grid[0][0], Cell::default());
        assert_eq!(grid[0][3], Cell::default());
    }

    #[test]
    fn ops_outside_the_canvas_are_clipped() {
        let grid = Renderer::rasterize(&scene(vec![block(-40, 300, Rgb::WHITE)]), &CONTRACT);
        assert!(grid.iter().flatten().all(|c| *c == Cell::default()));
    }

    #[test]
    fn first_frame_is_full_then_diffs() {
        let scenes = vec![
            scene(vec![block(0, 0, Rgb::WALL)]),
            scene(vec![block(0, 0, Rgb::WALL)]),
            scene(vec![block(0, 20, Rgb::WALL)]),
        ];
        let recording = Renderer::render(&scenes, CONTRACT, 60);

        assert_eq!(recording.frames.len(), 3);
        assert_eq!(recording.frame_rate, 60);
        assert!(matches!(recording.frames[0], Frame::Full { .. }));
        match &recording.frames[1] {
            Frame::Diff { changes } => assert!(changes.is_empty()),
            other => panic!("expected diff, got {other:?}"),
        }
        match &recording.frames[2] {
            // Two cells cleared on row 0, two painted on row 1.
            Frame::Diff { changes } => assert_eq!(changes.len(), 4),
            other => panic!("expected diff, got {other:?}"),
        }
    }
}
