//! Shared boundary types for the logo animation.
//!
//! This module defines the two key data contracts:
//! - Director → Rasterizer (in-memory): `ResolvedScene` containing `DrawOp`s
//! - Rasterizer → Player: `Recording` containing `Frame`s

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shared style primitives
// ---------------------------------------------------------------------------

/// 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const WALL: Rgb = Rgb::gray(200);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self { r: v, g: v, b: v }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fg: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bg: Option<Rgb>,
}

impl Style {
    pub fn is_default(&self) -> bool {
        self.fg.is_none() && self.bg.is_none()
    }

    pub fn solid(color: Rgb) -> Self {
        Style {
            fg: Some(color),
            bg: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Director → Rasterizer boundary (in-memory only, never serialized)
// ---------------------------------------------------------------------------

/// An axis-aligned filled rectangle in canvas units, already transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawOp {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
    pub fill: Rgb,
}

impl DrawOp {
    pub fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }
}

/// Everything drawn during one frame, in draw order.
#[derive(Debug, Clone)]
pub struct ResolvedScene {
    pub width: u16,
    pub height: u16,
    pub ops: Vec<DrawOp>,
}

// ---------------------------------------------------------------------------
// Rasterizer → Player boundary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalContract {
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub ch: char,
    #[serde(default, skip_serializing_if = "Style::is_default")]
    pub style: Style,
}

impl Default for Cell {
    fn default() -> Self {
        Cell {
            ch: ' ',
            style: Style::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellChange {
    pub x: u16,
    pub y: u16,
    pub cell: Cell,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Frame {
    Full { cells: Vec<Vec<Cell>> },
    Diff { changes: Vec<CellChange> },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marker {
    pub frame_index: usize,
    pub label: String,
}

/// A fully rasterized animation, ready for playback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recording {
    pub contract: TerminalContract,
    pub frame_rate: u32,
    pub frames: Vec<Frame>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub markers: Vec<Marker>,
}

impl Recording {
    /// Label of the most recent marker at or before `frame_index`.
    pub fn marker_at(&self, frame_index: usize) -> Option<&str> {
        self.markers
            .iter()
            .take_while(|m| m.frame_index <= frame_index)
            .last()
            .map(|m| m.label.as_str())
    }
}
