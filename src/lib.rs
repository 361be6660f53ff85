//! Tetromino logo animation.
//!
//! Falling tetrominoes assemble a pair of initials, the supporting rows are
//! cleared, and the initials drop to rest. The choreography is a fixed,
//! frame-indexed timeline: `engine` plays it, `renderer` rasterizes it and
//! `player` shows it in the terminal.

pub mod config;
pub mod engine;
pub mod error;
pub mod player;
pub mod renderer;
pub mod types;
