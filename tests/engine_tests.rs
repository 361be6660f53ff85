//! Engine + renderer tests - the full compile → rasterize pipeline, no terminal.

use tetromino_logo::config::AnimationConfig;
use tetromino_logo::engine::source::SourceTimeline;
use tetromino_logo::engine::Engine;
use tetromino_logo::renderer::Renderer;
use tetromino_logo::types::{Cell, Frame, Rgb};

fn compile_reference() -> (tetromino_logo::engine::Compiled, AnimationConfig) {
    let source = SourceTimeline::reference().unwrap();
    let timeline = source.build().unwrap();
    let compiled = Engine::compile(timeline, &source.config).unwrap();
    (compiled, source.config)
}

#[test]
fn test_one_scene_per_frame() -> anyhow::Result<()> {
    let source = SourceTimeline::reference()?;
    let compiled = Engine::compile(source.build()?, &source.config)?;
    assert_eq!(source.config.last_frame(), 704 + 1 + 120);
    assert_eq!(compiled.scenes.len(), source.config.last_frame() as usize);
    Ok(())
}

#[test]
fn test_markers_follow_phase_changes() {
    let (compiled, _) = compile_reference();
    let markers: Vec<(usize, &str)> = compiled
        .markers
        .iter()
        .map(|m| (m.frame_index, m.label.as_str()))
        .collect();
    // Scene index = frame - 1.
    assert_eq!(
        markers,
        vec![(0, "spawning"), (647, "waiting"), (656, "clearing"), (704, "settled")]
    );
}

#[test]
fn test_recording_starts_full_then_diffs() {
    let (compiled, config) = compile_reference();
    let contract = Renderer::contract_for(&config);
    let recording = Renderer::render(&compiled.scenes, contract, config.frame_rate);

    assert_eq!(recording.frames.len(), compiled.scenes.len());
    assert!(matches!(recording.frames[0], Frame::Full { .. }));
    assert!(recording.frames[1..]
        .iter()
        .all(|f| matches!(f, Frame::Diff { .. })));
}

#[test]
fn test_walls_survive_to_the_last_frame() {
    let (compiled, config) = compile_reference();
    let contract = Renderer::contract_for(&config);
    let last = compiled.scenes.last().unwrap();
    let grid = Renderer::rasterize(last, &contract);

    let wall = Cell {
        ch: '█',
        style: tetromino_logo::types::Style::solid(Rgb::WALL),
    };
    for row in &grid {
        assert_eq!(row[0], wall);
        assert_eq!(row[27], wall);
    }
    assert!(grid[13].iter().all(|c| *c == wall));
}

#[test]
fn test_bottom_rows_are_blank_while_clearing_wide() {
    let (compiled, config) = compile_reference();
    let contract = Renderer::contract_for(&config);
    // Frame 703: the band spans x 20..260, i.e. everything between the walls.
    let scene = &compiled.scenes[702];
    let grid = Renderer::rasterize(scene, &contract);

    for row in &grid[10..13] {
        assert!(row[2..26].iter().all(|c| *c == Cell::default()));
    }
}
