//! Player: the runtime playback controller.
//!
//! Consumes a `Recording` and drives it to the terminal at the recording's
//! frame rate. The player does not interpret the choreography; it treats the
//! recording as an immutable visual script. Keys only control playback.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::{cursor, event, execute, queue, style, terminal};
use tracing::debug;

use crate::types::{Cell, Frame, Recording, Style};

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

/// Binding strings: a single character (`"q"`) or a named key (`"Esc"`,
/// `"Space"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBindings {
    pub quit: Vec<String>,
    pub pause: String,
    pub replay: String,
}

impl Default for KeyBindings {
    fn default() -> Self {
        KeyBindings {
            quit: vec!["q".into(), "Esc".into()],
            pause: "Space".into(),
            replay: "r".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    TogglePause,
    Replay,
    Quit,
}

impl KeyBindings {
    pub fn control_for(&self, key: &KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Control::Quit;
        }
        if self.quit.iter().any(|b| matches_binding(b, key)) {
            Control::Quit
        } else if matches_binding(&self.pause, key) {
            Control::TogglePause
        } else if matches_binding(&self.replay, key) {
            Control::Replay
        } else {
            Control::Continue
        }
    }
}

/// Check whether a crossterm `KeyEvent` matches a binding string.
pub fn matches_binding(binding: &str, event: &KeyEvent) -> bool {
    if event.modifiers.contains(KeyModifiers::CONTROL)
        || event.modifiers.contains(KeyModifiers::ALT)
    {
        return false;
    }

    match binding {
        "Esc" => event.code == KeyCode::Esc,
        "Enter" => event.code == KeyCode::Enter,
        "Space" => event.code == KeyCode::Char(' '),
        s => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => event.code == KeyCode::Char(c),
                _ => false,
            }
        }
    }
}

pub struct Player {
    recording: Recording,
    bindings: KeyBindings,
    current_frame: usize,
    grid: Vec<Vec<Cell>>,
    paused: bool,
}

impl Player {
    pub fn new(recording: Recording) -> Self {
        let w = recording.contract.width as usize;
        let h = recording.contract.height as usize;
        Self {
            recording,
            bindings: KeyBindings::default(),
            current_frame: 0,
            grid: vec![vec![Cell::default(); w]; h],
            paused: false,
        }
    }

    /// Play the recording in the terminal.
    ///
    /// Sets up the terminal, enters the frame loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        if self.recording.frames.is_empty() {
            bail!("Nothing to play: the recording has no frames");
        }

        let (term_w, term_h) = terminal::size()?;
        let need_w = self.recording.contract.width;
        let need_h = self.recording.contract.height;
        // +2: one row for menu bar, one row for status bar
        if term_w < need_w || term_h < need_h + 2 {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                need_w,
                need_h + 2,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Frame loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.rebuild_grid(0);
        self.render_menubar(stdout)?;
        self.render_full(stdout)?;
        self.render_status(stdout)?;

        let frame_time = Duration::from_secs(1) / self.recording.frame_rate.max(1);
        let mut deadline = Instant::now() + frame_time;

        loop {
            let timeout = deadline.saturating_duration_since(Instant::now());
            if event::poll(timeout)? {
                match event::read()? {
                    event::Event::Key(key) => match self.bindings.control_for(&key) {
                        Control::Quit => break,
                        Control::TogglePause => {
                            self.paused = !self.paused;
                            self.render_status(stdout)?;
                        }
                        Control::Replay => {
                            debug!("replaying from the first frame");
                            self.current_frame = 0;
                            self.paused = false;
                            self.rebuild_grid(0);
                            self.render_full(stdout)?;
                            self.render_status(stdout)?;
                        }
                        Control::Continue => {}
                    },
                    event::Event::Resize(_, _) => {
                        execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                        self.render_menubar(stdout)?;
                        self.render_full(stdout)?;
                        self.render_status(stdout)?;
                    }
                    _ => {}
                }
                continue;
            }

            // Never try to catch up on frames missed while handling input.
            deadline = (deadline + frame_time).max(Instant::now());

            let last = self.recording.frames.len() - 1;
            if !self.paused && self.current_frame < last {
                self.current_frame += 1;
                self.apply_frame(self.current_frame);
                self.render_diff(stdout, self.current_frame)?;
                self.render_status(stdout)?;
            }
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Grid management
    // -----------------------------------------------------------------------

    fn apply_frame(&mut self, index: usize) {
        match &self.recording.frames[index] {
            Frame::Full { cells } => {
                self.grid = cells.clone();
            }
            Frame::Diff { changes } => {
                for change in changes {
                    let x = change.x as usize;
                    let y = change.y as usize;
                    if y < self.grid.len() && x < self.grid[y].len() {
                        self.grid[y][x] = change.cell;
                    }
                }
            }
        }
    }

    fn rebuild_grid(&mut self, target: usize) {
        let w = self.recording.contract.width as usize;
        let h = self.recording.contract.height as usize;
        self.grid = vec![vec![Cell::default(); w]; h];
        for i in 0..=target {
            self.apply_frame(i);
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let items: &[&str] = &["[Space] pause", "[r] replay", "[q][Esc] quit"];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_menu_item(stdout, item)?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_full(&self, stdout: &mut io::Stdout) -> Result<()> {
        for (y, row) in self.grid.iter().enumerate() {
            queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
            for cell in row {
                let cs = to_content_style(&cell.style);
                queue!(
                    stdout,
                    style::PrintStyledContent(style::StyledContent::new(cs, cell.ch))
                )?;
            }
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_diff(&self, stdout: &mut io::Stdout, frame_index: usize) -> Result<()> {
        match &self.recording.frames[frame_index] {
            Frame::Diff { changes } => {
                for change in changes {
                    let cs = to_content_style(&change.cell.style);
                    queue!(
                        stdout,
                        cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                        style::PrintStyledContent(style::StyledContent::new(cs, change.cell.ch)),
                    )?;
                }
                stdout.flush()?;
            }
            Frame::Full { .. } => {
                self.render_full(stdout)?;
            }
        }
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let status_y = self.recording.contract.height + CANVAS_OFFSET;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let total = self.recording.frames.len();
        let phase = self.recording.marker_at(self.current_frame).unwrap_or("");
        let paused = if self.paused { " | paused" } else { "" };
        let status = format!(" Frame {}/{} | {phase}{paused} ", self.current_frame + 1, total);

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Print a menu item string, bolding any text inside `[...]` brackets.
/// Text outside brackets is printed dim.
fn print_menu_item(out: &mut impl Write, item: &str) -> Result<()> {
    let mut rest = item;
    while let Some(open) = rest.find('[') {
        let Some(close) = rest[open..].find(']').map(|c| open + c) else {
            break;
        };
        if open > 0 {
            print_dim(out, &rest[..open])?;
        }
        queue!(
            out,
            style::SetAttribute(style::Attribute::Bold),
            style::Print(&rest[open..=close]),
            style::SetAttribute(style::Attribute::Reset),
        )?;
        rest = &rest[close + 1..];
    }
    if !rest.is_empty() {
        print_dim(out, rest)?;
    }
    Ok(())
}

fn print_dim(out: &mut impl Write, text: &str) -> Result<()> {
    queue!(
        out,
        style::SetAttribute(style::Attribute::Dim),
        style::Print(text),
        style::SetAttribute(style::Attribute::Reset),
    )?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

pub fn to_content_style(s: &Style) -> style::ContentStyle {
    let mut cs = style::ContentStyle::default();
    if let Some(fg) = s.fg {
        cs.foreground_color = Some(style::Color::Rgb {
            r: fg.r,
            g: fg.g,
            b: fg.b,
        });
    }
    if let Some(bg) = s.bg {
        cs.background_color = Some(style::Color::Rgb {
            r: bg.r,
            g: bg.g,
            b: bg.b,
        });
    }
    cs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CellChange, Rgb, TerminalContract};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(bindings.control_for(&press(KeyCode::Char('q'))), Control::Quit);
        assert_eq!(bindings.control_for(&press(KeyCode::Esc)), Control::Quit);
        assert_eq!(bindings.control_for(&press(KeyCode::Char(' '))), Control::TogglePause);
        assert_eq!(bindings.control_for(&press(KeyCode::Char('r'))), Control::Replay);
        assert_eq!(bindings.control_for(&press(KeyCode::Char('x'))), Control::Continue);
        assert_eq!(
            bindings.control_for(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Control::Quit
        );
    }

    #[test]
    fn modified_keys_do_not_match_plain_bindings() {
        let event = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::ALT);
        assert!(!matches_binding("r", &event));
        assert!(!matches_binding("rr", &press(KeyCode::Char('r'))));
    }

    #[test]
    fn rebound_keys_replace_the_defaults() {
        let bindings = KeyBindings {
            replay: "R".into(),
            ..Default::default()
        };
        assert_eq!(bindings.control_for(&press(KeyCode::Char('R'))), Control::Replay);
        assert_eq!(bindings.control_for(&press(KeyCode::Char('r'))), Control::Continue);
        assert_eq!(bindings.control_for(&press(KeyCode::Char(' '))), Control::TogglePause);
    }

    #[test]
    fn menu_item_prints_every_character() {
        let mut out = Vec::new();
        print_menu_item(&mut out, "[q][Esc] quit").unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("[q]"));
        assert!(text.contains("[Esc]"));
        assert!(text.contains(" quit"));
    }

    #[test]
    fn replaying_diffs_rebuilds_the_grid() {
        let red = Cell {
            ch: '█',
            style: Style::solid(Rgb::new(255, 0, 0)),
        };
        let recording = Recording {
            contract: TerminalContract { width: 2, height: 1 },
            frame_rate: 60,
            frames: vec![
                Frame::Full {
                    cells: vec![vec![Cell::default(); 2]],
                },
                Frame::Diff {
                    changes: vec![CellChange { x: 1, y: 0, cell: red }],
                },
            ],
            markers: vec![],
        };
        let mut player = Player::new(recording);
        player.rebuild_grid(1);
        assert_eq!(player.grid, vec![vec![Cell::default(), red]]);
        player.rebuild_grid(0);
        assert_eq!(player.grid, vec![vec![Cell::default(); 2]]);
    }
}
