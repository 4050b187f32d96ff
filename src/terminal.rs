//! Terminal presentation for the racer.
//!
//! Renders the framebuffer with upper-half-block cells (two pixels per
//! character cell) and turns crossterm key events into per-frame input.
//! Terminals only report key presses and auto-repeat, never releases, so a
//! key counts as held for a short window after its last event.

use crate::data::{InputState, Rgb, SKY};
use crate::game::Game;
use crate::raster::FrameBuffer;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::io::{self, Stdout, Write};
use std::time::{Duration, Instant};

pub const DEFAULT_KEY_HOLD_MS: u64 = 150;

/// Rows reserved below the road for the HUD
const HUD_ROWS: u16 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    const ALL: [Key; 4] = [Key::Left, Key::Right, Key::Up, Key::Down];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Keyboard state rebuilt from press/repeat events
#[derive(Debug, Clone)]
pub struct KeyboardState {
    hold: Duration,
    last_seen: [Option<Instant>; 4],
    just_pressed: [bool; 4],
    restart: bool,
    quit: bool,
}

impl KeyboardState {
    pub fn new(hold: Duration) -> Self {
        Self {
            hold,
            last_seen: [None; 4],
            just_pressed: [false; 4],
            restart: false,
            quit: false,
        }
    }

    fn is_held(&self, key: Key, now: Instant) -> bool {
        self.last_seen[key.slot()]
            .is_some_and(|seen| now.saturating_duration_since(seen) <= self.hold)
    }

    pub fn handle_key(&mut self, event: KeyEvent, now: Instant) {
        if event.kind == KeyEventKind::Release {
            return;
        }

        let key = match event.code {
            KeyCode::Left | KeyCode::Char('a') => Key::Left,
            KeyCode::Right | KeyCode::Char('d') => Key::Right,
            KeyCode::Up | KeyCode::Char('w') => Key::Up,
            KeyCode::Down | KeyCode::Char('s') => Key::Down,
            KeyCode::Char('r') => {
                self.restart = true;
                return;
            }
            KeyCode::Char('q') | KeyCode::Esc => {
                self.quit = true;
                return;
            }
            KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => {
                self.quit = true;
                return;
            }
            _ => return,
        };

        if !self.is_held(key, now) {
            self.just_pressed[key.slot()] = true;
        }
        self.last_seen[key.slot()] = Some(now);
    }

    /// Input for the frame starting at `now`. Edge-triggered flags are consumed.
    pub fn sample(&mut self, now: Instant) -> InputState {
        let input = InputState {
            left: self.is_held(Key::Left, now),
            right: self.is_held(Key::Right, now),
            up: self.is_held(Key::Up, now),
            down: self.is_held(Key::Down, now),
            left_pressed: self.just_pressed[Key::Left.slot()],
            right_pressed: self.just_pressed[Key::Right.slot()],
            restart: self.restart,
        };
        for key in Key::ALL {
            self.just_pressed[key.slot()] = false;
        }
        self.restart = false;
        input
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl Default for KeyboardState {
    fn default() -> Self {
        Self::new(Duration::from_millis(DEFAULT_KEY_HOLD_MS))
    }
}

pub fn hud_text(game: &Game) -> String {
    let player = game.player();
    if game.is_game_over() {
        format!(
            " GAME OVER  Score: {:.0}  [r] restart  [q] quit",
            player.score
        )
    } else {
        format!(
            " Score: {:.0}  Lives: {}  Speed: {:>3.0}  [arrows/WASD] drive  [q] quit",
            player.score, player.lives, player.speed
        )
    }
}

fn to_color(rgb: Rgb) -> Color {
    Color::Rgb {
        r: rgb.r,
        g: rgb.g,
        b: rgb.b,
    }
}

/// Switch to the alternate screen. On failure `leave_raw` runs before the
/// error is returned, since no `TerminalHost` exists yet to restore it.
fn enter_screen<W, F>(out: &mut W, leave_raw: F) -> io::Result<()>
where
    W: Write,
    F: FnOnce() -> io::Result<()>,
{
    if let Err(e) = execute!(out, EnterAlternateScreen, Hide) {
        let _ = leave_raw();
        return Err(e);
    }
    Ok(())
}

/// Owns the terminal while the game runs; restores it on drop
pub struct TerminalHost {
    stdout: Stdout,
    keyboard: KeyboardState,
    frame: FrameBuffer,
    logical_width: f32,
    logical_height: f32,
}

impl TerminalHost {
    pub fn new(logical_width: f32, logical_height: f32, key_hold: Duration) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        enter_screen(&mut stdout, disable_raw_mode)?;

        Ok(Self {
            stdout,
            keyboard: KeyboardState::new(key_hold),
            frame: Self::frame_for(columns, rows, logical_width, logical_height),
            logical_width,
            logical_height,
        })
    }

    fn frame_for(columns: u16, rows: u16, logical_width: f32, logical_height: f32) -> FrameBuffer {
        let width = columns.max(1) as usize;
        let height = rows.saturating_sub(HUD_ROWS).max(1) as usize * 2;
        FrameBuffer::new(width, height, logical_width, logical_height, SKY)
    }

    /// Drain pending terminal events without blocking
    pub fn poll_events(&mut self) -> io::Result<()> {
        let now = Instant::now();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) => self.keyboard.handle_key(key, now),
                Event::Resize(columns, rows) => {
                    self.frame =
                        Self::frame_for(columns, rows, self.logical_width, self.logical_height);
                    execute!(self.stdout, terminal::Clear(terminal::ClearType::All))?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn input(&mut self) -> InputState {
        self.keyboard.sample(Instant::now())
    }

    pub fn quit_requested(&self) -> bool {
        self.keyboard.quit_requested()
    }

    pub fn surface(&mut self) -> &mut FrameBuffer {
        &mut self.frame
    }

    /// Blit sprites over the rendered road and write the frame out
    pub fn present(&mut self, game: &Game) -> io::Result<()> {
        self.frame.draw_sprites(game.sprites());

        let mut fg = None;
        let mut bg = None;
        for cell_row in 0..self.frame.height() / 2 {
            queue!(self.stdout, MoveTo(0, cell_row as u16))?;
            let top = self.frame.row(cell_row * 2);
            let bottom = self.frame.row(cell_row * 2 + 1);
            for (upper, lower) in top.iter().zip(bottom) {
                if fg != Some(*upper) {
                    queue!(self.stdout, SetForegroundColor(to_color(*upper)))?;
                    fg = Some(*upper);
                }
                if bg != Some(*lower) {
                    queue!(self.stdout, SetBackgroundColor(to_color(*lower)))?;
                    bg = Some(*lower);
                }
                queue!(self.stdout, Print('▀'))?;
            }
        }

        let hud_row = (self.frame.height() / 2) as u16;
        let hud = format!("{:<width$}", hud_text(game), width = self.frame.width());
        queue!(
            self.stdout,
            ResetColor,
            MoveTo(0, hud_row),
            SetForegroundColor(Color::White),
            SetBackgroundColor(Color::Black),
            Print(hud),
            ResetColor
        )?;
        self.stdout.flush()
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        let _ = execute!(self.stdout, ResetColor, Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}
