//! App - owns the rack and the engine, runs the event loop

use std::time::{Duration, Instant};

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use rebirth_rack::{
    engine::SoftEngine,
    patch::Param,
    voices::{BassParam, KickParam, Voice},
    Rack,
};

use crate::ui;

/// How far Up/Down moves a bass step
const STEP_INCREMENT: f32 = 0.05;

/// Frame budget (~60fps)
const FRAME: Duration = Duration::from_millis(16);

pub struct App {
    pub rack: Rack,
    engine: SoftEngine,
    /// Lane the cursor edits
    pub lane: Voice,
    /// Selected step in the current lane
    pub cursor: usize,
    /// Selected parameter of the current lane
    pub param_index: usize,
    should_quit: bool,
}

impl App {
    pub fn new(rack: Rack, engine: SoftEngine) -> Self {
        Self {
            rack,
            engine,
            lane: Voice::Bass,
            cursor: 0,
            param_index: 0,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        let mut last = Instant::now();
        while !self.should_quit {
            let now = Instant::now();
            self.engine.advance(now - last);
            last = now;
            self.rack.poll()?;

            terminal.draw(|frame| ui::render(frame, self))?;

            if event::poll(FRAME)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Parameters of the selected lane, in panel order
    pub fn params(&self) -> Vec<(&'static str, Param)> {
        match self.lane {
            Voice::Bass => BassParam::ALL
                .iter()
                .map(|&k| (k.label(), self.rack.bass().param(k)))
                .collect(),
            Voice::Kick => KickParam::ALL
                .iter()
                .map(|&k| (k.label(), self.rack.kick().param(k)))
                .collect(),
        }
    }

    fn param_count(&self) -> usize {
        match self.lane {
            Voice::Bass => BassParam::ALL.len(),
            Voice::Kick => KickParam::ALL.len(),
        }
    }

    fn nudge_selected(&mut self, steps: i32) {
        match self.lane {
            Voice::Bass => {
                let key = BassParam::ALL[self.param_index];
                self.rack.bass_mut().nudge_param(key, steps);
            }
            Voice::Kick => {
                let key = KickParam::ALL[self.param_index];
                self.rack.kick_mut().nudge_param(key, steps);
            }
        }
    }

    fn edit_step(&mut self, delta: f32) -> EyreResult<()> {
        let current = self.rack.pattern(self.lane).get(self.cursor).unwrap_or(0.0);
        match self.lane {
            Voice::Bass => self.rack.set_step(Voice::Bass, self.cursor, current + delta)?,
            // Kick steps are hits: up sets, down clears
            Voice::Kick => {
                let value = if delta > 0.0 { 1.0 } else { 0.0 };
                self.rack.set_step(Voice::Kick, self.cursor, value)?
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) -> EyreResult<()> {
        let steps = self.rack.step_count();
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char(' ') => {
                self.rack.toggle_playback();
            }
            KeyCode::Char('r') | KeyCode::Char('R') => self.rack.reset(),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.rack.set_tempo(self.rack.tempo() + 1.0);
            }
            KeyCode::Char('-') => {
                self.rack.set_tempo(self.rack.tempo() - 1.0);
            }
            KeyCode::Tab => {
                self.lane = match self.lane {
                    Voice::Bass => Voice::Kick,
                    Voice::Kick => Voice::Bass,
                };
                self.param_index = self.param_index.min(self.param_count() - 1);
            }
            KeyCode::Left => self.cursor = (self.cursor + steps - 1) % steps,
            KeyCode::Right => self.cursor = (self.cursor + 1) % steps,
            KeyCode::Up => self.edit_step(STEP_INCREMENT)?,
            KeyCode::Down => self.edit_step(-STEP_INCREMENT)?,
            KeyCode::Enter => self.rack.toggle_step(self.lane, self.cursor)?,
            KeyCode::Char('[') => {
                let n = self.param_count();
                self.param_index = (self.param_index + n - 1) % n;
            }
            KeyCode::Char(']') => self.param_index = (self.param_index + 1) % self.param_count(),
            KeyCode::Char(',') => self.nudge_selected(-1),
            KeyCode::Char('.') => self.nudge_selected(1),
            KeyCode::Char('m') | KeyCode::Char('M') => {
                self.rack.master_mut().toggle_mute();
            }
            KeyCode::Char('g') => {
                self.rack.master_mut().nudge_gain(-5);
            }
            KeyCode::Char('G') => {
                self.rack.master_mut().nudge_gain(5);
            }
            _ => {}
        }
        Ok(())
    }
}
