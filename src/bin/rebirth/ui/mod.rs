//! TUI module for rebirth
//!
//! One frame per loop: transport bar, both step lanes, the selected lane's
//! knobs, the master section and a help line.

mod params;
mod steps;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

use params::{render_master, render_params};
use steps::render_steps;
use transport::render_transport;

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(8),    // Step lanes
            Constraint::Length(5), // Parameters
            Constraint::Length(3), // Master
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], &app.rack);
    render_steps(frame, chunks[1], app);
    render_params(frame, chunks[2], app);
    render_master(frame, chunks[3], app.rack.master());

    let help = Paragraph::new(
        " [Space] Play/Stop  [R] Reset  [+/-] Tempo  [Tab] Lane  [←→] Step  [↑↓/Enter] Edit  \
         [ [ ] ] Param  [,/.] Nudge  [M] Mute  [g/G] Gain  [Q] Quit",
    )
    .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[4]);
}
