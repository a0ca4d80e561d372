//! Knob row for the selected voice, plus the master section

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};
use rebirth_rack::patch::MasterPatch;

use crate::app::App;

pub fn render_params(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default()
        .title(format!(" {} ", app.lane.name()))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let params = app.params();
    if params.is_empty() || inner.height < 2 {
        return;
    }

    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, params.len() as u32); params.len()])
        .split(inner);

    for (i, ((label, param), cell)) in params.iter().zip(cells.iter()).enumerate() {
        let selected = i == app.param_index;
        let label_style = if selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Length(1), Constraint::Min(0)])
            .split(*cell);

        frame.render_widget(Paragraph::new(Span::styled(*label, label_style)), rows[0]);
        let gauge = Gauge::default()
            .gauge_style(Style::default().fg(if selected { Color::Yellow } else { Color::Cyan }))
            .ratio(f64::from(param.normalized()))
            .label(param.to_string());
        frame.render_widget(gauge, rows[1]);
    }
}

pub fn render_master(frame: &mut Frame, area: Rect, master: &MasterPatch) {
    let block = Block::default().title(" master ").borders(Borders::ALL);

    let (activity, color) = if master.is_muted() {
        ("muted", Color::Red)
    } else if master.is_active() {
        ("● live", Color::Green)
    } else {
        ("○ idle", Color::DarkGray)
    };

    let levels = master
        .levels()
        .iter()
        .map(|l| format!("{l:.2}"))
        .collect::<Vec<_>>()
        .join(" / ");

    let line = Line::from(vec![
        Span::styled(
            format!(" Gain: {}  ", master.gain_label()),
            Style::default().fg(if master.is_muted() { Color::DarkGray } else { Color::Cyan }),
        ),
        Span::styled(format!("{activity}  "), Style::default().fg(color)),
        Span::styled(format!("mix {levels}"), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
