//! Transport bar widget - BPM, play state, per-lane status

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rebirth_rack::{voices::Voice, Rack};

pub fn render_transport(frame: &mut Frame, area: Rect, rack: &Rack) {
    let block = Block::default().title(" rebirth ").borders(Borders::ALL);

    let running = rack.all_running();
    let play_symbol = if running { "▶" } else { "⏸" };
    let play_state_str = if running { "Playing" } else { "Stopped" };

    // Bar/beat from the bass lane, four steps per beat
    let step = rack.current_step(Voice::Bass);
    let bar = step / 16 + 1;
    let beat = (step % 16) / 4 + 1;

    let line = Line::from(vec![
        Span::styled(
            format!(" BPM: {:.0}  ", rack.tempo()),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{play_symbol} {play_state_str}  "),
            Style::default().fg(if running { Color::Green } else { Color::Yellow }),
        ),
        Span::styled(
            format!("Bar {bar} | Beat {beat}  "),
            Style::default().fg(Color::White),
        ),
        Span::styled(rack.status_label(), Style::default().fg(Color::DarkGray)),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}
