//! Step lanes widget - bass level bars and kick toggles with playhead

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use rebirth_rack::voices::Voice;

use crate::app::App;

const LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Glyph for one step: a level bar for the bass, a pad for the kick
fn step_glyph(voice: Voice, value: f32, on: bool) -> char {
    match voice {
        Voice::Bass => {
            let idx = (value * (LEVELS.len() - 1) as f32).round() as usize;
            LEVELS[idx.min(LEVELS.len() - 1)]
        }
        Voice::Kick if on => '■',
        Voice::Kick => '□',
    }
}

pub fn render_steps(frame: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().title(" Steps ").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if inner.height < 3 || inner.width < 20 {
        return;
    }

    let label_width = 8usize;
    let mut lines = Vec::new();

    // Beat markers row
    let mut markers = " ".repeat(label_width);
    for i in 0..app.rack.step_count() {
        if i % 4 == 0 {
            markers.push_str(&format!("{:<3}", i / 4 + 1));
        } else {
            markers.push_str("   ");
        }
    }
    lines.push(Line::from(Span::styled(markers, Style::default().fg(Color::DarkGray))));

    for voice in Voice::ALL {
        let pattern = app.rack.pattern(voice);
        let playhead = app.rack.current_step(voice);
        let selected = voice == app.lane;
        let running = app.rack.is_running(voice);

        let mut spans = vec![Span::styled(
            format!("{:6}  ", voice.name()),
            Style::default().fg(if selected { Color::White } else { Color::DarkGray }),
        )];

        for (i, &value) in pattern.values().iter().enumerate() {
            let glyph = step_glyph(voice, value, pattern.is_on(i));
            let mut style = Style::default().fg(if running { Color::Cyan } else { Color::Blue });
            if i == playhead {
                style = style.fg(Color::Yellow);
            }
            if selected && i == app.cursor {
                style = style.add_modifier(Modifier::REVERSED);
            }
            spans.push(Span::styled(format!(" {glyph} "), style));
        }
        lines.push(Line::from(spans));
    }

    // Readout for the step under the cursor
    let value = app.rack.pattern(app.lane).get(app.cursor).unwrap_or(0.0);
    lines.push(Line::from(Span::styled(
        format!("{}step {} = {value:.2}", " ".repeat(label_width), app.cursor + 1),
        Style::default().fg(Color::DarkGray),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}
