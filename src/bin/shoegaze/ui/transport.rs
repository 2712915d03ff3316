//! Transport bar widget - session state, sample rate and the gate meter

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use shoegaze_fx::SessionState;

use super::View;

pub fn render_transport(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" shoegaze ").borders(Borders::ALL);

    let (symbol, color) = match view.state {
        SessionState::Running => ("▶", Color::Green),
        SessionState::Idle => ("■", Color::Yellow),
        SessionState::Starting | SessionState::Stopping => ("…", Color::Cyan),
    };

    let sample_rate = match view.sample_rate {
        Some(rate) => format!("{:.1}kHz  ", rate as f32 / 1000.0),
        None => "--  ".to_string(),
    };

    let (gate, gate_color) = if view.gate_open {
        ("Gate: open  ", Color::Green)
    } else {
        ("Gate: closed  ", Color::DarkGray)
    };

    let line = Line::from(vec![
        Span::styled(
            format!(" {} {}  ", symbol, view.state),
            Style::default().fg(color),
        ),
        Span::styled(sample_rate, Style::default().fg(Color::DarkGray)),
        Span::styled(gate, Style::default().fg(gate_color)),
        Span::styled(
            format!("RMS: {:.4}", view.rms),
            Style::default().fg(Color::Magenta),
        ),
    ]);

    let paragraph = Paragraph::new(line).block(block);
    frame.render_widget(paragraph, area);
}
