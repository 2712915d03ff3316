//! Parameter panel - one row per parameter with a fill bar

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use shoegaze_fx::Param;

use super::View;

const BAR_WIDTH: usize = 10;

pub fn render_controls(frame: &mut Frame, area: Rect, view: &View) {
    let block = Block::default().title(" Parameters ").borders(Borders::ALL);

    let lines: Vec<Line> = Param::ALL
        .iter()
        .enumerate()
        .map(|(i, &param)| {
            let value = view.params.get(param);
            let filled = (param.range().normalize(value) * BAR_WIDTH as f32).round() as usize;
            let bar = format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled));

            let style = if i == view.selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Magenta)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };

            Line::from(vec![
                Span::styled(format!("{:<11}", param.label()), style),
                Span::styled(format!(" {bar} "), Style::default().fg(Color::Magenta)),
                Span::styled(format_value(param, value), Style::default().fg(Color::Cyan)),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn format_value(param: Param, value: f32) -> String {
    match param {
        Param::FilterFreq => format!("{value:.0}Hz"),
        Param::Distortion => format!("{value:.0}"),
        Param::DelayTime | Param::ReverbDecay | Param::PreDelay => format!("{value:.2}s"),
        _ => format!("{value:.2}"),
    }
}
