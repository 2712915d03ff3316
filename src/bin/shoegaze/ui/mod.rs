//! TUI module for shoegaze
//!
//! Transport bar on top, parameter panel and visualizer side by side, help
//! line at the bottom.

mod controls;
mod scene;
mod transport;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use shoegaze_fx::{visual::DisplayList, ParameterStore, PresetTable, SessionState};

use controls::render_controls;
use scene::render_scene;
use transport::render_transport;

/// Everything one redraw needs, borrowed from the app.
pub struct View<'a> {
    pub state: SessionState,
    pub sample_rate: Option<u32>,
    pub gate_open: bool,
    pub rms: f32,
    pub params: &'a ParameterStore,
    pub selected: usize,
    pub presets: &'a PresetTable,
    pub scene: Option<&'a DisplayList>,
    pub status: Option<&'a str>,
}

pub fn draw(frame: &mut Frame, view: &View) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Transport bar
            Constraint::Min(12),   // Controls + scene
            Constraint::Length(1), // Help bar
        ])
        .split(frame.area());

    render_transport(frame, chunks[0], view);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(20)])
        .split(chunks[1]);
    render_controls(frame, body[0], view);
    render_scene(frame, body[1], view.scene);

    let presets: Vec<String> = view
        .presets
        .names()
        .take(9)
        .enumerate()
        .map(|(i, name)| format!("[{}] {}", i + 1, name))
        .collect();
    let mut help = format!(
        " [Q] Quit  [Space] Start/Stop  [↑↓] Select  [←→] Adjust  {}",
        presets.join("  ")
    );
    if let Some(status) = view.status {
        help.push_str(&format!("  | {status}"));
    }
    let help = Paragraph::new(help).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, chunks[2]);
}
