//! Key handling and the draw loop around one effect session.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use tracing::info;

use shoegaze_fx::{
    session::CpalBackend, visual::DisplayList, EffectSession, Param, SessionState,
};

use crate::ui::{self, View};

/// ~60 fps redraw, also the key poll timeout
const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub struct App {
    session: EffectSession<CpalBackend>,
    /// Row of the parameter panel under the cursor
    selected: usize,
    scene: Option<DisplayList>,
    /// Last error or notice, shown in the help line
    status: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(session: EffectSession<CpalBackend>) -> Self {
        Self {
            session,
            selected: 0,
            scene: None,
            status: None,
            should_quit: false,
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.scene = self.session.latest_frame().cloned();

            terminal.draw(|frame| {
                let meter = self.session.gate_meter();
                let view = View {
                    state: self.session.state(),
                    sample_rate: self.session.device_config().map(|d| d.sample_rate),
                    gate_open: meter.is_open(),
                    rms: meter.rms(),
                    params: self.session.parameters(),
                    selected: self.selected,
                    presets: self.session.presets(),
                    scene: self.scene.as_ref(),
                    status: self.status.as_deref(),
                };
                ui::draw(frame, &view);
            })?;

            if event::poll(FRAME_INTERVAL)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.session.stop();
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.toggle(),
            KeyCode::Char(c @ '1'..='9') => {
                let index = c as usize - '1' as usize;
                self.load_preset(index);
            }
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(Param::COUNT - 1);
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % Param::COUNT;
            }
            KeyCode::Left => self.nudge(-1.0),
            KeyCode::Right => self.nudge(1.0),
            _ => {}
        }
    }

    fn toggle(&mut self) {
        match self.session.state() {
            SessionState::Running => {
                self.session.stop();
                self.status = Some("stopped".to_string());
            }
            SessionState::Idle => match self.session.start() {
                Ok(()) => self.status = None,
                Err(err) => self.status = Some(err.to_string()),
            },
            _ => {}
        }
    }

    fn load_preset(&mut self, index: usize) {
        let Some(name) = self.session.presets().nth(index).map(|p| p.name.clone()) else {
            return;
        };
        self.status = match self.session.load_preset(&name) {
            Ok(()) => Some(format!("preset: {name}")),
            Err(err) => Some(err.to_string()),
        };
    }

    /// Move the selected parameter by one step in `direction`.
    fn nudge(&mut self, direction: f32) {
        let param = Param::ALL[self.selected];
        let value = self.session.parameter(param) + direction * param.step();
        match self.session.set_param(param, value) {
            Ok(stored) => info!(param = %param, value = stored, "parameter adjusted"),
            Err(err) => self.status = Some(err.to_string()),
        }
    }
}
