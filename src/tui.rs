use crate::event::Event;
use crossterm::event::EventStream;
use futures::StreamExt;
use std::io;
use thiserror::Error;
use tui::{backend::CrosstermBackend, Terminal};

mod animation;
mod render;
mod widgets;

pub use render::{format_remaining, DisplayData, RunDisplay, SegmentRow};

/// Switching the terminal in and out of the mode the ui draws in.
pub trait ScreenMode {
    /// Has to be explicitly disabled, because disabling can cause errors that have to be catched.
    /// Is not disabled by dropping.
    fn enable(&mut self) -> Result<(), TuiError>;

    /// Only undoes what `enable` got to, so it is safe after a partial `enable`.
    fn disable(&mut self) -> Result<(), TuiError>;
}

/// Enables the screen, putting the terminal back if that fails halfway.
pub fn enable_or_restore(screen: &mut impl ScreenMode) -> Result<(), TuiError> {
    screen.enable().map_err(|err| {
        if let Err(restore_err) = screen.disable() {
            tracing::warn!("failed to restore terminal: {restore_err}");
        }
        err
    })
}

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    events: EventStream,
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl Tui {
    pub fn new() -> Result<Self, TuiError> {
        let backend = CrosstermBackend::new(io::stdout());

        Ok(Tui {
            terminal: Terminal::new(backend).map_err(TuiError::Creation)?,
            events: EventStream::new(),
            alternate_screen_enabled: false,
            raw_mode_enabled: false,
        })
    }

    pub fn render(&mut self, display_data: &DisplayData) -> Result<(), TuiError> {
        self.terminal
            .draw(|f| render::render_ui(f, display_data))
            .map_err(TuiError::Rendering)?;

        Ok(())
    }

    /// Waits for the next terminal event the app cares about.
    pub async fn read_event(&mut self) -> Result<Event, TuiError> {
        loop {
            let crossterm_event = self
                .events
                .next()
                .await
                .ok_or(TuiError::InputClosed)?
                .map_err(TuiError::ReadInputEvent)?;

            if let Ok(event) = Event::try_from(crossterm_event) {
                return Ok(event);
            }
        }
    }
}

impl ScreenMode for Tui {
    fn enable(&mut self) -> Result<(), TuiError> {
        crossterm::terminal::enable_raw_mode().map_err(TuiError::RawModeToggle)?;
        self.raw_mode_enabled = true;

        crossterm::execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::EnterAlternateScreen,
            crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        )
        .map_err(TuiError::AlternateScreenToggle)?;
        self.alternate_screen_enabled = true;
        self.terminal.hide_cursor().map_err(TuiError::Rendering)?;

        Ok(())
    }

    fn disable(&mut self) -> Result<(), TuiError> {
        if self.alternate_screen_enabled {
            crossterm::execute!(
                self.terminal.backend_mut(),
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
                crossterm::terminal::LeaveAlternateScreen,
            )
            .map_err(TuiError::AlternateScreenToggle)?;
            self.alternate_screen_enabled = false;
        }
        if self.raw_mode_enabled {
            crossterm::terminal::disable_raw_mode().map_err(TuiError::RawModeToggle)?;
            self.raw_mode_enabled = false;
        }
        self.terminal.show_cursor().map_err(TuiError::Rendering)?;

        Ok(())
    }
}

#[derive(Debug, Error)]
pub enum TuiError {
    #[error("failed to initialize terminal ui: {0}")]
    Creation(io::Error),
    #[error("failed to toggle terminal raw mode: {0}")]
    RawModeToggle(io::Error),
    #[error("failed to toggle alternate terminal screen: {0}")]
    AlternateScreenToggle(io::Error),
    #[error("failed to render terminal ui: {0}")]
    Rendering(io::Error),
    #[error("failed to read input event from terminal: {0}")]
    ReadInputEvent(io::Error),
    #[error("terminal input stream closed")]
    InputClosed,
}
