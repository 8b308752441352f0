use crate::event::Event;
use crate::form::{Edit, Field, Form};
use crate::notification::{self, Bell};
use crate::sequencer::{schedule, RunningSequence, Sequencer, SequencerEvent};
use crate::store::{KeyValueStore, StoreError, TimerDefaults};
use crate::tui::{self, DisplayData, RunDisplay, ScreenMode, SegmentRow, Tui, TuiError};
use std::io;
use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::select;
use tokio::time::interval;
use tracing::{info, warn};

/// Everything behind the terminal: the form, the store it writes through to,
/// and the sequence currently running.
pub struct Session<S> {
    form: Form,
    store: S,
    bell: Arc<dyn Bell>,
    running: Option<RunningSequence>,
    finished_segments: usize,
    desktop_notifications: bool,
}

impl<S: KeyValueStore> Session<S> {
    pub fn new(defaults: &TimerDefaults, store: S, bell: Arc<dyn Bell>) -> Self {
        Self {
            form: Form::from_defaults(defaults),
            store,
            bell,
            running: None,
            finished_segments: 0,
            desktop_notifications: false,
        }
    }

    /// Show a desktop notification when the last bell has rung.
    pub fn desktop_notifications(mut self, enabled: bool) -> Self {
        self.desktop_notifications = enabled;
        self
    }

    pub fn form(&self) -> &Form {
        &self.form
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn handle_event(&mut self, event: Event) -> Result<AppShouldQuit, UnrecoverableError> {
        let edit = match event {
            Event::Quit => return Ok(AppShouldQuit(true)),
            Event::FocusNext => {
                self.form.focus_next();
                Edit::Unchanged
            }
            Event::FocusPrevious => {
                self.form.focus_previous();
                Edit::Unchanged
            }
            Event::Digit(digit) => self.form.push_digit(digit),
            Event::Backspace => self.form.pop_digit(),
            Event::Toggle if self.form.focus() == Field::Action => {
                self.press_action();
                Edit::Unchanged
            }
            Event::Toggle => self.form.toggle_focused(),
            Event::Activate => {
                self.press_action();
                Edit::Unchanged
            }
            Event::Redraw => Edit::Unchanged,
        };

        if edit == Edit::Changed {
            self.form.persist(&mut self.store)?;
        }

        Ok(AppShouldQuit(false))
    }

    /// Start when idle, Reset when running.
    pub fn press_action(&mut self) {
        match self.running.take() {
            Some(running) => {
                running.cancel();
                self.form.stop();
            }
            None => self.start(),
        }
    }

    fn start(&mut self) {
        let entries = schedule(&self.form.segments());
        match Sequencer::start(entries, Arc::clone(&self.bell)) {
            Ok(running) => {
                self.running = Some(running);
                self.finished_segments = 0;
                self.form.start();
            }
            Err(err) => warn!("not starting: {err}"),
        }
    }

    pub fn handle_sequence_event(&mut self, event: SequencerEvent) {
        match event {
            SequencerEvent::SegmentFinished { segment, is_final } => {
                self.finished_segments += 1;
                info!(%segment, is_final, "bell");
            }
            SequencerEvent::Completed => {
                self.running = None;
                self.form.stop();

                if self.desktop_notifications {
                    if let Err(err) = notification::show_desktop_notification(
                        "Lectio Divina",
                        "The prayer is complete.",
                    ) {
                        warn!("{err}");
                    }
                }
            }
        }
    }

    /// Resolves with the next event of the running sequence, never if idle.
    pub async fn next_sequence_event(&mut self) -> SequencerEvent {
        match &mut self.running {
            Some(running) => running.next_event().await,
            None => std::future::pending().await,
        }
    }

    pub fn display_data(&self) -> DisplayData {
        let focus = self.form.focus();
        let rows = self
            .form
            .segment_states()
            .iter()
            .map(|state| SegmentRow {
                name: state.name.to_string(),
                input: state.input.clone(),
                enabled: state.name.is_optional().then_some(state.enabled),
                toggle_focused: focus == Field::Toggle(state.name),
                duration_focused: focus == Field::Duration(state.name),
            })
            .collect();

        let running = self.running.as_ref().map(|running| {
            let progress = running.progress();
            RunDisplay {
                segment: progress
                    .map(|p| p.segment)
                    .or_else(|| running.entries().last().map(|e| e.segment))
                    .map(|segment| segment.to_string())
                    .unwrap_or_default(),
                remaining: progress.map(|p| p.remaining).unwrap_or(Duration::ZERO),
                progress: progress.map(|p| p.fraction).unwrap_or(1.0),
                finished_segments: self.finished_segments,
                total_segments: running.entries().len(),
            }
        });

        DisplayData {
            rows,
            action_label: self.form.run_state().action_label(),
            action_focused: focus == Field::Action,
            running,
        }
    }
}

pub struct App<S> {
    session: Session<S>,
    tui: Tui,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(session: Session<S>) -> Result<Self, UnrecoverableError> {
        let tui = Tui::new()?;

        Ok(Self { session, tui })
    }

    pub async fn run(&mut self) -> Result<(), UnrecoverableError> {
        tui::enable_or_restore(&mut self.tui)?;
        let maybe_err = self.run_inner().await;
        self.tui.disable()?;

        maybe_err
    }

    async fn run_inner(&mut self) -> Result<(), UnrecoverableError> {
        let mut render_clock = interval(Duration::from_millis(100));

        loop {
            self.tui.render(&self.session.display_data())?;

            select! {
                _ = render_clock.tick() => {}
                tui_event = self.tui.read_event() => {
                    if *self.session.handle_event(tui_event?)? {
                        break;
                    }
                }
                sequence_event = self.session.next_sequence_event() => {
                    self.session.handle_sequence_event(sequence_event);
                }
            }
        }

        if self.session.is_running() {
            self.session.press_action();
        }

        Ok(())
    }
}

pub struct AppShouldQuit(bool);

impl Deref for AppShouldQuit {
    type Target = bool;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Represents errors the app has no control over.
#[derive(Debug, Error)]
pub enum UnrecoverableError {
    #[error("error while interfacing with the terminal: {0}")]
    Tui(#[from] TuiError),
    #[error("failed to access stored defaults: {0}")]
    Store(#[from] StoreError),
    #[error("failed to open log file {0}: {1}")]
    LogFile(PathBuf, io::Error),
}
