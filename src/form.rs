use crate::segment::{Minutes, Segment, SegmentName};
use crate::store::{save_defaults, KeyValueStore, StoreError, TimerDefaults};

const MAX_INPUT_DIGITS: usize = 3;

/// Everything the form shows about one segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentState {
    pub name: SegmentName,
    /// Raw text of the duration field; coalesced only when read.
    pub input: String,
    pub enabled: bool,
}

impl SegmentState {
    pub fn duration(&self) -> Minutes {
        Minutes::value_or_default(&self.input)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Duration(SegmentName),
    Toggle(SegmentName),
    Action,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
}

impl RunState {
    pub fn is_running(&self) -> bool {
        matches!(self, RunState::Running)
    }

    pub fn action_label(&self) -> &'static str {
        match self {
            RunState::Idle => "Start",
            RunState::Running => "Reset",
        }
    }
}

/// Whether an input changed the stored defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Edit {
    Changed,
    Unchanged,
}

pub struct Form {
    segments: [SegmentState; 4],
    focus: Field,
    run: RunState,
}

impl Form {
    pub fn from_defaults(defaults: &TimerDefaults) -> Form {
        Form {
            segments: SegmentName::ALL.map(|name| SegmentState {
                name,
                input: defaults.duration(name).to_string(),
                enabled: defaults.is_enabled(name),
            }),
            focus: Field::Duration(SegmentName::Lectio),
            run: RunState::Idle,
        }
    }

    /// Focus order: each segment's toggle (if any) precedes its duration, the
    /// action button comes last.
    pub fn fields() -> Vec<Field> {
        SegmentName::ALL
            .into_iter()
            .flat_map(|name| {
                let toggle = name.is_optional().then_some(Field::Toggle(name));
                toggle.into_iter().chain([Field::Duration(name)])
            })
            .chain([Field::Action])
            .collect()
    }

    pub fn segment(&self, name: SegmentName) -> &SegmentState {
        &self.segments[name.index()]
    }

    pub fn segment_states(&self) -> &[SegmentState; 4] {
        &self.segments
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }

    pub fn focus_next(&mut self) {
        self.move_focus(1);
    }

    pub fn focus_previous(&mut self) {
        self.move_focus(-1);
    }

    fn move_focus(&mut self, step: isize) {
        let fields = Self::fields();
        let current = fields.iter().position(|f| *f == self.focus).unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(fields.len() as isize) as usize;
        self.focus = fields[next];
    }

    pub fn push_digit(&mut self, digit: char) -> Edit {
        let Field::Duration(name) = self.focus else {
            return Edit::Unchanged;
        };
        if !digit.is_ascii_digit() || self.run.is_running() {
            return Edit::Unchanged;
        }

        let input = &mut self.segments[name.index()].input;
        if input.len() >= MAX_INPUT_DIGITS {
            return Edit::Unchanged;
        }
        input.push(digit);
        Edit::Changed
    }

    pub fn pop_digit(&mut self) -> Edit {
        let Field::Duration(name) = self.focus else {
            return Edit::Unchanged;
        };
        if self.run.is_running() {
            return Edit::Unchanged;
        }

        match self.segments[name.index()].input.pop() {
            Some(_) => Edit::Changed,
            None => Edit::Unchanged,
        }
    }

    pub fn set_input(&mut self, name: SegmentName, input: &str) -> Edit {
        if self.run.is_running() {
            return Edit::Unchanged;
        }
        self.segments[name.index()].input = input.to_string();
        Edit::Changed
    }

    pub fn set_enabled(&mut self, name: SegmentName, enabled: bool) -> Edit {
        if !name.is_optional() || self.run.is_running() {
            return Edit::Unchanged;
        }

        let state = &mut self.segments[name.index()];
        if state.enabled == enabled {
            return Edit::Unchanged;
        }
        state.enabled = enabled;
        Edit::Changed
    }

    pub fn toggle_focused(&mut self) -> Edit {
        match self.focus {
            Field::Toggle(name) => {
                let enabled = self.segment(name).enabled;
                self.set_enabled(name, !enabled)
            }
            _ => Edit::Unchanged,
        }
    }

    /// The defaults this form currently stands for, with blank or invalid
    /// fields coalesced.
    pub fn defaults(&self) -> TimerDefaults {
        let mut defaults = TimerDefaults::default();
        for state in &self.segments {
            defaults.set_duration(state.name, state.duration());
            defaults.set_enabled(state.name, state.enabled);
        }
        defaults
    }

    pub fn segments(&self) -> [Segment; 4] {
        self.defaults().segments()
    }

    pub fn persist(&self, store: &mut impl KeyValueStore) -> Result<(), StoreError> {
        save_defaults(store, &self.defaults())
    }

    pub fn start(&mut self) {
        self.run = RunState::Running;
    }

    pub fn stop(&mut self) {
        self.run = RunState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::schedule;
    use crate::store::{load_defaults, MemoryStore};

    fn offsets(form: &Form) -> Vec<u64> {
        schedule(&form.segments())
            .iter()
            .map(|e| e.offset_millis())
            .collect()
    }

    fn form_with(minutes: [&str; 4]) -> Form {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        for (name, input) in SegmentName::ALL.into_iter().zip(minutes) {
            let _ = form.set_input(name, input);
        }
        form
    }

    #[test]
    fn focus_cycles_through_every_field() {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        let fields = Form::fields();
        assert_eq!(fields.len(), 7);
        assert_eq!(fields[0], Field::Toggle(SegmentName::Lectio));

        let mut seen = vec![form.focus()];
        for _ in 1..fields.len() {
            form.focus_next();
            seen.push(form.focus());
        }
        form.focus_next();
        assert_eq!(form.focus(), seen[0]);

        form.focus_previous();
        assert_eq!(form.focus(), Field::Toggle(SegmentName::Lectio));
        form.focus_previous();
        assert_eq!(form.focus(), Field::Action);
        form.focus_previous();
        assert_eq!(form.focus(), Field::Duration(SegmentName::Contemplatio));
    }

    #[test]
    fn blank_meditatio_coalesces_to_five_minutes() {
        let form = form_with(["1", "", "1", "1"]);

        assert_eq!(form.segment(SegmentName::Meditatio).duration().get(), 5);
        assert_eq!(offsets(&form), [60_000, 360_000, 420_000, 480_000]);
    }

    #[test]
    fn typing_edits_the_focused_duration() {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        assert_eq!(form.focus(), Field::Duration(SegmentName::Lectio));

        assert_eq!(form.pop_digit(), Edit::Changed);
        assert_eq!(form.pop_digit(), Edit::Unchanged);
        assert_eq!(form.push_digit('1'), Edit::Changed);
        assert_eq!(form.push_digit('x'), Edit::Unchanged);
        assert_eq!(form.push_digit('2'), Edit::Changed);
        assert_eq!(form.push_digit('0'), Edit::Changed);
        assert_eq!(form.push_digit('0'), Edit::Unchanged);

        assert_eq!(form.segment(SegmentName::Lectio).input, "120");
    }

    #[test]
    fn disabling_lectio_then_restoring_keeps_saved_duration() {
        let mut store = MemoryStore::default();
        let mut form = form_with(["7", "2", "3", "4"]);
        form.persist(&mut store).unwrap();

        assert_eq!(form.set_enabled(SegmentName::Lectio, false), Edit::Changed);
        form.persist(&mut store).unwrap();
        assert_eq!(offsets(&form), [120_000, 300_000, 480_000]);

        let mut reloaded = Form::from_defaults(&load_defaults(&store).unwrap());
        assert!(!reloaded.segment(SegmentName::Lectio).enabled);

        assert_eq!(reloaded.set_enabled(SegmentName::Lectio, true), Edit::Changed);
        assert_eq!(offsets(&reloaded), [420_000, 540_000, 720_000, 960_000]);
    }

    #[test]
    fn mandatory_segments_have_no_toggle() {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        assert_eq!(form.set_enabled(SegmentName::Oratio, false), Edit::Unchanged);
        assert!(form.segment(SegmentName::Oratio).enabled);

        form.focus = Field::Duration(SegmentName::Oratio);
        assert_eq!(form.toggle_focused(), Edit::Unchanged);
    }

    #[test]
    fn toggling_the_focused_checkbox() {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        for _ in 0..4 {
            form.focus_previous();
        }
        assert_eq!(form.focus(), Field::Toggle(SegmentName::Contemplatio));

        assert_eq!(form.toggle_focused(), Edit::Changed);
        assert!(!form.segment(SegmentName::Contemplatio).enabled);
        assert!(!form.defaults().contemplatio_enabled);
    }

    #[test]
    fn persisted_duration_is_prefilled_on_reload() {
        let mut store = MemoryStore::default();
        let mut form = Form::from_defaults(&load_defaults(&store).unwrap());
        let _ = form.set_input(SegmentName::Oratio, "15");
        form.persist(&mut store).unwrap();

        let reloaded = Form::from_defaults(&load_defaults(&store).unwrap());
        assert_eq!(reloaded.segment(SegmentName::Oratio).input, "15");
        assert_eq!(reloaded.segment(SegmentName::Lectio).input, "5");
    }

    #[test]
    fn fields_are_locked_while_running() {
        let mut form = Form::from_defaults(&TimerDefaults::default());
        form.start();
        assert_eq!(form.run_state().action_label(), "Reset");

        assert_eq!(form.push_digit('1'), Edit::Unchanged);
        assert_eq!(form.pop_digit(), Edit::Unchanged);
        assert_eq!(form.set_enabled(SegmentName::Lectio, false), Edit::Unchanged);

        form.stop();
        assert_eq!(form.run_state(), RunState::Idle);
        assert_eq!(form.run_state().action_label(), "Start");
        assert_eq!(form.pop_digit(), Edit::Changed);
    }
}
