use crate::tui::animation;
use crate::tui::widgets::{BlockWithLegend, PrayerClock, SegmentForm};
use std::time::Duration;
use tui::widgets::BorderType;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets, Frame,
};
use unicode_segmentation::UnicodeSegmentation;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRow {
    pub name: String,
    pub input: String,
    /// `None` for segments that cannot be switched off.
    pub enabled: Option<bool>,
    pub toggle_focused: bool,
    pub duration_focused: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayData {
    pub rows: Vec<SegmentRow>,
    pub action_label: &'static str,
    pub action_focused: bool,
    pub running: Option<RunDisplay>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunDisplay {
    pub segment: String,
    pub remaining: Duration,
    pub progress: f64,
    pub finished_segments: usize,
    pub total_segments: usize,
}

pub fn format_remaining(remaining: Duration) -> String {
    // round up so the display never shows 0:00 while a bell is still pending
    let secs = remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0);
    format!("{}:{:02}", secs / 60, secs % 60)
}

fn split_initial(str: &str) -> (&str, &str) {
    let mut graphemes = str.graphemes(true);

    let initial = graphemes.next().unwrap_or("");
    let remainder = graphemes.as_str();

    (initial, remainder)
}

fn define_block<'a>(title: &'a str, legend: Vec<&'a str>) -> BlockWithLegend<'a> {
    let text_style = Style::default()
        .fg(Color::White)
        .add_modifier(Modifier::BOLD);
    let initials_style = Style::default().fg(Color::Red).add_modifier(Modifier::BOLD);

    let highlight_initial = |s: &'a str| {
        let (initial, remainder) = split_initial(s);
        Spans::from(vec![
            Span::styled(initial, initials_style),
            Span::styled(remainder, text_style),
        ])
    };

    BlockWithLegend::default()
        .borders(widgets::Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(highlight_initial(title))
        .legend(legend.into_iter().map(highlight_initial).collect::<Vec<Spans>>())
}

pub fn render_ui<B: Backend>(frame: &mut Frame<B>, display_data: &DisplayData) {
    let (form_chunk, clock_chunk) = {
        let direction = if frame.size().width >= frame.size().height * 2 {
            Direction::Horizontal
        } else {
            Direction::Vertical
        };

        let toplevel_chunks = Layout::default()
            .direction(direction)
            .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
            .split(frame.size());

        (toplevel_chunks[0], toplevel_chunks[1])
    };

    let form_widget = SegmentForm::new(&display_data.rows)
        .block(define_block(
            "segments",
            vec!["⇥ next", "␣ toggle", "⏎ start/reset", "quit"],
        ))
        .action(display_data.action_label, display_data.action_focused)
        .locked(display_data.running.is_some());
    frame.render_widget(form_widget, form_chunk);

    let clock_widget = match &display_data.running {
        Some(run) => PrayerClock::new()
            .markers(animation::segment_markers(
                run.finished_segments,
                Some(run.finished_segments),
                run.total_segments,
            ))
            .remaining(format_remaining(run.remaining))
            .segment(run.segment.clone())
            .progress(run.progress),
        None => PrayerClock::new().segment("idle".to_string()),
    };
    frame.render_widget(clock_widget.block(define_block("timer", vec![])), clock_chunk);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn row(name: &str, input: &str, enabled: Option<bool>) -> SegmentRow {
        SegmentRow {
            name: name.to_string(),
            input: input.to_string(),
            enabled,
            toggle_focused: false,
            duration_focused: false,
        }
    }

    fn draw(display_data: &DisplayData) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
        terminal
            .draw(|f| render_ui(f, display_data))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    /// Position of the first cell where `text` starts.
    fn find(buffer: &Buffer, text: &str) -> Option<(u16, u16)> {
        let area = buffer.area;
        (area.y..area.bottom()).find_map(|y| {
            let line: Vec<&str> = (area.x..area.right())
                .map(|x| buffer.get(x, y).symbol.as_str())
                .collect();
            let wanted: Vec<String> = text.chars().map(String::from).collect();
            line.windows(wanted.len())
                .position(|window| window.iter().zip(&wanted).all(|(a, b)| *a == b.as_str()))
                .map(|x| (area.x + x as u16, y))
        })
    }

    #[test]
    fn form_shows_checkboxes_and_focused_button() {
        let display_data = DisplayData {
            rows: vec![
                row("Lectio", "7", Some(true)),
                row("Meditatio", "5", None),
                row("Oratio", "", None),
                row("Contemplatio", "5", Some(false)),
            ],
            action_label: "Start",
            action_focused: true,
            running: None,
        };

        let buffer = draw(&display_data);

        assert!(find(&buffer, "[x] Lectio").is_some());
        assert!(find(&buffer, "[ ] Contemplatio").is_some());
        assert!(find(&buffer, "idle").is_some());

        let (x, y) = find(&buffer, "[ Start ]").unwrap();
        assert!(buffer.get(x, y).modifier.contains(Modifier::REVERSED));
        let (x, y) = find(&buffer, "[x]").unwrap();
        assert!(!buffer.get(x, y).modifier.contains(Modifier::REVERSED));
    }

    #[test]
    fn running_form_offers_reset_and_a_countdown() {
        let display_data = DisplayData {
            rows: vec![row("Meditatio", "5", None)],
            action_label: "Reset",
            action_focused: false,
            running: Some(RunDisplay {
                segment: "Meditatio".to_string(),
                remaining: Duration::from_secs(4 * 60),
                progress: 0.25,
                finished_segments: 1,
                total_segments: 4,
            }),
        };

        let buffer = draw(&display_data);

        assert!(find(&buffer, "[ Reset ]").is_some());
        assert!(find(&buffer, "[ Start ]").is_none());
        assert!(find(&buffer, "4:00").is_some());
    }

    #[test]
    fn remaining_time_rounds_up_to_whole_seconds() {
        assert_eq!(format_remaining(Duration::from_secs(300)), "5:00");
        assert_eq!(format_remaining(Duration::from_millis(59_001)), "1:00");
        assert_eq!(format_remaining(Duration::from_millis(1)), "0:01");
        assert_eq!(format_remaining(Duration::ZERO), "0:00");
    }

    #[test]
    fn splits_first_grapheme() {
        assert_eq!(split_initial("timer"), ("t", "imer"));
        assert_eq!(split_initial(""), ("", ""));
    }
}
