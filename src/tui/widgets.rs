use crate::tui::animation;
use crate::tui::render::SegmentRow;
use std::iter::once;
use tui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

pub struct BlockWithLegend<'a> {
    legend: Vec<Spans<'a>>,
    block: Block<'a>,
    border_type: BorderType,
}

impl<'a> BlockWithLegend<'a> {
    pub fn title<T>(mut self, title: T) -> BlockWithLegend<'a>
    where
        T: Into<Spans<'a>>,
    {
        self.block = self.block.title(title);
        self
    }

    pub fn borders(mut self, borders: Borders) -> BlockWithLegend<'a> {
        self.block = self.block.borders(borders);
        self
    }

    pub fn border_type(mut self, border_type: BorderType) -> BlockWithLegend<'a> {
        self.block = self.block.border_type(border_type);
        self.border_type = border_type;
        self
    }

    pub fn inner(&self, area: Rect) -> Rect {
        self.block.inner(area)
    }

    pub fn legend<T>(mut self, legend: Vec<T>) -> BlockWithLegend<'a>
    where
        T: Into<Spans<'a>>,
    {
        self.legend = legend.into_iter().map(|l| l.into()).collect();
        self
    }
}

impl<'a> Default for BlockWithLegend<'a> {
    fn default() -> BlockWithLegend<'a> {
        BlockWithLegend {
            legend: vec![],
            block: Block::default(),
            border_type: BorderType::Plain,
        }
    }
}

impl<'a> Widget for BlockWithLegend<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.render(area, buf);
        if area.height == 0 {
            return;
        }
        let symbols = BorderType::line_symbols(self.border_type);

        let legend_y = area.y + area.height - 1;
        let mut legend_x = area.x + 1;

        for legend in self.legend.into_iter() {
            let legend: Spans = once(Span::from(symbols.bottom_right))
                .chain(legend.0.into_iter())
                .chain(once(Span::from(symbols.bottom_left)))
                .collect::<Vec<_>>()
                .into();

            let width_remaining = area.width.saturating_sub(legend_x - area.x + 1);
            let (x, _) = buf.set_spans(legend_x, legend_y, &legend, width_remaining);
            legend_x = x;
        }
    }
}

/// The editable list of segments plus the Start/Reset button.
pub struct SegmentForm<'a> {
    block: Option<BlockWithLegend<'a>>,
    rows: &'a [SegmentRow],
    action_label: &'a str,
    action_focused: bool,
    locked: bool,
}

impl<'a> SegmentForm<'a> {
    pub fn new(rows: &'a [SegmentRow]) -> SegmentForm<'a> {
        SegmentForm {
            block: None,
            rows,
            action_label: "Start",
            action_focused: false,
            locked: false,
        }
    }

    pub fn block(mut self, block: BlockWithLegend<'a>) -> SegmentForm<'a> {
        self.block = Some(block);
        self
    }

    pub fn action(mut self, label: &'a str, focused: bool) -> SegmentForm<'a> {
        self.action_label = label;
        self.action_focused = focused;
        self
    }

    /// Greys the fields out while a run is in progress.
    pub fn locked(mut self, locked: bool) -> SegmentForm<'a> {
        self.locked = locked;
        self
    }

    fn field_style(&self, focused: bool, enabled: bool) -> Style {
        let base = if self.locked || !enabled {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::White)
        };
        if focused {
            base.add_modifier(Modifier::REVERSED)
        } else {
            base
        }
    }

    fn row_spans(&self, row: &'a SegmentRow) -> Spans<'a> {
        let checkbox = match row.enabled {
            Some(true) => "[x]",
            Some(false) => "[ ]",
            None => "   ",
        };
        let name_style = if row.enabled == Some(false) {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        let is_enabled = row.enabled.unwrap_or(true);

        Spans::from(vec![
            Span::styled(checkbox, self.field_style(row.toggle_focused, true)),
            Span::raw(" "),
            Span::styled(format!("{:<13}", row.name), name_style),
            Span::styled(
                format!("{:>3}", row.input),
                self.field_style(row.duration_focused, is_enabled),
            ),
            Span::raw(" min"),
        ])
    }
}

impl<'a> Widget for SegmentForm<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };

        let mut lines: Vec<Spans> = self.rows.iter().map(|row| self.row_spans(row)).collect();
        lines.push(Spans::default());

        let button_style = if self.action_focused {
            Style::default()
                .fg(Color::Red)
                .add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        };
        lines.push(Spans::from(Span::styled(
            format!("[ {} ]", self.action_label),
            button_style,
        )));

        let text_height = lines.len() as u16;
        let top_padding = (inner_area.height / 2).saturating_sub(text_height / 2);
        let text_area = Layout::default()
            .constraints([Constraint::Length(top_padding), Constraint::Min(text_height)])
            .split(inner_area)[1];

        if let Some(block) = self.block {
            block.render(area, buf);
        }
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(text_area, buf);
    }
}

/// Progress ring with the current segment and its countdown inside.
pub struct PrayerClock<'a> {
    block: Option<BlockWithLegend<'a>>,
    markers: String,
    segment: String,
    remaining: String,
    progress: f64,
}

impl<'a> PrayerClock<'a> {
    pub fn new() -> PrayerClock<'a> {
        PrayerClock {
            block: None,
            markers: String::new(),
            segment: String::new(),
            remaining: String::new(),
            progress: 0.0,
        }
    }

    pub fn block(mut self, block: BlockWithLegend<'a>) -> PrayerClock<'a> {
        self.block = Some(block);
        self
    }

    pub fn markers(mut self, markers: String) -> PrayerClock<'a> {
        self.markers = markers;
        self
    }

    pub fn segment(mut self, segment: String) -> PrayerClock<'a> {
        self.segment = segment;
        self
    }

    pub fn remaining(mut self, remaining: String) -> PrayerClock<'a> {
        self.remaining = remaining;
        self
    }

    pub fn progress(mut self, progress: f64) -> PrayerClock<'a> {
        self.progress = progress.clamp(0.0, 1.0);
        self
    }
}

impl<'a> Widget for PrayerClock<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_area = match &self.block {
            Some(block) => block.inner(area),
            None => area,
        };
        if let Some(block) = self.block {
            block.render(area, buf);
        }

        let ring_area = centered(
            inner_area,
            animation::RING_WIDTH as u16,
            animation::RING_HEIGHT as u16,
        );

        Paragraph::new(animation::progress_ring(1.0 - self.progress))
            .alignment(Alignment::Left)
            .render(ring_area, buf);

        let status_text = format!("{}\n{}\n{}", self.markers, self.remaining, self.segment);
        let text_area = ring_area.inner(&Margin {
            horizontal: 1,
            vertical: 1,
        });
        let text_height = status_text.lines().count() as u16;
        let ceil_padding = (text_area.height / 2).saturating_sub(text_height / 2);
        let text_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(ceil_padding), Constraint::Min(0)])
            .split(text_area)[1];

        Paragraph::new(status_text)
            .alignment(Alignment::Center)
            .render(text_area, buf);
    }
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);

    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
