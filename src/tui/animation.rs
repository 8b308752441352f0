use itertools::intersperse;
use std::iter;
use unicode_segmentation::UnicodeSegmentation;

pub const RING_WIDTH: usize = 21;
pub const RING_HEIGHT: usize = 11;

const RING: &str = "╭───────────────────╮
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
│                   │
╰───────────────────╯";

/// Border cells walked counter-clockwise from the top centre, so erasing a
/// prefix makes the ring shrink like a clock hand sweeping backwards.
fn border_path() -> Vec<(usize, usize)> {
    let (last_row, last_col) = (RING_HEIGHT - 1, RING_WIDTH - 1);
    let centre = RING_WIDTH / 2;

    iter::repeat(0)
        .zip((0..centre).rev())
        .chain((1..RING_HEIGHT).zip(iter::repeat(0)))
        .chain(iter::repeat(last_row).zip(1..RING_WIDTH))
        .chain((0..last_row).rev().zip(iter::repeat(last_col)))
        .chain(iter::repeat(0).zip((centre..last_col).rev()))
        .collect()
}

/// A rounded box whose border is drawn for the `remaining` share of it.
pub fn progress_ring(remaining: f64) -> String {
    let remaining = remaining.clamp(0.0, 1.0);
    let path = border_path();

    let keep = (path.len() as f64 * remaining).ceil() as usize;
    let erase = path.len() - keep;

    let mut cells: Vec<Vec<&str>> = RING
        .lines()
        .map(|line| line.graphemes(true).collect())
        .collect();
    for &(row, col) in path.iter().take(erase) {
        cells[row][col] = " ";
    }

    cells.iter().map(|row| row.concat() + "\n").collect()
}

/// One marker per enabled segment: filled once rung, a dot for the current one.
pub fn segment_markers(finished: usize, current: Option<usize>, total: usize) -> String {
    let markers = (0..total).map(|i| {
        if i < finished {
            "●"
        } else if Some(i) == current {
            "◌"
        } else {
            "○"
        }
    });
    intersperse(markers, " ").collect()
}
