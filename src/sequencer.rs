use crate::notification::Bell;
use crate::segment::{Segment, SegmentName};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// The moment a segment ends, measured from the start of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub segment: SegmentName,
    pub offset: Duration,
    pub is_final: bool,
}

impl ScheduleEntry {
    pub fn offset_millis(&self) -> u64 {
        self.offset.as_millis() as u64
    }
}

/// Lays the enabled segments end to end. Disabled segments are skipped and the
/// last remaining entry is marked final.
pub fn schedule(segments: &[Segment]) -> Vec<ScheduleEntry> {
    let mut entries: Vec<ScheduleEntry> = segments
        .iter()
        .filter(|segment| segment.enabled)
        .scan(Duration::ZERO, |elapsed, segment| {
            *elapsed += segment.duration.as_duration();
            Some(ScheduleEntry {
                segment: segment.name,
                offset: *elapsed,
                is_final: false,
            })
        })
        .collect();

    if let Some(last) = entries.last_mut() {
        last.is_final = true;
    }

    entries
}

pub fn total_duration(entries: &[ScheduleEntry]) -> Duration {
    entries.last().map(|e| e.offset).unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub segment: SegmentName,
    pub remaining: Duration,
    /// Share of the whole sequence already elapsed, in `0.0..1.0`.
    pub fraction: f64,
}

/// Where a run stands `elapsed` after it was started. `None` once every
/// segment has ended.
pub fn progress_at(entries: &[ScheduleEntry], elapsed: Duration) -> Option<Progress> {
    let current = entries.iter().find(|entry| entry.offset > elapsed)?;
    let total = total_duration(entries);

    Some(Progress {
        segment: current.segment,
        remaining: current.offset - elapsed,
        fraction: elapsed.as_secs_f64() / total.as_secs_f64(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerEvent {
    SegmentFinished { segment: SegmentName, is_final: bool },
    Completed,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SequencerError {
    #[error("there is no enabled segment to time")]
    EmptySchedule,
}

pub struct Sequencer;

impl Sequencer {
    /// Arms one timer per entry. Each timer rings `bell` when it fires and
    /// reports through the returned [`RunningSequence`].
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<B>(entries: Vec<ScheduleEntry>, bell: Arc<B>) -> Result<RunningSequence, SequencerError>
    where
        B: Bell + ?Sized + 'static,
    {
        if entries.is_empty() {
            return Err(SequencerError::EmptySchedule);
        }

        let started = Instant::now();
        let cancellation = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        info!(
            segments = entries.len(),
            total_secs = total_duration(&entries).as_secs(),
            "starting sequence"
        );

        for entry in entries.iter().copied() {
            debug!(segment = %entry.segment, offset_ms = entry.offset_millis(), "arming bell");
            let cancellation = cancellation.clone();
            let events_tx = events_tx.clone();
            let bell = Arc::clone(&bell);

            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancellation.cancelled() => {
                        debug!(segment = %entry.segment, "bell disarmed");
                    }
                    _ = sleep_until(started + entry.offset) => {
                        debug!(segment = %entry.segment, is_final = entry.is_final, "segment finished");
                        bell.ring();
                        // the receiver may already be gone when the app is shutting down
                        let _ = events_tx.send(SequencerEvent::SegmentFinished {
                            segment: entry.segment,
                            is_final: entry.is_final,
                        });
                        if entry.is_final {
                            info!("sequence completed");
                            let _ = events_tx.send(SequencerEvent::Completed);
                        }
                    }
                }
            });
        }

        Ok(RunningSequence {
            entries,
            started,
            cancellation,
            events_rx,
        })
    }
}

pub struct RunningSequence {
    entries: Vec<ScheduleEntry>,
    started: Instant,
    cancellation: CancellationToken,
    events_rx: mpsc::UnboundedReceiver<SequencerEvent>,
}

impl RunningSequence {
    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn progress(&self) -> Option<Progress> {
        progress_at(&self.entries, self.elapsed())
    }

    /// Disarms every bell that has not rung yet.
    pub fn cancel(&self) {
        if !self.cancellation.is_cancelled() {
            info!(elapsed_secs = self.elapsed().as_secs(), "sequence reset");
            self.cancellation.cancel();
        }
    }

    /// Next event in offset order. Pending forever once the sequence is over,
    /// so it can sit in a `select!` next to other sources.
    pub async fn next_event(&mut self) -> SequencerEvent {
        match self.events_rx.recv().await {
            Some(event) => event,
            None => std::future::pending().await,
        }
    }
}

impl Drop for RunningSequence {
    fn drop(&mut self) {
        self.cancellation.cancel();
    }
}
