//! Cooperative scheduling of tile flip animations.
//!
//! A flip changes tile state the moment it is requested. The timeline only tracks when the
//! animation would start, pass its halfway point and finish, so that the level can run its
//! post-reveal rules at the right moment.

use std::collections::BTreeMap;
use std::time::Duration;

use bevy::prelude::UVec2;
use serde::{Deserialize, Serialize};

use crate::tile::Face;

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct BatchId(u32);

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlipProgress {
    Started { position: UVec2, face: Face },
    Halfway { position: UVec2, face: Face },
    Completed { position: UVec2, face: Face },
    /// Sent after the `Completed` of the batch's last flip.
    BatchCompleted(BatchId),
}

#[derive(Clone, Debug)]
struct ScheduledFlip {
    position: UVec2,
    face: Face,
    batch: Option<BatchId>,
    starts_at: Duration,
    started: bool,
    halfway: bool,
}

#[derive(Clone, Debug)]
pub struct FlipTimeline {
    now: Duration,
    flip_duration: Duration,
    /// Ordered by start time, ties in scheduling order.
    pending: Vec<ScheduledFlip>,
    /// Flips still outstanding per open batch.
    open_batches: BTreeMap<BatchId, usize>,
    next_batch: u32,
}

impl FlipTimeline {
    pub fn new(flip_duration: Duration) -> Self {
        FlipTimeline {
            now: Duration::ZERO,
            flip_duration,
            pending: Vec::new(),
            open_batches: BTreeMap::new(),
            next_batch: 0,
        }
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    pub fn flip_duration(&self) -> Duration {
        self.flip_duration
    }

    pub fn schedule(&mut self, position: UVec2, face: Face, delay: Duration) {
        self.push(position, face, delay, None);
    }

    /// Opens a new batch. A batch with nothing scheduled in it completes on the next
    /// [`advance`](Self::advance).
    pub fn begin_batch(&mut self) -> BatchId {
        let batch = BatchId(self.next_batch);
        self.next_batch += 1;
        self.open_batches.insert(batch, 0);
        batch
    }

    pub fn schedule_in_batch(
        &mut self,
        batch: BatchId,
        position: UVec2,
        face: Face,
        delay: Duration,
    ) {
        *self.open_batches.entry(batch).or_default() += 1;
        self.push(position, face, delay, Some(batch));
    }

    fn push(&mut self, position: UVec2, face: Face, delay: Duration, batch: Option<BatchId>) {
        let starts_at = self.now + delay;
        let index = self
            .pending
            .partition_point(|flip| flip.starts_at <= starts_at);
        self.pending.insert(
            index,
            ScheduledFlip {
                position,
                face,
                batch,
                starts_at,
                started: false,
                halfway: false,
            },
        );
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty() && self.open_batches.is_empty()
    }

    pub fn is_flipping(&self, position: UVec2) -> bool {
        self.pending.iter().any(|flip| flip.position == position)
    }

    pub fn is_batch_open(&self, batch: BatchId) -> bool {
        self.open_batches.contains_key(&batch)
    }

    /// Moves time forward by `dt`, reporting every milestone passed along the way.
    pub fn advance(&mut self, dt: Duration) -> Vec<FlipProgress> {
        self.now += dt;
        let now = self.now;
        let halfway = self.flip_duration / 2;
        let mut progress = Vec::new();
        let mut finished = Vec::new();

        for (index, flip) in self.pending.iter_mut().enumerate() {
            if flip.starts_at > now {
                break;
            }
            if !flip.started {
                flip.started = true;
                progress.push(FlipProgress::Started {
                    position: flip.position,
                    face: flip.face,
                });
            }
            if !flip.halfway && now >= flip.starts_at + halfway {
                flip.halfway = true;
                progress.push(FlipProgress::Halfway {
                    position: flip.position,
                    face: flip.face,
                });
            }
            if now >= flip.starts_at + self.flip_duration {
                progress.push(FlipProgress::Completed {
                    position: flip.position,
                    face: flip.face,
                });
                finished.push(index);
            }
        }

        for index in finished.into_iter().rev() {
            let flip = self.pending.remove(index);
            if let Some(remaining) = flip
                .batch
                .and_then(|batch| self.open_batches.get_mut(&batch))
            {
                *remaining = remaining.saturating_sub(1);
            }
        }

        let done: Vec<BatchId> = self
            .open_batches
            .iter()
            .filter(|(_, remaining)| **remaining == 0)
            .map(|(batch, _)| *batch)
            .collect();
        for batch in done {
            self.open_batches.remove(&batch);
            progress.push(FlipProgress::BatchCompleted(batch));
        }
        progress
    }

    /// Completes every pending flip immediately, in the order they would have finished.
    pub fn finish_all(&mut self) -> Vec<FlipProgress> {
        let end = self
            .pending
            .iter()
            .map(|flip| flip.starts_at + self.flip_duration)
            .max()
            .unwrap_or(self.now);
        self.advance(end.saturating_sub(self.now))
    }
}
