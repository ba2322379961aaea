use crate::foundation::core::{Fps, FrameIndex, SlideDuration};

/// One page of the plan and how many identical frames it occupies.
#[derive(Debug, PartialEq, Eq)]
pub struct PlanEntry<'a, T> {
    /// Borrowed page content (usually a composited frame).
    pub item: &'a T,
    /// Number of consecutive output frames showing `item`.
    pub repeat: u64,
}

impl<T> Clone for PlanEntry<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for PlanEntry<'_, T> {}

/// Ordered `(item, repeat)` sequence consumed once by the encoder.
///
/// Entry order is the input order. Every entry repeats `fps * duration` times.
#[derive(Clone, Debug)]
pub struct FramePlan<'a, T> {
    entries: Vec<PlanEntry<'a, T>>,
    fps: Fps,
    duration: SlideDuration,
}

/// Plan the output frame sequence for `items`, already in page order.
pub fn plan<T>(items: &[T], duration: SlideDuration, fps: Fps) -> FramePlan<'_, T> {
    let repeat = fps.frames_for(duration);
    FramePlan {
        entries: items.iter().map(|item| PlanEntry { item, repeat }).collect(),
        fps,
        duration,
    }
}

impl<'a, T> FramePlan<'a, T> {
    /// Entries in output order.
    pub fn entries(&self) -> &[PlanEntry<'a, T>] {
        &self.entries
    }

    /// Number of planned pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Return `true` when there is nothing to encode.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output frame rate the plan was built for.
    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Per-page duration the plan was built for.
    pub fn duration(&self) -> SlideDuration {
        self.duration
    }

    /// Total number of output frames.
    pub fn total_frames(&self) -> u64 {
        self.entries.iter().map(|e| e.repeat).sum()
    }

    /// Every output frame in order, paired with the item it shows.
    pub fn frames(&self) -> impl Iterator<Item = (FrameIndex, &'a T)> + '_ {
        self.entries
            .iter()
            .flat_map(|e| std::iter::repeat_n(e.item, e.repeat as usize))
            .enumerate()
            .map(|(i, item)| (FrameIndex(i as u64), item))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/plan/sequence.rs"]
mod tests;
