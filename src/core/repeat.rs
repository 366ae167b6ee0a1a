//! Repeat tracker: recently spoken entry ids per speaker and group.

use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use tracing::debug;

use crate::schema::entity::Guid;

#[derive(Debug, Clone, Default)]
struct SpeakerHistory {
    last_touched: u64,
    groups: FxHashMap<u8, Vec<u8>>,
}

/// Process-lifetime repeat history keyed by speaker identity.
///
/// Entries are removed through [`RepeatTracker::forget_speaker`] when the
/// host destroys a speaker. As a fallback the tracker keeps at most
/// `max_speakers` speakers and evicts the least recently touched one.
#[derive(Debug, Clone)]
pub struct RepeatTracker {
    speakers: FxHashMap<Guid, SpeakerHistory>,
    /// Speakers by `last_touched`, oldest first.
    by_age: BTreeMap<u64, Guid>,
    window_limit: usize,
    max_speakers: usize,
    clock: u64,
}

impl RepeatTracker {
    pub fn new(window_limit: usize, max_speakers: usize) -> Self {
        Self {
            speakers: FxHashMap::default(),
            by_age: BTreeMap::new(),
            window_limit: window_limit.max(1),
            max_speakers: max_speakers.max(1),
            clock: 0,
        }
    }

    /// Recently used ids for this speaker and group, oldest first.
    pub fn recent(&self, speaker: Guid, group: u8) -> &[u8] {
        self.speakers
            .get(&speaker)
            .and_then(|h| h.groups.get(&group))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Remember that `id` was just spoken.
    pub fn record(&mut self, speaker: Guid, group: u8, id: u8) {
        let limit = self.window_limit;
        let window = self.history_mut(speaker).groups.entry(group).or_default();
        window.retain(|&used| used != id);
        window.push(id);
        if window.len() > limit {
            let excess = window.len() - limit;
            window.drain(..excess);
        }
    }

    /// Clear the window, optionally keeping its most recent id.
    pub fn reset(&mut self, speaker: Guid, group: u8, keep_last: bool) {
        if let Some(window) = self
            .speakers
            .get_mut(&speaker)
            .and_then(|h| h.groups.get_mut(&group))
        {
            let last = window.last().copied();
            window.clear();
            if let (true, Some(id)) = (keep_last, last) {
                window.push(id);
            }
        }
    }

    /// Drop all history for a destroyed speaker.
    pub fn forget_speaker(&mut self, speaker: Guid) -> bool {
        match self.speakers.remove(&speaker) {
            Some(history) => {
                self.by_age.remove(&history.last_touched);
                true
            }
            None => false,
        }
    }

    pub fn tracked_speakers(&self) -> usize {
        self.speakers.len()
    }

    fn history_mut(&mut self, speaker: Guid) -> &mut SpeakerHistory {
        self.clock += 1;
        let clock = self.clock;
        match self.speakers.get(&speaker).map(|h| h.last_touched) {
            Some(touched) => {
                self.by_age.remove(&touched);
            }
            None if self.speakers.len() >= self.max_speakers => self.evict_oldest(),
            None => {}
        }
        self.by_age.insert(clock, speaker);
        let history = self.speakers.entry(speaker).or_default();
        history.last_touched = clock;
        history
    }

    fn evict_oldest(&mut self) {
        if let Some((_, guid)) = self.by_age.pop_first() {
            self.speakers.remove(&guid);
            debug!(speaker = %guid, "evicted repeat history of least recent speaker");
        }
    }
}

impl Default for RepeatTracker {
    fn default() -> Self {
        Self::new(u8::MAX as usize, 65_536)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_and_read_back() {
        let mut tracker = RepeatTracker::default();
        tracker.record(Guid(1), 0, 3);
        tracker.record(Guid(1), 0, 5);
        assert_eq!(tracker.recent(Guid(1), 0), &[3, 5]);
        assert!(tracker.recent(Guid(1), 1).is_empty());
        assert!(tracker.recent(Guid(2), 0).is_empty());
    }

    #[test]
    fn window_is_bounded() {
        let mut tracker = RepeatTracker::new(2, 10);
        for id in 0..5 {
            tracker.record(Guid(1), 0, id);
        }
        assert_eq!(tracker.recent(Guid(1), 0), &[3, 4]);
    }

    #[test]
    fn rerecording_moves_id_to_back() {
        let mut tracker = RepeatTracker::default();
        tracker.record(Guid(1), 0, 1);
        tracker.record(Guid(1), 0, 2);
        tracker.record(Guid(1), 0, 1);
        assert_eq!(tracker.recent(Guid(1), 0), &[2, 1]);
    }

    #[test]
    fn reset_keeps_last_when_asked() {
        let mut tracker = RepeatTracker::default();
        tracker.record(Guid(1), 0, 1);
        tracker.record(Guid(1), 0, 2);
        tracker.reset(Guid(1), 0, true);
        assert_eq!(tracker.recent(Guid(1), 0), &[2]);
        tracker.reset(Guid(1), 0, false);
        assert!(tracker.recent(Guid(1), 0).is_empty());
    }

    #[test]
    fn forget_speaker_removes_history() {
        let mut tracker = RepeatTracker::default();
        tracker.record(Guid(1), 0, 1);
        assert!(tracker.forget_speaker(Guid(1)));
        assert!(!tracker.forget_speaker(Guid(1)));
        assert_eq!(tracker.tracked_speakers(), 0);
    }

    #[test]
    fn least_recent_speaker_evicted_at_capacity() {
        let mut tracker = RepeatTracker::new(8, 2);
        tracker.record(Guid(1), 0, 1);
        tracker.record(Guid(2), 0, 1);
        tracker.record(Guid(1), 0, 2); // touch 1 again
        tracker.record(Guid(3), 0, 1); // evicts 2
        assert_eq!(tracker.tracked_speakers(), 2);
        assert!(tracker.recent(Guid(2), 0).is_empty());
        assert_eq!(tracker.recent(Guid(1), 0), &[1, 2]);
    }

    #[test]
    fn eviction_follows_touch_order() {
        let mut tracker = RepeatTracker::new(8, 3);
        for speaker in 1..=3 {
            tracker.record(Guid(speaker), 0, 1);
        }
        tracker.record(Guid(1), 0, 2);
        tracker.record(Guid(4), 0, 1); // evicts 2
        tracker.record(Guid(5), 0, 1); // evicts 3
        assert!(tracker.recent(Guid(2), 0).is_empty());
        assert!(tracker.recent(Guid(3), 0).is_empty());
        assert_eq!(tracker.recent(Guid(1), 0), &[1, 2]);
        assert_eq!(tracker.tracked_speakers(), 3);
        assert_eq!(tracker.by_age.len(), 3);
    }

    #[test]
    fn forgotten_speaker_leaves_eviction_order() {
        let mut tracker = RepeatTracker::new(8, 2);
        tracker.record(Guid(1), 0, 1);
        tracker.record(Guid(2), 0, 1);
        tracker.forget_speaker(Guid(1));
        tracker.record(Guid(3), 0, 1);
        tracker.record(Guid(4), 0, 1); // evicts 2, not the forgotten 1
        assert!(tracker.recent(Guid(2), 0).is_empty());
        assert_eq!(tracker.recent(Guid(3), 0), &[1]);
        assert_eq!(tracker.recent(Guid(4), 0), &[1]);
        assert_eq!(tracker.by_age.len(), tracker.tracked_speakers());
    }
}
