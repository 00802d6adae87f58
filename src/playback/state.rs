use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    host::{ListenerId, MediaElement},
    models::Segment,
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    #[default]
    Idle,
    Locating,
    Ready,
    Destroyed,
}

/// Everything tied to one video page visit. Reset wholesale on teardown.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub video_no: Option<u64>,
    pub media: Option<Arc<dyn MediaElement>>,
    pub segments: Vec<Segment>,
    pub current_index: usize,
    pub playing: bool,
    /// Set before every seek the controller makes; the next `seeked` consumes it.
    pub programmatic_seek: bool,
    pub ad_playing: bool,
    /// A next-video lookup is in flight; boundary checks hold off until it lands.
    pub advancing: bool,
    pub retry_count: u32,
    pub auto_play: bool,
    pub auto_advance: bool,
    pub overlay_mounted: bool,
    pub list_visible: bool,
    pub progress_text: String,
    pub listeners: Vec<ListenerId>,
}

impl SessionState {
    pub fn current_segment(&self) -> Option<&Segment> {
        self.segments.get(self.current_index)
    }

    pub fn is_last(&self) -> bool {
        self.current_index + 1 >= self.segments.len()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index >= self.segments.len() {
            return false;
        }
        self.current_index = index;
        true
    }

    pub fn step_back(&mut self) -> bool {
        if self.current_index == 0 {
            return false;
        }
        self.current_index -= 1;
        true
    }

    pub fn step_forward(&mut self) -> bool {
        if self.is_last() {
            return false;
        }
        self.current_index += 1;
        true
    }

    /// Returns true when this `seeked` was the echo of a controller seek.
    pub fn consume_seek(&mut self) -> bool {
        std::mem::take(&mut self.programmatic_seek)
    }

    /// Elapsed time inside the current segment, 0 when the playhead is outside it.
    pub fn elapsed_in_segment(&self, current_time: f64) -> f64 {
        let Some(segment) = self.current_segment() else {
            return 0.0;
        };
        let elapsed = current_time - segment.start;
        if elapsed < 0.0 || elapsed > segment.duration() {
            0.0
        } else {
            elapsed
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ControllerSnapshot {
    pub phase: Phase,
    pub video_no: Option<u64>,
    pub segment_count: usize,
    pub current_index: usize,
    pub playing: bool,
    pub programmatic_seek: bool,
    pub ad_playing: bool,
    pub advancing: bool,
    pub retry_count: u32,
    pub auto_play: bool,
    pub auto_advance: bool,
    pub overlay_mounted: bool,
    pub list_visible: bool,
    pub listener_count: usize,
    pub has_media: bool,
}

impl ControllerSnapshot {
    pub fn capture(phase: Phase, session: &SessionState) -> Self {
        Self {
            phase,
            video_no: session.video_no,
            segment_count: session.segments.len(),
            current_index: session.current_index,
            playing: session.playing,
            programmatic_seek: session.programmatic_seek,
            ad_playing: session.ad_playing,
            advancing: session.advancing,
            retry_count: session.retry_count,
            auto_play: session.auto_play,
            auto_advance: session.auto_advance,
            overlay_mounted: session.overlay_mounted,
            list_visible: session.list_visible,
            listener_count: session.listeners.len(),
            has_media: session.media.is_some(),
        }
    }

    /// True when no session data survives, regardless of phase.
    pub fn is_cleared(&self) -> bool {
        *self
            == Self {
                phase: self.phase,
                ..Self::capture(self.phase, &SessionState::default())
            }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with(count: usize) -> SessionState {
        SessionState {
            segments: (0..count)
                .map(|i| Segment {
                    start: i as f64 * 100.0,
                    end: i as f64 * 100.0 + 60.0,
                    title: format!("song {i}"),
                })
                .collect(),
            ..SessionState::default()
        }
    }

    #[test]
    fn step_back_stops_at_first_segment() {
        let mut session = session_with(3);
        assert!(!session.step_back());
        assert_eq!(session.current_index, 0);

        session.current_index = 2;
        assert!(session.step_back());
        assert_eq!(session.current_index, 1);
    }

    #[test]
    fn step_forward_stops_at_last_segment() {
        let mut session = session_with(2);
        assert!(session.step_forward());
        assert!(session.is_last());
        assert!(!session.step_forward());
        assert_eq!(session.current_index, 1);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut session = session_with(2);
        assert!(!session.select(2));
        assert!(session.select(1));
        assert_eq!(session.current_index, 1);
    }

    #[test]
    fn consume_seek_is_one_shot() {
        let mut session = session_with(1);
        session.programmatic_seek = true;
        assert!(session.consume_seek());
        assert!(!session.consume_seek());
    }

    #[test]
    fn elapsed_outside_segment_is_zero() {
        let mut session = session_with(2);
        session.current_index = 1;
        assert_eq!(session.elapsed_in_segment(130.0), 30.0);
        assert_eq!(session.elapsed_in_segment(90.0), 0.0);
        assert_eq!(session.elapsed_in_segment(161.0), 0.0);
    }

    #[test]
    fn reset_clears_everything() {
        let mut session = session_with(3);
        session.current_index = 2;
        session.playing = true;
        session.auto_advance = true;
        session.listeners.push(ListenerId(4));
        session.reset();

        assert!(ControllerSnapshot::capture(Phase::Destroyed, &session).is_cleared());
    }
}
