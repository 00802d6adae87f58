use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MediaEvent {
    TimeUpdate,
    Pause,
    Seeked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayAction {
    Prev,
    TogglePlay,
    Next,
    ToggleAutoPlay,
    ToggleAutoAdvance,
    Select(usize),
    ShowList,
    HideList,
}

/// Signals raised by other components on the same page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "type")]
pub enum PageEvent {
    #[serde(rename_all = "camelCase")]
    SegmentSelected { video_no: u64, timeline_index: usize },
    PlaybackStop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ControllerEvent {
    Media(MediaEvent),
    Overlay(OverlayAction),
    Page(PageEvent),
}

const PAGE_EVENT_CAPACITY: usize = 32;

/// Broadcast bus for [`PageEvent`]s; cloning shares the channel.
#[derive(Debug, Clone)]
pub struct PageEvents {
    sender: broadcast::Sender<PageEvent>,
}

impl Default for PageEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl PageEvents {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(PAGE_EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PageEvent> {
        self.sender.subscribe()
    }

    /// Returns how many subscribers saw the event; zero when nobody listens.
    pub fn emit(&self, event: PageEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    pub fn select_segment(&self, video_no: u64, timeline_index: usize) -> usize {
        self.emit(PageEvent::SegmentSelected {
            video_no,
            timeline_index,
        })
    }

    pub fn stop_playback(&self) -> usize {
        self.emit(PageEvent::PlaybackStop)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_selected_uses_page_field_names() {
        let event: PageEvent = serde_json::from_str(
            r#"{"type":"segmentSelected","videoNo":12,"timelineIndex":3}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            PageEvent::SegmentSelected {
                video_no: 12,
                timeline_index: 3
            }
        );
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_dropped() {
        let events = PageEvents::new();
        assert_eq!(events.stop_playback(), 0);

        let mut rx = events.subscribe();
        assert_eq!(events.select_segment(5, 1), 1);
        assert_eq!(
            rx.recv().await.unwrap(),
            PageEvent::SegmentSelected {
                video_no: 5,
                timeline_index: 1
            }
        );
    }
}
