use serde::{Deserialize, Serialize};

use crate::{config::Config, utils::format_time};

use super::state::SessionState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonView {
    pub icon: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemView {
    /// `"1."`, `"2."`, ...
    pub number: String,
    pub title: String,
    pub duration: String,
    pub active: bool,
}

/// Everything the host needs to draw the control strip and its dropdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayView {
    pub prev: ButtonView,
    pub play: ButtonView,
    pub next: ButtonView,
    /// `"i / n"`, one-based.
    pub indicator: String,
    pub progress: String,
    pub auto_play: ButtonView,
    pub auto_advance: ButtonView,
    pub items: Vec<ItemView>,
    pub list_visible: bool,
}

impl OverlayView {
    pub fn build(session: &SessionState, config: &Config) -> Self {
        let icons = &config.icons;
        let labels = &config.labels;
        let button = |icon: &str, title: &str| ButtonView {
            icon: icon.to_string(),
            title: title.to_string(),
        };

        let play = if session.playing {
            button(&icons.pause, &labels.pause)
        } else {
            button(&icons.play, &labels.play)
        };
        let auto_play = if session.auto_play {
            button(&icons.auto_play_active, &labels.auto_play_on)
        } else {
            button(&icons.auto_play, &labels.auto_play_off)
        };
        let auto_advance = if session.auto_advance {
            button(&icons.auto_advance_active, &labels.auto_advance_on)
        } else {
            button(&icons.auto_advance, &labels.auto_advance_off)
        };

        let items = session
            .segments
            .iter()
            .enumerate()
            .map(|(index, segment)| ItemView {
                number: format!("{}.", index + 1),
                title: segment.title.clone(),
                duration: format_time(segment.duration()),
                active: index == session.current_index,
            })
            .collect();

        Self {
            prev: button(&icons.prev, &labels.prev),
            play,
            next: button(&icons.next, &labels.next),
            indicator: format!("{} / {}", session.current_index + 1, session.segments.len()),
            progress: session.progress_text.clone(),
            auto_play,
            auto_advance,
            items,
            list_visible: session.list_visible,
        }
    }
}

/// `"m:ss / m:ss"`: elapsed inside the current segment over its length.
pub fn progress_text(session: &SessionState, current_time: f64) -> String {
    let duration = session
        .current_segment()
        .map(|segment| segment.duration())
        .unwrap_or(0.0);
    format!(
        "{} / {}",
        format_time(session.elapsed_in_segment(current_time)),
        format_time(duration)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Segment;

    fn session() -> SessionState {
        SessionState {
            segments: vec![
                Segment {
                    start: 0.0,
                    end: 65.0,
                    title: "Intro".into(),
                },
                Segment {
                    start: 120.0,
                    end: 300.0,
                    title: "-".into(),
                },
            ],
            current_index: 1,
            ..SessionState::default()
        }
    }

    #[test]
    fn view_reflects_session() {
        let config = Config::default();
        let mut session = session();
        session.playing = true;
        session.auto_advance = true;

        let view = OverlayView::build(&session, &config);
        assert_eq!(view.indicator, "2 / 2");
        assert_eq!(view.play.title, config.labels.pause);
        assert_eq!(view.auto_play.icon, config.icons.auto_play);
        assert_eq!(view.auto_advance.title, config.labels.auto_advance_on);
        assert_eq!(view.items[0].number, "1.");
        assert_eq!(view.items[0].duration, "1:05");
        assert!(!view.items[0].active);
        assert!(view.items[1].active);
    }

    #[test]
    fn progress_counts_from_segment_start() {
        let session = session();
        assert_eq!(progress_text(&session, 185.0), "1:05 / 3:00");
        assert_eq!(progress_text(&session, 30.0), "0:00 / 3:00");
    }
}
