//! Narrow view of the host video page.
//!
//! The controller and watcher never touch page markup directly. An adapter
//! implements [`HostPage`] and [`MediaElement`] over the real page, fires the
//! [`ControllerEvent`] returned by [`Binding::translate`] whenever a registered
//! binding's native event occurs, and renders [`OverlayView`] values.

use std::{fmt, sync::Arc};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::playback::{ControllerEvent, MediaEvent, OverlayAction, OverlayView};

#[cfg(test)]
pub mod fake;

/// `HTMLMediaElement.readyState` value meaning enough data to play ahead.
pub const HAVE_FUTURE_DATA: u8 = 3;

/// The page's video element.
pub trait MediaElement: Send + Sync + fmt::Debug {
    fn current_time(&self) -> f64;
    fn set_current_time(&self, seconds: f64);
    /// Starts playback; the page may refuse (autoplay policy, element gone).
    fn play(&self) -> Result<()>;
    fn pause(&self);
    fn ready_state(&self) -> u8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListenerId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OverlayControl {
    Prev,
    PlayPause,
    Next,
    AutoPlay,
    AutoAdvance,
    Item(usize),
}

/// A native event subscription the controller asks the adapter to hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Binding {
    MediaTimeUpdate,
    MediaPause,
    MediaSeeked,
    /// Clicks on the overlay must not reach the player underneath.
    OverlaySwallowClicks,
    OverlayHoverEnter,
    OverlayHoverLeave,
    OverlayClick(OverlayControl),
}

impl Binding {
    /// Internal event the adapter dispatches when this binding fires.
    pub fn translate(&self) -> Option<ControllerEvent> {
        let event = match self {
            Binding::MediaTimeUpdate => ControllerEvent::Media(MediaEvent::TimeUpdate),
            Binding::MediaPause => ControllerEvent::Media(MediaEvent::Pause),
            Binding::MediaSeeked => ControllerEvent::Media(MediaEvent::Seeked),
            Binding::OverlaySwallowClicks => return None,
            Binding::OverlayHoverEnter => ControllerEvent::Overlay(OverlayAction::ShowList),
            Binding::OverlayHoverLeave => ControllerEvent::Overlay(OverlayAction::HideList),
            Binding::OverlayClick(control) => ControllerEvent::Overlay(match control {
                OverlayControl::Prev => OverlayAction::Prev,
                OverlayControl::PlayPause => OverlayAction::TogglePlay,
                OverlayControl::Next => OverlayAction::Next,
                OverlayControl::AutoPlay => OverlayAction::ToggleAutoPlay,
                OverlayControl::AutoAdvance => OverlayAction::ToggleAutoAdvance,
                OverlayControl::Item(index) => OverlayAction::Select(*index),
            }),
        };
        Some(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ThumbnailKind {
    /// Card on the channel's video listing page.
    ChannelCard,
    /// Recommendation next to the player on a video page.
    Recommendation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    /// Adapter-assigned handle, stable while the thumbnail stays in the page.
    pub handle: u64,
    pub href: String,
    pub kind: ThumbnailKind,
    pub has_badge: bool,
}

pub trait HostPage: Send + Sync {
    fn current_url(&self) -> String;
    fn find_video_element(&self) -> Option<Arc<dyn MediaElement>>;
    fn list_thumbnails(&self, kind: ThumbnailKind) -> Vec<Thumbnail>;
    /// Adds the badge carrying `label`, or removes it when `label` is `None`.
    fn set_playable_badge(&self, thumbnail: &Thumbnail, label: Option<&str>);
    fn is_ad_playing(&self) -> bool;
    fn is_picture_in_picture(&self) -> bool;
    /// Same-document navigation to `path` (history push plus route notification).
    fn navigate(&self, path: &str);
    /// Mounts the overlay next to the video element, or updates it in place.
    fn render_overlay(&self, view: &OverlayView);
    fn remove_overlay(&self);
    fn add_listener(&self, binding: Binding) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}
