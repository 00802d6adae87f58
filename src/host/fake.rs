//! In-memory host page used by controller and watcher tests.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use anyhow::{bail, Result};

use crate::playback::{ControllerEvent, OverlayView};

use super::{Binding, HostPage, ListenerId, MediaElement, Thumbnail, ThumbnailKind};

#[derive(Debug, Default)]
pub struct FakeMediaState {
    pub current_time: f64,
    pub ready_state: u8,
    pub paused: bool,
    pub refuse_play: bool,
    pub seeks: Vec<f64>,
    pub play_calls: usize,
    pub pause_calls: usize,
}

#[derive(Debug, Default)]
pub struct FakeMedia {
    state: Mutex<FakeMediaState>,
}

impl FakeMedia {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeMediaState {
                paused: true,
                ready_state: 4,
                ..FakeMediaState::default()
            }),
        })
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeMediaState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.with(|state| state.seeks.clone())
    }

    pub fn set_time(&self, seconds: f64) {
        self.with(|state| state.current_time = seconds);
    }
}

impl MediaElement for FakeMedia {
    fn current_time(&self) -> f64 {
        self.with(|state| state.current_time)
    }

    fn set_current_time(&self, seconds: f64) {
        self.with(|state| {
            state.current_time = seconds;
            state.seeks.push(seconds);
        });
    }

    fn play(&self) -> Result<()> {
        self.with(|state| {
            state.play_calls += 1;
            if state.refuse_play {
                bail!("play() rejected");
            }
            state.paused = false;
            Ok(())
        })
    }

    fn pause(&self) {
        self.with(|state| {
            state.pause_calls += 1;
            state.paused = true;
        });
    }

    fn ready_state(&self) -> u8 {
        self.with(|state| state.ready_state)
    }
}

#[derive(Debug, Default)]
pub struct FakeHostState {
    pub url: String,
    pub media: Option<Arc<FakeMedia>>,
    /// Lookups that miss before the media element shows up.
    pub media_misses: u32,
    pub locate_calls: u32,
    pub ad_playing: bool,
    pub picture_in_picture: bool,
    pub thumbnails: Vec<Thumbnail>,
    pub navigations: Vec<String>,
    pub overlay: Option<OverlayView>,
    pub renders: usize,
    pub listeners: BTreeMap<u64, Binding>,
    pub next_listener: u64,
}

#[derive(Debug, Default)]
pub struct FakeHost {
    state: Mutex<FakeHostState>,
}

impl FakeHost {
    pub fn new(url: &str) -> Arc<Self> {
        let host = Self::default();
        host.with(|state| state.url = url.to_string());
        Arc::new(host)
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut FakeHostState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    pub fn set_url(&self, url: &str) {
        self.with(|state| state.url = url.to_string());
    }

    pub fn attach_media(&self, media: Arc<FakeMedia>) {
        self.with(|state| state.media = Some(media));
    }

    pub fn overlay(&self) -> Option<OverlayView> {
        self.with(|state| state.overlay.clone())
    }

    pub fn navigations(&self) -> Vec<String> {
        self.with(|state| state.navigations.clone())
    }

    pub fn listener_count(&self) -> usize {
        self.with(|state| state.listeners.len())
    }

    /// Events the adapter would dispatch if every binding for `binding` fired.
    pub fn fire(&self, binding: Binding) -> Vec<ControllerEvent> {
        self.with(|state| {
            state
                .listeners
                .values()
                .filter(|bound| **bound == binding)
                .filter_map(Binding::translate)
                .collect()
        })
    }

    pub fn badged(&self) -> Vec<String> {
        self.with(|state| {
            state
                .thumbnails
                .iter()
                .filter(|thumbnail| thumbnail.has_badge)
                .map(|thumbnail| thumbnail.href.clone())
                .collect()
        })
    }
}

impl HostPage for FakeHost {
    fn current_url(&self) -> String {
        self.with(|state| state.url.clone())
    }

    fn find_video_element(&self) -> Option<Arc<dyn MediaElement>> {
        self.with(|state| {
            state.locate_calls += 1;
            if state.media_misses > 0 {
                state.media_misses -= 1;
                return None;
            }
            state
                .media
                .clone()
                .map(|media| media as Arc<dyn MediaElement>)
        })
    }

    fn list_thumbnails(&self, kind: ThumbnailKind) -> Vec<Thumbnail> {
        self.with(|state| {
            state
                .thumbnails
                .iter()
                .filter(|thumbnail| thumbnail.kind == kind)
                .cloned()
                .collect()
        })
    }

    fn set_playable_badge(&self, thumbnail: &Thumbnail, label: Option<&str>) {
        self.with(|state| {
            if let Some(existing) = state
                .thumbnails
                .iter_mut()
                .find(|existing| existing.handle == thumbnail.handle)
            {
                existing.has_badge = label.is_some();
            }
        });
    }

    fn is_ad_playing(&self) -> bool {
        self.with(|state| state.ad_playing)
    }

    fn is_picture_in_picture(&self) -> bool {
        self.with(|state| state.picture_in_picture)
    }

    fn navigate(&self, path: &str) {
        self.with(|state| state.navigations.push(path.to_string()));
    }

    fn render_overlay(&self, view: &OverlayView) {
        self.with(|state| {
            state.overlay = Some(view.clone());
            state.renders += 1;
        });
    }

    fn remove_overlay(&self) {
        self.with(|state| state.overlay = None);
    }

    fn add_listener(&self, binding: Binding) -> ListenerId {
        self.with(|state| {
            state.next_listener += 1;
            state.listeners.insert(state.next_listener, binding);
            ListenerId(state.next_listener)
        })
    }

    fn remove_listener(&self, id: ListenerId) {
        self.with(|state| {
            state.listeners.remove(&id.0);
        });
    }
}
