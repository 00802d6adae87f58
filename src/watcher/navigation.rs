use std::{collections::HashSet, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;

use crate::{
    config::Config,
    host::{HostPage, ThumbnailKind},
    log_debug, log_info,
    playback::{video_no_from_url, PlaybackController},
    timeline::TimelineService,
};

use super::{loop_worker::watch_loop, WatcherHandle};

const ENABLE_LOGS: bool = true;

/// Page regions whose churn never affects playback (chat, our own overlay).
const IGNORED_MUTATION_CLASSES: [&str; 3] = ["vod_chatting", "progress-indicator", "timeline-dropdown"];

static THUMBNAIL_VIDEO_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/video/(\d+)").expect("thumbnail href regex should compile"));

/// One observed DOM change, reduced to the class of its target node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationRecord {
    pub target_class: String,
}

impl MutationRecord {
    pub fn new(target_class: impl Into<String>) -> Self {
        Self {
            target_class: target_class.into(),
        }
    }

    fn is_ignored(&self) -> bool {
        IGNORED_MUTATION_CLASSES
            .iter()
            .any(|class| self.target_class.contains(class))
    }
}

pub type MutationBatch = Vec<MutationRecord>;

#[derive(Debug, Default)]
struct WatchState {
    last_url: String,
    last_pip: bool,
}

/// Follows same-document navigation and keeps the controller and badges in sync.
#[derive(Clone)]
pub struct NavigationWatcher {
    controller: PlaybackController,
    host: Arc<dyn HostPage>,
    service: TimelineService,
    config: Arc<Config>,
    state: Arc<Mutex<WatchState>>,
    video_page_prefix: String,
    channel_videos_pattern: Regex,
}

impl NavigationWatcher {
    pub fn new(
        controller: PlaybackController,
        host: Arc<dyn HostPage>,
        service: TimelineService,
        config: Arc<Config>,
    ) -> Result<Self> {
        let origin = config.platform.page_origin.trim_end_matches('/');
        let channel_videos_pattern = Regex::new(&format!(
            r"^{}/{}/videos(?:\?.*|$)",
            regex::escape(origin),
            regex::escape(&config.platform.target_channel_id)
        ))
        .context("Failed to build channel videos url pattern")?;

        Ok(Self {
            video_page_prefix: format!("{origin}/video/"),
            channel_videos_pattern,
            controller,
            host,
            service,
            config,
            state: Arc::new(Mutex::new(WatchState::default())),
        })
    }

    /// Spawns the watch loop over `batches` until the feed closes or the handle stops it.
    pub fn start(&self, batches: mpsc::Receiver<MutationBatch>) -> WatcherHandle {
        let cancel_token = CancellationToken::new();
        let handle = tokio::spawn(watch_loop(self.clone(), batches, cancel_token.clone()));
        WatcherHandle::new(handle, cancel_token)
    }

    pub fn is_video_page(&self, url: &str) -> bool {
        url.starts_with(&self.video_page_prefix)
    }

    pub fn is_channel_videos_page(&self, url: &str) -> bool {
        self.channel_videos_pattern.is_match(url)
    }

    pub(super) fn debounce_window(&self) -> Duration {
        self.config.timing.mutation_debounce()
    }

    /// Primes the timeline cache and loads the current page before any mutation arrives.
    pub async fn warm_up(&self) {
        let videos = self.service.get_videos().await;
        log_info!("Timeline cache holds {} videos", videos.len());

        let url = self.host.current_url();
        self.state.lock().await.last_url = url.clone();
        if self.is_video_page(&url) {
            self.controller.init().await;
        }
    }

    /// Reacts to the trailing batch of a debounced burst.
    pub async fn handle_batch(&self, records: &[MutationRecord]) {
        let url = self.host.current_url();
        let pip = self.host.is_picture_in_picture();
        let on_video_page = self.is_video_page(&url);

        let url_changed = {
            let mut state = self.state.lock().await;
            if state.last_url != url {
                state.last_url = url.clone();
                state.last_pip = pip;
                true
            } else {
                false
            }
        };

        if url_changed {
            log_debug!("Navigated to {url}");
            if on_video_page && !pip {
                if video_no_from_url(&url) != self.controller.current_video_no().await {
                    self.controller.init().await;
                }
            } else if !on_video_page && !pip {
                self.controller.destroy().await;
            }
        }

        let left_pip = {
            let mut state = self.state.lock().await;
            if !on_video_page && state.last_pip && !pip {
                state.last_pip = false;
                true
            } else {
                false
            }
        };
        if left_pip {
            log_debug!("Picture-in-picture closed away from the video page");
            self.controller.destroy().await;
        }

        if records.iter().all(MutationRecord::is_ignored) {
            return;
        }

        if self.is_channel_videos_page(&url) {
            self.mark_playable(ThumbnailKind::ChannelCard).await;
        }
        if on_video_page {
            self.controller.check_ad_playing().await;
            self.mark_playable(ThumbnailKind::Recommendation).await;
        }
    }

    /// Badges thumbnails of videos with a known timeline and strips stale badges.
    pub async fn mark_playable(&self, kind: ThumbnailKind) {
        let known: HashSet<u64> = self
            .service
            .cached_videos()
            .await
            .iter()
            .map(|video| video.video_no)
            .collect();

        for thumbnail in self.host.list_thumbnails(kind) {
            let Some(video_no) = thumbnail_video_no(&thumbnail.href) else {
                continue;
            };
            let playable = known.contains(&video_no);
            if playable && !thumbnail.has_badge {
                self.host
                    .set_playable_badge(&thumbnail, Some(&self.config.labels.playable));
            } else if !playable && thumbnail.has_badge {
                self.host.set_playable_badge(&thumbnail, None);
            }
        }
    }
}

fn thumbnail_video_no(href: &str) -> Option<u64> {
    THUMBNAIL_VIDEO_PATTERN
        .captures(href)
        .and_then(|captures| captures[1].parse().ok())
}
