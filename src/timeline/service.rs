use std::{collections::HashSet, sync::Arc};

use log::{info, warn};

use crate::{
    config::Config,
    models::{ChannelVideo, Segment, Video},
    store::Store,
    utils::now_ms,
};

use super::{
    client::TimelineSource,
    resolve::{resolve_segments, select_next_video},
};

/// Cache-or-network access to the tagged video list.
#[derive(Clone)]
pub struct TimelineService {
    source: Arc<dyn TimelineSource>,
    store: Store,
    config: Arc<Config>,
}

impl TimelineService {
    pub fn new(source: Arc<dyn TimelineSource>, store: Store, config: Arc<Config>) -> Self {
        Self {
            source,
            store,
            config,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub async fn get_videos(&self) -> Vec<Video> {
        self.get_videos_at(now_ms()).await
    }

    /// Cached list unless it is empty or older than the cache TTL at `now`.
    pub async fn get_videos_at(&self, now: i64) -> Vec<Video> {
        let keys = &self.config.storage_keys;
        let cached: Vec<Video> = self.store.get(&keys.videos, Vec::new()).await;
        let last_fetch: i64 = self.store.get(&keys.last_fetch, 0).await;

        if cached.is_empty() || now - last_fetch >= self.config.timing.cache_ttl_ms {
            self.refresh_videos_at(now).await
        } else {
            cached
        }
    }

    pub async fn refresh_videos(&self) -> Vec<Video> {
        self.refresh_videos_at(now_ms()).await
    }

    pub async fn refresh_videos_at(&self, now: i64) -> Vec<Video> {
        let keys = &self.config.storage_keys;
        match self.source.fetch_timeline().await {
            Ok(videos) => {
                let deployed: Vec<Video> =
                    videos.into_iter().filter(Video::is_deployed).collect();
                self.store.set(&keys.videos, &deployed).await;
                self.store.set(&keys.last_fetch, &now).await;
                info!("Refreshed timeline cache with {} videos", deployed.len());
                deployed
            }
            Err(err) => {
                warn!("Failed to fetch timelines: {err:?}");
                self.cached_videos().await
            }
        }
    }

    /// The cached list as-is, without touching the network.
    pub async fn cached_videos(&self) -> Vec<Video> {
        self.store
            .get(&self.config.storage_keys.videos, Vec::new())
            .await
    }

    /// Walks the channel listing page by page until the reported page count.
    pub async fn channel_videos(&self) -> Vec<ChannelVideo> {
        let mut videos = Vec::new();
        let mut page = 0;
        let mut total_pages = 1;

        while page < total_pages {
            match self.source.fetch_channel_page(page).await {
                Ok(listing) => {
                    videos.extend(listing.content.data);
                    total_pages = listing.content.total_pages;
                    page += 1;
                }
                Err(err) => {
                    warn!("Channel listing stopped at page {page}: {err:?}");
                    break;
                }
            }
        }

        videos
    }

    pub async fn is_eligible_channel(&self, video_no: u64) -> bool {
        match self.source.fetch_video_detail(video_no).await {
            Ok(detail) => {
                detail.code == 200
                    && detail.channel_id() == Some(self.config.platform.target_channel_id.as_str())
            }
            Err(err) => {
                warn!("Failed to check channel of video {video_no}: {err:?}");
                false
            }
        }
    }

    pub async fn segments_for(&self, video_no: u64) -> Vec<Segment> {
        let videos = self.get_videos().await;
        resolve_segments(
            &videos,
            video_no,
            self.config.segment_padding_secs,
            &self.config.labels.untitled,
        )
    }

    /// Next tagged video after `current` that the channel listing still carries.
    pub async fn next_eligible_video(&self, current: Option<u64>) -> Option<u64> {
        let eligible: HashSet<u64> = self
            .channel_videos()
            .await
            .into_iter()
            .map(|video| video.video_no)
            .collect();
        let videos = self.get_videos().await;
        select_next_video(&videos, current, &eligible)
    }
}
