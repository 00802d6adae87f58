use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::Config,
    models::{ChannelVideoPage, Video, VideoDetailResponse},
};

/// Remote endpoints the timeline service reads from.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TimelineSource: Send + Sync {
    /// Every tagged video, deployed or not.
    async fn fetch_timeline(&self) -> Result<Vec<Video>>;
    /// One page of the target channel's replay listing.
    async fn fetch_channel_page(&self, page: u32) -> Result<ChannelVideoPage>;
    async fn fetch_video_detail(&self, video_no: u64) -> Result<VideoDetailResponse>;
}

#[derive(Clone)]
pub struct HttpTimelineClient {
    http: Client,
    config: Arc<Config>,
}

impl HttpTimelineClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timing.request_timeout())
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl TimelineSource for HttpTimelineClient {
    async fn fetch_timeline(&self) -> Result<Vec<Video>> {
        let url = self.config.timeline_url();
        self.http
            .get(&url)
            .bearer_auth(&self.config.timeline.api_key)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .context("timeline endpoint returned an error status")?
            .json::<Vec<Video>>()
            .await
            .context("timeline response was not a video list")
    }

    async fn fetch_channel_page(&self, page: u32) -> Result<ChannelVideoPage> {
        let url = self.config.channel_videos_url(page);
        self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("channel listing page {page} returned an error status"))?
            .json::<ChannelVideoPage>()
            .await
            .with_context(|| format!("channel listing page {page} had an unexpected shape"))
    }

    async fn fetch_video_detail(&self, video_no: u64) -> Result<VideoDetailResponse> {
        let url = self.config.video_detail_url(video_no);
        self.http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {url} failed"))?
            .error_for_status()
            .with_context(|| format!("video {video_no} detail returned an error status"))?
            .json::<VideoDetailResponse>()
            .await
            .with_context(|| format!("video {video_no} detail had an unexpected shape"))
    }
}
