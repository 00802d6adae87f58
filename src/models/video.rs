use serde::{Deserialize, Serialize};

/// One tagged music excerpt as delivered by the timeline service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RawSegment {
    pub start: f64,
    pub end: f64,
    #[serde(default)]
    pub title: Option<String>,
}

/// A replay video with its ordered raw segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    #[serde(alias = "video_no")]
    pub video_no: u64,
    #[serde(default)]
    pub timelines: Vec<RawSegment>,
    #[serde(default)]
    pub deploy: i32,
    #[serde(default, alias = "publish_date")]
    pub publish_date: Option<String>,
}

impl Video {
    pub fn is_deployed(&self) -> bool {
        self.deploy == 1
    }
}

/// Entry of the platform's paginated channel listing. Only the id matters here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideo {
    pub video_no: u64,
    #[serde(default)]
    pub video_title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideoPage {
    pub content: ChannelVideoContent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelVideoContent {
    #[serde(default)]
    pub data: Vec<ChannelVideo>,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailResponse {
    pub code: i64,
    #[serde(default)]
    pub content: Option<VideoDetailContent>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoDetailContent {
    #[serde(default)]
    pub channel: Option<ChannelRef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelRef {
    pub channel_id: String,
}

impl VideoDetailResponse {
    pub fn channel_id(&self) -> Option<&str> {
        self.content
            .as_ref()
            .and_then(|content| content.channel.as_ref())
            .map(|channel| channel.channel_id.as_str())
    }
}
