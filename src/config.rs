use std::{env, fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const CONFIG_PATH_ENV: &str = "REPLAY_TIMELINE_CONFIG";
pub const BASE_URL_ENV: &str = "REPLAY_TIMELINE_BASE_URL";
pub const API_KEY_ENV: &str = "REPLAY_TIMELINE_API_KEY";
pub const STORE_PATH_ENV: &str = "REPLAY_TIMELINE_STORE";
pub const DEBUG_ENV: &str = "REPLAY_TIMELINE_DEBUG";

/// Immutable configuration handed to every component at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub timeline: TimelineEndpoint,
    pub platform: PlatformEndpoints,
    pub storage_keys: StorageKeys,
    pub timing: Timing,
    /// Seconds added on both sides of every tagged segment.
    pub segment_padding_secs: f64,
    pub icons: Icons,
    pub labels: Labels,
    pub store: StoreBackend,
    #[serde(skip)]
    pub debug: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timeline: TimelineEndpoint::default(),
            platform: PlatformEndpoints::default(),
            storage_keys: StorageKeys::default(),
            timing: Timing::default(),
            segment_padding_secs: 2.0,
            icons: Icons::default(),
            labels: Labels::default(),
            store: StoreBackend::default(),
            debug: false,
        }
    }
}

impl Config {
    /// Defaults, then the JSON file named by `REPLAY_TIMELINE_CONFIG`, then env overrides.
    pub fn load() -> Result<Self> {
        let mut config = match env::var_os(CONFIG_PATH_ENV) {
            Some(path) => Self::from_file(PathBuf::from(path))?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn from_file(path: PathBuf) -> Result<Self> {
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config at {}", path.display()))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            self.timeline.base_url = base_url;
        }
        if let Ok(api_key) = env::var(API_KEY_ENV) {
            self.timeline.api_key = api_key;
        }
        if let Ok(path) = env::var(STORE_PATH_ENV) {
            self.store = StoreBackend::Sqlite {
                path: PathBuf::from(path),
            };
        }
        self.debug = env::var(DEBUG_ENV)
            .map(|value| value == "1" || value.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
    }

    pub fn timeline_url(&self) -> String {
        format!(
            "{}{}",
            self.timeline.base_url.trim_end_matches('/'),
            self.timeline.path
        )
    }

    pub fn channel_videos_url(&self, page: u32) -> String {
        format!(
            "{}/service/v1/channels/{}/videos?sortType=LATEST&pagingType=PAGE&size={}&page={}",
            self.platform.api_base.trim_end_matches('/'),
            self.platform.target_channel_id,
            self.platform.page_size,
            page
        )
    }

    pub fn video_detail_url(&self, video_no: u64) -> String {
        format!(
            "{}/service/v3/videos/{}",
            self.platform.api_base.trim_end_matches('/'),
            video_no
        )
    }

    pub fn video_page_path(&self, video_no: u64) -> String {
        format!("/video/{video_no}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimelineEndpoint {
    pub base_url: String,
    pub path: String,
    pub api_key: String,
}

impl Default for TimelineEndpoint {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".into(),
            path: "/videos/timeline".into(),
            api_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformEndpoints {
    pub api_base: String,
    pub page_origin: String,
    pub target_channel_id: String,
    pub page_size: u32,
}

impl Default for PlatformEndpoints {
    fn default() -> Self {
        Self {
            api_base: "https://api.chzzk.naver.com".into(),
            page_origin: "https://chzzk.naver.com".into(),
            target_channel_id: "26253bf7ed6b95832c40f4f43f6d049d".into(),
            page_size: 40,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub auto_advance: String,
    pub auto_play: String,
    pub videos: String,
    pub last_fetch: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            auto_advance: "automove".into(),
            auto_play: "autoplay".into(),
            videos: "videos".into(),
            last_fetch: "lastCallApiTime".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    pub locate_retry_interval_ms: u64,
    pub max_locate_retries: u32,
    pub autoplay_poll_ms: u64,
    pub autoplay_start_delay_ms: u64,
    pub mutation_debounce_ms: u64,
    pub progress_refresh_ms: u64,
    pub cache_ttl_ms: i64,
    pub request_timeout_secs: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            locate_retry_interval_ms: 500,
            max_locate_retries: 10,
            autoplay_poll_ms: 100,
            autoplay_start_delay_ms: 500,
            mutation_debounce_ms: 500,
            progress_refresh_ms: 250,
            cache_ttl_ms: 60 * 60 * 1000,
            request_timeout_secs: 10,
        }
    }
}

impl Timing {
    pub fn locate_retry_interval(&self) -> Duration {
        Duration::from_millis(self.locate_retry_interval_ms)
    }

    pub fn autoplay_poll(&self) -> Duration {
        Duration::from_millis(self.autoplay_poll_ms)
    }

    pub fn autoplay_start_delay(&self) -> Duration {
        Duration::from_millis(self.autoplay_start_delay_ms)
    }

    pub fn mutation_debounce(&self) -> Duration {
        Duration::from_millis(self.mutation_debounce_ms)
    }

    pub fn progress_refresh(&self) -> Duration {
        Duration::from_millis(self.progress_refresh_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Icons {
    pub play: String,
    pub pause: String,
    pub next: String,
    pub prev: String,
    pub auto_play: String,
    pub auto_play_active: String,
    pub auto_advance: String,
    pub auto_advance_active: String,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            play: "icons/play_arrow_24dp.svg".into(),
            pause: "icons/pause_24dp.svg".into(),
            next: "icons/chevron_right_24dp.svg".into(),
            prev: "icons/chevron_left_24dp.svg".into(),
            auto_play: "icons/autoplay_24dp.svg".into(),
            auto_play_active: "icons/autoplay_24dp_active.svg".into(),
            auto_advance: "icons/skip_next_24dp.svg".into(),
            auto_advance_active: "icons/skip_next_24dp_active.svg".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub play: String,
    pub pause: String,
    pub next: String,
    pub prev: String,
    pub auto_play_off: String,
    pub auto_play_on: String,
    pub auto_advance_off: String,
    pub auto_advance_on: String,
    pub playable: String,
    pub untitled: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            play: "시작".into(),
            pause: "정지".into(),
            next: "다음 노래".into(),
            prev: "이전 노래".into(),
            auto_play_off: "자동 시작 OFF".into(),
            auto_play_on: "자동 시작 ON".into(),
            auto_advance_off: "다음 영상 자동 재생 OFF".into(),
            auto_advance_on: "다음 영상 자동 재생 ON".into(),
            playable: "다시듣기".into(),
            untitled: "-".into(),
        }
    }
}

/// Which key-value backend the store is built on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum StoreBackend {
    /// Persistent store shared across pages.
    Sqlite { path: PathBuf },
    /// Page-local fallback; kept in memory when `path` is absent.
    Local { path: Option<PathBuf> },
}

impl Default for StoreBackend {
    fn default() -> Self {
        StoreBackend::Sqlite {
            path: PathBuf::from("replay_timeline.sqlite3"),
        }
    }
}
