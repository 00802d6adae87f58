//! Segment playback for replay videos: jump between the tagged songs of a
//! stream replay, auto-advance through them and on to the next tagged video.

pub mod config;
pub mod host;
pub mod models;
pub mod playback;
pub mod store;
pub mod timeline;
pub mod utils;
pub mod watcher;

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::{error, info, LevelFilter};

pub use config::{Config, StoreBackend};
pub use host::{Binding, HostPage, MediaElement, Thumbnail, ThumbnailKind};
pub use playback::{
    ControllerEvent, ControllerSnapshot, OverlayView, PageEvent, PageEvents, Phase,
    PlaybackController,
};
pub use store::Store;
pub use timeline::{HttpTimelineClient, TimelineService, TimelineSource};
pub use watcher::{MutationBatch, MutationRecord, NavigationWatcher, WatcherHandle};

use utils::format_time;

/// Prints the resolved timeline of the video number given as the first argument.
pub fn run() {
    let config = Config::load();
    let level = match &config {
        Ok(config) if config.debug => LevelFilter::Debug,
        _ => LevelFilter::Info,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    info!("replay timeline starting up...");

    let result = config.and_then(|config| {
        let runtime = tokio::runtime::Runtime::new().context("Failed to start tokio runtime")?;
        runtime.block_on(print_timeline(config, std::env::args().nth(1)))
    });

    if let Err(err) = result {
        error!("{err:?}");
        std::process::exit(1);
    }
}

async fn print_timeline(config: Config, video_arg: Option<String>) -> Result<()> {
    let Some(arg) = video_arg else {
        bail!("usage: replay_timeline <video-no>");
    };
    let video_no: u64 = arg
        .parse()
        .with_context(|| format!("Invalid video number '{arg}'"))?;

    let config = Arc::new(config);
    let store = Store::open(&config.store).context("Failed to open store")?;
    let client = HttpTimelineClient::new(config.clone())?;
    let service = TimelineService::new(Arc::new(client), store, config.clone());

    let segments = service.segments_for(video_no).await;
    if segments.is_empty() {
        info!("No timeline for video {video_no}");
        return Ok(());
    }

    println!("{}{}", config.platform.page_origin, config.video_page_path(video_no));
    for (index, segment) in segments.iter().enumerate() {
        println!(
            "{:>3}. {} - {}  {}",
            index + 1,
            format_time(segment.start),
            format_time(segment.end),
            segment.title
        );
    }
    Ok(())
}
