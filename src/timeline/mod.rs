pub mod client;
pub mod resolve;
pub mod service;

pub use client::{HttpTimelineClient, TimelineSource};
#[cfg(test)]
pub use client::MockTimelineSource;
pub use resolve::{resolve_segments, select_next_video};
pub use service::TimelineService;
