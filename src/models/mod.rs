pub mod segment;
pub mod video;

pub use segment::Segment;
pub use video::{
    ChannelVideo, ChannelVideoPage, RawSegment, Video, VideoDetailResponse,
};
