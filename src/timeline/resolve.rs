use std::collections::HashSet;

use crate::models::{Segment, Video};

/// Padded segments of `video_no`, or an empty timeline when the video is unknown.
pub fn resolve_segments(
    videos: &[Video],
    video_no: u64,
    padding: f64,
    untitled: &str,
) -> Vec<Segment> {
    videos
        .iter()
        .find(|video| video.video_no == video_no)
        .map(|video| {
            video
                .timelines
                .iter()
                .map(|raw| Segment::from_raw(raw, padding, untitled))
                .collect()
        })
        .unwrap_or_default()
}

/// First video after `current` in `videos` order (wrapping) that is in `eligible`.
///
/// An unknown `current` starts the scan at the head of the list. The scan covers
/// every entry once, so `current` itself is picked last if nothing else qualifies.
pub fn select_next_video(
    videos: &[Video],
    current: Option<u64>,
    eligible: &HashSet<u64>,
) -> Option<u64> {
    let len = videos.len();
    if len == 0 {
        return None;
    }

    let position = current.and_then(|no| videos.iter().position(|video| video.video_no == no));
    let first = position.map(|idx| idx + 1).unwrap_or(0);

    (0..len)
        .map(|offset| &videos[(first + offset) % len])
        .find(|video| eligible.contains(&video.video_no))
        .map(|video| video.video_no)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RawSegment;

    fn video(video_no: u64, segments: &[(f64, f64)]) -> Video {
        Video {
            video_no,
            timelines: segments
                .iter()
                .map(|(start, end)| RawSegment {
                    start: *start,
                    end: *end,
                    title: None,
                })
                .collect(),
            deploy: 1,
            publish_date: None,
        }
    }

    #[test]
    fn resolves_padded_segments_in_tag_order() {
        let videos = vec![video(1, &[(100.0, 200.0), (10.0, 20.0)]), video(2, &[])];
        let segments = resolve_segments(&videos, 1, 2.0, "-");

        assert_eq!(segments.len(), 2);
        assert_eq!((segments[0].start, segments[0].end), (98.0, 202.0));
        assert_eq!((segments[1].start, segments[1].end), (8.0, 22.0));
    }

    #[test]
    fn unknown_video_resolves_to_empty_timeline() {
        let videos = vec![video(1, &[(1.0, 2.0)])];
        assert!(resolve_segments(&videos, 9, 2.0, "-").is_empty());
    }

    #[test]
    fn picks_next_eligible_after_current() {
        let videos = vec![video(1, &[]), video(2, &[]), video(3, &[])];
        let eligible: HashSet<u64> = [1, 3].into_iter().collect();
        assert_eq!(select_next_video(&videos, Some(2), &eligible), Some(3));
    }

    #[test]
    fn wraps_around_to_head() {
        let videos = vec![video(1, &[]), video(2, &[]), video(3, &[])];
        let eligible: HashSet<u64> = [1].into_iter().collect();
        assert_eq!(select_next_video(&videos, Some(3), &eligible), Some(1));
    }

    #[test]
    fn unknown_current_starts_at_head() {
        let videos = vec![video(1, &[]), video(2, &[])];
        let eligible: HashSet<u64> = [1, 2].into_iter().collect();
        assert_eq!(select_next_video(&videos, Some(42), &eligible), Some(1));
        assert_eq!(select_next_video(&videos, None, &eligible), Some(1));
    }

    #[test]
    fn no_eligible_candidate_yields_none() {
        let videos = vec![video(1, &[]), video(2, &[])];
        assert_eq!(select_next_video(&videos, Some(1), &HashSet::new()), None);
        assert_eq!(select_next_video(&[], Some(1), &HashSet::new()), None);
    }
}
