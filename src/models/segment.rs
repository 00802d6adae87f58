use serde::{Deserialize, Serialize};

use super::RawSegment;

/// A padded playable interval within a video.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    pub start: f64,
    pub end: f64,
    pub title: String,
}

impl Segment {
    /// Widens a tagged interval by `padding` on both sides, never before zero.
    pub fn from_raw(raw: &RawSegment, padding: f64, untitled: &str) -> Self {
        let title = raw
            .title
            .as_deref()
            .filter(|title| !title.is_empty())
            .unwrap_or(untitled)
            .to_string();

        Self {
            start: (raw.start - padding).max(0.0),
            end: raw.end + padding,
            title,
        }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(start: f64, end: f64, title: Option<&str>) -> RawSegment {
        RawSegment {
            start,
            end,
            title: title.map(str::to_string),
        }
    }

    #[test]
    fn short_intro_clamps_at_zero() {
        let segment = Segment::from_raw(&raw(1.0, 1.0, Some("Intro")), 2.0, "-");
        assert_eq!(
            segment,
            Segment {
                start: 0.0,
                end: 3.0,
                title: "Intro".into()
            }
        );
    }

    #[test]
    fn padding_applies_to_both_edges() {
        for (start, end) in [(0.0, 10.0), (2.0, 2.5), (125.5, 300.0), (3599.0, 3800.25)] {
            let segment = Segment::from_raw(&raw(start, end, None), 2.0, "-");
            assert_eq!(segment.start, f64::max(start - 2.0, 0.0));
            assert_eq!(segment.end, end + 2.0);
        }
    }

    #[test]
    fn missing_or_empty_title_uses_placeholder() {
        assert_eq!(Segment::from_raw(&raw(5.0, 9.0, None), 2.0, "-").title, "-");
        assert_eq!(Segment::from_raw(&raw(5.0, 9.0, Some("")), 2.0, "-").title, "-");
    }
}
