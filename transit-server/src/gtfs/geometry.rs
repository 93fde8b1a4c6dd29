//! Map geometry for itinerary segments.

use serde::Serialize;

use crate::domain::Segment;

use super::GtfsStore;

/// The drawn path of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentPath {
    /// `(lat, lon)` pairs in travel order
    pub points: Vec<(f64, f64)>,
    /// True when the path joins stop coordinates because the trip has no shape
    pub approximate: bool,
}

impl GtfsStore {
    /// Path for drawing a segment on a map.
    ///
    /// Uses the trip's shape when it has points. Otherwise joins the
    /// coordinates of the stops the segment visits, skipping any stop the
    /// store doesn't know.
    pub fn segment_path(&self, segment: &Segment<'_>) -> SegmentPath {
        let shape = segment
            .trip()
            .shape_id
            .as_ref()
            .map(|id| self.shape(id.as_str()))
            .unwrap_or(&[]);

        if !shape.is_empty() {
            return SegmentPath {
                points: shape.iter().map(|p| (p.lat, p.lon)).collect(),
                approximate: false,
            };
        }

        SegmentPath {
            points: segment
                .stop_times()
                .iter()
                .filter_map(|st| self.stop(st.stop_id.as_str()))
                .map(|s| (s.lat, s.lon))
                .collect(),
            approximate: true,
        }
    }
}
