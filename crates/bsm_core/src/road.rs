//! Road categories, the integer code table used by route metadata, and the
//! lane-count profile derived from a category.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed set of road categories a route segment can be tagged with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoadCategory {
    Motorway,
    Trunk,
    Primary,
    Secondary,
    Tertiary,
    Residential,
    Service,
    Unclassified,
    Track,
    Pedestrian,
    Cycleway,
    Footway,
}

/// Category assigned to metadata codes outside the code table.
///
/// Ambiguous segments are treated as ordinary primary roads. Changing this
/// changes BSM outcomes for every segment the provider could not classify.
pub const DEFAULT_ROAD_CATEGORY: RoadCategory = RoadCategory::Primary;

impl RoadCategory {
    /// Every category, in code-table order.
    pub const ALL: [RoadCategory; 12] = [
        RoadCategory::Motorway,
        RoadCategory::Trunk,
        RoadCategory::Primary,
        RoadCategory::Secondary,
        RoadCategory::Tertiary,
        RoadCategory::Residential,
        RoadCategory::Service,
        RoadCategory::Unclassified,
        RoadCategory::Track,
        RoadCategory::Pedestrian,
        RoadCategory::Cycleway,
        RoadCategory::Footway,
    ];

    /// Translate a route-metadata code. Unknown codes map to
    /// [`DEFAULT_ROAD_CATEGORY`].
    pub fn from_code(code: i64) -> Self {
        usize::try_from(code)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .unwrap_or(DEFAULT_ROAD_CATEGORY)
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RoadCategory::Motorway => "motorway",
            RoadCategory::Trunk => "trunk",
            RoadCategory::Primary => "primary",
            RoadCategory::Secondary => "secondary",
            RoadCategory::Tertiary => "tertiary",
            RoadCategory::Residential => "residential",
            RoadCategory::Service => "service",
            RoadCategory::Unclassified => "unclassified",
            RoadCategory::Track => "track",
            RoadCategory::Pedestrian => "pedestrian",
            RoadCategory::Cycleway => "cycleway",
            RoadCategory::Footway => "footway",
        }
    }
}

impl fmt::Display for RoadCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoadCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|category| category.as_str() == needle)
            .ok_or_else(|| format!("unknown road category '{s}'"))
    }
}

/// Lane count assumed for categories missing from the table.
pub const DEFAULT_LANE_COUNT: u32 = 2;

/// Static category → lane-count table.
///
/// Whether an adjacent lane is present is derived from the count, never
/// stored: a road has an adjacent lane iff it has more than one lane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaneProfile {
    pub lanes: BTreeMap<RoadCategory, u32>,
    pub default_lanes: u32,
}

impl Default for LaneProfile {
    fn default() -> Self {
        let lanes = [
            (RoadCategory::Motorway, 3),
            (RoadCategory::Trunk, 2),
            (RoadCategory::Primary, 2),
            (RoadCategory::Secondary, 2),
            (RoadCategory::Tertiary, 1),
            (RoadCategory::Residential, 1),
            (RoadCategory::Service, 1),
            (RoadCategory::Unclassified, 1),
            (RoadCategory::Track, 1),
            (RoadCategory::Pedestrian, 1),
            (RoadCategory::Cycleway, 1),
            (RoadCategory::Footway, 1),
        ]
        .into_iter()
        .collect();
        Self {
            lanes,
            default_lanes: DEFAULT_LANE_COUNT,
        }
    }
}

impl LaneProfile {
    /// An empty table: every category gets `default_lanes`.
    pub fn uniform(default_lanes: u32) -> Self {
        Self {
            lanes: BTreeMap::new(),
            default_lanes,
        }
    }

    pub fn with_lanes(mut self, category: RoadCategory, lanes: u32) -> Self {
        self.lanes.insert(category, lanes);
        self
    }

    pub fn without(mut self, category: RoadCategory) -> Self {
        self.lanes.remove(&category);
        self
    }

    /// Returns `(lane_count, adjacent_lanes_present)` for a category.
    pub fn lane_profile_for(&self, category: RoadCategory) -> (u32, bool) {
        let lane_count = self
            .lanes
            .get(&category)
            .copied()
            .unwrap_or(self.default_lanes);
        (lane_count, lane_count > 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_table_order() {
        for (code, category) in RoadCategory::ALL.iter().enumerate() {
            assert_eq!(RoadCategory::from_code(code as i64), *category);
            assert_eq!(category.code() as usize, code);
        }
    }

    #[test]
    fn unknown_codes_fall_back_to_primary() {
        assert_eq!(RoadCategory::from_code(12), RoadCategory::Primary);
        assert_eq!(RoadCategory::from_code(-1), RoadCategory::Primary);
        assert_eq!(RoadCategory::from_code(i64::MAX), DEFAULT_ROAD_CATEGORY);
    }

    #[test]
    fn parses_names_case_insensitively() {
        assert_eq!("Motorway".parse::<RoadCategory>(), Ok(RoadCategory::Motorway));
        assert_eq!(" footway ".parse::<RoadCategory>(), Ok(RoadCategory::Footway));
        assert!("highway".parse::<RoadCategory>().is_err());
    }

    #[test]
    fn adjacency_is_derived_from_lane_count() {
        let profile = LaneProfile::default();
        assert_eq!(profile.lane_profile_for(RoadCategory::Motorway), (3, true));
        assert_eq!(profile.lane_profile_for(RoadCategory::Primary), (2, true));
        assert_eq!(profile.lane_profile_for(RoadCategory::Residential), (1, false));
    }

    #[test]
    fn unmapped_category_uses_default_lanes() {
        let profile = LaneProfile::default().without(RoadCategory::Footway);
        assert_eq!(
            profile.lane_profile_for(RoadCategory::Footway),
            (DEFAULT_LANE_COUNT, true)
        );

        let single = LaneProfile::uniform(1);
        assert_eq!(single.lane_profile_for(RoadCategory::Motorway), (1, false));
    }
}
