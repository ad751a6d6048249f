use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(super) struct OrsDirectionsRequest {
    pub(super) coordinates: [[f64; 2]; 2],
    pub(super) extra_info: [&'static str; 1],
    pub(super) instructions: bool,
}

#[derive(Deserialize)]
pub(super) struct OrsDirectionsResponse {
    pub(super) features: Vec<OrsFeature>,
}

#[derive(Deserialize)]
pub(super) struct OrsFeature {
    pub(super) geometry: OrsGeometry,
    pub(super) properties: OrsProperties,
}

#[derive(Deserialize)]
pub(super) struct OrsGeometry {
    /// `[lng, lat]` pairs.
    pub(super) coordinates: Vec<[f64; 2]>,
}

#[derive(Deserialize)]
pub(super) struct OrsProperties {
    #[serde(default)]
    pub(super) segments: Vec<OrsSegment>,
    pub(super) summary: Option<OrsSummary>,
    pub(super) extras: Option<OrsExtras>,
}

#[derive(Deserialize)]
pub(super) struct OrsSegment {
    #[serde(default)]
    pub(super) steps: Vec<OrsStep>,
}

#[derive(Deserialize)]
pub(super) struct OrsStep {
    pub(super) distance: f64,
    pub(super) duration: f64,
    pub(super) instruction: String,
    pub(super) way_points: [usize; 2],
}

#[derive(Deserialize)]
pub(super) struct OrsSummary {
    #[serde(default)]
    pub(super) distance: f64,
    #[serde(default)]
    pub(super) duration: f64,
}

#[derive(Deserialize)]
pub(super) struct OrsExtras {
    pub(super) waytypes: Option<OrsExtraInfo>,
}

#[derive(Deserialize)]
pub(super) struct OrsExtraInfo {
    /// `[start_way_point, end_way_point, value]` triples.
    pub(super) values: Vec<[i64; 3]>,
}

#[derive(Deserialize)]
pub(super) struct OrsErrorResponse {
    pub(super) error: OrsErrorBody,
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(super) enum OrsErrorBody {
    Detailed { code: Option<i64>, message: String },
    Plain(String),
}
