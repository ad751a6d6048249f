use crate::error::RouteError;
use crate::geo::GeoPoint;
use crate::road::RoadCategory;
use crate::routing::{RouteResponse, RouteStep, SegmentMetadata};

use super::response::{OrsDirectionsResponse, OrsErrorBody, OrsErrorResponse};

/// ORS `waytype` value → crate road category. Values outside the table are
/// passed on as an unknown code and resolve to the default category.
fn waytype_category(waytype: i64) -> Option<RoadCategory> {
    match waytype {
        1 => Some(RoadCategory::Primary),
        2 => Some(RoadCategory::Secondary),
        3 => Some(RoadCategory::Residential),
        4 => Some(RoadCategory::Pedestrian),
        5 => Some(RoadCategory::Track),
        6 => Some(RoadCategory::Cycleway),
        7 | 8 => Some(RoadCategory::Footway),
        9 | 10 => Some(RoadCategory::Unclassified),
        _ => None,
    }
}

const UNKNOWN_CATEGORY_CODE: i64 = -1;

pub(super) fn waytype_to_code(waytype: i64) -> i64 {
    waytype_category(waytype)
        .map(|category| i64::from(category.code()))
        .unwrap_or(UNKNOWN_CATEGORY_CODE)
}

pub(super) fn parse_directions_response(
    resp: OrsDirectionsResponse,
) -> Result<RouteResponse, RouteError> {
    let feature = resp.features.into_iter().next().ok_or_else(|| {
        RouteError::Api("response contained no route features".to_string())
    })?;

    let geometry = feature
        .geometry
        .coordinates
        .iter()
        .map(|[lng, lat]| GeoPoint::new(*lat, *lng))
        .collect::<Result<Vec<_>, _>>()?;
    if geometry.is_empty() {
        return Err(RouteError::EmptyGeometry);
    }

    let properties = feature.properties;
    let steps = properties
        .segments
        .into_iter()
        .flat_map(|segment| segment.steps)
        .map(|step| RouteStep {
            instruction: step.instruction,
            distance_km: step.distance / 1000.0,
            duration_secs: step.duration,
            start_index: step.way_points[0],
            end_index: step.way_points[1],
        })
        .collect();

    // ORS way point ranges are inclusive of the end point; segments here are
    // half-open, so the last range is widened to cover the final point.
    let last_index = geometry.len() - 1;
    let segments = properties
        .extras
        .and_then(|extras| extras.waytypes)
        .map(|info| info.values)
        .unwrap_or_default()
        .into_iter()
        .filter(|[start, end, _]| *start >= 0 && end >= start)
        .map(|[start, end, waytype]| {
            let start_index = start as usize;
            let end_index = if end as usize >= last_index {
                geometry.len()
            } else {
                end as usize
            };
            SegmentMetadata {
                start_index,
                end_index,
                code: waytype_to_code(waytype),
            }
        })
        .collect();

    let (distance_km, duration_secs) = properties
        .summary
        .map(|summary| (summary.distance / 1000.0, summary.duration))
        .unwrap_or((0.0, 0.0));

    Ok(RouteResponse {
        geometry,
        steps,
        segments,
        distance_km,
        duration_secs,
    })
}

pub(super) fn parse_error_response(body: &str) -> RouteError {
    match serde_json::from_str::<OrsErrorResponse>(body) {
        Ok(OrsErrorResponse {
            error: OrsErrorBody::Detailed { code, message },
        }) => match code {
            Some(code) => RouteError::Api(format!("{message} (code {code})")),
            None => RouteError::Api(message),
        },
        Ok(OrsErrorResponse {
            error: OrsErrorBody::Plain(message),
        }) => RouteError::Api(message),
        Err(_) => RouteError::Api(body.trim().to_string()),
    }
}
