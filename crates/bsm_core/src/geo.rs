//! Geographic primitives: validated lat/lng points and haversine distance.
//!
//! All distances are great-circle distances on a sphere of radius
//! [`EARTH_RADIUS_KM`]. That is accurate to well under a percent for the
//! point spacing a routing service returns, which is all the simulator needs.

use serde::{Deserialize, Serialize};

use crate::error::GeoError;

/// Mean Earth radius used by every distance calculation in the crate.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A WGS84 coordinate in degrees. Deserialization goes through
/// [`GeoPoint::new`], so files cannot carry out-of-range points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawGeoPoint")]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self, Self::Error> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

impl GeoPoint {
    /// Build a point, rejecting non-finite or out-of-range coordinates.
    pub fn new(lat: f64, lng: f64) -> Result<Self, GeoError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(GeoError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(GeoError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        haversine_km(*self, *other)
    }

    /// Re-check a point that may have been built from its public fields.
    pub fn validated(self) -> Result<Self, GeoError> {
        GeoPoint::new(self.lat, self.lng)
    }

    /// Key used for memoization: the bit patterns of both coordinates, with
    /// `-0.0` folded into `0.0`.
    pub(crate) fn bits(&self) -> (u64, u64) {
        (fold_zero(self.lat).to_bits(), fold_zero(self.lng).to_bits())
    }
}

fn fold_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}

pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Point at fraction `t` (0.0..=1.0) along the great circle from `a` to `b`.
pub fn interpolate(a: GeoPoint, b: GeoPoint, t: f64) -> GeoPoint {
    let d = haversine_km(a, b) / EARTH_RADIUS_KM;
    if d <= f64::EPSILON {
        return a;
    }
    let (lat1, lon1) = (a.lat.to_radians(), a.lng.to_radians());
    let (lat2, lon2) = (b.lat.to_radians(), b.lng.to_radians());
    let sin_d = d.sin();
    let fa = ((1.0 - t) * d).sin() / sin_d;
    let fb = (t * d).sin() / sin_d;
    let x = fa * lat1.cos() * lon1.cos() + fb * lat2.cos() * lon2.cos();
    let y = fa * lat1.cos() * lon1.sin() + fb * lat2.cos() * lon2.sin();
    let z = fa * lat1.sin() + fb * lat2.sin();
    let lat = z.atan2((x * x + y * y).sqrt());
    let lng = y.atan2(x);
    GeoPoint {
        lat: lat.to_degrees(),
        lng: lng.to_degrees(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(matches!(
            GeoPoint::new(91.0, 0.0),
            Err(GeoError::InvalidLatitude(_))
        ));
        assert!(matches!(
            GeoPoint::new(0.0, f64::NAN),
            Err(GeoError::InvalidLongitude(_))
        ));
        assert!(GeoPoint::new(11.0168, 76.9558).is_ok());
    }

    #[test]
    fn deserialize_validates_range() {
        let point: GeoPoint =
            serde_json::from_str(r#"{"lat": 11.0168, "lng": 76.9558}"#).expect("valid point");
        assert_eq!(point, GeoPoint::new(11.0168, 76.9558).expect("point"));

        let err = serde_json::from_str::<GeoPoint>(r#"{"lat": 500.0, "lng": 9000.0}"#)
            .expect_err("latitude out of range");
        assert!(err.to_string().contains("latitude 500"), "{err}");
        assert!(serde_json::from_str::<GeoPoint>(r#"{"lat": 0.0, "lng": 181.0}"#).is_err());
    }

    #[test]
    fn signed_zero_shares_a_key() {
        let zero = GeoPoint::new(0.0, 0.0).expect("point");
        let negative_zero = GeoPoint::new(-0.0, -0.0).expect("point");
        assert_eq!(zero.bits(), negative_zero.bits());
    }

    #[test]
    fn haversine_along_meridian_matches_arc_length() {
        let a = GeoPoint::new(10.0, 77.0).expect("point");
        let b = GeoPoint::new(11.0, 77.0).expect("point");
        let expected = EARTH_RADIUS_KM * 1.0_f64.to_radians();
        assert!((haversine_km(a, b) - expected).abs() < 1e-9);
        assert_eq!(haversine_km(a, a), 0.0);
    }

    #[test]
    fn coimbatore_to_chennai_is_roughly_four_hundred_km() {
        let coimbatore = GeoPoint::new(11.0168, 76.9558).expect("point");
        let chennai = GeoPoint::new(13.0827, 80.2707).expect("point");
        let d = coimbatore.distance_km(&chennai);
        assert!((400.0..450.0).contains(&d), "unexpected distance {d}");
    }

    #[test]
    fn interpolate_hits_endpoints_and_midpoint() {
        let a = GeoPoint::new(11.0, 77.0).expect("point");
        let b = GeoPoint::new(13.0, 80.0).expect("point");
        let start = interpolate(a, b, 0.0);
        let end = interpolate(a, b, 1.0);
        assert!(haversine_km(start, a) < 1e-6);
        assert!(haversine_km(end, b) < 1e-6);

        let mid = interpolate(a, b, 0.5);
        let half = haversine_km(a, b) / 2.0;
        assert!((haversine_km(a, mid) - half).abs() < 1e-6);
        assert!((haversine_km(mid, b) - half).abs() < 1e-6);
    }
}
