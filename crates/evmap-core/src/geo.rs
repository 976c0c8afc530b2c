//! Distance and bounding-box helpers for provider proximity searches.

use crate::charger::Coordinate;

/// Earth's mean radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance between two coordinates in meters (Haversine).
#[must_use]
pub fn haversine_distance_meters(from: &Coordinate, to: &Coordinate) -> f64 {
    let lat1 = from.lat.to_radians();
    let lat2 = to.lat.to_radians();
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Axis-aligned lat/lng rectangle used for marker searches.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Box of `range_deg` degrees in every direction around `center`.
    #[must_use]
    pub fn around(center: &Coordinate, range_deg: f64) -> Self {
        Self {
            min_lat: center.lat - range_deg,
            max_lat: center.lat + range_deg,
            min_lng: center.lng - range_deg,
            max_lng: center.lng + range_deg,
        }
    }

    #[must_use]
    pub fn contains(&self, point: &Coordinate) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lng..=self.max_lng).contains(&point.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_distance_for_same_point() {
        let p = Coordinate::new(50.9375, 6.9603);
        assert!(haversine_distance_meters(&p, &p).abs() < f64::EPSILON);
    }

    #[test]
    fn berlin_to_paris_is_about_878_km() {
        let berlin = Coordinate::new(52.5200, 13.4050);
        let paris = Coordinate::new(48.8566, 2.3522);
        let d = haversine_distance_meters(&berlin, &paris);
        assert!((d - 878_000.0).abs() < 10_000.0, "got {d}");
    }

    #[test]
    fn short_distances_are_meter_accurate() {
        // 0.0001° latitude is ~11.1 m everywhere.
        let a = Coordinate::new(54.5116, 9.57108);
        let b = Coordinate::new(54.5117, 9.57108);
        let d = haversine_distance_meters(&a, &b);
        assert!((d - 11.1).abs() < 0.2, "got {d}");
    }

    #[test]
    fn bounding_box_around_contains_center_and_edges() {
        let center = Coordinate::new(54.5116, 9.57108);
        let bbox = BoundingBox::around(&center, 0.1);
        assert!(bbox.contains(&center));
        assert!(bbox.contains(&Coordinate::new(54.6, 9.65)));
        assert!(!bbox.contains(&Coordinate::new(54.7, 9.57108)));
        assert!((bbox.max_lng - bbox.min_lng - 0.2).abs() < 1e-9);
    }
}
