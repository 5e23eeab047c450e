//! Great-circle distance over raw coordinates.
//!
//! The dispatch core tracks a single trip and has no geographic index; all it
//! needs from geography is the pickup-to-dropoff distance that feeds the
//! duration and fare estimates in [crate::pricing].

/// Mean Earth radius in kilometers.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two coordinates, rounded to one decimal place.
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1, lon1) = (lat1.to_radians(), lon1.to_radians());
    let (lat2, lon2) = (lat2.to_radians(), lon2.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    ((EARTH_RADIUS_KM * c) * 10.0).round() / 10.0
}

/// Whether a coordinate pair is well-formed. Checked before any event is
/// allowed to touch shared state.
pub fn is_valid_coords(lat: f64, lon: f64) -> bool {
    lat.is_finite()
        && lon.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{DROPOFF_LAT, DROPOFF_LON, PICKUP_LAT, PICKUP_LON};

    #[test]
    fn distance_is_symmetric() {
        let there = distance_km(PICKUP_LAT, PICKUP_LON, DROPOFF_LAT, DROPOFF_LON);
        let back = distance_km(DROPOFF_LAT, DROPOFF_LON, PICKUP_LAT, PICKUP_LON);
        assert_eq!(there, back);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(PICKUP_LAT, PICKUP_LON, PICKUP_LAT, PICKUP_LON), 0.0);
    }

    #[test]
    fn microcentro_to_caballito_is_about_five_km() {
        // Great-circle distance; the ~6.2 km figure quoted in old demo data is
        // a road distance for the same pair.
        let km = distance_km(PICKUP_LAT, PICKUP_LON, DROPOFF_LAT, DROPOFF_LON);
        assert!((km - 4.9).abs() <= 0.2, "expected ~4.9 km, got {km}");
    }

    #[test]
    fn result_has_one_decimal_place() {
        let km = distance_km(PICKUP_LAT, PICKUP_LON, DROPOFF_LAT, DROPOFF_LON);
        assert_eq!(km, (km * 10.0).round() / 10.0);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(is_valid_coords(PICKUP_LAT, PICKUP_LON));
        assert!(!is_valid_coords(91.0, 0.0));
        assert!(!is_valid_coords(0.0, -181.0));
        assert!(!is_valid_coords(f64::NAN, 0.0));
        assert!(!is_valid_coords(0.0, f64::INFINITY));
    }
}
