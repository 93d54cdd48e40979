use crate::error::SplitError;
use crate::models::Coordinate;

pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Great-circle distance in meters between two coordinates, haversine on a
/// spherical Earth.
pub fn distance_m(a: Coordinate, b: Coordinate) -> Result<f64, SplitError> {
    check(a)?;
    check(b)?;

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();

    // Clamp before asin: rounding can push h past 1.0 for antipodal points.
    let h = (sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon).clamp(0.0, 1.0);
    Ok(2.0 * EARTH_RADIUS_M * h.sqrt().asin())
}

fn check(c: Coordinate) -> Result<(), SplitError> {
    if c.is_valid() {
        Ok(())
    } else {
        Err(SplitError::InvalidCoordinate {
            lat: c.lat,
            lon: c.lon,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_point_is_zero() {
        let point = Coordinate { lat: 45.0, lon: 5.0 };
        assert_eq!(distance_m(point, point).unwrap(), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let a = Coordinate { lat: 45.0, lon: 5.0 };
        let b = Coordinate { lat: 46.0, lon: 6.0 };
        assert_eq!(distance_m(a, b).unwrap(), distance_m(b, a).unwrap());
    }

    #[test]
    fn test_one_degree_along_equator() {
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 1.0 };
        let expected = EARTH_RADIUS_M * 1f64.to_radians();
        assert!((distance_m(a, b).unwrap() - expected).abs() < 1.0);
    }

    #[test]
    fn test_antipodal_points_stay_finite() {
        let a = Coordinate { lat: 0.0, lon: 0.0 };
        let b = Coordinate {
            lat: 0.0,
            lon: 180.0,
        };
        let d = distance_m(a, b).unwrap();
        assert!(d.is_finite());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_M).abs() < 10.0);
    }

    #[test]
    fn test_out_of_range_latitude_rejected() {
        let a = Coordinate { lat: 91.0, lon: 0.0 };
        let b = Coordinate { lat: 0.0, lon: 0.0 };
        assert!(matches!(
            distance_m(a, b),
            Err(SplitError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_nan_coordinate_rejected() {
        let a = Coordinate {
            lat: f64::NAN,
            lon: 0.0,
        };
        let b = Coordinate { lat: 0.0, lon: 0.0 };
        assert!(matches!(
            distance_m(a, b),
            Err(SplitError::InvalidCoordinate { .. })
        ));
    }

    // Property-based tests using proptest
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn valid_coord() -> impl Strategy<Value = Coordinate> {
            (-90.0..=90.0, -180.0..=180.0).prop_map(|(lat, lon)| Coordinate { lat, lon })
        }

        proptest! {
            #[test]
            fn prop_non_negative(a in valid_coord(), b in valid_coord()) {
                prop_assert!(distance_m(a, b).unwrap() >= 0.0);
            }

            #[test]
            fn prop_symmetric(a in valid_coord(), b in valid_coord()) {
                let ab = distance_m(a, b).unwrap();
                let ba = distance_m(b, a).unwrap();
                prop_assert!((ab - ba).abs() < 1e-9);
            }

            #[test]
            fn prop_same_point_is_zero(coord in valid_coord()) {
                prop_assert_eq!(distance_m(coord, coord).unwrap(), 0.0);
            }

            #[test]
            fn prop_bounded_by_half_earth_circumference(
                a in valid_coord(),
                b in valid_coord()
            ) {
                let max_distance = std::f64::consts::PI * EARTH_RADIUS_M;
                prop_assert!(distance_m(a, b).unwrap() <= max_distance + 0.1);
            }
        }
    }
}
