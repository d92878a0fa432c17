use super::GeodeticPosition;

/// Wraps any angle in degrees into [0, 360).
pub fn normalize_heading(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Great-circle forward azimuth from `from` to `to`, in degrees [0, 360).
pub fn initial_bearing(from: &GeodeticPosition, to: &GeodeticPosition) -> f64 {
    let lat1 = from.lat_rad();
    let lat2 = to.lat_rad();
    let dlon = (to.longitude_deg - from.longitude_deg).to_radians();

    let y = dlon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * dlon.cos();
    normalize_heading(y.atan2(x).to_degrees())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn at(lat: f64, lon: f64) -> GeodeticPosition {
        GeodeticPosition {
            longitude_deg: lon,
            latitude_deg: lat,
            altitude_m: 0.0,
        }
    }

    #[rstest]
    #[case(0.0, 0.0)]
    #[case(360.0, 0.0)]
    #[case(-90.0, 270.0)]
    #[case(725.0, 5.0)]
    #[case(-1e-18, 0.0)]
    fn normalizes(#[case] input: f64, #[case] expected: f64) {
        let out = normalize_heading(input);
        assert!((out - expected).abs() < 1e-9, "{input} -> {out}");
        assert!((0.0..360.0).contains(&out));
    }

    #[test]
    fn cardinal_bearings() {
        assert!(initial_bearing(&at(0.0, 0.0), &at(1.0, 0.0)).abs() < 1e-9);
        assert!((initial_bearing(&at(0.0, 0.0), &at(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((initial_bearing(&at(1.0, 0.0), &at(0.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((initial_bearing(&at(0.0, 1.0), &at(0.0, 0.0)) - 270.0).abs() < 1e-9);
    }
}
