//! Geographic helpers
//!
//! Great-circle distances, WKT point parsing and CBS region code handling.

/// Mean Earth radius in meters
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A longitude/latitude pair as found in WKT (`x` = lon/easting, `y` = lat/northing)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Haversine distance between two WGS84 coordinates, in meters
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Parse a WKT point such as `POINT(4.8952 52.3731)`
pub fn parse_wkt_point(wkt: &str) -> Option<Point> {
    let trimmed = wkt.trim();
    let upper = trimmed.to_ascii_uppercase();
    if !upper.starts_with("POINT") {
        return None;
    }

    let open = trimmed.find('(')?;
    let close = trimmed.rfind(')')?;
    if close <= open {
        return None;
    }

    let mut parts = trimmed[open + 1..close].split_whitespace();
    let x = parts.next()?.parse::<f64>().ok()?;
    let y = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() || !x.is_finite() || !y.is_finite() {
        return None;
    }

    Some(Point { x, y })
}

/// Ensure a region code carries its type prefix (`"0363"` → `"GM0363"`)
pub fn prefix_code(code: Option<&str>, prefix: &str) -> Option<String> {
    let code = code?.trim();
    if code.is_empty() {
        return None;
    }

    if code.len() >= prefix.len() && code[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(code.to_ascii_uppercase())
    } else {
        Some(format!("{}{}", prefix, code))
    }
}

/// CBS OData region keys are fixed-width (10 characters, space padded)
pub fn pad_region_code(code: &str) -> String {
    format!("{:<10}", code.trim())
}
