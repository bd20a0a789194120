//! Pure scoring functions shared by the fuzzy entity strategies: set
//! overlap, interval overlap, great-circle distance, and GTFS time parsing.
use std::collections::HashSet;
use std::hash::Hash;

/// `(|A∩B|/|A| + |A∩B|/|B|) / 2`, or `0.0` if either set is empty.
///
/// Symmetric: swapping `a` and `b` does not change the result.
pub fn element_overlap<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let common = a.intersection(b).count() as f64;
    (common / a.len() as f64 + common / b.len() as f64) / 2.0
}

/// Overlap ratio of two closed intervals `[s1, e1]` and `[s2, e2]`, averaged
/// over each interval's own length. Returns `0.0` if either interval has
/// non-positive length.
pub fn interval_overlap(s1: f64, e1: f64, s2: f64, e2: f64) -> f64 {
    let len1 = e1 - s1;
    let len2 = e2 - s2;
    if len1 <= 0.0 || len2 <= 0.0 {
        return 0.0;
    }
    let overlap = (e1.min(e2) - s1.max(s2)).max(0.0);
    (overlap / len1 + overlap / len2) / 2.0
}

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two lat/lon points, in kilometers.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let (lat1_r, lat2_r) = (lat1.to_radians(), lat2.to_radians());
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2) + lat1_r.cos() * lat2_r.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();
    EARTH_RADIUS_KM * c
}

/// Great-circle distance in meters — the unit the stop-fuzzy-match buckets
/// (§4.6) are expressed in.
pub fn haversine_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    haversine_km(lat1, lon1, lat2, lon2) * 1000.0
}

/// Parses a GTFS `HH:MM:SS` time string into total seconds past midnight.
/// Hours may legitimately exceed 23 (service continuing past midnight). Any
/// malformed or empty input yields `0` — GTFS time parsing never errors,
/// it treats unparseable input as unknown.
pub fn parse_gtfs_time(s: &str) -> u32 {
    let parts: Vec<&str> = s.trim().split(':').collect();
    if parts.len() != 3 {
        return 0;
    }
    let h: u32 = parts[0].parse().unwrap_or(0);
    let m: u32 = parts[1].parse().unwrap_or(0);
    let sec: u32 = parts[2].parse().unwrap_or(0);
    h.saturating_mul(3600) + m.saturating_mul(60) + sec
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used)]

    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn element_overlap_identical_sets_is_one() {
        let a = set(&["s1", "s2", "s3"]);
        assert_eq!(element_overlap(&a, &a), 1.0);
    }

    #[test]
    fn element_overlap_disjoint_sets_is_zero() {
        let a = set(&["s1", "s2"]);
        let b = set(&["s3", "s4"]);
        assert_eq!(element_overlap(&a, &b), 0.0);
    }

    #[test]
    fn element_overlap_empty_set_is_zero() {
        let a: HashSet<String> = HashSet::new();
        let b = set(&["s1"]);
        assert_eq!(element_overlap(&a, &b), 0.0);
    }

    #[test]
    fn element_overlap_is_symmetric() {
        let a = set(&["s1", "s2", "s3"]);
        let b = set(&["s2", "s3", "s4"]);
        assert_eq!(element_overlap(&a, &b), element_overlap(&b, &a));
        // 2 common / 3, averaged both ways = 2/3
        assert!((element_overlap(&a, &b) - (2.0 / 3.0)).abs() < 1e-9);
    }

    #[test]
    fn interval_overlap_full_containment() {
        // [0,10] and [2,8]: overlap 6, lens 10 and 6 -> (0.6 + 1.0)/2 = 0.8
        let score = interval_overlap(0.0, 10.0, 2.0, 8.0);
        assert!((score - 0.8).abs() < 1e-9);
    }

    #[test]
    fn interval_overlap_disjoint_is_zero() {
        assert_eq!(interval_overlap(0.0, 5.0, 10.0, 15.0), 0.0);
    }

    #[test]
    fn interval_overlap_zero_length_is_zero() {
        assert_eq!(interval_overlap(5.0, 5.0, 0.0, 10.0), 0.0);
    }

    #[test]
    fn haversine_same_point_is_zero() {
        assert!(haversine_m(47.6, -122.3, 47.6, -122.3) < 1e-6);
    }

    #[test]
    fn haversine_known_distance_seattle_to_portland() {
        // Seattle ~47.6062,-122.3321 to Portland ~45.5152,-122.6784: ~233 km
        let km = haversine_km(47.6062, -122.3321, 45.5152, -122.6784);
        assert!((km - 233.0).abs() < 10.0, "got {km}");
    }

    #[test]
    fn parse_gtfs_time_normal() {
        assert_eq!(parse_gtfs_time("08:30:00"), 8 * 3600 + 30 * 60);
    }

    #[test]
    fn parse_gtfs_time_past_midnight() {
        assert_eq!(parse_gtfs_time("25:10:05"), 25 * 3600 + 10 * 60 + 5);
    }

    #[test]
    fn parse_gtfs_time_malformed_is_zero() {
        assert_eq!(parse_gtfs_time(""), 0);
        assert_eq!(parse_gtfs_time("garbage"), 0);
        assert_eq!(parse_gtfs_time("12:34"), 0);
    }
}
