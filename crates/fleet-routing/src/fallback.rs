//! Locally computed approximations used when the remote service is
//! unreachable.
//!
//! The formulas here are mathematically consistent with what the remote
//! service approximates (road distance ≥ great-circle distance, road path ≈
//! polyline through the stops), so a caller sees only a precision
//! difference when the network is down, never a functional one.  Nothing in
//! this module can fail or block.

use fleet_core::Point;

use crate::geometry::PathGeometry;

/// Pairwise great-circle distance matrix in kilometres.
pub fn haversine_matrix(points: &[Point]) -> Vec<Vec<f64>> {
    let n = points.len();
    let mut matrix = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let d = points[i].position.distance_km(points[j].position);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }
    matrix
}

/// Straight-line path through `points` in order.
///
/// Distance is the sum of great-circle segment lengths; duration assumes a
/// fixed `speed_kmh` average.  No turn-by-turn steps.
pub fn straight_line_geometry(points: &[&Point], speed_kmh: f64) -> PathGeometry {
    let coordinates: Vec<_> = points.iter().map(|p| p.position).collect();

    let distance_km: f64 = coordinates
        .windows(2)
        .map(|w| w[0].distance_km(w[1]))
        .sum();

    let duration_secs = if speed_kmh > 0.0 {
        distance_km / speed_kmh * 3_600.0
    } else {
        0.0
    };

    PathGeometry {
        coordinates,
        distance_m: distance_km * 1_000.0,
        duration_secs,
        steps: Vec::new(),
    }
}
