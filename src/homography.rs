//! Planar projective transform from the camera image plane onto the target rectangle.

use crate::{constants::EPSILON, mapper::PixelPoint, Error, Result};
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use serde::{Deserialize, Serialize};

/// 3x3 homography mapping camera pixels onto destination-rectangle pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    /// Row-major projective matrix, normalized so `h[(2,2)] == 1`
    pub h: Matrix3<f64>,
}

/// Destination rectangle the four calibration points map onto
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DestinationRect {
    pub width: f64,
    pub height: f64,
}

impl DestinationRect {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Corners in calibration order: top-left, top-right, bottom-right, bottom-left
    #[must_use]
    pub fn corners(&self) -> [PixelPoint; 4] {
        [
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(self.width, 0.0),
            PixelPoint::new(self.width, self.height),
            PixelPoint::new(0.0, self.height),
        ]
    }
}

impl Homography {
    #[must_use]
    pub const fn new(h: Matrix3<f64>) -> Self {
        Self { h }
    }

    /// Build from a row-major 3x3 array
    #[must_use]
    pub fn from_array(rows: [[f64; 3]; 3]) -> Self {
        Self::new(Matrix3::from_row_slice(&[
            rows[0][0], rows[0][1], rows[0][2], rows[1][0], rows[1][1], rows[1][2], rows[2][0],
            rows[2][1], rows[2][2],
        ]))
    }

    /// Row-major 3x3 array, the persisted form
    #[must_use]
    pub fn to_array(&self) -> [[f64; 3]; 3] {
        [
            [self.h[(0, 0)], self.h[(0, 1)], self.h[(0, 2)]],
            [self.h[(1, 0)], self.h[(1, 1)], self.h[(1, 2)]],
            [self.h[(2, 0)], self.h[(2, 1)], self.h[(2, 2)]],
        ]
    }

    /// Project a point; `None` if it lands on the line at infinity
    #[must_use]
    pub fn apply(&self, p: PixelPoint) -> Option<PixelPoint> {
        let v = self.h * Vector3::new(p.x, p.y, 1.0);
        let w = v[2];
        if w.abs() < EPSILON || !w.is_finite() {
            return None;
        }
        Some(PixelPoint::new(v[0] / w, v[1] / w))
    }

    #[must_use]
    pub fn inverse(&self) -> Option<Self> {
        self.h.try_inverse().map(Self::new)
    }

    /// True when every entry is finite and the matrix is invertible
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.h.iter().all(|v| v.is_finite()) && self.h.determinant().abs() > EPSILON
    }
}

fn hartley_normalization(cx: f64, cy: f64, mean_dist: f64) -> Matrix3<f64> {
    let s = if mean_dist > 1e-12 {
        (2.0_f64).sqrt() / mean_dist
    } else {
        1.0
    };

    Matrix3::<f64>::new(s, 0.0, -s * cx, 0.0, s, -s * cy, 0.0, 0.0, 1.0)
}

// Translate to centroid, scale so mean distance = sqrt(2)
fn normalize_points4(pts: &[PixelPoint; 4]) -> ([PixelPoint; 4], Matrix3<f64>) {
    let cx = pts.iter().map(|p| p.x).sum::<f64>() / 4.0;
    let cy = pts.iter().map(|p| p.y).sum::<f64>() / 4.0;
    let mean_dist = pts
        .iter()
        .map(|p| (p.x - cx).hypot(p.y - cy))
        .sum::<f64>()
        / 4.0;

    let t = hartley_normalization(cx, cy, mean_dist);

    let mut out = [PixelPoint::new(0.0, 0.0); 4];
    for (o, p) in out.iter_mut().zip(pts) {
        let v = t * Vector3::new(p.x, p.y, 1.0);
        *o = PixelPoint::new(v[0], v[1]);
    }
    (out, t)
}

/// Smallest doubled triangle area over all triples of the (normalized) quad
fn min_triangle_area(pts: &[PixelPoint; 4]) -> f64 {
    const TRIPLES: [(usize, usize, usize); 4] = [(0, 1, 2), (0, 1, 3), (0, 2, 3), (1, 2, 3)];
    TRIPLES
        .iter()
        .map(|&(a, b, c)| {
            let (pa, pb, pc) = (pts[a], pts[b], pts[c]);
            ((pb.x - pa.x) * (pc.y - pa.y) - (pb.y - pa.y) * (pc.x - pa.x)).abs()
        })
        .fold(f64::INFINITY, f64::min)
}

/// Compute H such that `dst ~ H * src` from exactly four correspondences.
///
/// Corner order must be consistent between `src` and `dst`. Fails with
/// `DegenerateCalibration` when any three source points are (nearly) collinear,
/// or when the linear system is singular.
pub fn homography_from_4pt(
    src: &[PixelPoint; 4],
    dst: &[PixelPoint; 4],
    degeneracy_epsilon: f64,
) -> Result<Homography> {
    if src.iter().chain(dst).any(|p| !p.x.is_finite() || !p.y.is_finite()) {
        return Err(Error::InvalidInput("Calibration points must be finite".to_string()));
    }

    let (src_n, t_src) = normalize_points4(src);
    let (dst_n, t_dst) = normalize_points4(dst);

    let area = min_triangle_area(&src_n);
    if area < degeneracy_epsilon {
        return Err(Error::DegenerateCalibration(format!(
            "source points are collinear (min normalized area {area:.2e})"
        )));
    }

    // Unknowns: [h11 h12 h13 h21 h22 h23 h31 h32], with h33 = 1
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();

    for k in 0..4 {
        let (x, y) = (src_n[k].x, src_n[k].y);
        let (u, v) = (dst_n[k].x, dst_n[k].y);

        let r0 = 2 * k;
        a[(r0, 0)] = x;
        a[(r0, 1)] = y;
        a[(r0, 2)] = 1.0;
        a[(r0, 6)] = -u * x;
        a[(r0, 7)] = -u * y;
        b[r0] = u;

        let r1 = 2 * k + 1;
        a[(r1, 3)] = x;
        a[(r1, 4)] = y;
        a[(r1, 5)] = 1.0;
        a[(r1, 6)] = -v * x;
        a[(r1, 7)] = -v * y;
        b[r1] = v;
    }

    let singular = || Error::DegenerateCalibration("correspondence system is singular".to_string());

    let x = a.lu().solve(&b).ok_or_else(singular)?;

    let hn = Matrix3::<f64>::new(
        x[0], x[1], x[2], //
        x[3], x[4], x[5], //
        x[6], x[7], 1.0,
    );

    let t_dst_inv = t_dst.try_inverse().ok_or_else(singular)?;
    let h = t_dst_inv * hn * t_src;
    let s = h[(2, 2)];
    if s.abs() < 1e-12 {
        return Err(singular());
    }

    let homography = Homography::new(h / s);
    if !homography.is_valid() {
        return Err(singular());
    }
    Ok(homography)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> [PixelPoint; 4] {
        [
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(500.0, 100.0),
            PixelPoint::new(500.0, 400.0),
            PixelPoint::new(100.0, 400.0),
        ]
    }

    #[test]
    fn test_corners_map_onto_rectangle() {
        let dst = DestinationRect::new(1920.0, 1080.0).corners();
        let h = homography_from_4pt(&quad(), &dst, 1e-3).unwrap();
        for (s, d) in quad().iter().zip(dst.iter()) {
            let p = h.apply(*s).unwrap();
            assert!((p.x - d.x).abs() < 1e-6, "{p:?} vs {d:?}");
            assert!((p.y - d.y).abs() < 1e-6, "{p:?} vs {d:?}");
        }
    }

    #[test]
    fn test_perspective_quad() {
        let src = [
            PixelPoint::new(120.0, 80.0),
            PixelPoint::new(530.0, 110.0),
            PixelPoint::new(560.0, 420.0),
            PixelPoint::new(90.0, 390.0),
        ];
        let dst = DestinationRect::new(1280.0, 720.0).corners();
        let h = homography_from_4pt(&src, &dst, 1e-3).unwrap();
        for (s, d) in src.iter().zip(dst.iter()) {
            let p = h.apply(*s).unwrap();
            assert!((p.x - d.x).abs() < 1e-6);
            assert!((p.y - d.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_collinear_rejected() {
        let src = [
            PixelPoint::new(0.0, 0.0),
            PixelPoint::new(100.0, 100.0),
            PixelPoint::new(200.0, 200.0),
            PixelPoint::new(300.0, 300.0),
        ];
        let dst = DestinationRect::new(1920.0, 1080.0).corners();
        assert!(matches!(
            homography_from_4pt(&src, &dst, 1e-3),
            Err(Error::DegenerateCalibration(_))
        ));
    }

    #[test]
    fn test_array_round_trip() {
        let h = homography_from_4pt(&quad(), &DestinationRect::new(1920.0, 1080.0).corners(), 1e-3)
            .unwrap();
        let back = Homography::from_array(h.to_array());
        assert_eq!(h, back);
    }
}
