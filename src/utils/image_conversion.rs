//! Image helpers for target location: luminance and HSV masks, morphology,
//! connected regions and enclosing circles.
//!
//! Masks are `GrayImage`s holding 0 or 255 so they feed straight into `imageproc`.

use crate::mapper::PixelPoint;
use image::{imageops, GrayImage, Luma, RgbImage};
use imageproc::{
    contours::{find_contours, BorderType},
    contrast::{threshold as binary_threshold, ThresholdType},
    distance_transform::Norm,
    filter::gaussian_blur_f32,
    geometry::convex_hull,
    morphology,
    point::Point,
    region_labelling::{connected_components, Connectivity},
};
use palette::{FromColor, Hsv, Srgb};
use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

const ON: u8 = 255;

// Fixed seed keeps circle fits reproducible between runs
const SHUFFLE_SEED: u64 = 0x4c0c_a7e5;

/// Number of set pixels in a mask
#[must_use]
pub fn mask_count(mask: &GrayImage) -> usize {
    mask.pixels().filter(|p| p.0[0] != 0).count()
}

/// Grayscale then Gaussian blur
#[must_use]
pub fn blurred_luma(frame: &RgbImage, sigma: f32) -> GrayImage {
    let gray = imageops::grayscale(frame);
    if sigma > 0.0 {
        gaussian_blur_f32(&gray, sigma)
    } else {
        gray
    }
}

/// Pixels strictly above `cutoff`
#[must_use]
pub fn threshold(gray: &GrayImage, cutoff: u8) -> GrayImage {
    binary_threshold(gray, cutoff, ThresholdType::Binary)
}

/// RGB to HSV on the 0..180 / 0..255 / 0..255 scale common to vision toolkits
#[must_use]
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [f32; 3] {
    let hsv: Hsv = Hsv::from_color(Srgb::new(rgb[0], rgb[1], rgb[2]).into_format::<f32>());
    [
        hsv.hue.into_positive_degrees() / 2.0,
        hsv.saturation * 255.0,
        hsv.value * 255.0,
    ]
}

/// Pixels whose HSV value falls inside `[lower, upper]` on every channel
#[must_use]
pub fn hsv_mask(frame: &RgbImage, lower: [u8; 3], upper: [u8; 3]) -> GrayImage {
    GrayImage::from_fn(frame.width(), frame.height(), |x, y| {
        let hsv = rgb_to_hsv(frame.get_pixel(x, y).0);
        let inside = (0..3).all(|c| hsv[c] >= f32::from(lower[c]) && hsv[c] <= f32::from(upper[c]));
        Luma([if inside { ON } else { 0 }])
    })
}

/// 3x3 opening: erode then dilate, removing speckle
#[must_use]
pub fn open(mask: &GrayImage) -> GrayImage {
    morphology::open(mask, Norm::LInf, 1)
}

/// A 4-connected set of mask pixels
#[derive(Debug, Clone)]
pub struct Region {
    area: usize,
    centroid: PixelPoint,
    mask: GrayImage,
}

impl Region {
    #[must_use]
    pub const fn area(&self) -> usize {
        self.area
    }

    #[must_use]
    pub const fn centroid(&self) -> PixelPoint {
        self.centroid
    }

    /// Pixels on the region's outer contour
    #[must_use]
    pub fn boundary(&self) -> Vec<PixelPoint> {
        find_contours::<i32>(&self.mask)
            .into_iter()
            .filter(|c| matches!(c.border_type, BorderType::Outer))
            .flat_map(|c| c.points)
            .map(|p| PixelPoint::new(f64::from(p.x), f64::from(p.y)))
            .collect()
    }

    /// Smallest circle containing the region
    #[must_use]
    pub fn enclosing_circle(&self) -> Option<(PixelPoint, f64)> {
        min_enclosing_circle(&self.boundary())
    }
}

/// Largest 4-connected region, if the mask has any set pixel
#[must_use]
pub fn largest_region(mask: &GrayImage) -> Option<Region> {
    let labels = connected_components(mask, Connectivity::Four, Luma([0u8]));

    let mut areas: Vec<usize> = Vec::new();
    for label in labels.pixels().map(|p| p.0[0] as usize).filter(|l| *l > 0) {
        if label >= areas.len() {
            areas.resize(label + 1, 0);
        }
        areas[label] += 1;
    }
    let (best, &area) = areas.iter().enumerate().max_by_key(|(_, a)| **a)?;
    if area == 0 {
        return None;
    }
    let best = u32::try_from(best).ok()?;

    let (mut sx, mut sy) = (0.0, 0.0);
    let region_mask = GrayImage::from_fn(mask.width(), mask.height(), |x, y| {
        if labels.get_pixel(x, y).0[0] == best {
            sx += f64::from(x);
            sy += f64::from(y);
            Luma([ON])
        } else {
            Luma([0])
        }
    });
    let n = area as f64;

    Some(Region {
        area,
        centroid: PixelPoint::new(sx / n, sy / n),
        mask: region_mask,
    })
}

fn circle_from_two(a: PixelPoint, b: PixelPoint) -> (PixelPoint, f64) {
    let center = PixelPoint::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
    (center, a.distance(&b) / 2.0)
}

fn circle_from_three(a: PixelPoint, b: PixelPoint, c: PixelPoint) -> (PixelPoint, f64) {
    let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
    if d.abs() < 1e-12 {
        // collinear: the widest pair spans the circle
        let candidates = [circle_from_two(a, b), circle_from_two(a, c), circle_from_two(b, c)];
        return candidates
            .into_iter()
            .max_by(|p, q| p.1.total_cmp(&q.1))
            .unwrap_or((a, 0.0));
    }
    let a2 = a.x * a.x + a.y * a.y;
    let b2 = b.x * b.x + b.y * b.y;
    let c2 = c.x * c.x + c.y * c.y;
    let ux = (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d;
    let uy = (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d;
    let center = PixelPoint::new(ux, uy);
    (center, center.distance(&a))
}

fn contains(circle: (PixelPoint, f64), p: PixelPoint) -> bool {
    circle.0.distance(&p) <= circle.1 + 1e-7
}

// Only hull vertices can lie on the enclosing circle
fn hull_vertices(points: &[PixelPoint]) -> Vec<PixelPoint> {
    let integral = points.iter().all(|p| p.x.fract() == 0.0 && p.y.fract() == 0.0);
    if !integral {
        return points.to_vec();
    }
    let pts: Vec<Point<i64>> = points
        .iter()
        .map(|p| Point::new(p.x as i64, p.y as i64))
        .collect();
    convex_hull(pts.as_slice())
        .into_iter()
        .map(|p| PixelPoint::new(p.x as f64, p.y as f64))
        .collect()
}

/// Minimal enclosing circle (randomised incremental Welzl), `None` for an empty set
#[must_use]
pub fn min_enclosing_circle(points: &[PixelPoint]) -> Option<(PixelPoint, f64)> {
    let mut points = hull_vertices(points);
    points.shuffle(&mut StdRng::seed_from_u64(SHUFFLE_SEED));

    let first = *points.first()?;
    let mut circle = (first, 0.0);

    for i in 1..points.len() {
        if contains(circle, points[i]) {
            continue;
        }
        circle = (points[i], 0.0);
        for j in 0..i {
            if contains(circle, points[j]) {
                continue;
            }
            circle = circle_from_two(points[i], points[j]);
            for k in 0..j {
                if !contains(circle, points[k]) {
                    circle = circle_from_three(points[i], points[j], points[k]);
                }
            }
        }
    }

    Some(circle)
}
