//! Coordinate normalization
//!
//! Both modes derive one global affine transform from the per-axis bounding
//! box of the whole point set. Center mode only translates (scatter scale is
//! applied at render time); rect mode translates and scales into a pixel
//! rectangle for grid snapping.

use tracing::debug;

use crate::config::Canvas;
use crate::error::{LayoutError, Result};
use crate::types::Projection;

/// Per-axis bounding box of a point set.
#[derive(Debug, Clone, PartialEq)]
pub struct Extents {
    pub min: Vec<f32>,
    pub max: Vec<f32>,
}

impl Extents {
    /// Bounds of `points`, or `None` for an empty projection.
    pub fn of(points: &Projection) -> Option<Self> {
        let first = points.point(0)?;
        let mut min = first.to_vec();
        let mut max = first.to_vec();

        for p in points.iter() {
            for (axis, &v) in p.iter().enumerate() {
                if v < min[axis] {
                    min[axis] = v;
                }
                if v > max[axis] {
                    max[axis] = v;
                }
            }
        }

        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec<f32> {
        self.min
            .iter()
            .zip(&self.max)
            .map(|(lo, hi)| (lo + hi) / 2.0)
            .collect()
    }
}

/// Translate points so their bounding box is centered on the origin.
///
/// A single point maps to the origin. No scaling is applied.
pub fn center(points: &Projection) -> Projection {
    let Some(extents) = Extents::of(points) else {
        return points.clone();
    };
    let center = extents.center();
    debug!("centering {} points around {:?}", points.len(), center);

    let coords: Vec<f32> = points
        .iter()
        .flat_map(|p| p.iter().zip(&center).map(|(v, c)| v - c))
        .collect();

    Projection::from_flat_unchecked(points.dims(), coords)
}

/// Stretch 2D points over `[0, width] x [0, height]`.
///
/// The minimum on each axis lands on 0 and the maximum on the far edge. An
/// axis with no spread would divide by zero; every point on it goes to the
/// middle of the target range instead.
pub fn fit_rect(points: &Projection, canvas: Canvas) -> Result<Vec<[f32; 2]>> {
    if points.dims() != 2 {
        return Err(LayoutError::InvalidConfig(format!(
            "rect normalization needs 2D points, got {} components",
            points.dims()
        )));
    }
    let Some(extents) = Extents::of(points) else {
        return Ok(Vec::new());
    };

    let x = AxisMap::new(&extents, 0, canvas.width);
    let y = AxisMap::new(&extents, 1, canvas.height);

    Ok(points.iter().map(|p| [x.apply(p[0]), y.apply(p[1])]).collect())
}

/// Linear remap of one axis onto `[0, target]`.
///
/// Worked in f64 so `max - min` cannot overflow for finite f32 extremes.
enum AxisMap {
    Linear { min: f64, span: f64, target: f64 },
    Midpoint(f32),
}

impl AxisMap {
    fn new(extents: &Extents, axis: usize, target: f32) -> Self {
        let min = f64::from(extents.min[axis]);
        let span = f64::from(extents.max[axis]) - min;
        if span == 0.0 {
            debug!("axis {} has no spread, mapping to midpoint {}", axis, target / 2.0);
            AxisMap::Midpoint(target / 2.0)
        } else {
            AxisMap::Linear {
                min,
                span,
                target: f64::from(target),
            }
        }
    }

    fn apply(&self, v: f32) -> f32 {
        match *self {
            AxisMap::Linear { min, span, target } => {
                ((f64::from(v) - min) / span * target) as f32
            }
            AxisMap::Midpoint(mid) => mid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn canvas(width: f32, height: f32) -> Canvas {
        Canvas { width, height }
    }

    #[test]
    fn extents_per_axis() {
        let p = Projection::from_points(&[[1.0, -2.0, 5.0], [3.0, 4.0, -1.0], [2.0, 0.0, 0.0]]);
        let e = Extents::of(&p).unwrap();
        assert_eq!(e.min, vec![1.0, -2.0, -1.0]);
        assert_eq!(e.max, vec![3.0, 4.0, 5.0]);
        assert_eq!(e.center(), vec![2.0, 1.0, 2.0]);
    }

    #[test]
    fn centered_bounds_straddle_origin() {
        let p = Projection::from_points(&[[3.5, -7.25], [10.0, 2.0], [4.0, 0.5], [-1.5, 9.0]]);
        let out = center(&p);
        let e = Extents::of(&out).unwrap();
        for axis in 0..2 {
            let mid = (e.min[axis] + e.max[axis]) / 2.0;
            assert!(mid.abs() < EPS, "axis {} midpoint {}", axis, mid);
        }
    }

    #[test]
    fn center_is_translation_only() {
        let p = Projection::from_points(&[[0.0, 0.0, 0.0], [4.0, 2.0, 10.0]]);
        let out = center(&p);
        assert_eq!(out.point(0), Some(&[-2.0, -1.0, -5.0][..]));
        assert_eq!(out.point(1), Some(&[2.0, 1.0, 5.0][..]));
    }

    #[test]
    fn single_point_centers_to_origin() {
        let p = Projection::from_points(&[[12.0, -3.0]]);
        assert_eq!(center(&p).point(0), Some(&[0.0, 0.0][..]));
    }

    #[test]
    fn empty_input_stays_empty() {
        let p = Projection::from_points::<2>(&[]);
        assert!(center(&p).is_empty());
        assert!(fit_rect(&p, canvas(10.0, 10.0)).unwrap().is_empty());
    }

    #[test]
    fn rect_hits_edges() {
        let p = Projection::from_points(&[[-1.0, 5.0], [3.0, 1.0], [1.0, 3.0]]);
        let out = fit_rect(&p, canvas(800.0, 600.0)).unwrap();
        assert_eq!(out[0][0], 0.0);
        assert_eq!(out[1][0], 800.0);
        assert_eq!(out[1][1], 0.0);
        assert_eq!(out[0][1], 600.0);
        assert!((out[2][0] - 400.0).abs() < EPS);
        assert!((out[2][1] - 300.0).abs() < EPS);
        for [x, y] in out {
            assert!((0.0..=800.0).contains(&x));
            assert!((0.0..=600.0).contains(&y));
        }
    }

    #[test]
    fn huge_extents_stay_in_rect() {
        let p = Projection::from_points(&[[-3e38, 0.0], [3e38, 1.0], [0.0, 0.5]]);
        let out = fit_rect(&p, canvas(100.0, 100.0)).unwrap();
        assert_eq!(out, vec![[0.0, 0.0], [100.0, 100.0], [50.0, 50.0]]);
    }

    #[test]
    fn flat_axis_maps_to_midpoint() {
        let p = Projection::from_points(&[[2.0, 0.0], [2.0, 5.0], [2.0, 10.0]]);
        let out = fit_rect(&p, canvas(100.0, 50.0)).unwrap();
        for point in &out {
            assert_eq!(point[0], 50.0);
            assert!(point[1].is_finite());
        }
        assert_eq!(out[2][1], 50.0);
    }

    #[test]
    fn rect_rejects_3d() {
        let p = Projection::from_points(&[[0.0, 0.0, 0.0]]);
        assert!(matches!(
            fit_rect(&p, canvas(1.0, 1.0)),
            Err(LayoutError::InvalidConfig(_))
        ));
    }
}
