use std::f64::consts::PI;

use crate::array::{span, Array, Axis, ALL};
use crate::ufunc;




/*
 * Closed-form geometry for a single logically rectangular patch of a
 * spherical-polar mesh, azimuthally symmetric over phi in [0, 2 pi]. Radial
 * vertices are spaced as a geometric progression so cells keep a constant
 * aspect ratio; polar vertices are uniform. All quantities derive from the
 * vertex array.
 */




// ============================================================================
/// Vertex coordinates (r, theta) for a patch with `ni` by `nj` cells over
/// `extent` = [r0, r1, theta0, theta1]. The result has shape
/// (ni + 1, nj + 1, 2).
///
pub fn vertices(ni: usize, nj: usize, extent: [f64; 4]) -> Array {
    let [x0, x1, y0, y1] = extent;

    Array::from_fn((ni + 1, nj + 1, 2), |i, j, k| match k {
        0 => x0 * (x1 / x0).powf(i as f64 / ni as f64),
        _ => y0 + (y1 - y0) * j as f64 / nj as f64,
    })
}


/// Cell centroid coordinates, shape (ni, nj, 2): the geometric mean radius
/// and the arithmetic mean polar angle of each cell's vertices.
///
pub fn cell_centroids(verts: &Array) -> Array {
    let centroid_r = ufunc::from2(|r0: f64, r1: f64| (r0 * r1).sqrt());
    let centroid_q = ufunc::from2(|q0: f64, q1: f64| 0.5 * (q0 + q1));

    let mi = verts.shape(Axis::I);
    let mj = verts.shape(Axis::J);
    let r0 = verts.select(span(0, mi - 1), span(0, mj - 1), span(0, 1));
    let r1 = verts.select(span(1, mi), span(1, mj), span(0, 1));
    let q0 = verts.select(span(0, mi - 1), span(0, mj - 1), span(1, 2));
    let q1 = verts.select(span(1, mi), span(1, mj), span(1, 2));

    let mut res = Array::zeros((mi - 1, mj - 1, 2));
    res.select_mut(ALL, ALL, span(0, 1)).assign(centroid_r(r0, r1).view());
    res.select_mut(ALL, ALL, span(1, 2)).assign(centroid_q(q0, q1).view());
    res
}


/// Cell volumes, shape (ni, nj, 1).
///
pub fn cell_volumes(verts: &Array) -> Array {
    let mi = verts.shape(Axis::I);
    let mj = verts.shape(Axis::J);
    let r0 = verts.select(span(0, mi - 1), span(0, mj - 1), span(0, 1));
    let r1 = verts.select(span(1, mi), span(1, mj), span(0, 1));
    let q0 = verts.select(span(0, mi - 1), span(0, mj - 1), span(1, 2));
    let q1 = verts.select(span(1, mi), span(1, mj), span(1, 2));

    let volume = ufunc::nfrom(|extent: [f64; 4]| {
        let [r0, r1, q0, q1] = extent;
        -1.0 / 3.0 * (r1 * r1 * r1 - r0 * r0 * r0) * (q1.cos() - q0.cos()) * 2.0 * PI
    });
    volume([r0, r1, q0, q1])
}


/// Areas of the radial faces, shape (ni + 1, nj, 1).
///
pub fn face_areas_i(verts: &Array) -> Array {
    let mj = verts.shape(Axis::J);
    let r0 = verts.select(ALL, span(0, mj - 1), span(0, 1));
    let r1 = verts.select(ALL, span(1, mj), span(0, 1));
    let q0 = verts.select(ALL, span(0, mj - 1), span(1, 2));
    let q1 = verts.select(ALL, span(1, mj), span(1, 2));

    let area = ufunc::nfrom(|extent: [f64; 4]| {
        let [r0, _r1, q0, q1] = extent;
        -r0 * r0 * 2.0 * PI * (q1.cos() - q0.cos())
    });
    area([r0, r1, q0, q1])
}


/// Areas of the polar faces, shape (ni, nj + 1, 1).
///
pub fn face_areas_j(verts: &Array) -> Array {
    let mi = verts.shape(Axis::I);
    let r0 = verts.select(span(0, mi - 1), ALL, span(0, 1));
    let r1 = verts.select(span(1, mi), ALL, span(0, 1));
    let q0 = verts.select(span(0, mi - 1), ALL, span(1, 2));
    let q1 = verts.select(span(1, mi), ALL, span(1, 2));

    let area = ufunc::nfrom(|extent: [f64; 4]| {
        let [r0, r1, q0, _q1] = extent;
        0.5 * (r1 + r0) * (r1 - r0) * 2.0 * PI * q0.sin()
    });
    area([r0, r1, q0, q1])
}
