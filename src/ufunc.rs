use crate::array::{Array, ArrayView};




/*
 * Adapters which lift pointwise functions to operate over conforming arrays.
 *
 * The scalar lifters (`from1` .. `from3`) apply a function of one to three
 * doubles over every element of same-shaped arrays. The vector lifters
 * (`vfrom1` .. `vfrom3`) treat the trailing axis as a component tuple of
 * statically known length per argument, apply a fallible function of those
 * tuples over the leading axes, and collect the returned tuples into a new
 * array. `nfrom` applies a function of a fixed-length tuple to that many
 * parallel single-component arrays.
 *
 * Disagreeing leading shapes indicate a defect in the calling scheme and
 * panic; errors returned by the lifted function propagate to the caller.
 */




// ============================================================================
fn leading(views: &[&ArrayView]) -> (usize, usize) {
    let (ni, nj, _) = views[0].dim();

    for v in views {
        assert!(
            v.dim().0 == ni && v.dim().1 == nj,
            "arrays with leading shapes ({}, {}) and ({}, {}) do not conform",
            ni,
            nj,
            v.dim().0,
            v.dim().1
        );
    }
    (ni, nj)
}

fn components<const M: usize>(v: &ArrayView, i: usize, j: usize) -> [f64; M] {
    assert!(
        v.dim().2 == M,
        "expected {} components on the trailing axis, got {}",
        M,
        v.dim().2
    );
    let mut x = [0.0; M];

    for (k, xk) in x.iter_mut().enumerate() {
        *xk = v.get(i, j, k)
    }
    x
}




// ============================================================================
pub fn from1<F>(f: F) -> impl Fn(ArrayView) -> Array
where
    F: Fn(f64) -> f64,
{
    move |a| Array::from_shape_vec(a.dim(), a.iter().map(&f).collect())
}

pub fn from2<F>(f: F) -> impl Fn(ArrayView, ArrayView) -> Array
where
    F: Fn(f64, f64) -> f64,
{
    move |a, b| {
        assert!(
            a.dim() == b.dim(),
            "arrays {:?} and {:?} do not conform",
            a.dim(),
            b.dim()
        );
        Array::from_shape_vec(a.dim(), a.iter().zip(b.iter()).map(|(x, y)| f(x, y)).collect())
    }
}

pub fn from3<F>(f: F) -> impl Fn(ArrayView, ArrayView, ArrayView) -> Array
where
    F: Fn(f64, f64, f64) -> f64,
{
    move |a, b, c| {
        assert!(
            a.dim() == b.dim() && b.dim() == c.dim(),
            "arrays {:?}, {:?} and {:?} do not conform",
            a.dim(),
            b.dim(),
            c.dim()
        );
        let data = a
            .iter()
            .zip(b.iter().zip(c.iter()))
            .map(|(x, (y, z))| f(x, y, z))
            .collect();
        Array::from_shape_vec(a.dim(), data)
    }
}




// ============================================================================
pub fn vfrom1<const M: usize, const N: usize, E, F>(f: F) -> impl Fn(ArrayView) -> Result<Array, E>
where
    F: Fn([f64; M]) -> Result<[f64; N], E>,
{
    move |a| {
        let (ni, nj) = leading(&[&a]);
        let mut data = Vec::with_capacity(ni * nj * N);

        for i in 0..ni {
            for j in 0..nj {
                data.extend_from_slice(&f(components(&a, i, j))?)
            }
        }
        Ok(Array::from_shape_vec((ni, nj, N), data))
    }
}

pub fn vfrom2<const M1: usize, const M2: usize, const N: usize, E, F>(
    f: F,
) -> impl Fn(ArrayView, ArrayView) -> Result<Array, E>
where
    F: Fn([f64; M1], [f64; M2]) -> Result<[f64; N], E>,
{
    move |a, b| {
        let (ni, nj) = leading(&[&a, &b]);
        let mut data = Vec::with_capacity(ni * nj * N);

        for i in 0..ni {
            for j in 0..nj {
                data.extend_from_slice(&f(components(&a, i, j), components(&b, i, j))?)
            }
        }
        Ok(Array::from_shape_vec((ni, nj, N), data))
    }
}

pub fn vfrom3<const M1: usize, const M2: usize, const M3: usize, const N: usize, E, F>(
    f: F,
) -> impl Fn(ArrayView, ArrayView, ArrayView) -> Result<Array, E>
where
    F: Fn([f64; M1], [f64; M2], [f64; M3]) -> Result<[f64; N], E>,
{
    move |a, b, c| {
        let (ni, nj) = leading(&[&a, &b, &c]);
        let mut data = Vec::with_capacity(ni * nj * N);

        for i in 0..ni {
            for j in 0..nj {
                data.extend_from_slice(&f(
                    components(&a, i, j),
                    components(&b, i, j),
                    components(&c, i, j),
                )?)
            }
        }
        Ok(Array::from_shape_vec((ni, nj, N), data))
    }
}




// ============================================================================
pub fn nfrom<const K: usize, F>(f: F) -> impl Fn([ArrayView; K]) -> Array
where
    F: Fn([f64; K]) -> f64,
{
    move |args| {
        let refs: Vec<&ArrayView> = args.iter().collect();
        let (ni, nj) = leading(&refs);

        for v in &args {
            assert!(
                v.dim().2 == 1,
                "tuple-lifted functions take single-component arrays, got {} components",
                v.dim().2
            );
        }
        let mut data = Vec::with_capacity(ni * nj);

        for i in 0..ni {
            for j in 0..nj {
                let mut x = [0.0; K];

                for (k, xk) in x.iter_mut().enumerate() {
                    *xk = args[k].get(i, j, 0)
                }
                data.push(f(x))
            }
        }
        Array::from_shape_vec((ni, nj, 1), data)
    }
}
