use crate::array::{span, Array, Axis, ALL};
use crate::database::{BlockIndex, Database, Field};
use crate::error::Error;
use crate::hydro::error::Error as HydroError;
use crate::hydro::euler::{riemann_hlle, Conserved, Primitive, SourceTerms};
use crate::hydro::geometry::Direction;
use crate::thread_pool::ThreadPool;
use crate::ufunc;

const PLM_THETA: f64 = 2.0;




/**
 * The four geometry arrays a single-patch update needs, copied out of the
 * database so a worker thread owns everything it touches.
 */
#[derive(Clone)]
pub struct MeshGeometry {
    pub centroids: Array,
    pub volumes: Array,
    pub face_areas_i: Array,
    pub face_areas_j: Array,
}




// ============================================================================
impl MeshGeometry {

    pub fn for_block(database: &Database, block: BlockIndex) -> Self {
        Self {
            centroids: database.at(block, Field::CellCoords).clone(),
            volumes: database.at(block, Field::CellVolume).clone(),
            face_areas_i: database.at(block, Field::FaceAreaI).clone(),
            face_areas_j: database.at(block, Field::FaceAreaJ).clone(),
        }
    }
}




// ============================================================================
fn min3abs(a: f64, b: f64, c: f64) -> f64 {
    a.abs().min(b.abs()).min(c.abs())
}

fn sgn(x: f64) -> f64 {
    1.0_f64.copysign(x)
}

/// The TVD minmod slope of the triple (ul, u0, ur), limited with parameter
/// theta: zero wherever the one-sided differences disagree in sign, and
/// never steeper than either one-sided difference scaled by theta.
///
fn plm_gradient(ul: f64, u0: f64, ur: f64, theta: f64) -> f64 {
    let a = theta * (u0 - ul);
    let b = 0.5 * (ur - ul);
    let c = theta * (ur - u0);
    0.25 * (sgn(a) + sgn(b)).abs() * (sgn(a) + sgn(c)) * min3abs(a, b, c)
}

/// Insert a zeroed row at each end of axis 1. Closes the polar boundary:
/// gradients and Godunov fluxes at the axis rows vanish there.
///
fn pad_with_zeros_j(a: &Array) -> Array {
    let (ni, nj, nk) = a.dim();
    let mut res = Array::zeros((ni, nj + 2, nk));
    res.select_mut(ALL, span(1, nj + 1), ALL).assign(a.view());
    res
}




// ============================================================================
/// Advance a single patch of conserved data through one Godunov step of
/// size `dt`. The input array carries two radial guard rows on each side and
/// none on the polar sides, shape (ni + 4, nj, 5); the geometry is sized for
/// the interior. Returns the updated interior, shape (ni, nj, 5). No floors
/// are applied; a state driven invalid here surfaces from the primitive
/// recovery on the following step.
///
pub fn advance_2d(
    source_terms: SourceTerms,
    u0: &Array,
    geometry: &MeshGeometry,
    dt: f64,
) -> Result<Array, HydroError> {
    let gradient_est = ufunc::from3(|ql, q0, qr| plm_gradient(ql, q0, qr, PLM_THETA));
    let extrap_l = ufunc::from2(|a, b| a - b * 0.5);
    let extrap_r = ufunc::from2(|a, b| a + b * 0.5);

    let cons_to_prim = ufunc::vfrom1(|u: [f64; 5]| {
        Conserved::from(u).to_primitive().map(|p| p.as_array())
    });
    let godunov_flux_i = ufunc::vfrom2(|pl: [f64; 5], pr: [f64; 5]| {
        riemann_hlle(pl.into(), pr.into(), Direction::Radial).map(|f| f.as_array())
    });
    let godunov_flux_j = ufunc::vfrom2(|pl: [f64; 5], pr: [f64; 5]| {
        riemann_hlle(pl.into(), pr.into(), Direction::Polar).map(|f| f.as_array())
    });
    let evaluate_src = ufunc::vfrom2(|p: [f64; 5], x: [f64; 2]| {
        source_terms.evaluate(p.into(), (x[0], x[1])).map(|s| s.as_array())
    });
    let flux_times_area = ufunc::vfrom2(|f: [f64; 5], da: [f64; 1]| {
        Ok::<_, HydroError>([
            f[0] * da[0],
            f[1] * da[0],
            f[2] * da[0],
            f[3] * da[0],
            f[4] * da[0],
        ])
    });
    let advance_cons = ufunc::vfrom3(move |s: [f64; 5], df: [f64; 5], dv: [f64; 1]| {
        Ok::<_, HydroError>([
            dt * (s[0] - df[0] / dv[0]),
            dt * (s[1] - df[1] / dv[0]),
            dt * (s[2] - df[2] / dv[0]),
            dt * (s[3] - df[3] / dv[0]),
            dt * (s[4] - df[4] / dv[0]),
        ])
    });

    let mi = u0.shape(Axis::I);
    let mj = u0.shape(Axis::J);
    let p0 = cons_to_prim(u0.view())?;

    // Radial-facing Godunov fluxes, area-weighted, on the ni + 1 faces
    let fhi = {
        let pa = p0.select(span(0, mi - 2), ALL, ALL);
        let pb = p0.select(span(1, mi - 1), ALL, ALL);
        let pc = p0.select(span(2, mi), ALL, ALL);
        let gb = gradient_est(pa, pb, pc);
        let pl = extrap_l(pb, gb.view());
        let pr = extrap_r(pb, gb.view());
        let fh = godunov_flux_i(
            pr.take(Axis::I, span(0, mi - 3)),
            pl.take(Axis::I, span(1, mi - 2)),
        )?;
        flux_times_area(fh.view(), geometry.face_areas_i.view())?
    };

    // Polar-facing fluxes on the nj + 1 faces; the interior gradient is
    // padded with a zero row at each end, and so is the flux, closing the
    // domain at the polar axis
    let fhj = {
        let pa = p0.select(span(2, mi - 2), span(0, mj - 2), ALL);
        let pb = p0.select(span(2, mi - 2), span(1, mj - 1), ALL);
        let pc = p0.select(span(2, mi - 2), span(2, mj), ALL);
        let gb = pad_with_zeros_j(&gradient_est(pa, pb, pc));
        let pl = extrap_l(p0.take(Axis::I, span(2, mi - 2)), gb.view());
        let pr = extrap_r(p0.take(Axis::I, span(2, mi - 2)), gb.view());
        let fh = pad_with_zeros_j(&godunov_flux_j(
            pr.take(Axis::J, span(0, mj - 1)),
            pl.take(Axis::J, span(1, mj)),
        )?);
        flux_times_area(fh.view(), geometry.face_areas_j.view())?
    };

    let dfi = fhi.take(Axis::I, span(1, mi - 3)) - fhi.take(Axis::I, span(0, mi - 4));
    let dfj = fhj.take(Axis::J, span(1, mj + 1)) - fhj.take(Axis::J, span(0, mj));
    let df = dfi + dfj;

    let s0 = evaluate_src(p0.take(Axis::I, span(2, mi - 2)), geometry.centroids.view())?;
    let du = advance_cons(s0.view(), df.view(), geometry.volumes.view())?;

    Ok(u0.take(Axis::I, span(2, mi - 2)) + du)
}




// ============================================================================
/// Advance every conserved patch through one sub-step: fetch the
/// guard-padded state and geometry on the main thread, farm the updates out
/// to the pool, then drain the completion handles in submission order and
/// blend each result into the database with the given factor.
///
pub fn update_2d_threaded(
    pool: &ThreadPool,
    source_terms: SourceTerms,
    database: &mut Database,
    dt: f64,
    rk_factor: f64,
) -> Result<(), Error> {
    let mut futures = Vec::new();

    for block in database.blocks(Field::Conserved) {
        let u = database.fetch(block, 2, 2, 0, 0, Field::Conserved);
        let geometry = MeshGeometry::for_block(database, block);

        futures.push(pool.enqueue(move || (block, advance_2d(source_terms, &u, &geometry, dt))));
    }

    for future in futures {
        let (block, result) = future.wait();
        database.commit((block, Field::Conserved), result?, rk_factor);
    }
    Ok(())
}


/// One full time step at the given Runge-Kutta order.
///
pub fn update(
    pool: &ThreadPool,
    source_terms: SourceTerms,
    database: &mut Database,
    dt: f64,
    rk: i64,
) -> Result<(), Error> {
    match rk {
        1 => update_2d_threaded(pool, source_terms, database, dt, 0.0),
        2 => {
            update_2d_threaded(pool, source_terms, database, dt, 0.0)?;
            update_2d_threaded(pool, source_terms, database, dt, 0.5)
        }
        _ => Err(Error::InvalidRungeKutta(rk)),
    }
}
