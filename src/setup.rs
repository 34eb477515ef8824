use std::f64::consts::PI;
use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::array::Array;
use crate::config::{RunConfig, RunStatus};
use crate::database::{
    BlockIndex, Database, Field, FieldDescriptor, MeshLocation, PatchBoundary,
};
use crate::error::Error;
use crate::hydro::euler::{Primitive, GAMMA_LAW_INDEX};
use crate::io;
use crate::mesh;
use crate::scheduler::Scheduler;
use crate::ufunc;




/**
 * The initial model: a power-law atmosphere in hydrostatic balance around a
 * unit point mass, optionally perturbed with uniform random density noise.
 * The generator is seeded so repeated runs lay down identical initial data;
 * it is only consulted here, during single-threaded startup.
 */
pub struct Atmosphere {
    noise: f64,
    rng: StdRng,
}




// ============================================================================
impl Atmosphere {

    pub fn new(noise: f64) -> Self {
        Self {
            noise,
            rng: StdRng::seed_from_u64(0),
        }
    }

    pub fn primitive_at(&mut self, position: (f64, f64)) -> Primitive {
        let r = position.0;
        let alpha = 1.5;
        let vf = (1.0 / r).sqrt();
        let cs2 = vf * vf / alpha;
        let dg = r.powf(-alpha);
        let pg = dg * cs2 / GAMMA_LAW_INDEX;
        let delta = self.noise * self.rng.gen::<f64>();

        Primitive::new(dg + delta, 0.0, 0.0, 0.0, pg)
    }
}




// ============================================================================
/// The reference boundary-value policy: reflect through the inner radial
/// edge with the radial momentum sign-flipped, replicate the last interior
/// row through the outer radial edge, and leave the polar edges to the
/// solver, which closes them by zeroing the transverse gradient and flux.
///
pub fn boundary_value(
    _: BlockIndex,
    edge: PatchBoundary,
    depth: usize,
    patch: &Array,
) -> Array {
    match edge {
        PatchBoundary::Il => reflecting_inner(depth, patch),
        PatchBoundary::Ir => zero_gradient_outer(depth, patch),
        PatchBoundary::Jl | PatchBoundary::Jr => Array::zeros((0, 0, 0)),
    }
}

fn reflecting_inner(depth: usize, patch: &Array) -> Array {
    let (ni, nj, nk) = patch.dim();
    assert!(depth <= ni, "guard depth {} exceeds the patch extent {}", depth, ni);

    Array::from_fn((depth, nj, nk), |i, j, k| {
        let x = patch[(depth - 1 - i, j, k)];
        if k == 1 {
            -x
        } else {
            x
        }
    })
}

fn zero_gradient_outer(depth: usize, patch: &Array) -> Array {
    let (ni, nj, nk) = patch.dim();
    Array::from_fn((depth, nj, nk), |_, j, k| patch[(ni - 1, j, k)])
}




// ============================================================================
pub fn create_header() -> Vec<(Field, FieldDescriptor)> {
    vec![
        (Field::Conserved, FieldDescriptor::new(5, MeshLocation::Cell)),
        (Field::VertCoords, FieldDescriptor::new(2, MeshLocation::Vert)),
        (Field::CellCoords, FieldDescriptor::new(2, MeshLocation::Cell)),
        (Field::CellVolume, FieldDescriptor::new(1, MeshLocation::Cell)),
        (Field::FaceAreaI, FieldDescriptor::new(1, MeshLocation::FaceI)),
        (Field::FaceAreaJ, FieldDescriptor::new(1, MeshLocation::FaceJ)),
    ]
}


/// Build the database for a run: either reload the patches of a checkpoint
/// into the configured shape, or lay down the mesh geometry and initial
/// atmosphere on radial blocks tiling [1, outer_radius] as a geometric
/// progression, with theta spanning [0, pi].
///
pub fn create_database(cfg: &RunConfig) -> Result<Database, Error> {
    let (ni, nj) = cfg.block_extent();
    let mut database = Database::new(ni, nj, create_header());

    if !cfg.restart.is_empty() {
        io::checkpoint::load_patches_from_chkpt(&mut database, Path::new(&cfg.restart))?;
    } else {
        let mut model = Atmosphere::new(cfg.noise);
        let prim_to_cons = ufunc::vfrom1(|p: [f64; 5]| {
            Primitive::from(p)
                .validate("prim_to_cons")
                .map(|p| p.to_conserved().as_array())
        });

        for b in 0..cfg.num_blocks {
            let r0 = cfg.outer_radius.powf(b as f64 / cfg.num_blocks as f64);
            let r1 = cfg.outer_radius.powf((b + 1) as f64 / cfg.num_blocks as f64);

            let x_verts = mesh::vertices(ni, nj, [r0, r1, 0.0, PI]);
            let x_cells = mesh::cell_centroids(&x_verts);
            let v_cells = mesh::cell_volumes(&x_verts);
            let a_faces_i = mesh::face_areas_i(&x_verts);
            let a_faces_j = mesh::face_areas_j(&x_verts);

            let mut primitive = Vec::with_capacity(ni * nj * 5);
            for i in 0..ni {
                for j in 0..nj {
                    let x = (x_cells[(i, j, 0)], x_cells[(i, j, 1)]);
                    primitive.extend_from_slice(&model.primitive_at(x).as_array());
                }
            }
            let primitive = Array::from_shape_vec((ni, nj, 5), primitive);
            let conserved = prim_to_cons(primitive.view())?;

            let block = (b as i64, 0, 0);
            database.insert((block, Field::VertCoords), x_verts);
            database.insert((block, Field::CellCoords), x_cells);
            database.insert((block, Field::CellVolume), v_cells);
            database.insert((block, Field::FaceAreaI), a_faces_i);
            database.insert((block, Field::FaceAreaJ), a_faces_j);
            database.insert((block, Field::Conserved), conserved);
        }
    }
    database.set_boundary_value(Box::new(boundary_value));
    Ok(database)
}


/// The output tasks of a run: periodic VTK frames and restart checkpoints,
/// resuming from the counts recorded in the status.
///
pub fn create_scheduler(cfg: &RunConfig, sts: &RunStatus) -> Scheduler {
    let mut scheduler = Scheduler::new();

    scheduler.repeat(
        "write vtk",
        cfg.vtki,
        sts.vtk_count,
        Box::new(|database, cfg, sts, count| {
            sts.vtk_count = count + 1;
            io::vtk::write_vtk(database, cfg, count)
        }),
    );
    scheduler.repeat(
        "write checkpoint",
        cfg.cpi,
        sts.chkpt_count,
        Box::new(|database, cfg, sts, count| {
            sts.chkpt_count = count + 1;
            io::checkpoint::write_chkpt(database, cfg, sts, count)
        }),
    );
    scheduler
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::*;
    use approx::assert_relative_eq;
    use crate::array::{span, ALL};

    fn base_config() -> RunConfig {
        RunConfig {
            num_blocks: 2,
            nr: 8,
            outer_radius: 10.0,
            tfinal: 1.0,
            cpi: 0.0,
            vtki: 0.0,
            rk: 2,
            noise: 0.0,
            heating_rate: 0.0,
            cooling_rate: 0.0,
            num_threads: 1,
            restart: String::new(),
            outdir: ".".into(),
        }
    }

    #[test]
    fn atmosphere_is_hydrostatic_without_noise() {
        let mut model = Atmosphere::new(0.0);
        let p = model.primitive_at((2.0, 1.0));

        // dp/dr = -rho / r^2 for this profile
        let h = 1e-6;
        let dp = (model.primitive_at((2.0 + h, 1.0)).gas_pressure()
            - model.primitive_at((2.0 - h, 1.0)).gas_pressure())
            / (2.0 * h);
        assert_relative_eq!(dp, -p.mass_density() / 4.0, max_relative = 1e-6);
    }

    #[test]
    fn database_blocks_tile_the_domain_geometrically() {
        let cfg = base_config();
        let database = create_database(&cfg).unwrap();
        let (ni, nj) = cfg.block_extent();

        assert_eq!(database.blocks(Field::Conserved).len(), 2);

        let v0 = database.at((0, 0, 0), Field::VertCoords);
        let v1 = database.at((1, 0, 0), Field::VertCoords);

        assert_eq!(v0.dim(), (ni + 1, nj + 1, 2));
        assert_relative_eq!(v0[(0, 0, 0)], 1.0, epsilon = 1e-12);
        assert_relative_eq!(v0[(ni, 0, 0)], 10.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(v1[(0, 0, 0)], 10.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(v1[(ni, 0, 0)], 10.0, epsilon = 1e-12);
    }

    #[test]
    fn reflecting_guards_flip_the_radial_momentum() {
        let cfg = RunConfig { num_blocks: 1, ..base_config() };
        let mut database = create_database(&cfg).unwrap();
        let (ni, nj) = cfg.block_extent();

        // Place a uniform radial momentum in the stored state
        let mut u = database.at((0, 0, 0), Field::Conserved).clone();
        u.select_mut(ALL, ALL, span(1, 2)).fill(0.25);
        database.commit(((0, 0, 0), Field::Conserved), u.clone(), 0.0);

        let fetched = database.fetch((0, 0, 0), 2, 0, 0, 0, Field::Conserved);

        assert_eq!(fetched.dim(), (ni + 2, nj, 5));
        for j in 0..nj {
            assert_eq!(fetched[(0, j, 1)], -0.25);
            assert_eq!(fetched[(1, j, 1)], -0.25);
            assert_eq!(fetched[(0, j, 0)], u[(1, j, 0)]);
            assert_eq!(fetched[(1, j, 0)], u[(0, j, 0)]);
        }
    }

    #[test]
    fn noise_draws_are_reproducible() {
        let mut a = Atmosphere::new(0.01);
        let mut b = Atmosphere::new(0.01);

        for _ in 0..32 {
            let pa = a.primitive_at((2.0, 1.0));
            let pb = b.primitive_at((2.0, 1.0));
            assert_eq!(pa.mass_density(), pb.mass_density());
        }
    }
}
