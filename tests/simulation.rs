use std::f64::consts::PI;

use approx::assert_relative_eq;

use corona2d::array::Array;
use corona2d::config::RunConfig;
use corona2d::database::{Database, Field};
use corona2d::hydro::euler::{Primitive, SourceTerms};
use corona2d::io::checkpoint;
use corona2d::setup;
use corona2d::solvers::euler2d_plm::update;
use corona2d::thread_pool::ThreadPool;

fn config(num_blocks: usize, nr: usize) -> RunConfig {
    RunConfig {
        num_blocks,
        nr,
        outer_radius: 10.0,
        tfinal: 0.1,
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

fn time_step(cfg: &RunConfig) -> f64 {
    0.25 * PI / cfg.nr as f64
}

fn run_steps(cfg: &RunConfig, database: &mut Database, count: usize) {
    let pool = ThreadPool::new(cfg.num_threads);
    let source_terms = SourceTerms::new(cfg.heating_rate, cfg.cooling_rate);
    let dt = time_step(cfg);

    for _ in 0..count {
        update(&pool, source_terms, database, dt, cfg.rk).unwrap();
    }
}

fn conserved_patches(database: &Database) -> Vec<Array> {
    database
        .all(Field::Conserved)
        .map(|(_, array)| array.clone())
        .collect()
}




/// Run the noise-free atmosphere on a single block to tfinal and measure
/// how far it moved: the largest |v_r| anywhere, and the largest |v_r| and
/// relative density drift over the cells with centroid radius >= `r_split`.
///
fn settle_atmosphere(nr: usize, r_split: f64) -> (f64, f64, f64) {
    let cfg = config(1, nr);
    let mut database = setup::create_database(&cfg).unwrap();
    let initial = conserved_patches(&database);

    let dt = time_step(&cfg);
    let steps = (cfg.tfinal / dt).ceil() as usize;
    run_steps(&cfg, &mut database, steps);

    let coords = database.at((0, 0, 0), Field::CellCoords);
    let after = database.at((0, 0, 0), Field::Conserved);
    let before = &initial[0];
    let (ni, nj, _) = after.dim();

    let mut vr_global: f64 = 0.0;
    let mut vr_bulk: f64 = 0.0;
    let mut drift_bulk: f64 = 0.0;

    for i in 0..ni {
        for j in 0..nj {
            let d = after[(i, j, 0)];
            let vr = (after[(i, j, 1)] / d).abs();
            let drift = (d - before[(i, j, 0)]).abs() / before[(i, j, 0)];

            vr_global = vr_global.max(vr);
            if coords[(i, j, 0)] >= r_split {
                vr_bulk = vr_bulk.max(vr);
                drift_bulk = drift_bulk.max(drift);
            }
        }
    }
    (vr_global, vr_bulk, drift_bulk)
}




// ============================================================================
#[test]
fn hydrostatic_atmosphere_stays_at_rest() {
    // The mirrored inner wall is not an exact discrete equilibrium, so the
    // cells within an acoustic crossing of it carry a settling transient
    // (see inner_wall_transient_is_confined_and_converges, which pins that
    // transient down across resolutions); the atmosphere beyond it has to
    // hold the rest-state tolerances outright
    let (vr_global, vr_bulk, drift_bulk) = settle_atmosphere(16, 1.5);

    assert!(vr_global < 1e-1, "wall transient too large: {}", vr_global);
    assert!(vr_bulk < 1e-2, "bulk radial velocity {}", vr_bulk);
    assert!(drift_bulk < 1e-2, "bulk density drift {}", drift_bulk);
}


#[test]
fn inner_wall_transient_is_confined_and_converges() {
    // The settling transient has to stay an artifact of the wall zone: the
    // region beyond r = 1.5 meets the rest-state tolerances at every
    // resolution, and refining the mesh shrinks the peak velocity, which a
    // genuine instability of the interior scheme would not do
    let (coarse_global, coarse_vr, coarse_drift) = settle_atmosphere(16, 1.5);
    let (fine_global, fine_vr, fine_drift) = settle_atmosphere(48, 1.5);

    assert!(coarse_vr < 1e-2 && coarse_drift < 1e-2);
    assert!(fine_vr < 1e-2 && fine_drift < 1e-2);

    assert!(
        fine_global < 0.5 * coarse_global,
        "wall transient does not converge: {} at nr=16, {} at nr=48",
        coarse_global,
        fine_global
    );
}


#[test]
fn mass_changes_only_through_the_outer_boundary() {
    let cfg = RunConfig { rk: 1, ..config(1, 8) };
    let mut database = setup::create_database(&cfg).unwrap();
    let (ni, nj) = database.patch_dim();
    let block = (0, 0, 0);

    // Replace the static atmosphere with one sliding radially outward
    let coords = database.at(block, Field::CellCoords).clone();
    let mut outflow = Vec::with_capacity(ni * nj * 5);
    for i in 0..ni {
        for j in 0..nj {
            let r = coords[(i, j, 0)];
            let p = Primitive::new(r.powf(-1.5), 0.2, 0.0, 0.0, 0.4 * r.powf(-2.5));
            outflow.extend_from_slice(&p.to_conserved().as_array());
        }
    }
    database.commit(
        (block, Field::Conserved),
        Array::from_shape_vec((ni, nj, 5), outflow),
        0.0,
    );

    let mass = |database: &Database| -> f64 {
        let u = database.at(block, Field::Conserved);
        let v = database.at(block, Field::CellVolume);
        let mut total = 0.0;
        for i in 0..ni {
            for j in 0..nj {
                total += u[(i, j, 0)] * v[(i, j, 0)];
            }
        }
        total
    };

    // The expected loss is the outer-face mass flux: with a zero-gradient
    // outer edge the face state equals the last interior cell, and the
    // reflecting inner edge passes no mass
    let u = database.at(block, Field::Conserved).clone();
    let areas = database.at(block, Field::FaceAreaI).clone();
    let mut flux_out = 0.0;
    for j in 0..nj {
        let d = u[(ni - 1, j, 0)];
        let vr = u[(ni - 1, j, 1)] / d;
        flux_out += d * vr * areas[(ni, j, 0)];
    }

    let before = mass(&database);
    run_steps(&cfg, &mut database, 1);
    let after = mass(&database);

    let expected = before - time_step(&cfg) * flux_out;
    assert!(
        (after - expected).abs() < 1e-10 * before,
        "mass {} -> {}, expected {}",
        before,
        after,
        expected
    );
}


#[test]
fn checkpoints_continue_a_run_exactly() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = RunConfig {
        heating_rate: 0.1,
        cooling_rate: 0.05,
        outdir: tmp.path().to_str().unwrap().into(),
        ..config(2, 8)
    };

    // The contiguous run: 20 steps with a checkpoint taken half way
    let mut contiguous = setup::create_database(&cfg).unwrap();
    run_steps(&cfg, &mut contiguous, 10);

    let sts = corona2d::config::RunStatus {
        time: 10.0 * time_step(&cfg),
        iter: 10,
        wall: 0.0,
        vtk_count: 0,
        chkpt_count: 1,
    };
    checkpoint::write_chkpt(&contiguous, &cfg, &sts, 0).unwrap();
    run_steps(&cfg, &mut contiguous, 10);

    // The restarted run: load the checkpoint and take the same 10 steps
    let restart_cfg = RunConfig {
        restart: cfg.make_filename_chkpt(0).to_str().unwrap().into(),
        ..cfg.clone()
    };
    let mut restarted = setup::create_database(&restart_cfg).unwrap();
    run_steps(&restart_cfg, &mut restarted, 10);

    for (a, b) in conserved_patches(&contiguous)
        .iter()
        .zip(conserved_patches(&restarted).iter())
    {
        for (x, y) in a.as_slice().iter().zip(b.as_slice().iter()) {
            assert_relative_eq!(*x, *y, epsilon = 1e-12);
        }
    }
}


#[test]
fn results_do_not_depend_on_the_thread_count() {
    let base = RunConfig { noise: 0.01, ..config(2, 8) };

    let mut serial = setup::create_database(&base).unwrap();
    run_steps(&base, &mut serial, 5);

    let threaded_cfg = RunConfig { num_threads: 4, ..base };
    let mut threaded = setup::create_database(&threaded_cfg).unwrap();
    run_steps(&threaded_cfg, &mut threaded, 5);

    // Updates are pure functions of their inputs and commits land in
    // enqueue order, so the states agree bit for bit
    assert_eq!(conserved_patches(&serial), conserved_patches(&threaded));
}
