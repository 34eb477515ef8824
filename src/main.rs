use std::f64::consts::PI;
use std::path::Path;
use std::time::Instant;

use clap::Parser;
use log::{info, LevelFilter};
use simple_logger::SimpleLogger;

use corona2d::config::{RunConfig, RunStatus};
use corona2d::database::Field;
use corona2d::error::Error;
use corona2d::hydro::euler::SourceTerms;
use corona2d::setup;
use corona2d::solvers::euler2d_plm::update;
use corona2d::thread_pool::ThreadPool;

fn run() -> Result<(), Error> {
    let cfg = RunConfig::parse().with_restart()?.validate()?;
    let mut sts = if cfg.restart.is_empty() {
        RunStatus::from_config(&cfg)
    } else {
        RunStatus::from_chkpt(Path::new(&cfg.restart))?
    };

    let mut database = setup::create_database(&cfg)?;
    let mut scheduler = setup::create_scheduler(&cfg, &sts);
    let source_terms = SourceTerms::new(cfg.heating_rate, cfg.cooling_rate);
    let pool = ThreadPool::new(cfg.num_threads);

    // Signal speeds on this problem are of order unity, so the polar zone
    // crossing time sets the step
    let dt = 0.25 * PI / cfg.nr as f64;

    info!("{:?}", cfg);
    info!("start from t={:.4} iter={}", sts.time, sts.iter);
    info!(
        "{} blocks of {:?}, {} zones total",
        cfg.num_blocks,
        database.patch_dim(),
        database.num_cells(Field::Conserved)
    );
    for (name, interval, count) in scheduler.entries() {
        info!("task '{}': interval={} next count={}", name, interval, count);
    }

    while sts.time < cfg.tfinal {
        scheduler.dispatch(sts.time, &database, &cfg, &mut sts)?;

        let start = Instant::now();
        update(&pool, source_terms, &mut database, dt, cfg.rk)?;
        let seconds = start.elapsed().as_secs_f64();

        sts.time += dt;
        sts.iter += 1;
        sts.wall += seconds;

        let kzps = database.num_cells(Field::Conserved) as f64 / 1e3 / seconds;
        println!("[{:04}] t={:.3} kzps={:.2}", sts.iter, sts.time, kzps);
    }
    scheduler.dispatch(sts.time, &database, &cfg, &mut sts)?;

    println!();
    println!(
        "run completed: {} iterations, average kzps={:.2}",
        sts.iter,
        database.num_cells(Field::Conserved) as f64 / 1e3 / sts.wall * sts.iter as f64
    );
    Ok(())
}

fn main() {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    if let Err(error) = run() {
        eprintln!("\nERROR: {}\n", error);
        std::process::exit(1);
    }
}
