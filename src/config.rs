use std::fs::File;
use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::error::Error;




/**
 * The run configuration: problem definition, resolution, output cadence,
 * and execution parameters. The whole struct round-trips through JSON so a
 * checkpoint can reproduce the run that wrote it.
 */
#[derive(Clone, Debug, Parser, Serialize, Deserialize)]
#[command(name = "corona2d", version, about = "Spherical atmosphere with heating and cooling")]
pub struct RunConfig {

    /// Number of radial mesh blocks
    #[arg(long, default_value_t = 4)]
    pub num_blocks: usize,

    /// Polar resolution; also scales the radial resolution per decade
    #[arg(long, default_value_t = 32)]
    pub nr: usize,

    /// Outer domain radius (the inner radius is 1)
    #[arg(long, default_value_t = 10.0)]
    pub outer_radius: f64,

    /// Simulation time to stop at
    #[arg(long, default_value_t = 1.0)]
    pub tfinal: f64,

    /// Checkpoint interval in simulation time (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub cpi: f64,

    /// VTK output interval in simulation time (0 disables)
    #[arg(long, default_value_t = 0.0)]
    pub vtki: f64,

    /// Runge-Kutta order of the time integration
    #[arg(long, default_value_t = 2)]
    pub rk: i64,

    /// Amplitude of random density perturbations in the initial data
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Central heating rate
    #[arg(long, default_value_t = 0.0)]
    pub heating_rate: f64,

    /// Bremsstrahlung cooling coefficient
    #[arg(long, default_value_t = 0.0)]
    pub cooling_rate: f64,

    /// Number of worker threads
    #[arg(long, default_value_t = 1)]
    pub num_threads: usize,

    /// Checkpoint directory to restart from
    #[arg(long, default_value = "")]
    pub restart: String,

    /// Directory for output files
    #[arg(long, default_value = ".")]
    pub outdir: String,
}




// ============================================================================
impl RunConfig {

    /// If a restart was requested, adopt the configuration stored in the
    /// checkpoint, keeping the runtime-only parameters given on the command
    /// line.
    ///
    pub fn with_restart(self) -> Result<Self, Error> {
        if self.restart.is_empty() {
            return Ok(self);
        }
        let filename = Path::new(&self.restart).join("config.json");
        let file = File::open(&filename).map_err(|_| {
            Error::Config(format!("restart file not found: {}", filename.display()))
        })?;
        let stored: RunConfig = serde_json::from_reader(file)?;

        Ok(RunConfig {
            restart: self.restart,
            outdir: self.outdir,
            tfinal: self.tfinal,
            num_threads: self.num_threads,
            ..stored
        })
    }

    pub fn validate(self) -> Result<Self, Error> {
        if self.nr < 4 {
            return Err(Error::Config("nr must be >= 4".into()));
        }
        if self.rk != 1 && self.rk != 2 {
            return Err(Error::InvalidRungeKutta(self.rk));
        }
        if self.outer_radius < 2.0 {
            return Err(Error::Config("outer_radius must be >= 2".into()));
        }
        if self.num_blocks < 1 {
            return Err(Error::Config("num_blocks must be >= 1".into()));
        }
        if self.num_threads < 1 {
            return Err(Error::Config("num_threads must be >= 1".into()));
        }
        if self.noise < 0.0 {
            return Err(Error::Config("noise must be non-negative".into()));
        }
        Ok(self)
    }

    /// Cell counts (ni, nj) of every patch: the radial extent divides the
    /// target count of `nr` zones per decade among the blocks.
    ///
    pub fn block_extent(&self) -> (usize, usize) {
        let target = self.nr as f64 * self.outer_radius.log10();
        let ni = (target / self.num_blocks as f64) as usize;
        (ni, self.nr)
    }

    pub fn make_filename_chkpt(&self, count: i64) -> PathBuf {
        Path::new(&self.outdir).join(format!("chkpt.{:04}", count))
    }

    pub fn make_filename_vtk(&self, count: i64) -> PathBuf {
        Path::new(&self.outdir).join(format!("{:04}.vtk", count))
    }
}




/**
 * Progress counters for a run, advanced by the main loop and the output
 * tasks, and stored in every checkpoint.
 */
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunStatus {
    pub time: f64,
    pub iter: i64,
    pub wall: f64,
    pub vtk_count: i64,
    pub chkpt_count: i64,
}




// ============================================================================
impl RunStatus {

    pub fn from_config(_: &RunConfig) -> Self {
        Self {
            time: 0.0,
            iter: 0,
            wall: 0.0,
            vtk_count: 0,
            chkpt_count: 0,
        }
    }

    pub fn from_chkpt(directory: &Path) -> Result<Self, Error> {
        let file = File::open(directory.join("status.json"))?;
        Ok(serde_json::from_reader(file)?)
    }
}




// ============================================================================
#[cfg(test)]
mod test {
    use super::*;

    fn base() -> RunConfig {
        RunConfig {
            num_blocks: 4,
            nr: 32,
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
    fn valid_config_passes_validation() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn bad_rk_is_rejected() {
        assert!(RunConfig { rk: 3, ..base() }.validate().is_err());
    }

    #[test]
    fn coarse_polar_resolution_is_rejected() {
        assert!(RunConfig { nr: 3, ..base() }.validate().is_err());
    }

    #[test]
    fn block_extent_divides_a_decade_per_log() {
        let cfg = RunConfig { num_blocks: 2, nr: 16, ..base() };

        // 16 zones over one decade of radius, split across 2 blocks
        assert_eq!(cfg.block_extent(), (8, 16));
    }

    #[test]
    fn config_round_trips_through_json() {
        let cfg = base();
        let text = serde_json::to_string(&cfg).unwrap();
        let back: RunConfig = serde_json::from_str(&text).unwrap();

        assert_eq!(back.num_blocks, cfg.num_blocks);
        assert_eq!(back.outer_radius, cfg.outer_radius);
        assert_eq!(back.outdir, cfg.outdir);
    }
}
