use crate::hydro;




/**
 * Any failure that aborts a run: invalid hydrodynamic states surfacing from
 * the solver, bad configuration, or I/O trouble while writing output or
 * reading a checkpoint. The driver prints the message to standard error and
 * exits with status 1.
 */
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Hydro(#[from] hydro::error::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("checkpoint: {0}")]
    Checkpoint(String),

    #[error("{0}")]
    Config(String),

    #[error("rk must be 1 or 2 (got {0})")]
    InvalidRungeKutta(i64),
}
