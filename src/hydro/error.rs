/**
 * Error to represent invalid hydrodynamics data or primitive variable
 * recovery. Each variant names the kernel that detected the bad state.
 */
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    #[error("{caller}: negative mass density: {value}")]
    NegativeMassDensity { caller: &'static str, value: f64 },

    #[error("{caller}: negative gas pressure: {value}")]
    NegativeGasPressure { caller: &'static str, value: f64 },

    #[error("{caller}: negative conserved density: {value}")]
    NegativeConservedDensity { caller: &'static str, value: f64 },

    #[error("{caller}: negative total energy: {value}")]
    NegativeTotalEnergy { caller: &'static str, value: f64 },
}
