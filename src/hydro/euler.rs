use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, Div, Mul, Sub};

use super::error::Error;
use super::geometry::Direction;

pub const GAMMA_LAW_INDEX: f64 = 5.0 / 3.0;




// ============================================================================
#[derive(Clone, Copy, Debug)]
pub struct Conserved(f64, f64, f64, f64, f64);

#[derive(Clone, Copy, Debug)]
pub struct Primitive(f64, f64, f64, f64, f64);




// ============================================================================
impl Conserved {

    pub fn new(d: f64, sr: f64, sq: f64, sp: f64, e: f64) -> Self {
        Self(d, sr, sq, sp, e)
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn momentum_r(&self) -> f64 {
        self.1
    }

    pub fn momentum_q(&self) -> f64 {
        self.2
    }

    pub fn momentum_p(&self) -> f64 {
        self.3
    }

    pub fn energy_density(&self) -> f64 {
        self.4
    }

    pub fn momentum_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2 + self.3 * self.3
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.0, self.1, self.2, self.3, self.4]
    }

    /// Confirm this state describes non-negative mass and energy densities.
    ///
    pub fn validate(self, caller: &'static str) -> Result<Self, Error> {
        if self.mass_density() < 0.0 {
            Err(Error::NegativeConservedDensity {
                caller,
                value: self.mass_density(),
            })
        } else if self.energy_density() < 0.0 {
            Err(Error::NegativeTotalEnergy {
                caller,
                value: self.energy_density(),
            })
        } else {
            Ok(self)
        }
    }

    /// Recover the primitive state. Fails if the conserved data is invalid
    /// or if the recovered pressure comes out negative.
    ///
    pub fn to_primitive(self) -> Result<Primitive, Error> {
        let u = self.validate("cons_to_prim")?;
        let gm1 = GAMMA_LAW_INDEX - 1.0;
        let ek = 0.5 * u.momentum_squared() / u.mass_density();
        let pg = (u.energy_density() - ek) * gm1;

        Primitive(
            u.mass_density(),
            u.momentum_r() / u.mass_density(),
            u.momentum_q() / u.mass_density(),
            u.momentum_p() / u.mass_density(),
            pg,
        )
        .validate("cons_to_prim")
    }
}




// ============================================================================
impl Primitive {

    pub fn new(rho: f64, vr: f64, vq: f64, vp: f64, pre: f64) -> Self {
        Self(rho, vr, vq, vp, pre)
    }

    pub fn mass_density(&self) -> f64 {
        self.0
    }

    pub fn velocity_r(&self) -> f64 {
        self.1
    }

    pub fn velocity_q(&self) -> f64 {
        self.2
    }

    pub fn velocity_p(&self) -> f64 {
        self.3
    }

    pub fn gas_pressure(&self) -> f64 {
        self.4
    }

    pub fn velocity(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Radial => self.velocity_r(),
            Direction::Polar => self.velocity_q(),
            Direction::Azimuthal => self.velocity_p(),
        }
    }

    pub fn velocity_squared(&self) -> f64 {
        self.1 * self.1 + self.2 * self.2 + self.3 * self.3
    }

    /// The adiabatic sound speed. A negative pressure is treated as zero
    /// here so the signal speeds of a marginal state stay finite.
    ///
    pub fn sound_speed(&self) -> f64 {
        (GAMMA_LAW_INDEX * self.gas_pressure().max(0.0) / self.mass_density()).sqrt()
    }

    pub fn temperature(&self) -> f64 {
        self.gas_pressure() / self.mass_density() / (GAMMA_LAW_INDEX - 1.0)
    }

    pub fn as_array(&self) -> [f64; 5] {
        [self.0, self.1, self.2, self.3, self.4]
    }

    /// Confirm this state describes non-negative density and pressure.
    ///
    pub fn validate(self, caller: &'static str) -> Result<Self, Error> {
        if self.mass_density() < 0.0 {
            Err(Error::NegativeMassDensity {
                caller,
                value: self.mass_density(),
            })
        } else if self.gas_pressure() < 0.0 {
            Err(Error::NegativeGasPressure {
                caller,
                value: self.gas_pressure(),
            })
        } else {
            Ok(self)
        }
    }

    pub fn to_conserved(&self) -> Conserved {
        let d = self.mass_density();
        let p = self.gas_pressure();
        let vv = self.velocity_squared();

        Conserved(
            d,
            d * self.velocity_r(),
            d * self.velocity_q(),
            d * self.velocity_p(),
            d * vv * 0.5 + p / (GAMMA_LAW_INDEX - 1.0),
        )
    }

    pub fn flux_vector(&self, direction: Direction) -> Conserved {
        let pg = self.gas_pressure();
        let vn = self.velocity(direction);
        let u = self.to_conserved();

        Conserved(
            u.0 * vn,
            u.1 * vn + pg * direction.along(Direction::Radial),
            u.2 * vn + pg * direction.along(Direction::Polar),
            u.3 * vn + pg * direction.along(Direction::Azimuthal),
            u.4 * vn + pg * vn,
        )
    }

    pub fn eigenvalues(&self, direction: Direction) -> [f64; 5] {
        let cs = self.sound_speed();
        let vn = self.velocity(direction);
        [vn - cs, vn, vn, vn, vn + cs]
    }

    pub fn outer_wavespeeds(&self, direction: Direction) -> (f64, f64) {
        let cs = self.sound_speed();
        let vn = self.velocity(direction);
        (vn - cs, vn + cs)
    }

    /// This state as seen from the far side of a mirror normal to the given
    /// axis.
    ///
    pub fn reflect(&self, direction: Direction) -> Primitive {
        match direction {
            Direction::Radial => Primitive(self.0, -self.1, self.2, self.3, self.4),
            Direction::Polar => Primitive(self.0, self.1, -self.2, self.3, self.4),
            Direction::Azimuthal => Primitive(self.0, self.1, self.2, -self.3, self.4),
        }
    }
}




// ============================================================================
impl From<[f64; 5]> for Conserved {
    fn from(u: [f64; 5]) -> Self {
        Self(u[0], u[1], u[2], u[3], u[4])
    }
}

impl From<[f64; 5]> for Primitive {
    fn from(p: [f64; 5]) -> Self {
        Self(p[0], p[1], p[2], p[3], p[4])
    }
}

impl Add for Conserved {
    type Output = Self;
    fn add(self, u: Self) -> Self {
        Self(self.0 + u.0, self.1 + u.1, self.2 + u.2, self.3 + u.3, self.4 + u.4)
    }
}

impl Sub for Conserved {
    type Output = Self;
    fn sub(self, u: Self) -> Self {
        Self(self.0 - u.0, self.1 - u.1, self.2 - u.2, self.3 - u.3, self.4 - u.4)
    }
}

impl Mul<f64> for Conserved {
    type Output = Self;
    fn mul(self, a: f64) -> Self {
        Self(self.0 * a, self.1 * a, self.2 * a, self.3 * a, self.4 * a)
    }
}

impl Div<f64> for Conserved {
    type Output = Self;
    fn div(self, a: f64) -> Self {
        Self(self.0 / a, self.1 / a, self.2 / a, self.3 / a, self.4 / a)
    }
}




/**
 * HLLE approximate Riemann solver: the single-state flux bounded by the
 * extreme left- and right-going signal speeds of the two input states.
 */
pub fn riemann_hlle(pl: Primitive, pr: Primitive, direction: Direction) -> Result<Conserved, Error> {
    let pl = pl.validate("riemann_hlle")?;
    let pr = pr.validate("riemann_hlle")?;

    let ul = pl.to_conserved();
    let ur = pr.to_conserved();
    let fl = pl.flux_vector(direction);
    let fr = pr.flux_vector(direction);

    let (alm, alp) = pl.outer_wavespeeds(direction);
    let (arm, arp) = pr.outer_wavespeeds(direction);
    let ap = alp.max(arp).max(0.0);
    let am = alm.min(arm).min(0.0);

    Ok((fl * ap - fr * am - (ul - ur) * ap * am) / (ap - am))
}




/**
 * Non-divergence contributions to the conserved update: the geometric terms
 * of spherical-polar coordinates, gravity of a unit point mass at the
 * origin, thermal heating concentrated near the center, and optically thin
 * Bremsstrahlung cooling.
 */
#[derive(Clone, Copy, Debug)]
pub struct SourceTerms {
    pub heating_rate: f64,
    pub cooling_rate: f64,
}




// ============================================================================
impl SourceTerms {

    pub fn new(heating_rate: f64, cooling_rate: f64) -> Self {
        Self {
            heating_rate,
            cooling_rate,
        }
    }

    pub fn evaluate(&self, p: Primitive, position: (f64, f64)) -> Result<Conserved, Error> {
        let p = p.validate("source_terms")?;
        let (r, q) = position;
        let dg = p.mass_density();
        let vr = p.velocity_r();
        let vq = p.velocity_q();
        let vp = p.velocity_p();
        let pg = p.gas_pressure();
        let tg = p.temperature();

        // Geometric sources of spherical-polar coordinates
        let mut sr = (2.0 * pg + dg * (vq * vq + vp * vp)) / r;
        let sq = (pg * cot(q) + dg * (vp * vp * cot(q) - vr * vq)) / r;
        let sp = -dg * vp * (vr + vq * cot(q)) / r;
        let mut se = 0.0;

        // Point mass gravity, GM = 1
        let g = 1.0 / r / r;
        sr -= dg * g;
        se -= dg * g * vr;

        // Thermal heating and Bremsstrahlung cooling
        se += self.heating_rate * (-r * r).exp();
        se -= self.cooling_rate * tg.sqrt() * dg * dg;

        Ok(Conserved(0.0, sr, sq, sp, se))
    }
}

fn cot(x: f64) -> f64 {
    (FRAC_PI_2 - x).tan()
}
