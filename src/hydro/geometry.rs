/**
 * Enum to hold a unit vector along one of the spherical-polar coordinate
 * axes: radial (r), polar (theta), or azimuthal (phi).
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Radial,
    Polar,
    Azimuthal,
}




// ============================================================================
impl Direction {

    /// The projection of this unit vector onto another coordinate axis.
    ///
    pub fn along(self, other: Direction) -> f64 {
        if self == other {
            1.0
        } else {
            0.0
        }
    }
}
