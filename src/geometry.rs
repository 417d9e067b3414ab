//! Lattice coordinates, axes and quarter-turn rotation math.
//!
//! Every sub-cube sits on one of the 27 lattice points in `{-1, 0, 1}^3`.
//! Turns are multiples of 90 degrees about a world axis, so rotated
//! coordinates are rounded back onto the lattice and never accumulate error.

use std::f32::consts::FRAC_PI_2;
use std::fmt;

use glam::{Mat3, Quat, Vec3};

/// One of the three world axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// All axes in `X, Y, Z` order.
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Unit vector pointing along the positive direction of this axis.
    pub fn unit(self) -> Vec3 {
        match self {
            Axis::X => Vec3::X,
            Axis::Y => Vec3::Y,
            Axis::Z => Vec3::Z,
        }
    }

    /// Reads this axis' component of a vector.
    pub fn get(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    /// Writes this axis' component of a vector.
    pub fn set(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Axis::X => write!(f, "X"),
            Axis::Y => write!(f, "Y"),
            Axis::Z => write!(f, "Z"),
        }
    }
}

/// A lattice position relative to the cube center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Reads the component along `axis`.
    pub fn get(self, axis: Axis) -> i32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }

    /// Writes the component along `axis`.
    pub fn set(&mut self, axis: Axis, value: i32) {
        match axis {
            Axis::X => self.x = value,
            Axis::Y => self.y = value,
            Axis::Z => self.z = value,
        }
    }

    /// Returns whether every component is in `{-1, 0, 1}`.
    pub fn is_lattice_point(self) -> bool {
        [self.x, self.y, self.z]
            .iter()
            .all(|c| (-1..=1).contains(c))
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.y as f32, self.z as f32)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// All 27 lattice points, x-major (matching `grid::coord_to_idx`).
pub fn lattice() -> impl Iterator<Item = Coord> {
    (-1..=1).flat_map(|x| (-1..=1).flat_map(move |y| (-1..=1).map(move |z| Coord::new(x, y, z))))
}

/// Rotates a lattice coordinate by `angle` radians about `axis`.
///
/// Each axis applies the 2D rotation matrix `[cos, -sin; sin, cos]` to its
/// orthogonal pair: `(y, z)` for X, `(x, z)` for Y and `(x, y)` for Z. The Y
/// axis uses the negated angle, which makes all three turns right-handed and
/// keeps the logical permutation in step with the rendered pivot rotation.
/// Results are rounded back to integers.
pub fn rotate_coord(coord: Coord, axis: Axis, angle: f32) -> Coord {
    let angle = match axis {
        Axis::Y => -angle,
        Axis::X | Axis::Z => angle,
    };
    let (sin, cos) = angle.sin_cos();
    let rotate = |a: i32, b: i32| {
        let (a, b) = (a as f32, b as f32);
        (
            (a * cos - b * sin).round() as i32,
            (a * sin + b * cos).round() as i32,
        )
    };

    let Coord { x, y, z } = coord;
    match axis {
        Axis::X => {
            let (y, z) = rotate(y, z);
            Coord::new(x, y, z)
        }
        Axis::Y => {
            let (x, z) = rotate(x, z);
            Coord::new(x, y, z)
        }
        Axis::Z => {
            let (x, y) = rotate(x, y);
            Coord::new(x, y, z)
        }
    }
}

/// Picks the axis with the largest absolute component of `point`.
///
/// X seeds the running maximum and a later axis only wins when it is
/// strictly greater, so ties go to the earlier axis.
pub fn dominant_axis(point: Vec3) -> Axis {
    let mut best = Axis::X;
    let mut best_magnitude = point.x.abs();
    for axis in [Axis::Y, Axis::Z] {
        let magnitude = axis.get(point).abs();
        if magnitude > best_magnitude {
            best = axis;
            best_magnitude = magnitude;
        }
    }
    best
}

/// Snaps an angle given in degrees to a multiple of 90 degrees.
///
/// Positive angles round up when the remainder past the last multiple is
/// strictly more than 45 degrees and down otherwise. Negative angles invert
/// the direction, so they round away from zero past 45 and towards zero
/// otherwise. Exactly +/-45 therefore snaps to zero.
pub fn snap_degrees(degrees: f64) -> f64 {
    let quarters = degrees / 90.0;
    let past_half = degrees.abs() % 90.0 > 45.0;
    let turns = if degrees > 0.0 {
        if past_half {
            quarters.ceil()
        } else {
            quarters.floor()
        }
    } else if past_half {
        quarters.floor()
    } else {
        quarters.ceil()
    };
    // avoid returning -0.0
    turns * 90.0 + 0.0
}

/// Snaps an angle in radians to the nearest multiple of 90 degrees using
/// [`snap_degrees`].
pub fn snap_to_nearest_90(radians: f32) -> f32 {
    snap_degrees(f64::from(radians).to_degrees()).to_radians() as f32
}

/// Number of quarter turns in an angle that is already a multiple of 90
/// degrees.
pub fn quarter_turns(radians: f32) -> i32 {
    (radians / FRAC_PI_2).round() as i32
}

/// An exact rotation from the cube's rotation group, stored as the images
/// of the three unit axes.
///
/// Composing quarter turns only ever permutes and negates these integer
/// columns, so an orientation cannot drift off a 90 degree alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Orientation {
    x: Coord,
    y: Coord,
    z: Coord,
}

impl Default for Orientation {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Orientation {
    pub const IDENTITY: Self = Self {
        x: Coord::new(1, 0, 0),
        y: Coord::new(0, 1, 0),
        z: Coord::new(0, 0, 1),
    };

    /// Applies a further rotation of `angle` radians about the world `axis`.
    ///
    /// `angle` is expected to be a multiple of 90 degrees.
    pub fn rotated(self, axis: Axis, angle: f32) -> Self {
        Self {
            x: rotate_coord(self.x, axis, angle),
            y: rotate_coord(self.y, axis, angle),
            z: rotate_coord(self.z, axis, angle),
        }
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Returns whether the columns form a proper rotation: unit axis
    /// vectors, mutually orthogonal, right-handed.
    pub fn is_valid(&self) -> bool {
        let [x, y, z] = self.columns();
        let unit = |v: Vec3| v.abs().element_sum() == 1.0;
        unit(x) && unit(y) && unit(z) && x.cross(y) == z
    }

    fn columns(&self) -> [Vec3; 3] {
        [self.x.as_vec3(), self.y.as_vec3(), self.z.as_vec3()]
    }

    pub fn to_quat(&self) -> Quat {
        let [x, y, z] = self.columns();
        Quat::from_mat3(&Mat3::from_cols(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUARTER: f32 = FRAC_PI_2;

    #[test]
    fn test_snap_rounding_around_45_degrees() {
        assert_eq!(snap_degrees(44.0), 0.0);
        assert_eq!(snap_degrees(46.0), 90.0);
        assert_eq!(snap_degrees(-44.0), 0.0);
        assert_eq!(snap_degrees(-46.0), -90.0);
    }

    #[test]
    fn test_snap_exactly_45_degrees_goes_to_zero() {
        assert_eq!(snap_degrees(45.0), 0.0);
        assert_eq!(snap_degrees(-45.0), 0.0);
        assert!(snap_degrees(-45.0).is_sign_positive(), "-45 should not snap to -0.0");
    }

    #[test]
    fn test_snap_multiple_turns() {
        assert_eq!(snap_degrees(200.0), 180.0);
        assert_eq!(snap_degrees(230.0), 270.0);
        assert_eq!(snap_degrees(-200.0), -180.0);
        assert_eq!(snap_degrees(-310.0), -270.0);
        assert_eq!(snap_degrees(0.0), 0.0);
    }

    #[test]
    fn test_snap_radians() {
        let snapped = snap_to_nearest_90(50f32.to_radians());
        assert!((snapped - QUARTER).abs() < 1e-6, "50 degrees should snap to 90, got {snapped}");
        let snapped = snap_to_nearest_90((-100f32).to_radians());
        assert!((snapped + QUARTER).abs() < 1e-6, "-100 degrees should snap to -90, got {snapped}");
        assert_eq!(quarter_turns(snap_to_nearest_90(3.0)), 2);
    }

    #[test]
    fn test_dominant_axis() {
        assert_eq!(dominant_axis(Vec3::new(0.8, -0.1, 0.05)), Axis::X);
        assert_eq!(dominant_axis(Vec3::new(0.1, -0.9, 0.05)), Axis::Y);
        assert_eq!(dominant_axis(Vec3::new(0.1, 0.2, -0.3)), Axis::Z);
        // ties go to the earlier axis
        assert_eq!(dominant_axis(Vec3::new(0.5, -0.5, 0.5)), Axis::X);
        assert_eq!(dominant_axis(Vec3::new(0.1, 0.5, -0.5)), Axis::Y);
    }

    #[test]
    fn test_rotations_are_right_handed() {
        // a quarter turn about each axis maps the next axis onto the one after it
        assert_eq!(rotate_coord(Coord::new(0, 1, 0), Axis::X, QUARTER), Coord::new(0, 0, 1));
        assert_eq!(rotate_coord(Coord::new(0, 0, 1), Axis::Y, QUARTER), Coord::new(1, 0, 0));
        assert_eq!(rotate_coord(Coord::new(1, 0, 0), Axis::Z, QUARTER), Coord::new(0, 1, 0));
    }

    #[test]
    fn test_rotations_match_quaternions() {
        for axis in Axis::ALL {
            let q = Quat::from_axis_angle(axis.unit(), QUARTER);
            for coord in lattice() {
                let expected = (q * coord.as_vec3()).round();
                let rotated = rotate_coord(coord, axis, QUARTER).as_vec3();
                assert_eq!(rotated, expected, "Quarter turn about {axis} disagrees for {coord}");
            }
        }
    }

    #[test]
    fn test_rotations_are_lattice_permutations() {
        for axis in Axis::ALL {
            for turns in -3..=3 {
                let angle = turns as f32 * QUARTER;
                let mut images: Vec<Coord> =
                    lattice().map(|c| rotate_coord(c, axis, angle)).collect();
                assert!(images.iter().all(|c| c.is_lattice_point()));
                images.sort();
                images.dedup();
                assert_eq!(images.len(), 27, "{turns} turns about {axis} is not a permutation");
            }
        }
    }

    #[test]
    fn test_rotation_preserves_axis_component() {
        for axis in Axis::ALL {
            for coord in lattice() {
                let rotated = rotate_coord(coord, axis, -QUARTER);
                assert_eq!(rotated.get(axis), coord.get(axis));
            }
        }
    }

    #[test]
    fn test_orientation_four_turns_is_identity() {
        for axis in Axis::ALL {
            let mut orientation = Orientation::IDENTITY;
            for _ in 0..4 {
                orientation = orientation.rotated(axis, QUARTER);
                assert!(orientation.is_valid());
            }
            assert!(orientation.is_identity(), "four turns about {axis} should be identity");
        }
    }

    #[test]
    fn test_orientation_composition_stays_valid() {
        let mut orientation = Orientation::IDENTITY;
        let turns = [
            (Axis::X, QUARTER),
            (Axis::Y, -QUARTER),
            (Axis::Z, 2.0 * QUARTER),
            (Axis::Y, 3.0 * QUARTER),
        ];
        for (axis, angle) in turns {
            orientation = orientation.rotated(axis, angle);
            assert!(orientation.is_valid(), "{orientation:?} is not a rotation");
        }
        for (axis, angle) in turns.iter().rev() {
            orientation = orientation.rotated(*axis, -angle);
        }
        assert!(orientation.is_identity());
    }

    #[test]
    fn test_orientation_quaternion() {
        let orientation = Orientation::IDENTITY.rotated(Axis::Y, QUARTER);
        let q = orientation.to_quat();
        let expected = Quat::from_rotation_y(QUARTER);
        assert!(
            q.abs_diff_eq(expected, 1e-5) || q.abs_diff_eq(-expected, 1e-5),
            "{q:?} != {expected:?}"
        );
    }
}
