//! A single sub-cube of the puzzle.

use glam::Vec3;

use crate::geometry::{Coord, Orientation};

/// Index of a block within the grid, assigned from its initial coordinate.
pub type BlockId = usize;

/// Logical and visual state of one sub-cube.
///
/// The logical coordinate and orientation are only changed by a committed
/// turn or a reset. `position` is the visual offset, relative to the grid
/// while attached and relative to the pivot while a turn is in progress.
#[derive(Debug, Clone)]
pub struct Block {
    id: BlockId,
    initial_coordinate: Coord,
    pub(crate) coordinate: Coord,
    pub(crate) orientation: Orientation,
    pub(crate) position: Vec3,
    highlighted: bool,
}

impl Block {
    pub fn new(id: BlockId, initial_coordinate: Coord) -> Self {
        debug_assert!(initial_coordinate.is_lattice_point());
        Self {
            id,
            initial_coordinate,
            coordinate: initial_coordinate,
            orientation: Orientation::IDENTITY,
            position: Vec3::ZERO,
            highlighted: false,
        }
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    /// The solved reference position.
    pub fn initial_coordinate(&self) -> Coord {
        self.initial_coordinate
    }

    pub fn coordinate(&self) -> Coord {
        self.coordinate
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }

    pub fn set_highlighted(&mut self, highlighted: bool) {
        self.highlighted = highlighted;
    }

    /// Returns whether the block is back at its initial coordinate.
    ///
    /// Orientation is not considered.
    pub fn in_right_place(&self) -> bool {
        self.coordinate == self.initial_coordinate
    }

    /// Restores the initial coordinate and the identity orientation.
    pub fn reset(&mut self) {
        self.coordinate = self.initial_coordinate;
        self.orientation = Orientation::IDENTITY;
    }
}
