//! The 3x3x3 arrangement of blocks.
//!
//! Blocks are stored in a flat array indexed by their initial coordinate
//! (x-major, see [`coord_to_idx`]), so a block's id never changes while its
//! logical coordinate moves around the lattice.
//!
//! The grid also owns the pivot: the temporary transform that the blocks of
//! a grabbed layer hang from while the layer is being turned.

use glam::{EulerRot, Quat, Vec3};
use rustc_hash::FxHashSet;

use crate::animator::{AnimationHandle, Animator, Sample, Tween};
use crate::block::{Block, BlockId};
use crate::config::CubeConfig;
use crate::geometry::{dominant_axis, lattice, rotate_coord, Axis, Coord};

/// Number of blocks in the cube.
pub const BLOCK_COUNT: usize = 27;

/// Blocks in a single layer.
pub const LAYER_SIZE: usize = 9;

/// Converts a lattice coordinate to a linear index.
///
/// Index order is x-major: `idx = (x + 1) * 9 + (y + 1) * 3 + (z + 1)`.
#[inline(always)]
pub const fn coord_to_idx(coord: Coord) -> usize {
    ((coord.x + 1) * 9 + (coord.y + 1) * 3 + (coord.z + 1)) as usize
}

/// Converts a linear index to a lattice coordinate.
#[inline(always)]
pub const fn idx_to_coord(idx: usize) -> Coord {
    Coord::new(
        (idx / 9) as i32 - 1,
        ((idx / 3) % 3) as i32 - 1,
        (idx % 3) as i32 - 1,
    )
}

/// Something the animator can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimTarget {
    BlockPosition(BlockId),
    PivotPosition,
    /// Euler angles (XYZ order) of the pivot.
    PivotRotation,
}

/// The 9 blocks a turn acts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerSelection {
    pub axis: Axis,
    /// Shared coordinate of the layer along `axis`.
    pub layer: i32,
    pub blocks: Vec<BlockId>,
}

/// Temporary parent transform for the blocks of a layer being turned.
#[derive(Debug, Clone, Default)]
pub struct Pivot {
    axis: Option<Axis>,
    position: Vec3,
    rotation: Vec3,
    members: Vec<BlockId>,
}

impl Pivot {
    pub fn axis(&self) -> Option<Axis> {
        self.axis
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Euler angles in XYZ order.
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    pub fn members(&self) -> &[BlockId] {
        &self.members
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub(crate) fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn quat(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

/// Where a block should be drawn, in cube-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockPose {
    pub id: BlockId,
    pub initial_coordinate: Coord,
    pub translation: Vec3,
    pub rotation: Quat,
    pub highlighted: bool,
}

/// Owns the 27 blocks and converts their logical state to visual offsets.
#[derive(Debug, Clone)]
pub struct CubeGrid {
    blocks: Vec<Block>,
    block_size: f32,
    spacing: f32,
    pivot: Pivot,
}

impl CubeGrid {
    /// Creates a solved grid. Blocks start at the origin until positioned.
    pub fn new(config: &CubeConfig) -> Self {
        let blocks = lattice()
            .enumerate()
            .map(|(id, coord)| Block::new(id, coord))
            .collect();
        Self {
            blocks,
            block_size: config.block_size,
            spacing: config.spacing(),
            pivot: Pivot::default(),
        }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, id: BlockId) -> &Block {
        &self.blocks[id]
    }

    pub fn block_size(&self) -> f32 {
        self.block_size
    }

    pub fn pivot(&self) -> &Pivot {
        &self.pivot
    }

    pub(crate) fn pivot_mut(&mut self) -> &mut Pivot {
        &mut self.pivot
    }

    /// Visual offset of a lattice point from the cube center.
    pub fn target_position(&self, coord: Coord) -> Vec3 {
        coord.as_vec3() * self.spacing
    }

    /// Resting offset of a layer along its axis.
    pub fn layer_offset(&self, axis: Axis, layer: i32) -> Vec3 {
        axis.unit() * (layer as f32 * self.spacing)
    }

    /// Ids of the blocks whose current coordinate along `axis` is `layer`.
    pub fn layer_blocks(&self, axis: Axis, layer: i32) -> Vec<BlockId> {
        self.blocks
            .iter()
            .filter(|block| block.coordinate().get(axis) == layer)
            .map(Block::id)
            .collect()
    }

    /// Selects the outer layer along `axis` on the side `hit_point` points to.
    ///
    /// A positive component picks the layer with the largest coordinate on
    /// `axis`, anything else picks the smallest.
    pub fn layer_for(&self, axis: Axis, hit_point: Vec3) -> LayerSelection {
        let values = self.blocks.iter().map(|block| block.coordinate().get(axis));
        let extreme = if axis.get(hit_point) > 0.0 {
            values.max()
        } else {
            values.min()
        };
        let layer = extreme.unwrap_or(0);

        LayerSelection {
            axis,
            layer,
            blocks: self.layer_blocks(axis, layer),
        }
    }

    /// Picks the axis from the dominant component of `hit_point`, then the
    /// layer with [`Self::layer_for`].
    pub fn select_layer(&self, hit_point: Vec3) -> LayerSelection {
        self.layer_for(dominant_axis(hit_point), hit_point)
    }

    /// Moves every block to the visual offset of its current coordinate.
    ///
    /// When animating, each block gets its own tween and the returned handle
    /// joins all of them. Otherwise positions are set immediately and the
    /// handle is already resolved.
    pub fn position_blocks(
        &mut self,
        animator: &mut Animator<AnimTarget>,
        animate: bool,
        duration_ms: f64,
    ) -> AnimationHandle {
        let spacing = self.spacing;
        if !animate {
            for block in &mut self.blocks {
                block.position = block.coordinate().as_vec3() * spacing;
            }
            return AnimationHandle::resolved();
        }

        let handles: Vec<AnimationHandle> = self
            .blocks
            .iter()
            .map(|block| {
                animator.animate(Tween::new(
                    AnimTarget::BlockPosition(block.id()),
                    block.position(),
                    self.target_position(block.coordinate()),
                    duration_ms,
                ))
            })
            .collect();
        AnimationHandle::join(handles)
    }

    /// Hangs a layer from the pivot.
    ///
    /// The pivot sits at the layer's resting offset and each member keeps
    /// only its in-plane offset.
    pub fn detach(&mut self, selection: &LayerSelection) {
        debug_assert!(self.pivot.is_empty(), "pivot already holds a layer");
        let axis = selection.axis;
        self.pivot = Pivot {
            axis: Some(axis),
            position: self.layer_offset(axis, selection.layer),
            rotation: Vec3::ZERO,
            members: selection.blocks.clone(),
        };
        for &id in &selection.blocks {
            axis.set(&mut self.blocks[id].position, 0.0);
        }
    }

    /// Empties the pivot, moving its members' offsets back into grid space.
    ///
    /// Only translation carries over; the pivot's rotation is dropped.
    pub fn release_pivot(&mut self) {
        let pivot = std::mem::take(&mut self.pivot);
        let rotation = pivot.quat();
        for &id in &pivot.members {
            let block = &mut self.blocks[id];
            block.position = pivot.position + rotation * block.position;
        }
    }

    /// Rotates the logical coordinate and orientation of `blocks` by `angle`
    /// (a multiple of 90 degrees) about `axis`.
    pub fn commit_turn(&mut self, axis: Axis, blocks: &[BlockId], angle: f32) {
        for &id in blocks {
            let block = &mut self.blocks[id];
            block.coordinate = rotate_coord(block.coordinate, axis, angle);
            block.orientation = block.orientation.rotated(axis, angle);
            debug_assert!(block.orientation.is_valid(), "orientation drifted: {:?}", block.orientation);
        }
        debug_assert!(self.is_bijection(), "turn left two blocks on one lattice point");
    }

    /// Applies a value produced by the animator.
    pub fn apply(&mut self, sample: Sample<AnimTarget>) {
        match sample.target {
            AnimTarget::BlockPosition(id) => {
                if let Some(block) = self.blocks.get_mut(id) {
                    block.position = sample.value;
                }
            }
            AnimTarget::PivotPosition => self.pivot.position = sample.value,
            AnimTarget::PivotRotation => self.pivot.rotation = sample.value,
        }
    }

    /// Restores every block's initial coordinate and orientation.
    pub fn reset_blocks(&mut self) {
        for block in &mut self.blocks {
            block.reset();
        }
    }

    /// Highlights exactly the given blocks.
    pub fn set_highlights(&mut self, ids: &[BlockId]) {
        for block in &mut self.blocks {
            let highlighted = ids.contains(&block.id());
            block.set_highlighted(highlighted);
        }
    }

    /// Returns whether every block is at its initial coordinate.
    pub fn solved(&self) -> bool {
        self.blocks.iter().all(Block::in_right_place)
    }

    /// Returns whether the blocks occupy each lattice point exactly once.
    pub fn is_bijection(&self) -> bool {
        let occupied: FxHashSet<Coord> = self.blocks.iter().map(Block::coordinate).collect();
        occupied.len() == BLOCK_COUNT && occupied.iter().all(|coord| coord.is_lattice_point())
    }

    /// Cube-local transform of every block, composing the pivot for blocks
    /// that hang from it.
    pub fn poses(&self) -> Vec<BlockPose> {
        let pivot_rotation = self.pivot.quat();
        self.blocks
            .iter()
            .map(|block| {
                let orientation = block.orientation().to_quat();
                let (translation, rotation) = if self.pivot.members.contains(&block.id()) {
                    (
                        self.pivot.position + pivot_rotation * block.position(),
                        pivot_rotation * orientation,
                    )
                } else {
                    (block.position(), orientation)
                };
                BlockPose {
                    id: block.id(),
                    initial_coordinate: block.initial_coordinate(),
                    translation,
                    rotation,
                    highlighted: block.is_highlighted(),
                }
            })
            .collect()
    }

    /// Bounds of all blocks as currently drawn.
    pub fn bounding_box(&self) -> Aabb {
        let half = self.block_size / 2.0;
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for pose in self.poses() {
            for corner in 0..8 {
                let local = Vec3::new(
                    if corner & 1 == 0 { -half } else { half },
                    if corner & 2 == 0 { -half } else { half },
                    if corner & 4 == 0 { -half } else { half },
                );
                let point = pose.translation + pose.rotation * local;
                min = min.min(point);
                max = max.max(point);
            }
        }
        Aabb { min, max }
    }

    /// Formats the logical layout as text.
    ///
    /// Shows the three z-slices side by side, rows from top (y = 1) to
    /// bottom (y = -1), each cell holding the id of the block at that point.
    pub fn format_layout(&self) -> String {
        let mut occupant = [0; BLOCK_COUNT];
        for block in &self.blocks {
            occupant[coord_to_idx(block.coordinate())] = block.id();
        }

        let mut lines = Vec::with_capacity(4);
        let header: Vec<String> = (-1..=1).map(|z| format!("z={z:<6}")).collect();
        lines.push(header.join("  "));
        for y in (-1..=1).rev() {
            let slices: Vec<String> = (-1..=1)
                .map(|z| {
                    (-1..=1)
                        .map(|x| format!("{:02}", occupant[coord_to_idx(Coord::new(x, y, z))]))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            lines.push(slices.join("  "));
        }

        lines
            .iter()
            .map(|line| line.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
