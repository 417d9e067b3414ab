//! Pointer-driven layer turns.
//!
//! A turn goes through four phases:
//!
//! 1. **Selecting**: the pointer went down on a block. The layer it picked
//!    hangs from the pivot, which is being lifted outward along the axis.
//! 2. **Rotating**: the lift finished and the pivot follows the pointer's
//!    angle around the cube center.
//! 3. **Snapping**: the pointer was released. The pivot settles back to its
//!    resting offset and onto the nearest multiple of 90 degrees.
//! 4. Once settled, the turn is committed to the blocks' logical state and
//!    the engine is idle again.
//!
//! Only one turn can be in progress, and a new one cannot start while any
//! animation is running.

use std::f32::consts::{PI, TAU};
use std::mem;

use glam::{Vec2, Vec3};

use crate::animator::{AnimationHandle, Animator, Tween};
use crate::block::BlockId;
use crate::config::CubeConfig;
use crate::geometry::{quarter_turns, snap_to_nearest_90, Axis};
use crate::grid::{AnimTarget, CubeGrid, LayerSelection};
use crate::picking::HitTest;
use crate::signal::{InteractionEvent, InteractionSignal};

/// Externally visible phase of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationPhase {
    Idle,
    Selecting,
    Rotating,
    Snapping,
}

/// The layer being turned and the drag that turns it.
#[derive(Debug, Clone)]
pub struct Session {
    selection: LayerSelection,
    drag_start: Option<Vec2>,
    /// Screen angle of the latest pointer position.
    last_pointer_angle: f32,
    /// Unwrapped screen angle travelled since the drag started.
    drag_angle: f32,
}

impl Session {
    pub fn axis(&self) -> Axis {
        self.selection.axis
    }

    pub fn layer(&self) -> i32 {
        self.selection.layer
    }

    pub fn blocks(&self) -> &[BlockId] {
        &self.selection.blocks
    }

    /// Pointer position where the drag started; cleared on release.
    pub fn drag_start(&self) -> Option<Vec2> {
        self.drag_start
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    Selecting {
        session: Session,
        lift: AnimationHandle,
        /// The pointer was released before the lift finished; the gesture
        /// has already ended and only the snap is pending.
        released: bool,
    },
    Rotating {
        session: Session,
    },
    Snapping {
        session: Session,
        target_angle: f32,
        settle: AnimationHandle,
    },
}

/// Angle of a viewport point around the cube center.
fn screen_angle(point: Vec2) -> f32 {
    point.y.atan2(point.x)
}

/// Wraps an angle difference into `[-PI, PI)`.
fn wrap_angle(delta: f32) -> f32 {
    (delta + PI).rem_euclid(TAU) - PI
}

/// State machine turning layers of a [`CubeGrid`] from pointer gestures.
#[derive(Debug)]
pub struct RotationEngine {
    phase: Phase,
    lift_ratio: f32,
    lift_duration_ms: f64,
    settle_duration_ms: f64,
    drag_sensitivity: f32,
    turns: u32,
}

impl RotationEngine {
    pub fn new(config: &CubeConfig) -> Self {
        Self {
            phase: Phase::Idle,
            lift_ratio: config.lift_ratio,
            lift_duration_ms: config.lift_duration_ms,
            settle_duration_ms: config.settle_duration_ms,
            drag_sensitivity: config.drag_sensitivity,
            turns: 0,
        }
    }

    pub fn phase(&self) -> RotationPhase {
        match self.phase {
            Phase::Idle => RotationPhase::Idle,
            Phase::Selecting { .. } => RotationPhase::Selecting,
            Phase::Rotating { .. } => RotationPhase::Rotating,
            Phase::Snapping { .. } => RotationPhase::Snapping,
        }
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Selecting { session, .. }
            | Phase::Rotating { session }
            | Phase::Snapping { session, .. } => Some(session),
        }
    }

    /// Number of committed turns that moved blocks.
    pub fn turn_count(&self) -> u32 {
        self.turns
    }

    pub(crate) fn reset_turn_count(&mut self) {
        self.turns = 0;
    }

    /// Starts a turn if the pointer is over a block and nothing is moving.
    ///
    /// Returns whether a turn started.
    pub fn pointer_down(
        &mut self,
        point: Vec2,
        picker: &dyn HitTest,
        grid: &mut CubeGrid,
        animator: &mut Animator<AnimTarget>,
        signal: &mut InteractionSignal,
    ) -> bool {
        if !matches!(self.phase, Phase::Idle) {
            log::debug!("pointer down ignored: a turn is already in progress");
            return false;
        }
        if animator.is_animating() {
            log::debug!("pointer down ignored: animation in progress");
            return false;
        }
        let Some(hit) = picker.query_hit(point, &grid.poses()) else {
            return false;
        };

        let selection = grid.select_layer(hit.surface_point);
        log::debug!(
            "grabbed layer {}={} via block {}",
            selection.axis,
            selection.layer,
            hit.block
        );
        grid.detach(&selection);
        signal.emit(InteractionEvent::RotateStart);

        let rest = grid.pivot().position();
        let lift = animator.animate(Tween::new(
            AnimTarget::PivotPosition,
            rest,
            rest * self.lift_ratio,
            self.lift_duration_ms,
        ));

        self.phase = Phase::Selecting {
            session: Session {
                selection,
                drag_start: Some(point),
                last_pointer_angle: screen_angle(point),
                drag_angle: 0.0,
            },
            lift,
            released: false,
        };
        true
    }

    /// Turns the grabbed layer to follow the pointer.
    pub fn pointer_move(&mut self, point: Vec2, grid: &mut CubeGrid, signal: &mut InteractionSignal) {
        let Phase::Rotating { session } = &mut self.phase else {
            return;
        };

        let angle = screen_angle(point);
        session.drag_angle += wrap_angle(angle - session.last_pointer_angle);
        session.last_pointer_angle = angle;

        let mut rotation = Vec3::ZERO;
        session
            .axis()
            .set(&mut rotation, session.drag_angle * self.drag_sensitivity);
        grid.pivot_mut().set_rotation(rotation);
        signal.emit(InteractionEvent::Rotate);
    }

    /// Releases the grabbed layer so it snaps into place.
    ///
    /// Released during the lift, the gesture ends at once and the snap
    /// starts when the lift finishes.
    pub fn pointer_up(
        &mut self,
        grid: &mut CubeGrid,
        animator: &mut Animator<AnimTarget>,
        signal: &mut InteractionSignal,
    ) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Selecting {
                mut session,
                lift,
                released: false,
            } => {
                signal.emit(InteractionEvent::RotateEnd);
                session.drag_start = None;
                self.phase = Phase::Selecting {
                    session,
                    lift,
                    released: true,
                };
            }
            Phase::Rotating { mut session } => {
                signal.emit(InteractionEvent::RotateEnd);
                session.drag_start = None;
                self.release(session, grid, animator);
            }
            other => self.phase = other,
        }
    }

    /// Moves to the next phase once the animation it waits on is done.
    ///
    /// Call after the frame's animation samples have been applied.
    pub fn advance(&mut self, grid: &mut CubeGrid, animator: &mut Animator<AnimTarget>) {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Selecting {
                session,
                lift,
                released,
            } if lift.is_complete() => {
                if released {
                    self.release(session, grid, animator);
                } else {
                    self.phase = Phase::Rotating { session };
                }
            }
            Phase::Snapping {
                session,
                target_angle,
                settle,
            } if settle.is_complete() => self.commit(session, target_angle, grid, animator),
            other => self.phase = other,
        }
    }

    /// Highlights the blocks of the current turn, or while idle the layer a
    /// pointer-down at `pointer` would grab.
    pub fn update_highlights(
        &self,
        pointer: Option<Vec2>,
        hover: bool,
        picker: &dyn HitTest,
        grid: &mut CubeGrid,
        animator: &Animator<AnimTarget>,
    ) {
        let highlighted = match self.session() {
            Some(session) => session.blocks().to_vec(),
            None if hover && !animator.is_animating() => pointer
                .and_then(|point| picker.query_hit(point, &grid.poses()))
                .map(|hit| grid.select_layer(hit.surface_point).blocks)
                .unwrap_or_default(),
            None => Vec::new(),
        };
        grid.set_highlights(&highlighted);
    }

    /// Abandons any turn in progress without committing it.
    ///
    /// Emits [`InteractionEvent::RotateEnd`] if the pointer was still
    /// holding the layer. Returns whether a turn was abandoned.
    pub fn cancel(&mut self, grid: &mut CubeGrid, signal: &mut InteractionSignal) -> bool {
        match mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Idle => return false,
            Phase::Selecting {
                session,
                released: false,
                ..
            }
            | Phase::Rotating { session } => {
                log::debug!("abandoned turn of layer {}={}", session.axis(), session.layer());
                signal.emit(InteractionEvent::RotateEnd);
            }
            Phase::Selecting { session, .. } | Phase::Snapping { session, .. } => {
                log::debug!("abandoned settling layer {}={}", session.axis(), session.layer());
            }
        }
        grid.release_pivot();
        true
    }

    /// Starts the settle onto the nearest quarter turn.
    fn release(&mut self, session: Session, grid: &mut CubeGrid, animator: &mut Animator<AnimTarget>) {
        let axis = session.axis();
        let pivot_rotation = grid.pivot().rotation();
        let target_angle = snap_to_nearest_90(axis.get(pivot_rotation));

        // nothing from an earlier turn may keep writing to the pivot
        animator.clear();

        let rest = grid.layer_offset(axis, session.layer());
        let offset = animator.animate(Tween::new(
            AnimTarget::PivotPosition,
            grid.pivot().position(),
            rest,
            self.settle_duration_ms,
        ));
        let mut target_rotation = Vec3::ZERO;
        axis.set(&mut target_rotation, target_angle);
        let rotation = animator.animate(Tween::new(
            AnimTarget::PivotRotation,
            pivot_rotation,
            target_rotation,
            self.settle_duration_ms,
        ));

        self.phase = Phase::Snapping {
            session,
            target_angle,
            settle: AnimationHandle::join([offset, rotation]),
        };
    }

    fn commit(
        &mut self,
        session: Session,
        target_angle: f32,
        grid: &mut CubeGrid,
        animator: &mut Animator<AnimTarget>,
    ) {
        let axis = session.axis();
        grid.commit_turn(axis, session.blocks(), target_angle);
        grid.release_pivot();
        grid.position_blocks(animator, false, 0.0);

        let quarters = quarter_turns(target_angle);
        if quarters.rem_euclid(4) != 0 {
            self.turns += 1;
        }
        log::info!(
            "committed {quarters} quarter turn(s) of layer {axis}={}",
            session.layer()
        );
        self.phase = Phase::Idle;
    }
}
