//! The puzzle as seen by a presentation layer.
//!
//! [`RubiksCube`] ties the grid, animator, rotation engine and interaction
//! signal together. A host feeds it frame ticks and pointer events (either
//! one at a time or as an [`InputEvent`] stream) and reads back block poses
//! to draw.

use glam::Vec2;

use crate::animator::{AnimationHandle, Animator};
use crate::config::{ConfigError, CubeConfig};
use crate::engine::{RotationEngine, RotationPhase, Session};
use crate::grid::{Aabb, AnimTarget, BlockPose, CubeGrid};
use crate::picking::HitTest;
use crate::signal::{InteractionEvent, InteractionSignal, SubscriptionId};

/// Input from the host application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A frame is about to be drawn; the timestamp is in milliseconds and
    /// never decreases.
    Frame(f64),
    PointerDown(Vec2),
    PointerMove(Vec2),
    PointerUp,
}

/// An interactive 3x3x3 twisty puzzle.
pub struct RubiksCube {
    config: CubeConfig,
    grid: CubeGrid,
    animator: Animator<AnimTarget>,
    engine: RotationEngine,
    signal: InteractionSignal,
    picker: Box<dyn HitTest>,
    /// Latest pointer position, for hover highlighting.
    pointer: Option<Vec2>,
}

impl std::fmt::Debug for RubiksCube {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RubiksCube")
            .field("config", &self.config)
            .field("phase", &self.engine.phase())
            .field("solved", &self.solved())
            .finish_non_exhaustive()
    }
}

impl RubiksCube {
    /// Builds a solved cube that picks blocks with `picker`.
    ///
    /// With `animate_assembly` set, blocks fly in from the center over the
    /// assembly duration and no turn can start until they arrive.
    pub fn new(config: CubeConfig, picker: impl HitTest + 'static) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut grid = CubeGrid::new(&config);
        let mut animator = Animator::new();
        grid.position_blocks(&mut animator, config.animate_assembly, config.assembly_duration_ms);

        Ok(Self {
            engine: RotationEngine::new(&config),
            config,
            grid,
            animator,
            signal: InteractionSignal::new(),
            picker: Box::new(picker),
            pointer: None,
        })
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    /// Replaces the pointer intersection service, e.g. after the camera
    /// moved.
    pub fn set_picker(&mut self, picker: impl HitTest + 'static) {
        self.picker = Box::new(picker);
    }

    pub fn handle(&mut self, event: InputEvent) {
        match event {
            InputEvent::Frame(now_ms) => self.on_frame(now_ms),
            InputEvent::PointerDown(point) => {
                self.pointer_down(point);
            }
            InputEvent::PointerMove(point) => self.pointer_move(point),
            InputEvent::PointerUp => self.pointer_up(),
        }
    }

    /// Feeds a whole event stream.
    pub fn run(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        for event in events {
            self.handle(event);
        }
    }

    /// Advances animations, lets the engine react to finished ones and
    /// refreshes highlights.
    pub fn on_frame(&mut self, now_ms: f64) {
        for sample in self.animator.tick(now_ms) {
            self.grid.apply(sample);
        }
        self.engine.advance(&mut self.grid, &mut self.animator);
        self.engine.update_highlights(
            self.pointer,
            self.config.hover_highlight,
            self.picker.as_ref(),
            &mut self.grid,
            &self.animator,
        );
    }

    /// Returns whether a turn started.
    pub fn pointer_down(&mut self, point: Vec2) -> bool {
        self.pointer = Some(point);
        self.engine.pointer_down(
            point,
            self.picker.as_ref(),
            &mut self.grid,
            &mut self.animator,
            &mut self.signal,
        )
    }

    pub fn pointer_move(&mut self, point: Vec2) {
        self.pointer = Some(point);
        self.engine.pointer_move(point, &mut self.grid, &mut self.signal);
    }

    pub fn pointer_up(&mut self) {
        self.engine
            .pointer_up(&mut self.grid, &mut self.animator, &mut self.signal);
    }

    /// Forgets the pointer, e.g. when it leaves the window.
    pub fn pointer_left(&mut self) {
        self.pointer = None;
    }

    /// Returns every block to its initial coordinate and orientation.
    ///
    /// A turn in progress is abandoned and every pending animation handle
    /// resolves before the blocks start moving home. The returned handle
    /// resolves once all blocks have arrived.
    pub fn reset(&mut self) -> AnimationHandle {
        for sample in self.animator.complete_all() {
            self.grid.apply(sample);
        }
        self.engine.cancel(&mut self.grid, &mut self.signal);
        self.engine.reset_turn_count();
        self.grid.reset_blocks();
        log::info!("resetting cube");
        self.grid.position_blocks(
            &mut self.animator,
            true,
            self.config.assembly_duration_ms,
        )
    }

    /// Returns whether every block is at its initial coordinate.
    pub fn solved(&self) -> bool {
        self.grid.solved()
    }

    pub fn subscribe(&mut self, callback: impl FnMut(InteractionEvent) + 'static) -> SubscriptionId {
        self.signal.subscribe(callback)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.signal.unsubscribe(id)
    }

    pub fn block_size(&self) -> f32 {
        self.grid.block_size()
    }

    pub fn bounding_box(&self) -> Aabb {
        self.grid.bounding_box()
    }

    pub fn poses(&self) -> Vec<BlockPose> {
        self.grid.poses()
    }

    pub fn grid(&self) -> &CubeGrid {
        &self.grid
    }

    pub fn phase(&self) -> RotationPhase {
        self.engine.phase()
    }

    pub fn session(&self) -> Option<&Session> {
        self.engine.session()
    }

    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    /// Returns whether nothing is turning or animating.
    pub fn is_idle(&self) -> bool {
        self.engine.phase() == RotationPhase::Idle && !self.animator.is_animating()
    }

    /// Number of turns committed since construction or the last reset.
    pub fn turn_count(&self) -> u32 {
        self.engine.turn_count()
    }
}
