//! Frame-driven tween scheduler.
//!
//! Tweens interpolate a [`Vec3`] from one value to another over a fixed
//! duration and are advanced by [`Animator::tick`] once per rendered frame.
//! The animator does not own the animated objects: each tween carries a
//! target key and `tick` hands back the sampled values for the owner to
//! apply.
//!
//! Starting a tween returns an [`AnimationHandle`] that resolves exactly
//! once, when the tween reaches its final value. Handles can be joined and
//! can also be awaited as a [`Future`], which makes the same completion
//! usable from async presentation code.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use glam::Vec3;

/// Interpolation curve mapping elapsed-time fraction to value fraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    /// Quadratic ease-out: fast start, decelerating into the target.
    #[default]
    QuadraticOut,
}

impl Easing {
    /// Maps `t` in `[0, 1]` onto `[0, 1]`; monotonic with `f(1) == 1`.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadraticOut => t * (2.0 - t),
        }
    }
}

/// Description of a single interpolation.
#[derive(Debug, Clone, Copy)]
pub struct Tween<K> {
    pub target: K,
    pub from: Vec3,
    pub to: Vec3,
    pub duration_ms: f64,
    pub easing: Easing,
}

impl<K> Tween<K> {
    pub fn new(target: K, from: Vec3, to: Vec3, duration_ms: f64) -> Self {
        Self {
            target,
            from,
            to,
            duration_ms,
            easing: Easing::default(),
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    fn sample(&self, elapsed_ms: f64) -> (Vec3, bool) {
        if self.duration_ms <= 0.0 || elapsed_ms >= self.duration_ms {
            return (self.to, true);
        }
        let t = (elapsed_ms.max(0.0) / self.duration_ms) as f32;
        (self.from.lerp(self.to, self.easing.apply(t)), false)
    }
}

/// A value produced by a tween during a tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample<K> {
    pub target: K,
    pub value: Vec3,
}

/// Shared completion flag behind an [`AnimationHandle`].
#[derive(Debug, Default)]
struct Completion {
    done: Cell<bool>,
    wakers: RefCell<Vec<Waker>>,
}

impl Completion {
    fn resolve(&self) {
        if !self.done.replace(true) {
            for waker in self.wakers.take() {
                waker.wake();
            }
        }
    }
}

/// Single-resolution completion of one or more animations.
///
/// A handle built by [`AnimationHandle::join`] resolves once all of its
/// parts have resolved. A handle with no parts is already resolved.
#[derive(Debug, Clone, Default)]
pub struct AnimationHandle {
    parts: Vec<Rc<Completion>>,
}

impl AnimationHandle {
    /// A handle that is already complete.
    pub fn resolved() -> Self {
        Self::default()
    }

    /// Joins several handles into one that completes when all of them have.
    pub fn join(handles: impl IntoIterator<Item = AnimationHandle>) -> Self {
        Self {
            parts: handles.into_iter().flat_map(|h| h.parts).collect(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.parts.iter().all(|part| part.done.get())
    }
}

impl Future for AnimationHandle {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        let mut pending = false;
        for part in self.parts.iter().filter(|part| !part.done.get()) {
            let mut wakers = part.wakers.borrow_mut();
            if !wakers.iter().any(|waker| waker.will_wake(cx.waker())) {
                wakers.push(cx.waker().clone());
            }
            pending = true;
        }
        if pending {
            Poll::Pending
        } else {
            Poll::Ready(())
        }
    }
}

#[derive(Debug)]
struct ActiveTween<K> {
    tween: Tween<K>,
    started_ms: Option<f64>,
    completion: Rc<Completion>,
}

/// Runs any number of concurrent tweens to completion.
#[derive(Debug)]
pub struct Animator<K> {
    active: Vec<ActiveTween<K>>,
    /// Timestamp of the latest tick; new tweens start from here.
    clock_ms: Option<f64>,
}

impl<K> Default for Animator<K> {
    fn default() -> Self {
        Self {
            active: Vec::new(),
            clock_ms: None,
        }
    }
}

impl<K: Copy> Animator<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns whether any tween is in flight.
    pub fn is_animating(&self) -> bool {
        !self.active.is_empty()
    }

    /// Number of tweens in flight.
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Starts a tween at the current frame time.
    ///
    /// If no frame has ticked yet, the tween starts on the first tick.
    pub fn animate(&mut self, tween: Tween<K>) -> AnimationHandle {
        let completion = Rc::new(Completion::default());
        self.active.push(ActiveTween {
            tween,
            started_ms: self.clock_ms,
            completion: Rc::clone(&completion),
        });
        AnimationHandle {
            parts: vec![completion],
        }
    }

    /// Advances every tween to `now_ms` and returns the sampled values.
    ///
    /// Tweens that reach their end emit their exact final value, resolve
    /// their handle and leave the active set.
    pub fn tick(&mut self, now_ms: f64) -> Vec<Sample<K>> {
        self.clock_ms = Some(now_ms);

        let mut samples = Vec::with_capacity(self.active.len());
        let mut finished = Vec::new();
        self.active.retain_mut(|active| {
            let started = *active.started_ms.get_or_insert(now_ms);
            let (value, done) = active.tween.sample(now_ms - started);
            samples.push(Sample {
                target: active.tween.target,
                value,
            });
            if done {
                finished.push(Rc::clone(&active.completion));
            }
            !done
        });

        // resolve after the active set is updated so wakers observe it
        for completion in finished {
            completion.resolve();
        }
        samples
    }

    /// Drops every tween without resolving its handle.
    ///
    /// Anyone waiting on those handles will never see them complete.
    pub fn clear(&mut self) {
        for active in self.active.drain(..) {
            active.completion.wakers.take();
        }
    }

    /// Jumps every tween to its final value, resolving all handles.
    pub fn complete_all(&mut self) -> Vec<Sample<K>> {
        let samples = self
            .active
            .iter()
            .map(|active| Sample {
                target: active.tween.target,
                value: active.tween.to,
            })
            .collect();
        for active in self.active.drain(..) {
            active.completion.resolve();
        }
        samples
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::task::Wake;

    use super::*;

    struct CountingWaker(AtomicUsize);

    impl Wake for CountingWaker {
        fn wake(self: Arc<Self>) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tween(to: f32, duration_ms: f64) -> Tween<u8> {
        Tween::new(0, Vec3::ZERO, Vec3::splat(to), duration_ms)
    }

    #[test]
    fn test_easing_endpoints() {
        for easing in [Easing::Linear, Easing::QuadraticOut] {
            assert_eq!(easing.apply(0.0), 0.0);
            assert_eq!(easing.apply(1.0), 1.0);
            assert_eq!(easing.apply(2.0), 1.0);
        }
        assert!(Easing::QuadraticOut.apply(0.5) > 0.5, "ease-out should lead linear");
    }

    #[test]
    fn test_linear_tween_midpoint() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        animator.animate(tween(2.0, 100.0).with_easing(Easing::Linear));
        let samples = animator.tick(50.0);
        assert_eq!(samples[0].value, Vec3::splat(1.0));
    }

    #[test]
    fn test_tween_runs_to_exact_target() {
        let mut animator = Animator::new();
        animator.tick(100.0);
        let handle = animator.animate(tween(2.0, 250.0));
        assert!(animator.is_animating());

        let samples = animator.tick(200.0);
        assert_eq!(samples.len(), 1);
        assert!(samples[0].value.x > 0.0 && samples[0].value.x < 2.0);
        assert!(!handle.is_complete());

        let samples = animator.tick(400.0);
        assert_eq!(samples[0].value, Vec3::splat(2.0));
        assert!(handle.is_complete());
        assert!(!animator.is_animating());
        assert!(animator.tick(500.0).is_empty());
    }

    #[test]
    fn test_tween_started_before_first_tick() {
        let mut animator = Animator::new();
        let handle = animator.animate(tween(1.0, 100.0));
        let samples = animator.tick(5000.0);
        assert_eq!(samples[0].value, Vec3::ZERO, "the first tick starts the clock");
        animator.tick(5100.0);
        assert!(handle.is_complete());
    }

    #[test]
    fn test_zero_duration_completes_on_next_tick() {
        let mut animator = Animator::new();
        let handle = animator.animate(tween(3.0, 0.0));
        assert!(!handle.is_complete());
        assert_eq!(animator.tick(0.0)[0].value, Vec3::splat(3.0));
        assert!(handle.is_complete());
    }

    #[test]
    fn test_concurrent_tweens_and_join() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let short = animator.animate(tween(1.0, 100.0));
        let long = animator.animate(tween(1.0, 300.0));
        let both = AnimationHandle::join([short.clone(), long.clone()]);

        animator.tick(150.0);
        assert!(short.is_complete());
        assert!(!long.is_complete());
        assert!(!both.is_complete());
        assert!(animator.is_animating(), "one tween is still running");

        animator.tick(300.0);
        assert!(both.is_complete());
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_clear_abandons_handles() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let handle = animator.animate(tween(1.0, 100.0));
        animator.clear();
        assert!(!animator.is_animating());
        assert!(animator.tick(1000.0).is_empty());
        assert!(!handle.is_complete(), "cleared tweens never resolve");
    }

    #[test]
    fn test_complete_all_resolves_with_final_values() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let a = animator.animate(Tween::new(1, Vec3::ZERO, Vec3::X, 100.0));
        let b = animator.animate(Tween::new(2, Vec3::ZERO, Vec3::Y, 100.0));
        let samples = animator.complete_all();
        assert_eq!(
            samples,
            vec![
                Sample { target: 1, value: Vec3::X },
                Sample { target: 2, value: Vec3::Y },
            ]
        );
        assert!(a.is_complete() && b.is_complete());
        assert!(!animator.is_animating());
    }

    #[test]
    fn test_handle_future_wakes_on_completion() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let mut handle = animator.animate(tween(1.0, 100.0));

        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(Arc::clone(&counter));
        let mut cx = Context::from_waker(&waker);

        assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
        animator.tick(100.0);
        assert_eq!(counter.0.load(Ordering::SeqCst), 1);
        assert!(Pin::new(&mut handle).poll(&mut cx).is_ready());
    }

    #[test]
    fn test_repeated_polls_register_each_waker_once() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let mut handle = animator.animate(tween(1.0, 100.0));

        let first = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let second = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let first_waker = Waker::from(Arc::clone(&first));
        let second_waker = Waker::from(Arc::clone(&second));

        for _ in 0..1000 {
            let mut cx = Context::from_waker(&first_waker);
            assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
        }
        assert_eq!(handle.parts[0].wakers.borrow().len(), 1);

        let mut cx = Context::from_waker(&second_waker);
        assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());
        assert_eq!(handle.parts[0].wakers.borrow().len(), 2);

        animator.tick(100.0);
        assert_eq!(first.0.load(Ordering::SeqCst), 1);
        assert_eq!(second.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clear_drops_registered_wakers() {
        let mut animator = Animator::new();
        animator.tick(0.0);
        let mut handle = animator.animate(tween(1.0, 100.0));
        let counter = Arc::new(CountingWaker(AtomicUsize::new(0)));
        let waker = Waker::from(Arc::clone(&counter));
        let mut cx = Context::from_waker(&waker);
        assert!(Pin::new(&mut handle).poll(&mut cx).is_pending());

        animator.clear();
        assert!(handle.parts[0].wakers.borrow().is_empty());
        assert_eq!(Arc::strong_count(&counter), 2, "only the test's own waker remains");
    }

    #[test]
    fn test_resolved_handle() {
        assert!(AnimationHandle::resolved().is_complete());
        assert!(AnimationHandle::join([]).is_complete());
    }
}
