//! One-shot timers
//!
//! Each timer counts down by the frame delta and fires once when its
//! remaining time reaches zero or below, then is removed. Periodic timers
//! re-arm themselves from their own callback.

use super::Scene;
use crate::error::HookResult;
use std::collections::BTreeMap;

/// Handle of a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// Timer callback
pub type TimerCallback = Box<dyn FnOnce(&mut Scene) -> HookResult>;

struct Timer {
    remaining: f32,
    callback: TimerCallback,
}

/// Pending timers, visited in creation order
#[derive(Default)]
pub(crate) struct TimerTable {
    timers: BTreeMap<TimerId, Timer>,
    next_id: u64,
}

impl TimerTable {
    fn insert(&mut self, remaining: f32, callback: TimerCallback) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.insert(id, Timer { remaining, callback });
        id
    }

    /// Count every timer down and remove the due ones
    fn advance(&mut self, dt: f32) -> Vec<TimerCallback> {
        let due: Vec<TimerId> = self
            .timers
            .iter_mut()
            .filter_map(|(id, timer)| {
                timer.remaining -= dt;
                (timer.remaining <= 0.0).then_some(*id)
            })
            .collect();
        due.into_iter()
            .filter_map(|id| self.timers.remove(&id).map(|t| t.callback))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.timers.len()
    }
}

impl Scene {
    /// Run `cb` once after `seconds`
    pub fn wait(&mut self, seconds: f32, cb: impl FnOnce(&mut Scene) -> HookResult + 'static) -> TimerId {
        self.timers.insert(seconds, Box::new(cb))
    }

    /// Cancel a pending timer; returns whether it was pending
    pub fn cancel(&mut self, timer: TimerId) -> bool {
        self.timers.timers.remove(&timer).is_some()
    }

    /// Number of pending timers
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Run `cb` now and then every `seconds`
    ///
    /// Stops once `cb` returns an error; the error reaches the scheduler.
    pub fn loop_every(&mut self, seconds: f32, cb: impl FnMut(&mut Scene) -> HookResult + 'static) -> HookResult {
        fn tick<F: FnMut(&mut Scene) -> HookResult + 'static>(scene: &mut Scene, seconds: f32, mut cb: F) -> HookResult {
            cb(scene)?;
            scene.wait(seconds, move |scene| tick(scene, seconds, cb));
            Ok(())
        }
        tick(self, seconds, cb)
    }

    /// Fire due timers in creation order
    pub(crate) fn run_timers(&mut self) -> HookResult {
        let dt = self.dt();
        for callback in self.timers.advance(dt) {
            callback(self)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_wait_fires_once_when_time_runs_out() {
        let mut scene = Scene::headless("test");
        let fired = Rc::new(RefCell::new(Vec::new()));
        let f = fired.clone();
        scene.wait(2.0, move |scene| {
            f.borrow_mut().push(scene.frame_count());
            Ok(())
        });

        for _ in 0..6 {
            scene.step(0.5).unwrap();
        }

        // frames count from 1; cumulative time reaches 2.0 on the fourth
        assert_eq!(*fired.borrow(), vec![4]);
        assert_eq!(scene.pending_timers(), 0);
    }

    #[test]
    fn test_loop_every_rearms() {
        let mut scene = Scene::headless("test");
        let count = Rc::new(RefCell::new(0));
        let c = count.clone();
        scene
            .loop_every(1.0, move |_| {
                *c.borrow_mut() += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(*count.borrow(), 1);

        for _ in 0..10 {
            scene.step(0.25).unwrap();
        }
        assert_eq!(*count.borrow(), 3);
        assert_eq!(scene.pending_timers(), 1);
    }

    #[test]
    fn test_cancel_timer() {
        let mut scene = Scene::headless("test");
        let id = scene.wait(1.0, |_| Err(crate::error::GameError::script("should not fire")));
        assert!(scene.cancel(id));
        assert!(!scene.cancel(id));
        scene.step(2.0).unwrap();
    }

    #[test]
    fn test_timers_fire_in_creation_order() {
        let mut scene = Scene::headless("test");
        let order = Rc::new(RefCell::new(Vec::new()));
        for (i, delay) in [0.3, 0.1, 0.2].into_iter().enumerate() {
            let o = order.clone();
            scene.wait(delay, move |_| {
                o.borrow_mut().push(i);
                Ok(())
            });
        }
        scene.step(0.5).unwrap();
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }
}
