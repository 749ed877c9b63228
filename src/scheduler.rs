//! Frame scheduling of the blockwise draws.
use std::{
    cell::{Cell, RefCell},
    collections::{HashMap, VecDeque},
    fmt::Debug,
    rc::Rc,
};

use wasm_bindgen::prelude::*;

/// Handle of a scheduled frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FrameHandle(pub i32);

/// Runs work at the next display refresh.
pub trait FrameScheduler: Debug {
    /// Schedules `work` for the next frame.
    fn request_frame(&self, work: Box<dyn FnOnce()>) -> FrameHandle;

    /// Cancels a scheduled callback.
    ///
    /// Cancelling a callback that already ran or was already cancelled is a
    /// no-op.
    fn cancel_frame(&self, handle: FrameHandle);
}

/// Bookkeeping of the callbacks handed to the browser.
///
/// A callback is owned here until it ran or was cancelled. Callbacks that
/// ran are only dropped on the next request, never while they execute.
#[derive(Debug)]
struct FrameRegistry<C> {
    callbacks: HashMap<FrameHandle, C>,
    finished: Vec<C>,
    running: Option<FrameHandle>,
}

impl<C> Default for FrameRegistry<C> {
    fn default() -> Self {
        Self {
            callbacks: HashMap::new(),
            finished: Vec::new(),
            running: None,
        }
    }
}

impl<C> FrameRegistry<C> {
    fn insert(&mut self, handle: FrameHandle, callback: C) {
        self.finished.clear();
        self.callbacks.insert(handle, callback);
    }

    fn begin(&mut self, handle: FrameHandle) {
        self.running = Some(handle);
    }

    /// Marks the running callback as done.
    fn finish(&mut self, handle: FrameHandle) {
        if self.running == Some(handle) {
            self.running = None;
        }
        if let Some(callback) = self.callbacks.remove(&handle) {
            self.finished.push(callback);
        }
    }

    /// Drops a pending callback; returns whether it was still pending.
    fn cancel(&mut self, handle: FrameHandle) -> bool {
        if self.running == Some(handle) {
            return false;
        }
        self.callbacks.remove(&handle).is_some()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.callbacks.len() + self.finished.len()
    }
}

/// Scheduler backed by `window.requestAnimationFrame`.
#[derive(Debug)]
pub struct AnimationFrameScheduler {
    window: web_sys::Window,
    frames: Rc<RefCell<FrameRegistry<Closure<dyn FnMut()>>>>,
}

impl AnimationFrameScheduler {
    pub fn new() -> Option<Self> {
        web_sys::window().map(|window| Self {
            window,
            frames: Default::default(),
        })
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&self, work: Box<dyn FnOnce()>) -> FrameHandle {
        let handle = Rc::new(Cell::new(None));
        let frames = Rc::downgrade(&self.frames);
        let mut work = Some(work);
        let callback = {
            let handle = handle.clone();
            Closure::<dyn FnMut()>::new(move || {
                let (Some(frames), Some(handle)) = (frames.upgrade(), handle.get()) else {
                    return;
                };
                frames.borrow_mut().begin(handle);
                if let Some(work) = work.take() {
                    work();
                }
                frames.borrow_mut().finish(handle);
            })
        };

        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(id) => {
                let id = FrameHandle(id);
                handle.set(Some(id));
                self.frames.borrow_mut().insert(id, callback);
                id
            }
            Err(err) => {
                log::error!("could not request an animation frame: {err:?}");
                FrameHandle(0)
            }
        }
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        if !self.frames.borrow_mut().cancel(handle) {
            return;
        }
        if let Err(err) = self.window.cancel_animation_frame(handle.0) {
            log::error!("could not cancel animation frame {}: {err:?}", handle.0);
        }
    }
}

impl Drop for AnimationFrameScheduler {
    fn drop(&mut self) {
        let handles = self
            .frames
            .borrow()
            .callbacks
            .keys()
            .copied()
            .collect::<Vec<_>>();
        for handle in handles {
            self.cancel_frame(handle);
        }
    }
}

/// Scheduler whose frames are advanced explicitly.
///
/// Used by headless hosts and tests to drive the block chains
/// deterministically.
#[derive(Default)]
pub struct ManualScheduler {
    state: RefCell<ManualState>,
}

#[derive(Default)]
struct ManualState {
    next_handle: i32,
    queue: VecDeque<(FrameHandle, Box<dyn FnOnce()>)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of callbacks waiting for the next frame.
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Runs every callback scheduled before this frame started.
    ///
    /// Callbacks requested while the frame runs are deferred to the next
    /// frame. Returns the number of callbacks that ran.
    pub fn run_frame(&self) -> usize {
        let frame = std::mem::take(&mut self.state.borrow_mut().queue);
        let count = frame.len();
        for (_, work) in frame {
            work();
        }
        count
    }

    /// Runs frames until nothing is scheduled anymore.
    ///
    /// Returns the number of frames that ran.
    pub fn run_until_idle(&self) -> usize {
        let mut frames = 0;
        while self.pending() != 0 {
            self.run_frame();
            frames += 1;
        }
        frames
    }
}

impl Debug for ManualScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManualScheduler")
            .field("pending", &self.pending())
            .finish()
    }
}

impl FrameScheduler for ManualScheduler {
    fn request_frame(&self, work: Box<dyn FnOnce()>) -> FrameHandle {
        let mut state = self.state.borrow_mut();
        state.next_handle += 1;
        let handle = FrameHandle(state.next_handle);
        state.queue.push_back((handle, work));
        handle
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.state
            .borrow_mut()
            .queue
            .retain(|(h, _)| *h != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_releases_cancelled_callbacks() {
        let mut registry = FrameRegistry::default();
        let callback = Rc::new(());
        for i in 0..100 {
            registry.insert(FrameHandle(i), callback.clone());
            assert!(registry.cancel(FrameHandle(i)));
        }

        assert_eq!(registry.len(), 0);
        assert_eq!(Rc::strong_count(&callback), 1);
        assert!(!registry.cancel(FrameHandle(0)));
    }

    #[test]
    fn registry_keeps_running_callbacks_alive() {
        let mut registry = FrameRegistry::default();
        let callback = Rc::new(());
        registry.insert(FrameHandle(1), callback.clone());

        registry.begin(FrameHandle(1));
        assert!(!registry.cancel(FrameHandle(1)));
        registry.insert(FrameHandle(2), callback.clone());
        assert_eq!(Rc::strong_count(&callback), 3);

        registry.finish(FrameHandle(1));
        assert_eq!(registry.len(), 2);
        registry.begin(FrameHandle(2));
        registry.finish(FrameHandle(2));
        registry.insert(FrameHandle(3), callback.clone());

        // Both finished callbacks were dropped by the last request.
        assert_eq!(registry.len(), 1);
        assert_eq!(Rc::strong_count(&callback), 2);
    }

    #[test]
    fn frames_run_in_request_order() {
        let scheduler = ManualScheduler::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        for i in 0..3 {
            let log = log.clone();
            scheduler.request_frame(Box::new(move || log.borrow_mut().push(i)));
        }

        assert_eq!(scheduler.pending(), 3);
        assert_eq!(scheduler.run_frame(), 3);
        assert_eq!(*log.borrow(), vec![0, 1, 2]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn cancelled_frames_do_not_run() {
        let scheduler = ManualScheduler::new();
        let ran = Rc::new(RefCell::new(false));
        let handle = {
            let ran = ran.clone();
            scheduler.request_frame(Box::new(move || *ran.borrow_mut() = true))
        };

        scheduler.cancel_frame(handle);
        scheduler.cancel_frame(handle);
        assert_eq!(scheduler.run_frame(), 0);
        assert!(!*ran.borrow());
    }

    #[test]
    fn requests_from_a_frame_are_deferred() {
        let scheduler = Rc::new(ManualScheduler::new());
        let count = Rc::new(RefCell::new(0));
        {
            let inner = scheduler.clone();
            let count = count.clone();
            scheduler.request_frame(Box::new(move || {
                *count.borrow_mut() += 1;
                let count = count.clone();
                inner.request_frame(Box::new(move || *count.borrow_mut() += 1));
            }));
        }

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*count.borrow(), 1);
        assert_eq!(scheduler.run_until_idle(), 1);
        assert_eq!(*count.borrow(), 2);
    }
}
