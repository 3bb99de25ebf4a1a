//! Frame driver: calls a registered update once per tick with monotonic
//! elapsed time, independent of any particular rendering library.

/// Work performed once per display refresh.
pub trait FrameUpdate {
    fn update(&mut self, elapsed: f64) -> anyhow::Result<()>;
}

impl<F> FrameUpdate for F
where
    F: FnMut(f64) -> anyhow::Result<()>,
{
    fn update(&mut self, elapsed: f64) -> anyhow::Result<()> {
        self(elapsed)
    }
}

pub struct FrameScheduler<U> {
    update: U,
    origin: Option<f64>,
    elapsed: f64,
    frames: u64,
    skipped: u64,
}

impl<U: FrameUpdate> FrameScheduler<U> {
    pub fn new(update: U) -> Self {
        Self {
            update,
            origin: None,
            elapsed: 0.0,
            frames: 0,
            skipped: 0,
        }
    }

    /// Advance to host timestamp `now_sec` and run the update.
    ///
    /// The first tick defines `t = 0`. Timestamps that go backwards are held
    /// at the last elapsed value. A failed update is logged and skipped; the
    /// next tick recomputes everything from time alone.
    pub fn tick(&mut self, now_sec: f64) -> f64 {
        let origin = *self.origin.get_or_insert(now_sec);
        self.elapsed = (now_sec - origin).max(self.elapsed);
        self.frames += 1;
        if let Err(e) = self.update.update(self.elapsed) {
            self.skipped += 1;
            log::warn!(
                "[frame] skipped frame {} at t={:.3}s: {:#}",
                self.frames,
                self.elapsed,
                e
            );
        }
        self.elapsed
    }

    /// Tick from a host clock instead of a display callback timestamp.
    pub fn tick_now(&mut self, clock: &MonotonicClock) -> f64 {
        self.tick(clock.now_sec())
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn update(&self) -> &U {
        &self.update
    }

    pub fn update_mut(&mut self) -> &mut U {
        &mut self.update
    }
}

/// Host-side clock for drivers that aren't handed timestamps.
pub struct MonotonicClock {
    start: instant::Instant,
}

impl MonotonicClock {
    pub fn start() -> Self {
        Self {
            start: instant::Instant::now(),
        }
    }

    pub fn now_sec(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }
}

#[cfg(target_arch = "wasm32")]
pub use self::raf::start_loop;

#[cfg(target_arch = "wasm32")]
mod raf {
    use super::{FrameScheduler, FrameUpdate};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::closure::Closure;
    use wasm_bindgen::JsCast;
    use web_sys as web;

    /// Drive `scheduler` from `requestAnimationFrame` until `running` is cleared.
    pub fn start_loop<U: FrameUpdate + 'static>(
        scheduler: Rc<RefCell<FrameScheduler<U>>>,
        running: Rc<Cell<bool>>,
        mut before_tick: impl FnMut() + 'static,
    ) {
        let tick: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let tick_clone = tick.clone();
        *tick.borrow_mut() = Some(Closure::wrap(Box::new(move |timestamp_ms: f64| {
            if !running.get() {
                log::info!("[frame] loop stopped");
                return;
            }
            before_tick();
            scheduler.borrow_mut().tick(timestamp_ms / 1000.0);
            request_frame(&tick_clone);
        }) as Box<dyn FnMut(f64)>));
        request_frame(&tick);
    }

    fn request_frame(tick: &Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>) {
        let Some(w) = web::window() else { return };
        if let Some(cb) = tick.borrow().as_ref() {
            _ = w.request_animation_frame(cb.as_ref().unchecked_ref());
        }
    }
}
