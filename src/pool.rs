use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::oneshot;

/// Fixed-size pool of browsing surfaces.
///
/// `acquire` hands out an idle surface immediately or suspends the caller;
/// suspended callers are served strictly in the order they arrived. A
/// released surface goes straight to the longest waiter, bypassing the
/// idle list, so no waiter can be starved by a later arrival.
pub struct SurfacePool<S> {
    state: Mutex<PoolState<S>>,
}

struct PoolState<S> {
    idle: Vec<S>,
    waiters: VecDeque<oneshot::Sender<S>>,
}

impl<S: Send> SurfacePool<S> {
    /// Seed the pool with its full set of surfaces. The pool never
    /// creates or destroys surfaces afterwards.
    pub fn new(surfaces: Vec<S>) -> Self {
        Self {
            state: Mutex::new(PoolState {
                idle: surfaces,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Take exclusive ownership of a surface, suspending until one is
    /// released if none is idle.
    pub async fn acquire(&self) -> S {
        let receiver = {
            let mut state = self.state.lock().unwrap();
            if let Some(surface) = state.idle.pop() {
                return surface;
            }

            let (sender, receiver) = oneshot::channel();
            state.waiters.push_back(sender);
            receiver
        };

        // The sender lives in the pool, which outlives this borrow.
        receiver
            .await
            .expect("surface pool dropped while a caller was waiting")
    }

    /// Return a surface. The longest-waiting suspended caller receives it
    /// directly; with no waiters it goes back on the idle list.
    pub fn release(&self, surface: S) {
        let mut state = self.state.lock().unwrap();
        let mut surface = surface;

        while let Some(waiter) = state.waiters.pop_front() {
            match waiter.send(surface) {
                Ok(()) => return,
                // Waiter is gone; pass the surface on to the next one.
                Err(returned) => surface = returned,
            }
        }

        state.idle.push(surface);
    }

    /// Number of surfaces currently idle.
    pub fn idle_count(&self) -> usize {
        self.state.lock().unwrap().idle.len()
    }

    /// Number of callers currently suspended in `acquire`.
    pub fn waiting_count(&self) -> usize {
        self.state.lock().unwrap().waiters.len()
    }
}
