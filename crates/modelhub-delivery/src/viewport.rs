//! Viewport intersection tracking

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Axis-aligned rectangle in page coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Overlapping region of two rectangles, if any
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = (self.x + self.width).min(other.x + other.width);
        let bottom = (self.y + self.height).min(other.y + other.height);

        (right >= left && bottom >= top).then(|| Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of this rectangle's area that lies inside `viewport`.
    ///
    /// A zero-area rectangle counts as fully visible when it touches the viewport.
    pub fn intersection_ratio(&self, viewport: &Rect) -> f32 {
        match self.intersection(viewport) {
            None => 0.0,
            Some(_) if self.area() == 0.0 => 1.0,
            Some(overlap) => (overlap.area() / self.area()).clamp(0.0, 1.0),
        }
    }
}

struct Target {
    bounds: Rect,
    threshold: f32,
    fired: Arc<AtomicBool>,
}

impl Target {
    fn is_visible_in(&self, viewport: &Rect) -> bool {
        let ratio = self.bounds.intersection_ratio(viewport);
        ratio > 0.0 && ratio >= self.threshold
    }
}

struct ObserverState {
    viewport: Rect,
    next_id: u64,
    targets: HashMap<u64, Target>,
}

/// One-shot visibility observer shared by the elements of a page.
///
/// A target fires the first time it crosses its threshold and is then
/// dropped from the observer; it is never reported twice.
#[derive(Clone)]
pub struct IntersectionObserver {
    state: Arc<Mutex<ObserverState>>,
}

impl IntersectionObserver {
    pub fn new(viewport: Rect) -> Self {
        Self {
            state: Arc::new(Mutex::new(ObserverState {
                viewport,
                next_id: 1,
                targets: HashMap::new(),
            })),
        }
    }

    /// Start watching `bounds`. Fires immediately if already visible.
    pub fn observe(&self, bounds: Rect, threshold: f32) -> Observation {
        let fired = Arc::new(AtomicBool::new(false));
        let target = Target {
            bounds,
            threshold: threshold.clamp(0.0, 1.0),
            fired: Arc::clone(&fired),
        };

        let mut state = self.state.lock();
        let id = state.next_id;
        state.next_id += 1;

        if target.is_visible_in(&state.viewport) {
            fired.store(true, Ordering::Release);
        } else {
            state.targets.insert(id, target);
        }

        Observation {
            id,
            fired,
            state: Arc::downgrade(&self.state),
        }
    }

    /// Move or resize the viewport, e.g. on scroll. Returns how many targets fired.
    pub fn set_viewport(&self, viewport: Rect) -> usize {
        let mut state = self.state.lock();
        state.viewport = viewport;

        let fired: Vec<u64> = state
            .targets
            .iter()
            .filter(|(_, t)| t.is_visible_in(&viewport))
            .map(|(&id, _)| id)
            .collect();

        for id in &fired {
            if let Some(target) = state.targets.remove(id) {
                target.fired.store(true, Ordering::Release);
            }
        }

        if !fired.is_empty() {
            debug!("{} targets entered the viewport", fired.len());
        }
        fired.len()
    }

    pub fn viewport(&self) -> Rect {
        self.state.lock().viewport
    }

    /// Number of targets still waiting to become visible.
    pub fn active_targets(&self) -> usize {
        self.state.lock().targets.len()
    }
}

/// Handle to one observed target. Dropping it disconnects the target.
pub struct Observation {
    id: u64,
    fired: Arc<AtomicBool>,
    state: Weak<Mutex<ObserverState>>,
}

impl Observation {
    /// Whether the target has intersected the viewport at least once.
    pub fn has_intersected(&self) -> bool {
        self.fired.load(Ordering::Acquire)
    }

    /// Update the target's bounds after a layout change.
    pub fn set_bounds(&self, bounds: Rect) {
        let Some(state) = self.state.upgrade() else {
            return;
        };
        let mut state = state.lock();
        let viewport = state.viewport;
        let visible = match state.targets.get_mut(&self.id) {
            Some(target) => {
                target.bounds = bounds;
                target.is_visible_in(&viewport)
            }
            None => false,
        };
        if visible {
            state.targets.remove(&self.id);
            self.fired.store(true, Ordering::Release);
        }
    }
}

impl Drop for Observation {
    fn drop(&mut self) {
        if let Some(state) = self.state.upgrade() {
            state.lock().targets.remove(&self.id);
        }
    }
}
