//! Swipe-to-switch-tab navigation.
//!
//! ### Touch sequence
//! - `touch_start` records the first touch point and whether it landed on an
//!   interactive element; such sequences are ignored entirely.
//! - `touch_move` marks the sequence as moved, regardless of distance.
//! - `touch_end` classifies the displacement and resolves the target tab.
//!
//! ### Swipe rule
//! - Horizontal travel of at least `min_distance_px` (60 by default).
//! - At most `max_angle_deg` (30 by default) off horizontal.
//! - Leftward swipe moves to the next tab, rightward to the previous one,
//!   wrapping at both ends.

pub mod tabs;
pub mod target;

pub use tabs::{SwipeDirection, Tab, TabList};
pub use target::{ElementInfo, TouchTarget};

use reflekt_core::SwipeConfig;
use url::Url;

/// A touch coordinate in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// State of one touch sequence, from touch start to touch end.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct GestureState {
    start: TouchPoint,
    moved: bool,
    ignore: bool,
}

/// Classify a displacement as a tab swipe.
///
/// Returns `None` unless the horizontal travel reaches the threshold and the
/// angle from horizontal stays within the limit.
pub fn classify_swipe(dx: f64, dy: f64, config: &SwipeConfig) -> Option<SwipeDirection> {
    if dx == 0.0 || dx.abs() < config.min_distance_px {
        return None;
    }

    let angle = (dy.abs() / dx.abs()).atan().to_degrees();
    if angle > config.max_angle_deg {
        return None;
    }

    if dx < 0.0 { Some(SwipeDirection::Next) } else { Some(SwipeDirection::Previous) }
}

/// Turns touch sequences on a page into tab navigations.
#[derive(Debug, Clone)]
pub struct GestureNavigator {
    tabs: TabList,
    location: Url,
    config: SwipeConfig,
    state: Option<GestureState>,
}

impl GestureNavigator {
    pub fn new(tabs: TabList, location: Url, config: SwipeConfig) -> Self {
        Self { tabs, location, config, state: None }
    }

    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Start a new touch sequence.
    ///
    /// Only the first touch point is tracked.
    pub fn touch_start(&mut self, touches: &[TouchPoint], target: &TouchTarget) {
        self.state = touches.first().map(|&start| GestureState {
            start,
            moved: false,
            ignore: target.is_interactive(),
        });
    }

    pub fn touch_move(&mut self) {
        if let Some(state) = self.state.as_mut() {
            state.moved = true;
        }
    }

    /// Finish the touch sequence at `end`.
    ///
    /// Returns the URL to navigate to, or `None` when the sequence does not
    /// qualify as a tab swipe. A returned URL becomes the new location.
    pub fn touch_end(&mut self, end: TouchPoint) -> Option<Url> {
        let state = self.state.take()?;
        if state.ignore || !state.moved {
            return None;
        }

        let dx = end.x - state.start.x;
        let dy = end.y - state.start.y;
        let direction = classify_swipe(dx, dy, &self.config)?;

        let Some(tab) = self.tabs.neighbor(&self.location, direction) else {
            tracing::debug!("{} is not a tab, ignoring swipe", self.location.path());
            return None;
        };
        let url = tab.url.clone()?;

        tracing::debug!(?direction, from = %self.location, to = %url, "tab swipe");
        self.location = url.clone();
        Some(url)
    }

    /// Replay a complete touch sequence: start, one move, end.
    pub fn swipe(&mut self, start: TouchPoint, end: TouchPoint, target: &TouchTarget) -> Option<Url> {
        self.touch_start(&[start], target);
        if start != end {
            self.touch_move();
        }
        self.touch_end(end)
    }
}
