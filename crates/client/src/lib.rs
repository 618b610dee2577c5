//! Client-side code for reflekt.
//!
//! This crate provides the live fetch pipeline, the offline cache worker and
//! the swipe-to-switch-tab navigator.

pub mod fetch;
pub mod gesture;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network};
pub use gesture::{GestureNavigator, SwipeDirection, TabList, TouchPoint, TouchTarget};
pub use worker::{ActiveWorker, FetchOutcome, FetchSource, Registration, ServiceWorker, Update, WorkerConfig, WorkerState};
