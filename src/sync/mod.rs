//! Interactive synchronization between the time-series and 3D views.
//!
//! A pointer position flows through [`resolver`] (position → frame index),
//! [`validator`] (frame → renderable markers) and [`controller`], which
//! updates the 3D view and forwards a throttled notification.

pub mod controller;
pub mod outcome;
pub mod resolver;
pub mod throttle;
pub mod validator;

pub use controller::{FrameUpdate, Notification, SyncController, SyncSettings, SyncState};
pub use outcome::Outcome;
