//! Motion-capture marker viewer.
//!
//! Loads a tabular recording into a sanitized [`data::model::MarkerTable`],
//! then keeps a time-series plot of one marker and a 3D scatter of every
//! marker in step as the pointer moves, optionally telling an external
//! render engine which frame is being inspected.

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod error;
pub mod notify;
pub mod state;
pub mod sync;
pub mod ui;
pub mod view;
