//! Core functionality for the signal playground.
//!
//! This module contains:
//! - The series data model and its JSON wire form
//! - The windowing engine and the interactive window state
//! - The error conditions shared by both

pub mod error;
pub mod series;
pub mod windowing;

// Re-export commonly used types
pub use error::WindowError;
pub use series::{AxisData, AxisKind, Series, SeriesData, SeriesPayload, CHANNEL_COUNT};
pub use windowing::{
    compute_window, describe_window, Window, WindowPayload, WindowSize, WindowState,
    DEFAULT_SERIES, DEFAULT_WINDOW_SIZE,
};
