//! Signal Playground - synthetic signal datasets with click-driven windowing.
//!
//! This library serves a handful of three-channel datasets (time-domain
//! signals, FFT and PSD spectra, filtered signals and a 3D accelerometer
//! trace) and selects display windows out of them in response to chart
//! clicks, a window-size slider and a reset action.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Signal Playground                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │  Datasets   │──▶│ DataSource  │──▶│  Windowing  │       │
//! │  │ (generate)  │   │ (Arc<Series>)│  │  (compute)  │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │                                             ▲               │
//! │                                             │               │
//! │  ┌─────────────┐                     ┌─────────────┐       │
//! │  │  Activity   │◀────────────────────│ WindowState │       │
//! │  │    Log      │                     │ (per session)│      │
//! │  └─────────────┘                     └─────────────┘       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use signal_playground::core::{WindowSize, WindowState};
//! use signal_playground::datasets::{DataSource, DatasetStore};
//!
//! let store = DatasetStore::generate(Some(42)).unwrap();
//!
//! let state = WindowState::default().on_click(1.0, "signal");
//! let series = store.fetch(&state.active_series).unwrap();
//! let window = state.window(&series);
//!
//! assert!(window.len() < series.len());
//! assert!(window.describe().starts_with("Windowed view: signal"));
//!
//! let state = state.on_slider_change(WindowSize::new(1.5).unwrap()).on_reset();
//! assert_eq!(state.active_series, "accelerometer");
//! assert_eq!(state.window_size.get(), 1.5);
//! ```

pub mod activity;
pub mod config;
pub mod core;
pub mod datasets;

#[cfg(feature = "server")]
pub mod server;
#[cfg(feature = "server")]
pub mod sessions;

// Re-export key types at crate root for convenience
pub use activity::{ActivityLog, ActivityTotals, Interaction};
pub use config::{Config, ConfigError};
pub use core::{
    compute_window, describe_window, Series, Window, WindowError, WindowSize, WindowState,
};
pub use datasets::{DataSource, DatasetKind, DatasetStore, JsonFileSource};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
