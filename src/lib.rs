//! # attnviz
//!
//! Simulation engine behind an interactive attention tutorial: standard
//! (quadratic-memory) attention next to two tiled variants, plus a synthetic
//! throughput comparison.
//!
//! No tensors are computed here. The engine turns two parameters (sequence
//! length, head dimension) into illustrative estimates and curves, and runs the
//! small periodic state machines that make the diagrams look like they execute.
//! Drawing is left to a host: each panel renders into a declarative [`scene::Scene`].
//!
//! ## Quick Start
//!
//! ```
//! use attnviz::prelude::*;
//!
//! let mut tutorial = Tutorial::new(Configuration::default());
//! tutorial.handle(Event::SelectTab("flash".to_string()));
//! tutorial.handle(Event::SetSequenceLength(1024));
//! tutorial.handle(Event::Elapsed { ms: 3000 });
//!
//! let out = tutorial.render().unwrap();
//! assert_eq!(out.title, "FlashAttention");
//! assert_eq!(tutorial.scheduler().active_count(), 1);
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` (default): `Serialize` for panel output and the JSON [`settings`] document
//!
//! ## Modules
//!
//! - [`config`]: Parameter Store and tab identifiers
//! - [`perf`]: Performance Model
//! - [`clock`]: cancellable periodic tasks and highlight counters
//! - [`panel`]: the parameterized visualization panel
//! - [`router`]: Tab Router
//! - [`tutorial`]: event handling for the whole view

#[path = "core/clock.rs"]
pub mod clock;

#[path = "core/config.rs"]
pub mod config;

#[path = "core/error.rs"]
pub mod error;

#[path = "core/fmt.rs"]
pub mod fmt;

#[path = "core/panel.rs"]
pub mod panel;

#[path = "core/perf.rs"]
pub mod perf;

#[path = "core/router.rs"]
pub mod router;

#[path = "core/scene.rs"]
pub mod scene;

#[cfg(feature = "serde")]
#[path = "core/settings.rs"]
pub mod settings;

#[path = "core/tutorial.rs"]
pub mod tutorial;

pub use error::{Error, Result};

/// Prelude module for convenient imports.
///
/// ```
/// use attnviz::prelude::*;
/// ```
pub mod prelude {
    pub use crate::clock::{AnimationClock, ClockState, Scheduler, TaskHandle, TaskId};
    pub use crate::config::{ConfigChange, Configuration, ParameterStore, TabId};
    pub use crate::panel::{Panel, PanelOutput};
    pub use crate::perf::{PerformanceSeries, SeriesRow, Variant};
    pub use crate::router::TabRouter;
    pub use crate::scene::{Scene, Shape};
    pub use crate::tutorial::{Event, Outcome, Tutorial};
}
