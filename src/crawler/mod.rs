//! Browser-driven comment loading
//!
//! [`surface`] defines what the crawler needs from a rendering engine,
//! [`scroll`] decides how far to load a comment list, and [`orchestrator`]
//! runs the per-video sequence. [`browser`] is the Chrome implementation.

#[cfg(feature = "browser")]
pub mod browser;
pub mod orchestrator;
pub mod scroll;
pub mod surface;

#[cfg(feature = "browser")]
pub use browser::ChromeSurface;
pub use orchestrator::{run_session, Orchestrator, VideoOutcome};
pub use scroll::{load_comments, Phase, ScrollController, ScrollReport, ScrollState, Terminal};
pub use surface::{RenderSurface, SurfaceError, SurfaceResult};
