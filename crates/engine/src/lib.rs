// contribart-engine: commit scheduling and publishing over git.

pub mod config;
pub mod error;
pub mod git;
pub mod painter;
pub mod publisher;
pub mod scheduler;
pub mod state;

pub use error::PaintError;
pub use painter::{PaintReport, PaintRequest, Painter};
pub use scheduler::{Anchor, CancellationToken};
