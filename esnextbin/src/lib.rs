mod app;
pub mod cli;
pub mod defaults;
mod error;
pub mod format;
mod gists;
pub mod logging;
pub mod prompt;
pub mod sketch;

pub use app::build;
pub use error::SketchError;
pub use gists::{SavedGist, SketchGists};
pub use sketch::{Sketch, Visibility};
