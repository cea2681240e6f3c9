pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod pipeline;
pub mod scanner;
pub mod snapshot;
pub mod viewer;

pub use error::{FlagColorsError, Result};
pub use flag_colors_common::{FlagState, Palette, Snapshot};
