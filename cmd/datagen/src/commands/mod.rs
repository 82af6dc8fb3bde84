//! CLI commands module.

mod info;
mod iterate;
mod split;
mod util;

pub use info::InfoCommand;
pub use iterate::IterateCommand;
pub use split::SplitMusanCommand;

pub(crate) use util::*;
