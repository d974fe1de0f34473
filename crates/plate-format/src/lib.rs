mod blocks;
mod dispatcher;
mod engine;
mod format;
mod keys;
mod marks;

pub use crate::blocks::*;
pub use crate::dispatcher::*;
pub use crate::engine::*;
pub use crate::format::*;
pub use crate::keys::*;
pub use crate::marks::*;

pub use plate_core::{BlockKind, Mark, Marks};
