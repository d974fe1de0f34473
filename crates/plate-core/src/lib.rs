mod core;
mod marks;
mod normalize;
mod ops;
mod query;
mod value;

pub use crate::core::*;
pub use crate::ops::*;
pub use crate::query::*;
pub use crate::value::*;
