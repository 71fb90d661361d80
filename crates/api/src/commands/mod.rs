//! Commands - presentation surface to backend bridge

mod filters;
mod tracking;

pub use filters::*;
pub use tracking::*;
