//! Small helpers shared across modules.

mod inflection;

pub use inflection::underscore;
