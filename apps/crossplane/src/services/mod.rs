pub mod placement;
pub mod play;
pub mod sync;
pub mod validation;
