pub mod escape;
pub mod surface;
