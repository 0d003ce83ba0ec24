pub mod duplicate;
pub mod normalize;
