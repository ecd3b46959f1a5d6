pub mod integrity;
pub mod normalize;
