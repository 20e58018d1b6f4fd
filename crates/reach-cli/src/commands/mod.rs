pub mod completions;
pub mod validate;
pub mod zones;
