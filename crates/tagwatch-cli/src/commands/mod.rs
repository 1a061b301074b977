pub mod baseline;
pub mod compare;
pub mod validate;
