pub mod image;
pub mod providers;
