pub mod carousel;
pub mod config;
