pub mod capability;
pub mod lifetime;
pub mod loads;
pub mod media;
