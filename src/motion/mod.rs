//! Progress and time → transform functions.

pub mod ambient;
pub mod dolly;
pub mod easing;
pub mod helix;
pub mod lighting;
