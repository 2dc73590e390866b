pub mod scroll;
pub mod transition;
pub mod tween;
