pub mod backdrop;
pub mod compose;
pub mod detect;
pub mod enhance;
pub mod ops;
pub mod padding;
pub mod pipeline;
pub mod plan;
pub mod resize;
pub mod saliency;
pub mod save;
