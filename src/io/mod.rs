//! I/O layer: decoding source images, the target catalog, and output encoders.
pub mod catalog;
pub use catalog::{default_catalog, load_catalog, select_targets};

pub mod reader;
pub use reader::open_source;

pub mod writers;
