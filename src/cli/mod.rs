//! Command Line Interface (CLI) layer for adreframe.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the orchestration logic (`runner`) for single-image and batch
//! reframing. It wires user-provided options to the library functionality
//! exposed via `adreframe::api`.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;
