//! Presentation helpers shared by the `bookrec` binary.

pub mod display;
