//! Build pipeline for mosaic sites.
//!
//! Assembles the single-page document from section fragments and packages it
//! with its assets into a deployable directory.

pub mod artifacts;
pub mod assembler;
pub mod assets;
pub mod packager;

pub use assembler::{
    compose, AssembleConfig, AssembleError, Assembler, AssemblyReport, Locator, Slot, SlotOutcome,
};
pub use packager::{PackageConfig, PackageError, PackageResult, Packager, DEFAULT_SITE_URL};
