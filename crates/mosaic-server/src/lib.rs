//! Preview server and source watcher for mosaic sites.
//!
//! Serves a packaged site locally and watches template and fragment sources
//! so the composed page can be rebuilt as they change.

pub mod server;
pub mod watcher;

pub use server::{PreviewConfig, PreviewServer, ServerError};
pub use watcher::{FileWatcher, RecursiveMode, WatchEvent};
