pub mod file_filter;
pub mod walker;

pub use file_filter::FileFilter;
pub use walker::{resolve_source_dir, CollectedFile, Collection, Collector};
