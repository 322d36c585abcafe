//! Dataset construction: code book, decoder and cohort file loader.

pub mod codebook;
pub mod decoder;
pub mod loader;

pub use codebook::{CodeBook, CodeTable};
pub use decoder::{DecodeStats, Decoder};
pub use loader::{DataSources, Dataset, LoadSummary, SharedDataset};
