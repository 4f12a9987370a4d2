pub mod accumulator;
pub mod chunk;
pub mod compression;
pub mod constants;
pub mod dataset;
pub mod diagnostics;
pub mod error;
pub mod format;
pub mod functions;
pub mod pipeline;
pub mod reader;
pub mod stats;
