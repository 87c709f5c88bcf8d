//! Read loop over a terminal surface.

pub mod reader;

pub use reader::LineReader;
