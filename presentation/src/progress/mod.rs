//! Run progress display

pub mod reporter;
