// src/output/mod.rs
// =============================================================================
// Writes the collected tags to disk.
// =============================================================================

mod csv;

pub use self::csv::write_tags;
