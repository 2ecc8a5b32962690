//! Pipeline stages for exam-question extraction.
//!
//! Each submodule implements exactly one transformation step, strictly
//! forward, with no state carried between invocations.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ normalize ──▶ segment ──▶ fields ──▶ classify ──▶ format
//! (path)    (cleanup)    (blocks)    (stem,     (type,       (id, meta)
//!                                     options,   difficulty)
//!                                     answer)
//! ```
//!
//! 1. [`input`]: read a plain-text document or stdin; refuse formats
//!    that need an external reader
//! 2. [`normalize`]: strip headers, page numbers, glyph noise; tidy spacing
//! 3. [`segment`]: split lines into question blocks with a rule-table
//!    boundary predicate
//! 4. [`fields`]: recover the stem, option map and answer key of a block
//! 5. [`classify`]: question type and difficulty tier
//! 6. [`format`]: stamp a UUID, timestamp and schema version

pub mod classify;
pub mod fields;
pub mod format;
pub mod input;
pub mod normalize;
pub mod segment;
