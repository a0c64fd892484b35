//! Whole-tree tests, driven through the public surface: chain dispatch,
//! lifecycle ordering, resolver pooling, retained visuals, and value
//! plumbing.

mod chains;
mod fixtures;
mod retained;
mod values;
