//! Templates module
//!
//! Paired `lg`/`sm` documents created and deleted as one unit.

mod operations;
pub mod results;

pub use operations::{
    LARGE_SUFFIX, SMALL_SUFFIX, create_pair, default_pair_content, delete_pair, pair_filenames,
};
pub use results::{PairCreation, PairDeletion};
