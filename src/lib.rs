pub mod checkpoint;
pub mod config;
pub mod feed;
pub mod notes;
pub mod sync;
pub mod translate;
