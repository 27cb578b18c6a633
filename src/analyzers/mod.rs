//! Analytical transformations over antenna records.
//!
//! Each analyzer is a pure function of the input records. The pipeline runs
//! them over one dataset and bundles their tables for presentation or
//! storage.

pub mod cluster;
pub mod coverage;
pub mod delay;
pub mod leadership;
pub mod pipeline;
pub mod summary;
pub mod technology;
pub mod types;
pub mod utility;
