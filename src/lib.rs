pub mod analyzers;
pub mod error;
pub mod output;
pub mod record;
pub mod store;
