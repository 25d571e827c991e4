pub mod analysis;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod filter;
pub mod flow;
pub mod format;
pub mod logging;
pub mod normalize;
pub mod synth;
pub mod types;
