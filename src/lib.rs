// src/lib.rs

pub mod chrome;
pub mod config;
pub mod emit;
pub mod fetch;
pub mod firefox;
pub mod pipeline;
pub mod timeline;
pub mod windows;

pub use config::Config;
pub use fetch::{Fetcher, HttpFetcher};
pub use pipeline::{run, RunSummary};
pub use timeline::ReleaseRecord;
pub use windows::UpdateRow;
