pub mod adapters;
pub mod audit;
pub mod config;
pub mod dashboard;
pub mod determinism;
pub mod relief;
pub mod storage;

pub mod error;
