pub mod aggregator;
pub mod catalog;
pub mod classifier;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod gate;
pub mod parser;
pub mod playlist;
pub mod provider;
pub mod sports;
