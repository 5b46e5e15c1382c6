pub mod clean;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod extract;
pub mod fs_util;
pub mod geo;
pub mod organism;
pub mod output;
pub mod pipeline;
pub mod quality;
pub mod source;
pub mod store;
pub mod table;
