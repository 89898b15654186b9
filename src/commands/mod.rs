pub mod completions;
pub mod config;
pub mod render;
pub mod replay;
