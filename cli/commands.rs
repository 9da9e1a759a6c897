pub mod bundle;
pub mod completion;
pub mod config;
pub mod debug;
pub mod files;
pub mod generate;
