pub mod config;
pub mod model;
pub mod paths;
pub mod report;
