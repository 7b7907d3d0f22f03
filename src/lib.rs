pub mod blend;
pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod estimator;
pub mod injury;
pub mod logging;
pub mod model;
pub mod payload;
pub mod profile;
pub mod source;
pub mod stats;
pub mod sweep;
pub mod synthetic;
