pub mod audit;
pub mod config;
pub mod error;
pub mod logging;
pub mod parser;
pub mod pin;
pub mod scan;
