pub mod batch;
pub mod cli;
pub mod config;
pub mod disambiguator;
pub mod error;
pub mod export;
pub mod logging;
pub mod output;
pub mod recognizer;
pub mod resolver;
pub mod scanner;
