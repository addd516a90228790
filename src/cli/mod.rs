//! The minicoind command-line interface

pub mod commands;
pub mod shell;

pub use commands::run_cli;
