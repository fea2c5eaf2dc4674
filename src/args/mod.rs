//! CLI argument types and parsing helpers.
mod cli;
pub(crate) mod parsers;

#[cfg(test)]
mod tests;

pub use cli::LoadArgs;
pub(crate) use parsers::{parse_duration_arg, parse_header};
