//! minutes-chat: a terminal client for asking questions about meeting minutes.

pub mod backend;
pub mod cli;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
