//! Command line front end: a terminal rendering surface driven by scripts

pub mod cli;
pub mod render;
pub mod script;
pub mod startup;
