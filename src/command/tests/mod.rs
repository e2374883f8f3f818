//! Test modules for the command pipeline

mod commands;
mod signals;
