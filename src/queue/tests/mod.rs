//! Test modules for the queue system
//!
//! Organised by functional area.

mod predicates;
