//! Test suite for the block compiler
//!
//! This module organizes tests into logical groups to help understand
//! different aspects of the block compiler.

#[cfg(test)]
mod filter_tests;
#[cfg(test)]
mod catalog_tests;
#[cfg(test)]
mod property_tests;
#[cfg(test)]
mod project_tests;
