//! Unit tests for the token lifecycle module

mod cleanup_tests;
mod support;
