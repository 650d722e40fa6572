//! Integration test support for the relay workspace.

pub mod helpers;

pub use helpers::TestServer;
