//! Bookclub application library
//!
//! Holds the domain modules mounted by the `bookclub-app` server and shared with the `bookclub`
//! terminal client.

pub mod modules;
pub mod utils;

/// Re-export commonly used types
pub use modules::*;
