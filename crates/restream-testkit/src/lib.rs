//! # Restream Testkit
//!
//! Fixtures for exercising the transfer protocol in tests:
//!
//! - [`TestServer`]: a real server on an ephemeral port, running in a
//!   background task, with its session store exposed for assertions.
//! - [`DropProxy`]: a TCP proxy that severs its first connection after
//!   forwarding a fixed number of frames, so resumption can be triggered
//!   deterministically at any split point.

pub mod fixtures;
pub mod proxy;

pub use fixtures::TestServer;
pub use proxy::DropProxy;
