pub mod fixtures;
pub mod http_client;
pub mod mocks;

pub use fixtures::*;
pub use http_client::*;
pub use mocks::*;
