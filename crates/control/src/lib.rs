pub mod agent;
pub mod normalize;
pub mod pricing;
pub mod repo;
pub mod sessions;
pub mod tenancy;
pub mod tools;
pub mod workflow;

pub use agent::*;
pub use normalize::*;
pub use pricing::*;
pub use repo::*;
pub use sessions::*;
pub use tenancy::*;
pub use tools::*;
pub use workflow::*;
