pub mod openai;
pub mod prompts;
pub mod provider;
pub mod speech;

pub use openai::*;
pub use prompts::*;
pub use provider::*;
pub use speech::*;
