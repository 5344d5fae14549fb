pub mod engine;
pub mod tools;
pub mod cli;
pub mod utils;

pub use engine::*;
pub use tools::*;
pub use cli::*;
pub use utils::*;
