// Tool catalog, phases and process execution
pub mod phase;
pub mod tool_spec;
pub mod executor;
pub mod mock_executor;
pub mod dependency;

pub use phase::*;
pub use tool_spec::*;
pub use executor::*;
pub use mock_executor::*;
pub use dependency::*;
