// Core orchestration components
pub mod command_builder;
pub mod result_sink;
pub mod tool_runner;
pub mod batch_driver;

pub use command_builder::*;
pub use result_sink::*;
pub use tool_runner::*;
pub use batch_driver::*;
