pub mod buffer;
pub mod builder;
pub mod collector_agent;
