pub mod partitioner;
pub mod processor;
pub mod runtime;
