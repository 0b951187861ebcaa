pub mod orchestrator;
pub mod prioritize;
pub mod requestor;
pub mod suggest;
