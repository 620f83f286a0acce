pub mod executor;
pub mod grammar;
