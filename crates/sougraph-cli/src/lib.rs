pub mod cli;
pub mod fixtures;
pub mod graph_ops;
pub mod symbols;
