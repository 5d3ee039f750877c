pub mod builder;
pub mod cfg;
pub mod node;
pub mod transfer;
pub mod tree;
pub mod visit;




#[cfg(test)]
mod transfer_tests;
