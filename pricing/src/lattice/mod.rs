pub mod binomial;

pub use binomial::{BinomialTree, LatticeParameters};
