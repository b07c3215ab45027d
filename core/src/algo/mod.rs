//! Decision procedures that work independently of the search engine.

pub mod cc;

pub use cc::{prove_cc, CC};
