#![crate_name = "secagg"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Secret sharing, Joye-Libert aggregation and its threshold extensions for
//! dropout-tolerant secure aggregation.

mod errors;

pub mod jl;
pub mod lcc;
pub mod prg;
pub mod ss;
pub mod tjl;
pub mod transport;

pub use errors::{Error, ErrorKind, Result};

// Test the source code included in the README.
#[macro_use]
extern crate doc_comment;
doctest!("../README.md");
