#![crate_name = "secagg_math"]
#![crate_type = "lib"]
#![warn(missing_docs, unused_imports)]

//! Mathematical utilities for the secagg library.

mod errors;

pub mod fdh;
pub mod modular;
pub mod zp;

pub use errors::{Error, Result};
