//! Default values and protocol constants

mod constants;

pub use constants::*;
