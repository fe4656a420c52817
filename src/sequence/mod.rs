//! Sequence assembly - turns still frames plus loop settings into the exact
//! ordered frame stream a container holds.

mod assembler;
mod countdown;

pub use assembler::*;
pub use countdown::*;
