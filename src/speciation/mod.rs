//! [H+] solvers and the batch layer built on them.

pub mod dispatch;
pub mod isotopes;
pub mod pairs;
pub mod system;
pub mod zero;
