pub mod common;
pub mod subscription;

pub use common::*;
pub use subscription::*;
