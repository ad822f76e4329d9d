//! Paths used by the code generated by `#[derive(Injectable)]`

pub use alloc::vec;
pub use alloc::vec::Vec;
