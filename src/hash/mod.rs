mod sha3_wrapper;

pub use sha3_wrapper::*;
