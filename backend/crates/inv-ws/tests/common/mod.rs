#![allow(unused_imports)]

pub(crate) mod test_server;

pub use test_server::*;
