#![allow(dead_code)]

pub(crate) mod test_db;

pub use test_db::*;
