#![allow(dead_code)]

pub mod builders;
pub mod server;
pub mod strategies;
