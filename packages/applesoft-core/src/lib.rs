#[macro_use]
extern crate bitflags;

pub mod basic;
pub mod bindings;
pub mod devices;
pub mod float;
