#[macro_use]
extern crate log;
#[macro_use]
extern crate derive_builder;
#[macro_use]
extern crate lazy_static;

pub mod catalog;
pub mod cdx;
pub mod server;
pub mod types;
pub mod utils;
