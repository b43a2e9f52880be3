#[macro_use]
extern crate serde_derive;
#[macro_use]
extern crate log;

pub mod channel;
pub mod core;
pub mod dag;
pub mod runtime;
