#[macro_use] extern crate log;
#[macro_use] extern crate serde_derive;
extern crate bitcoin;
extern crate sha2;
extern crate ripemd;

pub mod errors;
pub mod vault;
