mod error;
mod message;
mod pointer;

pub use error::Error;
pub use message::*;
pub use pointer::Pointer;

const RED: &str = "\x1B[31m";
const YELLOW: &str = "\x1B[33m";
const RESET: &str = "\x1B[0m";
