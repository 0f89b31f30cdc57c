//! Built-in subscription sources: terminal input and repeating timers.

mod terminal;
mod timer;

pub use terminal::*;
pub use timer::*;
