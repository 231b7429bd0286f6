mod client;
mod page;
mod search;

pub use client::*;
pub use page::*;
pub use search::*;
