mod config;
mod content;
mod detail;
mod events;
mod messaging;
mod platform;
mod preview;
mod util;

#[cfg(test)]
mod testing;

pub use config::*;
pub use content::*;
pub use detail::*;
pub use events::*;
pub use messaging::*;
pub use platform::*;
pub use preview::*;
pub use util::*;
