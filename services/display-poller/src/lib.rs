pub mod client;
pub mod config;
pub mod display;
pub mod lcd;
pub mod poller;
pub mod types;

pub use client::{FetchError, ReadingClient};
pub use config::{Backend, PollerConfig};
pub use display::{ConsoleDisplay, Display, DisplayError};
pub use lcd::Hd44780;
pub use poller::{PollError, Poller};
pub use types::{Reading, render};
