pub mod clock;
pub mod config;
pub mod domain;
pub mod engine;
pub mod feed;
pub mod journal;
pub mod monitoring;
pub mod runner;
pub mod state;
pub mod strategy;

pub use domain::{TradeAction, TradeRecord};
pub use strategy::memory::Memory;
pub use strategy::stateful::{PolicyParams, StatefulSwapStrategy};
pub use strategy::SwapPolicy;
