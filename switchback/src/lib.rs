//! A mountain-car DQN training loop in Rust.
//!
//! Switchback consists of the following crates:
//!
//! * [switchback-core](https://crates.io/crates/switchback-core) provides basic
//!   traits and functions generic to environments and reinforcement learning
//!   (RL) agents, the episode-driven [`Trainer`] and the in-memory replay
//!   buffer.
//! * [switchback-mountain-car](https://crates.io/crates/switchback-mountain-car)
//!   implements the classic mountain-car control problem as a native
//!   environment with a shaped, threshold-based reward.
//! * [switchback-candle-agent](https://crates.io/crates/switchback-candle-agent)
//!   includes a DQN agent based on [candle](https://crates.io/crates/candle-core).
//! * [switchback](https://crates.io/crates/switchback) glues the above together
//!   for the mountain-car task and carries the runnable example.
//!
//! [`Trainer`]: https://crates.io/crates/switchback-core

pub mod mountain_car;
