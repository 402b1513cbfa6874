//! # pedalboard-core
//!
//! Backend library for the pedalboard control surface. Turns menu presses,
//! foot-controller CC messages and OSC messages into `Action`s and runs them
//! against the loop switcher, the loop engine and the recorder/player
//! processes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pedalboard_core::app::{check_environment, App, AppOptions};
//! use pedalboard_core::config::Config;
//! use pedalboard_core::types::Action;
//!
//! let config = Config::load();
//! check_environment(&config.startup())?;
//! let app = App::start(&config, AppOptions::default())?;
//!
//! // Any input source dispatches through the same handle
//! app.dispatcher().dispatch(Action::TriggerPreset(1));
//!
//! app.shutdown_signal().wait_timeout(std::time::Duration::from_secs(1));
//! app.shutdown();
//! ```
//!
//! ## Module Overview
//!
//! - [`app`] — `App` wiring, startup checks, `ShutdownSignal`, ordered teardown
//! - [`dispatch`] — `ActionDispatcher`, the single routing point for every input
//! - [`loops`] — loop toggles and preset recall over MIDI CC
//! - [`transport`] — loop engine transport over OSC
//! - [`process`] — supervised recorder, player and loop engine processes
//! - [`midi`] / [`osc`] — input sources
//! - [`ipc`] — local TCP endpoint for a companion web server
//! - [`menu`] / [`labels`] — the menu model and live label text
//! - [`config`] — TOML configuration (embedded defaults + user override)

pub use pedalboard_types as types;

pub mod app;
pub mod cc;
pub mod config;
pub mod dispatch;
pub mod ipc;
pub mod labels;
pub mod loops;
pub mod menu;
pub mod midi;
pub mod osc;
pub mod probe;
pub mod process;
pub mod tools;
pub mod transport;
