//! # pedalboard-types
//!
//! Shared type definitions for the pedalboard control surface.
//! This crate holds the plain data that flows between input sources, the
//! dispatcher and the handlers: the closed `Action` set, the foot-controller
//! mapping table, presets, the drum library, the recording sequence, and the
//! narrow capability traits handlers receive at construction.

pub mod action;
pub mod dispatch;
mod library;
pub mod mapping;
mod preset;
mod recording;

pub use action::{Action, PassthroughKind, TransportVerb};
pub use dispatch::{Dispatcher, LabelSink, MidiInputControl, Shutdownable};
pub use library::{DrumLibrary, Track};
pub use mapping::{ControlChange, MappingError, MidiMapping, MidiMappingTable};
pub use preset::{LoopState, Preset, PresetError, PresetTable, LOOP_COUNT};
pub use recording::RecordingSequence;
