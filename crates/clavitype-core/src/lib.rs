//! clavitype-core - recognition engine for Clavitype
//!
//! Clavitype turns a MIDI musical keyboard into a text-input device: single
//! piano keys type letters, two-note intervals fire punctuation and editing
//! keys, and triads switch the active input mode (major = letters, minor =
//! commands, augmented = numbers).
//!
//! This crate is the engine only. It consumes raw MIDI note events plus a
//! periodic tick, and drives a [`KeystrokeSink`] with the resolved output
//! actions. Device I/O and OS-level keystroke synthesis live in the
//! `clavitype-cli` binary crate.
//!
//! # Usage as a Library
//!
//! ```
//! use clavitype_core::{NullSink, Recognizer, RecognizerSettings};
//! use std::time::Instant;
//!
//! let mut engine = Recognizer::new(RecognizerSettings::default(), Box::new(NullSink));
//!
//! // Feed raw MIDI messages as they arrive, and tick periodically so that
//! // chords held under the hold key settle once their quiet window passes.
//! engine.handle_message(0x90, 42, 64, Instant::now()); // taps space
//! engine.tick(Instant::now());
//! ```

pub mod action;
pub mod chords;
pub mod config;
pub mod error;
pub mod keys;
pub mod layout;
pub mod recognizer;
pub mod registry;

// Re-export main types
pub use action::{Key, KeystrokeSink, Modifier, NullSink, OutputAction};
pub use config::Config;
pub use error::{Error, Result};
pub use layout::InputMode;
pub use recognizer::{Recognizer, RecognizerSettings};
pub use registry::{KeyRegistry, KeyState};
