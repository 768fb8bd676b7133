//! Host application state for limelight.
//!
//! Everything here is single-threaded by design: a [`HostState`] lives on one
//! dedicated thread and is mutated exclusively by commands delivered through
//! the command bridge. Nothing in this crate spawns tasks, touches the
//! network, or runs subprocesses.

pub mod error;
pub mod service;
pub mod state;
pub mod theme;

pub use {
    error::{Error, Result},
    service::{ItemKind, Service, ServiceItem, Slide},
    state::{CurrentSlide, HostState, ItemSummary, LivePosition},
    theme::{Background, GradientDirection, Theme, ThemeSet},
};
