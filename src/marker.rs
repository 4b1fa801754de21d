//! The opt-in documentation marker.
//!
//! A [`Marker`] is built once per run from an operating mode. In an active mode (`doc`,
//! `document`) every marked object is handed to the registry; in an inert mode (`production`,
//! `prod`) marking does nothing. Either way the object itself is returned unchanged.

use crate::error::{Error, Result};
use crate::extractor::SourceObject;
use crate::registry::Registry;
use log::info;
use std::fmt;
use std::str::FromStr;

/// Operating mode of the marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Marked objects are registered.
    Document,
    /// Marking is a no-op.
    Production,
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "doc" | "document" => Ok(Mode::Document),
            "production" | "prod" => Ok(Mode::Production),
            other => Err(Error::InvalidMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Mode::Document => write!(f, "document"),
            Mode::Production => write!(f, "production"),
        }
    }
}

/// Applies the documentation mark to objects.
#[derive(Debug, Clone, Copy)]
pub struct Marker {
    mode: Mode,
}

impl Marker {
    /// Builds a marker for the given mode name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidMode`] for an unrecognized mode.
    pub fn new(mode: &str) -> Result<Self> {
        let mode: Mode = mode.parse()?;
        match mode {
            Mode::Production => info!("In production setting docurator does nothing."),
            Mode::Document => info!("In {} setting docurator collects documentation.", mode),
        }
        Ok(Self { mode })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Marks `object`, registering it when the marker is active, and hands it back.
    ///
    /// Applying the mark to the same object twice is not supported.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::NotCallable`] from the registry.
    pub fn apply<'o>(&self, registry: &mut Registry, object: &'o SourceObject) -> Result<&'o SourceObject> {
        if self.mode == Mode::Document {
            registry.add(object)?;
        }
        Ok(object)
    }
}
