//! Introspection of marked source objects.
//!
//! An [`Introspector`] walks a parsed file and reports every object carrying the documentation
//! marker as a [`SourceObject`]: the metadata the registry needs (name, qualified name,
//! docstring, owning module and call signature), detached from the syntax tree.
//!
//! Objects are reported in evaluation order. A container's marked members are reported before
//! the container itself, so the registry must cope with members that arrive before their owner.
//!
//! # Example
//!
//! ```no_run
//! use docurator::extractor::{Introspector, rust::RustIntrospector};
//! use docurator::parser::AstParser;
//! use docurator::scanner::SourceFile;
//! use std::path::PathBuf;
//!
//! let source = SourceFile::new(PathBuf::from("src/cache.rs"), "cache");
//! let parsed = AstParser::parse_file(&source).unwrap();
//! let objects = RustIntrospector::default().introspect(&parsed);
//! println!("Found {} marked objects", objects.len());
//! ```

pub mod rust;

use crate::parser::ParsedFile;
use crate::signature::CallSignature;

/// Trait for discovering marked objects in parsed source files.
pub trait Introspector {
    /// Returns the marked objects of one file, in evaluation order.
    fn introspect(&self, parsed_file: &ParsedFile) -> Vec<SourceObject>;
}

/// The module an object was defined in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// `::`-joined module path, e.g. `collections::cache`
    pub name: String,
    /// Module level documentation text, if any
    pub docstring: Option<String>,
}

impl ModuleInfo {
    pub fn new(name: impl Into<String>, docstring: Option<String>) -> Self {
        Self {
            name: name.into(),
            docstring,
        }
    }
}

/// What kind of object carries the marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectShape {
    /// A free function or a method.
    Function(CallSignature),
    /// A type that can own methods. `bases` lists its direct parents as written.
    Class {
        signature: CallSignature,
        bases: Vec<String>,
    },
    /// Anything that cannot be called (constants, statics, aliases, ...).
    Value,
}

/// A marked object as seen by the introspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceObject {
    pub module: ModuleInfo,
    /// Unqualified name
    pub name: String,
    /// Dot-joined lexical path, e.g. `Cache.add`
    pub qualname: String,
    pub docstring: Option<String>,
    pub shape: ObjectShape,
}

impl SourceObject {
    /// Create a free function object.
    pub fn function(module: ModuleInfo, qualname: &str, signature: CallSignature) -> Self {
        Self::with_shape(module, qualname, ObjectShape::Function(signature))
    }

    /// Create a class-like object.
    pub fn class(module: ModuleInfo, qualname: &str, signature: CallSignature, bases: Vec<String>) -> Self {
        Self::with_shape(module, qualname, ObjectShape::Class { signature, bases })
    }

    /// Create a non-callable object.
    pub fn value(module: ModuleInfo, qualname: &str) -> Self {
        Self::with_shape(module, qualname, ObjectShape::Value)
    }

    fn with_shape(module: ModuleInfo, qualname: &str, shape: ObjectShape) -> Self {
        let name = qualname.rsplit('.').next().unwrap_or(qualname).to_string();
        Self {
            module,
            name,
            qualname: qualname.to_string(),
            docstring: None,
            shape,
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn is_callable(&self) -> bool {
        !matches!(self.shape, ObjectShape::Value)
    }

    pub fn is_class(&self) -> bool {
        matches!(self.shape, ObjectShape::Class { .. })
    }
}
