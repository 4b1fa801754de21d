//! Host-neutral call signatures and their normalization into serializable argument descriptors.
//!
//! The introspector describes every documented callable with a [`CallSignature`]: an ordered
//! parameter list plus a return annotation. [`SignatureNormalizer`] turns that structure into
//! stable, template-friendly labels.

use serde::{Deserialize, Serialize};

/// Token used for a parameter whose default is the absence value.
pub const OPTIONAL: &str = "optional";

/// How an argument is passed to a callable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    PositionalOnly,
    PositionalOrKeyword,
    VarPositional,
    KeywordOnly,
    VarKeyword,
}

impl ParameterKind {
    /// Human readable label, e.g. `Positional or keyword`.
    pub fn label(self) -> &'static str {
        match self {
            ParameterKind::PositionalOnly => "Positional only",
            ParameterKind::PositionalOrKeyword => "Positional or keyword",
            ParameterKind::VarPositional => "Variadic positional",
            ParameterKind::KeywordOnly => "Keyword only",
            ParameterKind::VarKeyword => "Variadic keyword",
        }
    }
}

/// Default value of a parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DefaultValue {
    /// The parameter must always be supplied.
    Required,
    /// The parameter may be left out and then holds the absence value.
    Absent,
    /// The parameter may be left out and then holds the given value.
    Value(String),
}

/// A type expression as surfaced by the introspector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// No annotation, or the unit type.
    Empty,
    /// A (possibly generic) named type. Only the final path segment is kept.
    Named { name: String, args: Vec<TypeExpr> },
    Reference { mutable: bool, inner: Box<TypeExpr> },
    Slice(Box<TypeExpr>),
    Array { elem: Box<TypeExpr>, len: String },
    Tuple(Vec<TypeExpr>),
    /// Anything the introspector cannot break down, kept as source text.
    Opaque(String),
}

impl TypeExpr {
    /// Shorthand for a named type without type arguments.
    pub fn named(name: impl Into<String>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Shorthand for a generic named type.
    pub fn generic(name: impl Into<String>, args: Vec<TypeExpr>) -> Self {
        TypeExpr::Named {
            name: name.into(),
            args,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            TypeExpr::Empty => true,
            TypeExpr::Tuple(elems) => elems.is_empty(),
            TypeExpr::Opaque(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

/// A single declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    pub kind: ParameterKind,
    pub annotation: Option<TypeExpr>,
    pub default: DefaultValue,
}

impl Parameter {
    /// A required parameter of the given kind.
    pub fn new(name: impl Into<String>, kind: ParameterKind, annotation: Option<TypeExpr>) -> Self {
        Self {
            name: name.into(),
            kind,
            annotation,
            default: DefaultValue::Required,
        }
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = default;
        self
    }
}

/// Ordered parameter list and return annotation of a callable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CallSignature {
    pub parameters: Vec<Parameter>,
    pub return_annotation: Option<TypeExpr>,
    /// Literal signature text in the host's own syntax, e.g. `(&self, key: &str) -> bool`.
    pub text: String,
}

/// Normalized, serializable form of one parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArgumentDescriptor {
    pub name: String,
    pub kind: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
}

/// Converts call signatures into argument descriptors and type labels.
pub struct SignatureNormalizer;

impl SignatureNormalizer {
    /// Produces one descriptor per parameter, in declaration order.
    pub fn normalize(signature: &CallSignature) -> Vec<ArgumentDescriptor> {
        signature
            .parameters
            .iter()
            .map(|param| ArgumentDescriptor {
                name: param.name.clone(),
                kind: param.kind.label().to_string(),
                annotation: param.annotation.as_ref().and_then(Self::annotation),
                default: Self::default_presentation(&param.default),
            })
            .collect()
    }

    /// Label of the return annotation, absent for `()` or no annotation.
    pub fn return_annotation(signature: &CallSignature) -> Option<String> {
        signature.return_annotation.as_ref().and_then(Self::annotation)
    }

    /// Normalizes a type expression to a label.
    ///
    /// Unparameterized types render as their bare name and generic types as
    /// `Outer[Inner1, Inner2]`. Empty annotations yield `None`.
    pub fn annotation(ty: &TypeExpr) -> Option<String> {
        if ty.is_empty() {
            return None;
        }
        Some(Self::render(ty))
    }

    fn render(ty: &TypeExpr) -> String {
        match ty {
            TypeExpr::Empty => "()".to_string(),
            TypeExpr::Named { name, args } if args.is_empty() => name.clone(),
            TypeExpr::Named { name, args } => {
                let inner: Vec<String> = args.iter().map(Self::render).collect();
                format!("{}[{}]", name, inner.join(", "))
            }
            TypeExpr::Reference { mutable, inner } => {
                let prefix = if *mutable { "&mut " } else { "&" };
                format!("{}{}", prefix, Self::render(inner))
            }
            TypeExpr::Slice(elem) => format!("[{}]", Self::render(elem)),
            TypeExpr::Array { elem, len } => format!("[{}; {}]", Self::render(elem), len),
            TypeExpr::Tuple(elems) => {
                let inner: Vec<String> = elems.iter().map(Self::render).collect();
                format!("({})", inner.join(", "))
            }
            TypeExpr::Opaque(text) => text.clone(),
        }
    }

    fn default_presentation(default: &DefaultValue) -> Option<String> {
        match default {
            DefaultValue::Required => None,
            DefaultValue::Absent => Some(OPTIONAL.to_string()),
            DefaultValue::Value(value) => Some(format!("{}: default = {}", OPTIONAL, value)),
        }
    }
}
