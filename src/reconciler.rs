//! Merges parsed documentation text with call signatures into renderable records.

use crate::config::Config;
use crate::docstring::{DocstringParser, ParsedDocstring};
use crate::error::{Error, Result};
use crate::registry::Documented;
use crate::signature::SignatureNormalizer;
use serde::Serialize;
use std::collections::BTreeMap;

/// A named description, used for extra-section items, raised errors and examples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionEntry {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// A signature parameter together with its documented description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconciledArgument {
    pub name: String,
    pub kind: String,
    pub annotation: Option<String>,
    pub default: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReconciledReturn {
    pub description: Option<String>,
    pub annotation: Option<String>,
    pub is_generator: bool,
}

/// The callable part of a record; absent for modules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallableRecord {
    pub arguments: Vec<ReconciledArgument>,
    pub returns: ReconciledReturn,
    pub raises: Vec<SectionEntry>,
    pub examples: Vec<SectionEntry>,
    /// Literal signature text
    pub signature: String,
    /// Name followed by the signature text
    pub definition: String,
}

/// Everything a template can render about one entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocRecord {
    pub name: String,
    pub full_description: Option<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_sections: Option<BTreeMap<String, Vec<SectionEntry>>>,
    #[serde(flatten)]
    pub callable: Option<CallableRecord>,
}

/// Builds [`DocRecord`]s according to a [`Config`].
///
/// # Example
///
/// ```
/// use docurator::config::Config;
/// use docurator::reconciler::Reconciler;
/// use docurator::registry::ModuleRecord;
///
/// let module = ModuleRecord::new("math", Some("Numeric helpers.".to_string()));
/// let record = Reconciler::new(&Config::default()).reconcile(&module).unwrap();
/// assert_eq!(record.short_description.as_deref(), Some("Numeric helpers."));
/// assert!(record.callable.is_none());
/// ```
pub struct Reconciler {
    parser: DocstringParser,
    extra_sections: Vec<String>,
}

impl Reconciler {
    pub fn new(config: &Config) -> Self {
        Self {
            parser: DocstringParser::new(config.docstring_format, &config.extra_sections),
            extra_sections: config.extra_sections.clone(),
        }
    }

    /// Parses the entity's documentation and reconciles it with the entity's signature.
    ///
    /// # Errors
    ///
    /// See [`Reconciler::reconcile_parsed`].
    pub fn reconcile(&self, entity: &dyn Documented) -> Result<DocRecord> {
        let parsed = self.parser.parse(entity.docstring());
        self.reconcile_parsed(entity, &parsed)
    }

    /// Reconciles already parsed documentation with the entity's signature.
    ///
    /// Documented parameters that the signature lacks are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingParameterDoc`] for the first signature parameter without a
    /// documented counterpart.
    pub fn reconcile_parsed(&self, entity: &dyn Documented, parsed: &ParsedDocstring) -> Result<DocRecord> {
        let mut record = DocRecord {
            name: entity.name().to_string(),
            full_description: parsed.description(),
            short_description: parsed.short_description.clone(),
            long_description: parsed.long_description.clone(),
            extra_sections: self.extra_sections(parsed),
            callable: None,
        };

        let Some(signature) = entity.signature() else {
            return Ok(record);
        };

        let arguments = SignatureNormalizer::normalize(signature)
            .into_iter()
            .map(|arg| {
                let documented = parsed.param(&arg.name).ok_or_else(|| Error::MissingParameterDoc {
                    entity: entity.name().to_string(),
                    parameter: arg.name.clone(),
                })?;
                Ok(ReconciledArgument {
                    description: documented.description.clone(),
                    name: arg.name,
                    kind: arg.kind,
                    annotation: arg.annotation,
                    default: arg.default,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let returns = ReconciledReturn {
            description: parsed.returns.as_ref().and_then(|r| r.description.clone()),
            annotation: SignatureNormalizer::return_annotation(signature),
            is_generator: parsed.returns.as_ref().is_some_and(|r| r.is_generator),
        };

        record.callable = Some(CallableRecord {
            arguments,
            returns,
            raises: parsed
                .raises
                .iter()
                .map(|raises| SectionEntry {
                    name: raises.type_name.clone(),
                    description: raises.description.clone(),
                })
                .collect(),
            examples: parsed
                .examples
                .iter()
                .map(|example| SectionEntry {
                    name: None,
                    description: example.description.clone(),
                })
                .collect(),
            signature: signature.text.clone(),
            definition: format!("{}{}", entity.name(), signature.text),
        });

        Ok(record)
    }

    fn extra_sections(&self, parsed: &ParsedDocstring) -> Option<BTreeMap<String, Vec<SectionEntry>>> {
        if self.extra_sections.len() <= 1 {
            return None;
        }
        let sections = self
            .extra_sections
            .iter()
            .map(|section| {
                let entries = parsed
                    .meta
                    .iter()
                    .filter(|meta| meta.args.first() == Some(section))
                    .map(|meta| SectionEntry {
                        name: meta.args.get(1).cloned(),
                        description: meta.description.clone(),
                    })
                    .collect();
                (section.clone(), entries)
            })
            .collect();
        Some(sections)
    }
}
