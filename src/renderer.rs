//! Record trees and template rendering.
//!
//! [`Renderer`] reconciles every registered entity into a [`ModuleDocs`] tree and renders
//! that tree through the configured templates. Templates are Jinja, evaluated by `minijinja`
//! against the serialized record: undefined and `none` values render empty, and trailing
//! newlines are kept so entity documents concatenate line by line.

use crate::config::{Config, TemplateKind, TemplateSet};
use crate::error::{Error, Result};
use crate::reconciler::{DocRecord, Reconciler};
use crate::registry::{Entity, ModuleRecord, ObjectKind, Registry};
use log::debug;
use minijinja::{Environment, UndefinedBehavior, Value};
use serde::Serialize;

/// Documentation of one registered entity and, for classes, its members.
#[derive(Debug, Clone, Serialize)]
pub struct EntityDocs {
    pub qualname: String,
    pub kind: ObjectKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parents: Option<Vec<String>>,
    #[serde(flatten)]
    pub record: DocRecord,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<EntityDocs>,
}

/// Documentation of one module and its top-level entities, in name order.
#[derive(Debug, Clone, Serialize)]
pub struct ModuleDocs {
    #[serde(flatten)]
    pub record: DocRecord,
    pub entities: Vec<EntityDocs>,
}

/// Turns registry contents into records and rendered documents.
pub struct Renderer {
    reconciler: Reconciler,
    env: Environment<'static>,
}

impl Renderer {
    /// Compiles every template of the set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Template`] naming the first malformed template.
    pub fn new(config: &Config, templates: &TemplateSet) -> Result<Self> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_keep_trailing_newline(true);
        env.set_formatter(|out, state, value| {
            if value.is_none() {
                Ok(())
            } else {
                minijinja::escape_formatter(out, state, value)
            }
        });
        for kind in TemplateKind::ALL {
            env.add_template_owned(kind.name().to_string(), templates.get(kind).to_string())
                .map_err(|e| Error::Template(format!("{} template: {}", kind, e)))?;
        }
        Ok(Self {
            reconciler: Reconciler::new(config),
            env,
        })
    }

    /// Reconciles every module of the registry.
    pub fn documents(&self, registry: &Registry) -> Result<Vec<ModuleDocs>> {
        registry.docs().values().map(|module| self.document(module)).collect()
    }

    /// Reconciles one module and everything registered in it.
    ///
    /// # Errors
    ///
    /// Propagates [`Error::MissingParameterDoc`] from the reconciler.
    pub fn document(&self, module: &ModuleRecord) -> Result<ModuleDocs> {
        debug!("Reconciling module {}", module.name);
        Ok(ModuleDocs {
            record: self.reconciler.reconcile(module)?,
            entities: module
                .contents
                .iter()
                .map(|entity| self.entity(entity))
                .collect::<Result<_>>()?,
        })
    }

    fn entity(&self, entity: &Entity) -> Result<EntityDocs> {
        let (parents, members) = match entity.as_class() {
            Some(class) => (
                class.parents.clone(),
                class
                    .members
                    .iter()
                    .map(|member| self.entity(member))
                    .collect::<Result<_>>()?,
            ),
            None => (None, Vec::new()),
        };
        Ok(EntityDocs {
            qualname: entity.qualname().to_string(),
            kind: entity.kind(),
            parents,
            record: self.reconciler.reconcile(entity)?,
            members,
        })
    }

    /// Renders the module template followed by every entity's template.
    pub fn render(&self, docs: &ModuleDocs) -> Result<String> {
        let mut output = self.render_with(TemplateKind::Module, &docs.record)?;
        for entity in &docs.entities {
            self.render_entity(entity, &mut output)?;
        }
        Ok(output)
    }

    fn render_entity(&self, entity: &EntityDocs, output: &mut String) -> Result<()> {
        let kind = match entity.kind {
            ObjectKind::Function => TemplateKind::Function,
            ObjectKind::Method => TemplateKind::Method,
            ObjectKind::Class => TemplateKind::Class,
        };
        output.push('\n');
        output.push_str(&self.render_with(kind, entity)?);
        for member in &entity.members {
            self.render_entity(member, output)?;
        }
        Ok(())
    }

    fn render_with<T: Serialize>(&self, kind: TemplateKind, value: &T) -> Result<String> {
        self.env
            .get_template(kind.name())
            .and_then(|template| template.render(Value::from_serialize(value)))
            .map_err(|e| Error::Template(format!("{} template: {}", kind, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{ModuleInfo, SourceObject};
    use crate::signature::{CallSignature, Parameter, ParameterKind, TypeExpr};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_renders_class_with_members() {
        let module = ModuleInfo::new("cache", Some("Caches.".to_string()));
        let mut registry = Registry::new();
        let key = Parameter::new("key", ParameterKind::PositionalOnly, Some(TypeExpr::named("String")));
        registry
            .add(
                &SourceObject::function(
                    module.clone(),
                    "Cache.add",
                    CallSignature {
                        parameters: vec![key],
                        return_annotation: None,
                        text: "(&mut self, key: String)".to_string(),
                    },
                )
                .with_docstring("Adds a key.\n\nArgs:\n    key: The key."),
            )
            .unwrap();
        registry
            .add(
                &SourceObject::class(module, "Cache", CallSignature::default(), vec![])
                    .with_docstring("A cache."),
            )
            .unwrap();

        let renderer = Renderer::new(&Config::default(), &TemplateSet::default()).unwrap();
        let docs = renderer.documents(&registry).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].entities[0].members[0].qualname, "Cache.add");

        let output = renderer.render(&docs[0]).unwrap();
        let module_at = output.find("# Module `cache`").unwrap();
        let class_at = output.find("## Class `Cache`").unwrap();
        let method_at = output.find("### Method `Cache.add`").unwrap();
        assert!(module_at < class_at && class_at < method_at);
        assert!(output.contains("- `key` (`String`): The key."));
    }

    #[test]
    fn test_custom_template_is_used() {
        let mut templates = TemplateSet::default();
        templates.set(TemplateKind::Module, "{{ name }}|");
        templates.set(TemplateKind::Function, "{{ definition }}|");
        let module = ModuleInfo::new("math", None);
        let mut registry = Registry::new();
        registry
            .add(&SourceObject::function(
                module,
                "zero",
                CallSignature {
                    text: "() -> u8".to_string(),
                    ..CallSignature::default()
                },
            ))
            .unwrap();

        let renderer = Renderer::new(&Config::default(), &templates).unwrap();
        let docs = renderer.documents(&registry).unwrap();
        assert_eq!(renderer.render(&docs[0]).unwrap(), "math|\nzero() -> u8|");
    }

    #[test]
    fn test_module_extra_sections_render_in_name_order() {
        let module = ModuleInfo::new(
            "cache",
            Some("Caches.\n\nUsage:\n    lru: Least recently used.\n    fifo\n\nClasses:\n    Cache: A cache.".to_string()),
        );
        let mut registry = Registry::new();
        registry
            .add(&SourceObject::function(module, "zero", CallSignature::default()))
            .unwrap();

        let renderer = Renderer::new(&Config::default(), &TemplateSet::default()).unwrap();
        let docs = renderer.documents(&registry).unwrap();
        let output = renderer.render(&docs[0]).unwrap();

        let classes_at = output.find("## Classes").unwrap();
        let usage_at = output.find("## Usage").unwrap();
        assert!(classes_at < usage_at);
        assert!(output.contains("- **lru**: Least recently used.\n"));
        assert!(output.contains("- **fifo**\n"));
        assert!(!output.contains("none"));
        assert!(!output.contains("## Functions"));
    }

    #[test]
    fn test_broken_template_names_kind() {
        let mut templates = TemplateSet::default();
        templates.set(TemplateKind::Method, "{% if x %}");
        let err = Renderer::new(&Config::default(), &templates).err().unwrap();
        assert!(err.to_string().contains("method template"));
    }
}
