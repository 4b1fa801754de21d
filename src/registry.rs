//! The documentation registry.
//!
//! [`Registry`] accumulates one [`ModuleRecord`] per module that contains at least one marked
//! object. Free functions and classes live in the module's top-level [`EntitySet`]; methods
//! live in the member set of the class they belong to.
//!
//! Ownership is resolved from the qualified name: an object whose qualified name has more than
//! one dot-separated segment is a member of the class named by all but the last segment.
//! Because a class is only reported after its body (and with it every marked method) has been
//! seen, a member may arrive before its owner. Such members wait in a side cache keyed by
//! `(module, owner qualified name)` and are moved into the class when it is registered.

use crate::error::{Error, Result};
use crate::extractor::{ObjectShape, SourceObject};
use crate::signature::CallSignature;
use log::debug;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::hash::{Hash, Hasher};

/// Base every class implicitly has; never listed among a class's parents.
pub const ROOT_BASE: &str = "Sized";

/// What a registered object is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Function,
    Method,
    Class,
}

/// Read access shared by every documented record.
pub trait Documented {
    /// Unqualified name.
    fn name(&self) -> &str;
    fn docstring(&self) -> Option<&str>;
    /// Call signature, `None` for modules.
    fn signature(&self) -> Option<&CallSignature>;
}

/// Metadata of a function, method or class.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub name: String,
    pub qualname: String,
    pub docstring: Option<String>,
    pub kind: ObjectKind,
    pub signature: CallSignature,
}

/// A class with its parents and registered members.
#[derive(Debug, Clone)]
pub struct ClassRecord {
    pub object: ObjectRecord,
    /// Direct parents without [`ROOT_BASE`]; `None` when there are none.
    pub parents: Option<Vec<String>>,
    pub members: EntitySet,
}

/// A top-level or member entry of the registry.
///
/// Identity is the unqualified name: two entities with the same name are the same entity.
#[derive(Debug, Clone)]
pub enum Entity {
    Object(ObjectRecord),
    Class(ClassRecord),
}

impl Entity {
    pub fn record(&self) -> &ObjectRecord {
        match self {
            Entity::Object(object) => object,
            Entity::Class(class) => &class.object,
        }
    }

    pub fn qualname(&self) -> &str {
        &self.record().qualname
    }

    pub fn kind(&self) -> ObjectKind {
        self.record().kind
    }

    pub fn as_class(&self) -> Option<&ClassRecord> {
        match self {
            Entity::Class(class) => Some(class),
            Entity::Object(_) => None,
        }
    }

    fn as_class_mut(&mut self) -> Option<&mut ClassRecord> {
        match self {
            Entity::Class(class) => Some(class),
            Entity::Object(_) => None,
        }
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for Entity {}

impl Hash for Entity {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state);
    }
}

impl Documented for ObjectRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    fn signature(&self) -> Option<&CallSignature> {
        Some(&self.signature)
    }
}

impl Documented for ClassRecord {
    fn name(&self) -> &str {
        self.object.name()
    }

    fn docstring(&self) -> Option<&str> {
        self.object.docstring()
    }

    fn signature(&self) -> Option<&CallSignature> {
        self.object.signature()
    }
}

impl Documented for Entity {
    fn name(&self) -> &str {
        self.record().name()
    }

    fn docstring(&self) -> Option<&str> {
        self.record().docstring()
    }

    fn signature(&self) -> Option<&CallSignature> {
        self.record().signature()
    }
}

/// A set of entities, unique by name and iterated in name order.
#[derive(Debug, Clone, Default)]
pub struct EntitySet {
    entries: BTreeMap<String, Entity>,
}

impl EntitySet {
    /// Inserts `entity` unless an entity of the same name is already present.
    ///
    /// Returns `false` (keeping the existing entity) on a name clash.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entries.contains_key(entity.name()) {
            debug!("Entity {} already registered, keeping the first one", entity.qualname());
            return false;
        }
        self.entries.insert(entity.name().to_string(), entity);
        true
    }

    pub fn get(&self, name: &str) -> Option<&Entity> {
        self.entries.get(name)
    }

    fn get_mut(&mut self, name: &str) -> Option<&mut Entity> {
        self.entries.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entries.values()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }
}

impl Extend<Entity> for EntitySet {
    fn extend<I: IntoIterator<Item = Entity>>(&mut self, iter: I) {
        for entity in iter {
            self.insert(entity);
        }
    }
}

impl IntoIterator for EntitySet {
    type Item = Entity;
    type IntoIter = std::collections::btree_map::IntoValues<String, Entity>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_values()
    }
}

/// Documentation of one module.
#[derive(Debug, Clone)]
pub struct ModuleRecord {
    pub name: String,
    pub docstring: Option<String>,
    /// Top-level functions and classes
    pub contents: EntitySet,
}

impl ModuleRecord {
    pub fn new(name: impl Into<String>, docstring: Option<String>) -> Self {
        Self {
            name: name.into(),
            docstring,
            contents: EntitySet::default(),
        }
    }

    /// Looks up a registered class by its qualified name, e.g. `Outer.Inner`.
    pub fn get_class(&self, qualname: &str) -> Option<&ClassRecord> {
        let mut segments = qualname.split('.');
        let mut current = self.contents.get(segments.next()?)?.as_class()?;
        for segment in segments {
            current = current.members.get(segment)?.as_class()?;
        }
        Some(current)
    }

    pub fn contains_class(&self, qualname: &str) -> bool {
        self.get_class(qualname).is_some()
    }

    fn get_class_mut(&mut self, qualname: &str) -> Option<&mut ClassRecord> {
        let mut segments = qualname.split('.');
        let mut current = self.contents.get_mut(segments.next()?)?.as_class_mut()?;
        for segment in segments {
            current = current.members.get_mut(segment)?.as_class_mut()?;
        }
        Some(current)
    }
}

impl Documented for ModuleRecord {
    fn name(&self) -> &str {
        &self.name
    }

    fn docstring(&self) -> Option<&str> {
        self.docstring.as_deref()
    }

    fn signature(&self) -> Option<&CallSignature> {
        None
    }
}

/// Collects documentation of marked objects, grouped by module.
///
/// # Example
///
/// ```
/// use docurator::extractor::{ModuleInfo, SourceObject};
/// use docurator::registry::Registry;
/// use docurator::signature::CallSignature;
///
/// let module = ModuleInfo::new("cache", None);
/// let mut registry = Registry::new();
/// registry
///     .add(&SourceObject::function(module.clone(), "Cache.clear", CallSignature::default()))
///     .unwrap();
/// registry
///     .add(&SourceObject::class(module, "Cache", CallSignature::default(), vec![]))
///     .unwrap();
///
/// let class = registry.docs()["cache"].get_class("Cache").unwrap();
/// assert_eq!(class.members.names(), vec!["clear"]);
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    modules: BTreeMap<String, ModuleRecord>,
    /// Members whose owning class has not been registered yet, keyed by (module, owner qualname)
    pending: HashMap<(String, String), EntitySet>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Module name to module record, for everything registered so far.
    pub fn docs(&self) -> &BTreeMap<String, ModuleRecord> {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&ModuleRecord> {
        self.modules.get(name)
    }

    /// Members still waiting for an owner that was never registered.
    pub fn pending(&self) -> impl Iterator<Item = (&str, &str, &EntitySet)> {
        self.pending
            .iter()
            .map(|((module, owner), members)| (module.as_str(), owner.as_str(), members))
    }

    /// Registers a marked object.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotCallable`] if the object cannot be called. The registry is left
    /// untouched in that case.
    pub fn add(&mut self, object: &SourceObject) -> Result<()> {
        let module_name = &object.module.name;
        let owner = owner_of(&object.qualname);

        let mut entity = match &object.shape {
            ObjectShape::Value => {
                return Err(Error::NotCallable(format!("{}::{}", module_name, object.qualname)));
            }
            ObjectShape::Function(signature) => Entity::Object(ObjectRecord {
                kind: if owner.is_some() { ObjectKind::Method } else { ObjectKind::Function },
                ..record_of(object, signature)
            }),
            ObjectShape::Class { signature, bases } => Entity::Class(ClassRecord {
                object: record_of(object, signature),
                parents: parents_of(bases),
                members: EntitySet::default(),
            }),
        };

        let module = self.modules.entry(module_name.clone()).or_insert_with(|| {
            debug!("Creating module record for {}", module_name);
            ModuleRecord::new(module_name.clone(), object.module.docstring.clone())
        });

        // The first registration of a name wins. A rejected class leaves cached members alone.
        let taken = match owner {
            None => module.contents.contains(&object.name),
            Some(owner) => match module.get_class(owner) {
                Some(class) => class.members.contains(&object.name),
                None => self
                    .pending
                    .get(&(module_name.clone(), owner.to_string()))
                    .is_some_and(|members| members.contains(&object.name)),
            },
        };
        if taken {
            debug!("{}::{} is already registered, keeping the first", module_name, object.qualname);
            return Ok(());
        }

        if let Entity::Class(class) = &mut entity {
            let key = (module_name.clone(), object.qualname.clone());
            if let Some(members) = self.pending.remove(&key) {
                debug!(
                    "Claiming {} cached members for {}::{}",
                    members.len(),
                    module_name,
                    object.qualname
                );
                class.members.extend(members);
            }
        }

        debug!("Registering {:?} {}::{}", entity.kind(), module_name, object.qualname);
        match owner {
            None => {
                module.contents.insert(entity);
            }
            Some(owner) => match module.get_class_mut(owner) {
                Some(class) => {
                    class.members.insert(entity);
                }
                None => {
                    debug!("Owner {} not registered yet, caching {}", owner, object.qualname);
                    self.pending
                        .entry((module_name.clone(), owner.to_string()))
                        .or_default()
                        .insert(entity);
                }
            },
        }

        Ok(())
    }
}

fn record_of(object: &SourceObject, signature: &CallSignature) -> ObjectRecord {
    ObjectRecord {
        name: object.name.clone(),
        qualname: object.qualname.clone(),
        docstring: object.docstring.clone(),
        kind: ObjectKind::Class,
        signature: signature.clone(),
    }
}

fn parents_of(bases: &[String]) -> Option<Vec<String>> {
    let parents: Vec<String> = bases
        .iter()
        .filter(|base| base.as_str() != ROOT_BASE)
        .cloned()
        .collect();
    if parents.is_empty() {
        None
    } else {
        Some(parents)
    }
}

/// Qualified name of the owning class, if the object is nested in one.
fn owner_of(qualname: &str) -> Option<&str> {
    qualname.rsplit_once('.').map(|(owner, _)| owner)
}
