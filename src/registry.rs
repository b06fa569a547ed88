//! Per-type field registries.
//!
//! A registry is built once per struct type from `Mapped::register`, then
//! published as a `&'static` for the rest of the process. After publication it
//! is never mutated, so mapping passes on any thread read it freely; the lock
//! below only guards the build-and-publish step.
use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::marker::PhantomData;
use std::sync::{PoisonError, RwLock};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde_json::Value;

use crate::describe::Definitions;
use crate::error::MapError;
use crate::field::FieldValue;
use crate::kind::FieldKind;
use crate::options::FieldOption;
use crate::path::FieldPath;

/// A struct type bound to JSON objects.
///
/// `register` declares one binding per serialized member; members without a
/// binding are skipped in both directions.
pub trait Mapped: Default + 'static {
    const NAME: &'static str;

    fn register(fields: &mut Fields<Self>) -> Result<(), MapError>;
}

// ———————————————————————————————————————————————————————————————————————————— //
// BINDINGS
// ———————————————————————————————————————————————————————————————————————————— //

pub(crate) type Getter<T, F> = Box<dyn Fn(&T) -> &F + Send + Sync>;
pub(crate) type Setter<T, F> = Box<dyn Fn(&mut T) -> &mut F + Send + Sync>;

/// A converted and validated value waiting to be written into its member.
pub(crate) type Staged<'a, T> = Box<dyn FnOnce(&mut T) + 'a>;

/// Type-erased view of one member binding. Implemented by `Member` in
/// `mapping`, which owns the per-field conversion step.
pub(crate) trait Binding<T>: Send + Sync {
    fn key(&self) -> &str;
    fn kind(&self) -> FieldKind;
    fn options(&self) -> &[FieldOption];
    fn attach(&mut self, option: FieldOption, owner: &'static str) -> Result<(), MapError>;
    fn stage<'a>(&'a self, node: Option<&Value>, parent: &FieldPath) -> Result<Staged<'a, T>, MapError>;
    fn emit(&self, source: &T) -> Result<Option<Value>, MapError>;
    fn prepare(&self, seen: &mut HashSet<TypeId>) -> Result<(), MapError>;
    fn schema(&self, defs: &mut Definitions) -> Result<Value, MapError>;
}

pub(crate) struct Member<T, F> {
    pub(crate) key: String,
    pub(crate) get: Getter<T, F>,
    pub(crate) get_mut: Setter<T, F>,
    pub(crate) options: Vec<FieldOption>,
}

/// Read-only description of one binding.
#[derive(Debug, Clone)]
pub struct FieldInfo<'a> {
    pub key: &'a str,
    pub kind: FieldKind,
    pub options: &'a [FieldOption],
}

// ———————————————————————————————————————————————————————————————————————————— //
// BUILDER
// ———————————————————————————————————————————————————————————————————————————— //

pub struct Fields<T> {
    owner: &'static str,
    bindings: Vec<Box<dyn Binding<T>>>,
    index: IndexMap<String, usize>,
}

/// Returned by `Fields::reg` to chain options onto the new binding.
pub struct FieldHandle<'a, T> {
    fields: &'a mut Fields<T>,
    slot: usize,
}

impl<T: 'static> Fields<T> {
    pub(crate) fn new(owner: &'static str) -> Self {
        Self { owner, bindings: Vec::new(), index: IndexMap::new() }
    }

    pub fn owner(&self) -> &'static str { self.owner }

    /// Bind a member to `key`. Keys must be non-empty and unique per type.
    pub fn reg<F, G, M>(&mut self, key: &str, get: G, get_mut: M) -> Result<FieldHandle<'_, T>, MapError>
    where
        F: FieldValue,
        G: Fn(&T) -> &F + Send + Sync + 'static,
        M: Fn(&mut T) -> &mut F + Send + Sync + 'static,
    {
        if key.is_empty() {
            return Err(MapError::config(self.owner, "empty JSON key"));
        }
        if self.index.contains_key(key) {
            return Err(MapError::config(
                format!("{}.{key}", self.owner),
                "duplicate JSON key",
            ));
        }
        tracing::debug!(owner = self.owner, key, kind = %F::kind(), "registered field");
        let slot = self.bindings.len();
        self.bindings.push(Box::new(Member {
            key: key.to_string(),
            get: Box::new(get),
            get_mut: Box::new(get_mut),
            options: Vec::new(),
        }));
        self.index.insert(key.to_string(), slot);
        Ok(FieldHandle { fields: self, slot })
    }

    /// Attach an option to an already-registered key.
    pub fn attach(&mut self, key: &str, option: impl Into<FieldOption>) -> Result<(), MapError> {
        let Some(&slot) = self.index.get(key) else {
            return Err(MapError::config(
                format!("{}.{key}", self.owner),
                "option attached to an unregistered key",
            ));
        };
        self.attach_at(slot, option.into())
    }

    fn attach_at(&mut self, slot: usize, option: FieldOption) -> Result<(), MapError> {
        let owner = self.owner;
        let binding = &mut self.bindings[slot];
        tracing::debug!(owner, key = binding.key(), option = option.name(), "attached option");
        binding.attach(option, owner)
    }

    pub(crate) fn finish(self) -> FieldRegistry<T> {
        FieldRegistry {
            name: self.owner,
            bindings: self.bindings,
            index: self.index,
            marker: PhantomData,
        }
    }
}

impl<T: 'static> FieldHandle<'_, T> {
    pub fn attach(self, option: impl Into<FieldOption>) -> Result<Self, MapError> {
        self.fields.attach_at(self.slot, option.into())?;
        Ok(self)
    }
}

// ———————————————————————————————————————————————————————————————————————————— //
// REGISTRY
// ———————————————————————————————————————————————————————————————————————————— //

pub struct FieldRegistry<T> {
    name: &'static str,
    bindings: Vec<Box<dyn Binding<T>>>,
    index: IndexMap<String, usize>,
    marker: PhantomData<fn() -> T>,
}

impl<T: 'static> FieldRegistry<T> {
    pub fn name(&self) -> &'static str { self.name }

    pub fn len(&self) -> usize { self.bindings.len() }

    pub fn is_empty(&self) -> bool { self.bindings.is_empty() }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.index.keys().map(String::as_str)
    }

    pub fn contains(&self, key: &str) -> bool { self.index.contains_key(key) }

    pub fn field(&self, key: &str) -> Option<FieldInfo<'_>> {
        self.index.get(key).map(|&slot| self.info(slot))
    }

    pub fn fields(&self) -> impl Iterator<Item = FieldInfo<'_>> + '_ {
        (0..self.bindings.len()).map(|slot| self.info(slot))
    }

    fn info(&self, slot: usize) -> FieldInfo<'_> {
        let binding = &self.bindings[slot];
        FieldInfo { key: binding.key(), kind: binding.kind(), options: binding.options() }
    }

    pub(crate) fn bindings(&self) -> &[Box<dyn Binding<T>>] { &self.bindings }
}

// ———————————————————————————————————————————————————————————————————————————— //
// PROCESS-WIDE STORE
// ———————————————————————————————————————————————————————————————————————————— //

type Entry = &'static (dyn Any + Send + Sync);

static REGISTRIES: Lazy<RwLock<HashMap<TypeId, Entry>>> = Lazy::new(Default::default);

thread_local! {
    static BUILDING: RefCell<HashSet<TypeId>> = RefCell::new(HashSet::new());
}

/// The registry for `T`, building and publishing it on first use.
///
/// A failed build is not cached: the configuration error is reported again
/// on every call.
pub fn registry<T: Mapped>() -> Result<&'static FieldRegistry<T>, MapError> {
    let id = TypeId::of::<T>();
    let cached = REGISTRIES
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(&id)
        .copied();
    let entry = match cached {
        Some(entry) => entry,
        None => {
            let built = build::<T>()?;
            let mut store = REGISTRIES.write().unwrap_or_else(PoisonError::into_inner);
            *store.entry(id).or_insert_with(|| {
                tracing::debug!(owner = T::NAME, fields = built.len(), "published registry");
                let leaked: &'static FieldRegistry<T> = Box::leak(Box::new(built));
                leaked as Entry
            })
        }
    };
    entry
        .downcast_ref::<FieldRegistry<T>>()
        .ok_or_else(|| MapError::config(T::NAME, "registry entry has an unexpected type"))
}

fn build<T: Mapped>() -> Result<FieldRegistry<T>, MapError> {
    let id = TypeId::of::<T>();
    if !BUILDING.with(|building| building.borrow_mut().insert(id)) {
        return Err(MapError::config(T::NAME, "registration of this type depends on itself"));
    }
    let mut fields = Fields::new(T::NAME);
    let result = T::register(&mut fields);
    BUILDING.with(|building| building.borrow_mut().remove(&id));
    result?;
    Ok(fields.finish())
}

/// Build the registry of `T` and of every struct type reachable from it,
/// so configuration errors surface at startup instead of mid-pass.
/// Idempotent.
pub fn ensure_registered<T: Mapped>() -> Result<(), MapError> {
    let mut seen = HashSet::new();
    <T as FieldValue>::prepare(&mut seen)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{DefaultValue, NotEmpty};

    #[derive(Debug, Default)]
    struct EmptyKey { a: i32 }

    impl Mapped for EmptyKey {
        const NAME: &'static str = "EmptyKey";

        fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
            fields.reg("", |e| &e.a, |e| &mut e.a)?;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct UnknownAttach { name: String }

    impl Mapped for UnknownAttach {
        const NAME: &'static str = "UnknownAttach";

        fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
            fields.reg("name", |u| &u.name, |u| &mut u.name)?;
            fields.attach("title", NotEmpty)?;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct TwoDefaults { n: u8 }

    impl Mapped for TwoDefaults {
        const NAME: &'static str = "TwoDefaults";

        fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
            fields.reg("n", |t| &t.n, |t| &mut t.n)?
                .attach(DefaultValue::new(1))?
                .attach(DefaultValue::new(2))?;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct SelfDependent { n: u8 }

    impl Mapped for SelfDependent {
        const NAME: &'static str = "SelfDependent";

        fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
            fields.reg("n", |s| &s.n, |s| &mut s.n)?;
            // asks for its own registry while it is still being built
            registry::<SelfDependent>()?;
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct Plain { b: bool, label: Option<String> }

    impl Mapped for Plain {
        const NAME: &'static str = "Plain";

        fn register(fields: &mut Fields<Self>) -> Result<(), MapError> {
            fields.reg("b", |p| &p.b, |p| &mut p.b)?;
            fields.reg("label", |p| &p.label, |p| &mut p.label)?;
            fields.attach("label", NotEmpty)?;
            Ok(())
        }
    }

    fn config_error<T: Mapped>() -> MapError {
        match registry::<T>() {
            Ok(_) => panic!("{} registered without error", T::NAME),
            Err(err) => err,
        }
    }

    #[test]
    fn empty_key_is_rejected() {
        let err = config_error::<EmptyKey>();
        assert!(err.is_config());
        assert_eq!(err.field(), Some("EmptyKey"));
        assert!(err.to_string().contains("empty JSON key"), "{err}");
    }

    #[test]
    fn attach_on_unregistered_key_is_rejected() {
        let err = config_error::<UnknownAttach>();
        assert!(err.is_config());
        assert_eq!(err.field(), Some("UnknownAttach.title"));
    }

    #[test]
    fn second_default_is_rejected() {
        let err = config_error::<TwoDefaults>();
        assert!(err.is_config());
        assert_eq!(err.field(), Some("TwoDefaults.n"));
        assert!(err.to_string().contains("attached more than once"), "{err}");
    }

    #[test]
    fn self_dependent_registration_is_rejected() {
        let err = config_error::<SelfDependent>();
        assert!(err.is_config());
        assert_eq!(err.field(), Some("SelfDependent"));
        assert!(err.to_string().contains("depends on itself"), "{err}");
        // the guard is released after a failed build
        assert!(config_error::<SelfDependent>().is_config());
    }

    #[test]
    fn published_registry_is_shared_and_ordered() {
        let first = registry::<Plain>().unwrap();
        let second = registry::<Plain>().unwrap();
        assert!(std::ptr::eq(first, second));
        assert_eq!(first.keys().collect::<Vec<_>>(), ["b", "label"]);
        assert_eq!(first.field("label").unwrap().options, [FieldOption::NotEmpty(NotEmpty)]);
        assert!(first.field("missing").is_none());
    }
}
