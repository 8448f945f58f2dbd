//! Request-scoped context: an immutable chain of typed layers.
//!
//! Every attachment returns a new `Context` whose head points at the parent, so a
//! context handed to one handler can never be changed by another. Lookups walk
//! from the newest layer to the root and return the nearest value.

use std::any::{Any, TypeId};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use thiserror::Error;

use crate::pattern::Params;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    #[error("context key already set: {0}")]
    AlreadySet(&'static str),
}

/// A context slot. The implementing type is the key, so two keys only collide
/// if they are the same type.
pub trait ContextKey: 'static {
    type Value: Send + Sync + 'static;
    /// Human-readable name, used in errors and `Debug` output.
    const NAME: &'static str;
}

/// Path parameters captured by the router.
pub(crate) struct ParamsKey;

impl ContextKey for ParamsKey {
    type Value = Params;
    const NAME: &'static str = "path parameters";
}

/// Identity attached by the access-token middleware.
pub(crate) struct IdentityKey<T>(PhantomData<fn() -> T>);

impl<T: Send + Sync + 'static> ContextKey for IdentityKey<T> {
    type Value = T;
    const NAME: &'static str = "authenticated identity";
}

struct Layer {
    key: TypeId,
    name: &'static str,
    value: Box<dyn Any + Send + Sync>,
    parent: Option<Arc<Layer>>,
}

#[derive(Clone, Default)]
pub struct Context {
    head: Option<Arc<Layer>>,
}

impl Context {
    /// Empty root context.
    pub fn new() -> Self {
        Self { head: None }
    }

    /// Derive a child context holding `value` under `K`. The receiver is left untouched.
    /// A value already present for `K` further up the chain is shadowed, not replaced.
    pub fn with_value<K: ContextKey>(&self, value: K::Value) -> Context {
        Context {
            head: Some(Arc::new(Layer {
                key: TypeId::of::<K>(),
                name: K::NAME,
                value: Box::new(value),
                parent: self.head.clone(),
            })),
        }
    }

    /// Like `with_value`, but refuses to attach a key that is already set.
    pub fn try_with_value<K: ContextKey>(&self, value: K::Value) -> Result<Context, ContextError> {
        if self.contains::<K>() {
            return Err(ContextError::AlreadySet(K::NAME));
        }
        Ok(self.with_value::<K>(value))
    }

    /// Nearest value stored under `K`, if any.
    pub fn value<K: ContextKey>(&self) -> Option<&K::Value> {
        let key = TypeId::of::<K>();
        self.layers()
            .find(|layer| layer.key == key)
            .and_then(|layer| layer.value.downcast_ref::<K::Value>())
    }

    pub fn contains<K: ContextKey>(&self) -> bool {
        let key = TypeId::of::<K>();
        self.layers().any(|layer| layer.key == key)
    }

    /// Number of layers between this context and the root.
    pub fn depth(&self) -> usize {
        self.layers().count()
    }

    fn layers(&self) -> impl Iterator<Item = &Layer> + '_ {
        std::iter::successors(self.head.as_deref(), |layer| layer.parent.as_deref())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.layers().map(|layer| layer.name))
            .finish()
    }
}
