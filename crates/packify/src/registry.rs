//! Name-keyed registry of extension handlers.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::builtin::{MapEntry, StrWrapper};
use crate::constants::DEFAULT_MAX_DEPTH;
use crate::error::{FramingError, PackError, UsageError};
use crate::extension::{Extension, ExtensionHandler, Packable, PackableHandler};

/// Maps extension type names to the handlers that rebuild them.
///
/// A registry is built by the caller and only read while decoding, so one
/// instance can be shared by any number of concurrent decodes.
///
/// Handlers that unpack nested extensions receive a view of the registry
/// one level deeper than their own; past `max_depth` levels
/// [`Registry::unpack`] fails with [`FramingError::DepthLimit`].
///
/// # Example
///
/// ```
/// use packify::builtin::StrWrapper;
/// use packify::Registry;
///
/// let registry = Registry::new().with::<StrWrapper>();
/// assert!(registry.contains("StrWrapper"));
/// ```
#[derive(Clone)]
pub struct Registry {
    handlers: Arc<HashMap<String, Arc<dyn ExtensionHandler>>>,
    depth: usize,
    max_depth: usize,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            handlers: Arc::default(),
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in extension types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register::<StrWrapper>();
        registry.register::<MapEntry>();
        registry
    }

    /// Registers `T` under its `TYPE_NAME`, replacing any previous entry.
    pub fn register<T: Packable>(&mut self) -> &mut Self {
        self.insert(T::TYPE_NAME, PackableHandler::<T>::new())
    }

    /// Builder form of [`Registry::register`].
    pub fn with<T: Packable>(mut self) -> Self {
        self.register::<T>();
        self
    }

    /// Registers an arbitrary handler under `type_name`.
    pub fn insert<H>(&mut self, type_name: impl Into<String>, handler: H) -> &mut Self
    where
        H: ExtensionHandler + 'static,
    {
        Arc::make_mut(&mut self.handlers).insert(type_name.into(), Arc::new(handler));
        self
    }

    /// Copies every entry of `other` into `self`; entries of `other` win.
    pub fn inject(&mut self, other: &Registry) -> &mut Self {
        let handlers = Arc::make_mut(&mut self.handlers);
        for (name, handler) in other.handlers.iter() {
            handlers.insert(name.clone(), Arc::clone(handler));
        }
        self
    }

    /// Builder form of [`Registry::inject`].
    pub fn merged(mut self, other: &Registry) -> Self {
        self.inject(other);
        self
    }

    pub fn get(&self, type_name: &str) -> Option<&dyn ExtensionHandler> {
        self.handlers.get(type_name).map(|h| h.as_ref())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.handlers.contains_key(type_name)
    }

    pub fn remove(&mut self, type_name: &str) -> bool {
        Arc::make_mut(&mut self.handlers).remove(type_name).is_some()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// How many levels of nesting enclose extensions unpacked through this
    /// view.
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// A view sharing the same handlers, positioned `depth` levels deep
    /// and limited to `max_depth`.
    pub fn at_depth(&self, depth: usize, max_depth: usize) -> Registry {
        Registry {
            handlers: Arc::clone(&self.handlers),
            depth,
            max_depth,
        }
    }

    /// Looks up `type_name` and rebuilds the extension from `data`.
    ///
    /// The handler sees a registry one level deeper, so extensions nested
    /// inside `data` count toward the depth limit.
    pub fn unpack(&self, type_name: &str, data: &[u8]) -> Result<Extension, PackError> {
        if self.depth > self.max_depth {
            debug!(max_depth = self.max_depth, type_name, "extension depth limit hit");
            return Err(FramingError::DepthLimit(self.max_depth).into());
        }
        match self.get(type_name) {
            Some(handler) => handler.unpack(data, &self.at_depth(self.depth + 1, self.max_depth)),
            None => {
                debug!(type_name, known = ?self.names(), "unknown extension type");
                Err(UsageError::UnknownExtension(type_name.to_string()).into())
            }
        }
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .field("depth", &self.depth)
            .finish()
    }
}
