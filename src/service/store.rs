//! Type-keyed object stores backing `Inject<T>` parameters.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Objects keyed by their concrete type; at most one object per type.
///
/// Used for per-request session objects (owned by the request context) and
/// for process-wide singletons (owned by the sealed service).
#[derive(Clone, Default)]
pub struct ObjectStore {
    objects: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `object`, replacing any previous object of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, object: T) {
        self.insert_arc(Arc::new(object));
    }

    /// Store an already shared object.
    pub fn insert_arc<T: Send + Sync + 'static>(&mut self, object: Arc<T>) {
        self.objects.insert(TypeId::of::<T>(), object);
    }

    /// The object registered for `T`, if any.
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.objects
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|object| object.downcast::<T>().ok())
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.objects.contains_key(&TypeId::of::<T>())
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl fmt::Debug for ObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectStore")
            .field("objects", &self.objects.len())
            .finish()
    }
}
