// 🗄️ Property Store - In-memory, write-once, keyed by property identifier
//
// Not authoritative: a miss is always recoverable by re-analyzing the
// address the identifier decodes to. Clones share the same map.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::model::Property;

#[derive(Clone, Default)]
pub struct PropertyStore {
    properties: Arc<RwLock<HashMap<String, Property>>>,
}

impl PropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<Property> {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// First write per identifier wins; returns the stored property
    pub fn put(&self, property: Property) -> Property {
        let mut properties = self
            .properties
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        properties
            .entry(property.id.clone())
            .or_insert(property)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.properties
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
