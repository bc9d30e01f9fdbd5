use std::collections::BTreeMap;
use std::sync::Arc;

use crate::descriptor::{Operation, OperationDescriptor, OperationId};
use crate::transform::ResponseTransform;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("operation {0} is already registered")]
    Duplicate(OperationId),
    #[error("unknown operation {0}")]
    NotFound(OperationId),
}

/// Operation id to descriptor, assembled once at startup.
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: BTreeMap<OperationId, Arc<OperationDescriptor>>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        descriptor: OperationDescriptor,
    ) -> Result<Arc<OperationDescriptor>, RegistryError> {
        let id = descriptor.id().clone();
        if self.operations.contains_key(&id) {
            return Err(RegistryError::Duplicate(id));
        }
        let descriptor = Arc::new(descriptor);
        self.operations.insert(id, descriptor.clone());
        Ok(descriptor)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<OperationDescriptor>> {
        self.operations.get(&OperationId::from(id))
    }

    pub fn operation<T>(
        &self,
        id: &str,
        transform: impl ResponseTransform<T> + 'static,
    ) -> Result<Operation<T>, RegistryError> {
        let descriptor = self
            .get(id)
            .ok_or_else(|| RegistryError::NotFound(OperationId::from(id)))?;
        Ok(Operation::new(descriptor.clone(), transform))
    }

    pub fn ids(&self) -> impl Iterator<Item = &OperationId> {
        self.operations.keys()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
