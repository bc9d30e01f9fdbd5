use std::sync::Arc;

use crate::descriptor::{OperationDescriptor, OperationId};
use crate::transform::ResponseTransform;

/// A descriptor paired with the transform that decodes its success responses into `T`.
pub struct Operation<T> {
    descriptor: Arc<OperationDescriptor>,
    transform: Arc<dyn ResponseTransform<T>>,
}

impl<T> Operation<T> {
    pub fn new(
        descriptor: Arc<OperationDescriptor>,
        transform: impl ResponseTransform<T> + 'static,
    ) -> Self {
        Self {
            descriptor,
            transform: Arc::new(transform),
        }
    }

    pub fn id(&self) -> &OperationId {
        self.descriptor.id()
    }

    pub fn descriptor(&self) -> &Arc<OperationDescriptor> {
        &self.descriptor
    }

    pub fn transform(&self) -> &Arc<dyn ResponseTransform<T>> {
        &self.transform
    }
}

impl<T> Clone for Operation<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            transform: self.transform.clone(),
        }
    }
}
