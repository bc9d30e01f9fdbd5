mod operation;
mod registry;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use wirecall_core::{Binding, Method, RequestShape, RequestShapeBuilder, ShapeError};

use crate::classify::ClassifierTable;
use crate::filter::{FilterChain, RequestFilter};
use crate::retry::{BackoffRetry, RetryPolicy};

pub use operation::Operation;
pub use registry::{OperationRegistry, RegistryError};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperationId(String);

impl OperationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OperationId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DescriptorError {
    #[error("operation id must not be empty")]
    EmptyId,
    #[error("operation {id}: {source}")]
    Shape {
        id: OperationId,
        #[source]
        source: ShapeError,
    },
}

/// Everything needed to build, send and classify one kind of call. Built once, shared
/// read-only by every invocation.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    id: OperationId,
    shape: RequestShape,
    filters: FilterChain,
    classifier: ClassifierTable,
    retry: Arc<dyn RetryPolicy>,
}

impl OperationDescriptor {
    pub fn builder(
        id: impl Into<OperationId>,
        method: Method,
        path: impl Into<String>,
    ) -> OperationDescriptorBuilder {
        OperationDescriptorBuilder {
            id: id.into(),
            shape: RequestShape::builder(method, path),
            filters: FilterChain::new(),
            classifier: ClassifierTable::default(),
            retry: Arc::new(BackoffRetry::default()),
        }
    }

    pub fn id(&self) -> &OperationId {
        &self.id
    }

    pub fn shape(&self) -> &RequestShape {
        &self.shape
    }

    pub fn filters(&self) -> &FilterChain {
        &self.filters
    }

    pub fn classifier(&self) -> &ClassifierTable {
        &self.classifier
    }

    pub fn retry_policy(&self) -> &Arc<dyn RetryPolicy> {
        &self.retry
    }
}

pub struct OperationDescriptorBuilder {
    id: OperationId,
    shape: RequestShapeBuilder,
    filters: FilterChain,
    classifier: ClassifierTable,
    retry: Arc<dyn RetryPolicy>,
}

impl OperationDescriptorBuilder {
    pub fn bind(mut self, binding: Binding) -> Self {
        self.shape = self.shape.bind(binding);
        self
    }

    /// Adjusts the request shape beyond plain bindings (static params, payload root, ...).
    pub fn shape(mut self, f: impl FnOnce(RequestShapeBuilder) -> RequestShapeBuilder) -> Self {
        self.shape = f(self.shape);
        self
    }

    pub fn filter(mut self, filter: impl RequestFilter + 'static) -> Self {
        self.filters = self.filters.with(filter);
        self
    }

    pub fn filters(mut self, filters: FilterChain) -> Self {
        self.filters = filters;
        self
    }

    pub fn classifier(mut self, classifier: ClassifierTable) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn retry(mut self, policy: impl RetryPolicy + 'static) -> Self {
        self.retry = Arc::new(policy);
        self
    }

    pub fn build(self) -> Result<OperationDescriptor, DescriptorError> {
        if self.id.as_str().is_empty() {
            return Err(DescriptorError::EmptyId);
        }
        let shape = self.shape.build().map_err(|source| DescriptorError::Shape {
            id: self.id.clone(),
            source,
        })?;
        Ok(OperationDescriptor {
            id: self.id,
            shape,
            filters: self.filters,
            classifier: self.classifier,
            retry: self.retry,
        })
    }
}
