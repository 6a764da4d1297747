//! Domain model for exposed tools, resources and namespaces.
//!
//! Callable references describe what the router exposes and which backend
//! type serves each capability. Labels attach arbitrary metadata used by
//! label-expression filters.

mod error;
mod ids;
mod labels;
mod payload;
mod provisioning;
mod reference;
mod schema;

pub use error::CapabilityDomainError;
pub use ids::CapabilityId;
pub use labels::Labels;
pub use payload::{CapabilityPayload, ResourcePayload, ToolPayload};
pub use provisioning::ProvisioningReference;
pub use reference::{
    CallableReference, DEFAULT_MIME_TYPE, NAMESPACE_TYPE, NamespaceReference, ResourceParam,
    ResourceReference, ToolReference,
};
pub use schema::{BODY_PROPERTY, InputSchema, Property, SCOPE_SERVICE, TARGET_HEADER};
