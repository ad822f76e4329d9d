use alloc::{string::String, vec::Vec};

use crate::{any::TypeInfo, factory::BoxedFactory, instance::Instance, scope::Scope};

pub(crate) struct ServiceDescriptor {
    pub(crate) qualifier: String,
    pub(crate) scope: Scope,
    pub(crate) factory: BoxedFactory,
    /// Populated for singletons only
    pub(crate) instance: Option<Instance>,
    pub(crate) dependencies: Vec<String>,
    pub(crate) destroyed: bool,
}

impl ServiceDescriptor {
    pub(crate) fn info(&self) -> ServiceInfo {
        ServiceInfo {
            qualifier: self.qualifier.clone(),
            scope: self.scope,
            type_info: self.instance.as_ref().map(Instance::type_info),
            dependencies: self.dependencies.clone(),
            destroyed: self.destroyed,
        }
    }
}

/// Snapshot of a registered service
/// ## Fields
/// - `type_info`:
///   Type of the singleton instance.
///   `None` for other scopes, the type of their instances is known only after a resolution.
///
/// - `dependencies`:
///   Qualifiers the service is injected with.
///   Known for services registered with an injectable instance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    pub qualifier: String,
    pub scope: Scope,
    pub type_info: Option<TypeInfo>,
    pub dependencies: Vec<String>,
    pub destroyed: bool,
}
