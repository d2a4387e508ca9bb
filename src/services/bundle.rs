//! Write-once service bundle.

use std::sync::Arc;

use crate::services::{
    BuildSystemAccessor, ProjectCapabilities, ProjectServices, ReferencesReader,
    ReferencesWriter, ServiceError, ServiceKind,
};

/// One slot per service kind, each bound at most once.
///
/// Providers assemble a bundle piecemeal before handing the representation
/// out. Reading an unbound slot fails with [`ServiceError::Unbound`].
#[derive(Default, Clone)]
pub struct ServiceBundle {
    capabilities: Option<Arc<dyn ProjectCapabilities>>,
    reader: Option<Arc<dyn ReferencesReader>>,
    writer: Option<Arc<dyn ReferencesWriter>>,
    build_system: Option<Arc<dyn BuildSystemAccessor>>,
}

fn bind<T: ?Sized>(
    slot: &mut Option<Arc<T>>,
    kind: ServiceKind,
    service: Arc<T>,
) -> Result<(), ServiceError> {
    if slot.is_some() {
        return Err(ServiceError::AlreadyBound(kind));
    }
    *slot = Some(service);
    Ok(())
}

fn get<T: ?Sized>(slot: &Option<Arc<T>>, kind: ServiceKind) -> Result<&T, ServiceError> {
    slot.as_deref().ok_or(ServiceError::Unbound(kind))
}

impl ServiceBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_capabilities(
        &mut self,
        service: Arc<dyn ProjectCapabilities>,
    ) -> Result<(), ServiceError> {
        bind(&mut self.capabilities, ServiceKind::Capabilities, service)
    }

    pub fn bind_references_reader(
        &mut self,
        service: Arc<dyn ReferencesReader>,
    ) -> Result<(), ServiceError> {
        bind(&mut self.reader, ServiceKind::ReferencesReader, service)
    }

    pub fn bind_references_writer(
        &mut self,
        service: Arc<dyn ReferencesWriter>,
    ) -> Result<(), ServiceError> {
        bind(&mut self.writer, ServiceKind::ReferencesWriter, service)
    }

    pub fn bind_build_system(
        &mut self,
        service: Arc<dyn BuildSystemAccessor>,
    ) -> Result<(), ServiceError> {
        bind(&mut self.build_system, ServiceKind::BuildSystem, service)
    }

    pub fn is_bound(&self, kind: ServiceKind) -> bool {
        match kind {
            ServiceKind::Capabilities => self.capabilities.is_some(),
            ServiceKind::ReferencesReader => self.reader.is_some(),
            ServiceKind::ReferencesWriter => self.writer.is_some(),
            ServiceKind::BuildSystem => self.build_system.is_some(),
        }
    }

    /// Kinds with an implementation, in [`ServiceKind::ALL`] order.
    pub fn bound_kinds(&self) -> Vec<ServiceKind> {
        ServiceKind::ALL
            .into_iter()
            .filter(|kind| self.is_bound(*kind))
            .collect()
    }
}

impl ProjectServices for ServiceBundle {
    fn capabilities(&self) -> Result<&dyn ProjectCapabilities, ServiceError> {
        get(&self.capabilities, ServiceKind::Capabilities)
    }

    fn references_reader(&self) -> Result<&dyn ReferencesReader, ServiceError> {
        get(&self.reader, ServiceKind::ReferencesReader)
    }

    fn references_writer(&self) -> Result<&dyn ReferencesWriter, ServiceError> {
        get(&self.writer, ServiceKind::ReferencesWriter)
    }

    fn build_system(&self) -> Result<&dyn BuildSystemAccessor, ServiceError> {
        get(&self.build_system, ServiceKind::BuildSystem)
    }
}

impl std::fmt::Debug for ServiceBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceBundle")
            .field("bound", &self.bound_kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::classic::StaticCapabilities;

    #[test]
    fn test_unbound_slot_fails() {
        let bundle = ServiceBundle::new();
        let err = bundle.references_writer().err().unwrap();
        assert!(matches!(
            err,
            ServiceError::Unbound(ServiceKind::ReferencesWriter)
        ));
    }

    #[test]
    fn test_slot_binds_once() {
        let mut bundle = ServiceBundle::new();
        bundle
            .bind_capabilities(Arc::new(StaticCapabilities::packages_config()))
            .unwrap();

        let err = bundle
            .bind_capabilities(Arc::new(StaticCapabilities::packages_config()))
            .unwrap_err();
        assert!(matches!(err, ServiceError::AlreadyBound(ServiceKind::Capabilities)));

        assert_eq!(bundle.bound_kinds(), vec![ServiceKind::Capabilities]);
        assert!(!bundle
            .capabilities()
            .unwrap()
            .supports_package_references()
            .unwrap());
    }
}
