//! Component registration and lookup.

use std::sync::Arc;

use tracing::info;

use scantrack_core::error::AppError;
use scantrack_core::types::ComponentUuid;
use scantrack_database::store::ComponentStore;
use scantrack_entity::component::{Component, CreateComponent};
use scantrack_entity::validation::validate_input;

/// Manages the components scans refer to.
#[derive(Debug, Clone)]
pub struct ComponentService {
    components: Arc<dyn ComponentStore>,
}

impl ComponentService {
    /// Creates a new component service.
    pub fn new(components: Arc<dyn ComponentStore>) -> Self {
        Self { components }
    }

    /// Registers a component.
    pub async fn create_component(&self, req: CreateComponent) -> Result<Component, AppError> {
        validate_input(&req)?;
        let component = self.components.create_component(&req).await?;
        info!(
            component = %component.uuid,
            coordinates = %component.coordinates(),
            "Component created"
        );
        Ok(component)
    }

    /// Gets a component by uuid.
    pub async fn get_component(&self, uuid: &ComponentUuid) -> Result<Component, AppError> {
        self.components
            .find_component(uuid)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Component {uuid} not found")))
    }
}
