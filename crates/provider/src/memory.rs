//! In-memory provider for tests and local development.

use crate::{DataProvider, FetchRequest, ProviderError};
use async_trait::async_trait;
use ensemble_common::{GriddedField, ModelId, Scenario};
use tracing::debug;

/// A provider serving pre-registered fields from memory.
///
/// Fields are matched by model id; projection fields additionally by
/// scenario, while reanalysis fields (scenario `None`) match any scenario.
/// Spatial coverage is validated here; temporal coverage is the temporal
/// aligner's concern, since it owns the calendar mapping.
#[derive(Debug, Default)]
pub struct InMemoryProvider {
    fields: Vec<GriddedField>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field for later fetches.
    pub fn insert(&mut self, field: GriddedField) {
        self.fields.push(field);
    }

    pub fn with_field(mut self, field: GriddedField) -> Self {
        self.insert(field);
        self
    }
}

#[async_trait]
impl DataProvider for InMemoryProvider {
    async fn fetch_field(&self, request: &FetchRequest) -> Result<GriddedField, ProviderError> {
        let field = self
            .fields
            .iter()
            .find(|f| {
                f.model == request.model
                    && (f.scenario.is_none() || f.scenario == Some(request.scenario))
            })
            .ok_or_else(|| {
                ProviderError::not_found(
                    &request.model,
                    format!("model not registered for scenario {}", request.scenario),
                )
            })?;

        if !field.bbox.contains_bbox(&request.bbox) {
            return Err(ProviderError::not_found(
                &request.model,
                format!(
                    "requested bbox {:?} outside coverage {:?}",
                    request.bbox, field.bbox
                ),
            ));
        }

        debug!(model = %request.model, "serving field from memory");
        Ok(field.clone())
    }

    async fn list_models(&self, scenario: Scenario) -> Result<Vec<ModelId>, ProviderError> {
        let mut models: Vec<ModelId> = self
            .fields
            .iter()
            .filter(|f| f.scenario.is_none() || f.scenario == Some(scenario))
            .map(|f| f.model.clone())
            .collect();
        models.sort();
        models.dedup();
        Ok(models)
    }
}
