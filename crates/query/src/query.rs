//! The region/time query orchestrator.

use crate::cache::SessionCache;
use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::request::{QueryRequest, QueryResponse, QuerySummary};
use alignment::{align, resample, AlignmentConfig};
use ensemble_common::{AlignedField, ModelId, TargetGrid, Units};
use ensemble_stats::{aggregate, estimate, ExcludedModel};
use provider::{DataProvider, FetchRequest};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Runs the full pipeline for one region/time selection: concurrent
/// per-model fetch, spatial and temporal alignment, ensemble aggregation,
/// uncertainty estimation, and session caching.
pub struct RegionTimeQuery {
    provider: Arc<dyn DataProvider>,
    config: QueryConfig,
    cache: Arc<SessionCache>,
    fetch_permits: Arc<Semaphore>,
}

impl RegionTimeQuery {
    pub fn new(provider: Arc<dyn DataProvider>, config: QueryConfig) -> Result<Self, QueryError> {
        config.validate().map_err(QueryError::Config)?;
        let cache = Arc::new(SessionCache::new(config.cache_entries, config.cache_ttl));
        let fetch_permits = Arc::new(Semaphore::new(config.parallel_fetches));
        Ok(Self {
            provider,
            config,
            cache,
            fetch_permits,
        })
    }

    pub fn cache(&self) -> &SessionCache {
        &self.cache
    }

    /// The canonical grid a request resolves to under this configuration.
    pub fn target_grid(&self, request: &QueryRequest) -> TargetGrid {
        TargetGrid::new(
            request.bbox,
            self.config.cell_size_deg,
            self.config.cell_size_deg,
            request.range,
            request.step,
        )
    }

    /// Run one query. Cached responses are returned without touching the
    /// provider; concurrent identical requests compute once.
    #[instrument(skip(self, request), fields(scenario = %request.scenario))]
    pub async fn run(&self, request: &QueryRequest) -> Result<Arc<QueryResponse>, QueryError> {
        let models = request.distinct_models();
        if models.is_empty() {
            return Err(QueryError::NoModelsSelected);
        }

        let grid = self.target_grid(request);
        let key = request.cache_key(&grid);

        if let Some(response) = self.cache.get(&key).await {
            debug!(key, "session cache hit");
            return Ok(response);
        }

        let lock = self.cache.key_lock(&key).await;
        let _guard = lock.lock().await;

        // A concurrent identical request may have filled the cache while we
        // waited on the lock.
        if let Some(response) = self.cache.get(&key).await {
            debug!(key, "session cache hit after coalescing");
            return Ok(response);
        }

        let response = Arc::new(self.compute(request, models, grid).await?);
        self.cache.insert(key, Arc::clone(&response)).await;
        Ok(response)
    }

    async fn compute(
        &self,
        request: &QueryRequest,
        models: Vec<ModelId>,
        grid: TargetGrid,
    ) -> Result<QueryResponse, QueryError> {
        let mut tasks = JoinSet::new();
        for (idx, model) in models.into_iter().enumerate() {
            let provider = Arc::clone(&self.provider);
            let permits = Arc::clone(&self.fetch_permits);
            let timeout = self.config.fetch_timeout;
            let alignment = self.config.alignment.clone();
            let grid = grid.clone();
            let units = request.units;
            let fetch = FetchRequest {
                model: model.clone(),
                scenario: request.scenario,
                bbox: request.bbox,
                range: request.range,
            };
            tasks.spawn(async move {
                let outcome =
                    prepare_member(provider, permits, timeout, &alignment, &fetch, &grid, units)
                        .await;
                (idx, model, outcome)
            });
        }

        let mut survivors: Vec<(usize, AlignedField)> = Vec::new();
        let mut excluded: Vec<ExcludedModel> = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, _model, Ok(field))) => survivors.push((idx, field)),
                Ok((_, model, Err(reason))) => {
                    warn!(model = %model, reason, "model excluded from ensemble");
                    excluded.push(ExcludedModel { model, reason });
                }
                Err(err) => {
                    warn!(error = %err, "member task failed");
                }
            }
        }

        if survivors.is_empty() {
            return Err(QueryError::EmptyEnsemble { excluded });
        }

        // Restore request order so member planes line up with the model list.
        survivors.sort_by_key(|(idx, _)| *idx);
        let fields: Vec<AlignedField> = survivors.into_iter().map(|(_, f)| f).collect();

        info!(
            members = fields.len(),
            excluded = excluded.len(),
            "aggregating ensemble"
        );

        let mut result = aggregate(fields, &self.config.stats)?;
        result.excluded = excluded;
        let band = estimate(&result, &self.config.band);
        let summary = QuerySummary::from_result(&result);

        Ok(QueryResponse {
            result,
            band,
            summary,
        })
    }
}

/// Fetch, resample, and align one member. Every failure becomes a reason
/// string so the caller can record it without caring which stage failed.
async fn prepare_member(
    provider: Arc<dyn DataProvider>,
    permits: Arc<Semaphore>,
    timeout: std::time::Duration,
    alignment: &AlignmentConfig,
    fetch: &FetchRequest,
    grid: &TargetGrid,
    units: Units,
) -> Result<AlignedField, String> {
    let _permit = permits
        .acquire_owned()
        .await
        .map_err(|_| "fetch pool closed".to_string())?;

    let field = match tokio::time::timeout(timeout, provider.fetch_field(fetch)).await {
        Ok(Ok(field)) => field,
        Ok(Err(err)) => return Err(err.to_string()),
        Err(_) => return Err(format!("fetch timed out after {}s", timeout.as_secs_f64())),
    };

    let resampled = resample(&field, grid, alignment).map_err(|e| e.to_string())?;
    let mut aligned = align(resampled, grid).map_err(|e| e.to_string())?;
    aligned.convert_units(units);
    Ok(aligned)
}
