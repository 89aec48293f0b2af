use crate::demo::load_demo_catalog;
use espaco_vital::catalog::import::{apply_seed, import_locations_file, load_seed_file};
use espaco_vital::catalog::{ImportSummary, InMemoryCatalog};
use espaco_vital::config::CatalogSourceConfig;
use espaco_vital::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the catalog from the configured files, or from the bundled demo
/// catalog when none is configured. Locations load first so the seed can
/// reference their cities.
pub(crate) fn load_catalog(source: &CatalogSourceConfig) -> Result<InMemoryCatalog, AppError> {
    let catalog = InMemoryCatalog::new();

    if source.seed_path.is_none() && source.locations_csv.is_none() {
        let summary = load_demo_catalog(&catalog)?;
        info!(therapists = summary.therapists, "demo catalog loaded");
        return Ok(catalog);
    }

    let mut summary = ImportSummary::default();
    if let Some(path) = &source.locations_csv {
        summary = summary.merge(import_locations_file(&catalog, path)?);
    }
    if let Some(path) = &source.seed_path {
        let seed = load_seed_file(path)?;
        summary = summary.merge(apply_seed(&catalog, seed)?);
    }

    info!(
        states = summary.states,
        cities = summary.cities,
        specialties = summary.specialties,
        therapists = summary.therapists,
        reviews = summary.reviews,
        "catalog loaded"
    );
    Ok(catalog)
}
