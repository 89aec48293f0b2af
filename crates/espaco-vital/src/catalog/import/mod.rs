//! Bulk loading of catalog data: a JSON seed describing a whole catalog and
//! a CSV file of states and cities. Both go through the repository so every
//! uniqueness rule applies to imported rows too.

mod locations;
mod seed;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::repository::{CatalogRepository, RepositoryError};

pub use locations::import_locations;
pub use seed::{
    apply_seed, CatalogSeed, SeedLocation, SeedPairing, SeedReview, SeedState, SeedTherapist,
};

/// Rows created by an import run. Rows that already existed are not counted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub states: usize,
    pub cities: usize,
    pub specialties: usize,
    pub therapists: usize,
    pub reviews: usize,
}

impl ImportSummary {
    pub fn merge(self, other: ImportSummary) -> Self {
        Self {
            states: self.states + other.states,
            cities: self.cities + other.cities,
            specialties: self.specialties + other.specialties,
            therapists: self.therapists + other.therapists,
            reviews: self.reviews + other.reviews,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogImportError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid locations file: {0}")]
    Csv(#[from] csv::Error),
    #[error("invalid catalog seed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("seed references unknown {kind} '{key}'")]
    UnknownReference { kind: &'static str, key: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

fn open(path: &Path) -> Result<BufReader<File>, CatalogImportError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CatalogImportError::Io {
            path: path.to_path_buf(),
            source,
        })
}

pub fn load_seed_file(path: &Path) -> Result<CatalogSeed, CatalogImportError> {
    CatalogSeed::from_reader(open(path)?)
}

pub fn import_locations_file<R>(
    repository: &R,
    path: &Path,
) -> Result<ImportSummary, CatalogImportError>
where
    R: CatalogRepository + ?Sized,
{
    import_locations(repository, open(path)?)
}
