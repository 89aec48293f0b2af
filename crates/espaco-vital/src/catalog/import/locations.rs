use std::collections::HashMap;
use std::io::Read;

use serde::{Deserialize, Deserializer};

use super::{CatalogImportError, ImportSummary};
use crate::catalog::domain::{CityId, StateId};
use crate::catalog::repository::{CatalogRepository, NewCity, NewState, Visibility};

/// Existing states and cities keyed by their natural keys.
pub(super) struct LocationIndex {
    states: HashMap<String, StateId>,
    cities: HashMap<(StateId, String), CityId>,
}

impl LocationIndex {
    pub(super) fn load<R>(repository: &R) -> Result<Self, CatalogImportError>
    where
        R: CatalogRepository + ?Sized,
    {
        let snapshot = repository.snapshot(Visibility::IncludeInactive)?;
        Ok(Self {
            states: snapshot
                .states
                .iter()
                .map(|state| (state.abbreviation.clone(), state.id))
                .collect(),
            cities: snapshot
                .cities
                .iter()
                .map(|city| ((city.state_id, city.name.clone()), city.id))
                .collect(),
        })
    }

    pub(super) fn state(&self, abbreviation: &str) -> Option<StateId> {
        self.states
            .get(&abbreviation.trim().to_ascii_uppercase())
            .copied()
    }

    pub(super) fn city(&self, state_id: StateId, name: &str) -> Option<CityId> {
        self.cities.get(&(state_id, name.trim().to_string())).copied()
    }

    pub(super) fn ensure_state<R>(
        &mut self,
        repository: &R,
        name: &str,
        abbreviation: &str,
        summary: &mut ImportSummary,
    ) -> Result<StateId, CatalogImportError>
    where
        R: CatalogRepository + ?Sized,
    {
        if let Some(id) = self.state(abbreviation) {
            return Ok(id);
        }
        let state = repository.insert_state(NewState {
            name: name.trim().to_string(),
            abbreviation: abbreviation.to_string(),
        })?;
        summary.states += 1;
        self.states.insert(state.abbreviation.clone(), state.id);
        Ok(state.id)
    }

    pub(super) fn ensure_city<R>(
        &mut self,
        repository: &R,
        state_id: StateId,
        name: &str,
        summary: &mut ImportSummary,
    ) -> Result<CityId, CatalogImportError>
    where
        R: CatalogRepository + ?Sized,
    {
        if let Some(id) = self.city(state_id, name) {
            return Ok(id);
        }
        let city = repository.insert_city(NewCity {
            name: name.trim().to_string(),
            state_id,
        })?;
        summary.cities += 1;
        self.cities.insert((state_id, city.name.clone()), city.id);
        Ok(city.id)
    }
}

#[derive(Debug, Deserialize)]
struct LocationRow {
    #[serde(rename = "Estado", default, deserialize_with = "empty_string_as_none")]
    state: Option<String>,
    #[serde(rename = "Sigla", default, deserialize_with = "empty_string_as_none")]
    abbreviation: Option<String>,
    #[serde(rename = "Cidade", default, deserialize_with = "empty_string_as_none")]
    city: Option<String>,
}

/// Imports a `Estado,Sigla,Cidade` CSV. Rows without a state abbreviation
/// are skipped; rows without a city only register the state. Rows that
/// already exist are left untouched.
pub fn import_locations<R, Rd>(
    repository: &R,
    reader: Rd,
) -> Result<ImportSummary, CatalogImportError>
where
    R: CatalogRepository + ?Sized,
    Rd: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut index = LocationIndex::load(repository)?;
    let mut summary = ImportSummary::default();

    for record in csv_reader.deserialize::<LocationRow>() {
        let row = record?;
        let Some(abbreviation) = row.abbreviation else {
            continue;
        };
        let state_name = row.state.unwrap_or_else(|| abbreviation.clone());
        let state_id = index.ensure_state(repository, &state_name, &abbreviation, &mut summary)?;

        if let Some(city) = row.city {
            index.ensure_city(repository, state_id, &city, &mut summary)?;
        }
    }

    tracing::info!(
        states = summary.states,
        cities = summary.cities,
        "locations imported"
    );
    Ok(summary)
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|value| !value.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::memory::InMemoryCatalog;

    const CSV: &str = "Estado,Sigla,Cidade\n\
São Paulo,SP,Campinas\n\
São Paulo , sp , São Paulo\n\
São Paulo,SP,Campinas\n\
Rio de Janeiro,RJ,\n\
,,Órfã\n";

    #[test]
    fn imports_states_and_cities_once() {
        let catalog = InMemoryCatalog::new();
        let summary = import_locations(&catalog, CSV.as_bytes()).expect("import succeeds");

        assert_eq!(summary.states, 2);
        assert_eq!(summary.cities, 2);

        let snapshot = catalog
            .snapshot(Visibility::IncludeInactive)
            .expect("snapshot");
        let sp = snapshot
            .states
            .iter()
            .find(|state| state.abbreviation == "SP")
            .expect("SP imported");
        let names: Vec<String> = catalog
            .cities_by_state(sp.id)
            .expect("cities")
            .into_iter()
            .map(|city| city.name)
            .collect();
        assert_eq!(names, vec!["Campinas".to_string(), "São Paulo".to_string()]);
    }

    #[test]
    fn reimporting_the_same_file_creates_nothing() {
        let catalog = InMemoryCatalog::new();
        import_locations(&catalog, CSV.as_bytes()).expect("first import");
        let summary = import_locations(&catalog, CSV.as_bytes()).expect("second import");
        assert_eq!(summary, ImportSummary::default());
    }
}
