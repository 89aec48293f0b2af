//! Translates query-string criteria into a conjunctive predicate over the
//! therapist catalog.
//!
//! Malformed values never fail a request: an unparseable value drops out and
//! the search runs less filtered.

use std::collections::BTreeSet;

use serde::Serialize;

use super::domain::{
    CityId, ProfileType, SessionModality, SpecialtyId, StateId, TargetAudience, Therapist,
};
use super::ranking::SortKey;
use super::repository::CatalogSnapshot;

/// Typed, already-sanitized filters. Empty sets and `None` mean "not filtered".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilters {
    pub modalities: BTreeSet<SessionModality>,
    pub city: Option<CityId>,
    pub state: Option<StateId>,
    pub specialties: BTreeSet<SpecialtyId>,
    pub accessible: Option<bool>,
    pub profile_type: Option<ProfileType>,
    pub target_audience: Option<TargetAudience>,
    pub text: Option<String>,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// True when the therapist satisfies every specified category. Session
    /// modalities and specialties match when at least one selected value does.
    pub fn matches(&self, therapist: &Therapist, snapshot: &CatalogSnapshot) -> bool {
        if !therapist.is_active {
            return false;
        }

        if !self.modalities.is_empty()
            && self.modalities.is_disjoint(&therapist.session_modalities)
        {
            return false;
        }

        if let Some(city) = self.city {
            if therapist.city_id != Some(city) {
                return false;
            }
        }

        if let Some(state) = self.state {
            let therapist_state = therapist
                .city_id
                .and_then(|city_id| snapshot.city(city_id))
                .map(|city| city.state_id);
            if therapist_state != Some(state) {
                return false;
            }
        }

        if !self.specialties.is_empty()
            && !therapist
                .specialty_ids()
                .any(|id| self.specialties.contains(&id))
        {
            return false;
        }

        if let Some(accessible) = self.accessible {
            if therapist.accessible != accessible {
                return false;
            }
        }

        if let Some(profile_type) = self.profile_type {
            if therapist.profile_type != profile_type {
                return false;
            }
        }

        if let Some(audience) = self.target_audience {
            if therapist.target_audience != audience {
                return false;
            }
        }

        match &self.text {
            Some(needle) => text_matches(needle, therapist, snapshot),
            None => true,
        }
    }

    /// Active therapists of the snapshot that satisfy the filters, each once.
    pub fn apply<'a>(&self, snapshot: &'a CatalogSnapshot) -> Vec<&'a Therapist> {
        snapshot
            .therapists
            .iter()
            .filter(|therapist| self.matches(therapist, snapshot))
            .collect()
    }
}

fn text_matches(needle: &str, therapist: &Therapist, snapshot: &CatalogSnapshot) -> bool {
    let needle = needle.to_lowercase();
    let contains = |haystack: &str| haystack.to_lowercase().contains(&needle);

    contains(&therapist.full_name)
        || contains(&therapist.display_name)
        || contains(&therapist.short_bio)
        || contains(&therapist.long_bio)
        || snapshot
            .specialty_names(therapist)
            .into_iter()
            .any(contains)
}

/// The raw filter values as received, echoed back so a client can keep its
/// form state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterEcho {
    #[serde(rename = "tipos_sessao")]
    pub modalities: Vec<String>,
    #[serde(rename = "cidade")]
    pub city: String,
    #[serde(rename = "estado")]
    pub state: String,
    #[serde(rename = "especialidades")]
    pub specialties: Vec<String>,
    #[serde(rename = "acessibilidade")]
    pub accessibility: String,
    #[serde(rename = "perfil_profissional")]
    pub profile_type: String,
    #[serde(rename = "para_quem")]
    pub target_audience: String,
    pub q: String,
    #[serde(rename = "ordenacao")]
    pub sort: String,
}

/// Everything a search request carries: filters, ordering and page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub filters: SearchFilters,
    pub sort: SortKey,
    pub page: usize,
    pub echo: FilterEcho,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            filters: SearchFilters::default(),
            sort: SortKey::Relevance,
            page: 1,
            echo: FilterEcho {
                sort: SortKey::Relevance.code().to_string(),
                ..FilterEcho::default()
            },
        }
    }
}

impl SearchParams {
    /// Builds parameters from decoded query-string pairs. Repeated keys are
    /// multi-select values; for single-valued keys the last occurrence wins.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut echo = FilterEcho::default();
        let mut page_raw = None;
        let mut sort_raw = None;

        for (key, value) in pairs {
            let value = value.as_ref().trim().to_string();
            match key.as_ref() {
                "tipos_sessao" => echo.modalities.push(value),
                "cidade" => echo.city = value,
                "estado" => echo.state = value,
                "especialidades" => echo.specialties.push(value),
                "acessibilidade" => echo.accessibility = value,
                "perfil_profissional" => echo.profile_type = value,
                "para_quem" => echo.target_audience = value,
                "q" => echo.q = value,
                "ordenacao" => sort_raw = Some(value),
                "page" => page_raw = Some(value),
                _ => {}
            }
        }

        let sort = sort_raw
            .as_deref()
            .and_then(SortKey::from_code)
            .unwrap_or(SortKey::Relevance);
        echo.sort = sort_raw.unwrap_or_else(|| SortKey::Relevance.code().to_string());

        let filters = SearchFilters {
            modalities: echo
                .modalities
                .iter()
                .filter_map(|code| SessionModality::from_code(code))
                .collect(),
            city: parse_id(&echo.city).map(CityId),
            state: parse_id(&echo.state).map(StateId),
            specialties: parse_specialties(&echo.specialties),
            accessible: parse_accessibility(&echo.accessibility),
            profile_type: ProfileType::from_code(&echo.profile_type),
            target_audience: TargetAudience::from_code(&echo.target_audience),
            text: Some(echo.q.clone()).filter(|q| !q.is_empty()),
        };

        Self {
            filters,
            sort,
            page: parse_page(page_raw.as_deref()),
            echo,
        }
    }
}

fn parse_id(raw: &str) -> Option<u64> {
    if raw.is_empty() {
        return None;
    }
    raw.parse::<u64>().ok()
}

/// A single malformed id drops the whole specialty filter.
fn parse_specialties(raw: &[String]) -> BTreeSet<SpecialtyId> {
    let values: Vec<&str> = raw
        .iter()
        .flat_map(|value| value.split(','))
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect();

    let parsed: Option<BTreeSet<SpecialtyId>> = values
        .iter()
        .map(|value| value.parse::<u64>().ok().map(SpecialtyId))
        .collect();

    parsed.unwrap_or_default()
}

fn parse_accessibility(raw: &str) -> Option<bool> {
    match raw.to_lowercase().as_str() {
        "sim" | "true" | "1" => Some(true),
        "nao" | "não" | "false" | "0" => Some(false),
        _ => None,
    }
}

pub(crate) fn parse_page(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|page| *page >= 1)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> SearchParams {
        SearchParams::from_pairs(pairs.iter().copied())
    }

    #[test]
    fn empty_query_applies_no_filter() {
        let parsed = params(&[]);
        assert!(parsed.filters.is_empty());
        assert_eq!(parsed.sort, SortKey::Relevance);
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.echo.sort, "relevancia");
    }

    #[test]
    fn malformed_location_ids_are_ignored() {
        let parsed = params(&[("cidade", "rio"), ("estado", "-3"), ("page", "abc")]);
        assert_eq!(parsed.filters.city, None);
        assert_eq!(parsed.filters.state, None);
        assert_eq!(parsed.page, 1);
        assert_eq!(parsed.echo.city, "rio");
    }

    #[test]
    fn unknown_modalities_are_dropped_individually() {
        let parsed = params(&[("tipos_sessao", "online"), ("tipos_sessao", "telepatia")]);
        assert_eq!(
            parsed.filters.modalities,
            BTreeSet::from([SessionModality::Online])
        );
    }

    #[test]
    fn specialties_accept_repeated_and_comma_separated_values() {
        let parsed = params(&[("especialidades", "3,5"), ("especialidades", "3")]);
        assert_eq!(
            parsed.filters.specialties,
            BTreeSet::from([SpecialtyId(3), SpecialtyId(5)])
        );
    }

    #[test]
    fn one_malformed_specialty_drops_the_category() {
        let parsed = params(&[("especialidades", "3"), ("especialidades", "x")]);
        assert!(parsed.filters.specialties.is_empty());
    }

    #[test]
    fn accessibility_and_enumerations_parse_or_fall_away() {
        let parsed = params(&[
            ("acessibilidade", "sim"),
            ("perfil_profissional", "espacos"),
            ("para_quem", "marcianos"),
            ("q", "   "),
            ("ordenacao", "melhor_avaliado"),
        ]);
        assert_eq!(parsed.filters.accessible, Some(true));
        assert_eq!(parsed.filters.profile_type, Some(ProfileType::Espacos));
        assert_eq!(parsed.filters.target_audience, None);
        assert_eq!(parsed.filters.text, None);
        assert_eq!(parsed.sort, SortKey::BestRated);

        let parsed = params(&[("acessibilidade", "talvez"), ("ordenacao", "aleatorio")]);
        assert_eq!(parsed.filters.accessible, None);
        assert_eq!(parsed.sort, SortKey::Relevance);
        assert_eq!(parsed.echo.sort, "aleatorio");
    }
}
