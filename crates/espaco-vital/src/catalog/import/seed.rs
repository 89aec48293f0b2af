use std::collections::{BTreeSet, HashMap};
use std::io::Read;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use super::locations::LocationIndex;
use super::{CatalogImportError, ImportSummary};
use crate::catalog::domain::{
    ClientId, ProfileType, ReviewScore, SessionModality, SpecialtyId, TargetAudience, TherapistId,
    TherapistSpecialty,
};
use crate::catalog::repository::{
    default_active, CatalogRepository, NewReview, NewSpecialty, NewTherapist, Visibility,
};

/// Whole-catalog fixture. Rows reference each other by natural keys: state
/// abbreviation, city name, specialty name and therapist slug.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CatalogSeed {
    pub states: Vec<SeedState>,
    pub cities: Vec<SeedLocation>,
    pub specialties: Vec<NewSpecialty>,
    pub therapists: Vec<SeedTherapist>,
    pub reviews: Vec<SeedReview>,
}

impl CatalogSeed {
    pub fn from_reader<Rd: Read>(reader: Rd) -> Result<Self, CatalogImportError> {
        Ok(serde_json::from_reader(reader)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedState {
    pub name: String,
    pub abbreviation: String,
}

/// A city, addressed by its name and the abbreviation of its state.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SeedLocation {
    pub city: String,
    pub state: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedPairing {
    pub specialty: String,
    #[serde(default)]
    pub price_cents: Option<u64>,
    #[serde(default)]
    pub session_minutes: Option<u32>,
    #[serde(default)]
    pub certification: String,
    #[serde(default)]
    pub years_of_experience: u32,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub primary: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedTherapist {
    pub full_name: String,
    pub display_name: String,
    #[serde(default)]
    pub professional_email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub whatsapp: String,
    #[serde(default)]
    pub location: Option<SeedLocation>,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub professional_registration: String,
    #[serde(default)]
    pub education: String,
    #[serde(default)]
    pub experience_years: u32,
    #[serde(default)]
    pub session_modalities: BTreeSet<SessionModality>,
    #[serde(default)]
    pub profile_type: ProfileType,
    #[serde(default)]
    pub target_audience: TargetAudience,
    #[serde(default)]
    pub accessible: bool,
    #[serde(default)]
    pub short_bio: String,
    #[serde(default)]
    pub long_bio: String,
    #[serde(default)]
    pub methodology: String,
    #[serde(default)]
    pub specialties: Vec<SeedPairing>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub premium: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SeedReview {
    pub therapist: String,
    pub client_id: ClientId,
    pub client_name: String,
    pub score: ReviewScore,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub session_date: Option<NaiveDate>,
    #[serde(default = "default_active")]
    pub recommends: bool,
    #[serde(default)]
    pub verified: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Writes a seed through the repository. States and cities that already
/// exist are reused; everything else must be new.
pub fn apply_seed<R>(repository: &R, seed: CatalogSeed) -> Result<ImportSummary, CatalogImportError>
where
    R: CatalogRepository + ?Sized,
{
    let mut summary = ImportSummary::default();
    let mut locations = LocationIndex::load(repository)?;

    for state in &seed.states {
        locations.ensure_state(repository, &state.name, &state.abbreviation, &mut summary)?;
    }

    for city in &seed.cities {
        let state_id = locations
            .state(&city.state)
            .ok_or_else(|| unknown("state", &city.state))?;
        locations.ensure_city(repository, state_id, &city.city, &mut summary)?;
    }

    let existing = repository.snapshot(Visibility::IncludeInactive)?;
    let mut specialties: HashMap<String, SpecialtyId> = existing
        .specialties
        .iter()
        .map(|specialty| (specialty.name.clone(), specialty.id))
        .collect();
    let mut therapists: HashMap<String, TherapistId> = existing
        .therapists
        .iter()
        .map(|therapist| (therapist.slug.clone(), therapist.id))
        .collect();

    for specialty in seed.specialties {
        let stored = repository.insert_specialty(specialty)?;
        summary.specialties += 1;
        specialties.insert(stored.name, stored.id);
    }

    for therapist in seed.therapists {
        let city_id = match &therapist.location {
            Some(location) => {
                let state_id = locations
                    .state(&location.state)
                    .ok_or_else(|| unknown("state", &location.state))?;
                let city_id = locations
                    .city(state_id, &location.city)
                    .ok_or_else(|| unknown("city", &location.city))?;
                Some(city_id)
            }
            None => None,
        };

        let pairings = therapist
            .specialties
            .iter()
            .map(|pairing| {
                let specialty_id = specialties
                    .get(pairing.specialty.trim())
                    .copied()
                    .ok_or_else(|| unknown("specialty", &pairing.specialty))?;
                Ok(TherapistSpecialty {
                    specialty_id,
                    price_cents: pairing.price_cents,
                    session_minutes: pairing.session_minutes,
                    certification: pairing.certification.clone(),
                    years_of_experience: pairing.years_of_experience,
                    notes: pairing.notes.clone(),
                    primary: pairing.primary,
                    is_active: pairing.is_active,
                })
            })
            .collect::<Result<Vec<_>, CatalogImportError>>()?;

        let stored = repository.insert_therapist(NewTherapist {
            full_name: therapist.full_name,
            display_name: therapist.display_name,
            professional_email: therapist.professional_email,
            phone: therapist.phone,
            whatsapp: therapist.whatsapp,
            city_id,
            neighborhood: therapist.neighborhood,
            professional_registration: therapist.professional_registration,
            education: therapist.education,
            experience_years: therapist.experience_years,
            session_modalities: therapist.session_modalities,
            profile_type: therapist.profile_type,
            target_audience: therapist.target_audience,
            accessible: therapist.accessible,
            short_bio: therapist.short_bio,
            long_bio: therapist.long_bio,
            methodology: therapist.methodology,
            specialties: pairings,
            verified: therapist.verified,
            featured: therapist.featured,
            premium: therapist.premium,
            is_active: therapist.is_active,
            created_at: therapist.created_at,
        })?;
        summary.therapists += 1;
        therapists.insert(stored.slug, stored.id);
    }

    for review in seed.reviews {
        let therapist_id = therapists
            .get(review.therapist.trim())
            .copied()
            .ok_or_else(|| unknown("therapist", &review.therapist))?;
        repository.insert_review(NewReview {
            therapist_id,
            client_id: review.client_id,
            client_name: review.client_name,
            score: review.score,
            comment: review.comment,
            session_date: review.session_date,
            recommends: review.recommends,
            verified: review.verified,
            is_active: review.is_active,
            created_at: review.created_at,
        })?;
        summary.reviews += 1;
    }

    tracing::info!(
        states = summary.states,
        cities = summary.cities,
        specialties = summary.specialties,
        therapists = summary.therapists,
        reviews = summary.reviews,
        "catalog seed applied"
    );
    Ok(summary)
}

fn unknown(kind: &'static str, key: &str) -> CatalogImportError {
    CatalogImportError::UnknownReference {
        kind,
        key: key.trim().to_string(),
    }
}
