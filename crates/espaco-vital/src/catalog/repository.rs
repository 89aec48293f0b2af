use std::collections::{BTreeSet, HashMap};
use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{
    City, CityId, ClientId, ContactRequest, ContactRequestId, ContactStatus, ProfileType, Review,
    ReviewScore, SessionModality, Specialty, SpecialtyId, State, StateId, TargetAudience,
    Therapist, TherapistId, TherapistSpecialty,
};
use super::rating::RatingSummary;

/// Whether a read may see soft-deleted (`is_active == false`) rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    ActiveOnly,
    IncludeInactive,
}

impl Visibility {
    pub const fn admits(self, is_active: bool) -> bool {
        match self {
            Visibility::ActiveOnly => is_active,
            Visibility::IncludeInactive => true,
        }
    }
}

/// Point-in-time copy of the catalog that search and ranking run against.
///
/// With [`Visibility::ActiveOnly`] inactive therapists, specialties, reviews and
/// specialty pairings are already removed.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub states: Vec<State>,
    pub cities: Vec<City>,
    pub specialties: Vec<Specialty>,
    pub therapists: Vec<Therapist>,
    pub reviews: Vec<Review>,
}

impl CatalogSnapshot {
    pub fn state(&self, id: StateId) -> Option<&State> {
        self.states.iter().find(|state| state.id == id)
    }

    pub fn city(&self, id: CityId) -> Option<&City> {
        self.cities.iter().find(|city| city.id == id)
    }

    pub fn specialty(&self, id: SpecialtyId) -> Option<&Specialty> {
        self.specialties.iter().find(|specialty| specialty.id == id)
    }

    pub fn rating(&self, therapist_id: TherapistId) -> RatingSummary {
        RatingSummary::from_reviews(therapist_id, &self.reviews)
    }

    /// Ratings of every reviewed therapist; absent entries mean no reviews.
    pub fn ratings(&self) -> HashMap<TherapistId, RatingSummary> {
        RatingSummary::index(&self.reviews)
    }

    /// `"<city> - <UF>"`, the label used on cards and the search header.
    pub fn location_label(&self, city_id: CityId) -> Option<String> {
        let city = self.city(city_id)?;
        let state = self.state(city.state_id)?;
        Some(format!("{} - {}", city.name, state.abbreviation))
    }

    pub fn specialty_names<'a>(&'a self, therapist: &'a Therapist) -> Vec<&'a str> {
        therapist
            .specialty_ids()
            .filter_map(|id| self.specialty(id))
            .map(|specialty| specialty.name.as_str())
            .collect()
    }
}

/// Storage abstraction for the therapist catalog.
///
/// Every write is a single atomic update; implementations must not expose a
/// state where a contact request exists without its counter increment.
pub trait CatalogRepository: Send + Sync {
    fn snapshot(&self, visibility: Visibility) -> Result<CatalogSnapshot, RepositoryError>;
    fn therapist_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Therapist>, RepositoryError>;
    fn specialty_by_id(
        &self,
        id: SpecialtyId,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError>;
    fn specialty_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError>;
    fn cities_by_state(&self, state_id: StateId) -> Result<Vec<City>, RepositoryError>;

    /// Increments the view counter and returns the new value.
    fn record_profile_view(&self, id: TherapistId) -> Result<u32, RepositoryError>;
    /// Persists the request with status `Enviado` and increments the target's
    /// contact counter in the same update.
    fn record_contact_request(
        &self,
        request: NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError>;
    fn contact_requests_for(
        &self,
        therapist_id: TherapistId,
    ) -> Result<Vec<ContactRequest>, RepositoryError>;
    fn set_contact_status(
        &self,
        ids: &[ContactRequestId],
        status: ContactStatus,
    ) -> Result<usize, RepositoryError>;
    fn update_therapists(
        &self,
        ids: &[TherapistId],
        update: TherapistUpdate,
    ) -> Result<usize, RepositoryError>;

    fn insert_state(&self, state: NewState) -> Result<State, RepositoryError>;
    fn insert_city(&self, city: NewCity) -> Result<City, RepositoryError>;
    fn insert_specialty(&self, specialty: NewSpecialty) -> Result<Specialty, RepositoryError>;
    fn insert_therapist(&self, therapist: NewTherapist) -> Result<Therapist, RepositoryError>;
    fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists: {0}")]
    Conflict(String),
    #[error("record not found")]
    NotFound,
    #[error("invalid record: {0}")]
    Invalid(String),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Bulk status transitions used by the administrative tooling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TherapistUpdate {
    Verify { at: DateTime<Utc> },
    RemoveVerification,
    MarkFeatured,
    SetActive(bool),
}

impl TherapistUpdate {
    pub fn apply(self, therapist: &mut Therapist, now: DateTime<Utc>) {
        match self {
            TherapistUpdate::Verify { at } => {
                therapist.verified = true;
                therapist.verified_at = Some(at);
            }
            TherapistUpdate::RemoveVerification => {
                therapist.verified = false;
                therapist.verified_at = None;
            }
            TherapistUpdate::MarkFeatured => therapist.featured = true,
            TherapistUpdate::SetActive(active) => therapist.is_active = active,
        }
        therapist.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewState {
    pub name: String,
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCity {
    pub name: String,
    pub state_id: StateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSpecialty {
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default = "default_highlight_color")]
    pub highlight_color: String,
    #[serde(default)]
    pub display_order: u32,
    #[serde(default)]
    pub featured: bool,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

pub(crate) fn default_highlight_color() -> String {
    "#0B5259".to_string()
}

pub(crate) fn default_active() -> bool {
    true
}

impl NewSpecialty {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            short_description: String::new(),
            long_description: String::new(),
            highlight_color: default_highlight_color(),
            display_order: 0,
            featured: false,
            is_active: true,
        }
    }
}

/// Input for registering a therapist. The slug is derived from
/// `display_name` by the repository and never recomputed afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTherapist {
    pub full_name: String,
    pub display_name: String,
    pub professional_email: String,
    pub phone: String,
    pub whatsapp: String,
    pub city_id: Option<CityId>,
    pub neighborhood: String,
    pub professional_registration: String,
    pub education: String,
    pub experience_years: u32,
    pub session_modalities: BTreeSet<SessionModality>,
    pub profile_type: ProfileType,
    pub target_audience: TargetAudience,
    pub accessible: bool,
    pub short_bio: String,
    pub long_bio: String,
    pub methodology: String,
    pub specialties: Vec<TherapistSpecialty>,
    pub verified: bool,
    pub featured: bool,
    pub premium: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl NewTherapist {
    pub fn named(full_name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            display_name: display_name.into(),
            professional_email: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            city_id: None,
            neighborhood: String::new(),
            professional_registration: String::new(),
            education: String::new(),
            experience_years: 0,
            session_modalities: BTreeSet::new(),
            profile_type: ProfileType::default(),
            target_audience: TargetAudience::default(),
            accessible: false,
            short_bio: String::new(),
            long_bio: String::new(),
            methodology: String::new(),
            specialties: Vec::new(),
            verified: false,
            featured: false,
            premium: false,
            is_active: true,
            created_at: None,
        }
    }
}

impl TherapistSpecialty {
    pub fn basic(specialty_id: SpecialtyId) -> Self {
        Self {
            specialty_id,
            price_cents: None,
            session_minutes: None,
            certification: String::new(),
            years_of_experience: 0,
            notes: String::new(),
            primary: false,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
    pub therapist_id: TherapistId,
    pub client_id: ClientId,
    pub client_name: String,
    pub score: ReviewScore,
    pub comment: String,
    pub session_date: Option<NaiveDate>,
    pub recommends: bool,
    pub verified: bool,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

/// Validated contact request ready to be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewContactRequest {
    pub therapist_id: TherapistId,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub subject: String,
    pub message: String,
    pub specialty_of_interest: Option<SpecialtyId>,
    pub origin_ip: Option<IpAddr>,
}
