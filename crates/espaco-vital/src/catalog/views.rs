use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::domain::{
    City, CityId, ContactRequest, ContactRequestId, ContactStatus, ProfileType, Review,
    SessionModality, Specialty, SpecialtyId, State, StateId, TargetAudience, Therapist,
    TherapistId, TherapistSpecialty,
};
use super::filters::FilterEcho;
use super::ranking::{Ranked, SortKey};
use super::repository::CatalogSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialtyTag {
    pub id: SpecialtyId,
    pub name: String,
    pub slug: String,
    pub highlight_color: String,
}

impl From<&Specialty> for SpecialtyTag {
    fn from(specialty: &Specialty) -> Self {
        Self {
            id: specialty.id,
            name: specialty.name.clone(),
            slug: specialty.slug.clone(),
            highlight_color: specialty.highlight_color.clone(),
        }
    }
}

/// Summary shown in result lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TherapistCard {
    pub id: TherapistId,
    pub slug: String,
    pub display_name: String,
    pub short_bio: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub experience_years: u32,
    pub session_modalities: Vec<SessionModality>,
    pub profile_type: ProfileType,
    pub target_audience: TargetAudience,
    pub accessible: bool,
    pub specialties: Vec<SpecialtyTag>,
    pub verified: bool,
    pub featured: bool,
    pub premium: bool,
    pub average_rating: f64,
    pub review_count: u32,
}

impl TherapistCard {
    pub fn build(entry: &Ranked<'_>, snapshot: &CatalogSnapshot) -> Self {
        let therapist = entry.therapist;
        Self {
            id: therapist.id,
            slug: therapist.slug.clone(),
            display_name: therapist.display_name.clone(),
            short_bio: therapist.short_bio.clone(),
            location: therapist
                .city_id
                .and_then(|city_id| snapshot.location_label(city_id)),
            experience_years: therapist.experience_years,
            session_modalities: therapist.session_modalities.iter().copied().collect(),
            profile_type: therapist.profile_type,
            target_audience: therapist.target_audience,
            accessible: therapist.accessible,
            specialties: therapist
                .specialty_ids()
                .filter_map(|id| snapshot.specialty(id))
                .map(SpecialtyTag::from)
                .collect(),
            verified: therapist.verified,
            featured: therapist.featured,
            premium: therapist.premium,
            average_rating: entry.rating.average(),
            review_count: entry.rating.review_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageInfo {
    pub number: usize,
    pub total_pages: usize,
    pub page_size: usize,
    pub has_previous: bool,
    pub has_next: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub code: &'static str,
    pub label: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchFacets {
    pub states: Vec<State>,
    pub cities: Vec<City>,
    /// Cities of the selected state; empty when no state filter applies.
    pub state_cities: Vec<City>,
    pub specialties: Vec<SpecialtyTag>,
    pub session_modalities: Vec<Choice>,
    pub profile_types: Vec<Choice>,
    pub target_audiences: Vec<Choice>,
    pub sort_options: Vec<Choice>,
}

impl SearchFacets {
    /// Active specialties, states and cities, each sorted by name.
    pub fn build(snapshot: &CatalogSnapshot, state: Option<StateId>) -> Self {
        let mut states = snapshot.states.clone();
        states.sort_by(|a, b| a.name.cmp(&b.name));

        let mut cities = snapshot.cities.clone();
        cities.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        let state_cities = match state {
            Some(state_id) => cities
                .iter()
                .filter(|city| city.state_id == state_id)
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        let mut specialties: Vec<&Specialty> = snapshot.specialties.iter().collect();
        specialties.sort_by(|a, b| a.name.cmp(&b.name));

        Self {
            states,
            cities,
            state_cities,
            specialties: specialties.into_iter().map(SpecialtyTag::from).collect(),
            session_modalities: SessionModality::ordered()
                .into_iter()
                .map(|value| Choice {
                    code: value.code(),
                    label: value.label(),
                })
                .collect(),
            profile_types: ProfileType::ordered()
                .into_iter()
                .map(|value| Choice {
                    code: value.code(),
                    label: value.label(),
                })
                .collect(),
            target_audiences: TargetAudience::ordered()
                .into_iter()
                .map(|value| Choice {
                    code: value.code(),
                    label: value.label(),
                })
                .collect(),
            sort_options: [
                SortKey::Relevance,
                SortKey::BestRated,
                SortKey::MostExperienced,
                SortKey::Alphabetical,
            ]
            .into_iter()
            .map(|value| Choice {
                code: value.code(),
                label: value.label(),
            })
            .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPage {
    pub results: Vec<TherapistCard>,
    pub page: PageInfo,
    /// Size of the whole filtered set, not of this page.
    pub total_results: usize,
    pub filters: FilterEcho,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_label: Option<String>,
    pub facets: SearchFacets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty: Option<SpecialtyTag>,
    pub results: Vec<TherapistCard>,
    pub page: PageInfo,
    pub total_results: usize,
    pub facets: SearchFacets,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecialtyDetail {
    pub specialty: SpecialtyTag,
    pub primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_cents: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_minutes: Option<u32>,
    pub certification: String,
    pub years_of_experience: u32,
    pub notes: String,
}

impl SpecialtyDetail {
    pub fn build(pairing: &TherapistSpecialty, specialty: &Specialty) -> Self {
        Self {
            specialty: SpecialtyTag::from(specialty),
            primary: pairing.primary,
            price_cents: pairing.price_cents,
            session_minutes: pairing.session_minutes,
            certification: pairing.certification.clone(),
            years_of_experience: pairing.years_of_experience,
            notes: pairing.notes.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewView {
    pub client_name: String,
    pub score: u8,
    pub comment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_date: Option<NaiveDate>,
    pub recommends: bool,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Review> for ReviewView {
    fn from(review: &Review) -> Self {
        Self {
            client_name: review.client_name.clone(),
            score: review.score.value(),
            comment: review.comment.clone(),
            session_date: review.session_date,
            recommends: review.recommends,
            verified: review.verified,
            created_at: review.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProfileStats {
    pub review_count: u32,
    pub average_rating: f64,
    pub experience_years: u32,
    pub view_count: u32,
}

/// Public fields of a therapist shown on the profile page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TherapistDetails {
    pub id: TherapistId,
    pub slug: String,
    pub display_name: String,
    pub full_name: String,
    pub professional_email: String,
    pub phone: String,
    pub whatsapp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub neighborhood: String,
    pub professional_registration: String,
    pub education: String,
    pub session_modalities: Vec<SessionModality>,
    pub profile_type: ProfileType,
    pub target_audience: TargetAudience,
    pub accessible: bool,
    pub short_bio: String,
    pub long_bio: String,
    pub methodology: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
    pub featured: bool,
    pub premium: bool,
}

impl TherapistDetails {
    pub fn build(therapist: &Therapist, snapshot: &CatalogSnapshot) -> Self {
        Self {
            id: therapist.id,
            slug: therapist.slug.clone(),
            display_name: therapist.display_name.clone(),
            full_name: therapist.full_name.clone(),
            professional_email: therapist.professional_email.clone(),
            phone: therapist.phone.clone(),
            whatsapp: therapist.whatsapp.clone(),
            location: therapist
                .city_id
                .and_then(|city_id| snapshot.location_label(city_id)),
            neighborhood: therapist.neighborhood.clone(),
            professional_registration: therapist.professional_registration.clone(),
            education: therapist.education.clone(),
            session_modalities: therapist.session_modalities.iter().copied().collect(),
            profile_type: therapist.profile_type,
            target_audience: therapist.target_audience,
            accessible: therapist.accessible,
            short_bio: therapist.short_bio.clone(),
            long_bio: therapist.long_bio.clone(),
            methodology: therapist.methodology.clone(),
            verified: therapist.verified,
            verified_at: therapist.verified_at,
            featured: therapist.featured,
            premium: therapist.premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub therapist: TherapistDetails,
    pub specialties: Vec<SpecialtyDetail>,
    pub recent_reviews: Vec<ReviewView>,
    pub stats: ProfileStats,
    pub related: Vec<TherapistCard>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactFormView {
    pub therapist: TherapistCard,
    pub specialties: Vec<SpecialtyTag>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactConfirmation {
    pub therapist: TherapistCard,
    pub request_id: ContactRequestId,
    pub status: ContactStatus,
    pub status_label: &'static str,
    pub subject: String,
    pub message: String,
}

/// Inbox row for the therapist-facing listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InboxEntry {
    pub id: ContactRequestId,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub subject: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub specialty_of_interest: Option<String>,
    pub status: ContactStatus,
    pub status_label: &'static str,
    pub created_at: DateTime<Utc>,
}

impl InboxEntry {
    pub fn build(request: &ContactRequest, snapshot: &CatalogSnapshot) -> Self {
        Self {
            id: request.id,
            sender_name: request.sender_name.clone(),
            sender_email: request.sender_email.clone(),
            sender_phone: request.sender_phone.clone(),
            subject: request.subject.clone(),
            message: request.message.clone(),
            specialty_of_interest: request
                .specialty_of_interest
                .and_then(|id| snapshot.specialty(id))
                .map(|specialty| specialty.name.clone()),
            status: request.status,
            status_label: request.status.label(),
            created_at: request.created_at,
        }
    }
}

/// Autocomplete row; keys follow the public JSON contract.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutocompleteHit {
    pub id: TherapistId,
    #[serde(rename = "nome")]
    pub name: String,
    pub slug: String,
    #[serde(rename = "cidade")]
    pub location: String,
    #[serde(rename = "especialidades")]
    pub specialties: Vec<String>,
    pub rating: f64,
    #[serde(rename = "verificado")]
    pub verified: bool,
    pub premium: bool,
}

impl AutocompleteHit {
    pub fn build(entry: &Ranked<'_>, snapshot: &CatalogSnapshot) -> Self {
        let therapist = entry.therapist;
        Self {
            id: therapist.id,
            name: therapist.display_name.clone(),
            slug: therapist.slug.clone(),
            location: therapist
                .city_id
                .and_then(|city_id| snapshot.location_label(city_id))
                .unwrap_or_default(),
            specialties: snapshot
                .specialty_names(therapist)
                .into_iter()
                .take(2)
                .map(str::to_string)
                .collect(),
            rating: entry.rating.average(),
            verified: therapist.verified,
            premium: therapist.premium,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CityOption {
    pub id: CityId,
    #[serde(rename = "nome")]
    pub name: String,
}

impl From<City> for CityOption {
    fn from(city: City) -> Self {
        Self {
            id: city.id,
            name: city.name,
        }
    }
}
