use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    City, CityId, ContactRequest, ContactRequestId, ContactStatus, Review, ReviewId, Specialty,
    SpecialtyId, State, StateId, Therapist, TherapistId,
};
use super::repository::{
    CatalogRepository, CatalogSnapshot, NewCity, NewContactRequest, NewReview, NewSpecialty,
    NewState, NewTherapist, RepositoryError, TherapistUpdate, Visibility,
};
use super::slug::slugify;

#[derive(Debug, Default)]
struct CatalogTables {
    states: Vec<State>,
    cities: Vec<City>,
    specialties: Vec<Specialty>,
    therapists: Vec<Therapist>,
    reviews: Vec<Review>,
    contact_requests: Vec<ContactRequest>,
    last_id: u64,
}

impl CatalogTables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn therapist_mut(&mut self, id: TherapistId) -> Option<&mut Therapist> {
        self.therapists
            .iter_mut()
            .find(|therapist| therapist.id == id)
    }
}

/// Process-local catalog store. One mutex guards every table so each write is
/// a single critical section.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCatalog {
    tables: Arc<Mutex<CatalogTables>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, CatalogTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("catalog lock poisoned".to_string()))
    }
}

fn visible_therapist(therapist: &Therapist, visibility: Visibility) -> Option<Therapist> {
    if !visibility.admits(therapist.is_active) {
        return None;
    }
    let mut copy = therapist.clone();
    copy.specialties
        .retain(|pairing| visibility.admits(pairing.is_active));
    Some(copy)
}

impl CatalogRepository for InMemoryCatalog {
    fn snapshot(&self, visibility: Visibility) -> Result<CatalogSnapshot, RepositoryError> {
        let tables = self.tables()?;
        let specialties: Vec<Specialty> = tables
            .specialties
            .iter()
            .filter(|specialty| visibility.admits(specialty.is_active))
            .cloned()
            .collect();
        let visible_specialties: HashSet<SpecialtyId> =
            specialties.iter().map(|specialty| specialty.id).collect();

        let therapists = tables
            .therapists
            .iter()
            .filter_map(|therapist| visible_therapist(therapist, visibility))
            .map(|mut therapist| {
                therapist
                    .specialties
                    .retain(|pairing| visible_specialties.contains(&pairing.specialty_id));
                therapist
            })
            .collect();

        let reviews = tables
            .reviews
            .iter()
            .filter(|review| visibility.admits(review.is_active))
            .cloned()
            .collect();

        Ok(CatalogSnapshot {
            states: tables.states.clone(),
            cities: tables.cities.clone(),
            specialties,
            therapists,
            reviews,
        })
    }

    fn therapist_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Therapist>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .therapists
            .iter()
            .find(|therapist| therapist.slug == slug)
            .and_then(|therapist| visible_therapist(therapist, visibility)))
    }

    fn specialty_by_id(
        &self,
        id: SpecialtyId,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .specialties
            .iter()
            .find(|specialty| specialty.id == id && visibility.admits(specialty.is_active))
            .cloned())
    }

    fn specialty_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .specialties
            .iter()
            .find(|specialty| specialty.slug == slug && visibility.admits(specialty.is_active))
            .cloned())
    }

    fn cities_by_state(&self, state_id: StateId) -> Result<Vec<City>, RepositoryError> {
        let tables = self.tables()?;
        let mut cities: Vec<City> = tables
            .cities
            .iter()
            .filter(|city| city.state_id == state_id)
            .cloned()
            .collect();
        cities.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cities)
    }

    fn record_profile_view(&self, id: TherapistId) -> Result<u32, RepositoryError> {
        let mut tables = self.tables()?;
        let therapist = tables.therapist_mut(id).ok_or(RepositoryError::NotFound)?;
        therapist.view_count = therapist.view_count.saturating_add(1);
        Ok(therapist.view_count)
    }

    fn record_contact_request(
        &self,
        request: NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.therapist_mut(request.therapist_id).is_none() {
            return Err(RepositoryError::NotFound);
        }

        let now = Utc::now();
        let id = ContactRequestId(tables.next_id());
        let record = ContactRequest {
            id,
            therapist_id: request.therapist_id,
            sender_name: request.sender_name,
            sender_email: request.sender_email,
            sender_phone: request.sender_phone,
            subject: request.subject,
            message: request.message,
            specialty_of_interest: request.specialty_of_interest,
            status: ContactStatus::Enviado,
            origin_ip: request.origin_ip,
            created_at: now,
            updated_at: now,
        };
        tables.contact_requests.push(record.clone());

        if let Some(therapist) = tables.therapist_mut(record.therapist_id) {
            therapist.contact_count = therapist.contact_count.saturating_add(1);
        }

        Ok(record)
    }

    fn contact_requests_for(
        &self,
        therapist_id: TherapistId,
    ) -> Result<Vec<ContactRequest>, RepositoryError> {
        let tables = self.tables()?;
        let mut requests: Vec<ContactRequest> = tables
            .contact_requests
            .iter()
            .filter(|request| request.therapist_id == therapist_id)
            .cloned()
            .collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(requests)
    }

    fn set_contact_status(
        &self,
        ids: &[ContactRequestId],
        status: ContactStatus,
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let mut updated = 0;
        for request in tables
            .contact_requests
            .iter_mut()
            .filter(|request| ids.contains(&request.id))
        {
            request.status = status;
            request.updated_at = now;
            updated += 1;
        }
        Ok(updated)
    }

    fn update_therapists(
        &self,
        ids: &[TherapistId],
        update: TherapistUpdate,
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let mut updated = 0;
        for therapist in tables
            .therapists
            .iter_mut()
            .filter(|therapist| ids.contains(&therapist.id))
        {
            update.apply(therapist, now);
            updated += 1;
        }
        Ok(updated)
    }

    fn insert_state(&self, state: NewState) -> Result<State, RepositoryError> {
        let mut tables = self.tables()?;
        let abbreviation = state.abbreviation.trim().to_ascii_uppercase();
        if abbreviation.len() != 2 {
            return Err(RepositoryError::Invalid(format!(
                "state abbreviation must have two letters (found '{abbreviation}')"
            )));
        }
        if tables
            .states
            .iter()
            .any(|existing| existing.abbreviation == abbreviation)
        {
            return Err(RepositoryError::Conflict(format!("state {abbreviation}")));
        }

        let record = State {
            id: StateId(tables.next_id()),
            name: state.name.trim().to_string(),
            abbreviation,
        };
        tables.states.push(record.clone());
        Ok(record)
    }

    fn insert_city(&self, city: NewCity) -> Result<City, RepositoryError> {
        let mut tables = self.tables()?;
        if !tables.states.iter().any(|state| state.id == city.state_id) {
            return Err(RepositoryError::Invalid(format!(
                "unknown state {}",
                city.state_id
            )));
        }
        let name = city.name.trim().to_string();
        if tables
            .cities
            .iter()
            .any(|existing| existing.state_id == city.state_id && existing.name == name)
        {
            return Err(RepositoryError::Conflict(format!(
                "city {name} in state {}",
                city.state_id
            )));
        }

        let record = City {
            id: CityId(tables.next_id()),
            name,
            state_id: city.state_id,
        };
        tables.cities.push(record.clone());
        Ok(record)
    }

    fn insert_specialty(&self, specialty: NewSpecialty) -> Result<Specialty, RepositoryError> {
        let mut tables = self.tables()?;
        let name = specialty.name.trim().to_string();
        let slug = slugify(&name);
        if slug.is_empty() {
            return Err(RepositoryError::Invalid(
                "specialty name must contain letters or digits".to_string(),
            ));
        }
        if tables
            .specialties
            .iter()
            .any(|existing| existing.name == name || existing.slug == slug)
        {
            return Err(RepositoryError::Conflict(format!("specialty {name}")));
        }

        let now = Utc::now();
        let record = Specialty {
            id: SpecialtyId(tables.next_id()),
            name,
            slug,
            short_description: specialty.short_description,
            long_description: specialty.long_description,
            highlight_color: specialty.highlight_color,
            display_order: specialty.display_order,
            featured: specialty.featured,
            is_active: specialty.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.specialties.push(record.clone());
        Ok(record)
    }

    fn insert_therapist(&self, therapist: NewTherapist) -> Result<Therapist, RepositoryError> {
        let mut tables = self.tables()?;
        let slug = slugify(&therapist.display_name);
        if slug.is_empty() {
            return Err(RepositoryError::Invalid(
                "display name must contain letters or digits".to_string(),
            ));
        }
        if tables.therapists.iter().any(|existing| existing.slug == slug) {
            return Err(RepositoryError::Conflict(format!("therapist slug {slug}")));
        }
        if let Some(city_id) = therapist.city_id {
            if !tables.cities.iter().any(|city| city.id == city_id) {
                return Err(RepositoryError::Invalid(format!("unknown city {city_id}")));
            }
        }

        let mut seen = HashSet::new();
        for pairing in &therapist.specialties {
            if !tables
                .specialties
                .iter()
                .any(|specialty| specialty.id == pairing.specialty_id)
            {
                return Err(RepositoryError::Invalid(format!(
                    "unknown specialty {}",
                    pairing.specialty_id
                )));
            }
            if !seen.insert(pairing.specialty_id) {
                return Err(RepositoryError::Conflict(format!(
                    "specialty {} listed twice for {slug}",
                    pairing.specialty_id
                )));
            }
        }

        let now = Utc::now();
        let created_at = therapist.created_at.unwrap_or(now);
        let record = Therapist {
            id: TherapistId(tables.next_id()),
            full_name: therapist.full_name,
            display_name: therapist.display_name,
            slug,
            professional_email: therapist.professional_email,
            phone: therapist.phone,
            whatsapp: therapist.whatsapp,
            city_id: therapist.city_id,
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
            specialties: therapist.specialties,
            verified: therapist.verified,
            verified_at: therapist.verified.then_some(created_at),
            featured: therapist.featured,
            premium: therapist.premium,
            view_count: 0,
            contact_count: 0,
            is_active: therapist.is_active,
            created_at,
            updated_at: now,
        };
        tables.therapists.push(record.clone());
        Ok(record)
    }

    fn insert_review(&self, review: NewReview) -> Result<Review, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.therapist_mut(review.therapist_id).is_none() {
            return Err(RepositoryError::Invalid(format!(
                "unknown therapist {}",
                review.therapist_id
            )));
        }
        if tables.reviews.iter().any(|existing| {
            existing.therapist_id == review.therapist_id && existing.client_id == review.client_id
        }) {
            return Err(RepositoryError::Conflict(format!(
                "client {} already reviewed therapist {}",
                review.client_id, review.therapist_id
            )));
        }

        let record = Review {
            id: ReviewId(tables.next_id()),
            therapist_id: review.therapist_id,
            client_id: review.client_id,
            client_name: review.client_name,
            score: review.score,
            comment: review.comment,
            session_date: review.session_date,
            recommends: review.recommends,
            verified: review.verified,
            is_active: review.is_active,
            created_at: review.created_at.unwrap_or_else(Utc::now),
        };
        tables.reviews.push(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{ClientId, ReviewScore, TherapistSpecialty};

    fn seeded() -> (InMemoryCatalog, Therapist, Specialty) {
        let catalog = InMemoryCatalog::new();
        let specialty = catalog
            .insert_specialty(NewSpecialty::named("Reiki"))
            .expect("specialty");
        let mut draft = NewTherapist::named("Ana Maria Silva", "Ana Silva");
        draft
            .specialties
            .push(TherapistSpecialty::basic(specialty.id));
        let therapist = catalog.insert_therapist(draft).expect("therapist");
        (catalog, therapist, specialty)
    }

    #[test]
    fn therapist_slug_is_derived_once_and_unique() {
        let (catalog, therapist, _) = seeded();
        assert_eq!(therapist.slug, "ana-silva");

        let err = catalog
            .insert_therapist(NewTherapist::named("Ana Beatriz Silva", "Ana  Silva"))
            .expect_err("slug collision");
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn review_pair_is_unique() {
        let (catalog, therapist, _) = seeded();
        let review = NewReview {
            therapist_id: therapist.id,
            client_id: ClientId(7),
            client_name: "Carla".to_string(),
            score: ReviewScore::new(5).expect("score"),
            comment: String::new(),
            session_date: None,
            recommends: true,
            verified: false,
            is_active: true,
            created_at: None,
        };
        catalog.insert_review(review.clone()).expect("first review");
        let err = catalog.insert_review(review).expect_err("duplicate pair");
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn active_snapshot_hides_inactive_rows() {
        let (catalog, therapist, specialty) = seeded();
        catalog
            .update_therapists(&[therapist.id], TherapistUpdate::SetActive(false))
            .expect("deactivate");

        let active = catalog.snapshot(Visibility::ActiveOnly).expect("snapshot");
        assert!(active.therapists.is_empty());
        assert_eq!(active.specialties.len(), 1);

        let everything = catalog
            .snapshot(Visibility::IncludeInactive)
            .expect("snapshot");
        assert_eq!(everything.therapists.len(), 1);
        assert!(everything.therapists[0].offers_specialty(specialty.id));
    }

    #[test]
    fn contact_request_increments_counter_atomically() {
        let (catalog, therapist, _) = seeded();
        let request = catalog
            .record_contact_request(NewContactRequest {
                therapist_id: therapist.id,
                sender_name: "João".to_string(),
                sender_email: "joao@example.com".to_string(),
                sender_phone: String::new(),
                subject: "Agendamento".to_string(),
                message: "Gostaria de marcar uma sessão".to_string(),
                specialty_of_interest: None,
                origin_ip: None,
            })
            .expect("request stored");
        assert_eq!(request.status, ContactStatus::Enviado);

        let stored = catalog
            .therapist_by_slug("ana-silva", Visibility::ActiveOnly)
            .expect("lookup")
            .expect("therapist exists");
        assert_eq!(stored.contact_count, 1);
    }

    #[test]
    fn city_is_unique_per_state() {
        let catalog = InMemoryCatalog::new();
        let rj = catalog
            .insert_state(NewState {
                name: "Rio de Janeiro".to_string(),
                abbreviation: "rj".to_string(),
            })
            .expect("state");
        assert_eq!(rj.abbreviation, "RJ");
        let sp = catalog
            .insert_state(NewState {
                name: "São Paulo".to_string(),
                abbreviation: "SP".to_string(),
            })
            .expect("state");

        catalog
            .insert_city(NewCity {
                name: "Niterói".to_string(),
                state_id: rj.id,
            })
            .expect("city");
        assert!(catalog
            .insert_city(NewCity {
                name: "Niterói".to_string(),
                state_id: rj.id,
            })
            .is_err());
        catalog
            .insert_city(NewCity {
                name: "Niterói".to_string(),
                state_id: sp.id,
            })
            .expect("same name in another state");
    }
}
