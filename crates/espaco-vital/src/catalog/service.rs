use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;

use super::domain::{
    ContactRequestId, ContactStatus, SpecialtyId, StateId, Therapist, TherapistId,
};
use super::filters::SearchParams;
use super::ranking::Ranked;
use super::repository::{
    CatalogRepository, CatalogSnapshot, NewContactRequest, RepositoryError, TherapistUpdate,
    Visibility,
};
use super::search;
use super::views::{
    AutocompleteHit, CityOption, ContactConfirmation, ContactFormView, InboxEntry, ListingPage,
    ProfileView, SearchPage, SpecialtyTag, TherapistCard,
};

/// Public contact form as posted by the profile page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactForm {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "assunto")]
    pub subject: String,
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "especialidade_interesse")]
    pub specialty_of_interest: String,
}

impl ContactForm {
    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("nome", &self.name),
            ("email", &self.email),
            ("assunto", &self.subject),
            ("mensagem", &self.message),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Por favor, preencha todos os campos obrigatórios.")]
pub struct ContactValidationError {
    pub missing: Vec<&'static str>,
}

/// Read and write operations behind the therapist directory pages.
pub struct DirectoryService<R> {
    repository: Arc<R>,
}

impl<R> DirectoryService<R>
where
    R: CatalogRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn search(&self, params: &SearchParams) -> Result<SearchPage, DirectoryServiceError> {
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::search(&snapshot, params))
    }

    pub fn listing(&self, page: usize) -> Result<ListingPage, DirectoryServiceError> {
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::listing(&snapshot, None, page))
    }

    pub fn specialty_listing(
        &self,
        slug: &str,
        page: usize,
    ) -> Result<ListingPage, DirectoryServiceError> {
        let specialty = self
            .repository
            .specialty_by_slug(slug, Visibility::ActiveOnly)?
            .ok_or(DirectoryServiceError::NotFound)?;
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::listing(&snapshot, Some(&specialty), page))
    }

    /// Loads a profile and counts the visit.
    pub fn profile(&self, slug: &str) -> Result<ProfileView, DirectoryServiceError> {
        let therapist = self
            .repository
            .therapist_by_slug(slug, Visibility::ActiveOnly)?
            .ok_or(DirectoryServiceError::NotFound)?;

        let view_count = self.repository.record_profile_view(therapist.id)?;
        tracing::debug!(therapist = %therapist.id, view_count, "profile view recorded");

        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::profile(&snapshot, &therapist, view_count))
    }

    pub fn contact_form(&self, slug: &str) -> Result<ContactFormView, DirectoryServiceError> {
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        let therapist = snapshot
            .therapists
            .iter()
            .find(|therapist| therapist.slug == slug)
            .ok_or(DirectoryServiceError::NotFound)?;

        let card = card_for(&snapshot, therapist);

        Ok(ContactFormView {
            specialties: card.specialties.clone(),
            therapist: card,
        })
    }

    /// Validates and stores a contact request for the therapist at `slug`.
    ///
    /// An unknown or inactive specialty of interest is stored as absent.
    pub fn submit_contact(
        &self,
        slug: &str,
        form: ContactForm,
        origin_ip: Option<IpAddr>,
    ) -> Result<ContactConfirmation, DirectoryServiceError> {
        let therapist = self
            .repository
            .therapist_by_slug(slug, Visibility::ActiveOnly)?
            .ok_or(DirectoryServiceError::NotFound)?;

        let missing = form.missing_fields();
        if !missing.is_empty() {
            return Err(ContactValidationError { missing }.into());
        }

        let specialty_of_interest = match form.specialty_of_interest.trim().parse::<u64>() {
            Ok(id) => self
                .repository
                .specialty_by_id(SpecialtyId(id), Visibility::ActiveOnly)?
                .map(|specialty| specialty.id),
            Err(_) => None,
        };

        let request = self
            .repository
            .record_contact_request(NewContactRequest {
                therapist_id: therapist.id,
                sender_name: form.name.trim().to_string(),
                sender_email: form.email.trim().to_string(),
                sender_phone: form.phone.trim().to_string(),
                subject: form.subject.trim().to_string(),
                message: form.message.trim().to_string(),
                specialty_of_interest,
                origin_ip,
            })
            .map_err(|error| {
                tracing::error!(therapist = %therapist.id, %error, "contact request failed");
                error
            })?;

        tracing::info!(
            therapist = %therapist.id,
            request = %request.id,
            "contact request recorded"
        );

        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(ContactConfirmation {
            message: format!(
                "Sua mensagem foi enviada com sucesso para {}! Eles entrarão em contato em breve.",
                therapist.display_name
            ),
            therapist: card_for(&snapshot, &therapist),
            request_id: request.id,
            status: request.status,
            status_label: request.status.label(),
            subject: request.subject,
        })
    }

    pub fn autocomplete(&self, query: &str) -> Result<Vec<AutocompleteHit>, DirectoryServiceError> {
        if query.trim().chars().count() < search::AUTOCOMPLETE_MIN_CHARS {
            return Ok(Vec::new());
        }
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::autocomplete(&snapshot, query))
    }

    pub fn cities_by_state(
        &self,
        state_id: StateId,
    ) -> Result<Vec<CityOption>, DirectoryServiceError> {
        let cities = self.repository.cities_by_state(state_id)?;
        Ok(cities.into_iter().map(CityOption::from).collect())
    }

    pub fn featured(&self, limit: usize) -> Result<Vec<TherapistCard>, DirectoryServiceError> {
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::featured(&snapshot, limit))
    }

    pub fn featured_specialties(&self) -> Result<Vec<SpecialtyTag>, DirectoryServiceError> {
        let snapshot = self.repository.snapshot(Visibility::ActiveOnly)?;
        Ok(search::featured_specialties(&snapshot))
    }

    /// Contact requests addressed to a therapist, newest first.
    pub fn inbox(&self, therapist_id: TherapistId) -> Result<Vec<InboxEntry>, DirectoryServiceError> {
        let requests = self.repository.contact_requests_for(therapist_id)?;
        let snapshot = self.repository.snapshot(Visibility::IncludeInactive)?;
        Ok(requests
            .iter()
            .map(|request| InboxEntry::build(request, &snapshot))
            .collect())
    }

    pub fn mark_contacts(
        &self,
        ids: &[ContactRequestId],
        status: ContactStatus,
    ) -> Result<usize, DirectoryServiceError> {
        let updated = self.repository.set_contact_status(ids, status)?;
        tracing::info!(updated, status = status.label(), "contact requests updated");
        Ok(updated)
    }

    pub fn verify(&self, ids: &[TherapistId]) -> Result<usize, DirectoryServiceError> {
        self.bulk_update(ids, TherapistUpdate::Verify { at: Utc::now() })
    }

    pub fn remove_verification(&self, ids: &[TherapistId]) -> Result<usize, DirectoryServiceError> {
        self.bulk_update(ids, TherapistUpdate::RemoveVerification)
    }

    pub fn mark_featured(&self, ids: &[TherapistId]) -> Result<usize, DirectoryServiceError> {
        self.bulk_update(ids, TherapistUpdate::MarkFeatured)
    }

    pub fn set_active(
        &self,
        ids: &[TherapistId],
        active: bool,
    ) -> Result<usize, DirectoryServiceError> {
        self.bulk_update(ids, TherapistUpdate::SetActive(active))
    }

    fn bulk_update(
        &self,
        ids: &[TherapistId],
        update: TherapistUpdate,
    ) -> Result<usize, DirectoryServiceError> {
        let updated = self.repository.update_therapists(ids, update)?;
        tracing::info!(updated, ?update, "therapists updated");
        Ok(updated)
    }
}

fn card_for(snapshot: &CatalogSnapshot, therapist: &Therapist) -> TherapistCard {
    let entry = Ranked {
        therapist,
        rating: snapshot.rating(therapist.id),
    };
    TherapistCard::build(&entry, snapshot)
}

/// Error raised by the directory service.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryServiceError {
    #[error(transparent)]
    Validation(#[from] ContactValidationError),
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for DirectoryServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => DirectoryServiceError::NotFound,
            other => DirectoryServiceError::Repository(other),
        }
    }
}
