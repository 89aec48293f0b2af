use std::collections::BTreeSet;
use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::Response;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::Value;

use crate::catalog::domain::{
    City, CityId, ClientId, ContactRequest, ContactRequestId, ContactStatus, ProfileType, Review,
    ReviewScore, SessionModality, Specialty, SpecialtyId, State, StateId, TargetAudience,
    Therapist, TherapistId, TherapistSpecialty,
};
use crate::catalog::memory::InMemoryCatalog;
use crate::catalog::repository::{
    CatalogRepository, CatalogSnapshot, NewCity, NewContactRequest, NewReview, NewSpecialty,
    NewState, NewTherapist, RepositoryError, TherapistUpdate, Visibility,
};
use crate::catalog::service::{ContactForm, DirectoryService};
use crate::catalog::views::TherapistCard;

/// Small catalog shared by the directory tests.
///
/// | therapist | city      | specialties          | flags              | rating |
/// |-----------|-----------|----------------------|--------------------|--------|
/// | Ana       | Campinas  | Reiki, Massoterapia* | verified, featured | 4.5    |
/// | Bruno     | Campinas  | Reiki                | premium            | 5.0    |
/// | Carla     | São Paulo | Massoterapia         | verified           | 3.7    |
/// | Diego     | Niterói   | Acupuntura           |                    | -      |
/// | Elisa     | Campinas  | Acupuntura, Reiki    | inactive, featured | 5.0    |
pub(super) struct Fixture {
    pub(super) catalog: InMemoryCatalog,
    pub(super) sp: StateId,
    pub(super) rj: StateId,
    pub(super) campinas: CityId,
    pub(super) sao_paulo: CityId,
    pub(super) niteroi: CityId,
    pub(super) reiki: SpecialtyId,
    pub(super) massoterapia: SpecialtyId,
    pub(super) acupuntura: SpecialtyId,
    pub(super) aromaterapia: SpecialtyId,
    pub(super) ana: Therapist,
    pub(super) bruno: Therapist,
    pub(super) carla: Therapist,
    pub(super) diego: Therapist,
    pub(super) elisa: Therapist,
}

pub(super) fn day(offset: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
        + Duration::days(offset)
}

fn draft(
    display_name: &str,
    city: CityId,
    specialties: &[SpecialtyId],
    modalities: &[SessionModality],
    experience_years: u32,
    created: i64,
) -> NewTherapist {
    let mut draft = NewTherapist::named(format!("{display_name} da Silva"), display_name);
    draft.city_id = Some(city);
    draft.experience_years = experience_years;
    draft.session_modalities = modalities.iter().copied().collect::<BTreeSet<_>>();
    draft.specialties = specialties
        .iter()
        .copied()
        .map(TherapistSpecialty::basic)
        .collect();
    draft.created_at = Some(day(created));
    draft
}

pub(super) fn review(therapist: TherapistId, client: u64, score: u8, created: i64) -> NewReview {
    NewReview {
        therapist_id: therapist,
        client_id: ClientId(client),
        client_name: format!("Cliente {client}"),
        score: ReviewScore::new(score).expect("valid score"),
        comment: "Sessão muito acolhedora".to_string(),
        session_date: None,
        recommends: true,
        verified: false,
        is_active: true,
        created_at: Some(day(created)),
    }
}

pub(super) fn fixture() -> Fixture {
    let catalog = InMemoryCatalog::new();

    let sp = catalog
        .insert_state(NewState {
            name: "São Paulo".to_string(),
            abbreviation: "SP".to_string(),
        })
        .expect("state")
        .id;
    let rj = catalog
        .insert_state(NewState {
            name: "Rio de Janeiro".to_string(),
            abbreviation: "RJ".to_string(),
        })
        .expect("state")
        .id;
    let city = |name: &str, state_id: StateId| {
        catalog
            .insert_city(NewCity {
                name: name.to_string(),
                state_id,
            })
            .expect("city")
            .id
    };
    let campinas = city("Campinas", sp);
    let sao_paulo = city("São Paulo", sp);
    let niteroi = city("Niterói", rj);

    let specialty = |name: &str, active: bool| {
        let mut draft = NewSpecialty::named(name);
        draft.is_active = active;
        draft.featured = name == "Reiki";
        catalog.insert_specialty(draft).expect("specialty").id
    };
    let reiki = specialty("Reiki", true);
    let massoterapia = specialty("Massoterapia", true);
    let acupuntura = specialty("Acupuntura", true);
    let aromaterapia = specialty("Aromaterapia", false);

    let mut ana = draft(
        "Ana Souza",
        campinas,
        &[reiki, massoterapia],
        &[SessionModality::Presencial],
        10,
        1,
    );
    ana.specialties[0].primary = false;
    ana.specialties[1].primary = true;
    ana.verified = true;
    ana.featured = true;
    let ana = catalog.insert_therapist(ana).expect("ana");

    let mut bruno = draft(
        "Bruno Lima",
        campinas,
        &[reiki],
        &[SessionModality::Online],
        4,
        2,
    );
    bruno.premium = true;
    let bruno = catalog.insert_therapist(bruno).expect("bruno");

    let mut carla = draft(
        "Carla Mendes",
        sao_paulo,
        &[massoterapia],
        &[SessionModality::Presencial, SessionModality::Online],
        15,
        3,
    );
    carla.verified = true;
    carla.accessible = true;
    let carla = catalog.insert_therapist(carla).expect("carla");

    let mut diego = draft(
        "Diego Rocha",
        niteroi,
        &[acupuntura],
        &[SessionModality::Domicilio],
        2,
        4,
    );
    diego.profile_type = ProfileType::Espacos;
    diego.target_audience = TargetAudience::Criancas;
    let diego = catalog.insert_therapist(diego).expect("diego");

    let mut elisa = draft(
        "Elisa Prado",
        campinas,
        &[acupuntura, reiki],
        &[SessionModality::Presencial, SessionModality::Online],
        30,
        5,
    );
    elisa.verified = true;
    elisa.featured = true;
    elisa.is_active = false;
    let elisa = catalog.insert_therapist(elisa).expect("elisa");

    for new_review in [
        review(ana.id, 1, 5, 10),
        review(ana.id, 2, 4, 11),
        review(bruno.id, 1, 5, 12),
        review(carla.id, 1, 3, 13),
        review(carla.id, 2, 4, 14),
        review(carla.id, 3, 4, 15),
        review(elisa.id, 1, 5, 16),
    ] {
        catalog.insert_review(new_review).expect("review");
    }

    Fixture {
        catalog,
        sp,
        rj,
        campinas,
        sao_paulo,
        niteroi,
        reiki,
        massoterapia,
        acupuntura,
        aromaterapia,
        ana,
        bruno,
        carla,
        diego,
        elisa,
    }
}

impl Fixture {
    pub(super) fn service(&self) -> DirectoryService<InMemoryCatalog> {
        DirectoryService::new(Arc::new(self.catalog.clone()))
    }

    pub(super) fn stored(&self, slug: &str) -> Therapist {
        self.catalog
            .therapist_by_slug(slug, Visibility::IncludeInactive)
            .expect("lookup")
            .expect("therapist exists")
    }
}

pub(super) fn contact_form() -> ContactForm {
    ContactForm {
        name: "Marina Costa".to_string(),
        email: "marina@example.com".to_string(),
        phone: "(19) 99999-0000".to_string(),
        subject: "Primeira sessão".to_string(),
        message: "Gostaria de saber a disponibilidade para a próxima semana.".to_string(),
        specialty_of_interest: String::new(),
    }
}

pub(super) fn slugs(cards: &[TherapistCard]) -> Vec<&str> {
    cards.iter().map(|card| card.slug.as_str()).collect()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 1 << 20)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

pub(super) fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(response.status(), expected);
}

/// Storage that is down for every call.
pub(super) struct UnavailableCatalog;

fn offline<T>() -> Result<T, RepositoryError> {
    Err(RepositoryError::Unavailable("database offline".to_string()))
}

impl CatalogRepository for UnavailableCatalog {
    fn snapshot(&self, _visibility: Visibility) -> Result<CatalogSnapshot, RepositoryError> {
        offline()
    }

    fn therapist_by_slug(
        &self,
        _slug: &str,
        _visibility: Visibility,
    ) -> Result<Option<Therapist>, RepositoryError> {
        offline()
    }

    fn specialty_by_id(
        &self,
        _id: SpecialtyId,
        _visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        offline()
    }

    fn specialty_by_slug(
        &self,
        _slug: &str,
        _visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        offline()
    }

    fn cities_by_state(&self, _state_id: StateId) -> Result<Vec<City>, RepositoryError> {
        offline()
    }

    fn record_profile_view(&self, _id: TherapistId) -> Result<u32, RepositoryError> {
        offline()
    }

    fn record_contact_request(
        &self,
        _request: NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError> {
        offline()
    }

    fn contact_requests_for(
        &self,
        _therapist_id: TherapistId,
    ) -> Result<Vec<ContactRequest>, RepositoryError> {
        offline()
    }

    fn set_contact_status(
        &self,
        _ids: &[ContactRequestId],
        _status: ContactStatus,
    ) -> Result<usize, RepositoryError> {
        offline()
    }

    fn update_therapists(
        &self,
        _ids: &[TherapistId],
        _update: TherapistUpdate,
    ) -> Result<usize, RepositoryError> {
        offline()
    }

    fn insert_state(&self, _state: NewState) -> Result<State, RepositoryError> {
        offline()
    }

    fn insert_city(&self, _city: NewCity) -> Result<City, RepositoryError> {
        offline()
    }

    fn insert_specialty(&self, _specialty: NewSpecialty) -> Result<Specialty, RepositoryError> {
        offline()
    }

    fn insert_therapist(&self, _therapist: NewTherapist) -> Result<Therapist, RepositoryError> {
        offline()
    }

    fn insert_review(&self, _review: NewReview) -> Result<Review, RepositoryError> {
        offline()
    }
}

/// Readable catalog whose contact-request writes fail.
#[derive(Clone)]
pub(super) struct ReadOnlyCatalog(pub(super) InMemoryCatalog);

impl CatalogRepository for ReadOnlyCatalog {
    fn snapshot(&self, visibility: Visibility) -> Result<CatalogSnapshot, RepositoryError> {
        self.0.snapshot(visibility)
    }

    fn therapist_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Therapist>, RepositoryError> {
        self.0.therapist_by_slug(slug, visibility)
    }

    fn specialty_by_id(
        &self,
        id: SpecialtyId,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        self.0.specialty_by_id(id, visibility)
    }

    fn specialty_by_slug(
        &self,
        slug: &str,
        visibility: Visibility,
    ) -> Result<Option<Specialty>, RepositoryError> {
        self.0.specialty_by_slug(slug, visibility)
    }

    fn cities_by_state(&self, state_id: StateId) -> Result<Vec<City>, RepositoryError> {
        self.0.cities_by_state(state_id)
    }

    fn record_profile_view(&self, id: TherapistId) -> Result<u32, RepositoryError> {
        self.0.record_profile_view(id)
    }

    fn record_contact_request(
        &self,
        _request: NewContactRequest,
    ) -> Result<ContactRequest, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn contact_requests_for(
        &self,
        therapist_id: TherapistId,
    ) -> Result<Vec<ContactRequest>, RepositoryError> {
        self.0.contact_requests_for(therapist_id)
    }

    fn set_contact_status(
        &self,
        _ids: &[ContactRequestId],
        _status: ContactStatus,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn update_therapists(
        &self,
        _ids: &[TherapistId],
        _update: TherapistUpdate,
    ) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn insert_state(&self, _state: NewState) -> Result<State, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn insert_city(&self, _city: NewCity) -> Result<City, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn insert_specialty(&self, _specialty: NewSpecialty) -> Result<Specialty, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn insert_therapist(&self, _therapist: NewTherapist) -> Result<Therapist, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn insert_review(&self, _review: NewReview) -> Result<Review, RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }
}
