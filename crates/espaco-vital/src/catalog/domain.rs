use std::collections::BTreeSet;
use std::fmt;
use std::net::IpAddr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a Brazilian state.
    StateId
);
numeric_id!(
    /// Identifier of a city; cities are unique per (name, state).
    CityId
);
numeric_id!(SpecialtyId);
numeric_id!(TherapistId);
numeric_id!(ReviewId);
numeric_id!(ContactRequestId);
numeric_id!(
    /// Account of the client leaving a review. Identity itself lives with the
    /// external identity provider.
    ClientId
);

/// Delivery mode of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionModality {
    Presencial,
    Online,
    Domicilio,
}

impl SessionModality {
    pub const fn ordered() -> [Self; 3] {
        [Self::Presencial, Self::Online, Self::Domicilio]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Presencial => "presencial",
            Self::Online => "online",
            Self::Domicilio => "domicilio",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Presencial => "Presencial",
            Self::Online => "On-line",
            Self::Domicilio => "Domicílio",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|modality| modality.code() == code)
    }
}

/// Whether a profile belongs to a single professional or to a therapeutic space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProfileType {
    #[default]
    Individual,
    Espacos,
}

impl ProfileType {
    pub const fn ordered() -> [Self; 2] {
        [Self::Individual, Self::Espacos]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Espacos => "espacos",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Individual => "Individual",
            Self::Espacos => "Espaços",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered().into_iter().find(|kind| kind.code() == code)
    }
}

/// Audience a therapist directs sessions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TargetAudience {
    #[default]
    QualquerUm,
    Adultos,
    Criancas,
    Idosos,
    Casais,
    Grupos,
}

impl TargetAudience {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::QualquerUm,
            Self::Adultos,
            Self::Criancas,
            Self::Idosos,
            Self::Casais,
            Self::Grupos,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::QualquerUm => "qualquer_um",
            Self::Adultos => "adultos",
            Self::Criancas => "criancas",
            Self::Idosos => "idosos",
            Self::Casais => "casais",
            Self::Grupos => "grupos",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::QualquerUm => "Qualquer um",
            Self::Adultos => "Adultos",
            Self::Criancas => "Crianças",
            Self::Idosos => "Idosos",
            Self::Casais => "Casais",
            Self::Grupos => "Grupos",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|audience| audience.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub id: StateId,
    pub name: String,
    /// Two-letter abbreviation, unique across states.
    pub abbreviation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub id: CityId,
    pub name: String,
    pub state_id: StateId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: SpecialtyId,
    pub name: String,
    pub slug: String,
    pub short_description: String,
    pub long_description: String,
    pub highlight_color: String,
    pub display_order: u32,
    pub featured: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Per-pairing attributes between a therapist and one of their specialties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapistSpecialty {
    pub specialty_id: SpecialtyId,
    /// Session price in cents of BRL.
    pub price_cents: Option<u64>,
    pub session_minutes: Option<u32>,
    pub certification: String,
    pub years_of_experience: u32,
    pub notes: String,
    pub primary: bool,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Therapist {
    pub id: TherapistId,
    pub full_name: String,
    pub display_name: String,
    pub slug: String,
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
    pub verified_at: Option<DateTime<Utc>>,
    pub featured: bool,
    pub premium: bool,
    pub view_count: u32,
    pub contact_count: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Therapist {
    pub fn offers_specialty(&self, specialty_id: SpecialtyId) -> bool {
        self.specialties
            .iter()
            .any(|pairing| pairing.specialty_id == specialty_id)
    }

    pub fn specialty_ids(&self) -> impl Iterator<Item = SpecialtyId> + '_ {
        self.specialties.iter().map(|pairing| pairing.specialty_id)
    }
}

/// Review score constrained to the discrete range 1..=5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ReviewScore(u8);

impl ReviewScore {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 5;

    pub fn new(value: u8) -> Result<Self, InvalidReviewScore> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidReviewScore(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for ReviewScore {
    type Error = InvalidReviewScore;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ReviewScore> for u8 {
    fn from(score: ReviewScore) -> Self {
        score.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("review score must be between 1 and 5 (found {0})")]
pub struct InvalidReviewScore(pub u8);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub id: ReviewId,
    pub therapist_id: TherapistId,
    pub client_id: ClientId,
    pub client_name: String,
    pub score: ReviewScore,
    pub comment: String,
    pub session_date: Option<NaiveDate>,
    pub recommends: bool,
    pub verified: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Inbox status of a therapist-directed contact request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactStatus {
    #[default]
    Enviado,
    Lido,
    Respondido,
    Arquivado,
}

impl ContactStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Enviado => "Enviado",
            Self::Lido => "Lido",
            Self::Respondido => "Respondido",
            Self::Arquivado => "Arquivado",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRequest {
    pub id: ContactRequestId,
    pub therapist_id: TherapistId,
    pub sender_name: String,
    pub sender_email: String,
    pub sender_phone: String,
    pub subject: String,
    pub message: String,
    pub specialty_of_interest: Option<SpecialtyId>,
    pub status: ContactStatus,
    pub origin_ip: Option<IpAddr>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
