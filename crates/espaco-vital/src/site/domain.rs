use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactMessageId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaqId(pub u64);

/// Topic picked on the general contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactSubject {
    #[default]
    General,
    Therapist,
    Space,
    Partnership,
    Support,
    Complaint,
    Suggestion,
}

impl ContactSubject {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::General,
            Self::Therapist,
            Self::Space,
            Self::Partnership,
            Self::Support,
            Self::Complaint,
            Self::Suggestion,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Therapist => "therapist",
            Self::Space => "space",
            Self::Partnership => "partnership",
            Self::Support => "support",
            Self::Complaint => "complaint",
            Self::Suggestion => "suggestion",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "Informações Gerais",
            Self::Therapist => "Sou Terapeuta",
            Self::Space => "Tenho um Espaço",
            Self::Partnership => "Parceria",
            Self::Support => "Suporte Técnico",
            Self::Complaint => "Reclamação",
            Self::Suggestion => "Sugestão",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|subject| subject.code() == code)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ContactMessageStatus {
    #[default]
    Pending,
    InProgress,
    Resolved,
    Closed,
}

impl ContactMessageStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pendente",
            Self::InProgress => "Em Andamento",
            Self::Resolved => "Resolvido",
            Self::Closed => "Fechado",
        }
    }
}

/// Message sent through the site-wide contact form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: ContactSubject,
    pub message: String,
    pub status: ContactMessageStatus,
    pub responded_at: Option<DateTime<Utc>>,
    pub responded_by: Option<String>,
    pub internal_notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub unsubscribed_at: Option<DateTime<Utc>>,
    pub source: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FaqCategory {
    #[default]
    General,
    Therapists,
    Clients,
    Spaces,
    Payments,
    Technical,
}

impl FaqCategory {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::General,
            Self::Therapists,
            Self::Clients,
            Self::Spaces,
            Self::Payments,
            Self::Technical,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Therapists => "therapists",
            Self::Clients => "clients",
            Self::Spaces => "spaces",
            Self::Payments => "payments",
            Self::Technical => "technical",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::General => "Geral",
            Self::Therapists => "Para Terapeutas",
            Self::Clients => "Para Clientes",
            Self::Spaces => "Espaços Terapêuticos",
            Self::Payments => "Pagamentos",
            Self::Technical => "Técnico",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ordered()
            .into_iter()
            .find(|category| category.code() == code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub id: FaqId,
    pub question: String,
    pub answer: String,
    pub category: FaqCategory,
    pub order: u32,
    pub views_count: u32,
    pub helpful_count: u32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Site-wide settings. Exactly one row exists once the site has been read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfiguration {
    pub site_name: String,
    pub site_description: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub maintenance_mode: bool,
    pub maintenance_message: String,
    pub google_analytics_id: String,
    pub facebook_pixel_id: String,
    pub updated_at: DateTime<Utc>,
}

impl Default for SiteConfiguration {
    fn default() -> Self {
        Self {
            site_name: "Espaço Vital".to_string(),
            site_description: "Conectando você ao cuidado terapêutico que transforma".to_string(),
            contact_email: "contato@espacovital.com.br".to_string(),
            contact_phone: "+55 (21) 99999-9999".to_string(),
            maintenance_mode: false,
            maintenance_message: String::new(),
            google_analytics_id: String::new(),
            facebook_pixel_id: String::new(),
            updated_at: Utc::now(),
        }
    }
}
