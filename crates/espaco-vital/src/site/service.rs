use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::domain::{
    ContactMessage, ContactMessageId, ContactSubject, Faq, FaqCategory, FaqId, SiteConfiguration,
    Subscription, SubscriptionId,
};
use super::repository::{
    ContactMessageUpdate, NewContactMessage, NewFaq, NewSubscription, SiteRepository,
    SubscriptionUpdate,
};
use crate::catalog::repository::{RepositoryError, Visibility};

pub const DEFAULT_SUBSCRIPTION_SOURCE: &str = "website";

const MIN_NAME_CHARS: usize = 2;
const MIN_MESSAGE_CHARS: usize = 10;

/// General contact form as posted by the "fale conosco" page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ContactMessageForm {
    #[serde(rename = "nome")]
    pub name: String,
    pub email: String,
    #[serde(rename = "telefone")]
    pub phone: String,
    #[serde(rename = "assunto")]
    pub subject: String,
    #[serde(rename = "mensagem")]
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NewsletterForm {
    pub email: String,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "origem")]
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SiteValidationError {
    #[error("O nome deve ter pelo menos 2 caracteres.")]
    NameTooShort,
    #[error("Informe um endereço de e-mail válido.")]
    InvalidEmail,
    #[error("Assunto inválido.")]
    UnknownSubject,
    #[error("A mensagem deve ter pelo menos 10 caracteres.")]
    MessageTooShort,
}

impl SiteValidationError {
    /// Form field the error refers to.
    pub const fn field(self) -> &'static str {
        match self {
            Self::NameTooShort => "nome",
            Self::InvalidEmail => "email",
            Self::UnknownSubject => "assunto",
            Self::MessageTooShort => "mensagem",
        }
    }
}

/// Public FAQ entries of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaqSection {
    pub category: FaqCategory,
    pub label: &'static str,
    pub entries: Vec<Faq>,
}

/// Operations behind the institutional pages: contact, newsletter, FAQ and
/// the site configuration.
pub struct SiteService<R> {
    repository: Arc<R>,
}

impl<R> SiteService<R>
where
    R: SiteRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    pub fn submit_contact(
        &self,
        form: ContactMessageForm,
    ) -> Result<ContactMessage, SiteServiceError> {
        let name = form.name.trim();
        if name.chars().count() < MIN_NAME_CHARS {
            return Err(SiteValidationError::NameTooShort.into());
        }
        let email = normalize_email(&form.email)?;
        let subject = match form.subject.trim() {
            "" => ContactSubject::default(),
            code => ContactSubject::from_code(code).ok_or(SiteValidationError::UnknownSubject)?,
        };
        let message = form.message.trim();
        if message.chars().count() < MIN_MESSAGE_CHARS {
            return Err(SiteValidationError::MessageTooShort.into());
        }

        let stored = self
            .repository
            .insert_contact_message(NewContactMessage {
                name: name.to_string(),
                email,
                phone: form.phone.trim().to_string(),
                subject,
                message: message.to_string(),
            })
            .map_err(|error| {
                tracing::error!(%error, "contact message failed");
                error
            })?;

        tracing::info!(
            message = stored.id.0,
            subject = stored.subject.code(),
            "contact message recorded"
        );
        Ok(stored)
    }

    pub fn contact_messages(&self) -> Result<Vec<ContactMessage>, SiteServiceError> {
        Ok(self.repository.contact_messages()?)
    }

    pub fn mark_contacts_in_progress(
        &self,
        ids: &[ContactMessageId],
    ) -> Result<usize, SiteServiceError> {
        self.update_contacts(ids, ContactMessageUpdate::MarkInProgress)
    }

    /// Marks messages resolved, recording who answered and when.
    pub fn mark_contacts_resolved(
        &self,
        ids: &[ContactMessageId],
        responder: Option<&str>,
    ) -> Result<usize, SiteServiceError> {
        self.update_contacts(
            ids,
            ContactMessageUpdate::MarkResolved {
                by: responder.map(str::to_string),
                at: Utc::now(),
            },
        )
    }

    pub fn close_contacts(&self, ids: &[ContactMessageId]) -> Result<usize, SiteServiceError> {
        self.update_contacts(ids, ContactMessageUpdate::Close)
    }

    fn update_contacts(
        &self,
        ids: &[ContactMessageId],
        update: ContactMessageUpdate,
    ) -> Result<usize, SiteServiceError> {
        let updated = self.repository.update_contact_messages(ids, update.clone())?;
        tracing::info!(updated, ?update, "contact messages updated");
        Ok(updated)
    }

    /// Subscribes an email. A previously cancelled subscription is reactivated
    /// instead of duplicated.
    pub fn subscribe(&self, form: NewsletterForm) -> Result<Subscription, SiteServiceError> {
        let email = normalize_email(&form.email)?;

        if let Some(existing) = self.repository.subscription_by_email(&email)? {
            if existing.is_active {
                return Err(SiteServiceError::AlreadySubscribed);
            }
            return self.transition(existing, SubscriptionUpdate::Activate);
        }

        let source = match form.source.trim() {
            "" => DEFAULT_SUBSCRIPTION_SOURCE.to_string(),
            source => source.to_string(),
        };
        let subscription = self
            .repository
            .insert_subscription(NewSubscription {
                email,
                name: form.name.trim().to_string(),
                source,
            })
            .map_err(|error| match error {
                RepositoryError::Conflict(_) => SiteServiceError::AlreadySubscribed,
                other => other.into(),
            })?;
        tracing::info!(
            subscription = subscription.id.0,
            source = %subscription.source,
            "newsletter subscription created"
        );
        Ok(subscription)
    }

    pub fn confirm_subscription(&self, email: &str) -> Result<Subscription, SiteServiceError> {
        let subscription = self.subscription(email)?;
        self.transition(subscription, SubscriptionUpdate::Confirm { at: Utc::now() })
    }

    pub fn unsubscribe(&self, email: &str) -> Result<Subscription, SiteServiceError> {
        let subscription = self.subscription(email)?;
        self.transition(subscription, SubscriptionUpdate::Unsubscribe { at: Utc::now() })
    }

    pub fn activate_subscriptions(
        &self,
        ids: &[SubscriptionId],
    ) -> Result<usize, SiteServiceError> {
        self.update_subscriptions(ids, SubscriptionUpdate::Activate)
    }

    pub fn deactivate_subscriptions(
        &self,
        ids: &[SubscriptionId],
    ) -> Result<usize, SiteServiceError> {
        self.update_subscriptions(ids, SubscriptionUpdate::Deactivate)
    }

    fn subscription(&self, email: &str) -> Result<Subscription, SiteServiceError> {
        let email = normalize_email(email)?;
        self.repository
            .subscription_by_email(&email)?
            .ok_or(SiteServiceError::NotFound)
    }

    fn transition(
        &self,
        subscription: Subscription,
        update: SubscriptionUpdate,
    ) -> Result<Subscription, SiteServiceError> {
        self.update_subscriptions(&[subscription.id], update)?;
        self.repository
            .subscription_by_email(&subscription.email)?
            .ok_or(SiteServiceError::NotFound)
    }

    fn update_subscriptions(
        &self,
        ids: &[SubscriptionId],
        update: SubscriptionUpdate,
    ) -> Result<usize, SiteServiceError> {
        let updated = self.repository.update_subscriptions(ids, update)?;
        tracing::info!(updated, ?update, "newsletter subscriptions updated");
        Ok(updated)
    }

    pub fn add_faq(&self, faq: NewFaq) -> Result<Faq, SiteServiceError> {
        Ok(self.repository.insert_faq(faq)?)
    }

    /// Active entries grouped by category. Empty categories are left out.
    pub fn faq_sections(
        &self,
        category: Option<FaqCategory>,
    ) -> Result<Vec<FaqSection>, SiteServiceError> {
        let faqs = self.repository.faqs(Visibility::ActiveOnly)?;
        let mut sections: Vec<FaqSection> = Vec::new();
        for faq in faqs
            .into_iter()
            .filter(|faq| category.map_or(true, |wanted| faq.category == wanted))
        {
            match sections.last_mut() {
                Some(section) if section.category == faq.category => section.entries.push(faq),
                _ => sections.push(FaqSection {
                    category: faq.category,
                    label: faq.category.label(),
                    entries: vec![faq],
                }),
            }
        }
        Ok(sections)
    }

    /// Returns an active entry and counts the view.
    pub fn view_faq(&self, id: FaqId) -> Result<Faq, SiteServiceError> {
        Ok(self.repository.record_faq_view(id)?)
    }

    pub fn mark_faq_helpful(&self, id: FaqId) -> Result<u32, SiteServiceError> {
        let helpful = self.repository.record_faq_helpful(id)?;
        tracing::debug!(faq = id.0, helpful, "faq marked helpful");
        Ok(helpful)
    }

    /// The single configuration row, created with defaults on first access.
    pub fn configuration(&self) -> Result<SiteConfiguration, SiteServiceError> {
        if let Some(configuration) = self.repository.site_configuration()? {
            return Ok(configuration);
        }
        match self
            .repository
            .insert_site_configuration(SiteConfiguration::default())
        {
            Ok(configuration) => {
                tracing::info!("default site configuration created");
                Ok(configuration)
            }
            // Another caller created the row in between.
            Err(RepositoryError::Conflict(_)) => self
                .repository
                .site_configuration()?
                .ok_or(SiteServiceError::NotFound),
            Err(error) => Err(error.into()),
        }
    }

    /// Creates the configuration row; fails once one exists.
    pub fn insert_configuration(
        &self,
        configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, SiteServiceError> {
        self.repository
            .insert_site_configuration(configuration)
            .map_err(|error| match error {
                RepositoryError::Conflict(_) => SiteServiceError::ConfigurationExists,
                other => other.into(),
            })
    }

    pub fn update_configuration(
        &self,
        configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, SiteServiceError> {
        self.configuration()?;
        let saved = self.repository.save_site_configuration(configuration)?;
        tracing::info!(maintenance = saved.maintenance_mode, "site configuration updated");
        Ok(saved)
    }
}

/// Trims and lowercases an address, rejecting anything that is not
/// `local@domain.tld`.
fn normalize_email(raw: &str) -> Result<String, SiteValidationError> {
    let email = raw.trim().to_lowercase();
    let (local, domain) = email
        .split_once('@')
        .ok_or(SiteValidationError::InvalidEmail)?;
    let valid = !local.is_empty()
        && !domain.contains('@')
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && domain.split('.').all(|label| !label.is_empty());
    if valid {
        Ok(email)
    } else {
        Err(SiteValidationError::InvalidEmail)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SiteServiceError {
    #[error(transparent)]
    Validation(#[from] SiteValidationError),
    #[error("Este e-mail já está inscrito na newsletter.")]
    AlreadySubscribed,
    #[error("Só pode existir uma configuração do site.")]
    ConfigurationExists,
    #[error("not found")]
    NotFound,
    #[error(transparent)]
    Repository(RepositoryError),
}

impl From<RepositoryError> for SiteServiceError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::NotFound => SiteServiceError::NotFound,
            other => SiteServiceError::Repository(other),
        }
    }
}
