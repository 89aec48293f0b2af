use chrono::{DateTime, Utc};

use super::domain::{
    ContactMessage, ContactMessageId, ContactMessageStatus, ContactSubject, Faq, FaqCategory,
    FaqId, SiteConfiguration, Subscription, SubscriptionId,
};
use crate::catalog::repository::{RepositoryError, Visibility};

/// Storage for contact messages, newsletter subscriptions, FAQ entries and
/// the site configuration row.
pub trait SiteRepository: Send + Sync {
    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, RepositoryError>;
    /// Newest first.
    fn contact_messages(&self) -> Result<Vec<ContactMessage>, RepositoryError>;
    fn update_contact_messages(
        &self,
        ids: &[ContactMessageId],
        update: ContactMessageUpdate,
    ) -> Result<usize, RepositoryError>;

    fn subscription_by_email(&self, email: &str) -> Result<Option<Subscription>, RepositoryError>;
    /// Fails with `Conflict` when the email is already registered.
    fn insert_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, RepositoryError>;
    fn update_subscriptions(
        &self,
        ids: &[SubscriptionId],
        update: SubscriptionUpdate,
    ) -> Result<usize, RepositoryError>;

    /// Ordered by category, display order, then question.
    fn faqs(&self, visibility: Visibility) -> Result<Vec<Faq>, RepositoryError>;
    fn insert_faq(&self, faq: NewFaq) -> Result<Faq, RepositoryError>;
    /// Increments the view counter of an active entry and returns it.
    fn record_faq_view(&self, id: FaqId) -> Result<Faq, RepositoryError>;
    /// Increments the "helpful" counter of an active entry and returns the new value.
    fn record_faq_helpful(&self, id: FaqId) -> Result<u32, RepositoryError>;

    fn site_configuration(&self) -> Result<Option<SiteConfiguration>, RepositoryError>;
    /// Fails with `Conflict` when a configuration row already exists.
    fn insert_site_configuration(
        &self,
        configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, RepositoryError>;
    /// Fails with `NotFound` when no configuration row exists yet.
    fn save_site_configuration(
        &self,
        configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, RepositoryError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewContactMessage {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subject: ContactSubject,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactMessageUpdate {
    MarkInProgress,
    MarkResolved {
        by: Option<String>,
        at: DateTime<Utc>,
    },
    Close,
}

impl ContactMessageUpdate {
    pub fn apply(&self, message: &mut ContactMessage, now: DateTime<Utc>) {
        match self {
            ContactMessageUpdate::MarkInProgress => {
                message.status = ContactMessageStatus::InProgress;
            }
            ContactMessageUpdate::MarkResolved { by, at } => {
                message.status = ContactMessageStatus::Resolved;
                message.responded_at = Some(*at);
                if by.is_some() {
                    message.responded_by = by.clone();
                }
            }
            ContactMessageUpdate::Close => message.status = ContactMessageStatus::Closed,
        }
        message.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub email: String,
    pub name: String,
    pub source: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscriptionUpdate {
    Confirm { at: DateTime<Utc> },
    Unsubscribe { at: DateTime<Utc> },
    Activate,
    Deactivate,
}

impl SubscriptionUpdate {
    pub fn apply(self, subscription: &mut Subscription, now: DateTime<Utc>) {
        match self {
            SubscriptionUpdate::Confirm { at } => {
                subscription.confirmed_at = Some(at);
                subscription.is_active = true;
            }
            SubscriptionUpdate::Unsubscribe { at } => {
                subscription.is_active = false;
                subscription.unsubscribed_at = Some(at);
            }
            SubscriptionUpdate::Activate => {
                subscription.is_active = true;
                subscription.unsubscribed_at = None;
            }
            SubscriptionUpdate::Deactivate => subscription.is_active = false,
        }
        subscription.updated_at = now;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFaq {
    pub question: String,
    pub answer: String,
    pub category: FaqCategory,
    pub order: u32,
    pub is_active: bool,
}
