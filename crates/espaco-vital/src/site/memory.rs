use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;

use super::domain::{
    ContactMessage, ContactMessageId, ContactMessageStatus, Faq, FaqId, SiteConfiguration,
    Subscription, SubscriptionId,
};
use super::repository::{
    ContactMessageUpdate, NewContactMessage, NewFaq, NewSubscription, SiteRepository,
    SubscriptionUpdate,
};
use crate::catalog::repository::{RepositoryError, Visibility};

#[derive(Debug, Default)]
struct SiteTables {
    contact_messages: Vec<ContactMessage>,
    subscriptions: Vec<Subscription>,
    faqs: Vec<Faq>,
    configuration: Option<SiteConfiguration>,
    last_id: u64,
}

impl SiteTables {
    fn next_id(&mut self) -> u64 {
        self.last_id += 1;
        self.last_id
    }

    fn active_faq_mut(&mut self, id: FaqId) -> Option<&mut Faq> {
        self.faqs
            .iter_mut()
            .find(|faq| faq.id == id && faq.is_active)
    }
}

/// Process-local store for the institutional pages.
#[derive(Debug, Default, Clone)]
pub struct InMemorySite {
    tables: Arc<Mutex<SiteTables>>,
}

impl InMemorySite {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, SiteTables>, RepositoryError> {
        self.tables
            .lock()
            .map_err(|_| RepositoryError::Unavailable("site lock poisoned".to_string()))
    }
}

impl SiteRepository for InMemorySite {
    fn insert_contact_message(
        &self,
        message: NewContactMessage,
    ) -> Result<ContactMessage, RepositoryError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let record = ContactMessage {
            id: ContactMessageId(tables.next_id()),
            name: message.name,
            email: message.email,
            phone: message.phone,
            subject: message.subject,
            message: message.message,
            status: ContactMessageStatus::Pending,
            responded_at: None,
            responded_by: None,
            internal_notes: String::new(),
            created_at: now,
            updated_at: now,
        };
        tables.contact_messages.push(record.clone());
        Ok(record)
    }

    fn contact_messages(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let tables = self.tables()?;
        let mut messages = tables.contact_messages.clone();
        messages.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(messages)
    }

    fn update_contact_messages(
        &self,
        ids: &[ContactMessageId],
        update: ContactMessageUpdate,
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let mut updated = 0;
        for message in tables
            .contact_messages
            .iter_mut()
            .filter(|message| ids.contains(&message.id))
        {
            update.apply(message, now);
            updated += 1;
        }
        Ok(updated)
    }

    fn subscription_by_email(&self, email: &str) -> Result<Option<Subscription>, RepositoryError> {
        let tables = self.tables()?;
        Ok(tables
            .subscriptions
            .iter()
            .find(|subscription| subscription.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    fn insert_subscription(
        &self,
        subscription: NewSubscription,
    ) -> Result<Subscription, RepositoryError> {
        let mut tables = self.tables()?;
        if tables
            .subscriptions
            .iter()
            .any(|existing| existing.email.eq_ignore_ascii_case(&subscription.email))
        {
            return Err(RepositoryError::Conflict(format!(
                "subscription {}",
                subscription.email
            )));
        }

        let now = Utc::now();
        let record = Subscription {
            id: SubscriptionId(tables.next_id()),
            email: subscription.email,
            name: subscription.name,
            is_active: true,
            confirmed_at: None,
            unsubscribed_at: None,
            source: subscription.source,
            created_at: now,
            updated_at: now,
        };
        tables.subscriptions.push(record.clone());
        Ok(record)
    }

    fn update_subscriptions(
        &self,
        ids: &[SubscriptionId],
        update: SubscriptionUpdate,
    ) -> Result<usize, RepositoryError> {
        let mut tables = self.tables()?;
        let now = Utc::now();
        let mut updated = 0;
        for subscription in tables
            .subscriptions
            .iter_mut()
            .filter(|subscription| ids.contains(&subscription.id))
        {
            update.apply(subscription, now);
            updated += 1;
        }
        Ok(updated)
    }

    fn faqs(&self, visibility: Visibility) -> Result<Vec<Faq>, RepositoryError> {
        let tables = self.tables()?;
        let mut faqs: Vec<Faq> = tables
            .faqs
            .iter()
            .filter(|faq| visibility.admits(faq.is_active))
            .cloned()
            .collect();
        faqs.sort_by(|a, b| {
            a.category
                .cmp(&b.category)
                .then(a.order.cmp(&b.order))
                .then_with(|| a.question.cmp(&b.question))
        });
        Ok(faqs)
    }

    fn insert_faq(&self, faq: NewFaq) -> Result<Faq, RepositoryError> {
        let mut tables = self.tables()?;
        let question = faq.question.trim().to_string();
        if question.is_empty() {
            return Err(RepositoryError::Invalid("FAQ question is empty".to_string()));
        }

        let now = Utc::now();
        let record = Faq {
            id: FaqId(tables.next_id()),
            question,
            answer: faq.answer,
            category: faq.category,
            order: faq.order,
            views_count: 0,
            helpful_count: 0,
            is_active: faq.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.faqs.push(record.clone());
        Ok(record)
    }

    fn record_faq_view(&self, id: FaqId) -> Result<Faq, RepositoryError> {
        let mut tables = self.tables()?;
        let faq = tables.active_faq_mut(id).ok_or(RepositoryError::NotFound)?;
        faq.views_count = faq.views_count.saturating_add(1);
        Ok(faq.clone())
    }

    fn record_faq_helpful(&self, id: FaqId) -> Result<u32, RepositoryError> {
        let mut tables = self.tables()?;
        let faq = tables.active_faq_mut(id).ok_or(RepositoryError::NotFound)?;
        faq.helpful_count = faq.helpful_count.saturating_add(1);
        Ok(faq.helpful_count)
    }

    fn site_configuration(&self) -> Result<Option<SiteConfiguration>, RepositoryError> {
        Ok(self.tables()?.configuration.clone())
    }

    fn insert_site_configuration(
        &self,
        configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, RepositoryError> {
        let mut tables = self.tables()?;
        if tables.configuration.is_some() {
            return Err(RepositoryError::Conflict(
                "site configuration already exists".to_string(),
            ));
        }
        tables.configuration = Some(configuration.clone());
        Ok(configuration)
    }

    fn save_site_configuration(
        &self,
        mut configuration: SiteConfiguration,
    ) -> Result<SiteConfiguration, RepositoryError> {
        let mut tables = self.tables()?;
        let slot = tables
            .configuration
            .as_mut()
            .ok_or(RepositoryError::NotFound)?;
        configuration.updated_at = Utc::now();
        *slot = configuration.clone();
        Ok(configuration)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::site::domain::FaqCategory;

    fn faq(question: &str, category: FaqCategory, order: u32, is_active: bool) -> NewFaq {
        NewFaq {
            question: question.to_string(),
            answer: "Resposta".to_string(),
            category,
            order,
            is_active,
        }
    }

    #[test]
    fn faqs_are_ordered_by_category_order_then_question() {
        let site = InMemorySite::new();
        site.insert_faq(faq("Zeta?", FaqCategory::General, 1, true))
            .expect("faq");
        site.insert_faq(faq("Como pagar?", FaqCategory::Payments, 0, true))
            .expect("faq");
        site.insert_faq(faq("Alfa?", FaqCategory::General, 1, true))
            .expect("faq");
        site.insert_faq(faq("Primeira?", FaqCategory::General, 0, true))
            .expect("faq");
        site.insert_faq(faq("Oculta?", FaqCategory::General, 0, false))
            .expect("faq");

        let questions: Vec<String> = site
            .faqs(Visibility::ActiveOnly)
            .expect("faqs")
            .into_iter()
            .map(|faq| faq.question)
            .collect();
        assert_eq!(questions, ["Primeira?", "Alfa?", "Zeta?", "Como pagar?"]);
        assert_eq!(site.faqs(Visibility::IncludeInactive).expect("faqs").len(), 5);
    }

    #[test]
    fn inactive_faq_counters_are_not_touched() {
        let site = InMemorySite::new();
        let hidden = site
            .insert_faq(faq("Oculta?", FaqCategory::Technical, 0, false))
            .expect("faq");
        assert!(matches!(
            site.record_faq_helpful(hidden.id),
            Err(RepositoryError::NotFound)
        ));
    }

    #[test]
    fn subscription_email_is_unique_ignoring_case() {
        let site = InMemorySite::new();
        let draft = NewSubscription {
            email: "leitora@example.com".to_string(),
            name: String::new(),
            source: "website".to_string(),
        };
        site.insert_subscription(draft.clone()).expect("first");
        let err = site
            .insert_subscription(NewSubscription {
                email: "LEITORA@example.com".to_string(),
                ..draft
            })
            .expect_err("duplicate email");
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[test]
    fn configuration_row_is_a_singleton() {
        let site = InMemorySite::new();
        assert!(matches!(
            site.save_site_configuration(SiteConfiguration::default()),
            Err(RepositoryError::NotFound)
        ));
        site.insert_site_configuration(SiteConfiguration::default())
            .expect("first row");
        assert!(matches!(
            site.insert_site_configuration(SiteConfiguration::default()),
            Err(RepositoryError::Conflict(_))
        ));
    }
}
