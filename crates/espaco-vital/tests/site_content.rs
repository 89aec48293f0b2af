use std::sync::Arc;

use espaco_vital::site::{
    ContactMessageForm, ContactMessageId, ContactMessageStatus, FaqCategory, InMemorySite, NewFaq,
    NewsletterForm, SiteConfiguration, SiteRepository, SiteService, SiteServiceError,
};

fn service() -> SiteService<InMemorySite> {
    SiteService::new(Arc::new(InMemorySite::new()))
}

fn message(name: &str) -> ContactMessageForm {
    ContactMessageForm {
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: "+55 21 98888-7777".to_string(),
        subject: "partnership".to_string(),
        message: "Gostaríamos de propor uma parceria.".to_string(),
    }
}

#[test]
fn contact_inbox_moves_through_bulk_transitions() {
    let service = service();
    let first = service.submit_contact(message("Lucas")).expect("first");
    let second = service.submit_contact(message("Paula")).expect("second");
    let third = service.submit_contact(message("Renan")).expect("third");

    let inbox = service.contact_messages().expect("inbox");
    assert_eq!(inbox[0].id, third.id, "newest message first");

    assert_eq!(
        service
            .mark_contacts_in_progress(&[first.id, second.id])
            .expect("in progress"),
        2
    );
    assert_eq!(
        service
            .mark_contacts_resolved(&[second.id], None)
            .expect("resolved"),
        1
    );

    let inbox = service.contact_messages().expect("inbox");
    let status_of = |id: ContactMessageId| {
        inbox
            .iter()
            .find(|message| message.id == id)
            .map(|message| message.status)
            .expect("message listed")
    };
    assert_eq!(status_of(first.id), ContactMessageStatus::InProgress);
    assert_eq!(status_of(second.id), ContactMessageStatus::Resolved);
    assert_eq!(status_of(third.id), ContactMessageStatus::Pending);

    let resolved = inbox
        .iter()
        .find(|message| message.id == second.id)
        .expect("resolved listed");
    assert!(resolved.responded_at.is_some());
    assert!(resolved.responded_by.is_none());
}

#[test]
fn newsletter_bulk_activation_clears_the_cancellation() {
    let service = service();
    let subscription = service
        .subscribe(NewsletterForm {
            email: "ouvinte@example.com".to_string(),
            name: "Ouvinte".to_string(),
            source: "rodape".to_string(),
        })
        .expect("subscribed");
    assert_eq!(subscription.source, "rodape");

    service
        .unsubscribe("ouvinte@example.com")
        .expect("cancelled");
    assert_eq!(
        service
            .activate_subscriptions(&[subscription.id])
            .expect("activated"),
        1
    );

    let stored = service
        .repository()
        .subscription_by_email("ouvinte@example.com")
        .expect("lookup")
        .expect("stored");
    assert!(stored.is_active);
    assert!(stored.unsubscribed_at.is_none());

    service
        .deactivate_subscriptions(&[subscription.id])
        .expect("deactivated");
    let stored = service
        .repository()
        .subscription_by_email("ouvinte@example.com")
        .expect("lookup")
        .expect("stored");
    assert!(!stored.is_active);
}

#[test]
fn invalid_newsletter_email_is_rejected() {
    let error = service()
        .subscribe(NewsletterForm {
            email: "sem-arroba".to_string(),
            ..NewsletterForm::default()
        })
        .expect_err("invalid email");
    assert!(matches!(error, SiteServiceError::Validation(_)));
}

#[test]
fn faq_counters_track_views_and_votes() {
    let service = service();
    let faq = service
        .add_faq(NewFaq {
            question: "Como encontro um terapeuta?".to_string(),
            answer: "Use a busca por especialidade e cidade.".to_string(),
            category: FaqCategory::Clients,
            order: 1,
            is_active: true,
        })
        .expect("faq");

    service.view_faq(faq.id).expect("first view");
    let viewed = service.view_faq(faq.id).expect("second view");
    assert_eq!(viewed.views_count, 2);
    assert_eq!(service.mark_faq_helpful(faq.id).expect("vote"), 1);

    let sections = service
        .faq_sections(Some(FaqCategory::Clients))
        .expect("sections");
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].label, "Para Clientes");
    assert_eq!(sections[0].entries[0].helpful_count, 1);
}

#[test]
fn explicit_configuration_insert_is_single_use() {
    let service = service();
    let custom = SiteConfiguration {
        site_name: "Espaço Vital Rio".to_string(),
        ..SiteConfiguration::default()
    };
    service
        .insert_configuration(custom.clone())
        .expect("first insert");

    assert!(matches!(
        service.insert_configuration(SiteConfiguration::default()),
        Err(SiteServiceError::ConfigurationExists)
    ));
    assert_eq!(
        service.configuration().expect("read").site_name,
        "Espaço Vital Rio"
    );
}
