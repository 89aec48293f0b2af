//! Institutional content: general contact messages, newsletter
//! subscriptions, FAQ entries and the site configuration.

pub mod domain;
pub mod memory;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    ContactMessage, ContactMessageId, ContactMessageStatus, ContactSubject, Faq, FaqCategory,
    FaqId, SiteConfiguration, Subscription, SubscriptionId,
};
pub use memory::InMemorySite;
pub use repository::{
    ContactMessageUpdate, NewContactMessage, NewFaq, NewSubscription, SiteRepository,
    SubscriptionUpdate,
};
pub use router::site_router;
pub use service::{
    ContactMessageForm, FaqSection, NewsletterForm, SiteService, SiteServiceError,
    SiteValidationError,
};
