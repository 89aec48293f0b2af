//! Therapist directory: catalog storage, the filter composer, ranking
//! policies, profiles and contact requests.

pub mod domain;
pub mod filters;
pub mod import;
pub mod memory;
pub mod ranking;
pub mod rating;
pub mod repository;
pub mod router;
pub mod search;
pub mod service;
pub mod slug;
pub mod views;

#[cfg(test)]
mod tests;

pub use domain::{
    City, CityId, ClientId, ContactRequest, ContactRequestId, ContactStatus, InvalidReviewScore,
    ProfileType, Review, ReviewId, ReviewScore, SessionModality, Specialty, SpecialtyId, State,
    StateId, TargetAudience, Therapist, TherapistId, TherapistSpecialty,
};
pub use filters::{FilterEcho, SearchFilters, SearchParams};
pub use import::{CatalogImportError, CatalogSeed, ImportSummary};
pub use memory::InMemoryCatalog;
pub use ranking::{Ranked, RankingPolicy, SortKey, TieBreak};
pub use rating::RatingSummary;
pub use repository::{
    CatalogRepository, CatalogSnapshot, NewCity, NewContactRequest, NewReview, NewSpecialty,
    NewState, NewTherapist, RepositoryError, TherapistUpdate, Visibility,
};
pub use router::catalog_router;
pub use search::PAGE_SIZE;
pub use service::{ContactForm, ContactValidationError, DirectoryService, DirectoryServiceError};
pub use views::{
    AutocompleteHit, CityOption, ContactConfirmation, ContactFormView, InboxEntry, ListingPage,
    PageInfo, ProfileView, SearchPage, SpecialtyTag, TherapistCard,
};
