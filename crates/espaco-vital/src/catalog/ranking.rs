//! Ordering policies for therapist result sets.
//!
//! A policy is an ordered list of tie-break keys; the first key that tells two
//! entries apart decides. Every policy ends on the therapist id so the order is
//! total and repeated searches return identical sequences.

use std::cmp::Ordering;

use super::domain::Therapist;
use super::rating::RatingSummary;

/// Explicit sort requested by the client (`ordenacao`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortKey {
    #[default]
    Relevance,
    BestRated,
    MostExperienced,
    Alphabetical,
}

impl SortKey {
    pub const fn code(self) -> &'static str {
        match self {
            SortKey::Relevance => "relevancia",
            SortKey::BestRated => "melhor_avaliado",
            SortKey::MostExperienced => "mais_experiente",
            SortKey::Alphabetical => "nome",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            SortKey::Relevance => "Relevância",
            SortKey::BestRated => "Melhor avaliado",
            SortKey::MostExperienced => "Mais experiente",
            SortKey::Alphabetical => "Nome (A-Z)",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "relevancia" => Some(SortKey::Relevance),
            "melhor_avaliado" => Some(SortKey::BestRated),
            "mais_experiente" => Some(SortKey::MostExperienced),
            "nome" => Some(SortKey::Alphabetical),
            _ => None,
        }
    }

    pub const fn policy(self) -> RankingPolicy {
        match self {
            SortKey::Relevance => RankingPolicy::RELEVANCE,
            SortKey::BestRated => RankingPolicy::BEST_RATED,
            SortKey::MostExperienced => RankingPolicy::MOST_EXPERIENCED,
            SortKey::Alphabetical => RankingPolicy::ALPHABETICAL,
        }
    }
}

/// A therapist paired with its rating as computed for this request.
#[derive(Debug, Clone, Copy)]
pub struct Ranked<'a> {
    pub therapist: &'a Therapist,
    pub rating: RatingSummary,
}

/// Single key extractor in a tie-break chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    FeaturedFirst,
    PremiumFirst,
    VerifiedFirst,
    HighestRating,
    MostReviews,
    MostExperience,
    DisplayName,
    Newest,
    Id,
}

impl TieBreak {
    pub fn compare(self, a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
        match self {
            TieBreak::FeaturedFirst => b.therapist.featured.cmp(&a.therapist.featured),
            TieBreak::PremiumFirst => b.therapist.premium.cmp(&a.therapist.premium),
            TieBreak::VerifiedFirst => b.therapist.verified.cmp(&a.therapist.verified),
            TieBreak::HighestRating => b.rating.mean.total_cmp(&a.rating.mean),
            TieBreak::MostReviews => b.rating.review_count.cmp(&a.rating.review_count),
            TieBreak::MostExperience => b
                .therapist
                .experience_years
                .cmp(&a.therapist.experience_years),
            TieBreak::DisplayName => a
                .therapist
                .display_name
                .to_lowercase()
                .cmp(&b.therapist.display_name.to_lowercase())
                .then_with(|| a.therapist.display_name.cmp(&b.therapist.display_name)),
            TieBreak::Newest => b.therapist.created_at.cmp(&a.therapist.created_at),
            TieBreak::Id => a.therapist.id.cmp(&b.therapist.id),
        }
    }
}

/// Fixed chain of tie-break keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingPolicy {
    keys: &'static [TieBreak],
}

impl RankingPolicy {
    /// Featured > premium > verified > rating > recency.
    pub const RELEVANCE: Self = Self {
        keys: &[
            TieBreak::FeaturedFirst,
            TieBreak::PremiumFirst,
            TieBreak::VerifiedFirst,
            TieBreak::HighestRating,
            TieBreak::Newest,
            TieBreak::Id,
        ],
    };

    pub const BEST_RATED: Self = Self {
        keys: &[TieBreak::HighestRating, TieBreak::MostReviews, TieBreak::Id],
    };

    pub const MOST_EXPERIENCED: Self = Self {
        keys: &[TieBreak::MostExperience, TieBreak::Id],
    };

    pub const ALPHABETICAL: Self = Self {
        keys: &[TieBreak::DisplayName, TieBreak::Id],
    };

    /// Unfiltered listings rank by status flags and recency only.
    pub const LISTING: Self = Self {
        keys: &[
            TieBreak::FeaturedFirst,
            TieBreak::PremiumFirst,
            TieBreak::VerifiedFirst,
            TieBreak::Newest,
            TieBreak::Id,
        ],
    };

    pub const AUTOCOMPLETE: Self = Self {
        keys: &[
            TieBreak::FeaturedFirst,
            TieBreak::PremiumFirst,
            TieBreak::HighestRating,
            TieBreak::Id,
        ],
    };

    pub const RELATED: Self = Self {
        keys: &[TieBreak::VerifiedFirst, TieBreak::HighestRating, TieBreak::Id],
    };

    pub fn keys(&self) -> &'static [TieBreak] {
        self.keys
    }

    pub fn compare(&self, a: &Ranked<'_>, b: &Ranked<'_>) -> Ordering {
        self.keys
            .iter()
            .map(|key| key.compare(a, b))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    }

    pub fn sort(&self, entries: &mut [Ranked<'_>]) {
        entries.sort_by(|a, b| self.compare(a, b));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::TherapistId;
    use crate::catalog::repository::NewTherapist;
    use chrono::{Duration, TimeZone, Utc};

    fn therapist(id: u64, name: &str) -> Therapist {
        let draft = NewTherapist::named(name, name);
        let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(id as i64);
        Therapist {
            id: TherapistId(id),
            full_name: draft.full_name,
            display_name: draft.display_name,
            slug: format!("t-{id}"),
            professional_email: String::new(),
            phone: String::new(),
            whatsapp: String::new(),
            city_id: None,
            neighborhood: String::new(),
            professional_registration: String::new(),
            education: String::new(),
            experience_years: 0,
            session_modalities: draft.session_modalities,
            profile_type: draft.profile_type,
            target_audience: draft.target_audience,
            accessible: false,
            short_bio: String::new(),
            long_bio: String::new(),
            methodology: String::new(),
            specialties: Vec::new(),
            verified: false,
            verified_at: None,
            featured: false,
            premium: false,
            view_count: 0,
            contact_count: 0,
            is_active: true,
            created_at,
            updated_at: created_at,
        }
    }

    fn rating(mean: f64, count: u32) -> RatingSummary {
        RatingSummary {
            mean,
            review_count: count,
        }
    }

    fn order(policy: RankingPolicy, entries: &[Ranked<'_>]) -> Vec<u64> {
        let mut sorted = entries.to_vec();
        policy.sort(&mut sorted);
        sorted.iter().map(|entry| entry.therapist.id.0).collect()
    }

    #[test]
    fn relevance_puts_status_flags_before_rating() {
        let mut featured = therapist(1, "Featured");
        featured.featured = true;
        let mut premium = therapist(2, "Premium");
        premium.premium = true;
        let mut verified = therapist(3, "Verified");
        verified.verified = true;
        let organic = therapist(4, "Organic");

        let entries = [
            Ranked { therapist: &organic, rating: rating(5.0, 40) },
            Ranked { therapist: &verified, rating: rating(1.0, 1) },
            Ranked { therapist: &premium, rating: rating(0.0, 0) },
            Ranked { therapist: &featured, rating: rating(2.0, 3) },
        ];

        assert_eq!(order(RankingPolicy::RELEVANCE, &entries), vec![1, 2, 3, 4]);
    }

    #[test]
    fn relevance_breaks_rating_ties_by_recency() {
        let older = therapist(1, "Older");
        let newer = therapist(2, "Newer");
        let entries = [
            Ranked { therapist: &older, rating: rating(4.0, 2) },
            Ranked { therapist: &newer, rating: rating(4.0, 9) },
        ];
        assert_eq!(order(RankingPolicy::RELEVANCE, &entries), vec![2, 1]);
    }

    #[test]
    fn unrated_sorts_after_rated_under_best_rated() {
        let unrated = therapist(1, "Unrated");
        let low = therapist(2, "Low");
        let high_few = therapist(3, "High few");
        let high_many = therapist(4, "High many");
        let entries = [
            Ranked { therapist: &unrated, rating: rating(0.0, 0) },
            Ranked { therapist: &low, rating: rating(1.0, 1) },
            Ranked { therapist: &high_few, rating: rating(4.5, 2) },
            Ranked { therapist: &high_many, rating: rating(4.5, 8) },
        ];
        assert_eq!(order(RankingPolicy::BEST_RATED, &entries), vec![4, 3, 2, 1]);
    }

    #[test]
    fn alphabetical_ignores_case_and_experience_sorts_descending() {
        let mut bruno = therapist(1, "bruno");
        bruno.experience_years = 3;
        let mut ana = therapist(2, "Ana");
        ana.experience_years = 12;
        let mut carla = therapist(3, "Carla");
        carla.experience_years = 7;
        let entries = [
            Ranked { therapist: &bruno, rating: rating(0.0, 0) },
            Ranked { therapist: &ana, rating: rating(0.0, 0) },
            Ranked { therapist: &carla, rating: rating(0.0, 0) },
        ];
        assert_eq!(order(RankingPolicy::ALPHABETICAL, &entries), vec![2, 1, 3]);
        assert_eq!(
            order(RankingPolicy::MOST_EXPERIENCED, &entries),
            vec![2, 3, 1]
        );
    }

    #[test]
    fn every_policy_ends_on_identity() {
        for key in [
            SortKey::Relevance,
            SortKey::BestRated,
            SortKey::MostExperienced,
            SortKey::Alphabetical,
        ] {
            assert_eq!(key.policy().keys().last(), Some(&TieBreak::Id));
            assert_eq!(SortKey::from_code(key.code()), Some(key));
        }
    }
}
