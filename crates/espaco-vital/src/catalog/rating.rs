use std::collections::HashMap;

use serde::Serialize;

use super::domain::{Review, TherapistId};

/// Rating aggregate recomputed from live review data on every read.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct RatingSummary {
    /// Unrounded mean of active review scores; 0.0 without reviews.
    #[serde(skip)]
    pub mean: f64,
    pub review_count: u32,
}

impl RatingSummary {
    pub fn from_reviews<'a, I>(therapist_id: TherapistId, reviews: I) -> Self
    where
        I: IntoIterator<Item = &'a Review>,
    {
        let (total, count) = reviews
            .into_iter()
            .filter(|review| review.is_active && review.therapist_id == therapist_id)
            .fold((0u64, 0u32), |(total, count), review| {
                (total + u64::from(review.score.value()), count + 1)
            });

        if count == 0 {
            return Self::default();
        }

        Self {
            mean: total as f64 / f64::from(count),
            review_count: count,
        }
    }

    /// Summaries for every therapist with at least one active review, built
    /// in a single pass over `reviews`.
    pub fn index<'a, I>(reviews: I) -> HashMap<TherapistId, Self>
    where
        I: IntoIterator<Item = &'a Review>,
    {
        let mut totals: HashMap<TherapistId, (u64, u32)> = HashMap::new();
        for review in reviews.into_iter().filter(|review| review.is_active) {
            let (total, count) = totals.entry(review.therapist_id).or_default();
            *total += u64::from(review.score.value());
            *count += 1;
        }

        totals
            .into_iter()
            .map(|(therapist_id, (total, count))| {
                let summary = Self {
                    mean: total as f64 / f64::from(count),
                    review_count: count,
                };
                (therapist_id, summary)
            })
            .collect()
    }

    /// Display value rounded to one decimal place.
    pub fn average(&self) -> f64 {
        (self.mean * 10.0).round() / 10.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::{ClientId, ReviewId, ReviewScore};
    use chrono::{TimeZone, Utc};

    fn review(id: u64, therapist: u64, score: u8, active: bool) -> Review {
        Review {
            id: ReviewId(id),
            therapist_id: TherapistId(therapist),
            client_id: ClientId(id),
            client_name: format!("Cliente {id}"),
            score: ReviewScore::new(score).expect("valid score"),
            comment: String::new(),
            session_date: None,
            recommends: true,
            verified: false,
            is_active: active,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn zero_reviews_yield_zero_rating() {
        let summary = RatingSummary::from_reviews(TherapistId(1), &Vec::<Review>::new());
        assert_eq!(summary.mean, 0.0);
        assert_eq!(summary.average(), 0.0);
        assert_eq!(summary.review_count, 0);
    }

    #[test]
    fn only_active_reviews_of_the_therapist_count() {
        let reviews = vec![
            review(1, 1, 5, true),
            review(2, 1, 4, true),
            review(3, 1, 4, true),
            review(4, 1, 1, false),
            review(5, 2, 1, true),
        ];
        let summary = RatingSummary::from_reviews(TherapistId(1), &reviews);
        assert_eq!(summary.review_count, 3);
        assert!((summary.mean - 13.0 / 3.0).abs() < 1e-9);
        assert_eq!(summary.average(), 4.3);
    }

    #[test]
    fn index_agrees_with_per_therapist_summaries() {
        let reviews = vec![
            review(1, 1, 5, true),
            review(2, 2, 2, true),
            review(3, 1, 4, true),
            review(4, 2, 5, false),
            review(5, 3, 1, false),
        ];
        let index = RatingSummary::index(&reviews);

        assert_eq!(index.len(), 2);
        for therapist in [1, 2] {
            let id = TherapistId(therapist);
            assert_eq!(index[&id], RatingSummary::from_reviews(id, &reviews));
        }
        assert!(!index.contains_key(&TherapistId(3)));
    }
}
