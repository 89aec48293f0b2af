//! Read-side queries over a catalog snapshot: filtered search, listings,
//! autocomplete and profile assembly. Everything here is a pure function of
//! the snapshot and the request.

use super::domain::{Specialty, Therapist};
use super::filters::SearchParams;
use super::ranking::{Ranked, RankingPolicy};
use super::repository::CatalogSnapshot;
use super::views::{
    AutocompleteHit, ListingPage, PageInfo, ProfileStats, ProfileView, ReviewView, SearchFacets,
    SearchPage, SpecialtyDetail, SpecialtyTag, TherapistCard, TherapistDetails,
};

pub const PAGE_SIZE: usize = 12;
pub const AUTOCOMPLETE_LIMIT: usize = 8;
pub const AUTOCOMPLETE_MIN_CHARS: usize = 2;
pub const RELATED_LIMIT: usize = 3;
pub const RECENT_REVIEWS: usize = 5;
pub const HOME_FEATURED_LIMIT: usize = 6;

/// Slices one page out of `items`. Requests past the end land on the last
/// page; an empty set still reports a single (empty) page.
pub fn paginate<T>(items: Vec<T>, requested: usize, page_size: usize) -> (Vec<T>, PageInfo) {
    let page_size = page_size.max(1);
    let total_pages = items.len().div_ceil(page_size).max(1);
    let number = requested.clamp(1, total_pages);

    let page = items
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .collect();

    let info = PageInfo {
        number,
        total_pages,
        page_size,
        has_previous: number > 1,
        has_next: number < total_pages,
    };
    (page, info)
}

pub fn rank<'a>(
    snapshot: &'a CatalogSnapshot,
    therapists: impl IntoIterator<Item = &'a Therapist>,
    policy: RankingPolicy,
) -> Vec<Ranked<'a>> {
    let ratings = snapshot.ratings();
    let mut entries: Vec<Ranked<'a>> = therapists
        .into_iter()
        .map(|therapist| Ranked {
            therapist,
            rating: ratings.get(&therapist.id).copied().unwrap_or_default(),
        })
        .collect();
    policy.sort(&mut entries);
    entries
}

fn cards(snapshot: &CatalogSnapshot, entries: &[Ranked<'_>]) -> Vec<TherapistCard> {
    entries
        .iter()
        .map(|entry| TherapistCard::build(entry, snapshot))
        .collect()
}

pub fn search(snapshot: &CatalogSnapshot, params: &SearchParams) -> SearchPage {
    let matched = params.filters.apply(snapshot);
    let ranked = rank(snapshot, matched, params.sort.policy());
    let total_results = ranked.len();
    let (page, info) = paginate(ranked, params.page, PAGE_SIZE);

    let location_label = params
        .filters
        .city
        .and_then(|city_id| snapshot.location_label(city_id));

    SearchPage {
        results: cards(snapshot, &page),
        page: info,
        total_results,
        filters: params.echo.clone(),
        location_label,
        facets: SearchFacets::build(snapshot, params.filters.state),
    }
}

/// Unfiltered listing, optionally narrowed to one specialty.
pub fn listing(
    snapshot: &CatalogSnapshot,
    specialty: Option<&Specialty>,
    page: usize,
) -> ListingPage {
    let therapists = snapshot.therapists.iter().filter(|therapist| {
        therapist.is_active
            && specialty.map_or(true, |specialty| therapist.offers_specialty(specialty.id))
    });
    let ranked = rank(snapshot, therapists, RankingPolicy::LISTING);
    let total_results = ranked.len();
    let (page, info) = paginate(ranked, page, PAGE_SIZE);

    ListingPage {
        specialty: specialty.map(SpecialtyTag::from),
        results: cards(snapshot, &page),
        page: info,
        total_results,
        facets: SearchFacets::build(snapshot, None),
    }
}

pub fn autocomplete(snapshot: &CatalogSnapshot, query: &str) -> Vec<AutocompleteHit> {
    let query = query.trim();
    if query.chars().count() < AUTOCOMPLETE_MIN_CHARS {
        return Vec::new();
    }
    let needle = query.to_lowercase();

    let candidates = snapshot.therapists.iter().filter(|therapist| {
        therapist.is_active
            && therapist.verified
            && (therapist.display_name.to_lowercase().contains(&needle)
                || snapshot
                    .specialty_names(therapist)
                    .iter()
                    .any(|name| name.to_lowercase().contains(&needle)))
    });

    rank(snapshot, candidates, RankingPolicy::AUTOCOMPLETE)
        .iter()
        .take(AUTOCOMPLETE_LIMIT)
        .map(|entry| AutocompleteHit::build(entry, snapshot))
        .collect()
}

/// Therapists in the same city sharing at least one specialty. A therapist
/// without a city has no related profiles.
pub fn related(snapshot: &CatalogSnapshot, therapist: &Therapist) -> Vec<TherapistCard> {
    let Some(city_id) = therapist.city_id else {
        return Vec::new();
    };

    let candidates = snapshot.therapists.iter().filter(|candidate| {
        candidate.is_active
            && candidate.id != therapist.id
            && candidate.city_id == Some(city_id)
            && candidate
                .specialty_ids()
                .any(|id| therapist.offers_specialty(id))
    });

    let ranked = rank(snapshot, candidates, RankingPolicy::RELATED);
    cards(snapshot, &ranked[..ranked.len().min(RELATED_LIMIT)])
}

pub fn featured(snapshot: &CatalogSnapshot, limit: usize) -> Vec<TherapistCard> {
    let candidates = snapshot
        .therapists
        .iter()
        .filter(|therapist| therapist.is_active && therapist.featured);
    let ranked = rank(snapshot, candidates, RankingPolicy::RELEVANCE);
    cards(snapshot, &ranked[..ranked.len().min(limit)])
}

/// Featured active specialties by display order, then name.
pub fn featured_specialties(snapshot: &CatalogSnapshot) -> Vec<SpecialtyTag> {
    let mut specialties: Vec<&Specialty> = snapshot
        .specialties
        .iter()
        .filter(|specialty| specialty.is_active && specialty.featured)
        .collect();
    specialties.sort_by(|a, b| {
        a.display_order
            .cmp(&b.display_order)
            .then_with(|| a.name.cmp(&b.name))
    });
    specialties.into_iter().map(SpecialtyTag::from).collect()
}

/// Assembles the profile page. `view_count` is the counter after this visit.
pub fn profile(snapshot: &CatalogSnapshot, therapist: &Therapist, view_count: u32) -> ProfileView {
    let mut specialties: Vec<SpecialtyDetail> = therapist
        .specialties
        .iter()
        .filter(|pairing| pairing.is_active)
        .filter_map(|pairing| {
            snapshot
                .specialty(pairing.specialty_id)
                .map(|specialty| SpecialtyDetail::build(pairing, specialty))
        })
        .collect();
    specialties.sort_by(|a, b| {
        b.primary
            .cmp(&a.primary)
            .then_with(|| a.specialty.name.cmp(&b.specialty.name))
    });

    let mut reviews: Vec<_> = snapshot
        .reviews
        .iter()
        .filter(|review| review.is_active && review.therapist_id == therapist.id)
        .collect();
    reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

    let rating = snapshot.rating(therapist.id);

    ProfileView {
        therapist: TherapistDetails::build(therapist, snapshot),
        specialties,
        recent_reviews: reviews
            .into_iter()
            .take(RECENT_REVIEWS)
            .map(ReviewView::from)
            .collect(),
        stats: ProfileStats {
            review_count: rating.review_count,
            average_rating: rating.average(),
            experience_years: therapist.experience_years,
            view_count,
        },
        related: related(snapshot, therapist),
    }
}
