//! Review store: per-movie sequences of user reviews, keyed for mutation by
//! `(movie_id, username, created_at)`.

use crate::model::Review;
use crate::store::{self, DataDir};
use std::collections::HashMap;
use std::path::PathBuf;

pub struct ReviewStore {
    path: PathBuf,
    reviews: HashMap<u32, Vec<Review>>,
}

impl ReviewStore {
    pub fn open(dir: &DataDir) -> Self {
        let path = dir.reviews_file();
        let reviews = store::load_or_default(&path);
        ReviewStore { path, reviews }
    }

    fn persist(&self) {
        store::save(&self.path, &self.reviews);
    }

    /// Appends to the movie's sequence. The rating is clamped to 1..=5.
    pub fn add(&mut self, mut review: Review) {
        review.rating = review.rating.clamp(1, 5);
        self.reviews.entry(review.movie_id).or_default().push(review);
        self.persist();
    }

    /// Reviews for one movie in insertion order; empty slice if none.
    pub fn list_for_movie(&self, movie_id: u32) -> &[Review] {
        self.reviews
            .get(&movie_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// All reviews across all movies, flattened.
    pub fn list_all(&self) -> Vec<&Review> {
        self.reviews.values().flatten().collect()
    }

    /// Replaces rating and text of the review matching the three-part key.
    /// The original `created_at` is kept, it is the identity key.
    pub fn update(
        &mut self,
        movie_id: u32,
        username: &str,
        created_at: i64,
        new_rating: u8,
        new_text: &str,
    ) -> bool {
        let Some(review) = self
            .reviews
            .get_mut(&movie_id)
            .and_then(|reviews| {
                reviews
                    .iter_mut()
                    .find(|r| r.username == username && r.created_at == created_at)
            })
        else {
            return false;
        };
        review.rating = new_rating.clamp(1, 5);
        review.text = new_text.to_owned();
        self.persist();
        true
    }

    /// Removes the review matching the three-part key. A movie whose sequence
    /// becomes empty is dropped from the store entirely.
    pub fn delete(&mut self, movie_id: u32, username: &str, created_at: i64) -> bool {
        let Some(reviews) = self.reviews.get_mut(&movie_id) else {
            return false;
        };
        let before = reviews.len();
        reviews.retain(|r| !(r.username == username && r.created_at == created_at));
        let removed = reviews.len() != before;
        if reviews.is_empty() {
            self.reviews.remove(&movie_id);
        }
        if removed {
            self.persist();
        }
        removed
    }

    #[cfg(test)]
    fn movie_ids(&self) -> Vec<u32> {
        self.reviews.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(tmp: &tempfile::TempDir) -> ReviewStore {
        ReviewStore::open(&DataDir::new(tmp.path()))
    }

    fn review(movie_id: u32, username: &str, rating: u8, text: &str, created_at: i64) -> Review {
        Review {
            movie_id,
            username: username.to_owned(),
            rating,
            text: text.to_owned(),
            created_at,
        }
    }

    #[test]
    fn add_then_update_preserves_timestamp() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(&tmp);
        store.add(review(42, "alice", 5, "great", 1));
        assert_eq!(store.list_for_movie(42).len(), 1);

        assert!(store.update(42, "alice", 1, 3, "ok"));
        let reviews = store.list_for_movie(42);
        assert_eq!(reviews.len(), 1);
        assert_eq!(reviews[0].rating, 3);
        assert_eq!(reviews[0].text, "ok");
        assert_eq!(reviews[0].created_at, 1);

        // Wrong key, nothing to update.
        assert!(!store.update(42, "alice", 2, 4, "nope"));
        assert!(!store.update(42, "bob", 1, 4, "nope"));
        assert!(!store.update(7, "alice", 1, 4, "nope"));
    }

    #[test]
    fn ratings_are_clamped() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(&tmp);
        store.add(review(1, "alice", 9, "way too good", 1));
        store.add(review(1, "bob", 0, "unwatchable", 2));
        assert_eq!(store.list_for_movie(1)[0].rating, 5);
        assert_eq!(store.list_for_movie(1)[1].rating, 1);
        assert!(store.update(1, "alice", 1, 200, "still too good"));
        assert_eq!(store.list_for_movie(1)[0].rating, 5);
    }

    #[test]
    fn same_user_may_review_a_movie_twice() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(&tmp);
        store.add(review(42, "alice", 5, "first pass", 1));
        store.add(review(42, "alice", 2, "second thoughts", 2));
        assert_eq!(store.list_for_movie(42).len(), 2);
        // Each timestamp key addresses exactly one of them.
        assert!(store.delete(42, "alice", 1));
        let remaining = store.list_for_movie(42);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].created_at, 2);
    }

    #[test]
    fn deleting_last_review_drops_the_movie_entry() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(&tmp);
        store.add(review(42, "alice", 4, "fine", 1));
        assert!(store.delete(42, "alice", 1));
        assert!(store.list_for_movie(42).is_empty());
        assert!(store.movie_ids().is_empty());
        assert!(!store.delete(42, "alice", 1));
    }

    #[test]
    fn list_all_flattens_across_movies() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = store_in(&tmp);
        store.add(review(1, "alice", 3, "a", 1));
        store.add(review(2, "bob", 4, "b", 2));
        store.add(review(2, "carol", 5, "c", 3));
        assert_eq!(store.list_all().len(), 3);
    }

    #[test]
    fn reviews_survive_reload() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let mut store = store_in(&tmp);
            store.add(review(42, "alice", 5, "great", 1));
        }
        let store = store_in(&tmp);
        assert_eq!(store.list_for_movie(42).len(), 1);
        assert_eq!(store.list_for_movie(42)[0].text, "great");
    }
}
