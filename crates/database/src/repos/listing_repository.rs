//! Listing repository for database operations.

use crate::entities::listing::{Listing, ListingFilter, ListingUpdate, NewListing};
use crate::types::{errors::ListingError, ListingResult};
use chrono::Utc;
use sqlx::SqlitePool;

const LISTING_COLUMNS: &str =
    "id, public_id, owner_id, title, location, technology, description, price, created_at, updated_at";

/// Repository for listing database operations. Creation and deletion also
/// maintain the owner's ordered back-references in `user_listings`, inside
/// the same transaction as the listing row itself.
#[derive(Clone)]
pub struct ListingRepository {
    pool: SqlitePool,
}

impl ListingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a listing by its public identifier. Malformed identifiers are
    /// rejected before any query runs; a missing row is a distinct
    /// `NotFound`.
    pub async fn find_by_public_id(&self, raw_id: &str) -> ListingResult<Listing> {
        let public_id = normalize_id(raw_id)?;

        let listing = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings WHERE public_id = ?"
        ))
        .bind(public_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ListingError::NotFound)?;

        Ok(listing)
    }

    /// All listings, newest first.
    pub async fn list_all(&self) -> ListingResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(&format!(
            "SELECT {LISTING_COLUMNS} FROM listings ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Search with a disjunctive case-insensitive substring match over
    /// title, location, and technology, plus an optional whitelisted sort.
    pub async fn search(&self, filter: &ListingFilter) -> ListingResult<Vec<Listing>> {
        let mut sql = format!("SELECT {LISTING_COLUMNS} FROM listings");

        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
            .map(|term| format!("%{term}%"));

        if pattern.is_some() {
            sql.push_str(" WHERE (title LIKE ? OR location LIKE ? OR technology LIKE ?)");
        }

        match filter.sort_by {
            Some(field) => {
                // Column names come from the SortField whitelist, never from
                // request input.
                sql.push_str(" ORDER BY ");
                sql.push_str(field.column());
                sql.push(' ');
                sql.push_str(filter.order.keyword());
                sql.push_str(", id ASC");
            }
            None => sql.push_str(" ORDER BY created_at DESC, id DESC"),
        }

        let mut query = sqlx::query_as::<_, Listing>(&sql);
        if let Some(pattern) = &pattern {
            query = query.bind(pattern).bind(pattern).bind(pattern);
        }

        let listings = query.fetch_all(&self.pool).await?;
        Ok(listings)
    }

    /// Persist a new listing and append it to the owner's reference
    /// collection. Both writes commit or roll back together.
    pub async fn create(&self, owner_id: i64, new: NewListing) -> ListingResult<Listing> {
        let public_id = cuid2::create_id();
        let now = Utc::now().to_rfc3339();

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            INSERT INTO listings (public_id, owner_id, title, location, technology, description, price, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&public_id)
        .bind(owner_id)
        .bind(&new.title)
        .bind(&new.location)
        .bind(&new.technology)
        .bind(&new.description)
        .bind(new.price)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let listing_id = result.last_insert_rowid();

        // MAX + 1 rather than COUNT: a delete leaves a gap, and a count
        // would collide with a surviving position.
        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM user_listings WHERE user_id = ?",
        )
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("INSERT INTO user_listings (user_id, listing_id, position) VALUES (?, ?, ?)")
            .bind(owner_id)
            .bind(listing_id)
            .bind(position)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Listing {
            id: listing_id,
            public_id,
            owner_id,
            title: new.title,
            location: new.location,
            technology: new.technology,
            description: new.description,
            price: new.price,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// Full-field replace of an existing listing. The owner reference is
    /// immutable.
    pub async fn update(&self, raw_id: &str, update: ListingUpdate) -> ListingResult<Listing> {
        let public_id = normalize_id(raw_id)?;
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET title = ?, location = ?, technology = ?, description = ?, price = ?, updated_at = ?
            WHERE public_id = ?
            "#,
        )
        .bind(&update.title)
        .bind(&update.location)
        .bind(&update.technology)
        .bind(&update.description)
        .bind(update.price)
        .bind(&now)
        .bind(public_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ListingError::NotFound);
        }

        self.find_by_public_id(public_id).await
    }

    /// Delete a listing and remove the owner's back-reference in the same
    /// transaction. Deleting an unknown identifier is an error, not a
    /// silent success.
    pub async fn delete(&self, raw_id: &str) -> ListingResult<()> {
        let public_id = normalize_id(raw_id)?;

        let mut tx = self.pool.begin().await?;

        let row: Option<(i64, i64)> =
            sqlx::query_as("SELECT id, owner_id FROM listings WHERE public_id = ?")
                .bind(public_id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some((listing_id, owner_id)) = row else {
            return Err(ListingError::NotFound);
        };

        sqlx::query("DELETE FROM user_listings WHERE user_id = ? AND listing_id = ?")
            .bind(owner_id)
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM listings WHERE id = ?")
            .bind(listing_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// The owner's listings, in the order they were added to the collection.
    pub async fn owned_listings(&self, user_id: i64) -> ListingResult<Vec<Listing>> {
        let listings = sqlx::query_as::<_, Listing>(
            r#"
            SELECT l.id, l.public_id, l.owner_id, l.title, l.location, l.technology,
                   l.description, l.price, l.created_at, l.updated_at
            FROM listings l
            JOIN user_listings ul ON ul.listing_id = l.id
            WHERE ul.user_id = ?
            ORDER BY ul.position ASC, l.id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(listings)
    }

    /// Identifiers in the owner's reference collection, in order.
    pub async fn owned_listing_ids(&self, user_id: i64) -> ListingResult<Vec<i64>> {
        let ids = sqlx::query_scalar(
            "SELECT listing_id FROM user_listings WHERE user_id = ? ORDER BY position ASC, listing_id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }
}

/// Guard against malformed identifiers before they reach a query. The
/// upstream client sometimes submits ids with a stray leading colon; those
/// are tolerated, anything with path separators or whitespace is not.
fn normalize_id(raw: &str) -> ListingResult<&str> {
    let id = raw.strip_prefix(':').unwrap_or(raw);

    if id.is_empty() || id.chars().any(|c| c == '/' || c == '\\' || c.is_whitespace()) {
        return Err(ListingError::InvalidId);
    }

    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::listing::{SortField, SortOrder};
    use crate::migrations::MIGRATOR;
    use nestboard_config::DatabaseConfig;
    use tempfile::TempDir;

    async fn create_test_repo() -> (ListingRepository, SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("listings.db");
        let db_url = format!("sqlite://{}", db_path.display());

        let config = DatabaseConfig {
            url: db_url,
            max_connections: 1,
        };

        let pool = crate::connection::prepare_database(&config).await.unwrap();
        MIGRATOR.run(&pool).await.unwrap();

        (ListingRepository::new(pool.clone()), pool, temp_dir)
    }

    async fn insert_user(pool: &SqlitePool, username: &str) -> i64 {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, username, password_hash, created_at, updated_at) VALUES (?, ?, 'x', ?, ?)",
        )
        .bind(format!("user-{username}"))
        .bind(username)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .unwrap();
        result.last_insert_rowid()
    }

    fn listing(title: &str, location: &str, technology: &str, price: i64) -> NewListing {
        NewListing {
            title: title.to_string(),
            location: location.to_string(),
            technology: technology.to_string(),
            description: String::new(),
            price,
        }
    }

    #[tokio::test]
    async fn create_links_owner_reference_in_order() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;

        let first = repo
            .create(owner, listing("Loft", "Berlin", "none", 900))
            .await
            .unwrap();
        let second = repo
            .create(owner, listing("Studio", "Hamburg", "fiber", 700))
            .await
            .unwrap();

        let ids = repo.owned_listing_ids(owner).await.unwrap();
        assert_eq!(ids, vec![first.id, second.id]);

        let owned = repo.owned_listings(owner).await.unwrap();
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].title, "Loft");
        assert_eq!(owned[1].title, "Studio");
    }

    #[tokio::test]
    async fn create_then_fetch_round_trips_all_fields() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;

        let created = repo
            .create(
                owner,
                NewListing {
                    title: "Loft".into(),
                    location: "Berlin".into(),
                    technology: "none".into(),
                    description: "Bright corner unit".into(),
                    price: 1200,
                },
            )
            .await
            .unwrap();

        let fetched = repo.find_by_public_id(&created.public_id).await.unwrap();
        assert_eq!(fetched.title, "Loft");
        assert_eq!(fetched.location, "Berlin");
        assert_eq!(fetched.technology, "none");
        assert_eq!(fetched.description, "Bright corner unit");
        assert_eq!(fetched.price, 1200);
        assert_eq!(fetched.owner_id, owner);
    }

    #[tokio::test]
    async fn find_tolerates_stray_colon_prefix() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;
        let created = repo
            .create(owner, listing("Loft", "Berlin", "none", 900))
            .await
            .unwrap();

        let fetched = repo
            .find_by_public_id(&format!(":{}", created.public_id))
            .await
            .unwrap();
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test]
    async fn malformed_identifiers_are_rejected_before_querying() {
        let (repo, _pool, _dir) = create_test_repo().await;

        for raw in ["", ":", "abc/def", "abc\\def", "a b"] {
            let err = repo.find_by_public_id(raw).await.unwrap_err();
            assert!(matches!(err, ListingError::InvalidId), "id {raw:?}");
        }
    }

    #[tokio::test]
    async fn update_replaces_all_fields() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;
        let created = repo
            .create(owner, listing("Loft", "Berlin", "none", 900))
            .await
            .unwrap();

        let updated = repo
            .update(
                &created.public_id,
                ListingUpdate {
                    title: "Penthouse".into(),
                    location: "Munich".into(),
                    technology: "fiber".into(),
                    description: "Renovated".into(),
                    price: 2500,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.title, "Penthouse");
        assert_eq!(updated.location, "Munich");
        assert_eq!(updated.price, 2500);
        assert_eq!(updated.owner_id, owner, "owner must not change");
    }

    #[tokio::test]
    async fn update_unknown_id_reports_not_found() {
        let (repo, _pool, _dir) = create_test_repo().await;
        let err = repo
            .update(
                "missing",
                ListingUpdate {
                    title: "x".into(),
                    location: "y".into(),
                    technology: "z".into(),
                    description: String::new(),
                    price: 0,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ListingError::NotFound));
    }

    #[tokio::test]
    async fn delete_removes_listing_and_owner_reference() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;
        let created = repo
            .create(owner, listing("Loft", "Berlin", "none", 900))
            .await
            .unwrap();

        repo.delete(&created.public_id).await.unwrap();

        let err = repo.find_by_public_id(&created.public_id).await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound));

        let ids = repo.owned_listing_ids(owner).await.unwrap();
        assert!(ids.is_empty(), "back-reference should be removed");
    }

    #[tokio::test]
    async fn positions_stay_unique_after_a_delete_leaves_a_gap() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;

        let a = repo.create(owner, listing("A", "X", "t", 1)).await.unwrap();
        let b = repo.create(owner, listing("B", "X", "t", 2)).await.unwrap();
        let c = repo.create(owner, listing("C", "X", "t", 3)).await.unwrap();

        repo.delete(&a.public_id).await.unwrap();
        let d = repo.create(owner, listing("D", "X", "t", 4)).await.unwrap();

        let ids = repo.owned_listing_ids(owner).await.unwrap();
        assert_eq!(ids, vec![b.id, c.id, d.id], "insertion order must survive the gap");

        let positions: Vec<i64> = sqlx::query_scalar(
            "SELECT position FROM user_listings WHERE user_id = ? ORDER BY position ASC",
        )
        .bind(owner)
        .fetch_all(&pool)
        .await
        .unwrap();
        let distinct: std::collections::HashSet<_> = positions.iter().collect();
        assert_eq!(
            distinct.len(),
            positions.len(),
            "positions must stay unique, got {positions:?}"
        );
    }

    #[tokio::test]
    async fn delete_unknown_id_reports_not_found() {
        let (repo, _pool, _dir) = create_test_repo().await;
        let err = repo.delete("missing").await.unwrap_err();
        assert!(matches!(err, ListingError::NotFound));
    }

    #[tokio::test]
    async fn search_matches_any_of_the_three_text_fields_case_insensitively() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;

        repo.create(owner, listing("Loft in Berlin", "Germany", "none", 900))
            .await
            .unwrap();
        repo.create(owner, listing("Studio", "berlin-mitte", "fiber", 700))
            .await
            .unwrap();
        repo.create(owner, listing("Cabin", "Alps", "BERLIN-grade wifi", 500))
            .await
            .unwrap();
        repo.create(owner, listing("Flat", "Hamburg", "dsl", 600))
            .await
            .unwrap();

        let results = repo
            .search(&ListingFilter {
                search: Some("berlin".into()),
                ..ListingFilter::default()
            })
            .await
            .unwrap();

        let titles: Vec<_> = results.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles.len(), 3);
        assert!(titles.contains(&"Loft in Berlin"));
        assert!(titles.contains(&"Studio"));
        assert!(titles.contains(&"Cabin"));
        assert!(!titles.contains(&"Flat"));
    }

    #[tokio::test]
    async fn search_sorts_by_price_descending() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;

        repo.create(owner, listing("A", "X", "t", 500)).await.unwrap();
        repo.create(owner, listing("B", "Y", "t", 900)).await.unwrap();
        repo.create(owner, listing("C", "Z", "t", 700)).await.unwrap();

        let results = repo
            .search(&ListingFilter {
                search: None,
                sort_by: Some(SortField::Price),
                order: SortOrder::Desc,
            })
            .await
            .unwrap();

        let prices: Vec<_> = results.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![900, 700, 500]);
        assert!(prices.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn blank_search_term_matches_everything() {
        let (repo, pool, _dir) = create_test_repo().await;
        let owner = insert_user(&pool, "alice").await;
        repo.create(owner, listing("A", "X", "t", 1)).await.unwrap();
        repo.create(owner, listing("B", "Y", "t", 2)).await.unwrap();

        let results = repo
            .search(&ListingFilter {
                search: Some("   ".into()),
                ..ListingFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(results.len(), 2);
    }
}
