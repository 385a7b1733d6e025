use crate::DbError;
use chrono::NaiveDate;
use core_types::UserRole;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use sqlx::postgres::PgPool;
use tracing::debug;

/// Lists are paginated in fixed pages of 50 titles.
pub const LIST_PAGE_SIZE: i64 = 50;

/// The `CatalogRepository` provides a high-level, application-specific
/// interface to the catalog database. It encapsulates all SQL queries and
/// data access logic; nothing outside this crate composes SQL.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

/// One row of a user's saved lists: just the list title.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserListRow {
    pub list_title: String,
}

/// A full-text search hit against the titles table, joined with editions
/// so the caller can link straight to a concrete edition.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TitleHit {
    pub title_id: i32,
    pub title: String,
    pub edition_id: i32,
}

/// A full-text search hit against the authors table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuthorHit {
    pub author_id: i32,
    pub author_name: String,
}

/// A full-text search hit against the categories table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct CategoryHit {
    pub category_id: i32,
    pub cat_description: String,
}

/// A full-text search hit against the users table.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct UserHit {
    pub user_id: i32,
    pub username: String,
}

/// One flattened row of the author/edition/title/publisher join.
///
/// Optional bibliographic columns are defaulted in SQL (`COALESCE`) rather
/// than surfaced as `Option`s: missing text becomes "Not Available" and a
/// missing page count becomes 0. Only the publication date stays optional.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct AuthorBook {
    pub author_id: i32,
    pub author_name: String,
    pub isbn: String,
    pub edition_name: String,
    pub page_count: i32,
    pub title: String,
    pub pub_name: String,
    pub pub_date: Option<NaiveDate>,
}

/// Converts a 1-based page number into a row offset. Pages below 1 are
/// treated as page 1.
fn list_page_offset(page: u32) -> i64 {
    (i64::from(page.max(1)) - 1) * LIST_PAGE_SIZE
}

impl CatalogRepository {
    /// Creates a new `CatalogRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ==========================================================================
    // Credential Operations
    // ==========================================================================

    /// Checks a login challenge against the stored password digest for
    /// `username`.
    ///
    /// Returns `Ok(false)` both for an unknown username and for a wrong
    /// password, so callers cannot distinguish the two cases.
    pub async fn verify_credentials(
        &self,
        username: &str,
        challenge: &str,
    ) -> Result<bool, DbError> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE username = $1")
                .bind(username)
                .fetch_optional(&self.pool)
                .await?;

        match stored {
            None => Ok(false),
            // The stored digest carries its own salt; verification must use
            // it rather than hashing the challenge with a fresh salt.
            Some(digest) => Ok(auth::verify_password(challenge, &digest)?),
        }
    }

    /// Inserts a new user row with a salted password digest, the default
    /// `Member` role, and server-assigned lifecycle dates.
    ///
    /// Username uniqueness is enforced by the schema, not checked here; a
    /// duplicate surfaces as the underlying database error.
    pub async fn add_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), DbError> {
        let digest = auth::hash_password(password)?;

        sqlx::query(
            r#"
            INSERT INTO users (username, password, email, user_role, start_date, last_login, end_date)
            VALUES ($1, $2, $3, $4, current_date, now(), NULL)
            "#,
        )
        .bind(username)
        .bind(digest)
        .bind(email)
        .bind(UserRole::Member.as_db_value())
        .execute(&self.pool)
        .await?;

        debug!(username, "created user");
        Ok(())
    }

    // ==========================================================================
    // List Retrieval
    // ==========================================================================

    /// Fetches one page (50 rows) of the lists created by `user_id`,
    /// ordered by list title. `page` is 1-based.
    pub async fn user_lists(&self, user_id: i32, page: u32) -> Result<Vec<UserListRow>, DbError> {
        let rows = sqlx::query_as::<_, UserListRow>(
            r#"
            SELECT list_title
            FROM lists
            WHERE created_by = $1
            ORDER BY list_title
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(LIST_PAGE_SIZE)
        .bind(list_page_offset(page))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    // ==========================================================================
    // Full-Text Search Operations
    // ==========================================================================

    /// Full-text search over title names. Each hit is joined with its
    /// editions, so a title with several editions appears once per edition.
    pub async fn search_titles(&self, query: &str) -> Result<Vec<TitleHit>, DbError> {
        debug!(query, "searching titles");
        let hits = sqlx::query_as::<_, TitleHit>(
            r#"
            SELECT title_id, title, edition_id
            FROM titles
            JOIN editions USING (title_id)
            WHERE to_tsvector('english', title) @@ plainto_tsquery('english', $1)
            ORDER BY title DESC
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    /// Full-text search over author names.
    pub async fn search_authors(&self, query: &str) -> Result<Vec<AuthorHit>, DbError> {
        debug!(query, "searching authors");
        let hits = sqlx::query_as::<_, AuthorHit>(
            r#"
            SELECT author_id, author_name
            FROM authors
            WHERE to_tsvector('english', author_name) @@ plainto_tsquery('english', $1)
            ORDER BY author_name DESC
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    /// Full-text search over category descriptions.
    pub async fn search_categories(&self, query: &str) -> Result<Vec<CategoryHit>, DbError> {
        debug!(query, "searching categories");
        let hits = sqlx::query_as::<_, CategoryHit>(
            r#"
            SELECT category_id, cat_description
            FROM categories
            WHERE to_tsvector('english', cat_description) @@ plainto_tsquery('english', $1)
            ORDER BY cat_description DESC
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    /// Full-text search over usernames.
    pub async fn search_users(&self, query: &str) -> Result<Vec<UserHit>, DbError> {
        debug!(query, "searching users");
        let hits = sqlx::query_as::<_, UserHit>(
            r#"
            SELECT user_id, username
            FROM users
            WHERE to_tsvector('english', username) @@ plainto_tsquery('english', $1)
            ORDER BY username DESC
            "#,
        )
        .bind(query)
        .fetch_all(&self.pool)
        .await?;

        Ok(hits)
    }

    // ==========================================================================
    // Identifier Lookup
    // ==========================================================================

    /// Resolves a username to its integer identifier.
    ///
    /// Unlike the search operations, the caller needs this row to exist;
    /// a missing username is reported as `DbError::NotFound`.
    pub async fn user_id(&self, username: &str) -> Result<i32, DbError> {
        let user_id = sqlx::query_scalar::<_, i32>(
            "SELECT user_id FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::RowNotFound = e {
                DbError::NotFound
            } else {
                e.into()
            }
        })?;

        Ok(user_id)
    }

    // ==========================================================================
    // Joined Bibliographic Query
    // ==========================================================================

    /// Fetches every edition attributed to `author_id`, flattened across
    /// the author, edition, title, and publisher tables. An unknown author
    /// yields an empty vec.
    pub async fn author_books(&self, author_id: i32) -> Result<Vec<AuthorBook>, DbError> {
        let books = sqlx::query_as::<_, AuthorBook>(
            r#"
            SELECT authors.author_id, authors.author_name,
                   COALESCE(isbn, 'Not Available') AS isbn,
                   COALESCE(edition_name, 'Not Available') AS edition_name,
                   COALESCE(page_count, 0) AS page_count,
                   COALESCE(title, 'Not Available') AS title,
                   COALESCE(pub_name, 'Not Available') AS pub_name,
                   pub_date
            FROM authors
            JOIN editions_authors ON (editions_authors.author_id = authors.author_id)
            JOIN editions ON (editions.edition_id = editions_authors.edition_id)
            JOIN titles ON (titles.title_id = editions.title_id)
            JOIN editions_publishers ON (editions_publishers.edition_id = editions.edition_id)
            JOIN publishers ON (publishers.publisher_id = editions_publishers.publisher_id)
            WHERE authors.author_id = $1
            ORDER BY title, edition_name
            "#,
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(books)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{connect, run_migrations};
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn page_offset_is_zero_based_in_blocks_of_fifty() {
        assert_eq!(list_page_offset(1), 0);
        assert_eq!(list_page_offset(2), 50);
        assert_eq!(list_page_offset(4), 150);
    }

    #[test]
    fn page_numbers_below_one_are_clamped() {
        assert_eq!(list_page_offset(0), 0);
    }

    /// Connects to the database named by DATABASE_URL and applies the schema.
    async fn test_repo() -> CatalogRepository {
        let pool = connect().await.expect("DATABASE_URL must point at a test database");
        run_migrations(&pool).await.expect("schema migration failed");
        CatalogRepository::new(pool)
    }

    /// Suffixes a fixture name with the current nanosecond clock so repeated
    /// test runs against the same database never collide.
    fn unique(prefix: &str) -> String {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("{prefix}_{nanos}")
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn credentials_verify_only_for_the_stored_password() {
        let repo = test_repo().await;
        let username = unique("reader");

        repo.add_user(&username, "tolle lege", "reader@example.org")
            .await
            .unwrap();

        assert!(repo.verify_credentials(&username, "tolle lege").await.unwrap());
        assert!(!repo.verify_credentials(&username, "tolle  lege").await.unwrap());
        assert!(!repo.verify_credentials(&username, "").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn unknown_username_fails_verification_for_any_challenge() {
        let repo = test_repo().await;
        let username = unique("nobody");

        assert!(!repo.verify_credentials(&username, "anything").await.unwrap());
        assert!(!repo.verify_credentials(&username, "").await.unwrap());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn user_id_resolves_or_reports_not_found() {
        let repo = test_repo().await;
        let username = unique("borges");

        repo.add_user(&username, "el aleph", "jlb@example.org")
            .await
            .unwrap();

        let id = repo.user_id(&username).await.unwrap();
        assert!(id > 0);

        let missing = repo.user_id(&unique("ghost")).await;
        assert!(matches!(missing, Err(DbError::NotFound)));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn searches_return_empty_for_non_matching_queries() {
        let repo = test_repo().await;
        // A token that no fixture ever inserts.
        let query = unique("xylotomous");

        assert!(repo.search_titles(&query).await.unwrap().is_empty());
        assert!(repo.search_authors(&query).await.unwrap().is_empty());
        assert!(repo.search_categories(&query).await.unwrap().is_empty());
        assert!(repo.search_users(&query).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn title_search_sorts_descending_by_title() {
        let repo = test_repo().await;
        // Marker word isolates this test's fixtures from everything else
        // in the shared test database.
        let marker = unique("quagga");

        for title in [format!("{marker} atlas"), format!("{marker} bestiary")] {
            let title_id: i32 =
                sqlx::query_scalar("INSERT INTO titles (title) VALUES ($1) RETURNING title_id")
                    .bind(&title)
                    .fetch_one(&repo.pool)
                    .await
                    .unwrap();
            sqlx::query("INSERT INTO editions (title_id) VALUES ($1)")
                .bind(title_id)
                .execute(&repo.pool)
                .await
                .unwrap();
        }

        let hits = repo.search_titles(&marker).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits[0].title.ends_with("bestiary"));
        assert!(hits[1].title.ends_with("atlas"));
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn user_lists_paginate_in_pages_of_fifty() {
        let repo = test_repo().await;
        let username = unique("curator");

        repo.add_user(&username, "shelves", "curator@example.org")
            .await
            .unwrap();
        let user_id = repo.user_id(&username).await.unwrap();

        for name in ["winter reading", "maps", "field guides"] {
            sqlx::query("INSERT INTO lists (list_title, created_by) VALUES ($1, $2)")
                .bind(name)
                .bind(user_id)
                .execute(&repo.pool)
                .await
                .unwrap();
        }

        let page_one = repo.user_lists(user_id, 1).await.unwrap();
        let titles: Vec<_> = page_one.iter().map(|r| r.list_title.as_str()).collect();
        assert_eq!(titles, vec!["field guides", "maps", "winter reading"]);

        assert!(repo.user_lists(user_id, 2).await.unwrap().is_empty());
    }

    #[tokio::test]
    #[ignore = "requires database"]
    async fn author_books_substitute_defaults_for_missing_fields() {
        let repo = test_repo().await;
        let author_name = unique("anon");

        let author_id: i32 = sqlx::query_scalar(
            "INSERT INTO authors (author_name) VALUES ($1) RETURNING author_id",
        )
        .bind(&author_name)
        .fetch_one(&repo.pool)
        .await
        .unwrap();

        let title_id: i32 =
            sqlx::query_scalar("INSERT INTO titles (title) VALUES ($1) RETURNING title_id")
                .bind(unique("untitled"))
                .fetch_one(&repo.pool)
                .await
                .unwrap();

        // Edition with no isbn, edition name, or page count recorded.
        let edition_id: i32 = sqlx::query_scalar(
            "INSERT INTO editions (title_id) VALUES ($1) RETURNING edition_id",
        )
        .bind(title_id)
        .fetch_one(&repo.pool)
        .await
        .unwrap();

        let publisher_id: i32 = sqlx::query_scalar(
            "INSERT INTO publishers (pub_name) VALUES ($1) RETURNING publisher_id",
        )
        .bind(unique("press"))
        .fetch_one(&repo.pool)
        .await
        .unwrap();

        sqlx::query("INSERT INTO editions_authors (edition_id, author_id) VALUES ($1, $2)")
            .bind(edition_id)
            .bind(author_id)
            .execute(&repo.pool)
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO editions_publishers (edition_id, publisher_id) VALUES ($1, $2)",
        )
        .bind(edition_id)
        .bind(publisher_id)
        .execute(&repo.pool)
        .await
        .unwrap();

        let books = repo.author_books(author_id).await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].isbn, "Not Available");
        assert_eq!(books[0].edition_name, "Not Available");
        assert_eq!(books[0].page_count, 0);
        assert_eq!(books[0].pub_date, None);

        // An author nobody has catalogued yields an empty vec, not an error.
        assert!(repo.author_books(author_id + 1_000_000).await.unwrap().is_empty());
    }
}
