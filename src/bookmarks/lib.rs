use anyhow::Result;
use libsql::Connection;
use serde::{Deserialize, Serialize};

const BOOKMARK_COLUMNS: &str = "id, user_id, title, description, link, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: i32,
    pub user_id: i32,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmark {
    pub title: String,
    pub description: Option<String>,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmark {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link: Option<String>,
}

pub struct Bookmarks<'a> {
    conn: &'a Connection,
}

impl<'a> Bookmarks<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn list(&self, user_id: i32) -> Result<Vec<Bookmark>> {
        let query = format!(
            r#"
            SELECT {BOOKMARK_COLUMNS}
            FROM bookmarks
            WHERE user_id = ?
            ORDER BY id ASC
        "#
        );

        let mut rows = self.conn.query(&query, libsql::params![user_id]).await?;
        let mut bookmarks = Vec::new();

        while let Some(row) = rows.next().await? {
            bookmarks.push(self.row_to_bookmark(&row)?);
        }

        Ok(bookmarks)
    }

    /// Filters by id and owner in one query, so a bookmark owned by someone
    /// else is indistinguishable from one that does not exist.
    pub async fn get_by_id(&self, user_id: i32, id: i32) -> Result<Option<Bookmark>> {
        let query = format!(
            r#"
            SELECT {BOOKMARK_COLUMNS}
            FROM bookmarks
            WHERE id = ? AND user_id = ?
        "#
        );

        let mut rows = self.conn.query(&query, libsql::params![id, user_id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    /// The owner is always the authenticated user, never client input.
    pub async fn create(&self, user_id: i32, input: CreateBookmark) -> Result<Bookmark> {
        let query = format!(
            r#"
            INSERT INTO bookmarks (user_id, title, description, link)
            VALUES (?, ?, ?, ?)
            RETURNING {BOOKMARK_COLUMNS}
        "#
        );

        let mut rows = self
            .conn
            .query(
                &query,
                libsql::params![user_id, input.title, input.description, input.link],
            )
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(self.row_to_bookmark(&row)?)
        } else {
            anyhow::bail!("Failed to create bookmark")
        }
    }

    /// Partial overwrite: only provided fields change. Returns None when the
    /// bookmark is absent or owned by a different user.
    pub async fn update(&self, user_id: i32, id: i32, input: UpdateBookmark) -> Result<Option<Bookmark>> {
        let existing = match self.fetch_any(id).await? {
            Some(bookmark) if bookmark.user_id == user_id => bookmark,
            _ => return Ok(None),
        };

        let mut updates = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(title) = &input.title {
            updates.push("title = ?");
            params.push(title.clone().into());
        }
        if let Some(description) = &input.description {
            updates.push("description = ?");
            params.push(description.clone().into());
        }
        if let Some(link) = &input.link {
            updates.push("link = ?");
            params.push(link.clone().into());
        }

        if updates.is_empty() {
            return Ok(Some(existing));
        }

        updates.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
        params.push(id.into());

        let query = format!("UPDATE bookmarks SET {} WHERE id = ?", updates.join(", "));

        self.conn.execute(&query, params).await?;
        self.get_by_id(user_id, id).await
    }

    /// Hard delete with the same lookup policy as update. Returns the
    /// pre-deletion row, or None when absent or owned by a different user.
    pub async fn delete(&self, user_id: i32, id: i32) -> Result<Option<Bookmark>> {
        let existing = match self.fetch_any(id).await? {
            Some(bookmark) if bookmark.user_id == user_id => bookmark,
            _ => return Ok(None),
        };

        self.conn
            .execute("DELETE FROM bookmarks WHERE id = ?", libsql::params![id])
            .await?;

        Ok(Some(existing))
    }

    // Lookup by id alone; callers own the ownership check.
    async fn fetch_any(&self, id: i32) -> Result<Option<Bookmark>> {
        let query = format!(
            r#"
            SELECT {BOOKMARK_COLUMNS}
            FROM bookmarks
            WHERE id = ?
        "#
        );

        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(self.row_to_bookmark(&row)?))
        } else {
            Ok(None)
        }
    }

    fn row_to_bookmark(&self, row: &libsql::Row) -> Result<Bookmark> {
        Ok(Bookmark {
            id: row.get(0)?,
            user_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            link: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, Credentials, User};
    use crate::db::Database;

    async fn setup() -> Database {
        Database::open_in_memory().await.unwrap()
    }

    async fn create_user(db: &Database, email: &str) -> User {
        Auth::new(db.connection())
            .signup(Credentials {
                email: email.to_string(),
                password: "123456".to_string(),
            })
            .await
            .unwrap()
    }

    fn google() -> CreateBookmark {
        CreateBookmark {
            title: "Google".to_string(),
            description: Some("Search engine".to_string()),
            link: "https://google.com".to_string(),
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_matching_record() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(user.id, google()).await.unwrap();
        assert_eq!(created.user_id, user.id);
        assert_eq!(created.title, "Google");
        assert_eq!(created.description.as_deref(), Some("Search engine"));
        assert_eq!(created.link, "https://google.com");

        let fetched = lib.get_by_id(user.id, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);
        assert_eq!(fetched.title, created.title);
        assert_eq!(fetched.link, created.link);
    }

    #[tokio::test]
    async fn get_by_id_hides_other_users_bookmarks() {
        let db = setup().await;
        let owner = create_user(&db, "a@gmail.com").await;
        let other = create_user(&db, "b@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(owner.id, google()).await.unwrap();

        assert!(lib.get_by_id(other.id, created.id).await.unwrap().is_none());
        assert!(lib.get_by_id(owner.id, created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(user.id, google()).await.unwrap();

        let updated = lib
            .update(
                user.id,
                created.id,
                UpdateBookmark {
                    title: Some("X".to_string()),
                    description: None,
                    link: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, "X");
        assert_eq!(updated.description, created.description);
        assert_eq!(updated.link, created.link);
    }

    #[tokio::test]
    async fn update_with_empty_patch_returns_row_unchanged() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(user.id, google()).await.unwrap();

        let updated = lib
            .update(
                user.id,
                created.id,
                UpdateBookmark {
                    title: None,
                    description: None,
                    link: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.title, created.title);
        assert_eq!(updated.updated_at, created.updated_at);
    }

    #[tokio::test]
    async fn update_by_non_owner_looks_like_missing_record() {
        let db = setup().await;
        let owner = create_user(&db, "a@gmail.com").await;
        let other = create_user(&db, "b@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(owner.id, google()).await.unwrap();

        let result = lib
            .update(
                other.id,
                created.id,
                UpdateBookmark {
                    title: Some("stolen".to_string()),
                    description: None,
                    link: None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());

        // Untouched for the owner.
        let fetched = lib.get_by_id(owner.id, created.id).await.unwrap().unwrap();
        assert_eq!(fetched.title, "Google");
    }

    #[tokio::test]
    async fn update_missing_record_returns_none() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let result = lib
            .update(
                user.id,
                999,
                UpdateBookmark {
                    title: Some("X".to_string()),
                    description: None,
                    link: None,
                },
            )
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_returns_row_and_makes_it_absent() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(user.id, google()).await.unwrap();

        let deleted = lib.delete(user.id, created.id).await.unwrap().unwrap();
        assert_eq!(deleted.id, created.id);
        assert_eq!(deleted.title, created.title);

        assert!(lib.get_by_id(user.id, created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_by_non_owner_leaves_record_in_place() {
        let db = setup().await;
        let owner = create_user(&db, "a@gmail.com").await;
        let other = create_user(&db, "b@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(owner.id, google()).await.unwrap();

        assert!(lib.delete(other.id, created.id).await.unwrap().is_none());
        assert!(lib.get_by_id(owner.id, created.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn list_returns_only_own_bookmarks() {
        let db = setup().await;
        let a = create_user(&db, "a@gmail.com").await;
        let b = create_user(&db, "b@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let first = lib.create(a.id, google()).await.unwrap();
        let second = lib
            .create(
                a.id,
                CreateBookmark {
                    title: "Rust".to_string(),
                    description: None,
                    link: "https://rust-lang.org".to_string(),
                },
            )
            .await
            .unwrap();
        lib.create(b.id, google()).await.unwrap();

        lib.delete(a.id, first.id).await.unwrap();

        let listed = lib.list(a.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, second.id);

        assert_eq!(lib.list(b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_with_no_bookmarks_is_empty() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        assert!(lib.list(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wire_format_uses_camel_case_fields() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let created = lib.create(user.id, google()).await.unwrap();
        let value = serde_json::to_value(&created).unwrap();

        assert_eq!(value["userId"], user.id);
        assert!(value.get("user_id").is_none());
        assert!(value.get("createdAt").is_some());
    }

    #[tokio::test]
    async fn duplicate_bookmarks_are_permitted() {
        let db = setup().await;
        let user = create_user(&db, "a@gmail.com").await;
        let lib = Bookmarks::new(db.connection());

        let first = lib.create(user.id, google()).await.unwrap();
        let second = lib.create(user.id, google()).await.unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(lib.list(user.id).await.unwrap().len(), 2);
    }
}
