use libsql::Connection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::{USER_COLUMNS, User, row_to_user};

#[derive(Debug, Error)]
pub enum UserError {
    #[error("email taken")]
    EmailTaken,
    #[error(transparent)]
    Database(#[from] libsql::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct Users<'a> {
    conn: &'a Connection,
}

impl<'a> Users<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub async fn get_by_id(&self, id: i32) -> Result<Option<User>, UserError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");

        let mut rows = self.conn.query(&query, libsql::params![id]).await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(row_to_user(&row)?))
        } else {
            Ok(None)
        }
    }

    /// Partial overwrite: only provided fields change. Changing the email to
    /// one another user already holds fails with EmailTaken.
    pub async fn update(&self, id: i32, input: UpdateUser) -> Result<Option<User>, UserError> {
        if self.get_by_id(id).await?.is_none() {
            return Ok(None);
        }

        let mut updates = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(email) = &input.email {
            updates.push("email = ?");
            params.push(email.clone().into());
        }
        if let Some(first_name) = &input.first_name {
            updates.push("first_name = ?");
            params.push(first_name.clone().into());
        }
        if let Some(last_name) = &input.last_name {
            updates.push("last_name = ?");
            params.push(last_name.clone().into());
        }

        if updates.is_empty() {
            return self.get_by_id(id).await;
        }

        updates.push("updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')");
        params.push(id.into());

        let query = format!("UPDATE users SET {} WHERE id = ?", updates.join(", "));

        match self.conn.execute(&query, params).await {
            Ok(_) => {}
            Err(e) if e.to_string().contains("UNIQUE constraint failed") => {
                return Err(UserError::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }

        self.get_by_id(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{Auth, Credentials};
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

    #[tokio::test]
    async fn get_by_id_missing_returns_none() {
        let db = setup().await;
        let users = Users::new(db.connection());

        assert!(users.get_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_changes_only_provided_fields() {
        let db = setup().await;
        let user = create_user(&db, "ers@gmail.com").await;
        let users = Users::new(db.connection());

        let updated = users
            .update(
                user.id,
                UpdateUser {
                    email: None,
                    first_name: Some("Ers".to_string()),
                    last_name: Some("K".to_string()),
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.email, "ers@gmail.com");
        assert_eq!(updated.first_name.as_deref(), Some("Ers"));
        assert_eq!(updated.last_name.as_deref(), Some("K"));
    }

    #[tokio::test]
    async fn update_email_to_taken_address_is_rejected() {
        let db = setup().await;
        create_user(&db, "a@gmail.com").await;
        let user = create_user(&db, "b@gmail.com").await;
        let users = Users::new(db.connection());

        let err = users
            .update(
                user.id,
                UpdateUser {
                    email: Some("a@gmail.com".to_string()),
                    first_name: None,
                    last_name: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::EmailTaken));

        // Email kept as it was.
        let fetched = users.get_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(fetched.email, "b@gmail.com");
    }

    #[tokio::test]
    async fn update_with_empty_patch_returns_row_unchanged() {
        let db = setup().await;
        let user = create_user(&db, "ers@gmail.com").await;
        let users = Users::new(db.connection());

        let updated = users
            .update(
                user.id,
                UpdateUser {
                    email: None,
                    first_name: None,
                    last_name: None,
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.email, user.email);
        assert_eq!(updated.updated_at, user.updated_at);
    }
}
