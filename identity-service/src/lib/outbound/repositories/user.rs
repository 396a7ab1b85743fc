use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::Utc;
use serde_json::Value;
use sqlx::PgConnection;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Roles;
use crate::domain::user::models::StaffType;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::ports::UserRepository;
use crate::domain::user::profile::UserProfile;
use crate::user::errors::UserError;

const USER_COLUMNS: &str = r#"
    u.id, u.email, u.password_hash, u.refresh_token_hash, u.roles, u.is_active,
    u.type_of_staff, u.created_at, u.updated_at,
    p.user_id AS profile_user_id, p.first_name, p.last_name, p.birthdate, p.phone,
    p.gender, p.avatar_url, p.metadata, p.employee_number,
    p.created_at AS profile_created_at, p.updated_at AS profile_updated_at
"#;

const USER_SOURCE: &str = "users u LEFT JOIN user_profiles p ON p.user_id = u.id";

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    refresh_token_hash: Option<String>,
    roles: Vec<String>,
    is_active: bool,
    type_of_staff: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    // Profile columns, all NULL when the user has no profile
    profile_user_id: Option<Uuid>,
    first_name: Option<String>,
    last_name: Option<String>,
    birthdate: Option<NaiveDate>,
    phone: Option<String>,
    gender: Option<String>,
    avatar_url: Option<String>,
    metadata: Option<Value>,
    employee_number: Option<String>,
    profile_created_at: Option<DateTime<Utc>>,
    profile_updated_at: Option<DateTime<Utc>>,
}

impl UserRow {
    fn profile(&mut self) -> Option<UserProfile> {
        self.profile_user_id?;

        Some(UserProfile {
            first_name: self.first_name.take(),
            last_name: self.last_name.take(),
            birthdate: self.birthdate,
            phone: self.phone.take(),
            gender: self.gender.take(),
            avatar_url: self.avatar_url.take(),
            metadata: self.metadata.take(),
            employee_number: self.employee_number.take(),
            created_at: self.profile_created_at.unwrap_or(self.created_at),
            updated_at: self.profile_updated_at.unwrap_or(self.updated_at),
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = UserError;

    fn try_from(mut row: UserRow) -> Result<Self, Self::Error> {
        let profile = row.profile();
        let type_of_staff = row
            .type_of_staff
            .as_deref()
            .map(str::parse::<StaffType>)
            .transpose()?;

        Ok(User {
            id: UserId(row.id),
            email: EmailAddress::new(row.email)?,
            password_hash: row.password_hash,
            refresh_token_hash: row.refresh_token_hash,
            roles: Roles::parse(&row.roles)?,
            is_active: row.is_active,
            type_of_staff,
            profile,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert or overwrite the profile row of a user.
async fn upsert_profile(
    conn: &mut PgConnection,
    id: &UserId,
    profile: &UserProfile,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO user_profiles (
            user_id, first_name, last_name, birthdate, phone, gender, avatar_url,
            metadata, employee_number, created_at, updated_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        ON CONFLICT (user_id) DO UPDATE SET
            first_name = EXCLUDED.first_name,
            last_name = EXCLUDED.last_name,
            birthdate = EXCLUDED.birthdate,
            phone = EXCLUDED.phone,
            gender = EXCLUDED.gender,
            avatar_url = EXCLUDED.avatar_url,
            metadata = EXCLUDED.metadata,
            employee_number = EXCLUDED.employee_number,
            updated_at = EXCLUDED.updated_at
        "#,
    )
    .bind(id.0)
    .bind(&profile.first_name)
    .bind(&profile.last_name)
    .bind(profile.birthdate)
    .bind(&profile.phone)
    .bind(&profile.gender)
    .bind(&profile.avatar_url)
    .bind(profile.metadata.clone())
    .bind(&profile.employee_number)
    .bind(profile.created_at)
    .bind(profile.updated_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Map write errors, turning the email uniqueness constraint into a domain error.
fn map_write_error(e: sqlx::Error, email: &EmailAddress) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_email_key") {
            return UserError::EmailAlreadyExists(email.as_str().to_string());
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn map_read_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create(&self, user: User) -> Result<User, UserError> {
        let mut tx = self.pool.begin().await.map_err(map_read_error)?;

        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, refresh_token_hash, roles, is_active,
                type_of_staff, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(&user.refresh_token_hash)
        .bind(user.roles.to_strings())
        .bind(user.is_active)
        .bind(user.type_of_staff.map(|staff| staff.as_str()))
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        if let Some(profile) = &user.profile {
            upsert_profile(&mut tx, &user.id, profile)
                .await
                .map_err(map_read_error)?;
        }

        tx.commit().await.map_err(map_read_error)?;

        Ok(user)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM {} WHERE u.id = $1",
            USER_COLUMNS, USER_SOURCE
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM {} WHERE u.email = $1",
            USER_COLUMNS, USER_SOURCE
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_read_error)?;

        row.map(User::try_from).transpose()
    }

    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            SELECT {}
            FROM {}
            WHERE ($1::BOOLEAN IS NULL OR u.is_active = $1)
              AND ($2::TEXT IS NULL OR $2 = ANY(u.roles))
              AND ($3::TEXT IS NULL OR u.type_of_staff = $3)
            ORDER BY u.created_at DESC
            "#,
            USER_COLUMNS, USER_SOURCE
        ))
        .bind(filter.is_active)
        .bind(filter.role.map(|role| role.as_str()))
        .bind(filter.type_of_staff.map(|staff| staff.as_str()))
        .fetch_all(&self.pool)
        .await
        .map_err(map_read_error)?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn count(&self) -> Result<i64, UserError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(map_read_error)?;

        Ok(count)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let mut tx = self.pool.begin().await.map_err(map_read_error)?;

        let result = sqlx::query(
            r#"
            UPDATE users
            SET email = $2, password_hash = $3, roles = $4, is_active = $5,
                type_of_staff = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(user.id.0)
        .bind(user.email.as_str())
        .bind(&user.password_hash)
        .bind(user.roles.to_strings())
        .bind(user.is_active)
        .bind(user.type_of_staff.map(|staff| staff.as_str()))
        .bind(user.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_write_error(e, &user.email))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.id.to_string()));
        }

        if let Some(profile) = &user.profile {
            upsert_profile(&mut tx, &user.id, profile)
                .await
                .map_err(map_read_error)?;
        }

        tx.commit().await.map_err(map_read_error)?;

        Ok(user)
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn set_refresh_token_hash(
        &self,
        id: &UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<(), UserError> {
        let result = sqlx::query("UPDATE users SET refresh_token_hash = $2 WHERE id = $1")
            .bind(id.0)
            .bind(refresh_token_hash)
            .execute(&self.pool)
            .await
            .map_err(map_read_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
