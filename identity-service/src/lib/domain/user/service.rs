use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::domain::user::profile::generate_employee_number;
use crate::user::errors::PasswordError;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user management.
///
/// Concrete implementation of UserServicePort with dependency injection.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    password_hasher: auth::PasswordHasher,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `password_hasher` - Hasher used for new and changed passwords
    pub fn new(repository: Arc<UR>, password_hasher: auth::PasswordHasher) -> Self {
        Self {
            repository,
            password_hasher,
        }
    }

    /// Create the first account when the directory is still empty.
    ///
    /// # Returns
    /// The created user, or None when users already exist
    ///
    /// # Errors
    /// Same as `create_user`
    pub async fn bootstrap_admin(
        &self,
        command: CreateUserCommand,
    ) -> Result<Option<User>, UserError> {
        let existing = self.repository.count().await?;
        if existing > 0 {
            tracing::info!(existing, "Users already exist, skipping admin bootstrap");
            return Ok(None);
        }

        let user = self.create_user(command).await?;
        tracing::info!(
            user_id = %user.id,
            email = %user.email,
            roles = ?user.roles.to_strings(),
            "Bootstrap admin created"
        );
        tracing::warn!("Disable bootstrap and rotate the bootstrap password");

        Ok(Some(user))
    }

    fn hash_password(&self, password: &str) -> Result<String, UserError> {
        self.password_hasher
            .hash(password)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()).into())
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        if self
            .repository
            .find_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(UserError::EmailAlreadyExists(command.email.to_string()));
        }

        let password_hash = self.hash_password(command.password.as_str())?;
        let now = Utc::now();

        let profile = command.profile.map(|fields| {
            let employee_number = generate_employee_number(fields.first_name(), now);
            fields.into_profile(Some(employee_number), now)
        });

        let user = User {
            id: UserId::new(),
            email: command.email,
            password_hash,
            refresh_token_hash: None,
            roles: command.roles,
            is_active: command.is_active,
            type_of_staff: command.type_of_staff,
            profile,
            created_at: now,
            updated_at: now,
        };

        let created_user = self.repository.create(user).await?;
        tracing::info!(user_id = %created_user.id, "User created");

        Ok(created_user)
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }

    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, UserError> {
        self.repository.list(filter).await
    }

    async fn update_user(
        &self,
        id: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        if command.is_empty() {
            return Err(UserError::NoFieldsToUpdate);
        }

        let mut user = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))?;

        if let Some(new_email) = command.email {
            if new_email != user.email {
                if let Some(owner) = self.repository.find_by_email(&new_email).await? {
                    if owner.id != user.id {
                        return Err(UserError::EmailAlreadyExists(new_email.to_string()));
                    }
                }
                user.email = new_email;
            }
        }

        if let Some(new_password) = command.password {
            user.password_hash = self.hash_password(new_password.as_str())?;
        }

        if let Some(roles) = command.roles {
            user.roles = roles;
        }

        if let Some(is_active) = command.is_active {
            user.is_active = is_active;
        }

        if let Some(type_of_staff) = command.type_of_staff {
            user.type_of_staff = type_of_staff;
        }

        let now = Utc::now();

        if let Some(fields) = command.profile.filter(|fields| !fields.is_empty()) {
            match user.profile.as_mut() {
                Some(profile) => fields.apply_to(profile, now),
                None => {
                    let employee_number = fields
                        .first_name()
                        .map(|first_name| generate_employee_number(Some(first_name), now));
                    user.profile = Some(fields.into_profile(employee_number, now));
                }
            }
        }

        user.updated_at = now;

        let updated_user = self.repository.update(user).await?;
        tracing::info!(user_id = %updated_user.id, "User updated");

        Ok(updated_user)
    }

    async fn delete_user(&self, id: &UserId) -> Result<(), UserError> {
        self.repository.delete(id).await?;
        tracing::info!(user_id = %id, "User deleted");

        Ok(())
    }
}
