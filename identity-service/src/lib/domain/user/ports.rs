use async_trait::async_trait;

use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserFilter;
use crate::domain::user::models::UserId;
use crate::user::errors::UserError;

/// Port for user management operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Create new user with a hashed password.
    ///
    /// # Arguments
    /// * `command` - Validated command containing email, password, roles and activation flag
    ///
    /// # Returns
    /// Created user entity
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Password` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Retrieve user by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// List users matching a filter, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self, filter: &UserFilter) -> Result<Vec<User>, UserError>;

    /// Update existing user with optional fields.
    ///
    /// # Arguments
    /// * `id` - User ID to update
    /// * `command` - Command with optional email, password, roles and activation flag
    ///
    /// # Errors
    /// * `NoFieldsToUpdate` - Command carries no field
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_user(&self, id: &UserId, command: UpdateUserCommand)
        -> Result<User, UserError>;

    /// Delete existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, id: &UserId) -> Result<(), UserError>;
}

/// User directory: persistence operations for the user aggregate.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist new user to storage.
    ///
    /// # Errors
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn create(&self, user: User) -> Result<User, UserError>;

    /// Retrieve user by identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by normalized email address.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<User>, UserError>;

    /// Retrieve users matching a filter, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self, filter: &UserFilter) -> Result<Vec<User>, UserError>;

    /// Number of stored users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count(&self) -> Result<i64, UserError>;

    /// Update profile fields of an existing user.
    ///
    /// Writes email, password hash, roles and activation flag. The stored
    /// refresh-token hash is left untouched.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `EmailAlreadyExists` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;

    /// Replace (`Some`) or clear (`None`) the stored refresh-token hash.
    ///
    /// A single-row write: the previous value is discarded entirely and
    /// concurrent writers resolve as last-writer-wins.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn set_refresh_token_hash(
        &self,
        id: &UserId,
        refresh_token_hash: Option<String>,
    ) -> Result<(), UserError>;
}
