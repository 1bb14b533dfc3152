use tracing::warn;

use crate::{
    auth::password::verify_password,
    error::AppError,
    users::repo::{User, Users},
};

/// Credential strategy, used only by the login route: exact email lookup, then
/// digest verification. Unknown email and wrong password are indistinguishable
/// to the caller.
pub async fn authenticate(users: &Users, email: &str, password: &str) -> Result<User, AppError> {
    let user = match users.find_by_email(email).await? {
        Some(user) => user,
        None => {
            warn!(email, "login attempt for unknown email");
            return Err(AppError::Unauthorized("invalid credentials"));
        }
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = user.id, "login attempt with wrong password");
        return Err(AppError::Unauthorized("invalid credentials"));
    }

    Ok(user)
}
