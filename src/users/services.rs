use tracing::{info, instrument, warn};

use crate::{
    actions::{present, ActionError, ActionResult, Envelope},
    store::RecordStore,
    users::{
        dto::{LoginRequest, RegisterRequest, ResetPasswordRequest},
        password::{digest_password, verify_password},
        repo_types::User,
    },
};

const RESET_NOTICE: &str = "If your email is registered, you will receive reset instructions";

#[instrument(skip(store, req))]
pub async fn register(store: &dyn RecordStore, req: RegisterRequest) -> ActionResult {
    let (Some(name), Some(email), Some(password)) = (
        present(&req.name),
        present(&req.email),
        present(&req.password),
    ) else {
        return Err(ActionError::Validation(
            "Name, email, and password are required",
        ));
    };

    if User::find_by_email(store, email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(ActionError::Conflict("Email is already registered"));
    }

    let user = User::create(store, name, email, &digest_password(password)).await?;

    info!(user_id = %user.id, email = %user.email, "user registered");
    Ok(Envelope::with_message("User registered successfully"))
}

#[instrument(skip(store, req))]
pub async fn login(store: &dyn RecordStore, req: LoginRequest) -> ActionResult {
    let (Some(email), Some(password)) = (present(&req.email), present(&req.password)) else {
        return Err(ActionError::Validation("Email and password are required"));
    };

    let Some(user) = User::find_by_email(store, email).await? else {
        warn!(%email, "login unknown email");
        return Err(ActionError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_digest) {
        warn!(%email, user_id = %user.id, "login invalid password");
        return Err(ActionError::InvalidCredentials);
    }

    info!(user_id = %user.id, email = %user.email, "user logged in");
    Ok(Envelope::ok().user(user.into()))
}

/// Answers identically whether or not the email is registered.
#[instrument(skip(store, req))]
pub async fn reset_password(store: &dyn RecordStore, req: ResetPasswordRequest) -> ActionResult {
    let Some(email) = present(&req.email) else {
        return Err(ActionError::Validation("Email is required"));
    };

    let known = User::find_by_email(store, email).await?.is_some();
    // nothing is sent; the answer is the same either way
    info!(known, "password reset requested");

    Ok(Envelope::with_message(RESET_NOTICE))
}
