use crate::{
    cryptography::hash_password,
    error::ServiceError,
    form::Form,
    schema::{Id, NewUser, User},
    store::UserStore,
    RESERVED_USERNAMES,
};

pub async fn register_user<S>(form: Form, store: &S) -> Result<User, ServiceError>
where
    S: UserStore + ?Sized,
{
    let mut user = NewUser::try_from(form)?;

    user.username = user.username.trim().to_string();
    if user.username.is_empty() {
        return Err(ServiceError::invalid("username", "Username can't be blank"));
    }
    if RESERVED_USERNAMES
        .iter()
        .any(|reserved| user.username.eq_ignore_ascii_case(reserved))
    {
        return Err(ServiceError::Validation {
            field: "username",
            message: format!("Username '{}' is reserved", user.username),
        });
    }
    if !user.email.contains('@') {
        return Err(ServiceError::invalid("email", "Enter a valid email address"));
    }
    if user.password.is_empty() {
        return Err(ServiceError::invalid("password", "Password can't be blank"));
    }

    user.password = hash_password(&user.password)?;

    let created = store
        .create_user(&user)
        .await
        .inspect_err(|e| log::warn!("Rejected registration of '{}': {e}", user.username))?;

    log::info!("Registered user {} as {}", created.id, created.username);

    Ok(created)
}

pub async fn get_user<S>(id: Id, store: &S) -> Result<User, ServiceError>
where
    S: UserStore + ?Sized,
{
    match store.get_user(id).await? {
        Some(user) => Ok(user),
        None => Err(ServiceError::not_found("No user exists with specified id")),
    }
}
