use foodgram_sdk::{
    cryptography::verify_password,
    form::Form,
    memory::MemoryStore,
    users::{get_user, register_user},
};
use serde_json::json;

fn form(username: &str, email: &str) -> Form {
    Form::from_json(json!({
        "username": username,
        "email": email,
        "first_name": "Test",
        "password": "hunter22",
    }))
    .unwrap()
}

#[tokio::test]
async fn registration_hashes_password() {
    let store = MemoryStore::new();

    let user = register_user(form("cook", "cook@example.com"), &store)
        .await
        .unwrap();

    assert_eq!(user.username, "cook");
    assert_eq!(user.last_name, "");
    assert_ne!(user.password, "hunter22");
    assert!(verify_password("hunter22", &user.password));
    assert_eq!(get_user(user.id, &store).await.unwrap().email, "cook@example.com");
}

#[tokio::test]
async fn reserved_username_is_rejected() {
    let store = MemoryStore::new();

    for name in ["me", "ME"] {
        let err = register_user(form(name, "me@example.com"), &store)
            .await
            .unwrap_err();
        assert_eq!(err.field(), Some("username"));
    }
}

#[tokio::test]
async fn duplicate_username_or_email_conflicts() {
    let store = MemoryStore::new();
    register_user(form("cook", "cook@example.com"), &store)
        .await
        .unwrap();

    let same_name = register_user(form("cook", "other@example.com"), &store).await;
    let same_email = register_user(form("other", "cook@example.com"), &store).await;

    assert!(same_name.unwrap_err().is_conflict());
    assert!(same_email.unwrap_err().is_conflict());
}

#[tokio::test]
async fn missing_field_is_reported_by_name() {
    let store = MemoryStore::new();
    let form = Form::from_json(json!({ "username": "cook" })).unwrap();

    let err = register_user(form, &store).await.unwrap_err();

    assert_eq!(err.field(), Some("email"));
}
