//! Tests for the user identity model.

use super::*;
use chrono::TimeZone;
use rstest::rstest;
use serde_json::json;

fn sample_user() -> User {
    User {
        id: UserId::new(42),
        username: "ada".to_owned(),
        email: "ada@example.com".to_owned(),
        password: PasswordHash::from_encoded("$argon2id$v=19$stub"),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().expect("valid date"),
        is_active: true,
        role_id: 1,
        role: Role {
            id: 1,
            name: DEFAULT_ROLE_NAME.to_owned(),
            description: "regular member".to_owned(),
            level: 1,
        },
    }
}

#[rstest]
#[case(1, true)]
#[case(0, false)]
#[case(-7, false)]
fn assigned_ids_are_positive(#[case] raw: i64, #[case] expected: bool) {
    assert_eq!(UserId::new(raw).is_assigned(), expected);
}

#[rstest]
fn serialisation_omits_password_hash() {
    let value = serde_json::to_value(sample_user()).expect("serialise user");
    assert!(value.get("password").is_none());
    assert_eq!(value["id"], json!(42));
    assert_eq!(value["isActive"], json!(true));
    assert_eq!(value["role"]["name"], json!("user"));
}

#[rstest]
fn decoded_user_carries_empty_hash() {
    let bytes = serde_json::to_vec(&sample_user()).expect("serialise user");
    let decoded: User = serde_json::from_slice(&bytes).expect("decode user");
    assert!(decoded.password.is_empty());
    assert_eq!(
        User {
            password: PasswordHash::default(),
            ..sample_user()
        },
        decoded
    );
}

#[rstest]
fn zero_user_has_unassigned_id() {
    let user = User::default();
    assert!(!user.id.is_assigned());
    assert!(user.username.is_empty());
    assert_eq!(user.created_at.timestamp(), 0);
}

#[rstest]
fn password_hash_verifies_only_the_original_secret() {
    let hash = PasswordHash::from_plaintext("correct horse").expect("hash password");
    assert!(hash.as_str().starts_with("$argon2"));
    assert!(hash.verify("correct horse"));
    assert!(!hash.verify("battery staple"));
}

#[rstest]
fn empty_hash_verifies_nothing() {
    assert!(!PasswordHash::default().verify(""));
}

#[rstest]
fn debug_output_redacts_hash() {
    let hash = PasswordHash::from_encoded("$argon2id$secret");
    assert_eq!(format!("{hash:?}"), "PasswordHash(<redacted>)");
}
