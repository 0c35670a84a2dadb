use std::path::PathBuf;

use chrono::Utc;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    DEFAULT_AVATAR, DepartmentInput, Engine, EngineError, IdentityHook, IdentityInput,
    MediaStore, PhoneRegion, ProfileInput, ProfileQuery, StatusInput,
};
use migration::MigratorTrait;
use uuid::Uuid;

async fn connect() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
}

async fn engine_with_db() -> Engine {
    Engine::builder()
        .database(connect().await)
        .phone_region("RU".parse::<PhoneRegion>().unwrap())
        .default_status(Some("ACTIVE"))
        .build()
        .await
        .unwrap()
}

fn media_root() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_media")
        .join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&root).unwrap();
    root
}

#[tokio::test]
async fn creating_identity_creates_one_empty_profile() {
    let engine = engine_with_db().await;

    let user = engine
        .create_identity(&IdentityInput::new("alice"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    assert_eq!(profile.user_id, user.id);
    assert_eq!(profile.avatar, DEFAULT_AVATAR);
    assert_eq!(profile.last_name, None);
    assert_eq!(profile.status_id, None);
    assert_eq!(profile.full_name(), "  ");

    let page = engine.list_profiles(&ProfileQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn new_profile_gets_default_status_when_it_exists() {
    let engine = engine_with_db().await;
    let active = engine
        .create_status(&StatusInput::new("ACTIVE", "Active", None))
        .await
        .unwrap();
    assert_eq!(active.label(), "Active");
    assert_eq!(active.to_string(), "Active");
    assert_eq!(engine.status_by_code(" ACTIVE ").await.unwrap(), active);
    assert!(matches!(
        engine.status_by_code("RETIRED").await,
        Err(EngineError::KeyNotFound(_))
    ));

    let user = engine
        .create_identity(&IdentityInput::new("bob"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();
    assert_eq!(profile.status_id, Some(active.id));
}

#[tokio::test]
async fn updating_identity_resaves_profile() {
    let engine = engine_with_db().await;
    let user = engine
        .create_identity(&IdentityInput::new("carol"))
        .await
        .unwrap();
    let before = engine.profile_by_user(user.id).await.unwrap();

    let mut input = IdentityInput::new("carol.b");
    input.email = Some("carol@example.com".to_string());
    let updated = engine.update_identity(user.id, &input).await.unwrap();
    assert_eq!(updated.username, "carol.b");

    let after = engine.profile_by_user(user.id).await.unwrap();
    assert_eq!(after.id, before.id);
    assert!(after.updated_time >= before.updated_time);
    assert_eq!(after.created_time, before.created_time);
}

#[tokio::test]
async fn deleting_identity_removes_profile() {
    let engine = engine_with_db().await;
    let user = engine
        .create_identity(&IdentityInput::new("dave"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    engine.delete_identity(user.id).await.unwrap();

    assert!(matches!(
        engine.profile(profile.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.identity(user.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn failing_hook_rolls_back_identity() {
    // A second profile for the same identity violates the unique owner.
    let engine = Engine::builder()
        .database(connect().await)
        .hooks(vec![IdentityHook::CreateProfile, IdentityHook::CreateProfile])
        .build()
        .await
        .unwrap();

    let err = engine
        .create_identity(&IdentityInput::new("erin"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert!(matches!(
        engine.identity_by_username("erin").await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn identity_without_hooks_has_no_profile() {
    let engine = Engine::builder()
        .database(connect().await)
        .hooks(Vec::new())
        .build()
        .await
        .unwrap();
    let user = engine
        .create_identity(&IdentityInput::new("frank"))
        .await
        .unwrap();
    assert!(matches!(
        engine.profile_by_user(user.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    engine
        .update_identity(user.id, &IdentityInput::new("frank"))
        .await
        .unwrap();
}

#[tokio::test]
async fn duplicate_username_is_a_field_error() {
    let engine = engine_with_db().await;
    engine
        .create_identity(&IdentityInput::new("grace"))
        .await
        .unwrap();
    let err = engine
        .create_identity(&IdentityInput::new("grace"))
        .await
        .unwrap_err();
    assert!(err.field_errors("username").is_some());
}

#[tokio::test]
async fn status_code_longer_than_fifty_is_rejected() {
    let engine = engine_with_db().await;
    let code = "X".repeat(51);
    let err = engine
        .create_status(&StatusInput::new(&code, "Too long", None))
        .await
        .unwrap_err();
    assert!(err.field_errors("status").is_some());
    assert!(engine.list_statuses(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn duplicate_status_code_is_a_field_error() {
    let engine = engine_with_db().await;
    engine
        .create_status(&StatusInput::new("ACTIVE", "Active", None))
        .await
        .unwrap();
    let err = engine
        .create_status(&StatusInput::new("ACTIVE", "Still active", None))
        .await
        .unwrap_err();
    assert_eq!(
        err.field_errors("status").unwrap(),
        ["User status with this Status already exists."]
    );
}

#[tokio::test]
async fn deleting_status_clears_profile_reference() {
    let engine = engine_with_db().await;
    let status = engine
        .create_status(&StatusInput::new("ACTIVE", "Active", None))
        .await
        .unwrap();
    let user = engine
        .create_identity(&IdentityInput::new("heidi"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();
    assert_eq!(profile.status_id, Some(status.id));

    engine.delete_status(status.id).await.unwrap();

    let profile = engine.profile(profile.id).await.unwrap();
    assert_eq!(profile.status_id, None);
}

#[tokio::test]
async fn deleting_department_clears_profile_reference() {
    let engine = engine_with_db().await;
    let department = engine
        .create_department(&DepartmentInput::titled("Accounting"))
        .await
        .unwrap();
    let user = engine
        .create_identity(&IdentityInput::new("ivan"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();
    engine
        .inline_update_profile(profile.id, None, Some(department.id))
        .await
        .unwrap();

    engine.delete_department(department.id).await.unwrap();

    let profile = engine.profile(profile.id).await.unwrap();
    assert_eq!(profile.department_id, None);
    assert!(matches!(
        engine.department(department.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn inline_update_rejects_unknown_references() {
    let engine = engine_with_db().await;
    let user = engine
        .create_identity(&IdentityInput::new("judy"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    let err = engine
        .inline_update_profile(profile.id, Some(999), Some(998))
        .await
        .unwrap_err();
    assert!(err.field_errors("status").is_some());
    assert!(err.field_errors("department").is_some());

    let err = engine
        .inline_update_profile(Uuid::new_v4(), None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn profile_edit_normalizes_phones() {
    let engine = engine_with_db().await;
    let user = engine
        .create_identity(&IdentityInput::new("kate"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    let input = ProfileInput {
        last_name: Some("Ivanova".to_string()),
        first_name: Some("Ekaterina".to_string()),
        middle_name: Some("Petrovna".to_string()),
        mobile_phone: Some("8 (916) 123-45-67".to_string()),
        post: Some("Accountant".to_string()),
        ..Default::default()
    };
    let updated = engine.update_profile(profile.id, &input).await.unwrap();
    assert_eq!(updated.mobile_phone.as_deref(), Some("+79161234567"));
    assert_eq!(updated.abbreviation(), "Ivanova E.P.");
    assert_eq!(updated.short_name(), "Ivanova Ekaterina");
    assert_eq!(updated.user_id, user.id);

    let bad = ProfileInput {
        phone: Some("not a phone".to_string()),
        ..input
    };
    let err = engine.update_profile(profile.id, &bad).await.unwrap_err();
    assert!(err.field_errors("phone").is_some());
}

#[tokio::test]
async fn profile_list_filters_searches_and_pages() {
    let engine = engine_with_db().await;
    let sales = engine
        .create_department(&DepartmentInput::titled("Sales"))
        .await
        .unwrap();

    for (username, last, first) in [
        ("u1", "Петров", "Иван"),
        ("u2", "Smith", "Anna"),
        ("u3", "Adams", "Zoe"),
    ] {
        let user = engine
            .create_identity(&IdentityInput::new(username))
            .await
            .unwrap();
        let profile = engine.profile_by_user(user.id).await.unwrap();
        let input = ProfileInput {
            last_name: Some(last.to_string()),
            first_name: Some(first.to_string()),
            department_id: (username != "u3").then_some(sales.id),
            ..Default::default()
        };
        engine.update_profile(profile.id, &input).await.unwrap();
    }

    let all = engine.list_profiles(&ProfileQuery::default()).await.unwrap();
    let names: Vec<_> = all
        .items
        .iter()
        .map(|item| item.profile.last_name.clone().unwrap())
        .collect();
    assert_eq!(names, ["Adams", "Smith", "Петров"]);

    let found = engine
        .list_profiles(&ProfileQuery {
            search: Some("петров".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.total, 1);
    assert_eq!(found.items[0].username, "u1");

    let in_sales = engine
        .list_profiles(&ProfileQuery {
            department_id: Some(sales.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(in_sales.total, 2);

    let second = engine
        .list_profiles(&ProfileQuery {
            page: 2,
            per_page: 2,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(second.total, 3);
    assert_eq!(second.pages(), 2);
    assert_eq!(second.items.len(), 1);
}

#[tokio::test]
async fn avatar_upload_replaces_previous_file() {
    let engine = engine_with_db().await;
    let media = MediaStore::new(media_root());
    let user = engine
        .create_identity(&IdentityInput::new("liam"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    let first = engine
        .set_profile_avatar(profile.id, "me.png", b"first", &media)
        .await
        .unwrap();
    assert!(first.avatar.starts_with("users/liam/avatars/"));
    assert!(first.avatar.ends_with(".png"));
    let first_path = media.resolve(&first.avatar).unwrap();
    assert_eq!(std::fs::read(&first_path).unwrap(), b"first");

    let second = engine
        .set_profile_avatar(profile.id, "me.jpg", b"second", &media)
        .await
        .unwrap();
    assert_ne!(second.avatar, first.avatar);
    assert!(!first_path.exists());

    let err = engine
        .set_profile_avatar(profile.id, "notes.txt", b"text", &media)
        .await
        .unwrap_err();
    assert!(err.field_errors("avatar").is_some());

    std::fs::remove_dir_all(media.root()).unwrap();
}

#[tokio::test]
async fn same_identity_and_last_name_cannot_repeat() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let user = engine
        .create_identity(&IdentityInput::new("nina"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();
    let input = ProfileInput {
        last_name: Some("Orlova".to_string()),
        ..Default::default()
    };
    engine.update_profile(profile.id, &input).await.unwrap();

    let backend = db.get_database_backend();
    let index = db
        .query_one(Statement::from_string(
            backend,
            "SELECT sql FROM sqlite_master \
             WHERE name = 'idx-user_profile-user_id-last_name-unique'",
        ))
        .await
        .unwrap()
        .unwrap();
    let sql: String = index.try_get("", "sql").unwrap();
    assert!(sql.contains("UNIQUE"));

    let now = Utc::now();
    let err = db
        .execute(Statement::from_sql_and_values(
            backend,
            "INSERT INTO user_profile (id, user_id, avatar, last_name, created_time, updated_time) \
             VALUES (?, ?, ?, ?, ?, ?)",
            vec![
                Uuid::new_v4().into(),
                user.id.into(),
                DEFAULT_AVATAR.into(),
                "Orlova".into(),
                now.into(),
                now.into(),
            ],
        ))
        .await
        .unwrap_err();
    assert!(matches!(EngineError::from(err), EngineError::Database(_)));

    let page = engine.list_profiles(&ProfileQuery::default()).await.unwrap();
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn dot_only_username_is_rejected_and_dotted_one_gets_avatar() {
    let engine = engine_with_db().await;
    let err = engine
        .create_identity(&IdentityInput::new(".."))
        .await
        .unwrap_err();
    assert!(err.field_errors("username").is_some());

    let media = MediaStore::new(media_root());
    let user = engine
        .create_identity(&IdentityInput::new("o.petrov"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();
    let updated = engine
        .set_profile_avatar(profile.id, "me.png", b"x", &media)
        .await
        .unwrap();
    assert!(updated.avatar.starts_with("users/o.petrov/avatars/"));

    std::fs::remove_dir_all(media.root()).unwrap();
}

#[tokio::test]
async fn failed_avatar_update_leaves_no_file_behind() {
    let db = connect().await;
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    let media = MediaStore::new(media_root());
    let user = engine
        .create_identity(&IdentityInput::new("pavel"))
        .await
        .unwrap();
    let profile = engine.profile_by_user(user.id).await.unwrap();

    db.execute(Statement::from_string(
        db.get_database_backend(),
        "CREATE TRIGGER avatar_locked BEFORE UPDATE OF avatar ON user_profile \
         BEGIN SELECT RAISE(ABORT, 'avatar locked'); END",
    ))
    .await
    .unwrap();

    let err = engine
        .set_profile_avatar(profile.id, "me.png", b"x", &media)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));

    let avatars = media.root().join("users/pavel/avatars");
    let leftover = std::fs::read_dir(&avatars)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftover, 0);
    assert_eq!(
        engine.profile(profile.id).await.unwrap().avatar,
        DEFAULT_AVATAR
    );

    std::fs::remove_dir_all(media.root()).unwrap();
}
