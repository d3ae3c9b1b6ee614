use carval::db::{RoleUpdateOptions, Store, UserDirectoryError};
use carval::models::{EstimateQuery, NewReport, UserRole};

async fn spawn_store() -> Store {
    Store::new("sqlite::memory:")
        .await
        .expect("Failed to create store")
}

fn report(price: i32, year: i32, lat: i32, lon: i32, mileage: i32) -> NewReport {
    NewReport {
        price,
        make: "toyota".to_string(),
        model: "corolla".to_string(),
        year,
        lat,
        lon,
        mileage,
    }
}

#[tokio::test]
async fn test_user_crud_roundtrip() {
    let store = spawn_store().await;

    let user = store
        .create_user("alice@example.com", "salt.deadbeef")
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::User);

    let found = store.find_user_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(found.email, "alice@example.com");

    let by_email = store
        .find_users_by_email("alice@example.com")
        .await
        .unwrap();
    assert_eq!(by_email.len(), 1);
    assert_eq!(by_email[0].id, user.id);

    let removed = store.remove_user(user.id).await.unwrap();
    assert_eq!(removed.id, user.id);
    assert_eq!(removed.email, "alice@example.com");

    assert!(store.find_user_by_id(user.id).await.unwrap().is_none());
    assert!(matches!(
        store.remove_user(user.id).await,
        Err(UserDirectoryError::NotFound)
    ));
}

#[tokio::test]
async fn test_duplicate_emails_all_returned() {
    let store = spawn_store().await;

    store.create_user("dup@example.com", "h1").await.unwrap();
    store.create_user("dup@example.com", "h2").await.unwrap();

    let users = store.find_users_by_email("dup@example.com").await.unwrap();
    assert_eq!(users.len(), 2);
}

#[tokio::test]
async fn test_find_by_id_zero_is_none() {
    let store = spawn_store().await;
    assert!(store.find_user_by_id(0).await.unwrap().is_none());
}

#[tokio::test]
async fn test_role_transitions() {
    let store = spawn_store().await;
    let user = store.create_user("bob@example.com", "h").await.unwrap();

    let user = store
        .update_user_role(user.id, UserRole::Admin, None)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Admin);

    // Same-role call is a no-op that still returns the row.
    let user = store
        .update_user_role(user.id, UserRole::Admin, None)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Admin);

    let user = store
        .update_user_role(user.id, UserRole::User, None)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::User);
}

#[tokio::test]
async fn test_super_admin_requires_system_promotion() {
    let store = spawn_store().await;
    let user = store.create_user("root@example.com", "h").await.unwrap();

    let err = store
        .update_user_role(user.id, UserRole::SuperAdmin, None)
        .await
        .unwrap_err();
    assert!(matches!(err, UserDirectoryError::Forbidden(_)));

    // Flag unset: still rejected even with matching actor.
    let err = store
        .update_user_role(
            user.id,
            UserRole::SuperAdmin,
            Some(RoleUpdateOptions {
                actor_email: "root@example.com".to_string(),
                allow_system_promotion: false,
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserDirectoryError::Forbidden(_)));

    // Actor mismatch: rejected.
    let err = store
        .update_user_role(
            user.id,
            UserRole::SuperAdmin,
            Some(RoleUpdateOptions {
                actor_email: "someone-else@example.com".to_string(),
                allow_system_promotion: true,
            }),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, UserDirectoryError::Forbidden(_)));

    // Self-promotion with the flag set goes through.
    let user = store
        .update_user_role(
            user.id,
            UserRole::SuperAdmin,
            Some(RoleUpdateOptions {
                actor_email: "root@example.com".to_string(),
                allow_system_promotion: true,
            }),
        )
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::SuperAdmin);

    // Repeated promotion is the same-role no-op, no options needed.
    let user = store
        .update_user_role(user.id, UserRole::SuperAdmin, None)
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::SuperAdmin);
}

#[tokio::test]
async fn test_reports_start_unapproved() {
    let store = spawn_store().await;
    let user = store.create_user("seller@example.com", "h").await.unwrap();

    let created = store
        .create_report(&report(15_000, 2018, 10, 20, 40_000), user.id)
        .await
        .unwrap();
    assert!(!created.approved);
    assert_eq!(created.user_id, user.id);

    let approved = store
        .change_report_approval(created.id, true)
        .await
        .unwrap();
    assert!(approved.approved);
}

#[tokio::test]
async fn test_approval_of_missing_report() {
    let store = spawn_store().await;
    assert!(matches!(
        store.change_report_approval(42, true).await,
        Err(carval::db::ReportStoreError::NotFound)
    ));
}

#[tokio::test]
async fn test_estimate_none_without_matches() {
    let store = spawn_store().await;

    let query = EstimateQuery {
        make: "toyota".to_string(),
        model: "corolla".to_string(),
        year: 2018,
        lat: 10,
        lon: 20,
        mileage: 40_000,
    };
    assert!(store.estimate_price(&query).await.unwrap().is_none());
}

#[tokio::test]
async fn test_estimate_ignores_unapproved_and_out_of_band() {
    let store = spawn_store().await;
    let user = store.create_user("seller@example.com", "h").await.unwrap();

    // Unapproved.
    store
        .create_report(&report(10_000, 2018, 10, 20, 40_000), user.id)
        .await
        .unwrap();

    // Approved but outside every tolerance band in turn.
    for fields in [
        report(99_000, 2018, 16, 20, 40_000), // lat off by 6
        report(99_000, 2018, 10, 26, 40_000), // lon off by 6
        report(99_000, 2022, 10, 20, 40_000), // year off by 4
    ] {
        let r = store.create_report(&fields, user.id).await.unwrap();
        store.change_report_approval(r.id, true).await.unwrap();
    }

    // One approved in-band report.
    let good = store
        .create_report(&report(12_000, 2019, 12, 22, 45_000), user.id)
        .await
        .unwrap();
    store.change_report_approval(good.id, true).await.unwrap();

    let query = EstimateQuery {
        make: "toyota".to_string(),
        model: "corolla".to_string(),
        year: 2018,
        lat: 10,
        lon: 20,
        mileage: 40_000,
    };
    let price = store.estimate_price(&query).await.unwrap();
    assert_eq!(price, Some(12_000.0));
}

#[tokio::test]
async fn test_estimate_caps_sample_at_three_by_mileage_distance() {
    let store = spawn_store().await;
    let user = store.create_user("seller@example.com", "h").await.unwrap();

    // Mileage distances from the queried 4_000: A=3000, B=1000, C=5000,
    // D=1000. The three farthest (C, A, then B or D) win the slots.
    for fields in [
        report(1_000, 2018, 10, 20, 1_000), // A
        report(2_000, 2018, 10, 20, 5_000), // B
        report(4_000, 2018, 10, 20, 9_000), // C
        report(8_000, 2018, 10, 20, 3_000), // D
    ] {
        let r = store.create_report(&fields, user.id).await.unwrap();
        store.change_report_approval(r.id, true).await.unwrap();
    }

    let query = EstimateQuery {
        make: "toyota".to_string(),
        model: "corolla".to_string(),
        year: 2018,
        lat: 10,
        lon: 20,
        mileage: 4_000,
    };
    let price = store.estimate_price(&query).await.unwrap().unwrap();

    // C and A are always in; the tied third slot is B or D, so the average
    // lands on one of the two.
    let with_b = (4_000.0 + 1_000.0 + 2_000.0) / 3.0;
    let with_d = (4_000.0 + 1_000.0 + 8_000.0) / 3.0;
    assert!(
        (price - with_b).abs() < f64::EPSILON || (price - with_d).abs() < f64::EPSILON,
        "unexpected estimate {price}"
    );
}

#[tokio::test]
async fn test_estimate_make_model_exact_match() {
    let store = spawn_store().await;
    let user = store.create_user("seller@example.com", "h").await.unwrap();

    let mut fields = report(30_000, 2018, 10, 20, 40_000);
    fields.model = "camry".to_string();
    let r = store.create_report(&fields, user.id).await.unwrap();
    store.change_report_approval(r.id, true).await.unwrap();

    let query = EstimateQuery {
        make: "toyota".to_string(),
        model: "corolla".to_string(),
        year: 2018,
        lat: 10,
        lon: 20,
        mileage: 40_000,
    };
    assert!(store.estimate_price(&query).await.unwrap().is_none());
}
