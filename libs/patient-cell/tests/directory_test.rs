// libs/patient-cell/tests/directory_test.rs

use std::sync::Arc;

use patient_cell::services::directory::PatientDirectory;
use shared_config::AppConfig;
use shared_database::AppState;
use shared_models::Patient;

fn test_config() -> AppConfig {
    AppConfig {
        doctors: vec!["Dr. Lina".to_string()],
        slot_minutes: 30,
        conflict_grace_minutes: 5,
        bind_host: "127.0.0.1".to_string(),
        bind_port: 0,
    }
}

fn patient(id: &str, short_id: &str, name: &str, phone: &str) -> Patient {
    Patient {
        id: id.to_string(),
        short_id: Some(short_id.to_string()),
        full_name: name.to_string(),
        phone: Some(phone.to_string()),
        notes: None,
        created_at: None,
    }
}

async fn setup() -> (Arc<AppState>, PatientDirectory) {
    let state = Arc::new(AppState::new(test_config()));
    state
        .store
        .insert_patient(patient("p-1", "F-100", "Amal Haddad", "0791234567"))
        .await;
    state
        .store
        .insert_patient(patient("p-2", "F-101", "Basel Haddad", "0785554443"))
        .await;
    state
        .store
        .insert_patient(patient("p-3", "F-200", "Carmen Nasser", "0770001112"))
        .await;
    let directory = PatientDirectory::new(state.clone());
    (state, directory)
}

#[tokio::test]
async fn lookup_by_id() {
    let (_state, directory) = setup().await;
    assert_eq!(directory.get("p-2").await.unwrap().full_name, "Basel Haddad");
    assert!(directory.get("p-404").await.is_none());
}

#[tokio::test]
async fn short_queries_return_nothing() {
    let (_state, directory) = setup().await;
    assert!(directory.search("a").await.is_empty());
    assert!(directory.search("  ").await.is_empty());
}

#[tokio::test]
async fn search_matches_name_short_id_and_phone_case_insensitively() {
    let (_state, directory) = setup().await;

    let by_name = directory.search("haddad").await;
    assert_eq!(by_name.len(), 2);
    // Ordered by name.
    assert_eq!(by_name[0].full_name, "Amal Haddad");

    let by_short_id = directory.search("f-200").await;
    assert_eq!(by_short_id.len(), 1);
    assert_eq!(by_short_id[0].full_name, "Carmen Nasser");

    let by_phone = directory.search("078555").await;
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].id, "p-2");
}

#[tokio::test]
async fn search_results_are_capped() {
    let (state, directory) = setup().await;
    for i in 0..15 {
        state
            .store
            .insert_patient(patient(
                &format!("bulk-{}", i),
                &format!("B-{:03}", i),
                &format!("Bulk Patient {:02}", i),
                "0790000000",
            ))
            .await;
    }

    let hits = directory.search("bulk patient").await;
    assert_eq!(hits.len(), 10);
}
