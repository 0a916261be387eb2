//! Service tests for scan import and component membership.

mod helpers;

use chrono::Duration;

use helpers::TestApp;
use scantrack_core::error::ErrorKind;
use scantrack_core::types::{ComponentUuid, ProjectUuid, ScanUuid};
use scantrack_entity::scan::{ImportScan, ScanDocument};

#[tokio::test]
async fn test_import_scan_persists_all_fields() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let request = TestApp::import_request(&project, Vec::new());
    let executed = request.executed.unwrap();
    let imported = request.imported.unwrap();

    let scan = app.scans.import_scan(request).await.unwrap();

    assert!(scan.id() > 0);
    assert_eq!(scan.uuid().to_string().len(), 36);
    assert_eq!(scan.executed(), executed);
    assert_eq!(scan.imported(), imported);
    assert_eq!(scan.project().uuid, project.uuid);
}

#[tokio::test]
async fn test_import_without_imported_uses_now() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let mut request = TestApp::import_request(&project, Vec::new());
    request.imported = None;

    let scan = app.scans.import_scan(request).await.unwrap();
    assert!(scan.imported() > helpers::executed_at());
}

#[tokio::test]
async fn test_import_without_executed_is_rejected() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let request = ImportScan {
        executed: None,
        ..TestApp::import_request(&project, Vec::new())
    };

    let err = app.scans.import_scan(request).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::Validation));
}

#[tokio::test]
async fn test_import_for_unknown_project_is_rejected() {
    let app = TestApp::new();
    let request = ImportScan {
        executed: Some(helpers::executed_at()),
        project: Some(ProjectUuid::new()),
        ..Default::default()
    };

    let err = app.scans.import_scan(request).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_duplicate_uuid_is_rejected() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let uuid = ScanUuid::new();

    let mut first = TestApp::import_request(&project, Vec::new());
    first.uuid = Some(uuid);
    app.scans.import_scan(first).await.unwrap();

    let mut second = TestApp::import_request(&project, Vec::new());
    second.uuid = Some(uuid);
    let err = app.scans.import_scan(second).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::Conflict));
}

#[tokio::test]
async fn test_import_before_execute_is_accepted() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let mut request = TestApp::import_request(&project, Vec::new());
    request.imported = Some(helpers::executed_at() - Duration::hours(1));

    let scan = app.scans.import_scan(request).await.unwrap();
    assert!(scan.imported_before_executed());
}

#[tokio::test]
async fn test_components_read_back_in_identity_order() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let c1 = app.create_component("jackson-core").await;
    let c2 = app.create_component("guava").await;
    let c3 = app.create_component("slf4j-api").await;

    let scan = app
        .scans
        .import_scan(TestApp::import_request(
            &project,
            vec![c1.uuid, c2.uuid, c3.uuid],
        ))
        .await
        .unwrap();

    let loaded = app.scans.get_scan(&scan.uuid()).await.unwrap();
    assert_eq!(loaded.components(), &[c1, c2, c3]);
}

#[tokio::test]
async fn test_membership_changes() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let c1 = app.create_component("a").await;
    let c2 = app.create_component("b").await;
    let scan = app
        .scans
        .import_scan(TestApp::import_request(&project, Vec::new()))
        .await
        .unwrap()
        .uuid();

    let added = app.scans.add_components(&scan, &[c2.uuid, c1.uuid]).await.unwrap();
    assert_eq!(added.components(), &[c1.clone(), c2.clone()]);

    let removed = app.scans.remove_components(&scan, &[c1.uuid]).await.unwrap();
    assert_eq!(removed.components(), &[c2.clone()]);

    let replaced = app.scans.replace_components(&scan, &[c1.uuid]).await.unwrap();
    assert_eq!(replaced.components(), &[c1]);

    let err = app
        .scans
        .add_components(&scan, &[ComponentUuid::new()])
        .await
        .unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));
}

#[tokio::test]
async fn test_list_scans_uses_default_page_size() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    for _ in 0..3 {
        app.scans
            .import_scan(TestApp::import_request(&project, Vec::new()))
            .await
            .unwrap();
    }

    let page = app.scans.list_scans(&project.uuid, None).await.unwrap();
    assert_eq!(page.total_items, 3);
    assert_eq!(page.page_size, 25);
    assert!(!page.has_next);
}

#[tokio::test]
async fn test_export_omits_internal_identity() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let component = app.create_component("netty").await;
    let scan = app
        .scans
        .import_scan(TestApp::import_request(&project, vec![component.uuid]))
        .await
        .unwrap();

    let doc: ScanDocument = app.scans.export_scan(&scan.uuid()).await.unwrap();
    let json = serde_json::to_value(&doc).unwrap();
    let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();

    assert!(!keys.contains(&"id"));
    for key in ["executed", "imported", "project", "components", "uuid"] {
        assert!(keys.contains(&key), "missing {key}");
    }
    assert_eq!(json["components"][0]["uuid"], component.uuid.to_string());
}

#[tokio::test]
async fn test_delete_scan() {
    let app = TestApp::new();
    let project = app.create_project("inventory").await;
    let scan = app
        .scans
        .import_scan(TestApp::import_request(&project, Vec::new()))
        .await
        .unwrap();

    app.scans.delete_scan(&scan.uuid()).await.unwrap();
    let err = app.scans.get_scan(&scan.uuid()).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));
    let err = app.scans.delete_scan(&scan.uuid()).await.unwrap_err();
    assert!(err.is_kind(ErrorKind::NotFound));
}
