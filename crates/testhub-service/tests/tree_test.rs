//! Integration tests for folder trees and breadcrumbs.

mod helpers;

use testhub_service::folder::{DeleteOptions, FolderError, TreeQuery};
use uuid::Uuid;

use helpers::TestHub;

#[tokio::test]
async fn test_tree_nests_children_with_counts() {
    let hub = TestHub::new();
    let web = hub.folder(None, "Web").await;
    let mobile = hub.folder(None, "Mobile").await;
    let login = hub.folder(Some(&web), "Login").await;
    hub.folder(Some(&login), "SSO").await;
    hub.testcase(&web, "home page").await;
    hub.testcase(&login, "wrong password").await;
    hub.testcase(&login, "locked account").await;

    let tree = hub
        .service
        .get_folder_tree(hub.project_id, TreeQuery::default())
        .await
        .unwrap();

    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0].id, web.id);
    assert_eq!(tree[1].id, mobile.id);
    assert_eq!(tree[0].testcase_count, 1);
    assert_eq!(tree[0].child_count, 1);
    assert_eq!(tree[0].children[0].testcase_count, 2);
    assert_eq!(tree[0].children[0].children[0].name, "SSO");
    assert!(tree[1].children.is_empty());
    assert_eq!(tree.iter().map(|n| n.node_count()).sum::<u64>(), 4);
}

#[tokio::test]
async fn test_tree_depth_bound() {
    let hub = TestHub::new();
    hub.chain("deep", 4).await;

    let roots = hub
        .service
        .get_folder_tree(
            hub.project_id,
            TreeQuery {
                depth: Some(0),
                ..TreeQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(roots.len(), 1);
    assert!(roots[0].children.is_empty());

    let two = hub
        .service
        .get_folder_tree(
            hub.project_id,
            TreeQuery {
                depth: Some(1),
                ..TreeQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(two[0].node_count(), 2);
}

#[tokio::test]
async fn test_tree_hides_archived_unless_requested() {
    let hub = TestHub::new();
    let kept = hub.folder(None, "Kept").await;
    let gone = hub.folder(None, "Gone").await;
    hub.folder(Some(&gone), "Gone child").await;
    hub.service
        .delete_folder(&hub.ctx, gone.id, DeleteOptions::soft())
        .await
        .unwrap();

    let tree = hub
        .service
        .get_folder_tree(hub.project_id, TreeQuery::default())
        .await
        .unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id, kept.id);

    let all = hub
        .service
        .get_folder_tree(
            hub.project_id,
            TreeQuery {
                include_archived: true,
                ..TreeQuery::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(all.len(), 2);
    assert!(all[1].is_archived);
    assert_eq!(all[1].children.len(), 1);
}

#[tokio::test]
async fn test_tree_is_scoped_to_project() {
    let hub = TestHub::new();
    hub.folder(None, "Mine").await;

    let tree = hub
        .service
        .get_folder_tree(Uuid::new_v4(), TreeQuery::default())
        .await
        .unwrap();
    assert!(tree.is_empty());
}

#[tokio::test]
async fn test_breadcrumbs_root_first() {
    let hub = TestHub::new();
    let chain = hub.chain("crumb", 3).await;

    let crumbs = hub.service.get_breadcrumbs(chain[2].id).await.unwrap();
    let names: Vec<&str> = crumbs.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, ["crumb-0", "crumb-1", "crumb-2"]);

    let err = hub
        .service
        .get_breadcrumbs(Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, FolderError::FolderNotFound(_)));
}
