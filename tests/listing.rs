// ABOUTME: Tests for paginated listings driven through the control-plane trait.
// ABOUTME: Checks token threading, partial results on error, and nested revision streams.

mod support;

use ecs_deploy::plane::pagination;
use ecs_deploy::types::ClusterName;
use futures::StreamExt;
use support::*;

fn arns(names: &[&str]) -> Vec<String> {
    names
        .iter()
        .map(|n| format!("{ACCOUNT_PREFIX}:service/prod/{n}"))
        .collect()
}

#[tokio::test]
async fn services_follow_continuation_tokens() {
    let plane = FakePlane::new()
        .with_service_pages(vec![arns(&["api", "web"]), arns(&["worker"])]);

    let mut pages = pagination::services(&plane, ClusterName::new("prod"));
    let mut all = Vec::new();
    while let Some(page) = pages.next_page().await {
        all.extend(page.unwrap());
    }

    assert_eq!(all, arns(&["api", "web", "worker"]));
    assert!(!pages.has_more());
    assert_eq!(
        plane.calls(),
        vec![Call::ListServices(None), Call::ListServices(Some("1".to_string()))]
    );
}

#[tokio::test]
async fn failed_page_keeps_what_came_before() {
    let plane = FakePlane::new()
        .with_service_pages(vec![arns(&["api"]), arns(&["worker"])])
        .with_service_page_error(1, transport_error("ListServices"));

    let mut pages = pagination::services(&plane, ClusterName::new("prod"));
    let mut collected = Vec::new();
    let error = loop {
        match pages.next_page().await {
            Some(Ok(items)) => collected.extend(items),
            Some(Err(e)) => break e,
            None => panic!("expected a failed page"),
        }
    };

    assert_eq!(collected, arns(&["api"]));
    assert!(error.is_transient());
    assert!(pages.has_more());

    // The cursor stayed put, so asking again fetches the failed page
    assert_eq!(pages.next_page().await.unwrap().unwrap(), arns(&["worker"]));
    assert!(pages.next_page().await.is_none());
}

#[tokio::test]
async fn restart_fetches_first_page_again() {
    let plane = FakePlane::new().with_service_pages(vec![arns(&["api"]), arns(&["web"])]);

    let mut pages = pagination::services(&plane, ClusterName::new("prod"));
    assert_eq!(pages.next_page().await.unwrap().unwrap(), arns(&["api"]));
    assert_eq!(pages.next_page().await.unwrap().unwrap(), arns(&["web"]));
    assert!(!pages.has_more());
    pages.restart();

    assert!(pages.has_more());
    assert_eq!(pages.next_page().await.unwrap().unwrap(), arns(&["api"]));
}

#[tokio::test]
async fn families_then_revisions() {
    let plane = FakePlane::new();

    let mut families = pagination::families(&plane);
    let family_names = families.next_page().await.unwrap().unwrap();
    assert_eq!(family_names, vec!["web".to_string()]);
    assert!(families.next_page().await.is_none());

    let revisions: Vec<_> = pagination::revisions(&plane, "web")
        .into_stream()
        .collect()
        .await;
    assert_eq!(revisions.len(), 1);
    assert_eq!(
        revisions[0].as_ref().unwrap(),
        &vec![task_definition_arn("web", 7).to_string()]
    );
}
