//! Flow store and usage log integration tests against a file-backed database.

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use arbor_core::entities::FlowNode;
use arbor_core::ids::NodeId;
use arbor_db::repos::usage::NewUsage;
use arbor_db::retry::RetryConfig;
use arbor_db::service::ArborService;

fn id(raw: &str) -> NodeId {
    NodeId::parse(raw).unwrap()
}

fn node(raw_id: &str, question: &str, options: &[(&str, &str)]) -> FlowNode {
    FlowNode {
        topic: "Engine".to_string(),
        id: id(raw_id),
        question: question.to_string(),
        options: options.iter().map(|(l, d)| (*l, id(d))).collect(),
    }
}

#[tokio::test]
async fn nodes_and_usage_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("arbor.db");
    let path = path.to_string_lossy();

    let nodes = vec![
        node("1", "Engine won't start?", &[("Yes", "2"), ("No", "3")]),
        node("2", "Check battery", &[]),
    ];

    {
        let svc = ArborService::new_local(&path).await.unwrap();
        svc.replace_topic("Engine", &nodes).await.unwrap();
        svc.record_usage(&NewUsage::search("agent@example.com", "battery"))
            .await;
    }

    let svc = ArborService::new_local(&path).await.unwrap();
    assert_eq!(svc.list_topics().await.unwrap(), vec!["Engine"]);
    assert_eq!(svc.get_nodes("Engine").await.unwrap(), nodes);
    assert_eq!(svc.list_usage(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn replace_is_scoped_to_one_topic() {
    let svc = ArborService::new_local(":memory:")
        .await
        .unwrap()
        .with_retry(RetryConfig::none());

    let brakes = vec![FlowNode {
        topic: "Brakes".into(),
        id: id("1"),
        question: "Squeal?".into(),
        options: Default::default(),
    }];
    svc.replace_topic("Brakes", &brakes).await.unwrap();
    svc.replace_topic("Engine", &[node("1", "Engine won't start?", &[])])
        .await
        .unwrap();
    svc.replace_topic("Engine", &[node("9", "Replaced", &[])])
        .await
        .unwrap();

    assert_eq!(svc.get_nodes("Brakes").await.unwrap(), brakes);
    assert_eq!(svc.get_nodes("Engine").await.unwrap()[0].id, id("9"));
}
