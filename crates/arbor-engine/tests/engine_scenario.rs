//! The "Engine" troubleshooting guide, imported from CSV and walked end to end.

use pretty_assertions::assert_eq;
use rstest::rstest;

use arbor_core::enums::UsageCategory;
use arbor_core::ids::{NodeId, UserIdentifier};
use arbor_core::session::SessionState;
use arbor_db::service::ArborService;
use arbor_engine::{FlowEngine, TopicSummary, topic_summaries};
use arbor_import::{build_batch, read_table};

const ENGINE_CSV: &str = "id,question,b1,d1,b2,d2\n\
                          1,Engine won't start?,Yes,2,No,3\n\
                          2,Check battery,,,,\n\
                          3,Engine runs rough?,Yes,4,No,2\n";

async fn imported_service() -> ArborService {
    let service = ArborService::new_local(":memory:").await.unwrap();
    let table = read_table(ENGINE_CSV.as_bytes(), None).unwrap();
    let batch = build_batch("Engine", &table).unwrap();
    assert_eq!(batch.warnings.len(), 1, "node 3 points at missing node 4");
    service.replace_topic(&batch.topic, &batch.nodes).await.unwrap();
    service
}

fn user() -> UserIdentifier {
    UserIdentifier::parse("tech@example.com").unwrap()
}

fn at(node: &str) -> SessionState {
    SessionState::AtNode {
        topic: "Engine".into(),
        node_id: NodeId::parse(node).unwrap(),
    }
}

#[tokio::test]
async fn engine_walkthrough() {
    let service = imported_service().await;
    let engine = FlowEngine::new(&service, user());

    assert_eq!(
        topic_summaries(&service).await,
        vec![TopicSummary {
            topic: "Engine".into(),
            nodes: 3,
        }]
    );

    let step = engine.select_topic("Engine").await;
    assert_eq!(step.state, at("1"));
    assert_eq!(step.view.as_ref().unwrap().options, vec!["Yes", "No"]);

    let step = engine.choose(&step.state, "Yes").await;
    assert_eq!(step.state, at("2"));
    assert!(step.view.as_ref().unwrap().terminal);

    let step = engine.reset(&step.state).await;
    assert_eq!(step.state, at("1"));

    let step = engine.choose(&step.state, "No").await;
    assert_eq!(step.state, at("3"));

    let step = engine.choose(&step.state, "Yes").await;
    assert_eq!(
        step.state,
        SessionState::Error {
            topic: "Engine".into(),
            node_id: NodeId::parse("3").unwrap(),
            message: "destination '4' not found".into(),
        }
    );
    let view = step.view.unwrap();
    assert_eq!(view.node_id, "3");
    assert_eq!(view.question, "Engine runs rough?");

    let log = service.list_usage(10).await.unwrap();
    let logged: Vec<(String, Option<String>, Option<bool>)> = log
        .iter()
        .rev()
        .map(|e| (e.subject.clone(), e.step_label.clone(), e.reached_terminal))
        .collect();
    assert_eq!(
        logged,
        vec![
            ("[Engine] Engine won't start?".into(), Some("Yes".into()), Some(true)),
            ("[Engine] Engine won't start?".into(), Some("No".into()), Some(false)),
        ]
    );
    assert!(log.iter().all(|e| e.category == UsageCategory::Flow));
}

#[rstest]
#[case::two_columns("id,question\n1,Start\n2.0,Done\n")]
#[case::dangling_label_column("id,question,b1,d1,b2\n1,Start,Go,2.0,Orphan\n2,Done,,,\n")]
#[case::eight_columns(
    "id,question,b1,d1,b2,d2,b3,d3\n\
     1,Start,Go,2.0,Stay,1,Back,\n\
     2.0,Done,,,,,,\n"
)]
#[tokio::test]
async fn stored_nodes_match_imported_batch(#[case] csv: &str) {
    let service = ArborService::new_local(":memory:").await.unwrap();
    let table = read_table(csv.as_bytes(), None).unwrap();
    let batch = build_batch("Roundtrip", &table).unwrap();
    assert_eq!(batch.nodes.len(), 2);

    service.replace_topic(&batch.topic, &batch.nodes).await.unwrap();

    assert_eq!(service.get_nodes("Roundtrip").await.unwrap(), batch.nodes);
}

#[rstest]
#[case::at_node(at("3"))]
#[case::from_error(SessionState::Error {
    topic: "Engine".into(),
    node_id: NodeId::parse("3").unwrap(),
    message: "destination '4' not found".into(),
})]
#[tokio::test]
async fn reset_is_idempotent(#[case] state: SessionState) {
    let service = imported_service().await;
    let engine = FlowEngine::new(&service, user());

    let once = engine.reset(&state).await;
    let twice = engine.reset(&once.state).await;

    assert_eq!(once.state, at("1"));
    assert_eq!(twice, once);
}

#[tokio::test]
async fn rejected_import_leaves_topic_untouched() {
    let service = imported_service().await;
    let before = service.get_nodes("Engine").await.unwrap();

    let table = read_table(b"id,question\n1,Start\n5,\n", None).unwrap();
    assert!(build_batch("Engine", &table).is_err());

    assert_eq!(service.get_nodes("Engine").await.unwrap(), before);
    let engine = FlowEngine::new(&service, user());
    assert_eq!(engine.select_topic("Engine").await.state, at("1"));
}

#[tokio::test]
async fn reimport_moves_start_node() {
    let service = imported_service().await;
    let table = read_table(b"id;question;b1;d1\n10;New start;Go;1\n1;Old start;;\n", None).unwrap();
    let batch = build_batch("Engine", &table).unwrap();
    service.replace_topic("Engine", &batch.nodes).await.unwrap();

    let engine = FlowEngine::new(&service, user());
    let step = engine.select_topic("Engine").await;
    assert_eq!(step.state, at("10"));
    assert_eq!(step.view.unwrap().question, "New start");
}
