//! Evaluator behaviour across whole trees

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rsc_core::{Component, ComponentError, Element, ElementKind, Node, Props, BOUNDARY_PROP};
use rsc_server::{EvalError, Evaluator};
use tokio::sync::Barrier;

fn counting(name: &str, calls: &Arc<AtomicUsize>, output: Node) -> Component {
    let calls = Arc::clone(calls);
    Component::new(name, move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(output.clone())
    })
}

fn delayed(index: usize, delay_ms: u64) -> Component {
    Component::new_async(format!("Delayed{}", index), move |_| async move {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
        Ok(Node::from(Element::intrinsic("li").prop("index", index as u64)))
    })
}

#[tokio::test]
async fn test_boundary_implementation_never_runs() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = counting("Counter", &calls, Node::Null);
    let tree = Node::from(Element::fragment(vec![
        Element::client(counter.clone(), "widgets/counter").prop("start", 0),
        Element::client(counter, "widgets/counter").prop("start", 5),
    ]));

    let evaluated = Evaluator::new().evaluate(tree).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 0);
    let children = evaluated.as_element().unwrap().get_children().unwrap();
    for child in children.as_array().unwrap() {
        let reference = child.as_element().unwrap();
        assert_eq!(reference.kind().module_path(), Some("widgets/counter"));
        assert!(!reference.props().contains_key(BOUNDARY_PROP));
    }
}

#[tokio::test]
async fn test_boundary_props_are_evaluated() {
    let label = Component::new("Label", |_| Ok(Node::from(Element::intrinsic("span"))));
    let layout = Component::new("Layout", |_| Ok(Node::Null));
    let tree = Node::from(
        Element::client(layout, "components/layout")
            .prop("title", "My App")
            .child(Element::composite(label)),
    );

    let evaluated = Evaluator::new().evaluate(tree).await.unwrap();
    let reference = evaluated.as_element().unwrap();
    let props: Vec<&str> = reference.props().keys().map(String::as_str).collect();
    assert_eq!(props, vec!["title", "children"]);
    let children = reference.get_children().unwrap().as_array().unwrap();
    assert_eq!(children[0].as_element().unwrap().kind().tag(), Some("span"));
}

#[tokio::test]
async fn test_non_boundary_invoked_exactly_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let rendered = Node::from(Element::intrinsic("section").child("body"));
    let section = counting("Section", &calls, rendered.clone());

    let via_component = Evaluator::new()
        .evaluate(Node::from(Element::composite(section)))
        .await
        .unwrap();
    let direct = Evaluator::new().evaluate(rendered).await.unwrap();

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(via_component, direct);
}

#[tokio::test]
async fn test_order_follows_input_not_completion() {
    let n = 4;
    let items: Vec<Node> = (0..n)
        .map(|i| Node::from(Element::composite(delayed(i, ((n - i) * 15) as u64))))
        .collect();

    let evaluated = Evaluator::new().evaluate(Node::Array(items)).await.unwrap();

    let order: Vec<i64> = evaluated
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n.as_element().unwrap().props()["index"].as_i64().unwrap())
        .collect();
    assert_eq!(order, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn test_siblings_run_concurrently() {
    // Each sibling waits until all of them have started; a sequential walk
    // would never get past the first one.
    let siblings = 3;
    let barrier = Arc::new(Barrier::new(siblings));
    let items: Vec<Node> = (0..siblings)
        .map(|i| {
            let barrier = Arc::clone(&barrier);
            let waiter = Component::new_async(format!("Waiter{}", i), move |_| {
                let barrier = Arc::clone(&barrier);
                async move {
                    barrier.wait().await;
                    Ok(Node::from(i as u64))
                }
            });
            Node::from(Element::composite(waiter))
        })
        .collect();

    let evaluated = tokio::time::timeout(
        Duration::from_secs(5),
        Evaluator::new().evaluate(Node::Array(items)),
    )
    .await
    .expect("siblings were evaluated sequentially")
    .unwrap();

    assert_eq!(
        evaluated,
        Node::Array(vec![Node::from(0u64), Node::from(1u64), Node::from(2u64)])
    );
}

#[tokio::test]
async fn test_prop_values_run_concurrently() {
    let barrier = Arc::new(Barrier::new(2));
    let waiter = |name: &'static str| {
        let barrier = Arc::clone(&barrier);
        Component::new_async(name, move |_| {
            let barrier = Arc::clone(&barrier);
            async move {
                barrier.wait().await;
                Ok(Node::from(name))
            }
        })
    };
    let tree = Node::from(
        Element::intrinsic("header")
            .prop("left", Element::composite(waiter("Left")))
            .prop("right", Element::composite(waiter("Right"))),
    );

    let evaluated = tokio::time::timeout(Duration::from_secs(5), Evaluator::new().evaluate(tree))
        .await
        .expect("props were evaluated sequentially")
        .unwrap();

    let props = evaluated.as_element().unwrap().props();
    assert_eq!(props["left"], Node::from("Left"));
    assert_eq!(props["right"], Node::from("Right"));
}

#[tokio::test]
async fn test_failure_rejects_whole_tree() {
    let ok = Component::new("Fine", |_| Ok(Node::from(Element::intrinsic("p"))));
    let broken = Component::new("Broken", |_| Err(ComponentError::new("boom")));
    let tree = Node::from(
        Element::intrinsic("main")
            .child(Element::composite(ok))
            .child(Element::intrinsic("div").child(Element::composite(broken))),
    );

    let result = Evaluator::new().evaluate(tree).await;
    assert!(matches!(result, Err(EvalError::Implementation { .. })));
}

#[tokio::test]
async fn test_first_failure_in_input_order_wins() {
    let slow = Component::new_async("Slow", |_| async {
        tokio::time::sleep(Duration::from_millis(40)).await;
        Err(ComponentError::new("slow failure"))
    });
    let fast = Component::new("Fast", |_| Err(ComponentError::new("fast failure")));
    let tree = Node::Array(vec![
        Node::from(Element::composite(slow)),
        Node::from(Element::composite(fast)),
    ]);

    match Evaluator::new().evaluate(tree).await {
        Err(EvalError::Implementation { component, .. }) => assert_eq!(component, "Slow"),
        other => panic!("Expected Implementation error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_structural_error_deep_in_tree() {
    let tree = Node::from(Element::fragment(vec![Node::from(
        Element::intrinsic("ul").child(Element::reference("leaked/module")),
    )]));

    let err = Evaluator::new().evaluate(tree).await.unwrap_err();
    assert!(matches!(err, EvalError::Structural(_)));
    assert!(err.to_string().contains("leaked/module"));
}

#[tokio::test]
async fn test_counter_scenario() {
    let counter = Component::new("Counter", |_| panic!("client component invoked on server"));
    let root = Node::from(Element::fragment(vec![
        Element::intrinsic("div"),
        Element::client(counter, "widgets/counter").prop("start", 0),
    ]));

    let evaluated = Evaluator::new().evaluate(root).await.unwrap();

    let fragment = evaluated.as_element().unwrap();
    assert_eq!(fragment.kind(), &ElementKind::Fragment);
    let children = fragment.get_children().unwrap().as_array().unwrap();
    assert_eq!(children.len(), 2);

    let div = children[0].as_element().unwrap();
    assert_eq!(div.kind().tag(), Some("div"));
    assert!(div.props().is_empty());

    let reference = children[1].as_element().unwrap();
    assert_eq!(reference.kind().module_path(), Some("widgets/counter"));
    let mut expected = Props::new();
    expected.insert("start".to_string(), Node::from(0));
    assert_eq!(reference.props(), &expected);
}
