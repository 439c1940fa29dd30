use super::*;
use std::time::Duration;

#[test]
fn test_new_coordinator_is_idle() {
    let coordinator = Coordinator::new();
    assert_eq!(coordinator.outstanding(), 0);
}

#[test]
fn test_begin_and_end_balance() {
    let coordinator = Coordinator::new();

    let a = coordinator.begin();
    let b = coordinator.begin();
    assert_eq!(coordinator.outstanding(), 2);

    a.end();
    assert_eq!(coordinator.outstanding(), 1);

    drop(b);
    assert_eq!(coordinator.outstanding(), 0);
}

#[test]
fn test_clones_share_the_counter() {
    let coordinator = Coordinator::new();
    let clone = coordinator.clone();

    let unit = clone.begin();
    assert_eq!(coordinator.outstanding(), 1);
    unit.end();
    assert_eq!(coordinator.outstanding(), 0);
}

#[test]
fn test_independent_coordinators_do_not_interfere() {
    let first = Coordinator::new();
    let second = Coordinator::new();

    let _unit = first.begin();
    assert_eq!(first.outstanding(), 1);
    assert_eq!(second.outstanding(), 0);
}

#[tokio::test]
async fn test_await_all_returns_immediately_when_idle() {
    let coordinator = Coordinator::new();
    tokio::time::timeout(Duration::from_secs(1), coordinator.await_all())
        .await
        .expect("await_all should not block without outstanding work");
}

#[tokio::test]
async fn test_await_all_blocks_until_last_unit_ends() {
    let coordinator = Coordinator::new();
    let unit = coordinator.begin();

    let waiter = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.await_all().await })
    };

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!waiter.is_finished());

    unit.end();
    tokio::time::timeout(Duration::from_secs(1), waiter)
        .await
        .expect("await_all should return once the count reaches zero")
        .unwrap();
    assert_eq!(coordinator.outstanding(), 0);
}

#[tokio::test]
async fn test_unit_handed_over_before_parent_ends() {
    let coordinator = Coordinator::new();
    let parent = coordinator.begin();

    // A child registered before the parent ends keeps the count above zero.
    let child = coordinator.begin();
    parent.end();
    assert_eq!(coordinator.outstanding(), 1);

    let handle = tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(10)).await;
        child.end();
    });

    coordinator.await_all().await;
    assert_eq!(coordinator.outstanding(), 0);
    handle.await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_units() {
    let coordinator = Coordinator::new();
    let mut handles = Vec::new();

    for i in 0..200u64 {
        let unit = coordinator.begin();
        handles.push(tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(i % 7)).await;
            unit.end();
        }));
    }

    coordinator.await_all().await;
    assert_eq!(coordinator.outstanding(), 0);
    for handle in handles {
        handle.await.unwrap();
    }
}

#[tokio::test]
async fn test_unit_dropped_by_panicking_task_still_ends() {
    let coordinator = Coordinator::new();
    let unit = coordinator.begin();

    let result = tokio::spawn(async move {
        let _unit = unit;
        panic!("scan blew up");
    })
    .await;

    assert!(result.is_err());
    assert_eq!(coordinator.outstanding(), 0);
}
