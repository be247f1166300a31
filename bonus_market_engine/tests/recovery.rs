use bm_common::Bonus;
use bonus_market_engine::{
    db_types::{NewOrder, OrderNumber, OrderStatusType},
    reconciliation::{recover_unreconciled_orders, JobQueue},
    OrderLedger,
    WalletLedger,
};

use crate::support::{new_database, new_user, processing_order};

mod support;

#[tokio::test]
async fn lost_work_is_requeued_and_credits_repaired() {
    let db = new_database().await;
    let alice = new_user(&db, "alice").await;
    let bob = new_user(&db, "bob").await;

    // Uploaded, but the process stopped before it reached the queue
    db.create_order(NewOrder::new(OrderNumber::from("12345678903"), alice)).await.unwrap();
    // Being polled when the process stopped
    processing_order(&db, "9278923470", bob).await;
    // Verdict stored, but the credit never happened
    let uncredited = processing_order(&db, "2377225624", alice).await.number;
    db.update_order_status(&uncredited, OrderStatusType::Processed, Bonus::from(1_250)).await.unwrap();
    // Fully reconciled
    let done = processing_order(&db, "79927398713", bob).await.number;
    db.update_order_status(&done, OrderStatusType::Processed, Bonus::from(300)).await.unwrap();
    db.credit_for_order(&done, bob, Bonus::from(300)).await.unwrap();

    let queue = JobQueue::new(10);
    let report = recover_unreconciled_orders(&db, &queue).await.unwrap();
    assert_eq!(report.credits_repaired, 1);
    assert_eq!(report.orders_requeued, 2);

    assert_eq!(db.get_balance(alice).await.unwrap(), Bonus::from(1_250));
    assert_eq!(db.get_balance(bob).await.unwrap(), Bonus::from(300));
    let first = queue.next().await.unwrap();
    let second = queue.next().await.unwrap();
    assert_eq!(first.order_number.as_str(), "12345678903");
    assert_eq!(second.order_number.as_str(), "9278923470");
    assert!(queue.is_empty());
    let requeued = db.fetch_order(&first.order_number).await.unwrap().unwrap();
    assert_eq!(requeued.status, OrderStatusType::Processing);

    // A second pass finds no missing credits
    let queue = JobQueue::new(10);
    let report = recover_unreconciled_orders(&db, &queue).await.unwrap();
    assert_eq!(report.credits_repaired, 0);
    assert_eq!(db.get_balance(alice).await.unwrap(), Bonus::from(1_250));
}

#[tokio::test]
async fn nothing_to_recover() {
    let db = new_database().await;
    new_user(&db, "alice").await;
    let queue = JobQueue::new(1);
    let report = recover_unreconciled_orders(&db, &queue).await.unwrap();
    assert_eq!(report.credits_repaired, 0);
    assert_eq!(report.orders_requeued, 0);
    assert!(queue.is_empty());
}
