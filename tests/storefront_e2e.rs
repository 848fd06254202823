//! End-to-end tests driving the full storefront container over the in-memory
//! backend.

use std::sync::Arc;

use serde_json::Value;

use bakeshop_store::{
    Backend, CakeDraft, CakePatch, FeedbackDraft, InMemoryBackend, OrderDraft, OrderItem,
    OrderStatus, PaymentStatus, RequestStatus, Storefront, UserDraft, UserRole,
};

fn storefront() -> (Arc<InMemoryBackend>, Storefront<InMemoryBackend>) {
    let backend = Arc::new(InMemoryBackend::new());
    let front = Storefront::new(Arc::clone(&backend));
    (backend, front)
}

fn cake_draft(name: &str, price: f64) -> CakeDraft {
    CakeDraft::new(name, "A cake", "", price, 10, vec!["classic".to_string()])
}

#[tokio::test]
async fn full_storefront_flow() {
    let (_backend, front) = storefront();

    // Catalog and account setup.
    let cake = front.cakes.create(cake_draft("Chocolate Dream", 24.5)).await.unwrap();
    let user = front
        .users
        .create(UserDraft::new("uid-1", "Ada", "ada@example.com"))
        .await
        .unwrap();
    assert_eq!(user.role, UserRole::Customer);

    // The customer places an order for the cake.
    let order = front
        .orders
        .create(OrderDraft::new(
            &user.uid,
            &user.name,
            &user.email,
            vec![OrderItem::new(&cake.id, &cake.name, 2, cake.price)],
            "12 Main St",
        ))
        .await
        .unwrap();
    assert_eq!(order.total_amount, 49.0);
    assert_eq!(order.items[0].cake_id, cake.id);
    assert!(order.order_id.starts_with("CHOCO001-"));

    // Fulfillment and payment progress through the admin operations.
    front
        .orders
        .update_payment_status(&order.id, PaymentStatus::Paid)
        .await
        .unwrap();
    let delivered = front
        .orders
        .update_status(&order.id, OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(delivered.payment_status, PaymentStatus::Paid);

    // The customer leaves feedback; it only counts once approved.
    let feedback = front
        .feedbacks
        .create(FeedbackDraft::new(
            &cake.id,
            &cake.name,
            &user.uid,
            &user.name,
            &user.email,
            5,
            "wonderful",
        ))
        .await
        .unwrap();
    assert_eq!(front.feedbacks.average_rating(&cake.id).unwrap(), 0.0);
    front.feedbacks.approve(&feedback.id).await.unwrap();
    assert_eq!(front.feedbacks.average_rating(&cake.id).unwrap(), 5.0);

    // The catalog reflects the rating once pushed back onto the cake.
    front
        .cakes
        .update(&cake.id, CakePatch::default().with_rating(5.0, 1))
        .await
        .unwrap();
    let top = front.cakes.fetch_top_rated(3).await.unwrap();
    assert_eq!(top[0].id, cake.id);
}

#[tokio::test]
async fn average_rating_vectors() {
    let (_backend, front) = storefront();

    let four = front
        .feedbacks
        .create(FeedbackDraft::new("c1", "Choco", "u1", "A", "a@b.c", 4, ""))
        .await
        .unwrap();
    let five = front
        .feedbacks
        .create(FeedbackDraft::new("c1", "Choco", "u2", "B", "b@b.c", 5, ""))
        .await
        .unwrap();
    front
        .feedbacks
        .create(FeedbackDraft::new("c1", "Choco", "u3", "C", "c@b.c", 1, ""))
        .await
        .unwrap();

    front.feedbacks.approve(&four.id).await.unwrap();
    front.feedbacks.approve(&five.id).await.unwrap();
    assert_eq!(front.feedbacks.average_rating("c1").unwrap(), 4.5);
    // No approved feedback at all yields zero, not an error.
    assert_eq!(front.feedbacks.average_rating("c9").unwrap(), 0.0);
}

#[tokio::test]
async fn two_caches_converge_on_the_same_confirmed_state() {
    let backend = Arc::new(InMemoryBackend::new());
    let writer = Storefront::new(Arc::clone(&backend));
    let reader = Storefront::new(Arc::clone(&backend));

    let a = writer.cakes.create(cake_draft("A", 1.0)).await.unwrap();
    writer.cakes.create(cake_draft("B", 2.0)).await.unwrap();
    writer
        .cakes
        .update(&a.id, CakePatch::default().with_price(3.0))
        .await
        .unwrap();
    let c = writer.cakes.create(cake_draft("C", 4.0)).await.unwrap();
    writer.cakes.remove(&c.id).await.unwrap();

    // A cache built from scratch off the same confirmed history matches the
    // cache that applied each confirmation as it arrived. Update timestamps
    // are excluded: the merged entry carries the local merge time.
    reader.cakes.fetch_all().await.unwrap();
    let project = |cakes: Vec<bakeshop_store::Cake>| {
        cakes
            .into_iter()
            .map(|c| (c.id, c.name, c.price, c.created_at))
            .collect::<Vec<_>>()
    };
    assert_eq!(
        project(writer.cakes.cache().select_all().unwrap()),
        project(reader.cakes.cache().select_all().unwrap())
    );
    assert_eq!(
        writer.cakes.cache().select_ids().unwrap(),
        reader.cakes.cache().select_ids().unwrap()
    );
}

#[tokio::test]
async fn failure_injection_surfaces_without_corrupting_state() {
    let (backend, front) = storefront();
    let cake = front.cakes.create(cake_draft("Choco", 12.0)).await.unwrap();

    backend.set_offline(true);
    let err = front.cakes.fetch_all().await.unwrap_err();
    assert!(err.is_backend());
    assert_eq!(front.cakes.cache().status().unwrap(), RequestStatus::Failed);
    assert!(!front.cakes.cache().last_error().unwrap().unwrap().is_empty());
    assert_eq!(front.cakes.cache().total().unwrap(), 1);

    // Mutations fail closed: nothing enters the cache.
    assert!(front.cakes.create(cake_draft("Ghost", 1.0)).await.is_err());
    assert_eq!(front.cakes.cache().total().unwrap(), 1);

    backend.set_offline(false);
    front.cakes.fetch_all().await.unwrap();
    assert_eq!(
        front.cakes.cache().status().unwrap(),
        RequestStatus::Succeeded
    );
    assert_eq!(
        front.cakes.cache().select_by_id(&cake.id).unwrap().unwrap().name,
        "Choco"
    );
}

#[tokio::test]
async fn subscription_keeps_a_mirror_cache_current() {
    let (backend, front) = storefront();
    let mirror = Storefront::new(Arc::clone(&backend));
    let mut rx = backend.subscribe("cakes");

    front.cakes.create(cake_draft("Choco", 12.0)).await.unwrap();
    let cake = front.cakes.create(cake_draft("Velvet", 9.0)).await.unwrap();
    // Drain to the latest snapshot and apply it.
    let mut snapshot = rx.recv().await.unwrap();
    while let Ok(next) = rx.try_recv() {
        snapshot = next;
    }
    mirror.cakes.cache().apply_snapshot(&snapshot).unwrap();
    assert_eq!(
        mirror.cakes.cache().select_ids().unwrap(),
        front.cakes.cache().select_ids().unwrap()
    );

    front.cakes.remove(&cake.id).await.unwrap();
    let snapshot = rx.recv().await.unwrap();
    mirror.cakes.cache().apply_snapshot(&snapshot).unwrap();
    assert_eq!(mirror.cakes.cache().total().unwrap(), 1);
}

#[tokio::test]
async fn unknown_wire_fields_are_rejected_not_merged() {
    let (backend, front) = storefront();
    front.cakes.create(cake_draft("Choco", 12.0)).await.unwrap();

    // A document with a field the cake shape does not know about.
    let mut fields = serde_json::Map::new();
    fields.insert("name".to_string(), Value::from("Rogue"));
    fields.insert("description".to_string(), Value::from(""));
    fields.insert("imageURL".to_string(), Value::from(""));
    fields.insert("price".to_string(), Value::from(1.0));
    fields.insert("quantity".to_string(), Value::from(1));
    fields.insert("rating".to_string(), Value::from(0.0));
    fields.insert("totalRatings".to_string(), Value::from(0));
    fields.insert("tags".to_string(), Value::Array(Vec::new()));
    fields.insert("secretDiscount".to_string(), Value::from(99));
    backend.insert("cakes", fields).await.unwrap();

    let err = front.cakes.fetch_all().await.unwrap_err();
    assert!(err.is_decode());
    assert_eq!(front.cakes.cache().status().unwrap(), RequestStatus::Failed);
    // The cache still holds the last good state.
    assert_eq!(front.cakes.cache().total().unwrap(), 1);
}
