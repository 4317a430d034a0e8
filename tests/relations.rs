mod common;

use common::{draft, fixture};
use foodgram_sdk::{
    composition::create_recipe,
    error::ServiceError,
    relations::{add_relation, relation_exists, remove_relation},
    schema::Relation,
};

#[tokio::test]
async fn self_subscription_is_rejected() {
    let f = fixture().await;

    let err = add_relation(Relation::Subscription, f.reader.id, f.reader.id, &f.store)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::SelfSubscription));
    assert!(err.is_conflict());
    assert_eq!(f.store.relation_count(Relation::Subscription).await, 0);
}

#[tokio::test]
async fn second_subscription_conflicts() {
    let f = fixture().await;

    add_relation(Relation::Subscription, f.reader.id, f.author.id, &f.store)
        .await
        .unwrap();
    let err = add_relation(Relation::Subscription, f.reader.id, f.author.id, &f.store)
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(f.store.relation_count(Relation::Subscription).await, 1);
}

#[tokio::test]
async fn subscribing_to_missing_author_is_not_found() {
    let f = fixture().await;

    let err = add_relation(Relation::Subscription, f.reader.id, 5000, &f.store)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn removing_missing_favorite_is_not_found() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Waffles", &[f.breakfast.id], &[(f.flour.id, 150)]),
        &f.store,
    )
    .await
    .unwrap();
    add_relation(Relation::Favorite, f.author.id, recipe.id, &f.store)
        .await
        .unwrap();

    let err = remove_relation(Relation::Favorite, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(f.store.relation_count(Relation::Favorite).await, 1);
}

#[tokio::test]
async fn favorite_round_trip() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Porridge", &[f.breakfast.id], &[(f.sugar.id, 10)]),
        &f.store,
    )
    .await
    .unwrap();

    add_relation(Relation::Favorite, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap();
    assert!(relation_exists(Relation::Favorite, Some(f.reader.id), recipe.id, &f.store)
        .await
        .unwrap());
    assert!(!relation_exists(Relation::Favorite, None, recipe.id, &f.store)
        .await
        .unwrap());

    let err = add_relation(Relation::Favorite, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    remove_relation(Relation::Favorite, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap();
    assert!(!relation_exists(Relation::Favorite, Some(f.reader.id), recipe.id, &f.store)
        .await
        .unwrap());
}

#[tokio::test]
async fn favorite_and_cart_are_independent() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Stew", &[f.dinner.id], &[(f.eggs.id, 1)]),
        &f.store,
    )
    .await
    .unwrap();

    add_relation(Relation::Favorite, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap();
    add_relation(Relation::ShoppingCart, f.reader.id, recipe.id, &f.store)
        .await
        .unwrap();

    assert_eq!(f.store.relation_count(Relation::Favorite).await, 1);
    assert_eq!(f.store.relation_count(Relation::ShoppingCart).await, 1);
}
