mod common;

use std::collections::HashSet;

use common::{draft, fixture};
use foodgram_sdk::{
    composition::{create_recipe, delete_recipe, get_recipe_mut, update_recipe},
    error::ServiceError,
    schema::{Id, Relation},
    session::SessionData,
    store::{RecipeStore, RelationStore},
};

#[tokio::test]
async fn created_recipe_reads_back_exact_sets() {
    let f = fixture().await;
    let input = draft(
        "Pancakes",
        &[f.dinner.id, f.breakfast.id],
        &[(f.flour.id, 200), (f.eggs.id, 2)],
    );

    let recipe = create_recipe(f.author.id, &input, &f.store).await.unwrap();

    let tags: HashSet<Id> = f
        .store
        .recipe_tags(recipe.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(tags, HashSet::from([f.breakfast.id, f.dinner.id]));

    let lines: Vec<(Id, i32)> = f
        .store
        .recipe_ingredients(recipe.id)
        .await
        .unwrap()
        .into_iter()
        .map(|l| (l.ingredient_id, l.amount))
        .collect();
    assert_eq!(lines, vec![(f.flour.id, 200), (f.eggs.id, 2)]);

    assert_eq!(recipe.author_id, f.author.id);
    assert_eq!(recipe.name, "Pancakes");
}

#[tokio::test]
async fn invalid_drafts_persist_nothing() {
    let f = fixture().await;
    let invalid = [
        draft("No tags", &[], &[(f.flour.id, 100)]),
        draft("No ingredients", &[f.breakfast.id], &[]),
        draft(
            "Repeated",
            &[f.breakfast.id],
            &[(f.flour.id, 100), (f.flour.id, 50)],
        ),
        draft("Zero", &[f.breakfast.id], &[(f.flour.id, 0)]),
    ];

    for input in &invalid {
        let err = create_recipe(f.author.id, input, &f.store).await.unwrap_err();
        assert!(err.is_validation(), "{}: {err:?}", input.name);
    }

    assert_eq!(f.store.count_author_recipes(f.author.id).await.unwrap(), 0);
}

#[tokio::test]
async fn unknown_references_are_not_found() {
    let f = fixture().await;

    let missing_ingredient = draft("Ghost", &[f.breakfast.id], &[(9999, 1)]);
    let err = create_recipe(f.author.id, &missing_ingredient, &f.store)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    let missing_tag = draft("Ghost", &[9999], &[(f.flour.id, 1)]);
    let err = create_recipe(f.author.id, &missing_tag, &f.store)
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    assert_eq!(f.store.count_author_recipes(f.author.id).await.unwrap(), 0);
}

#[tokio::test]
async fn duplicate_name_for_same_author_conflicts() {
    let f = fixture().await;
    let input = draft("Bread", &[f.dinner.id], &[(f.flour.id, 500)]);

    create_recipe(f.author.id, &input, &f.store).await.unwrap();
    let err = create_recipe(f.author.id, &input, &f.store).await.unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    create_recipe(f.reader.id, &input, &f.store).await.unwrap();
}

#[tokio::test]
async fn repeated_update_converges_and_recreates_lines() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Cake", &[f.breakfast.id], &[(f.flour.id, 100)]),
        &f.store,
    )
    .await
    .unwrap();

    let update = draft(
        "Cake",
        &[f.dinner.id],
        &[(f.flour.id, 250), (f.sugar.id, 80)],
    );

    update_recipe(recipe.id, &update, &f.store).await.unwrap();
    let first_rows = f.store.ingredient_rows(recipe.id).await;
    let first_tags = f.store.recipe_tags(recipe.id).await.unwrap();

    update_recipe(recipe.id, &update, &f.store).await.unwrap();
    let second_rows = f.store.ingredient_rows(recipe.id).await;
    let second_tags = f.store.recipe_tags(recipe.id).await.unwrap();

    let content = |rows: &[foodgram_sdk::schema::IngredientInRecipe]| {
        rows.iter()
            .map(|r| (r.ingredient_id, r.amount))
            .collect::<Vec<_>>()
    };
    assert_eq!(content(&first_rows), content(&second_rows));
    assert_eq!(content(&second_rows), vec![(f.flour.id, 250), (f.sugar.id, 80)]);
    assert_eq!(first_tags, second_tags);
    assert_eq!(second_tags, vec![f.dinner.clone()]);

    let first_ids: HashSet<Id> = first_rows.iter().map(|r| r.id).collect();
    assert!(second_rows.iter().all(|r| !first_ids.contains(&r.id)));
}

#[tokio::test]
async fn failed_update_keeps_previous_state() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Soup", &[f.dinner.id], &[(f.eggs.id, 3)]),
        &f.store,
    )
    .await
    .unwrap();
    let before = f.store.ingredient_rows(recipe.id).await;

    let err = update_recipe(
        recipe.id,
        &draft("Soup", &[f.dinner.id], &[(f.eggs.id, 3), (4242, 1)]),
        &f.store,
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(f.store.ingredient_rows(recipe.id).await, before);
}

#[tokio::test]
async fn update_of_missing_recipe_is_not_found() {
    let f = fixture().await;

    let err = update_recipe(
        777,
        &draft("Nothing", &[f.dinner.id], &[(f.eggs.id, 1)]),
        &f.store,
    )
    .await
    .unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn delete_cascades_to_relations() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Toast", &[f.breakfast.id], &[(f.flour.id, 50)]),
        &f.store,
    )
    .await
    .unwrap();
    f.store
        .insert_relation(Relation::Favorite, f.reader.id, recipe.id)
        .await
        .unwrap();

    delete_recipe(recipe.id, &f.store).await.unwrap();

    assert_eq!(f.store.relation_count(Relation::Favorite).await, 0);
    assert!(f.store.ingredient_rows(recipe.id).await.is_empty());
    assert!(delete_recipe(recipe.id, &f.store).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn only_author_or_admin_get_mutable_recipe() {
    let f = fixture().await;
    let recipe = create_recipe(
        f.author.id,
        &draft("Omelette", &[f.breakfast.id], &[(f.eggs.id, 3)]),
        &f.store,
    )
    .await
    .unwrap();

    let author = SessionData::from(&f.author);
    let reader = SessionData::from(&f.reader);
    let admin = SessionData::from(&f.admin);

    assert!(get_recipe_mut(recipe.id, &author, &f.store).await.is_ok());
    assert!(get_recipe_mut(recipe.id, &admin, &f.store).await.is_ok());
    assert!(matches!(
        get_recipe_mut(recipe.id, &reader, &f.store).await,
        Err(ServiceError::PermissionDenied)
    ));
}

#[tokio::test]
async fn rename_onto_existing_name_changes_nothing() {
    let f = fixture().await;
    create_recipe(
        f.author.id,
        &draft("Soup", &[f.dinner.id], &[(f.eggs.id, 3)]),
        &f.store,
    )
    .await
    .unwrap();
    let stew = create_recipe(
        f.author.id,
        &draft("Stew", &[f.dinner.id], &[(f.flour.id, 40)]),
        &f.store,
    )
    .await
    .unwrap();
    let rows_before = f.store.ingredient_rows(stew.id).await;
    let tags_before = f.store.recipe_tags(stew.id).await.unwrap();

    let err = update_recipe(
        stew.id,
        &draft(
            "Soup",
            &[f.breakfast.id],
            &[(f.sugar.id, 20), (f.eggs.id, 1)],
        ),
        &f.store,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, ServiceError::Conflict(_)));
    assert_eq!(f.store.ingredient_rows(stew.id).await, rows_before);
    assert_eq!(f.store.recipe_tags(stew.id).await.unwrap(), tags_before);
    assert_eq!(
        f.store.get_recipe(stew.id).await.unwrap().map(|r| r.name),
        Some(String::from("Stew"))
    );
}
