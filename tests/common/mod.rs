#![allow(dead_code)]

use foodgram_sdk::{
    memory::MemoryStore,
    schema::{Id, Ingredient, IngredientAmount, NewUser, RecipeDraft, Tag, User, UserRole},
    store::CatalogStore,
};

pub struct Fixture {
    pub store: MemoryStore,
    pub author: User,
    pub reader: User,
    pub admin: User,
    pub breakfast: Tag,
    pub dinner: Tag,
    pub flour: Ingredient,
    pub sugar: Ingredient,
    pub eggs: Ingredient,
}

fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        first_name: String::new(),
        last_name: String::new(),
        password: String::from("not-a-real-hash"),
    }
}

pub async fn fixture() -> Fixture {
    let store = MemoryStore::new();

    let author = store.insert_user(&new_user("author"), UserRole::User).await.unwrap();
    let reader = store.insert_user(&new_user("reader"), UserRole::User).await.unwrap();
    let admin = store.insert_user(&new_user("admin"), UserRole::Admin).await.unwrap();

    let breakfast = store.create_tag("Breakfast", "#E26C2D", "breakfast").await.unwrap();
    let dinner = store.create_tag("Dinner", "#49B64E", "dinner").await.unwrap();

    let flour = store.upsert_ingredient("flour", "g").await.unwrap();
    let sugar = store.upsert_ingredient("sugar", "g").await.unwrap();
    let eggs = store.upsert_ingredient("eggs", "pcs").await.unwrap();

    Fixture {
        store,
        author,
        reader,
        admin,
        breakfast,
        dinner,
        flour,
        sugar,
        eggs,
    }
}

pub fn draft(name: &str, tags: &[Id], ingredients: &[(Id, i32)]) -> RecipeDraft {
    RecipeDraft {
        name: name.to_string(),
        image: format!("{}.png", name.to_lowercase()),
        text: String::from("Mix and bake."),
        cooking_time: 30,
        tags: tags.to_vec(),
        ingredients: ingredients
            .iter()
            .map(|(id, amount)| IngredientAmount {
                id: *id,
                amount: *amount,
            })
            .collect(),
    }
}
