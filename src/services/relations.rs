//! Favorite, shopping cart and subscription pairs.

use crate::{
    error::ServiceError,
    schema::{Id, Relation},
    store::{RecipeStore, RelationStore, UserStore},
};

async fn target_exists<S>(relation: Relation, target_id: Id, store: &S) -> Result<bool, ServiceError>
where
    S: RecipeStore + UserStore + ?Sized,
{
    Ok(match relation {
        Relation::Favorite | Relation::ShoppingCart => store.get_recipe(target_id).await?.is_some(),
        Relation::Subscription => store.get_user(target_id).await?.is_some(),
    })
}

pub async fn add_relation<S>(
    relation: Relation,
    user_id: Id,
    target_id: Id,
    store: &S,
) -> Result<(), ServiceError>
where
    S: RecipeStore + UserStore + RelationStore + ?Sized,
{
    if relation == Relation::Subscription && user_id == target_id {
        log::warn!("User {user_id} tried to subscribe to themselves");
        return Err(ServiceError::SelfSubscription);
    }

    if !target_exists(relation, target_id, store).await? {
        return Err(ServiceError::NotFound(match relation {
            Relation::Subscription => format!("User {target_id} does not exist"),
            _ => format!("Recipe {target_id} does not exist"),
        }));
    }

    if !store.insert_relation(relation, user_id, target_id).await? {
        return Err(ServiceError::Conflict(match relation {
            Relation::Subscription => String::from("Already subscribed to this author"),
            _ => format!("Recipe is already in {}", relation.describe()),
        }));
    }

    log::info!("User {user_id} added {target_id} to {}", relation.describe());

    Ok(())
}

pub async fn remove_relation<S>(
    relation: Relation,
    user_id: Id,
    target_id: Id,
    store: &S,
) -> Result<(), ServiceError>
where
    S: RelationStore + ?Sized,
{
    if !store.delete_relation(relation, user_id, target_id).await? {
        return Err(ServiceError::NotFound(format!(
            "Nothing to remove from {}",
            relation.describe()
        )));
    }

    log::info!("User {user_id} removed {target_id} from {}", relation.describe());

    Ok(())
}

/// Read-side flag. Always `false` for an anonymous viewer.
pub async fn relation_exists<S>(
    relation: Relation,
    viewer: Option<Id>,
    target_id: Id,
    store: &S,
) -> Result<bool, ServiceError>
where
    S: RelationStore + ?Sized,
{
    match viewer {
        Some(user_id) => store.relation_exists(relation, user_id, target_id).await,
        None => Ok(false),
    }
}
