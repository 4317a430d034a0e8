use crate::{
    error::ServiceError,
    schema::{Id, IngredientLine, ShoppingListItem},
    store::RecipeStore,
};

/// Sums amounts per (name, unit), keeping the order each pair was first seen.
pub fn aggregate_lines(lines: &[IngredientLine]) -> Vec<ShoppingListItem> {
    let mut items: Vec<ShoppingListItem> = Vec::new();

    for line in lines {
        match items
            .iter_mut()
            .find(|i| i.name == line.name && i.measurement_unit == line.measurement_unit)
        {
            Some(item) => item.amount += i64::from(line.amount),
            None => items.push(ShoppingListItem {
                name: line.name.to_owned(),
                measurement_unit: line.measurement_unit.to_owned(),
                amount: i64::from(line.amount),
            }),
        }
    }

    items
}

/// Ingredient totals over every recipe in the user's shopping cart.
pub async fn build_shopping_list<S>(
    user_id: Id,
    store: &S,
) -> Result<Vec<ShoppingListItem>, ServiceError>
where
    S: RecipeStore + ?Sized,
{
    let lines = store.cart_lines(user_id).await?;
    let items = aggregate_lines(&lines);

    log::trace!(
        "> Shopping list for user {user_id}: {} lines into {} items",
        lines.len(),
        items.len()
    );

    Ok(items)
}

/// Plain text download body, one `name (unit) - amount` per line.
pub fn render_shopping_list(items: &[ShoppingListItem]) -> String {
    items
        .iter()
        .map(|i| format!("{} ({}) - {}\n", i.name, i.measurement_unit, i.amount))
        .collect()
}
