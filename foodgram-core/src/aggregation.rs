//! Shopping list totals across every recipe in a user's cart.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::DomainError;
use crate::store::ListStore;
use crate::types::{Ingredient, IngredientId, RecipeList, UserId};

pub const SHOPPING_LIST_FILENAME: &str = "shopping-list.txt";

const HEADER: &str = "Shopping list:";
const FOOTER: &str = "Enjoy your meal!";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShoppingListLine {
    pub name: String,
    pub total_amount: i64,
    pub measurement_unit: String,
}

/// Group join rows by ingredient and sum their amounts.
///
/// Lines come out in the order their ingredient was first seen.
pub fn aggregate<I>(rows: I) -> Vec<ShoppingListLine>
where
    I: IntoIterator<Item = (Ingredient, i32)>,
{
    let mut positions: HashMap<IngredientId, usize> = HashMap::new();
    let mut lines: Vec<ShoppingListLine> = Vec::new();

    for (ingredient, amount) in rows {
        match positions.get(&ingredient.id) {
            Some(&index) => lines[index].total_amount += i64::from(amount),
            None => {
                positions.insert(ingredient.id, lines.len());
                lines.push(ShoppingListLine {
                    name: ingredient.name,
                    total_amount: i64::from(amount),
                    measurement_unit: ingredient.measurement_unit,
                });
            }
        }
    }

    lines
}

/// Aggregated list for `user`, failing when the cart has no recipes.
///
/// Recipes without ingredient rows still count as cart entries and simply
/// contribute no lines.
pub fn shopping_list<S>(store: &S, user: UserId) -> Result<Vec<ShoppingListLine>, DomainError>
where
    S: ListStore + ?Sized,
{
    if !store.has_entries(RecipeList::ShoppingCart, user)? {
        return Err(DomainError::EmptyState {
            field: "shopping_cart",
            message: "Shopping cart is empty".to_string(),
        });
    }
    Ok(aggregate(store.cart_ingredient_rows(user)?))
}

/// Plain-text file body: header, numbered lines, footer.
pub fn render_shopping_list(lines: &[ShoppingListLine]) -> String {
    let mut body = String::from(HEADER);
    for (n, line) in lines.iter().enumerate() {
        let _ = write!(
            body,
            "\n{}. {} - {}{}.",
            n + 1,
            line.name,
            line.total_amount,
            line.measurement_unit
        );
    }
    body.push_str("\n\n");
    body.push_str(FOOTER);
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ingredient(id: IngredientId, name: &str, unit: &str) -> Ingredient {
        Ingredient {
            id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        }
    }

    #[test]
    fn test_aggregate_sums_shared_ingredients() {
        let flour = ingredient(1, "flour", "g");
        let milk = ingredient(2, "milk", "ml");
        let lines = aggregate(vec![
            (flour.clone(), 2),
            (milk.clone(), 200),
            (flour, 3),
        ]);

        assert_eq!(
            lines,
            vec![
                ShoppingListLine {
                    name: "flour".to_string(),
                    total_amount: 5,
                    measurement_unit: "g".to_string(),
                },
                ShoppingListLine {
                    name: "milk".to_string(),
                    total_amount: 200,
                    measurement_unit: "ml".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_same_name_different_unit_stays_separate() {
        let lines = aggregate(vec![
            (ingredient(1, "salt", "g"), 5),
            (ingredient(2, "salt", "pinch"), 1),
        ]);
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_aggregate_does_not_overflow_i32() {
        let sugar = ingredient(1, "sugar", "g");
        let lines = aggregate(vec![(sugar.clone(), i32::MAX), (sugar, i32::MAX)]);
        assert_eq!(lines[0].total_amount, 2 * i64::from(i32::MAX));
    }

    #[test]
    fn test_render() {
        let lines = aggregate(vec![
            (ingredient(1, "eggs", "pcs"), 3),
            (ingredient(2, "butter", "g"), 50),
        ]);
        assert_eq!(
            render_shopping_list(&lines),
            "Shopping list:\n1. eggs - 3pcs.\n2. butter - 50g.\n\nEnjoy your meal!"
        );
    }
}
