//! Read-only reference data: tags and ingredients.

use crate::error::DomainError;
use crate::types::{Ingredient, IngredientId, Tag, TagId};

/// Lookup interface over the tag and ingredient catalog.
///
/// Batch lookups return the rows that exist, in any order. Callers compare the
/// result against what they asked for to find unknown ids.
pub trait CatalogStore {
    fn tags_by_ids(&self, ids: &[TagId]) -> Result<Vec<Tag>, DomainError>;

    fn ingredients_by_ids(&self, ids: &[IngredientId]) -> Result<Vec<Ingredient>, DomainError>;

    /// Case-insensitive match on the start of the ingredient name, ordered by name.
    fn search_ingredients_by_prefix(&self, prefix: &str) -> Result<Vec<Ingredient>, DomainError>;

    /// All tags ordered by name.
    fn list_tags(&self) -> Result<Vec<Tag>, DomainError>;

    fn tag_by_id(&self, id: TagId) -> Result<Option<Tag>, DomainError> {
        Ok(self.tags_by_ids(&[id])?.into_iter().next())
    }

    fn ingredient_by_id(&self, id: IngredientId) -> Result<Option<Ingredient>, DomainError> {
        Ok(self.ingredients_by_ids(&[id])?.into_iter().next())
    }
}

/// Escape `%`, `_` and `\` so user text can be used inside a LIKE pattern.
pub fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Prefix test used by stores that filter in memory. Mirrors `ILIKE 'prefix%'`.
pub fn name_has_prefix(name: &str, prefix: &str) -> bool {
    name.to_lowercase().starts_with(&prefix.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("salt"), "salt");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("a_b\\c"), "a\\_b\\\\c");
    }

    #[test]
    fn test_name_has_prefix() {
        assert!(name_has_prefix("Sugar", "su"));
        assert!(name_has_prefix("sugar", "SUG"));
        assert!(!name_has_prefix("brown sugar", "sug"));
        assert!(name_has_prefix("anything", ""));
    }
}
