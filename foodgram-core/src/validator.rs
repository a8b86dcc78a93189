//! Validation of recipe create/update requests.
//!
//! All request-shape checks run first; only a request that is well formed
//! reaches the catalog, with one batch lookup for tags and one for
//! ingredients.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;

use crate::catalog::CatalogStore;
use crate::error::DomainError;
use crate::types::{
    IngredientId, RecipeFieldChanges, RecipeFields, ResolvedIngredient, Tag, TagId, UserId,
};

pub const RECIPE_NAME_MAX_CHARS: usize = 200;

const MIN_POSITIVE: i64 = 1;
const MAX_POSITIVE: i64 = i32::MAX as i64;

/// Recipe body as sent by the client. Used for both create and update.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RecipeInput {
    /// Tag ids
    #[serde(default)]
    #[schema(value_type = Option<Vec<i32>>)]
    pub tags: Option<Vec<Value>>,
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientInput>>,
    #[serde(default)]
    pub name: Option<String>,
    /// Image reference (for example a data URI)
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    /// Minutes, at least 1
    #[serde(default)]
    #[schema(value_type = Option<i32>)]
    pub cooking_time: Option<Value>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngredientInput {
    #[serde(default)]
    #[schema(value_type = i32)]
    pub id: Value,
    /// Integer or numeric string, at least 1
    #[serde(default)]
    #[schema(value_type = i32)]
    pub amount: Value,
}

/// A create request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRecipe {
    pub author: UserId,
    pub fields: RecipeFields,
    /// In request order
    pub tags: Vec<Tag>,
    /// In request order, ids unique
    pub ingredients: Vec<ResolvedIngredient>,
}

/// An update request that passed validation. `None` means "leave as is".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidatedChanges {
    pub fields: RecipeFieldChanges,
    pub tags: Option<Vec<Tag>>,
    pub ingredients: Option<Vec<ResolvedIngredient>>,
}

impl ValidatedChanges {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.tags.is_none() && self.ingredients.is_none()
    }
}

pub fn validate_create<C>(
    catalog: &C,
    author: UserId,
    input: RecipeInput,
) -> Result<ValidatedRecipe, DomainError>
where
    C: CatalogStore + ?Sized,
{
    let name = check_name(input.name.as_deref())?;
    let image = check_image(input.image.as_deref())?;
    let text = check_text(input.text.as_deref())?;
    let cooking_time = match &input.cooking_time {
        Some(value) => parse_positive("cooking_time", value, true)?,
        None => {
            return Err(DomainError::MissingField {
                field: "cooking_time",
            })
        }
    };

    let tag_ids = check_tag_ids(input.tags.as_deref())?;
    let entries = check_ingredient_entries(input.ingredients.as_deref())?;

    let tags = resolve_tags(catalog, &tag_ids)?;
    let ingredients = resolve_ingredients(catalog, &entries)?;

    Ok(ValidatedRecipe {
        author,
        fields: RecipeFields {
            name,
            image,
            text,
            cooking_time,
        },
        tags,
        ingredients,
    })
}

/// Absent fields stay unchanged. A present but empty tag or ingredient list is
/// rejected, since a recipe must always keep at least one of each.
pub fn validate_update<C>(catalog: &C, input: RecipeInput) -> Result<ValidatedChanges, DomainError>
where
    C: CatalogStore + ?Sized,
{
    let mut fields = RecipeFieldChanges::default();
    if input.name.is_some() {
        fields.name = Some(check_name(input.name.as_deref())?);
    }
    if input.image.is_some() {
        fields.image = Some(check_image(input.image.as_deref())?);
    }
    if input.text.is_some() {
        fields.text = Some(check_text(input.text.as_deref())?);
    }
    if let Some(value) = &input.cooking_time {
        fields.cooking_time = Some(parse_positive("cooking_time", value, true)?);
    }

    let tag_ids = match input.tags.as_deref() {
        Some(raw) => Some(check_tag_ids(Some(raw))?),
        None => None,
    };
    let entries = match input.ingredients.as_deref() {
        Some(raw) => Some(check_ingredient_entries(Some(raw))?),
        None => None,
    };

    let tags = match tag_ids {
        Some(ids) => Some(resolve_tags(catalog, &ids)?),
        None => None,
    };
    let ingredients = match entries {
        Some(entries) => Some(resolve_ingredients(catalog, &entries)?),
        None => None,
    };

    Ok(ValidatedChanges {
        fields,
        tags,
        ingredients,
    })
}

fn check_name(name: Option<&str>) -> Result<String, DomainError> {
    let name = name.map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(DomainError::MissingField { field: "name" });
    }
    let chars = name.chars().count();
    if chars > RECIPE_NAME_MAX_CHARS {
        return Err(DomainError::OutOfRange {
            field: "name",
            value: chars as i64,
            min: 1,
            max: RECIPE_NAME_MAX_CHARS as i64,
        });
    }
    Ok(name.to_string())
}

fn check_image(image: Option<&str>) -> Result<String, DomainError> {
    match image.map(str::trim) {
        Some(image) if !image.is_empty() => Ok(image.to_string()),
        _ => Err(DomainError::MissingField { field: "image" }),
    }
}

fn check_text(text: Option<&str>) -> Result<String, DomainError> {
    match text {
        Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
        _ => Err(DomainError::MissingField { field: "text" }),
    }
}

/// Checks presence, integer type and uniqueness of the tag ids.
fn check_tag_ids(raw: Option<&[Value]>) -> Result<Vec<TagId>, DomainError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(DomainError::MissingField { field: "tags" }),
    };

    let mut seen = HashSet::with_capacity(raw.len());
    let mut ids = Vec::with_capacity(raw.len());
    for value in raw {
        let id = parse_positive("tags", value, false)?;
        if !seen.insert(id) {
            return Err(DomainError::DuplicateValue {
                field: "tags",
                value: id.to_string(),
            });
        }
        ids.push(id);
    }
    Ok(ids)
}

/// Checks each `{id, amount}` entry and rejects repeated ingredient ids.
fn check_ingredient_entries(
    raw: Option<&[IngredientInput]>,
) -> Result<Vec<(IngredientId, i32)>, DomainError> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(DomainError::MissingField {
            field: "ingredients",
        }),
    };

    let mut amounts: HashMap<IngredientId, i32> = HashMap::with_capacity(raw.len());
    let mut entries = Vec::with_capacity(raw.len());
    for entry in raw {
        let amount = parse_positive("amount", &entry.amount, true)?;
        let id = parse_positive("ingredients", &entry.id, false)?;
        if amounts.insert(id, amount).is_some() {
            return Err(DomainError::DuplicateValue {
                field: "ingredients",
                value: id.to_string(),
            });
        }
        entries.push((id, amount));
    }
    Ok(entries)
}

fn resolve_tags<C>(catalog: &C, ids: &[TagId]) -> Result<Vec<Tag>, DomainError>
where
    C: CatalogStore + ?Sized,
{
    let mut found: HashMap<TagId, Tag> = catalog
        .tags_by_ids(ids)?
        .into_iter()
        .map(|tag| (tag.id, tag))
        .collect();

    let unknown: Vec<TagId> = ids
        .iter()
        .copied()
        .filter(|id| !found.contains_key(id))
        .collect();
    if !unknown.is_empty() {
        tracing::debug!(?unknown, "recipe references unknown tags");
        return Err(DomainError::UnknownReference {
            field: "tags",
            ids: unknown,
        });
    }

    Ok(ids.iter().filter_map(|id| found.remove(id)).collect())
}

fn resolve_ingredients<C>(
    catalog: &C,
    entries: &[(IngredientId, i32)],
) -> Result<Vec<ResolvedIngredient>, DomainError>
where
    C: CatalogStore + ?Sized,
{
    let ids: Vec<IngredientId> = entries.iter().map(|(id, _)| *id).collect();
    let mut found: HashMap<IngredientId, _> = catalog
        .ingredients_by_ids(&ids)?
        .into_iter()
        .map(|ingredient| (ingredient.id, ingredient))
        .collect();

    let unknown: Vec<IngredientId> = ids
        .iter()
        .copied()
        .filter(|id| !found.contains_key(id))
        .collect();
    if !unknown.is_empty() {
        tracing::debug!(?unknown, "recipe references unknown ingredients");
        return Err(DomainError::UnknownReference {
            field: "ingredients",
            ids: unknown,
        });
    }

    Ok(entries
        .iter()
        .filter_map(|(id, amount)| {
            found.remove(id).map(|ingredient| ResolvedIngredient {
                ingredient,
                amount: *amount,
            })
        })
        .collect())
}

/// Parse an integer in `1..=i32::MAX`.
///
/// JSON integers are always accepted; numeric strings only when `allow_string`.
fn parse_positive(field: &'static str, value: &Value, allow_string: bool) -> Result<i32, DomainError> {
    let parsed = match value {
        Value::Number(number) => number
            .as_i64()
            .ok_or_else(|| DomainError::invalid_format(field, "must be an integer"))?,
        Value::String(text) if allow_string => text
            .trim()
            .parse::<i64>()
            .map_err(|_| DomainError::invalid_format(field, "must be an integer"))?,
        Value::Null => return Err(DomainError::MissingField { field }),
        _ => return Err(DomainError::invalid_format(field, "must be an integer")),
    };

    if !(MIN_POSITIVE..=MAX_POSITIVE).contains(&parsed) {
        return Err(DomainError::OutOfRange {
            field,
            value: parsed,
            min: MIN_POSITIVE,
            max: MAX_POSITIVE,
        });
    }
    Ok(parsed as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_positive_accepts_integers_and_numeric_strings() {
        assert_eq!(parse_positive("amount", &json!(3), true), Ok(3));
        assert_eq!(parse_positive("amount", &json!(" 12 "), true), Ok(12));
        assert_eq!(
            parse_positive("amount", &json!(i32::MAX), true),
            Ok(i32::MAX)
        );
    }

    #[test]
    fn test_parse_positive_rejects_bad_format() {
        for value in [json!("two"), json!(2.5), json!(true), json!([1])] {
            assert!(matches!(
                parse_positive("amount", &value, true),
                Err(DomainError::InvalidFormat { field: "amount", .. })
            ));
        }
        // strict mode refuses strings
        assert!(matches!(
            parse_positive("ingredients", &json!("4"), false),
            Err(DomainError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_parse_positive_range() {
        assert!(matches!(
            parse_positive("amount", &json!(0), true),
            Err(DomainError::OutOfRange { value: 0, .. })
        ));
        assert!(matches!(
            parse_positive("amount", &json!("-3"), true),
            Err(DomainError::OutOfRange { value: -3, .. })
        ));
        assert!(matches!(
            parse_positive("amount", &json!(i32::MAX as i64 + 1), true),
            Err(DomainError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_check_tag_ids() {
        assert_eq!(
            check_tag_ids(None),
            Err(DomainError::MissingField { field: "tags" })
        );
        assert_eq!(
            check_tag_ids(Some(&[])),
            Err(DomainError::MissingField { field: "tags" })
        );
        assert_eq!(
            check_tag_ids(Some(&[json!(2), json!(1), json!(2)])),
            Err(DomainError::DuplicateValue {
                field: "tags",
                value: "2".to_string()
            })
        );
        assert_eq!(check_tag_ids(Some(&[json!(2), json!(1)])), Ok(vec![2, 1]));
    }

    #[test]
    fn test_check_name() {
        assert_eq!(check_name(Some("  Borscht ")), Ok("Borscht".to_string()));
        assert_eq!(
            check_name(Some("   ")),
            Err(DomainError::MissingField { field: "name" })
        );
        let long = "x".repeat(RECIPE_NAME_MAX_CHARS + 1);
        assert!(matches!(
            check_name(Some(&long)),
            Err(DomainError::OutOfRange { field: "name", .. })
        ));
    }

    #[test]
    fn test_entry_checks_run_in_order() {
        // A bad amount is reported before a bad id in the same entry
        let entries = vec![IngredientInput {
            id: json!("x"),
            amount: json!(0),
        }];
        assert!(matches!(
            check_ingredient_entries(Some(&entries)),
            Err(DomainError::OutOfRange { field: "amount", .. })
        ));
    }
}
