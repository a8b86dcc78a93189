//! Golden file tests for recipe validation.
//!
//! Each JSON file in `fixtures/validation/` holds a request body and either
//! `null` (the body is valid) or the field and kind of the expected error.

use foodgram_core::{validate_create, DomainError, Ingredient, MemoryStore, RecipeInput, Tag};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct TestCase {
    description: String,
    input: RecipeInput,
    expected: Option<ExpectedError>,
}

#[derive(Debug, Deserialize)]
struct ExpectedError {
    field: String,
    kind: String,
}

fn kind(err: &DomainError) -> &'static str {
    match err {
        DomainError::MissingField { .. } => "missing_field",
        DomainError::DuplicateValue { .. } => "duplicate_value",
        DomainError::UnknownReference { .. } => "unknown_reference",
        DomainError::InvalidFormat { .. } => "invalid_format",
        DomainError::OutOfRange { .. } => "out_of_range",
        DomainError::Conflict { .. } => "conflict",
        DomainError::SelfReference => "self_reference",
        DomainError::NotFound { .. } => "not_found",
        DomainError::EmptyState { .. } => "empty_state",
        DomainError::Storage(_) => "storage",
    }
}

fn catalog() -> MemoryStore {
    let store = MemoryStore::new();
    for (id, name) in [(1, "breakfast"), (2, "lunch")] {
        store.add_tag(Tag {
            id,
            name: name.to_string(),
            color: "#FFAA00".to_string(),
            slug: name.to_string(),
        });
    }
    for (id, name, unit) in [(1, "bread", "g"), (2, "lettuce", "g"), (3, "eggs", "pcs")] {
        store.add_ingredient(Ingredient {
            id,
            name: name.to_string(),
            measurement_unit: unit.to_string(),
        });
    }
    store
}

fn load_test_cases() -> Vec<(String, TestCase)> {
    let fixtures_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/validation");

    let mut cases = Vec::new();
    for entry in fs::read_dir(&fixtures_dir).expect("Failed to read fixtures directory") {
        let path = entry.expect("Failed to read directory entry").path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            let name = path.file_stem().unwrap().to_string_lossy().into_owned();
            let content = fs::read_to_string(&path)
                .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
            let case: TestCase = serde_json::from_str(&content)
                .unwrap_or_else(|e| panic!("Failed to parse {}: {}", path.display(), e));
            cases.push((name, case));
        }
    }

    assert!(!cases.is_empty(), "No validation fixtures in {:?}", fixtures_dir);
    cases.sort_by(|a, b| a.0.cmp(&b.0));
    cases
}

#[test]
fn test_validation_golden_files() {
    let store = catalog();

    for (name, case) in load_test_cases() {
        println!("Testing: {} ({})", name, case.description);
        let result = validate_create(&store, 1, case.input);

        match (result, case.expected) {
            (Ok(_), None) => {}
            (Ok(validated), Some(expected)) => panic!(
                "{}: expected {} on {}, got {:?}",
                name, expected.kind, expected.field, validated
            ),
            (Err(err), None) => panic!("{}: expected success, got {:?}", name, err),
            (Err(err), Some(expected)) => {
                assert_eq!(err.field(), expected.field, "Field mismatch for {}", name);
                assert_eq!(kind(&err), expected.kind, "Kind mismatch for {}", name);
            }
        }
    }
}

#[test]
fn test_valid_fixture_is_normalized() {
    let content = fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/validation/valid_numeric_strings.json"),
    )
    .unwrap();
    let case: TestCase = serde_json::from_str(&content).unwrap();

    let validated = validate_create(&catalog(), 1, case.input).unwrap();
    assert_eq!(validated.fields.name, "Omelette");
    assert_eq!(validated.fields.cooking_time, 7);
    let ingredients: Vec<(&str, i32)> = validated
        .ingredients
        .iter()
        .map(|i| (i.ingredient.name.as_str(), i.amount))
        .collect();
    assert_eq!(ingredients, vec![("eggs", 2), ("lettuce", 50)]);
}
