/// Schema validation for untrusted product data
///
/// Everything that crosses into the comparison controller passes through
/// here first: the bundled catalog, persisted comparison lists, search input
/// and the brand selector. Every check fails fast with the first violated
/// rule and reports which field failed.

use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use url::Url;

use super::data::{Product, MAX_COMPARISON_PRODUCTS};

/// Maximum length of a sanitized search term (in characters)
pub const MAX_SEARCH_LENGTH: usize = 100;

/// Characters stripped from search input before it is used
const STRIPPED_SEARCH_CHARS: [char; 8] = ['<', '>', '"', '\'', ';', '&', '(', ')'];

/// Product fields, in the order they are validated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductField {
    Id,
    Name,
    Brand,
    Image,
    Price,
    Features,
    Specs,
}

impl ProductField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductField::Id => "id",
            ProductField::Name => "name",
            ProductField::Brand => "brand",
            ProductField::Image => "image",
            ProductField::Price => "price",
            ProductField::Features => "features",
            ProductField::Specs => "specs",
        }
    }
}

impl fmt::Display for ProductField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A value failed structural validation.
///
/// Recoverable: callers turn it into a warning or error notification.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("Product must be an object")]
    NotAnObject,

    #[error("{reason}")]
    InvalidField {
        field: ProductField,
        reason: &'static str,
    },

    #[error("Comparison list must be an array")]
    NotAList,

    #[error("Cannot compare more than {max} products")]
    TooManyProducts { max: usize, found: usize },

    #[error("Duplicate products in comparison list")]
    DuplicateProduct { id: String },

    #[error("Search term is too long (maximum {max} characters)")]
    SearchTermTooLong { max: usize },

    #[error("Selected brand is not available")]
    UnknownBrand { brand: String },
}

impl SchemaError {
    /// The product field that failed, when the error concerns one
    pub fn field(&self) -> Option<ProductField> {
        match self {
            SchemaError::InvalidField { field, .. } => Some(*field),
            SchemaError::DuplicateProduct { .. } => Some(ProductField::Id),
            _ => None,
        }
    }

    fn invalid(field: ProductField, reason: &'static str) -> Self {
        SchemaError::InvalidField { field, reason }
    }
}

/// Persisted text could not be parsed as JSON
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid JSON data in storage: {reason}")]
pub struct ParseError {
    pub reason: String,
}

const ID_REASON: &str = "Product ID must be a positive number";
const NAME_REASON: &str = "Product name is required and must be a non-empty string";
const BRAND_REASON: &str = "Product brand is required and must be a non-empty string";
const IMAGE_REASON: &str = "Product image must be a valid URL";
const PRICE_REASON: &str = "Product price must be a non-negative number";
const FEATURES_REASON: &str = "Product features must be a non-empty array";
const FEATURE_ITEM_REASON: &str = "All product features must be non-empty strings";
const SPECS_REASON: &str = "Product specs must be an object";

/// Validate an untyped candidate against the product schema.
///
/// Checks run in field order and stop at the first failure. The candidate
/// is never modified; the returned product carries the same values.
pub fn validate_product(candidate: &Value) -> Result<Product, SchemaError> {
    let object = candidate.as_object().ok_or(SchemaError::NotAnObject)?;

    let id = object
        .get("id")
        .and_then(positive_integer)
        .ok_or(SchemaError::invalid(ProductField::Id, ID_REASON))?;

    let name = object.get("name").and_then(Value::as_str).unwrap_or_default();
    check_text(ProductField::Name, name, NAME_REASON)?;

    let brand = object.get("brand").and_then(Value::as_str).unwrap_or_default();
    check_text(ProductField::Brand, brand, BRAND_REASON)?;

    let image = object.get("image").and_then(Value::as_str).unwrap_or_default();
    check_image(image)?;

    let price = object
        .get("price")
        .and_then(Value::as_f64)
        .ok_or(SchemaError::invalid(ProductField::Price, PRICE_REASON))?;
    check_price(price)?;

    let features = match object.get("features").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => items,
        _ => return Err(SchemaError::invalid(ProductField::Features, FEATURES_REASON)),
    };
    let features = features
        .iter()
        .map(|item| match item.as_str() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            _ => Err(SchemaError::invalid(ProductField::Features, FEATURE_ITEM_REASON)),
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Presence only; individual spec entries are not validated
    let specs = object
        .get("specs")
        .and_then(Value::as_object)
        .ok_or(SchemaError::invalid(ProductField::Specs, SPECS_REASON))?
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect::<BTreeMap<_, _>>();

    Ok(Product {
        id,
        name: name.to_string(),
        brand: brand.to_string(),
        image: image.to_string(),
        price,
        features,
        specs,
    })
}

/// Re-check an already typed product.
///
/// Typed products can still carry empty names or bad URLs if they were
/// built by hand, so the controller runs this before accepting one.
pub fn check_product(product: &Product) -> Result<(), SchemaError> {
    check_product_id(product.id)?;
    check_text(ProductField::Name, &product.name, NAME_REASON)?;
    check_text(ProductField::Brand, &product.brand, BRAND_REASON)?;
    check_image(&product.image)?;
    check_price(product.price)?;

    if product.features.is_empty() {
        return Err(SchemaError::invalid(ProductField::Features, FEATURES_REASON));
    }
    if product.features.iter().any(|f| f.trim().is_empty()) {
        return Err(SchemaError::invalid(ProductField::Features, FEATURE_ITEM_REASON));
    }

    Ok(())
}

/// Validate an untyped comparison list.
///
/// Order: array-ness, size bound, then each element in turn (duplicate id
/// first, then the product schema).
pub fn validate_comparison_list(candidate: &Value) -> Result<Vec<Product>, SchemaError> {
    let items = candidate.as_array().ok_or(SchemaError::NotAList)?;

    if items.len() > MAX_COMPARISON_PRODUCTS {
        return Err(SchemaError::TooManyProducts {
            max: MAX_COMPARISON_PRODUCTS,
            found: items.len(),
        });
    }

    // Ids are compared after normalizing, so 1 and 1.0 collide
    let mut seen = HashSet::with_capacity(items.len());
    let mut products = Vec::with_capacity(items.len());
    for item in items {
        if let Some(id) = item.get("id").and_then(positive_integer) {
            if !seen.insert(id) {
                return Err(SchemaError::DuplicateProduct { id: id.to_string() });
            }
        }
        products.push(validate_product(item)?);
    }

    Ok(products)
}

/// Typed counterpart of [`validate_comparison_list`]
pub fn validate_selection(products: &[Product]) -> Result<(), SchemaError> {
    if products.len() > MAX_COMPARISON_PRODUCTS {
        return Err(SchemaError::TooManyProducts {
            max: MAX_COMPARISON_PRODUCTS,
            found: products.len(),
        });
    }

    let mut seen = Vec::with_capacity(products.len());
    for product in products {
        if seen.contains(&product.id) {
            return Err(SchemaError::DuplicateProduct {
                id: product.id.to_string(),
            });
        }
        seen.push(product.id);
        check_product(product)?;
    }

    Ok(())
}

/// Strip markup-ish characters and surrounding whitespace from free-text
/// search input.
///
/// The length limit applies to the sanitized result, not the raw input.
pub fn validate_search_term(raw: &str) -> Result<String, SchemaError> {
    let stripped: String = raw
        .chars()
        .filter(|c| !STRIPPED_SEARCH_CHARS.contains(c))
        .collect();
    let sanitized = stripped.trim();

    if sanitized.chars().count() > MAX_SEARCH_LENGTH {
        return Err(SchemaError::SearchTermTooLong {
            max: MAX_SEARCH_LENGTH,
        });
    }

    Ok(sanitized.to_string())
}

/// Validate a brand selection. The empty string means "no filter".
pub fn validate_brand(raw: &str, available_brands: &[String]) -> Result<String, SchemaError> {
    let sanitized = raw.trim();

    if !sanitized.is_empty() && !available_brands.iter().any(|brand| brand == sanitized) {
        return Err(SchemaError::UnknownBrand {
            brand: sanitized.to_string(),
        });
    }

    Ok(sanitized.to_string())
}

/// Parse persisted text. Syntax only; schema checks are up to the caller.
pub fn sanitize_local_storage_data(raw: &str) -> Result<Value, ParseError> {
    serde_json::from_str(raw).map_err(|e| ParseError {
        reason: e.to_string(),
    })
}

/// Reject the zero id (ids are positive)
pub fn check_product_id(id: u64) -> Result<(), SchemaError> {
    if id == 0 {
        return Err(SchemaError::invalid(ProductField::Id, ID_REASON));
    }
    Ok(())
}

fn positive_integer(value: &Value) -> Option<u64> {
    if let Some(id) = value.as_u64() {
        return (id > 0).then_some(id);
    }

    // Integral floats such as 3.0 are accepted; fractions are not
    let id = value.as_f64()?;
    (id > 0.0 && id.fract() == 0.0 && id <= u64::MAX as f64).then_some(id as u64)
}

fn check_text(field: ProductField, value: &str, reason: &'static str) -> Result<(), SchemaError> {
    if value.trim().is_empty() {
        return Err(SchemaError::invalid(field, reason));
    }
    Ok(())
}

fn check_image(image: &str) -> Result<(), SchemaError> {
    if image.is_empty() || Url::parse(image).is_err() {
        return Err(SchemaError::invalid(ProductField::Image, IMAGE_REASON));
    }
    Ok(())
}

fn check_price(price: f64) -> Result<(), SchemaError> {
    if !price.is_finite() || price < 0.0 {
        return Err(SchemaError::invalid(ProductField::Price, PRICE_REASON));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::data::fixtures::{arb_product, arb_product_value, product, product_json};
    use proptest::prelude::*;
    use serde_json::json;

    fn field_of(result: Result<Product, SchemaError>) -> Option<ProductField> {
        result.unwrap_err().field()
    }

    #[test]
    fn test_valid_product_round_trips_unchanged() {
        let candidate = product_json(1, "Alpha", "X");
        let before = candidate.clone();

        let validated = validate_product(&candidate).unwrap();

        assert_eq!(validated, product(1, "Alpha", "X"));
        assert_eq!(candidate, before);
    }

    #[test]
    fn test_non_object_rejected() {
        assert_eq!(validate_product(&json!(null)), Err(SchemaError::NotAnObject));
        assert_eq!(validate_product(&json!([1, 2])), Err(SchemaError::NotAnObject));
        assert_eq!(validate_product(&json!("phone")), Err(SchemaError::NotAnObject));
    }

    #[test]
    fn test_each_field_is_named_on_failure() {
        let cases: Vec<(&str, Value, ProductField)> = vec![
            ("id", json!(0), ProductField::Id),
            ("id", json!(-4), ProductField::Id),
            ("id", json!("1"), ProductField::Id),
            ("id", json!(1.5), ProductField::Id),
            ("name", json!("   "), ProductField::Name),
            ("name", json!(42), ProductField::Name),
            ("brand", json!(""), ProductField::Brand),
            ("image", json!("not a url"), ProductField::Image),
            ("image", json!(""), ProductField::Image),
            ("price", json!(-0.01), ProductField::Price),
            ("price", json!("999"), ProductField::Price),
            ("features", json!([]), ProductField::Features),
            ("features", json!(["ok", " "]), ProductField::Features),
            ("features", json!(["ok", 3]), ProductField::Features),
            ("features", json!("ok"), ProductField::Features),
            ("specs", json!(null), ProductField::Specs),
            ("specs", json!("storage"), ProductField::Specs),
        ];

        for (key, bad, expected) in cases {
            let mut candidate = product_json(1, "Alpha", "X");
            candidate[key] = bad.clone();
            assert_eq!(
                field_of(validate_product(&candidate)),
                Some(expected),
                "{} = {}",
                key,
                bad
            );
        }
    }

    #[test]
    fn test_missing_fields_are_named() {
        for field in ["id", "name", "brand", "image", "price", "features", "specs"] {
            let mut candidate = product_json(1, "Alpha", "X");
            candidate.as_object_mut().unwrap().remove(field);
            let failed = field_of(validate_product(&candidate)).unwrap();
            assert_eq!(failed.as_str(), field);
        }
    }

    #[test]
    fn test_first_failure_wins() {
        let mut candidate = product_json(1, "Alpha", "X");
        candidate["name"] = json!("");
        candidate["price"] = json!(-1);

        assert_eq!(field_of(validate_product(&candidate)), Some(ProductField::Name));
    }

    #[test]
    fn test_integral_float_id_accepted() {
        let mut candidate = product_json(1, "Alpha", "X");
        candidate["id"] = json!(3.0);

        assert_eq!(validate_product(&candidate).unwrap().id, 3);
    }

    #[test]
    fn test_non_string_spec_values_are_kept() {
        let mut candidate = product_json(1, "Alpha", "X");
        candidate["specs"] = json!({ "ports": 2, "storage": "1TB" });

        let validated = validate_product(&candidate).unwrap();
        assert_eq!(validated.spec("ports"), Some("2"));
        assert_eq!(validated.spec("storage"), Some("1TB"));
    }

    #[test]
    fn test_check_product_matches_untyped_rules() {
        assert!(check_product(&product(1, "Alpha", "X")).is_ok());

        let mut p = product(1, "Alpha", "X");
        p.name = " ".to_string();
        assert_eq!(check_product(&p).unwrap_err().field(), Some(ProductField::Name));

        let mut p = product(1, "Alpha", "X");
        p.image = "relative/path.png".to_string();
        assert_eq!(check_product(&p).unwrap_err().field(), Some(ProductField::Image));

        let mut p = product(1, "Alpha", "X");
        p.price = f64::NAN;
        assert_eq!(check_product(&p).unwrap_err().field(), Some(ProductField::Price));

        let mut p = product(0, "Alpha", "X");
        p.features.clear();
        assert_eq!(check_product(&p).unwrap_err().field(), Some(ProductField::Id));
    }

    #[test]
    fn test_comparison_list_accepts_up_to_three() {
        let list = json!([
            product_json(1, "A", "X"),
            product_json(2, "B", "X"),
            product_json(3, "C", "Y"),
        ]);

        let products = validate_comparison_list(&list).unwrap();
        assert_eq!(products.len(), 3);
        assert!(validate_comparison_list(&json!([])).unwrap().is_empty());
    }

    #[test]
    fn test_comparison_list_rejections() {
        assert_eq!(
            validate_comparison_list(&json!({"id": 1})),
            Err(SchemaError::NotAList)
        );

        let four = json!([
            product_json(1, "A", "X"),
            product_json(2, "B", "X"),
            product_json(3, "C", "X"),
            product_json(4, "D", "X"),
        ]);
        assert_eq!(
            validate_comparison_list(&four),
            Err(SchemaError::TooManyProducts { max: 3, found: 4 })
        );

        let duplicate = json!([product_json(1, "A", "X"), product_json(1, "A", "X")]);
        assert!(matches!(
            validate_comparison_list(&duplicate),
            Err(SchemaError::DuplicateProduct { .. })
        ));

        let mut broken = product_json(2, "B", "X");
        broken["name"] = json!("");
        let invalid_member = json!([product_json(1, "A", "X"), broken]);
        assert_eq!(
            validate_comparison_list(&invalid_member).unwrap_err().field(),
            Some(ProductField::Name)
        );
    }

    #[test]
    fn test_duplicate_ids_compared_after_normalizing() {
        let mut again = product_json(1, "Alpha", "X");
        again["id"] = json!(1.0);
        let list = json!([product_json(1, "Alpha", "X"), again]);

        assert_eq!(
            validate_comparison_list(&list),
            Err(SchemaError::DuplicateProduct {
                id: "1".to_string()
            })
        );
    }

    #[test]
    fn test_size_bound_checked_before_members() {
        let mut broken = product_json(1, "A", "X");
        broken["price"] = json!(-1);
        let list = json!([broken.clone(), broken.clone(), broken.clone(), broken]);

        assert!(matches!(
            validate_comparison_list(&list),
            Err(SchemaError::TooManyProducts { .. })
        ));
    }

    #[test]
    fn test_search_term_sanitization() {
        assert_eq!(validate_search_term("<script>").unwrap(), "script");
        assert_eq!(validate_search_term("  pixel (8) ; pro  ").unwrap(), "pixel 8  pro");
        assert_eq!(validate_search_term("\"'&").unwrap(), "");
    }

    #[test]
    fn test_search_term_length_measured_after_sanitizing() {
        let padded = format!("{}{}", "<>".repeat(50), "a".repeat(100));
        assert_eq!(validate_search_term(&padded).unwrap().len(), 100);

        let too_long = "a".repeat(101);
        assert_eq!(
            validate_search_term(&too_long),
            Err(SchemaError::SearchTermTooLong { max: 100 })
        );

    }

    #[test]
    fn test_brand_validation() {
        let brands = vec!["Apple".to_string(), "Google".to_string()];

        assert_eq!(validate_brand("", &brands).unwrap(), "");
        assert_eq!(validate_brand("  Apple ", &brands).unwrap(), "Apple");
        assert_eq!(
            validate_brand("Nokia", &brands),
            Err(SchemaError::UnknownBrand {
                brand: "Nokia".to_string()
            })
        );
        assert!(validate_brand("apple", &brands).is_err());
    }

    #[test]
    fn test_sanitize_storage_data() {
        assert_eq!(sanitize_local_storage_data("true").unwrap(), json!(true));
        assert_eq!(sanitize_local_storage_data("[1,2]").unwrap(), json!([1, 2]));
        assert!(sanitize_local_storage_data("{not json").is_err());
        assert!(sanitize_local_storage_data("").is_err());
    }

    #[test]
    fn test_error_messages_are_user_facing() {
        let mut candidate = product_json(1, "Alpha", "X");
        candidate["image"] = json!("nope");

        let err = validate_product(&candidate).unwrap_err();
        assert_eq!(err.to_string(), "Product image must be a valid URL");
        assert_eq!(
            SchemaError::TooManyProducts { max: 3, found: 4 }.to_string(),
            "Cannot compare more than 3 products"
        );
    }

    proptest! {
        #[test]
        fn test_valid_products_validate_unchanged(p in arb_product()) {
            let candidate = serde_json::to_value(&p).unwrap();
            prop_assert_eq!(validate_product(&candidate), Ok(p));
        }

        #[test]
        fn test_broken_field_is_the_one_reported((candidate, _, broken) in arb_product_value()) {
            let result = validate_product(&candidate);
            match broken {
                Some(field) => prop_assert_eq!(result.unwrap_err().field(), Some(field)),
                None => prop_assert!(result.is_ok()),
            }
        }

        #[test]
        fn test_comparison_list_fails_iff_rule_broken(
            members in prop::collection::vec(arb_product_value(), 0..5)
        ) {
            let mut ids: Vec<u64> = members.iter().map(|(_, p, _)| p.id).collect();
            ids.sort_unstable();
            ids.dedup();
            let has_duplicate = ids.len() != members.len();
            let has_invalid = members.iter().any(|(_, _, broken)| broken.is_some());
            let should_fail = members.len() > MAX_COMPARISON_PRODUCTS || has_duplicate || has_invalid;

            let list = Value::Array(members.iter().map(|(v, _, _)| v.clone()).collect());
            let result = validate_comparison_list(&list);
            prop_assert_eq!(result.is_err(), should_fail);

            if members.len() > MAX_COMPARISON_PRODUCTS {
                let is_size_error = matches!(result, Err(SchemaError::TooManyProducts { .. }));
                prop_assert!(is_size_error);
            }

            // The typed twin agrees whenever every member is well formed
            if !has_invalid {
                let typed: Vec<Product> = members.iter().map(|(_, p, _)| p.clone()).collect();
                prop_assert_eq!(validate_selection(&typed).is_err(), should_fail);
            }
        }
    }
}
