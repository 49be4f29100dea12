use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Fields in the order their violations are reported.
const FIELD_ORDER: [&str; 3] = ["title", "description", "price"];

/// Decimal places the `price` column keeps.
pub const PRICE_SCALE: u32 = 2;

fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    if price.is_zero() {
        return Err(ValidationError::new("required"));
    }
    if price.is_sign_negative() {
        return Err(ValidationError::new("gt"));
    }
    // Finer values would be rounded by the column, possibly down to zero
    if price.normalize().scale() > PRICE_SCALE {
        return Err(ValidationError::new("decimals"));
    }
    Ok(())
}

/// Accept only JSON numbers. `null` reads as zero so it fails validation
/// instead of decoding.
fn price_from_number<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(Decimal::ZERO);
    };

    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(serde::de::Error::custom)
}

/// Product entity as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Product {
    /// Unique identifier, assigned on creation
    pub id: i64,
    pub title: String,
    pub description: String,
    /// Unit price, strictly positive
    #[serde(with = "rust_decimal::serde::float")]
    #[schema(value_type = f64, example = 1093.45)]
    pub price: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set once the product is soft-deleted
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Request body for creating or updating a product.
///
/// Missing fields decode to their zero value so that they surface as
/// validation errors rather than decode errors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
#[serde(default)]
pub struct ProductInput {
    #[validate(length(min = 1, code = "required"))]
    #[schema(example = "Charmander")]
    pub title: String,
    #[validate(length(min = 1, code = "required"))]
    pub description: String,
    #[validate(custom(function = "validate_price"))]
    #[serde(
        serialize_with = "rust_decimal::serde::float::serialize",
        deserialize_with = "price_from_number"
    )]
    #[schema(value_type = f64, example = 1093.45)]
    pub price: Decimal,
}

/// A single failed validation rule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Field name as exposed on the `Product` struct, e.g. `Title`
    pub field: String,
    /// Rule that failed: `required` or `gt`
    pub rule: String,
}

impl FieldError {
    pub fn new(field: &str, rule: &str) -> Self {
        let mut chars = field.chars();
        let field = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };

        Self {
            field,
            rule: rule.to_string(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Key: 'Product.{field}' Error:Field validation for '{field}' failed on the '{rule}' tag",
            field = self.field,
            rule = self.rule
        )
    }
}

/// Render violations one per line, in field declaration order.
pub fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Check `input` against the product rules. An empty result means valid.
pub fn validate(input: &ProductInput) -> Vec<FieldError> {
    let Err(errors) = input.validate() else {
        return Vec::new();
    };
    let by_field = errors.field_errors();

    FIELD_ORDER
        .iter()
        .filter_map(|field| by_field.get(*field).map(|errs| (*field, errs)))
        .flat_map(|(field, errs)| errs.iter().map(move |e| FieldError::new(field, &e.code)))
        .collect()
}

/// Next `updated_at` value: now, but never at or before `previous`.
pub fn touch(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = Utc::now();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

impl Product {
    /// Overlay the supplied fields of `input`. Empty strings and a zero price
    /// count as not supplied.
    pub fn apply_update(&mut self, input: ProductInput) {
        if !input.title.is_empty() {
            self.title = input.title;
        }
        if !input.description.is_empty() {
            self.description = input.description;
        }
        if !input.price.is_zero() {
            self.price = input.price;
        }
    }
}

impl From<&Product> for ProductInput {
    fn from(product: &Product) -> Self {
        Self {
            title: product.title.clone(),
            description: product.description.clone(),
            price: product.price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charmander() -> ProductInput {
        ProductInput {
            title: "Charmander".to_string(),
            description: "It has a preference for hot things.".to_string(),
            price: Decimal::new(109345, 2),
        }
    }

    fn stored() -> Product {
        let now = Utc::now();
        Product {
            id: 7,
            title: "Bulbasaur".to_string(),
            description: "There is a plant seed on its back.".to_string(),
            price: Decimal::new(9999, 2),
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    #[test]
    fn test_validate_accepts_complete_input() {
        assert!(validate(&charmander()).is_empty());
    }

    #[test]
    fn test_validate_reports_fields_in_declaration_order() {
        let errors = validate(&ProductInput::default());

        assert_eq!(
            errors,
            vec![
                FieldError::new("title", "required"),
                FieldError::new("description", "required"),
                FieldError::new("price", "required"),
            ]
        );
    }

    #[test]
    fn test_validate_negative_price_fails_gt() {
        let input = ProductInput {
            price: Decimal::NEGATIVE_ONE,
            ..charmander()
        };

        assert_eq!(validate(&input), vec![FieldError::new("price", "gt")]);
    }

    #[test]
    fn test_validate_rejects_sub_cent_prices() {
        for price in [Decimal::new(1, 3), Decimal::new(5, 3), Decimal::new(12345, 3)] {
            let input = ProductInput {
                price,
                ..charmander()
            };

            assert_eq!(
                validate(&input),
                vec![FieldError::new("price", "decimals")],
                "{price} should be rejected"
            );
        }
    }

    #[test]
    fn test_validate_ignores_trailing_zeros() {
        let input = ProductInput {
            price: Decimal::new(12500, 3),
            ..charmander()
        };

        assert!(validate(&input).is_empty());
    }

    #[test]
    fn test_input_price_accepts_integers_and_decimals() {
        let input: ProductInput = serde_json::from_str(r#"{"price": 1200}"#).unwrap();
        assert_eq!(input.price, Decimal::new(1200, 0));

        let input: ProductInput = serde_json::from_str(r#"{"price": 1093.45}"#).unwrap();
        assert_eq!(input.price, Decimal::new(109345, 2));

        let input: ProductInput = serde_json::from_str(r#"{"price": 0.001}"#).unwrap();
        assert_eq!(input.price, Decimal::new(1, 3));
    }

    #[test]
    fn test_input_price_string_fails_to_decode() {
        assert!(serde_json::from_str::<ProductInput>(r#"{"price": "12.5"}"#).is_err());
    }

    #[test]
    fn test_input_price_null_reads_as_zero() {
        let input: ProductInput = serde_json::from_str(r#"{"price": null}"#).unwrap();

        assert!(input.price.is_zero());
        assert!(validate(&input).contains(&FieldError::new("price", "required")));
    }

    #[test]
    fn test_field_error_message_format() {
        let message = join_field_errors(&[
            FieldError::new("title", "required"),
            FieldError::new("price", "gt"),
        ]);

        assert_eq!(
            message,
            "Key: 'Product.Title' Error:Field validation for 'Title' failed on the 'required' tag\n\
             Key: 'Product.Price' Error:Field validation for 'Price' failed on the 'gt' tag"
        );
    }

    #[test]
    fn test_input_missing_fields_decode_to_zero_values() {
        let input: ProductInput = serde_json::from_str(r#"{"title":"Squirtle"}"#).unwrap();

        assert_eq!(input.title, "Squirtle");
        assert!(input.description.is_empty());
        assert!(input.price.is_zero());
    }

    #[test]
    fn test_input_wrong_type_fails_to_decode() {
        assert!(serde_json::from_str::<ProductInput>(r#"{"title": 42}"#).is_err());
    }

    #[test]
    fn test_product_serializes_price_as_number() {
        let json = serde_json::to_value(stored()).unwrap();

        assert_eq!(json["price"], serde_json::json!(99.99));
        assert!(json["deleted_at"].is_null());
    }

    #[test]
    fn test_apply_update_overlays_only_supplied_fields() {
        let mut product = stored();
        product.apply_update(ProductInput {
            title: String::new(),
            description: "Loves sunlight.".to_string(),
            price: Decimal::ZERO,
        });

        assert_eq!(product.title, "Bulbasaur");
        assert_eq!(product.description, "Loves sunlight.");
        assert_eq!(product.price, Decimal::new(9999, 2));
    }

    #[test]
    fn test_touch_always_advances() {
        let future = Utc::now() + Duration::seconds(60);
        assert!(touch(future) > future);

        let past = Utc::now() - Duration::seconds(60);
        assert!(touch(past) > past);
    }
}
