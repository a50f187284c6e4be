use lazy_regex::regex;
use serde_json::Value;
use vault_types::import::ImportRow;

/// Row coerced into the shape a product document needs.
///
/// Absent fields stay `None`. `price` and `inventory` may hold `NaN` when the
/// source text was not numeric.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NormalizedRow {
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub inventory: Option<f64>,
    pub colors: Vec<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl NormalizedRow {
    /// Name used in log messages.
    pub fn display_name(&self) -> &str {
        self.product_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or("Product")
    }
}

pub fn normalize(row: &ImportRow) -> NormalizedRow {
    NormalizedRow {
        product_name: row.get("productName").and_then(text),
        category: row
            .get("category")
            .and_then(text)
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty()),
        price: row.get("price").and_then(|v| number(v, parse_float)),
        inventory: row.get("inventory").and_then(|v| number(v, parse_int)),
        colors: row.get("colors").map(colors).unwrap_or_default(),
        status: row.get("status").and_then(text),
        description: row.get("description").and_then(text),
        image: row
            .get("image")
            .and_then(text)
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty()),
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(
            n.as_i64()
                .map(|i| i.to_string())
                .or_else(|| n.as_f64().map(|f| f.to_string()))
                .unwrap_or_else(|| n.to_string()),
        ),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value, parse: fn(&str) -> f64) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(parse(s)),
        _ => None,
    }
}

fn colors(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => split_colors(s),
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

/// Splits a comma-joined color list, keeping order.
pub fn split_colors(s: &str) -> Vec<String> {
    s.split(',').map(|c| c.trim().to_string()).collect()
}

/// Parses the longest leading decimal literal, `NaN` when there is none.
pub fn parse_float(s: &str) -> f64 {
    let s = s.trim_start();
    let literal = regex!(r"^[+-]?(Infinity|(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?)");
    match literal.find(s) {
        Some(m) => match m.as_str().trim_start_matches(['+', '-']) {
            "Infinity" if m.as_str().starts_with('-') => f64::NEG_INFINITY,
            "Infinity" => f64::INFINITY,
            _ => m.as_str().parse().unwrap_or(f64::NAN),
        },
        None => f64::NAN,
    }
}

/// Parses the longest leading base-10 integer, `NaN` when there is none.
pub fn parse_int(s: &str) -> f64 {
    let s = s.trim_start();
    match regex!(r"^[+-]?\d+").find(s) {
        Some(m) => m.as_str().parse().unwrap_or(f64::NAN),
        None => f64::NAN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> ImportRow {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn splits_colors() {
        let normalized = normalize(&row(json!({ "colors": "red, blue,green" })));
        assert_eq!(vec!["red", "blue", "green"], normalized.colors);
    }

    #[test]
    fn missing_colors_are_empty() {
        assert!(normalize(&row(json!({}))).colors.is_empty());
        let normalized = normalize(&row(json!({ "colors": ["black", "white"] })));
        assert_eq!(vec!["black", "white"], normalized.colors);
    }

    #[test]
    fn coerces_numeric_text() {
        let normalized = normalize(&row(json!({ "price": "129.99", "inventory": "12" })));
        assert_eq!(Some(129.99), normalized.price);
        assert_eq!(Some(12.0), normalized.inventory);

        let normalized = normalize(&row(json!({ "price": 80, "inventory": 3 })));
        assert_eq!(Some(80.0), normalized.price);
        assert_eq!(Some(3.0), normalized.inventory);
    }

    #[test]
    fn invalid_numbers_become_nan() {
        let normalized = normalize(&row(json!({ "price": "free", "inventory": "" })));
        assert!(normalized.price.is_some_and(f64::is_nan));
        assert!(normalized.inventory.is_some_and(f64::is_nan));
    }

    #[test]
    fn parses_numeric_prefixes() {
        assert_eq!(12.5, parse_float("  12.5usd"));
        assert_eq!(-0.5, parse_float("-.5"));
        assert_eq!(1500.0, parse_float("1.5e3"));
        assert_eq!(3.0, parse_float("3."));
        assert_eq!(f64::NEG_INFINITY, parse_float("-Infinity"));
        assert!(parse_float("$10").is_nan());

        assert_eq!(12.0, parse_int("12.7"));
        assert_eq!(-4.0, parse_int(" -4 pcs"));
        assert_eq!(0.0, parse_int("0x1A"));
        assert!(parse_int("ten").is_nan());
    }

    #[test]
    fn trims_category_and_treats_blank_as_absent() {
        assert_eq!(
            Some("Sneakers".to_string()),
            normalize(&row(json!({ "category": "  Sneakers " }))).category
        );
        assert_eq!(None, normalize(&row(json!({ "category": "   " }))).category);
        assert_eq!(None, normalize(&row(json!({ "image": "" }))).image);
    }

    #[test]
    fn renders_numeric_text_fields() {
        let normalized = normalize(&row(json!({ "productName": 1000.0, "status": true })));
        assert_eq!(Some("1000".to_string()), normalized.product_name);
        assert_eq!(Some("true".to_string()), normalized.status);
        assert_eq!("1000", normalized.display_name());
        assert_eq!("Product", normalize(&row(json!({}))).display_name());
    }
}
