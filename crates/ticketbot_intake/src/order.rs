use std::{collections::BTreeMap, fmt::Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// An order as submitted by the web form.
///
/// Everything is optional on the wire so that a missing field ends up as an
/// [`crate::IntakeError::InvalidRequest`] instead of a deserialization error.
/// Form fields of the wrong type degrade to their placeholder instead of failing the order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    #[serde(default, deserialize_with = "lenient::string")]
    pub requester_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub order_type: Option<String>,
    #[serde(default, deserialize_with = "lenient::object_or_default")]
    pub form_data: FormData,
    #[serde(default, deserialize_with = "lenient::number")]
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default, deserialize_with = "lenient::string")]
    pub melee_weapon: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub bow: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub amulet: Option<String>,
    #[serde(default, deserialize_with = "lenient::object")]
    pub stats: Option<Stats>,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub use_parsec: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub cox_prayers: bool,
    #[serde(default, deserialize_with = "lenient::flag")]
    pub has_blowpipe: bool,
    #[serde(default, deserialize_with = "lenient::string")]
    pub blowpipe_dart: Option<String>,
    #[serde(default, deserialize_with = "lenient::string")]
    pub description: Option<String>,

    /// Fields the form sends that we don't know about. Kept around for logging.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    #[serde(default, deserialize_with = "lenient::level")]
    pub attack: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub strength: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub defence: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub hitpoints: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub prayer: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub magic: Option<u32>,
    #[serde(default, deserialize_with = "lenient::level")]
    pub ranged: Option<u32>,
}

/// Deserializers that accept whatever the form happens to send.
/// Values that make no sense for a field become `None`, `false` or the default.
mod lenient {
    use serde::{de::DeserializeOwned, Deserialize, Deserializer};
    use serde_json::Value;

    pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::String(x) => Some(x),
            Value::Number(x) => Some(x.to_string()),
            _ => None,
        })
    }

    pub fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Bool(x) => x,
            Value::Number(x) => x.as_f64().is_some_and(|x| x != 0.0),
            Value::String(x) => {
                matches!(x.trim().to_lowercase().as_str(), "true" | "yes" | "on" | "1")
            }
            _ => false,
        })
    }

    pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(x) => x.as_f64(),
            Value::String(x) => x.trim().parse().ok().filter(|x: &f64| x.is_finite()),
            _ => None,
        })
    }

    pub fn level<'de, D: Deserializer<'de>>(d: D) -> Result<Option<u32>, D::Error> {
        Ok(match Value::deserialize(d)? {
            Value::Number(x) => x.as_u64().and_then(|x| u32::try_from(x).ok()),
            Value::String(x) => x.trim().parse().ok(),
            _ => None,
        })
    }

    pub fn object<'de, D: Deserializer<'de>, T: DeserializeOwned>(
        d: D,
    ) -> Result<Option<T>, D::Error> {
        Ok(match Value::deserialize(d)? {
            value @ Value::Object(_) => serde_json::from_value(value).ok(),
            _ => None,
        })
    }

    pub fn object_or_default<'de, D: Deserializer<'de>, T: DeserializeOwned + Default>(
        d: D,
    ) -> Result<T, D::Error> {
        Ok(object(d)?.unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderType {
    Quiver,
    Inferno,
    Other(String),
}

impl OrderType {
    pub fn parse(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "quiver" => OrderType::Quiver,
            "inferno" => OrderType::Inferno,
            _ => OrderType::Other(tag.trim().to_string()),
        }
    }
}

impl Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Quiver => write!(f, "Quiver"),
            OrderType::Inferno => write!(f, "Inferno"),
            OrderType::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// An [`OrderRequest`] that passed validation.
#[derive(Debug, Clone)]
pub struct ValidatedOrder {
    pub requester_id: String,
    pub order_type: OrderType,
    pub form_data: FormData,
    pub price: Option<f64>,
}

impl OrderRequest {
    /// Check the two fields we can't work without. Everything else degrades to a placeholder.
    pub fn validate(self) -> Result<ValidatedOrder, String> {
        let requester_id = self
            .requester_id
            .map(|x| x.trim().to_string())
            .filter(|x| !x.is_empty())
            .ok_or_else(|| "requesterId is required".to_string())?;
        let order_type = self
            .order_type
            .filter(|x| !x.trim().is_empty())
            .ok_or_else(|| "orderType is required".to_string())?;
        Ok(ValidatedOrder {
            requester_id,
            order_type: OrderType::parse(&order_type),
            form_data: self.form_data,
            price: self.price,
        })
    }
}

pub const PLACEHOLDER: &str = "None";

/// Turn an internal catalog name like `blue_moon` into `Blue Moon`.
/// Absent or empty names render as `None`.
pub fn format_catalog_name(name: Option<&str>) -> String {
    let Some(name) = name.filter(|x| !x.is_empty()) else {
        return PLACEHOLDER.to_string();
    };
    name.split('_').filter(|word| !word.is_empty()).map(capitalize).join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn format_yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

pub fn format_price(price: Option<f64>) -> String {
    match price {
        Some(price) => format!("{price}M"),
        None => PLACEHOLDER.to_string(),
    }
}

impl Stats {
    /// One `Label: value` line per stat, in the order the form shows them.
    pub fn to_lines(&self) -> String {
        let value = |x: Option<u32>| x.map_or_else(|| PLACEHOLDER.to_string(), |x| x.to_string());
        [
            ("Atk", self.attack),
            ("Str", self.strength),
            ("Def", self.defence),
            ("HP", self.hitpoints),
            ("Pray", self.prayer),
            ("Mag", self.magic),
            ("Range", self.ranged),
        ]
        .into_iter()
        .map(|(label, x)| format!("{label}: {}", value(x)))
        .join("\n")
    }
}
