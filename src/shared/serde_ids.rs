//! Snowflake IDs travel as JSON strings (they exceed the 53-bit integer
//! range of JavaScript clients). Request bodies accept either form.

use serde::{de, Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Number(i64),
}

impl RawId {
    fn into_id<E: de::Error>(self) -> Result<i64, E> {
        match self {
            RawId::Number(n) if n > 0 => Ok(n),
            RawId::Number(n) => Err(E::custom(format!("invalid id {n}"))),
            RawId::Text(s) => super::snowflake::parse_id(&s)
                .ok_or_else(|| E::custom(format!("invalid id {s:?}"))),
        }
    }
}

/// Deserialize a single ID.
pub fn id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    RawId::deserialize(deserializer)?.into_id()
}

/// Deserialize a list of IDs.
pub fn ids<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<i64>, D::Error> {
    Vec::<RawId>::deserialize(deserializer)?
        .into_iter()
        .map(RawId::into_id)
        .collect()
}
