//! Response envelope shared by every endpoint. An empty body (`204`, or a `200`
//! with nothing in it) decodes as an envelope with neither `data` nor `meta`.

use super::errors::ApiError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `{ "data": T, "meta": {...} }` wrapper carried by every API response.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Map<String, Value>>,
}

#[derive(Deserialize)]
struct RawEnvelope<T> {
    data: Option<T>,
    #[serde(default)]
    meta: Option<Map<String, Value>>,
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Envelope<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawEnvelope<T>>::deserialize(deserializer)?;
        Ok(raw.map_or(
            Self {
                data: None,
                meta: None,
            },
            |raw| Self {
                data: raw.data,
                meta: raw.meta,
            },
        ))
    }
}

impl<T> Envelope<T> {
    /// Returns the payload or [`ApiError::MissingData`] when the server sent none.
    ///
    /// # Errors
    /// Returns `MissingData` if `data` is absent or `null`.
    pub fn into_data(self) -> Result<T, ApiError> {
        self.data.ok_or(ApiError::MissingData)
    }
}
