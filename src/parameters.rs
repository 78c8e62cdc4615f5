//! Host parameter store adapter
//!
//! Hosts keep transport settings in a flat key/value store with keys of the
//! form `<base_topic>.<transport>.<name>`, where the base topic has its
//! slashes replaced by dots (`/camera/depth` becomes `camera.depth`).
//! Older hosts stored the same settings under a leading dot
//! (`.camera.depth.compressedDepth.format`); those keys are still honoured
//! when the canonical key is absent.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// A single parameter value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Bool(bool),
    Integer(i64),
    Double(f64),
    String(String),
}

impl ParameterValue {
    fn type_name(&self) -> &'static str {
        match self {
            ParameterValue::Bool(_) => "bool",
            ParameterValue::Integer(_) => "integer",
            ParameterValue::Double(_) => "double",
            ParameterValue::String(_) => "string",
        }
    }
}

impl From<&str> for ParameterValue {
    fn from(s: &str) -> Self {
        ParameterValue::String(s.to_string())
    }
}

impl From<String> for ParameterValue {
    fn from(s: String) -> Self {
        ParameterValue::String(s)
    }
}

impl From<bool> for ParameterValue {
    fn from(b: bool) -> Self {
        ParameterValue::Bool(b)
    }
}

impl From<i64> for ParameterValue {
    fn from(v: i64) -> Self {
        ParameterValue::Integer(v)
    }
}

impl From<f64> for ParameterValue {
    fn from(v: f64) -> Self {
        ParameterValue::Double(v)
    }
}

/// Flat parameter store keyed by fully scoped names
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParameterMap {
    values: HashMap<String, ParameterValue>,
}

impl ParameterMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: ParameterValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&ParameterValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// View of the parameters belonging to one transport on one topic
    pub fn scope(&self, base_topic: &str, transport: &str) -> ParameterScope<'_> {
        ParameterScope {
            map: self,
            prefix: scoped_prefix(base_topic, transport),
        }
    }
}

/// Key prefix for a base topic and transport
///
/// ```
/// use compressed_image_transport::parameters::scoped_prefix;
///
/// assert_eq!(scoped_prefix("/camera/depth", "compressedDepth"), "camera.depth.compressedDepth");
/// ```
pub fn scoped_prefix(base_topic: &str, transport: &str) -> String {
    let topic = base_topic.trim_start_matches('/').replace('/', ".");
    if topic.is_empty() {
        transport.to_string()
    } else {
        format!("{}.{}", topic, transport)
    }
}

/// Parameters of a single transport on a single topic
#[derive(Debug, Clone)]
pub struct ParameterScope<'a> {
    map: &'a ParameterMap,
    prefix: String,
}

impl<'a> ParameterScope<'a> {
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully scoped key for a parameter name
    pub fn key(&self, name: &str) -> String {
        format!("{}.{}", self.prefix, name)
    }

    /// Look up a parameter, falling back to the deprecated dot-prefixed key
    pub fn get(&self, name: &str) -> Option<&'a ParameterValue> {
        let key = self.key(name);
        if let Some(value) = self.map.get(&key) {
            return Some(value);
        }

        let deprecated = format!(".{}", key);
        let value = self.map.get(&deprecated)?;
        warn!(
            "parameter `{}` is deprecated and ambiguous; use `{}` instead",
            deprecated, key
        );
        Some(value)
    }

    fn mismatch(&self, name: &str, expected: &'static str, value: &ParameterValue) -> ConfigError {
        warn!(
            key = %self.key(name),
            found = value.type_name(),
            "parameter has the wrong type, expected {}",
            expected
        );
        ConfigError::TypeMismatch {
            name: self.key(name),
            expected,
        }
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParameterValue::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(name, "bool", other)),
        }
    }

    pub fn get_integer(&self, name: &str) -> Result<Option<i64>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParameterValue::Integer(v)) => Ok(Some(*v)),
            Some(other) => Err(self.mismatch(name, "integer", other)),
        }
    }

    /// Read a floating point parameter; integer values are widened
    pub fn get_double(&self, name: &str) -> Result<Option<f64>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParameterValue::Double(v)) => Ok(Some(*v)),
            Some(ParameterValue::Integer(v)) => Ok(Some(*v as f64)),
            Some(other) => Err(self.mismatch(name, "double", other)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<Option<&'a str>, ConfigError> {
        match self.get(name) {
            None => Ok(None),
            Some(ParameterValue::String(s)) => Ok(Some(s.as_str())),
            Some(other) => Err(self.mismatch(name, "string", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_prefix() {
        assert_eq!(scoped_prefix("image_raw", "compressed"), "image_raw.compressed");
        assert_eq!(
            scoped_prefix("/robot/cam/image", "compressed"),
            "robot.cam.image.compressed"
        );
        assert_eq!(scoped_prefix("/", "compressedDepth"), "compressedDepth");
    }

    #[test]
    fn test_lookup_canonical_key() {
        let mut params = ParameterMap::new();
        params.set("cam.compressed.jpeg_quality", ParameterValue::Integer(80));

        let scope = params.scope("/cam", "compressed");
        assert_eq!(scope.get_integer("jpeg_quality").unwrap(), Some(80));
        assert_eq!(scope.get_integer("png_level").unwrap(), None);
    }

    #[test]
    fn test_deprecated_key_fallback() {
        let mut params = ParameterMap::new();
        params.set(".cam.compressed.format", ParameterValue::from("png"));

        let scope = params.scope("cam", "compressed");
        assert_eq!(scope.get_string("format").unwrap(), Some("png"));

        // canonical key wins when both are present
        params.set("cam.compressed.format", ParameterValue::from("tiff"));
        let scope = params.scope("cam", "compressed");
        assert_eq!(scope.get_string("format").unwrap(), Some("tiff"));
    }

    #[test]
    fn test_type_mismatch() {
        let mut params = ParameterMap::new();
        params.set("cam.compressed.jpeg_quality", ParameterValue::from("high"));

        let scope = params.scope("cam", "compressed");
        let err = scope.get_integer("jpeg_quality").unwrap_err();
        assert_eq!(
            err,
            ConfigError::TypeMismatch {
                name: "cam.compressed.jpeg_quality".to_string(),
                expected: "integer",
            }
        );
    }

    #[test]
    fn test_integer_widens_to_double() {
        let mut params = ParameterMap::new();
        params.set("d.compressedDepth.depth_max", ParameterValue::Integer(4));
        let scope = params.scope("d", "compressedDepth");
        assert_eq!(scope.get_double("depth_max").unwrap(), Some(4.0));
    }

    #[test]
    fn test_deserialize_from_json() {
        let params: ParameterMap = serde_json::from_str(
            r#"{"cam.compressed.format": "png", "cam.compressed.png_level": 7,
                "cam.compressed.jpeg_compress_bayer": true}"#,
        )
        .unwrap();
        assert_eq!(params.len(), 3);

        let scope = params.scope("cam", "compressed");
        assert_eq!(scope.get_integer("png_level").unwrap(), Some(7));
        assert_eq!(scope.get_bool("jpeg_compress_bayer").unwrap(), Some(true));
    }
}
