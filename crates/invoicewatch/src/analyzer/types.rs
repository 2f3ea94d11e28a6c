use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One uploaded document: raw bytes plus its declared media type.
#[derive(Clone, PartialEq, Eq)]
pub struct Document {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl Document {
    /// Creates a document, guessing the media type from the file name.
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime_type = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            file_name,
            mime_type,
            bytes,
        }
    }

    /// Creates a document with a declared media type. A blank declaration
    /// falls back to guessing from the file name.
    pub fn with_mime_type(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        let mime_type = mime_type.into();
        if mime_type.trim().is_empty() {
            return Self::new(file_name, bytes);
        }
        Self {
            file_name: file_name.into(),
            mime_type,
            bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The analyzer's payload as received. Every field may be absent or of the
/// wrong JSON type; wrongly typed values deserialize as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawExtraction {
    #[serde(default, deserialize_with = "lenient_string")]
    pub vendor_name: Option<String>,
    /// Number or formatted string; see [`crate::extraction::parse_amount`].
    #[serde(default)]
    pub total_amount: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub invoice_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_gst_missing: Option<bool>,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub is_regulatory_item: Option<bool>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub compliance_risk_level: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub summary: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub legal_impact: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub payment_advice: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => Some(b),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" => Some(true),
            "false" | "no" => Some(false),
            _ => None,
        },
        Value::Number(n) => n.as_i64().map(|v| v != 0),
        _ => None,
    })
}
