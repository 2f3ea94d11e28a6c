//! Builders for test configs and documents.

#![allow(dead_code)]

use std::path::Path;

use serde_json::{json, Value};

use invoicewatch::analyzer::Document;

/// Builds a config file as JSON, the way a user would write it.
pub struct ConfigBuilder {
    value: Value,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            value: json!({ "version": "1.0" }),
        }
    }

    pub fn currency(mut self, currency: &str) -> Self {
        self.value["currency"] = json!(currency);
        self
    }

    pub fn database_path(mut self, path: &Path) -> Self {
        self.value["database"] = json!({ "path": path.to_string_lossy() });
        self
    }

    pub fn owner(mut self, id: &str, email: &str) -> Self {
        self.value["owner"] = json!({ "id": id, "email": email });
        self
    }

    pub fn analyzer(mut self, analyzer: Value) -> Self {
        self.value["analyzer"] = analyzer;
        self
    }

    pub fn bind(mut self, bind: &str) -> Self {
        self.value["server"] = json!({ "bind": bind });
        self
    }

    pub fn build(self) -> String {
        serde_json::to_string_pretty(&self.value).expect("Failed to serialize config")
    }

    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).expect("Failed to write config file");
    }
}

/// A document whose name selects a fixture response. The bytes only need
/// to be non-empty.
pub fn document(file_name: &str) -> Document {
    Document::new(file_name, b"%PDF-1.4 test".to_vec())
}

pub fn documents(file_names: &[&str]) -> Vec<Document> {
    file_names.iter().map(|name| document(name)).collect()
}
