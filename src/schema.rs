//! Column layout and label table for the source and target CSV documents.
//!
//! The defaults describe version 1 of the source export. A JSON document
//! can override any subset of the fields:
//!
//! ```
//! use iryouhi_converter::Schema;
//!
//! let schema = Schema::from_json(r#"{ "output_categories": { "otc": "OTC drugs" } }"#).unwrap();
//! assert_eq!(schema.output_categories.otc, "OTC drugs");
//! assert_eq!(schema.output_categories.medical, "medical");
//! ```

use crate::error::SchemaError;
use crate::record::Category;
use serde::Deserialize;

/// Number of columns in both the source and target layouts.
pub const COLUMN_COUNT: usize = 6;

/// Source columns, in order.
pub const DEFAULT_INPUT_HEADER: [&str; COLUMN_COUNT] = [
    "recipient_name",
    "provider_name",
    "category",
    "amount_paid",
    "amount_refunded",
    "period",
];

/// Label per category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CategoryLabels {
    pub medical: String,
    pub otc: String,
    pub other: String,
}

impl CategoryLabels {
    pub fn label(&self, category: Category) -> &str {
        match category {
            Category::Medical => &self.medical,
            Category::Otc => &self.otc,
            Category::Other => &self.other,
        }
    }

    /// Finds the category whose label equals `label` exactly.
    pub fn lookup(&self, label: &str) -> Option<Category> {
        Category::ALL
            .into_iter()
            .find(|category| self.label(*category) == label)
    }
}

impl Default for CategoryLabels {
    fn default() -> Self {
        CategoryLabels {
            medical: Category::Medical.name().to_string(),
            otc: Category::Otc.name().to_string(),
            other: Category::Other.name().to_string(),
        }
    }
}

/// Configuration table for a conversion.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Schema {
    /// Layout version, reported in header mismatch diagnostics.
    pub version: u32,

    /// Exact header signature of the source document.
    pub input_header: Vec<String>,

    /// Labels accepted in the source category column.
    pub input_categories: CategoryLabels,

    /// Labels written to the target category column.
    pub output_categories: CategoryLabels,

    /// Header row written before the data rows, if any.
    pub output_header: Option<Vec<String>>,
}

impl Default for Schema {
    fn default() -> Self {
        Schema {
            version: 1,
            input_header: DEFAULT_INPUT_HEADER.iter().map(|s| s.to_string()).collect(),
            input_categories: CategoryLabels::default(),
            output_categories: CategoryLabels::default(),
            output_header: None,
        }
    }
}

impl Schema {
    /// Parses and validates a JSON schema document.
    pub fn from_json(json: &str) -> std::result::Result<Self, SchemaError> {
        let schema: Schema = serde_json::from_str(json)?;
        schema.validate()?;
        Ok(schema)
    }

    /// Checks column counts, that no category label is empty and that
    /// input labels are distinct.
    pub fn validate(&self) -> std::result::Result<(), SchemaError> {
        if self.input_header.len() != COLUMN_COUNT {
            return Err(SchemaError::ColumnCount {
                table: "input_header",
                expected: COLUMN_COUNT,
                found: self.input_header.len(),
            });
        }

        if let Some(header) = &self.output_header {
            if header.len() != COLUMN_COUNT {
                return Err(SchemaError::ColumnCount {
                    table: "output_header",
                    expected: COLUMN_COUNT,
                    found: header.len(),
                });
            }
        }

        for (idx, category) in Category::ALL.into_iter().enumerate() {
            let label = self.input_categories.label(category);
            if Category::ALL[..idx]
                .iter()
                .any(|earlier| self.input_categories.label(*earlier) == label)
            {
                return Err(SchemaError::DuplicateLabel {
                    label: label.to_string(),
                });
            }
        }

        for labels in [&self.input_categories, &self.output_categories] {
            for category in Category::ALL {
                if labels.label(category).trim().is_empty() {
                    return Err(SchemaError::EmptyLabel {
                        category: category.name(),
                    });
                }
            }
        }

        Ok(())
    }

    /// Header signature joined with commas, for diagnostics.
    pub fn input_header_line(&self) -> String {
        self.input_header.join(",")
    }
}
