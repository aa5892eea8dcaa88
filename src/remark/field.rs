use serde::{Deserialize, Serialize};

use crate::sink::column::Column;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Image,
    Document,
}

impl FieldKind {
    pub fn describe(&self) -> &'static str {
        match self {
            FieldKind::Text => "text",
            FieldKind::Image => "image",
            FieldKind::Document => "document",
        }
    }

    pub fn is_capture(&self) -> bool {
        !matches!(self, FieldKind::Text)
    }
}

/// A form input required by a remark and the output column it fills.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub label: String,
    pub kind: FieldKind,
    pub column: Column,
}

impl FieldSpec {
    pub fn text(label: &str, column: Column) -> FieldSpec {
        FieldSpec {
            label: label.to_owned(),
            kind: FieldKind::Text,
            column,
        }
    }

    pub fn image(label: &str, column: Column) -> FieldSpec {
        FieldSpec {
            label: label.to_owned(),
            kind: FieldKind::Image,
            column,
        }
    }

    pub fn document(label: &str, column: Column) -> FieldSpec {
        FieldSpec {
            label: label.to_owned(),
            kind: FieldKind::Document,
            column,
        }
    }

    /// Label as used in generated file names: "METER IMAGE" -> "METER_IMAGE".
    pub fn slug(&self) -> String {
        self.label.trim().replace(' ', "_").to_uppercase()
    }

    pub fn column_accepts_kind(&self) -> bool {
        match self.kind {
            FieldKind::Text => matches!(
                self.column,
                Column::MeterSerialNumber | Column::Reading | Column::Demand
            ),
            FieldKind::Image => {
                matches!(self.column, Column::MeterImageAll | Column::PremisesImageAll)
            }
            FieldKind::Document => matches!(self.column, Column::DocumentImage),
        }
    }
}
