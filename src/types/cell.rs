use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A concrete cell value: what a literal holds or what a formula last computed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "camelCase")]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDateTime),
}

impl CellValue {
    /// The type tag a value carries when nothing else declares one.
    pub fn cell_type(&self) -> CellType {
        match self {
            CellValue::Text(_) => CellType::String,
            CellValue::Number(_) => CellType::Number,
            CellValue::Bool(_) => CellType::Boolean,
            CellValue::Date(_) => CellType::Date,
        }
    }

    /// True for the empty string, which counts as no content.
    pub fn is_blank(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

/// Cell type tag: s=string, n=number, b=boolean, d=date
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellType {
    #[serde(rename = "s")]
    String,
    #[serde(rename = "n")]
    Number,
    #[serde(rename = "b")]
    Boolean,
    #[serde(rename = "d")]
    Date,
}

impl CellType {
    /// Parse a codec type tag. Unknown tags (including the codec's `e`/`z`)
    /// yield `None` so the caller falls back to the value's own type.
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "s" | "str" => Some(CellType::String),
            "n" => Some(CellType::Number),
            "b" => Some(CellType::Boolean),
            "d" => Some(CellType::Date),
            _ => None,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            CellType::String => "s",
            CellType::Number => "n",
            CellType::Boolean => "b",
            CellType::Date => "d",
        }
    }
}

/// One grid slot.
///
/// A formula keeps its source (without the leading `=`) next to the result
/// of the last recalculation; an absent cache means the formula currently
/// evaluates to an error.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Cell {
    #[default]
    Empty,
    Literal {
        value: CellValue,
        #[serde(rename = "type")]
        ty: CellType,
    },
    #[serde(rename_all = "camelCase")]
    Formula {
        source: String,
        cached_value: Option<CellValue>,
        cached_type: Option<CellType>,
    },
}

impl Cell {
    /// A literal whose type tag is derived from the value.
    pub fn literal(value: impl Into<CellValue>) -> Self {
        let value = value.into();
        let ty = value.cell_type();
        Cell::Literal { value, ty }
    }

    /// A formula with no cached result yet. A leading `=` is stripped.
    pub fn formula(source: impl Into<String>) -> Self {
        let source = source.into();
        let source = match source.strip_prefix('=') {
            Some(rest) => rest.to_string(),
            None => source,
        };
        Cell::Formula {
            source,
            cached_value: None,
            cached_type: None,
        }
    }

    pub fn is_formula(&self) -> bool {
        matches!(self, Cell::Formula { .. })
    }

    pub fn formula_source(&self) -> Option<&str> {
        match self {
            Cell::Formula { source, .. } => Some(source),
            _ => None,
        }
    }

    /// Whether the slot counts as data for bounds purposes: any formula, or a
    /// literal other than the empty string.
    pub fn has_content(&self) -> bool {
        match self {
            Cell::Empty => false,
            Cell::Literal { value, .. } => !value.is_blank(),
            Cell::Formula { .. } => true,
        }
    }

    /// The visible value: a literal's content or a formula's cached result.
    pub fn value(&self) -> Option<&CellValue> {
        match self {
            Cell::Empty => None,
            Cell::Literal { value, .. } => Some(value),
            Cell::Formula { cached_value, .. } => cached_value.as_ref(),
        }
    }

    pub fn cell_type(&self) -> Option<CellType> {
        match self {
            Cell::Empty => None,
            Cell::Literal { ty, .. } => Some(*ty),
            Cell::Formula { cached_type, .. } => *cached_type,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::float_cmp)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_derives_type() {
        assert_eq!(Cell::literal(5.0).cell_type(), Some(CellType::Number));
        assert_eq!(Cell::literal("x").cell_type(), Some(CellType::String));
        assert_eq!(Cell::literal(true).cell_type(), Some(CellType::Boolean));
    }

    #[test]
    fn test_formula_strips_marker() {
        let cell = Cell::formula("=A1*2");
        assert_eq!(cell.formula_source(), Some("A1*2"));
        assert!(cell.has_content());
        assert_eq!(cell.value(), None);
    }

    #[test]
    fn test_blank_literal_has_no_content() {
        assert!(!Cell::literal("").has_content());
        assert!(!Cell::Empty.has_content());
        assert!(Cell::literal(0.0).has_content());
    }

    #[test]
    fn test_type_tags() {
        assert_eq!(CellType::from_tag("n"), Some(CellType::Number));
        assert_eq!(CellType::from_tag("e"), None);
        assert_eq!(CellType::Date.tag(), "d");
    }
}
