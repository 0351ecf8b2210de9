use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type SymbolId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Ord, PartialOrd)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SymbolKind {
    Type,
    Method,
}

impl SymbolKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Type => "TYPE",
            Self::Method => "METHOD",
        }
    }
}

impl std::str::FromStr for SymbolKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "TYPE" => Ok(Self::Type),
            "METHOD" => Ok(Self::Method),
            other => Err(format!(
                "invalid symbol kind '{other}', expected one of: TYPE, METHOD"
            )),
        }
    }
}

/// A parsed unit of a `.sou` export: a class (`Type`) or a method (`Method`).
///
/// Identity is assigned fresh at parse time; re-parsing the same file yields
/// different ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub body: String,
    pub comment: String,
}

impl Symbol {
    pub fn new_type(name: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: fresh_symbol_id(),
            name: name.into(),
            kind: SymbolKind::Type,
            body: body.into(),
            comment: String::new(),
        }
    }

    pub fn new_method(class_name: &str, selector: &str, body: impl Into<String>) -> Self {
        Self {
            id: fresh_symbol_id(),
            name: method_fq_name(class_name, selector),
            kind: SymbolKind::Method,
            body: body.into(),
            comment: String::new(),
        }
    }
}

pub fn fresh_symbol_id() -> SymbolId {
    Uuid::new_v4().to_string()
}

/// Last `.`-separated component of a possibly namespace-qualified class name.
pub fn bare_class_name(full_name: &str) -> &str {
    full_name.rsplit('.').next().unwrap_or(full_name)
}

pub fn method_fq_name(class_name: &str, selector: &str) -> String {
    format!("{class_name}.{selector}")
}
