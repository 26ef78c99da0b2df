//! Heuristic TypeScript/TSX sniffing for the rewrite endpoint.
//!
//! Plain JavaScript that happens to look like a type annotation
//! (`{ kind: number }`) is classified as TypeScript. That is accepted.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static RE_TYPE_ANNOTATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r":\s*(?:(?:string|number|boolean|any|void|unknown|never|object|bigint|symbol)\b|(?:Array|Promise|Record|Partial|Readonly)\s*<|React\.)"
).unwrap());
static RE_INTERFACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\binterface\s+[A-Za-z_$][\w$]*").unwrap());
static RE_TYPE_ALIAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\btype\s+[A-Za-z_$][\w$]*\s*(?:<[^>]*>)?\s*=").unwrap());
static RE_ENUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\benum\s+[A-Za-z_$][\w$]*\s*\{").unwrap());
static RE_JSX: LazyLock<Regex> = LazyLock::new(|| Regex::new(
    r#"<[A-Za-z][\w.\-]*(?:\s+[A-Za-z_][\w\-:]*(?:=(?:"[^"]*"|'[^']*'|\{[^}]*\}))?)*\s*/?>|</[A-Za-z][\w.\-]*\s*>|<>"#
).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    JavaScript,
    /// TypeScript, TSX or JSX. All go through the TSX transpiler.
    TypeScript,
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceLanguage::JavaScript => write!(f, "JavaScript"),
            SourceLanguage::TypeScript => write!(f, "TypeScript"),
        }
    }
}

/// Which pattern classified the input as TypeScript.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TsSignal {
    TypeAnnotation,
    Interface,
    TypeAlias,
    Enum,
    Jsx,
}

pub fn typescript_signal(code: &str) -> Option<TsSignal> {
    if RE_TYPE_ANNOTATION.is_match(code) {
        Some(TsSignal::TypeAnnotation)
    } else if RE_INTERFACE.is_match(code) {
        Some(TsSignal::Interface)
    } else if RE_TYPE_ALIAS.is_match(code) {
        Some(TsSignal::TypeAlias)
    } else if RE_ENUM.is_match(code) {
        Some(TsSignal::Enum)
    } else if RE_JSX.is_match(code) {
        Some(TsSignal::Jsx)
    } else {
        None
    }
}

pub fn detect_language(code: &str) -> SourceLanguage {
    match typescript_signal(code) {
        Some(_) => SourceLanguage::TypeScript,
        None => SourceLanguage::JavaScript,
    }
}
