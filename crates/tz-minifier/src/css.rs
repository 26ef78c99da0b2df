//! CSS minification with lightningcss.

use std::sync::{Arc, RwLock};

use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};

use crate::error::{MinifyError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssOutput {
    pub code: String,
    /// Problems the parser recovered from. Never fatal.
    pub warnings: Vec<String>,
}

/// Minify a stylesheet.
///
/// With `error_recovery` off, an invalid rule fails the whole stylesheet.
/// With it on, invalid rules are dropped and reported in
/// [`CssOutput::warnings`].
pub fn minify_css(code: &str, error_recovery: bool) -> Result<CssOutput> {
    let warnings = Arc::new(RwLock::new(Vec::new()));
    let options = ParserOptions {
        error_recovery,
        warnings: Some(warnings.clone()),
        ..ParserOptions::default()
    };

    let mut sheet = StyleSheet::parse(code, options).map_err(|e| MinifyError::Css(e.to_string()))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| MinifyError::Css(e.to_string()))?;
    let printed = sheet
        .to_css(PrinterOptions { minify: true, ..PrinterOptions::default() })
        .map_err(|e| MinifyError::Css(e.to_string()))?;

    let warnings = warnings
        .read()
        .unwrap_or_else(|e| e.into_inner())
        .iter()
        .map(|w| w.to_string())
        .collect();

    Ok(CssOutput { code: printed.code, warnings })
}
