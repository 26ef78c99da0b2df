//! Source minification: regex stripping, JavaScript/TypeScript via oxc,
//! CSS via lightningcss.

pub mod css;
pub mod detect;
pub mod error;
pub mod script;
pub mod strip;

use tracing::{debug, warn};
use tz_core::config::MinifyConfig;
use tz_core::MinificationResult;

pub use css::{minify_css, CssOutput};
pub use detect::{detect_language, typescript_signal, SourceLanguage, TsSignal};
pub use error::{MinifyError, Result};
pub use script::{minify_javascript, transpile_typescript, ScriptOptions};
pub use strip::{remove_whitespace, remove_whitespace_and_comments};

/// Adapter behind the `/minify/*` routes.
///
/// Parser-backed operations run on the blocking pool.
#[derive(Debug, Clone)]
pub struct Minifier {
    script: ScriptOptions,
    css_error_recovery: bool,
}

impl Minifier {
    pub fn new(config: &MinifyConfig) -> Self {
        Self {
            script: ScriptOptions::from(config),
            css_error_recovery: config.css_error_recovery,
        }
    }

    pub fn remove_spaces(&self, code: &str) -> MinificationResult {
        MinificationResult::new(remove_whitespace(code))
    }

    pub fn remove_spaces_and_comments(&self, code: &str) -> MinificationResult {
        MinificationResult::new(remove_whitespace_and_comments(code))
    }

    /// Sniffs the language, then transpiles TypeScript/JSX or minifies plain JavaScript.
    pub async fn rewrite_javascript(&self, code: String) -> Result<MinificationResult> {
        let signal = typescript_signal(&code);
        debug!(?signal, bytes = code.len(), "Sniffed rewrite input");

        let options = self.script.clone();
        let minified = match signal {
            Some(_) => tokio::task::spawn_blocking(move || transpile_typescript(&code, &options)).await??,
            None => tokio::task::spawn_blocking(move || minify_javascript(&code, &options)).await??,
        };
        Ok(MinificationResult::new(minified))
    }

    pub async fn typescript(&self, code: String) -> Result<MinificationResult> {
        let options = self.script.clone();
        let minified = tokio::task::spawn_blocking(move || transpile_typescript(&code, &options)).await??;
        Ok(MinificationResult::new(minified))
    }

    /// Recovered CSS problems are logged and otherwise ignored.
    pub async fn css(&self, code: String) -> Result<MinificationResult> {
        let recovery = self.css_error_recovery;
        let output = tokio::task::spawn_blocking(move || minify_css(&code, recovery)).await??;
        for warning in &output.warnings {
            warn!(%warning, "Recovered from invalid CSS");
        }
        Ok(MinificationResult::new(output.code))
    }
}

impl Default for Minifier {
    fn default() -> Self {
        Self::new(&MinifyConfig::default())
    }
}
