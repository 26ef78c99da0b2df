//! JavaScript minification and TypeScript/TSX transpilation with oxc.

use std::path::Path;

use oxc::allocator::Allocator;
use oxc::ast::ast::Program;
use oxc::codegen::{Codegen, CodegenOptions};
use oxc::minifier::{CompressOptions, MangleOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::semantic::SemanticBuilder;
use oxc::span::SourceType;
use oxc::transformer::{JsxRuntime, TransformOptions, Transformer};
use tz_core::config::MinifyConfig;

use crate::detect::SourceLanguage;
use crate::error::{MinifyError, Result};

#[derive(Debug, Clone)]
pub struct ScriptOptions {
    pub target: String,
    pub drop_console: bool,
    pub mangle_top_level: bool,
}

impl ScriptOptions {
    fn minifier_options(&self) -> MinifierOptions {
        MinifierOptions {
            mangle: Some(MangleOptions {
                top_level: self.mangle_top_level,
                ..MangleOptions::default()
            }),
            compress: Some(CompressOptions {
                drop_console: self.drop_console,
                ..CompressOptions::smallest()
            }),
        }
    }

    fn transform_options(&self) -> Result<TransformOptions> {
        let mut options = TransformOptions::from_target(&self.target).map_err(|reason| MinifyError::InvalidTarget {
            target: self.target.clone(),
            reason: reason.to_string(),
        })?;
        options.jsx.runtime = JsxRuntime::Automatic;
        Ok(options)
    }
}

impl Default for ScriptOptions {
    fn default() -> Self {
        Self::from(&MinifyConfig::default())
    }
}

impl From<&MinifyConfig> for ScriptOptions {
    fn from(config: &MinifyConfig) -> Self {
        Self {
            target: config.target.clone(),
            drop_console: config.drop_console,
            mangle_top_level: config.mangle_top_level,
        }
    }
}

/// Compress and mangle JavaScript. Sources with `import`/`export` parse as
/// modules, anything else as a sloppy-mode script.
pub fn minify_javascript(code: &str, options: &ScriptOptions) -> Result<String> {
    let allocator = Allocator::default();
    let mut program = parse(&allocator, code, SourceType::unambiguous(), SourceLanguage::JavaScript)?;
    Ok(minify_program(&allocator, &mut program, options))
}

/// Strip types, lower JSX with the automatic runtime, then minify.
pub fn transpile_typescript(code: &str, options: &ScriptOptions) -> Result<String> {
    let transform_options = options.transform_options()?;
    let allocator = Allocator::default();
    let mut program = parse(&allocator, code, SourceType::tsx(), SourceLanguage::TypeScript)?;

    let scoping = SemanticBuilder::new().build(&program).semantic.into_scoping();
    let transformed = Transformer::new(&allocator, Path::new("input.tsx"), &transform_options)
        .build_with_scoping(scoping, &mut program);
    if let Some(first) = transformed.errors.first() {
        return Err(MinifyError::Transform(first.to_string()));
    }

    Ok(minify_program(&allocator, &mut program, options))
}

fn parse<'a>(
    allocator: &'a Allocator,
    code: &'a str,
    source_type: SourceType,
    language: SourceLanguage,
) -> Result<Program<'a>> {
    let parsed = Parser::new(allocator, code, source_type).parse();
    if parsed.panicked || !parsed.errors.is_empty() {
        let message = parsed
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser panicked".to_string());
        return Err(MinifyError::Syntax { language, message });
    }
    Ok(parsed.program)
}

fn minify_program<'a>(allocator: &'a Allocator, program: &mut Program<'a>, options: &ScriptOptions) -> String {
    let minified = Minifier::new(options.minifier_options()).minify(allocator, program);
    Codegen::new()
        .with_options(CodegenOptions::minify())
        .with_scoping(minified.scoping)
        .build(program)
        .code
}
