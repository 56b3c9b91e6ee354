//! Harness templates and the assembler.
//!
//! A template is a per-language skeleton with exactly two markers:
//! `$CustomCode$` receives the submission verbatim, `$TestCases$` receives
//! the driver statements in declaration order. Both invariants, and the
//! line anchor that keeps compiler diagnostics aligned with the submitted
//! code, are checked once when the template is parsed, so assembling never
//! fails on template shape.

use crate::emitter::DriverStatement;
use crate::error::TemplateError;
use harness_common::types::Language;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const CODE_MARKER: &str = "$CustomCode$";
pub const TESTS_MARKER: &str = "$TestCases$";

const LINE_DIRECTIVE: &str = "#line 1";

const RUST_TEMPLATE: &str = concat!(
    include_str!("../templates/template.rs"),
    include_str!("primitives.rs")
);

/// How a language keeps submitted line numbers intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineAnchor {
    /// `#line 1` on the line right before the code marker.
    Directive,
    /// The code marker sits on the first line of the template.
    FirstLine,
}

impl LineAnchor {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::Cpp | Language::Csharp => LineAnchor::Directive,
            Language::Java | Language::Javascript | Language::Python | Language::Rust => {
                LineAnchor::FirstLine
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Code,
    Tests,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessTemplate {
    language: Language,
    /// Text before, between and after the two slots.
    segments: [String; 3],
    order: [Slot; 2],
}

/// Generated program text, ready for the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledSource {
    pub language: Language,
    pub text: String,
}

impl HarnessTemplate {
    pub fn parse(language: Language, text: &str) -> Result<Self, TemplateError> {
        let code_at = single_marker(language, text, CODE_MARKER)?;
        let tests_at = single_marker(language, text, TESTS_MARKER)?;
        check_line_anchor(language, text, code_at)?;

        let (first, first_len, second, second_len, order) = if code_at < tests_at {
            (code_at, CODE_MARKER.len(), tests_at, TESTS_MARKER.len(), [Slot::Code, Slot::Tests])
        } else {
            (tests_at, TESTS_MARKER.len(), code_at, CODE_MARKER.len(), [Slot::Tests, Slot::Code])
        };

        Ok(Self {
            language,
            segments: [
                text[..first].to_string(),
                text[first + first_len..second].to_string(),
                text[second + second_len..].to_string(),
            ],
            order,
        })
    }

    /// Template shipped with this crate.
    pub fn builtin(language: Language) -> Result<Self, TemplateError> {
        let text = match language {
            Language::Cpp => include_str!("../templates/template.cpp"),
            Language::Csharp => include_str!("../templates/template.cs"),
            Language::Java => include_str!("../templates/template.java"),
            Language::Javascript => include_str!("../templates/template.js"),
            Language::Python => include_str!("../templates/template.py"),
            Language::Rust => RUST_TEMPLATE,
        };
        Self::parse(language, text)
    }

    pub fn load(language: Language, path: &Path) -> Result<Self, TemplateError> {
        let text = fs::read_to_string(path).map_err(|e| TemplateError::Read {
            language,
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(language, &text)
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Substitutes both markers in a single pass.
    pub fn assemble(
        &self,
        submitted_code: &str,
        statements: &[DriverStatement],
    ) -> Result<AssembledSource, TemplateError> {
        if submitted_code.trim().is_empty() {
            return Err(TemplateError::EmptySubmission);
        }

        let tests = statements
            .iter()
            .map(|statement| statement.code.as_str())
            .collect::<Vec<_>>()
            .join("\n");

        let slot_text = |slot: Slot| match slot {
            Slot::Code => submitted_code,
            Slot::Tests => tests.as_str(),
        };

        let mut text = String::with_capacity(
            self.segments.iter().map(String::len).sum::<usize>() + submitted_code.len() + tests.len(),
        );
        text.push_str(&self.segments[0]);
        text.push_str(slot_text(self.order[0]));
        text.push_str(&self.segments[1]);
        text.push_str(slot_text(self.order[1]));
        text.push_str(&self.segments[2]);

        debug!(
            language = %self.language,
            statements = statements.len(),
            bytes = text.len(),
            "Assembled harness"
        );

        Ok(AssembledSource {
            language: self.language,
            text,
        })
    }
}

/// Free-function form of [`HarnessTemplate::assemble`].
pub fn assemble(
    template: &HarnessTemplate,
    submitted_code: &str,
    statements: &[DriverStatement],
) -> Result<AssembledSource, TemplateError> {
    template.assemble(submitted_code, statements)
}

fn single_marker(
    language: Language,
    text: &str,
    marker: &'static str,
) -> Result<usize, TemplateError> {
    let positions: Vec<usize> = text.match_indices(marker).map(|(at, _)| at).collect();
    match positions.as_slice() {
        [at] => Ok(*at),
        _ => Err(TemplateError::MalformedMarker {
            language,
            marker,
            found: positions.len(),
        }),
    }
}

fn check_line_anchor(language: Language, text: &str, code_at: usize) -> Result<(), TemplateError> {
    let before = &text[..code_at];
    match LineAnchor::for_language(language) {
        LineAnchor::FirstLine => {
            if before.contains('\n') {
                return Err(TemplateError::MalformedLineAnchor {
                    language,
                    reason: "code marker must be on the first line",
                });
            }
        }
        LineAnchor::Directive => {
            let line_start = before.rfind('\n').map(|at| at + 1).unwrap_or(0);
            if !before[line_start..].trim().is_empty() {
                return Err(TemplateError::MalformedLineAnchor {
                    language,
                    reason: "code marker must start its line",
                });
            }
            let previous = before[..line_start.saturating_sub(1)]
                .rsplit('\n')
                .next()
                .unwrap_or("");
            if line_start == 0 || previous.trim_end_matches('\r').trim() != LINE_DIRECTIVE {
                return Err(TemplateError::MalformedLineAnchor {
                    language,
                    reason: "code marker must follow a '#line 1' directive",
                });
            }
        }
    }
    Ok(())
}

/// One validated template per language, immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: BTreeMap<Language, HarnessTemplate>,
}

impl TemplateRegistry {
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::with_overrides(std::iter::empty::<(Language, &Path)>())
    }

    /// Built-in templates, replaced by the given files where present.
    pub fn with_overrides<P: AsRef<Path>>(
        overrides: impl IntoIterator<Item = (Language, P)>,
    ) -> Result<Self, TemplateError> {
        let mut templates = BTreeMap::new();
        for language in Language::ALL {
            templates.insert(language, HarnessTemplate::builtin(language)?);
        }
        for (language, path) in overrides {
            let path = path.as_ref();
            templates.insert(language, HarnessTemplate::load(language, path)?);
            info!(language = %language, path = %path.display(), "Loaded template override");
        }
        Ok(Self { templates })
    }

    pub fn get(&self, language: Language) -> Result<&HarnessTemplate, TemplateError> {
        self.templates
            .get(&language)
            .ok_or(TemplateError::UnknownLanguage(language))
    }

    pub fn languages(&self) -> impl Iterator<Item = Language> + '_ {
        self.templates.keys().copied()
    }
}
