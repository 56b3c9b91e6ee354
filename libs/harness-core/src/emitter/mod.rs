//! Test-case driver emission.
//!
//! Every backend renders the same plan for a test case: call the submitted
//! function with literal arguments, compare the result against a literal
//! expected value with the primitive its [`TypeDescriptor`] selects, and print
//! one `@@ <index> ...` record. The comparison expression is built here once,
//! recursively over the descriptor; backends only supply syntax.

mod cpp;
mod csharp;
mod java;
mod javascript;
mod literal;
mod python;
mod rust;

pub use cpp::CppEmitter;
pub use csharp::CsharpEmitter;
pub use java::JavaEmitter;
pub use javascript::JavascriptEmitter;
pub use python::PythonEmitter;
pub use rust::RustEmitter;

use crate::error::CaseError;
use harness_common::types::{
    FunctionSignature, Language, ScalarType, TestCase, TypeDescriptor, ValueType,
};
use harness_common::value::Value;
use std::collections::HashSet;
use tracing::warn;

/// Driver code for one test case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverStatement {
    pub index: usize,
    pub code: String,
    /// Set when the case could not be rendered; `code` then only reports that.
    pub skipped: Option<CaseError>,
}

/// A test case resolved into target-language fragments.
#[derive(Debug, Clone)]
pub struct CaseCall<'a> {
    pub index: usize,
    pub function: &'a str,
    pub arguments: Vec<String>,
    pub result_type: String,
    pub expected: String,
    pub comparison: String,
}

/// Syntax of one target language.
pub trait DriverEmitter: Send + Sync {
    fn language(&self) -> Language;

    /// Why this node of a type (children are checked separately) has no
    /// counterpart in the language.
    fn unsupported(&self, _ty: &ValueType) -> Option<&'static str> {
        None
    }

    fn type_name(&self, ty: &ValueType) -> String;

    fn scalar_literal(&self, scalar: ScalarType, text: &str) -> Result<String, String>;

    fn sequence_literal(&self, ty: &ValueType, elements: Vec<String>) -> String;

    fn map_literal(&self, ty: &ValueType, entries: Vec<(String, String)>) -> String;

    /// Names the top-level comparison uses for the actual and expected values.
    fn operands(&self) -> (&'static str, &'static str) {
        ("ret", "expected")
    }

    fn exact_eq(&self, ty: &ValueType, a: &str, b: &str) -> String;

    /// Whether `exact_eq` for `ty` differs from the default equality the
    /// container primitives fall back to, so elements need an explicit predicate.
    fn exact_needs_predicate(&self, _ty: &ValueType) -> bool {
        false
    }

    fn tolerant_eq(&self, ty: &ValueType, a: &str, b: &str) -> String;

    fn length(&self, ty: &ValueType, operand: &str) -> String;

    /// Sorted view of a set.
    fn canonical(&self, ty: &ValueType, operand: &str) -> String;

    fn same_elements(&self, a: &str, b: &str, length: &str, eq: Option<&str>) -> String;

    fn same_entries(&self, a: &str, b: &str, eq: &str) -> String;

    fn lambda(&self, a: &str, b: &str, body: &str) -> String;

    fn conjunction(&self, left: &str, right: &str) -> String {
        format!("{left} && {right}")
    }

    fn equal_lengths(&self, a: &str, b: &str) -> String {
        format!("{a} == {b}")
    }

    fn statement(&self, call: &CaseCall<'_>) -> String;

    fn skipped_statement(&self, index: usize, reason: &str) -> String;

    fn skeleton(&self, function: &FunctionSignature) -> String;
}

pub fn emitter_for(language: Language) -> &'static dyn DriverEmitter {
    match language {
        Language::Cpp => &CppEmitter,
        Language::Csharp => &CsharpEmitter,
        Language::Java => &JavaEmitter,
        Language::Javascript => &JavascriptEmitter,
        Language::Python => &PythonEmitter,
        Language::Rust => &RustEmitter,
    }
}

/// Fails if `ty` has no comparison strategy, or the language cannot express it.
pub fn check_support(emitter: &dyn DriverEmitter, ty: &ValueType) -> Result<(), CaseError> {
    let language = emitter.language();
    ty.descriptor()
        .map_err(|e| CaseError::descriptor(language, ty, e))?;

    let mut failure = None;
    ty.walk(&mut |node| {
        if failure.is_none() {
            failure = emitter
                .unsupported(node)
                .map(|reason| CaseError::unsupported(language, node, reason));
        }
    });
    failure.map_or(Ok(()), Err)
}

pub fn render_literal(
    emitter: &dyn DriverEmitter,
    ty: &ValueType,
    value: &Value,
) -> Result<String, CaseError> {
    let failed = |reason: String| CaseError::LiteralRendering {
        language: emitter.language(),
        ty: ty.to_string(),
        value: value
            .as_scalar()
            .map(str::to_string)
            .unwrap_or_else(|| format!("{value:?}")),
        reason,
    };

    match (ty, value) {
        (ValueType::Scalar(scalar), Value::Scalar(text)) => {
            emitter.scalar_literal(*scalar, text).map_err(failed)
        }
        (
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element),
            Value::Sequence(items),
        ) => {
            let elements = items
                .iter()
                .map(|item| render_literal(emitter, element, item))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(emitter.sequence_literal(ty, elements))
        }
        (ValueType::Map(key, value_ty), Value::Map(pairs)) => {
            let mut seen = HashSet::new();
            let mut entries = Vec::with_capacity(pairs.len());
            for (k, v) in pairs {
                let k = render_literal(emitter, key, k)?;
                if !seen.insert(k.clone()) {
                    return Err(failed(format!("duplicate map key {k}")));
                }
                entries.push((k, render_literal(emitter, value_ty, v)?));
            }
            Ok(emitter.map_literal(ty, entries))
        }
        _ => Err(failed("value shape does not match the declared type".to_string())),
    }
}

/// Boolean expression judging `a` (actual) against `b` (expected).
pub fn comparison(
    emitter: &dyn DriverEmitter,
    ty: &ValueType,
    a: &str,
    b: &str,
) -> Result<String, CaseError> {
    let descriptor = ty
        .descriptor()
        .map_err(|e| CaseError::descriptor(emitter.language(), ty, e))?;
    Ok(compare(emitter, ty, &descriptor, a, b, 0))
}

fn compare(
    emitter: &dyn DriverEmitter,
    ty: &ValueType,
    descriptor: &TypeDescriptor,
    a: &str,
    b: &str,
    depth: usize,
) -> String {
    let (x, y) = (format!("a{}", depth + 1), format!("b{}", depth + 1));

    match (ty, descriptor) {
        (_, TypeDescriptor::Exact) => emitter.exact_eq(ty, a, b),
        (_, TypeDescriptor::Tolerant) => emitter.tolerant_eq(ty, a, b),
        (
            ValueType::Array(element) | ValueType::List(element) | ValueType::Set(element),
            TypeDescriptor::UnorderedSequence {
                element: element_descriptor,
                canonicalize,
            },
        ) => {
            let (length_a, length_b) = (emitter.length(ty, a), emitter.length(ty, b));
            let (seq_a, seq_b) = if *canonicalize {
                (emitter.canonical(ty, a), emitter.canonical(ty, b))
            } else {
                (a.to_string(), b.to_string())
            };
            let eq = match element_descriptor.as_ref() {
                TypeDescriptor::Exact if !emitter.exact_needs_predicate(element) => None,
                nested => Some(emitter.lambda(
                    &x,
                    &y,
                    &compare(emitter, element, nested, &x, &y, depth + 1),
                )),
            };
            emitter.conjunction(
                &emitter.equal_lengths(&length_a, &length_b),
                &emitter.same_elements(&seq_a, &seq_b, &length_a, eq.as_deref()),
            )
        }
        (ValueType::Map(_, value), TypeDescriptor::UnorderedMap { value: value_descriptor }) => {
            let eq = emitter.lambda(
                &x,
                &y,
                &compare(emitter, value, value_descriptor, &x, &y, depth + 1),
            );
            emitter.same_entries(a, b, &eq)
        }
        // Descriptors are derived from the type, so the shapes always agree.
        _ => emitter.exact_eq(ty, a, b),
    }
}

/// Renders the driver statement for one test case.
pub fn emit_case(
    emitter: &dyn DriverEmitter,
    functions: &[FunctionSignature],
    index: usize,
    case: &TestCase,
) -> Result<String, CaseError> {
    let function = functions
        .iter()
        .find(|f| f.name == case.function)
        .ok_or_else(|| CaseError::UnknownFunction(case.function.clone()))?;

    if function.inputs.len() != case.inputs.len() {
        return Err(CaseError::ArityMismatch {
            function: function.name.clone(),
            expected: function.inputs.len(),
            actual: case.inputs.len(),
        });
    }

    let arguments = function
        .inputs
        .iter()
        .zip(&case.inputs)
        .map(|(parameter, text)| {
            check_support(emitter, &parameter.ty)?;
            let value = Value::parse(&parameter.ty, text)?;
            render_literal(emitter, &parameter.ty, &value)
        })
        .collect::<Result<Vec<_>, CaseError>>()?;

    check_support(emitter, &function.output)?;
    let expected = Value::parse(&function.output, &case.expected)?;
    let expected = render_literal(emitter, &function.output, &expected)?;

    let (a, b) = emitter.operands();
    let comparison = comparison(emitter, &function.output, a, b)?;

    Ok(emitter.statement(&CaseCall {
        index,
        function: &function.name,
        arguments,
        result_type: emitter.type_name(&function.output),
        expected,
        comparison,
    }))
}

/// One statement per test case, in declaration order. A case that cannot be
/// rendered becomes a statement reporting it as not evaluated.
pub fn emit_all(
    emitter: &dyn DriverEmitter,
    functions: &[FunctionSignature],
    cases: &[TestCase],
) -> Vec<DriverStatement> {
    cases
        .iter()
        .enumerate()
        .map(|(index, case)| match emit_case(emitter, functions, index, case) {
            Ok(code) => DriverStatement {
                index,
                code,
                skipped: None,
            },
            Err(error) => {
                warn!(
                    language = %emitter.language(),
                    test_id = index,
                    error = %error,
                    "Test case cannot be evaluated"
                );
                DriverStatement {
                    index,
                    code: emitter.skipped_statement(index, &error.to_string()),
                    skipped: Some(error),
                }
            }
        })
        .collect()
}

/// Empty function bodies for every signature, as a starting point for authors.
pub fn skeletons(
    emitter: &dyn DriverEmitter,
    functions: &[FunctionSignature],
) -> Result<String, CaseError> {
    let mut parts = Vec::with_capacity(functions.len());
    for function in functions {
        for parameter in &function.inputs {
            check_support(emitter, &parameter.ty)?;
        }
        check_support(emitter, &function.output)?;
        parts.push(emitter.skeleton(function));
    }
    Ok(parts.join("\n"))
}

#[cfg(test)]
pub(crate) mod test_support {
    use harness_common::types::{FunctionSignature, Parameter, TestCase, ValueType};

    pub fn signature(name: &str, inputs: &[(&str, &str)], output: &str) -> FunctionSignature {
        FunctionSignature {
            name: name.to_string(),
            inputs: inputs
                .iter()
                .map(|(name, ty)| Parameter {
                    name: name.to_string(),
                    ty: ValueType::parse(ty).unwrap(),
                })
                .collect(),
            output: ValueType::parse(output).unwrap(),
        }
    }

    pub fn make_test_case(function: &str, inputs: &[&str], expected: &str) -> TestCase {
        TestCase {
            function: function.to_string(),
            inputs: inputs.iter().map(|s| s.to_string()).collect(),
            expected: expected.to_string(),
            weight: 10,
        }
    }

    pub fn ty(text: &str) -> ValueType {
        ValueType::parse(text).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_all_keeps_declaration_order() {
        let functions = vec![signature("add", &[("x", "int32"), ("y", "int32")], "int32")];
        let cases = vec![
            make_test_case("add", &["2", "3"], "5"),
            make_test_case("add", &["-1", "1"], "0"),
            make_test_case("add", &["7", "8"], "15"),
        ];

        for language in Language::ALL {
            let statements = emit_all(emitter_for(language), &functions, &cases);
            let indices: Vec<usize> = statements.iter().map(|s| s.index).collect();
            assert_eq!(indices, vec![0, 1, 2], "{language}");
            assert!(statements.iter().all(|s| s.skipped.is_none()), "{language}");
        }
    }

    #[test]
    fn test_failing_case_is_isolated() {
        let functions = vec![signature("twice", &[("x", "int8")], "int8")];
        let cases = vec![
            make_test_case("twice", &["3"], "6"),
            make_test_case("twice", &["300"], "600"),
            make_test_case("missing", &["1"], "2"),
            make_test_case("twice", &["1", "2"], "2"),
            make_test_case("twice", &["4"], "8"),
        ];

        let statements = emit_all(&PythonEmitter, &functions, &cases);

        assert!(statements[0].skipped.is_none());
        assert!(matches!(
            statements[1].skipped,
            Some(CaseError::LiteralRendering { .. })
        ));
        assert_eq!(
            statements[2].skipped,
            Some(CaseError::UnknownFunction("missing".to_string()))
        );
        assert!(matches!(
            statements[3].skipped,
            Some(CaseError::ArityMismatch { expected: 1, actual: 2, .. })
        ));
        assert!(statements[4].skipped.is_none());
        assert!(statements[1].code.contains("report_skip(1,"));
    }

    #[test]
    fn test_malformed_value_is_case_error() {
        let functions = vec![signature("sum", &[("xs", "list<int32>")], "int32")];
        let cases = vec![make_test_case("sum", &["1, 2"], "3")];

        let statements = emit_all(&JavaEmitter, &functions, &cases);

        assert!(matches!(statements[0].skipped, Some(CaseError::ValueParse(_))));
    }

    #[test]
    fn test_unsupported_type_is_case_error() {
        let functions = vec![signature("price", &[], "decimal")];
        let cases = vec![make_test_case("price", &[], "1.50")];

        let js = emit_all(&JavascriptEmitter, &functions, &cases);
        assert!(matches!(
            js[0].skipped,
            Some(CaseError::TypeDescriptorUnsupported { language: Language::Javascript, .. })
        ));

        let java = emit_all(&JavaEmitter, &functions, &cases);
        assert!(java[0].skipped.is_none());
    }

    #[test]
    fn test_inexact_map_key_is_unsupported_everywhere() {
        let functions = vec![signature("f", &[], "map<float64, int32>")];
        let cases = vec![make_test_case("f", &[], "{}")];

        for language in Language::ALL {
            let statements = emit_all(emitter_for(language), &functions, &cases);
            assert!(
                matches!(statements[0].skipped, Some(CaseError::TypeDescriptorUnsupported { .. })),
                "{language}"
            );
        }
    }

    #[test]
    fn test_duplicate_map_keys_rejected() {
        let functions = vec![signature("f", &[], "map<int32, string>")];
        let cases = vec![make_test_case("f", &[], "{ 1: a, 01: b }")];

        let statements = emit_all(&CsharpEmitter, &functions, &cases);

        assert!(matches!(
            statements[0].skipped,
            Some(CaseError::LiteralRendering { .. })
        ));
    }

    #[test]
    fn test_comparison_nests_lambdas_by_depth() {
        let expr = comparison(&PythonEmitter, &ty("map<string, list<float64>>"), "ret", "expected").unwrap();
        assert_eq!(
            expr,
            "has_same_entries(ret, expected, lambda a1, b1: len(a1) == len(b1) and \
             has_same_elements(a1, b1, len(a1), lambda a2, b2: has_minimal_difference(a2, b2)))"
        );
    }

    #[test]
    fn test_comparison_canonicalizes_sets_only() {
        let set = comparison(&JavascriptEmitter, &ty("set<int32>"), "ret", "expected").unwrap();
        assert_eq!(
            set,
            "ret.size === expected.size && hasSameElements(canonical(ret), canonical(expected), ret.size)"
        );

        let list = comparison(&JavascriptEmitter, &ty("list<int32>"), "ret", "expected").unwrap();
        assert_eq!(
            list,
            "ret.length === expected.length && hasSameElements(ret, expected, ret.length)"
        );
    }

    #[test]
    fn test_skeletons_reject_unsupported_types() {
        let functions = vec![signature("f", &[("x", "set<float64>")], "int32")];
        assert!(matches!(
            skeletons(&RustEmitter, &functions),
            Err(CaseError::TypeDescriptorUnsupported { .. })
        ));
        assert!(skeletons(&PythonEmitter, &functions).is_ok());
    }

    #[test]
    fn test_emitters_report_their_language() {
        for language in Language::ALL {
            assert_eq!(emitter_for(language).language(), language);
        }
    }
}
