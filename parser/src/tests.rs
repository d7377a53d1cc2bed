//! Whole-program tests that run source text through the single-pass front
//! end and inspect the diagnostics and the emitted IR.
use pasc_dsl::core::FileId;
use pasc_dsl::diagnostic::Severity;

use crate::{compile, CompileResult};

fn compile_source(source: &str) -> CompileResult {
    compile(source, &FileId::default())
}

fn error_codes(result: &CompileResult) -> Vec<&'static str> {
    result
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Error)
        .map(|diagnostic| diagnostic.code)
        .collect()
}

fn ir(result: &CompileResult) -> &str {
    result.ir.as_deref().expect("expected successful compilation")
}

#[test]
fn compile_when_empty_program_then_entry_point_only_returns() {
    let result = compile_source("PROGRAM t IS BEGIN END PROGRAM.");
    assert!(result.diagnostics.is_empty());
    let output = ir(&result);
    assert!(output.contains("define i32 @main() {\n\tret i32 0\n}"));
}

#[test]
fn compile_when_keywords_mixed_case_then_accepted() {
    let result = compile_source("program T is begin end Program.");
    assert!(result.ir.is_some());
}

#[test]
fn compile_when_integer_addition_then_no_conversion_before_store() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; BEGIN x := 3 + 4; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("add i32 3, 4"));
    // Both sides are integer scalars, so the store takes the sum directly.
    let body = output.split("@main").nth(1).unwrap();
    let body = body.split("define").next().unwrap();
    assert!(!body.contains("sitofp"));
    assert!(!body.contains("fptosi"));
    assert!(!body.contains("zext"));
}

#[test]
fn compile_when_integer_assigned_to_float_then_conversion_inserted() {
    let result =
        compile_source("PROGRAM t IS VARIABLE x : FLOAT; BEGIN x := 1; END PROGRAM.");
    assert!(ir(&result).contains("sitofp i32 1 to float"));
}

#[test]
fn compile_when_array_assigned_scalar_then_array_size_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER[5]; VARIABLE y : INTEGER; \
         BEGIN x := y + 1; END PROGRAM.",
    );
    // The RHS broadcasts y + 1? No: y is scalar, 1 is scalar, so the RHS is
    // a scalar and the assignment to the 5-element array must fail;
    // assignment never broadcasts.
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0006"]);
}

#[test]
fn compile_when_array_combined_with_scalar_then_broadcasts() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE a : INTEGER[3]; BEGIN a := a + 1; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("extractvalue [3 x i32]"));
    assert!(output.contains("insertvalue [3 x i32] undef"));
    assert!(output.contains("store [3 x i32]"));
}

#[test]
fn compile_when_arrays_of_different_sizes_combined_then_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE a : INTEGER[3]; VARIABLE b : INTEGER[5]; \
         VARIABLE c : INTEGER[3]; BEGIN c := a + b; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0006"]);
}

#[test]
fn compile_when_undeclared_procedure_called_then_unknown_symbol() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE b : BOOL; BEGIN b := FOO(1); END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0004"]);
}

#[test]
fn compile_when_duplicate_name_differs_by_case_then_duplicate_symbol() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; VARIABLE X : FLOAT; BEGIN END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0003"]);
}

#[test]
fn compile_when_global_variable_then_visible_inside_procedure() {
    let result = compile_source(
        "PROGRAM t IS \
         GLOBAL VARIABLE shared : INTEGER; \
         PROCEDURE bump : INTEGER () \
         BEGIN \
             shared := shared + 1; \
             RETURN shared; \
         END PROCEDURE; \
         BEGIN END PROGRAM.",
    );
    assert!(result.diagnostics.is_empty());
    assert!(ir(&result).contains("@g0_shared = global i32 0"));
}

#[test]
fn compile_when_nested_procedure_reads_outer_local_then_unknown_symbol() {
    // Lookup consults only the innermost frame and the globals, so the
    // local of the enclosing procedure must not resolve.
    let result = compile_source(
        "PROGRAM t IS \
         PROCEDURE outer : INTEGER () \
             VARIABLE hidden : INTEGER; \
             PROCEDURE inner : INTEGER () \
             BEGIN \
                 RETURN hidden; \
             END PROCEDURE; \
         BEGIN \
             RETURN 1; \
         END PROCEDURE; \
         BEGIN END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0004"]);
}

#[test]
fn compile_when_procedure_parameter_then_usable_like_local() {
    let result = compile_source(
        "PROGRAM t IS \
         PROCEDURE double : INTEGER (VARIABLE value : INTEGER) \
         BEGIN \
             RETURN value * 2; \
         END PROCEDURE; \
         VARIABLE x : INTEGER; \
         BEGIN \
             x := double(21); \
         END PROGRAM.",
    );
    assert!(result.diagnostics.is_empty());
    let output = ir(&result);
    assert!(output.contains("define private i32 @p0_double(i32 %arg0)"));
    assert!(output.contains("call i32 @p0_double(i32 21)"));
}

#[test]
fn compile_when_return_at_program_scope_then_error() {
    let result = compile_source("PROGRAM t IS BEGIN RETURN 1; END PROGRAM.");
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0009"]);
}

#[test]
fn compile_when_return_type_convertible_then_conversion_inserted() {
    let result = compile_source(
        "PROGRAM t IS \
         PROCEDURE half : FLOAT (VARIABLE value : INTEGER) \
         BEGIN \
             RETURN value; \
         END PROCEDURE; \
         BEGIN END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("sitofp i32"));
    assert!(output.contains("ret float"));
}

#[test]
fn compile_when_builtin_called_then_lowered_to_runtime_routine() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE ok : BOOL; BEGIN ok := PUTINTEGER(42); END PROGRAM.",
    );
    assert!(ir(&result).contains("call i1 @putInteger(i32 42)"));
}

#[test]
fn compile_when_builtin_arity_wrong_then_arity_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : FLOAT; BEGIN x := SQRT(1, 2); END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0007"]);
}

#[test]
fn compile_when_builtin_argument_type_wrong_then_type_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : FLOAT; BEGIN x := SQRT(\"nine\"); END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_bool_assigned_float_then_type_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE b : BOOL; BEGIN b := 1.5; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_string_equality_then_runtime_compare() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE s : STRING; VARIABLE b : BOOL; \
         BEGIN b := s == \"hello\"; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("call i1 @str.eq(i8*"));
    assert!(output.contains("private constant [128 x i8] c\"hello"));
}

#[test]
fn compile_when_string_ordering_compared_then_type_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE s : STRING; VARIABLE b : BOOL; \
         BEGIN b := s < \"hello\"; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_string_array_declared_then_rejected() {
    let result =
        compile_source("PROGRAM t IS VARIABLE s : STRING[4]; BEGIN END PROGRAM.");
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_array_bound_zero_then_invalid_bound() {
    let result =
        compile_source("PROGRAM t IS VARIABLE a : INTEGER[0]; BEGIN END PROGRAM.");
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0008"]);
}

#[test]
fn compile_when_indexing_scalar_then_type_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; BEGIN x[0] := 1; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_indexed_assignment_then_element_store() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE a : INTEGER[5]; BEGIN a[2] := 9; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("getelementptr [5 x i32]"));
    assert!(output.contains("store i32 9, i32*"));
}

#[test]
fn compile_when_if_with_integer_condition_then_coerced_to_bool() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; \
         BEGIN \
             IF (x) THEN \
                 x := 1; \
             ELSE \
                 x := 2; \
             END IF; \
         END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("icmp ne i32"));
    assert!(output.contains("br i1"));
}

#[test]
fn compile_when_if_condition_is_array_then_error() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE a : INTEGER[3]; VARIABLE x : INTEGER; \
         BEGIN IF (a) THEN x := 1; END IF; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_for_loop_then_condition_block_re_evaluated() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE i : INTEGER; VARIABLE ok : BOOL; \
         BEGIN \
             FOR (i := 0; i < 10) \
                 ok := PUTINTEGER(i); \
                 i := i + 1; \
             END FOR; \
         END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("icmp slt i32"));
    // One jump into the condition block, one back edge.
    assert!(output.contains("cond0:"));
    assert_eq!(output.matches("br label %cond0").count(), 2);
}

#[test]
fn compile_when_logical_operators_then_bitwise_over_integers() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; VARIABLE y : INTEGER; \
         BEGIN x := NOT x & y | 3; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("xor i32"));
    assert!(output.contains("and i32"));
    assert!(output.contains("or i32"));
}

#[test]
fn compile_when_logical_operator_on_float_then_type_mismatch() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : FLOAT; VARIABLE y : INTEGER; \
         BEGIN y := x & y; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0005"]);
}

#[test]
fn compile_when_negative_literal_then_sign_folded() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; BEGIN x := -7; END PROGRAM.",
    );
    assert!(ir(&result).contains("store i32 -7"));
}

#[test]
fn compile_when_negated_variable_then_negate_instruction() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : FLOAT; VARIABLE y : FLOAT; \
         BEGIN y := -x; END PROGRAM.",
    );
    assert!(ir(&result).contains("fneg float"));
}

#[test]
fn compile_when_trailing_content_then_warning_only() {
    let result = compile_source("PROGRAM t IS BEGIN END PROGRAM. leftovers");
    assert!(result.ir.is_some());
    assert!(!result.diagnostics.has_errors());
    let warnings: Vec<_> = result
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.severity == Severity::Warning)
        .collect();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].code, "P0010");
}

#[test]
fn compile_when_illegal_character_then_skipped_but_compilation_fails() {
    let result = compile_source("PROGRAM t IS BEGIN ? END PROGRAM.");
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result), vec!["P0001"]);
}

#[test]
fn compile_when_comments_everywhere_then_ignored() {
    let result = compile_source(
        "// leading comment\n\
         PROGRAM t IS /* block /* nested */ comment */ \n\
         VARIABLE x : INTEGER; // trailing\n\
         BEGIN x := 1; END PROGRAM.",
    );
    assert!(result.diagnostics.is_empty());
    assert!(result.ir.is_some());
}

#[test]
fn compile_when_first_error_hit_then_no_further_diagnostics() {
    // Both statements are bad; only the first is reported.
    let result = compile_source(
        "PROGRAM t IS BEGIN a := 1; b := 2; END PROGRAM.",
    );
    assert!(result.ir.is_none());
    assert_eq!(error_codes(&result).len(), 1);
}

#[test]
fn compile_when_global_procedure_recurses_then_resolves() {
    let result = compile_source(
        "PROGRAM t IS \
         GLOBAL PROCEDURE countdown : INTEGER (VARIABLE n : INTEGER) \
         BEGIN \
             IF (n > 0) THEN \
                 RETURN countdown(n - 1); \
             END IF; \
             RETURN 0; \
         END PROCEDURE; \
         BEGIN END PROGRAM.",
    );
    assert!(result.diagnostics.is_empty());
    assert!(ir(&result).contains("call i32 @p0_countdown"));
}

#[test]
fn compile_when_procedure_finishes_then_default_return_emitted() {
    let result = compile_source(
        "PROGRAM t IS \
         PROCEDURE noop : BOOL () \
         BEGIN \
         END PROCEDURE; \
         BEGIN END PROGRAM.",
    );
    assert!(ir(&result).contains("\tret i1 false\n}"));
}

#[test]
fn compile_when_mixed_numeric_comparison_then_promoted_to_float() {
    let result = compile_source(
        "PROGRAM t IS VARIABLE x : INTEGER; VARIABLE b : BOOL; \
         BEGIN b := x < 1.5; END PROGRAM.",
    );
    let output = ir(&result);
    assert!(output.contains("sitofp i32"));
    assert!(output.contains("fcmp olt float"));
}

#[test]
fn compile_when_runtime_library_then_always_linked() {
    let result = compile_source("PROGRAM t IS BEGIN END PROGRAM.");
    let output = ir(&result);
    assert!(output.contains("define private i1 @putBool"));
    assert!(output.contains("define private float @sqrtInt"));
}
