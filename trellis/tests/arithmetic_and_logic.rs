mod common;

use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use trellis::model::Repository;
use trellis::runtime::ErrorKind;

#[test]
fn variadic_plus_folds_a_collection() {
    let repo = Arc::new(Repository::new());
    let plus = native(&repo, "plus_Integer_MANY__Integer_1_");
    let body = apply(&repo, &plus, vec![ints(&repo, &[1, 2, 3, 4])]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), 10);
}

#[test]
fn single_operand_minus_negates() {
    let repo = Arc::new(Repository::new());
    let minus = native(&repo, "minus_Integer_MANY__Integer_1_");
    let body = apply(&repo, &minus, vec![ints(&repo, &[7])]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), -7);
}

#[test]
fn mixed_fold_promotes_to_float() {
    let repo = Arc::new(Repository::new());
    let plus = native(&repo, "plus_Number_MANY__Number_1_");
    let operands = repo.value_specification(vec![repo.integer(1), repo.float(0.5)]);
    let body = apply(&repo, &plus, vec![operands]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    let values = trellis::model::expr::unwrap_values(&result);
    assert!(matches!(
        values[0].primitive_value(),
        Some(trellis::model::PrimitiveValue::Float(f)) if f.into_inner() == 1.5
    ));
}

#[test]
fn integer_overflow_is_an_error_not_a_wrap() {
    let repo = Arc::new(Repository::new());
    let plus = native(&repo, "plus_Integer_MANY__Integer_1_");
    let operands = repo.value_specification(vec![repo.integer(i64::MAX), repo.integer(1)]);
    let body = apply(&repo, &plus, vec![operands]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let err = run(&repo, &main, vec![]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::IntegerOverflow {
            operation: "plus".to_string()
        }
    );
}

#[test]
fn division_by_zero_reports_the_call_site() {
    let repo = Arc::new(Repository::new());
    let divide = native(&repo, "divide_Number_1__Number_1__Float_1_");
    let site = trellis::model::SourceInfo::new("example.pure", 3, 9);
    let body = apply_at(
        &repo,
        &divide,
        vec![int(&repo, 1), int(&repo, 0)],
        site.clone(),
    );
    let main = defined(&repo, "main", vec![], vec![body]);
    let err = run(&repo, &main, vec![]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::DivisionByZero);
    assert_eq!(err.source_info, Some(site));
}

#[test]
fn and_short_circuits_the_right_operand() {
    let repo = Arc::new(Repository::new());
    let and = native(&repo, "and_Boolean_1__Boolean_1__Boolean_1_");
    let divide = native(&repo, "divide_Number_1__Number_1__Float_1_");
    // The right operand would divide by zero if evaluated.
    let poison = apply(&repo, &divide, vec![int(&repo, 1), int(&repo, 0)]);
    let is_empty = native(&repo, "isEmpty_Any_MANY__Boolean_1_");
    let right = apply(&repo, &is_empty, vec![poison]);
    let body = apply(&repo, &and, vec![boolean(&repo, false), right]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert!(!bool_result(&result));
}

#[test]
fn or_short_circuits_on_true() {
    let repo = Arc::new(Repository::new());
    let or = native(&repo, "or_Boolean_1__Boolean_1__Boolean_1_");
    let divide = native(&repo, "divide_Number_1__Number_1__Float_1_");
    let poison = apply(&repo, &divide, vec![int(&repo, 1), int(&repo, 0)]);
    let is_empty = native(&repo, "isEmpty_Any_MANY__Boolean_1_");
    let right = apply(&repo, &is_empty, vec![poison]);
    let body = apply(&repo, &or, vec![boolean(&repo, true), right]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert!(bool_result(&result));
}

#[test]
fn unknown_native_signature_is_unsupported() {
    let repo = Arc::new(Repository::new());
    let missing = native(&repo, "frobnicate_Any_1__Any_1_");
    let body = apply(&repo, &missing, vec![int(&repo, 1)]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let err = run(&repo, &main, vec![]).unwrap_err();
    assert_eq!(
        err.kind,
        ErrorKind::UnsupportedNative {
            signature: "frobnicate_Any_1__Any_1_".to_string()
        }
    );
}

#[test]
fn string_natives_round_out_the_library() {
    let repo = Arc::new(Repository::new());
    let to_upper = native(&repo, "toUpper_String_1__String_1_");
    let body = apply(&repo, &to_upper, vec![string(&repo, "hello")]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(string_result(&result), "HELLO");

    let join = native(&repo, "joinStrings_String_MANY__String_1__String_1_");
    let parts = repo.value_specification(vec![repo.string("a"), repo.string("b")]);
    let body = apply(&repo, &join, vec![parts, string(&repo, ", ")]);
    let main = defined(&repo, "main", vec![], vec![body]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(string_result(&result), "a, b");
}
