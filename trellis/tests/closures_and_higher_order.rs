mod common;

use std::sync::Arc;

use common::*;
use pretty_assertions::assert_eq;
use trellis::model::Repository;
use trellis::runtime::evaluator::LET_SIGNATURE;

fn let_binding(repo: &Repository, name: &str, value: trellis::NodeRef) -> trellis::NodeRef {
    let let_fn = native(repo, LET_SIGNATURE);
    apply(repo, &let_fn, vec![string(repo, name), value])
}

#[test]
fn map_applies_a_lambda_to_each_element() {
    let repo = Arc::new(Repository::new());
    let plus = native(&repo, "plus_Integer_MANY__Integer_1_");
    let operands = executable_values(&repo, vec![repo.variable("e"), int(&repo, 1)]);
    let body = apply(&repo, &plus, vec![operands]);
    let increment = lambda(&repo, vec![parameter("e")], vec![body], &[]);

    let map = native(&repo, "map_T_m__Function_1__V_m_");
    let call = apply(
        &repo,
        &map,
        vec![
            ints(&repo, &[1, 2, 3]),
            executable_values(&repo, vec![increment]),
        ],
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(ints_result(&result), vec![2, 3, 4]);
}

#[test]
fn lambdas_capture_their_definition_scope() {
    let repo = Arc::new(Repository::new());
    // f() { let n = 10; [1,2]->map(e | e + n) }
    let plus = native(&repo, "plus_Integer_MANY__Integer_1_");
    let operands = executable_values(
        &repo,
        vec![repo.variable("e"), repo.variable("n")],
    );
    let body = apply(&repo, &plus, vec![operands]);
    let add_n = lambda(&repo, vec![parameter("e")], vec![body], &["n"]);

    let map = native(&repo, "map_T_m__Function_1__V_m_");
    let call = apply(
        &repo,
        &map,
        vec![
            ints(&repo, &[1, 2]),
            executable_values(&repo, vec![add_n]),
        ],
    );
    let f = defined(
        &repo,
        "f",
        vec![],
        vec![let_binding(&repo, "n", int(&repo, 10)), call],
    );
    let result = run(&repo, &f, vec![]).unwrap();
    assert_eq!(ints_result(&result), vec![11, 12]);
}

#[test]
fn filter_keeps_matching_elements() {
    let repo = Arc::new(Repository::new());
    let less_than = native(&repo, "lessThan_Number_1__Number_1__Boolean_1_");
    let body = apply(
        &repo,
        &less_than,
        vec![repo.variable("e"), int(&repo, 3)],
    );
    let small = lambda(&repo, vec![parameter("e")], vec![body], &[]);

    let filter = native(&repo, "filter_T_MANY__Function_1__T_MANY_");
    let call = apply(
        &repo,
        &filter,
        vec![
            ints(&repo, &[5, 1, 4, 2]),
            executable_values(&repo, vec![small]),
        ],
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(ints_result(&result), vec![1, 2]);
}

#[test]
fn if_runs_only_the_taken_branch() {
    let repo = Arc::new(Repository::new());
    let if_fn = native(&repo, "if_Boolean_1__Function_1__Function_1__T_m_");
    let divide = native(&repo, "divide_Number_1__Number_1__Float_1_");
    let poison = apply(&repo, &divide, vec![int(&repo, 1), int(&repo, 0)]);
    let then_branch = lambda(&repo, vec![], vec![int(&repo, 1)], &[]);
    let else_branch = lambda(&repo, vec![], vec![poison], &[]);
    let call = apply(
        &repo,
        &if_fn,
        vec![
            boolean(&repo, true),
            executable_values(&repo, vec![then_branch]),
            executable_values(&repo, vec![else_branch]),
        ],
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), 1);
}

#[test]
fn if_branches_see_enclosing_locals() {
    let repo = Arc::new(Repository::new());
    let if_fn = native(&repo, "if_Boolean_1__Function_1__Function_1__T_m_");
    let branch = lambda(&repo, vec![], vec![repo.variable("n")], &["n"]);
    let call = apply(
        &repo,
        &if_fn,
        vec![
            boolean(&repo, true),
            executable_values(&repo, vec![branch.clone()]),
            executable_values(&repo, vec![branch]),
        ],
    );
    let main = defined(
        &repo,
        "main",
        vec![],
        vec![let_binding(&repo, "n", int(&repo, 7)), call],
    );
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), 7);
}

#[test]
fn eval_invokes_a_function_value() {
    let repo = Arc::new(Repository::new());
    let eval = native(&repo, "eval_Function_1__T_n__V_m_");
    let identity = lambda(
        &repo,
        vec![parameter("x")],
        vec![repo.variable("x")],
        &[],
    );
    let call = apply(
        &repo,
        &eval,
        vec![
            executable_values(&repo, vec![identity]),
            int(&repo, 42),
        ],
    );
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), 42);
}

#[test]
fn closures_survive_the_defining_frame() {
    let repo = Arc::new(Repository::new());
    // make() { let n = 5; {| $n} } then main() { make()->eval() }
    let make_body = vec![
        let_binding(&repo, "n", int(&repo, 5)),
        executable_values(
            &repo,
            vec![lambda(&repo, vec![], vec![repo.variable("n")], &["n"])],
        ),
    ];
    let make = defined(&repo, "make", vec![], make_body);
    let eval = native(&repo, "eval_Function_1__V_m_");
    let call = apply(&repo, &eval, vec![apply(&repo, &make, vec![])]);
    let main = defined(&repo, "main", vec![], vec![call]);
    let result = run(&repo, &main, vec![]).unwrap();
    assert_eq!(int_result(&result), 5);
}
