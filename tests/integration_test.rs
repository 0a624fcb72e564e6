//! End-to-end scenarios: literal source in, exact stdout out, run through
//! the full lexer -> parser -> evaluator pipeline via the crate's public
//! `run_source` entry point.

use std::cell::RefCell;
use std::io::Write;
use std::path::PathBuf;
use std::rc::Rc;

struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.borrow_mut().write(buf)
    }
    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn run(source: &str) -> (bool, String) {
    run_in(source, std::env::temp_dir())
}

fn run_in(source: &str, base_dir: PathBuf) -> (bool, String) {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let had_error = myco::run_source(source, base_dir, Box::new(SharedBuf(Rc::clone(&buf))))
        .expect("pipeline should not fail to lex/parse");
    let out = String::from_utf8(buf.borrow().clone()).unwrap();
    (had_error, out)
}

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn scenario_1_operator_precedence() {
    let (had_error, out) = run("let x = 2 + 3 * 4; print(x);");
    assert!(!had_error);
    assert_eq!(out, "14\n");
}

#[test]
fn scenario_2_string_concatenation() {
    let (had_error, out) = run(r#"let s = "Hello"; let t = "World"; print(s + " " + t);"#);
    assert!(!had_error);
    assert_eq!(out, "Hello World\n");
}

#[test]
fn scenario_3_for_range_ascending() {
    let (_, out) = run("for i in 1:5: print(i); end");
    assert_eq!(out, "1\n2\n3\n4\n5\n");
}

#[test]
fn scenario_4_for_range_descending_with_step() {
    let (_, out) = run("for i in 10:1:-2: print(i); end");
    assert_eq!(out, "10\n8\n6\n4\n2\n");
}

#[test]
fn scenario_5_try_catch_division_by_zero() {
    let (had_error, out) = run("try: let x = 10 / 0; catch err: print(err); end");
    assert!(!had_error, "the error was caught, so the run is clean");
    assert!(out.contains("division by zero"));
    assert_eq!(out.lines().count(), 1);
}

#[test]
fn scenario_6_module_function_call_via_alias_and_fallback() {
    let source = r#"
        use "m" as m;
        print(m.double(21));
        print(double(21));
    "#;
    let (had_error, out) = run_in(source, fixtures_dir());
    assert!(!had_error);
    assert_eq!(out, "42\n42\n");
}

#[test]
fn scenario_6b_module_qualified_constant() {
    let source = r#"
        use "m" as m;
        print(m.greeting);
    "#;
    let (had_error, out) = run_in(source, fixtures_dir());
    assert!(!had_error);
    assert_eq!(out, "hi from m\n");
}

#[test]
fn property_reset_between_runs_is_deterministic() {
    let source = "let x = 3; for i in 1:x: print(i * i); end";
    let (_, first) = run(source);
    let (_, second) = run(source);
    assert_eq!(first, second);
    assert_eq!(first, "1\n4\n9\n");
}

#[test]
fn property_uncaught_try_binds_nonzero_value_and_prints_one_line() {
    let (had_error, out) = run("try: print(1 / 0); catch err: print(err); end print(2);");
    assert!(!had_error);
    assert_eq!(out, "division by zero\n2\n");
}

#[test]
fn property_integer_arithmetic_matches_two_complement_math() {
    let cases: &[(&str, i64)] = &[
        ("1000000000 + 1000000000", 2_000_000_000),
        ("-1000000000 - 1000000000", -2_000_000_000),
        ("-7 * 6", -42),
    ];
    for (expr, expected) in cases {
        let (_, out) = run(&format!("print({expr});"));
        assert_eq!(out, format!("{expected}\n"), "for expression `{expr}`");
    }
}

#[test]
fn property_for_range_visits_every_value_in_order_ascending() {
    let (_, out) = run("for i in -2:2: print(i); end");
    assert_eq!(out, "-2\n-1\n0\n1\n2\n");
}

#[test]
fn property_for_range_with_negative_step_stops_at_or_above_end() {
    let (_, out) = run("for i in 9:0:-4: print(i); end");
    // 9, 5, 1 -- the next would be -3, which is below end=0, so it stops.
    assert_eq!(out, "9\n5\n1\n");
}

#[test]
fn property_zero_step_never_iterates() {
    let (_, out) = run("for i in 1:5:0: print(i); end print(\"after\");");
    assert_eq!(out, "after\n");
}

#[test]
fn ternary_expression_evaluates_the_matching_branch() {
    let (had_error, out) = run(r#"print(3 > 2 ? "yes" : "no"); print(1 > 2 ? "yes" : "no");"#);
    assert!(!had_error);
    assert_eq!(out, "yes\nno\n");
}

#[test]
fn break_exits_only_the_nearest_enclosing_loop() {
    let source = r#"
        for outer in 1:3:
            for inner in 1:3:
                if inner == 2: break; end
                print(outer * 10 + inner);
            end
        end
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "11\n21\n31\n");
}

#[test]
fn continue_skips_to_the_next_iteration() {
    let (had_error, out) = run("for i in 1:5: if i == 3: continue; end print(i); end");
    assert!(!had_error);
    assert_eq!(out, "1\n2\n4\n5\n");
}

#[test]
fn property_loop_safety_cap_terminates_runaway_loop() {
    // Recovery is per-statement (§7): the runaway loop raises an uncaught
    // error, but the following top-level `print` still executes.
    let (had_error, out) = run("let i = 0; while true: i = i + 1; end print(99);");
    assert!(had_error);
    assert_eq!(out, "99\n");
}

#[test]
fn property_function_defined_in_module_matches_for_both_call_forms() {
    let source = r#"
        use "m" as m;
        let via_alias = m.double(5);
        let via_fallback = double(5);
        print(via_alias == via_fallback);
    "#;
    let (had_error, out) = run_in(source, fixtures_dir());
    assert!(!had_error);
    assert_eq!(out, "true\n");
}

#[test]
fn after_try_error_state_is_clear_for_the_next_statement() {
    let source = "try: let x = 1 / 0; catch e: print(\"caught\"); end print(missing); print(\"after\");";
    let (had_error, out) = run(source);
    assert!(had_error, "the second print references an undefined variable");
    assert_eq!(out, "caught\nafter\n");
}

#[test]
fn switch_executes_the_first_matching_case_only() {
    let source = r#"
        let x = 2;
        switch x:
            case 1: print("one"); end
            case 2: print("two"); end
            case 2: print("two again"); end
            default: print("other"); end
        end
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "two\n");
}

#[test]
fn switch_falls_back_to_default_when_nothing_matches() {
    let source = r#"
        let x = 9;
        switch x:
            case 1: print("one"); end
            default: print("other"); end
        end
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "other\n");
}

#[test]
fn switch_with_no_match_and_no_default_is_a_no_op() {
    let source = r#"
        let x = 9;
        switch x:
            case 1: print("one"); end
        end
        print("after");
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "after\n");
}

#[test]
fn arrays_support_literal_access_and_assignment() {
    let source = r#"
        let a = [10, 20, 30];
        print(a[1]);
        a[1] = 99;
        print(a[1]);
        a[3] = 40;
        print(a[3]);
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "20\n99\n40\n");
}

#[test]
fn object_properties_auto_vivify_on_first_assignment() {
    let source = r#"
        player.name = "Mira";
        player.level = 3;
        print(player.name);
        print(player.level);
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "Mira\n3\n");
}

#[test]
fn string_methods_dispatch_through_dot_access() {
    let source = r#"
        let s = "  Hello  ";
        print(s.length);
        s.trim;
        print(s);
        s.upper;
        print(s);
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "9\nHello\nHELLO\n");
}

#[test]
fn split_and_join_round_trip_through_a_string_array() {
    let source = r#"
        let parts = "a,b,c".split(",");
        print(parts[1]);
        print(parts.join("-"));
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "b\na-b-c\n");
}

#[test]
fn math_library_dispatches_through_use_alias() {
    let source = r#"
        use "math" as math;
        print(math.sqrt(9));
        print(math.abs(-4));
        print(math.pow(2, 10));
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "3\n4\n1024\n");
}

#[test]
fn json_library_encodes_and_decodes_through_use_alias() {
    let source = r#"
        use "json" as json;
        let text = json.encode([1, 2, 3]);
        let back = json.decode(text);
        print(back[2]);
    "#;
    let (had_error, out) = run(source);
    assert!(!had_error);
    assert_eq!(out, "3\n");
}

#[test]
fn missing_module_file_is_a_function_call_error_reported_and_recovered() {
    let source = r#"use "no_such_module" as m; print("still running");"#;
    let (had_error, out) = run(source);
    assert!(had_error);
    assert_eq!(out, "still running\n");
}

#[test]
fn unrecognized_character_is_reported_as_a_lex_error_before_parsing() {
    let buf = Rc::new(RefCell::new(Vec::new()));
    let err = myco::run_source("let x = 1;\n@", std::env::temp_dir(), Box::new(SharedBuf(Rc::clone(&buf))))
        .expect_err("an unrecognized character should fail the pipeline before parsing");
    assert!(matches!(err, myco::error::PipelineError::Lex(_)));
    assert!(err.to_string().contains("Line 2"));
}
