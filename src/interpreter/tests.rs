use std::rc::Rc;

use super::*;
use crate::lexer;
use crate::memory::Value;
use crate::options::Options;
use crate::parser;

/// Lexes and parses `src`, panicking on any error — tests below only feed
/// well-formed programs, so a parse failure means the test fixture itself
/// is wrong.
fn build(src: &str) -> Interpreter {
    build_with(src, Options::default())
}

fn build_with(src: &str, options: Options) -> Interpreter {
    let lexed = lexer::lex(src, "test.c", &options);
    assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
    let parsed = parser::parse(&lexed.tokens, &options);
    assert!(parsed.errors.is_empty(), "parse errors: {:?}", parsed.errors);
    Interpreter::new(parsed.ast, options, Rc::from("test.c"))
}

fn run_to_completion(interp: &mut Interpreter) -> ExecutionReport {
    loop {
        match interp.run() {
            StepResult::Finished(report) => return report,
            StepResult::Errored(e) => panic!("unexpected runtime error: {e}"),
            StepResult::BreakpointHit | StepResult::Paused => continue,
            StepResult::NeedsInput => panic!("program blocked on input with none provided"),
        }
    }
}

#[test]
fn arithmetic_and_return_value() {
    let mut interp = build("int main() { int a = 2; int b = 3; return a * b + 1; }");
    let report = run_to_completion(&mut interp);
    assert_eq!(report.summary.exit_code, 7);
    assert!(!report.summary.errored);
}

#[test]
fn while_loop_prints_counted_output() {
    let mut interp = build(
        r#"
        int main() {
            int c = 0;
            while (c < 3) {
                printf("%d\n", c);
                c++;
            }
            return 0;
        }
        "#,
    );
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "0\n1\n2\n");
}

#[test]
fn for_loop_and_if_else_branching() {
    let mut interp = build(
        r#"
        int main() {
            int sum = 0;
            for (int i = 1; i <= 5; i++) {
                if (i % 2 == 0) {
                    sum += i;
                }
            }
            return sum;
        }
        "#,
    );
    let report = run_to_completion(&mut interp);
    assert_eq!(report.summary.exit_code, 6);
}

#[test]
fn recursive_function_call_is_evaluated_eagerly() {
    let mut interp = build(
        r#"
        int fact(int n) {
            if (n <= 1) {
                return 1;
            }
            return n * fact(n - 1);
        }
        int main() {
            return fact(5);
        }
        "#,
    );
    let report = run_to_completion(&mut interp);
    assert_eq!(report.summary.exit_code, 120);
}

#[test]
fn switch_fallthrough_runs_until_break() {
    let mut interp = build(
        r#"
        int main() {
            int x = 1;
            switch (x) {
                case 1: printf("A");
                case 2: printf("B"); break;
                case 3: printf("C");
            }
            return 0;
        }
        "#,
    );
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "AB");
}

#[test]
fn break_inside_switch_inside_loop_only_exits_the_switch() {
    let mut interp = build(
        r#"
        int main() {
            int i = 0;
            while (i < 2) {
                switch (i) {
                    case 0: printf("zero"); break;
                    default: printf("other"); break;
                }
                printf(".");
                i++;
            }
            return 0;
        }
        "#,
    );
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "zero.other.");
}

#[test]
fn malloc_write_read_and_free_round_trip() {
    let mut interp = build(
        r#"
        int main() {
            int* p = (int*)malloc(16);
            p[0] = 42;
            int v = p[0];
            free(p);
            return v;
        }
        "#,
    );
    let report = run_to_completion(&mut interp);
    assert_eq!(report.summary.exit_code, 42);
    assert_eq!(report.statistics.peak_heap_used, 16);
}

#[test]
fn division_by_zero_is_a_runtime_error() {
    let mut interp = build("int main() { int x = 1 / 0; return x; }");
    let result = interp.run();
    match result {
        StepResult::Errored(e) => assert_eq!(e.kind, crate::error::ErrorKind::from(RuntimeErrorKind::DivByZero)),
        other => panic!("expected a runtime error, got {other:?}"),
    }
}

#[test]
fn step_limit_guard_stops_an_infinite_loop() {
    let options = Options { max_steps: 50, ..Options::default() };
    let mut interp = build_with("int main() { while (1) { } return 0; }", options);
    let result = interp.run();
    match result {
        StepResult::Errored(e) => assert_eq!(e.kind, crate::error::ErrorKind::from(RuntimeErrorKind::StepLimit)),
        other => panic!("expected a step-limit error, got {other:?}"),
    }
}

#[test]
fn scanf_blocks_until_input_is_provided() {
    let mut interp = build(
        r#"
        int main() {
            int x;
            scanf("%d", &x);
            printf("got %d\n", x);
            return 0;
        }
        "#,
    );
    let result = interp.run();
    assert!(matches!(result, StepResult::NeedsInput), "expected NeedsInput, got {result:?}");
    interp.provide_input("41\n");
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "got 41\n");
}

#[test]
fn scanf_in_a_while_condition_suspends_instead_of_panicking() {
    let mut interp = build(
        r#"
        int main() {
            int x;
            int sum = 0;
            while (scanf("%d", &x) == 1) {
                sum += x;
            }
            printf("%d\n", sum);
            return 0;
        }
        "#,
    );
    let result = interp.run();
    assert!(matches!(result, StepResult::NeedsInput), "expected NeedsInput, got {result:?}");
    interp.provide_input("3\n");
    let result = interp.run();
    assert!(matches!(result, StepResult::NeedsInput), "expected NeedsInput again, got {result:?}");
    interp.provide_input("4\n");
    let result = interp.run();
    assert!(matches!(result, StepResult::NeedsInput), "expected a final NeedsInput, got {result:?}");
    // A non-numeric token makes scanf's `%d` conversion fail and return
    // the match count so far (0) rather than blocking again — this
    // simulator has no separate EOF signal, so this is how the loop
    // condition turns false and the program ends.
    interp.provide_input("x\n");
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "7\n");
}

#[test]
fn scanf_in_a_for_increment_suspends_instead_of_panicking() {
    let mut interp = build(
        r#"
        int main() {
            int x;
            int last = 0;
            for (; ; scanf("%d", &x), last = x) {
                if (last == 9) {
                    break;
                }
            }
            printf("%d\n", last);
            return 0;
        }
        "#,
    );
    let result = interp.run();
    assert!(matches!(result, StepResult::NeedsInput), "expected NeedsInput, got {result:?}");
    interp.provide_input("9\n");
    run_to_completion(&mut interp);
    assert_eq!(interp.consume_output(), "9\n");
}

#[test]
fn rewind_returns_to_an_earlier_recorded_state() {
    let mut interp = build("int main() { int a = 1; int b = 2; int c = 3; return c; }");
    run_to_completion(&mut interp);
    assert!(interp.has_previous());
    let first = interp.rewind();
    assert!(first.is_some());
}

#[test]
fn struct_member_access_reads_and_writes_through_offsets() {
    let mut interp = build(
        r#"
        struct Point { int x; int y; };
        int main() {
            struct Point p;
            p.x = 3;
            p.y = 4;
            return p.x + p.y;
        }
        "#,
    );
    let report = run_to_completion(&mut interp);
    assert_eq!(report.summary.exit_code, 7);
}

#[test]
fn value_default_is_zero_int() {
    assert_eq!(Value::default(), Value::Int(0));
}
