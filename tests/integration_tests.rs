use std::rc::Rc;

use cstepper::error::{ErrorKind, RuntimeErrorKind};
use cstepper::interpreter::{Interpreter, StepResult};
use cstepper::options::Options;
use cstepper::recorder::ExecutionReport;
use cstepper::{lexer, parser};

/// Run lexer → parser → interpreter on `src` to completion, asserting no
/// lex/parse errors along the way.
fn run_pipeline(src: &str) -> (Interpreter, ExecutionReport) {
    let options = Options::default();
    let lexed = lexer::lex(src, "test.c", &options);
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let parsed = parser::parse(&lexed.tokens, &options);
    assert!(
        parsed.errors.is_empty(),
        "parser errors: {:?}",
        parsed.errors
    );
    let mut interp = Interpreter::new(parsed.ast, options, Rc::from("test.c"));
    loop {
        match interp.run() {
            StepResult::Finished(report) => return (interp, report),
            StepResult::Errored(e) => panic!("unexpected runtime error: {e}"),
            StepResult::BreakpointHit | StepResult::Paused => continue,
            StepResult::NeedsInput => panic!("program blocked on input with none provided"),
        }
    }
}

/// Like `run_pipeline`, but for programs expected to end in a runtime error.
fn run_pipeline_expect_error(src: &str, options: Options) -> cstepper::error::SourceError {
    let lexed = lexer::lex(src, "test.c", &options);
    assert!(lexed.errors.is_empty(), "lexer errors: {:?}", lexed.errors);
    let parsed = parser::parse(&lexed.tokens, &options);
    assert!(
        parsed.errors.is_empty(),
        "parser errors: {:?}",
        parsed.errors
    );
    let mut interp = Interpreter::new(parsed.ast, options, Rc::from("test.c"));
    loop {
        match interp.run() {
            StepResult::Finished(report) => {
                panic!("expected a runtime error, program finished: {report:?}")
            }
            StepResult::Errored(e) => return e,
            StepResult::BreakpointHit | StepResult::Paused => continue,
            StepResult::NeedsInput => panic!("program blocked on input with none provided"),
        }
    }
}

#[test]
fn scenario_1_hello_world() {
    let (mut interp, report) = run_pipeline(r#"int main() { printf("Hi\n"); return 0; }"#);
    assert_eq!(interp.consume_output(), "Hi\n");
    assert_eq!(report.summary.exit_code, 0);
    assert!(!report.summary.errored);
    let snapshot = interp.snapshot();
    assert!(snapshot.stack.is_empty());
    assert!(snapshot.heap.blocks.is_empty());
}

#[test]
fn scenario_2_counted_loop() {
    let (mut interp, _report) = run_pipeline(
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
    assert_eq!(interp.consume_output(), "0\n1\n2\n");
}

#[test]
fn scenario_3_switch_fallthrough() {
    let (mut interp, _report) = run_pipeline(
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
    assert_eq!(interp.consume_output(), "AB");
}

#[test]
fn scenario_4_heap_alloc_and_free() {
    let (_interp, report) = run_pipeline(
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
    assert_eq!(report.summary.exit_code, 42);
    assert!(!report.summary.errored);
}

#[test]
fn scenario_5_division_by_zero() {
    let err = run_pipeline_expect_error(
        "int main() { int x = 1 / 0; return x; }",
        Options::default(),
    );
    assert_eq!(
        err.kind,
        ErrorKind::from(RuntimeErrorKind::DivByZero)
    );
    assert_eq!(err.line, 1);
}

#[test]
fn scenario_6_step_count_guard() {
    let options = Options {
        max_steps: 1000,
        ..Options::default()
    };
    let err = run_pipeline_expect_error("int main() { while (1) { } }", options);
    assert_eq!(err.kind, ErrorKind::from(RuntimeErrorKind::StepLimit));
}
