use super::*;
use crate::ast::NodeKind;
use crate::lexer::lex;

fn parse_src(src: &str) -> ParseResult {
    let lexed = lex(src, "t.c", &Options::default());
    assert!(lexed.errors.is_empty(), "lex errors: {:?}", lexed.errors);
    parse(&lexed.tokens, &Options::default())
}

fn decls(result: &ParseResult) -> Vec<NodeId> {
    match result.ast.kind(result.ast.root()) {
        NodeKind::TranslationUnit { decls } => decls.clone(),
        other => panic!("root is not a translation unit: {other:?}"),
    }
}

#[test]
fn parses_empty_main() {
    let result = parse_src("int main(void) { return 0; }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let ds = decls(&result);
    assert_eq!(ds.len(), 1);
    match result.ast.kind(ds[0]) {
        NodeKind::FunctionDef { name, params, variadic, .. } => {
            assert_eq!(name, "main");
            assert!(params.is_empty());
            assert!(!variadic);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn parses_global_var_with_initializer() {
    let result = parse_src("int count = 1 + 2 * 3;");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let ds = decls(&result);
    match result.ast.kind(ds[0]) {
        NodeKind::VarDecl { declarator, init, .. } => {
            assert_eq!(declarator.name, "count");
            let init = init.expect("initializer");
            // Multiplication binds tighter than addition.
            match result.ast.kind(init) {
                NodeKind::BinaryExpr { op, rhs, .. } => {
                    assert_eq!(*op, crate::ast::BinOp::Add);
                    assert!(matches!(result.ast.kind(*rhs), NodeKind::BinaryExpr { op: crate::ast::BinOp::Mul, .. }));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn for_statement_always_has_four_children() {
    let result = parse_src("void f(void) { for (;;) { } }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let body = match result.ast.kind(decls(&result)[0]) {
        NodeKind::FunctionDef { body, .. } => *body,
        other => panic!("unexpected {other:?}"),
    };
    let for_stmt = match result.ast.kind(body) {
        NodeKind::CompoundStmt { stmts } => stmts[0],
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(result.ast.children(for_stmt).len(), 4);
}

#[test]
fn if_else_has_three_children() {
    let result = parse_src("void f(void) { if (1) { } else { } }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let body = match result.ast.kind(decls(&result)[0]) {
        NodeKind::FunctionDef { body, .. } => *body,
        other => panic!("unexpected {other:?}"),
    };
    let if_stmt = match result.ast.kind(body) {
        NodeKind::CompoundStmt { stmts } => stmts[0],
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(result.ast.children(if_stmt).len(), 3);
}

#[test]
fn typedef_name_is_recognised_as_a_type_in_later_declarations() {
    let result = parse_src("typedef int my_int; my_int x;");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let ds = decls(&result);
    assert_eq!(ds.len(), 2);
    match result.ast.kind(ds[1]) {
        NodeKind::VarDecl { declarator, .. } => {
            assert_eq!(declarator.ty.base, "my_int");
            assert_eq!(declarator.name, "x");
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn pointer_and_array_declarators() {
    let result = parse_src("int *p; int arr[10]; int matrix[2][3];");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let ds = decls(&result);
    match result.ast.kind(ds[0]) {
        NodeKind::VarDecl { declarator, .. } => assert_eq!(declarator.ty.pointer_depth, 1),
        other => panic!("unexpected {other:?}"),
    }
    match result.ast.kind(ds[1]) {
        NodeKind::VarDecl { declarator, .. } => assert_eq!(declarator.ty.dimensions, vec![Some(10)]),
        other => panic!("unexpected {other:?}"),
    }
    match result.ast.kind(ds[2]) {
        NodeKind::VarDecl { declarator, .. } => assert_eq!(declarator.ty.dimensions, vec![Some(2), Some(3)]),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn struct_definition_and_member_access() {
    let result = parse_src(
        "struct point { int x; int y; };
         void f(void) { struct point p; p.x = 1; }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    match result.ast.kind(decls(&result)[0]) {
        NodeKind::StructSpecifier { tag, members } => {
            assert_eq!(tag.as_deref(), Some("point"));
            assert_eq!(members.len(), 2);
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn call_expression_collects_all_arguments_as_children() {
    let result = parse_src("void f(void) { add(1, 2, 3); }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
    let body = match result.ast.kind(decls(&result)[0]) {
        NodeKind::FunctionDef { body, .. } => *body,
        other => panic!("unexpected {other:?}"),
    };
    let call = match result.ast.kind(body) {
        NodeKind::CompoundStmt { stmts } => match result.ast.kind(stmts[0]) {
            NodeKind::ExprStmt { expr } => *expr,
            other => panic!("unexpected {other:?}"),
        },
        other => panic!("unexpected {other:?}"),
    };
    assert_eq!(result.ast.children(call).len(), 4);
}

#[test]
fn switch_with_fallthrough_case_and_default() {
    let result = parse_src(
        "void f(int x) { switch (x) { case 1: break; default: break; } }",
    );
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}

#[test]
fn recovers_after_a_malformed_declaration() {
    let lexed = lex("int @@@; int ok;", "t.c", &Options::default());
    let result = parse(&lexed.tokens, &Options::default());
    assert!(!result.errors.is_empty());
    // Recovery must still find the second, well-formed declaration.
    assert!(decls(&result).iter().any(|&id| matches!(
        result.ast.kind(id),
        NodeKind::VarDecl { declarator, .. } if declarator.name == "ok"
    )));
}

#[test]
fn cast_expression_vs_parenthesised_expression() {
    let result = parse_src("typedef int my_int; void f(void) { int x = (my_int)1; int y = (x); }");
    assert!(result.errors.is_empty(), "{:?}", result.errors);
}
