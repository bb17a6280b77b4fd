// Semantic rules: declarations, inheritance, member access, types, control flow

use clasp::analyze;
use clasp::diagnostics::Diagnostic;
use clasp::semantics::errors::SemanticError;
use clasp::semantics::types::TypeInfo;

fn semantic_error(source: &str) -> SemanticError {
    match analyze(source) {
        Err(Diagnostic::Semantic { error, .. }) | Err(Diagnostic::Program { error }) => error,
        Err(other) => panic!("expected a semantic error, got: {}", other),
        Ok(_) => panic!("expected a semantic error, program was accepted"),
    }
}

/// `class Main` with `body` as its main entry, after `prelude`.
fn program(prelude: &str, body: &str) -> String {
    format!("{}\nclass Main {{ mainEntry() {{ {} }} }}", prelude, body)
}

fn accepts(prelude: &str, body: &str) {
    let source = program(prelude, body);
    if let Err(e) = analyze(&source) {
        panic!("rejected: {}\n{}", e, source);
    }
}

fn rejects(prelude: &str, body: &str) -> SemanticError {
    semantic_error(&program(prelude, body))
}

// ===== Declarations =====

#[test]
fn test_overloads() {
    let calc = r#"
        class Calc {
            public int function add(int a, int b) { return a + b; }
            public float function add(float a, float b) { return a + b; }
        }
    "#;
    accepts(
        calc,
        "declare Calc c = makeObj Calc(); declare int i = c.add(1, 2); declare float f = c.add(1.5, 2.5);",
    );

    let duplicate = r#"
        class Calc {
            public int function add(int a, int b) { return a + b; }
            public int function add(int x, int y) { return x; }
        }
    "#;
    assert!(matches!(
        rejects(duplicate, ""),
        SemanticError::MemberRedeclared { name, owner } if name == "add" && owner == "Calc"
    ));
}

#[test]
fn test_field_redeclaration() {
    assert!(matches!(
        rejects("class A { declare int v; declare float v; }", ""),
        SemanticError::MemberRedeclared { .. }
    ));
}

#[test]
fn test_local_redeclaration_and_shadowing() {
    accepts("", "declare int x = 1; if (true) { declare float x = 2.5; }");
    assert!(matches!(
        rejects("", "declare int x = 1; declare int x = 2;"),
        SemanticError::VariableRedeclared { name } if name == "x"
    ));
}

#[test]
fn test_scope_expiry() {
    assert!(matches!(
        rejects("", "if (true) { declare int inner = 1; } inner = 2;"),
        SemanticError::UndeclaredVariable { name } if name == "inner"
    ));

    let analysis = analyze(&program("", "if (true) { declare int inner = 1; }")).unwrap();
    assert!(analysis.symbols.lookup_scope("inner").is_none());
    assert_eq!(analysis.symbols.scope_depth(), 0);
}

#[test]
fn test_for_variable_is_loop_scoped() {
    assert!(matches!(
        rejects("", "for (declare int i = 0; i < 3; i += 1) { } i = 1;"),
        SemanticError::UndeclaredVariable { .. }
    ));
}

#[test]
fn test_main_rules() {
    assert!(matches!(
        semantic_error("struct S { mainEntry() { } }"),
        SemanticError::MainOutsideClass
    ));
    assert!(matches!(
        semantic_error("class A { mainEntry() { } } class B { mainEntry() { } }"),
        SemanticError::MainRedeclared
    ));
}

#[test]
fn test_undeclared_type() {
    assert!(matches!(
        rejects("class A { public Missing function f() { } }", ""),
        SemanticError::UndeclaredDefinition { name } if name == "Missing"
    ));
    assert!(matches!(
        rejects("", "declare Missing m;"),
        SemanticError::UndeclaredDefinition { name } if name == "Missing"
    ));
}

// ===== Inheritance and interfaces =====

#[test]
fn test_inheritance_substitution() {
    let family = "class A { } class B inherits A { } class C inherits B { }";
    accepts(family, "declare A a = makeObj B(); declare A deep = makeObj C();");
    assert!(matches!(
        rejects(family, "declare B b = makeObj A();"),
        SemanticError::IncompatibleAssignment { target, value } if target == "B" && value == "A"
    ));
}

#[test]
fn test_inheritance_rules() {
    assert!(matches!(
        semantic_error("class B inherits A { }"),
        SemanticError::UndeclaredParent { .. }
    ));
    assert!(matches!(
        semantic_error("private class A { } class B inherits A { }"),
        SemanticError::PrivateParent { .. }
    ));
    assert!(matches!(
        semantic_error("class A { } struct B inherits A { }"),
        SemanticError::InheritanceKindMismatch { .. }
    ));
}

#[test]
fn test_interfaces() {
    let shape = "interface Shape { int function sides(); }";
    accepts(
        &format!("{} class Square implements Shape {{ public int function sides() {{ return 4; }} }}", shape),
        "declare Shape s = makeObj Square(); declare int n = s.sides();",
    );

    assert!(matches!(
        semantic_error(&format!("{} class Blob implements Shape {{ }}", shape)),
        SemanticError::InterfaceNotImplemented { definition, interface }
            if definition == "Blob" && interface == "Shape"
    ));
    assert!(matches!(
        semantic_error("class A { } class B implements A { }"),
        SemanticError::NotAnInterface { .. }
    ));
    assert!(matches!(
        semantic_error("class B implements Nothing { }"),
        SemanticError::UndeclaredInterface { .. }
    ));
    assert!(matches!(
        semantic_error(&format!("{} class B implements Shape, Shape {{ }}", shape)),
        SemanticError::DuplicateInterface { .. }
    ));
    assert!(matches!(
        rejects(shape, "declare Shape s = makeObj Shape();"),
        SemanticError::InterfaceInstantiation { .. }
    ));
}

#[test]
fn test_interface_inheritance() {
    let interfaces = "interface I { int function f(); } interface J inherits I { int function g(); }";
    assert!(matches!(
        semantic_error(&format!(
            "{} class K implements J {{ public int function g() {{ return 1; }} }}",
            interfaces
        )),
        SemanticError::InterfaceNotImplemented { interface, .. } if interface == "J"
    ));
    accepts(
        &format!(
            "{} class K implements J {{ public int function f() {{ return 0; }} public int function g() {{ return 1; }} }}",
            interfaces
        ),
        "declare I i = makeObj K();",
    );
}

#[test]
fn test_inherited_constructor_is_reused() {
    let classes = "class A { constructor(int x) { } } class B inherits A { }";
    accepts(classes, "declare B b = makeObj B(1);");
    assert!(matches!(
        rejects(classes, "declare B b = makeObj B();"),
        SemanticError::UndeclaredConstructor { .. }
    ));
}

#[test]
fn test_private_definition() {
    let hidden = "private class Hidden { \
                  constructor() { } \
                  public static int function make() { declare Hidden h = makeObj Hidden(); return 1; } \
                  }";
    accepts(hidden, "declare int n = Hidden.make();");
    assert!(matches!(
        rejects(hidden, "declare Hidden h = makeObj Hidden();"),
        SemanticError::PrivateDefinition { .. }
    ));
}

// ===== Member access =====

#[test]
fn test_private_and_protected_members() {
    let classes = r#"
        class A {
            declare int secret;
            protected declare int shared;
        }
        class B inherits A {
            public void function touch() {
                shared = 1;
                super->shared = 2;
                this->shared = 3;
            }
        }
    "#;
    accepts(classes, "");
    assert!(matches!(
        rejects(classes, "declare A a = makeObj A(); a.secret = 1;"),
        SemanticError::PrivateMemberAccess { name } if name == "secret"
    ));
    assert!(matches!(
        rejects(classes, "declare A a = makeObj A(); a.shared = 1;"),
        SemanticError::ProtectedMemberAccess { .. }
    ));
    assert!(matches!(
        semantic_error(&program(
            "class A { declare int secret; } class B inherits A { public void function f() { secret = 1; } }",
            ""
        )),
        SemanticError::PrivateMemberAccess { .. }
    ));
}

#[test]
fn test_static_and_instance_access() {
    let counter = r#"
        class Counter {
            public static declare int total;
            public declare int own;
            public static int function read() { return total; }
            public int function mine() { return own; }
        }
    "#;
    accepts(
        counter,
        "declare Counter c = makeObj Counter(); Counter.total = 1; c.own = 2; \
         declare int a = Counter.read(); declare int b = c.read(); declare int d = c.mine();",
    );
    assert!(matches!(
        rejects(counter, "declare Counter c = makeObj Counter(); c.total = 1;"),
        SemanticError::StaticThroughInstance { .. }
    ));
    assert!(matches!(
        rejects(counter, "Counter.own = 1;"),
        SemanticError::InstanceThroughStatic { .. }
    ));
    assert!(matches!(
        rejects(counter, "declare int x = Counter.mine();"),
        SemanticError::InstanceThroughStatic { .. }
    ));
    assert!(matches!(
        rejects(counter, "Counter->total = 1;"),
        SemanticError::ArrowOnStatic
    ));
}

#[test]
fn test_dot_and_arrow() {
    let node = "class Node { public declare int value; }";
    accepts(
        node,
        "declare Node n = makeObj Node(); declare Node* p = &n; p->value = 1; n.value = 2;",
    );
    assert!(matches!(
        rejects(node, "declare Node n = makeObj Node(); declare Node* p = &n; p.value = 1;"),
        SemanticError::DotOnPointer { .. }
    ));
    assert!(matches!(
        rejects(node, "declare Node n = makeObj Node(); n->value = 1;"),
        SemanticError::ArrowOnNonPointer { .. }
    ));
    assert!(matches!(
        rejects(node, "declare int x = 1; x.value = 1;"),
        SemanticError::AccessOnPrimitive { .. }
    ));
    assert!(matches!(
        rejects(node, "declare Node[2] ns = []; ns.value = 1;"),
        SemanticError::AccessOnArray { .. }
    ));
}

#[test]
fn test_super_without_parent() {
    assert!(matches!(
        semantic_error("class A { declare int v; public void function f() { super->v = 1; } }"),
        SemanticError::NoParentClass
    ));
}

#[test]
fn test_calls() {
    let tool = r#"
        class Tool {
            public int function f() { return 1; }
            public void function g() { }
            public int[] function list() { return [1, 2]; }
        }
    "#;
    accepts(
        tool,
        "declare Tool t = makeObj Tool(); t.g(); declare int x = t.f() + t.list()[1];",
    );
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); t.f() = 2;"),
        SemanticError::AssignToCall
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); t.h();"),
        SemanticError::UndeclaredMethod { name, .. } if name == "h"
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); t.f(1);"),
        SemanticError::UndeclaredMethod { args, .. } if args == "int"
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); declare int x = t.f;"),
        SemanticError::FunctionUsedAsVariable { .. }
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); declare int x = t.f()[0];"),
        SemanticError::CallResultNotArray
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); declare int x = t.g().y;"),
        SemanticError::VoidAccess
    ));
    assert!(matches!(
        rejects(tool, "declare Tool t = makeObj Tool(); declare int x = t.g();"),
        SemanticError::IncompatibleAssignment { .. }
    ));
}

// ===== Arrays =====

#[test]
fn test_subscripts() {
    accepts("", "declare int[2][2] g = [[1, 2], [3, 4]]; g[0][1] = 5; declare int[] row = g[1];");
    assert!(matches!(
        rejects("", "declare int[2] a = [1, 2]; a[0][1] = 3;"),
        SemanticError::TooManySubscripts { name } if name == "a"
    ));
    assert!(matches!(
        rejects("", "declare int x = 1; x[0] = 2;"),
        SemanticError::NotAnArray { .. }
    ));
    assert!(matches!(
        rejects("", "declare int[2] a = [1, 2]; a[1.5] = 3;"),
        SemanticError::NonIntegerIndex { .. }
    ));
}

#[test]
fn test_array_literal_rules() {
    accepts("", "declare int[][] empty = [[], []]; declare int[][][] cube = [];");
    assert!(matches!(
        rejects("", "declare int x = 1; declare int* p = &x; declare int[] a = [p];"),
        SemanticError::PointerArrayElement
    ));
    assert!(matches!(
        rejects("", "declare int[][][][] a;"),
        SemanticError::ArrayTooDeep { max: 3 }
    ));
}

// ===== Types =====

#[test]
fn test_assignment_compatibility() {
    let analysis = analyze(&program("", "declare float x = 1 + 2;")).unwrap();
    let x = analysis
        .symbols
        .scope_table()
        .iter()
        .find(|e| e.name == "x")
        .unwrap();
    assert_eq!(x.type_info, TypeInfo::float());

    assert!(matches!(
        rejects("", "declare int x = 2.5;"),
        SemanticError::IncompatibleAssignment { target, value } if target == "int" && value == "float"
    ));
    assert!(matches!(
        rejects("", "declare int x = 1; x = \"text\";"),
        SemanticError::IncompatibleAssignment { .. }
    ));
    assert!(matches!(
        rejects("", "declare bool b = true; b += 1;"),
        SemanticError::UnsupportedBinary { .. }
    ));
}

#[test]
fn test_widening_is_for_plain_values_only() {
    accepts("", "declare float x = 1; declare int n = 2; x = n; x += n;");
    assert!(matches!(
        rejects("", "declare float[] f = [1.5]; declare int[] n = [1]; f = n;"),
        SemanticError::IncompatibleAssignment { target, value } if target == "float[]" && value == "int[]"
    ));
    assert!(matches!(
        rejects("", "declare int i = 1; declare float* p = &i;"),
        SemanticError::IncompatibleAssignment { target, value } if target == "float*" && value == "int*"
    ));
}

#[test]
fn test_deref_of_call_statement() {
    let source = "class A { public int function f() { return 1; } }";
    assert!(matches!(
        rejects(source, "declare A a = makeObj A(); *a.f();"),
        SemanticError::UnsupportedUnary { operand, .. } if operand == "int"
    ));
    accepts(source, "declare A a = makeObj A(); a.f();");
}

#[test]
fn test_conditions_must_be_bool() {
    assert!(matches!(
        rejects("", "if (1) { }"),
        SemanticError::NonBoolCondition { found } if found == "int"
    ));
    assert!(matches!(
        rejects("", "while (\"yes\") { }"),
        SemanticError::NonBoolCondition { .. }
    ));
    accepts("", "declare int a = 1; if (a != 2 && a == 1) { }");
}

// ===== Control flow =====

#[test]
fn test_returns() {
    assert!(matches!(
        semantic_error(&program("class A { public int function f() { return; } }", "")),
        SemanticError::MissingReturnValue { .. }
    ));
    assert!(matches!(
        semantic_error(&program("class A { public void function f() { return 1; } }", "")),
        SemanticError::UnexpectedReturnValue
    ));
    assert!(matches!(
        semantic_error(&program("class A { public int function f() { return \"s\"; } }", "")),
        SemanticError::IncompatibleReturn { found, expected } if found == "string" && expected == "int"
    ));
    assert!(matches!(
        rejects("", "return 1;"),
        SemanticError::UnexpectedReturnValue
    ));
    accepts("class A { public float function f() { return 1; } }", "return;");
}

#[test]
fn test_continue_outside_loop() {
    assert!(matches!(
        rejects("", "if (true) { continue; }"),
        SemanticError::OutsideLoop { keyword } if keyword == "continue"
    ));
}
