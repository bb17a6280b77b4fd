// End-to-end tests: source text in, tables, tree or diagnostic out

use clasp::analyze;
use clasp::diagnostics::{Diagnostic, DiagnosticKind};
use clasp::parser::lexer::tokenize;
use clasp::parser::parse::Parser;
use clasp::parser::token::TokenKind;
use clasp::semantics::errors::SemanticError;
use clasp::semantics::types::{MemberType, TypeInfo};

#[test]
fn test_minimal_program() {
    let source = r#"
        class Main {
            mainEntry() {}
        }
    "#;

    let analysis = analyze(source).expect("Parsing failed");
    let definitions = analysis.symbols.definitions();
    assert_eq!(definitions.len(), 1);

    let mut members: Vec<&str> = definitions[0]
        .members
        .iter()
        .map(|m| m.name.as_str())
        .collect();
    members.sort_unstable();
    assert_eq!(members, vec!["constructor", "mainEntry"]);
    assert!(analysis.symbols.scope_table().is_empty());

    assert_eq!(analysis.tree.label(), "program");
    assert_eq!(analysis.tree.count("main_method"), 1);
    assert_eq!(
        analysis.tokens.last().map(|t| t.kind),
        Some(TokenKind::EndMarker)
    );
}

#[test]
fn test_synthesized_constructor_is_public() {
    let analysis = analyze("class Main { mainEntry() {} }").unwrap();
    let (_, constructor) = analysis
        .symbols
        .lookup_member("constructor", "Main")
        .expect("constructor added");
    assert_eq!(constructor.access.to_string(), "public");
    assert_eq!(
        constructor.member_type,
        MemberType::Function {
            params: vec![],
            return_type: TypeInfo::void()
        }
    );
}

#[test]
fn test_duplicate_definition() {
    let source = r#"
class Foo { }
class Foo { }
class Main { mainEntry() {} }
"#;

    let err = analyze(source).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Semantic);
    assert_eq!(err.line(), Some(3));
    assert!(matches!(
        err.semantic_error(),
        Some(SemanticError::DefinitionRedeclared { name }) if name == "Foo"
    ));
}

#[test]
fn test_break_outside_loop() {
    let err = analyze("class Main { mainEntry() { break; } }").unwrap_err();
    assert!(matches!(
        err.semantic_error(),
        Some(SemanticError::OutsideLoop { keyword }) if keyword == "break"
    ));
    assert_eq!(
        err.to_string(),
        "Semantic error at line 1: break can only be used inside a loop"
    );
}

#[test]
fn test_loop_control_inside_loops() {
    let source = r#"
        class Main {
            mainEntry() {
                while (true) {
                    if (false) { break; }
                }
                for (declare int i = 0; i < 3; i += 1) {
                    continue;
                }
            }
        }
    "#;
    assert!(analyze(source).is_ok());
}

#[test]
fn test_missing_main() {
    let err = analyze("class A { }").unwrap_err();
    assert_eq!(
        err,
        Diagnostic::Program {
            error: SemanticError::MissingMain
        }
    );
    assert_eq!(err.line(), None);
}

#[test]
fn test_syntax_error_reports_token() {
    let source = "class Main {\n mainEntry() {\n declare int x = 1\n }\n}";
    let err = analyze(source).unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);
    assert_eq!(err.line(), Some(4));
    assert_eq!(err.message(), "error parsing '}', expected ';'");
}

#[test]
fn test_unconsumed_operators_are_rejected() {
    let err = analyze("class Main { mainEntry() { declare int x = 0; x++; } }").unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);

    let err = analyze("class Main { mainEntry() { declare int x = 0; x::y = 1; } }").unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);
}

#[test]
fn test_constructor_takes_no_modifiers() {
    for header in ["private constructor", "public constructor", "static constructor"] {
        let source = format!("class A {{\n {}() {{}}\n}}\nclass Main {{ mainEntry() {{}} }}", header);
        let err = analyze(&source).unwrap_err();
        assert_eq!(err.kind(), DiagnosticKind::Syntax, "{}", header);
        assert_eq!(err.line(), Some(2));
        assert!(err.message().starts_with("error parsing 'constructor'"), "{}", err);
    }
}

#[test]
fn test_statement_in_class_body() {
    let err = analyze("class A {\n x = 1;\n}\nclass Main { mainEntry() {} }").unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);
    assert_eq!(err.line(), Some(2));
    assert!(err.message().starts_with("error parsing 'x'"), "{}", err);

    let err = analyze("class A {\n Point p;\n}\nclass Main { mainEntry() {} }").unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);
}

#[test]
fn test_float_array_rejects_int_array() {
    let source = r#"
        class Main {
            mainEntry() {
                declare float[] f = [1.0, 2.0];
                declare int[] n = [1, 2];
                f = n;
            }
        }
    "#;
    let err = analyze(source).unwrap_err();
    assert_eq!(err.line(), Some(6));
    assert!(matches!(
        err.semantic_error(),
        Some(SemanticError::IncompatibleAssignment { target, value })
            if target == "float[]" && value == "int[]"
    ));
}

#[test]
fn test_invalid_lexeme_is_a_syntax_error() {
    let err = analyze("class Main { mainEntry() { declare int x = 12ab; } }").unwrap_err();
    assert_eq!(err.kind(), DiagnosticKind::Syntax);
}

#[test]
fn test_sign_attachment() {
    let kinds = |source: &str| -> Vec<(TokenKind, String)> {
        tokenize(source)
            .into_iter()
            .map(|t| (t.kind, t.value))
            .collect()
    };

    let assigned = kinds("x = -5;");
    assert_eq!(assigned[2], (TokenKind::IntegerLiteral, "-5".to_string()));
    assert_eq!(assigned.len(), 5);

    let subtracted = kinds("x -5;");
    assert_eq!(subtracted[1], (TokenKind::PlusMinus, "-".to_string()));
    assert_eq!(subtracted[2], (TokenKind::IntegerLiteral, "5".to_string()));
}

#[test]
fn test_tokenize_always_ends_with_one_marker() {
    for source in ["", "   ", "\"open", "'x", "/* never closed", "a b c", "@#$"] {
        let tokens = tokenize(source);
        let markers = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::EndMarker)
            .count();
        assert_eq!(markers, 1, "source {:?}", source);
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::EndMarker));
    }
}

#[test]
fn test_full_program() {
    let source = r#"
        interface Shape {
            float function area();
        }

        class Point {
            public declare int x, y;

            constructor(int x0, int y0) {
                this->x = x0;
                y = y0;
            }

            public int function sum() {
                return x + y;
            }
        }

        class Circle implements Shape {
            private declare float radius = 1.0;
            public static declare int count = 0;

            public float function area() {
                return 3.14 * radius * radius;
            }

            public static int function made() {
                return Circle.count;
            }
        }

        struct Pair {
            public declare int left, right;
        }

        class Main {
            mainEntry() {
                declare Point p = makeObj Point(1, 2);
                declare Point* pp = &p;
                declare int total = pp->sum() + p.x;
                declare int[3] values = [1, 2, 3];
                declare int[][] grid = [[1, 2], [3, 4]];

                for (declare int i = 0; i < 2; i += 1) {
                    total += values[i] + grid[i][0];
                    if (total > 10) {
                        break;
                    } else {
                        continue;
                    }
                }

                declare Shape s = makeObj Circle();
                declare float a = s.area();
                Circle.count += 1;
                declare int made = Circle.made();

                while (!(total == 0)) {
                    total -= 1;
                }

                declare int n = 5;
                declare int* q = &n;
                *q = 7;

                declare Pair pair = makeObj Pair();
                pair.left = -1;
                declare string greeting = "hi" + 'c';
            }
        }
    "#;

    let analysis = analyze(source).expect("Parsing failed");
    let symbols = &analysis.symbols;
    assert_eq!(symbols.definitions().len(), 5);

    let circle = symbols.lookup_definition("Circle").unwrap();
    assert_eq!(circle.interfaces, vec!["Shape".to_string()]);
    let (_, count) = symbols.lookup_member("count", "Circle").unwrap();
    assert!(count.is_static);

    let locals: Vec<&str> = symbols
        .scope_table()
        .iter()
        .map(|e| e.name.as_str())
        .collect();
    for name in ["x0", "y0", "p", "pp", "total", "i", "s", "made", "q", "greeting"] {
        assert!(locals.contains(&name), "missing local {}", name);
    }

    assert_eq!(analysis.tree.count("for_loop"), 1);
    assert_eq!(analysis.tree.count("object_creation"), 3);
}

#[test]
fn test_tree_exports_as_json() {
    let analysis = analyze("class Main { mainEntry() { declare int x = 1; } }").unwrap();
    let json = serde_json::to_value(&analysis.tree).unwrap();
    assert_eq!(json["node_type"], "program");

    let text = serde_json::to_string(&analysis.tree).unwrap();
    assert!(text.contains(r#""node_type":"INTEGER_LITERAL","value":"1","line":1"#));
    assert!(text.contains(r#"{"node_type":"null"}"#));
}

#[test]
fn test_independent_parsers() {
    let mut first = Parser::new("class Main { mainEntry() {} }");
    let mut second = Parser::new("class Main { mainEntry() {} }");
    assert!(first.parse_program().is_ok());
    assert!(second.parse_program().is_ok());
}
