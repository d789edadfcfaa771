//! End-to-end rule tests: build controller trees, run a full pass, inspect
//! the report.

use proptest::prelude::*;
use routecheck_check::{
    check_source, check_unit, Checker, CheckerConfig, Diagnostic, DiagnosticKind, ReturnGap,
    TypeMatching,
};
use routecheck_core::ast::{LoopKind, MethodKind};
use routecheck_core::span::Span;
use routecheck_core::tree::{
    ClassNode, ExprNode, MethodNode, ShapeNode, SourceFile, StmtNode, TypeDecl, TypeNode,
};
use routecheck_core::{ClassDecl, CoreError, Decorator, ExprId, SourceUnit, StmtId, StmtKind};

const PATH: &str = "src/user.controller.ts";

fn controller(methods: Vec<MethodNode>) -> SourceFile {
    let class = methods.into_iter().fold(
        ClassNode::new("UserController")
            .decorator(ExprNode::decorator("BasePath", vec![ExprNode::string("/user")]))
            .at(3, 1),
        ClassNode::method,
    );
    SourceFile {
        path: PATH.into(),
        classes: vec![class],
        types: vec![],
    }
}

fn response(status: u16, types: &[&str], line: u32) -> ExprNode {
    let type_arg = match types {
        [single] => ExprNode::ident(single),
        many => ExprNode::array(many.iter().map(|t| ExprNode::ident(t)).collect()),
    };
    ExprNode::decorator("Response", vec![ExprNode::num(status), type_arg]).at(line, 3)
}

/// `return this.rtn<tag>(status, value)` laid out on one line.
fn rtn(line: u32, tag: Option<&str>, status: u16) -> StmtNode {
    let type_args = tag
        .map(|name| TypeNode::Named {
            name: name.into(),
            span: Span::new(line, 25),
        })
        .into_iter()
        .collect();
    StmtNode::ret(
        ExprNode::call(
            ExprNode::member(ExprNode::this(), "rtn"),
            type_args,
            vec![ExprNode::num(status).at(line, 33), ExprNode::ident("value")],
        )
        .at(line, 16),
    )
    .at(line, 9)
}

fn handler(contracts: Vec<ExprNode>, body: Vec<StmtNode>) -> MethodNode {
    contracts
        .into_iter()
        .fold(MethodNode::new("getUser").at(10, 3), MethodNode::decorator)
        .body(body)
}

fn run(file: &SourceFile) -> Vec<Diagnostic> {
    check_unit(&file.lower_unit(), None, &CheckerConfig::default()).diagnostics
}

fn kinds(file: &SourceFile) -> Vec<DiagnosticKind> {
    run(file).iter().map(Diagnostic::kind).collect()
}

#[test]
fn handlers_without_contracts_are_ignored() {
    let file = controller(vec![MethodNode::new("health").body(vec![
        StmtNode::ret(ExprNode::object(vec![])),
        StmtNode::ret_empty(),
    ])]);
    assert!(run(&file).is_empty());
}

#[test]
fn non_controller_classes_are_ignored() {
    let file = SourceFile {
        path: PATH.into(),
        classes: vec![ClassNode::new("Plain").method(handler(
            vec![response(200, &["UserDTO"], 9)],
            vec![StmtNode::ret_empty()],
        ))],
        types: vec![],
    };
    assert!(run(&file).is_empty());
}

#[test]
fn constructors_and_accessors_are_not_handlers() {
    let file = controller(vec![
        handler(vec![response(200, &["UserDTO"], 9)], vec![]).kind(MethodKind::Constructor),
        handler(vec![response(200, &["UserDTO"], 9)], vec![]).kind(MethodKind::Getter),
    ]);
    assert!(run(&file).is_empty());
}

#[test]
fn baseline_valid_handler_is_clean() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![rtn(12, Some("UserDTO"), 200)],
    )]);
    assert!(run(&file).is_empty());
}

#[test]
fn duplicate_status_reported_once_on_second_decorator() {
    let file = controller(vec![handler(
        vec![response(200, &["A"], 8), response(200, &["B"], 9)],
        vec![rtn(12, Some("A"), 200)],
    )]);
    assert_eq!(
        run(&file),
        vec![Diagnostic::DuplicateStatus {
            location: Span::new(9, 3),
            handler: "UserController.getUser".into(),
            decorator: "Response".into(),
            status: 200,
            first: Span::new(8, 3),
        }]
    );
}

#[test]
fn duplicate_status_lookups_resolve_to_first_declaration() {
    let file = controller(vec![handler(
        vec![response(200, &["A"], 8), response(200, &["B"], 9)],
        vec![rtn(12, Some("B"), 200)],
    )]);
    assert_eq!(
        kinds(&file),
        vec![DiagnosticKind::DuplicateStatus, DiagnosticKind::TypeMismatch]
    );
}

#[test]
fn undeclared_status_is_invalid_and_supersedes_type_check() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 8), response(402, &["ViewRenderer"], 9)],
        vec![rtn(12, Some("Nope"), 404)],
    )]);
    let diagnostics = run(&file);
    assert_eq!(diagnostics.len(), 1);
    match &diagnostics[0] {
        Diagnostic::InvalidStatus {
            status,
            declared,
            location,
            ..
        } => {
            assert_eq!(*status, 404);
            assert_eq!(declared, &vec![200, 402]);
            assert_eq!(*location, Span::new(12, 33));
        }
        other => panic!("expected invalidStatus, got {:?}", other),
    }
}

#[test]
fn type_mismatch_lists_accepted_union() {
    let file = controller(vec![handler(
        vec![response(200, &["A", "B"], 9)],
        vec![rtn(12, Some("C"), 200)],
    )]);
    let diagnostics = run(&file);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(
        diagnostics[0].to_string(),
        "Generic type 'C' does not match any of expected type 'A, B' for status 200."
    );
}

#[test]
fn empty_body_reports_missing_return_on_handler() {
    let file = controller(vec![handler(vec![response(200, &["UserDTO"], 9)], vec![])]);
    assert_eq!(
        run(&file),
        vec![Diagnostic::MissingEmptyReturn {
            location: Span::new(10, 3),
            handler: "UserController.getUser".into(),
            decorator: "Response".into(),
            gap: ReturnGap::NoReachableReturn,
        }]
    );
}

#[test]
fn bodiless_handler_reports_missing_return() {
    let mut method = handler(vec![response(200, &["UserDTO"], 9)], vec![]);
    method.body = None;
    assert_eq!(kinds(&controller(vec![method])), vec![DiagnosticKind::MissingEmptyReturn]);
}

#[test]
fn returns_only_inside_nested_callables_do_not_count() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![
            StmtNode::function("helper", vec![rtn(12, Some("UserDTO"), 200)]),
            StmtNode::expr(ExprNode::call(
                ExprNode::ident("later"),
                vec![],
                vec![ExprNode::function(vec![rtn(14, Some("UserDTO"), 200)])],
            )),
        ],
    )]);
    assert_eq!(kinds(&file), vec![DiagnosticKind::MissingEmptyReturn]);
}

#[test]
fn both_branches_are_checked_independently() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![StmtNode::if_else(
            ExprNode::ident("found"),
            rtn(12, Some("UserDTO"), 200),
            Some(rtn(14, Some("Other"), 200)),
        )],
    )]);
    let diagnostics = run(&file);
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind(), DiagnosticKind::TypeMismatch);
    assert_eq!(diagnostics[0].location().line, 14);
}

#[test]
fn each_site_yields_at_most_one_finding() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![
            StmtNode::ret_empty().at(12, 9),
            StmtNode::ret(ExprNode::object(vec![])).at(13, 9),
            StmtNode::ret(ExprNode::this_call(
                "rtn",
                Some("UserDTO"),
                vec![ExprNode::ident("status"), ExprNode::ident("value")],
            ))
            .at(14, 9),
            rtn(15, None, 200),
            StmtNode::looped(LoopKind::ForOf, rtn(16, Some("UserDTO"), 200)),
        ],
    )]);
    assert_eq!(
        kinds(&file),
        vec![
            DiagnosticKind::MissingEmptyReturn,
            DiagnosticKind::MalformedReturn,
            DiagnosticKind::StatusNotNumeric,
            DiagnosticKind::MissingTypeTag,
        ]
    );
}

#[test]
fn malformed_annotations_are_reported_and_excluded() {
    let file = controller(vec![handler(
        vec![
            ExprNode::decorator("Response", vec![ExprNode::num(200)]).at(8, 3),
            ExprNode::decorator("Response", vec![ExprNode::ident("OK"), ExprNode::ident("A")])
                .at(9, 3),
        ],
        vec![rtn(12, Some("A"), 200)],
    )]);
    // No valid contract survives, so the handler is not checked further.
    assert_eq!(
        kinds(&file),
        vec![
            DiagnosticKind::MalformedAnnotation,
            DiagnosticKind::MalformedAnnotation
        ]
    );
}

#[test]
fn schema_accessor_contracts_match_plain_tags() {
    let file = controller(vec![handler(
        vec![ExprNode::decorator(
            "Response",
            vec![
                ExprNode::num(200),
                ExprNode::member(ExprNode::ident("UserDTO"), "z"),
            ],
        )],
        vec![rtn(12, Some("UserDTO"), 200)],
    )]);
    assert!(run(&file).is_empty());
}

#[test]
fn custom_conventions_are_honoured() {
    let file = SourceFile {
        path: PATH.into(),
        classes: vec![ClassNode::new("Api")
            .decorator(ExprNode::decorator("Route", vec![]))
            .method(
                MethodNode::new("list")
                    .decorator(ExprNode::decorator(
                        "Returns",
                        vec![ExprNode::num(200), ExprNode::ident("List")],
                    ))
                    .body(vec![StmtNode::ret(ExprNode::this_call(
                        "reply",
                        Some("List"),
                        vec![ExprNode::num(200), ExprNode::ident("items")],
                    ))]),
            )],
        types: vec![],
    };
    let config = CheckerConfig::from_json(
        r#"{"controllerMarkers": ["Route"], "contractDecorator": "Returns", "returnMethod": "reply"}"#,
    )
    .unwrap();
    let report = Checker::new(&config).check(&file.lower_unit());
    assert!(report.is_clean(), "{}", report.render_text());
    // Under the stock conventions the class is not a controller at all.
    assert!(run(&file).is_empty());
}

#[test]
fn faulty_handler_is_dropped_without_aborting_the_pass() {
    let file = controller(vec![
        handler(vec![response(200, &["A"], 9)], vec![rtn(12, Some("A"), 200)]),
        MethodNode::new("other")
            .decorator(response(200, &["A"], 20))
            .body(vec![rtn(22, Some("B"), 200)]),
    ]);
    let mut unit: SourceUnit = file.lower_unit();
    let (_, class) = unit.classes().next().unwrap();
    let broken = class.methods[0].body.unwrap();
    unit.set_stmt_kind(broken, StmtKind::Block(vec![StmtId(9_999)]))
        .unwrap();

    let report = check_unit(&unit, None, &CheckerConfig::default());
    assert_eq!(report.kinds(), vec![DiagnosticKind::TypeMismatch]);
    assert_eq!(report.diagnostics[0].handler(), "UserController.other");
}

#[test]
fn annotation_findings_are_dropped_with_a_faulty_handler() {
    let file = controller(vec![handler(
        vec![
            ExprNode::decorator("Response", vec![ExprNode::num(200)]).at(8, 3),
            response(200, &["A"], 9),
        ],
        vec![rtn(12, Some("A"), 200)],
    )]);
    let mut unit = file.lower_unit();
    let (_, class) = unit.classes().next().unwrap();
    let broken = class.methods[0].body.unwrap();
    unit.set_stmt_kind(broken, StmtKind::Block(vec![StmtId(9_999)]))
        .unwrap();

    let report = check_unit(&unit, None, &CheckerConfig::default());
    assert!(report.is_clean(), "{}", report.render_text());
}

#[test]
fn annotation_findings_follow_handler_order() {
    let file = controller(vec![
        handler(vec![response(200, &["A"], 9)], vec![rtn(12, Some("B"), 200)]),
        MethodNode::new("other")
            .decorator(ExprNode::decorator("Response", vec![ExprNode::num(200)]).at(20, 3))
            .decorator(response(201, &["A"], 21))
            .body(vec![rtn(24, Some("A"), 201)]),
    ]);
    let report = run(&file);
    let sites: Vec<_> = report
        .iter()
        .map(|d| (d.kind(), d.handler().to_string()))
        .collect();
    assert_eq!(
        sites,
        vec![
            (DiagnosticKind::TypeMismatch, "UserController.getUser".to_string()),
            (DiagnosticKind::MalformedAnnotation, "UserController.other".to_string()),
        ]
    );
}

#[test]
fn faulty_class_does_not_affect_sibling_controllers() {
    let file = SourceFile {
        path: PATH.into(),
        classes: vec![ClassNode::new("Good")
            .decorator(ExprNode::decorator("BasePath", vec![ExprNode::string("/good")]))
            .method(handler(vec![response(200, &["A"], 9)], vec![rtn(12, Some("B"), 200)]))],
        types: vec![],
    };
    let mut unit = file.lower_unit();
    let (_, good) = unit.classes().next().unwrap();
    let later = ClassDecl {
        name: "Later".into(),
        ..good.clone()
    };
    unit.add_class(ClassDecl {
        name: "Bad".into(),
        decorators: vec![Decorator {
            expr: ExprId(9_999),
            span: Span::new(30, 1),
        }],
        methods: vec![],
        span: Span::new(31, 1),
    });
    unit.add_class(later);

    let report = check_unit(&unit, None, &CheckerConfig::default());
    assert_eq!(
        report.kinds(),
        vec![DiagnosticKind::TypeMismatch, DiagnosticKind::TypeMismatch]
    );
    assert_eq!(report.diagnostics[0].handler(), "Good.getUser");
    assert_eq!(report.diagnostics[1].handler(), "Later.getUser");
}

#[test]
fn identifier_mode_ignores_broken_type_declarations() {
    let mut file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![rtn(12, Some("UserDTO"), 200)],
    )]);
    file.types = vec![TypeDecl {
        name: "UserAlias".into(),
        shape: ShapeNode::Alias {
            target: "Missing".into(),
        },
    }];

    let report = check_source(&file, &CheckerConfig::default()).unwrap();
    assert!(report.is_clean(), "{}", report.render_text());

    let config = CheckerConfig {
        strict_type_matching: TypeMatching::Assignability,
        ..CheckerConfig::default()
    };
    assert!(matches!(
        check_source(&file, &config),
        Err(CoreError::UnknownTypeName { .. })
    ));
}

#[test]
fn inline_type_tags_are_only_checked_by_assignability() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO"], 9)],
        vec![StmtNode::ret(ExprNode::call(
            ExprNode::member(ExprNode::this(), "rtn"),
            vec![TypeNode::anonymous("{ id: number }")],
            vec![ExprNode::num(200), ExprNode::ident("value")],
        ))],
    )]);
    assert!(kinds(&file).is_empty());

    let config = CheckerConfig {
        strict_type_matching: TypeMatching::Assignability,
        ..CheckerConfig::default()
    };
    let report = check_source(&file, &config).unwrap();
    assert_eq!(report.kinds(), vec![DiagnosticKind::TypeMismatch]);
}

#[test]
fn assignability_mode_uses_declared_types() {
    let json = r#"{
        "path": "src/user.controller.ts",
        "classes": [{
            "name": "UserController",
            "decorators": [{"type": "call", "callee": {"type": "ident", "name": "BasePath"}, "args": [{"type": "string", "value": "/user"}]}],
            "methods": [{
                "name": "getUser",
                "decorators": [{"type": "call", "callee": {"type": "ident", "name": "Response"},
                                "args": [{"type": "number", "value": 200}, {"type": "ident", "name": "UserDTO"}]}],
                "body": [
                    {"type": "return", "argument": {
                        "type": "call",
                        "callee": {"type": "member", "object": {"type": "this"}, "property": "rtn"},
                        "typeArgs": [{"name": "UserAlias"}],
                        "args": [{"type": "number", "value": 200}, {"type": "ident", "name": "user"}]
                    }}
                ]
            }]
        }],
        "types": [
            {"name": "UserDTO", "shape": {"kind": "object", "fields": {"id": "number", "name": "string"}}},
            {"name": "UserAlias", "shape": {"kind": "alias", "target": "UserDTO"}}
        ]
    }"#;
    let file = SourceFile::from_json(json).unwrap();

    let identifier = check_source(&file, &CheckerConfig::default()).unwrap();
    assert_eq!(identifier.kinds(), vec![DiagnosticKind::TypeMismatch]);

    let config = CheckerConfig {
        strict_type_matching: TypeMatching::Assignability,
        ..CheckerConfig::default()
    };
    let assignable = check_source(&file, &config).unwrap();
    assert!(assignable.is_clean(), "{}", assignable.render_text());
}

#[test]
fn rendered_report() {
    let file = controller(vec![handler(
        vec![response(200, &["UserDTO", "SomethingDTO"], 9)],
        vec![
            rtn(12, Some("UserDTO"), 200),
            rtn(14, Some("Other"), 200),
            rtn(16, Some("UserDTO"), 404),
            StmtNode::ret(ExprNode::object(vec![])).at(18, 9),
        ],
    )]);
    let report = check_unit(&file.lower_unit(), None, &CheckerConfig::default());
    insta::assert_snapshot!(report.render_text(), @r"
    src/user.controller.ts:14:25: typeMismatch: Generic type 'Other' does not match any of expected type 'UserDTO, SomethingDTO' for status 200.
    src/user.controller.ts:16:33: invalidStatus: Returned status 404 is not defined in @Response.
    src/user.controller.ts:18:9: malformedReturn: Return must be in the form: return this.rtn(status, res)
    ");
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn arb_leaf() -> impl Strategy<Value = StmtNode> {
    prop_oneof![
        Just(StmtNode::ret_empty()),
        Just(StmtNode::other()),
        Just(StmtNode::ret(ExprNode::object(vec![]))),
        (prop_oneof![Just(200u16), Just(201), Just(404)], prop_oneof![
            Just(None),
            Just(Some("A")),
            Just(Some("B")),
        ])
            .prop_map(|(status, tag)| StmtNode::ret(ExprNode::this_call(
                "rtn",
                tag,
                vec![ExprNode::num(status), ExprNode::ident("value")],
            ))),
    ]
}

fn arb_body() -> impl Strategy<Value = Vec<StmtNode>> {
    let stmt = arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(StmtNode::block),
            (inner.clone(), prop::option::of(inner.clone())).prop_map(|(then, otherwise)| {
                StmtNode::if_else(ExprNode::ident("cond"), then, otherwise)
            }),
            inner.clone().prop_map(|body| StmtNode::looped(LoopKind::While, body)),
            prop::collection::vec(inner, 0..3).prop_map(|body| StmtNode::function("f", body)),
        ]
    });
    prop::collection::vec(stmt, 0..6)
}

proptest! {
    #[test]
    fn zero_contract_handlers_never_produce_findings(body in arb_body()) {
        let file = controller(vec![MethodNode::new("free").body(body)]);
        prop_assert!(run(&file).is_empty());
    }

    #[test]
    fn repeated_passes_are_identical(body in arb_body()) {
        let file = controller(vec![handler(vec![response(200, &["A"], 9)], body)]);
        let unit = file.lower_unit();
        let config = CheckerConfig::default();
        let first = check_unit(&unit, None, &config);
        let second = check_unit(&unit, None, &config);
        prop_assert_eq!(first, second);
    }

    #[test]
    fn findings_never_exceed_reachable_sites(body in arb_body()) {
        let file = controller(vec![handler(vec![response(200, &["A"], 9)], body)]);
        let unit = file.lower_unit();
        let report = check_unit(&unit, None, &CheckerConfig::default());
        let (_, class) = unit.classes().next().unwrap();
        let sites = routecheck_check::returns::locate_returns(
            &unit,
            routecheck_check::contracts::HandlerId(0),
            class.methods[0].body.unwrap(),
        )
        .unwrap();
        prop_assert!(report.diagnostics.len() <= sites.len().max(1));
    }
}
