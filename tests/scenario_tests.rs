//! End-to-end behavior on hand-built trees, without the parser.

use apexgen::*;
use pretty_assertions::assert_eq;

fn class(modifiers: Vec<Modifier>, name: &str, members: Vec<ClassMember>) -> CompilationUnit {
    CompilationUnit {
        declarations: vec![TypeDeclaration::Class(ClassDeclaration {
            annotations: vec![],
            modifiers,
            name: name.to_string(),
            extends: None,
            implements: vec![],
            members,
        })],
    }
}

fn field(type_name: &str, name: &str, initializer: Option<Expression>) -> ClassMember {
    ClassMember::Field(FieldDeclaration {
        annotations: vec![],
        modifiers: vec![],
        type_ref: TypeRef::simple(type_name),
        declarators: vec![VariableDeclarator {
            name: name.to_string(),
            initializer,
        }],
    })
}

fn method(name: &str, statements: Vec<Statement>) -> ClassMember {
    ClassMember::Method(MethodDeclaration {
        annotations: vec![],
        modifiers: vec![],
        return_type: None,
        name: name.to_string(),
        parameters: vec![],
        body: Some(Block::new(statements)),
    })
}

fn account_query() -> Expression {
    Expression::Query(Box::new(Query {
        select: vec![
            SelectItem {
                field: QueryField::Path(QualifiedName::parse_dotted("Id")),
                alias: None,
            },
            SelectItem {
                field: QueryField::Path(QualifiedName::parse_dotted("Name")),
                alias: None,
            },
        ],
        from: "Account".to_string(),
        condition: Some(Condition::Comparison {
            field: QueryField::Path(QualifiedName::parse_dotted("Name")),
            operator: ComparisonOp::Equal,
            value: Expression::string("Bob"),
        }),
        order_by: vec![],
        limit: None,
        offset: None,
    }))
}

#[test]
fn test_class_with_initialized_field() {
    let unit = class(
        vec![Modifier::Public],
        "Foo",
        vec![field("Integer", "x", Some(Expression::Integer(1)))],
    );
    assert_eq!(
        generate(&unit).unwrap(),
        "public class Foo {\n    Integer x = 1;\n}"
    );
    assert!(resolve_imports(&unit, &ImportRegistry::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_query_imports_and_layout() {
    let unit = class(
        vec![],
        "Repo",
        vec![method(
            "load",
            vec![Statement::Variable(VariableDeclaration {
                is_final: false,
                type_ref: TypeRef::simple("Object"),
                declarators: vec![VariableDeclarator {
                    name: "rows".to_string(),
                    initializer: Some(account_query()),
                }],
            })],
        )],
    );

    let imports: Vec<_> = resolve_imports(&unit, &ImportRegistry::default())
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(
        imports,
        vec![
            "com.freedom_man.system.Account".to_string(),
            "com.freedom_man.system.Database".to_string(),
        ]
    );

    let expected = "\
class Repo {
    void load() {
        Object rows = [
            SELECT
                Id,
                Name
            FROM
                Account
            WHERE
                Name = 'Bob'
        ];
    }
}";
    assert_eq!(generate(&unit).unwrap(), expected);
}

#[test]
fn test_query_expression_alone() {
    let expected = "\
[
    SELECT
        Id,
        Name
    FROM
        Account
    WHERE
        Name = 'Bob'
]";
    assert_eq!(
        Generator::new().render_expression(&account_query()).unwrap(),
        expected
    );
}

#[test]
fn test_method_defaults_to_void_with_empty_body() {
    let unit = class(vec![], "A", vec![method("foo", vec![])]);
    let text = generate(&unit).unwrap();
    assert_eq!(text, "class A {\n    void foo() {\n    }\n}");
}

#[test]
fn test_no_builtin_names_means_no_imports() {
    let unit = class(
        vec![Modifier::Public],
        "Plain",
        vec![
            field("String", "label", Some(Expression::string("System"))),
            method(
                "run",
                vec![Statement::Expression(Expression::call(
                    Expression::name("helper.go"),
                    vec![Expression::name("label")],
                ))],
            ),
        ],
    );
    assert!(resolve_imports(&unit, &ImportRegistry::default())
        .unwrap()
        .is_empty());
}

#[test]
fn test_else_branch_renders_its_own_statements() {
    let stmt = Statement::If(IfStatement {
        condition: Expression::name("ready"),
        then_block: Block::new(vec![Statement::Expression(Expression::call(
            Expression::name("go"),
            vec![],
        ))]),
        else_branch: Some(ElseBranch::Block(Block::new(vec![Statement::Expression(
            Expression::call(Expression::name("wait"), vec![]),
        )]))),
    });
    assert_eq!(
        Generator::new().render_statement(&stmt).unwrap(),
        "if (ready) {\n    go();\n} else {\n    wait();\n}"
    );
}

#[test]
fn test_try_without_finally_renders_no_finally() {
    let stmt = Statement::Try(TryStatement {
        try_block: Block::default(),
        catch_clauses: vec![CatchClause {
            exception_type: TypeRef::simple("Exception"),
            variable: "e".to_string(),
            block: Block::default(),
        }],
        finally_block: None,
    });
    let text = Generator::new().render_statement(&stmt).unwrap();
    assert_eq!(text, "try {\n} catch (Exception e) {\n}");
}

#[test]
fn test_independent_subtrees_render_alike() {
    let unit = class(vec![], "A", vec![method("foo", vec![])]);
    let generator = Generator::new();
    let TypeDeclaration::Class(decl) = &unit.declarations[0] else {
        panic!("Expected class");
    };
    let nested = generator
        .render_type_declaration(&TypeDeclaration::Class(decl.clone()), 1)
        .unwrap();
    let top = generator.render(&unit).unwrap();
    let reindented: Vec<String> = top.lines().map(|l| format!("    {l}")).collect();
    assert_eq!(nested, reindented.join("\n"));
}
