use std::fmt;

/// A compilation unit - the top-level AST node representing a single Apex file
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompilationUnit {
    pub declarations: Vec<TypeDeclaration>,
}

/// A type declaration (class, interface, enum, or trigger)
#[derive(Debug, Clone, PartialEq)]
pub enum TypeDeclaration {
    Class(ClassDeclaration),
    Interface(InterfaceDeclaration),
    Enum(EnumDeclaration),
    Trigger(TriggerDeclaration),
}

/// A dotted identifier path (`System.debug`, `this.accounts`, `Schema.SObjectType`)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QualifiedName {
    pub segments: Vec<String>,
}

impl QualifiedName {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a dotted string into segments
    pub fn parse_dotted(dotted: &str) -> Self {
        Self::new(dotted.split('.'))
    }

    /// The qualifying (first) segment, used for import lookup
    pub fn first(&self) -> Option<&str> {
        self.segments.first().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("."))
    }
}

/// Type reference (e.g., String, List<Account>, Map<String, Integer>, String[])
#[derive(Debug, Clone, PartialEq)]
pub struct TypeRef {
    pub name: QualifiedName,
    pub type_arguments: Vec<TypeRef>,
    pub is_array: bool,
}

impl TypeRef {
    pub fn simple(name: &str) -> Self {
        Self {
            name: QualifiedName::parse_dotted(name),
            type_arguments: vec![],
            is_array: false,
        }
    }

    pub fn generic(name: &str, type_arguments: Vec<TypeRef>) -> Self {
        Self {
            name: QualifiedName::parse_dotted(name),
            type_arguments,
            is_array: false,
        }
    }
}

/// Declaration modifiers, kept in source order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Public,
    Private,
    Protected,
    Global,
    Static,
    Final,
    Abstract,
    Virtual,
    Override,
    Transient,
    TestMethod,
    WebService,
    WithSharing,
    WithoutSharing,
    InheritedSharing,
}

impl Modifier {
    pub fn as_str(self) -> &'static str {
        match self {
            Modifier::Public => "public",
            Modifier::Private => "private",
            Modifier::Protected => "protected",
            Modifier::Global => "global",
            Modifier::Static => "static",
            Modifier::Final => "final",
            Modifier::Abstract => "abstract",
            Modifier::Virtual => "virtual",
            Modifier::Override => "override",
            Modifier::Transient => "transient",
            Modifier::TestMethod => "testMethod",
            Modifier::WebService => "webService",
            Modifier::WithSharing => "with sharing",
            Modifier::WithoutSharing => "without sharing",
            Modifier::InheritedSharing => "inherited sharing",
        }
    }
}

/// An annotation (e.g., @isTest, @AuraEnabled(cacheable=true))
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub name: String,
    pub parameters: Vec<AnnotationParameter>,
}

impl Annotation {
    pub fn marker(name: &str) -> Self {
        Self {
            name: name.to_string(),
            parameters: vec![],
        }
    }
}

/// `key=value`, or a bare value (`@SuppressWarnings('PMD')`)
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationParameter {
    pub name: Option<String>,
    pub value: Expression,
}

/// Class declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub extends: Option<TypeRef>,
    pub implements: Vec<TypeRef>,
    pub members: Vec<ClassMember>,
}

/// Interface declaration
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub extends: Vec<TypeRef>,
    pub methods: Vec<MethodSignature>,
}

/// Enum declaration
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub values: Vec<String>,
}

/// Trigger declaration
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerDeclaration {
    pub name: String,
    pub object: String,
    pub events: Vec<TriggerEvent>,
    pub body: Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerEvent {
    pub timing: TriggerTiming,
    pub operation: DmlOperation,
}

impl fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timing = match self.timing {
            TriggerTiming::Before => "before",
            TriggerTiming::After => "after",
        };
        write!(f, "{} {}", timing, self.operation.keyword())
    }
}

/// Class member (field, method, property, constructor, inner type)
#[derive(Debug, Clone, PartialEq)]
pub enum ClassMember {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Constructor(ConstructorDeclaration),
    Property(PropertyDeclaration),
    InnerClass(ClassDeclaration),
    InnerInterface(InterfaceDeclaration),
    InnerEnum(EnumDeclaration),
}

/// Field declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
}

/// Variable declarator (name and optional initializer)
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclarator {
    pub name: String,
    pub initializer: Option<Expression>,
}

/// Method declaration; `return_type` of `None` renders as `void`
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    /// Abstract methods have no body
    pub body: Option<Block>,
}

/// Method signature (for interfaces)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodSignature {
    pub annotations: Vec<Annotation>,
    pub return_type: Option<TypeRef>,
    pub name: String,
    pub parameters: Vec<Parameter>,
}

/// Constructor declaration
#[derive(Debug, Clone, PartialEq)]
pub struct ConstructorDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub body: Block,
}

/// Property declaration
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyDeclaration {
    pub annotations: Vec<Annotation>,
    pub modifiers: Vec<Modifier>,
    pub type_ref: TypeRef,
    pub name: String,
    pub getter: Option<PropertyAccessor>,
    pub setter: Option<PropertyAccessor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyAccessor {
    pub modifiers: Vec<Modifier>,
    pub body: Option<Block>,
}

/// Method/constructor parameter
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub is_final: bool,
    pub type_ref: TypeRef,
    pub name: String,
}

/// Block of statements
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

impl Block {
    pub fn new(statements: Vec<Statement>) -> Self {
        Self { statements }
    }
}

/// Statement
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Block(Block),
    Variable(VariableDeclaration),
    Expression(Expression),
    If(IfStatement),
    For(ForStatement),
    ForEach(ForEachStatement),
    While(WhileStatement),
    DoWhile(DoWhileStatement),
    Switch(SwitchStatement),
    Return(Option<Expression>),
    Throw(Expression),
    Break,
    Continue,
    Try(TryStatement),
    Dml(DmlStatement),
    Empty,
}

/// Local variable declaration
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub is_final: bool,
    pub type_ref: TypeRef,
    pub declarators: Vec<VariableDeclarator>,
}

/// If statement. Branches are always blocks so braces are always emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub condition: Expression,
    pub then_block: Block,
    pub else_branch: Option<ElseBranch>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ElseBranch {
    Block(Block),
    /// `else if (...)` chain
    If(Box<IfStatement>),
}

/// Traditional for loop
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub init: Option<ForInit>,
    pub condition: Option<Expression>,
    pub update: Vec<Expression>,
    pub body: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ForInit {
    Variables(VariableDeclaration),
    Expressions(Vec<Expression>),
}

/// For-each loop
#[derive(Debug, Clone, PartialEq)]
pub struct ForEachStatement {
    pub type_ref: TypeRef,
    pub variable: String,
    pub iterable: Expression,
    pub body: Block,
}

/// While loop
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub condition: Expression,
    pub body: Block,
}

/// Do-while loop
#[derive(Debug, Clone, PartialEq)]
pub struct DoWhileStatement {
    pub body: Block,
    pub condition: Expression,
}

/// Switch statement (`switch on expr { when ... }`)
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchStatement {
    pub expression: Expression,
    pub when_clauses: Vec<WhenClause>,
    pub else_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WhenClause {
    pub condition: WhenCondition,
    pub block: Block,
}

#[derive(Debug, Clone, PartialEq)]
pub enum WhenCondition {
    Values(Vec<Expression>),
    Type { type_ref: TypeRef, variable: String },
}

/// Try statement
#[derive(Debug, Clone, PartialEq)]
pub struct TryStatement {
    pub try_block: Block,
    pub catch_clauses: Vec<CatchClause>,
    pub finally_block: Option<Block>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatchClause {
    pub exception_type: TypeRef,
    pub variable: String,
    pub block: Block,
}

/// DML statement
#[derive(Debug, Clone, PartialEq)]
pub struct DmlStatement {
    pub operation: DmlOperation,
    pub expression: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DmlOperation {
    Insert,
    Update,
    Upsert,
    Delete,
    Undelete,
    Merge,
}

impl DmlOperation {
    pub fn keyword(self) -> &'static str {
        match self {
            DmlOperation::Insert => "insert",
            DmlOperation::Update => "update",
            DmlOperation::Upsert => "upsert",
            DmlOperation::Delete => "delete",
            DmlOperation::Undelete => "undelete",
            DmlOperation::Merge => "merge",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word.to_ascii_lowercase().as_str() {
            "insert" => Some(DmlOperation::Insert),
            "update" => Some(DmlOperation::Update),
            "upsert" => Some(DmlOperation::Upsert),
            "delete" => Some(DmlOperation::Delete),
            "undelete" => Some(DmlOperation::Undelete),
            "merge" => Some(DmlOperation::Merge),
            _ => None,
        }
    }
}

/// Expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    // Literals
    Null,
    Boolean(bool),
    Integer(i64),
    /// Integer literal written with an `L` suffix
    Long(i64),
    Double(f64),
    String(String),

    /// Identifier or dotted name (`x`, `this.x`, `System.debug`)
    Name(QualifiedName),

    FieldAccess(Box<FieldAccessExpr>),
    ArrayAccess(Box<ArrayAccessExpr>),
    MethodInvocation(Box<MethodInvocationExpr>),

    // Object creation
    New(Box<NewExpr>),
    ArrayCreator(Box<ArrayCreatorExpr>),
    ListCreator(Box<CollectionCreatorExpr>),
    SetCreator(Box<CollectionCreatorExpr>),
    MapCreator(Box<MapCreatorExpr>),

    // Operators
    Unary(Box<UnaryExpr>),
    Binary(Box<BinaryExpr>),
    Ternary(Box<TernaryExpr>),
    InstanceOf(Box<InstanceOfExpr>),
    Cast(Box<CastExpr>),
    Parenthesized(Box<Expression>),

    // SOQL/SOSL
    Query(Box<Query>),
    Search(Box<Search>),
    /// SOQL bind variable (`:accountIds`)
    BindVariable(Box<Expression>),
    /// Parenthesized SOQL value list after `IN`, `NOT IN`, `INCLUDES` or `EXCLUDES`
    ValueList(Vec<Expression>),
}

impl Expression {
    pub fn name(dotted: &str) -> Self {
        Expression::Name(QualifiedName::parse_dotted(dotted))
    }

    pub fn string(value: &str) -> Self {
        Expression::String(value.to_string())
    }

    pub fn binary(left: Expression, operator: BinaryOp, right: Expression) -> Self {
        Expression::Binary(Box::new(BinaryExpr {
            left,
            operator,
            right,
        }))
    }

    pub fn call(callee: Expression, arguments: Vec<Expression>) -> Self {
        Expression::MethodInvocation(Box::new(MethodInvocationExpr { callee, arguments }))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldAccessExpr {
    pub object: Expression,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayAccessExpr {
    pub array: Expression,
    pub index: Expression,
}

/// Method call; the callee carries the receiver (`System.debug`, `a.b().c`)
#[derive(Debug, Clone, PartialEq)]
pub struct MethodInvocationExpr {
    pub callee: Expression,
    pub arguments: Vec<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExpr {
    pub type_ref: TypeRef,
    pub arguments: Vec<Expression>,
}

/// `new T[n]` or `new T[]{a, b}`
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayCreatorExpr {
    pub element_type: TypeRef,
    pub dimension: Option<Expression>,
    pub initializer: Option<Vec<Expression>>,
}

/// `new List<T>{a, b}` / `new Set<T>{a, b}`
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionCreatorExpr {
    pub type_ref: TypeRef,
    pub elements: Vec<Expression>,
}

/// `new Map<K, V>{k => v}`
#[derive(Debug, Clone, PartialEq)]
pub struct MapCreatorExpr {
    pub type_ref: TypeRef,
    pub entries: Vec<(Expression, Expression)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpr {
    pub operator: UnaryOp,
    pub operand: Expression,
    pub is_prefix: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Plus,
    Negate,
    Not,
    BitwiseNot,
    Increment,
    Decrement,
}

impl UnaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            UnaryOp::Plus => "+",
            UnaryOp::Negate => "-",
            UnaryOp::Not => "!",
            UnaryOp::BitwiseNot => "~",
            UnaryOp::Increment => "++",
            UnaryOp::Decrement => "--",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub left: Expression,
    pub operator: BinaryOp,
    pub right: Expression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,

    // Comparison
    Equal,
    NotEqual,
    ExactEqual,
    ExactNotEqual,
    LessThan,
    GreaterThan,
    LessOrEqual,
    GreaterOrEqual,

    // Logical
    And,
    Or,

    // Bitwise
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LeftShift,
    RightShift,
    UnsignedRightShift,

    // Assignment
    Assign,
    AddAssign,
    SubtractAssign,
    MultiplyAssign,
    DivideAssign,
    ModuloAssign,
    AndAssign,
    OrAssign,
    XorAssign,
    LeftShiftAssign,
    RightShiftAssign,
    UnsignedRightShiftAssign,
}

impl BinaryOp {
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::ExactEqual => "===",
            BinaryOp::ExactNotEqual => "!==",
            BinaryOp::LessThan => "<",
            BinaryOp::GreaterThan => ">",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
            BinaryOp::BitwiseAnd => "&",
            BinaryOp::BitwiseOr => "|",
            BinaryOp::BitwiseXor => "^",
            BinaryOp::LeftShift => "<<",
            BinaryOp::RightShift => ">>",
            BinaryOp::UnsignedRightShift => ">>>",
            BinaryOp::Assign => "=",
            BinaryOp::AddAssign => "+=",
            BinaryOp::SubtractAssign => "-=",
            BinaryOp::MultiplyAssign => "*=",
            BinaryOp::DivideAssign => "/=",
            BinaryOp::ModuloAssign => "%=",
            BinaryOp::AndAssign => "&=",
            BinaryOp::OrAssign => "|=",
            BinaryOp::XorAssign => "^=",
            BinaryOp::LeftShiftAssign => "<<=",
            BinaryOp::RightShiftAssign => ">>=",
            BinaryOp::UnsignedRightShiftAssign => ">>>=",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpr {
    pub condition: Expression,
    pub then_expr: Expression,
    pub else_expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InstanceOfExpr {
    pub expression: Expression,
    pub type_ref: TypeRef,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CastExpr {
    pub type_ref: TypeRef,
    pub expression: Expression,
}

/// SOQL query (`[SELECT ... FROM ...]`)
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub select: Vec<SelectItem>,
    pub from: String,
    pub condition: Option<Condition>,
    pub order_by: Vec<OrderByItem>,
    pub limit: Option<Expression>,
    pub offset: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectItem {
    pub field: QueryField,
    pub alias: Option<String>,
}

/// A dotted field path or an aggregate/date function applied to one
#[derive(Debug, Clone, PartialEq)]
pub enum QueryField {
    Path(QualifiedName),
    Function {
        name: String,
        argument: Option<QualifiedName>,
    },
}

/// WHERE condition tree
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Comparison {
        field: QueryField,
        operator: ComparisonOp,
        value: Expression,
    },
    Logical {
        operator: LogicalOp,
        left: Box<Condition>,
        right: Option<Box<Condition>>,
    },
    Not(Box<Condition>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Like,
    In,
    NotIn,
    Includes,
    Excludes,
}

impl ComparisonOp {
    pub fn as_str(self) -> &'static str {
        match self {
            ComparisonOp::Equal => "=",
            ComparisonOp::NotEqual => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessOrEqual => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterOrEqual => ">=",
            ComparisonOp::Like => "LIKE",
            ComparisonOp::In => "IN",
            ComparisonOp::NotIn => "NOT IN",
            ComparisonOp::Includes => "INCLUDES",
            ComparisonOp::Excludes => "EXCLUDES",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    pub fn as_str(self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderByItem {
    pub field: QueryField,
    pub direction: Option<SortDirection>,
    pub nulls: Option<NullsOrder>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// SOSL search (`[FIND 'term' IN ALL FIELDS RETURNING Account(Id)]`)
#[derive(Debug, Clone, PartialEq)]
pub struct Search {
    pub term: Expression,
    pub scope: Option<SearchScope>,
    pub returning: Vec<SearchReturning>,
    pub limit: Option<Expression>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchScope {
    AllFields,
    NameFields,
    EmailFields,
    PhoneFields,
    SidebarFields,
}

impl SearchScope {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchScope::AllFields => "ALL FIELDS",
            SearchScope::NameFields => "NAME FIELDS",
            SearchScope::EmailFields => "EMAIL FIELDS",
            SearchScope::PhoneFields => "PHONE FIELDS",
            SearchScope::SidebarFields => "SIDEBAR FIELDS",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchReturning {
    pub object: String,
    pub fields: Vec<QualifiedName>,
}
