//! Import resolution
//!
//! Walks an AST and collects the fully-qualified imports a unit needs.
//! Every qualified name and type reference is matched on its first segment
//! against an [`ImportRegistry`]; trigger objects, query targets and search
//! RETURNING objects are matched whole. Each SOQL query also pulls in the
//! registry's database import. SOSL searches do not.

mod error;
pub mod registry;

pub use error::{RegistryError, ResolveError};
pub use registry::ImportRegistry;

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::ast::*;

pub type ResolveResult<T> = Result<T, ResolveError>;

/// Resolve a unit's imports against a registry
pub fn resolve_imports(
    unit: &CompilationUnit,
    registry: &ImportRegistry,
) -> ResolveResult<BTreeSet<String>> {
    ImportResolver::new(registry).resolve(unit)
}

/// Single-use import collector. `resolve` consumes the resolver so an
/// import set never leaks from one tree into another.
pub struct ImportResolver<'r> {
    registry: &'r ImportRegistry,
    imports: BTreeSet<String>,
}

impl<'r> ImportResolver<'r> {
    pub fn new(registry: &'r ImportRegistry) -> Self {
        Self {
            registry,
            imports: BTreeSet::new(),
        }
    }

    pub fn resolve(mut self, unit: &CompilationUnit) -> ResolveResult<BTreeSet<String>> {
        debug!(
            declarations = unit.declarations.len(),
            registry_entries = self.registry.len(),
            "resolving imports"
        );

        for decl in &unit.declarations {
            self.type_declaration(decl)?;
        }

        debug!(imports = self.imports.len(), "import resolution finished");
        Ok(self.imports)
    }

    fn lookup(&mut self, short: &str) {
        let registry = self.registry;
        if let Some(fqn) = registry.lookup(short) {
            trace!(short, fqn, "import matched");
            self.imports.insert(fqn.to_string());
        }
    }

    fn qualified_name(&mut self, name: &QualifiedName, construct: &'static str) -> ResolveResult<()> {
        match name.first() {
            Some(first) => {
                self.lookup(first);
                Ok(())
            }
            None => Err(ResolveError::Structural {
                construct,
                reason: "empty qualified name".to_string(),
            }),
        }
    }

    fn type_ref(&mut self, type_ref: &TypeRef) -> ResolveResult<()> {
        self.qualified_name(&type_ref.name, "type reference")?;
        for argument in &type_ref.type_arguments {
            self.type_ref(argument)?;
        }
        Ok(())
    }

    fn annotations(&mut self, annotations: &[Annotation]) -> ResolveResult<()> {
        for param in annotations.iter().flat_map(|a| &a.parameters) {
            self.expression(&param.value)?;
        }
        Ok(())
    }

    // ==================== Declarations ====================

    fn type_declaration(&mut self, decl: &TypeDeclaration) -> ResolveResult<()> {
        match decl {
            TypeDeclaration::Class(class) => self.class(class),
            TypeDeclaration::Interface(interface) => self.interface(interface),
            TypeDeclaration::Enum(enum_decl) => self.annotations(&enum_decl.annotations),
            TypeDeclaration::Trigger(trigger) => {
                self.lookup(&trigger.object);
                self.block(&trigger.body)
            }
        }
    }

    fn class(&mut self, class: &ClassDeclaration) -> ResolveResult<()> {
        self.annotations(&class.annotations)?;
        if let Some(parent) = &class.extends {
            self.type_ref(parent)?;
        }
        for interface in &class.implements {
            self.type_ref(interface)?;
        }
        for member in &class.members {
            self.member(member)?;
        }
        Ok(())
    }

    fn interface(&mut self, interface: &InterfaceDeclaration) -> ResolveResult<()> {
        self.annotations(&interface.annotations)?;
        for parent in &interface.extends {
            self.type_ref(parent)?;
        }
        for method in &interface.methods {
            self.annotations(&method.annotations)?;
            if let Some(ret) = &method.return_type {
                self.type_ref(ret)?;
            }
            self.parameters(&method.parameters)?;
        }
        Ok(())
    }

    fn member(&mut self, member: &ClassMember) -> ResolveResult<()> {
        match member {
            ClassMember::Field(field) => {
                self.annotations(&field.annotations)?;
                self.type_ref(&field.type_ref)?;
                self.declarators(&field.declarators)
            }
            ClassMember::Method(method) => {
                self.annotations(&method.annotations)?;
                if let Some(ret) = &method.return_type {
                    self.type_ref(ret)?;
                }
                self.parameters(&method.parameters)?;
                match &method.body {
                    Some(body) => self.block(body),
                    None => Ok(()),
                }
            }
            ClassMember::Constructor(ctor) => {
                self.annotations(&ctor.annotations)?;
                self.parameters(&ctor.parameters)?;
                self.block(&ctor.body)
            }
            ClassMember::Property(property) => {
                self.annotations(&property.annotations)?;
                self.type_ref(&property.type_ref)?;
                for accessor in [&property.getter, &property.setter].into_iter().flatten() {
                    if let Some(body) = &accessor.body {
                        self.block(body)?;
                    }
                }
                Ok(())
            }
            ClassMember::InnerClass(class) => self.class(class),
            ClassMember::InnerInterface(interface) => self.interface(interface),
            ClassMember::InnerEnum(enum_decl) => self.annotations(&enum_decl.annotations),
        }
    }

    fn parameters(&mut self, parameters: &[Parameter]) -> ResolveResult<()> {
        for param in parameters {
            self.type_ref(&param.type_ref)?;
        }
        Ok(())
    }

    fn declarators(&mut self, declarators: &[VariableDeclarator]) -> ResolveResult<()> {
        for init in declarators.iter().filter_map(|d| d.initializer.as_ref()) {
            self.expression(init)?;
        }
        Ok(())
    }

    // ==================== Statements ====================

    fn block(&mut self, block: &Block) -> ResolveResult<()> {
        for stmt in &block.statements {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn variable_declaration(&mut self, decl: &VariableDeclaration) -> ResolveResult<()> {
        self.type_ref(&decl.type_ref)?;
        self.declarators(&decl.declarators)
    }

    fn statement(&mut self, stmt: &Statement) -> ResolveResult<()> {
        match stmt {
            Statement::Block(block) => self.block(block),
            Statement::Variable(decl) => self.variable_declaration(decl),
            Statement::Expression(expr) | Statement::Throw(expr) => self.expression(expr),
            Statement::If(if_stmt) => self.if_statement(if_stmt),
            Statement::For(for_stmt) => {
                match &for_stmt.init {
                    Some(ForInit::Variables(decl)) => self.variable_declaration(decl)?,
                    Some(ForInit::Expressions(exprs)) => self.expressions(exprs)?,
                    None => {}
                }
                if let Some(cond) = &for_stmt.condition {
                    self.expression(cond)?;
                }
                self.expressions(&for_stmt.update)?;
                self.block(&for_stmt.body)
            }
            Statement::ForEach(each) => {
                self.type_ref(&each.type_ref)?;
                self.expression(&each.iterable)?;
                self.block(&each.body)
            }
            Statement::While(while_stmt) => {
                self.expression(&while_stmt.condition)?;
                self.block(&while_stmt.body)
            }
            Statement::DoWhile(do_while) => {
                self.block(&do_while.body)?;
                self.expression(&do_while.condition)
            }
            Statement::Switch(switch) => {
                self.expression(&switch.expression)?;
                for clause in &switch.when_clauses {
                    match &clause.condition {
                        WhenCondition::Values(values) => self.expressions(values)?,
                        WhenCondition::Type { type_ref, .. } => self.type_ref(type_ref)?,
                    }
                    self.block(&clause.block)?;
                }
                match &switch.else_block {
                    Some(block) => self.block(block),
                    None => Ok(()),
                }
            }
            Statement::Return(value) => match value {
                Some(value) => self.expression(value),
                None => Ok(()),
            },
            Statement::Try(try_stmt) => {
                self.block(&try_stmt.try_block)?;
                for clause in &try_stmt.catch_clauses {
                    self.type_ref(&clause.exception_type)?;
                    self.block(&clause.block)?;
                }
                match &try_stmt.finally_block {
                    Some(block) => self.block(block),
                    None => Ok(()),
                }
            }
            Statement::Dml(dml) => self.expression(&dml.expression),
            Statement::Break | Statement::Continue | Statement::Empty => Ok(()),
        }
    }

    fn if_statement(&mut self, if_stmt: &IfStatement) -> ResolveResult<()> {
        self.expression(&if_stmt.condition)?;
        self.block(&if_stmt.then_block)?;
        match &if_stmt.else_branch {
            Some(ElseBranch::Block(block)) => self.block(block),
            Some(ElseBranch::If(chained)) => self.if_statement(chained),
            None => Ok(()),
        }
    }

    // ==================== Expressions ====================

    fn expressions(&mut self, exprs: &[Expression]) -> ResolveResult<()> {
        for expr in exprs {
            self.expression(expr)?;
        }
        Ok(())
    }

    fn expression(&mut self, expr: &Expression) -> ResolveResult<()> {
        match expr {
            Expression::Null
            | Expression::Boolean(_)
            | Expression::Integer(_)
            | Expression::Long(_)
            | Expression::Double(_)
            | Expression::String(_) => Ok(()),
            Expression::Name(name) => self.qualified_name(name, "name"),
            Expression::FieldAccess(access) => self.expression(&access.object),
            Expression::ArrayAccess(access) => {
                self.expression(&access.array)?;
                self.expression(&access.index)
            }
            Expression::MethodInvocation(call) => {
                self.expression(&call.callee)?;
                self.expressions(&call.arguments)
            }
            Expression::New(new) => {
                self.type_ref(&new.type_ref)?;
                self.expressions(&new.arguments)
            }
            Expression::ArrayCreator(creator) => {
                self.type_ref(&creator.element_type)?;
                if let Some(dimension) = &creator.dimension {
                    self.expression(dimension)?;
                }
                match &creator.initializer {
                    Some(values) => self.expressions(values),
                    None => Ok(()),
                }
            }
            Expression::ListCreator(creator) | Expression::SetCreator(creator) => {
                self.type_ref(&creator.type_ref)?;
                self.expressions(&creator.elements)
            }
            Expression::MapCreator(creator) => {
                self.type_ref(&creator.type_ref)?;
                for (key, value) in &creator.entries {
                    self.expression(key)?;
                    self.expression(value)?;
                }
                Ok(())
            }
            Expression::Unary(unary) => self.expression(&unary.operand),
            Expression::Binary(binary) => {
                self.expression(&binary.left)?;
                self.expression(&binary.right)
            }
            Expression::Ternary(ternary) => {
                self.expression(&ternary.condition)?;
                self.expression(&ternary.then_expr)?;
                self.expression(&ternary.else_expr)
            }
            Expression::InstanceOf(check) => {
                self.expression(&check.expression)?;
                self.type_ref(&check.type_ref)
            }
            Expression::Cast(cast) => {
                self.type_ref(&cast.type_ref)?;
                self.expression(&cast.expression)
            }
            Expression::Parenthesized(inner) | Expression::BindVariable(inner) => {
                self.expression(inner)
            }
            Expression::Query(query) => self.query(query),
            Expression::Search(search) => self.search(search),
            Expression::ValueList(values) => self.expressions(values),
        }
    }

    /// Field paths inside SELECT/WHERE/ORDER BY name record fields, not
    /// types, so only the target object and value expressions are matched.
    fn query(&mut self, query: &Query) -> ResolveResult<()> {
        self.lookup(&query.from);
        let database = self.registry.database_import().to_string();
        trace!(import = %database, "query requires database import");
        self.imports.insert(database);

        if let Some(condition) = &query.condition {
            self.condition(condition)?;
        }
        for value in [&query.limit, &query.offset].into_iter().flatten() {
            self.expression(value)?;
        }
        Ok(())
    }

    fn condition(&mut self, condition: &Condition) -> ResolveResult<()> {
        match condition {
            Condition::Comparison { value, .. } => self.expression(value),
            Condition::Logical { left, right, .. } => {
                self.condition(left)?;
                match right {
                    Some(right) => self.condition(right),
                    None => Ok(()),
                }
            }
            Condition::Not(inner) => self.condition(inner),
        }
    }

    fn search(&mut self, search: &Search) -> ResolveResult<()> {
        self.expression(&search.term)?;
        for returning in &search.returning {
            self.lookup(&returning.object);
        }
        match &search.limit {
            Some(limit) => self.expression(limit),
            None => Ok(()),
        }
    }
}
