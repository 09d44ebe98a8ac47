use tracing::debug;

use super::error::{GenerateError, GenerateResult};
use super::GenerateOptions;
use crate::ast::*;

/// Renders AST nodes to Apex source text.
///
/// Declaration renderers return fully indented lines. Statement and
/// expression renderers return text whose first line carries no indentation
/// (the caller places it) and whose later lines are indented for `depth`.
#[derive(Debug, Clone, Default)]
pub struct Generator {
    options: GenerateOptions,
}

impl Generator {
    pub fn new() -> Self {
        Self::with_options(GenerateOptions::default())
    }

    pub fn with_options(options: GenerateOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Render every declaration of a unit, separated by a blank line
    pub fn render(&self, unit: &CompilationUnit) -> GenerateResult<String> {
        debug!(
            declarations = unit.declarations.len(),
            indent_width = self.options.indent_width,
            "generating compilation unit"
        );

        let rendered = unit
            .declarations
            .iter()
            .map(|decl| self.render_type_declaration(decl, 0))
            .collect::<GenerateResult<Vec<_>>>()?;
        let text = rendered.join("\n\n");

        debug!(bytes = text.len(), "generation finished");
        Ok(text)
    }

    pub fn render_type_declaration(
        &self,
        decl: &TypeDeclaration,
        depth: usize,
    ) -> GenerateResult<String> {
        match decl {
            TypeDeclaration::Class(class) => self.class(class, depth),
            TypeDeclaration::Interface(interface) => self.interface(interface, depth),
            TypeDeclaration::Enum(enum_decl) => self.enumeration(enum_decl, depth),
            TypeDeclaration::Trigger(trigger) => self.trigger(trigger, depth),
        }
    }

    pub fn render_statement(&self, stmt: &Statement) -> GenerateResult<String> {
        self.statement(stmt, 0)
    }

    pub fn render_expression(&self, expr: &Expression) -> GenerateResult<String> {
        self.expression(expr, 0)
    }

    pub(super) fn indent(&self, depth: usize) -> String {
        " ".repeat(self.options.indent_width * depth)
    }

    /// `header {`, pre-indented body lines, `}` at `depth`
    fn braced(&self, header: &str, lines: &[String], depth: usize) -> String {
        let indent = self.indent(depth);
        if lines.is_empty() {
            format!("{indent}{header} {{\n{indent}}}")
        } else {
            format!("{indent}{header} {{\n{}\n{indent}}}", lines.join("\n"))
        }
    }

    // ==================== Declarations ====================

    fn annotations(&self, annotations: &[Annotation], depth: usize) -> GenerateResult<String> {
        let mut out = String::new();
        for annotation in annotations {
            out.push_str(&self.indent(depth));
            out.push('@');
            out.push_str(&annotation.name);
            if !annotation.parameters.is_empty() {
                let params = annotation
                    .parameters
                    .iter()
                    .map(|param| {
                        let value = self.expression(&param.value, depth)?;
                        Ok(match &param.name {
                            Some(name) => format!("{name}={value}"),
                            None => value,
                        })
                    })
                    .collect::<GenerateResult<Vec<_>>>()?;
                out.push('(');
                out.push_str(&params.join(" "));
                out.push(')');
            }
            out.push('\n');
        }
        Ok(out)
    }

    fn class(&self, class: &ClassDeclaration, depth: usize) -> GenerateResult<String> {
        let mut header = modifier_words(&class.modifiers);
        header.push("class".to_string());
        header.push(class.name.clone());
        if let Some(parent) = &class.extends {
            header.push(format!("extends {}", self.type_ref(parent)?));
        }
        if !class.implements.is_empty() {
            header.push(format!("implements {}", self.type_list(&class.implements)?));
        }

        let members = class
            .members
            .iter()
            .map(|member| self.member(member, depth + 1))
            .collect::<GenerateResult<Vec<_>>>()?;

        let mut out = self.annotations(&class.annotations, depth)?;
        out.push_str(&self.braced(&header.join(" "), &members, depth));
        Ok(out)
    }

    fn interface(&self, interface: &InterfaceDeclaration, depth: usize) -> GenerateResult<String> {
        let mut header = modifier_words(&interface.modifiers);
        header.push("interface".to_string());
        header.push(interface.name.clone());
        if !interface.extends.is_empty() {
            header.push(format!("extends {}", self.type_list(&interface.extends)?));
        }

        let mut methods = Vec::with_capacity(interface.methods.len());
        for method in &interface.methods {
            let mut line = self.annotations(&method.annotations, depth + 1)?;
            line.push_str(&self.indent(depth + 1));
            line.push_str(&format!(
                "{} {}({});",
                self.return_type(&method.return_type)?,
                method.name,
                self.parameters(&method.parameters)?
            ));
            methods.push(line);
        }

        let mut out = self.annotations(&interface.annotations, depth)?;
        out.push_str(&self.braced(&header.join(" "), &methods, depth));
        Ok(out)
    }

    fn enumeration(&self, enum_decl: &EnumDeclaration, depth: usize) -> GenerateResult<String> {
        let mut header = modifier_words(&enum_decl.modifiers);
        header.push("enum".to_string());
        header.push(enum_decl.name.clone());

        let inner = self.indent(depth + 1);
        let values = if enum_decl.values.is_empty() {
            Vec::new()
        } else {
            vec![enum_decl
                .values
                .iter()
                .map(|value| format!("{inner}{value}"))
                .collect::<Vec<_>>()
                .join(",\n")]
        };

        let mut out = self.annotations(&enum_decl.annotations, depth)?;
        out.push_str(&self.braced(&header.join(" "), &values, depth));
        Ok(out)
    }

    fn trigger(&self, trigger: &TriggerDeclaration, depth: usize) -> GenerateResult<String> {
        if trigger.events.is_empty() {
            return Err(GenerateError::structural("trigger", "no trigger events"));
        }
        let events = trigger
            .events
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Ok(format!(
            "{}trigger {} on {} ({}) {}",
            self.indent(depth),
            trigger.name,
            trigger.object,
            events,
            self.block(&trigger.body, depth)?
        ))
    }

    // ==================== Members ====================

    fn member(&self, member: &ClassMember, depth: usize) -> GenerateResult<String> {
        match member {
            ClassMember::Field(field) => {
                let mut words = modifier_words(&field.modifiers);
                words.push(self.type_ref(&field.type_ref)?);
                words.push(self.declarators(&field.declarators, "field", depth)?);

                let mut out = self.annotations(&field.annotations, depth)?;
                out.push_str(&self.indent(depth));
                out.push_str(&words.join(" "));
                out.push(';');
                Ok(out)
            }
            ClassMember::Method(method) => {
                let mut words = modifier_words(&method.modifiers);
                words.push(self.return_type(&method.return_type)?);
                words.push(format!(
                    "{}({})",
                    method.name,
                    self.parameters(&method.parameters)?
                ));

                let mut out = self.annotations(&method.annotations, depth)?;
                out.push_str(&self.indent(depth));
                out.push_str(&words.join(" "));
                match &method.body {
                    Some(body) => {
                        out.push(' ');
                        out.push_str(&self.block(body, depth)?);
                    }
                    None => out.push(';'),
                }
                Ok(out)
            }
            ClassMember::Constructor(ctor) => {
                let mut words = modifier_words(&ctor.modifiers);
                words.push(format!(
                    "{}({})",
                    ctor.name,
                    self.parameters(&ctor.parameters)?
                ));

                let mut out = self.annotations(&ctor.annotations, depth)?;
                out.push_str(&self.indent(depth));
                out.push_str(&words.join(" "));
                out.push(' ');
                out.push_str(&self.block(&ctor.body, depth)?);
                Ok(out)
            }
            ClassMember::Property(property) => self.property(property, depth),
            ClassMember::InnerClass(class) => self.class(class, depth),
            ClassMember::InnerInterface(interface) => self.interface(interface, depth),
            ClassMember::InnerEnum(enum_decl) => self.enumeration(enum_decl, depth),
        }
    }

    fn property(&self, property: &PropertyDeclaration, depth: usize) -> GenerateResult<String> {
        let accessors: Vec<(&str, &PropertyAccessor)> = [
            ("get", property.getter.as_ref()),
            ("set", property.setter.as_ref()),
        ]
        .into_iter()
        .filter_map(|(keyword, accessor)| accessor.map(|a| (keyword, a)))
        .collect();

        if accessors.is_empty() {
            return Err(GenerateError::structural(
                "property",
                format!("`{}` has neither get nor set", property.name),
            ));
        }

        let mut words = modifier_words(&property.modifiers);
        words.push(self.type_ref(&property.type_ref)?);
        words.push(property.name.clone());
        let header = words.join(" ");

        let mut out = self.annotations(&property.annotations, depth)?;

        if accessors.iter().all(|(_, accessor)| accessor.body.is_none()) {
            let inline = accessors
                .iter()
                .map(|(keyword, accessor)| {
                    let mut words = modifier_words(&accessor.modifiers);
                    words.push(format!("{keyword};"));
                    words.join(" ")
                })
                .collect::<Vec<_>>()
                .join(" ");
            out.push_str(&format!("{}{header} {{ {inline} }}", self.indent(depth)));
            return Ok(out);
        }

        let mut lines = Vec::with_capacity(accessors.len());
        for (keyword, accessor) in accessors {
            let mut words = modifier_words(&accessor.modifiers);
            words.push(keyword.to_string());
            let mut line = format!("{}{}", self.indent(depth + 1), words.join(" "));
            match &accessor.body {
                Some(body) => {
                    line.push(' ');
                    line.push_str(&self.block(body, depth + 1)?);
                }
                None => line.push(';'),
            }
            lines.push(line);
        }
        out.push_str(&self.braced(&header, &lines, depth));
        Ok(out)
    }

    fn parameters(&self, parameters: &[Parameter]) -> GenerateResult<String> {
        let rendered = parameters
            .iter()
            .map(|param| {
                let ty = self.type_ref(&param.type_ref)?;
                Ok(if param.is_final {
                    format!("final {ty} {}", param.name)
                } else {
                    format!("{ty} {}", param.name)
                })
            })
            .collect::<GenerateResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    fn declarators(
        &self,
        declarators: &[VariableDeclarator],
        construct: &'static str,
        depth: usize,
    ) -> GenerateResult<String> {
        if declarators.is_empty() {
            return Err(GenerateError::structural(construct, "no declarators"));
        }
        let rendered = declarators
            .iter()
            .map(|decl| match &decl.initializer {
                Some(init) => Ok(format!("{} = {}", decl.name, self.expression(init, depth)?)),
                None => Ok(decl.name.clone()),
            })
            .collect::<GenerateResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    // ==================== Types ====================

    pub(super) fn qualified_name(
        &self,
        name: &QualifiedName,
        construct: &'static str,
    ) -> GenerateResult<String> {
        if name.is_empty() {
            return Err(GenerateError::structural(construct, "empty qualified name"));
        }
        Ok(name.to_string())
    }

    pub(super) fn type_ref(&self, type_ref: &TypeRef) -> GenerateResult<String> {
        let mut out = self.qualified_name(&type_ref.name, "type reference")?;
        if !type_ref.type_arguments.is_empty() {
            out.push('<');
            out.push_str(&self.type_list(&type_ref.type_arguments)?);
            out.push('>');
        }
        if type_ref.is_array {
            out.push_str("[]");
        }
        Ok(out)
    }

    fn type_list(&self, types: &[TypeRef]) -> GenerateResult<String> {
        let rendered = types
            .iter()
            .map(|ty| self.type_ref(ty))
            .collect::<GenerateResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    fn return_type(&self, return_type: &Option<TypeRef>) -> GenerateResult<String> {
        match return_type {
            Some(ty) => self.type_ref(ty),
            None => Ok("void".to_string()),
        }
    }

    // ==================== Statements ====================

    /// `{`, statements one level deeper, `}` at `depth`
    fn block(&self, block: &Block, depth: usize) -> GenerateResult<String> {
        let indent = self.indent(depth);
        if block.statements.is_empty() {
            return Ok(format!("{{\n{indent}}}"));
        }

        let inner = self.indent(depth + 1);
        let lines = block
            .statements
            .iter()
            .map(|stmt| Ok(format!("{inner}{}", self.statement(stmt, depth + 1)?)))
            .collect::<GenerateResult<Vec<_>>>()?;
        Ok(format!("{{\n{}\n{indent}}}", lines.join("\n")))
    }

    fn statement(&self, stmt: &Statement, depth: usize) -> GenerateResult<String> {
        match stmt {
            Statement::Block(block) => self.block(block, depth),
            Statement::Variable(decl) => Ok(format!("{};", self.variable_declaration(decl, depth)?)),
            Statement::Expression(expr) => Ok(format!("{};", self.expression(expr, depth)?)),
            Statement::If(if_stmt) => self.if_statement(if_stmt, depth),
            Statement::For(for_stmt) => {
                let init = match &for_stmt.init {
                    Some(ForInit::Variables(decl)) => self.variable_declaration(decl, depth)?,
                    Some(ForInit::Expressions(exprs)) => self.expression_list(exprs, depth)?,
                    None => String::new(),
                };
                let condition = match &for_stmt.condition {
                    Some(cond) => self.expression(cond, depth)?,
                    None => String::new(),
                };
                let update = self.expression_list(&for_stmt.update, depth)?;
                Ok(format!(
                    "for ({init}; {condition}; {update}) {}",
                    self.block(&for_stmt.body, depth)?
                ))
            }
            Statement::ForEach(each) => Ok(format!(
                "for ({} {} : {}) {}",
                self.type_ref(&each.type_ref)?,
                each.variable,
                self.expression(&each.iterable, depth)?,
                self.block(&each.body, depth)?
            )),
            Statement::While(while_stmt) => Ok(format!(
                "while ({}) {}",
                self.expression(&while_stmt.condition, depth)?,
                self.block(&while_stmt.body, depth)?
            )),
            Statement::DoWhile(do_while) => Ok(format!(
                "do {} while ({});",
                self.block(&do_while.body, depth)?,
                self.expression(&do_while.condition, depth)?
            )),
            Statement::Switch(switch) => self.switch_statement(switch, depth),
            Statement::Return(None) => Ok("return;".to_string()),
            Statement::Return(Some(value)) => {
                Ok(format!("return {};", self.expression(value, depth)?))
            }
            Statement::Throw(exception) => {
                Ok(format!("throw {};", self.expression(exception, depth)?))
            }
            Statement::Break => Ok("break;".to_string()),
            Statement::Continue => Ok("continue;".to_string()),
            Statement::Try(try_stmt) => self.try_statement(try_stmt, depth),
            Statement::Dml(dml) => Ok(format!(
                "{} {};",
                dml.operation.keyword(),
                self.expression(&dml.expression, depth)?
            )),
            Statement::Empty => Ok(";".to_string()),
        }
    }

    fn variable_declaration(
        &self,
        decl: &VariableDeclaration,
        depth: usize,
    ) -> GenerateResult<String> {
        let ty = self.type_ref(&decl.type_ref)?;
        let declarators = self.declarators(&decl.declarators, "variable declaration", depth)?;
        Ok(if decl.is_final {
            format!("final {ty} {declarators}")
        } else {
            format!("{ty} {declarators}")
        })
    }

    fn if_statement(&self, if_stmt: &IfStatement, depth: usize) -> GenerateResult<String> {
        let mut out = format!(
            "if ({}) {}",
            self.expression(&if_stmt.condition, depth)?,
            self.block(&if_stmt.then_block, depth)?
        );
        match &if_stmt.else_branch {
            Some(ElseBranch::If(chained)) => {
                out.push_str(" else ");
                out.push_str(&self.if_statement(chained, depth)?);
            }
            Some(ElseBranch::Block(block)) => {
                out.push_str(" else ");
                out.push_str(&self.block(block, depth)?);
            }
            None => {}
        }
        Ok(out)
    }

    fn switch_statement(&self, switch: &SwitchStatement, depth: usize) -> GenerateResult<String> {
        if switch.when_clauses.is_empty() {
            return Err(GenerateError::structural("switch", "no when clauses"));
        }

        let inner = self.indent(depth + 1);
        let mut lines = Vec::with_capacity(switch.when_clauses.len() + 1);
        for clause in &switch.when_clauses {
            let condition = match &clause.condition {
                WhenCondition::Values(values) if values.is_empty() => {
                    return Err(GenerateError::structural("when clause", "no values"));
                }
                WhenCondition::Values(values) => self.expression_list(values, depth + 1)?,
                WhenCondition::Type { type_ref, variable } => {
                    format!("{} {variable}", self.type_ref(type_ref)?)
                }
            };
            lines.push(format!(
                "{inner}when {condition} {}",
                self.block(&clause.block, depth + 1)?
            ));
        }
        if let Some(else_block) = &switch.else_block {
            lines.push(format!(
                "{inner}when else {}",
                self.block(else_block, depth + 1)?
            ));
        }

        Ok(format!(
            "switch on {} {{\n{}\n{}}}",
            self.expression(&switch.expression, depth)?,
            lines.join("\n"),
            self.indent(depth)
        ))
    }

    fn try_statement(&self, try_stmt: &TryStatement, depth: usize) -> GenerateResult<String> {
        if try_stmt.catch_clauses.is_empty() && try_stmt.finally_block.is_none() {
            return Err(GenerateError::structural("try", "no catch or finally"));
        }

        let mut out = format!("try {}", self.block(&try_stmt.try_block, depth)?);
        for clause in &try_stmt.catch_clauses {
            out.push_str(&format!(
                " catch ({} {}) {}",
                self.type_ref(&clause.exception_type)?,
                clause.variable,
                self.block(&clause.block, depth)?
            ));
        }
        if let Some(finally) = &try_stmt.finally_block {
            out.push_str(" finally ");
            out.push_str(&self.block(finally, depth)?);
        }
        Ok(out)
    }

    // ==================== Expressions ====================

    fn expression_list(&self, exprs: &[Expression], depth: usize) -> GenerateResult<String> {
        let rendered = exprs
            .iter()
            .map(|expr| self.expression(expr, depth))
            .collect::<GenerateResult<Vec<_>>>()?;
        Ok(rendered.join(", "))
    }

    pub(super) fn expression(&self, expr: &Expression, depth: usize) -> GenerateResult<String> {
        match expr {
            Expression::Null => Ok("null".to_string()),
            Expression::Boolean(value) => Ok(value.to_string()),
            Expression::Integer(value) => Ok(value.to_string()),
            Expression::Long(value) => Ok(format!("{value}L")),
            Expression::Double(value) if !value.is_finite() => Err(GenerateError::structural(
                "double literal",
                format!("{value} has no Apex spelling"),
            )),
            Expression::Double(value) => Ok(format!("{value:.6}")),
            Expression::String(value) => Ok(quote(value)),
            Expression::Name(name) => self.qualified_name(name, "name"),
            Expression::FieldAccess(access) => Ok(format!(
                "{}.{}",
                self.expression(&access.object, depth)?,
                access.field
            )),
            Expression::ArrayAccess(access) => Ok(format!(
                "{}[{}]",
                self.expression(&access.array, depth)?,
                self.expression(&access.index, depth)?
            )),
            Expression::MethodInvocation(call) => Ok(format!(
                "{}({})",
                self.expression(&call.callee, depth)?,
                self.expression_list(&call.arguments, depth)?
            )),
            Expression::New(new) => Ok(format!(
                "new {}({})",
                self.type_ref(&new.type_ref)?,
                self.expression_list(&new.arguments, depth)?
            )),
            Expression::ArrayCreator(creator) => {
                let element = self.type_ref(&creator.element_type)?;
                match (&creator.dimension, &creator.initializer) {
                    (Some(dimension), None) => Ok(format!(
                        "new {element}[{}]",
                        self.expression(dimension, depth)?
                    )),
                    (None, Some(values)) => Ok(format!(
                        "new {element}[]{{{}}}",
                        self.expression_list(values, depth)?
                    )),
                    (Some(_), Some(_)) => Err(GenerateError::structural(
                        "array creator",
                        "both a dimension and an initializer",
                    )),
                    (None, None) => Err(GenerateError::structural(
                        "array creator",
                        "neither a dimension nor an initializer",
                    )),
                }
            }
            Expression::ListCreator(creator) | Expression::SetCreator(creator) => Ok(format!(
                "new {}{{{}}}",
                self.type_ref(&creator.type_ref)?,
                self.expression_list(&creator.elements, depth)?
            )),
            Expression::MapCreator(creator) => {
                let entries = creator
                    .entries
                    .iter()
                    .map(|(key, value)| {
                        Ok(format!(
                            "{} => {}",
                            self.expression(key, depth)?,
                            self.expression(value, depth)?
                        ))
                    })
                    .collect::<GenerateResult<Vec<_>>>()?;
                Ok(format!(
                    "new {}{{{}}}",
                    self.type_ref(&creator.type_ref)?,
                    entries.join(", ")
                ))
            }
            Expression::Unary(unary) => {
                let operand = self.expression(&unary.operand, depth)?;
                let operator = unary.operator.as_str();
                Ok(if unary.is_prefix {
                    // `- -x` must not collapse into `--x`
                    let sign = |c: char| c == '+' || c == '-';
                    let fuses = operator.ends_with(sign) && operand.starts_with(sign);
                    if fuses {
                        format!("{operator} {operand}")
                    } else {
                        format!("{operator}{operand}")
                    }
                } else {
                    format!("{operand}{operator}")
                })
            }
            Expression::Binary(binary) => Ok(format!(
                "{} {} {}",
                self.expression(&binary.left, depth)?,
                binary.operator.as_str(),
                self.expression(&binary.right, depth)?
            )),
            Expression::Ternary(ternary) => Ok(format!(
                "{} ? {} : {}",
                self.expression(&ternary.condition, depth)?,
                self.expression(&ternary.then_expr, depth)?,
                self.expression(&ternary.else_expr, depth)?
            )),
            Expression::InstanceOf(check) => Ok(format!(
                "{} instanceof {}",
                self.expression(&check.expression, depth)?,
                self.type_ref(&check.type_ref)?
            )),
            Expression::Cast(cast) => Ok(format!(
                "({}){}",
                self.type_ref(&cast.type_ref)?,
                self.expression(&cast.expression, depth)?
            )),
            Expression::Parenthesized(inner) => Ok(format!("({})", self.expression(inner, depth)?)),
            Expression::Query(query) => self.query(query, depth),
            Expression::Search(search) => self.search(search, depth),
            Expression::BindVariable(bound) => Ok(format!(":{}", self.expression(bound, depth)?)),
            Expression::ValueList(values) if values.is_empty() => Err(GenerateError::structural(
                "value list",
                "no values",
            )),
            Expression::ValueList(values) => Ok(format!("({})", self.expression_list(values, depth)?)),
        }
    }
}

fn modifier_words(modifiers: &[Modifier]) -> Vec<String> {
    modifiers.iter().map(|m| m.as_str().to_string()).collect()
}

/// Single-quoted Apex string literal
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            other if other.is_control() => out.push_str(&format!("\\u{:04x}", other as u32)),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn expr(e: &Expression) -> String {
        Generator::new().render_expression(e).unwrap()
    }

    #[test]
    fn test_string_escaping() {
        assert_eq!(expr(&Expression::string("it's a \\ path\n")), r"'it\'s a \\ path\n'");
    }

    #[test]
    fn test_control_characters_are_escaped() {
        assert_eq!(expr(&Expression::string("a\u{c}b\u{8}")), r"'a\fb\b'");
        assert_eq!(expr(&Expression::string("\u{1}")), r"'\u0001'");
        assert_eq!(expr(&Expression::string("été")), "'été'");
    }

    #[test]
    fn test_double_uses_six_decimals() {
        assert_eq!(expr(&Expression::Double(1.5)), "1.500000");
    }

    #[test]
    fn test_non_finite_double_is_structural() {
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = Generator::new()
                .render_expression(&Expression::Double(value))
                .unwrap_err();
            assert!(matches!(err, GenerateError::Structural { construct: "double literal", .. }));
        }
    }

    #[test]
    fn test_long_keeps_suffix() {
        assert_eq!(expr(&Expression::Long(3_000_000_000)), "3000000000L");
    }

    #[test]
    fn test_nested_signs_stay_apart() {
        let prefix = |operator, operand| {
            Expression::Unary(Box::new(UnaryExpr {
                operator,
                operand,
                is_prefix: true,
            }))
        };
        let minus_minus = prefix(UnaryOp::Negate, prefix(UnaryOp::Negate, Expression::name("x")));
        let plus_minus = prefix(UnaryOp::Plus, prefix(UnaryOp::Negate, Expression::name("x")));
        let not_minus = prefix(UnaryOp::Not, prefix(UnaryOp::Negate, Expression::name("x")));
        assert_eq!(expr(&minus_minus), "- -x");
        assert_eq!(expr(&plus_minus), "+ -x");
        assert_eq!(expr(&not_minus), "!-x");
    }

    #[test]
    fn test_postfix_and_prefix_unary() {
        let post = Expression::Unary(Box::new(UnaryExpr {
            operator: UnaryOp::Increment,
            operand: Expression::name("i"),
            is_prefix: false,
        }));
        let pre = Expression::Unary(Box::new(UnaryExpr {
            operator: UnaryOp::Not,
            operand: Expression::name("done"),
            is_prefix: true,
        }));
        assert_eq!(expr(&post), "i++");
        assert_eq!(expr(&pre), "!done");
    }

    #[test]
    fn test_cast_has_no_space() {
        let cast = Expression::Cast(Box::new(CastExpr {
            type_ref: TypeRef::simple("Account"),
            expression: Expression::name("record"),
        }));
        assert_eq!(expr(&cast), "(Account)record");
    }

    #[test]
    fn test_empty_block_closes_at_depth() {
        let gen = Generator::new();
        assert_eq!(gen.block(&Block::default(), 2).unwrap(), "{\n        }");
    }

    #[test]
    fn test_custom_indent_width() {
        let gen = Generator::with_options(GenerateOptions { indent_width: 2 });
        let block = Block::new(vec![Statement::Break]);
        assert_eq!(gen.block(&block, 1).unwrap(), "{\n    break;\n  }");
    }

    #[test]
    fn test_empty_name_is_structural() {
        let err = Generator::new()
            .render_expression(&Expression::Name(QualifiedName { segments: vec![] }))
            .unwrap_err();
        assert!(matches!(err, GenerateError::Structural { construct: "name", .. }));
    }
}
