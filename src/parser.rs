use crate::ast::*;
use crate::lexer::{tokenize, Span, Token, TokenKind};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Unexpected token: expected {expected}, found {found} at {span:?}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },
    #[error("Unexpected end of input: expected {0}")]
    UnexpectedEof(String),
    #[error("Invalid input `{text}` at {span:?}")]
    InvalidInput { text: String, span: Span },
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser over a fully tokenized source.
///
/// Tokens are buffered up front so ambiguous prefixes (`Foo.bar x` versus
/// `Foo.bar(x)`, casts versus parenthesized expressions) can be resolved by
/// rewinding to a saved position.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    pub fn new(source: &str) -> Self {
        Self {
            tokens: tokenize(source),
            pos: 0,
        }
    }

    /// Parse a complete compilation unit
    pub fn parse(&mut self) -> ParseResult<CompilationUnit> {
        let mut declarations = Vec::new();
        while !self.is_at_end() {
            declarations.push(self.parse_type_declaration()?);
        }
        Ok(CompilationUnit { declarations })
    }

    // ==================== Helper Methods ====================

    fn current(&self) -> &Token {
        // tokenize always ends with Eof and the cursor never moves past it
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn kind(&self) -> &TokenKind {
        &self.current().kind
    }

    fn peek_kind(&self, offset: usize) -> &TokenKind {
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index].kind
    }

    fn is_at_end(&self) -> bool {
        matches!(self.kind(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if !self.is_at_end() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(self.kind()) == std::mem::discriminant(kind)
    }

    fn check_word(&self, word: &str) -> bool {
        self.kind().is_word(word)
    }

    fn match_token(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn match_word(&mut self, word: &str) -> bool {
        if self.check_word(word) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn consume(&mut self, kind: &TokenKind, expected: &str) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.error(expected))
        }
    }

    fn consume_word(&mut self, word: &str) -> ParseResult<()> {
        if self.match_word(word) {
            Ok(())
        } else {
            Err(self.error(word))
        }
    }

    fn parse_identifier(&mut self) -> ParseResult<String> {
        match self.kind() {
            TokenKind::Identifier(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.error("identifier")),
        }
    }

    /// Two tokens with no whitespace between them (`>` `>` forming a shift)
    fn adjacent(&self, offset: usize) -> bool {
        let first = (self.pos + offset).min(self.tokens.len() - 1);
        let second = (first + 1).min(self.tokens.len() - 1);
        self.tokens[first].span.end == self.tokens[second].span.start
    }

    fn error(&self, expected: &str) -> ParseError {
        let token = self.current();
        match &token.kind {
            TokenKind::Eof => ParseError::UnexpectedEof(expected.to_string()),
            TokenKind::Invalid(text) => ParseError::InvalidInput {
                text: text.clone(),
                span: token.span,
            },
            other => ParseError::UnexpectedToken {
                expected: expected.to_string(),
                found: other.to_string(),
                span: token.span,
            },
        }
    }

    /// Run `f`, rewinding to the starting token if it fails
    fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> ParseResult<T>) -> Option<T> {
        let saved = self.pos;
        match f(self) {
            Ok(value) => Some(value),
            Err(_) => {
                self.pos = saved;
                None
            }
        }
    }

    // ==================== Type Declarations ====================

    fn parse_type_declaration(&mut self) -> ParseResult<TypeDeclaration> {
        let annotations = self.parse_annotations()?;

        if self.check(&TokenKind::Trigger) {
            return self
                .parse_trigger_declaration()
                .map(TypeDeclaration::Trigger);
        }

        let modifiers = self.parse_modifiers();

        match self.kind() {
            TokenKind::Class => self
                .parse_class_declaration(annotations, modifiers)
                .map(TypeDeclaration::Class),
            TokenKind::Interface => self
                .parse_interface_declaration(annotations, modifiers)
                .map(TypeDeclaration::Interface),
            TokenKind::Enum => self
                .parse_enum_declaration(annotations, modifiers)
                .map(TypeDeclaration::Enum),
            _ => Err(self.error("class, interface, enum, or trigger")),
        }
    }

    fn parse_annotations(&mut self) -> ParseResult<Vec<Annotation>> {
        let mut annotations = Vec::new();
        while let TokenKind::Annotation(name) = self.kind() {
            let name = name.clone();
            self.advance();

            let mut parameters = Vec::new();
            if self.match_token(&TokenKind::LParen) {
                while !self.check(&TokenKind::RParen) {
                    let name = if matches!(self.kind(), TokenKind::Identifier(_))
                        && matches!(self.peek_kind(1), TokenKind::Eq)
                    {
                        let name = self.parse_identifier()?;
                        self.advance();
                        Some(name)
                    } else {
                        None
                    };
                    let value = self.parse_unary()?;
                    parameters.push(AnnotationParameter { name, value });
                    // Parameters may be separated by commas or whitespace
                    self.match_token(&TokenKind::Comma);
                }
                self.consume(&TokenKind::RParen, ")")?;
            }

            annotations.push(Annotation { name, parameters });
        }
        Ok(annotations)
    }

    fn parse_modifiers(&mut self) -> Vec<Modifier> {
        let mut modifiers = Vec::new();
        loop {
            let modifier = match self.kind() {
                TokenKind::Public => Modifier::Public,
                TokenKind::Private => Modifier::Private,
                TokenKind::Protected => Modifier::Protected,
                TokenKind::Global => Modifier::Global,
                TokenKind::Static => Modifier::Static,
                TokenKind::Final => Modifier::Final,
                TokenKind::Abstract => Modifier::Abstract,
                TokenKind::Virtual => Modifier::Virtual,
                TokenKind::Override => Modifier::Override,
                TokenKind::Transient => Modifier::Transient,
                TokenKind::TestMethod => Modifier::TestMethod,
                TokenKind::WebService => Modifier::WebService,
                TokenKind::WithSharing => Modifier::WithSharing,
                TokenKind::WithoutSharing => Modifier::WithoutSharing,
                TokenKind::InheritedSharing => Modifier::InheritedSharing,
                _ => break,
            };
            self.advance();
            modifiers.push(modifier);
        }
        modifiers
    }

    fn parse_class_declaration(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> ParseResult<ClassDeclaration> {
        self.consume(&TokenKind::Class, "class")?;
        let name = self.parse_identifier()?;

        let extends = if self.match_token(&TokenKind::Extends) {
            Some(self.parse_type_ref()?)
        } else {
            None
        };

        let implements = if self.match_token(&TokenKind::Implements) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };

        self.consume(&TokenKind::LBrace, "{")?;
        let mut members = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            members.push(self.parse_class_member()?);
        }
        self.consume(&TokenKind::RBrace, "}")?;

        Ok(ClassDeclaration {
            annotations,
            modifiers,
            name,
            extends,
            implements,
            members,
        })
    }

    fn parse_interface_declaration(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> ParseResult<InterfaceDeclaration> {
        self.consume(&TokenKind::Interface, "interface")?;
        let name = self.parse_identifier()?;

        let extends = if self.match_token(&TokenKind::Extends) {
            self.parse_type_list()?
        } else {
            Vec::new()
        };

        self.consume(&TokenKind::LBrace, "{")?;
        let mut methods = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let annotations = self.parse_annotations()?;
            // Interface methods are implicitly public; explicit modifiers are dropped
            self.parse_modifiers();
            let return_type = self.parse_return_type()?;
            let name = self.parse_identifier()?;
            let parameters = self.parse_parameters()?;
            self.consume(&TokenKind::Semicolon, ";")?;
            methods.push(MethodSignature {
                annotations,
                return_type,
                name,
                parameters,
            });
        }
        self.consume(&TokenKind::RBrace, "}")?;

        Ok(InterfaceDeclaration {
            annotations,
            modifiers,
            name,
            extends,
            methods,
        })
    }

    fn parse_enum_declaration(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
    ) -> ParseResult<EnumDeclaration> {
        self.consume(&TokenKind::Enum, "enum")?;
        let name = self.parse_identifier()?;
        self.consume(&TokenKind::LBrace, "{")?;

        let mut values = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            values.push(self.parse_identifier()?);
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.consume(&TokenKind::RBrace, "}")?;

        Ok(EnumDeclaration {
            annotations,
            modifiers,
            name,
            values,
        })
    }

    fn parse_trigger_declaration(&mut self) -> ParseResult<TriggerDeclaration> {
        self.consume(&TokenKind::Trigger, "trigger")?;
        let name = self.parse_identifier()?;
        self.consume_word("on")?;
        let object = self.parse_identifier()?;

        self.consume(&TokenKind::LParen, "(")?;
        let mut events = Vec::new();
        loop {
            let timing = if self.match_word("before") {
                TriggerTiming::Before
            } else if self.match_word("after") {
                TriggerTiming::After
            } else {
                return Err(self.error("before or after"));
            };
            let operation = match self.kind() {
                TokenKind::Identifier(word) => DmlOperation::from_keyword(word),
                _ => None,
            }
            .ok_or_else(|| self.error("trigger operation"))?;
            self.advance();
            events.push(TriggerEvent { timing, operation });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.consume(&TokenKind::RParen, ")")?;

        let body = self.parse_block()?;
        Ok(TriggerDeclaration {
            name,
            object,
            events,
            body,
        })
    }

    // ==================== Types ====================

    fn parse_type_list(&mut self) -> ParseResult<Vec<TypeRef>> {
        let mut types = vec![self.parse_type_ref()?];
        while self.match_token(&TokenKind::Comma) {
            types.push(self.parse_type_ref()?);
        }
        Ok(types)
    }

    fn parse_qualified_name(&mut self) -> ParseResult<QualifiedName> {
        let mut segments = vec![self.parse_identifier()?];
        while self.check(&TokenKind::Dot) && matches!(self.peek_kind(1), TokenKind::Identifier(_)) {
            self.advance();
            segments.push(self.parse_identifier()?);
        }
        Ok(QualifiedName { segments })
    }

    fn parse_type_arguments(&mut self) -> ParseResult<Vec<TypeRef>> {
        if !self.match_token(&TokenKind::Lt) {
            return Ok(Vec::new());
        }
        let arguments = self.parse_type_list()?;
        self.consume(&TokenKind::Gt, ">")?;
        Ok(arguments)
    }

    pub(crate) fn parse_type_ref(&mut self) -> ParseResult<TypeRef> {
        let name = self.parse_qualified_name()?;
        let type_arguments = self.parse_type_arguments()?;
        let is_array =
            if self.check(&TokenKind::LBracket) && matches!(self.peek_kind(1), TokenKind::RBracket) {
                self.advance();
                self.advance();
                true
            } else {
                false
            };
        Ok(TypeRef {
            name,
            type_arguments,
            is_array,
        })
    }

    /// `void` yields `None`
    fn parse_return_type(&mut self) -> ParseResult<Option<TypeRef>> {
        if self.match_token(&TokenKind::Void) {
            Ok(None)
        } else {
            self.parse_type_ref().map(Some)
        }
    }

    // ==================== Class Members ====================

    fn parse_class_member(&mut self) -> ParseResult<ClassMember> {
        let annotations = self.parse_annotations()?;
        let modifiers = self.parse_modifiers();

        match self.kind() {
            TokenKind::Class => {
                return self
                    .parse_class_declaration(annotations, modifiers)
                    .map(ClassMember::InnerClass)
            }
            TokenKind::Interface => {
                return self
                    .parse_interface_declaration(annotations, modifiers)
                    .map(ClassMember::InnerInterface)
            }
            TokenKind::Enum => {
                return self
                    .parse_enum_declaration(annotations, modifiers)
                    .map(ClassMember::InnerEnum)
            }
            TokenKind::Identifier(_) if matches!(self.peek_kind(1), TokenKind::LParen) => {
                let name = self.parse_identifier()?;
                let parameters = self.parse_parameters()?;
                let body = self.parse_block()?;
                return Ok(ClassMember::Constructor(ConstructorDeclaration {
                    annotations,
                    modifiers,
                    name,
                    parameters,
                    body,
                }));
            }
            _ => {}
        }

        let return_type = self.parse_return_type()?;
        let name = self.parse_identifier()?;

        if self.check(&TokenKind::LParen) {
            let parameters = self.parse_parameters()?;
            let body = if self.match_token(&TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_block()?)
            };
            return Ok(ClassMember::Method(MethodDeclaration {
                annotations,
                modifiers,
                return_type,
                name,
                parameters,
                body,
            }));
        }

        let type_ref = return_type.ok_or_else(|| self.error("("))?;

        if self.check(&TokenKind::LBrace) {
            return self
                .parse_property_rest(annotations, modifiers, type_ref, name)
                .map(ClassMember::Property);
        }

        let declarators = self.parse_declarators_after_name(name)?;
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(ClassMember::Field(FieldDeclaration {
            annotations,
            modifiers,
            type_ref,
            declarators,
        }))
    }

    fn parse_property_rest(
        &mut self,
        annotations: Vec<Annotation>,
        modifiers: Vec<Modifier>,
        type_ref: TypeRef,
        name: String,
    ) -> ParseResult<PropertyDeclaration> {
        self.consume(&TokenKind::LBrace, "{")?;
        let mut getter = None;
        let mut setter = None;

        while !self.check(&TokenKind::RBrace) {
            let accessor_modifiers = self.parse_modifiers();
            let is_getter = if self.match_word("get") {
                true
            } else if self.match_word("set") {
                false
            } else {
                return Err(self.error("get or set"));
            };
            let body = if self.match_token(&TokenKind::Semicolon) {
                None
            } else {
                Some(self.parse_block()?)
            };
            let accessor = PropertyAccessor {
                modifiers: accessor_modifiers,
                body,
            };
            if is_getter {
                getter = Some(accessor);
            } else {
                setter = Some(accessor);
            }
        }
        self.consume(&TokenKind::RBrace, "}")?;

        Ok(PropertyDeclaration {
            annotations,
            modifiers,
            type_ref,
            name,
            getter,
            setter,
        })
    }

    fn parse_parameters(&mut self) -> ParseResult<Vec<Parameter>> {
        self.consume(&TokenKind::LParen, "(")?;
        let mut parameters = Vec::new();
        if !self.check(&TokenKind::RParen) {
            loop {
                let is_final = self.match_token(&TokenKind::Final);
                let type_ref = self.parse_type_ref()?;
                let name = self.parse_identifier()?;
                parameters.push(Parameter {
                    is_final,
                    type_ref,
                    name,
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }
        self.consume(&TokenKind::RParen, ")")?;
        Ok(parameters)
    }

    fn parse_declarators_after_name(
        &mut self,
        first: String,
    ) -> ParseResult<Vec<VariableDeclarator>> {
        let mut declarators = Vec::new();
        let mut name = first;
        loop {
            let initializer = if self.match_token(&TokenKind::Eq) {
                Some(self.parse_expression()?)
            } else {
                None
            };
            declarators.push(VariableDeclarator { name, initializer });

            if !self.match_token(&TokenKind::Comma) {
                break;
            }
            name = self.parse_identifier()?;
        }
        Ok(declarators)
    }

    // ==================== Statements ====================

    fn parse_block(&mut self) -> ParseResult<Block> {
        self.consume(&TokenKind::LBrace, "{")?;
        let mut statements = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            if self.is_at_end() {
                return Err(self.error("}"));
            }
            statements.push(self.parse_statement()?);
        }
        self.consume(&TokenKind::RBrace, "}")?;
        Ok(Block { statements })
    }

    /// A branch or loop body; a lone statement is wrapped in a block
    fn parse_body(&mut self) -> ParseResult<Block> {
        if self.check(&TokenKind::LBrace) {
            self.parse_block()
        } else {
            Ok(Block::new(vec![self.parse_statement()?]))
        }
    }

    pub fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.kind() {
            TokenKind::LBrace => self.parse_block().map(Statement::Block),
            TokenKind::If => self.parse_if_statement().map(Statement::If),
            TokenKind::For => self.parse_for_statement(),
            TokenKind::While => self.parse_while_statement(),
            TokenKind::Do => self.parse_do_while_statement(),
            TokenKind::Switch => self.parse_switch_statement(),
            TokenKind::Try => self.parse_try_statement(),
            TokenKind::Return => {
                self.advance();
                let value = if self.check(&TokenKind::Semicolon) {
                    None
                } else {
                    Some(self.parse_expression()?)
                };
                self.consume(&TokenKind::Semicolon, ";")?;
                Ok(Statement::Return(value))
            }
            TokenKind::Throw => {
                self.advance();
                let exception = self.parse_expression()?;
                self.consume(&TokenKind::Semicolon, ";")?;
                Ok(Statement::Throw(exception))
            }
            TokenKind::Break => {
                self.advance();
                self.consume(&TokenKind::Semicolon, ";")?;
                Ok(Statement::Break)
            }
            TokenKind::Continue => {
                self.advance();
                self.consume(&TokenKind::Semicolon, ";")?;
                Ok(Statement::Continue)
            }
            TokenKind::Semicolon => {
                self.advance();
                Ok(Statement::Empty)
            }
            TokenKind::Final => {
                let declaration = self.parse_variable_declaration()?;
                self.consume(&TokenKind::Semicolon, ";")?;
                Ok(Statement::Variable(declaration))
            }
            TokenKind::Identifier(word) if self.is_dml_start(word) => self.parse_dml_statement(),
            _ => self.parse_variable_or_expression_statement(),
        }
    }

    /// `insert acc;`, `delete [SELECT ...];`, `upsert new Account(...);`
    fn is_dml_start(&self, word: &str) -> bool {
        DmlOperation::from_keyword(word).is_some()
            && matches!(
                self.peek_kind(1),
                TokenKind::Identifier(_) | TokenKind::New | TokenKind::LBracket
            )
    }

    fn parse_dml_statement(&mut self) -> ParseResult<Statement> {
        let operation = match self.kind() {
            TokenKind::Identifier(word) => DmlOperation::from_keyword(word),
            _ => None,
        }
        .ok_or_else(|| self.error("DML operation"))?;
        self.advance();
        let expression = self.parse_expression()?;
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(Statement::Dml(DmlStatement {
            operation,
            expression,
        }))
    }

    /// True when the tokens ahead read `Type name` followed by one of `follow`
    fn looks_like_declaration(&mut self, follow: &[TokenKind]) -> bool {
        let saved = self.pos;
        let result = self.parse_type_ref().is_ok()
            && matches!(self.kind(), TokenKind::Identifier(_))
            && {
                let next = self.peek_kind(1);
                follow
                    .iter()
                    .any(|k| std::mem::discriminant(k) == std::mem::discriminant(next))
            };
        self.pos = saved;
        result
    }

    fn parse_variable_declaration(&mut self) -> ParseResult<VariableDeclaration> {
        let is_final = self.match_token(&TokenKind::Final);
        let type_ref = self.parse_type_ref()?;
        let name = self.parse_identifier()?;
        let declarators = self.parse_declarators_after_name(name)?;
        Ok(VariableDeclaration {
            is_final,
            type_ref,
            declarators,
        })
    }

    fn parse_variable_or_expression_statement(&mut self) -> ParseResult<Statement> {
        if self.looks_like_declaration(&[TokenKind::Eq, TokenKind::Comma, TokenKind::Semicolon]) {
            let declaration = self.parse_variable_declaration()?;
            self.consume(&TokenKind::Semicolon, ";")?;
            return Ok(Statement::Variable(declaration));
        }

        let expression = self.parse_expression()?;
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(Statement::Expression(expression))
    }

    fn parse_if_statement(&mut self) -> ParseResult<IfStatement> {
        self.consume(&TokenKind::If, "if")?;
        self.consume(&TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, ")")?;
        let then_block = self.parse_body()?;

        let else_branch = if self.match_token(&TokenKind::Else) {
            if self.check(&TokenKind::If) {
                Some(ElseBranch::If(Box::new(self.parse_if_statement()?)))
            } else {
                Some(ElseBranch::Block(self.parse_body()?))
            }
        } else {
            None
        };

        Ok(IfStatement {
            condition,
            then_block,
            else_branch,
        })
    }

    fn parse_for_statement(&mut self) -> ParseResult<Statement> {
        self.consume(&TokenKind::For, "for")?;
        self.consume(&TokenKind::LParen, "(")?;

        if self.looks_like_declaration(&[TokenKind::Colon]) {
            let type_ref = self.parse_type_ref()?;
            let variable = self.parse_identifier()?;
            self.consume(&TokenKind::Colon, ":")?;
            let iterable = self.parse_expression()?;
            self.consume(&TokenKind::RParen, ")")?;
            let body = self.parse_body()?;
            return Ok(Statement::ForEach(ForEachStatement {
                type_ref,
                variable,
                iterable,
                body,
            }));
        }

        let init = if self.check(&TokenKind::Semicolon) {
            None
        } else if self.check(&TokenKind::Final)
            || self.looks_like_declaration(&[TokenKind::Eq, TokenKind::Comma, TokenKind::Semicolon])
        {
            Some(ForInit::Variables(self.parse_variable_declaration()?))
        } else {
            Some(ForInit::Expressions(self.parse_expression_list()?))
        };
        self.consume(&TokenKind::Semicolon, ";")?;

        let condition = if self.check(&TokenKind::Semicolon) {
            None
        } else {
            Some(self.parse_expression()?)
        };
        self.consume(&TokenKind::Semicolon, ";")?;

        let update = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(&TokenKind::RParen, ")")?;

        let body = self.parse_body()?;
        Ok(Statement::For(ForStatement {
            init,
            condition,
            update,
            body,
        }))
    }

    fn parse_while_statement(&mut self) -> ParseResult<Statement> {
        self.consume(&TokenKind::While, "while")?;
        self.consume(&TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, ")")?;
        let body = self.parse_body()?;
        Ok(Statement::While(WhileStatement { condition, body }))
    }

    fn parse_do_while_statement(&mut self) -> ParseResult<Statement> {
        self.consume(&TokenKind::Do, "do")?;
        let body = self.parse_body()?;
        self.consume(&TokenKind::While, "while")?;
        self.consume(&TokenKind::LParen, "(")?;
        let condition = self.parse_expression()?;
        self.consume(&TokenKind::RParen, ")")?;
        self.consume(&TokenKind::Semicolon, ";")?;
        Ok(Statement::DoWhile(DoWhileStatement { body, condition }))
    }

    fn parse_switch_statement(&mut self) -> ParseResult<Statement> {
        self.consume(&TokenKind::Switch, "switch")?;
        self.consume_word("on")?;
        let expression = self.parse_expression()?;
        self.consume(&TokenKind::LBrace, "{")?;

        let mut when_clauses = Vec::new();
        let mut else_block = None;
        while !self.check(&TokenKind::RBrace) {
            self.consume(&TokenKind::When, "when")?;
            if self.match_token(&TokenKind::Else) {
                else_block = Some(self.parse_block()?);
                continue;
            }
            let condition = if self.looks_like_declaration(&[TokenKind::LBrace]) {
                let type_ref = self.parse_type_ref()?;
                let variable = self.parse_identifier()?;
                WhenCondition::Type { type_ref, variable }
            } else {
                WhenCondition::Values(self.parse_expression_list()?)
            };
            let block = self.parse_block()?;
            when_clauses.push(WhenClause { condition, block });
        }
        self.consume(&TokenKind::RBrace, "}")?;

        Ok(Statement::Switch(SwitchStatement {
            expression,
            when_clauses,
            else_block,
        }))
    }

    fn parse_try_statement(&mut self) -> ParseResult<Statement> {
        self.consume(&TokenKind::Try, "try")?;
        let try_block = self.parse_block()?;

        let mut catch_clauses = Vec::new();
        while self.match_token(&TokenKind::Catch) {
            self.consume(&TokenKind::LParen, "(")?;
            let exception_type = self.parse_type_ref()?;
            let variable = self.parse_identifier()?;
            self.consume(&TokenKind::RParen, ")")?;
            let block = self.parse_block()?;
            catch_clauses.push(CatchClause {
                exception_type,
                variable,
                block,
            });
        }

        let finally_block = if self.match_token(&TokenKind::Finally) {
            Some(self.parse_block()?)
        } else {
            None
        };

        Ok(Statement::Try(TryStatement {
            try_block,
            catch_clauses,
            finally_block,
        }))
    }

    // ==================== Expressions ====================

    fn parse_expression_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut expressions = vec![self.parse_expression()?];
        while self.match_token(&TokenKind::Comma) {
            expressions.push(self.parse_expression()?);
        }
        Ok(expressions)
    }

    pub fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.parse_assignment()
    }

    fn parse_assignment(&mut self) -> ParseResult<Expression> {
        let target = self.parse_ternary()?;

        let (operator, width) = match self.kind() {
            TokenKind::Eq => (BinaryOp::Assign, 1),
            TokenKind::PlusEq => (BinaryOp::AddAssign, 1),
            TokenKind::MinusEq => (BinaryOp::SubtractAssign, 1),
            TokenKind::StarEq => (BinaryOp::MultiplyAssign, 1),
            TokenKind::SlashEq => (BinaryOp::DivideAssign, 1),
            TokenKind::PercentEq => (BinaryOp::ModuloAssign, 1),
            TokenKind::AmpEq => (BinaryOp::AndAssign, 1),
            TokenKind::PipeEq => (BinaryOp::OrAssign, 1),
            TokenKind::CaretEq => (BinaryOp::XorAssign, 1),
            TokenKind::LtLtEq => (BinaryOp::LeftShiftAssign, 1),
            TokenKind::Gt if self.adjacent(0) && matches!(self.peek_kind(1), TokenKind::GtEq) => {
                (BinaryOp::RightShiftAssign, 2)
            }
            TokenKind::Gt
                if self.adjacent(0)
                    && self.adjacent(1)
                    && matches!(self.peek_kind(1), TokenKind::Gt)
                    && matches!(self.peek_kind(2), TokenKind::GtEq) =>
            {
                (BinaryOp::UnsignedRightShiftAssign, 3)
            }
            _ => return Ok(target),
        };
        for _ in 0..width {
            self.advance();
        }

        let value = self.parse_assignment()?;
        Ok(Expression::binary(target, operator, value))
    }

    fn parse_ternary(&mut self) -> ParseResult<Expression> {
        let condition = self.parse_binary(0)?;
        if !self.match_token(&TokenKind::Question) {
            return Ok(condition);
        }
        let then_expr = self.parse_expression()?;
        self.consume(&TokenKind::Colon, ":")?;
        let else_expr = self.parse_ternary()?;
        Ok(Expression::Ternary(Box::new(TernaryExpr {
            condition,
            then_expr,
            else_expr,
        })))
    }

    /// The binary operator at the cursor with its precedence and token width
    fn peek_binary_operator(&self) -> Option<(BinaryOp, u8, usize)> {
        let found = match self.kind() {
            TokenKind::OrOr => (BinaryOp::Or, 1, 1),
            TokenKind::AndAnd => (BinaryOp::And, 2, 1),
            TokenKind::Pipe => (BinaryOp::BitwiseOr, 3, 1),
            TokenKind::Caret => (BinaryOp::BitwiseXor, 4, 1),
            TokenKind::Amp => (BinaryOp::BitwiseAnd, 5, 1),
            TokenKind::EqEq => (BinaryOp::Equal, 6, 1),
            TokenKind::NotEq | TokenKind::LtGt => (BinaryOp::NotEqual, 6, 1),
            TokenKind::EqEqEq => (BinaryOp::ExactEqual, 6, 1),
            TokenKind::NotEqEq => (BinaryOp::ExactNotEqual, 6, 1),
            TokenKind::Lt => (BinaryOp::LessThan, 7, 1),
            TokenKind::LtEq => (BinaryOp::LessOrEqual, 7, 1),
            TokenKind::GtEq => (BinaryOp::GreaterOrEqual, 7, 1),
            TokenKind::Gt => {
                let shift = self.adjacent(0) && matches!(self.peek_kind(1), TokenKind::Gt);
                if shift && self.adjacent(1) && matches!(self.peek_kind(2), TokenKind::GtEq) {
                    // `>>>=` belongs to assignment
                    return None;
                } else if shift && self.adjacent(1) && matches!(self.peek_kind(2), TokenKind::Gt) {
                    (BinaryOp::UnsignedRightShift, 8, 3)
                } else if shift {
                    (BinaryOp::RightShift, 8, 2)
                } else if self.adjacent(0) && matches!(self.peek_kind(1), TokenKind::GtEq) {
                    // `>>=` belongs to assignment
                    return None;
                } else {
                    (BinaryOp::GreaterThan, 7, 1)
                }
            }
            TokenKind::LtLt => (BinaryOp::LeftShift, 8, 1),
            TokenKind::Plus => (BinaryOp::Add, 9, 1),
            TokenKind::Minus => (BinaryOp::Subtract, 9, 1),
            TokenKind::Star => (BinaryOp::Multiply, 10, 1),
            TokenKind::Slash => (BinaryOp::Divide, 10, 1),
            TokenKind::Percent => (BinaryOp::Modulo, 10, 1),
            _ => return None,
        };
        Some(found)
    }

    /// Precedence climbing over left-associative binary operators.
    /// `instanceof` binds at relational level.
    fn parse_binary(&mut self, min_prec: u8) -> ParseResult<Expression> {
        let mut left = self.parse_unary()?;

        loop {
            if self.check(&TokenKind::Instanceof) && min_prec <= 7 {
                self.advance();
                let type_ref = self.parse_type_ref()?;
                left = Expression::InstanceOf(Box::new(InstanceOfExpr {
                    expression: left,
                    type_ref,
                }));
                continue;
            }

            let Some((operator, prec, width)) = self.peek_binary_operator() else {
                break;
            };
            if prec < min_prec {
                break;
            }
            for _ in 0..width {
                self.advance();
            }
            let right = self.parse_binary(prec + 1)?;
            left = Expression::binary(left, operator, right);
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        let operator = match self.kind() {
            TokenKind::Plus => Some(UnaryOp::Plus),
            TokenKind::Minus => Some(UnaryOp::Negate),
            TokenKind::Bang => Some(UnaryOp::Not),
            TokenKind::Tilde => Some(UnaryOp::BitwiseNot),
            TokenKind::PlusPlus => Some(UnaryOp::Increment),
            TokenKind::MinusMinus => Some(UnaryOp::Decrement),
            _ => None,
        };

        if let Some(operator) = operator {
            self.advance();
            let operand = self.parse_unary()?;
            return Ok(Expression::Unary(Box::new(UnaryExpr {
                operator,
                operand,
                is_prefix: true,
            })));
        }

        if self.check(&TokenKind::LParen) {
            if let Some(cast) = self.attempt(Self::parse_cast) {
                return Ok(cast);
            }
        }

        self.parse_postfix()
    }

    /// `(Type)operand`; fails (and is rewound) for parenthesized expressions
    fn parse_cast(&mut self) -> ParseResult<Expression> {
        self.consume(&TokenKind::LParen, "(")?;
        let type_ref = self.parse_type_ref()?;
        self.consume(&TokenKind::RParen, ")")?;

        let operand_start = matches!(
            self.kind(),
            TokenKind::Identifier(_)
                | TokenKind::IntegerLiteral(_)
                | TokenKind::LongLiteral(_)
                | TokenKind::DoubleLiteral(_)
                | TokenKind::StringLiteral(_)
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
                | TokenKind::New
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::Bang
                | TokenKind::Tilde
        );
        if !operand_start {
            return Err(self.error("cast operand"));
        }

        let expression = self.parse_unary()?;
        Ok(Expression::Cast(Box::new(CastExpr {
            type_ref,
            expression,
        })))
    }

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let mut expr = self.parse_primary()?;

        loop {
            match self.kind() {
                TokenKind::Dot => {
                    self.advance();
                    let field = self.parse_identifier()?;
                    expr = match expr {
                        Expression::Name(mut name) => {
                            name.segments.push(field);
                            Expression::Name(name)
                        }
                        object => Expression::FieldAccess(Box::new(FieldAccessExpr { object, field })),
                    };
                }
                TokenKind::LParen => {
                    let arguments = self.parse_arguments()?;
                    expr = Expression::call(expr, arguments);
                }
                TokenKind::LBracket => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.consume(&TokenKind::RBracket, "]")?;
                    expr = Expression::ArrayAccess(Box::new(ArrayAccessExpr { array: expr, index }));
                }
                TokenKind::PlusPlus | TokenKind::MinusMinus => {
                    let operator = if self.check(&TokenKind::PlusPlus) {
                        UnaryOp::Increment
                    } else {
                        UnaryOp::Decrement
                    };
                    self.advance();
                    expr = Expression::Unary(Box::new(UnaryExpr {
                        operator,
                        operand: expr,
                        is_prefix: false,
                    }));
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    fn parse_arguments(&mut self) -> ParseResult<Vec<Expression>> {
        self.consume(&TokenKind::LParen, "(")?;
        let arguments = if self.check(&TokenKind::RParen) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(&TokenKind::RParen, ")")?;
        Ok(arguments)
    }

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        let expr = match self.kind().clone() {
            TokenKind::Null => Expression::Null,
            TokenKind::True => Expression::Boolean(true),
            TokenKind::False => Expression::Boolean(false),
            TokenKind::IntegerLiteral(value) => Expression::Integer(value),
            TokenKind::LongLiteral(value) => Expression::Long(value),
            TokenKind::DoubleLiteral(value) => Expression::Double(value),
            TokenKind::StringLiteral(value) => Expression::String(value),
            TokenKind::Identifier(name) => Expression::Name(QualifiedName {
                segments: vec![name],
            }),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.consume(&TokenKind::RParen, ")")?;
                return Ok(Expression::Parenthesized(Box::new(inner)));
            }
            TokenKind::New => return self.parse_new_expression(),
            TokenKind::LBracket => return self.parse_bracketed_query(),
            _ => return Err(self.error("expression")),
        };
        self.advance();
        Ok(expr)
    }

    fn parse_new_expression(&mut self) -> ParseResult<Expression> {
        self.consume(&TokenKind::New, "new")?;
        let name = self.parse_qualified_name()?;
        let type_arguments = self.parse_type_arguments()?;
        let type_ref = TypeRef {
            name,
            type_arguments,
            is_array: false,
        };

        match self.kind() {
            TokenKind::LParen => {
                let arguments = self.parse_arguments()?;
                Ok(Expression::New(Box::new(NewExpr {
                    type_ref,
                    arguments,
                })))
            }
            TokenKind::LBracket => {
                self.advance();
                if self.match_token(&TokenKind::RBracket) {
                    let elements = self.parse_brace_list()?;
                    Ok(Expression::ArrayCreator(Box::new(ArrayCreatorExpr {
                        element_type: type_ref,
                        dimension: None,
                        initializer: Some(elements),
                    })))
                } else {
                    let dimension = self.parse_expression()?;
                    self.consume(&TokenKind::RBracket, "]")?;
                    Ok(Expression::ArrayCreator(Box::new(ArrayCreatorExpr {
                        element_type: type_ref,
                        dimension: Some(dimension),
                        initializer: None,
                    })))
                }
            }
            TokenKind::LBrace => {
                let base = type_ref.name.segments.last().map(|s| s.to_ascii_lowercase());
                match base.as_deref() {
                    Some("map") => {
                        let entries = self.parse_map_entries()?;
                        Ok(Expression::MapCreator(Box::new(MapCreatorExpr {
                            type_ref,
                            entries,
                        })))
                    }
                    Some("set") => {
                        let elements = self.parse_brace_list()?;
                        Ok(Expression::SetCreator(Box::new(CollectionCreatorExpr {
                            type_ref,
                            elements,
                        })))
                    }
                    _ => {
                        let elements = self.parse_brace_list()?;
                        Ok(Expression::ListCreator(Box::new(CollectionCreatorExpr {
                            type_ref,
                            elements,
                        })))
                    }
                }
            }
            _ => Err(self.error("(, [ or {")),
        }
    }

    fn parse_brace_list(&mut self) -> ParseResult<Vec<Expression>> {
        self.consume(&TokenKind::LBrace, "{")?;
        let elements = if self.check(&TokenKind::RBrace) {
            Vec::new()
        } else {
            self.parse_expression_list()?
        };
        self.consume(&TokenKind::RBrace, "}")?;
        Ok(elements)
    }

    fn parse_map_entries(&mut self) -> ParseResult<Vec<(Expression, Expression)>> {
        self.consume(&TokenKind::LBrace, "{")?;
        let mut entries = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = self.parse_expression()?;
            self.consume(&TokenKind::Arrow, "=>")?;
            let value = self.parse_expression()?;
            entries.push((key, value));
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }
        self.consume(&TokenKind::RBrace, "}")?;
        Ok(entries)
    }

    // ==================== SOQL / SOSL ====================

    fn parse_bracketed_query(&mut self) -> ParseResult<Expression> {
        self.consume(&TokenKind::LBracket, "[")?;
        let expr = if self.check_word("select") {
            Expression::Query(Box::new(self.parse_query()?))
        } else if self.check_word("find") {
            Expression::Search(Box::new(self.parse_search()?))
        } else {
            return Err(self.error("SELECT or FIND"));
        };
        self.consume(&TokenKind::RBracket, "]")?;
        Ok(expr)
    }

    fn parse_query(&mut self) -> ParseResult<Query> {
        self.consume_word("select")?;

        let mut select = Vec::new();
        loop {
            let field = self.parse_query_field()?;
            let alias = match self.kind() {
                TokenKind::Identifier(word) if !word.eq_ignore_ascii_case("from") => {
                    Some(self.parse_identifier()?)
                }
                _ => None,
            };
            select.push(SelectItem { field, alias });
            if !self.match_token(&TokenKind::Comma) {
                break;
            }
        }

        self.consume_word("from")?;
        let from = self.parse_identifier()?;

        let condition = if self.match_word("where") {
            Some(self.parse_condition()?)
        } else {
            None
        };

        let mut order_by = Vec::new();
        if self.match_word("order") {
            self.consume_word("by")?;
            loop {
                let field = self.parse_query_field()?;
                let direction = if self.match_word("asc") {
                    Some(SortDirection::Asc)
                } else if self.match_word("desc") {
                    Some(SortDirection::Desc)
                } else {
                    None
                };
                let nulls = if self.match_word("nulls") {
                    if self.match_word("first") {
                        Some(NullsOrder::First)
                    } else {
                        self.consume_word("last")?;
                        Some(NullsOrder::Last)
                    }
                } else {
                    None
                };
                order_by.push(OrderByItem {
                    field,
                    direction,
                    nulls,
                });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let limit = if self.match_word("limit") {
            Some(self.parse_query_value()?)
        } else {
            None
        };
        let offset = if self.match_word("offset") {
            Some(self.parse_query_value()?)
        } else {
            None
        };

        Ok(Query {
            select,
            from,
            condition,
            order_by,
            limit,
            offset,
        })
    }

    fn parse_query_field(&mut self) -> ParseResult<QueryField> {
        if matches!(self.kind(), TokenKind::Identifier(_))
            && matches!(self.peek_kind(1), TokenKind::LParen)
        {
            let name = self.parse_identifier()?;
            self.consume(&TokenKind::LParen, "(")?;
            let argument = if self.check(&TokenKind::RParen) {
                None
            } else {
                Some(self.parse_qualified_name()?)
            };
            self.consume(&TokenKind::RParen, ")")?;
            return Ok(QueryField::Function { name, argument });
        }
        self.parse_qualified_name().map(QueryField::Path)
    }

    fn parse_condition(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_and_condition()?;
        while self.match_word("or") {
            let right = self.parse_and_condition()?;
            left = Condition::Logical {
                operator: LogicalOp::Or,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }
        Ok(left)
    }

    fn parse_and_condition(&mut self) -> ParseResult<Condition> {
        let mut left = self.parse_not_condition()?;
        while self.match_word("and") {
            let right = self.parse_not_condition()?;
            left = Condition::Logical {
                operator: LogicalOp::And,
                left: Box::new(left),
                right: Some(Box::new(right)),
            };
        }
        Ok(left)
    }

    fn parse_not_condition(&mut self) -> ParseResult<Condition> {
        if self.match_word("not") {
            let inner = self.parse_not_condition()?;
            return Ok(Condition::Not(Box::new(inner)));
        }
        if self.match_token(&TokenKind::LParen) {
            let inner = self.parse_condition()?;
            self.consume(&TokenKind::RParen, ")")?;
            return Ok(inner);
        }

        let field = self.parse_query_field()?;
        let operator = match self.kind() {
            TokenKind::Eq => ComparisonOp::Equal,
            TokenKind::NotEq | TokenKind::LtGt => ComparisonOp::NotEqual,
            TokenKind::Lt => ComparisonOp::LessThan,
            TokenKind::LtEq => ComparisonOp::LessOrEqual,
            TokenKind::Gt => ComparisonOp::GreaterThan,
            TokenKind::GtEq => ComparisonOp::GreaterOrEqual,
            kind if kind.is_word("like") => ComparisonOp::Like,
            kind if kind.is_word("in") => ComparisonOp::In,
            kind if kind.is_word("includes") => ComparisonOp::Includes,
            kind if kind.is_word("excludes") => ComparisonOp::Excludes,
            kind if kind.is_word("not") && self.peek_kind(1).is_word("in") => {
                self.advance();
                ComparisonOp::NotIn
            }
            _ => return Err(self.error("comparison operator")),
        };
        self.advance();

        let set_operator = matches!(
            operator,
            ComparisonOp::In | ComparisonOp::NotIn | ComparisonOp::Includes | ComparisonOp::Excludes
        );
        let value = if set_operator && self.check(&TokenKind::LParen) {
            self.parse_value_list()?
        } else {
            self.parse_query_value()?
        };
        Ok(Condition::Comparison {
            field,
            operator,
            value,
        })
    }

    /// A literal, name, or `:bind` expression inside a query
    fn parse_query_value(&mut self) -> ParseResult<Expression> {
        if self.match_token(&TokenKind::Colon) {
            let bound = self.parse_postfix()?;
            return Ok(Expression::BindVariable(Box::new(bound)));
        }
        self.parse_unary()
    }

    /// `('a', 'b')` after a set operator
    fn parse_value_list(&mut self) -> ParseResult<Expression> {
        self.consume(&TokenKind::LParen, "(")?;
        let mut values = vec![self.parse_query_value()?];
        while self.match_token(&TokenKind::Comma) {
            values.push(self.parse_query_value()?);
        }
        self.consume(&TokenKind::RParen, ")")?;
        Ok(Expression::ValueList(values))
    }

    fn parse_search(&mut self) -> ParseResult<Search> {
        self.consume_word("find")?;
        let term = self.parse_query_value()?;

        let scope = if self.match_word("in") {
            let scope = match self.kind() {
                kind if kind.is_word("all") => SearchScope::AllFields,
                kind if kind.is_word("name") => SearchScope::NameFields,
                kind if kind.is_word("email") => SearchScope::EmailFields,
                kind if kind.is_word("phone") => SearchScope::PhoneFields,
                kind if kind.is_word("sidebar") => SearchScope::SidebarFields,
                _ => return Err(self.error("search group")),
            };
            self.advance();
            self.consume_word("fields")?;
            Some(scope)
        } else {
            None
        };

        let mut returning = Vec::new();
        if self.match_word("returning") {
            loop {
                let object = self.parse_identifier()?;
                let mut fields = Vec::new();
                if self.match_token(&TokenKind::LParen) {
                    loop {
                        fields.push(self.parse_qualified_name()?);
                        if !self.match_token(&TokenKind::Comma) {
                            break;
                        }
                    }
                    self.consume(&TokenKind::RParen, ")")?;
                }
                returning.push(SearchReturning { object, fields });
                if !self.match_token(&TokenKind::Comma) {
                    break;
                }
            }
        }

        let limit = if self.match_word("limit") {
            Some(self.parse_query_value()?)
        } else {
            None
        };

        Ok(Search {
            term,
            scope,
            returning,
            limit,
        })
    }
}

/// Parse Apex source code into a compilation unit
pub fn parse(source: &str) -> ParseResult<CompilationUnit> {
    let mut parser = Parser::new(source);
    parser.parse()
}

/// Parse a standalone expression, requiring the whole input to be consumed
pub fn parse_expression(source: &str) -> ParseResult<Expression> {
    let mut parser = Parser::new(source);
    let expr = parser.parse_expression()?;
    if !parser.is_at_end() {
        return Err(parser.error("end of input"));
    }
    Ok(expr)
}

/// Parse a single statement, requiring the whole input to be consumed
pub fn parse_statement(source: &str) -> ParseResult<Statement> {
    let mut parser = Parser::new(source);
    let statement = parser.parse_statement()?;
    if !parser.is_at_end() {
        return Err(parser.error("end of input"));
    }
    Ok(statement)
}
