//! Recursive-descent parser over the token stream.
//!
//! A `Parser` struct holds the token slice and a cursor position behind
//! a `parse(tokens) -> {ast, errors, warnings}` entry point. Error
//! recovery is panic-free: a malformed construct records a
//! `SourceError` and the parser resynchronises to the next likely
//! boundary rather than aborting the whole parse. The expression
//! precedence cascade is collapsed through the `binary_level!` macro
//! in `macros.rs`.

mod macros;

use std::collections::HashSet;
use std::rc::Rc;

use crate::ast::{
    Ast, AssignOp, Declarator, NodeId, NodeKind, StorageClass, TypeName, TypeQualifier,
};
use crate::error::{SourceError, SyntaxErrorKind};
use crate::options::{CVersion, Options};
use crate::token::{Keyword, Punct, Token, TokenKind};

use macros::binary_level;

#[derive(Debug, Clone)]
pub struct ParseResult {
    pub ast: Ast,
    pub errors: Vec<SourceError>,
    pub warnings: Vec<SourceError>,
}

struct DeclSpecifiers {
    storage: Option<StorageClass>,
    qualifiers: Vec<TypeQualifier>,
    base: String,
    is_typedef: bool,
    type_decl: Option<NodeId>,
}

struct DeclaratorResult {
    name: String,
    ty: TypeName,
    is_function: bool,
    params: Vec<NodeId>,
    variadic: bool,
}

pub struct Parser<'a> {
    tokens: Vec<Token>,
    pos: usize,
    options: &'a Options,
    file: Rc<str>,
    typedefs: Vec<HashSet<String>>,
    ast: Ast,
    errors: Vec<SourceError>,
    warnings: Vec<SourceError>,
}

pub fn parse(tokens: &[Token], options: &Options) -> ParseResult {
    let mut parser = Parser::new(tokens, options);
    let mut decls = Vec::new();
    loop {
        parser.skip_preprocessor();
        if parser.is_eof() {
            break;
        }
        match parser.parse_declaration(true) {
            Ok(id) => decls.push(id),
            Err(e) => {
                parser.errors.push(e);
                parser.synchronize();
            }
        }
    }
    let (line, col) = parser.pos();
    let root = parser.ast.alloc(NodeKind::TranslationUnit { decls }, line, col);
    parser.ast.set_root(root);
    ParseResult { ast: parser.ast, errors: parser.errors, warnings: parser.warnings }
}

impl<'a> Parser<'a> {
    fn new(tokens: &[Token], options: &'a Options) -> Self {
        let file = tokens.first().map(|t| t.file.clone()).unwrap_or_else(|| Rc::from("<input>"));
        let mut base = HashSet::new();
        for name in ["size_t", "ptrdiff_t", "wchar_t", "FILE", "time_t", "va_list", "max_align_t"] {
            base.insert(name.to_string());
        }
        if options.c_version >= CVersion::C99 {
            for width in ["8", "16", "32", "64"] {
                base.insert(format!("int{width}_t"));
                base.insert(format!("uint{width}_t"));
            }
            base.insert("intptr_t".to_string());
            base.insert("uintptr_t".to_string());
            base.insert("ssize_t".to_string());
        }
        Self {
            tokens: tokens.to_vec(),
            pos: 0,
            options,
            file,
            typedefs: vec![base],
            ast: Ast::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    // --- token-stream helpers -----------------------------------------

    fn cur(&self) -> &Token {
        &self.tokens[self.pos]
    }

    fn kind_at(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    fn peek(&self) -> &TokenKind {
        &self.cur().kind
    }

    fn peek_punct(&self) -> Option<Punct> {
        match self.peek() {
            TokenKind::Punctuator(p) => Some(*p),
            _ => None,
        }
    }

    fn peek_keyword(&self) -> Option<Keyword> {
        match self.peek() {
            TokenKind::Keyword(k) => Some(*k),
            _ => None,
        }
    }

    fn pos(&self) -> (u32, u32) {
        (self.cur().line, self.cur().column)
    }

    fn is_eof(&self) -> bool {
        matches!(self.peek(), TokenKind::Eof)
    }

    fn advance(&mut self) -> Token {
        let t = self.cur().clone();
        if !t.kind.is_eof() {
            self.pos += 1;
        }
        t
    }

    fn check_punct(&self, p: Punct) -> bool {
        self.peek_punct() == Some(p)
    }

    fn eat_punct(&mut self, p: Punct) -> bool {
        if self.check_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: Punct, msg: &str) -> Result<(), SourceError> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.error_here(SyntaxErrorKind::ExpectedToken, msg))
        }
    }

    fn expect_identifier(&mut self) -> Result<String, SourceError> {
        if matches!(self.peek(), TokenKind::Identifier) {
            Ok(self.advance().lexeme)
        } else {
            Err(self.error_here(SyntaxErrorKind::ExpectedIdentifier, "expected an identifier"))
        }
    }

    fn error_here(&self, kind: SyntaxErrorKind, msg: &str) -> SourceError {
        let t = self.cur();
        SourceError::new(kind, msg, t.line, t.column, &self.file).with_token(t.clone())
    }

    fn peek_qualifier(&self) -> Option<Keyword> {
        match self.peek_keyword() {
            Some(k @ (Keyword::Const | Keyword::Volatile | Keyword::Restrict | Keyword::Atomic)) => Some(k),
            _ => None,
        }
    }

    fn skip_preprocessor(&mut self) {
        while matches!(self.peek(), TokenKind::Preprocessor) {
            self.advance();
        }
    }

    fn skip_attributes(&mut self) {
        while self.check_punct(Punct::LBracket) && matches!(self.kind_at(1), TokenKind::Punctuator(Punct::LBracket)) {
            self.advance();
            self.advance();
            let mut depth = 2i32;
            while depth > 0 && !self.is_eof() {
                match self.peek_punct() {
                    Some(Punct::LBracket) => depth += 1,
                    Some(Punct::RBracket) => depth -= 1,
                    _ => {}
                }
                self.advance();
            }
        }
    }

    /// Advance past the current statement/declaration on a parse error so
    /// one bad construct doesn't abort the whole file.
    fn synchronize(&mut self) {
        while !self.is_eof() {
            if self.check_punct(Punct::Semicolon) {
                self.advance();
                return;
            }
            if self.check_punct(Punct::RBrace) {
                return;
            }
            if let Some(k) = self.peek_keyword() {
                if matches!(
                    k,
                    Keyword::If
                        | Keyword::While
                        | Keyword::For
                        | Keyword::Do
                        | Keyword::Switch
                        | Keyword::Return
                        | Keyword::Break
                        | Keyword::Continue
                        | Keyword::Goto
                        | Keyword::Int
                        | Keyword::Char
                        | Keyword::Void
                        | Keyword::Struct
                        | Keyword::Union
                        | Keyword::Enum
                        | Keyword::Typedef
                        | Keyword::Static
                        | Keyword::Const
                ) {
                    return;
                }
            }
            self.advance();
        }
    }

    // --- typedef-name tracking ------------------------------------------

    fn push_scope(&mut self) {
        self.typedefs.push(HashSet::new());
    }

    fn pop_scope(&mut self) {
        self.typedefs.pop();
    }

    fn is_typedef_name(&self, name: &str) -> bool {
        self.typedefs.iter().rev().any(|scope| scope.contains(name))
    }

    fn register_typedef(&mut self, name: String) {
        self.typedefs.last_mut().expect("global typedef scope always present").insert(name);
    }

    // --- declarations ----------------------------------------------------

    fn parse_declaration(&mut self, allow_function_def: bool) -> Result<NodeId, SourceError> {
        self.skip_preprocessor();
        self.skip_attributes();
        let (line, col) = self.pos();
        let specs = self.parse_declaration_specifiers()?;
        self.skip_attributes();

        if let Some(decl) = specs.type_decl {
            if self.check_punct(Punct::Semicolon) {
                self.advance();
                return Ok(decl);
            }
        }

        if self.eat_punct(Punct::Semicolon) {
            return Ok(self.ast.alloc(NodeKind::EmptyDeclaration, line, col));
        }

        let first = self.parse_declarator(&specs.base)?;

        if specs.is_typedef {
            return self.finish_typedef(first, &specs, line, col);
        }

        if allow_function_def && first.is_function && self.check_punct(Punct::LBrace) {
            let body = self.parse_compound_stmt()?;
            return Ok(self.ast.alloc(
                NodeKind::FunctionDef {
                    name: first.name,
                    return_type: first.ty,
                    params: first.params,
                    variadic: first.variadic,
                    body,
                },
                line,
                col,
            ));
        }

        let mut decls = vec![self.finish_var_or_proto_decl(first, &specs, line, col)?];
        while self.eat_punct(Punct::Comma) {
            let d = self.parse_declarator(&specs.base)?;
            decls.push(self.finish_var_or_proto_decl(d, &specs, line, col)?);
        }
        self.expect_punct(Punct::Semicolon, "expected ';' after declaration")?;
        if decls.len() == 1 {
            Ok(decls[0])
        } else {
            Ok(self.ast.alloc(NodeKind::MultiVarDecl { decls }, line, col))
        }
    }

    fn finish_typedef(
        &mut self,
        first: DeclaratorResult,
        specs: &DeclSpecifiers,
        line: u32,
        col: u32,
    ) -> Result<NodeId, SourceError> {
        self.register_typedef(first.name.clone());
        let mut ids = vec![self.ast.alloc(NodeKind::TypedefDecl { name: first.name, ty: first.ty }, line, col)];
        while self.eat_punct(Punct::Comma) {
            let d = self.parse_declarator(&specs.base)?;
            self.register_typedef(d.name.clone());
            ids.push(self.ast.alloc(NodeKind::TypedefDecl { name: d.name, ty: d.ty }, line, col));
        }
        self.expect_punct(Punct::Semicolon, "expected ';' after typedef")?;
        if ids.len() == 1 {
            Ok(ids[0])
        } else {
            Ok(self.ast.alloc(NodeKind::MultiVarDecl { decls: ids }, line, col))
        }
    }

    fn finish_var_or_proto_decl(
        &mut self,
        d: DeclaratorResult,
        specs: &DeclSpecifiers,
        line: u32,
        col: u32,
    ) -> Result<NodeId, SourceError> {
        if d.is_function {
            return Ok(self.ast.alloc(
                NodeKind::FunctionDecl { name: d.name, return_type: d.ty, params: d.params, variadic: d.variadic },
                line,
                col,
            ));
        }
        let init = if self.eat_punct(Punct::Assign) { Some(self.parse_initializer()?) } else { None };
        Ok(self.ast.alloc(
            NodeKind::VarDecl {
                declarator: Declarator { name: d.name, ty: d.ty },
                storage: specs.storage,
                qualifiers: specs.qualifiers.clone(),
                init,
            },
            line,
            col,
        ))
    }

    fn parse_declaration_specifiers(&mut self) -> Result<DeclSpecifiers, SourceError> {
        let mut storage = None;
        let mut qualifiers = Vec::new();
        let mut base_parts: Vec<String> = Vec::new();
        let mut is_typedef = false;
        let mut type_decl = None;
        let mut have_explicit_type = false;

        loop {
            self.skip_attributes();
            match self.peek_keyword() {
                Some(Keyword::Typedef) => {
                    storage = Some(StorageClass::Typedef);
                    is_typedef = true;
                    self.advance();
                }
                Some(Keyword::Extern) => {
                    storage = Some(StorageClass::Extern);
                    self.advance();
                }
                Some(Keyword::Static) => {
                    storage = Some(StorageClass::Static);
                    self.advance();
                }
                Some(Keyword::Auto) => {
                    storage = Some(StorageClass::Auto);
                    self.advance();
                }
                Some(Keyword::Register) => {
                    storage = Some(StorageClass::Register);
                    self.advance();
                }
                Some(Keyword::ThreadLocal) | Some(Keyword::ThreadLocalNoUnderscore) => {
                    storage = Some(StorageClass::ThreadLocal);
                    self.advance();
                }
                Some(Keyword::Const) => {
                    qualifiers.push(TypeQualifier::Const);
                    self.advance();
                }
                Some(Keyword::Volatile) => {
                    qualifiers.push(TypeQualifier::Volatile);
                    self.advance();
                }
                Some(Keyword::Restrict) => {
                    qualifiers.push(TypeQualifier::Restrict);
                    self.advance();
                }
                Some(Keyword::Atomic) => {
                    qualifiers.push(TypeQualifier::Atomic);
                    self.advance();
                }
                Some(Keyword::Inline) | Some(Keyword::Noreturn) => {
                    self.advance();
                }
                Some(Keyword::Constexpr) => {
                    qualifiers.push(TypeQualifier::Const);
                    self.advance();
                }
                Some(Keyword::Alignas) | Some(Keyword::AlignasNoUnderscore) => {
                    self.advance();
                    if self.eat_punct(Punct::LParen) {
                        if self.looks_like_type_name_at(0) {
                            self.parse_type_name()?;
                        } else {
                            self.parse_conditional_expr()?;
                        }
                        self.expect_punct(Punct::RParen, "expected ')' after alignas")?;
                    }
                }
                Some(Keyword::Typeof) | Some(Keyword::TypeofUnqual) => {
                    self.advance();
                    self.expect_punct(Punct::LParen, "expected '(' after typeof")?;
                    if self.looks_like_type_name_at(0) {
                        self.parse_type_name()?;
                    } else {
                        self.parse_expression()?;
                    }
                    self.expect_punct(Punct::RParen, "expected ')' after typeof operand")?;
                    if !have_explicit_type {
                        base_parts.push("int".to_string());
                        have_explicit_type = true;
                    }
                }
                Some(Keyword::Void) if !have_explicit_type => {
                    base_parts.push("void".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Char) if !have_explicit_type => {
                    base_parts.push("char".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Bool) if !have_explicit_type => {
                    base_parts.push("_Bool".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Short) => {
                    base_parts.push("short".to_string());
                    self.advance();
                }
                Some(Keyword::Int) => {
                    base_parts.push("int".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Long) => {
                    base_parts.push("long".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Float) if !have_explicit_type => {
                    base_parts.push("float".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Double) if !have_explicit_type => {
                    base_parts.push("double".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Signed) => {
                    base_parts.push("signed".to_string());
                    self.advance();
                }
                Some(Keyword::Unsigned) => {
                    base_parts.push("unsigned".to_string());
                    have_explicit_type = true;
                    self.advance();
                }
                Some(Keyword::Complex) => {
                    base_parts.push("_Complex".to_string());
                    self.advance();
                }
                Some(Keyword::Imaginary) => {
                    base_parts.push("_Imaginary".to_string());
                    self.advance();
                }
                Some(Keyword::Struct) if !have_explicit_type => {
                    let id = self.parse_struct_or_union_specifier(false)?;
                    have_explicit_type = true;
                    type_decl = Some(id);
                }
                Some(Keyword::Union) if !have_explicit_type => {
                    let id = self.parse_struct_or_union_specifier(true)?;
                    have_explicit_type = true;
                    type_decl = Some(id);
                }
                Some(Keyword::Enum) if !have_explicit_type => {
                    let id = self.parse_enum_specifier()?;
                    have_explicit_type = true;
                    type_decl = Some(id);
                }
                None if matches!(self.peek(), TokenKind::Identifier)
                    && !have_explicit_type
                    && self.is_typedef_name(&self.cur().lexeme) =>
                {
                    base_parts.push(self.cur().lexeme.clone());
                    have_explicit_type = true;
                    self.advance();
                }
                _ => break,
            }
        }

        let base = if let Some(id) = type_decl {
            match self.ast.kind(id) {
                NodeKind::StructSpecifier { tag: Some(t), .. } => format!("struct {t}"),
                NodeKind::UnionSpecifier { tag: Some(t), .. } => format!("union {t}"),
                NodeKind::EnumSpecifier { tag: Some(t), .. } => format!("enum {t}"),
                _ => "int".to_string(),
            }
        } else if base_parts.is_empty() {
            if self.options.strict_mode {
                let w = self.error_here(SyntaxErrorKind::ExpectedToken, "implicit int is not permitted in strict mode");
                self.warnings.push(w);
            }
            "int".to_string()
        } else {
            base_parts.join(" ")
        };

        Ok(DeclSpecifiers { storage, qualifiers, base, is_typedef, type_decl })
    }

    fn parse_struct_or_union_specifier(&mut self, is_union: bool) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.skip_attributes();
        let tag = match self.peek() {
            TokenKind::Identifier => Some(self.advance().lexeme),
            _ => None,
        };
        let mut members = Vec::new();
        if self.eat_punct(Punct::LBrace) {
            while !self.check_punct(Punct::RBrace) && !self.is_eof() {
                match self.parse_struct_member_decl() {
                    Ok(id) => members.push(id),
                    Err(e) => {
                        self.errors.push(e);
                        self.synchronize();
                    }
                }
            }
            self.expect_punct(Punct::RBrace, "expected '}' to close struct/union body")?;
        }
        let kind = if is_union {
            NodeKind::UnionSpecifier { tag, members }
        } else {
            NodeKind::StructSpecifier { tag, members }
        };
        Ok(self.ast.alloc(kind, line, col))
    }

    fn parse_struct_member_decl(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let specs = self.parse_declaration_specifiers()?;
        let mut members = Vec::new();
        loop {
            let (name, ty) = self.parse_abstract_or_named_declarator(&specs.base)?;
            let bitfield = if self.eat_punct(Punct::Colon) { Some(self.parse_conditional_expr()?) } else { None };
            members.push(self.ast.alloc(NodeKind::StructMember { name: name.unwrap_or_default(), ty, bitfield }, line, col));
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::Semicolon, "expected ';' after struct member")?;
        Ok(self.ast.alloc(NodeKind::StructMemberDecl { members }, line, col))
    }

    fn parse_enum_specifier(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        let tag = match self.peek() {
            TokenKind::Identifier => Some(self.advance().lexeme),
            _ => None,
        };
        let mut enumerators = Vec::new();
        if self.eat_punct(Punct::LBrace) {
            while !self.check_punct(Punct::RBrace) && !self.is_eof() {
                let (eline, ecol) = self.pos();
                let name = self.expect_identifier()?;
                let value = if self.eat_punct(Punct::Assign) { Some(self.parse_conditional_expr()?) } else { None };
                enumerators.push(self.ast.alloc(NodeKind::Enumerator { name, value }, eline, ecol));
                if !self.eat_punct(Punct::Comma) {
                    break;
                }
            }
            self.expect_punct(Punct::RBrace, "expected '}' to close enum body")?;
        }
        Ok(self.ast.alloc(NodeKind::EnumSpecifier { tag, enumerators }, line, col))
    }

    fn parse_declarator(&mut self, base: &str) -> Result<DeclaratorResult, SourceError> {
        let mut pointer_depth = 0u32;
        while self.eat_punct(Punct::Star) {
            pointer_depth += 1;
            while self.peek_qualifier().is_some() {
                self.advance();
            }
        }
        let name = self.expect_identifier()?;
        let mut dimensions = Vec::new();
        let mut is_function = false;
        let mut params = Vec::new();
        let mut variadic = false;
        if self.eat_punct(Punct::LParen) {
            is_function = true;
            let (p, v) = self.parse_parameter_list()?;
            params = p;
            variadic = v;
            self.expect_punct(Punct::RParen, "expected ')' after parameter list")?;
        } else {
            while self.eat_punct(Punct::LBracket) {
                if self.check_punct(Punct::RBracket) {
                    dimensions.push(None);
                } else {
                    dimensions.push(Some(self.parse_constant_int_expr()?));
                }
                self.expect_punct(Punct::RBracket, "expected ']' after array dimension")?;
            }
        }
        Ok(DeclaratorResult { name, ty: TypeName { base: base.to_string(), pointer_depth, dimensions }, is_function, params, variadic })
    }

    fn parse_abstract_or_named_declarator(&mut self, base: &str) -> Result<(Option<String>, TypeName), SourceError> {
        let mut pointer_depth = 0u32;
        while self.eat_punct(Punct::Star) {
            pointer_depth += 1;
            while self.peek_qualifier().is_some() {
                self.advance();
            }
        }
        let name = match self.peek() {
            TokenKind::Identifier => Some(self.advance().lexeme),
            _ => None,
        };
        let mut dimensions = Vec::new();
        while self.eat_punct(Punct::LBracket) {
            if self.check_punct(Punct::RBracket) {
                dimensions.push(None);
            } else {
                dimensions.push(Some(self.parse_constant_int_expr()?));
            }
            self.expect_punct(Punct::RBracket, "expected ']' after array dimension")?;
        }
        Ok((name, TypeName { base: base.to_string(), pointer_depth, dimensions }))
    }

    fn parse_parameter_list(&mut self) -> Result<(Vec<NodeId>, bool), SourceError> {
        let mut params = Vec::new();
        if self.check_punct(Punct::RParen) {
            return Ok((params, false));
        }
        if matches!(self.peek_keyword(), Some(Keyword::Void)) && matches!(self.kind_at(1), TokenKind::Punctuator(Punct::RParen)) {
            self.advance();
            return Ok((params, false));
        }
        loop {
            self.skip_attributes();
            if self.eat_punct(Punct::Ellipsis) {
                return Ok((params, true));
            }
            let (line, col) = self.pos();
            let specs = self.parse_declaration_specifiers()?;
            let (name, ty) = self.parse_abstract_or_named_declarator(&specs.base)?;
            params.push(self.ast.alloc(NodeKind::Parameter { name, ty }, line, col));
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        Ok((params, false))
    }

    /// Array-dimension constants are restricted to literal arithmetic; any
    /// expression that doesn't fold is treated as an unspecified dimension.
    fn parse_constant_int_expr(&mut self) -> Result<i64, SourceError> {
        let id = self.parse_conditional_expr()?;
        Ok(self.const_eval(id).unwrap_or(0))
    }

    fn const_eval(&self, id: NodeId) -> Option<i64> {
        use crate::ast::BinOp;
        match self.ast.kind(id) {
            NodeKind::IntLiteral { value } => Some(*value),
            NodeKind::CharLiteral { value } => Some(*value as i64),
            NodeKind::UnaryExpr { op: crate::ast::UnaryOp::Neg, expr } => self.const_eval(*expr).map(|v| -v),
            NodeKind::BinaryExpr { op, lhs, rhs } => {
                let l = self.const_eval(*lhs)?;
                let r = self.const_eval(*rhs)?;
                match op {
                    BinOp::Add => Some(l + r),
                    BinOp::Sub => Some(l - r),
                    BinOp::Mul => Some(l * r),
                    BinOp::Div if r != 0 => Some(l / r),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    fn looks_like_type_name_at(&self, offset: usize) -> bool {
        match self.kind_at(offset) {
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::Void
                    | Keyword::Char
                    | Keyword::Short
                    | Keyword::Int
                    | Keyword::Long
                    | Keyword::Float
                    | Keyword::Double
                    | Keyword::Signed
                    | Keyword::Unsigned
                    | Keyword::Bool
                    | Keyword::Complex
                    | Keyword::Struct
                    | Keyword::Union
                    | Keyword::Enum
                    | Keyword::Const
                    | Keyword::Volatile
                    | Keyword::Restrict
                    | Keyword::Atomic
            ),
            TokenKind::Identifier => {
                let idx = (self.pos + offset).min(self.tokens.len() - 1);
                self.is_typedef_name(&self.tokens[idx].lexeme)
            }
            _ => false,
        }
    }

    fn parse_type_name(&mut self) -> Result<TypeName, SourceError> {
        let specs = self.parse_declaration_specifiers()?;
        let (_, ty) = self.parse_abstract_or_named_declarator(&specs.base)?;
        Ok(ty)
    }

    // --- statements --------------------------------------------------------

    fn looks_like_declaration(&self) -> bool {
        match self.peek() {
            TokenKind::Keyword(k) => matches!(
                k,
                Keyword::Typedef
                    | Keyword::Extern
                    | Keyword::Static
                    | Keyword::Auto
                    | Keyword::Register
                    | Keyword::ThreadLocal
                    | Keyword::ThreadLocalNoUnderscore
                    | Keyword::Const
                    | Keyword::Volatile
                    | Keyword::Restrict
                    | Keyword::Atomic
                    | Keyword::Void
                    | Keyword::Char
                    | Keyword::Short
                    | Keyword::Int
                    | Keyword::Long
                    | Keyword::Float
                    | Keyword::Double
                    | Keyword::Signed
                    | Keyword::Unsigned
                    | Keyword::Bool
                    | Keyword::Complex
                    | Keyword::Imaginary
                    | Keyword::Struct
                    | Keyword::Union
                    | Keyword::Enum
                    | Keyword::Inline
                    | Keyword::Noreturn
                    | Keyword::Constexpr
                    | Keyword::Typeof
                    | Keyword::TypeofUnqual
                    | Keyword::Alignas
                    | Keyword::AlignasNoUnderscore
            ),
            TokenKind::Identifier => self.is_typedef_name(&self.cur().lexeme),
            _ => false,
        }
    }

    fn parse_block_item(&mut self) -> Result<NodeId, SourceError> {
        if self.looks_like_declaration() {
            self.parse_declaration(false)
        } else {
            self.parse_statement()
        }
    }

    fn parse_compound_stmt(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.expect_punct(Punct::LBrace, "expected '{'")?;
        self.push_scope();
        let mut stmts = Vec::new();
        while !self.check_punct(Punct::RBrace) && !self.is_eof() {
            self.skip_preprocessor();
            if self.check_punct(Punct::RBrace) {
                break;
            }
            match self.parse_block_item() {
                Ok(id) => stmts.push(id),
                Err(e) => {
                    self.errors.push(e);
                    self.synchronize();
                }
            }
        }
        self.pop_scope();
        self.expect_punct(Punct::RBrace, "expected '}' to close compound statement")?;
        Ok(self.ast.alloc(NodeKind::CompoundStmt { stmts }, line, col))
    }

    fn parse_statement(&mut self) -> Result<NodeId, SourceError> {
        if self.check_punct(Punct::LBrace) {
            return self.parse_compound_stmt();
        }
        if self.check_punct(Punct::Semicolon) {
            let (line, col) = self.pos();
            self.advance();
            return Ok(self.ast.alloc(NodeKind::EmptyStmt, line, col));
        }
        if matches!(self.peek(), TokenKind::Identifier) && matches!(self.kind_at(1), TokenKind::Punctuator(Punct::Colon)) {
            return self.parse_labeled();
        }
        match self.peek_keyword() {
            Some(Keyword::If) => self.parse_if(),
            Some(Keyword::Switch) => self.parse_switch(),
            Some(Keyword::While) => self.parse_while(),
            Some(Keyword::Do) => self.parse_do_while(),
            Some(Keyword::For) => self.parse_for(),
            Some(Keyword::Break) => {
                let (line, col) = self.pos();
                self.advance();
                self.expect_punct(Punct::Semicolon, "expected ';' after break")?;
                Ok(self.ast.alloc(NodeKind::BreakStmt, line, col))
            }
            Some(Keyword::Continue) => {
                let (line, col) = self.pos();
                self.advance();
                self.expect_punct(Punct::Semicolon, "expected ';' after continue")?;
                Ok(self.ast.alloc(NodeKind::ContinueStmt, line, col))
            }
            Some(Keyword::Return) => self.parse_return(),
            Some(Keyword::Goto) => self.parse_goto(),
            Some(Keyword::Case) => self.parse_case(),
            Some(Keyword::Default) => self.parse_default(),
            _ => self.parse_expr_stmt(),
        }
    }

    fn parse_if(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after 'if'")?;
        let cond = self.parse_expression()?;
        self.expect_punct(Punct::RParen, "expected ')' after if condition")?;
        let then_branch = self.parse_statement()?;
        let else_branch =
            if matches!(self.peek_keyword(), Some(Keyword::Else)) {
                self.advance();
                Some(self.parse_statement()?)
            } else {
                None
            };
        Ok(self.ast.alloc(NodeKind::IfStmt { cond, then_branch, else_branch }, line, col))
    }

    fn parse_switch(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after 'switch'")?;
        let cond = self.parse_expression()?;
        self.expect_punct(Punct::RParen, "expected ')' after switch condition")?;
        let body = self.parse_statement()?;
        Ok(self.ast.alloc(NodeKind::SwitchStmt { cond, body }, line, col))
    }

    fn parse_while(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.expect_punct(Punct::RParen, "expected ')' after while condition")?;
        let body = self.parse_statement()?;
        Ok(self.ast.alloc(NodeKind::WhileStmt { cond, body }, line, col))
    }

    fn parse_do_while(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        let body = self.parse_statement()?;
        if !matches!(self.peek_keyword(), Some(Keyword::While)) {
            return Err(self.error_here(SyntaxErrorKind::ExpectedToken, "expected 'while' after do-block"));
        }
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after 'while'")?;
        let cond = self.parse_expression()?;
        self.expect_punct(Punct::RParen, "expected ')' after do-while condition")?;
        self.expect_punct(Punct::Semicolon, "expected ';' after do-while")?;
        Ok(self.ast.alloc(NodeKind::DoWhileStmt { body, cond }, line, col))
    }

    fn parse_for(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after 'for'")?;
        self.push_scope();

        let init = if self.check_punct(Punct::Semicolon) {
            let (l, c) = self.pos();
            self.advance();
            self.ast.alloc(NodeKind::EmptyDeclaration, l, c)
        } else if self.looks_like_declaration() {
            self.parse_declaration(false)?
        } else {
            let (l, c) = self.pos();
            let e = self.parse_expression()?;
            self.expect_punct(Punct::Semicolon, "expected ';' after for-loop initializer")?;
            self.ast.alloc(NodeKind::ExprStmt { expr: e }, l, c)
        };

        // `cond`/`inc` are plain expression nodes (like `WhileStmt.cond`),
        // not statements — they're evaluated with `eval_expr`, never
        // dispatched as a statement, so they must not be wrapped in
        // `ExprStmt`. A missing condition is C's implicit "always true";
        // a missing increment is a harmless constant the increment step
        // evaluates and discards.
        let cond = if self.check_punct(Punct::Semicolon) {
            let (l, c) = self.pos();
            self.ast.alloc(NodeKind::IntLiteral { value: 1 }, l, c)
        } else {
            self.parse_expression()?
        };
        self.expect_punct(Punct::Semicolon, "expected ';' after for-loop condition")?;

        let inc = if self.check_punct(Punct::RParen) {
            let (l, c) = self.pos();
            self.ast.alloc(NodeKind::IntLiteral { value: 0 }, l, c)
        } else {
            self.parse_expression()?
        };
        self.expect_punct(Punct::RParen, "expected ')' after for-loop clauses")?;

        let body = self.parse_statement()?;
        self.pop_scope();
        Ok(self.ast.alloc(NodeKind::ForStmt { init, cond, inc, body }, line, col))
    }

    fn parse_return(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        let value = if self.check_punct(Punct::Semicolon) { None } else { Some(self.parse_expression()?) };
        self.expect_punct(Punct::Semicolon, "expected ';' after return")?;
        Ok(self.ast.alloc(NodeKind::ReturnStmt { value }, line, col))
    }

    fn parse_goto(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        let label = self.expect_identifier()?;
        self.expect_punct(Punct::Semicolon, "expected ';' after goto label")?;
        Ok(self.ast.alloc(NodeKind::GotoStmt { label }, line, col))
    }

    fn parse_labeled(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let label = self.expect_identifier()?;
        self.expect_punct(Punct::Colon, "expected ':' after label")?;
        let stmt = self.parse_statement()?;
        Ok(self.ast.alloc(NodeKind::LabeledStmt { label, stmt }, line, col))
    }

    fn parse_case(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        let value = self.parse_conditional_expr()?;
        self.expect_punct(Punct::Colon, "expected ':' after case value")?;
        let stmt = self.parse_statement()?;
        Ok(self.ast.alloc(NodeKind::CaseStmt { value, stmt }, line, col))
    }

    fn parse_default(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::Colon, "expected ':' after 'default'")?;
        let stmt = self.parse_statement()?;
        Ok(self.ast.alloc(NodeKind::DefaultStmt { stmt }, line, col))
    }

    fn parse_expr_stmt(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let expr = self.parse_expression()?;
        self.expect_punct(Punct::Semicolon, "expected ';' after expression")?;
        Ok(self.ast.alloc(NodeKind::ExprStmt { expr }, line, col))
    }

    // --- initializers --------------------------------------------------------

    fn parse_initializer(&mut self) -> Result<NodeId, SourceError> {
        if self.check_punct(Punct::LBrace) {
            self.parse_initializer_list()
        } else {
            self.parse_assignment_expr()
        }
    }

    fn parse_initializer_list(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.expect_punct(Punct::LBrace, "expected '{'")?;
        let mut elements = Vec::new();
        while !self.check_punct(Punct::RBrace) && !self.is_eof() {
            let (dline, dcol) = self.pos();
            let mut designators = Vec::new();
            loop {
                if self.eat_punct(Punct::LBracket) {
                    let index = self.parse_conditional_expr()?;
                    self.expect_punct(Punct::RBracket, "expected ']' in designator")?;
                    designators.push(self.ast.alloc(NodeKind::ArrayDesignator { index }, dline, dcol));
                } else if self.eat_punct(Punct::Dot) {
                    let member = self.expect_identifier()?;
                    designators.push(self.ast.alloc(NodeKind::MemberDesignator { member }, dline, dcol));
                } else {
                    break;
                }
            }
            if !designators.is_empty() {
                self.expect_punct(Punct::Assign, "expected '=' after designator")?;
                let value = self.parse_initializer()?;
                elements.push(self.ast.alloc(NodeKind::DesignatedInit { designators, value }, dline, dcol));
            } else {
                elements.push(self.parse_initializer()?);
            }
            if !self.eat_punct(Punct::Comma) {
                break;
            }
        }
        self.expect_punct(Punct::RBrace, "expected '}' to close initializer list")?;
        Ok(self.ast.alloc(NodeKind::InitializerList { elements }, line, col))
    }

    // --- expressions -----------------------------------------------------

    fn parse_expression(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let first = self.parse_assignment_expr()?;
        if !self.check_punct(Punct::Comma) {
            return Ok(first);
        }
        let mut exprs = vec![first];
        while self.eat_punct(Punct::Comma) {
            exprs.push(self.parse_assignment_expr()?);
        }
        Ok(self.ast.alloc(NodeKind::CommaExpr { exprs }, line, col))
    }

    fn parse_assignment_expr(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let lhs = self.parse_conditional_expr()?;
        if let Some(op) = self.peek_punct().and_then(AssignOp::from_punct) {
            self.advance();
            let rhs = self.parse_assignment_expr()?;
            return Ok(self.ast.alloc(NodeKind::AssignExpr { op, target: lhs, value: rhs }, line, col));
        }
        Ok(lhs)
    }

    fn parse_conditional_expr(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        let cond = self.parse_logical_or_expr()?;
        if self.eat_punct(Punct::Question) {
            let then_expr = self.parse_expression()?;
            self.expect_punct(Punct::Colon, "expected ':' in conditional expression")?;
            let else_expr = self.parse_conditional_expr()?;
            return Ok(self.ast.alloc(NodeKind::ConditionalExpr { cond, then_expr, else_expr }, line, col));
        }
        Ok(cond)
    }

    binary_level!(parse_logical_or_expr, parse_logical_and_expr, [(Punct::PipePipe, crate::ast::BinOp::LogicalOr)]);
    binary_level!(parse_logical_and_expr, parse_bitor_expr, [(Punct::AmpAmp, crate::ast::BinOp::LogicalAnd)]);
    binary_level!(parse_bitor_expr, parse_bitxor_expr, [(Punct::Pipe, crate::ast::BinOp::BitOr)]);
    binary_level!(parse_bitxor_expr, parse_bitand_expr, [(Punct::Caret, crate::ast::BinOp::BitXor)]);
    binary_level!(parse_bitand_expr, parse_equality_expr, [(Punct::Amp, crate::ast::BinOp::BitAnd)]);
    binary_level!(
        parse_equality_expr,
        parse_relational_expr,
        [(Punct::Eq, crate::ast::BinOp::Eq), (Punct::Ne, crate::ast::BinOp::Ne)]
    );
    binary_level!(
        parse_relational_expr,
        parse_shift_expr,
        [
            (Punct::Lt, crate::ast::BinOp::Lt),
            (Punct::Gt, crate::ast::BinOp::Gt),
            (Punct::Le, crate::ast::BinOp::Le),
            (Punct::Ge, crate::ast::BinOp::Ge),
        ]
    );
    binary_level!(
        parse_shift_expr,
        parse_additive_expr,
        [(Punct::Shl, crate::ast::BinOp::Shl), (Punct::Shr, crate::ast::BinOp::Shr)]
    );
    binary_level!(
        parse_additive_expr,
        parse_multiplicative_expr,
        [(Punct::Plus, crate::ast::BinOp::Add), (Punct::Minus, crate::ast::BinOp::Sub)]
    );
    binary_level!(
        parse_multiplicative_expr,
        parse_cast_expr,
        [
            (Punct::Star, crate::ast::BinOp::Mul),
            (Punct::Slash, crate::ast::BinOp::Div),
            (Punct::Percent, crate::ast::BinOp::Mod),
        ]
    );

    fn parse_cast_expr(&mut self) -> Result<NodeId, SourceError> {
        if self.check_punct(Punct::LParen) && self.looks_like_type_name_at(1) {
            let (line, col) = self.pos();
            self.advance();
            let ty = self.parse_type_name()?;
            self.expect_punct(Punct::RParen, "expected ')' after cast type")?;
            let expr = self.parse_cast_expr()?;
            return Ok(self.ast.alloc(NodeKind::CastExpr { ty, expr }, line, col));
        }
        self.parse_unary_expr()
    }

    fn parse_unary_expr(&mut self) -> Result<NodeId, SourceError> {
        use crate::ast::{IncDecOp, UnaryOp};
        let (line, col) = self.pos();
        match self.peek_punct() {
            Some(Punct::PlusPlus) => {
                self.advance();
                let expr = self.parse_unary_expr()?;
                return Ok(self.ast.alloc(NodeKind::PrefixExpr { op: IncDecOp::Inc, expr }, line, col));
            }
            Some(Punct::MinusMinus) => {
                self.advance();
                let expr = self.parse_unary_expr()?;
                return Ok(self.ast.alloc(NodeKind::PrefixExpr { op: IncDecOp::Dec, expr }, line, col));
            }
            Some(Punct::Plus) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::Plus, expr }, line, col));
            }
            Some(Punct::Minus) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::Neg, expr }, line, col));
            }
            Some(Punct::Bang) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::Not, expr }, line, col));
            }
            Some(Punct::Tilde) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::BitNot, expr }, line, col));
            }
            Some(Punct::Star) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::Deref, expr }, line, col));
            }
            Some(Punct::Amp) => {
                self.advance();
                let expr = self.parse_cast_expr()?;
                return Ok(self.ast.alloc(NodeKind::UnaryExpr { op: UnaryOp::AddrOf, expr }, line, col));
            }
            _ => {}
        }
        match self.peek_keyword() {
            Some(Keyword::Sizeof) => self.parse_sizeof(),
            Some(Keyword::Alignof) | Some(Keyword::AlignofNoUnderscore) => self.parse_alignof(),
            _ => self.parse_postfix_expr(),
        }
    }

    fn parse_sizeof(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        if self.check_punct(Punct::LParen) && self.looks_like_type_name_at(1) {
            self.advance();
            let ty = self.parse_type_name()?;
            self.expect_punct(Punct::RParen, "expected ')' after sizeof type")?;
            return Ok(self.ast.alloc(NodeKind::SizeofType { ty }, line, col));
        }
        let expr = self.parse_unary_expr()?;
        Ok(self.ast.alloc(NodeKind::SizeofExpr { expr }, line, col))
    }

    fn parse_alignof(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after alignof")?;
        let ty = self.parse_type_name()?;
        self.expect_punct(Punct::RParen, "expected ')' after alignof type")?;
        Ok(self.ast.alloc(NodeKind::AlignofExpr { ty }, line, col))
    }

    fn parse_postfix_expr(&mut self) -> Result<NodeId, SourceError> {
        use crate::ast::IncDecOp;
        let mut expr = self.parse_primary_expr()?;
        loop {
            let (line, col) = self.pos();
            match self.peek_punct() {
                Some(Punct::LBracket) => {
                    self.advance();
                    let index = self.parse_expression()?;
                    self.expect_punct(Punct::RBracket, "expected ']' after array index")?;
                    expr = self.ast.alloc(NodeKind::ArraySubscriptExpr { array: expr, index }, line, col);
                }
                Some(Punct::LParen) => {
                    self.advance();
                    let mut args = Vec::new();
                    if !self.check_punct(Punct::RParen) {
                        loop {
                            args.push(self.parse_assignment_expr()?);
                            if !self.eat_punct(Punct::Comma) {
                                break;
                            }
                        }
                    }
                    self.expect_punct(Punct::RParen, "expected ')' after call arguments")?;
                    expr = self.ast.alloc(NodeKind::CallExpr { callee: expr, args }, line, col);
                }
                Some(Punct::Dot) => {
                    self.advance();
                    let member = self.expect_identifier()?;
                    expr = self.ast.alloc(NodeKind::MemberExpr { object: expr, member }, line, col);
                }
                Some(Punct::Arrow) => {
                    self.advance();
                    let member = self.expect_identifier()?;
                    expr = self.ast.alloc(NodeKind::ArrowExpr { object: expr, member }, line, col);
                }
                Some(Punct::PlusPlus) => {
                    self.advance();
                    expr = self.ast.alloc(NodeKind::PostfixExpr { op: IncDecOp::Inc, expr }, line, col);
                }
                Some(Punct::MinusMinus) => {
                    self.advance();
                    expr = self.ast.alloc(NodeKind::PostfixExpr { op: IncDecOp::Dec, expr }, line, col);
                }
                _ => break,
            }
        }
        Ok(expr)
    }

    fn parse_primary_expr(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        match self.peek().clone() {
            TokenKind::IntLiteral(i) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::IntLiteral { value: i.value }, line, col))
            }
            TokenKind::FloatLiteral(f) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::FloatLiteral { value: f.value }, line, col))
            }
            TokenKind::CharLiteral(c) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::CharLiteral { value: c }, line, col))
            }
            TokenKind::Utf8CharLiteral(c) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::Utf8CharLiteral { value: c }, line, col))
            }
            TokenKind::StringLiteral(s) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::StringLiteral { value: s }, line, col))
            }
            TokenKind::Utf8StringLiteral(s) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::Utf8StringLiteral { value: s }, line, col))
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::BoolLiteral { value: true }, line, col))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::BoolLiteral { value: false }, line, col))
            }
            TokenKind::Keyword(Keyword::Nullptr) => {
                self.advance();
                Ok(self.ast.alloc(NodeKind::NullptrLiteral, line, col))
            }
            TokenKind::Keyword(Keyword::Generic) => self.parse_generic_selection(),
            TokenKind::Identifier => {
                let name = self.advance().lexeme;
                Ok(self.ast.alloc(NodeKind::IdentifierExpr { name }, line, col))
            }
            TokenKind::Punctuator(Punct::LParen) => {
                self.advance();
                let e = self.parse_expression()?;
                self.expect_punct(Punct::RParen, "expected ')' to close parenthesised expression")?;
                Ok(e)
            }
            _ => Err(self.error_here(SyntaxErrorKind::ExpectedExpression, "expected an expression")),
        }
    }

    fn parse_generic_selection(&mut self) -> Result<NodeId, SourceError> {
        let (line, col) = self.pos();
        self.advance();
        self.expect_punct(Punct::LParen, "expected '(' after _Generic")?;
        let controlling = self.parse_assignment_expr()?;
        let mut associations = Vec::new();
        while self.eat_punct(Punct::Comma) {
            let (aline, acol) = self.pos();
            if matches!(self.peek_keyword(), Some(Keyword::Default)) {
                self.advance();
                self.expect_punct(Punct::Colon, "expected ':' after default in _Generic")?;
                let expr = self.parse_assignment_expr()?;
                associations.push(self.ast.alloc(NodeKind::GenericDefault { expr }, aline, acol));
            } else {
                let ty = self.parse_type_name()?;
                self.expect_punct(Punct::Colon, "expected ':' in generic association")?;
                let expr = self.parse_assignment_expr()?;
                associations.push(self.ast.alloc(NodeKind::GenericAssociation { ty, expr }, aline, acol));
            }
        }
        self.expect_punct(Punct::RParen, "expected ')' to close _Generic")?;
        Ok(self.ast.alloc(NodeKind::GenericSelection { controlling, associations }, line, col))
    }
}

#[cfg(test)]
mod tests;
