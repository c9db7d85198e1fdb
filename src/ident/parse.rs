use log::debug;
use smol_str::SmolStr;

use crate::ident::wrap::ESCAPE;
use crate::ident::{unquote_tag, unwrap};
use crate::types::{
    Basic, ChanDir, FieldDescriptor, FunctionSignature, MethodDescriptor, NamedTypeRef,
    TypeDescriptor,
};
use crate::universe::TypeSource;

/// Parses a canonical ID back into a descriptor, resolving named references
/// against `source`. Unknown packages/members and generic arity mismatches
/// yield [TypeDescriptor::Invalid]; mismatched bracket/brace/quote nesting is
/// a caller bug and aborts.
pub(crate) fn id_to_type(id: &str, source: &dyn TypeSource) -> TypeDescriptor {
    let tokens = lex(id);
    let mut parser = Parser {
        id,
        tokens,
        pos: 0,
        source,
    };
    let desc = parser.parse_type();
    assert!(
        parser.pos == parser.tokens.len(),
        "trailing tokens after type in canonical id {:?}",
        id
    );
    desc
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(SmolStr),
    Int(u64),
    /// Tag literal, already unquoted
    Str(SmolStr),
    Star,
    LBrack,
    RBrack,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Dot,
    Ellipsis,
    /// `<-`
    Arrow,
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ESCAPE
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == ESCAPE
}

fn lex(id: &str) -> Vec<Token> {
    let chars: Vec<char> = id.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        match c {
            ' ' | '\t' | '\n' => i += 1,
            '*' => {
                tokens.push(Token::Star);
                i += 1;
            }
            '[' => {
                tokens.push(Token::LBrack);
                i += 1;
            }
            ']' => {
                tokens.push(Token::RBrack);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            '{' => {
                tokens.push(Token::LBrace);
                i += 1;
            }
            '}' => {
                tokens.push(Token::RBrace);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            ';' => {
                tokens.push(Token::Semi);
                i += 1;
            }
            '.' => {
                if chars.get(i + 1) == Some(&'.') && chars.get(i + 2) == Some(&'.') {
                    tokens.push(Token::Ellipsis);
                    i += 3;
                } else {
                    tokens.push(Token::Dot);
                    i += 1;
                }
            }
            '<' => {
                assert!(
                    chars.get(i + 1) == Some(&'-'),
                    "stray '<' in canonical id {:?}",
                    id
                );
                tokens.push(Token::Arrow);
                i += 2;
            }
            '"' => {
                let start = i;
                i += 1;
                loop {
                    match chars.get(i) {
                        None => panic!("unterminated string literal in canonical id {:?}", id),
                        Some(&'\\') => i += 2,
                        Some(&'"') => {
                            i += 1;
                            break;
                        }
                        Some(_) => i += 1,
                    }
                }
                let literal: String = chars[start..i].iter().collect();
                tokens.push(Token::Str(SmolStr::new(unquote_tag(&literal))));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                while matches!(chars.get(i), Some(c) if c.is_ascii_digit()) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                let len = text
                    .parse()
                    .unwrap_or_else(|_| panic!("array length out of range in canonical id {:?}", id));
                tokens.push(Token::Int(len));
            }
            c if is_ident_start(c) => {
                let start = i;
                while matches!(chars.get(i), Some(&c) if is_ident_char(c)) {
                    i += 1;
                }
                let text: String = chars[start..i].iter().collect();
                tokens.push(Token::Ident(SmolStr::new(text)));
            }
            c => panic!("unexpected character {:?} in canonical id {:?}", c, id),
        }
    }
    tokens
}

struct Parser<'a> {
    id: &'a str,
    tokens: Vec<Token>,
    pos: usize,
    source: &'a dyn TypeSource,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset)
    }

    fn bump(&mut self) -> Token {
        let tok = self
            .tokens
            .get(self.pos)
            .cloned()
            .unwrap_or_else(|| panic!("unexpected end of canonical id {:?}", self.id));
        self.pos += 1;
        tok
    }

    fn eat(&mut self, tok: Token) -> bool {
        if self.peek() == Some(&tok) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) {
        let tok = self.bump();
        assert!(
            tok == expected,
            "expected {:?}, found {:?} in canonical id {:?}",
            expected,
            tok,
            self.id
        );
    }

    fn token_starts_type(tok: &Token) -> bool {
        matches!(
            tok,
            Token::Ident(_) | Token::Star | Token::LBrack | Token::Arrow
        )
    }

    fn parse_type(&mut self) -> TypeDescriptor {
        match self.bump() {
            Token::Star => TypeDescriptor::pointer_to(self.parse_type()),
            Token::Arrow => {
                let tok = self.bump();
                assert!(
                    tok == Token::Ident(SmolStr::new_inline("chan")),
                    "expected 'chan' after '<-' in canonical id {:?}",
                    self.id
                );
                TypeDescriptor::chan_of(ChanDir::Recv, self.parse_type())
            }
            Token::LBrack => {
                if self.eat(Token::RBrack) {
                    return TypeDescriptor::slice_of(self.parse_type());
                }
                let len = match self.bump() {
                    Token::Int(len) => len,
                    tok => panic!(
                        "expected array length, found {:?} in canonical id {:?}",
                        tok, self.id
                    ),
                };
                self.expect(Token::RBrack);
                TypeDescriptor::array_of(len, self.parse_type())
            }
            Token::Ident(name) => match name.as_str() {
                "map" => {
                    self.expect(Token::LBrack);
                    let key = self.parse_type();
                    self.expect(Token::RBrack);
                    let value = self.parse_type();
                    // A map is unusable without a resolvable key type
                    if key.is_invalid() {
                        TypeDescriptor::Invalid
                    } else {
                        TypeDescriptor::map_of(key, value)
                    }
                }
                "chan" => {
                    let dir = if self.eat(Token::Arrow) {
                        ChanDir::Send
                    } else {
                        ChanDir::Both
                    };
                    TypeDescriptor::chan_of(dir, self.parse_type())
                }
                "func" => TypeDescriptor::func(self.parse_sig()),
                "struct" => self.parse_struct_body(),
                "interface" => self.parse_interface_body(),
                "invalid" => TypeDescriptor::Invalid,
                _ => self.parse_named(name),
            },
            tok => panic!(
                "unexpected token {:?} in canonical id {:?}",
                tok, self.id
            ),
        }
    }

    fn parse_named(&mut self, first: SmolStr) -> TypeDescriptor {
        let (pkg_path, name) = if self.eat(Token::Dot) {
            let name = match self.bump() {
                Token::Ident(name) => name,
                tok => panic!(
                    "expected member name after '.', found {:?} in canonical id {:?}",
                    tok, self.id
                ),
            };
            (unwrap(&first), name)
        } else {
            (SmolStr::default(), first)
        };
        // Bare basics resolve without a declaration behind them
        if pkg_path.is_empty() {
            if let Some(basic) = Basic::from_name(&name) {
                return TypeDescriptor::Basic(basic);
            }
        }
        let mut args = Vec::new();
        if self.eat(Token::LBrack) {
            loop {
                args.push(self.parse_type());
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RBrack);
        }
        self.resolve_named(pkg_path, name, args)
    }

    fn resolve_named(
        &self,
        pkg_path: SmolStr,
        name: SmolStr,
        args: Vec<TypeDescriptor>,
    ) -> TypeDescriptor {
        let decl = match self.source.lookup(&pkg_path, &name) {
            Some(decl) => decl,
            None => {
                debug!("canonical id references unknown type {}.{}", pkg_path, name);
                return TypeDescriptor::Invalid;
            }
        };
        if !args.is_empty() && args.len() != decl.params.len() {
            debug!(
                "wrong number of type arguments for {}.{}: got {}, want {}",
                pkg_path,
                name,
                args.len(),
                decl.params.len()
            );
            return TypeDescriptor::Invalid;
        }
        if args.iter().any(TypeDescriptor::is_invalid) {
            return TypeDescriptor::Invalid;
        }
        TypeDescriptor::Named(Box::new(NamedTypeRef {
            pkg: decl.pkg.clone(),
            name,
            args,
        }))
    }

    fn parse_sig(&mut self) -> FunctionSignature {
        self.expect(Token::LParen);
        let mut params = Vec::new();
        let mut variadic = false;
        if !self.eat(Token::RParen) {
            loop {
                if self.eat(Token::Ellipsis) {
                    variadic = true;
                    params.push(TypeDescriptor::slice_of(self.parse_type()));
                } else {
                    params.push(self.parse_type());
                }
                if !self.eat(Token::Comma) {
                    break;
                }
            }
            self.expect(Token::RParen);
        }
        let results = if self.eat(Token::LParen) {
            let mut results = Vec::new();
            if !self.eat(Token::RParen) {
                loop {
                    results.push(self.parse_type());
                    if !self.eat(Token::Comma) {
                        break;
                    }
                }
                self.expect(Token::RParen);
            }
            results
        } else if self.peek().map_or(false, Self::token_starts_type) {
            vec![self.parse_type()]
        } else {
            Vec::new()
        };
        FunctionSignature {
            params,
            results,
            variadic,
        }
    }

    fn parse_struct_body(&mut self) -> TypeDescriptor {
        self.expect(Token::LBrace);
        let mut fields = Vec::new();
        if self.eat(Token::RBrace) {
            return TypeDescriptor::Struct { fields };
        }
        loop {
            fields.push(self.parse_field());
            if !self.eat(Token::Semi) {
                break;
            }
        }
        self.expect(Token::RBrace);
        TypeDescriptor::Struct { fields }
    }

    fn parse_field(&mut self) -> FieldDescriptor {
        // A leading identifier may be a field name or the start of an
        // embedded type reference; one token of lookahead decides, except for
        // `Name[...]` which needs the bracket scan below.
        let named_field = match (self.peek(), self.peek_at(1)) {
            (Some(Token::Ident(_)), Some(Token::Dot)) => false,
            (Some(Token::Ident(_)), Some(Token::LBrack)) => !self.brackets_end_member(),
            (Some(Token::Ident(_)), Some(tok)) if Self::token_starts_type(tok) => true,
            _ => false,
        };
        if named_field {
            let name = match self.bump() {
                Token::Ident(name) => name,
                _ => unreachable!(),
            };
            let type_ = self.parse_type();
            let tag = self.eat_tag();
            FieldDescriptor {
                name,
                type_,
                tag,
                anonymous: false,
                pkg_path: SmolStr::default(),
            }
        } else {
            let type_ = self.parse_type();
            let tag = self.eat_tag();
            let name = type_
                .base_named()
                .map(|nref| nref.name.clone())
                .unwrap_or_default();
            FieldDescriptor {
                name,
                type_,
                tag,
                anonymous: true,
                pkg_path: SmolStr::default(),
            }
        }
    }

    /// Whether the bracket group starting one token ahead runs to the end of
    /// the current struct/interface member (an embedded `Name[...]`), as
    /// opposed to opening the type of a named field (`name []T`, `name [4]T`).
    fn brackets_end_member(&self) -> bool {
        let mut depth = 0usize;
        let mut i = self.pos + 1;
        loop {
            match self.tokens.get(i) {
                None => panic!("unbalanced brackets in canonical id {:?}", self.id),
                Some(Token::LBrack) => depth += 1,
                Some(Token::RBrack) => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                Some(_) => {}
            }
            i += 1;
        }
        matches!(
            self.tokens.get(i + 1),
            None | Some(Token::Semi) | Some(Token::RBrace) | Some(Token::Str(_))
        )
    }

    fn eat_tag(&mut self) -> SmolStr {
        if matches!(self.peek(), Some(Token::Str(_))) {
            match self.bump() {
                Token::Str(tag) => tag,
                _ => unreachable!(),
            }
        } else {
            SmolStr::default()
        }
    }

    fn parse_interface_body(&mut self) -> TypeDescriptor {
        self.expect(Token::LBrace);
        let mut embeds = Vec::new();
        let mut methods = Vec::new();
        if self.eat(Token::RBrace) {
            return TypeDescriptor::Interface { embeds, methods };
        }
        loop {
            if matches!(self.peek(), Some(Token::Ident(_)))
                && matches!(self.peek_at(1), Some(Token::LParen))
            {
                let name = match self.bump() {
                    Token::Ident(name) => name,
                    _ => unreachable!(),
                };
                let sig = self.parse_sig();
                methods.push(MethodDescriptor {
                    name,
                    pkg_path: SmolStr::default(),
                    sig,
                    pointer_recv: false,
                });
            } else {
                embeds.push(self.parse_type());
            }
            if !self.eat(Token::Semi) {
                break;
            }
        }
        self.expect(Token::RBrace);
        TypeDescriptor::Interface { embeds, methods }
    }
}
