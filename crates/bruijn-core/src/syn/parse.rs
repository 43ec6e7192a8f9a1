use crate::common::{DBParseError, Index, NegativeLevel, UniverseLevel};
use crate::name::Name;
use crate::syn::{RcSyntax, Syntax};
use logos::{Lexer, Logos};
use std::fmt;
use std::num::ParseIntError;
use std::ops::Range;

#[derive(Default, Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("invalid token at {0:?}")]
    InvalidToken(Range<usize>),
    #[error("invalid integer: {0}")]
    InvalidInteger(String),
    #[error("expected ')'")]
    MissingRParen,
    #[error("expected ':'")]
    MissingColon,
    #[error("expected '→'")]
    MissingArrow,
    #[error("expected a variable")]
    MissingVariable,
    #[error("expected a binder '(%x : T)'")]
    MissingBinder,
    #[error("expected a term")]
    MissingTerm,
    #[error("unknown variable %{0}")]
    UnknownVariable(String),
    #[error("unexpected input at {0:?}")]
    TrailingInput(Range<usize>),
    #[error(transparent)]
    DBParseError(#[from] DBParseError),
    #[default]
    #[error("syntax error")]
    Other,
}

impl Error {
    fn from_lexer(lex: &mut Lexer<'_, Token>) -> Self {
        Error::InvalidToken(lex.span())
    }
}

impl From<ParseIntError> for Error {
    fn from(err: ParseIntError) -> Self {
        use std::num::IntErrorKind::{NegOverflow, PosOverflow};
        match err.kind() {
            PosOverflow | NegOverflow => Error::InvalidInteger("overflow".to_owned()),
            _ => Error::InvalidInteger(err.to_string()),
        }
    }
}

type ParseResult<T> = std::result::Result<T, Error>;

#[derive(Logos, Clone, Debug, Eq, PartialEq, Hash)]
#[logos(error(Error, Error::from_lexer))]
#[logos(skip r"\p{Whitespace}+")]
#[logos(skip r"//[^\r\n]*")]
#[logos(subpattern id = r"[^\p{gc=Separator}\p{gc=Control}():;,\[\]!\?%@→λ∀]+")]
pub enum Token {
    #[token("∀", priority = 4)]
    Pi,
    #[token("λ", priority = 4)]
    Lambda,
    #[token("(", priority = 10)]
    LParen,
    #[token(")", priority = 10)]
    RParen,
    #[token("→", priority = 5)]
    #[token("->", priority = 5)]
    Arrow,
    #[token(":", priority = 4)]
    Colon,
    #[token("Prop", priority = 4)]
    Prop,
    #[token("Type", priority = 4)]
    Type,
    #[regex(r"𝒰[0-9]+", priority = 4, callback = |lex| lex.slice()["𝒰".len()..].parse())]
    Universe(usize),
    #[regex(r"[0-9]+", priority = 4, callback = |lex| lex.slice().parse())]
    Numeral(u64),
    #[regex(r"@(?&id)", priority = 4, callback = |lex| lex.slice()["@".len()..].to_owned())]
    Constant(String),
    #[regex(r"%(?&id)", priority = 4, callback = |lex| lex.slice()["%".len()..].to_owned())]
    Variable(String),
    #[regex(r"![0-9]+", priority = 4, callback = |lex| lex.slice().parse())]
    UnboundVariable(NegativeLevel),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

struct State<'input> {
    /// The names in scope, innermost last.
    names: Vec<String>,
    lexer: Lexer<'input, Token>,
    /// The current token. We support single token peeking.
    token: Option<ParseResult<Token>>,
}

impl<'input> State<'input> {
    fn new(input: &'input str) -> State<'input> {
        let mut lexer = Token::lexer(input);
        let token = lexer.next();
        State {
            names: Vec::new(),
            lexer,
            token,
        }
    }

    fn peek_token(&self) -> Option<ParseResult<Token>> {
        self.token.clone()
    }

    fn advance_token(&mut self) {
        self.token = self.lexer.next();
    }

    fn push_name(&mut self, name: String) {
        self.names.push(name);
    }

    fn find_name(&self, name: &str) -> Option<Index> {
        self.names
            .iter()
            .rev()
            .position(|n| n == name)
            .map(Index::new)
    }

    fn names_depth(&self) -> usize {
        self.names.len()
    }

    fn reset_names(&mut self, depth: usize) {
        self.names.truncate(depth);
    }
}

fn p_token_opt(state: &mut State, token: &Token) -> ParseResult<Option<()>> {
    match state.peek_token() {
        Some(Err(err)) => Err(err),
        Some(Ok(t)) if t == *token => {
            state.advance_token();
            Ok(Some(()))
        }
        _ => Ok(None),
    }
}

fn p_token(state: &mut State, token: &Token, err: Error) -> ParseResult<()> {
    p_token_opt(state, token)?.ok_or(err)
}

fn p_variable(state: &mut State) -> ParseResult<String> {
    match state.peek_token() {
        Some(Err(err)) => Err(err),
        Some(Ok(Token::Variable(name))) => {
            state.advance_token();
            Ok(name)
        }
        _ => Err(Error::MissingVariable),
    }
}

/// Parse `(%x : T)`, pushing `x` into scope after `T` is parsed.
fn p_binder_opt(state: &mut State) -> ParseResult<Option<(Name, RcSyntax)>> {
    let Some(()) = p_token_opt(state, &Token::LParen)? else {
        return Ok(None);
    };
    let var = p_variable(state)?;
    p_token(state, &Token::Colon, Error::MissingColon)?;
    let ty = p_term(state)?;
    p_token(state, &Token::RParen, Error::MissingRParen)?;
    let name = Name::from(var.as_str());
    state.push_name(var);
    Ok(Some((name, ty)))
}

/// Parse one or more binders followed by `→` and a body.
fn p_binders_and_body(state: &mut State) -> ParseResult<(Vec<(Name, RcSyntax)>, RcSyntax)> {
    let depth = state.names_depth();
    let mut binders = Vec::new();
    while let Some(binder) = p_binder_opt(state)? {
        binders.push(binder);
    }
    if binders.is_empty() {
        return Err(Error::MissingBinder);
    }
    p_token(state, &Token::Arrow, Error::MissingArrow)?;
    let body = p_term(state)?;
    state.reset_names(depth);
    Ok((binders, body))
}

// Parse an atomic term (no operators)
fn p_atom_opt(state: &mut State) -> ParseResult<Option<RcSyntax>> {
    let token = match state.peek_token() {
        None => return Ok(None),
        Some(Err(err)) => return Err(err),
        Some(Ok(token)) => token,
    };
    let term = match token {
        Token::LParen => {
            state.advance_token();
            let term = p_term(state)?;
            p_token(state, &Token::RParen, Error::MissingRParen)?;
            return Ok(Some(term));
        }
        Token::Lambda => {
            state.advance_token();
            let (binders, body) = p_binders_and_body(state)?;
            return Ok(Some(binders.into_iter().rev().fold(
                body,
                |body, (name, domain)| Syntax::lambda_rc(name, domain, body),
            )));
        }
        Token::Pi => {
            state.advance_token();
            let (binders, body) = p_binders_and_body(state)?;
            return Ok(Some(binders.into_iter().rev().fold(
                body,
                |body, (name, domain)| Syntax::pi_rc(name, domain, body),
            )));
        }
        Token::Variable(name) => match state.find_name(&name) {
            Some(index) => Syntax::variable_rc(index),
            None => return Err(Error::UnknownVariable(name)),
        },
        Token::UnboundVariable(negative_level) => {
            Syntax::variable_rc(negative_level.to_index(state.names_depth()))
        }
        Token::Constant(name) => Syntax::constant_rc(Name::from(name)),
        Token::Prop => Syntax::prop_rc(),
        Token::Type => Syntax::type_rc(UniverseLevel::new(0)),
        Token::Universe(level) => Syntax::type_rc(UniverseLevel::new(level)),
        Token::Numeral(value) => Syntax::numeral_rc(value),
        Token::RParen | Token::Arrow | Token::Colon => return Ok(None),
    };
    state.advance_token();
    Ok(Some(term))
}

// Parse application (left-associative, flattened): a b c => a [b, c]
fn p_application_opt(state: &mut State) -> ParseResult<Option<RcSyntax>> {
    let Some(head) = p_atom_opt(state)? else {
        return Ok(None);
    };
    let mut arguments = Vec::new();
    while let Some(arg) = p_atom_opt(state)? {
        arguments.push(arg);
    }
    Ok(Some(Syntax::application_rc(head, arguments)))
}

// Parse a non-dependent function type (right-associative): A → B → C
fn p_arrow_opt(state: &mut State) -> ParseResult<Option<RcSyntax>> {
    let Some(domain) = p_application_opt(state)? else {
        return Ok(None);
    };
    let Some(()) = p_token_opt(state, &Token::Arrow)? else {
        return Ok(Some(domain));
    };
    // The codomain is parsed under an anonymous binder that no name can
    // refer to, so its indices already account for the new scope.
    let depth = state.names_depth();
    state.push_name(String::new());
    let codomain = p_term(state)?;
    state.reset_names(depth);
    Ok(Some(Syntax::pi_rc(Name::anon(), domain, codomain)))
}

fn p_term_opt(state: &mut State) -> ParseResult<Option<RcSyntax>> {
    p_arrow_opt(state)
}

fn p_term(state: &mut State) -> ParseResult<RcSyntax> {
    p_term_opt(state)?.ok_or(Error::MissingTerm)
}

/// Parse a complete term. All input must be consumed.
pub fn parse_syntax(input: &str) -> ParseResult<RcSyntax> {
    let mut state = State::new(input);
    let term = p_term(&mut state)?;
    match state.peek_token() {
        None => Ok(term),
        Some(Err(err)) => Err(err),
        Some(Ok(_)) => Err(Error::TrailingInput(state.lexer.span())),
    }
}
