//! Token kinds and the `Token` value produced by the scanner.
//!
//! Mirrors the original `enum TokenTypes` one-for-one (parser/lexer.h) so
//! every keyword and punctuation mark the parser looks for has a stable
//! home here.

use cone_common::interner::Atom;
use cone_common::span::Span;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenKind {
    Eof,

    // Literals and names
    IntLit,
    FloatLit,
    StringLit,
    Ident,
    MetaIdent,  // #if
    AttrIdent,  // @samesize
    Lifetime,   // 'a
    Perm,       // uni, mut, imm, ro, mut1, opaq (recognized identifiers)

    // Punctuation
    Semi,
    Colon,
    DblColon,
    LCurly,
    RCurly,
    LBracket,
    RBracket,
    LParen,
    RParen,
    Comma,
    Dot,
    QuesDot,
    Plus,
    Dash,
    Star,
    Percent,
    Slash,
    Amper,
    And,
    Bar,
    Or,
    Caret,
    Not,
    Ques,
    Tilde,
    LessDash,
    Assgn,
    Is,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Shl,
    Shr,
    PlusEq,
    MinusEq,
    MultEq,
    DivEq,
    RemEq,
    OrEq,
    AndEq,
    XorEq,
    ShlEq,
    ShrEq,
    Incr,
    Decr,

    // Keywords
    Include,
    Mod,
    Extern,
    Set,
    Macro,
    Fn,
    Typedef,
    Struct,
    Trait,
    Samesize,
    Mixin,
    Enum,
    Region,
    Ret,
    Do,
    With,
    If,
    Elif,
    Else,
    Match,
    Loop,
    While,
    Each,
    In,
    By,
    Break,
    Continue,
    As,
    Into,
    True,
    False,
    Null,
}

impl TokenKind {
    #[must_use]
    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Include
                | TokenKind::Mod
                | TokenKind::Extern
                | TokenKind::Set
                | TokenKind::Macro
                | TokenKind::Fn
                | TokenKind::Typedef
                | TokenKind::Struct
                | TokenKind::Trait
                | TokenKind::Samesize
                | TokenKind::Mixin
                | TokenKind::Enum
                | TokenKind::Region
                | TokenKind::Ret
                | TokenKind::Do
                | TokenKind::With
                | TokenKind::If
                | TokenKind::Elif
                | TokenKind::Else
                | TokenKind::Match
                | TokenKind::Loop
                | TokenKind::While
                | TokenKind::Each
                | TokenKind::In
                | TokenKind::By
                | TokenKind::Break
                | TokenKind::Continue
                | TokenKind::As
                | TokenKind::Into
                | TokenKind::True
                | TokenKind::False
                | TokenKind::Null
        )
    }
}

/// Literal payload for tokens that carry a value, keeping `Token` itself
/// small for the common (punctuation/keyword) case.
#[derive(Clone, Debug, PartialEq)]
pub enum LiteralValue {
    None,
    Int(u64),
    Float(f64),
    Str(String),
    Name(Atom),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
    pub value: LiteralValue,
    /// 0 = first token on its line, 1 = second, etc. Used by the parser to
    /// decide whether a leading operator continues the previous statement
    /// or starts a new one.
    pub pos_in_line: u32,
    /// True if this token starts a line whose indentation is less than or
    /// equal to the enclosing statement's indentation (a statement break).
    pub stmt_break: bool,
}

impl Token {
    #[must_use]
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span, value: LiteralValue::None, pos_in_line: 0, stmt_break: false }
    }
}
