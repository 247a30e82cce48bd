//! Keyword and permission-name lookup tables.
//!
//! The original lexer resolves every identifier against the global name
//! table and tests flag bits set up during corelib bootstrap to recognize
//! keywords and permission names (parsemod.c, parsetype.c both switch on
//! `PermToken`). `cone-lexer` has no dependency on `cone-corelib`, so it
//! keeps its own static tables instead; `cone-corelib` is the single
//! source of truth for what a permission *means*, this module only knows
//! which spellings the scanner should tag as `TokenKind::Perm`.

use crate::token::TokenKind;

pub fn lookup_keyword(ident: &str) -> Option<TokenKind> {
    Some(match ident {
        "include" => TokenKind::Include,
        "mod" => TokenKind::Mod,
        "extern" => TokenKind::Extern,
        "set" => TokenKind::Set,
        "macro" => TokenKind::Macro,
        "fn" => TokenKind::Fn,
        "typedef" => TokenKind::Typedef,
        "struct" => TokenKind::Struct,
        "trait" => TokenKind::Trait,
        "mixin" => TokenKind::Mixin,
        "enum" => TokenKind::Enum,
        "region" => TokenKind::Region,
        "return" => TokenKind::Ret,
        "do" => TokenKind::Do,
        "with" => TokenKind::With,
        "if" => TokenKind::If,
        "elif" => TokenKind::Elif,
        "else" => TokenKind::Else,
        "match" => TokenKind::Match,
        "loop" => TokenKind::Loop,
        "while" => TokenKind::While,
        "each" => TokenKind::Each,
        "in" => TokenKind::In,
        "step" => TokenKind::By,
        "break" => TokenKind::Break,
        "continue" => TokenKind::Continue,
        "as" => TokenKind::As,
        "into" => TokenKind::Into,
        "true" => TokenKind::True,
        "false" => TokenKind::False,
        "null" => TokenKind::Null,
        "and" => TokenKind::And,
        "or" => TokenKind::Or,
        "is" => TokenKind::Is,
        _ => return None,
    })
}

/// Identifiers the scanner tags as `TokenKind::Perm` rather than
/// `TokenKind::Ident`, per spec §2's permission set plus the C compiler's
/// `@samesize` counterpart handled separately as an attribute.
const PERMISSION_NAMES: &[&str] = &["uni", "mut", "imm", "ro", "mut1", "opaq", "const"];

#[must_use]
pub fn is_permission_name(ident: &str) -> bool {
    PERMISSION_NAMES.contains(&ident)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_flow_keywords() {
        assert_eq!(lookup_keyword("while"), Some(TokenKind::While));
        assert_eq!(lookup_keyword("each"), Some(TokenKind::Each));
        assert_eq!(lookup_keyword("notakeyword"), None);
    }

    #[test]
    fn recognizes_permission_names() {
        assert!(is_permission_name("uni"));
        assert!(is_permission_name("mut1"));
        assert!(!is_permission_name("foo"));
    }
}
