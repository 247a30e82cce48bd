//! Tokenizer for the Cone language.
//!
//! Turns source text into a stream of [`Token`]s, tracking the
//! significant-indentation block structure the parser needs to tell
//! statement boundaries from continuations (spec §2).

pub mod indent;
pub mod keywords;
pub mod scanner;
pub mod token;

pub use indent::{BlockMode, IndentStack};
pub use scanner::Scanner;
pub use token::{LiteralValue, Token, TokenKind};
