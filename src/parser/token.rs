//! Token model and lexeme classification
//!
//! A completed lexeme is classified in two steps: an exact lookup against the
//! keyword/operator/punctuator vocabulary, then a fall back to pattern
//! matching for literals and identifiers. Anything that matches neither is an
//! [`TokenKind::Invalid`] token, which the parser rejects as a syntax error.

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

/// Token categories.
///
/// Operators that share a precedence level and typing rule share a kind
/// (`+`/`-` are both [`TokenKind::PlusMinus`]); the lexeme distinguishes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Identifier,

    // Type names
    DataType, // int, float, char, string, bool
    VoidType,

    // Literals
    IntegerLiteral,
    FloatLiteral,
    StringLiteral,
    CharLiteral,
    BoolLiteral,

    // Keywords
    For,
    While,
    BreakContinue,
    If,
    Else,
    Return,
    ObjectCreator, // makeObj
    Declare,
    Class,
    Struct,
    Interface,
    Inherits,
    Implements,
    MainEntry,
    Static,
    AccessModifier, // public, private, protected
    Super,
    This,
    Constructor,
    Function,

    // Operators
    PlusMinus,          // + -
    Multiply,           // * (also pointer dereference)
    DivideModulus,      // / %
    Relational,         // < > <= >= == !=
    Assignment,         // =
    CompoundAssignment, // += -= *= /= %=
    LogicalAnd,         // &&
    LogicalOr,          // ||
    Not,                // !
    IncDec,             // ++ --
    Dot,                // .
    Arrow,              // ->
    ScopeResolution,    // ::
    Reference,          // &

    // Punctuators
    Semicolon,
    Comma,
    ParenOpen,
    ParenClose,
    BraceOpen,
    BraceClose,
    BracketOpen,
    BracketClose,

    Invalid,
    EndMarker,
}

impl TokenKind {
    /// Upper-case name used for tree leaves and token listings.
    pub fn name(self) -> &'static str {
        match self {
            TokenKind::Identifier => "IDENTIFIER",
            TokenKind::DataType => "DATA_TYPE",
            TokenKind::VoidType => "VOID_TYPE",
            TokenKind::IntegerLiteral => "INTEGER_LITERAL",
            TokenKind::FloatLiteral => "FLOAT_LITERAL",
            TokenKind::StringLiteral => "STRING_LITERAL",
            TokenKind::CharLiteral => "CHAR_LITERAL",
            TokenKind::BoolLiteral => "BOOL_LITERAL",
            TokenKind::For => "FOR",
            TokenKind::While => "WHILE",
            TokenKind::BreakContinue => "BR_CONT",
            TokenKind::If => "IF",
            TokenKind::Else => "ELSE",
            TokenKind::Return => "RETURN",
            TokenKind::ObjectCreator => "OBJ_CREATOR",
            TokenKind::Declare => "DECLARE",
            TokenKind::Class => "CLASS",
            TokenKind::Struct => "STRUCT",
            TokenKind::Interface => "INTERFACE",
            TokenKind::Inherits => "INHERITS",
            TokenKind::Implements => "IMPLEMENTS",
            TokenKind::MainEntry => "MAIN",
            TokenKind::Static => "STATIC",
            TokenKind::AccessModifier => "ACCESS_MODIFIER",
            TokenKind::Super => "SUPER",
            TokenKind::This => "THIS",
            TokenKind::Constructor => "CONSTRUCTOR",
            TokenKind::Function => "FUNCTION",
            TokenKind::PlusMinus => "PLUS_MINUS",
            TokenKind::Multiply => "POINTER_MULTIPLY",
            TokenKind::DivideModulus => "DIVIDE_MODULUS",
            TokenKind::Relational => "RELATIONAL_OPERATOR",
            TokenKind::Assignment => "ASSIGNMENT_OPERATOR",
            TokenKind::CompoundAssignment => "COMP_ASSIGNMENT_OPERATOR",
            TokenKind::LogicalAnd => "LOGICAL_AND",
            TokenKind::LogicalOr => "LOGICAL_OR",
            TokenKind::Not => "NOT_OPERATOR",
            TokenKind::IncDec => "INC_DEC",
            TokenKind::Dot => "DOT",
            TokenKind::Arrow => "ARROW",
            TokenKind::ScopeResolution => "SCOPE_RESOLUTION",
            TokenKind::Reference => "REF_OPERATOR",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Comma => "COMMA",
            TokenKind::ParenOpen => "ROUND_BRACKET_OPEN",
            TokenKind::ParenClose => "ROUND_BRACKET_CLOSE",
            TokenKind::BraceOpen => "CURLY_BRACKET_OPEN",
            TokenKind::BraceClose => "CURLY_BRACKET_CLOSE",
            TokenKind::BracketOpen => "SQUARE_BRACKET_OPEN",
            TokenKind::BracketClose => "SQUARE_BRACKET_CLOSE",
            TokenKind::Invalid => "INVALID_LEXEME",
            TokenKind::EndMarker => "EOF_MARKER",
        }
    }

    /// Tokens after which a `+`/`-` is a binary operator rather than a sign.
    pub fn produces_value(self) -> bool {
        matches!(
            self,
            TokenKind::Identifier
                | TokenKind::IntegerLiteral
                | TokenKind::FloatLiteral
                | TokenKind::StringLiteral
                | TokenKind::CharLiteral
                | TokenKind::BoolLiteral
                | TokenKind::ParenClose
                | TokenKind::BracketClose
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One lexeme with its kind and the line it started on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, value: impl Into<String>, line: usize) -> Self {
        Token {
            kind,
            value: value.into(),
            line,
        }
    }

    /// Classify a completed lexeme.
    pub fn classify(lexeme: &str, line: usize) -> Self {
        let kind = exact_kind(lexeme).unwrap_or_else(|| pattern_kind(lexeme));
        Token::new(kind, lexeme, line)
    }

    /// Literal content without the delimiting quotes (escape sequences are kept
    /// as written). Other tokens return their lexeme unchanged.
    pub fn unquoted(&self) -> &str {
        match self.kind {
            TokenKind::StringLiteral | TokenKind::CharLiteral if self.value.len() >= 2 => {
                &self.value[1..self.value.len() - 1]
            }
            _ => &self.value,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::EndMarker => write!(f, "end of file"),
            _ => write!(f, "'{}'", self.value),
        }
    }
}

/// Lookup in the fixed vocabulary.
pub fn exact_kind(lexeme: &str) -> Option<TokenKind> {
    let kind = match lexeme {
        "int" | "float" | "char" | "string" | "bool" => TokenKind::DataType,
        "void" => TokenKind::VoidType,
        "true" | "false" => TokenKind::BoolLiteral,
        "for" => TokenKind::For,
        "while" => TokenKind::While,
        "break" | "continue" => TokenKind::BreakContinue,
        "if" => TokenKind::If,
        "else" => TokenKind::Else,
        "return" => TokenKind::Return,
        "makeObj" => TokenKind::ObjectCreator,
        "declare" => TokenKind::Declare,
        "class" => TokenKind::Class,
        "struct" => TokenKind::Struct,
        "interface" => TokenKind::Interface,
        "inherits" => TokenKind::Inherits,
        "implements" => TokenKind::Implements,
        "mainEntry" => TokenKind::MainEntry,
        "static" => TokenKind::Static,
        "public" | "private" | "protected" => TokenKind::AccessModifier,
        "super" => TokenKind::Super,
        "this" => TokenKind::This,
        "constructor" => TokenKind::Constructor,
        "function" => TokenKind::Function,
        _ => return operator_kind(lexeme),
    };
    Some(kind)
}

/// Lookup restricted to operators and punctuators.
pub fn operator_kind(lexeme: &str) -> Option<TokenKind> {
    let kind = match lexeme {
        "+" | "-" => TokenKind::PlusMinus,
        "*" => TokenKind::Multiply,
        "/" | "%" => TokenKind::DivideModulus,
        "<" | ">" | "<=" | ">=" | "==" | "!=" => TokenKind::Relational,
        "=" => TokenKind::Assignment,
        "+=" | "-=" | "*=" | "/=" | "%=" => TokenKind::CompoundAssignment,
        "&&" => TokenKind::LogicalAnd,
        "||" => TokenKind::LogicalOr,
        "!" => TokenKind::Not,
        "++" | "--" => TokenKind::IncDec,
        "." => TokenKind::Dot,
        "->" => TokenKind::Arrow,
        "::" => TokenKind::ScopeResolution,
        "&" => TokenKind::Reference,
        ";" => TokenKind::Semicolon,
        "," => TokenKind::Comma,
        "(" => TokenKind::ParenOpen,
        ")" => TokenKind::ParenClose,
        "{" => TokenKind::BraceOpen,
        "}" => TokenKind::BraceClose,
        "[" => TokenKind::BracketOpen,
        "]" => TokenKind::BracketClose,
        _ => return None,
    };
    Some(kind)
}

/// Characters that can start or continue an operator or punctuator.
pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-'
            | '*'
            | '/'
            | '%'
            | '<'
            | '>'
            | '='
            | '!'
            | '&'
            | '|'
            | '.'
            | ':'
            | ';'
            | ','
            | '('
            | ')'
            | '{'
            | '}'
            | '['
            | ']'
    )
}

/// Escapes accepted after a backslash in char and string literals.
pub const ESCAPE_CHARS: [char; 5] = ['n', 'r', 't', '\\', '\''];

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"));
static INTEGER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("integer pattern"));
static FLOAT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:[0-9]+\.[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").expect("float pattern")
});
static STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^"(?:[^"\\\n]|\\.)*"$"#).expect("string pattern"));
static CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^'(?:[^'\\\n]|\\[nrt\\'])'$").expect("char pattern"));

fn pattern_kind(lexeme: &str) -> TokenKind {
    if IDENTIFIER.is_match(lexeme) {
        TokenKind::Identifier
    } else if INTEGER.is_match(lexeme) {
        TokenKind::IntegerLiteral
    } else if FLOAT.is_match(lexeme) {
        TokenKind::FloatLiteral
    } else if STRING.is_match(lexeme) {
        TokenKind::StringLiteral
    } else if CHAR.is_match(lexeme) {
        TokenKind::CharLiteral
    } else {
        TokenKind::Invalid
    }
}

pub fn is_identifier(lexeme: &str) -> bool {
    IDENTIFIER.is_match(lexeme)
}
