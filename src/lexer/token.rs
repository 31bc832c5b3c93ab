//! Token and keyword vocabulary for GIANT source.

/// A numeric literal, kept in its original integer/float shape so that the
/// parser and evaluator can preserve "integer stays integer" arithmetic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumberLit {
    Int(i64),
    Float(f64),
}

/// One canonical keyword, after synonymous surface phrases have been
/// collapsed by the lexer's greedy multi-word matcher (spec §4.1/§4.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    // assignment openers
    Make,
    Set,
    Let,
    // assignment connectors
    Be,
    To,
    BeEqualTo,
    // arithmetic infix phrases
    Plus,
    AddedTo,
    Minus,
    Subtract,
    SubtractedFrom,
    Times,
    MultipliedBy,
    Over,
    DividedBy,
    // output
    Talk,
    Show,
    WetinBe,
    // anchor forms
    AtAnchor,
    ListAnchors,
    DescribeAnchor,
    InspectAnchor,
    // relational
    Relational,
    RelativeTo,
    // when/action
    When,
    Is,
    AtAction,
    // metadata keys
    Unit,
    Tolerance,
    Description,
    Context,
    Confidence,
    Policy,
    SensorId,
    // terminator (REPL only)
    Stop,
}

/// Keyword phrases, longest-first within each first word so the greedy
/// matcher in `Lexer` always prefers the longest applicable phrase. Order
/// across different first words does not matter.
pub const KEYWORDS: &[(&str, Keyword)] = &[
    ("make", Keyword::Make),
    ("set", Keyword::Set),
    ("let", Keyword::Let),
    ("be equal to", Keyword::BeEqualTo),
    ("be", Keyword::Be),
    ("to", Keyword::To),
    ("added to", Keyword::AddedTo),
    ("plus", Keyword::Plus),
    ("subtracted from", Keyword::SubtractedFrom),
    ("subtract", Keyword::Subtract),
    ("minus", Keyword::Minus),
    ("multiplied by", Keyword::MultipliedBy),
    ("times", Keyword::Times),
    ("divided by", Keyword::DividedBy),
    ("over", Keyword::Over),
    ("talk", Keyword::Talk),
    ("show", Keyword::Show),
    ("wetin be", Keyword::WetinBe),
    ("list anchors", Keyword::ListAnchors),
    ("describe anchor", Keyword::DescribeAnchor),
    ("inspect anchor", Keyword::InspectAnchor),
    ("relational", Keyword::Relational),
    ("relative to", Keyword::RelativeTo),
    ("when", Keyword::When),
    ("is", Keyword::Is),
    ("unit", Keyword::Unit),
    ("tolerance", Keyword::Tolerance),
    ("description", Keyword::Description),
    ("context", Keyword::Context),
    ("confidence", Keyword::Confidence),
    ("policy", Keyword::Policy),
    ("sensor_id", Keyword::SensorId),
    ("stop", Keyword::Stop),
];

/// The widest keyword phrase is three words ("be equal to"); nothing in the
/// lexer ever needs to look further ahead than that.
pub const MAX_KEYWORD_WORDS: usize = 3;

/// Look up the keyword matching an exact sequence of words, case-sensitive.
pub fn keyword_lookup(words: &[String]) -> Option<Keyword> {
    let joined = words.join(" ");
    KEYWORDS
        .iter()
        .find(|(phrase, _)| *phrase == joined)
        .map(|(_, kw)| *kw)
}

/// Whether `words` is a (possibly equal-length) prefix of some keyword phrase,
/// i.e. whether it is still worth trying to extend the match with another word.
pub fn keyword_prefix_exists(words: &[String]) -> bool {
    KEYWORDS.iter().any(|(phrase, _)| {
        let phrase_words: Vec<&str> = phrase.split(' ').collect();
        phrase_words.len() >= words.len()
            && phrase_words
                .iter()
                .zip(words.iter())
                .all(|(a, b)| *a == b.as_str())
    })
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Number(NumberLit),
    Str(String),
    Ident(String),
    Keyword(Keyword),
    Eq,
    LBracket,
    RBracket,
    Colon,
    Comma,
    /// Emitted once at the start of every non-blank line, carrying the count
    /// of leading whitespace characters. Used only to recognize indented
    /// `@action` bodies under a `when` header (spec §4.1).
    Indent(usize),
    /// A run of one or more blank/line-end breaks, collapsed to one token.
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub col: usize,
}

impl Token {
    pub fn new(kind: TokenKind, line: usize, col: usize) -> Self {
        Token { kind, line, col }
    }
}
