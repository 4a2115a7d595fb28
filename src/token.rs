/// Keywords of an Auld line, each one the opening phrase of the command.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Keyword {
    Happy,
    ShouldAuldAcquaintance,
    Well,
    And,
    Frae,
    SinAuldLangSyne,
    ForAuldLangSyne,
    We,
    But,
    Kevlin,
}

/// Keywords in matching order. The first keyword that matches a line wins, so
/// `We'll` has to be tried before `We`.
pub const KEYWORDS: [Keyword; 10] = [
    Keyword::Happy,
    Keyword::ShouldAuldAcquaintance,
    Keyword::Well,
    Keyword::And,
    Keyword::Frae,
    Keyword::SinAuldLangSyne,
    Keyword::ForAuldLangSyne,
    Keyword::We,
    Keyword::But,
    Keyword::Kevlin,
];

/// Raw line prefix that marks the target of a forward branch.
pub const FORWARD_TARGET: &str = "But";
/// Raw line prefix that marks the target of a backward branch.
pub const BACKWARD_TARGET: &str = "We";

impl Keyword {
    pub fn phrase(self) -> &'static str {
        match self {
            Keyword::Happy => "Happy",
            Keyword::ShouldAuldAcquaintance => "Should auld acquaintance be forgot",
            Keyword::Well => "We'll",
            Keyword::And => "And",
            Keyword::Frae => "Frae",
            Keyword::SinAuldLangSyne => "Sin auld lang syne",
            Keyword::ForAuldLangSyne => "For auld lang syne",
            Keyword::We => "We",
            Keyword::But => "But",
            Keyword::Kevlin => "Kevlin",
        }
    }
}
