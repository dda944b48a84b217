use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// SAN core: castling, or piece/disambiguation/capture/target/promotion,
/// with an optional check or mate suffix. A bare pawn square is covered by
/// the second branch.
static SAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:O-O-O|O-O|[KQRBN]?[a-h]?[1-8]?x?[a-h][1-8](?:=?[QRBN])?)[+#]?$").unwrap()
});

/// Move-number label, possibly glued to the token that follows it.
static MOVE_NUMBER_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d+)\.+").unwrap());

static NAG_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\$(\d+)").unwrap());

/// Game termination marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    Unknown,
}

impl GameResult {
    pub fn from_token(token: &str) -> Option<GameResult> {
        match token {
            "1-0" => Some(GameResult::WhiteWins),
            "0-1" => Some(GameResult::BlackWins),
            "1/2-1/2" | "½-½" => Some(GameResult::Draw),
            "*" => Some(GameResult::Unknown),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        }
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move-quality category carried by a `!`/`?` suffix or by NAGs 1-6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoveAnnotation {
    Brilliant,
    Blunder,
    Interesting,
    Dubious,
    Good,
    Mistake,
}

impl MoveAnnotation {
    /// Two-character glyphs come first so `!!` is never read as `!` twice.
    const SUFFIXES: [(&'static str, MoveAnnotation); 6] = [
        ("!!", MoveAnnotation::Brilliant),
        ("??", MoveAnnotation::Blunder),
        ("!?", MoveAnnotation::Interesting),
        ("?!", MoveAnnotation::Dubious),
        ("!", MoveAnnotation::Good),
        ("?", MoveAnnotation::Mistake),
    ];

    /// Split a trailing annotation glyph off `token`.
    pub fn split_suffix(token: &str) -> (&str, Option<MoveAnnotation>) {
        for (glyph, annotation) in Self::SUFFIXES {
            if let Some(stripped) = token.strip_suffix(glyph) {
                return (stripped, Some(annotation));
            }
        }
        (token, None)
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            MoveAnnotation::Brilliant => "!!",
            MoveAnnotation::Blunder => "??",
            MoveAnnotation::Interesting => "!?",
            MoveAnnotation::Dubious => "?!",
            MoveAnnotation::Good => "!",
            MoveAnnotation::Mistake => "?",
        }
    }
}

/// A recognized numeric annotation glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nag {
    pub code: u16,
    pub glyph: &'static str,
}

impl Nag {
    /// Look up a NAG code. Only codes 1-6, 13-20 and 36-45 have a glyph;
    /// anything else is `None` and gets dropped by the parser.
    pub fn from_code(code: u16) -> Option<Nag> {
        let glyph = match code {
            1 => "!",
            2 => "?",
            3 => "!!",
            4 => "??",
            5 => "!?",
            6 => "?!",
            13 => "∞",
            14 => "⩲",
            15 => "⩱",
            16 => "±",
            17 => "∓",
            18 => "+−",
            19 => "−+",
            20 => "+−",
            36 | 37 => "↑",
            38 | 39 => "↑↑",
            40 | 41 => "→",
            42 | 43 => "=/∞",
            44 | 45 => "=∞",
            _ => return None,
        };
        Some(Nag { code, glyph })
    }

    /// Move-quality category for NAGs 1-6.
    pub fn annotation(&self) -> Option<MoveAnnotation> {
        match self.code {
            1 => Some(MoveAnnotation::Good),
            2 => Some(MoveAnnotation::Mistake),
            3 => Some(MoveAnnotation::Brilliant),
            4 => Some(MoveAnnotation::Blunder),
            5 => Some(MoveAnnotation::Interesting),
            6 => Some(MoveAnnotation::Dubious),
            _ => None,
        }
    }
}

/// A bare token that looks like a move and is waiting for the oracle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveCandidate {
    /// Token text with castling normalized, annotation glyph included.
    pub display: String,
    /// `display` without its annotation glyph; this is what the oracle sees.
    pub san: String,
    pub annotation: Option<MoveAnnotation>,
}

/// How a bare token is treated by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classified<'a> {
    Result(GameResult),
    /// A move-number label. `rest` is whatever was glued behind it.
    MoveNumber { number: u32, rest: Option<&'a str> },
    Diagram,
    /// A NAG code; `None` when the code has no glyph.
    Nag(Option<Nag>),
    Move(MoveCandidate),
    Literal,
}

/// Rewrite zero-based castling (`0-0`, `0-0-0`) to the letter form.
pub fn normalize_castling(token: &str) -> Cow<'_, str> {
    if token.starts_with("0-0-0") {
        Cow::Owned(format!("O-O-O{}", &token[5..]))
    } else if token.starts_with("0-0") {
        Cow::Owned(format!("O-O{}", &token[3..]))
    } else {
        Cow::Borrowed(token)
    }
}

fn move_candidate(token: &str) -> Option<MoveCandidate> {
    let display = normalize_castling(token);
    let (san, annotation) = MoveAnnotation::split_suffix(&display);
    if !SAN_REGEX.is_match(san) {
        return None;
    }
    Some(MoveCandidate {
        san: san.to_string(),
        annotation,
        display: display.into_owned(),
    })
}

/// Classify one bare token. The checks run in a fixed order and the first
/// match wins: result, move number, diagram, NAG, move candidate, literal.
pub fn classify(token: &str) -> Classified<'_> {
    if let Some(result) = GameResult::from_token(token) {
        return Classified::Result(result);
    }

    if let Some(caps) = MOVE_NUMBER_REGEX.captures(token) {
        let label = caps.get(0).map(|m| m.as_str()).unwrap_or_default();
        let number = caps[1].parse().unwrap_or(u32::MAX);
        let rest = &token[label.len()..];
        return Classified::MoveNumber {
            number,
            rest: (!rest.is_empty()).then_some(rest),
        };
    }

    if token == "[D]" {
        return Classified::Diagram;
    }

    if let Some(code) = token.strip_prefix('$') {
        if !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit()) {
            return Classified::Nag(code.parse().ok().and_then(Nag::from_code));
        }
    }

    match move_candidate(token) {
        Some(candidate) => Classified::Move(candidate),
        None => Classified::Literal,
    }
}

/// Replace every `$n` in free text with its glyph; codes without a glyph
/// are removed. Running it twice gives the same text as running it once.
pub fn substitute_nags(text: &str) -> Cow<'_, str> {
    NAG_REGEX.replace_all(text, |caps: &regex::Captures| {
        caps[1]
            .parse::<u16>()
            .ok()
            .and_then(Nag::from_code)
            .map(|nag| nag.glyph)
            .unwrap_or("")
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1-0", GameResult::WhiteWins)]
    #[case("0-1", GameResult::BlackWins)]
    #[case("1/2-1/2", GameResult::Draw)]
    #[case("½-½", GameResult::Draw)]
    #[case("*", GameResult::Unknown)]
    fn test_results(#[case] token: &str, #[case] expected: GameResult) {
        assert_eq!(classify(token), Classified::Result(expected));
    }

    #[rstest]
    #[case("1.", 1, None)]
    #[case("12...", 12, None)]
    #[case("12.e4", 12, Some("e4"))]
    #[case("3...Nf6", 3, Some("Nf6"))]
    fn test_move_numbers(#[case] token: &str, #[case] number: u32, #[case] rest: Option<&str>) {
        assert_eq!(classify(token), Classified::MoveNumber { number, rest });
    }

    #[rstest]
    #[case("e4")]
    #[case("Nf3")]
    #[case("exd5")]
    #[case("Nbd7")]
    #[case("R1e2")]
    #[case("Qh4xe1+")]
    #[case("e8=Q#")]
    #[case("O-O")]
    #[case("O-O-O+")]
    #[case("0-0")]
    #[case("Bb5!?")]
    #[case("Qz9")]
    fn test_move_candidates(#[case] token: &str) {
        if token == "Qz9" {
            assert_eq!(classify(token), Classified::Literal);
        } else {
            assert!(matches!(classify(token), Classified::Move(_)), "{}", token);
        }
    }

    #[test]
    fn test_castling_normalized() {
        match classify("0-0-0+!") {
            Classified::Move(candidate) => {
                assert_eq!(candidate.display, "O-O-O+!");
                assert_eq!(candidate.san, "O-O-O+");
                assert_eq!(candidate.annotation, Some(MoveAnnotation::Good));
            }
            other => panic!("expected a move, got {:?}", other),
        }
    }

    #[rstest]
    #[case("Nf3!!", "Nf3", Some(MoveAnnotation::Brilliant))]
    #[case("Nf3??", "Nf3", Some(MoveAnnotation::Blunder))]
    #[case("Nf3!?", "Nf3", Some(MoveAnnotation::Interesting))]
    #[case("Nf3?!", "Nf3", Some(MoveAnnotation::Dubious))]
    #[case("Nf3!", "Nf3", Some(MoveAnnotation::Good))]
    #[case("Nf3?", "Nf3", Some(MoveAnnotation::Mistake))]
    #[case("Nf3", "Nf3", None)]
    fn test_annotation_suffixes(
        #[case] token: &str,
        #[case] san: &str,
        #[case] annotation: Option<MoveAnnotation>,
    ) {
        assert_eq!(MoveAnnotation::split_suffix(token), (san, annotation));
    }

    #[test]
    fn test_nags() {
        assert_eq!(classify("$1"), Classified::Nag(Some(Nag { code: 1, glyph: "!" })));
        assert_eq!(classify("$14"), Classified::Nag(Nag::from_code(14)));
        assert_eq!(classify("$7"), Classified::Nag(None));
        assert_eq!(classify("$99999999"), Classified::Nag(None));
        assert_eq!(classify("$"), Classified::Literal);
    }

    #[test]
    fn test_nag_table_ranges() {
        for code in (1..=6).chain(13..=20).chain(36..=45) {
            assert!(Nag::from_code(code).is_some(), "code {}", code);
        }
        for code in [0, 7, 10, 12, 21, 35, 46, 140] {
            assert!(Nag::from_code(code).is_none(), "code {}", code);
        }
    }

    #[test]
    fn test_diagram_and_literals() {
        assert_eq!(classify("[D]"), Classified::Diagram);
        assert_eq!(classify("hello"), Classified::Literal);
        assert_eq!(classify("Zf3"), Classified::Literal);
        assert_eq!(classify("}"), Classified::Literal);
    }

    #[test]
    fn test_substitute_nags() {
        assert_eq!(substitute_nags("a strong move $1 $16"), "a strong move ! ±");
        assert_eq!(substitute_nags("unknown $7 code"), "unknown  code");
        assert_eq!(substitute_nags("no codes"), "no codes");
    }
}
