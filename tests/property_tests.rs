use proptest::prelude::*;

use pgnview::pgn::{substitute_nags, tokenize, Line};
use pgnview::{parse_game, BoardPosition, MoveOracle, ShakmatyOracle};

/// Fragments that cover every token kind, including malformed ones
fn fragment() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("1.".to_string()),
        Just("12...".to_string()),
        Just("e4".to_string()),
        Just("Nf3".to_string()),
        Just("O-O".to_string()),
        Just("0-0-0".to_string()),
        Just("exd5+".to_string()),
        Just("Qz9".to_string()),
        Just("$1".to_string()),
        Just("$250".to_string()),
        Just("[D]".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("}".to_string()),
        Just("*".to_string()),
        Just("1-0".to_string()),
        "\\{[a-z $0-9\\[\\]]{0,12}\\}",
        "\\{[a-z ]{0,8}",
        "[ \t\n]{1,3}",
        "[a-zA-Z0-9!?+#=.-]{1,6}",
    ]
}

fn movetext() -> impl Strategy<Value = String> {
    prop::collection::vec(fragment(), 0..40).prop_map(|parts| parts.join(""))
}

fn check_ply_continuity(line: &Line) {
    let plies: Vec<u32> = line.moves().map(|m| m.ply).collect();
    for (offset, ply) in plies.iter().enumerate() {
        assert_eq!(
            *ply,
            line.start_ply + offset as u32,
            "ply gap in line starting at {}",
            line.start_ply
        );
    }
    for variation in line.variations() {
        check_ply_continuity(variation);
    }
}

proptest! {
    /// Concatenating raw token text gives back the input
    #[test]
    fn prop_tokenizer_raw_round_trip(text in movetext()) {
        let joined: String = tokenize(&text).map(|t| t.raw).collect();
        prop_assert_eq!(joined, text);
    }

    /// Parsing never fails on arbitrary movetext and never panics
    #[test]
    fn prop_movetext_always_parses(text in movetext()) {
        let game = parse_game(&text);
        prop_assert!(game.is_ok());
    }

    /// Every line numbers its plies without gaps
    #[test]
    fn prop_ply_continuity(text in movetext()) {
        let game = parse_game(&text).unwrap();
        check_ply_continuity(&game.tree.mainline);
    }

    /// Mainline moves replay to the positions stored on them
    #[test]
    fn prop_mainline_replay(text in movetext()) {
        let game = parse_game(&text).unwrap();
        let oracle = ShakmatyOracle::new();
        let mut position = oracle.initial_position();
        for node in game.tree.mainline_moves() {
            position = oracle
                .try_move(&position, &node.display_text)
                .expect("stored moves replay");
            prop_assert_eq!(position.snapshot(), node.position_after.clone());
        }
    }

    /// NAG substitution is idempotent
    #[test]
    fn prop_nag_substitution_idempotent(text in "[a-z $0-9]{0,30}") {
        let once = substitute_nags(&text).into_owned();
        let twice = substitute_nags(&once).into_owned();
        prop_assert_eq!(once, twice);
    }
}
