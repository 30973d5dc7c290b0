//! Tests for the rule engine: placement, retirement, win and draw.

use strictly_infinite::rules::check_winner;
use strictly_infinite::{
    Board, Coordinates, GameMode, GameRules, GameState, Outcome, Player, Position, Rejection,
    Square,
};

fn play(mut state: GameState, indices: &[usize]) -> GameState {
    for &index in indices {
        let player = state.side_to_act();
        state = state
            .apply_move(Coordinates::from_index(index), player)
            .unwrap_or_else(|r| panic!("move {index} refused: {r}"));
    }
    state
}

#[test]
fn test_classic_full_board_is_draw() {
    // X O X
    // X O O
    // O X X
    let state = play(GameState::classic(), &[0, 1, 2, 4, 3, 5, 7, 6, 8]);

    assert!(state.is_draw());
    assert!(state.is_game_over());
    assert_eq!(state.winner(), None);
    assert_eq!(state.outcome(), Some(Outcome::Draw));
    assert_eq!(state.winning_line(), None);
    assert_eq!(state.side_to_act(), Player::X);
}

#[test]
fn test_top_row_wins() {
    let state = play(GameState::classic(), &[0, 3, 1, 4, 2]);

    assert_eq!(state.winner(), Some(Player::X));
    assert!(state.is_game_over());
    assert!(!state.is_draw());
    assert_eq!(
        state.winning_line(),
        Some([Position::TopLeft, Position::TopCenter, Position::TopRight])
    );
}

#[test]
fn test_every_line_is_detected() {
    for line in strictly_infinite::LINES {
        let mut board = Board::new();
        for pos in line {
            board.set(pos, Square::Occupied(Player::O));
        }
        assert_eq!(check_winner(&board), Some((Player::O, line)));
    }
}

#[test]
fn test_infinite_retirement_frees_oldest_square() {
    // X: 0, 1, 5. O: 4, 8, 7. X's fourth piece at 6 retires 0.
    let state = play(GameState::infinite(), &[0, 4, 1, 8, 5, 7, 6]);

    assert!(state.board().is_empty(Position::TopLeft));
    for pos in [Position::TopCenter, Position::MiddleRight, Position::BottomLeft] {
        assert_eq!(state.board().get(pos), Square::Occupied(Player::X));
    }
    assert_eq!(state.board().live_count(Player::X), 3);
    assert_eq!(
        state.ledger().last().and_then(|m| m.retired()),
        Some(Position::TopLeft)
    );
    assert!(!state.is_game_over());
}

#[test]
fn test_retired_square_can_be_reused() {
    let state = play(GameState::infinite(), &[0, 4, 1, 8, 5, 7, 6]);
    // O retires 4 and takes the square X just lost.
    let state = state
        .apply_move(Position::TopLeft, Player::O)
        .expect("freed square is legal");

    assert!(state.board().is_empty(Position::Center));
    assert_eq!(state.board().get(Position::TopLeft), Square::Occupied(Player::O));
    assert_eq!(
        state.live_pieces(Player::O),
        vec![Position::BottomRight, Position::BottomCenter, Position::TopLeft]
    );
}

#[test]
fn test_infinite_never_draws() {
    // Shuffle pieces around for many plies without anyone completing a line.
    let script = [0, 4, 8, 2, 6, 3, 5, 1, 7];
    let state = play(GameState::infinite(), &script);

    assert!(!state.is_draw());
    assert_eq!(state.ledger().len(), script.len());
    assert!(state.board().live_count(Player::X) <= 3);
    assert!(state.board().live_count(Player::O) <= 3);
}

#[test]
fn test_four_piece_cap_retires_later() {
    let rules = GameRules::new(GameMode::Infinite, 4).expect("supported cap");
    let state = play(GameState::new(rules, Player::X), &[0, 4, 1, 8, 5, 7, 6]);
    assert_eq!(state.board().live_count(Player::X), 4);
    assert!(state.ledger().iter().all(|m| m.retired().is_none()));
}

#[test]
fn test_rejection_is_idempotent() {
    let state = play(GameState::classic(), &[4]);
    let attempts = [
        (Coordinates::new(1, 1), Player::O),
        (Coordinates::new(-1, 0), Player::O),
        (Coordinates::new(0, 0), Player::X),
    ];

    for (target, player) in attempts {
        let first = state.apply_move(target, player).unwrap_err();
        let second = state.apply_move(target, player).unwrap_err();
        assert_eq!(first, second);
    }
    assert_eq!(state.ledger().len(), 1);
    assert_eq!(state.side_to_act(), Player::O);
}

#[test]
fn test_rejection_messages_name_the_reason() {
    let state = play(GameState::classic(), &[4]);
    let occupied = state.apply_move(Position::Center, Player::O).unwrap_err();
    assert!(occupied.to_string().contains("occupied"));

    let wrong_turn = state.apply_move(Position::TopLeft, Player::X).unwrap_err();
    assert_eq!(
        wrong_turn,
        Rejection::WrongTurn {
            expected: Player::O,
            actual: Player::X
        }
    );
}

#[test]
fn test_o_may_start() {
    let state = GameState::new(GameRules::classic(), Player::O);
    let state = state
        .apply_move(Position::Center, Player::O)
        .expect("O starts");
    assert_eq!(state.side_to_act(), Player::X);
    assert_eq!(state.ledger().moves()[0].player(), Player::O);
}
