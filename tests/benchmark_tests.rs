//! Performance benchmarks for critical game systems

use server::session_registry::SessionRegistry;
use shared::{evaluate, Board, GameStatus, Symbol, BOARD_CELLS};
use std::time::Instant;

/// Benchmarks win/draw evaluation over many board shapes
#[test]
fn benchmark_board_evaluation() {
    // Every board reachable by filling cells 0..n alternately
    let boards: Vec<Board> = (0..=BOARD_CELLS)
        .map(|filled| {
            let mut board = Board::new();
            let mut symbol = Symbol::X;
            for cell in 0..filled {
                board.place(cell, symbol);
                symbol = symbol.other();
            }
            board
        })
        .collect();

    let iterations = 100_000;
    let start = Instant::now();

    let mut finished = 0;
    for i in 0..iterations {
        let board = &boards[i % boards.len()];
        if evaluate(board, Symbol::X).is_over() {
            finished += 1;
        }
    }

    let duration = start.elapsed();
    println!(
        "Board evaluation: {} iterations in {:?} ({:.2} ns/iter)",
        iterations,
        duration,
        duration.as_nanos() as f64 / iterations as f64
    );

    assert!(finished > 0);
    // Should complete in under 500ms for 100k iterations
    assert!(duration.as_millis() < 500);
}

/// Benchmarks complete games played through the registry
#[test]
fn benchmark_registry_full_games() {
    let registry = SessionRegistry::new();
    let games = 5_000u32;
    let start = Instant::now();

    for game in 0..games {
        let host = game * 2 + 1;
        let guest = game * 2 + 2;

        let created = registry.create_room(host);
        registry
            .join_room(guest, created.room_code.as_str())
            .unwrap();

        // X takes the top row
        for (player, cell) in [(host, 0), (guest, 3), (host, 1), (guest, 4), (host, 2)] {
            registry.apply_move(player, cell).unwrap();
        }

        let snapshot = registry.snapshot(&created.room_code).unwrap();
        assert_eq!(snapshot.status, GameStatus::Won(Symbol::X));

        registry.disconnect(host);
        registry.disconnect(guest);
    }

    let duration = start.elapsed();
    println!(
        "Registry games: {} games in {:?} ({:.2} μs/game)",
        games,
        duration,
        duration.as_micros() as f64 / games as f64
    );

    assert_eq!(registry.room_count(), 0);
    // Should complete in under 5 seconds
    assert!(duration.as_millis() < 5000);
}

/// Benchmarks many rooms open at the same time
#[test]
fn stress_test_many_open_rooms() {
    let registry = SessionRegistry::new();
    let rooms = 10_000u32;
    let start = Instant::now();

    let codes: Vec<_> = (1..=rooms)
        .map(|connection| registry.create_room(connection).room_code)
        .collect();

    let duration = start.elapsed();
    println!("Room creation: {} rooms in {:?}", rooms, duration);

    assert_eq!(registry.room_count(), rooms as usize);
    let mut unique = codes.clone();
    unique.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    unique.dedup();
    assert_eq!(unique.len(), codes.len());

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}

/// Benchmarks network packet serialization performance
#[test]
fn benchmark_packet_serialization() {
    use bincode::{deserialize, serialize};
    use shared::Packet;

    let mut board = Board::new();
    for (cell, symbol) in [(0, Symbol::X), (4, Symbol::O), (8, Symbol::X)] {
        board.place(cell, symbol);
    }

    let packet = Packet::GameOver {
        message: "X wins!".to_string(),
        board,
    };

    let iterations = 10_000;
    let start = Instant::now();

    for _ in 0..iterations {
        let serialized = serialize(&packet).unwrap();
        let _deserialized: Packet = deserialize(&serialized).unwrap();
    }

    let duration = start.elapsed();
    println!(
        "Packet serialization: {} iterations in {:?} ({:.2} μs/iter)",
        iterations,
        duration,
        duration.as_micros() as f64 / iterations as f64
    );

    // Should complete in under 2 seconds
    assert!(duration.as_millis() < 2000);
}
