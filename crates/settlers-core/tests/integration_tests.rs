//! Integration tests for the settlers game engine.
//!
//! These tests drive the public API through staged positions and complete
//! games, from board construction through to victory.

use pretty_assertions::assert_eq;
use settlers_core::*;
use std::collections::BTreeSet;

/// Ends every turn, robs an empty tile, steals from the first candidate
struct ScriptedAgent {
    wants: Resource,
}

impl ScriptedAgent {
    fn boxed(wants: Resource) -> Box<dyn Agent> {
        Box::new(Self { wants })
    }
}

impl Agent for ScriptedAgent {
    fn choose_action(&mut self, _state: &GameState, legal_actions: &[Action]) -> Action {
        if legal_actions.contains(&Action::EndTurn) {
            Action::EndTurn
        } else {
            legal_actions[0].clone()
        }
    }

    fn choose_robber_tile(&mut self, state: &GameState) -> CubeCoord {
        let current = state.board.robber_location();
        state
            .board
            .tiles
            .keys()
            .copied()
            .find(|c| Some(*c) != current && state.board.players_on_tile(c).is_empty())
            .unwrap()
    }

    fn choose_steal_target(&mut self, _state: &GameState, candidates: &[PlayerId]) -> PlayerId {
        candidates[0]
    }

    fn choose_needed_resource(&mut self, _state: &GameState) -> Resource {
        self.wants
    }
}

/// A game that skips setup and starts directly in the main phase
fn main_phase_game(seed: u64, players: usize) -> Game {
    let config = GameConfig {
        seed: Some(seed),
        setup_rounds: 0,
        ..GameConfig::default()
    };
    let agents = (0..players).map(|_| ScriptedAgent::boxed(Resource::Ore)).collect();
    Game::new(config, agents).unwrap()
}

/// Put a settlement on the board for `player` without cost or legality checks
fn stage_settlement(state: &mut GameState, player: PlayerId, key: IntersectionKey) {
    state.board.place_settlement(&key, player);
    state.players[player as usize].record_settlement(key);
}

/// Zigzag path along the top of the middle row: corners visited in order
fn middle_row_path(board: &Board) -> (Vec<IntersectionKey>, Vec<EdgeKey>) {
    let mut corners = vec![board.intersection_at(CubeCoord::axial(-2, 0), 5).unwrap()];
    let mut edges = Vec::new();
    for q in -2..=2 {
        let coord = CubeCoord::axial(q, 0);
        for side in [5, 0] {
            edges.push(board.edge_at(coord, side).unwrap());
            corners.push(board.intersection_at(coord, (side + 1) % 6).unwrap());
        }
    }
    (corners, edges)
}

// ==================== Board ====================

#[test]
fn test_standard_board_topology() {
    let state = GameState::new(GameConfig::with_seed(1), 4).unwrap();
    let board = &state.board;
    assert_eq!(board.tiles.len(), 19);
    assert_eq!(board.intersections.len(), 54);
    assert_eq!(board.edges.len(), 72);

    let positions: BTreeSet<CubeCoord> = board.intersections.keys().map(|k| k.position()).collect();
    assert_eq!(positions.len(), 54);

    for tile in board.tiles.values() {
        let corners: BTreeSet<_> = tile.intersections.iter().collect();
        let sides: BTreeSet<_> = tile.edges.iter().collect();
        assert_eq!(corners.len(), 6);
        assert_eq!(sides.len(), 6);
        for key in &tile.intersections {
            assert!(board.intersections.contains_key(key));
        }
        for key in &tile.edges {
            assert!(board.edges.contains_key(key));
        }
        for (dir, neighbor) in tile.neighbors.iter().enumerate() {
            let expected = tile.coord.neighbor(Direction::from_index(dir));
            assert_eq!(neighbor.is_some(), board.tiles.contains_key(&expected));
        }
    }
}

#[test]
fn test_no_adjacent_six_or_eight_after_layout() {
    for seed in 100..130 {
        let state = GameState::new(GameConfig::with_seed(seed), 3).unwrap();
        for tile in state.board.tiles.values() {
            if !matches!(tile.number, Some(6 | 8)) {
                continue;
            }
            for neighbor in tile.neighbors.iter().flatten() {
                let number = state.board.tiles[neighbor].number;
                assert!(
                    !matches!(number, Some(6 | 8)),
                    "seed {seed}: {} and {neighbor} both hot",
                    tile.coord
                );
            }
        }
    }
}

#[test]
fn test_harbors_cover_nine_anchor_pairs() {
    let state = GameState::new(GameConfig::with_seed(8), 4).unwrap();
    let mut harbors: Vec<Harbor> = state
        .board
        .intersections
        .values()
        .filter_map(|i| i.harbor)
        .collect();
    assert_eq!(harbors.len(), 18);

    harbors.sort();
    let mut expected: Vec<Harbor> = Harbor::standard_pool()
        .into_iter()
        .flat_map(|h| [h, h])
        .collect();
    expected.sort();
    assert_eq!(harbors, expected);
}

// ==================== Longest Road ====================

#[test]
fn test_longest_road_award_and_truncation() {
    let mut game = main_phase_game(2, 3);
    let state = game.state_mut();
    let (corners, edges) = middle_row_path(&state.board);

    stage_settlement(state, 0, corners[0]);
    state.players[0].resources = ResourceHand::with_amounts(5, 0, 0, 0, 5);
    for edge in &edges[..5] {
        state.build_road(*edge, true).unwrap();
    }
    assert_eq!(state.players[0].find_longest_road_size(&state.board), 5);
    assert_eq!(state.players[0].resources, ResourceHand::new());

    let events = state.update_awards();
    assert_eq!(
        events,
        vec![GameEvent::LongestRoadChanged {
            previous: None,
            current: Some(0),
            length: 5
        }]
    );
    assert_eq!(state.victory_points(0), 3);

    // An opponent settlement two roads in splits the chain into 2 + 3
    stage_settlement(state, 1, corners[2]);
    assert_eq!(state.players[0].find_longest_road_size(&state.board), 3);
    state.update_awards();
    assert!(!state.players[0].has_longest_road);
    assert_eq!(state.players[0].longest_road_size, 3);
}

// ==================== Action Legality ====================

#[test]
fn test_settlement_actions_match_placement_rule() {
    let mut game = main_phase_game(3, 2);
    let state = game.state_mut();
    let (corners, edges) = middle_row_path(&state.board);

    stage_settlement(state, 0, corners[0]);
    stage_settlement(state, 1, corners[6]);
    for edge in &edges[..3] {
        state.board.place_road(edge, 0);
        state.players[0].record_road(*edge);
    }
    state.players[0].resources = costs::settlement();

    let offered: BTreeSet<IntersectionKey> = state
        .legal_actions()
        .into_iter()
        .filter_map(|a| match a {
            Action::BuildSettlement { intersection, paid } => {
                assert!(paid);
                Some(intersection)
            }
            _ => None,
        })
        .collect();

    let board = &state.board;
    let expected: BTreeSet<IntersectionKey> = board
        .intersections
        .values()
        .filter(|i| i.owner.is_none())
        .filter(|i| i.neighbors.iter().all(|n| !board.intersections[n].has_settlement))
        .filter(|i| i.edges.iter().any(|e| board.edges[e].owner == Some(0)))
        .map(|i| i.key)
        .collect();
    assert_eq!(offered, expected);
    assert_eq!(offered, BTreeSet::from([corners[2], corners[3]]));

    state.players[0].resources = ResourceHand::new();
    assert!(!state
        .legal_actions()
        .iter()
        .any(|a| matches!(a, Action::BuildSettlement { .. })));
}

#[test]
fn test_illegal_builds_report_named_errors() {
    let mut game = main_phase_game(4, 2);
    let state = game.state_mut();
    let (corners, edges) = middle_row_path(&state.board);
    stage_settlement(state, 0, corners[0]);

    assert_eq!(
        state.build_settlement(corners[0], true),
        Err(GameError::LocationOccupied)
    );
    assert_eq!(
        state.build_settlement(corners[1], true),
        Err(GameError::TooCloseToSettlement)
    );
    assert_eq!(
        state.build_settlement(corners[4], true),
        Err(GameError::NotConnected)
    );
    assert_eq!(state.build_road(edges[0], true), Err(GameError::CannotAfford));
    assert_eq!(state.build_road(edges[0], false), Err(GameError::FreePlacementUnavailable));
    assert_eq!(state.build_road(edges[4], true), Err(GameError::NotConnected));
    assert_eq!(state.build_city(corners[0], true), Err(GameError::CannotAfford));
    assert_eq!(state.build_city(corners[4], true), Err(GameError::NoSettlement));

    stage_settlement(state, 1, corners[6]);
    assert_eq!(state.build_city(corners[6], true), Err(GameError::NotOwner));

    state.players[0].roads_remaining = 0;
    state.players[0].resources = costs::road();
    assert_eq!(
        state.build_road(edges[0], true),
        Err(GameError::NoPiecesRemaining(Piece::Road))
    );
}

#[test]
fn test_trade_options_follow_harbors() {
    let mut game = main_phase_game(5, 2);
    let state = game.state_mut();
    state.players[0].resources = ResourceHand::with_amounts(0, 0, 4, 4, 0);

    let rates = |state: &GameState, resource: Resource| -> BTreeSet<u32> {
        state
            .legal_actions()
            .into_iter()
            .filter_map(|a| match a {
                Action::Trade { giving, .. } if giving.get(resource) > 0 => Some(giving.get(resource)),
                _ => None,
            })
            .collect()
    };
    assert_eq!(rates(state, Resource::Sheep), BTreeSet::from([4]));
    assert_eq!(rates(state, Resource::Ore), BTreeSet::from([4]));

    let port = state
        .board
        .intersections
        .values()
        .find(|i| i.harbor == Some(Harbor::Specific(Resource::Sheep)))
        .map(|i| i.key)
        .unwrap();
    stage_settlement(state, 0, port);

    assert_eq!(rates(state, Resource::Sheep), BTreeSet::from([2]));
    assert_eq!(rates(state, Resource::Ore), BTreeSet::from([4]));

    let trade_count = state
        .legal_actions()
        .iter()
        .filter(|a| matches!(a, Action::Trade { .. }))
        .count();
    assert_eq!(trade_count, 8);
}

// ==================== Dice and Robber ====================

#[test]
fn test_seven_on_empty_tile_moves_nothing() {
    let mut game = main_phase_game(6, 3);
    {
        let state = game.state_mut();
        let home = state.board.intersection_at(CubeCoord::ORIGIN, 0).unwrap();
        stage_settlement(state, 1, home);
        state.players[1].resources = ResourceHand::with_amounts(1, 1, 1, 1, 1);
        state.players[0].resources = ResourceHand::with_amounts(0, 2, 0, 0, 0);
    }
    let before: Vec<ResourceHand> = game.state().players.iter().map(|p| p.resources.clone()).collect();

    let events = game.resolve_roll(7).unwrap();
    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], GameEvent::RobberMoved { player: 0, .. }));
    assert!(!events
        .iter()
        .any(|e| matches!(e, GameEvent::ResourceStolen { .. })));

    let after: Vec<ResourceHand> = game.state().players.iter().map(|p| p.resources.clone()).collect();
    assert_eq!(before, after);
}

#[test]
fn test_steal_requires_building_on_robber_tile() {
    let mut game = main_phase_game(7, 3);
    let state = game.state_mut();
    let target = state
        .board
        .tiles
        .keys()
        .copied()
        .find(|c| Some(*c) != state.board.robber_location())
        .unwrap();
    let corner = state.board.tiles[&target].intersections[0];
    stage_settlement(state, 1, corner);
    state.players[1].resources = ResourceHand::single(Resource::Brick, 1);

    let (_, candidates) = state.move_robber(target).unwrap();
    assert_eq!(candidates, vec![1]);
    assert_eq!(state.steal(2), Err(GameError::InvalidStealTarget(2)));
    assert_eq!(state.steal(0), Err(GameError::InvalidStealTarget(0)));

    let events = state.steal(1).unwrap();
    assert_eq!(
        events,
        vec![GameEvent::ResourceStolen {
            thief: 0,
            victim: 1,
            resource: Some(Resource::Brick)
        }]
    );
    assert_eq!(state.players[0].resources, ResourceHand::single(Resource::Brick, 1));

    // Robbing an empty hand records the attempt but moves nothing
    let events = state.steal(1).unwrap();
    assert_eq!(
        events,
        vec![GameEvent::ResourceStolen {
            thief: 0,
            victim: 1,
            resource: None
        }]
    );
}

#[test]
fn test_seven_discards_half_of_large_hands() {
    let mut game = main_phase_game(8, 3);
    {
        let state = game.state_mut();
        state.players[0].resources = ResourceHand::with_amounts(2, 2, 2, 1, 0);
        state.players[1].resources = ResourceHand::with_amounts(3, 3, 3, 0, 0);
        state.players[2].resources = ResourceHand::with_amounts(8, 0, 0, 0, 0);
    }
    let events = game.resolve_roll(7).unwrap();

    let totals: Vec<u32> = game.state().players.iter().map(|p| p.resources.total()).collect();
    assert_eq!(totals, vec![7, 5, 4]);
    let discards = events
        .iter()
        .filter(|e| matches!(e, GameEvent::CardsDiscarded { .. }))
        .count();
    assert_eq!(discards, 2);
}

#[test]
fn test_robber_tile_produces_nothing() {
    let mut game = main_phase_game(9, 2);
    let state = game.state_mut();
    let tile = state
        .board
        .tiles
        .values()
        .find(|t| t.number.is_some())
        .cloned()
        .unwrap();
    let roll = tile.number.unwrap();
    stage_settlement(state, 1, tile.intersections[0]);

    let produced = state.distribute_resources(roll);
    assert!(!produced.is_empty());
    let held = state.players[1].resources.total();
    assert!(held >= 1);

    state.move_robber(tile.coord).unwrap();
    let others: u32 = state
        .board
        .intersections[&tile.intersections[0]]
        .tiles
        .iter()
        .filter(|c| **c != tile.coord)
        .filter(|c| state.board.tiles[*c].number == Some(roll))
        .count() as u32;
    state.distribute_resources(roll);
    assert_eq!(state.players[1].resources.total(), held + others);
}

// ==================== Development Cards ====================

#[test]
fn test_road_building_capped_by_inventory() {
    let mut game = main_phase_game(10, 2);
    {
        let state = game.state_mut();
        state.players[0].dev_cards.push(DevelopmentCard::RoadBuilding);
        state.players[0].roads_remaining = 1;
    }
    let events = game
        .perform_action(&Action::UseDevelopmentCard(DevelopmentCard::RoadBuilding))
        .unwrap();
    assert_eq!(
        events,
        vec![
            GameEvent::DevelopmentCardPlayed {
                player: 0,
                card: DevelopmentCard::RoadBuilding
            },
            GameEvent::FreeRoadsGranted { player: 0, count: 1 }
        ]
    );
    assert_eq!(game.state().players[0].free_roads_remaining, 1);
}

#[test]
fn test_road_building_grants_two_free_roads() {
    let mut game = main_phase_game(11, 2);
    let (corners, edges) = middle_row_path(&game.state().board);
    {
        let state = game.state_mut();
        stage_settlement(state, 0, corners[0]);
        state.players[0].dev_cards.push(DevelopmentCard::RoadBuilding);
    }
    game.perform_action(&Action::UseDevelopmentCard(DevelopmentCard::RoadBuilding))
        .unwrap();

    let free: Vec<Action> = game
        .state()
        .legal_actions()
        .into_iter()
        .filter(|a| matches!(a, Action::BuildRoad { paid: false, .. }))
        .collect();
    assert!(free.contains(&Action::BuildRoad {
        edge: edges[0],
        paid: false
    }));

    game.perform_action(&Action::BuildRoad {
        edge: edges[0],
        paid: false,
    })
    .unwrap();
    game.perform_action(&Action::BuildRoad {
        edge: edges[1],
        paid: false,
    })
    .unwrap();
    assert_eq!(
        game.perform_action(&Action::BuildRoad {
            edge: edges[2],
            paid: false
        }),
        Err(GameError::FreePlacementUnavailable)
    );
    assert_eq!(game.state().players[0].roads_remaining, 13);
}

#[test]
fn test_year_of_plenty_and_monopoly() {
    let mut game = main_phase_game(12, 3);
    {
        let state = game.state_mut();
        state.players[0].dev_cards = vec![DevelopmentCard::YearOfPlenty, DevelopmentCard::Monopoly];
        state.players[1].resources = ResourceHand::with_amounts(1, 0, 0, 3, 0);
        state.players[2].resources = ResourceHand::with_amounts(0, 0, 0, 2, 4);
    }

    game.perform_action(&Action::UseDevelopmentCard(DevelopmentCard::YearOfPlenty))
        .unwrap();
    assert_eq!(
        game.state().players[0].resources,
        ResourceHand::single(Resource::Ore, 2)
    );

    let events = game
        .perform_action(&Action::UseDevelopmentCard(DevelopmentCard::Monopoly))
        .unwrap();
    assert!(events.contains(&GameEvent::MonopolyPlayed {
        player: 0,
        resource: Resource::Ore,
        total_taken: 5
    }));
    let state = game.state();
    assert_eq!(state.players[0].resources, ResourceHand::single(Resource::Ore, 7));
    assert_eq!(state.players[1].resources, ResourceHand::single(Resource::Wood, 1));
    assert_eq!(state.players[2].resources, ResourceHand::single(Resource::Brick, 4));
}

#[test]
fn test_knights_earn_largest_army() {
    let mut game = main_phase_game(13, 2);
    game.state_mut().players[0].dev_cards = vec![DevelopmentCard::Knight; 3];

    for _ in 0..3 {
        let before = game.state().board.robber_location();
        game.perform_action(&Action::UseDevelopmentCard(DevelopmentCard::Knight))
            .unwrap();
        assert_ne!(game.state().board.robber_location(), before);
    }
    assert_eq!(game.state().players[0].army_size, 3);

    let events = game.state_mut().update_awards();
    assert!(events.contains(&GameEvent::LargestArmyChanged {
        previous: None,
        current: Some(0),
        knights: 3
    }));
    assert_eq!(game.state().victory_points(0), 2);
}

#[test]
fn test_bought_card_waits_a_turn() {
    let mut game = main_phase_game(14, 2);
    game.state_mut().players[0].resources = costs::development_card();
    game.perform_action(&Action::BuyDevelopmentCard).unwrap();

    let state = game.state();
    let card = state.players[0].dev_cards_bought_this_turn[0];
    assert_eq!(state.board.development_cards.len(), 24);
    assert!(!state
        .legal_actions()
        .iter()
        .any(|a| matches!(a, Action::UseDevelopmentCard(_))));

    let result = game.perform_action(&Action::UseDevelopmentCard(card));
    let expected = if card.is_playable() {
        GameError::CardOnCooldown(card)
    } else {
        GameError::CardNotPlayable(card)
    };
    assert_eq!(result, Err(expected));
}

#[test]
fn test_empty_deck() {
    let mut game = main_phase_game(15, 2);
    let state = game.state_mut();
    state.board.development_cards.clear();
    state.players[0].resources = costs::development_card();
    assert_eq!(state.buy_development_card(), Err(GameError::EmptyDeck));
    assert!(!state.legal_actions().contains(&Action::BuyDevelopmentCard));
}

// ==================== Turns and Victory ====================

#[test]
fn test_ten_points_ends_the_game() {
    let mut game = main_phase_game(16, 3);
    game.state_mut().players[0].dev_cards = vec![DevelopmentCard::VictoryPoint; 10];

    let events = game.do_full_turn().unwrap();
    assert_eq!(
        events.last(),
        Some(&GameEvent::GameWon {
            player: 0,
            victory_points: 10
        })
    );
    assert_eq!(game.winner(), Some(0));
    assert!(game.state().legal_actions().is_empty());
    assert_eq!(game.do_full_turn().unwrap_err(), GameError::GameOver);
    assert_eq!(game.step().unwrap_err(), GameError::GameOver);
}

#[test]
fn test_turns_rotate_through_seats() {
    let mut game = main_phase_game(17, 3);
    let mut order = Vec::new();
    for _ in 0..6 {
        order.push(game.state().current_player);
        game.step().unwrap();
    }
    assert_eq!(order, vec![0, 1, 2, 0, 1, 2]);
    assert_eq!(game.state().turn_number, 6);
}

#[test]
fn test_setup_grants_resources_on_final_round() {
    let agents: Vec<Box<dyn Agent>> = vec![Box::new(HeuristicAgent::new()), Box::new(HeuristicAgent::new())];
    let mut game = Game::new(GameConfig::with_seed(18), agents).unwrap();

    let mut starting = Vec::new();
    while game.state().phase == GamePhase::Setup {
        for event in game.step().unwrap() {
            if let GameEvent::StartingResources { player, resources } = event {
                starting.push((player, resources.total()));
            }
        }
    }
    let seats: Vec<PlayerId> = starting.iter().map(|(p, _)| *p).collect();
    assert_eq!(seats, vec![1, 0]);
    for (player, total) in starting {
        assert_eq!(game.state().players[player as usize].resources.total(), total);
    }
}

#[test]
fn test_seeded_games_are_reproducible() {
    let run = || {
        let agents: Vec<Box<dyn Agent>> = vec![
            Box::new(HeuristicAgent::new()),
            Box::new(RandomAgent::with_seed(3)),
            Box::new(HeuristicAgent::new()),
        ];
        let mut game = Game::new(GameConfig::with_seed(99), agents).unwrap();
        let mut log = Vec::new();
        for _ in 0..40 {
            match game.step() {
                Ok(events) => log.extend(events),
                Err(GameError::GameOver) => break,
                Err(err) => panic!("unexpected error: {err}"),
            }
        }
        (log, game.state().snapshot().to_json().unwrap())
    };
    let (first_log, first_snapshot) = run();
    let (second_log, second_snapshot) = run();
    assert_eq!(first_log, second_log);
    assert_eq!(first_snapshot, second_snapshot);
}

#[test]
fn test_heuristic_games_finish() {
    for seed in 0..3 {
        let agents: Vec<Box<dyn Agent>> = (0..4)
            .map(|_| Box::new(HeuristicAgent::new()) as Box<dyn Agent>)
            .collect();
        let mut game = Game::new(GameConfig::with_seed(seed), agents).unwrap();
        if let Some(winner) = game.play_until_finished(2000).unwrap() {
            let state = game.state();
            assert!(state.victory_points(winner) >= state.config.victory_points_to_win);
            assert!(state.is_finished());
        }
    }
}
