//! Turn driver.
//!
//! `Game` pairs a [`GameState`] with one [`Agent`] per seat and advances the
//! game one unit at a time: a setup visit (settlement then road) or a full
//! main-phase turn. Pacing belongs to the caller; nothing here blocks or
//! retries.

use crate::actions::{Action, GameEvent};
use crate::agent::Agent;
use crate::board::PlayerId;
use crate::game::{GameConfig, GameError, GamePhase, GameState};
use crate::player::DevelopmentCard;
use tracing::{debug, warn};

/// A game in progress together with the agents deciding for each seat
pub struct Game {
    state: GameState,
    agents: Vec<Box<dyn Agent>>,
}

impl Game {
    /// Seat one player per agent, in order
    pub fn new(config: GameConfig, agents: Vec<Box<dyn Agent>>) -> Result<Self, GameError> {
        let state = GameState::new(config, agents.len())?;
        Ok(Self { state, agents })
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for harnesses and tests that stage positions
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn into_state(self) -> GameState {
        self.state
    }

    pub fn winner(&self) -> Option<PlayerId> {
        self.state.winner
    }

    /// Advance by one setup visit or one full turn, whichever is due
    pub fn step(&mut self) -> Result<Vec<GameEvent>, GameError> {
        match self.state.phase {
            GamePhase::Setup => self.do_setup_turn(),
            GamePhase::Main => self.do_full_turn(),
        }
    }

    /// Run until someone wins or `max_turns` main-phase turns have passed
    pub fn play_until_finished(&mut self, max_turns: u32) -> Result<Option<PlayerId>, GameError> {
        while self.state.winner.is_none() && self.state.turn_number < max_turns {
            self.step()?;
        }
        Ok(self.state.winner)
    }

    /// One setup visit: the agent places a settlement, then a road touching it
    pub fn do_setup_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.state.winner.is_some() {
            return Err(GameError::GameOver);
        }
        if self.state.phase != GamePhase::Setup {
            return Err(GameError::InvalidPhase);
        }

        let mut events = Vec::new();
        let visit = self.state.setup_turns_taken;
        while self.state.phase == GamePhase::Setup && self.state.setup_turns_taken == visit {
            let actions = self.state.legal_actions();
            if actions.is_empty() {
                warn!(player = self.state.current_player, "no legal setup placement, skipping");
                events.extend(self.state.advance_setup());
                break;
            }
            let current = self.state.current_player as usize;
            let action = self.agents[current].choose_action(&self.state, &actions);
            events.extend(self.perform_action(&action)?);
        }
        Ok(events)
    }

    /// Roll, resolve the roll, let the agent act until it ends the turn, then
    /// recompute awards and check for a winner.
    pub fn do_full_turn(&mut self) -> Result<Vec<GameEvent>, GameError> {
        if self.state.winner.is_some() {
            return Err(GameError::GameOver);
        }
        let (mut events, total) = self.state.roll_dice()?;
        events.extend(self.resolve_roll(total)?);

        let limit = self.state.config.max_actions_per_turn;
        for _ in 0..limit {
            let actions = self.state.legal_actions();
            if actions.is_empty() {
                break;
            }
            let current = self.state.current_player as usize;
            let action = self.agents[current].choose_action(&self.state, &actions);
            if action.ends_turn() {
                events.extend(self.perform_action(&action)?);
                return Ok(events);
            }
            events.extend(self.perform_action(&action)?);
        }

        warn!(
            player = self.state.current_player,
            limit, "turn hit the action limit, ending it"
        );
        events.extend(self.state.finish_turn());
        Ok(events)
    }

    /// Distribute production, or on a 7 discard and run the robber
    pub fn resolve_roll(&mut self, total: u8) -> Result<Vec<GameEvent>, GameError> {
        if total == 7 {
            let mut events = self.state.discard_half()?;
            events.extend(self.move_robber_and_steal()?);
            Ok(events)
        } else {
            Ok(self.state.distribute_resources(total))
        }
    }

    /// Apply one action chosen by the current player's agent
    pub fn perform_action(&mut self, action: &Action) -> Result<Vec<GameEvent>, GameError> {
        debug!(player = self.state.current_player, ?action, "performing action");
        match action {
            Action::EndTurn => {
                if self.state.winner.is_some() {
                    return Err(GameError::GameOver);
                }
                if self.state.phase != GamePhase::Main {
                    return Err(GameError::InvalidPhase);
                }
                Ok(self.state.finish_turn())
            }
            Action::BuildSettlement { intersection, paid } => {
                self.state.build_settlement(*intersection, *paid)
            }
            Action::BuildCity { intersection, paid } => self.state.build_city(*intersection, *paid),
            Action::BuildRoad { edge, paid } => self.state.build_road(*edge, *paid),
            Action::BuyDevelopmentCard => self.state.buy_development_card(),
            Action::UseDevelopmentCard(card) => self.use_development_card(*card),
            Action::Trade { giving, receiving } => self.state.trade(giving, receiving),
        }
    }

    fn use_development_card(&mut self, card: DevelopmentCard) -> Result<Vec<GameEvent>, GameError> {
        let mut events = self.state.play_development_card(card)?;
        match card {
            DevelopmentCard::Knight => events.extend(self.move_robber_and_steal()?),
            DevelopmentCard::RoadBuilding => events.extend(self.state.grant_free_roads()),
            DevelopmentCard::YearOfPlenty => {
                for _ in 0..2 {
                    let current = self.state.current_player as usize;
                    let resource = self.agents[current].choose_needed_resource(&self.state);
                    events.extend(self.state.grant_from_bank(resource));
                }
            }
            DevelopmentCard::Monopoly => {
                let current = self.state.current_player as usize;
                let resource = self.agents[current].choose_needed_resource(&self.state);
                events.extend(self.state.monopolize(resource));
            }
            DevelopmentCard::VictoryPoint => {}
        }
        Ok(events)
    }

    /// Ask the agent for a robber tile, then for a victim if anyone is there
    fn move_robber_and_steal(&mut self) -> Result<Vec<GameEvent>, GameError> {
        let current = self.state.current_player as usize;
        let to = self.agents[current].choose_robber_tile(&self.state);
        let (mut events, candidates) = self.state.move_robber(to)?;
        if !candidates.is_empty() {
            let victim = self.agents[current].choose_steal_target(&self.state, &candidates);
            events.extend(self.state.steal(victim)?);
        }
        Ok(events)
    }
}
