// Copyright © 2024-present
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//   https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::collections::BTreeSet;
use std::ops::ControlFlow;

use data::contexts::shipment_context::{
    GuildTiming, ReactiveSubquest, ShipmentMovementContext, ShipmentSubStep, ShipmentWaiting,
};
use data::core::ids::{FactionId, SectorId, TerritoryId};
use data::events::{EventData, ForcesShippedReason, PhaseEvent};
use data::game_state::{GamePhase, GameState};
use data::phase_step_result::PhaseStepResult;
use data::requests::{
    AgentRequest, AgentResponse, BgAdvisorContext, BgIntrusionContext, GuildActNowOrWaitContext,
    GuildTimingContext, IntrusionChoice, MovementAction, MovementRequestContext, RequestKind,
    ResponseAction, ShipmentAction, ShipmentRequestContext, StrongholdStatus, TakeUpArmsContext,
    WartimeContext,
};
use engine::{EngineConfig, PhaseHandler};
use rules::predicates::errors::{RuleErrorCode, ValidationResult};
use rules::predicates::movement::{reachable_within, validate_movement, validate_stronghold_occupancy};

/// `Continue` carries the in-flight state/events through the init chain;
/// `Break` is an early return with a fully-formed step result, mirroring the
/// bidding handler's event-threading style without `?` (stable `ControlFlow`
/// isn't `Try`-enabled).
type StepFlow = ControlFlow<PhaseStepResult, (GameState, Vec<PhaseEvent>)>;

/// Implements the full Shipment & Movement phase (spec.md §4.3): the
/// one-time WARTIME and Guild-timing prompts, the per-faction ship-then-move
/// loop with the Guild's out-of-order interjections, and the Bene Gesserit's
/// SPIRITUAL ADVISOR / INTRUSION / TAKE UP ARMS reactive triggers.
pub struct ShipmentMovementPhaseHandler {
    context: ShipmentMovementContext,
    require_explicit_ship_pass: bool,
}

impl Default for ShipmentMovementPhaseHandler {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ShipmentMovementPhaseHandler {
    pub fn new(require_explicit_ship_pass: bool) -> Self {
        Self { context: ShipmentMovementContext::default(), require_explicit_ship_pass }
    }

    /// Builds a handler honoring `config.require_explicit_ship_pass`, the
    /// `EngineConfig` knob this handler is meant to read.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.require_explicit_ship_pass)
    }

    fn drive(&mut self, state: GameState, events: Vec<PhaseEvent>) -> PhaseStepResult {
        let (state, events) = match self.try_issue_wartime(state, events) {
            ControlFlow::Break(result) => return result,
            ControlFlow::Continue(pair) => pair,
        };
        let (state, events) = match self.try_issue_guild_timing(state, events) {
            ControlFlow::Break(result) => return result,
            ControlFlow::Continue(pair) => pair,
        };
        self.start_or_continue_faction_loop(state, events)
    }

    /// spec.md §4.3.1 step 3: before shipment begins, the Bene Gesserit may
    /// flip any number of advisor stacks to fighters (peacetime restriction:
    /// only under `advanced_rules`, and only once per phase).
    fn try_issue_wartime(&mut self, state: GameState, events: Vec<PhaseEvent>) -> StepFlow {
        if self.context.wartime_resolved {
            return ControlFlow::Continue((state, events));
        }
        self.context.wartime_resolved = true;

        if !state.configuration.advanced_rules || !state.configuration.has_faction(FactionId::BeneGesserit) {
            return ControlFlow::Continue((state, events));
        }

        let territories = flip_eligible_territories(&state);
        if territories.is_empty() {
            return ControlFlow::Continue((state, events));
        }

        self.context.waiting_for = ShipmentWaiting::Wartime;
        self.context.pending_reactive = Some(ReactiveSubquest::Wartime { territories: territories.clone() });
        let request = AgentRequest {
            faction_id: FactionId::BeneGesserit,
            prompt: "Flip any advisor stacks to fighters before shipment begins".to_string(),
            kind: RequestKind::Wartime(WartimeContext { flip_eligible_territories: territories }),
            available_actions: vec!["FLIP".to_string(), "PASS".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        ControlFlow::Break(result)
    }

    fn process_wartime_response(&mut self, mut state: GameState, response: AgentResponse) -> PhaseStepResult {
        let mut events = Vec::new();
        self.context.pending_reactive = None;

        if let ResponseAction::WartimeFlip { territories } = response.action {
            let keys: Vec<(TerritoryId, SectorId)> = state
                .faction(FactionId::BeneGesserit)
                .forces
                .on_board
                .iter()
                .filter(|((territory, _), stack)| territories.contains(territory) && stack.advisors > 0)
                .map(|(&key, _)| key)
                .collect();
            for (territory, sector) in keys {
                let stack = state.faction_mut(FactionId::BeneGesserit).forces.stack_mut(territory, sector);
                stack.regular += stack.advisors;
                stack.advisors = 0;
                events.push(PhaseEvent::new(
                    EventData::AdvisorsFlipped { faction: FactionId::BeneGesserit, territory, sector },
                    format!("Bene Gesserit flips advisors to fighters in {territory:?}"),
                ));
            }
        }

        self.context.waiting_for = ShipmentWaiting::None;
        self.drive(state, events)
    }

    /// spec.md §4.3.1 step 2: the Guild chooses when it will take its
    /// shipment/movement turn, an option unique to this faction.
    fn try_issue_guild_timing(&mut self, state: GameState, events: Vec<PhaseEvent>) -> StepFlow {
        if self.context.guild_timing_resolved {
            return ControlFlow::Continue((state, events));
        }
        self.context.guild_timing_resolved = true;

        if !state.configuration.has_faction(FactionId::SpacingGuild) {
            return ControlFlow::Continue((state, events));
        }

        self.context.waiting_for = ShipmentWaiting::GuildTiming;
        let non_guild_faction_count = self.context.non_guild_storm_order.len();
        let request = AgentRequest {
            faction_id: FactionId::SpacingGuild,
            prompt: "Choose when to ship and move: now, before a later faction, or at the end".to_string(),
            kind: RequestKind::GuildTiming(GuildTimingContext { non_guild_faction_count }),
            available_actions: vec!["ACT_NOW".to_string(), "WAIT_LATER".to_string(), "DELAY_TO_END".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        ControlFlow::Break(result)
    }

    fn process_guild_timing_response(&mut self, state: GameState, response: AgentResponse) -> PhaseStepResult {
        let timing = match response.action {
            ResponseAction::GuildTiming(timing) => timing,
            _ => GuildTiming::DelayToEnd,
        };
        self.context.guild_timing = Some(timing);
        self.context.waiting_for = ShipmentWaiting::None;
        let mut events = vec![PhaseEvent::new(
            EventData::GuildTimingChosen { timing: format!("{timing:?}") },
            format!("Spacing Guild chooses {timing:?}"),
        )];

        match timing {
            GuildTiming::ActNow => {
                events.push(PhaseEvent::new(EventData::GuildActedNow, "Spacing Guild acts immediately".to_string()));
                self.begin_faction_turn(state, FactionId::SpacingGuild, events)
            }
            GuildTiming::WaitLater => {
                self.context.ask_guild_before_next = true;
                self.start_or_continue_faction_loop(state, events)
            }
            GuildTiming::DelayToEnd => self.start_or_continue_faction_loop(state, events),
        }
    }

    /// spec.md §4.3.2: re-asked before every non-Guild faction's turn once
    /// the Guild has chosen `wait_later`, until it finally acts.
    fn issue_guild_act_now_or_wait(&mut self, state: GameState, events: Vec<PhaseEvent>) -> PhaseStepResult {
        self.context.waiting_for = ShipmentWaiting::GuildPerFaction;
        let before_faction = self.context.non_guild_storm_order[self.context.current_faction_index];
        let request = AgentRequest {
            faction_id: FactionId::SpacingGuild,
            prompt: format!("Act now, before {before_faction:?} takes their turn?"),
            kind: RequestKind::GuildActNowOrWait(GuildActNowOrWaitContext { before_faction }),
            available_actions: vec!["ACT_NOW".to_string(), "WAIT".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        result
    }

    fn process_guild_act_now_or_wait_response(&mut self, state: GameState, response: AgentResponse) -> PhaseStepResult {
        self.context.waiting_for = ShipmentWaiting::None;
        let act_now = matches!(response.action, ResponseAction::GuildActNow(true));
        if act_now {
            let events = vec![PhaseEvent::new(EventData::GuildActedNow, "Spacing Guild acts now".to_string())];
            self.begin_faction_turn(state, FactionId::SpacingGuild, events)
        } else {
            let faction = self.context.non_guild_storm_order[self.context.current_faction_index];
            self.begin_faction_turn(state, faction, Vec::new())
        }
    }

    fn start_or_continue_faction_loop(&mut self, state: GameState, events: Vec<PhaseEvent>) -> PhaseStepResult {
        if self.context.current_faction_index >= self.context.non_guild_storm_order.len() {
            return self.guild_endgame_or_complete(state, events);
        }
        if self.context.ask_guild_before_next {
            self.context.ask_guild_before_next = false;
            return self.issue_guild_act_now_or_wait(state, events);
        }
        let faction = self.context.non_guild_storm_order[self.context.current_faction_index];
        self.begin_faction_turn(state, faction, events)
    }

    /// All non-Guild factions have had their turn; the Guild takes its
    /// delayed turn now if it hasn't acted yet, otherwise the phase ends.
    fn guild_endgame_or_complete(&mut self, state: GameState, events: Vec<PhaseEvent>) -> PhaseStepResult {
        let guild_present = state.configuration.has_faction(FactionId::SpacingGuild);
        if guild_present && !self.context.guild_completed {
            return self.begin_faction_turn(state, FactionId::SpacingGuild, events);
        }
        PhaseStepResult::complete(state, GamePhase::Battle).with_events(events)
    }

    fn begin_faction_turn(&mut self, state: GameState, faction: FactionId, events: Vec<PhaseEvent>) -> PhaseStepResult {
        self.context.current_faction = Some(faction);
        self.context.current_sub_step = ShipmentSubStep::Ship;
        self.issue_ship_request(state, faction, events)
    }

    fn issue_ship_request(&mut self, state: GameState, faction: FactionId, events: Vec<PhaseEvent>) -> PhaseStepResult {
        self.context.waiting_for = ShipmentWaiting::FactionShip;
        let reserves = state.faction(faction).forces.reserves;
        let context = ShipmentRequestContext {
            faction_id: faction,
            reserves_regular: reserves.regular,
            reserves_elite: reserves.elite,
            stronghold_statuses: build_stronghold_statuses(&state, faction),
            fremen_distance_two_territories: if faction == FactionId::Fremen {
                rules::queries::shipment::fremen_distance_two_territories()
            } else {
                Vec::new()
            },
            has_ornithopter_access: self.context.ornithopter_access.contains(&faction),
        };
        let request = AgentRequest {
            faction_id: faction,
            prompt: format!("{faction:?}: ship forces from reserves, or pass"),
            kind: RequestKind::Shipment(context),
            available_actions: vec!["SHIP".to_string(), "PASS".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        result
    }

    fn process_ship_response(&mut self, mut state: GameState, faction: FactionId, response: AgentResponse) -> PhaseStepResult {
        let mut events = Vec::new();

        if response.passed || matches!(response.action, ResponseAction::Pass) {
            events.push(PhaseEvent::new(
                EventData::ShipmentSkipped { faction },
                format!("{faction:?} passes shipment"),
            ));
            self.context.waiting_for = ShipmentWaiting::None;
            return self.begin_movement(state, events);
        }

        let ResponseAction::Shipment(action) = response.action else {
            events.push(PhaseEvent::new(
                EventData::ValidationRejected {
                    faction,
                    code: "MALFORMED_RESPONSE".to_string(),
                    message: "expected a shipment response".to_string(),
                },
                format!("{faction:?} sent an unexpected response type during shipment, treated as a pass"),
            ));
            self.context.waiting_for = ShipmentWaiting::None;
            return self.begin_movement(state, events);
        };

        match action {
            ShipmentAction::SkipViaMovement(movement) => {
                self.context.waiting_for = ShipmentWaiting::None;
                if self.require_explicit_ship_pass {
                    events.push(PhaseEvent::new(
                        EventData::ValidationRejected {
                            faction,
                            code: "SHIP_PASS_REQUIRED".to_string(),
                            message: "an explicit pass is required before moving".to_string(),
                        },
                        format!("{faction:?}'s move-as-skip-shipment rejected, re-issuing the ship request"),
                    ));
                    return self.issue_ship_request(state, faction, events);
                }
                self.context.current_sub_step = ShipmentSubStep::Move;
                self.process_movement_action(state, faction, movement, events)
            }
            ShipmentAction::ShipForces { territory, sector, regular, elite, .. } => {
                let count = regular + elite;
                let validation = rules::predicates::eligibility::can_ship_to(&state, faction, territory, sector, count, false);
                if !reject_if_invalid(&mut events, faction, &validation) {
                    self.context.waiting_for = ShipmentWaiting::None;
                    return self.begin_movement(state, events);
                }
                let cost = rules::predicates::eligibility::shipment_cost(faction, count, false);
                rules::mutations::forces::ship_forces(&mut state, faction, territory, sector, regular, elite)
                    .expect("validated by can_ship_to above");
                pay_shipment_cost(&mut state, faction, cost);
                events.push(PhaseEvent::new(
                    EventData::ForcesShipped { faction, territory, sector, regular, elite, reason: ForcesShippedReason::Shipment },
                    format!("{faction:?} ships {regular}/{elite} regular/elite forces to {territory:?}"),
                ));
                self.context.waiting_for = ShipmentWaiting::None;
                self.after_shipment(state, faction, Some((territory, sector)), events)
            }
            ShipmentAction::FremenSendForces { territory, sector, regular, elite } => {
                let validation = validate_fremen_shipment(&state, faction, territory, sector);
                if !reject_if_invalid(&mut events, faction, &validation) {
                    self.context.waiting_for = ShipmentWaiting::None;
                    return self.begin_movement(state, events);
                }
                rules::mutations::forces::ship_forces(&mut state, faction, territory, sector, regular, elite)
                    .expect("validated above");
                events.push(PhaseEvent::new(
                    EventData::ForcesShipped { faction, territory, sector, regular, elite, reason: ForcesShippedReason::Shipment },
                    format!("Fremen send {regular}/{elite} regular/elite forces to {territory:?} at no cost"),
                ));
                self.context.waiting_for = ShipmentWaiting::None;
                self.after_shipment(state, faction, Some((territory, sector)), events)
            }
            ShipmentAction::GuildCrossShip { from_territory, from_sector, to_territory, to_sector, regular, elite, .. } => {
                let count = regular + elite;
                let source = state.faction(faction).forces.stack_at(from_territory, from_sector);
                let validation = if regular > source.regular || elite > source.elite {
                    ValidationResult::fail(
                        RuleErrorCode::MovementNoSuchForces,
                        format!("{faction:?} does not have {regular}/{elite} regular/elite forces at {from_territory:?}/{from_sector:?}"),
                    )
                } else {
                    rules::predicates::eligibility::can_ship_to(&state, faction, to_territory, to_sector, count, true)
                };
                if !reject_if_invalid(&mut events, faction, &validation) {
                    self.context.waiting_for = ShipmentWaiting::None;
                    return self.begin_movement(state, events);
                }
                let cost = rules::predicates::eligibility::shipment_cost(faction, count, true);
                rules::mutations::forces::move_forces(
                    &mut state, faction, from_territory, from_sector, to_territory, to_sector, regular, elite,
                )
                .expect("validated above");
                pay_shipment_cost(&mut state, faction, cost);
                events.push(PhaseEvent::new(
                    EventData::ForcesShipped { faction, territory: to_territory, sector: to_sector, regular, elite, reason: ForcesShippedReason::Shipment },
                    format!("Spacing Guild cross-ships {regular}/{elite} regular/elite forces to {to_territory:?}"),
                ));
                self.context.waiting_for = ShipmentWaiting::None;
                self.after_shipment(state, faction, Some((to_territory, to_sector)), events)
            }
            ShipmentAction::GuildShipOffPlanet { from_territory, from_sector, regular, elite } => {
                let source = state.faction(faction).forces.stack_at(from_territory, from_sector);
                if regular > source.regular || elite > source.elite {
                    events.push(PhaseEvent::new(
                        EventData::ValidationRejected {
                            faction,
                            code: RuleErrorCode::MovementNoSuchForces.code().to_string(),
                            message: format!("{faction:?} does not have {regular}/{elite} regular/elite forces at {from_territory:?}/{from_sector:?}"),
                        },
                        format!("{faction:?}'s off-planet shipment rejected: insufficient forces"),
                    ));
                } else {
                    rules::mutations::forces::board_to_reserves(&mut state, faction, from_territory, from_sector, regular, elite)
                        .expect("validated above");
                    events.push(PhaseEvent::new(
                        EventData::ForcesShipped { faction, territory: from_territory, sector: from_sector, regular, elite, reason: ForcesShippedReason::Shipment },
                        format!("Spacing Guild ships {regular}/{elite} regular/elite forces off-planet from {from_territory:?}"),
                    ));
                }
                self.context.waiting_for = ShipmentWaiting::None;
                self.begin_movement(state, events)
            }
        }
    }

    /// spec.md §4.3.3: after a shipment lands, check whether it triggers a
    /// Bene Gesserit SPIRITUAL ADVISOR offer (territory had no BG presence)
    /// or an INTRUSION choice (territory already held BG advisors).
    fn after_shipment(
        &mut self,
        state: GameState,
        shipper: FactionId,
        destination: Option<(TerritoryId, SectorId)>,
        events: Vec<PhaseEvent>,
    ) -> PhaseStepResult {
        let Some((territory, sector)) = destination else {
            return self.begin_movement(state, events);
        };
        if shipper == FactionId::BeneGesserit || !state.configuration.has_faction(FactionId::BeneGesserit) {
            return self.begin_movement(state, events);
        }

        let bg_present = state.faction(FactionId::BeneGesserit).forces.occupied_territories().any(|t| t == territory);
        if !bg_present {
            self.context.waiting_for = ShipmentWaiting::BgAdvisor;
            self.context.pending_reactive = Some(ReactiveSubquest::SpiritualAdvisor { territory, sector });
            let request = AgentRequest {
                faction_id: FactionId::BeneGesserit,
                prompt: format!("Send a Spiritual Advisor to {territory:?}?"),
                kind: RequestKind::SendAdvisor(BgAdvisorContext { territory, sector, shipper }),
                available_actions: vec!["SEND".to_string(), "DECLINE".to_string()],
            };
            let mut result = PhaseStepResult::awaiting(state, vec![request]);
            result.events = events;
            return result;
        }

        if bg_has_advisors_in(&state, territory) {
            return self.issue_bg_intrusion(state, territory, sector, shipper, events);
        }

        self.begin_movement(state, events)
    }

    fn issue_bg_intrusion(
        &mut self,
        state: GameState,
        territory: TerritoryId,
        sector: SectorId,
        entering_faction: FactionId,
        events: Vec<PhaseEvent>,
    ) -> PhaseStepResult {
        self.context.waiting_for = ShipmentWaiting::BgIntrusion;
        self.context.pending_reactive = Some(ReactiveSubquest::Intrusion { territory, sector, entering_faction });
        let request = AgentRequest {
            faction_id: FactionId::BeneGesserit,
            prompt: format!("{entering_faction:?} has entered {territory:?} where you have advisors: fight or remain?"),
            kind: RequestKind::BgIntrusion(BgIntrusionContext { territory, sector, entering_faction }),
            available_actions: vec!["FLIP_TO_FIGHTERS".to_string(), "REMAIN_AS_ADVISORS".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        result
    }

    fn process_bg_advisor_response(&mut self, mut state: GameState, response: AgentResponse) -> PhaseStepResult {
        let mut events = Vec::new();
        let reactive = self.context.pending_reactive.take();
        if let Some(ReactiveSubquest::SpiritualAdvisor { territory, sector }) = reactive {
            if matches!(response.action, ResponseAction::SendAdvisor(true)) {
                let stack = state.faction_mut(FactionId::BeneGesserit).forces.stack_mut(territory, sector);
                stack.advisors += 1;
                events.push(PhaseEvent::new(
                    EventData::BgAdvisorSent { territory, sector },
                    format!("Bene Gesserit sends an advisor to {territory:?}"),
                ));
            }
        }
        self.context.waiting_for = ShipmentWaiting::None;
        self.begin_movement(state, events)
    }

    fn process_bg_intrusion_response(&mut self, mut state: GameState, response: AgentResponse) -> PhaseStepResult {
        let mut events = Vec::new();
        let reactive = self.context.pending_reactive.take();
        if let Some(ReactiveSubquest::Intrusion { territory, sector, .. }) = reactive {
            let flip = matches!(response.action, ResponseAction::BgIntrusion(IntrusionChoice::FlipToFighters));
            if flip {
                let stack = state.faction_mut(FactionId::BeneGesserit).forces.stack_mut(territory, sector);
                stack.regular += stack.advisors;
                stack.advisors = 0;
            }
            events.push(PhaseEvent::new(
                EventData::BgIntrusionResolved { territory, sector, flipped: flip },
                format!(
                    "Bene Gesserit {} in {territory:?}",
                    if flip { "takes up arms" } else { "remains as advisors" }
                ),
            ));
        }
        self.context.waiting_for = ShipmentWaiting::None;
        match self.context.current_sub_step {
            ShipmentSubStep::Ship => self.begin_movement(state, events),
            _ => self.complete_current_faction_turn(state, events),
        }
    }

    fn begin_movement(&mut self, state: GameState, events: Vec<PhaseEvent>) -> PhaseStepResult {
        let faction = self.context.current_faction.expect("movement begins only within an active faction's turn");
        self.context.current_sub_step = ShipmentSubStep::Move;
        self.context.waiting_for = ShipmentWaiting::FactionMove;
        let from_candidates: Vec<TerritoryId> =
            state.faction(faction).forces.occupied_territories().collect::<BTreeSet<_>>().into_iter().collect();
        let request = AgentRequest {
            faction_id: faction,
            prompt: format!("{faction:?}: move forces, or pass"),
            kind: RequestKind::Movement(MovementRequestContext {
                faction_id: faction,
                from_candidates,
                storm_blocked_sectors: vec![state.storm_sector],
                has_ornithopter_access: self.context.ornithopter_access.contains(&faction),
            }),
            available_actions: vec!["MOVE_FORCES".to_string(), "PASS".to_string()],
        };
        let mut result = PhaseStepResult::awaiting(state, vec![request]);
        result.events = events;
        result
    }

    fn process_movement_response(&mut self, state: GameState, faction: FactionId, response: AgentResponse) -> PhaseStepResult {
        if response.passed || matches!(response.action, ResponseAction::Pass) {
            let events = vec![PhaseEvent::new(
                EventData::MovementSkipped { faction },
                format!("{faction:?} passes movement"),
            )];
            self.context.waiting_for = ShipmentWaiting::None;
            return self.complete_current_faction_turn(state, events);
        }

        let ResponseAction::Movement(movement) = response.action else {
            let events = vec![PhaseEvent::new(
                EventData::ValidationRejected {
                    faction,
                    code: "MALFORMED_RESPONSE".to_string(),
                    message: "expected a movement response".to_string(),
                },
                format!("{faction:?} sent an unexpected response type during movement, treated as a pass"),
            )];
            self.context.waiting_for = ShipmentWaiting::None;
            return self.complete_current_faction_turn(state, events);
        };

        self.context.waiting_for = ShipmentWaiting::None;
        self.process_movement_action(state, faction, movement, Vec::new())
    }

    fn process_movement_action(
        &mut self,
        mut state: GameState,
        faction: FactionId,
        movement: MovementAction,
        mut events: Vec<PhaseEvent>,
    ) -> PhaseStepResult {
        let MovementAction { from_territory, from_sector, to_territory, to_sector, count, use_elite } = movement;
        let (regular, elite) = if use_elite { (0, count) } else { (count, 0) };

        let advisor_move = is_bg_advisor_move(&state, faction, from_territory, from_sector, regular, elite);
        let validation = if advisor_move {
            validate_bg_advisor_movement(&state, &self.context, faction, from_territory, from_sector, to_territory, to_sector, regular)
        } else {
            validate_movement(&state, &self.context, faction, from_territory, from_sector, to_territory, to_sector, regular, elite)
        };
        if let Some(error) = validation.first_error() {
            events.push(PhaseEvent::new(
                EventData::MovementRejected { faction, code: error.code.code().to_string(), message: error.message.clone() },
                format!("{faction:?}'s move rejected: {error}"),
            ));
            return self.complete_current_faction_turn(state, events);
        }

        let moved_advisors =
            apply_movement(&mut state, faction, from_territory, from_sector, to_territory, to_sector, regular, elite, advisor_move);
        events.push(PhaseEvent::new(
            EventData::ForcesMoved { faction, from_territory, from_sector, to_territory, to_sector, count },
            format!("{faction:?} moves {count} forces from {from_territory:?} to {to_territory:?}"),
        ));

        if moved_advisors {
            let occupied_by_others = state
                .factions
                .values()
                .filter(|f| f.id != FactionId::BeneGesserit)
                .any(|f| f.forces.occupied_territories().any(|t| t == to_territory));
            if occupied_by_others {
                let advisor_count = state.faction(FactionId::BeneGesserit).forces.stack_at(to_territory, to_sector).advisors;
                self.context.waiting_for = ShipmentWaiting::TakeUpArms;
                self.context.pending_reactive =
                    Some(ReactiveSubquest::TakeUpArms { territory: to_territory, sector: to_sector, advisor_count });
                let request = AgentRequest {
                    faction_id: FactionId::BeneGesserit,
                    prompt: format!("Take up arms in {to_territory:?}?"),
                    kind: RequestKind::TakeUpArms(TakeUpArmsContext { territory: to_territory, sector: to_sector, advisor_count }),
                    available_actions: vec!["FIGHT".to_string(), "REMAIN_ADVISORS".to_string()],
                };
                let mut result = PhaseStepResult::awaiting(state, vec![request]);
                result.events = events;
                return result;
            }
        }

        if faction != FactionId::BeneGesserit
            && state.configuration.has_faction(FactionId::BeneGesserit)
            && bg_has_advisors_in(&state, to_territory)
        {
            return self.issue_bg_intrusion(state, to_territory, to_sector, faction, events);
        }

        self.complete_current_faction_turn(state, events)
    }

    fn process_take_up_arms_response(&mut self, mut state: GameState, response: AgentResponse) -> PhaseStepResult {
        let mut events = Vec::new();
        let reactive = self.context.pending_reactive.take();
        if let Some(ReactiveSubquest::TakeUpArms { territory, sector, .. }) = reactive {
            let flip = matches!(response.action, ResponseAction::TakeUpArms(true));
            if flip {
                let stack = state.faction_mut(FactionId::BeneGesserit).forces.stack_mut(territory, sector);
                stack.regular += stack.advisors;
                stack.advisors = 0;
            }
            events.push(PhaseEvent::new(
                EventData::TakeUpArmsResolved { territory, sector, flipped: flip },
                format!(
                    "Bene Gesserit {} in {territory:?}",
                    if flip { "takes up arms" } else { "remains as advisors" }
                ),
            ));
        }
        self.context.waiting_for = ShipmentWaiting::None;
        self.complete_current_faction_turn(state, events)
    }

    /// spec.md §4.3.4: at the end of a faction's ship-then-move turn, send
    /// any of its forces stacked together with an ally (outside Polar Sink)
    /// to the Tleilaxu Tanks, then advance to the next faction (or the
    /// Guild's delayed turn, or phase completion).
    fn complete_current_faction_turn(&mut self, mut state: GameState, mut events: Vec<PhaseEvent>) -> PhaseStepResult {
        let faction = self.context.current_faction.take().expect("a faction turn must be active to complete it");
        self.context.current_faction_done();

        if let Some(ally) = state.faction(faction).ally_id {
            let polar_sink = oracle::territories::polar_sink();
            let stacked_territories: Vec<TerritoryId> = state
                .faction(faction)
                .forces
                .occupied_territories()
                .filter(|&t| t != polar_sink)
                .filter(|&t| state.faction(ally).forces.occupied_territories().any(|at| at == t))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            for territory in stacked_territories {
                let sectors: Vec<SectorId> = state
                    .faction(faction)
                    .forces
                    .on_board
                    .keys()
                    .filter(|&&(t, _)| t == territory)
                    .map(|&(_, sector)| sector)
                    .collect::<BTreeSet<_>>()
                    .into_iter()
                    .collect();
                for sector in sectors {
                    rules::mutations::forces::send_forces_to_tanks(&mut state, faction, territory, sector)
                        .expect("sending a faction's own forces to the Tanks cannot fail");
                    events.push(PhaseEvent::new(
                        EventData::ForcesShipped {
                            faction,
                            territory,
                            sector,
                            regular: 0,
                            elite: 0,
                            reason: ForcesShippedReason::AllianceConstraint,
                        },
                        format!("{faction:?}'s forces in {territory:?} sent to the Tanks (stacked with ally {ally:?})"),
                    ));
                }
            }
        }

        if faction == FactionId::SpacingGuild {
            self.context.guild_completed = true;
            self.context.waiting_for = ShipmentWaiting::None;
            return self.start_or_continue_faction_loop(state, events);
        }

        self.context.advance_to_next_faction();
        self.context.ask_guild_before_next = matches!(self.context.guild_timing, Some(GuildTiming::WaitLater))
            && !self.context.guild_completed
            && self.context.current_faction_index < self.context.non_guild_storm_order.len();
        self.context.waiting_for = ShipmentWaiting::None;
        self.start_or_continue_faction_loop(state, events)
    }
}

impl PhaseHandler for ShipmentMovementPhaseHandler {
    fn phase(&self) -> GamePhase {
        GamePhase::ShipmentMovement
    }

    fn initialize(&mut self, state: GameState) -> PhaseStepResult {
        self.context.ornithopter_access = rules::queries::shipment::ornithopter_access(&state);
        self.context.non_guild_storm_order = rules::queries::shipment::non_guild_storm_order(&state);
        self.context.current_faction_index = 0;
        self.drive(state, Vec::new())
    }

    fn process_step(&mut self, state: GameState, responses: Vec<AgentResponse>) -> PhaseStepResult {
        match self.context.waiting_for {
            ShipmentWaiting::None => {
                tracing::warn!("process_step called with no pending shipment/movement request");
                PhaseStepResult::complete(state, GamePhase::Battle)
            }
            ShipmentWaiting::Wartime => {
                let response = find_response(responses, FactionId::BeneGesserit);
                self.process_wartime_response(state, response)
            }
            ShipmentWaiting::GuildTiming => {
                let response = find_response(responses, FactionId::SpacingGuild);
                self.process_guild_timing_response(state, response)
            }
            ShipmentWaiting::GuildPerFaction => {
                let response = find_response(responses, FactionId::SpacingGuild);
                self.process_guild_act_now_or_wait_response(state, response)
            }
            ShipmentWaiting::FactionShip => {
                let faction = self.context.current_faction.expect("FactionShip implies an active faction");
                let response = find_response(responses, faction);
                self.process_ship_response(state, faction, response)
            }
            ShipmentWaiting::FactionMove => {
                let faction = self.context.current_faction.expect("FactionMove implies an active faction");
                let response = find_response(responses, faction);
                self.process_movement_response(state, faction, response)
            }
            ShipmentWaiting::BgAdvisor => {
                let response = find_response(responses, FactionId::BeneGesserit);
                self.process_bg_advisor_response(state, response)
            }
            ShipmentWaiting::BgIntrusion => {
                let response = find_response(responses, FactionId::BeneGesserit);
                self.process_bg_intrusion_response(state, response)
            }
            ShipmentWaiting::TakeUpArms => {
                let response = find_response(responses, FactionId::BeneGesserit);
                self.process_take_up_arms_response(state, response)
            }
        }
    }

    fn cleanup(&mut self, state: GameState) -> GameState {
        self.context = ShipmentMovementContext::default();
        state
    }
}

fn find_response(mut responses: Vec<AgentResponse>, faction: FactionId) -> AgentResponse {
    responses
        .drain(..)
        .find(|r| r.faction_id == faction)
        .unwrap_or_else(|| AgentResponse::pass(faction))
}

/// Rejects an invalid action by pushing a `ValidationRejected` event; returns
/// `true` when the action was valid and the caller should proceed.
fn reject_if_invalid(events: &mut Vec<PhaseEvent>, faction: FactionId, validation: &ValidationResult) -> bool {
    let Some(error) = validation.first_error() else {
        return true;
    };
    events.push(PhaseEvent::new(
        EventData::ValidationRejected { faction, code: error.code.code().to_string(), message: error.message.clone() },
        format!("{faction:?}'s shipment rejected: {error}"),
    ));
    false
}

fn pay_shipment_cost(state: &mut GameState, faction: FactionId, cost: u32) {
    if cost == 0 {
        return;
    }
    if faction == FactionId::SpacingGuild || !state.configuration.has_faction(FactionId::SpacingGuild) {
        rules::mutations::spice::remove_spice(state, faction, cost).expect("validated by can_ship_to before this point");
    } else {
        rules::mutations::spice::transfer_spice(state, faction, FactionId::SpacingGuild, cost)
            .expect("validated by can_ship_to before this point");
    }
}

fn validate_fremen_shipment(state: &GameState, faction: FactionId, territory: TerritoryId, sector: SectorId) -> ValidationResult {
    if sector == state.storm_sector {
        return ValidationResult::fail(RuleErrorCode::ShipmentToStorm, format!("Sector {sector:?} is under storm"));
    }
    if !rules::queries::shipment::fremen_distance_two_territories().contains(&territory) {
        return ValidationResult::fail(
            RuleErrorCode::MovementOutOfRange,
            format!("{territory:?} is not within 2 territories of the Great Flat"),
        );
    }
    validate_stronghold_occupancy(state, territory, faction)
}

/// Territories where the Bene Gesserit have at least one advisor stack not
/// currently under storm, eligible for a WARTIME flip (rule 2.02.14).
fn flip_eligible_territories(state: &GameState) -> Vec<TerritoryId> {
    state
        .faction(FactionId::BeneGesserit)
        .forces
        .on_board
        .iter()
        .filter(|((_, sector), stack)| stack.advisors > 0 && *sector != state.storm_sector)
        .map(|((territory, _), _)| *territory)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn bg_has_advisors_in(state: &GameState, territory: TerritoryId) -> bool {
    state.faction(FactionId::BeneGesserit).forces.on_board.iter().any(|((t, _), stack)| *t == territory && stack.advisors > 0)
}

fn build_stronghold_statuses(state: &GameState, faction: FactionId) -> Vec<StrongholdStatus> {
    oracle::territories::STRONGHOLD_TERRITORIES
        .iter()
        .map(|&territory| {
            let occupant_factions: Vec<FactionId> = state
                .factions
                .values()
                .filter(|f| f.forces.occupied_territories().any(|t| t == territory))
                .map(|f| f.id)
                .collect();
            let storm_blocked = oracle::territories::find(territory).sectors.contains(&state.storm_sector);
            let reason_cannot_ship =
                validate_stronghold_occupancy(state, territory, faction).first_error().map(|e| e.message.clone());
            StrongholdStatus { territory, occupant_factions, storm_blocked, reason_cannot_ship }
        })
        .collect()
}

/// Detects a Bene Gesserit move whose source stack can only be satisfied by
/// advisor tokens -- `MovementAction` has no dedicated advisor-movement
/// payload, and BG's advisors are otherwise immobile without one (see
/// DESIGN.md's Open Question decision for this phase).
fn is_bg_advisor_move(
    state: &GameState,
    faction: FactionId,
    from: TerritoryId,
    from_sector: SectorId,
    regular: u32,
    elite: u32,
) -> bool {
    if faction != FactionId::BeneGesserit || elite != 0 || regular == 0 {
        return false;
    }
    let stack = state.faction(faction).forces.stack_at(from, from_sector);
    stack.regular < regular && stack.advisors >= regular
}

/// Validates a BG advisor move the same way [validate_movement] validates a
/// fighter move, but checks availability against `advisors` instead of
/// `regular`/`elite`.
fn validate_bg_advisor_movement(
    state: &GameState,
    context: &ShipmentMovementContext,
    faction: FactionId,
    from: TerritoryId,
    from_sector: SectorId,
    to: TerritoryId,
    to_sector: SectorId,
    count: u32,
) -> ValidationResult {
    let stack = state.faction(faction).forces.stack_at(from, from_sector);
    if count > stack.advisors {
        return ValidationResult::fail(
            RuleErrorCode::MovementNoSuchForces,
            format!("{faction:?} has only {} advisors at {from:?}/{from_sector:?}", stack.advisors),
        );
    }
    if to_sector == state.storm_sector {
        return ValidationResult::fail(RuleErrorCode::MovementIntoStorm, format!("Sector {to_sector:?} is under storm"));
    }
    let range = if context.ornithopter_access.contains(&faction) { 2 } else { 1 };
    let reachable = reachable_within(from, range);
    if !reachable.contains(&to) {
        return ValidationResult::fail(
            RuleErrorCode::MovementOutOfRange,
            format!("{to:?} is not within {range} territories of {from:?}"),
        );
    }
    ValidationResult::ok()
}

/// Moves forces for a `MOVE_FORCES` action; `advisor_move` (computed by
/// [is_bg_advisor_move] and validated by [validate_bg_advisor_movement])
/// selects whether `regular` here actually names advisor tokens.
fn apply_movement(
    state: &mut GameState,
    faction: FactionId,
    from: TerritoryId,
    from_sector: SectorId,
    to: TerritoryId,
    to_sector: SectorId,
    regular: u32,
    elite: u32,
    advisor_move: bool,
) -> bool {
    if advisor_move {
        let src_stack = state.faction_mut(faction).forces.stack_mut(from, from_sector);
        src_stack.advisors -= regular;
        state.faction_mut(faction).forces.prune_empty(from, from_sector);
        let dst_stack = state.faction_mut(faction).forces.stack_mut(to, to_sector);
        dst_stack.advisors += regular;
        return true;
    }

    rules::mutations::forces::move_forces(state, faction, from, from_sector, to, to_sector, regular, elite)
        .expect("movement was validated before this call");
    false
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use data::cards::registry::CardRegistry;
    use data::core::ids::SectorId;
    use data::factions::faction_state::{FactionState, ReserveCounts};
    use data::game_state::{ActionLog, GameConfiguration};
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;

    use super::*;

    fn seated_factions() -> Vec<FactionId> {
        vec![
            FactionId::Atreides,
            FactionId::Harkonnen,
            FactionId::Emperor,
            FactionId::Fremen,
            FactionId::SpacingGuild,
            FactionId::BeneGesserit,
        ]
    }

    fn new_test_game(advanced_rules: bool) -> GameState {
        let seated = seated_factions();
        let mut factions = BTreeMap::new();
        for &faction in &seated {
            let mut state = FactionState::new(faction, 50);
            state.forces.reserves = ReserveCounts { regular: 10, elite: 0 };
            factions.insert(faction, state);
        }

        GameState {
            turn: 1,
            phase: GamePhase::ShipmentMovement,
            storm_sector: SectorId::new(0),
            storm_order: seated.clone(),
            factions,
            cards: CardRegistry::default(),
            treachery_deck: Vec::new(),
            treachery_discard: Vec::new(),
            spice_deck_a: Vec::new(),
            spice_deck_b: Vec::new(),
            spice_discard: Vec::new(),
            alliances: Default::default(),
            territory_spice: BTreeMap::new(),
            tanks: BTreeMap::new(),
            configuration: GameConfiguration { advanced_rules, seated_factions: seated },
            action_log: ActionLog::default(),
            rng: Xoshiro256StarStar::seed_from_u64(7),
        }
    }

    fn guild_timing_response(timing: GuildTiming) -> AgentResponse {
        AgentResponse { faction_id: FactionId::SpacingGuild, action: ResponseAction::GuildTiming(timing), passed: false }
    }

    fn ship_response(faction: FactionId, action: ShipmentAction) -> AgentResponse {
        AgentResponse { faction_id: faction, action: ResponseAction::Shipment(action), passed: false }
    }

    /// Answers every request type with the most conservative choice (pass,
    /// decline, remain as advisors, delay to the end), used to drive a test
    /// scenario forward without it being the thing under test.
    fn default_pass(request: &AgentRequest) -> AgentResponse {
        let faction_id = request.faction_id;
        match &request.kind {
            RequestKind::GuildTiming(_) => {
                AgentResponse { faction_id, action: ResponseAction::GuildTiming(GuildTiming::DelayToEnd), passed: false }
            }
            RequestKind::GuildActNowOrWait(_) => {
                AgentResponse { faction_id, action: ResponseAction::GuildActNow(false), passed: false }
            }
            RequestKind::SendAdvisor(_) => {
                AgentResponse { faction_id, action: ResponseAction::SendAdvisor(false), passed: false }
            }
            RequestKind::BgIntrusion(_) => {
                AgentResponse { faction_id, action: ResponseAction::BgIntrusion(IntrusionChoice::RemainAsAdvisors), passed: false }
            }
            RequestKind::TakeUpArms(_) => {
                AgentResponse { faction_id, action: ResponseAction::TakeUpArms(false), passed: false }
            }
            _ => AgentResponse::pass(faction_id),
        }
    }

    #[test]
    fn ship_then_move_happy_path_for_first_faction() {
        let game = new_test_game(false);
        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::GuildTiming(_)));

        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Atreides);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Shipment(_)));

        let ship = ShipmentAction::ShipForces {
            territory: TerritoryId("tuek_sietch"),
            sector: SectorId::new(11),
            regular: 3,
            elite: 0,
            cost: 30,
        };
        let result = handler.process_step(result.state, vec![ship_response(FactionId::Atreides, ship)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::BeneGesserit);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::SendAdvisor(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse { faction_id: FactionId::BeneGesserit, action: ResponseAction::SendAdvisor(false), passed: false }],
        );
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Atreides);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));

        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::Atreides)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Harkonnen);

        let atreides = result.state.faction(FactionId::Atreides);
        assert_eq!(atreides.spice, 50 - 30);
        assert_eq!(atreides.forces.reserves.regular, 7);
        assert_eq!(atreides.forces.stack_at(TerritoryId("tuek_sietch"), SectorId::new(11)).regular, 3);
    }

    #[test]
    fn wartime_prompt_flips_advisors_when_eligible() {
        let mut game = new_test_game(true);
        game.faction_mut(FactionId::BeneGesserit).forces.stack_mut(TerritoryId("habbanya_sietch"), SectorId::new(4)).advisors = 2;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::BeneGesserit);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Wartime(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse {
                faction_id: FactionId::BeneGesserit,
                action: ResponseAction::WartimeFlip { territories: vec![TerritoryId("habbanya_sietch")] },
                passed: false,
            }],
        );

        let stack = result.state.faction(FactionId::BeneGesserit).forces.stack_at(TerritoryId("habbanya_sietch"), SectorId::new(4));
        assert_eq!(stack.regular, 2);
        assert_eq!(stack.advisors, 0);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::GuildTiming(_)));
    }

    #[test]
    fn guild_act_now_takes_its_turn_immediately() {
        let game = new_test_game(false);
        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::ActNow)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::SpacingGuild);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Shipment(_)));
    }

    #[test]
    fn guild_wait_later_interjects_before_the_next_faction() {
        let game = new_test_game(false);
        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::WaitLater)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Atreides);

        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::Atreides)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));
        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::Atreides)]);

        assert_eq!(result.pending_requests[0].faction_id, FactionId::SpacingGuild);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::GuildActNowOrWait(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse { faction_id: FactionId::SpacingGuild, action: ResponseAction::GuildActNow(true), passed: false }],
        );
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Shipment(_)));
        assert_eq!(result.pending_requests[0].faction_id, FactionId::SpacingGuild);

        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::SpacingGuild)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));
        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::SpacingGuild)]);

        // Guild already completed, so the per-faction interjection is never asked again.
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Harkonnen);
    }

    #[test]
    fn guild_delay_to_end_acts_after_every_other_faction() {
        let game = new_test_game(false);
        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let mut result = handler.initialize(game);
        result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);

        let mut ship_order = Vec::new();
        while !result.phase_complete {
            let request = &result.pending_requests[0];
            if matches!(request.kind, RequestKind::Shipment(_)) {
                ship_order.push(request.faction_id);
            }
            let response = default_pass(request);
            result = handler.process_step(result.state, vec![response]);
        }

        assert_eq!(
            ship_order,
            vec![
                FactionId::Atreides,
                FactionId::Harkonnen,
                FactionId::Emperor,
                FactionId::Fremen,
                FactionId::SpacingGuild,
            ]
        );
        assert!(result.phase_complete);
        assert_eq!(result.next_phase, Some(GamePhase::Battle));
    }

    #[test]
    fn bg_spiritual_advisor_offer_can_be_accepted() {
        let game = new_test_game(false);
        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);

        let ship = ShipmentAction::ShipForces {
            territory: TerritoryId("carthag"),
            sector: SectorId::new(9),
            regular: 2,
            elite: 0,
            cost: 20,
        };
        let result = handler.process_step(result.state, vec![ship_response(FactionId::Atreides, ship)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::SendAdvisor(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse { faction_id: FactionId::BeneGesserit, action: ResponseAction::SendAdvisor(true), passed: false }],
        );
        let stack = result.state.faction(FactionId::BeneGesserit).forces.stack_at(TerritoryId("carthag"), SectorId::new(9));
        assert_eq!(stack.advisors, 1);
    }

    #[test]
    fn bg_intrusion_can_flip_advisors_to_fighters() {
        let mut game = new_test_game(false);
        game.faction_mut(FactionId::BeneGesserit).forces.stack_mut(TerritoryId("carthag"), SectorId::new(9)).advisors = 1;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);

        let ship = ShipmentAction::ShipForces {
            territory: TerritoryId("carthag"),
            sector: SectorId::new(9),
            regular: 2,
            elite: 0,
            cost: 20,
        };
        let result = handler.process_step(result.state, vec![ship_response(FactionId::Atreides, ship)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::BgIntrusion(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse {
                faction_id: FactionId::BeneGesserit,
                action: ResponseAction::BgIntrusion(IntrusionChoice::FlipToFighters),
                passed: false,
            }],
        );
        let stack = result.state.faction(FactionId::BeneGesserit).forces.stack_at(TerritoryId("carthag"), SectorId::new(9));
        assert_eq!(stack.regular, 1);
        assert_eq!(stack.advisors, 0);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));
    }

    #[test]
    fn stronghold_occupancy_blocks_a_third_unallied_faction() {
        let mut game = new_test_game(false);
        game.faction_mut(FactionId::Harkonnen).forces.stack_mut(TerritoryId("arrakeen"), SectorId::new(9)).regular = 1;
        game.faction_mut(FactionId::Emperor).forces.stack_mut(TerritoryId("arrakeen"), SectorId::new(9)).regular = 1;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);

        let ship = ShipmentAction::ShipForces {
            territory: TerritoryId("arrakeen"),
            sector: SectorId::new(9),
            regular: 2,
            elite: 0,
            cost: 20,
        };
        let result = handler.process_step(result.state, vec![ship_response(FactionId::Atreides, ship)]);

        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));
        assert_eq!(result.state.faction(FactionId::Atreides).forces.reserves.regular, 10);
        assert!(result.events.iter().any(|e| matches!(e.data, EventData::ValidationRejected { .. })));
    }

    #[test]
    fn bene_gesserit_advisor_move_can_trigger_take_up_arms() {
        let mut game = new_test_game(false);
        game.faction_mut(FactionId::Harkonnen).forces.stack_mut(TerritoryId("habbanya_erg"), SectorId::new(4)).regular = 1;
        game.faction_mut(FactionId::BeneGesserit).forces.stack_mut(TerritoryId("habbanya_sietch"), SectorId::new(4)).advisors = 2;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let mut result = handler.initialize(game);
        result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);

        while !(result.pending_requests[0].faction_id == FactionId::BeneGesserit
            && matches!(result.pending_requests[0].kind, RequestKind::Shipment(_)))
        {
            let response = default_pass(&result.pending_requests[0]);
            result = handler.process_step(result.state, vec![response]);
        }

        result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::BeneGesserit)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));

        let movement = MovementAction {
            from_territory: TerritoryId("habbanya_sietch"),
            from_sector: SectorId::new(4),
            to_territory: TerritoryId("habbanya_erg"),
            to_sector: SectorId::new(4),
            count: 2,
            use_elite: false,
        };
        result = handler.process_step(
            result.state,
            vec![AgentResponse { faction_id: FactionId::BeneGesserit, action: ResponseAction::Movement(movement), passed: false }],
        );
        assert!(matches!(result.pending_requests[0].kind, RequestKind::TakeUpArms(_)));

        let result = handler.process_step(
            result.state,
            vec![AgentResponse { faction_id: FactionId::BeneGesserit, action: ResponseAction::TakeUpArms(true), passed: false }],
        );
        let stack = result.state.faction(FactionId::BeneGesserit).forces.stack_at(TerritoryId("habbanya_erg"), SectorId::new(4));
        assert_eq!(stack.regular, 2);
        assert_eq!(stack.advisors, 0);
        // Bene Gesserit is last in non-Guild storm order; the delayed Guild turn follows.
        assert_eq!(result.pending_requests[0].faction_id, FactionId::SpacingGuild);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Shipment(_)));
    }

    #[test]
    fn alliance_stacking_sends_forces_to_tanks_at_turn_end() {
        let mut game = new_test_game(false);
        game.alliances.insert(GameState::ally_pair(FactionId::Atreides, FactionId::Harkonnen));
        game.faction_mut(FactionId::Atreides).ally_id = Some(FactionId::Harkonnen);
        game.faction_mut(FactionId::Harkonnen).ally_id = Some(FactionId::Atreides);
        game.faction_mut(FactionId::Atreides).forces.stack_mut(TerritoryId("carthag"), SectorId::new(9)).regular = 3;
        game.faction_mut(FactionId::Harkonnen).forces.stack_mut(TerritoryId("carthag"), SectorId::new(9)).regular = 2;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let mut result = handler.initialize(game);
        result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::DelayToEnd)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::Atreides);

        result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::Atreides)]);
        assert!(matches!(result.pending_requests[0].kind, RequestKind::Movement(_)));
        let result = handler.process_step(result.state, vec![AgentResponse::pass(FactionId::Atreides)]);

        assert!(result.state.faction(FactionId::Atreides).forces.on_board.is_empty());
        assert_eq!(result.state.tanks.get(&FactionId::Atreides).map(|t| t.regular).unwrap_or(0), 3);
        assert_eq!(
            result.state.faction(FactionId::Harkonnen).forces.stack_at(TerritoryId("carthag"), SectorId::new(9)).regular,
            2
        );
    }

    #[test]
    fn guild_cross_ship_pays_half_price() {
        let mut game = new_test_game(false);
        game.faction_mut(FactionId::SpacingGuild).forces.stack_mut(TerritoryId("carthag"), SectorId::new(9)).regular = 4;
        let spice_before = game.faction(FactionId::SpacingGuild).spice;

        let mut handler = ShipmentMovementPhaseHandler::new(false);
        let result = handler.initialize(game);
        let result = handler.process_step(result.state, vec![guild_timing_response(GuildTiming::ActNow)]);
        assert_eq!(result.pending_requests[0].faction_id, FactionId::SpacingGuild);

        let cross_ship = ShipmentAction::GuildCrossShip {
            from_territory: TerritoryId("carthag"),
            from_sector: SectorId::new(9),
            to_territory: TerritoryId("arrakeen"),
            to_sector: SectorId::new(9),
            regular: 2,
            elite: 0,
            cost: 2,
        };
        let result = handler.process_step(result.state, vec![ship_response(FactionId::SpacingGuild, cross_ship)]);

        let guild = result.state.faction(FactionId::SpacingGuild);
        assert_eq!(guild.spice, spice_before - 2);
        assert_eq!(guild.forces.stack_at(TerritoryId("arrakeen"), SectorId::new(9)).regular, 2);
        assert_eq!(guild.forces.stack_at(TerritoryId("carthag"), SectorId::new(9)).regular, 2);
    }
}
