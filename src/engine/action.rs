//! Day-stage commands: targeting, drawing, assisting, and resolution.
//!
//! An action runs in three beats: [`Game::choose_action`] locks a target and
//! (for combat) seeds the bag with the target's vermin, draws accumulate
//! until the seat stops or busts, and resolution applies the outcome and
//! hands the seat to dusk. Resolution never fails; outcomes the dice forbid
//! (not enough food, no room) are logged fizzles.

use crate::abilities::{fire_hook, HookEvent};
use crate::cards::{ActionReward, CardKind, CardUid, CubeCount, TemplateId, Worker};
use crate::core::cube::{count_allied, is_bust, Cube};
use crate::core::player::{CombatContext, Hero, PlayerId};
use crate::core::rng::RandomSource;
use crate::core::state::{ActionContext, ActionMode, ActiveStage, HelperState, Stage};
use crate::engine::{CommandError, Game};

use smallvec::SmallVec;

impl<R: RandomSource> Game<R> {
    /// Target `target` for this turn's day action.
    ///
    /// Targeting a location (any mode) discovers it if needed, moves the
    /// seat there, and returns its parked workers to the seat's bag.
    /// Combat targeting additionally moves the target's vermin into the
    /// seat's bag as drawable cubes.
    pub fn choose_action(
        &mut self,
        seat: PlayerId,
        target: CardUid,
        mode: ActionMode,
    ) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DayAction)?;
        if matches!(&self.state.turn_state, Some(ctx) if !ctx.resolved) {
            return Err(CommandError::ActionInFlight);
        }

        let card = self.state.card(target).ok_or(CommandError::UnknownCard(target))?;
        let card_name = card.name.clone();
        let card_template = card.template.clone();
        let card_vermin = card.vermin;
        let is_location = card.is_location();
        let is_hero = card.is_hero();
        let heals = card.reward() == Some(ActionReward::Heal);
        let quest_owner = match &card.kind {
            CardKind::Quest { owner, .. } => owner.clone(),
            _ => None,
        };

        let player = &self.state.players[seat];
        if player.must_visit_infirmary && !heals {
            return Err(CommandError::MustVisitInfirmary(seat));
        }
        match mode {
            ActionMode::Action if card_vermin > 0 => {
                return Err(CommandError::TargetHasVermin(target));
            }
            ActionMode::Combat if card_vermin == 0 => {
                return Err(CommandError::TargetLacksVermin(target));
            }
            ActionMode::Recruit if !is_hero => {
                return Err(CommandError::NotRecruitable(target));
            }
            ActionMode::Recruit if card_vermin > 0 => {
                return Err(CommandError::TargetHasVermin(target));
            }
            _ => {}
        }
        if matches!(&quest_owner, Some(owner) if *owner != player.champion) {
            return Err(CommandError::ForeignQuest);
        }
        let is_villain =
            matches!(&self.state.revealed_villain, Some(v) if v.uid == target);
        if is_villain && !self.state.fortress_cleared {
            return Err(CommandError::FortressStanding);
        }

        if is_location {
            self.discover_location(target, &card_template);
            self.state.players[seat].location = card_template.clone();
            self.collect_workers(seat, target);
        }

        let mut min_draw = 0;
        if mode == ActionMode::Combat {
            min_draw = self.state.combat_min_draw(card_vermin);
            let player = &mut self.state.players[seat];
            player.bag.extend(std::iter::repeat(Cube::Vermin).take(card_vermin));
            player.location = card_template;
            player.combat = Some(CombatContext {
                target,
                threat: card_vermin,
            });
            if let Some(card) = self.state.card_mut(target) {
                card.vermin = 0;
            }
        } else {
            self.state.players[seat].combat = None;
        }

        let player = &mut self.state.players[seat];
        player.pending_cubes.clear();
        player.drawn_this_turn.clear();
        player.did_bust = false;

        self.state.turn_state = Some(ActionContext {
            seat,
            target,
            mode,
            min_draw,
            resolved: false,
            busted: false,
            helpers: HelperState::default(),
        });

        let player_name = self.state.players[seat].name.clone();
        let verb = match mode {
            ActionMode::Action => "action",
            ActionMode::Combat => "combat",
            ActionMode::Recruit => "recruit",
        };
        self.state
            .push_log(format!("{player_name} targets {card_name} for {verb}."));
        Ok(())
    }

    /// Move to an already discovered location, collecting its workers.
    pub fn travel_to(&mut self, seat: PlayerId, location: &TemplateId) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DayAction)?;

        let destination = self
            .state
            .discovered_location(location)
            .ok_or(CommandError::UnknownLocation)?;
        let uid = destination.uid;
        let name = destination.name.clone();

        self.state.players[seat].location = location.clone();
        self.collect_workers(seat, uid);

        let player_name = self.state.players[seat].name.clone();
        self.state.push_log(format!("{player_name} travels to {name}."));
        Ok(())
    }

    /// Draw one cube from the active seat's own bag into the action.
    pub fn draw_cube(&mut self, seat: PlayerId) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DayAction)?;
        self.require_unresolved_action()?;

        let cube = self.pull_from_bag(seat)?;
        let player = &mut self.state.players[seat];
        player.drawn_this_turn.push(cube);
        if cube != Cube::Vermin {
            player.pending_cubes.push(cube);
        }
        self.unlock_helpers();
        self.update_bust_status();
        Ok(())
    }

    /// Stop drawing and resolve the action. Combat demands its minimum
    /// draw count first, unless the seat already busted.
    pub fn stop_drawing(&mut self, seat: PlayerId) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_stage(seat, Stage::DayAction)?;
        self.require_unresolved_action()?;

        let ctx = self.state.turn_state.as_ref().ok_or(CommandError::NoActionInFlight)?;
        let player = &self.state.players[seat];
        if ctx.mode == ActionMode::Combat
            && player.drawn_this_turn.len() < ctx.min_draw
            && !player.did_bust
        {
            return Err(CommandError::MinDrawNotMet);
        }
        self.conclude_day_action();
        Ok(())
    }

    /// Draw one cube from a helper's own bag into the active action.
    pub fn assist_draw(&mut self, seat: PlayerId) -> Result<(), CommandError> {
        self.ensure_live()?;
        self.require_unresolved_action()?;
        let ctx = self.state.turn_state.as_ref().ok_or(CommandError::NoActionInFlight)?;
        if seat == ctx.seat {
            return Err(CommandError::CannotAssist(seat));
        }
        self.require_stage(seat, Stage::Assist)?;
        if !ctx.helpers.allowed {
            return Err(CommandError::HelpersLocked);
        }

        let cube = self.pull_from_bag(seat)?;
        let ctx = self
            .state
            .turn_state
            .as_mut()
            .ok_or(CommandError::NoActionInFlight)?;
        ctx.helpers.draws.entry(seat).or_default().push(cube);
        self.update_bust_status();
        Ok(())
    }

    fn require_unresolved_action(&self) -> Result<(), CommandError> {
        match &self.state.turn_state {
            None => Err(CommandError::NoActionInFlight),
            Some(ctx) if ctx.resolved => Err(CommandError::ActionAlreadyResolved),
            Some(_) => Ok(()),
        }
    }

    fn pull_from_bag(&mut self, seat: PlayerId) -> Result<Cube, CommandError> {
        let bag_size = self.state.players[seat].bag.len();
        if bag_size == 0 {
            return Err(CommandError::EmptyBag(seat));
        }
        let index = self.rng.draw_index(bag_size);
        Ok(self.state.players[seat].bag.remove(index))
    }

    /// Reveal helper draws once the active seat has carried its own weight.
    fn unlock_helpers(&mut self) {
        let Some(ctx) = self.state.turn_state.as_ref() else {
            return;
        };
        if ctx.helpers.allowed {
            return;
        }
        let threshold = match ctx.mode {
            ActionMode::Combat => ctx.min_draw.max(1),
            _ => 1,
        };
        if self.state.players[ctx.seat].drawn_this_turn.len() >= threshold {
            if let Some(ctx) = self.state.turn_state.as_mut() {
                ctx.helpers.allowed = true;
            }
        }
    }

    /// Recompute the bust flag over the combined pool; a bust forces
    /// immediate resolution.
    fn update_bust_status(&mut self) {
        let Some(ctx) = self.state.turn_state.as_ref() else {
            return;
        };
        let seat = ctx.seat;
        let pool = self.gather_action_cubes(seat);
        let busted = is_bust(&pool);
        self.state.players[seat].did_bust = busted;
        if let Some(ctx) = self.state.turn_state.as_mut() {
            ctx.busted = busted;
        }
        if busted {
            self.conclude_day_action();
        }
    }

    /// Active seat's draws plus all helper draws, in seat order.
    fn gather_action_cubes(&self, seat: PlayerId) -> Vec<Cube> {
        let mut pool = self.state.players[seat].drawn_this_turn.clone();
        if let Some(ctx) = &self.state.turn_state {
            pool.extend(ctx.helpers.all_cubes());
        }
        pool
    }

    pub(crate) fn conclude_day_action(&mut self) {
        let Some(ctx) = self.state.turn_state.clone() else {
            return;
        };
        if ctx.resolved {
            return;
        }
        let outcome = self.resolve_activity(&ctx);
        if let Some(ctx) = self.state.turn_state.as_mut() {
            ctx.resolved = true;
        }
        if !outcome.is_empty() {
            self.state.push_log(outcome);
        }
        self.state.active_stage = ActiveStage::DuskAssign;
    }

    fn resolve_activity(&mut self, ctx: &ActionContext) -> String {
        if self.state.card(ctx.target).is_none() {
            return "Action fizzled: card missing.".to_string();
        }
        let message = match ctx.mode {
            ActionMode::Combat => self.resolve_combat(ctx),
            ActionMode::Recruit => self.resolve_recruit(ctx),
            ActionMode::Action => self.resolve_card_action(ctx),
        };
        self.transfer_helper_cubes(ctx.seat);
        self.cleanup_combat(ctx.seat);
        message
    }

    fn resolve_combat(&mut self, ctx: &ActionContext) -> String {
        let seat = ctx.seat;
        let threat = self.state.players[seat]
            .combat
            .as_ref()
            .map_or(0, |combat| combat.threat);

        let Some(card) = self.state.card(ctx.target) else {
            return "Action fizzled: card missing.".to_string();
        };
        let card_name = card.name.clone();
        let is_location = card.is_location();
        let affinity_bonus = self.state.players[seat].affinity_bonus(&card.affinities);

        let player_name = self.state.players[seat].name.clone();
        if self.state.players[seat].did_bust {
            self.restore_vermin(ctx.target, threat);
            self.state.adjust_conquest(1);
            return format!("{player_name} busts in combat at {card_name}. Conquest +1.");
        }

        let pool = self.gather_action_cubes(seat);
        let allied = count_allied(&pool) + affinity_bonus;
        if allied > threat {
            let mut message =
                format!("{player_name} wins combat at {card_name} (Vermin {threat}).");
            if threat >= 4 {
                self.state.adjust_conquest(-1);
                message.push_str(" Horde pushed back!");
            }
            if threat >= 7 && self.state.players[seat].promote_inexperience() {
                message.push_str(" Gained 1 Mastery.");
            }
            if is_location && threat > 0 {
                fire_hook(
                    &mut self.state,
                    &mut self.rng,
                    seat,
                    HookEvent::LocationVerminCleared { location: ctx.target },
                );
            }
            message.push_str(&self.advance_threat_stacks(ctx.target));
            return message;
        }

        self.restore_vermin(ctx.target, threat);
        self.state.adjust_conquest(1);
        format!("{player_name} is defeated at {card_name}. Conquest +1.")
    }

    fn restore_vermin(&mut self, target: CardUid, amount: usize) {
        if let Some(card) = self.state.card_mut(target) {
            card.vermin += amount;
        }
    }

    /// Progress the fortress and villain stacks after a combat win.
    fn advance_threat_stacks(&mut self, target: CardUid) -> String {
        let mut message = String::new();
        if matches!(&self.state.revealed_fortress, Some(fort) if fort.uid == target) {
            self.state.revealed_fortress = self.state.fortress_deck.pop();
            match &self.state.revealed_fortress {
                Some(next) => message.push_str(&format!(" {} emerges next.", next.name)),
                None => {
                    self.state.fortress_cleared = true;
                    message.push_str(" Fortress cleared!");
                }
            }
        }
        let villain_down = matches!(
            &self.state.revealed_villain,
            Some(villain) if villain.uid == target && villain.vermin == 0
        );
        if villain_down {
            self.state.villain_cleared = true;
            message.push_str(" Villain defeated!");
        }
        message
    }

    fn resolve_recruit(&mut self, ctx: &ActionContext) -> String {
        let seat = ctx.seat;
        let Some(card) = self.state.card(ctx.target) else {
            return "Action fizzled: card missing.".to_string();
        };
        let card_name = card.name.clone();
        let card_template = card.template.clone();
        let card_slots = card.slots;
        let card_affinities = card.affinities.clone();
        let (cost, critters, ability) = match &card.kind {
            CardKind::Hero {
                cost,
                critters,
                ability,
            } => (*cost, critters.clone(), *ability),
            _ => (0, Vec::<CubeCount>::new(), None),
        };

        let player = &mut self.state.players[seat];
        let player_name = player.name.clone();
        if player.did_bust {
            return format!("{player_name} busts before recruiting {card_name}.");
        }
        if player.tableau.len() >= 4 {
            return format!("{player_name} has no room to recruit {card_name}.");
        }
        let food = player
            .pending_cubes
            .iter()
            .filter(|cube| **cube == Cube::Food)
            .count();
        if food < cost {
            return format!("{player_name} needs {cost} Food to recruit {card_name}.");
        }
        spend_pending(&mut player.pending_cubes, Cube::Food, cost);

        player.tableau.push(Hero {
            template: card_template,
            name: card_name.clone(),
            slots: card_slots,
            cubes: SmallVec::new(),
            is_champion: false,
            affinities: card_affinities,
            ability,
        });
        for entry in &critters {
            player
                .bag
                .extend(std::iter::repeat(entry.cube).take(entry.count));
        }

        self.discard_from_row(ctx.target);
        self.state.refill_adventure_row();
        format!("{player_name} recruits {card_name}.")
    }

    fn resolve_card_action(&mut self, ctx: &ActionContext) -> String {
        let seat = ctx.seat;
        let Some(card) = self.state.card(ctx.target) else {
            return "Action fizzled: card missing.".to_string();
        };
        let card_name = card.name.clone();
        let reward = card.reward();
        let is_quest = card.is_quest();

        let player_name = self.state.players[seat].name.clone();
        if self.state.players[seat].did_bust {
            return format!("{player_name} busts while working {card_name}.");
        }
        if is_quest {
            return self.resolve_quest(ctx);
        }

        match reward {
            Some(ActionReward::Heal) => {
                let healed = self.heal_wounds(seat, 2);
                let player = &mut self.state.players[seat];
                player.must_visit_infirmary = false;
                player.exhaustion = false;
                if healed > 0 {
                    let plural = if healed > 1 { "s" } else { "" };
                    format!("{player_name} heals {healed} wound{plural} at {card_name}.")
                } else {
                    format!("{player_name} rests at {card_name}.")
                }
            }
            Some(ActionReward::Provisions(amount)) => {
                let player = &mut self.state.players[seat];
                player
                    .bag
                    .extend(std::iter::repeat(Cube::Food).take(amount));
                format!("{player_name} secures provisions at {card_name}.")
            }
            Some(ActionReward::Scouts(amount)) => {
                let player = &mut self.state.players[seat];
                player
                    .bag
                    .extend(std::iter::repeat(Cube::Mouse).take(amount));
                format!("{player_name} gathers scouts at {card_name}.")
            }
            None => format!("{player_name} completes {card_name}."),
        }
    }

    /// Remove up to `limit` wounds across tableau heroes, oldest first.
    fn heal_wounds(&mut self, seat: PlayerId, limit: usize) -> usize {
        let mut healed = 0;
        for hero in &mut self.state.players[seat].tableau {
            while healed < limit {
                let Some(pos) = hero.cubes.iter().position(|c| *c == Cube::Wound) else {
                    break;
                };
                hero.cubes.remove(pos);
                healed += 1;
            }
            if healed >= limit {
                break;
            }
        }
        healed
    }

    fn resolve_quest(&mut self, ctx: &ActionContext) -> String {
        let seat = ctx.seat;
        let Some(card) = self.state.card(ctx.target) else {
            return "Action fizzled: card missing.".to_string();
        };
        let card_name = card.name.clone();
        let card_template = card.template.clone();
        let (owner, goal, completed) = match &card.kind {
            CardKind::Quest {
                owner,
                goal,
                completed,
            } => (owner.clone(), goal.clone(), *completed),
            _ => return format!("{card_name} is not a quest."),
        };

        let player_name = self.state.players[seat].name.clone();
        if matches!(&owner, Some(owner) if *owner != self.state.players[seat].champion) {
            return format!("{player_name} cannot progress {card_name}.");
        }
        if completed {
            return format!("{card_name} already completed.");
        }

        let player = &mut self.state.players[seat];
        if !contribute_to_quest(&mut player.pending_cubes, goal.target, &goal.requires) {
            return format!(
                "{player_name} needs {} suitable cubes for {card_name}.",
                goal.target
            );
        }

        if let Some(card) = self.state.card_mut(ctx.target) {
            if let CardKind::Quest { completed, .. } = &mut card.kind {
                *completed = true;
            }
        }
        let player = &mut self.state.players[seat];
        for quest in &mut player.quests {
            if quest.quest == card_template {
                quest.complete = true;
            }
        }
        let reward = if player.promote_inexperience() {
            " Gains a Mastery cube."
        } else {
            ""
        };

        self.discard_from_row(ctx.target);
        self.state.refill_adventure_row();
        format!("{player_name} completes {card_name}!{reward}")
    }

    /// Hand helper draws over after resolution: inexperience stays with its
    /// owner, everything else joins the active seat's pending pool.
    fn transfer_helper_cubes(&mut self, seat: PlayerId) {
        let Some(ctx) = self.state.turn_state.as_mut() else {
            return;
        };
        let draws = std::mem::take(&mut ctx.helpers.draws);
        ctx.helpers.allowed = false;
        for (helper, cubes) in draws {
            for cube in cubes {
                if cube == Cube::Inexperience {
                    self.state.players[helper].pending_cubes.push(cube);
                } else {
                    self.state.players[seat].pending_cubes.push(cube);
                }
            }
        }
    }

    /// Pull undrawn provisional vermin back out of the bag after combat.
    fn cleanup_combat(&mut self, seat: PlayerId) {
        let player = &mut self.state.players[seat];
        let Some(combat) = player.combat.take() else {
            return;
        };
        let drawn_vermin = player
            .drawn_this_turn
            .iter()
            .filter(|cube| **cube == Cube::Vermin)
            .count();
        let undrawn = combat.threat.saturating_sub(drawn_vermin);
        player.remove_from_bag(Cube::Vermin, undrawn);
    }

    fn discover_location(&mut self, target: CardUid, template: &TemplateId) {
        if self.state.discovered_location(template).is_some() {
            return;
        }
        let Some(index) = self
            .state
            .adventure_row
            .iter()
            .position(|card| card.uid == target)
        else {
            return;
        };
        let card = self.state.adventure_row.remove(index);
        let name = card.name.clone();
        self.state.discovered.push(card);
        self.state.refill_adventure_row();
        self.state
            .push_log(format!("{name} is now a discovered location."));
    }

    /// Return every worker parked on `target` to `seat`'s bag.
    fn collect_workers(&mut self, seat: PlayerId, target: CardUid) {
        let Some(card) = self.state.card_mut(target) else {
            return;
        };
        let workers: Vec<Worker> = card.workers.drain(..).collect();
        let player = &mut self.state.players[seat];
        player.bag.extend(workers.into_iter().map(|worker| worker.cube));
    }

    fn discard_from_row(&mut self, target: CardUid) {
        if let Some(index) = self
            .state
            .adventure_row
            .iter()
            .position(|card| card.uid == target)
        {
            let card = self.state.adventure_row.remove(index);
            self.state.discard.push(card);
        }
    }
}

/// Spend `amount` cubes of `kind` from the pending pool, newest first.
fn spend_pending(pending: &mut Vec<Cube>, kind: Cube, amount: usize) {
    let mut remaining = amount;
    let mut i = pending.len();
    while i > 0 && remaining > 0 {
        i -= 1;
        if pending[i] == kind {
            pending.remove(i);
            remaining -= 1;
        }
    }
}

/// Reserve and spend a quest contribution from the pending pool.
///
/// Adverse cubes never qualify. Required kinds are reserved first; the rest
/// of the contribution fills from the earliest remaining eligible cubes.
/// Returns false (leaving the pool untouched) when the goal cannot be met.
fn contribute_to_quest(pending: &mut Vec<Cube>, target: usize, requires: &[Cube]) -> bool {
    if target == 0 {
        return false;
    }
    let eligible: Vec<usize> = pending
        .iter()
        .enumerate()
        .filter(|(_, cube)| !cube.is_adverse())
        .map(|(index, _)| index)
        .collect();
    if eligible.len() < target {
        return false;
    }

    let mut used: Vec<usize> = Vec::with_capacity(target);
    for kind in requires {
        let Some(index) = eligible
            .iter()
            .copied()
            .find(|i| !used.contains(i) && pending[*i] == *kind)
        else {
            return false;
        };
        used.push(index);
    }
    for index in eligible {
        if used.len() >= target {
            break;
        }
        if !used.contains(&index) {
            used.push(index);
        }
    }
    if used.len() < target {
        return false;
    }

    used.sort_unstable_by(|a, b| b.cmp(a));
    for index in used {
        pending.remove(index);
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_pending_takes_newest_first() {
        let mut pending = vec![Cube::Food, Cube::Mouse, Cube::Food, Cube::Food];
        spend_pending(&mut pending, Cube::Food, 2);
        assert_eq!(pending, vec![Cube::Food, Cube::Mouse]);
    }

    #[test]
    fn test_quest_contribution_reserves_required_kinds() {
        let mut pending = vec![Cube::Mouse, Cube::Squirrel, Cube::Food];
        assert!(contribute_to_quest(
            &mut pending,
            2,
            &[Cube::Mouse, Cube::Squirrel]
        ));
        assert_eq!(pending, vec![Cube::Food]);
    }

    #[test]
    fn test_quest_contribution_rejects_missing_requirement() {
        let mut pending = vec![Cube::Mouse, Cube::Food, Cube::Food];
        assert!(!contribute_to_quest(&mut pending, 2, &[Cube::Badger]));
        assert_eq!(pending.len(), 3);
    }

    #[test]
    fn test_quest_contribution_ignores_adverse_cubes() {
        let mut pending = vec![Cube::Wound, Cube::Vermin, Cube::Mouse];
        assert!(!contribute_to_quest(&mut pending, 2, &[]));
        assert_eq!(pending.len(), 3);

        pending.push(Cube::Food);
        assert!(contribute_to_quest(&mut pending, 2, &[]));
        assert_eq!(pending, vec![Cube::Wound, Cube::Vermin]);
    }

    #[test]
    fn test_quest_contribution_rejects_zero_target() {
        let mut pending = vec![Cube::Mouse];
        assert!(!contribute_to_quest(&mut pending, 0, &[]));
    }
}
