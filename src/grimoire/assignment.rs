//! Roster building and role assignment.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::engine::error::{GrimoireError, Result};

use super::oracle::seat_neighbours;
use super::roles::{
    find_role, roles_in, Capability, Category, RoleTemplate, Team, TurnOrder, CODENAMES,
    ROLE_CATALOG,
};
use super::statuses::{Status, StatusKind};
use super::table::{Table, Transition};
use super::types::{GameState, GameStatus, Player, RoleInstance};

pub const MIN_PLAYERS: usize = 5;

/// Number of bluffs handed to the werewolves.
pub const BLUFF_COUNT: usize = 3;

/// Outsider seats the Recruiter adds on top of the usual one.
const RECRUITED_OUTSIDERS: usize = 2;

/// The roles the moderator enabled, one pool per category.
#[derive(Debug, Clone, PartialEq)]
pub struct RolePools {
    pub villagers: Vec<&'static RoleTemplate>,
    pub outsiders: Vec<&'static RoleTemplate>,
    pub werewolves: Vec<&'static RoleTemplate>,
    pub minions: Vec<&'static RoleTemplate>,
}

impl Default for RolePools {
    fn default() -> Self {
        Self {
            villagers: roles_in(Category::Villager),
            outsiders: roles_in(Category::Outsider),
            werewolves: roles_in(Category::Werewolf),
            minions: roles_in(Category::Minion),
        }
    }
}

impl RolePools {
    /// Build pools from role names, checking each lands in its own category.
    pub fn from_names(
        villagers: &[String],
        outsiders: &[String],
        werewolves: &[String],
        minions: &[String],
    ) -> Result<Self> {
        let resolve = |names: &[String], category: Category| -> Result<Vec<&'static RoleTemplate>> {
            names
                .iter()
                .map(|name| {
                    let role =
                        find_role(name).ok_or_else(|| GrimoireError::UnknownRole(name.clone()))?;
                    if role.category != category {
                        return Err(GrimoireError::WrongPool {
                            role: name.clone(),
                            expected: category,
                        });
                    }
                    Ok(role)
                })
                .collect()
        };
        Ok(Self {
            villagers: resolve(villagers, Category::Villager)?,
            outsiders: resolve(outsiders, Category::Outsider)?,
            werewolves: resolve(werewolves, Category::Werewolf)?,
            minions: resolve(minions, Category::Minion)?,
        })
    }

    pub fn pool(&self, category: Category) -> &[&'static RoleTemplate] {
        match category {
            Category::Villager => &self.villagers,
            Category::Outsider => &self.outsiders,
            Category::Werewolf => &self.werewolves,
            Category::Minion => &self.minions,
        }
    }

    /// Whether the enabled pools satisfy a role's prerequisites.
    fn allows(&self, role: &RoleTemplate) -> bool {
        role.prerequisites
            .iter()
            .all(|p| self.pool(p.category).len() >= p.min_count)
    }
}

/// A fresh table in Setup. Codenames come from `pseudonyms` (shuffled), then
/// numbered fallbacks once they run out.
pub fn create_initial_state<R: Rng + ?Sized>(
    player_count: usize,
    pseudonyms: &[&str],
    rng: &mut R,
) -> GameState {
    let source: &[&str] = if pseudonyms.is_empty() { &CODENAMES } else { pseudonyms };
    let mut seen = HashSet::new();
    let mut names: Vec<String> = source
        .iter()
        .filter(|s| seen.insert(**s))
        .map(|s| s.to_string())
        .collect();
    names.shuffle(rng);
    names.truncate(player_count);
    let mut n = 1;
    while names.len() < player_count {
        let candidate = format!("Player {n}");
        if !names.contains(&candidate) {
            names.push(candidate);
        }
        n += 1;
    }
    GameState::new(&names)
}

pub fn add_player(state: &GameState, name: Option<&str>) -> Result<GameState> {
    if state.status != GameStatus::Setup {
        return Err(GrimoireError::NotInSetup);
    }
    let name = match name {
        Some(name) => name.to_string(),
        None => CODENAMES
            .iter()
            .map(|s| s.to_string())
            .chain((1..).map(|n| format!("Player {n}")))
            .find(|candidate| state.index_of(candidate).is_none())
            .unwrap_or_default(),
    };
    if state.index_of(&name).is_some() {
        return Err(GrimoireError::DuplicatePlayer(name));
    }
    let mut next = state.clone();
    next.players.push(Player::new(&name));
    Ok(next)
}

pub fn remove_player(state: &GameState, name: &str) -> Result<GameState> {
    if state.status != GameStatus::Setup {
        return Err(GrimoireError::NotInSetup);
    }
    let index = state
        .index_of(name)
        .ok_or_else(|| GrimoireError::UnknownPlayer(name.to_string()))?;
    let mut next = state.clone();
    next.players.remove(index);
    Ok(next)
}

/// Change a seat's codename, and optionally record who is sitting there.
pub fn rename_player(
    state: &GameState,
    name: &str,
    new_name: &str,
    real_name: Option<&str>,
) -> Result<GameState> {
    if state.status != GameStatus::Setup {
        return Err(GrimoireError::NotInSetup);
    }
    let index = state
        .index_of(name)
        .ok_or_else(|| GrimoireError::UnknownPlayer(name.to_string()))?;
    if new_name != name && state.index_of(new_name).is_some() {
        return Err(GrimoireError::DuplicatePlayer(new_name.to_string()));
    }
    let mut next = state.clone();
    let player = &mut next.players[index];
    player.name = new_name.to_string();
    if let Some(real_name) = real_name {
        player.real_name = Some(real_name.to_string());
    }
    Ok(next)
}

/// Roles still undrawn, per category.
struct Bag {
    remaining: [Vec<&'static RoleTemplate>; 4],
}

fn slot(category: Category) -> usize {
    match category {
        Category::Villager => 0,
        Category::Outsider => 1,
        Category::Werewolf => 2,
        Category::Minion => 3,
    }
}

impl Bag {
    fn new(pools: &RolePools) -> Self {
        let filtered = |category| {
            pools
                .pool(category)
                .iter()
                .copied()
                .filter(|r| pools.allows(r))
                .collect::<Vec<_>>()
        };
        Self {
            remaining: [
                filtered(Category::Villager),
                filtered(Category::Outsider),
                filtered(Category::Werewolf),
                filtered(Category::Minion),
            ],
        }
    }

    fn left(&self, category: Category) -> usize {
        self.remaining[slot(category)].len()
    }

    fn draw<R: Rng + ?Sized>(&mut self, category: Category, rng: &mut R) -> Option<&'static RoleTemplate> {
        let pool = &mut self.remaining[slot(category)];
        if pool.is_empty() {
            return None;
        }
        let i = rng.gen_range(0..pool.len());
        Some(pool.swap_remove(i))
    }

    /// Draw for a seat, falling back to another category when the seat's
    /// own pool is exhausted. Evil seats degrade to good ones.
    fn draw_for_seat<R: Rng + ?Sized>(
        &mut self,
        category: Category,
        rng: &mut R,
    ) -> Option<&'static RoleTemplate> {
        let fallbacks: &[Category] = match category {
            Category::Villager => &[Category::Outsider],
            Category::Outsider => &[Category::Villager],
            Category::Minion => &[Category::Villager, Category::Outsider],
            Category::Werewolf => &[],
        };
        if let Some(role) = self.draw(category, rng) {
            return Some(role);
        }
        for &fallback in fallbacks {
            if let Some(role) = self.draw(fallback, rng) {
                tracing::warn!(?category, ?fallback, role = role.name, "role pool exhausted, seat degraded");
                return Some(role);
            }
        }
        None
    }
}

/// Deal hidden roles and start the first night.
pub fn assign_roles<R: Rng + ?Sized>(
    state: &GameState,
    pools: &RolePools,
    rng: &mut R,
) -> Result<Transition> {
    let n = state.players.len();
    if n < MIN_PLAYERS {
        return Err(GrimoireError::TooFewPlayers(n));
    }
    if pools.werewolves.iter().all(|r| !pools.allows(r)) {
        return Err(GrimoireError::EmptyPool(Category::Werewolf));
    }

    let names: Vec<String> = state.players.iter().map(|p| p.name.clone()).collect();
    let mut fresh = GameState::new(&names);
    for (seat, old) in fresh.players.iter_mut().zip(&state.players) {
        seat.real_name = old.real_name.clone();
    }
    let mut table = Table::new(&fresh);

    let mut seats = deal_seats(n, pools, rng);
    let mut bag = Bag::new(pools);
    let mut decoys = vec![];
    let mut puppet = None;

    // Minions first: the Recruiter changes how many Outsider seats there are.
    let order = [Category::Minion, Category::Werewolf, Category::Outsider, Category::Villager];
    for category in order {
        let wanted: Vec<usize> = (0..n).filter(|&i| seats[i] == category).collect();
        for seat in wanted {
            let Some(role) = bag.draw_for_seat(category, rng) else {
                let unfilled = table.state.players.iter().filter(|p| p.true_role.is_none()).count();
                return Err(GrimoireError::PoolExhausted(unfilled));
            };
            if role.has(Capability::RecruitsOutsiders) {
                recruit(&mut seats, &bag, rng);
            }
            if role.has(Capability::Decoy) {
                decoys.push((seat, role));
                continue;
            }
            if role.has(Capability::Impersonates) {
                puppet = Some(seat);
            }
            table.state.players[seat].set_role(role);
        }
    }

    for (seat, decoy) in decoys {
        table.state.players[seat].set_role(decoy);
        let disguise = disguise(&mut bag, rng);
        table.state.players[seat].role = disguise.map(RoleInstance::new);
    }

    if let Some(seat) = puppet {
        seat_puppet(&mut table.state, seat, &mut bag, rng);
    }

    mark_random_good(&mut table.state, Capability::FooledByRedHerring, StatusKind::RedHerring, false, rng);
    mark_random_good(&mut table.state, Capability::TracksGrandchild, StatusKind::Grandchild, true, rng);

    table.state.bluffs = pick_bluffs(&table.state, rng);
    table.state.turn_order = turn_order(&table.state);

    table.state.status = GameStatus::Playing;
    table.state.day = 1;
    tracing::debug!(
        players = n,
        roles = ?table.state.players.iter().map(|p| p.true_role_name()).collect::<Vec<_>>(),
        "roles assigned"
    );
    table.emit("roles_assigned", None, serde_json::json!({ "players": n }));
    table.open_night(rng);
    Ok(table.finish())
}

/// Category per seat: a third of the table is evil (one Werewolf, the rest
/// Minions), one good seat is an Outsider, everyone else a Villager.
fn deal_seats<R: Rng + ?Sized>(n: usize, pools: &RolePools, rng: &mut R) -> Vec<Category> {
    let mut seats = vec![Category::Villager; n];
    let mut shuffled: Vec<usize> = (0..n).collect();
    shuffled.shuffle(rng);
    let (evil, good) = shuffled.split_at(n / 3);
    for (k, &seat) in evil.iter().enumerate() {
        seats[seat] = if k == 0 { Category::Werewolf } else { Category::Minion };
    }
    if !pools.outsiders.is_empty() {
        if let Some(&seat) = good.first() {
            seats[seat] = Category::Outsider;
        }
    }
    seats
}

/// Turn Villager seats into Outsider seats, as far as the Outsider pool can
/// fill them.
fn recruit<R: Rng + ?Sized>(seats: &mut [Category], bag: &Bag, rng: &mut R) {
    let outsider_seats = seats.iter().filter(|&&c| c == Category::Outsider).count();
    let room = bag.left(Category::Outsider).saturating_sub(outsider_seats);
    let mut villagers: Vec<usize> = (0..seats.len())
        .filter(|&i| seats[i] == Category::Villager)
        .collect();
    villagers.shuffle(rng);
    for &seat in villagers.iter().take(RECRUITED_OUTSIDERS.min(room)) {
        seats[seat] = Category::Outsider;
    }
}

/// A Villager role for someone who will believe they hold it.
fn disguise<R: Rng + ?Sized>(bag: &mut Bag, rng: &mut R) -> Option<&'static RoleTemplate> {
    bag.draw(Category::Villager, rng)
        .or_else(|| roles_in(Category::Villager).choose(rng).copied())
}

/// The Puppet believes they are a Villager and must sit next to the
/// werewolf; if not, they trade places with one of the werewolf's neighbours.
fn seat_puppet<R: Rng + ?Sized>(state: &mut GameState, seat: usize, bag: &mut Bag, rng: &mut R) {
    let n = state.players.len();
    let Some(wolf) = state
        .players
        .iter()
        .position(|p| p.true_category() == Some(Category::Werewolf))
    else {
        return;
    };
    let (left, right) = seat_neighbours(n, wolf);
    let mut seat = seat;
    if seat != left && seat != right {
        let Some(&swap) = [left, right].choose(rng) else {
            return;
        };
        let (a, b) = (seat.min(swap), seat.max(swap));
        let (head, tail) = state.players.split_at_mut(b);
        let (first, second) = (&mut head[a], &mut tail[0]);
        std::mem::swap(&mut first.role, &mut second.role);
        std::mem::swap(&mut first.true_role, &mut second.true_role);
        std::mem::swap(&mut first.statuses, &mut second.statuses);
        seat = swap;
    }

    let player = &mut state.players[seat];
    player.role = disguise(bag, rng).map(RoleInstance::new);
    player.statuses.retain(|s| s.kind != StatusKind::Marionette);
    player.statuses.push(Status::new(StatusKind::Marionette));
}

/// If a player's true role has `trigger`, mark one random good player.
fn mark_random_good<R: Rng + ?Sized>(
    state: &mut GameState,
    trigger: Capability,
    kind: StatusKind,
    exclude_holder: bool,
    rng: &mut R,
) {
    let Some(holder) = state.players.iter().position(|p| p.truly(trigger)) else {
        return;
    };
    let candidates: Vec<usize> = (0..state.players.len())
        .filter(|&i| state.players[i].true_team() == Some(Team::Good))
        .filter(|&i| !exclude_holder || i != holder)
        .collect();
    if let Some(&i) = candidates.choose(rng) {
        state.players[i].statuses.push(Status::new(kind));
    }
}

/// Good roles nobody holds or believes they hold, never a decoy.
fn pick_bluffs<R: Rng + ?Sized>(state: &GameState, rng: &mut R) -> Vec<String> {
    let in_play = |name: &str| {
        state
            .players
            .iter()
            .any(|p| p.role_name() == name || p.true_role_name() == name)
    };
    let mut candidates: Vec<&str> = ROLE_CATALOG
        .iter()
        .filter(|r| r.team == Team::Good && !r.has(Capability::Decoy) && !in_play(r.name))
        .map(|r| r.name)
        .collect();
    candidates.shuffle(rng);
    candidates
        .into_iter()
        .take(BLUFF_COUNT)
        .map(str::to_string)
        .collect()
}

/// Night order: stable by turn-order class, then each `Before(c)` seat is
/// moved in front of the first seat of category `c`.
pub fn turn_order(state: &GameState) -> Vec<usize> {
    let order_of = |i: usize| {
        state.players[i]
            .true_role
            .as_ref()
            .map(|r| r.template.order)
            .unwrap_or(TurnOrder::Default)
    };
    let mut sorted: Vec<usize> = (0..state.players.len()).collect();
    sorted.sort_by_key(|&i| order_of(i).rank());

    let (spliced, mut order): (Vec<usize>, Vec<usize>) = sorted
        .into_iter()
        .partition(|&i| matches!(order_of(i), TurnOrder::Before(_)));
    for seat in spliced {
        let TurnOrder::Before(category) = order_of(seat) else {
            continue;
        };
        let at = order
            .iter()
            .position(|&i| state.players[i].true_category() == Some(category))
            .unwrap_or(order.len());
        order.insert(at, seat);
    }
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grimoire::oracle::{is_evil, QueryOptions, Verdict};
    use crate::grimoire::types::Time;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn roster(n: usize) -> GameState {
        create_initial_state(n, &[], &mut StdRng::seed_from_u64(0))
    }

    fn count(state: &GameState, category: Category) -> usize {
        state
            .players
            .iter()
            .filter(|p| p.true_category() == Some(category))
            .count()
    }

    #[test]
    fn test_create_initial_state() {
        let state = roster(7);
        assert_eq!(state.players.len(), 7);
        assert_eq!(state.status, GameStatus::Setup);
        assert_eq!(state.day, 0);
        assert!(state.players.iter().all(|p| p.alive && p.ghost_votes == 1));

        let big = roster(25);
        assert_eq!(big.players.len(), 25);
        let mut names: Vec<_> = big.players.iter().map(|p| p.name.clone()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 25);
    }

    #[test]
    fn test_repeated_pseudonyms_are_seated_once() {
        let pseudonyms = ["Ash", "Birch", "Ash", "Cedar", "Dune", "Elm"];
        for seed in 0..50 {
            let state = create_initial_state(5, &pseudonyms, &mut StdRng::seed_from_u64(seed));
            let mut names: Vec<_> = state.players.iter().map(|p| p.name.as_str()).collect();
            names.sort();
            names.dedup();
            assert_eq!(names.len(), 5, "seed {seed}");
        }

        let state = create_initial_state(4, &["Ash", "Ash"], &mut StdRng::seed_from_u64(1));
        let mut names: Vec<_> = state.players.iter().map(|p| p.name.clone()).collect();
        names.sort();
        assert_eq!(names, ["Ash", "Player 1", "Player 2", "Player 3"]);
    }

    #[test]
    fn test_role_counts_for_every_table_size() {
        for n in 5..=15 {
            for seed in 0..20 {
                let mut rng = StdRng::seed_from_u64(seed);
                let t = assign_roles(&roster(n), &RolePools::default(), &mut rng).unwrap();
                let state = t.state;
                assert_eq!(count(&state, Category::Werewolf), 1, "n={n} seed={seed}");
                assert_eq!(count(&state, Category::Minion) > 0, n >= 6, "n={n} seed={seed}");
                assert_eq!(count(&state, Category::Minion), n / 3 - 1);
                assert!(count(&state, Category::Villager) > 0);
                assert!(count(&state, Category::Outsider) > 0);
                assert!(state.players.iter().all(|p| p.role.is_some() && p.true_role.is_some()));
            }
        }
    }

    #[test]
    fn test_assignment_starts_the_first_night() {
        let t = assign_roles(&roster(7), &RolePools::default(), &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(t.state.status, GameStatus::Playing);
        assert_eq!(t.state.day, 1);
        assert_eq!(t.state.time, Time::Night);
        assert_eq!(t.state.turn, 0);
        assert_eq!(t.state.current_player, Some(t.state.turn_order[0]));
        assert_eq!(t.state.bluffs.len(), BLUFF_COUNT);
    }

    #[test]
    fn test_turn_order_is_a_permutation() {
        let t = assign_roles(&roster(12), &RolePools::default(), &mut StdRng::seed_from_u64(9)).unwrap();
        let mut order = t.state.turn_order.clone();
        order.sort();
        assert_eq!(order, (0..12).collect::<Vec<_>>());
    }

    #[test]
    fn test_too_few_players() {
        let err = assign_roles(&roster(4), &RolePools::default(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(err, Err(GrimoireError::TooFewPlayers(4))));
    }

    #[test]
    fn test_decoys_believe_they_are_villagers() {
        let pools = RolePools {
            outsiders: vec![find_role("Drunk").unwrap()],
            ..RolePools::default()
        };
        for seed in 0..10 {
            let t = assign_roles(&roster(6), &pools, &mut StdRng::seed_from_u64(seed)).unwrap();
            let drunk = t
                .state
                .players
                .iter()
                .find(|p| p.true_role_name() == "Drunk")
                .unwrap();
            assert_eq!(drunk.role.as_ref().unwrap().category(), Category::Villager);
            assert_ne!(drunk.role_name(), "Drunk");
            assert!(!t.state.bluffs.iter().any(|b| b == "Drunk"));
        }
    }

    #[test]
    fn test_puppet_sits_next_to_the_werewolf() {
        let pools = RolePools {
            minions: vec![find_role("Puppet").unwrap()],
            ..RolePools::default()
        };
        for seed in 0..20 {
            let t = assign_roles(&roster(9), &pools, &mut StdRng::seed_from_u64(seed)).unwrap();
            let state = t.state;
            let wolf = state
                .players
                .iter()
                .position(|p| p.true_category() == Some(Category::Werewolf))
                .unwrap();
            let puppet = state
                .players
                .iter()
                .position(|p| p.has_status(StatusKind::Marionette))
                .unwrap();
            assert_eq!(state.players[puppet].true_role_name(), "Puppet");
            assert_eq!(state.players[puppet].role.as_ref().unwrap().category(), Category::Villager);
            let (l, r) = seat_neighbours(9, wolf);
            assert!(puppet == l || puppet == r, "seed={seed}");
        }
    }

    #[test]
    fn test_recruiter_adds_outsiders() {
        let pools = RolePools {
            minions: vec![find_role("Recruiter").unwrap()],
            ..RolePools::default()
        };
        let t = assign_roles(&roster(9), &pools, &mut StdRng::seed_from_u64(2)).unwrap();
        assert_eq!(count(&t.state, Category::Outsider), 3);
    }

    #[test]
    fn test_recruiter_prerequisites() {
        let pools = RolePools {
            outsiders: vec![find_role("Saint").unwrap()],
            minions: vec![find_role("Recruiter").unwrap(), find_role("Spy").unwrap()],
            ..RolePools::default()
        };
        for seed in 0..10 {
            let t = assign_roles(&roster(6), &pools, &mut StdRng::seed_from_u64(seed)).unwrap();
            assert!(t.state.players.iter().all(|p| p.true_role_name() != "Recruiter"));
        }
    }

    #[test]
    fn test_red_herring_lands_on_a_good_player() {
        let pools = RolePools {
            villagers: vec![find_role("Seer").unwrap(), find_role("Soldier").unwrap(), find_role("Mayor").unwrap(), find_role("Hermit").unwrap()],
            ..RolePools::default()
        };
        for seed in 0..10 {
            let t = assign_roles(&roster(6), &pools, &mut StdRng::seed_from_u64(seed)).unwrap();
            if !t.state.in_play(Capability::FooledByRedHerring) {
                continue;
            }
            let herrings: Vec<_> = t
                .state
                .players
                .iter()
                .filter(|p| p.has_status(StatusKind::RedHerring))
                .collect();
            assert_eq!(herrings.len(), 1);
            assert_eq!(herrings[0].true_team(), Some(Team::Good));
            assert_eq!(is_evil(herrings[0], QueryOptions::seer()), Verdict::True);
        }
    }

    #[test]
    fn test_exhausted_pool_degrades() {
        let pools = RolePools {
            villagers: vec![find_role("Seer").unwrap()],
            outsiders: roles_in(Category::Outsider),
            ..RolePools::default()
        };
        let t = assign_roles(&roster(6), &pools, &mut StdRng::seed_from_u64(1)).unwrap();
        assert!(t.state.players.iter().all(|p| p.true_role.is_some()));

        let starved = RolePools {
            villagers: vec![find_role("Seer").unwrap()],
            outsiders: vec![find_role("Saint").unwrap()],
            ..RolePools::default()
        };
        let err = assign_roles(&roster(9), &starved, &mut StdRng::seed_from_u64(1));
        assert!(matches!(err, Err(GrimoireError::PoolExhausted(_))));
    }

    #[test]
    fn test_turn_order_classes() {
        let names: Vec<String> = (0..6).map(|i| format!("p{i}")).collect();
        let mut state = GameState::new(&names);
        for (p, r) in state
            .players
            .iter_mut()
            .zip(["Werewolf", "Butler", "Gambler", "Poisoner", "Seer", "Doctor"])
        {
            p.set_role(find_role(r).unwrap());
        }
        // First, Early, Default, [Gambler before Werewolf], Last; Late sits between.
        assert_eq!(turn_order(&state), vec![3, 5, 4, 1, 2, 0]);
    }

    #[test]
    fn test_pools_from_names() {
        let ok = RolePools::from_names(
            &["Seer".into()],
            &["Saint".into()],
            &["Werewolf".into()],
            &["Spy".into()],
        )
        .unwrap();
        assert_eq!(ok.villagers[0].name, "Seer");

        let wrong = RolePools::from_names(&["Saint".into()], &[], &[], &[]);
        assert!(matches!(wrong, Err(GrimoireError::WrongPool { .. })));
        let unknown = RolePools::from_names(&["Jester".into()], &[], &[], &[]);
        assert!(matches!(unknown, Err(GrimoireError::UnknownRole(_))));
    }

    #[test]
    fn test_roster_edits_only_in_setup() {
        let state = roster(5);
        let added = add_player(&state, Some("Zed")).unwrap();
        assert_eq!(added.players.len(), 6);
        assert!(matches!(add_player(&added, Some("Zed")), Err(GrimoireError::DuplicatePlayer(_))));
        let auto = add_player(&added, None).unwrap();
        assert_eq!(auto.players.len(), 7);

        let renamed = rename_player(&added, "Zed", "Yara", Some("Alex")).unwrap();
        let yara = &renamed.players[renamed.index_of("Yara").unwrap()];
        assert_eq!(yara.real_name.as_deref(), Some("Alex"));

        let removed = remove_player(&renamed, "Yara").unwrap();
        assert_eq!(removed.players.len(), 5);
        assert!(matches!(remove_player(&removed, "Yara"), Err(GrimoireError::UnknownPlayer(_))));

        let playing = assign_roles(&removed, &RolePools::default(), &mut StdRng::seed_from_u64(0))
            .unwrap()
            .state;
        assert!(matches!(add_player(&playing, None), Err(GrimoireError::NotInSetup)));
        assert!(matches!(remove_player(&playing, "x"), Err(GrimoireError::NotInSetup)));
    }
}
