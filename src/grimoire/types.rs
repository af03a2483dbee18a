//! Grimoire state types: players, role instances and the whole game snapshot.

use serde::{Deserialize, Serialize};

use super::roles::{Capability, Category, RoleTemplate, Team};
use super::statuses::{Status, StatusKind};

/// Time of day. The numeric values match the order the clock runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Time {
    Night = 0,
    Day = 1,
    Vote = 2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Setup,
    Playing,
    Special,
    Victory,
    Defeat,
}

impl GameStatus {
    pub fn is_over(self) -> bool {
        matches!(self, GameStatus::Victory | GameStatus::Defeat)
    }
}

/// A role held by a player. The template is shared and immutable; alignment
/// overrides live on the instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleInstance {
    #[serde(rename = "name", with = "role_by_name")]
    pub template: &'static RoleTemplate,
    #[serde(default)]
    pub team: Option<Team>,
    #[serde(default)]
    pub category: Option<Category>,
    /// Borrowed from another player; reverts at the next dusk.
    #[serde(default)]
    pub inherited: bool,
}

impl RoleInstance {
    pub fn new(template: &'static RoleTemplate) -> Self {
        Self {
            template,
            team: None,
            category: None,
            inherited: false,
        }
    }

    pub fn name(&self) -> &'static str {
        self.template.name
    }

    pub fn team(&self) -> Team {
        self.team.unwrap_or(self.template.team)
    }

    pub fn category(&self) -> Category {
        self.category.unwrap_or(self.template.category)
    }

    pub fn has(&self, capability: Capability) -> bool {
        self.template.has(capability)
    }
}

mod role_by_name {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::grimoire::roles::{find_role, RoleTemplate};

    pub fn serialize<S: Serializer>(
        template: &&'static RoleTemplate,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(template.name)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<&'static RoleTemplate, D::Error> {
        let name = String::deserialize(deserializer)?;
        find_role(&name).ok_or_else(|| D::Error::custom(format!("unknown role: {name}")))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Codename; the identity key.
    pub name: String,
    #[serde(default)]
    pub real_name: Option<String>,
    pub alive: bool,
    /// What the player (and the table) believes they are.
    pub role: Option<RoleInstance>,
    /// What actually governs alignment.
    pub true_role: Option<RoleInstance>,
    #[serde(default)]
    pub old_roles: Vec<RoleInstance>,
    #[serde(default)]
    pub statuses: Vec<Status>,
    pub ghost_votes: u8,
    #[serde(default)]
    pub ability_uses: u32,
    #[serde(default)]
    pub knowledge: Vec<String>,
    /// Role changed during the current night; no second turn tonight.
    #[serde(default)]
    pub modified_tonight: bool,
}

impl Player {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            real_name: None,
            alive: true,
            role: None,
            true_role: None,
            old_roles: vec![],
            statuses: vec![],
            ghost_votes: 1,
            ability_uses: 0,
            knowledge: vec![],
            modified_tonight: false,
        }
    }

    /// Sets both the apparent and the true role to fresh instances.
    pub fn set_role(&mut self, template: &'static RoleTemplate) {
        self.role = Some(RoleInstance::new(template));
        self.true_role = Some(RoleInstance::new(template));
    }

    /// Replaces the role for good, remembering the previous one.
    pub fn update_role(&mut self, template: &'static RoleTemplate, ability_uses: u32) {
        if let Some(old) = self.true_role.take() {
            self.old_roles.push(old);
        }
        self.set_role(template);
        self.ability_uses = ability_uses;
        self.modified_tonight = true;
    }

    pub fn role_name(&self) -> &'static str {
        self.role.as_ref().map(RoleInstance::name).unwrap_or("")
    }

    pub fn true_role_name(&self) -> &'static str {
        self.true_role.as_ref().map(RoleInstance::name).unwrap_or("")
    }

    /// The apparent role grants this capability. Intoxication is checked
    /// separately.
    pub fn can(&self, capability: Capability) -> bool {
        self.role.as_ref().is_some_and(|r| r.has(capability))
    }

    /// The true role carries this capability.
    pub fn truly(&self, capability: Capability) -> bool {
        self.true_role.as_ref().is_some_and(|r| r.has(capability))
    }

    pub fn true_category(&self) -> Option<Category> {
        self.true_role.as_ref().map(RoleInstance::category)
    }

    pub fn true_team(&self) -> Option<Team> {
        self.true_role.as_ref().map(RoleInstance::team)
    }

    pub fn has_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind)
    }

    pub fn has_active_status(&self, kind: StatusKind) -> bool {
        self.statuses.iter().any(|s| s.kind == kind && s.is_active())
    }

    /// Uses left against the apparent role's cap; unlimited when uncapped.
    pub fn has_uses_left(&self) -> bool {
        match self.role.as_ref().and_then(|r| r.template.ability_uses) {
            Some(cap) => self.ability_uses < cap,
            None => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Nominee {
    Player(usize),
    /// Sentinel nomination of the moderator, meaningful with an Atheist.
    Storyteller,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoppingBlock {
    /// `None` after a tie: the tally still stands but nobody is executed.
    pub nominee: Option<Nominee>,
    pub votes: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lynch {
    pub player: usize,
    pub day: u32,
}

/// Why a night kill did or did not land. Tags feed flavour-text selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum KillReason {
    #[default]
    #[serde(rename = "")]
    None,
    #[serde(rename = "dead")]
    Dead,
    #[serde(rename = "protected")]
    Protected,
    #[serde(rename = "soldier")]
    Soldier,
    #[serde(rename = "soldier-null")]
    SoldierNull,
}

impl KillReason {
    pub fn tag(self) -> &'static str {
        match self {
            KillReason::None => "",
            KillReason::Dead => "dead",
            KillReason::Protected => "protected",
            KillReason::Soldier => "soldier",
            KillReason::SoldierNull => "soldier-null",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct KillOutcome {
    pub murder: bool,
    pub reason: KillReason,
}

impl KillOutcome {
    pub fn spared(reason: KillReason) -> Self {
        Self { murder: false, reason }
    }

    pub fn murdered(reason: KillReason) -> Self {
        Self { murder: true, reason }
    }
}

/// Where dawn resolution stands: the targeted seats still to process and the
/// summary so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DawnCursor {
    pub remaining: Vec<usize>,
    pub report: KillOutcome,
    /// Moderator rulings on ambiguous players this dawn: (seat, registers evil).
    #[serde(default)]
    pub rulings: Vec<(usize, bool)>,
}

/// A moderator decision the engine is waiting on, with everything needed to
/// continue once it arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
    MayorRedirect { mayor: usize, cursor: DawnCursor },
    FarmerSuccession { farmer: usize, cursor: DawnCursor },
    TeaLadyCheck {
        tea_lady: usize,
        victim: usize,
        suspect: usize,
        cursor: DawnCursor,
    },
    GamblerGuess { actor: usize, target: usize },
    SeerReading { actor: usize, pending: usize },
    HunterAim { hunter: usize },
    HunterVerdict { hunter: usize, target: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Special {
    /// Status to restore once the decision is settled.
    pub previous: GameStatus,
    pub decision: Decision,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub day: u32,
    pub time: Time,
    pub status: GameStatus,
    /// Position in `turn_order` during the night.
    pub turn: usize,
    pub turn_order: Vec<usize>,
    #[serde(default)]
    pub current_player: Option<usize>,
    #[serde(default)]
    pub selection: Vec<usize>,
    /// Moderator rulings on ambiguous Seer picks this turn: (seat, reads evil).
    #[serde(default)]
    pub seer_readings: Vec<(usize, bool)>,
    pub players: Vec<Player>,
    #[serde(default)]
    pub nominations: Vec<Nominee>,
    #[serde(default)]
    pub nominators: Vec<String>,
    #[serde(default)]
    pub chopping_block: Option<ChoppingBlock>,
    #[serde(default)]
    pub log: Vec<String>,
    /// Transient lines for the next popup; drained by `take_popup`.
    #[serde(default)]
    pub log_buffer: Vec<String>,
    /// The current seat's private result, flushed when the turn ends.
    #[serde(default)]
    pub turn_note: Option<String>,
    #[serde(default)]
    pub bluffs: Vec<String>,
    #[serde(default)]
    pub last_lynch: Option<Lynch>,
    #[serde(default)]
    pub last_death: Option<u32>,
    #[serde(default)]
    pub last_dawn: Option<KillOutcome>,
    #[serde(default)]
    pub infections: u32,
    #[serde(default)]
    pub special: Option<Special>,
}

impl GameState {
    pub fn new(names: &[String]) -> Self {
        Self {
            day: 0,
            time: Time::Night,
            status: GameStatus::Setup,
            turn: 0,
            turn_order: vec![],
            current_player: None,
            selection: vec![],
            seer_readings: vec![],
            players: names.iter().map(|n| Player::new(n)).collect(),
            nominations: vec![],
            nominators: vec![],
            chopping_block: None,
            log: vec![],
            log_buffer: vec![],
            turn_note: None,
            bluffs: vec![],
            last_lynch: None,
            last_death: None,
            last_dawn: None,
            infections: 0,
            special: None,
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.players.iter().position(|p| p.name == name)
    }

    pub fn living(&self) -> impl Iterator<Item = (usize, &Player)> {
        self.players.iter().enumerate().filter(|(_, p)| p.alive)
    }

    pub fn living_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// First living player whose true role carries the capability.
    pub fn living_holder(&self, capability: Capability) -> Option<usize> {
        self.living().find(|(_, p)| p.truly(capability)).map(|(i, _)| i)
    }

    pub fn in_play(&self, capability: Capability) -> bool {
        self.players.iter().any(|p| p.truly(capability))
    }

    pub fn living_in_category(&self, category: Category) -> Vec<usize> {
        self.living()
            .filter(|(_, p)| p.true_category() == Some(category))
            .map(|(i, _)| i)
            .collect()
    }

    pub fn public_log(&mut self, line: String) {
        self.log.push(line);
    }
}
