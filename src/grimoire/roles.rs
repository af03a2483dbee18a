//! Role catalog: immutable templates for every role the grimoire knows about.
//!
//! The engine never compares role names. Behaviour is attached through
//! [`Capability`] tags, so a new role is a new catalog entry plus, at most, a
//! new tag handled in one place.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Good,
    Evil,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Villager,
    Outsider,
    Werewolf,
    Minion,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Villager,
        Category::Outsider,
        Category::Werewolf,
        Category::Minion,
    ];

    pub fn team(self) -> Team {
        match self {
            Category::Villager | Category::Outsider => Team::Good,
            Category::Werewolf | Category::Minion => Team::Evil,
        }
    }
}

/// Night scheduling class. `Before(c)` is spliced in front of the first seat
/// of category `c` once the other classes are sorted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnOrder {
    First,
    Early,
    Default,
    Late,
    Last,
    Before(Category),
}

impl TurnOrder {
    /// Sort key for the plain classes. `Before` entries sit in the default
    /// slot until they are spliced.
    pub fn rank(self) -> u8 {
        match self {
            TurnOrder::First => 0,
            TurnOrder::Early => 1,
            TurnOrder::Default | TurnOrder::Before(_) => 2,
            TurnOrder::Late => 3,
            TurnOrder::Last => 4,
        }
    }
}

/// Extra eligibility rule on top of the night text / delay / use cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Condition {
    /// Only usable once the holder is dead.
    WhileDead,
    /// Only on the night after an execution.
    AfterExecution,
    /// Blocked on the night right after any death.
    NoDeathYesterday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    // Night actions that put a status on the target.
    KillsAtNight,
    Poisons,
    Protects,
    ChoosesPatron,
    // Night actions with bespoke resolution.
    ReadsPair,
    GuessesRoles,
    LearnsRole,
    // Passive night information.
    LearnsExecuted,
    SensesNeighbours,
    TracksGrandchild,
    // Reactions to a kill.
    ImmuneToNightKill,
    RedirectsKills,
    PassesOnRole,
    CheatsDeath,
    ProtectsNeighbours,
    InheritsWerewolf,
    InfectsOutsiders,
    // Execution and endgame rules.
    LosesIfExecuted,
    ClaimsExecution,
    DevoursExecuted,
    WinsWithThreeAlive,
    StorytellerNominable,
    // Day actions.
    PublicKill,
    // Setup and registration quirks.
    FooledByRedHerring,
    RecruitsOutsiders,
    Impersonates,
    Decoy,
    ReadsEvil,
    MisreadsAlignment,
}

/// Minimum number of enabled roles of a category the role needs to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prerequisite {
    pub category: Category,
    pub min_count: usize,
}

#[derive(Debug, Clone)]
pub struct RoleTemplate {
    pub name: &'static str,
    pub description: &'static str,
    pub team: Team,
    pub category: Category,
    pub icon: &'static str,
    pub night: Option<&'static str>,
    pub day: Option<&'static str>,
    pub ability_uses: Option<u32>,
    /// Nights to wait before the first eligible use.
    pub delay: u32,
    pub condition: Option<Condition>,
    pub order: TurnOrder,
    pub prerequisites: &'static [Prerequisite],
    pub capabilities: &'static [Capability],
}

impl RoleTemplate {
    pub fn has(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}

impl PartialEq for RoleTemplate {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn base(name: &'static str, category: Category, description: &'static str) -> RoleTemplate {
    RoleTemplate {
        name,
        description,
        team: category.team(),
        category,
        icon: "",
        night: None,
        day: None,
        ability_uses: None,
        delay: 0,
        condition: None,
        order: TurnOrder::Default,
        prerequisites: &[],
        capabilities: &[],
    }
}

use Capability::*;
use Category::{Minion, Outsider, Villager, Werewolf};

pub static ROLE_CATALOG: Lazy<Vec<RoleTemplate>> = Lazy::new(|| {
    vec![
        // Villagers
        RoleTemplate {
            icon: "seer",
            night: Some("Choose two players: learn how many of them are evil."),
            capabilities: &[ReadsPair, FooledByRedHerring],
            ..base(
                "Seer",
                Villager,
                "Each night, choose two players: you learn how many of them are evil. \
                 One good player registers as evil to you.",
            )
        },
        RoleTemplate {
            icon: "doctor",
            night: Some("Choose a player other than yourself: they are safe from werewolves tonight."),
            delay: 1,
            order: TurnOrder::Early,
            capabilities: &[Protects],
            ..base(
                "Doctor",
                Villager,
                "Each night except the first, choose another player: they are safe from werewolves tonight.",
            )
        },
        RoleTemplate {
            icon: "soldier",
            capabilities: &[ImmuneToNightKill],
            ..base("Soldier", Villager, "You are safe from werewolves.")
        },
        RoleTemplate {
            icon: "mayor",
            capabilities: &[RedirectsKills, WinsWithThreeAlive],
            ..base(
                "Mayor",
                Villager,
                "If only 3 players live and no execution occurs, your team wins. \
                 If you are killed at night, another player might die instead.",
            )
        },
        RoleTemplate {
            icon: "farmer",
            capabilities: &[PassesOnRole],
            ..base(
                "Farmer",
                Villager,
                "If you die at night, a living good player becomes a Farmer.",
            )
        },
        RoleTemplate {
            icon: "hunter",
            day: Some("Publicly choose a player: if they are a werewolf, they die."),
            ability_uses: Some(1),
            capabilities: &[PublicKill],
            ..base(
                "Hunter",
                Villager,
                "Once per game, during the day, publicly choose a player: if they are a werewolf, they die.",
            )
        },
        RoleTemplate {
            icon: "gambler",
            night: Some("Choose a player and guess their role: if you guess wrong, you die."),
            delay: 1,
            order: TurnOrder::Before(Werewolf),
            capabilities: &[GuessesRoles],
            ..base(
                "Gambler",
                Villager,
                "Each night except the first, choose a player and guess their role: if you guess wrong, you die.",
            )
        },
        RoleTemplate {
            icon: "undertaker",
            night: Some("Learn which role was executed today."),
            delay: 1,
            condition: Some(Condition::AfterExecution),
            order: TurnOrder::Late,
            capabilities: &[LearnsExecuted],
            ..base(
                "Undertaker",
                Villager,
                "Each night except the first, you learn which role died by execution today.",
            )
        },
        RoleTemplate {
            icon: "tea_lady",
            capabilities: &[ProtectsNeighbours],
            ..base(
                "Tea Lady",
                Villager,
                "If both your living neighbours are good, they cannot die.",
            )
        },
        RoleTemplate {
            icon: "nain",
            night: Some("Learn who your grandchild is."),
            ability_uses: Some(1),
            order: TurnOrder::Early,
            capabilities: &[TracksGrandchild],
            ..base(
                "Nain",
                Villager,
                "You start knowing a good player and their role. If the werewolves kill them, you die too.",
            )
        },
        RoleTemplate {
            icon: "cannibal",
            capabilities: &[DevoursExecuted],
            ..base(
                "Cannibal",
                Villager,
                "You have the ability of the recently executed player, until the next execution.",
            )
        },
        RoleTemplate {
            icon: "atheist",
            capabilities: &[StorytellerNominable],
            ..base(
                "Atheist",
                Villager,
                "The Storyteller can break the game rules. If executed, good wins, even if you are dead.",
            )
        },
        RoleTemplate {
            icon: "hermit",
            night: Some("Learn how many of your living neighbours are evil."),
            delay: 1,
            condition: Some(Condition::NoDeathYesterday),
            capabilities: &[SensesNeighbours],
            ..base(
                "Hermit",
                Villager,
                "Each night, unless someone died yesterday, learn how many of your living neighbours are evil.",
            )
        },
        RoleTemplate {
            icon: "ravenkeeper",
            night: Some("If you are dead, choose a player: learn their role."),
            ability_uses: Some(1),
            condition: Some(Condition::WhileDead),
            capabilities: &[LearnsRole],
            ..base(
                "Ravenkeeper",
                Villager,
                "Once you are dead, you may wake once at night to choose a player: you learn their role.",
            )
        },
        // Outsiders
        RoleTemplate {
            icon: "drunk",
            capabilities: &[Decoy],
            ..base(
                "Drunk",
                Outsider,
                "You do not know you are the Drunk. You think you are a Villager, but you are not.",
            )
        },
        RoleTemplate {
            icon: "lunatic",
            capabilities: &[Decoy, ReadsEvil],
            ..base(
                "Lunatic",
                Outsider,
                "You think you are a Villager, but you are not. You register as evil.",
            )
        },
        RoleTemplate {
            icon: "saint",
            capabilities: &[LosesIfExecuted],
            ..base("Saint", Outsider, "If you die by execution, your team loses.")
        },
        RoleTemplate {
            icon: "butler",
            night: Some("Choose a player other than yourself: tomorrow you may only vote if they do."),
            order: TurnOrder::Late,
            capabilities: &[ChoosesPatron],
            ..base(
                "Butler",
                Outsider,
                "Each night, choose a player (not yourself): tomorrow, you may only vote if they are voting too.",
            )
        },
        RoleTemplate {
            icon: "fool",
            ability_uses: Some(1),
            capabilities: &[CheatsDeath],
            ..base("Fool", Outsider, "The first time you die, you don't.")
        },
        RoleTemplate {
            icon: "recluse",
            capabilities: &[MisreadsAlignment],
            ..base(
                "Recluse",
                Outsider,
                "You might register as evil and as a Werewolf or Minion, even if dead.",
            )
        },
        // Werewolves
        RoleTemplate {
            icon: "werewolf",
            night: Some("Choose a player: they die."),
            delay: 1,
            order: TurnOrder::Last,
            capabilities: &[KillsAtNight],
            ..base(
                "Werewolf",
                Werewolf,
                "Each night except the first, choose a player: they die. If you kill yourself, a Minion becomes the Werewolf.",
            )
        },
        RoleTemplate {
            icon: "dragulf",
            night: Some("Choose a player: they die."),
            delay: 1,
            ability_uses: Some(1),
            order: TurnOrder::Last,
            capabilities: &[KillsAtNight, CheatsDeath],
            ..base(
                "Dragulf",
                Werewolf,
                "Each night except the first, choose a player: they die. The first time you die, you don't.",
            )
        },
        RoleTemplate {
            icon: "alpha_wolf",
            night: Some("Choose a player: they die."),
            delay: 1,
            order: TurnOrder::Last,
            prerequisites: &[Prerequisite { category: Outsider, min_count: 1 }],
            capabilities: &[KillsAtNight, InfectsOutsiders],
            ..base(
                "Alpha Wolf",
                Werewolf,
                "Each night except the first, choose a player: they die. If they are an Outsider, \
                 they become an evil Alpha Wolf and you die instead.",
            )
        },
        // Minions
        RoleTemplate {
            icon: "poisoner",
            night: Some("Choose a player: they are poisoned tonight and tomorrow day."),
            order: TurnOrder::First,
            capabilities: &[Poisons],
            ..base(
                "Poisoner",
                Minion,
                "Each night, choose a player: they are poisoned tonight and tomorrow day.",
            )
        },
        RoleTemplate {
            icon: "scarlet_woman",
            capabilities: &[InheritsWerewolf],
            ..base(
                "Scarlet Woman",
                Minion,
                "If there are 5 or more players and the Werewolf dies, you become the Werewolf.",
            )
        },
        RoleTemplate {
            icon: "recruiter",
            prerequisites: &[
                Prerequisite { category: Outsider, min_count: 3 },
                Prerequisite { category: Villager, min_count: 3 },
            ],
            capabilities: &[RecruitsOutsiders],
            ..base("Recruiter", Minion, "There are extra Outsiders in play. [+2 Outsiders]")
        },
        RoleTemplate {
            icon: "puppet",
            capabilities: &[Impersonates],
            ..base(
                "Puppet",
                Minion,
                "You think you are a good Villager, but you are not. You sit next to the Werewolf.",
            )
        },
        RoleTemplate {
            icon: "spy",
            capabilities: &[MisreadsAlignment],
            ..base(
                "Spy",
                Minion,
                "You might register as good and as a Villager or Outsider, even if dead.",
            )
        },
        RoleTemplate {
            icon: "goblin",
            day: Some("Publicly claim to be the Goblin: if you are executed today, your team wins."),
            capabilities: &[ClaimsExecution],
            ..base(
                "Goblin",
                Minion,
                "If you publicly claimed to be the Goblin when nominated and are executed that day, your team wins.",
            )
        },
    ]
});

pub static ROLE_LOOKUP: Lazy<HashMap<&'static str, &'static RoleTemplate>> =
    Lazy::new(|| ROLE_CATALOG.iter().map(|r| (r.name, r)).collect());

pub fn find_role(name: &str) -> Option<&'static RoleTemplate> {
    ROLE_LOOKUP.get(name).copied()
}

/// Every catalog role of the given category, in catalog order.
pub fn roles_in(category: Category) -> Vec<&'static RoleTemplate> {
    ROLE_CATALOG.iter().filter(|r| r.category == category).collect()
}

/// Default codenames handed out when the host does not name the seats.
pub const CODENAMES: [&str; 20] = [
    "Ash", "Birch", "Cedar", "Dune", "Ember", "Fern", "Glade", "Hollow", "Iris", "Juniper",
    "Kestrel", "Lichen", "Moss", "Nettle", "Oak", "Pike", "Quill", "Rowan", "Sorrel", "Thistle",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_unique() {
        assert_eq!(ROLE_LOOKUP.len(), ROLE_CATALOG.len());
    }

    #[test]
    fn test_every_category_is_populated() {
        for category in Category::ALL {
            assert!(!roles_in(category).is_empty(), "{category:?} has no roles");
        }
    }

    #[test]
    fn test_team_follows_category() {
        for role in ROLE_CATALOG.iter() {
            assert_eq!(role.team, role.category.team(), "{}", role.name);
        }
    }

    #[test]
    fn test_capability_lookup() {
        let seer = find_role("Seer").unwrap();
        assert!(seer.has(Capability::ReadsPair));
        assert!(!seer.has(Capability::KillsAtNight));
        assert!(find_role("Nobody").is_none());
    }

    #[test]
    fn test_turn_order_ranks() {
        assert!(TurnOrder::First.rank() < TurnOrder::Early.rank());
        assert!(TurnOrder::Early.rank() < TurnOrder::Default.rank());
        assert!(TurnOrder::Default.rank() < TurnOrder::Late.rank());
        assert!(TurnOrder::Late.rank() < TurnOrder::Last.rank());
        assert_eq!(TurnOrder::Before(Category::Minion).rank(), TurnOrder::Default.rank());
    }
}
