//! The rules engine proper. Every public operation takes a snapshot and
//! returns a [`Transition`]; nothing here mutates the caller's state.

pub mod abilities;
pub mod assignment;
pub mod death;
pub mod decisions;
pub mod oracle;
pub mod phases;
pub mod roles;
pub mod statuses;
pub mod table;
pub mod types;
pub mod voting;

pub use abilities::{can_act_tonight, handle_action, player_view, use_day_ability, PlayerView};
pub use assignment::{
    add_player, assign_roles, create_initial_state, remove_player, rename_player, turn_order,
    RolePools,
};
pub use decisions::{cancel_special, prompt_for, resolve_decision};
pub use oracle::{
    find_neighbours, is_evil, is_intoxicated, is_minion, is_outsider, is_villager, is_werewolf,
    QueryOptions, Verdict,
};
pub use phases::{advance_time, take_popup, toggle_player_alive};
pub use table::Transition;
pub use types::{Decision, GameState, GameStatus, Nominee, Player, Time};
pub use voting::{enact_vote, evaluate_win, vote_threshold};
