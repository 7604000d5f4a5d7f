//! Game state and core simulation types
//!
//! `GameState` is the single aggregate the driver owns between frames. Every
//! field has a fixed type and lifecycle; transient UI-facing objects are
//! explicit optional fields rather than ad hoc additions.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::{create_boss_from_config, random_despawn_duration};
use super::collision::Rect;
use super::office::{Walkways, create_office_layout, player_desk, player_seat_anchor};
use super::patrol::Axis;
use super::rng::RandomSource;
use crate::consts::*;
use crate::tuning::Tuning;

/// What the seated player is doing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    #[default]
    Work,
    Gaming,
}

impl GameMode {
    pub fn toggled(self) -> Self {
        match self {
            GameMode::Work => GameMode::Gaming,
            GameMode::Gaming => GameMode::Work,
        }
    }
}

/// Boss hierarchy, ordered by rarity and danger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BossType {
    Manager,
    Director,
    Vp,
    Ceo,
}

impl BossType {
    pub const ALL: [BossType; 4] = [
        BossType::Manager,
        BossType::Director,
        BossType::Vp,
        BossType::Ceo,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            BossType::Manager => "Manager",
            BossType::Director => "Director",
            BossType::Vp => "VP",
            BossType::Ceo => "CEO",
        }
    }
}

/// Coworker behaviour categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoworkerType {
    Helpful,
    Snitch,
    Gossip,
    Distraction,
}

impl CoworkerType {
    pub const ALL: [CoworkerType; 4] = [
        CoworkerType::Helpful,
        CoworkerType::Snitch,
        CoworkerType::Gossip,
        CoworkerType::Distraction,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// The player character (position is the top-left of its square)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub position: Vec2,
    /// Pixels per frame
    pub speed: f32,
    pub is_sitting: bool,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            position: Vec2::new(
                CANVAS_WIDTH / 2.0 - PLAYER_SIZE / 2.0,
                CANVAS_HEIGHT / 2.0 - PLAYER_SIZE / 2.0,
            ),
            speed: PLAYER_SPEED,
            is_sitting: false,
        }
    }
}

impl Player {
    pub fn center(&self) -> Vec2 {
        self.position + Vec2::splat(PLAYER_SIZE / 2.0)
    }
}

/// A desk: immutable obstacle, exactly one belongs to the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Desk {
    pub id: String,
    pub bounds: Rect,
    pub is_player_desk: bool,
}

/// A roaming boss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Boss {
    pub id: u32,
    pub boss_type: BossType,
    pub position: Vec2,
    pub speed: f32,
    pub detection_radius: f32,
    pub size: f32,
    pub color: String,
    pub base_points_per_second: f64,
    /// [current waypoint, next target]
    pub patrol_route: [Vec2; 2],
    pub current_target: usize,
    /// Walkway lines and clearance-inflated desk obstacles
    pub walkways: Walkways,
    /// Previous waypoint, avoided as the next pick
    pub last_point: Option<Vec2>,
    pub last_axis: Option<Axis>,
    /// Point the next waypoint is pulled toward
    pub bias_target: Option<Vec2>,
    /// Arrived because a snitch called
    #[serde(default)]
    pub snitch_called: bool,
    #[serde(default)]
    pub last_shout_ms: Option<f64>,
}

impl Boss {
    pub fn target(&self) -> Vec2 {
        self.patrol_route[self.current_target.min(1)]
    }
}

/// Temporary high-speed diversion of a coworker
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rush {
    pub until_ms: f64,
    pub target: Vec2,
    /// Re-aim at the player every frame (otherwise hold at `target`)
    pub tracks_player: bool,
}

/// An office NPC
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coworker {
    pub id: u32,
    pub coworker_type: CoworkerType,
    pub position: Vec2,
    pub speed: f32,
    pub size: f32,
    pub color: String,
    pub patrol_route: [Vec2; 2],
    pub current_target: usize,
    pub walkways: Walkways,
    pub last_point: Option<Vec2>,
    pub last_axis: Option<Axis>,
    /// Last time this coworker acted (None = never, cooldown satisfied)
    pub last_action_ms: Option<f64>,
    pub despawn_at_ms: f64,
    pub rush: Option<Rush>,
    /// Snitch memory: last time the player was within sight
    pub last_near_player_ms: Option<f64>,
}

impl Coworker {
    pub fn target(&self) -> Vec2 {
        self.patrol_route[self.current_target.min(1)]
    }

    pub fn is_rushing(&self, now_ms: f64) -> bool {
        self.rush.is_some_and(|r| now_ms < r.until_ms)
    }

    pub fn cooldown_elapsed(&self, now_ms: f64, cooldown_ms: f64) -> bool {
        self.last_action_ms
            .is_none_or(|last| now_ms - last > cooldown_ms)
    }
}

/// Pre-spawn notice shown in the final moments before a boss arrives
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossWarning {
    pub boss_type: BossType,
    pub remaining_ms: f64,
    pub total_warning_ms: f64,
    pub is_active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// A helpful coworker tipping the player off
    BossWarning,
    /// A snitch calling the boss
    SnitchWarning,
    /// Short system notice (e.g. an ignored question)
    Notice,
}

/// Floating coworker message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoworkerWarning {
    pub coworker_id: Option<u32>,
    pub kind: WarningKind,
    pub message: String,
    pub position: Vec2,
    pub remaining_ms: f64,
    pub score_reduction: f64,
}

/// Something a boss yells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossShout {
    pub boss_id: u32,
    pub message: String,
    pub position: Vec2,
    pub remaining_ms: f64,
}

/// Gossip lock: blocks mode switching and scoring while active
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub coworker_id: Option<u32>,
    pub start_ms: f64,
    pub duration_ms: f64,
    pub message: String,
}

impl ConversationState {
    pub fn ends_at(&self) -> f64 {
        self.start_ms + self.duration_ms
    }

    pub fn remaining_ms(&self, now_ms: f64) -> f64 {
        (self.ends_at() - now_ms).max(0.0)
    }
}

/// A coworker's question waiting on the player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkQuestion {
    pub coworker_id: Option<u32>,
    pub text: String,
    pub position: Vec2,
    pub remaining_ms: f64,
    pub timeout_ms: f64,
}

/// How the player deals with a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionResponse {
    Answer,
    Ignore,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Detected,
    MaxSuspicion,
}

/// Risk label for the multiplier HUD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Safe,
    Hidden,
    Visible,
    ExtremeDanger,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Safe => "SAFE",
            RiskLevel::Hidden => "HIDDEN",
            RiskLevel::Visible => "VISIBLE",
            RiskLevel::ExtremeDanger => "EXTREME DANGER",
        }
    }
}

/// Result of the dynamic multiplier model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MultiplierBreakdown {
    pub total_multiplier: f32,
    pub base_multiplier: f32,
    pub risk_multiplier: f32,
    pub risk_level: RiskLevel,
}

impl Default for MultiplierBreakdown {
    fn default() -> Self {
        Self {
            total_multiplier: 1.0,
            base_multiplier: 1.0,
            risk_multiplier: 1.0,
            risk_level: RiskLevel::Safe,
        }
    }
}

/// Things that happened during the last tick (for renderer/audio hooks)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    SatDown,
    StoodUp,
    ModeChanged { mode: GameMode },
    BossSpawned { boss_type: BossType, snitch_called: bool },
    BossDespawned { boss_type: BossType },
    CoworkerSpawned { coworker_type: CoworkerType },
    CoworkerLeft { coworker_type: CoworkerType },
    HelpfulWarning { coworker_id: u32, score_reduction: f64 },
    SnitchCall { coworker_id: u32, forced: bool },
    ConversationStarted { coworker_id: Option<u32>, duration_ms: f64, forced: bool },
    ConversationEnded,
    QuestionRaised { coworker_id: Option<u32>, forced: bool },
    QuestionAnswered,
    QuestionIgnored { timed_out: bool },
    BossShouted { boss_id: u32 },
    GameOver { reason: GameOverReason },
}

/// Scheduler deadlines and fairness clocks
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    pub next_boss_spawn_ms: Option<f64>,
    pub active_boss_despawn_ms: Option<f64>,
    /// Type chosen ahead of time so the warning can name it
    pub upcoming_boss_type: Option<BossType>,
    /// The next boss to arrive was called by a snitch
    pub snitch_call_pending: bool,
    pub next_coworker_spawn_ms: Option<f64>,
    pub next_snitch_check_ms: Option<f64>,
    pub next_gossip_check_ms: Option<f64>,
    pub next_distraction_check_ms: Option<f64>,
    /// Gaming time with a boss present since the last gossip/question
    pub gaming_ms_since_interruption: f64,
    /// Gaming time since the last snitch call
    pub gaming_ms_since_snitch: f64,
    /// Score frozen until this time after answering a question
    pub answer_lock_until_ms: Option<f64>,
}

/// Complete game state (deterministic given a time and random source)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameState {
    pub player: Player,
    /// Immutable after creation
    pub desks: Vec<Desk>,
    /// At most one boss
    pub bosses: Vec<Boss>,
    pub coworkers: Vec<Coworker>,
    pub mode: GameMode,
    pub score: f64,
    pub suspicion: f32,
    pub is_game_over: bool,
    pub game_over_reason: Option<GameOverReason>,
    pub last_update_ms: Option<f64>,
    pub schedule: Schedule,
    pub boss_warning: Option<BossWarning>,
    pub coworker_warnings: Vec<CoworkerWarning>,
    pub boss_shouts: Vec<BossShout>,
    pub conversation: Option<ConversationState>,
    pub question: Option<WorkQuestion>,
    /// Last computed multiplier (for the HUD)
    pub multiplier: MultiplierBreakdown,
    /// Events emitted by the most recent tick
    #[serde(default)]
    pub events: Vec<GameEvent>,
    pub tuning: Tuning,
    next_id: u32,
}

impl GameState {
    /// Start a fresh session: a Manager is already on the floor
    pub fn new(tuning: Tuning, now_ms: f64, rng: &mut impl RandomSource) -> Self {
        let desks = create_office_layout();
        let mut state = Self {
            player: Player::default(),
            desks,
            bosses: Vec::new(),
            coworkers: Vec::new(),
            mode: GameMode::Work,
            score: 0.0,
            suspicion: 0.0,
            is_game_over: false,
            game_over_reason: None,
            last_update_ms: Some(now_ms),
            schedule: Schedule::default(),
            boss_warning: None,
            coworker_warnings: Vec::new(),
            boss_shouts: Vec::new(),
            conversation: None,
            question: None,
            multiplier: MultiplierBreakdown::default(),
            events: Vec::new(),
            tuning,
            next_id: 1,
        };

        let manager = state.tuning.boss(BossType::Manager).clone();
        let id = state.next_entity_id();
        let boss = create_boss_from_config(id, &manager, &state.desks, rng);
        state.bosses.push(boss);
        state.schedule.active_boss_despawn_ms =
            Some(now_ms + random_despawn_duration(&manager, &state.tuning.boss_schedule, rng));

        let intr = &state.tuning.interruptions;
        state.schedule.next_snitch_check_ms = Some(now_ms + intr.snitch_check_interval_ms);
        state.schedule.next_gossip_check_ms = Some(now_ms + intr.gossip_check_interval_ms);
        state.schedule.next_distraction_check_ms =
            Some(now_ms + intr.distraction_check_interval_ms);
        state.schedule.next_coworker_spawn_ms =
            Some(now_ms + state.tuning.coworker_system.initial_spawn_delay_ms);

        log::info!("New session: {} desks, Manager on the floor", state.desks.len());
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn active_boss(&self) -> Option<&Boss> {
        self.bosses.first()
    }

    pub fn player_desk(&self) -> Option<&Desk> {
        player_desk(&self.desks)
    }

    pub fn seat_anchor(&self) -> Option<Vec2> {
        self.player_desk().map(player_seat_anchor)
    }

    pub fn has_coworker(&self, coworker_type: CoworkerType) -> bool {
        self.coworkers
            .iter()
            .any(|c| c.coworker_type == coworker_type)
    }

    /// Score is frozen while answering a question
    pub fn answer_lock_active(&self, now_ms: f64) -> bool {
        self.schedule
            .answer_lock_until_ms
            .is_some_and(|until| now_ms < until)
    }

    /// Mode switching is blocked by any conversation or question
    pub fn mode_switch_locked(&self, now_ms: f64) -> bool {
        self.conversation.is_some() || self.question.is_some() || self.answer_lock_active(now_ms)
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
