//! Data-driven game balance
//!
//! Every spawn window, rate and probability the simulation uses. Defaults are
//! the shipped balance; a JSON file can override any subset of fields.

use serde::{Deserialize, Serialize};

use crate::sim::state::{BossType, CoworkerType};

/// Per-type boss definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    pub boss_type: BossType,
    pub color: String,
    pub size: f32,
    /// Pixels per frame
    pub speed: f32,
    pub detection_radius: f32,
    /// Relative weight in the type draw
    pub spawn_probability: f32,
    pub base_points_per_second: f64,
    /// Delay window before this type appears, [min, max] ms
    pub spawn_delay_ms: [f64; 2],
    /// How long this type stays once it arrives, [min, max] ms
    pub despawn_duration_ms: [f64; 2],
    /// Extra time on the floor for rarer types
    pub rarity_bonus_ms: f64,
    /// Length of the pre-spawn warning for this type
    pub warning_time_ms: f64,
}

/// Per-type coworker definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoworkerConfig {
    pub coworker_type: CoworkerType,
    pub color: String,
    pub size: f32,
    /// Pixels per frame
    pub speed: f32,
    pub spawn_probability: f32,
    pub action_cooldown_ms: f64,
}

/// Boss slot scheduling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossScheduleTuning {
    /// Type whose delay window paces the spawn timer
    pub baseline_type: BossType,
    /// Symmetric jitter applied to despawn durations
    pub despawn_jitter_ms: f64,
    /// Despawn durations never drop below this
    pub min_despawn_ms: f64,
    /// Snitch calls shrink the spawn delay to this fraction
    pub snitch_spawn_delay_factor: f64,
    /// Suspicion at which the boss starts drifting toward the player's desk
    pub bias_suspicion_threshold: f32,
    pub shout_cooldown_ms: f64,
    pub shout_display_ms: f64,
}

impl Default for BossScheduleTuning {
    fn default() -> Self {
        Self {
            baseline_type: BossType::Manager,
            despawn_jitter_ms: 2000.0,
            min_despawn_ms: 8000.0,
            snitch_spawn_delay_factor: 0.25,
            bias_suspicion_threshold: 50.0,
            shout_cooldown_ms: 6000.0,
            shout_display_ms: 2500.0,
        }
    }
}

/// Coworker population and movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoworkerSystemTuning {
    pub max_coworkers: usize,
    pub spawn_delay_ms: [f64; 2],
    pub despawn_duration_ms: [f64; 2],
    /// Delay between spawns while the office is filling up
    pub chain_spawn_ms: f64,
    pub initial_spawn_delay_ms: f64,
    pub rush_duration_ms: f64,
    pub rush_speed_factor: f32,
    /// Rush target sits this far below the player
    pub rush_offset_y: f32,
    pub snitch_bias_chance_per_frame: f32,
    /// Snitches already this close do not retarget
    pub snitch_bias_skip_distance: f32,
    pub snitch_memory_radius: f32,
    pub snitch_memory_ms: f64,
    /// Helpful coworker must be this close to the player
    pub helpful_reach: f32,
    /// Player within this range of the boss triggers a warning
    pub helpful_boss_proximity: f32,
    /// ...or within this range when the boss has line of sight
    pub helpful_boss_los_range: f32,
    pub helpful_score_penalty_fraction: f64,
    pub warning_display_ms: f64,
}

impl Default for CoworkerSystemTuning {
    fn default() -> Self {
        Self {
            max_coworkers: 4,
            spawn_delay_ms: [4000.0, 9000.0],
            despawn_duration_ms: [30000.0, 60000.0],
            chain_spawn_ms: 800.0,
            initial_spawn_delay_ms: 1500.0,
            rush_duration_ms: 2000.0,
            rush_speed_factor: 1.8,
            rush_offset_y: 24.0,
            snitch_bias_chance_per_frame: 0.01,
            snitch_bias_skip_distance: 140.0,
            snitch_memory_radius: 120.0,
            snitch_memory_ms: 3000.0,
            helpful_reach: 100.0,
            helpful_boss_proximity: 200.0,
            helpful_boss_los_range: 250.0,
            helpful_score_penalty_fraction: 0.5,
            warning_display_ms: 2500.0,
        }
    }
}

/// Suspicion meter rates (points per second)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SuspicionTuning {
    pub max_suspicion: f32,
    pub gaming_heat_rate: f32,
    pub line_of_sight_multiplier: f32,
    pub danger_zone_distance: f32,
    pub danger_zone_multiplier: f32,
    pub hidden_recovery_rate: f32,
    pub working_recovery_rate: f32,
    pub no_boss_recovery_rate: f32,
    /// Suspicion floor when a snitch-called boss arrives
    pub snitch_spike: f32,
}

impl Default for SuspicionTuning {
    fn default() -> Self {
        Self {
            max_suspicion: 100.0,
            gaming_heat_rate: 4.0,
            line_of_sight_multiplier: 2.5,
            danger_zone_distance: 150.0,
            danger_zone_multiplier: 2.0,
            hidden_recovery_rate: 1.0,
            working_recovery_rate: 5.0,
            no_boss_recovery_rate: 3.0,
            snitch_spike: 30.0,
        }
    }
}

/// Score multiplier model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Boss-free scoring runs at this fraction of the baseline boss rate
    pub easy_period_fraction: f64,
    pub suspicion_per_step: f32,
    pub max_base_multiplier: f32,
    pub extreme_risk: f32,
    pub visible_risk: f32,
    pub hidden_close_risk: f32,
    /// A hidden boss this close still counts as risky
    pub hidden_close_distance: f32,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            easy_period_fraction: 0.5,
            suspicion_per_step: 10.0,
            max_base_multiplier: 10.0,
            extreme_risk: 3.0,
            visible_risk: 2.0,
            hidden_close_risk: 1.5,
            hidden_close_distance: 120.0,
        }
    }
}

/// Interruption cadence and fairness guarantees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterruptionTuning {
    pub snitch_check_interval_ms: f64,
    pub snitch_call_chance: f32,
    /// Snitches stay quiet once suspicion reaches this
    pub snitch_max_suspicion: f32,
    pub gossip_check_interval_ms: f64,
    pub gossip_chance: f32,
    pub conversation_ms: [f64; 2],
    pub distraction_check_interval_ms: f64,
    pub distraction_chance: f32,
    pub question_timeout_ms: f64,
    /// Gaming time with a boss present before an interruption is forced
    pub forced_interruption_ms: f64,
    /// Gaming time before a snitch call is forced
    pub forced_snitch_ms: f64,
    pub answer_lock_ms: f64,
    pub answer_suspicion_relief: f32,
    pub ignore_score_penalty: f64,
    pub ignore_suspicion_bump: f32,
    pub notice_display_ms: f64,
    pub questions: Vec<String>,
}

impl Default for InterruptionTuning {
    fn default() -> Self {
        Self {
            snitch_check_interval_ms: 5000.0,
            snitch_call_chance: 0.2,
            snitch_max_suspicion: 10.0,
            gossip_check_interval_ms: 3000.0,
            gossip_chance: 0.15,
            conversation_ms: [3000.0, 8000.0],
            distraction_check_interval_ms: 4000.0,
            distraction_chance: 0.10,
            question_timeout_ms: 8000.0,
            forced_interruption_ms: 20000.0,
            forced_snitch_ms: 100000.0,
            answer_lock_ms: 3000.0,
            answer_suspicion_relief: 5.0,
            ignore_score_penalty: 25.0,
            ignore_suspicion_bump: 5.0,
            notice_display_ms: 1500.0,
            questions: [
                "Can you review my pull request?",
                "Where did you save the Q3 report?",
                "What's the Wi-Fi password again?",
                "Can you help me with this spreadsheet?",
                "Did you see my email from this morning?",
                "Are you joining the standup?",
            ]
            .iter()
            .map(|q| q.to_string())
            .collect(),
        }
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Ordered by rarity: Manager, Director, VP, CEO
    pub bosses: [BossConfig; 4],
    pub boss_schedule: BossScheduleTuning,
    /// Helpful, Snitch, Gossip, Distraction
    pub coworkers: [CoworkerConfig; 4],
    pub coworker_system: CoworkerSystemTuning,
    pub suspicion: SuspicionTuning,
    pub scoring: ScoringTuning,
    pub interruptions: InterruptionTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            bosses: [
                BossConfig {
                    boss_type: BossType::Manager,
                    color: "#FF8C00".into(),
                    size: 30.0,
                    speed: 1.6,
                    detection_radius: 100.0,
                    spawn_probability: 0.70,
                    base_points_per_second: 20.0,
                    spawn_delay_ms: [8000.0, 15000.0],
                    despawn_duration_ms: [12000.0, 20000.0],
                    rarity_bonus_ms: 0.0,
                    warning_time_ms: 1000.0,
                },
                BossConfig {
                    boss_type: BossType::Director,
                    color: "#8A2BE2".into(),
                    size: 35.0,
                    speed: 1.8,
                    detection_radius: 120.0,
                    spawn_probability: 0.20,
                    base_points_per_second: 60.0,
                    spawn_delay_ms: [10000.0, 20000.0],
                    despawn_duration_ms: [12000.0, 20000.0],
                    rarity_bonus_ms: 3000.0,
                    warning_time_ms: 1000.0,
                },
                BossConfig {
                    boss_type: BossType::Vp,
                    color: "#8B0000".into(),
                    size: 40.0,
                    speed: 2.5,
                    detection_radius: 140.0,
                    spawn_probability: 0.08,
                    base_points_per_second: 100.0,
                    spawn_delay_ms: [12000.0, 25000.0],
                    despawn_duration_ms: [12000.0, 20000.0],
                    rarity_bonus_ms: 6000.0,
                    warning_time_ms: 1000.0,
                },
                BossConfig {
                    boss_type: BossType::Ceo,
                    color: "#000000".into(),
                    size: 50.0,
                    speed: 0.8,
                    detection_radius: 200.0,
                    spawn_probability: 0.02,
                    base_points_per_second: 200.0,
                    spawn_delay_ms: [15000.0, 35000.0],
                    despawn_duration_ms: [12000.0, 20000.0],
                    rarity_bonus_ms: 10000.0,
                    warning_time_ms: 1000.0,
                },
            ],
            boss_schedule: BossScheduleTuning::default(),
            coworkers: [
                CoworkerConfig {
                    coworker_type: CoworkerType::Helpful,
                    color: "#22C55E".into(),
                    size: 24.0,
                    speed: 1.4,
                    spawn_probability: 0.30,
                    action_cooldown_ms: 8000.0,
                },
                CoworkerConfig {
                    coworker_type: CoworkerType::Snitch,
                    color: "#EAB308".into(),
                    size: 24.0,
                    speed: 1.2,
                    spawn_probability: 0.25,
                    action_cooldown_ms: 15000.0,
                },
                CoworkerConfig {
                    coworker_type: CoworkerType::Gossip,
                    color: "#EC4899".into(),
                    size: 24.0,
                    speed: 1.0,
                    spawn_probability: 0.25,
                    action_cooldown_ms: 12000.0,
                },
                CoworkerConfig {
                    coworker_type: CoworkerType::Distraction,
                    color: "#06B6D4".into(),
                    size: 24.0,
                    speed: 1.1,
                    spawn_probability: 0.20,
                    action_cooldown_ms: 10000.0,
                },
            ],
            coworker_system: CoworkerSystemTuning::default(),
            suspicion: SuspicionTuning::default(),
            scoring: ScoringTuning::default(),
            interruptions: InterruptionTuning::default(),
        }
    }
}

impl Tuning {
    /// Parse a (possibly partial) JSON balance file over the defaults
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn boss(&self, boss_type: BossType) -> &BossConfig {
        self.bosses
            .iter()
            .find(|c| c.boss_type == boss_type)
            .unwrap_or(&self.bosses[boss_type.index()])
    }

    pub fn coworker(&self, coworker_type: CoworkerType) -> &CoworkerConfig {
        self.coworkers
            .iter()
            .find(|c| c.coworker_type == coworker_type)
            .unwrap_or(&self.coworkers[coworker_type.index()])
    }

    /// Rate scored while no boss is on the floor
    pub fn easy_points_per_second(&self) -> f64 {
        self.boss(self.boss_schedule.baseline_type).base_points_per_second
            * self.scoring.easy_period_fraction
    }
}
