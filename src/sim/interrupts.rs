//! Coworker interruptions, fairness guarantees and transient UI objects
//!
//! Each `run_*` function performs one paced check and applies its effects
//! to the state. Pacing deadlines live in `Schedule`.

use glam::Vec2;

use super::boss::CAUGHT_GLIMPSE_SHOUT;
use super::collision::has_line_of_sight;
use super::coworker::{
    ActionContext, HELPFUL_WARNING, SNITCH_WARNING, check_distraction_question,
    check_gossip_interruption, check_helpful_coworker_action, check_snitch_action,
    set_gossip_approach_target, start_conversation, start_helpful_rush,
};
use super::rng::RandomSource;
use super::scoring::nudge_suspicion;
use super::spawner::{accelerate_boss_spawn, boss_warning_active};
use super::state::{
    BossShout, ConversationState, CoworkerType, CoworkerWarning, GameEvent, GameMode, GameState,
    QuestionResponse, WarningKind, WorkQuestion,
};
use crate::distance;

const FALLBACK_QUESTION: &str = "Got a sec?";

fn context(state: &GameState, now_ms: f64) -> ActionContext<'_> {
    ActionContext {
        player: &state.player,
        mode: state.mode,
        boss: state.active_boss(),
        desks: &state.desks,
        suspicion: state.suspicion,
        now_ms,
        tuning: &state.tuning,
    }
}

/// True (and re-armed) when a paced check is due
fn check_due(deadline: &mut Option<f64>, interval_ms: f64, now_ms: f64) -> bool {
    match *deadline {
        Some(t) if now_ms < t => false,
        _ => {
            *deadline = Some(now_ms + interval_ms);
            true
        }
    }
}

/// Helpful coworkers tip the player off at the cost of half the score
pub fn run_helpful_checks(state: &mut GameState, now_ms: f64) {
    let hit = {
        let ctx = context(state, now_ms);
        state
            .coworkers
            .iter()
            .enumerate()
            .find_map(|(i, c)| check_helpful_coworker_action(c, &ctx).map(|at| (i, at)))
    };
    let Some((index, position)) = hit else {
        return;
    };

    let sys = &state.tuning.coworker_system;
    let reduction = state.score * sys.helpful_score_penalty_fraction;
    state.score = (state.score - reduction).max(0.0);

    let coworker = &mut state.coworkers[index];
    coworker.last_action_ms = Some(now_ms);
    start_helpful_rush(coworker, &state.player, now_ms, sys);
    let coworker_id = coworker.id;

    state.coworker_warnings.push(CoworkerWarning {
        coworker_id: Some(coworker_id),
        kind: WarningKind::BossWarning,
        message: HELPFUL_WARNING.to_string(),
        position,
        remaining_ms: sys.warning_display_ms,
        score_reduction: reduction,
    });
    state.push_event(GameEvent::HelpfulWarning {
        coworker_id,
        score_reduction: reduction,
    });
    log::info!("Coworker {coworker_id} warned about the boss (-{reduction:.0} points)");
}

fn trigger_snitch_call(
    state: &mut GameState,
    index: usize,
    now_ms: f64,
    forced: bool,
    rng: &mut impl RandomSource,
) {
    let coworker = &mut state.coworkers[index];
    coworker.last_action_ms = Some(now_ms);
    let coworker_id = coworker.id;
    let position = coworker.position - Vec2::new(0.0, 30.0);

    state.coworker_warnings.push(CoworkerWarning {
        coworker_id: Some(coworker_id),
        kind: WarningKind::SnitchWarning,
        message: SNITCH_WARNING.to_string(),
        position,
        remaining_ms: state.tuning.coworker_system.warning_display_ms,
        score_reduction: 0.0,
    });
    accelerate_boss_spawn(state, now_ms, rng);
    state.schedule.gaming_ms_since_snitch = 0.0;
    state.push_event(GameEvent::SnitchCall {
        coworker_id,
        forced,
    });
    log::info!(
        "Coworker {coworker_id} called the boss{}",
        if forced { " (overdue)" } else { "" }
    );
}

/// Snitch checks run every few seconds and pause while a boss is announced
pub fn run_snitch_checks(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    let interval = state.tuning.interruptions.snitch_check_interval_ms;
    if !check_due(&mut state.schedule.next_snitch_check_ms, interval, now_ms) {
        return;
    }
    if boss_warning_active(state) {
        return;
    }
    let hit = {
        let ctx = context(state, now_ms);
        state
            .coworkers
            .iter()
            .position(|c| check_snitch_action(c, &ctx, rng))
    };
    if let Some(index) = hit {
        trigger_snitch_call(state, index, now_ms, false, rng);
    }
}

fn begin_conversation(
    state: &mut GameState,
    index: Option<usize>,
    conversation: ConversationState,
    forced: bool,
) {
    let anchor = state.seat_anchor();
    if let Some(coworker) = index.and_then(|i| state.coworkers.get_mut(i)) {
        coworker.last_action_ms = Some(conversation.start_ms);
        if let Some(anchor) = anchor {
            set_gossip_approach_target(
                coworker,
                anchor,
                conversation.start_ms,
                conversation.duration_ms,
            );
        }
    }
    state.schedule.gaming_ms_since_interruption = 0.0;
    state.push_event(GameEvent::ConversationStarted {
        coworker_id: conversation.coworker_id,
        duration_ms: conversation.duration_ms,
        forced,
    });
    log::info!(
        "Conversation started ({:.1}s){}",
        conversation.duration_ms / 1000.0,
        if forced { ", overdue interruption" } else { "" }
    );
    state.conversation = Some(conversation);
}

/// Gossips only bother a player who is gaming with a boss on the floor
pub fn run_gossip_checks(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    let interval = state.tuning.interruptions.gossip_check_interval_ms;
    if !check_due(&mut state.schedule.next_gossip_check_ms, interval, now_ms) {
        return;
    }
    if state.active_boss().is_none() || state.question.is_some() {
        return;
    }
    let hit = {
        let ctx = context(state, now_ms);
        let existing = state.conversation.as_ref();
        state.coworkers.iter().enumerate().find_map(|(i, c)| {
            check_gossip_interruption(c, &ctx, existing, rng).map(|convo| (i, convo))
        })
    };
    if let Some((index, conversation)) = hit {
        begin_conversation(state, Some(index), conversation, false);
    }
}

fn raise_question(
    state: &mut GameState,
    index: Option<usize>,
    now_ms: f64,
    forced: bool,
    rng: &mut impl RandomSource,
) {
    let intr = &state.tuning.interruptions;
    let text = intr
        .questions
        .get(rng.index(intr.questions.len()))
        .map_or(FALLBACK_QUESTION.to_string(), |q| q.clone());
    let timeout_ms = intr.question_timeout_ms;

    let asker = index.and_then(|i| state.coworkers.get_mut(i));
    let (coworker_id, position) = match asker {
        Some(c) => {
            c.last_action_ms = Some(now_ms);
            (Some(c.id), c.position - Vec2::new(0.0, 30.0))
        }
        None => (None, state.player.center() - Vec2::new(0.0, 30.0)),
    };

    state.question = Some(WorkQuestion {
        coworker_id,
        text,
        position,
        remaining_ms: timeout_ms,
        timeout_ms,
    });
    state.schedule.gaming_ms_since_interruption = 0.0;
    state.push_event(GameEvent::QuestionRaised {
        coworker_id,
        forced,
    });
    log::info!("Question raised{}", if forced { " (overdue interruption)" } else { "" });
}

pub fn run_distraction_checks(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    let interval = state.tuning.interruptions.distraction_check_interval_ms;
    if !check_due(
        &mut state.schedule.next_distraction_check_ms,
        interval,
        now_ms,
    ) {
        return;
    }
    if state.question.is_some() {
        return;
    }
    let hit = {
        let ctx = context(state, now_ms);
        let talking = state.conversation.is_some();
        state
            .coworkers
            .iter()
            .position(|c| check_distraction_question(c, &ctx, talking, rng))
    };
    if let Some(index) = hit {
        raise_question(state, Some(index), now_ms, false, rng);
    }
}

fn first_of(state: &GameState, kind: CoworkerType) -> Option<usize> {
    state.coworkers.iter().position(|c| c.coworker_type == kind)
}

/// Advance the fairness clocks and force overdue interruptions
pub fn enforce_fairness(
    state: &mut GameState,
    dt_ms: f64,
    now_ms: f64,
    rng: &mut impl RandomSource,
) {
    if state.is_game_over || state.mode != GameMode::Gaming {
        return;
    }
    let has_boss = state.active_boss().is_some();
    state.schedule.gaming_ms_since_snitch += dt_ms;
    if has_boss {
        state.schedule.gaming_ms_since_interruption += dt_ms;
    }

    let intr = &state.tuning.interruptions;
    let interruption_due = has_boss
        && state.schedule.gaming_ms_since_interruption >= intr.forced_interruption_ms
        && state.conversation.is_none()
        && state.question.is_none();
    let snitch_due = state.schedule.gaming_ms_since_snitch >= intr.forced_snitch_ms;

    if interruption_due {
        if let Some(index) = first_of(state, CoworkerType::Gossip) {
            let id = state.coworkers[index].id;
            let conversation = start_conversation(Some(id), now_ms, &state.tuning, rng);
            begin_conversation(state, Some(index), conversation, true);
        } else {
            let index = first_of(state, CoworkerType::Distraction);
            raise_question(state, index, now_ms, true, rng);
        }
    }

    if snitch_due && let Some(index) = first_of(state, CoworkerType::Snitch) {
        trigger_snitch_call(state, index, now_ms, true, rng);
    }
}

/// Apply the player's reply to a pending question
pub fn respond_to_question(state: &mut GameState, response: QuestionResponse, now_ms: f64) {
    if state.question.is_none() {
        return;
    }
    match response {
        QuestionResponse::Answer => {
            state.question = None;
            let intr = &state.tuning.interruptions;
            state.schedule.answer_lock_until_ms = Some(now_ms + intr.answer_lock_ms);
            let relief = intr.answer_suspicion_relief;
            nudge_suspicion(state, -relief);
            state.push_event(GameEvent::QuestionAnswered);
            log::debug!("Question answered");
        }
        QuestionResponse::Ignore => ignore_question(state, false),
    }
}

fn ignore_question(state: &mut GameState, timed_out: bool) {
    state.question = None;
    let intr = &state.tuning.interruptions;
    let penalty = intr.ignore_score_penalty;
    let bump = intr.ignore_suspicion_bump;
    let notice_ms = intr.notice_display_ms;

    state.score = (state.score - penalty).max(0.0);
    nudge_suspicion(state, bump);
    state.coworker_warnings.push(CoworkerWarning {
        coworker_id: None,
        kind: WarningKind::Notice,
        message: format!("Ignored a coworker (-{penalty:.0})"),
        position: state.player.center() - Vec2::new(0.0, 40.0),
        remaining_ms: notice_ms,
        score_reduction: penalty,
    });
    state.push_event(GameEvent::QuestionIgnored { timed_out });
    log::debug!("Question ignored (timed out: {timed_out})");
}

/// Expire an unanswered question and a finished conversation
pub fn auto_resolve(state: &mut GameState, dt_ms: f64, now_ms: f64) {
    let timed_out = match state.question.as_mut() {
        Some(q) => {
            q.remaining_ms = (q.remaining_ms - dt_ms).max(0.0);
            q.remaining_ms <= 0.0
        }
        None => false,
    };
    if timed_out {
        ignore_question(state, true);
    }

    if state
        .conversation
        .as_ref()
        .is_some_and(|c| now_ms >= c.ends_at())
    {
        state.conversation = None;
        state.push_event(GameEvent::ConversationEnded);
        log::debug!("Conversation over");
    }
}

/// A boss that spots a gaming player up close yells about it
pub fn check_boss_shouts(state: &mut GameState, now_ms: f64) {
    if state.mode != GameMode::Gaming {
        return;
    }
    let sched = &state.tuning.boss_schedule;
    let danger = state.tuning.suspicion.danger_zone_distance;
    let Some(boss) = state.bosses.first_mut() else {
        return;
    };
    let cooled = boss
        .last_shout_ms
        .is_none_or(|t| now_ms - t >= sched.shout_cooldown_ms);
    if !cooled
        || distance(state.player.position, boss.position) > danger
        || !has_line_of_sight(boss.position, state.player.position, &state.desks)
    {
        return;
    }
    boss.last_shout_ms = Some(now_ms);
    let shout = BossShout {
        boss_id: boss.id,
        message: CAUGHT_GLIMPSE_SHOUT.to_string(),
        position: boss.position - Vec2::new(0.0, boss.size),
        remaining_ms: sched.shout_display_ms,
    };
    let boss_id = boss.id;
    state.boss_shouts.push(shout);
    state.push_event(GameEvent::BossShouted { boss_id });
}

/// Count down floating messages and drop the expired ones
pub fn tick_transients(state: &mut GameState, dt_ms: f64) {
    for w in state.coworker_warnings.iter_mut() {
        w.remaining_ms -= dt_ms;
    }
    state.coworker_warnings.retain(|w| w.remaining_ms > 0.0);
    for s in state.boss_shouts.iter_mut() {
        s.remaining_ms -= dt_ms;
    }
    state.boss_shouts.retain(|s| s.remaining_ms > 0.0);
}
