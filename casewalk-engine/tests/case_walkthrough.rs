use casewalk_engine::{
    AchievementId, AchievementStatus, CaseContent, CaseEngine, CaseGraph, EnginePolicy, Grade,
    PlayStatus, case_summary, evaluate_achievements, golden_path, replay_timeline,
};

const EPSILON: f32 = 1e-3;

fn load_graph() -> CaseGraph {
    CaseGraph::build(CaseContent::load_demo()).expect("bundled case builds")
}

fn drive(engine: &mut CaseEngine, route: &[&str]) {
    for value in route {
        engine
            .select_option(value)
            .unwrap_or_else(|| panic!("option '{value}' should apply on the current stage"));
    }
}

#[test]
fn golden_walkthrough_earns_the_full_debrief() {
    let graph = load_graph();
    let policy = EnginePolicy::default_config();
    let mut engine = CaseEngine::new(graph.clone(), policy.clone());

    let path = golden_path(&graph);
    assert_eq!(path.len(), 7, "demo golden route covers every stage");
    for segment in &path {
        let step = engine
            .select_option_at(&segment.stage_slug, &segment.option_value)
            .expect("golden hop applies");
        assert!(step.correct, "the golden route never misses");
    }

    let state = engine.state();
    assert_eq!(state.status, PlayStatus::Completed);
    assert_eq!(state.score, 100);
    assert_eq!(state.time_spent, 15);
    assert_eq!(state.total_actions, 7);
    assert_eq!(state.mistakes, 0);
    assert_eq!(state.streak, 7);
    assert_eq!(state.combo_level, 2, "streak 7 clears two combo thresholds");
    assert_eq!(
        state.visited_stage_slugs, state.ordered_stage_slugs,
        "a complete run visits every stage in order"
    );
    assert_eq!(
        state.hypotheses,
        ["acute coronary syndrome", "inferior stemi"],
        "hypotheses merge without repeats"
    );
    assert_eq!(state.evidence.len(), 6);
    assert!((state.mastery_energy - 92.5).abs() < EPSILON);
    assert!(state.logs.iter().any(|entry| entry == "log.case.completed"));

    // Every badge lands on the ideal run.
    let badges = evaluate_achievements(state, graph.meta(), &policy.achievements);
    assert!(
        badges
            .iter()
            .all(|badge| badge.status == AchievementStatus::Earned),
        "ideal run earns the complete badge rail"
    );

    let summary = case_summary(state, graph.meta(), &policy.achievements);
    assert_eq!(summary.grade, Grade::Exemplary);
    assert_eq!(summary.accuracy_pct, 100);
    assert_eq!(summary.coverage_pct, 100);
    assert_eq!(summary.badges_earned, 4);
    assert_eq!(summary.badges_total, 4);
    assert_eq!(summary.case_slug, "chest-pain");
}

#[test]
fn detours_and_mistakes_soften_the_verdict() {
    let graph = load_graph();
    let policy = EnginePolicy::default_config();
    let mut engine = CaseEngine::new(graph.clone(), policy.clone());

    // Two wrong turns: parked in the waiting room, then an X-ray before the ECG.
    drive(
        &mut engine,
        &[
            "waiting-room",
            "opqrst",
            "chest-xray-first",
            "inferior-stemi",
            "activate-cath-lab",
            "aspirin-heparin-pci",
            "finish-case",
        ],
    );

    let state = engine.state();
    assert_eq!(state.status, PlayStatus::Completed);
    assert_eq!(state.score, 60);
    assert_eq!(state.time_spent, 29, "detours cost simulated minutes");
    assert_eq!(state.mistakes, 2);
    assert_eq!(state.streak, 4, "the recovery run stands at four");
    assert_eq!(state.total_actions, 7);

    let badges = evaluate_achievements(state, graph.meta(), &policy.achievements);
    let status_of = |id: AchievementId| {
        badges
            .iter()
            .find(|badge| badge.id == id)
            .map(|badge| badge.status)
            .unwrap()
    };
    assert_eq!(
        status_of(AchievementId::FocusedStreak),
        AchievementStatus::Earned,
        "four straight correct calls still count"
    );
    assert_eq!(
        status_of(AchievementId::ThoroughWorkup),
        AchievementStatus::Earned
    );
    assert_eq!(
        status_of(AchievementId::UnderBudget),
        AchievementStatus::InProgress,
        "29 simulated minutes blows the 25 minute budget"
    );
    assert_eq!(
        status_of(AchievementId::CleanRun),
        AchievementStatus::InProgress
    );

    let summary = case_summary(state, graph.meta(), &policy.achievements);
    assert_eq!(summary.grade, Grade::Proficient);
    assert_eq!(summary.accuracy_pct, 71);
    assert_eq!(summary.badges_earned, 2);
}

#[test]
fn replay_rebuilds_the_recorded_run_exactly() {
    let graph = load_graph();
    let policy = EnginePolicy::default_config();
    let mut engine = CaseEngine::new(graph.clone(), policy.clone());
    drive(
        &mut engine,
        &[
            "waiting-room",
            "opqrst",
            "chest-xray-first",
            "inferior-stemi",
            "activate-cath-lab",
            "aspirin-heparin-pci",
            "finish-case",
        ],
    );
    let live = engine.into_state();

    let replayed = replay_timeline(&graph, &policy, &live.timeline);
    assert_eq!(replayed, live, "replaying the timeline is lossless");
}

#[test]
fn reset_discards_a_finished_attempt() {
    let graph = load_graph();
    let mut engine = CaseEngine::new(graph, EnginePolicy::default_config());
    drive(&mut engine, &["focused-assessment", "opqrst"]);
    assert_eq!(engine.state().timeline.len(), 2);

    engine.reset();
    let state = engine.state();
    assert_eq!(state.status, PlayStatus::InProgress);
    assert_eq!(state.current_stage_slug, "triage");
    assert_eq!(state.score, 0);
    assert_eq!(state.time_spent, 0);
    assert_eq!(state.streak, 0);
    assert_eq!(state.mistakes, 0);
    assert!(state.timeline.is_empty());
    assert!(state.evidence.is_empty());
    assert!(state.hypotheses.is_empty());
}
