//! End-to-end tests: configure, generate over HTTP, play, and summarize.

mod common;

use mathland_game::{
    ClassLevel, Feedback, GameConfig, GameError, GameFlow, GameMode, Operation, Outcome, Phase,
    ProblemGenerator, Progress,
};
use mathland_genai::{GeminiClient, OpenAiClient, DEFAULT_TIMEOUT};
use mathland_report::{GameSummary, MarkdownGenerator, Report, RoundSummary, Tier};
use serde_json::json;

use common::{addition_batch, gemini_reply, openai_reply, spawn_mock, status_reply, MockService};

fn hunt() -> GameConfig {
    GameConfig::new(ClassLevel::P2, Operation::Addition, GameMode::TreasureHunt, 5)
}

fn gemini_generator(base_url: &str) -> ProblemGenerator {
    let client = GeminiClient::new("test-key", "gemini-2.5-flash", DEFAULT_TIMEOUT)
        .expect("Failed to build client")
        .with_base_url(base_url);
    ProblemGenerator::new(Box::new(client))
}

/// Runs the configuring to playing transition against the generator.
async fn start(
    flow: &mut GameFlow,
    generator: &ProblemGenerator,
    config: GameConfig,
) -> Result<(), GameError> {
    flow.begin_generation(config)?;
    let result = generator.generate(&config).await;
    flow.finish_generation(result)
}

fn report_for(outcome: &Outcome) -> Report {
    Report::builder()
        .game(GameSummary {
            level: outcome.config.level.title().to_string(),
            operation: outcome.config.operation.title().to_string(),
            mode: outcome.config.game_mode.to_string(),
        })
        .score(outcome.score, outcome.total)
        .rounds(
            outcome
                .rounds
                .iter()
                .map(|r| RoundSummary::new(r.round, r.question.clone(), r.answer, r.submitted))
                .collect(),
        )
        .timing(outcome.started_at, outcome.finished_at)
        .build()
        .expect("Outcome should make a valid report")
}

#[tokio::test]
async fn test_treasure_hunt_three_of_five() {
    let service = MockService::new(vec![gemini_reply(&addition_batch().to_string())]);
    let (base_url, _server) = spawn_mock(service).await;
    let generator = gemini_generator(&base_url);
    let mut flow = GameFlow::new();

    start(&mut flow, &generator, hunt()).await.expect("Game should start");

    let first = flow.view().expect("Playing");
    assert_eq!(first.round, 1);
    assert_eq!(first.total, 5);
    assert_eq!(first.question, "4 + 5 = ?");
    assert!(first.choices.is_empty());

    let inputs = ["9", "19", "15", " 23 ", "seventeen"];
    let expected = [
        Feedback::Correct,
        Feedback::Correct,
        Feedback::Incorrect,
        Feedback::Correct,
        Feedback::Incorrect,
    ];
    let mut last = None;
    for (input, want) in inputs.iter().zip(expected) {
        assert_eq!(flow.submit(input).expect("Submit"), want);
        assert!(flow.view().expect("Playing").revealed_answer.is_some());
        last = Some(flow.advance().expect("Advance"));
    }

    let Some(Progress::Complete(outcome)) = last else {
        panic!("Game should be complete after five rounds");
    };
    assert_eq!(outcome.score, 3);
    assert_eq!(outcome.total, 5);
    assert_eq!(outcome.rounds[4].submitted, None);
    assert!(matches!(flow.phase(), Phase::Complete(_)));
    assert!(flow.view().is_none());

    let report = report_for(&outcome);
    assert_eq!(report.percentage, 60);
    assert_eq!(report.tier, Tier::Great);
    assert_eq!(report.message, "Great Job! Keep practicing!");

    let markdown = MarkdownGenerator::new(&report).generate();
    assert!(markdown.starts_with("# Adventure Complete!"));
    assert!(markdown.contains("Your Score: **3 / 5** (60%)"));
    assert!(markdown.contains("| 3 | 8 + 8 = ? | 15 | 16 | Incorrect |"));
    assert!(markdown.contains("| 5 | 6 + 11 = ? | - | 17 | Incorrect |"));
}

#[tokio::test]
async fn test_failed_generation_returns_to_configuration() {
    let service = MockService::new(vec![
        status_reply(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
        gemini_reply(&addition_batch().to_string()),
    ]);
    let (base_url, _server) = spawn_mock(service.clone()).await;
    let generator = gemini_generator(&base_url);
    let mut flow = GameFlow::new();

    let err = start(&mut flow, &generator, hunt())
        .await
        .expect_err("First generation fails");
    assert!(matches!(err, GameError::Generation(_)));
    assert!(matches!(flow.phase(), Phase::Configuring));
    assert!(flow.view().is_none());

    // The same configuration can be tried again from the configuration screen.
    start(&mut flow, &generator, hunt()).await.expect("Retry should start the game");
    assert!(matches!(flow.phase(), Phase::Playing(_)));
    assert_eq!(service.hits(), 2);
}

#[tokio::test]
async fn test_partial_batch_starts_nothing() {
    let four = json!([
        { "question": "1 + 1", "answer": 2 },
        { "question": "1 + 2", "answer": 3 },
        { "question": "1 + 3", "answer": 4 },
        { "question": "1 + 4", "answer": 5 }
    ]);
    let service = MockService::new(vec![gemini_reply(&four.to_string())]);
    let (base_url, _server) = spawn_mock(service).await;
    let mut flow = GameFlow::new();

    let result = start(&mut flow, &gemini_generator(&base_url), hunt()).await;

    assert!(result.is_err());
    assert!(matches!(flow.phase(), Phase::Configuring));
}

#[tokio::test]
async fn test_balloon_pop_round_trip() {
    let batch = json!([
        { "question": "3 + 4", "answer": 7, "options": [7, 3, 9, 1] },
        { "question": "6 + 2", "answer": 8, "options": [5, 8, 6, 2] }
    ]);
    let service = MockService::new(vec![openai_reply(&batch)]);
    let (base_url, _server) = spawn_mock(service).await;
    let client = OpenAiClient::new("test-key", "gpt-4o-mini", DEFAULT_TIMEOUT)
        .expect("Failed to build client")
        .with_base_url(&base_url);
    let generator = ProblemGenerator::new(Box::new(client));
    let config = GameConfig::new(ClassLevel::P2, Operation::Addition, GameMode::BalloonPop, 2);
    let mut flow = GameFlow::new().with_seed(Some(7));

    start(&mut flow, &generator, config).await.expect("Game should start");

    // Round 1: pop the balloon carrying the answer.
    let view = flow.view().expect("Playing");
    let mut values: Vec<i64> = view.choices.iter().map(|c| c.value).collect();
    values.sort_unstable();
    assert_eq!(values, vec![1, 3, 7, 9]);
    let correct = view.choices.iter().find(|c| c.value == 7).expect("Answer is offered");

    let rejected = flow.submit("Z");
    assert!(matches!(rejected, Err(GameError::RejectedInput(_))));
    assert_eq!(flow.view().expect("Playing").feedback, Feedback::Unanswered);

    assert_eq!(flow.submit(&correct.label.to_string()).expect("Submit"), Feedback::Correct);
    assert_eq!(flow.advance().expect("Advance"), Progress::NextRound);

    // Round 2: pop a wrong balloon by position.
    let view = flow.view().expect("Playing");
    assert_eq!(view.question, "6 + 2 = ?");
    let wrong = view
        .choices
        .iter()
        .position(|c| c.value != 8)
        .expect("Three wrong balloons");
    assert_eq!(flow.submit(&(wrong + 1).to_string()).expect("Submit"), Feedback::Incorrect);
    assert_eq!(flow.view().expect("Playing").revealed_answer, Some(8));

    let Progress::Complete(outcome) = flow.advance().expect("Advance") else {
        panic!("Two rounds were played");
    };
    let report = report_for(&outcome);
    assert_eq!(report.percentage, 50);
    assert_eq!(report.tier, Tier::Great);
    assert_eq!(report.game.mode, "Balloon Pop");
}

#[tokio::test]
async fn test_play_again_keeps_nothing() {
    let service = MockService::new(vec![
        gemini_reply(&json!([{ "question": "2 + 2", "answer": 4 }]).to_string()),
        gemini_reply(&json!([{ "question": "3 + 3", "answer": 6 }]).to_string()),
    ]);
    let (base_url, _server) = spawn_mock(service).await;
    let generator = gemini_generator(&base_url);
    let config = GameConfig::new(ClassLevel::P1, Operation::Addition, GameMode::TreasureHunt, 1);
    let mut flow = GameFlow::new();

    start(&mut flow, &generator, config).await.expect("First game");
    flow.submit("4").expect("Submit");
    flow.advance().expect("Advance");
    assert_eq!(flow.outcome().expect("Complete").score, 1);

    flow.restart().expect("Restart");
    assert!(flow.outcome().is_none());

    start(&mut flow, &generator, config).await.expect("Second game");
    let view = flow.view().expect("Playing");
    assert_eq!(view.question, "3 + 3 = ?");
    assert_eq!(view.score, 0);
}
