// tests/model_tests.rs

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::Utc;
use eduquiz::{
    models::{
        catalog::{Difficulty, Level, QuizSelection, Subject, normalize_subject},
        leaderboard::{LeaderboardEntry, percentage, top_for_subject},
        pending_question::next_id,
        question::{OptionKey, QuizQuestion, RawQuestion},
    },
    trivia::{OpenTriviaClient, QuestionRequest},
};
use rand::{SeedableRng, rngs::StdRng};

fn entry(name: &str, score: u32, subject: &str) -> LeaderboardEntry {
    LeaderboardEntry {
        name: name.to_string(),
        score,
        subject: subject.to_string(),
        level: "JHS".to_string(),
        timestamp: Utc::now(),
    }
}

#[test]
fn every_known_pair_resolves() {
    for subject in ["English", "Mathematics", "Science", "ICT", "Computing"] {
        for level in ["Primary", "JHS", "SHS"] {
            assert!(QuizSelection::resolve(subject, level).is_ok(), "{subject}/{level}");
        }
    }
}

#[test]
fn unknown_pairs_are_rejected() {
    assert!(QuizSelection::resolve("History", "JHS").is_err());
    assert!(QuizSelection::resolve("English", "College").is_err());
    assert!(QuizSelection::resolve("", "").is_err());
}

#[test]
fn subject_and_level_tables() {
    assert_eq!(Subject::parse("English").unwrap().category_id(), 10);
    assert_eq!(Subject::parse("Mathematics").unwrap().category_id(), 19);
    assert_eq!(Subject::parse("Science").unwrap().category_id(), 17);
    assert_eq!(Subject::parse("computing").unwrap().category_id(), 18);
    assert_eq!(Level::parse("Primary").unwrap().difficulty(), Difficulty::Easy);
    assert_eq!(Level::parse("jhs").unwrap().difficulty(), Difficulty::Medium);
    assert_eq!(Level::parse("SHS").unwrap().difficulty(), Difficulty::Hard);
}

#[test]
fn computing_is_stored_as_ict() {
    assert_eq!(normalize_subject("Computing"), "ICT");
    assert_eq!(normalize_subject("ICT"), "ICT");
    assert_eq!(normalize_subject(" mathematics "), "Mathematics");
    assert_eq!(normalize_subject("Math"), "Math");
}

#[test]
fn percentage_rounds_and_handles_empty_quiz() {
    assert_eq!(percentage(0, 0), 0);
    assert_eq!(percentage(7, 10), 70);
    assert_eq!(percentage(2, 3), 67);
    assert_eq!(percentage(1, 8), 13);
    assert_eq!(percentage(10, 10), 100);
}

#[test]
fn leaderboard_filters_sorts_and_truncates() {
    let entries = vec![
        entry("A", 90, "Math"),
        entry("A", 90, "Math"),
        entry("B", 95, "Math"),
        entry("C", 88, "Sci"),
    ];

    let math = top_for_subject(&entries, "Math", 10);
    let names: Vec<(&str, u32)> = math.iter().map(|e| (e.name.as_str(), e.score)).collect();
    assert_eq!(names, vec![("B", 95), ("A", 90), ("A", 90)]);

    let sci = top_for_subject(&entries, "Sci", 10);
    assert_eq!(sci.len(), 1);
    assert_eq!(sci[0].name, "C");

    let many: Vec<LeaderboardEntry> = (0..15).map(|i| entry("L", i, "ICT")).collect();
    let top = top_for_subject(&many, "Computing", 10);
    assert_eq!(top.len(), 10);
    assert_eq!(top[0].score, 14);
    assert_eq!(top[9].score, 5);
}

#[test]
fn decoding_reverses_base64_and_keeps_one_correct_key() {
    let raw = RawQuestion {
        category: String::new(),
        question_type: String::new(),
        difficulty: String::new(),
        question: STANDARD.encode("What is 2 + 2?"),
        correct_answer: STANDARD.encode("4"),
        incorrect_answers: vec![STANDARD.encode("3"), STANDARD.encode("5"), STANDARD.encode("22")],
    };

    let mut seen = std::collections::HashSet::new();
    for seed in 0..40 {
        let question = QuizQuestion::decode(&raw, &mut StdRng::seed_from_u64(seed)).unwrap();
        assert_eq!(question.prompt(), "What is 2 + 2?");
        let keys: Vec<OptionKey> = question.options().iter().map(|o| o.key).collect();
        assert_eq!(keys, OptionKey::ALL.to_vec());
        let correct: Vec<_> = question.options().iter().filter(|o| o.text == "4").collect();
        assert_eq!(correct.len(), 1);
        assert_eq!(correct[0].key, question.correct_option());
        seen.insert(question.correct_option());
    }
    // The correct answer is not pinned to one slot.
    assert!(seen.len() > 1);
}

#[test]
fn duplicate_correct_text_resolves_to_first_slot() {
    let question = QuizQuestion::assemble(
        "Pick one".into(),
        "same".into(),
        vec!["same".into(), "other".into(), "third".into()],
        2,
    )
    .unwrap();

    assert_eq!(question.correct_option(), OptionKey::A);
}

#[test]
fn wrong_answer_count_is_rejected() {
    let result = QuizQuestion::assemble("Q".into(), "yes".into(), vec!["no".into()], 0);

    assert!(result.is_err());
}

#[test]
fn pending_ids_stay_unique() {
    assert_eq!(next_id(1_000, None), 1_000);
    assert_eq!(next_id(1_000, Some(999)), 1_000);
    assert_eq!(next_id(1_000, Some(1_000)), 1_001);
    assert_eq!(next_id(900, Some(1_000)), 1_001);
}

#[test]
fn trivia_url_carries_encoding_and_type() {
    let client = OpenTriviaClient::new("https://opentdb.com/api.php").unwrap();

    let url = client.request_url(QuestionRequest {
        amount: 10,
        category: 19,
        difficulty: Difficulty::Medium,
    });

    assert_eq!(
        url.as_str(),
        "https://opentdb.com/api.php?amount=10&category=19&difficulty=medium&type=multiple&encode=base64"
    );
}

#[test]
fn invalid_trivia_url_is_rejected() {
    assert!(OpenTriviaClient::new("not a url").is_err());
}
