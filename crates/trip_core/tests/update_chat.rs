use trip_core::{update, AppState, ChatMessage, ChatRole, Effect, Msg, SessionId, TripPreferences};

fn init_logging() {
    trip_logging::initialize_for_tests();
}

fn with_session() -> AppState {
    let (state, _) = update(
        AppState::new(),
        Msg::StartRequested(TripPreferences::for_destination("Lisbon")),
    );
    let (state, _) = update(
        state,
        Msg::SessionCreated {
            generation: 1,
            session_id: SessionId::new("lx1"),
        },
    );
    state
}

#[test]
fn blank_questions_are_noops() {
    init_logging();
    let state = with_session();
    let (state, effects) = update(state, Msg::ChatSubmitted(String::new()));
    assert!(effects.is_empty());
    let (state, effects) = update(state, Msg::ChatSubmitted("   ".to_string()));
    assert!(effects.is_empty());
    assert!(state.view().chat.is_empty());
}

#[test]
fn question_is_appended_before_the_request() {
    init_logging();
    let (state, effects) = update(with_session(), Msg::ChatSubmitted("Best tram line?".into()));
    assert_eq!(
        effects,
        vec![Effect::AskQuestion {
            generation: 1,
            session_id: SessionId::new("lx1"),
            question: "Best tram line?".to_string(),
        }]
    );
    let view = state.view();
    assert_eq!(view.chat, vec![ChatMessage::user("Best tram line?")]);
    assert!(view.chat_pending);

    let (state, _) = update(
        state,
        Msg::ChatAnswered {
            generation: 1,
            result: Ok("Tram 28.".to_string()),
        },
    );
    let view = state.view();
    assert_eq!(view.chat.len(), 2);
    assert_eq!(view.chat[1], ChatMessage::assistant("Tram 28."));
    assert!(!view.chat_pending);
}

#[test]
fn failed_request_appends_one_error_message() {
    init_logging();
    let (state, _) = update(with_session(), Msg::ChatSubmitted("Visa?".into()));
    let (state, effects) = update(
        state,
        Msg::ChatAnswered {
            generation: 1,
            result: Err("Chat error: Bad Request".to_string()),
        },
    );
    assert!(effects.is_empty());
    let chat = state.view().chat;
    assert_eq!(chat.len(), 2);
    assert_eq!(chat[1].role, ChatRole::Assistant);
    assert_eq!(chat[1].content, "Error: Chat error: Bad Request");
}

#[test]
fn submissions_while_pending_are_rejected() {
    init_logging();
    let (state, _) = update(with_session(), Msg::ChatSubmitted("One".into()));
    let (state, effects) = update(state, Msg::ChatSubmitted("Two".into()));
    assert!(effects.is_empty());
    assert_eq!(state.view().chat.len(), 1);
}

#[test]
fn chat_without_session_is_ignored() {
    let (state, effects) = update(AppState::new(), Msg::ChatSubmitted("Hello".into()));
    assert!(effects.is_empty());
    assert!(state.view().chat.is_empty());
}

#[test]
fn new_session_clears_transcript_and_drops_stale_answers() {
    init_logging();
    let (state, _) = update(with_session(), Msg::ChatSubmitted("Old question".into()));
    let (state, _) = update(state, Msg::ResetRequested);
    assert!(state.view().chat.is_empty());

    let (state, _) = update(
        state,
        Msg::ChatAnswered {
            generation: 1,
            result: Ok("late answer".to_string()),
        },
    );
    assert!(state.view().chat.is_empty());
}

#[test]
fn clear_empties_transcript() {
    init_logging();
    let (state, _) = update(with_session(), Msg::ChatSubmitted("Q".into()));
    let (state, _) = update(
        state,
        Msg::ChatAnswered {
            generation: 1,
            result: Ok("A".to_string()),
        },
    );
    let (state, _) = update(state, Msg::ChatCleared);
    assert!(state.view().chat.is_empty());
}

#[test]
fn clear_while_waiting_does_not_start_a_second_request() {
    init_logging();
    let (state, effects) = update(with_session(), Msg::ChatSubmitted("Q1".into()));
    assert_eq!(effects.len(), 1);
    let (state, effects) = update(state, Msg::ChatCleared);
    assert!(effects.is_empty());
    assert!(state.view().chat.is_empty());
    assert!(state.view().chat_pending);

    let (state, effects) = update(state, Msg::ChatSubmitted("Q2".into()));
    assert!(effects.is_empty());
    assert!(state.view().chat.is_empty());

    let (state, _) = update(
        state,
        Msg::ChatAnswered {
            generation: 1,
            result: Ok("answer to Q1".to_string()),
        },
    );
    let view = state.view();
    assert_eq!(view.chat, vec![ChatMessage::assistant("answer to Q1")]);
    assert!(!view.chat_pending);

    let (state, effects) = update(state, Msg::ChatSubmitted("Q2".into()));
    assert_eq!(
        effects,
        vec![Effect::AskQuestion {
            generation: 1,
            session_id: SessionId::new("lx1"),
            question: "Q2".to_string(),
        }]
    );
    assert!(state.view().chat_pending);
}

#[test]
fn new_session_releases_the_pending_request() {
    init_logging();
    let (state, _) = update(with_session(), Msg::ChatSubmitted("Q1".into()));
    let (state, _) = update(state, Msg::RegenerateRequested);
    assert!(!state.view().chat_pending);
}
