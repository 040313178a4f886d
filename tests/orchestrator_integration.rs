// ABOUTME: Integration tests for the send orchestrator driven through its public API.
// ABOUTME: Covers ordering, the busy bracket, guards, failure recovery, and concurrent submits.

use std::sync::Arc;

use texbot::responder::ScriptedResponder;
use texbot::session::{
    DEFAULT_ERROR_TEXT, Role, SendOrchestrator, SendPhase, SessionEvent, SubmitError,
};

fn roles_and_texts(orch: &SendOrchestrator) -> Vec<(Role, String)> {
    orch.snapshot()
        .iter()
        .map(|e| (e.role(), e.text().to_string()))
        .collect()
}

#[tokio::test]
async fn successful_exchange_appends_user_then_assistant() {
    let responder = Arc::new(ScriptedResponder::replying(
        "Cotton is a soft, breathable natural fibre.",
    ));
    let mut orch = SendOrchestrator::new(responder.clone());

    let reply = orch.send("What is cotton?").await.unwrap();

    assert_eq!(
        roles_and_texts(&orch),
        vec![
            (Role::User, "What is cotton?".to_string()),
            (
                Role::Assistant,
                "Cotton is a soft, breathable natural fibre.".to_string()
            ),
        ]
    );
    assert_eq!(reply.value(), 1);
    assert!(!orch.is_busy());
    assert_eq!(responder.received().lock().unwrap().as_slice(), ["What is cotton?"]);
}

#[tokio::test]
async fn failure_appends_fixed_error_text_and_recovers() {
    let responder = Arc::new(ScriptedResponder::new(vec![
        Err("connection refused".to_string()),
        Ok("Silk is a protein fibre.".to_string()),
    ]));
    let mut orch = SendOrchestrator::new(responder);

    orch.send("Hi").await.unwrap();
    assert_eq!(orch.snapshot()[1].text(), DEFAULT_ERROR_TEXT);
    assert_eq!(orch.phase(), SendPhase::Idle);

    // The next submission proceeds normally.
    orch.send("What is silk?").await.unwrap();
    let entries = orch.snapshot();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3].role(), Role::Assistant);
    assert_eq!(entries[3].text(), "Silk is a protein fibre.");
}

#[tokio::test]
async fn blank_submissions_change_nothing() {
    let responder = Arc::new(ScriptedResponder::replying("unused"));
    let mut orch = SendOrchestrator::new(responder.clone());
    let mut events = orch.subscribe();

    assert_eq!(orch.submit(""), Err(SubmitError::EmptySubmission));
    assert_eq!(orch.submit("   \n\t"), Err(SubmitError::EmptySubmission));

    assert!(orch.snapshot().is_empty());
    assert!(!orch.is_busy());
    assert!(events.try_recv().is_err(), "no notifications for rejected input");
    assert!(responder.received().lock().unwrap().is_empty());
}

#[tokio::test]
async fn second_submit_while_sending_is_dropped() {
    let (responder, gate) = ScriptedResponder::replying("A").gated();
    let responder = Arc::new(responder);
    let mut orch = SendOrchestrator::new(responder.clone());

    orch.submit("a").unwrap();
    assert_eq!(orch.submit("b"), Err(SubmitError::AlreadyBusy));
    assert_eq!(orch.phase(), SendPhase::Sending);

    gate.notify_one();
    orch.settle().await;

    assert_eq!(
        roles_and_texts(&orch),
        vec![(Role::User, "a".to_string()), (Role::Assistant, "A".to_string())]
    );
    assert_eq!(responder.received().lock().unwrap().as_slice(), ["a"]);
}

#[tokio::test]
async fn busy_is_visible_while_request_is_pending() {
    let (responder, gate) = ScriptedResponder::replying("Wool insulates well.").gated();
    let mut orch = SendOrchestrator::new(Arc::new(responder));

    orch.submit("Is wool warm?").unwrap();
    assert!(orch.is_busy());
    assert_eq!(orch.snapshot().len(), 1, "user entry is appended before the reply");

    gate.notify_one();
    orch.settle().await;
    assert!(!orch.is_busy());
}

#[tokio::test]
async fn notifications_bracket_each_exchange() {
    let mut orch = SendOrchestrator::new(Arc::new(ScriptedResponder::replying("Yes.")));
    let mut events = orch.subscribe();

    orch.send("Is linen durable?").await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    assert_eq!(seen.len(), 4);
    assert!(matches!(&seen[0], SessionEvent::EntryAppended(e) if e.role() == Role::User));
    assert_eq!(seen[1], SessionEvent::BusyChanged(true));
    assert!(matches!(&seen[2], SessionEvent::EntryAppended(e) if e.role() == Role::Assistant));
    assert_eq!(seen[3], SessionEvent::BusyChanged(false));
}

#[tokio::test]
async fn ids_increase_and_are_never_reused() {
    let mut orch = SendOrchestrator::new(Arc::new(ScriptedResponder::new(vec![
        Ok("one".to_string()),
        Err("boom".to_string()),
        Ok("three".to_string()),
    ])));

    for msg in ["first", "second", "third"] {
        orch.send(msg).await.unwrap();
    }

    let ids: Vec<u64> = orch.snapshot().iter().map(|e| e.id().value()).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5]);
}

#[tokio::test]
async fn roles_alternate_user_then_assistant() {
    let mut orch = SendOrchestrator::new(Arc::new(ScriptedResponder::new(vec![
        Ok("r1".to_string()),
        Err("down".to_string()),
        Ok("r3".to_string()),
    ])));
    orch.send("m1").await.unwrap();
    orch.send("m2").await.unwrap();
    orch.send("m3").await.unwrap();

    for (i, entry) in orch.snapshot().iter().enumerate() {
        let expected = if i % 2 == 0 { Role::User } else { Role::Assistant };
        assert_eq!(entry.role(), expected, "entry {} has the wrong role", i);
    }
}

#[tokio::test]
async fn untrimmed_text_is_sent_and_stored() {
    let responder = Arc::new(ScriptedResponder::replying("ok"));
    let mut orch = SendOrchestrator::new(responder.clone());

    orch.send("  What is  jute? \n").await.unwrap();

    assert_eq!(orch.snapshot()[0].text(), "  What is  jute? \n");
    assert_eq!(
        responder.received().lock().unwrap().as_slice(),
        ["  What is  jute? \n"]
    );
}
