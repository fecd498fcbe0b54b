//! Shared fixture builder: writes a realistic agent export to a temp dir.

use std::fs;
use std::path::Path;

pub fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// A small but complete export: one flow with a healthy page, a dangling
/// page, and a webhook page without an error handler; one thin head intent;
/// one yes/no entity type; one drifted test case.
pub fn seeded_export(root: &Path) {
    write(root, "agent.json", r#"{"displayName": "Support Bot"}"#);
    write(
        root,
        "flows/Main/Main.json",
        r#"{
            "displayName": "Main",
            "transitionRoutes": [
                {"intent": "head.support", "targetPage": "Welcome"}
            ]
        }"#,
    );
    write(
        root,
        "flows/Main/pages/Welcome.json",
        r#"{
            "displayName": "Welcome",
            "entryFulfillment": {"messages": [{"text": {"text": ["What can I help with today?"]}}]},
            "transitionRoutes": [
                {"intent": "confirm", "targetPage": "Checkout"},
                {"condition": "true", "targetPage": "END_FLOW"}
            ]
        }"#,
    );
    write(
        root,
        "flows/Main/pages/Checkout.json",
        r#"{
            "displayName": "Checkout",
            "entryFulfillment": {"webhook": "orders", "messages": []}
        }"#,
    );
    write(
        root,
        "intents/head.support/head.support.json",
        r#"{"labels": {"type": "head intent"}}"#,
    );
    write(
        root,
        "intents/head.support/trainingPhrases/en.json",
        r#"{"trainingPhrases": [
            {"parts": [{"text": "I need help"}]},
            {"parts": [{"text": "support please"}]}
        ]}"#,
    );
    write(
        root,
        "intents/confirm/confirm.json",
        r#"{"labels": {}}"#,
    );
    write(
        root,
        "intents/confirm/trainingPhrases/en.json",
        r#"{"trainingPhrases": [{"parts": [{"text": "yes"}]}]}"#,
    );
    write(
        root,
        "entityTypes/confirmation.json",
        r#"{"displayName": "confirmation", "entities": [
            {"value": "yes", "synonyms": ["yeah"]},
            {"value": "no", "synonyms": ["nope"]}
        ]}"#,
    );
    write(root, "webhooks/orders.json", r#"{"displayName": "orders"}"#);
    write(
        root,
        "testCases/support path.json",
        r##"{
            "displayName": "support path",
            "tags": ["#smoke"],
            "testCaseConversationTurns": [{
                "userInput": {"input": {"text": {"text": ["i need help"]}}},
                "virtualAgentOutput": {"triggeredIntent": {"displayName": "head.support"}}
            }]
        }"##,
    );
}
