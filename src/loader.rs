//! Loads a directory-shaped agent export into a [`ResourceTree`].
//!
//! Layout: each flow is a named unit (`flows/<name>/<name>.json` plus a
//! `pages/` collection); intents carry a companion metadata record and
//! per-language training phrase files; entity types, webhooks, and test
//! cases are flat collections of JSON records.
//!
//! A missing `flows/` collection is fatal — graph construction cannot
//! proceed. A malformed individual record is a data-integrity diagnostic and
//! the record is skipped, so one bad file never hides the rest of the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::config::RuleConfig;
use crate::diagnostics::{Diagnostic, ResourceKind};
use crate::engine::RuleCode;
use crate::errors::{LintError, Result};
use crate::models::{
    EntityType, Flow, FlowRecord, Intent, IntentMetadata, Page, ResourceTree, TestCase,
    TrainingPhrase, Webhook,
};

/// The loaded tree plus integrity findings gathered while reading it.
#[derive(Debug, Default)]
pub struct LoadedAgent {
    pub tree: ResourceTree,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AgentRecord {
    #[serde(default)]
    display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainingPhraseFile {
    #[serde(default)]
    training_phrases: Vec<TrainingPhrase>,
}

/// Load an agent export from `root`.
///
/// # Errors
///
/// Returns an error if `root` is not a readable directory or the `flows/`
/// collection is absent.
pub fn load_agent(root: &Path, config: &RuleConfig) -> Result<LoadedAgent> {
    if !root.is_dir() {
        return Err(LintError::AgentNotFound {
            path: root.to_path_buf(),
        });
    }
    let flows_dir = root.join("flows");
    if !flows_dir.is_dir() {
        return Err(LintError::MissingCollection {
            collection: "flows",
        });
    }

    let mut loaded = LoadedAgent::default();
    loaded.tree.display_name = agent_display_name(root);

    for flow_dir in sorted_dirs(&flows_dir)? {
        load_flow(&flow_dir, &mut loaded);
    }

    let intents_dir = root.join("intents");
    if intents_dir.is_dir() {
        for intent_dir in sorted_dirs(&intents_dir)? {
            load_intent(&intent_dir, config, &mut loaded);
        }
    }

    load_flat::<EntityType>(
        &root.join("entityTypes"),
        ResourceKind::EntityType,
        &mut loaded,
        |tree, record| tree.entity_types.push(record),
    )?;
    load_flat::<Webhook>(
        &root.join("webhooks"),
        ResourceKind::Webhook,
        &mut loaded,
        |tree, record| tree.webhooks.push(record),
    )?;
    load_flat::<TestCase>(
        &root.join("testCases"),
        ResourceKind::TestCase,
        &mut loaded,
        |tree, record| tree.test_cases.push(record),
    )?;

    Ok(loaded)
}

fn agent_display_name(root: &Path) -> String {
    let agent_file = root.join("agent.json");
    if let Ok(content) = fs::read_to_string(&agent_file) {
        if let Ok(record) = serde_json::from_str::<AgentRecord>(&content) {
            if !record.display_name.is_empty() {
                return record.display_name;
            }
        }
    }
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string()
}

fn load_flow(flow_dir: &Path, loaded: &mut LoadedAgent) {
    let flow_name = file_stem(flow_dir);
    let record_path = flow_dir.join(format!("{flow_name}.json"));
    let Some(mut record) =
        read_record::<FlowRecord>(&record_path, ResourceKind::Flow, &flow_name, loaded)
    else {
        return;
    };
    if record.display_name.is_empty() {
        record.display_name = flow_name.clone();
    }

    let mut pages = Vec::new();
    let pages_dir = flow_dir.join("pages");
    if pages_dir.is_dir() {
        if let Ok(files) = sorted_files(&pages_dir) {
            for page_path in files {
                let page_name = file_stem(&page_path);
                let Some(mut page) =
                    read_record::<Page>(&page_path, ResourceKind::Page, &page_name, loaded)
                else {
                    continue;
                };
                if page.display_name.is_empty() {
                    page.display_name = page_name;
                }
                pages.push(page);
            }
        }
    }

    loaded.tree.flows.push(Flow { record, pages });
}

fn load_intent(intent_dir: &Path, config: &RuleConfig, loaded: &mut LoadedAgent) {
    let display_name = file_stem(intent_dir);

    // The companion metadata record; absence is R010's finding, not ours.
    let metadata_path = intent_dir.join(format!("{display_name}.json"));
    let metadata = if metadata_path.is_file() {
        read_record::<IntentMetadata>(&metadata_path, ResourceKind::Intent, &display_name, loaded)
    } else {
        None
    };

    let phrases_path = intent_dir
        .join("trainingPhrases")
        .join(format!("{}.json", config.language_code));
    let training_phrases = if phrases_path.is_file() {
        read_record::<TrainingPhraseFile>(
            &phrases_path,
            ResourceKind::Intent,
            &display_name,
            loaded,
        )
        .map(|f| f.training_phrases)
        .unwrap_or_default()
    } else {
        Vec::new()
    };

    loaded.tree.intents.push(Intent {
        display_name,
        metadata,
        training_phrases,
        language_code: config.language_code.clone(),
    });
}

fn load_flat<T: DeserializeOwned>(
    dir: &Path,
    kind: ResourceKind,
    loaded: &mut LoadedAgent,
    push: fn(&mut ResourceTree, T),
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }
    for path in sorted_files(dir)? {
        let name = file_stem(&path);
        if let Some(record) = read_record::<T>(&path, kind, &name, loaded) {
            push(&mut loaded.tree, record);
        }
    }
    Ok(())
}

/// Read and parse one JSON record. Failures become integrity diagnostics.
fn read_record<T: DeserializeOwned>(
    path: &Path,
    kind: ResourceKind,
    display_name: &str,
    loaded: &mut LoadedAgent,
) -> Option<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            loaded.diagnostics.push(Diagnostic::error(
                RuleCode::R000,
                kind,
                display_name,
                format!("cannot read record {}: {e}", path.display()),
            ));
            return None;
        }
    };
    match serde_json::from_str(&content) {
        Ok(record) => Some(record),
        Err(e) => {
            loaded.diagnostics.push(Diagnostic::error(
                RuleCode::R000,
                kind,
                display_name,
                format!("malformed record {}: {e}", path.display()),
            ));
            None
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

/// Subdirectories of `dir`, sorted by name for deterministic runs.
fn sorted_dirs(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    Ok(dirs)
}

/// JSON files in `dir`, sorted by name.
fn sorted_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|e| e == "json"))
        .collect();
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn minimal_export(root: &Path) {
        write(root, "agent.json", r#"{"displayName": "Support Bot"}"#);
        write(
            root,
            "flows/Main/Main.json",
            r#"{"displayName": "Main", "transitionRoutes": [{"intent": "greet", "targetPage": "Welcome"}]}"#,
        );
        write(
            root,
            "flows/Main/pages/Welcome.json",
            r#"{"displayName": "Welcome", "transitionRoutes": [{"condition": "true", "targetPage": "END_FLOW"}]}"#,
        );
        write(
            root,
            "intents/greet/greet.json",
            r#"{"labels": {"head": "true"}}"#,
        );
        write(
            root,
            "intents/greet/trainingPhrases/en.json",
            r#"{"trainingPhrases": [{"parts": [{"text": "hello"}]}]}"#,
        );
        write(
            root,
            "entityTypes/sizes.json",
            r#"{"displayName": "sizes", "entities": [{"value": "large", "synonyms": ["big"]}]}"#,
        );
        write(root, "webhooks/orders.json", r#"{"displayName": "orders"}"#);
        write(
            root,
            "testCases/smoke.json",
            r##"{"displayName": "smoke", "tags": ["#smoke"]}"##,
        );
    }

    #[test]
    fn loads_full_export() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());

        let loaded = load_agent(dir.path(), &RuleConfig::default()).unwrap();
        assert!(loaded.diagnostics.is_empty(), "{:?}", loaded.diagnostics);

        let tree = &loaded.tree;
        assert_eq!(tree.display_name, "Support Bot");
        assert_eq!(tree.flows.len(), 1);
        assert_eq!(tree.flows[0].display_name(), "Main");
        assert_eq!(tree.flows[0].pages.len(), 1);
        assert_eq!(tree.flows[0].pages[0].display_name, "Welcome");
        assert_eq!(tree.intents.len(), 1);
        assert_eq!(tree.intents[0].training_phrases.len(), 1);
        assert!(tree.intents[0].metadata.is_some());
        assert_eq!(tree.entity_types.len(), 1);
        assert_eq!(tree.webhooks.len(), 1);
        assert_eq!(tree.test_cases.len(), 1);
    }

    #[test]
    fn missing_root_is_fatal() {
        let err = load_agent(Path::new("/no/such/export"), &RuleConfig::default()).unwrap_err();
        assert!(matches!(err, LintError::AgentNotFound { .. }));
    }

    #[test]
    fn missing_flows_collection_is_fatal() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "agent.json", "{}");
        let err = load_agent(dir.path(), &RuleConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            LintError::MissingCollection { collection: "flows" }
        ));
    }

    #[test]
    fn malformed_page_is_diagnostic_not_crash() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());
        write(dir.path(), "flows/Main/pages/Broken.json", "{not json");

        let loaded = load_agent(dir.path(), &RuleConfig::default()).unwrap();
        assert_eq!(loaded.diagnostics.len(), 1);
        assert_eq!(loaded.diagnostics[0].code, RuleCode::R000);
        assert!(loaded.diagnostics[0].is_error());
        assert!(loaded.diagnostics[0].message.contains("Broken.json"));
        // The good page still loaded.
        assert_eq!(loaded.tree.flows[0].pages.len(), 1);
    }

    #[test]
    fn intent_without_metadata_record_loads_with_none() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());
        write(
            dir.path(),
            "intents/orphan/trainingPhrases/en.json",
            r#"{"trainingPhrases": []}"#,
        );

        let loaded = load_agent(dir.path(), &RuleConfig::default()).unwrap();
        let orphan = loaded
            .tree
            .intents
            .iter()
            .find(|i| i.display_name == "orphan")
            .unwrap();
        assert!(orphan.metadata.is_none());
    }

    #[test]
    fn training_phrases_follow_configured_language() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());
        write(
            dir.path(),
            "intents/greet/trainingPhrases/de.json",
            r#"{"trainingPhrases": [{"parts": [{"text": "hallo"}]}, {"parts": [{"text": "guten tag"}]}]}"#,
        );

        let config = crate::config::parse_config("intents:\n  language_code: de\n").unwrap();
        let loaded = load_agent(dir.path(), &config).unwrap();
        let greet = &loaded.tree.intents[0];
        assert_eq!(greet.language_code, "de");
        assert_eq!(greet.training_phrases.len(), 2);
    }

    #[test]
    fn agent_display_name_falls_back_to_directory() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());
        fs::remove_file(dir.path().join("agent.json")).unwrap();

        let loaded = load_agent(dir.path(), &RuleConfig::default()).unwrap();
        assert_eq!(
            loaded.tree.display_name,
            dir.path().file_name().unwrap().to_str().unwrap()
        );
    }

    #[test]
    fn load_order_is_deterministic() {
        let dir = TempDir::new().unwrap();
        minimal_export(dir.path());
        write(dir.path(), "flows/Main/pages/Alpha.json", r#"{"displayName": "Alpha"}"#);
        write(dir.path(), "flows/Main/pages/Zulu.json", r#"{"displayName": "Zulu"}"#);

        let config = RuleConfig::default();
        let first = load_agent(dir.path(), &config).unwrap();
        let second = load_agent(dir.path(), &config).unwrap();
        let names = |l: &LoadedAgent| {
            l.tree.flows[0]
                .pages
                .iter()
                .map(|p| p.display_name.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(names(&first), names(&second));
        assert_eq!(names(&first), vec!["Alpha", "Welcome", "Zulu"]);
    }
}
