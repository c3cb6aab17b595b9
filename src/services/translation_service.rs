use chrono::Utc;
use mongodb::bson::doc;
use mongodb::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::sync::Arc;

use crate::services::llm_service::{parse_llm_json, TextCompletion};

/// Content-addressed store for translation results. Entries are written
/// once and never evicted.
pub trait TranslationStore {
    fn get(&self, key: &str) -> impl std::future::Future<Output = Option<Value>> + Send;
    fn put(
        &self,
        key: &str,
        translated: &Value,
        source_lang: &str,
        target_lang: &str,
    ) -> impl std::future::Future<Output = ()> + Send;
}

#[derive(Debug, Serialize, Deserialize)]
struct TranslationEntry {
    key: String,
    translated: Value,
    source_lang: String,
    target_lang: String,
    created_at: chrono::DateTime<Utc>,
}

#[derive(Clone)]
pub struct MongoTranslationStore {
    client: Arc<Client>,
}

impl MongoTranslationStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> mongodb::Collection<TranslationEntry> {
        self.client.database("Cache").collection("TranslationCache")
    }
}

impl TranslationStore for MongoTranslationStore {
    async fn get(&self, key: &str) -> Option<Value> {
        match self.collection().find_one(doc! { "key": key }).await {
            Ok(Some(entry)) => Some(entry.translated),
            Ok(None) => None,
            Err(e) => {
                eprintln!("Translation cache lookup failed: {}", e);
                None
            }
        }
    }

    async fn put(&self, key: &str, translated: &Value, source_lang: &str, target_lang: &str) {
        let entry = TranslationEntry {
            key: key.to_string(),
            translated: translated.clone(),
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            created_at: Utc::now(),
        };
        if let Err(e) = self.collection().insert_one(&entry).await {
            eprintln!("Translation cache write failed: {}", e);
        }
    }
}

/// SHA-256 over the document plus the language pair.
pub fn content_hash(document: &Value, source_lang: &str, target_lang: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(document.to_string().as_bytes());
    hasher.update(source_lang.as_bytes());
    hasher.update(target_lang.as_bytes());
    hex::encode(hasher.finalize())
}

fn build_translation_prompt(document: &Value, source_lang: &str, target_lang: &str) -> String {
    format!(
        "Translate the string VALUES of the following JSON document from {source} to {target}. \
         Do NOT translate keys, numbers, dates, codes or URLs. \
         Respond with ONLY the translated JSON document, no commentary.\n\n{doc}",
        source = source_lang,
        target = target_lang,
        doc = document,
    )
}

/// Translate a JSON document, going through the content-addressed cache.
///
/// Identical language pair is a passthrough with no LLM call. On a cache
/// miss the LLM reply is parsed strictly; any failure (call or parse)
/// returns the ORIGINAL document — translation fails open so user-facing
/// responses are never blocked on it.
pub async fn translate<L: TextCompletion, S: TranslationStore>(
    llm: &L,
    store: &S,
    document: &Value,
    source_lang: &str,
    target_lang: &str,
) -> Value {
    if source_lang == target_lang {
        return document.clone();
    }

    let key = content_hash(document, source_lang, target_lang);
    if let Some(cached) = store.get(&key).await {
        return cached;
    }

    let prompt = build_translation_prompt(document, source_lang, target_lang);
    let reply = match llm.complete(&prompt).await {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Translation LLM call failed: {}", e);
            return document.clone();
        }
    };

    match parse_llm_json(&reply) {
        Ok(translated) => {
            store.put(&key, &translated, source_lang, target_lang).await;
            translated
        }
        Err(_) => {
            eprintln!("Translation reply was not valid JSON; returning untranslated document");
            document.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::llm_service::LlmError;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct CountingLlm {
        calls: AtomicUsize,
        reply: String,
    }

    impl CountingLlm {
        fn new(reply: &str) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                reply: reply.to_string(),
            }
        }
    }

    impl TextCompletion for CountingLlm {
        async fn complete(&self, _prompt: &str) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.reply.clone())
        }
    }

    #[derive(Default)]
    struct MemoryStore {
        entries: Mutex<HashMap<String, Value>>,
    }

    impl TranslationStore for MemoryStore {
        async fn get(&self, key: &str) -> Option<Value> {
            self.entries.lock().unwrap().get(key).cloned()
        }

        async fn put(&self, key: &str, translated: &Value, _source: &str, _target: &str) {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), translated.clone());
        }
    }

    #[tokio::test]
    async fn second_identical_call_is_a_cache_hit() {
        let llm = CountingLlm::new(r#"{"greeting": "नमस्ते"}"#);
        let store = MemoryStore::default();
        let doc = json!({"greeting": "hello"});

        let first = translate(&llm, &store, &doc, "en", "hi").await;
        let second = translate(&llm, &store, &doc, "en", "hi").await;

        assert_eq!(first["greeting"], "नमस्ते");
        assert_eq!(second, first);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_language_pair_is_a_passthrough() {
        let llm = CountingLlm::new(r#"{"greeting": "should never be used"}"#);
        let store = MemoryStore::default();
        let doc = json!({"greeting": "hello"});

        let result = translate(&llm, &store, &doc, "en", "en").await;

        assert_eq!(result, doc);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unparseable_reply_fails_open() {
        let llm = CountingLlm::new("sorry, I can't translate that");
        let store = MemoryStore::default();
        let doc = json!({"greeting": "hello"});

        let result = translate(&llm, &store, &doc, "en", "fr").await;

        assert_eq!(result, doc);
        // failure is not cached; a retry gets another chance
        assert!(store.entries.lock().unwrap().is_empty());
    }

    #[test]
    fn hash_is_sensitive_to_document_and_language_pair() {
        let doc = json!({"a": 1});
        let base = content_hash(&doc, "en", "hi");
        assert_ne!(base, content_hash(&doc, "en", "fr"));
        assert_ne!(base, content_hash(&json!({"a": 2}), "en", "hi"));
        assert_eq!(base, content_hash(&doc, "en", "hi"));
    }
}
