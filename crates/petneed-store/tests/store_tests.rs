use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

use petneed_core::traits::Fetcher;
use petneed_core::{Error, Result, SearchCriteria, Species};
use petneed_store::{FileFetcher, PetStore};

/// Replays canned fetch results, then fails once the script runs out.
struct ScriptedFetcher {
    script: Mutex<VecDeque<Result<Vec<u8>>>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    fn new(script: Vec<Result<Vec<u8>>>) -> Arc<Self> {
        Arc::new(Self { script: Mutex::new(script.into()), calls: AtomicUsize::new(0) })
    }

    fn calls(&self) -> usize { self.calls.load(Ordering::SeqCst) }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut script = self.script.lock().expect("script lock");
        match script.pop_front() {
            Some(next) => next,
            None => Err(Error::fetch(url, "script exhausted")),
        }
    }
}

/// Answers every fetch with the same payload after a delay.
struct SlowFetcher {
    payload: Vec<u8>,
    delay: Duration,
    calls: AtomicUsize,
}

#[async_trait]
impl Fetcher for SlowFetcher {
    async fn fetch(&self, _url: &str) -> Result<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        Ok(self.payload.clone())
    }
}

fn envelope(rows: serde_json::Value) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec(&json!({"result": {"offset": 0, "limit": 100, "count": 0, "results": rows}})).expect("json"))
}

fn shelter() -> Result<Vec<u8>> {
    envelope(json!([
        {"_id": "1", "Name": "阿白", "Type": "犬", "Variety": "狗", "HairType": "白底黑斑"},
        {"_id": "2", "Name": "小花", "Type": "貓", "Variety": "貓", "HairType": "白"},
        {"_id": "3", "Name": "阿黑", "Type": "犬", "Variety": "狗", "HairType": "黑"},
        {"_id": "4", "Name": "兔兔", "Type": "兔", "Variety": "兔", "HairType": "白"}
    ]))
}

fn dogs_only() -> Result<Vec<u8>> {
    envelope(json!([
        {"_id": "10", "Type": "犬"},
        {"_id": "11", "Type": "犬"}
    ]))
}

async fn store_with(script: Vec<Result<Vec<u8>>>) -> (PetStore, Arc<ScriptedFetcher>) {
    let fetcher = ScriptedFetcher::new(script);
    (PetStore::new(fetcher.clone(), "mem://pets"), fetcher)
}

#[tokio::test]
async fn rotation_visits_every_pet_once_before_repeating() {
    let (store, _) = store_with(vec![shelter()]).await;
    let store = store.open().await.expect("open");
    let count = store.count().await;
    assert_eq!(count, 4);
    let mut seen = Vec::new();
    for _ in 0..count { seen.push(store.next().await.expect("next").expect("pet").id); }
    assert_eq!(seen, ["1", "2", "3", "4"]);
    assert_eq!(store.next().await.expect("next").expect("pet").id, "1", "wraps to the start");
}

#[tokio::test]
async fn first_next_loads_lazily_once() {
    let (store, fetcher) = store_with(vec![shelter()]).await;
    assert_eq!(store.count().await, 0);
    assert_eq!(store.next().await.expect("next").expect("pet").id, "1");
    assert_eq!(store.next().await.expect("next").expect("pet").id, "2");
    assert_eq!(fetcher.calls(), 1);
}

#[tokio::test]
async fn concurrent_first_calls_share_one_lazy_load() {
    let fetcher = Arc::new(SlowFetcher {
        payload: shelter().expect("payload"),
        delay: Duration::from_millis(50),
        calls: AtomicUsize::new(0),
    });
    let store = PetStore::new(fetcher.clone(), "mem://pets");
    let (a, b) = tokio::join!(store.next(), store.next());
    let a = a.expect("next").expect("pet");
    let b = b.expect("next").expect("pet");
    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_ne!(a.id, b.id, "each caller advances the cursor");
    assert_eq!(store.cursor().await, 2);
}

#[tokio::test]
async fn empty_upstream_yields_no_pet() {
    let (store, fetcher) = store_with(vec![envelope(json!([])), envelope(json!([]))]).await;
    assert!(store.next().await.expect("next").is_none());
    assert!(store.next_of_species(Species::Dog).await.expect("next dog").is_none());
    assert_eq!(fetcher.calls(), 2, "each call on an empty store retries the load once");
}

#[tokio::test]
async fn lazy_load_failure_is_surfaced() {
    let (store, _) = store_with(vec![Err(Error::fetch("mem://pets", "offline"))]).await;
    assert!(matches!(store.next().await, Err(Error::Fetch { .. })));
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn open_surfaces_parse_errors() {
    let (store, _) = store_with(vec![Ok(b"<html>maintenance</html>".to_vec())]).await;
    assert!(matches!(store.open().await, Err(Error::Parse(_))));
}

#[tokio::test]
async fn species_rotation_skips_other_kinds() {
    let (store, _) = store_with(vec![shelter()]).await;
    let store = store.open().await.expect("open");
    let first = store.next_of_species(Species::Dog).await.expect("dog").expect("a dog");
    let second = store.next_of_species(Species::Dog).await.expect("dog").expect("a dog");
    assert_eq!((first.id.as_str(), second.id.as_str()), ("1", "3"));
    let third = store.next_of_species(Species::Dog).await.expect("dog").expect("a dog");
    assert_eq!(third.id, "1", "rotation wraps past the end");
    let cat = store.next_of_species(Species::Cat).await.expect("cat").expect("a cat");
    assert_eq!(cat.name, "小花");
}

#[tokio::test]
async fn species_rotation_terminates_without_matches() {
    let (store, _) = store_with(vec![dogs_only()]).await;
    let store = store.open().await.expect("open");
    store.next().await.expect("next");
    assert!(store.next_of_species(Species::Cat).await.expect("cat").is_none());
    assert_eq!(store.next().await.expect("next").expect("pet").id, "11", "a full pass lands back on the same position");
}

#[tokio::test]
async fn by_id_finds_exact_identifier_without_moving_cursor() {
    let (store, _) = store_with(vec![shelter()]).await;
    let store = store.open().await.expect("open");
    store.next().await.expect("next");
    assert_eq!(store.by_id("3").await.expect("found").name, "阿黑");
    assert!(store.by_id("30").await.is_none());
    assert!(store.by_id("").await.is_none());
    assert!(matches!(store.get("30").await, Err(Error::NotFound(_))));
    assert_eq!(store.cursor().await, 1);
}

#[tokio::test]
async fn search_preserves_collection_order() {
    let (store, _) = store_with(vec![shelter()]).await;
    let store = store.open().await.expect("open");
    let all: Vec<String> = store.search(&SearchCriteria::new()).await.into_iter().map(|p| p.id).collect();
    assert_eq!(all, ["1", "2", "3", "4"]);
    let white_dogs = store.search(&SearchCriteria::new().kind("狗").color("白")).await;
    assert_eq!(white_dogs.len(), 1);
    assert_eq!(white_dogs[0].id, "1");
    assert!(store.search(&SearchCriteria::new().kind("鳥")).await.is_empty());
}

#[tokio::test]
async fn failed_reload_keeps_previous_state() {
    let script = vec![shelter(), Err(Error::fetch("mem://pets", "timeout")), Ok(b"{not json".to_vec())];
    let (store, _) = store_with(script).await;
    let store = store.open().await.expect("open");
    store.next().await.expect("next");
    store.next().await.expect("next");
    assert!(matches!(store.load().await, Err(Error::Fetch { .. })));
    assert!(matches!(store.load().await, Err(Error::Parse(_))));
    assert_eq!(store.count().await, 4);
    assert_eq!(store.cursor().await, 2);
    assert_eq!(store.next().await.expect("next").expect("pet").id, "3");
}

#[tokio::test]
async fn successful_reload_replaces_collection_and_resets_cursor() {
    let (store, _) = store_with(vec![shelter(), dogs_only()]).await;
    let store = store.open().await.expect("open");
    let before = store.snapshot().await;
    store.next().await.expect("next");
    assert_eq!(store.load().await.expect("reload"), 2);
    assert_eq!(store.cursor().await, 0);
    assert_eq!(store.next().await.expect("next").expect("pet").id, "10");
    assert_eq!(before.len(), 4, "earlier snapshots are unaffected by a reload");
}

#[tokio::test]
async fn file_fetcher_reads_local_snapshots() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pets.json");
    std::fs::write(&path, shelter().expect("payload")).expect("write");
    let url = format!("file://{}", path.display());
    assert!(FileFetcher::handles(&url));
    assert!(!FileFetcher::handles("https://data.example/pets"));
    let store = PetStore::new(Arc::new(FileFetcher), url).open().await.expect("open");
    assert_eq!(store.count().await, 4);
    let missing = PetStore::new(Arc::new(FileFetcher), dir.path().join("absent.json").display().to_string());
    assert!(matches!(missing.load().await, Err(Error::Fetch { .. })));
}
