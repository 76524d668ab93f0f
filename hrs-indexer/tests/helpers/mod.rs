//! Shared fakes for integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use hrs_common::SequentialIdGenerator;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use hrs_indexer::models::{
    DocumentId, GeoPoint, HotelDocument, RawReviewRow, RawValue, Review, ToneScore,
};
use hrs_indexer::services::{BatchOrchestrator, SyncOptions, SyncService};
use hrs_indexer::types::{
    DocumentStore, ReviewSource, ScoreError, SourceError, StoreError, ToneScorer,
};

/// Row with hotel identity fields filled in
pub fn row(hotel: &str, text: &str) -> RawReviewRow {
    RawReviewRow {
        name: RawValue::present(hotel),
        city: RawValue::present("Venice"),
        country: RawValue::present("IT"),
        latitude: RawValue::present("45.43"),
        longitude: RawValue::present("12.33"),
        postal_code: RawValue::present("30126"),
        date: RawValue::present("2016-05-01T00:00:00Z"),
        date_added: RawValue::present("2016-06-01T00:00:00Z"),
        rating: RawValue::present("4"),
        text: RawValue::present(text),
        title: RawValue::present("Stay"),
        user_city: RawValue::Absent,
        username: RawValue::present("guest"),
        user_province: RawValue::Absent,
    }
}

pub fn stored_review(text: &str, tones: Vec<ToneScore>) -> Review {
    Review {
        date: hrs_common::time::epoch(),
        date_added: hrs_common::time::epoch(),
        rating: 5,
        text: text.to_string(),
        title: "Earlier".to_string(),
        user_city: "Other".to_string(),
        username: "earlier-guest".to_string(),
        user_province: "Other".to_string(),
        tones,
    }
}

pub fn stored_document(id: &str, hotel: &str, reviews: Vec<Review>) -> HotelDocument {
    HotelDocument {
        id: DocumentId::new(id),
        name: hotel.to_string(),
        city: "Old City".to_string(),
        country: "IT".to_string(),
        location: GeoPoint { lat: 1.0, lon: 2.0 },
        postal_code: "00000".to_string(),
        reviews,
        norm_tones: Default::default(),
    }
}

// ============================================================================
// Review source
// ============================================================================

pub struct FakeSource {
    rows: Vec<RawReviewRow>,
    fail: bool,
}

impl FakeSource {
    pub fn new(rows: Vec<RawReviewRow>) -> Self {
        Self { rows, fail: false }
    }

    pub fn failing() -> Self {
        Self { rows: Vec::new(), fail: true }
    }
}

#[async_trait]
impl ReviewSource for FakeSource {
    async fn load(&self, hotel_name: Option<&str>) -> Result<Vec<RawReviewRow>, SourceError> {
        if self.fail {
            return Err(SourceError::Parse("corrupt dataset".to_string()));
        }
        Ok(self
            .rows
            .iter()
            .filter(|r| match hotel_name {
                Some(name) => hrs_indexer::services::review_builder::hotel_name(r) == name,
                None => true,
            })
            .cloned()
            .collect())
    }
}

// ============================================================================
// Tone scorer
// ============================================================================

/// Scores from a fixed text → tones table; unknown texts score empty
#[derive(Default)]
pub struct FakeScorer {
    tones: HashMap<String, Vec<ToneScore>>,
    failing: HashSet<String>,
    unauthorized: bool,
    calls: Mutex<Vec<String>>,
}

impl FakeScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, text: &str, tones: &[(&str, f64)]) -> Self {
        self.tones.insert(
            text.to_string(),
            tones.iter().map(|(id, s)| ToneScore::new(*id, *s)).collect(),
        );
        self
    }

    pub fn failing_on(mut self, text: &str) -> Self {
        self.failing.insert(text.to_string());
        self
    }

    pub fn unauthorized() -> Self {
        Self {
            unauthorized: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToneScorer for FakeScorer {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn score(&self, text: &str) -> Result<Vec<ToneScore>, ScoreError> {
        self.calls.lock().unwrap().push(text.to_string());
        if self.unauthorized {
            return Err(ScoreError::Unauthorized("bad key".to_string()));
        }
        if self.failing.contains(text) {
            return Err(ScoreError::Transient("service unavailable".to_string()));
        }
        Ok(self.tones.get(text).cloned().unwrap_or_default())
    }
}

/// Answers every text with `{joy: 1.0}` after a per-text delay
pub struct SlowScorer {
    delays_ms: HashMap<String, u64>,
    finished: Mutex<Vec<String>>,
}

impl SlowScorer {
    pub fn new(delays_ms: &[(&str, u64)]) -> Self {
        Self {
            delays_ms: delays_ms.iter().map(|(t, d)| (t.to_string(), *d)).collect(),
            finished: Mutex::new(Vec::new()),
        }
    }

    /// Texts in the order their scoring calls completed
    pub fn finished(&self) -> Vec<String> {
        self.finished.lock().unwrap().clone()
    }
}

#[async_trait]
impl ToneScorer for SlowScorer {
    fn name(&self) -> &'static str {
        "slow"
    }

    async fn score(&self, text: &str) -> Result<Vec<ToneScore>, ScoreError> {
        let delay = self.delays_ms.get(text).copied().unwrap_or(1);
        tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        self.finished.lock().unwrap().push(text.to_string());
        Ok(vec![ToneScore::new("joy", 1.0)])
    }
}

// ============================================================================
// Document store
// ============================================================================

#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<DocumentId, HotelDocument>>,
    unavailable: bool,
    malformed: HashSet<String>,
    write_failures: HashSet<String>,
    pub fetches: AtomicUsize,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(self, document: HotelDocument) -> Self {
        self.documents
            .lock()
            .unwrap()
            .insert(document.id.clone(), document);
        self
    }

    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn malformed_for(mut self, hotel: &str) -> Self {
        self.malformed.insert(hotel.to_string());
        self
    }

    pub fn failing_writes_for(mut self, hotel: &str) -> Self {
        self.write_failures.insert(hotel.to_string());
        self
    }

    pub fn get(&self, hotel: &str) -> Option<HotelDocument> {
        self.documents
            .lock()
            .unwrap()
            .values()
            .find(|d| d.name == hotel)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_by_name(&self, hotel_name: &str) -> Result<Option<HotelDocument>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        if self.malformed.contains(hotel_name) {
            return Err(StoreError::Malformed("reviews: invalid type".to_string()));
        }
        Ok(self.get(hotel_name))
    }

    async fn upsert(&self, id: &DocumentId, document: &HotelDocument) -> Result<(), StoreError> {
        if self.write_failures.contains(&document.name) {
            return Err(StoreError::Write("index rejected document".to_string()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut stored = document.clone();
        stored.id = id.clone();
        self.documents.lock().unwrap().insert(id.clone(), stored);
        Ok(())
    }
}

// ============================================================================
// Wiring
// ============================================================================

pub fn orchestrator(scorer: Arc<FakeScorer>, store: Arc<MemoryStore>) -> BatchOrchestrator {
    BatchOrchestrator::new(
        scorer,
        store,
        Arc::new(SequentialIdGenerator::new("doc")),
        SyncOptions::default(),
    )
}

pub fn sync_service(source: FakeSource, scorer: Arc<FakeScorer>, store: Arc<MemoryStore>) -> SyncService {
    SyncService::new(Arc::new(source), orchestrator(scorer, store))
}

/// Tone score lookup that tolerates float rounding
pub fn tone(tones: &std::collections::BTreeMap<String, f64>, id: &str) -> f64 {
    *tones.get(id).unwrap_or_else(|| panic!("missing tone {}", id))
}

pub fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
