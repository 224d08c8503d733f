//! The whole discovery run: locate, build, fetch, normalize, filter and sort.
//!
//! Only the newest query may publish. Starting a search cancels the token of
//! the one before it, and a run whose generation is stale when it finishes
//! returns [`DiscoveryError::Superseded`] without touching state.

use parking_lot::Mutex;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tokio_util::sync::CancellationToken;

use crate::{
    DiscoveryError,
    filter::{self, FilterOptions, SortKey},
    location::Locator,
    model::{Coordinate, Place},
    mood::MoodCatalog,
    normalize::Normalizer,
    provider::PoiSource,
    query::{RADIUS_RANGE, build_query},
    state::{SearchEvent, SearchState},
};

#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub mood: String,
    /// Skip the locator and search around this point.
    pub origin: Option<Coordinate>,
    pub radius_meters: u32,
    pub filter: FilterOptions,
    pub sort: SortKey,
}

impl SearchRequest {
    pub fn new(mood: &str, radius_meters: u32) -> Self {
        Self {
            mood: mood.to_string(),
            origin: None,
            radius_meters,
            filter: FilterOptions::default(),
            sort: SortKey::default(),
        }
    }

    pub fn at(mut self, origin: Coordinate) -> Self {
        self.origin = Some(origin);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    /// Filtered and sorted view. May be empty if the filters removed everything.
    Found(Vec<Place>),
    /// Nothing usable came back from the source.
    Empty,
}

impl SearchOutcome {
    pub fn places(&self) -> &[Place] {
        match self {
            SearchOutcome::Found(places) => places,
            SearchOutcome::Empty => &[],
        }
    }
}

#[derive(Debug, Default)]
struct Tracker {
    generation: u64,
    in_flight: Option<CancellationToken>,
    state: SearchState,
}

impl Tracker {
    fn advance(&mut self, event: SearchEvent) {
        self.state = std::mem::take(&mut self.state).apply(event);
    }
}

#[derive(Debug)]
pub struct Pipeline {
    catalog: MoodCatalog,
    locator: Box<dyn Locator>,
    source: Box<dyn PoiSource>,
    rng: Mutex<ChaCha8Rng>,
    fixed_hour: Option<u32>,
    tracker: Mutex<Tracker>,
}

impl Pipeline {
    pub fn new(catalog: MoodCatalog, locator: Box<dyn Locator>, source: Box<dyn PoiSource>) -> Self {
        Self {
            catalog,
            locator,
            source,
            rng: Mutex::new(ChaCha8Rng::from_rng(&mut rand::rng())),
            fixed_hour: None,
            tracker: Mutex::new(Tracker::default()),
        }
    }

    /// Make the placeholder ratings reproducible.
    pub fn with_seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            ..self
        }
    }

    /// Judge opening state at this hour instead of the wall clock.
    pub fn with_local_hour(self, hour: u32) -> Self {
        Self {
            fixed_hour: Some(hour),
            ..self
        }
    }

    pub fn catalog(&self) -> &MoodCatalog {
        &self.catalog
    }

    pub fn state(&self) -> SearchState {
        self.tracker.lock().state.clone()
    }

    /// Run one query end to end and make its result the current set.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchOutcome, DiscoveryError> {
        let (generation, token) = self.begin();
        tracing::info!(
            generation,
            mood = %request.mood,
            radius_meters = request.radius_meters,
            "search started"
        );

        let result = self.run(request, &token).await;
        self.finish(generation, request, result)
    }

    /// Re-filter the current result set without going back to the network.
    pub fn view(&self, options: &FilterOptions, sort: SortKey) -> Vec<Place> {
        let tracker = self.tracker.lock();
        filter::apply(tracker.state.places(), options, sort)
    }

    /// Abandon the in-flight query, if any.
    pub fn cancel(&self) {
        let mut tracker = self.tracker.lock();
        if let Some(token) = tracker.in_flight.take() {
            token.cancel();
            tracker.generation += 1;
            tracker.advance(SearchEvent::Cancelled);
            tracing::info!("search cancelled");
        }
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let mut tracker = self.tracker.lock();

        if let Some(previous) = tracker.in_flight.take() {
            previous.cancel();
        }

        tracker.generation += 1;
        let token = CancellationToken::new();
        tracker.in_flight = Some(token.clone());
        tracker.advance(SearchEvent::Started);

        (tracker.generation, token)
    }

    async fn run(
        &self,
        request: &SearchRequest,
        token: &CancellationToken,
    ) -> Result<Vec<Place>, DiscoveryError> {
        // Caller mistakes fail before any location or network work.
        if self.catalog.get(&request.mood).is_none() {
            return Err(DiscoveryError::UnknownMood(request.mood.clone()));
        }
        if !RADIUS_RANGE.contains(&request.radius_meters) {
            return Err(DiscoveryError::InvalidRadius(request.radius_meters));
        }

        let origin = match request.origin {
            Some(origin) => origin,
            None => tokio::select! {
                biased;
                _ = token.cancelled() => return Err(DiscoveryError::Superseded),
                located = self.locator.locate() => located?,
            },
        };

        let query = build_query(&self.catalog, &request.mood, origin, request.radius_meters)?;

        let elements = tokio::select! {
            biased;
            _ = token.cancelled() => return Err(DiscoveryError::Superseded),
            fetched = self.source.fetch(&query) => fetched?,
        };

        let mut rng = self.rng.lock();
        let mut normalizer = match self.fixed_hour {
            Some(hour) => Normalizer::new(&mut *rng, hour),
            None => Normalizer::at_current_hour(&mut *rng),
        };

        Ok(normalizer.normalize(&elements, origin))
    }

    fn finish(
        &self,
        generation: u64,
        request: &SearchRequest,
        result: Result<Vec<Place>, DiscoveryError>,
    ) -> Result<SearchOutcome, DiscoveryError> {
        let mut tracker = self.tracker.lock();

        if tracker.generation != generation {
            tracing::warn!(generation, current = tracker.generation, "discarding superseded search");
            return Err(DiscoveryError::Superseded);
        }
        tracker.in_flight = None;

        match result {
            Ok(places) if places.is_empty() => {
                tracing::info!(generation, "search finished with no matches");
                tracker.advance(SearchEvent::Completed(places));
                Ok(SearchOutcome::Empty)
            }
            Ok(places) => {
                let view = filter::apply(&places, &request.filter, request.sort);
                tracing::info!(
                    generation,
                    found = places.len(),
                    shown = view.len(),
                    "search finished"
                );
                tracker.advance(SearchEvent::Completed(places));
                Ok(SearchOutcome::Found(view))
            }
            Err(err) => {
                tracing::warn!(generation, error = %err, "search failed");
                tracker.advance(SearchEvent::Failed(err.to_string()));
                Err(err)
            }
        }
    }
}
