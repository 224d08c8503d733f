use crate::model::Place;

/// What the presentation layer should be showing.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    /// The full normalized result set, before filters.
    Loaded(Vec<Place>),
    /// The source answered but nothing usable came back.
    Empty,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    Started,
    Completed(Vec<Place>),
    Failed(String),
    Cancelled,
}

impl SearchState {
    /// `Started` is accepted anywhere and drops whatever was shown. The other
    /// events only land while loading; elsewhere they are ignored.
    pub fn apply(self, event: SearchEvent) -> SearchState {
        match (self, event) {
            (_, SearchEvent::Started) => SearchState::Loading,
            (SearchState::Loading, SearchEvent::Completed(places)) if places.is_empty() => {
                SearchState::Empty
            }
            (SearchState::Loading, SearchEvent::Completed(places)) => SearchState::Loaded(places),
            (SearchState::Loading, SearchEvent::Failed(message)) => SearchState::Failed(message),
            (SearchState::Loading, SearchEvent::Cancelled) => SearchState::Idle,
            (state, event) => {
                tracing::warn!(?state, ?event, "ignoring search event outside of loading");
                state
            }
        }
    }

    pub fn places(&self) -> &[Place] {
        match self {
            SearchState::Loaded(places) => places,
            _ => &[],
        }
    }
}
