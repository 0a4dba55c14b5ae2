use crate::filter::{compute_view, FilterState};
use crate::query::UrlDefaults;
use crate::render::{render_markers, MapSurface, RenderOptions, RenderSummary};
use crate::types::{Dataset, Record};
use crate::vocabulary::{build_vocabulary, Dropdown, ALL_CATEGORIES, ALL_COUNTIES};
use tracing::{debug, info};

/// Sole owner of the page state: the dataset, the two dropdowns, the label
/// flag and the current filtered view. Every change re-renders in full.
pub struct MapController<S: MapSurface> {
    surface: S,
    fit_padding: u32,
    dataset: Dataset,
    counties: Dropdown,
    categories: Dropdown,
    state: FilterState,
    view: Vec<Record>,
    pending_defaults: Option<UrlDefaults>,
    loaded: bool,
}

impl<S: MapSurface> MapController<S> {
    pub fn new(surface: S, fit_padding: u32, defaults: UrlDefaults) -> Self {
        Self {
            surface,
            fit_padding,
            dataset: Dataset::new(),
            counties: Dropdown::default(),
            categories: Dropdown::default(),
            state: FilterState::default(),
            view: Vec::new(),
            pending_defaults: Some(defaults),
            loaded: false,
        }
    }

    /// Populate the dropdowns from `dataset` and draw every record. URL
    /// defaults stay queued until [`Self::apply_pending_defaults`].
    pub fn load(&mut self, dataset: Dataset) -> RenderSummary {
        let vocabulary = build_vocabulary(&dataset);
        self.counties = Dropdown::populate(ALL_COUNTIES, &vocabulary.counties);
        self.categories = Dropdown::populate(ALL_CATEGORIES, &vocabulary.categories);
        self.dataset = dataset;
        self.loaded = true;
        info!(
            "Loaded {} records: {} counties, {} categories",
            self.dataset.len(),
            vocabulary.counties.len(),
            vocabulary.categories.len()
        );
        self.apply_filters()
    }

    /// Apply the query-string selections once the dropdowns exist. Runs at
    /// most once; returns whether a re-filter happened.
    pub fn apply_pending_defaults(&mut self) -> bool {
        if !self.loaded {
            return false;
        }
        let Some(defaults) = self.pending_defaults.take() else {
            return false;
        };
        if defaults.is_empty() {
            return false;
        }

        debug!("Applying URL defaults {:?}", defaults);
        if let Some(county) = &defaults.county {
            self.counties.select(county);
        }
        if let Some(category) = &defaults.category {
            self.categories.select(category);
        }
        self.apply_filters();
        true
    }

    pub fn select_county(&mut self, value: &str) -> RenderSummary {
        self.counties.select(value);
        self.apply_filters()
    }

    pub fn select_category(&mut self, value: &str) -> RenderSummary {
        self.categories.select(value);
        self.apply_filters()
    }

    /// Redraw the current view with or without labels. Does not re-filter.
    pub fn set_show_labels(&mut self, show: bool) -> RenderSummary {
        self.state.show_labels = show;
        self.redraw()
    }

    fn apply_filters(&mut self) -> RenderSummary {
        self.state.county = self.counties.value().to_string();
        self.state.category = self.categories.value().to_string();
        self.view = compute_view(&self.state, &self.dataset);
        self.redraw()
    }

    fn redraw(&mut self) -> RenderSummary {
        let options = RenderOptions {
            show_labels: self.state.show_labels,
            fit_padding: self.fit_padding,
        };
        render_markers(&self.view, &options, &mut self.surface)
    }

    pub fn view(&self) -> &[Record] {
        &self.view
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn county_dropdown(&self) -> &Dropdown {
        &self.counties
    }

    pub fn category_dropdown(&self) -> &Dropdown {
        &self.categories
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn into_surface(self) -> S {
        self.surface
    }
}
