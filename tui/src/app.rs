use anyhow::Result;
use rickdex_core::{
    catalog::{
        Catalog, CharacterDetail, CharacterFilter, EpisodeDetail, EpisodeFilter, LocationDetail, LocationFilter,
        PageAccumulator,
    },
    favorites::FavoritesStore,
    models::{Character, EntityKind, Episode, FavoriteDetails, FavoriteEntry, Location, Page},
};
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::config::{Config, KeyBindings};

/// Top level screens, in tab order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Favorites,
    Characters,
    Episodes,
    Locations,
}

impl Screen {
    pub const ALL: [Screen; 4] = [Screen::Favorites, Screen::Characters, Screen::Episodes, Screen::Locations];

    pub fn title(&self) -> &'static str {
        match self {
            Screen::Favorites => "Favorites",
            Screen::Characters => "Characters",
            Screen::Episodes => "Episodes",
            Screen::Locations => "Locations",
        }
    }

    /// Catalog collection listed on this screen
    pub fn kind(&self) -> Option<EntityKind> {
        match self {
            Screen::Favorites => None,
            Screen::Characters => Some(EntityKind::Character),
            Screen::Episodes => Some(EntityKind::Episode),
            Screen::Locations => Some(EntityKind::Location),
        }
    }

    fn index(&self) -> usize {
        Screen::ALL.iter().position(|s| s == self).unwrap_or(0)
    }
}

/// An accumulated catalog listing with its cursor and name filter
#[derive(Debug)]
pub struct ListView<T> {
    pub pages: PageAccumulator<T>,
    pub selected: usize,
    pub query: String,
    /// Bumped on every restart so late pages of an old query are dropped
    generation: u64,
}

impl<T> Default for ListView<T> {
    fn default() -> Self {
        Self {
            pages: PageAccumulator::new(),
            selected: 0,
            query: String::new(),
            generation: 0,
        }
    }
}

impl<T> ListView<T> {
    pub fn items(&self) -> &[T] {
        self.pages.items()
    }

    pub fn selected_item(&self) -> Option<&T> {
        self.pages.items().get(self.selected)
    }

    fn restart(&mut self, query: &str) {
        self.pages.reset();
        self.selected = 0;
        self.query = query.trim().to_string();
        self.generation += 1;
    }

    fn name_filter(&self) -> Option<String> {
        Some(self.query.clone()).filter(|q| !q.is_empty())
    }

    fn begin_next(&mut self) -> Option<u32> {
        let page = self.pages.next_page()?;
        self.pages.begin(page).then_some(page)
    }

    /// Apply a finished request. Returns the error message, if any.
    fn apply(&mut self, generation: u64, page: u32, result: std::result::Result<Page<T>, String>) -> Option<String> {
        if generation != self.generation {
            tracing::debug!("Dropping page {} of a previous query", page);
            return None;
        }
        match result {
            Ok(data) => {
                self.pages.complete(page, data);
                self.selected = self.selected.min(self.pages.items().len().saturating_sub(1));
                None
            }
            Err(message) => {
                self.pages.fail(page, message.clone());
                self.selected = self.selected.min(self.pages.items().len().saturating_sub(1));
                Some(message)
            }
        }
    }

    fn move_by(&mut self, delta: isize) {
        let len = self.pages.items().len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = (self.selected as isize + delta).clamp(0, len as isize - 1) as usize;
    }

    fn at_end(&self) -> bool {
        self.selected + 1 >= self.pages.items().len()
    }
}

/// What a detail view shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetailTarget {
    pub kind: EntityKind,
    pub id: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailData {
    Character(CharacterDetail),
    Episode(EpisodeDetail),
    Location(LocationDetail),
}

/// Row of a related list inside a detail view
#[derive(Debug, Clone, PartialEq)]
pub struct RelatedItem {
    pub target: DetailTarget,
    pub name: String,
    pub subtitle: String,
}

fn character_item(c: &Character) -> RelatedItem {
    RelatedItem {
        target: DetailTarget { kind: EntityKind::Character, id: c.id },
        name: c.name.clone(),
        subtitle: format!("{} · {}", c.status, c.species),
    }
}

fn episode_item(e: &Episode) -> RelatedItem {
    RelatedItem {
        target: DetailTarget { kind: EntityKind::Episode, id: e.id },
        name: e.name.clone(),
        subtitle: format!("{} · {}", e.episode, e.air_date),
    }
}

fn location_item(l: &Location) -> RelatedItem {
    RelatedItem {
        target: DetailTarget { kind: EntityKind::Location, id: l.id },
        name: l.name.clone(),
        subtitle: format!("{} · {}", l.location_type, l.dimension),
    }
}

impl DetailData {
    pub fn related_titles(&self) -> [&'static str; 2] {
        match self {
            DetailData::Character(_) => ["Episodes", "Locations"],
            DetailData::Episode(_) => ["Characters", "Locations"],
            DetailData::Location(_) => ["Residents", "Episodes"],
        }
    }

    pub fn related(&self, tab: usize) -> Vec<RelatedItem> {
        match (self, tab) {
            (DetailData::Character(d), 0) => d.episodes.iter().map(episode_item).collect(),
            (DetailData::Character(d), _) => d.locations.iter().map(location_item).collect(),
            (DetailData::Episode(d), 0) => d.characters.iter().map(character_item).collect(),
            (DetailData::Episode(d), _) => d.locations.iter().map(location_item).collect(),
            (DetailData::Location(d), 0) => d.residents.iter().map(character_item).collect(),
            (DetailData::Location(d), _) => d.episodes.iter().map(episode_item).collect(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            DetailData::Character(d) => &d.character.name,
            DetailData::Episode(d) => &d.episode.name,
            DetailData::Location(d) => &d.location.name,
        }
    }
}

/// One entry of the detail navigation stack
#[derive(Debug, Clone)]
pub struct DetailView {
    pub target: DetailTarget,
    pub data: Option<DetailData>,
    pub error: Option<String>,
    pub related_tab: usize,
    pub selected: usize,
}

impl DetailView {
    fn loading(target: DetailTarget) -> Self {
        Self {
            target,
            data: None,
            error: None,
            related_tab: 0,
            selected: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.data.is_none() && self.error.is_none()
    }

    pub fn related(&self) -> Vec<RelatedItem> {
        self.data.as_ref().map(|d| d.related(self.related_tab)).unwrap_or_default()
    }
}

/// Result of a background catalog request
#[derive(Debug)]
enum CatalogMessage {
    Characters {
        generation: u64,
        page: u32,
        result: std::result::Result<Page<Character>, String>,
    },
    Episodes {
        generation: u64,
        page: u32,
        result: std::result::Result<Page<Episode>, String>,
    },
    Locations {
        generation: u64,
        page: u32,
        result: std::result::Result<Page<Location>, String>,
    },
    Detail {
        target: DetailTarget,
        result: std::result::Result<DetailData, String>,
    },
}

/// Badge text for the favorites tab: nothing until loaded or while empty
pub fn favorites_badge(loaded: bool, total: usize) -> Option<String> {
    if !loaded || total == 0 {
        return None;
    }
    Some(if total > 99 { "99+".to_string() } else { total.to_string() })
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub config: Config,
    pub keys: KeyBindings,
    pub screen: Screen,
    pub favorites: FavoritesStore,
    /// None shows every kind
    pub favorites_filter: Option<EntityKind>,
    pub favorites_selected: usize,
    pub characters: ListView<Character>,
    pub episodes: ListView<Episode>,
    pub locations: ListView<Location>,
    pub detail_stack: Vec<DetailView>,
    pub help_open: bool,
    pub confirming_clear: bool,
    pub search_open: bool,
    pub search_buffer: String,
    pub status_message: Option<String>,
    catalog: Arc<dyn Catalog>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<CatalogMessage>,
    rx: mpsc::UnboundedReceiver<CatalogMessage>,
    in_flight: usize,
}

impl App {
    /// Create a new App instance. Catalog requests are spawned on `runtime`.
    pub fn new(config: Config, favorites: FavoritesStore, catalog: Arc<dyn Catalog>, runtime: Handle) -> Result<Self> {
        let keys = config.keymap.bindings()?;
        let (tx, rx) = mpsc::unbounded_channel();

        Ok(Self {
            should_quit: false,
            config,
            keys,
            screen: Screen::Favorites,
            favorites,
            favorites_filter: None,
            favorites_selected: 0,
            characters: ListView::default(),
            episodes: ListView::default(),
            locations: ListView::default(),
            detail_stack: Vec::new(),
            help_open: false,
            confirming_clear: false,
            search_open: false,
            search_buffer: String::new(),
            status_message: None,
            catalog,
            runtime,
            tx,
            rx,
            in_flight: 0,
        })
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Periodic work: pick up rehydrated favorites and finished requests
    pub fn tick(&mut self) {
        if self.favorites.poll_rehydration() {
            self.clamp_favorites_selection();
        }
        while let Ok(message) = self.rx.try_recv() {
            self.handle_message(message);
        }
    }

    /// Catalog requests still running
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    pub fn favorites_badge(&self) -> Option<String> {
        favorites_badge(self.favorites.is_loaded(), self.favorites.total_count())
    }

    pub fn current_detail(&self) -> Option<&DetailView> {
        self.detail_stack.last()
    }

    /// Favorites shown under the current filter tab
    pub fn visible_favorites(&self) -> Vec<&FavoriteEntry> {
        match self.favorites_filter {
            Some(kind) => self.favorites.entries(kind).iter().collect(),
            None => EntityKind::ALL
                .iter()
                .flat_map(|kind| self.favorites.entries(*kind).iter())
                .collect(),
        }
    }

    // ---- Screens -------------------------------------------------------

    pub fn select_screen(&mut self, screen: Screen) {
        self.detail_stack.clear();
        self.screen = screen;
        if let Some(kind) = screen.kind() {
            self.ensure_started(kind);
        }
    }

    pub fn next_screen(&mut self) {
        let next = (self.screen.index() + 1) % Screen::ALL.len();
        self.select_screen(Screen::ALL[next]);
    }

    pub fn previous_screen(&mut self) {
        let len = Screen::ALL.len();
        let previous = (self.screen.index() + len - 1) % len;
        self.select_screen(Screen::ALL[previous]);
    }

    /// Switch the related list inside a detail view, otherwise the screen
    pub fn next_tab(&mut self) {
        if let Some(view) = self.detail_stack.last_mut() {
            view.related_tab = (view.related_tab + 1) % 2;
            view.selected = 0;
            return;
        }
        self.next_screen();
    }

    pub fn next_favorites_filter(&mut self) {
        if self.screen != Screen::Favorites || !self.detail_stack.is_empty() {
            return;
        }
        self.favorites_filter = match self.favorites_filter {
            None => Some(EntityKind::Character),
            Some(EntityKind::Character) => Some(EntityKind::Episode),
            Some(EntityKind::Episode) => Some(EntityKind::Location),
            Some(EntityKind::Location) => None,
        };
        self.favorites_selected = 0;
    }

    pub fn previous_favorites_filter(&mut self) {
        if self.screen != Screen::Favorites || !self.detail_stack.is_empty() {
            return;
        }
        self.favorites_filter = match self.favorites_filter {
            None => Some(EntityKind::Location),
            Some(EntityKind::Location) => Some(EntityKind::Episode),
            Some(EntityKind::Episode) => Some(EntityKind::Character),
            Some(EntityKind::Character) => None,
        };
        self.favorites_selected = 0;
    }

    // ---- Cursor ----------------------------------------------------------

    pub fn move_up(&mut self) {
        self.move_by(-1);
    }

    pub fn move_down(&mut self) {
        self.move_by(1);
    }

    pub fn move_to_start(&mut self) {
        self.move_by(isize::MIN / 2);
    }

    pub fn move_to_end(&mut self) {
        self.move_by(isize::MAX / 2);
    }

    fn move_by(&mut self, delta: isize) {
        if let Some(view) = self.detail_stack.last_mut() {
            let len = view.related().len();
            view.selected = if len == 0 {
                0
            } else {
                (view.selected as isize).saturating_add(delta).clamp(0, len as isize - 1) as usize
            };
            return;
        }

        match self.screen {
            Screen::Favorites => {
                let len = self.visible_favorites().len();
                self.favorites_selected = if len == 0 {
                    0
                } else {
                    (self.favorites_selected as isize).saturating_add(delta).clamp(0, len as isize - 1) as usize
                };
            }
            Screen::Characters => self.characters.move_by(delta),
            Screen::Episodes => self.episodes.move_by(delta),
            Screen::Locations => self.locations.move_by(delta),
        }

        // Reaching the last row fetches the next page
        if delta > 0 {
            if let Some(kind) = self.screen.kind() {
                let at_end = match kind {
                    EntityKind::Character => self.characters.at_end(),
                    EntityKind::Episode => self.episodes.at_end(),
                    EntityKind::Location => self.locations.at_end(),
                };
                if at_end {
                    self.request_next_page(kind);
                }
            }
        }
    }

    fn clamp_favorites_selection(&mut self) {
        let len = self.visible_favorites().len();
        self.favorites_selected = self.favorites_selected.min(len.saturating_sub(1));
    }

    // ---- Actions ---------------------------------------------------------

    pub fn open_selected(&mut self) {
        let target = if let Some(view) = self.detail_stack.last() {
            view.related().get(view.selected).map(|item| item.target)
        } else {
            match self.screen {
                Screen::Favorites => self
                    .visible_favorites()
                    .get(self.favorites_selected)
                    .map(|entry| DetailTarget { kind: entry.kind(), id: entry.id }),
                Screen::Characters => self
                    .characters
                    .selected_item()
                    .map(|c| DetailTarget { kind: EntityKind::Character, id: c.id }),
                Screen::Episodes => self
                    .episodes
                    .selected_item()
                    .map(|e| DetailTarget { kind: EntityKind::Episode, id: e.id }),
                Screen::Locations => self
                    .locations
                    .selected_item()
                    .map(|l| DetailTarget { kind: EntityKind::Location, id: l.id }),
            }
        };

        if let Some(target) = target {
            self.open_detail(target);
        }
    }

    pub fn open_detail(&mut self, target: DetailTarget) {
        tracing::debug!("Opening {} {}", target.kind, target.id);
        self.detail_stack.push(DetailView::loading(target));
        self.spawn(move |catalog| async move {
            let result = match target.kind {
                EntityKind::Character => CharacterDetail::load(&*catalog, target.id)
                    .await
                    .map(DetailData::Character),
                EntityKind::Episode => EpisodeDetail::load(&*catalog, target.id)
                    .await
                    .map(DetailData::Episode),
                EntityKind::Location => LocationDetail::load(&*catalog, target.id)
                    .await
                    .map(DetailData::Location),
            };
            CatalogMessage::Detail {
                target,
                result: result.map_err(|e| e.to_string()),
            }
        });
    }

    /// Leave the current detail view
    pub fn go_back(&mut self) {
        if self.detail_stack.pop().is_some() {
            self.clamp_favorites_selection();
        }
    }

    pub fn toggle_favorite_selected(&mut self) {
        // Inside a detail view the viewed entity is toggled
        if let Some(view) = self.detail_stack.last() {
            let Some(data) = view.data.as_ref() else {
                return;
            };
            let added = match data {
                DetailData::Character(d) => self.favorites.toggle_character(&d.character),
                DetailData::Episode(d) => self.favorites.toggle_episode(&d.episode),
                DetailData::Location(d) => self.favorites.toggle_location(&d.location),
            };
            let name = data.name().to_string();
            self.report_toggle(&name, added);
            return;
        }

        let toggled = match self.screen {
            Screen::Favorites => {
                let entry = self.visible_favorites().get(self.favorites_selected).map(|e| (*e).clone());
                entry.map(|entry| {
                    self.favorites.remove(entry.kind(), entry.id);
                    self.clamp_favorites_selection();
                    (entry.name, false)
                })
            }
            Screen::Characters => self
                .characters
                .selected_item()
                .map(|c| (c.name.clone(), self.favorites.toggle_character(c))),
            Screen::Episodes => self
                .episodes
                .selected_item()
                .map(|e| (e.name.clone(), self.favorites.toggle_episode(e))),
            Screen::Locations => self
                .locations
                .selected_item()
                .map(|l| (l.name.clone(), self.favorites.toggle_location(l))),
        };

        if let Some((name, added)) = toggled {
            self.report_toggle(&name, added);
        }
    }

    fn report_toggle(&mut self, name: &str, added: bool) {
        self.status_message = Some(if added {
            format!("Added {} to favorites", name)
        } else {
            format!("Removed {} from favorites", name)
        });
    }

    /// Image url of the selected or viewed character
    pub fn selected_image_url(&self) -> Option<String> {
        if let Some(view) = self.detail_stack.last() {
            return match &view.data {
                Some(DetailData::Character(d)) => Some(d.character.image.clone()),
                _ => None,
            }
            .filter(|url| !url.is_empty());
        }
        match self.screen {
            Screen::Favorites => match &self.visible_favorites().get(self.favorites_selected)?.details {
                FavoriteDetails::Character { image } => image.clone().filter(|url| !url.is_empty()),
                _ => None,
            },
            Screen::Characters => self
                .characters
                .selected_item()
                .map(|c| c.image.clone())
                .filter(|url| !url.is_empty()),
            Screen::Episodes | Screen::Locations => None,
        }
    }

    pub fn open_selected_image(&mut self) {
        let Some(url) = self.selected_image_url() else {
            return;
        };
        if let Err(e) = opener::open(&url) {
            tracing::warn!("Failed to open {}: {}", url, e);
            self.status_message = Some(format!("Could not open image: {}", e));
        }
    }

    pub fn load_more(&mut self) {
        if !self.detail_stack.is_empty() {
            return;
        }
        let Some(kind) = self.screen.kind() else {
            return;
        };
        if !self.request_next_page(kind) {
            let loading = match kind {
                EntityKind::Character => self.characters.pages.is_loading(),
                EntityKind::Episode => self.episodes.pages.is_loading(),
                EntityKind::Location => self.locations.pages.is_loading(),
            };
            if !loading {
                self.status_message = Some(format!("All {} loaded", kind.plural()));
            }
        }
    }

    pub fn open_help(&mut self) {
        self.help_open = true;
    }

    pub fn close_help(&mut self) {
        self.help_open = false;
    }

    /// Open the name filter for the current list screen
    pub fn open_search(&mut self) {
        if !self.detail_stack.is_empty() {
            return;
        }
        let query = match self.screen {
            Screen::Favorites => return,
            Screen::Characters => &self.characters.query,
            Screen::Episodes => &self.episodes.query,
            Screen::Locations => &self.locations.query,
        };
        self.search_buffer = query.clone();
        self.search_open = true;
    }

    pub fn close_search(&mut self) {
        self.search_open = false;
        self.search_buffer.clear();
    }

    /// Restart the current listing with the typed name filter
    pub fn apply_search(&mut self) {
        let query = std::mem::take(&mut self.search_buffer);
        self.search_open = false;
        let Some(kind) = self.screen.kind() else {
            return;
        };
        match kind {
            EntityKind::Character => self.characters.restart(&query),
            EntityKind::Episode => self.episodes.restart(&query),
            EntityKind::Location => self.locations.restart(&query),
        }
        tracing::info!("Filtering {} by name '{}'", kind.plural(), query.trim());
        self.request_next_page(kind);
    }

    pub fn request_clear_all(&mut self) {
        if self.screen == Screen::Favorites && self.detail_stack.is_empty() && self.favorites.total_count() > 0 {
            self.confirming_clear = true;
        }
    }

    pub fn confirm_clear_all(&mut self) {
        self.confirming_clear = false;
        self.favorites.clear_all();
        self.favorites_selected = 0;
        self.status_message = Some("Cleared all favorites".to_string());
    }

    pub fn cancel_clear_all(&mut self) {
        self.confirming_clear = false;
    }

    // ---- Catalog requests ------------------------------------------------

    fn ensure_started(&mut self, kind: EntityKind) {
        let started = match kind {
            EntityKind::Character => self.characters.pages.has_started(),
            EntityKind::Episode => self.episodes.pages.has_started(),
            EntityKind::Location => self.locations.pages.has_started(),
        };
        if !started {
            self.request_next_page(kind);
        }
    }

    /// Fetch the next page of a listing. Returns false if nothing was sent.
    fn request_next_page(&mut self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Character => {
                let Some(page) = self.characters.begin_next() else {
                    return false;
                };
                let filter = CharacterFilter {
                    name: self.characters.name_filter(),
                    page: Some(page),
                    ..CharacterFilter::default()
                };
                let generation = self.characters.generation;
                self.spawn(move |catalog| async move {
                    let result = catalog.characters(&filter).await.map_err(|e| e.to_string());
                    CatalogMessage::Characters { generation, page, result }
                });
            }
            EntityKind::Episode => {
                let Some(page) = self.episodes.begin_next() else {
                    return false;
                };
                let filter = EpisodeFilter {
                    name: self.episodes.name_filter(),
                    page: Some(page),
                    ..EpisodeFilter::default()
                };
                let generation = self.episodes.generation;
                self.spawn(move |catalog| async move {
                    let result = catalog.episodes(&filter).await.map_err(|e| e.to_string());
                    CatalogMessage::Episodes { generation, page, result }
                });
            }
            EntityKind::Location => {
                let Some(page) = self.locations.begin_next() else {
                    return false;
                };
                let filter = LocationFilter {
                    name: self.locations.name_filter(),
                    page: Some(page),
                    ..LocationFilter::default()
                };
                let generation = self.locations.generation;
                self.spawn(move |catalog| async move {
                    let result = catalog.locations(&filter).await.map_err(|e| e.to_string());
                    CatalogMessage::Locations { generation, page, result }
                });
            }
        }
        true
    }

    fn spawn<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(Arc<dyn Catalog>) -> Fut,
        Fut: Future<Output = CatalogMessage> + Send + 'static,
    {
        let task = job(Arc::clone(&self.catalog));
        let tx = self.tx.clone();
        self.in_flight += 1;
        self.runtime.spawn(async move {
            if tx.send(task.await).is_err() {
                tracing::debug!("UI gone before catalog request finished");
            }
        });
    }

    fn handle_message(&mut self, message: CatalogMessage) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let error = match message {
            CatalogMessage::Characters { generation, page, result } => self.characters.apply(generation, page, result),
            CatalogMessage::Episodes { generation, page, result } => self.episodes.apply(generation, page, result),
            CatalogMessage::Locations { generation, page, result } => self.locations.apply(generation, page, result),
            CatalogMessage::Detail { target, result } => {
                // The view may have been left while loading
                let Some(view) = self
                    .detail_stack
                    .iter_mut()
                    .rev()
                    .find(|v| v.target == target && v.is_loading())
                else {
                    return;
                };
                match result {
                    Ok(data) => {
                        view.data = Some(data);
                        None
                    }
                    Err(message) => {
                        view.error = Some(message.clone());
                        Some(message)
                    }
                }
            }
        };

        if let Some(message) = error {
            tracing::warn!("Catalog request failed: {}", message);
            self.status_message = Some(message);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use rickdex_core::storage::MemoryStorage;
    use rickdex_core::testing::{fixtures, MockCatalog};
    use std::time::{Duration, Instant};
    use tokio::runtime::Runtime;

    /// Catalog with 25 characters, 3 episodes and 2 locations
    pub(crate) fn seeded_catalog() -> MockCatalog {
        let catalog = MockCatalog::new();
        for id in 1..=25 {
            let name = match id {
                1 => "Rick Sanchez".to_string(),
                2 => "Morty Smith".to_string(),
                _ => format!("Character {}", id),
            };
            let mut character = fixtures::character(id, &name);
            character.episode = vec![fixtures::episode_url(1)];
            character.location.url = fixtures::location_url(1);
            catalog.add_character(character);
        }

        let mut pilot = fixtures::episode(1, "Pilot");
        pilot.characters = vec![fixtures::character_url(1), fixtures::character_url(2)];
        catalog.add_episode(pilot);
        catalog.add_episode(fixtures::episode(2, "Lawnmower Dog"));
        catalog.add_episode(fixtures::episode(3, "Anatomy Park"));

        let mut earth = fixtures::location(1, "Earth (C-137)");
        earth.residents = vec![fixtures::character_url(1)];
        catalog.add_location(earth);
        catalog.add_location(fixtures::location(2, "Abadango"));
        catalog
    }

    pub(crate) fn app_with(catalog: MockCatalog, storage: MemoryStorage) -> (Runtime, App) {
        let runtime = Runtime::new().unwrap();
        let mut favorites = FavoritesStore::open(storage).unwrap();
        favorites.wait_until_loaded();
        let app = App::new(Config::default(), favorites, Arc::new(catalog), runtime.handle().clone()).unwrap();
        (runtime, app)
    }

    pub(crate) fn test_app() -> (Runtime, App) {
        app_with(seeded_catalog(), MemoryStorage::new())
    }

    /// Tick until every spawned request has been handled
    pub(crate) fn settle(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        app.tick();
        while app.is_busy() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(5));
            app.tick();
        }
        assert!(!app.is_busy(), "catalog requests did not finish");
    }
}
