use iced::widget::{button, column, container, row, scrollable, text, Column};
use iced::{Alignment, Element, Length, Task, Theme};
use iced_aw::Wrap;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod error;
mod state;
mod ui;

use config::AppConfig;
use error::AppError;
use state::catalog::Catalog;
use state::comparison::ComparisonController;
use state::filter::{FilterEngine, FilterState};
use state::loader::read_persisted;
use state::notify::{Notification, NotificationQueue, Notifier};
use state::preferences::ThemePreference;
use state::store::{KeyValueStore, MemoryStore, SqliteStore};
use ui::card::{product_card, CompareButton};
use ui::filters::BrandChoice;

/// Each owner of a persisted key holds its own handle
type StoreHandle = Box<dyn KeyValueStore + Send>;

/// Notification currently shown in the banner
struct Banner {
    seq: u64,
    notification: Notification,
}

/// Everything the running app owns once the catalog has loaded
struct Session {
    catalog: Catalog,
    filters: FilterState,
    filter_engine: FilterEngine,
    /// Ids of the products passing the current filters, catalog order
    visible: Vec<u64>,
    comparison: ComparisonController<StoreHandle, NotificationQueue>,
    theme: ThemePreference<StoreHandle, NotificationQueue>,
    notifications: NotificationQueue,
    banner: Option<Banner>,
    banner_seq: u64,
    /// Bumped on every keystroke so stale debounce ticks can be ignored
    search_seq: u64,
    notification_timeout: Duration,
    search_debounce: Duration,
}

/// Main application state
enum ProductCompare {
    Ready(Box<Session>),
    /// The catalog could not be loaded; nothing else is usable
    Corrupted(String),
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    AddToCompare(u64),
    RemoveFromCompare(u64),
    ClearComparison,
    TogglePanel,
    /// Raw search box contents; filtering waits for `SearchSettled`
    SearchChanged(String),
    SearchSettled(u64),
    BrandSelected(BrandChoice),
    ClearFilters,
    ToggleTheme,
    DismissNotification(u64),
}

/// Open both store handles on the same database, or share one in-memory
/// store when the database is unavailable
fn open_stores(data_dir: Option<&Path>) -> (StoreHandle, StoreHandle) {
    let opened = SqliteStore::open(data_dir)
        .and_then(|comparison| Ok((comparison, SqliteStore::open(data_dir)?)));

    match opened {
        Ok((comparison, theme)) => {
            debug!(path = %comparison.path().display(), "persisted state enabled");
            (Box::new(comparison), Box::new(theme))
        }
        Err(e) => {
            let e = AppError::from(e);
            warn!(error = %e, "persistent storage unavailable, using in-memory store");
            let memory = MemoryStore::new();
            (Box::new(memory.clone()), Box::new(memory))
        }
    }
}

impl Session {
    /// Startup: catalog, store, theme restore, comparison restore, first
    /// filter pass. Only a bad catalog is fatal.
    fn start(config: &AppConfig) -> Result<Self, AppError> {
        let catalog = Catalog::load(config.catalog_path.as_deref())?;

        let notifications = NotificationQueue::new();
        let (comparison_store, theme_store) = open_stores(config.data_dir.as_deref());
        let snapshot = read_persisted(&comparison_store, &notifications);

        let mut theme = ThemePreference::new(theme_store, notifications.clone());
        theme.restore(snapshot.dark_mode.as_deref());

        let mut comparison = ComparisonController::new(comparison_store, notifications.clone());
        comparison.restore(snapshot.compare_list.as_deref());

        let mut session = Session {
            catalog,
            filters: FilterState::default(),
            filter_engine: FilterEngine,
            visible: Vec::new(),
            comparison,
            theme,
            notifications,
            banner: None,
            banner_seq: 0,
            search_seq: 0,
            notification_timeout: Duration::from_millis(config.notification_timeout_ms),
            search_debounce: Duration::from_millis(config.search_debounce_ms),
        };
        session.refilter();

        Ok(session)
    }

    fn refilter(&mut self) {
        let visible = self
            .filter_engine
            .apply(&self.catalog, &mut self.filters, &self.notifications);
        self.visible = visible.iter().map(|p| p.id).collect();
        debug!(visible = self.visible.len(), "filters applied");
    }

    /// Move pending notifications to the banner. The newest one wins and
    /// schedules its own dismissal.
    fn flush_notifications(&mut self) -> Task<Message> {
        if self.notifications.is_empty() {
            return Task::none();
        }
        let Some(latest) = self.notifications.drain().pop() else {
            return Task::none();
        };

        self.banner_seq += 1;
        let seq = self.banner_seq;
        self.banner = Some(Banner {
            seq,
            notification: latest,
        });

        Task::perform(tokio::time::sleep(self.notification_timeout), move |_| {
            Message::DismissNotification(seq)
        })
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::AddToCompare(id) => match self.catalog.get(id) {
                Some(product) => {
                    self.comparison.add(product);
                }
                None => {
                    warn!(id, "add requested for a product outside the catalog");
                    self.notifications
                        .show_error("Failed to add product to comparison. Please try again.");
                }
            },
            Message::RemoveFromCompare(id) => {
                self.comparison.remove(id);
            }
            Message::ClearComparison => {
                self.comparison.clear();
            }
            Message::TogglePanel => {
                self.comparison.toggle_panel();
            }
            Message::SearchChanged(term) => {
                self.filters.search_term = term;
                self.search_seq += 1;
                let seq = self.search_seq;
                return Task::perform(tokio::time::sleep(self.search_debounce), move |_| {
                    Message::SearchSettled(seq)
                });
            }
            Message::SearchSettled(seq) => {
                if seq != self.search_seq {
                    return Task::none();
                }
                self.refilter();
            }
            Message::BrandSelected(choice) => {
                self.filters.selected_brand = choice.brand().to_string();
                self.refilter();
            }
            Message::ClearFilters => {
                self.filters.clear();
                self.search_seq += 1;
                self.refilter();
                self.notifications.show_success("All filters cleared");
            }
            Message::ToggleTheme => self.theme.toggle(),
            Message::DismissNotification(seq) => {
                if self.banner.as_ref().is_some_and(|b| b.seq == seq) {
                    self.banner = None;
                }
                return Task::none();
            }
        }

        self.flush_notifications()
    }

    fn view(&self) -> Element<Message> {
        let header = row![
            column![
                text("Premium Product Collection").size(32),
                text("Compare and discover the best products for your needs").size(15),
            ]
            .spacing(4),
            iced::widget::horizontal_space(),
            button(if self.theme.dark_mode() {
                "Light Mode"
            } else {
                "Dark Mode"
            })
            .on_press(Message::ToggleTheme)
            .style(button::secondary)
            .padding(10),
        ]
        .align_y(Alignment::Center);

        let filters = ui::filters::filter_bar(
            &self.filters,
            self.catalog.brands(),
            self.visible.len(),
            self.catalog.len(),
        );

        let selection = self.comparison.selection();
        let compare_bar = (!selection.is_empty())
            .then(|| ui::compare_bar(selection.len(), self.comparison.show_panel()));
        let panel = self
            .comparison
            .show_panel()
            .then(|| ui::comparison::panel(self.comparison.products()));

        let loaded = self.comparison.is_loaded();
        let grid: Element<Message> = if self.visible.is_empty() {
            ui::empty_state()
        } else {
            let cards: Vec<Element<Message>> = self
                .visible
                .iter()
                .filter_map(|id| self.catalog.get(*id))
                .map(|product| {
                    let compare = CompareButton::new(
                        self.comparison.contains(product.id),
                        self.comparison.can_add(product.id),
                        loaded,
                    );
                    product_card(product, compare)
                })
                .collect();

            Wrap::with_elements(cards)
                .spacing(16.0)
                .line_spacing(16.0)
                .into()
        };

        let content: Column<Message> = Column::new()
            .push(header)
            .push_maybe(
                self.banner
                    .as_ref()
                    .map(|b| ui::banner(&b.notification, b.seq)),
            )
            .push(filters)
            .push_maybe(compare_bar)
            .push_maybe(panel)
            .push(grid)
            .spacing(20)
            .padding(32);

        scrollable(content).height(Length::Fill).into()
    }
}

impl ProductCompare {
    /// Create a new instance of the application
    fn new(config: AppConfig) -> (Self, Task<Message>) {
        match Session::start(&config) {
            Ok(session) => {
                let mut session = Box::new(session);
                let task = session.flush_notifications();
                (ProductCompare::Ready(session), task)
            }
            Err(e) => {
                error!(
                    error = %e,
                    fatal = e.is_fatal(),
                    recoverable = e.is_recoverable(),
                    "failed to start"
                );
                (ProductCompare::Corrupted(e.user_message()), Task::none())
            }
        }
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match self {
            ProductCompare::Ready(session) => session.update(message),
            ProductCompare::Corrupted(_) => Task::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        match self {
            ProductCompare::Ready(session) => session.view(),
            ProductCompare::Corrupted(message) => {
                let content: Column<Message> = column![
                    text("Premium Product Collection").size(32),
                    text(message).size(16),
                ]
                .spacing(20)
                .padding(40)
                .align_x(Alignment::Center);

                container(content)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into()
            }
        }
    }

    /// Light unless a running session has dark mode on; the fatal screen
    /// uses the default
    fn theme(&self) -> Theme {
        match self {
            ProductCompare::Ready(session) if session.theme.dark_mode() => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

/// `RUST_LOG` wins over the configured filter
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::try_new(default_filter).unwrap_or_else(|_| EnvFilter::new("info"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> iced::Result {
    let (config, config_error) = match config::load_config(config::config_file_path().as_deref())
    {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(AppError::from(e))),
    };

    init_tracing(&config.log_filter);
    info!(version = env!("CARGO_PKG_VERSION"), "starting product-compare");
    if let Some(e) = config_error {
        warn!(error = %e, "invalid configuration, using defaults");
    }

    iced::application(
        "Product Comparison",
        ProductCompare::update,
        ProductCompare::view,
    )
    .theme(ProductCompare::theme)
    .window_size((1280.0, 860.0))
    .centered()
    .run_with(move || ProductCompare::new(config.clone()))
}
