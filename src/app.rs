use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::catalog::{CatalogProvider, OmdbClient};
use crate::command::{Command, Target};
use crate::config::AppConfig;
use crate::display::{self, Loader};
use crate::error::AppError;
use crate::search::SearchMachine;
use crate::selection::{DetailController, TerminalTitle, TitleSink};
use crate::watched::{FileStorage, KeyValueStorage, RatingAffordance, WatchedStore};

/// Top-level controller. Owns every piece of UI state; the shell only
/// feeds it commands and prints what comes back.
pub struct App {
    search: SearchMachine,
    detail: DetailController,
    watched: WatchedStore,
}

/// What `execute` wants the shell to do next.
#[derive(Debug, PartialEq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

impl App {
    pub fn new_with_config(config: AppConfig) -> Result<Self, AppError> {
        let catalog: Arc<dyn CatalogProvider> = Arc::new(OmdbClient::new(config.catalog.clone())?);
        let storage = FileStorage::new(config.storage.dir.clone());
        tracing::info!(
            catalog = catalog.name(),
            dir = %storage.dir().display(),
            slot = %config.storage.slot,
            "Using watched list storage"
        );

        Self::with_parts(&config, catalog, Box::new(storage), Arc::new(TerminalTitle))
    }

    pub fn with_parts(
        config: &AppConfig,
        catalog: Arc<dyn CatalogProvider>,
        storage: Box<dyn KeyValueStorage>,
        title: Arc<dyn TitleSink>,
    ) -> Result<Self, AppError> {
        let watched = WatchedStore::open(storage, &config.storage.slot)?;
        title.set_title(&config.display.default_title);

        Ok(Self {
            search: SearchMachine::new(Arc::clone(&catalog)),
            detail: DetailController::new(catalog, title, &config.display.default_title),
            watched,
        })
    }

    /// Read commands from stdin until `quit` or end of input.
    pub async fn run(&mut self) -> Result<(), AppError> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        let intro = format!("🍿 usePopcorn\n{}\n", display::help_text());
        stdout.write_all(intro.as_bytes()).await?;

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let output = match line.parse::<Command>() {
                Ok(command) => match self.execute(command).await {
                    Ok(Outcome::Continue(output)) => output,
                    Ok(Outcome::Quit) => break,
                    Err(e) => format!("✖ {e}"),
                },
                Err(e) => format!("✖ {e}"),
            };

            if !output.is_empty() {
                stdout.write_all(format!("{output}\n").as_bytes()).await?;
            }
        }

        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Result<Outcome, AppError> {
        let output = match command {
            Command::Search(query) => {
                self.search.set_query(query);
                self.search_settled().await
            }
            Command::Clear => {
                self.search.clear();
                display::search_view(&self.search.snapshot())
            }
            Command::Open(target) => {
                let imdb_id = self.resolve_result(target)?;
                self.detail.select(&imdb_id);
                self.detail_settled().await
            }
            Command::Rate(rating) => {
                self.detail.set_rating(rating, self.watched.list())?;
                self.detail_view()
            }
            Command::Add => {
                let entry = self.detail.confirm(&mut self.watched)?;
                format!(
                    "Added {} to your watched list\n{}",
                    entry.title,
                    display::summary_view(&self.watched.summary())
                )
            }
            Command::Close => {
                tracing::debug!(selected = ?self.detail.selected(), "Closing title");
                self.detail.close();
                display::summary_view(&self.watched.summary())
            }
            Command::Watched => format!(
                "{}\n{}",
                display::summary_view(&self.watched.summary()),
                display::watched_view(self.watched.list())
            ),
            Command::Remove(target) => {
                let imdb_id = self.resolve_watched(target)?;
                match self.watched.remove(&imdb_id)? {
                    0 => return Err(AppError::InvalidInput(format!("{imdb_id} is not in your watched list"))),
                    _ => format!("Removed {imdb_id}\n{}", display::watched_view(self.watched.list())),
                }
            }
            Command::Stats => display::summary_view(&self.watched.summary()),
            Command::Help => display::help_text(),
            Command::Quit => return Ok(Outcome::Quit),
        };
        Ok(Outcome::Continue(output))
    }

    async fn search_settled(&self) -> String {
        let state = if self.search.snapshot().is_loading() {
            let _loader = Loader::start("Searching...");
            self.search.settled().await
        } else {
            self.search.snapshot()
        };
        tracing::debug!(
            query = %state.query,
            count = self.search.result_count(),
            error = state.error(),
            "Search settled"
        );
        display::search_view(&state)
    }

    async fn detail_settled(&self) -> String {
        if self.detail.snapshot().is_loading() {
            let _loader = Loader::start("Loading movie...");
            self.detail.settled().await;
        }
        self.detail_view()
    }

    fn detail_view(&self) -> String {
        let state = self.detail.snapshot();
        let affordance = state
            .selected
            .as_deref()
            .map(|id| self.watched.list().affordance(id))
            .unwrap_or(RatingAffordance::CanRate);
        display::detail_view(&state, affordance)
    }

    fn resolve_result(&self, target: Target) -> Result<String, AppError> {
        match target {
            Target::Id(id) => Ok(id),
            Target::Index(n) => self
                .search
                .snapshot()
                .results()
                .get(n - 1)
                .map(|movie| movie.imdb_id.clone())
                .ok_or_else(|| AppError::InvalidInput(format!("There is no result number {n}"))),
        }
    }

    fn resolve_watched(&self, target: Target) -> Result<String, AppError> {
        match target {
            Target::Id(id) => Ok(id),
            Target::Index(n) => self
                .watched
                .list()
                .entries()
                .get(n - 1)
                .map(|movie| movie.imdb_id.clone())
                .ok_or_else(|| AppError::InvalidInput(format!("There is no watched movie number {n}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fake::{detail, result, FakeCatalog};
    use crate::selection::RecordingTitle;
    use crate::watched::MemoryStorage;
    use assert_matches::assert_matches;

    struct Harness {
        app: App,
        storage: MemoryStorage,
        title: Arc<RecordingTitle>,
    }

    fn catalog() -> FakeCatalog {
        FakeCatalog::new()
            .with_search(
                "inter",
                20,
                Ok(vec![result("tt0816692", "Interstellar"), result("tt0095016", "Die Hard")]),
            )
            .with_detail("tt0816692", 20, Ok(detail("tt0816692", "Interstellar", "169 min", "8.7")))
            .with_detail("tt0095016", 20, Ok(detail("tt0095016", "Die Hard", "132 min", "8.2")))
    }

    fn harness_with(storage: MemoryStorage) -> Harness {
        let title = Arc::new(RecordingTitle::default());
        let app = App::with_parts(
            &AppConfig::for_tests("http://127.0.0.1:9"),
            Arc::new(catalog()),
            Box::new(storage.clone()),
            title.clone(),
        )
        .unwrap();
        Harness { app, storage, title }
    }

    async fn run(app: &mut App, line: &str) -> Result<String, AppError> {
        match app.execute(line.parse()?).await? {
            Outcome::Continue(output) => Ok(output),
            Outcome::Quit => Ok("<quit>".to_string()),
        }
    }

    #[tokio::test]
    async fn test_search_rate_add_flow() {
        let Harness { mut app, storage, title } = harness_with(MemoryStorage::default());
        assert_eq!(title.current().as_deref(), Some("usePopcorn"));

        let listing = run(&mut app, "inter").await.unwrap();
        assert!(listing.contains("Found 2 results"));

        let shown = run(&mut app, "open 1").await.unwrap();
        assert!(shown.starts_with("Interstellar"));
        assert_eq!(title.current().as_deref(), Some("Interstellar"));

        run(&mut app, "rate 10").await.unwrap();
        let added = run(&mut app, "add").await.unwrap();
        assert!(added.contains("Added Interstellar"));
        assert!(added.contains("⏳ 169.00 min"));
        assert_eq!(title.current().as_deref(), Some("usePopcorn"));

        let reopened = run(&mut app, "open tt0816692").await.unwrap();
        assert!(reopened.contains("You rated this movie 10"));
        assert_matches!(run(&mut app, "add").await, Err(AppError::AlreadyWatched(_)));

        assert!(storage.raw("watched").unwrap().contains("tt0816692"));
    }

    #[tokio::test]
    async fn test_rating_a_watched_title_is_rejected() {
        let Harness { mut app, storage, .. } = harness_with(MemoryStorage::default());

        run(&mut app, "inter").await.unwrap();
        run(&mut app, "open 1").await.unwrap();
        run(&mut app, "rate 10").await.unwrap();
        run(&mut app, "add").await.unwrap();
        run(&mut app, "open 1").await.unwrap();

        assert_matches!(run(&mut app, "rate 3").await, Err(AppError::AlreadyWatched(_)));
        assert_eq!(app.detail.snapshot().draft.rating, None);
        assert!(storage.raw("watched").unwrap().contains("\"userRating\":10"));
    }

    #[tokio::test]
    async fn test_watched_list_survives_restart() {
        let storage = MemoryStorage::default();
        {
            let Harness { mut app, .. } = harness_with(storage.clone());
            run(&mut app, "inter").await.unwrap();
            run(&mut app, "open 2").await.unwrap();
            run(&mut app, "rate 7").await.unwrap();
            run(&mut app, "add").await.unwrap();
        }

        let Harness { mut app, .. } = harness_with(storage);
        let listing = run(&mut app, "watched").await.unwrap();
        assert!(listing.contains("Die Hard"));
        assert!(listing.contains("🌟 7"));

        let removed = run(&mut app, "remove 1").await.unwrap();
        assert!(removed.contains("You have not added any movies yet"));
        assert_matches!(run(&mut app, "remove tt0095016").await, Err(AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_empty_line_clears_search() {
        let Harness { mut app, .. } = harness_with(MemoryStorage::default());

        run(&mut app, "inter").await.unwrap();
        let cleared = run(&mut app, "").await.unwrap();

        assert_eq!(cleared, "Type a title to search movies");
        assert_matches!(run(&mut app, "open 1").await, Err(AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_not_found_is_reported_in_place_of_results() {
        let Harness { mut app, .. } = harness_with(MemoryStorage::default());

        let output = run(&mut app, "no such film").await.unwrap();
        assert_eq!(output, "✖ Movie not found!");
    }

    #[tokio::test]
    async fn test_quit_and_stats() {
        let Harness { mut app, .. } = harness_with(MemoryStorage::default());

        assert_eq!(run(&mut app, "stats").await.unwrap(), "Movies you watched\n#️⃣ 0 movies  ⭐️ N/A  🌟 N/A  ⏳ N/A min");
        assert_eq!(app.execute(Command::Quit).await.unwrap(), Outcome::Quit);
    }
}
