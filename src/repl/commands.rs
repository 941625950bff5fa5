//! REPL Commands
//!
//! The command registry and the per-run session every handler works on.

use std::io::Write;

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{CommandError, Result};
use crate::fetch::{CachedFetcher, Fetcher};
use crate::models::{LocationArea, LocationPage, Pokemon};
use crate::pokedex::{is_caught, Pokedex};

// == Command Registry ==
/// Every command the REPL understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Map,
    Mapb,
    Explore,
    Catch,
    Inspect,
    Pokedex,
}

/// Help text for one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandInfo {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
    pub command: Command,
}

/// Registry in the order `help` prints it. Entries follow the declaration
/// order of `Command`.
pub const COMMANDS: &[CommandInfo] = &[
    CommandInfo {
        name: "help",
        usage: "help",
        description: "Displays a help message",
        command: Command::Help,
    },
    CommandInfo {
        name: "exit",
        usage: "exit",
        description: "Exit the Pokedex",
        command: Command::Exit,
    },
    CommandInfo {
        name: "map",
        usage: "map",
        description: "Get all available locations. Call again to get the next page.",
        command: Command::Map,
    },
    CommandInfo {
        name: "mapb",
        usage: "mapb",
        description: "Get previous page of all available locations",
        command: Command::Mapb,
    },
    CommandInfo {
        name: "explore",
        usage: "explore <location name>",
        description: "Get a list of Pokemon commonly found in this area",
        command: Command::Explore,
    },
    CommandInfo {
        name: "catch",
        usage: "catch <pokemon name or id>",
        description: "Attempt to catch a pokemon",
        command: Command::Catch,
    },
    CommandInfo {
        name: "inspect",
        usage: "inspect <pokemon name or id>",
        description: "Check the pokedex for information on your caught pokemon",
        command: Command::Inspect,
    },
    CommandInfo {
        name: "pokedex",
        usage: "pokedex",
        description: "List the pokemon you've caught",
        command: Command::Pokedex,
    },
];

impl Command {
    /// Looks a command up by its name.
    pub fn parse(name: &str) -> Option<Command> {
        COMMANDS
            .iter()
            .find(|info| info.name == name)
            .map(|info| info.command)
    }

    /// Registry entry for this command.
    pub fn info(self) -> &'static CommandInfo {
        &COMMANDS[self as usize]
    }
}

/// What the loop should do after a command ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Position in the location-area listing.
#[derive(Debug, Default)]
struct PageCursor {
    started: bool,
    next: Option<String>,
    previous: Option<String>,
}

// == Session ==
/// State owned by one REPL run and handed to every command.
pub struct Session<F> {
    fetcher: CachedFetcher<F>,
    api_url: String,
    page_size: u32,
    pages: PageCursor,
    pokedex: Pokedex,
    rng: Box<dyn RngCore + Send>,
}

impl<F: Fetcher> Session<F> {
    /// Creates a session reading through `fetcher`, with an entropy-seeded
    /// random source for catch rolls.
    pub fn new(fetcher: CachedFetcher<F>, config: &Config) -> Self {
        Self {
            fetcher,
            api_url: config.api_url.clone(),
            page_size: config.page_size,
            pages: PageCursor::default(),
            pokedex: Pokedex::new(),
            rng: Box::new(StdRng::from_entropy()),
        }
    }

    /// Replaces the random source used for catch rolls.
    pub fn with_rng(mut self, rng: impl RngCore + Send + 'static) -> Self {
        self.rng = Box::new(rng);
        self
    }

    pub fn fetcher(&self) -> &CachedFetcher<F> {
        &self.fetcher
    }

    pub fn pokedex(&self) -> &Pokedex {
        &self.pokedex
    }

    // == Endpoints ==
    pub fn first_locations_url(&self) -> String {
        format!(
            "{}location-area/?offset=0&limit={}",
            self.api_url, self.page_size
        )
    }

    pub fn location_url(&self, name: &str) -> String {
        format!("{}location-area/{}/", self.api_url, name)
    }

    pub fn pokemon_url(&self, name_or_id: &str) -> String {
        format!("{}pokemon/{}/", self.api_url, name_or_id)
    }

    // == Dispatch ==
    /// Runs one already-cleaned input line.
    ///
    /// `words[0]` names the command and the rest are its arguments. Unknown
    /// commands are reported on `out` rather than as an error.
    pub async fn execute<W: Write>(&mut self, words: &[String], out: &mut W) -> Result<Flow> {
        let Some((name, args)) = words.split_first() else {
            return Ok(Flow::Continue);
        };

        let Some(command) = Command::parse(name) else {
            writeln!(out, "Unknown command")?;
            return Ok(Flow::Continue);
        };

        debug!(command = %name, args = args.len(), "dispatching command");

        match command {
            Command::Help => self.help(out)?,
            Command::Exit => {
                writeln!(out, "Closing the Pokedex... Goodbye!")?;
                return Ok(Flow::Exit);
            }
            Command::Map => self.map(out).await?,
            Command::Mapb => self.mapb(out).await?,
            Command::Explore => {
                let location = required_arg(args, command)?;
                self.explore(location, out).await?;
            }
            Command::Catch => {
                let target = required_arg(args, command)?;
                self.catch(target, out).await?;
            }
            Command::Inspect => {
                let target = required_arg(args, command)?;
                self.inspect(target, out)?;
            }
            Command::Pokedex => self.list_pokedex(out)?,
        }

        Ok(Flow::Continue)
    }

    // == Handlers ==
    fn help<W: Write>(&self, out: &mut W) -> Result<()> {
        writeln!(out, "Welcome to the Pokedex!")?;
        writeln!(out, "Usage:")?;
        writeln!(out)?;
        for info in COMMANDS {
            writeln!(out, "{}: {}", info.usage, info.description)?;
        }
        writeln!(out)?;
        Ok(())
    }

    async fn map<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let url = if !self.pages.started {
            self.first_locations_url()
        } else if let Some(next) = self.pages.next.clone() {
            next
        } else {
            writeln!(out, "You're on the last page")?;
            return Ok(());
        };

        self.show_locations_page(&url, out).await
    }

    async fn mapb<W: Write>(&mut self, out: &mut W) -> Result<()> {
        let url = match self.pages.previous.clone() {
            Some(previous) => previous,
            None => self.first_locations_url(),
        };

        self.show_locations_page(&url, out).await
    }

    async fn show_locations_page<W: Write>(&mut self, url: &str, out: &mut W) -> Result<()> {
        let page: LocationPage = self.fetch_json(url).await?;

        writeln!(out)?;
        for area in &page.results {
            writeln!(out, "{}", area.name)?;
        }
        writeln!(out)?;

        self.pages = PageCursor {
            started: true,
            next: page.next,
            previous: page.previous,
        };
        Ok(())
    }

    async fn explore<W: Write>(&mut self, location: &str, out: &mut W) -> Result<()> {
        let area: LocationArea = self.fetch_json(&self.location_url(location)).await?;

        writeln!(out, "Exploring {}...", location)?;
        if area.pokemon_encounters.is_empty() {
            writeln!(out, "No Pokemon found")?;
            return Ok(());
        }

        writeln!(out, "Found Pokemon:")?;
        for encounter in &area.pokemon_encounters {
            writeln!(out, " - {}", encounter.pokemon.name)?;
        }
        Ok(())
    }

    async fn catch<W: Write>(&mut self, target: &str, out: &mut W) -> Result<()> {
        let pokemon: Pokemon = self.fetch_json(&self.pokemon_url(target)).await?;

        writeln!(out, "Throwing a Pokeball at {}...", pokemon.name)?;

        let roll: f32 = self.rng.gen();
        if is_caught(pokemon.base_experience, roll) {
            info!(pokemon = %pokemon.name, roll, "caught");
            writeln!(out, "{} was caught!", pokemon.name)?;
            self.pokedex.insert(pokemon);
        } else {
            debug!(pokemon = %pokemon.name, roll, "escaped");
            writeln!(out, "{} escaped!", pokemon.name)?;
        }
        Ok(())
    }

    fn inspect<W: Write>(&self, target: &str, out: &mut W) -> Result<()> {
        let Some(pokemon) = self.pokedex.get(target) else {
            writeln!(out, "You haven't caught that pokemon")?;
            return Ok(());
        };

        writeln!(out, "Name: {}", pokemon.name)?;
        writeln!(out, "ID: {}", pokemon.id)?;
        writeln!(out, "Height: {}", pokemon.height)?;
        writeln!(out, "Weight: {}", pokemon.weight)?;
        writeln!(out, "Stats:")?;
        for stat in &pokemon.stats {
            writeln!(out, "  -{}: {}", stat.stat.name, stat.base_stat)?;
        }
        writeln!(out, "Types:")?;
        for kind in &pokemon.types {
            writeln!(out, "  - {}", kind.kind.name)?;
        }
        Ok(())
    }

    fn list_pokedex<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.pokedex.is_empty() {
            writeln!(out, "You haven't caught any Pokemon!")?;
            return Ok(());
        }

        writeln!(out, "Your Pokedex:")?;
        for pokemon in self.pokedex.iter() {
            writeln!(out, " - {}", pokemon.name)?;
        }
        Ok(())
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.fetcher.fetch(url).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

fn required_arg(args: &[String], command: Command) -> Result<&str> {
    args.first()
        .map(String::as_str)
        .ok_or(CommandError::MissingArgument(command.info().usage))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use async_trait::async_trait;
    use bytes::Bytes;
    use rand::rngs::mock::StepRng;

    use crate::cache::ExpiringCache;
    use crate::error::FetchError;

    const API: &str = "http://pokeapi.test/api/v2/";

    /// Serves canned bodies by URL and 404s everything else.
    #[derive(Default)]
    struct CannedFetcher {
        bodies: HashMap<String, String>,
        calls: AtomicUsize,
    }

    impl CannedFetcher {
        fn with(mut self, url: &str, body: &str) -> Self {
            self.bodies.insert(url.to_string(), body.to_string());
            self
        }
    }

    #[async_trait]
    impl Fetcher for CannedFetcher {
        async fn fetch(&self, url: &str) -> std::result::Result<Bytes, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.bodies
                .get(url)
                .map(|body| Bytes::from(body.clone()))
                .ok_or_else(|| FetchError::Status {
                    url: url.to_string(),
                    status: 404,
                })
        }
    }

    fn session(fetcher: CannedFetcher) -> Session<CannedFetcher> {
        let config = Config {
            api_url: API.to_string(),
            page_size: 2,
            ..Config::default()
        };
        let cache = Arc::new(ExpiringCache::new(Duration::from_secs(300)));
        Session::new(CachedFetcher::new(cache, fetcher), &config)
    }

    fn words(line: &str) -> Vec<String> {
        crate::repl::clean_input(line)
    }

    async fn run(session: &mut Session<CannedFetcher>, line: &str) -> (Result<Flow>, String) {
        let mut out = Vec::new();
        let flow = session.execute(&words(line), &mut out).await;
        (flow, String::from_utf8(out).unwrap())
    }

    fn page_json(names: &[&str], next: Option<&str>, previous: Option<&str>) -> String {
        serde_json::json!({
            "count": 6,
            "next": next,
            "previous": previous,
            "results": names
                .iter()
                .map(|n| serde_json::json!({"name": n, "url": ""}))
                .collect::<Vec<_>>(),
        })
        .to_string()
    }

    const PIKACHU: &str = r#"{
        "id": 25, "name": "pikachu", "base_experience": 112, "height": 4, "weight": 60,
        "stats": [{"base_stat": 35, "effort": 0, "stat": {"name": "hp", "url": ""}}],
        "types": [{"slot": 1, "type": {"name": "electric", "url": ""}}]
    }"#;

    fn paged_fetcher() -> CannedFetcher {
        let first = format!("{API}location-area/?offset=0&limit=2");
        let second = format!("{API}location-area/?offset=2&limit=2");
        let third = format!("{API}location-area/?offset=4&limit=2");
        CannedFetcher::default()
            .with(&first, &page_json(&["a1", "a2"], Some(&second), None))
            .with(&second, &page_json(&["b1", "b2"], Some(&third), Some(&first)))
            .with(&third, &page_json(&["c1", "c2"], None, Some(&second)))
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("map"), Some(Command::Map));
        assert_eq!(Command::parse("mapb"), Some(Command::Mapb));
        assert_eq!(Command::parse("fly"), None);
        assert_eq!(Command::Catch.info().usage, "catch <pokemon name or id>");
    }

    #[test]
    fn test_every_command_is_registered_once() {
        for (i, info) in COMMANDS.iter().enumerate() {
            assert_eq!(Command::parse(info.name), Some(info.command));
            assert_eq!(info.command as usize, i);
            assert_eq!(info.command.info().name, info.name);
        }
        assert_eq!(COMMANDS.len(), 8);
    }

    #[tokio::test]
    async fn test_unknown_command() {
        let mut session = session(CannedFetcher::default());

        let (flow, out) = run(&mut session, "fly away").await;

        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(out, "Unknown command\n");
    }

    #[tokio::test]
    async fn test_help_lists_all_commands_in_order() {
        let mut session = session(CannedFetcher::default());

        let (_, out) = run(&mut session, "help").await;

        assert!(out.starts_with("Welcome to the Pokedex!\nUsage:\n"));
        let help = out.find("help: Displays").unwrap();
        let pokedex = out.find("pokedex: List").unwrap();
        assert!(help < pokedex);
        assert!(out.contains("explore <location name>: Get a list"));
    }

    #[tokio::test]
    async fn test_exit_ends_session() {
        let mut session = session(CannedFetcher::default());

        let (flow, out) = run(&mut session, "exit").await;

        assert_eq!(flow.unwrap(), Flow::Exit);
        assert!(out.contains("Goodbye"));
    }

    #[tokio::test]
    async fn test_map_pages_forward_and_back() {
        let mut session = session(paged_fetcher());

        let (_, out) = run(&mut session, "map").await;
        assert_eq!(out, "\na1\na2\n\n");

        let (_, out) = run(&mut session, "map").await;
        assert_eq!(out, "\nb1\nb2\n\n");

        let (_, out) = run(&mut session, "map").await;
        assert_eq!(out, "\nc1\nc2\n\n");

        let (_, out) = run(&mut session, "map").await;
        assert_eq!(out, "You're on the last page\n");

        let (_, out) = run(&mut session, "mapb").await;
        assert_eq!(out, "\nb1\nb2\n\n");

        let (_, out) = run(&mut session, "mapb").await;
        assert_eq!(out, "\na1\na2\n\n");
    }

    #[tokio::test]
    async fn test_mapb_without_previous_shows_first_page() {
        let mut session = session(paged_fetcher());

        let (_, out) = run(&mut session, "mapb").await;
        assert_eq!(out, "\na1\na2\n\n");

        let (_, out) = run(&mut session, "map").await;
        assert_eq!(out, "\nb1\nb2\n\n");
    }

    #[tokio::test]
    async fn test_map_revisits_are_served_from_cache() {
        let mut session = session(paged_fetcher());

        run(&mut session, "map").await.0.unwrap();
        run(&mut session, "map").await.0.unwrap();
        run(&mut session, "mapb").await.0.unwrap();
        run(&mut session, "map").await.0.unwrap();

        assert_eq!(session.fetcher().upstream().calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_explore_lists_encounters() {
        let url = format!("{API}location-area/canalave-city-area/");
        let body = r#"{"name": "canalave-city-area", "pokemon_encounters": [
            {"pokemon": {"name": "tentacool", "url": ""}},
            {"pokemon": {"name": "staryu", "url": ""}}
        ]}"#;
        let mut session = session(CannedFetcher::default().with(&url, body));

        let (flow, out) = run(&mut session, "explore Canalave-City-Area").await;

        assert_eq!(flow.unwrap(), Flow::Continue);
        assert_eq!(
            out,
            "Exploring canalave-city-area...\nFound Pokemon:\n - tentacool\n - staryu\n"
        );
    }

    #[tokio::test]
    async fn test_explore_requires_location() {
        let mut session = session(CannedFetcher::default());

        let (flow, _) = run(&mut session, "explore").await;

        assert!(matches!(
            flow,
            Err(CommandError::MissingArgument("explore <location name>"))
        ));
    }

    #[tokio::test]
    async fn test_explore_unknown_location_surfaces_fetch_error() {
        let mut session = session(CannedFetcher::default());

        let (flow, _) = run(&mut session, "explore nowhere").await;

        assert!(matches!(
            flow,
            Err(CommandError::Fetch(FetchError::Status { status: 404, .. }))
        ));
        assert!(session.fetcher().cache().is_empty().await);
    }

    #[tokio::test]
    async fn test_catch_success_adds_to_pokedex() {
        let url = format!("{API}pokemon/pikachu/");
        let mut session =
            session(CannedFetcher::default().with(&url, PIKACHU)).with_rng(StepRng::new(u64::MAX, 0));

        let (_, out) = run(&mut session, "catch pikachu").await;

        assert_eq!(out, "Throwing a Pokeball at pikachu...\npikachu was caught!\n");
        assert!(session.pokedex().contains("pikachu"));
        assert!(session.pokedex().contains("25"));
    }

    #[tokio::test]
    async fn test_catch_escape_leaves_pokedex_empty() {
        let url = format!("{API}pokemon/pikachu/");
        let mut session =
            session(CannedFetcher::default().with(&url, PIKACHU)).with_rng(StepRng::new(0, 0));

        let (_, out) = run(&mut session, "catch pikachu").await;

        assert_eq!(out, "Throwing a Pokeball at pikachu...\npikachu escaped!\n");
        assert!(session.pokedex().is_empty());
    }

    #[tokio::test]
    async fn test_catch_malformed_body_is_decode_error() {
        let url = format!("{API}pokemon/glitch/");
        let mut session = session(CannedFetcher::default().with(&url, "<html>oops</html>"));

        let (flow, _) = run(&mut session, "catch glitch").await;

        assert!(matches!(flow, Err(CommandError::Decode(_))));
    }

    #[tokio::test]
    async fn test_inspect_caught_and_uncaught() {
        let url = format!("{API}pokemon/pikachu/");
        let mut session =
            session(CannedFetcher::default().with(&url, PIKACHU)).with_rng(StepRng::new(u64::MAX, 0));

        let (_, out) = run(&mut session, "inspect pikachu").await;
        assert_eq!(out, "You haven't caught that pokemon\n");

        run(&mut session, "catch pikachu").await.0.unwrap();

        let (_, out) = run(&mut session, "inspect 25").await;
        assert_eq!(
            out,
            "Name: pikachu\nID: 25\nHeight: 4\nWeight: 60\nStats:\n  -hp: 35\nTypes:\n  - electric\n"
        );
    }

    #[tokio::test]
    async fn test_pokedex_listing() {
        let url = format!("{API}pokemon/pikachu/");
        let mut session =
            session(CannedFetcher::default().with(&url, PIKACHU)).with_rng(StepRng::new(u64::MAX, 0));

        let (_, out) = run(&mut session, "pokedex").await;
        assert_eq!(out, "You haven't caught any Pokemon!\n");

        run(&mut session, "catch pikachu").await.0.unwrap();

        let (_, out) = run(&mut session, "pokedex").await;
        assert_eq!(out, "Your Pokedex:\n - pikachu\n");
    }
}
