//! Interactive country explorer.
//!
//! One long-lived `App` backs the whole shell, so the session cookie set by
//! `login` stays valid for every later command.
//!
//! ```bash
//! # against the bundled mock backend
//! PORT=3000 cargo run -p mock-backend &
//! COUNTRIES_API_URL=http://127.0.0.1:3000/v3.1 \
//! COUNTRIES_AUTH_URL=http://127.0.0.1:3000/api/auth \
//!     cargo run -p countries-cli
//! ```

mod command;

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use countries_core::{App, Config, Country, FileStorage, Filters, SessionError, SessionState, UreqTransport, User};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use command::{Command, ThemeAction, HELP};

type ShellApp = App<UreqTransport, FileStorage>;

fn main() -> Result<()> {
    init_logging();

    let config = Config::from_env().context("reading configuration")?;
    info!(
        countries = %config.countries_base_url,
        auth = %config.auth_base_url,
        storage = %config.storage_dir.display(),
        "starting"
    );
    let storage = FileStorage::new(&config.storage_dir);
    let mut app = App::init(&config, UreqTransport::new(), storage);

    match app.session().state() {
        SessionState::Authenticated(user) => println!("signed in as {}", user.username),
        _ => println!("not signed in"),
    }
    println!("type `help` for commands");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        write!(stdout, "> ")?;
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        match command::parse(&line) {
            Ok(Command::Quit) => break,
            Ok(cmd) => {
                debug!(?cmd, "dispatch");
                run(&mut app, cmd);
            }
            Err(msg) => println!("{msg}"),
        }
    }

    app.teardown();
    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn run(app: &mut ShellApp, cmd: Command) {
    match cmd {
        Command::List(page) => {
            if app.browser().all().is_empty() {
                app.load_countries();
            } else {
                app.browser_mut().clear_filters();
            }
            if let Some(page) = page {
                go_to_page(app, page);
            }
            print_page(app);
        }
        Command::Search(term) => filter(app, Filters::search(&term)),
        Command::Region(region) => filter(app, Filters::region(&region)),
        Command::Language(language) => filter(app, Filters::language(&language)),
        Command::Currency(currency) => filter(app, Filters::currency(&currency)),
        Command::Presets(facet) => println!("{}", facet.presets().join(", ")),
        Command::Clear => {
            app.browser_mut().clear_filters();
            print_page(app);
        }
        Command::Page(page) => {
            go_to_page(app, page);
            print_page(app);
        }
        Command::Show(code) => match app.countries().get_details(&code) {
            Some(country) => print_details(app, &country),
            None => println!("country not found"),
        },
        Command::Login { username, password } => {
            let result = app.login(&username, &password);
            report_credentials(app, result);
        }
        Command::Register { username, password } => {
            let result = app.register(&username, &password);
            report_credentials(app, result);
        }
        Command::Logout => {
            app.logout();
            println!("signed out");
        }
        Command::WhoAmI => match app.session().user() {
            Some(user) => println!("{} ({})", user.username, user.id.as_deref().unwrap_or("no id")),
            None => println!("not signed in"),
        },
        Command::Favorites => {
            if app.favorites().is_empty() {
                println!("no favorites yet");
            }
            for country in app.favorites().list() {
                print_row(country, true);
            }
        }
        Command::AddFavorite(code) => {
            if !app.session().is_authenticated() {
                println!("sign in to save favorites");
                return;
            }
            match app.add_favorite_by_code(&code) {
                Some(true) => println!("added {}", code.to_uppercase()),
                Some(false) => println!("already a favorite"),
                None => println!("country not found"),
            }
        }
        Command::RemoveFavorite(code) => {
            let favorites = app.favorites_mut();
            if favorites.remove(&code) || favorites.remove(&code.to_uppercase()) {
                println!("removed {code}");
            } else {
                println!("not a favorite");
            }
        }
        Command::Theme(action) => {
            let mode = match action {
                ThemeAction::Show => app.theme().mode(),
                ThemeAction::Toggle => app.theme_mut().toggle(),
                ThemeAction::Set(mode) => {
                    app.theme_mut().set(mode);
                    mode
                }
            };
            println!("theme: {mode}");
        }
        Command::Help => println!("{HELP}"),
        Command::Quit => {}
    }
}

fn filter(app: &mut ShellApp, filters: Filters) {
    if app.browser().all().is_empty() {
        app.load_countries();
    }
    app.apply_filters(filters);
    print_page(app);
}

fn go_to_page(app: &mut ShellApp, page: usize) {
    if !app.browser_mut().set_page(page) {
        println!("no page {page} (1-{})", app.browser().total_pages());
    }
}

fn report_credentials(app: &ShellApp, result: Result<User, SessionError>) {
    match result {
        Ok(user) => println!(
            "signed in as {} ({} favorites)",
            user.username,
            app.favorites().len()
        ),
        Err(SessionError::Rejected(payload)) => match payload.get("message").and_then(|m| m.as_str()) {
            Some(message) => println!("{message}"),
            None => println!("{payload}"),
        },
        Err(error) => println!("{error}"),
    }
}

fn print_page(app: &ShellApp) {
    let browser = app.browser();
    if browser.countries().is_empty() {
        println!("no countries found");
        return;
    }
    for country in browser.current_page() {
        print_row(country, app.favorites().is_favorite(country.favorite_key()));
    }
    println!(
        "page {}/{} ({} countries)",
        browser.page(),
        browser.total_pages(),
        browser.countries().len()
    );
}

fn print_row(country: &Country, favorite: bool) {
    println!(
        "{} {:<4} {:<32} {:<12} {:>15}  {}",
        if favorite { "*" } else { " " },
        country.cca3,
        country.common_name(),
        country.region,
        country.population_display(),
        country.capital_display(),
    );
}

fn print_details(app: &ShellApp, country: &Country) {
    let star = if app.favorites().is_favorite(country.favorite_key()) { " *" } else { "" };
    println!("{} ({}){star}", country.common_name(), country.cca3);
    if !country.name.official.is_empty() {
        println!("  official:   {}", country.name.official);
    }
    println!("  capital:    {}", country.capital_display());
    let region = match &country.subregion {
        Some(sub) => format!("{} / {sub}", country.region),
        None => country.region.clone(),
    };
    println!("  region:     {region}");
    println!("  population: {}", country.population_display());
    if let Some(area) = country.area {
        println!("  area:       {area} km²");
    }
    println!("  languages:  {}", country.language_names().join(", "));
    println!("  currencies: {}", country.currency_labels().join(", "));
    if !country.timezones.is_empty() {
        println!("  timezones:  {}", country.timezones.join(", "));
    }
    if country.borders.is_empty() {
        println!("  borders:    none");
    } else {
        println!("  borders:    {}", country.borders.join(", "));
    }
    if let Some(flag) = &country.flags {
        println!("  flag:       {}", flag.png);
    }
}
