//! Shell command grammar.

use countries_core::{ThemeMode, CURRENCIES, LANGUAGES, REGIONS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    List(Option<usize>),
    Search(String),
    Region(String),
    Language(String),
    Currency(String),
    Presets(Facet),
    Clear,
    Page(usize),
    Show(String),
    Login { username: String, password: String },
    Register { username: String, password: String },
    Logout,
    WhoAmI,
    Favorites,
    AddFavorite(String),
    RemoveFavorite(String),
    Theme(ThemeAction),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThemeAction {
    Show,
    Toggle,
    Set(ThemeMode),
}

/// Filterable dimensions that come with a preset list of values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facet {
    Region,
    Language,
    Currency,
}

impl Facet {
    pub fn presets(self) -> &'static [&'static str] {
        match self {
            Facet::Region => &REGIONS,
            Facet::Language => &LANGUAGES,
            Facet::Currency => &CURRENCIES,
        }
    }
}

pub const HELP: &str = "\
commands:
  list [page]                 show the full list (optionally jump to a page)
  search <name>               search by name
  region|lang|currency <v>    filter by region, language, or currency code
  region|lang|currency        list the suggested values
  clear                       drop the active filter
  page <n>                    jump to page n of the current list
  show <code>                 details for a three-letter code
  login <user> <pass>         sign in
  register <user> <pass>      create an account and sign in
  logout                      sign out
  whoami                      current session
  favs                        list favorites
  fav <code> / unfav <code>   add or remove a favorite
  theme [toggle|light|dark]   show or change the theme
  help, quit";

/// Parse one input line. Multi-word arguments (search terms) keep their
/// inner spacing collapsed to single spaces.
pub fn parse(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };
    let rest: Vec<&str> = words.collect();
    let joined = || rest.join(" ");
    let one = |what: &str| -> Result<String, String> {
        match rest.as_slice() {
            [] => Err(format!("{verb}: missing {what}")),
            _ => Ok(joined()),
        }
    };
    let number = |raw: &str| raw.parse::<usize>().map_err(|_| format!("{verb}: {raw:?} is not a page number"));
    let credentials = || match rest.as_slice() {
        [username, password] => Ok((username.to_string(), password.to_string())),
        _ => Err(format!("usage: {verb} <username> <password>")),
    };

    match verb.to_ascii_lowercase().as_str() {
        "list" | "ls" => match rest.as_slice() {
            [] => Ok(Command::List(None)),
            [page] => Ok(Command::List(Some(number(*page)?))),
            _ => Err("usage: list [page]".to_string()),
        },
        "search" => one("name").map(Command::Search),
        "region" if rest.is_empty() => Ok(Command::Presets(Facet::Region)),
        "lang" | "language" if rest.is_empty() => Ok(Command::Presets(Facet::Language)),
        "currency" if rest.is_empty() => Ok(Command::Presets(Facet::Currency)),
        "region" => Ok(Command::Region(joined())),
        "lang" | "language" => Ok(Command::Language(joined())),
        "currency" => Ok(Command::Currency(joined())),
        "clear" => Ok(Command::Clear),
        "page" => match rest.as_slice() {
            [page] => Ok(Command::Page(number(*page)?)),
            _ => Err("usage: page <n>".to_string()),
        },
        "show" => one("code").map(Command::Show),
        "login" => credentials().map(|(username, password)| Command::Login { username, password }),
        "register" => credentials().map(|(username, password)| Command::Register { username, password }),
        "logout" => Ok(Command::Logout),
        "whoami" => Ok(Command::WhoAmI),
        "favs" | "favorites" => Ok(Command::Favorites),
        "fav" => one("code").map(Command::AddFavorite),
        "unfav" => one("code").map(Command::RemoveFavorite),
        "theme" => match rest.as_slice() {
            [] => Ok(Command::Theme(ThemeAction::Show)),
            ["toggle"] => Ok(Command::Theme(ThemeAction::Toggle)),
            [mode] => mode.parse().map(|m| Command::Theme(ThemeAction::Set(m))),
            _ => Err("usage: theme [toggle|light|dark]".to_string()),
        },
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command {other:?}; try `help`")),
    }
}
