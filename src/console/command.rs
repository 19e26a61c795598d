//! Console command parsing: one input line becomes one [`Command`].
//!
//! Parsing is deliberately hand-rolled; the grammar is a single keyword plus
//! positional arguments. Errors are usage hints, printed as-is.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Re-fetch and show the full feed.
    Stories,
    /// Show the logged-in user's favorites.
    Favorites,
    /// Show the logged-in user's own stories.
    Mine,
    /// Submit a new story. Blank fields are passed through so validation
    /// can report them, like submitting an empty form.
    Submit { url: String, title: String },
    /// Toggle the favorite star on the n-th story of the current view.
    Star { index: usize },
    /// Delete the n-th story of the current view.
    Delete { index: usize },
    Login { username: String, password: String },
    Signup { username: String, password: String, name: String },
    Logout,
    /// Show the logged-in user's profile.
    Whoami,
    Help,
    Quit,
}

/// Parse a trimmed, non-empty input line. `Err` carries a usage hint.
pub fn parse(input: &str) -> Result<Command, String> {
    let mut parts = input.split_whitespace();
    let Some(keyword) = parts.next() else {
        return Err("type a command (try 'help')".to_string());
    };

    match keyword.to_ascii_lowercase().as_str() {
        "stories" | "all" => Ok(Command::Stories),
        "favorites" | "favs" => Ok(Command::Favorites),
        "mine" | "own" => Ok(Command::Mine),
        "submit" => {
            let url = parts.next().unwrap_or_default().to_string();
            let title = parts.collect::<Vec<_>>().join(" ");
            Ok(Command::Submit { url, title })
        }
        "star" | "fav" => parse_index(parts.next(), "star").map(|index| Command::Star { index }),
        "delete" | "del" => {
            parse_index(parts.next(), "delete").map(|index| Command::Delete { index })
        }
        "login" => match (parts.next(), parts.next()) {
            (Some(username), Some(password)) => Ok(Command::Login {
                username: username.to_string(),
                password: password.to_string(),
            }),
            _ => Err("usage: login <username> <password>".to_string()),
        },
        "signup" => {
            let username = parts.next();
            let password = parts.next();
            let name = parts.collect::<Vec<_>>().join(" ");
            match (username, password) {
                (Some(username), Some(password)) if !name.is_empty() => Ok(Command::Signup {
                    username: username.to_string(),
                    password: password.to_string(),
                    name,
                }),
                _ => Err("usage: signup <username> <password> <display name>".to_string()),
            }
        }
        "logout" => Ok(Command::Logout),
        "whoami" | "profile" => Ok(Command::Whoami),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" | "q" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}' (try 'help')")),
    }
}

fn parse_index(arg: Option<&str>, keyword: &str) -> Result<usize, String> {
    arg.and_then(|a| a.parse::<usize>().ok())
        .filter(|n| *n >= 1)
        .ok_or_else(|| format!("usage: {keyword} <story number>"))
}
