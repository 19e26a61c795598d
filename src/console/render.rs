//! Text rendering of story lists and the profile view.
//!
//! Everything here returns a `String` so the console loop owns all printing
//! and tests can assert on the exact output.

use crate::story::Story;
use crate::user::CurrentUser;

/// One story line: index, favorite star (logged in only), title, host,
/// author, poster, and a marker on the user's own stories.
pub fn story_line(n: usize, story: &Story, user: Option<&CurrentUser>) -> String {
    let star = match user {
        None => "",
        Some(u) if u.is_favorite(&story.story_id) => "★ ",
        Some(_) => "☆ ",
    };
    let own = match user {
        Some(u) if u.is_own(&story.story_id) => "  (yours)",
        _ => "",
    };
    format!(
        "{n:>3}. {star}{title} ({host})  by {author}, posted by {username}{own}",
        title = story.title,
        host = story.host_name(),
        author = story.author,
        username = story.username,
    )
}

/// A full view: heading, numbered story lines, and a cut-off note when the
/// list is longer than `page_size`.
pub fn story_list(
    heading: &str,
    stories: &[Story],
    user: Option<&CurrentUser>,
    page_size: usize,
) -> String {
    let mut out = String::new();
    out.push_str(heading);
    out.push('\n');

    if stories.is_empty() {
        out.push_str("  (no stories)\n");
        return out;
    }

    for (i, story) in stories.iter().take(page_size).enumerate() {
        out.push_str(&story_line(i + 1, story, user));
        out.push('\n');
    }

    let hidden = stories.len().saturating_sub(page_size);
    if hidden > 0 {
        out.push_str(&format!("     ... and {hidden} more\n"));
    }
    out
}

pub fn profile(user: &CurrentUser) -> String {
    let joined = user
        .created_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "unknown".to_string());
    format!(
        "{username} ({name})\n  joined:    {joined}\n  favorites: {favs}\n  stories:   {own}\n",
        username = user.username,
        name = user.name,
        favs = user.favorites.len(),
        own = user.own_stories.len(),
    )
}

pub fn help() -> &'static str {
    "commands:\n\
     \x20 stories                               show the story feed\n\
     \x20 favorites                             show your favorites\n\
     \x20 mine                                  show your own stories\n\
     \x20 submit <url> <title>                  post a new story\n\
     \x20 star <n>                              favorite / unfavorite story n\n\
     \x20 delete <n>                            delete your story n\n\
     \x20 login <username> <password>\n\
     \x20 signup <username> <password> <name>\n\
     \x20 logout | whoami | help | quit"
}
