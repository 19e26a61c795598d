//! Console channel — reads command lines from stdin, dispatches to the
//! session, prints the rendered result to stdout.
//!
//! One command is handled to completion before the next line is read, so
//! user actions are serialized and the in-memory state is never mutated by
//! two handlers at once. Errors are reported per command; nothing a failed
//! call does ends the loop. Runs until the `shutdown` token is cancelled
//! (Ctrl-C), stdin closes, or the user quits.

pub mod command;
pub mod render;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::UiConfig;
use crate::error::AppError;
use crate::session::{Session, View};

use command::Command;

/// A delete waiting for its confirmation line.
struct PendingDelete {
    story_id: String,
    title: String,
}

enum Outcome {
    Continue,
    Quit,
    Confirm(PendingDelete),
}

/// Run the console loop until shutdown, EOF, or `quit`.
pub async fn run(
    mut session: Session,
    ui: UiConfig,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!("console started — type 'help' for commands, Ctrl-C to quit");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();
    let mut pending: Option<PendingDelete> = None;

    loop {
        if pending.is_some() {
            print!("[y/N] > ");
        } else {
            print!("> ");
        }
        use std::io::Write as _;
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!();
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("console stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim().to_string();

                        // A pending confirmation consumes the next line,
                        // whatever it is; anything but yes cancels.
                        if let Some(p) = pending.take() {
                            finish_delete(&mut session, &ui, p, &input).await;
                            continue;
                        }

                        if input.is_empty() { continue; }
                        debug!(input = %input, "console received line");

                        match command::parse(&input) {
                            Err(usage) => println!("{usage}"),
                            Ok(cmd) => match dispatch(&mut session, &ui, cmd).await {
                                Outcome::Continue => {}
                                Outcome::Quit => break,
                                Outcome::Confirm(p) => pending = Some(p),
                            },
                        }
                    }
                }
            }
        }
    }

    Ok(())
}

// ── Dispatch ─────────────────────────────────────────────────────────────────

const LOGIN_REQUIRED: &str = "login required (try 'login' or 'signup')";

async fn dispatch(session: &mut Session, ui: &UiConfig, cmd: Command) -> Outcome {
    match cmd {
        Command::Stories => match session.refresh_stories().await {
            Ok(count) => {
                debug!(count, "feed refreshed");
                session.set_view(View::Feed);
                show_view(session, ui);
            }
            Err(e) => report(&e),
        },

        Command::Favorites => match session.user() {
            None => println!("{LOGIN_REQUIRED}"),
            Some(u) if u.favorites.is_empty() => println!("No stories yet added to favorites."),
            Some(_) => {
                session.set_view(View::Favorites);
                show_view(session, ui);
            }
        },

        Command::Mine => match session.user() {
            None => println!("{LOGIN_REQUIRED}"),
            Some(u) if u.own_stories.is_empty() => println!("No stories yet created."),
            Some(_) => {
                session.set_view(View::Own);
                show_view(session, ui);
            }
        },

        Command::Submit { url, title } => match session.submit_story(&title, &url).await {
            Ok(story) => {
                println!("posted \"{}\"", story.title);
                session.set_view(View::Feed);
                show_view(session, ui);
            }
            Err(e) => report(&e),
        },

        Command::Star { index } => {
            let target = session
                .story_at(index)
                .map(|s| (s.story_id.clone(), s.title.clone()));
            match target {
                Err(e) => report(&e),
                Ok((story_id, title)) => match session.toggle_favorite(&story_id).await {
                    Ok(true) => {
                        println!("added \"{title}\" to favorites");
                        show_view(session, ui);
                    }
                    Ok(false) => {
                        println!("removed \"{title}\" from favorites");
                        // Re-render so a story unfavorited from the
                        // favorites view disappears from it.
                        show_view(session, ui);
                    }
                    Err(e) => report(&e),
                },
            }
        }

        Command::Delete { index } => {
            if session.user().is_none() {
                println!("{LOGIN_REQUIRED}");
                return Outcome::Continue;
            }
            let target = session
                .story_at(index)
                .map(|s| (s.story_id.clone(), s.title.clone()));
            match target {
                Err(e) => report(&e),
                Ok((story_id, title)) => {
                    let is_own = session.user().map(|u| u.is_own(&story_id)).unwrap_or(false);
                    if !is_own {
                        println!("you can only delete your own stories");
                    } else if ui.confirm_delete {
                        println!("delete \"{title}\"? [y/N]");
                        return Outcome::Confirm(PendingDelete { story_id, title });
                    } else {
                        delete_now(session, ui, &story_id, &title).await;
                    }
                }
            }
        }

        Command::Login { username, password } => match session.login(&username, &password).await {
            Ok(()) => {
                println!("logged in as {username}");
                session.set_view(View::Feed);
                show_view(session, ui);
            }
            Err(e) => report(&e),
        },

        Command::Signup { username, password, name } => {
            match session.signup(&username, &password, &name).await {
                Ok(()) => {
                    println!("welcome, {name} (account created)");
                    session.set_view(View::Feed);
                    show_view(session, ui);
                }
                Err(e) => report(&e),
            }
        }

        Command::Logout => match session.logout() {
            Ok(()) => println!("logged out"),
            Err(e) => report(&e),
        },

        Command::Whoami => match session.user() {
            Some(user) => print!("{}", render::profile(user)),
            None => println!("not logged in"),
        },

        Command::Help => println!("{}", render::help()),

        Command::Quit => return Outcome::Quit,
    }
    Outcome::Continue
}

async fn finish_delete(session: &mut Session, ui: &UiConfig, pending: PendingDelete, input: &str) {
    if input.eq_ignore_ascii_case("y") || input.eq_ignore_ascii_case("yes") {
        delete_now(session, ui, &pending.story_id, &pending.title).await;
    } else {
        println!("not deleted");
    }
}

async fn delete_now(session: &mut Session, ui: &UiConfig, story_id: &str, title: &str) {
    match session.delete_story(story_id).await {
        Ok(()) => {
            println!("deleted \"{title}\"");
            show_view(session, ui);
        }
        Err(e) => report(&e),
    }
}

/// Render the session's current view.
fn show_view(session: &Session, ui: &UiConfig) {
    let heading = match session.view() {
        View::Feed => "All stories",
        View::Favorites => "Your favorites",
        View::Own => "Your stories",
    };
    print!(
        "{}",
        render::story_list(heading, session.visible(), session.user(), ui.page_size)
    );
}

/// Print a failed command without ending the loop. Validation messages are
/// shown verbatim; everything else gets an `error:` prefix.
fn report(e: &AppError) {
    warn!("command failed: {e}");
    match e {
        AppError::Invalid(msg) => println!("{msg}"),
        other => println!("error: {other}"),
    }
}
