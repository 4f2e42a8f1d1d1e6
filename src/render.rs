//! Terminal presentation: the prompt, object listings and status lines.
//!
//! Pure string builders plus one printing entry point, so formatting is
//! testable without a terminal. Readonly attribute names render green,
//! writable ones red.

use colored::Colorize;

use crate::protocol::{DomainObject, DownloadOutcome};
use crate::repl::{Outcome, SweepAccess};

pub fn prompt(identity: &str, base_url: &str) -> String {
    format!("[{} @ {}]: ", identity.blue(), base_url.green())
}

pub fn usage() -> String {
    "\
commands:
    help                    Print this help
    !                       List all class names, sorted
    ?                       Print 1 object of each class
    //<class> [nr] [offset] Find nr (default 1) objects of a class: //System.User
    <guid>                  Find the object with the given guid
    +<guid> <name> <value>  Update an attribute of the given object
    login [<username>]      Login as the given user, or as anonymous
    @<guid>                 Login as each known user and check access to the object
    $<guid>                 Download the file attached to the object
"
    .to_string()
}

pub fn format_objects(objects: &[DomainObject]) -> String {
    let mut out = String::new();
    for object in objects {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!(
            "[{}] @ {}",
            object.object_type.blue(),
            object.guid.cyan()
        ));
        for (name, attribute) in &object.attributes {
            let label = if attribute.readonly {
                name.green()
            } else {
                name.red()
            };
            out.push_str(&format!("\n\t{}: {}", label, value_text(&attribute.value)));
        }
    }
    out
}

pub fn print_outcome(outcome: &Outcome) {
    match outcome {
        Outcome::Usage => println!("{}", usage()),
        Outcome::Objects { subject, objects } => print_objects(subject, objects),
        Outcome::ClassNames(names) => {
            for name in names {
                println!("//{name}");
            }
        }
        Outcome::ClassSamples(samples) => {
            for sample in samples {
                print_objects(&format!("//{}", sample.class), &sample.objects);
            }
        }
        Outcome::SweepReport { entries, restored } => {
            for entry in entries {
                match &entry.access {
                    SweepAccess::Queried(objects) => {
                        println!("{}", format!("[as {}]", entry.username).blue());
                        print_objects(&entry.username, objects);
                    }
                    SweepAccess::QueryFailed(reason) => {
                        println!(
                            "{}",
                            format!("[as {}: query failed: {reason}]", entry.username).red()
                        );
                    }
                    SweepAccess::LoginFailed(reason) => {
                        println!(
                            "{}",
                            format!("[as {}: login failed: {reason}]", entry.username).red()
                        );
                    }
                }
            }
            println!("{}", format!("[restored identity: {restored}]").green());
        }
        Outcome::LoginChanged { identity } => {
            println!("{}", format!("[logged in as {identity}]").green());
        }
        Outcome::UserNotFound { username } => {
            println!("{}", format!("[user not found: {username}]").yellow());
        }
        Outcome::LoginFailed { username } => {
            println!("{}", format!("[login failed for {username}]").red());
        }
        Outcome::Download(download) => match download {
            DownloadOutcome::AlreadyPresent { path } => {
                println!("{}", format!("[already downloaded: {}]", path.display()).yellow());
            }
            DownloadOutcome::Saved { path } => {
                println!("{}", format!("[saved: {}]", path.display()).green());
            }
            DownloadOutcome::Unavailable { status } => {
                println!("{}", format!("[download failed (status {status})]").red());
            }
        },
        Outcome::Unrecognized { input } => {
            println!("{}", format!("[unrecognized command: {input}]").bright_black());
        }
    }
}

fn print_objects(subject: &str, objects: &[DomainObject]) {
    if objects.is_empty() {
        println!("{}", format!("[No results for {subject}]").yellow());
    } else {
        println!("{}", format_objects(objects));
    }
}

fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
