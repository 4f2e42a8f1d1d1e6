//! Command grammar: one line of input becomes one typed command.
//!
//! Parsing is a pure function evaluated before any execution. Precedence
//! is longest/most-specific prefix first: empty/`help`, `//…`,
//! all-digits, `!`, `?`, `list`, `login…`, `+…`, `@…`, `$…`. Anything
//! else becomes [`Command::Unrecognized`] so the presentation layer can
//! surface it instead of swallowing input.

/// A classified line of interactive input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Empty line or `help`.
    Usage,
    /// `//Class [N [OFF]]`: N objects of Class starting at OFF.
    ClassQuery {
        class: String,
        limit: u64,
        offset: Option<u64>,
    },
    /// A bare string of digits: fetch one object by guid.
    GuidLookup { guid: String },
    /// `!`: class names, case-insensitively sorted.
    ClassNamesSorted,
    /// `?`: one object of each class, sorted, reported independently.
    SampleEachClass,
    /// `list`: class names in catalogue order.
    ClassNames,
    /// `login` / `login NAME`.
    Login { username: Option<String> },
    /// `+guid NAME VALUE...`: VALUE is the remaining tokens rejoined.
    UpdateAttribute {
        guid: String,
        attribute: String,
        value: String,
    },
    /// `@guid`: impersonation sweep over every known credential.
    AccessSweep { guid: String },
    /// `$guid`: download the file attached to the object.
    DownloadFile { guid: String },
    /// Input that matched no rule. Surfaced, never silently dropped.
    Unrecognized { input: String },
}

impl Command {
    pub fn parse(line: &str) -> Command {
        let line = line.trim();

        if line.is_empty() || line == "help" {
            return Command::Usage;
        }
        if let Some(rest) = line.strip_prefix("//") {
            return parse_class_query(rest, line);
        }
        if is_digits(line) {
            return Command::GuidLookup {
                guid: line.to_string(),
            };
        }
        match line {
            "!" => return Command::ClassNamesSorted,
            "?" => return Command::SampleEachClass,
            "list" => return Command::ClassNames,
            "login" => return Command::Login { username: None },
            _ => {}
        }
        if let Some(rest) = line.strip_prefix("login ") {
            return parse_login(rest, line);
        }
        if let Some(rest) = line.strip_prefix('+') {
            return parse_update(rest, line);
        }
        if let Some(rest) = line.strip_prefix('@') {
            return parse_guid_command(rest, line, |guid| Command::AccessSweep { guid });
        }
        if let Some(rest) = line.strip_prefix('$') {
            return parse_guid_command(rest, line, |guid| Command::DownloadFile { guid });
        }

        unrecognized(line)
    }
}

fn parse_class_query(rest: &str, line: &str) -> Command {
    let rest = rest.trim();
    if rest.is_empty() {
        return unrecognized(line);
    }
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() > 1 && is_digits(tokens[1]) {
        let limit = tokens[1].parse().unwrap_or(1);
        let offset = tokens
            .get(2)
            .filter(|token| is_digits(token))
            .and_then(|token| token.parse().ok());
        return Command::ClassQuery {
            class: tokens[0].to_string(),
            limit: u64::max(limit, 1),
            offset,
        };
    }
    // No count given; the whole remainder is the class name.
    Command::ClassQuery {
        class: rest.to_string(),
        limit: 1,
        offset: None,
    }
}

fn parse_login(rest: &str, line: &str) -> Command {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    match tokens.as_slice() {
        [username] => Command::Login {
            username: Some((*username).to_string()),
        },
        _ => unrecognized(line),
    }
}

fn parse_update(rest: &str, line: &str) -> Command {
    let tokens: Vec<&str> = rest.split_whitespace().collect();
    if tokens.len() >= 3 && is_digits(tokens[0]) {
        return Command::UpdateAttribute {
            guid: tokens[0].to_string(),
            attribute: tokens[1].to_string(),
            value: tokens[2..].join(" "),
        };
    }
    unrecognized(line)
}

fn parse_guid_command(rest: &str, line: &str, build: impl FnOnce(String) -> Command) -> Command {
    if is_digits(rest) {
        return build(rest.to_string());
    }
    unrecognized(line)
}

fn unrecognized(line: &str) -> Command {
    Command::Unrecognized {
        input: line.to_string(),
    }
}

fn is_digits(text: &str) -> bool {
    !text.is_empty() && text.bytes().all(|byte| byte.is_ascii_digit())
}
