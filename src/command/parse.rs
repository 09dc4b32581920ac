//! command::parse
//!
//! Tokenizer for inbound chat messages.

use thiserror::Error;

use super::{Command, COMMAND_PREFIX};
use crate::core::types::{EntryKey, Namespace, Revision, TypeError};

/// Malformed arguments to a recognized verb.
///
/// Unknown verbs are not parse errors; they parse to [`Command::Unknown`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("`{verb}` is missing the <{argument}> argument")]
    MissingArgument {
        verb: &'static str,
        argument: &'static str,
    },

    #[error("`{verb}` takes at most {max} arguments")]
    TooManyArguments { verb: &'static str, max: usize },

    #[error("revision must be a non-negative integer, got '{0}'")]
    InvalidRevision(String),

    #[error(transparent)]
    InvalidName(#[from] TypeError),
}

impl ParseError {
    /// The verb whose arguments were malformed, if known.
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            ParseError::MissingArgument { verb, .. } | ParseError::TooManyArguments { verb, .. } => {
                Some(verb)
            }
            ParseError::InvalidRevision(_) | ParseError::InvalidName(_) => None,
        }
    }
}

/// Parse one message body.
///
/// Returns `Ok(None)` when the message is not addressed to the bot,
/// `Ok(Some(Command::Unknown(..)))` for an unrecognized or missing verb, and
/// `Err` when a recognized verb has malformed arguments.
///
/// # Example
///
/// ```
/// use teamkv::command::{parse, Command};
///
/// assert_eq!(parse("hello there").unwrap(), None);
/// assert_eq!(parse("!storage help").unwrap(), Some(Command::Help));
/// assert!(parse("!storage put ns k v notanumber").is_err());
/// ```
pub fn parse(raw: &str) -> Result<Option<Command>, ParseError> {
    let mut tokens = raw.split_whitespace();
    if tokens.next() != Some(COMMAND_PREFIX) {
        return Ok(None);
    }

    let Some(verb) = tokens.next() else {
        return Ok(Some(Command::Unknown(raw.to_string())));
    };
    let args: Vec<&str> = tokens.collect();

    let command = match verb {
        "help" => Command::Help,
        "shutdown" => Command::Shutdown,
        "list" => {
            // Only the first argument is read; trailing tokens are ignored.
            let mut args = Args::unbounded("list", &args);
            match args.optional() {
                Some(ns) => Command::ListKeys(Namespace::new(ns)?),
                None => Command::ListNamespaces,
            }
        }
        "get" => {
            let mut args = Args::new("get", &args, 2)?;
            let namespace = Namespace::new(args.required("namespace")?)?;
            let key = EntryKey::new(args.required("key")?)?;
            Command::Get(namespace, key)
        }
        "put" => {
            let mut args = Args::new("put", &args, 4)?;
            let namespace = Namespace::new(args.required("namespace")?)?;
            let key = EntryKey::new(args.required("key")?)?;
            let value = args.required("value")?.to_string();
            let revision = args.optional().map(parse_revision).transpose()?;
            Command::Put {
                namespace,
                key,
                value,
                revision,
            }
        }
        "delete" => {
            let mut args = Args::new("delete", &args, 3)?;
            let namespace = Namespace::new(args.required("namespace")?)?;
            let key = EntryKey::new(args.required("key")?)?;
            let revision = args.optional().map(parse_revision).transpose()?;
            Command::Delete {
                namespace,
                key,
                revision,
            }
        }
        _ => Command::Unknown(raw.to_string()),
    };

    Ok(Some(command))
}

fn parse_revision(token: &str) -> Result<Revision, ParseError> {
    token
        .parse::<u64>()
        .map(Revision::new)
        .map_err(|_| ParseError::InvalidRevision(token.to_string()))
}

/// Positional argument cursor for one verb.
struct Args<'a> {
    verb: &'static str,
    tokens: std::slice::Iter<'a, &'a str>,
}

impl<'a> Args<'a> {
    fn new(verb: &'static str, tokens: &'a [&'a str], max: usize) -> Result<Self, ParseError> {
        if tokens.len() > max {
            return Err(ParseError::TooManyArguments { verb, max });
        }
        Ok(Self::unbounded(verb, tokens))
    }

    fn unbounded(verb: &'static str, tokens: &'a [&'a str]) -> Self {
        Self {
            verb,
            tokens: tokens.iter(),
        }
    }

    fn required(&mut self, argument: &'static str) -> Result<&'a str, ParseError> {
        self.tokens
            .next()
            .copied()
            .ok_or(ParseError::MissingArgument {
                verb: self.verb,
                argument,
            })
    }

    fn optional(&mut self) -> Option<&'a str> {
        self.tokens.next().copied()
    }
}
