use gist_api::endpoints::{GistId, GistIdentity};
use std::path::PathBuf;

use crate::sketch::Visibility;

pub const USAGE: &str = "Usage: esnextbin <command>

Commands:
  fetch <id> [sha] [dir]          Download a sketch (default dir: .)
  create <dir> [--private]        Publish a sketch as a new gist
  update <id> <dir> [--private]   Save a sketch over an existing gist
  logout                          Forget the stored GitHub token

Options:
  --dir <dir>   Sketch directory, e.g. `fetch <id> --dir out`
  --sha <sha>   Revision to fetch
  --private     Save as a secret gist";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Fetch {
        identity: GistIdentity,
        dir: PathBuf,
    },
    Create {
        dir: PathBuf,
        visibility: Visibility,
    },
    Update {
        id: GistId,
        dir: PathBuf,
        visibility: Visibility,
    },
    Logout,
}

#[derive(Default)]
struct Options<'a> {
    positional: Vec<&'a str>,
    private: bool,
    dir: Option<&'a str>,
    sha: Option<&'a str>,
}

impl<'a> Options<'a> {
    fn collect(args: &'a [String]) -> Result<Self, String> {
        let mut options = Options::default();
        let mut args = args.iter().map(String::as_str);

        while let Some(arg) = args.next() {
            match arg {
                "--private" => options.private = true,
                "--dir" => options.dir = Some(value_of("--dir", args.next())?),
                "--sha" => options.sha = Some(value_of("--sha", args.next())?),
                flag if flag.starts_with("--") => {
                    return Err(format!("unknown option '{}'", flag));
                }
                value => options.positional.push(value),
            }
        }

        Ok(options)
    }

    fn reject(&self, command: &str, private: bool, dir: bool, sha: bool) -> Result<(), String> {
        let unexpected = [
            (private && self.private, "--private"),
            (dir && self.dir.is_some(), "--dir"),
            (sha && self.sha.is_some(), "--sha"),
        ];
        match unexpected.iter().find(|(present, _)| *present) {
            Some((_, flag)) => Err(format!("'{}' does not apply to '{}'", flag, command)),
            None => Ok(()),
        }
    }
}

fn value_of<'a>(flag: &str, value: Option<&'a str>) -> Result<&'a str, String> {
    match value {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => Err(format!("missing value for '{}'", flag)),
    }
}

/// A value given both positionally and as an option is ambiguous
fn merge<'a>(
    flag: &str,
    positional: Option<&'a str>,
    option: Option<&'a str>,
) -> Result<Option<&'a str>, String> {
    match (positional, option) {
        (Some(_), Some(_)) => Err(format!("'{}' given twice", flag)),
        (value, None) | (None, value) => Ok(value),
    }
}

impl Command {
    /// Parse arguments following the binary name
    pub fn parse(args: &[String]) -> Result<Self, String> {
        let options = Options::collect(args)?;
        let (command, rest) = options
            .positional
            .split_first()
            .ok_or_else(|| "missing command".to_string())?;
        let command = *command;
        let invalid = || format!("invalid arguments for '{}'", command);
        let visibility = if options.private {
            Visibility::Private
        } else {
            Visibility::Public
        };

        match command {
            "fetch" => {
                options.reject(command, true, false, false)?;
                let (id, sha, dir) = match rest {
                    [id] => (*id, None, None),
                    [id, sha] => (*id, Some(*sha), None),
                    [id, sha, dir] => (*id, Some(*sha), Some(*dir)),
                    _ => return Err(invalid()),
                };
                let identity = match merge("--sha", sha, options.sha)? {
                    Some(sha) => GistIdentity::at_revision(id, sha),
                    None => GistIdentity::new(id),
                };
                let dir = merge("--dir", dir, options.dir)?.unwrap_or(".");
                Ok(Command::Fetch {
                    identity,
                    dir: PathBuf::from(dir),
                })
            }
            "create" => {
                options.reject(command, false, false, true)?;
                let dir = match rest {
                    [dir] => Some(*dir),
                    [] => None,
                    _ => return Err(invalid()),
                };
                let dir = merge("--dir", dir, options.dir)?.ok_or_else(invalid)?;
                Ok(Command::Create {
                    dir: PathBuf::from(dir),
                    visibility,
                })
            }
            "update" => {
                options.reject(command, false, false, true)?;
                let (id, dir) = match rest {
                    [id, dir] => (*id, Some(*dir)),
                    [id] => (*id, None),
                    _ => return Err(invalid()),
                };
                let dir = merge("--dir", dir, options.dir)?.ok_or_else(invalid)?;
                Ok(Command::Update {
                    id: GistId::from(id),
                    dir: PathBuf::from(dir),
                    visibility,
                })
            }
            "logout" => {
                options.reject(command, true, true, true)?;
                if !rest.is_empty() {
                    return Err(invalid());
                }
                Ok(Command::Logout)
            }
            other => Err(format!("unknown command '{}'", other)),
        }
    }
}
