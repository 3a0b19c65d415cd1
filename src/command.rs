use std::str::FromStr;

use crate::error::AppError;

/// A row number (1-based) from the last listing, or an IMDb id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Index(usize),
    Id(String),
}

impl FromStr for Target {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(AppError::InvalidInput("Expected a row number or an IMDb id".into()));
        }
        match s.parse::<usize>() {
            Ok(0) => Err(AppError::InvalidInput("Row numbers start at 1".into())),
            Ok(n) => Ok(Target::Index(n)),
            Err(_) => Ok(Target::Id(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    /// Empty input line: reset the search box.
    Clear,
    Open(Target),
    Rate(u8),
    Add,
    Close,
    Watched,
    Remove(Target),
    Stats,
    Help,
    Quit,
}

impl FromStr for Command {
    type Err = AppError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Command::Clear);
        }

        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let command = match (verb.to_ascii_lowercase().as_str(), rest) {
            ("search" | "s", query) => Command::Search(query.to_string()),
            ("open" | "o", target) => Command::Open(target.parse()?),
            ("rate" | "r", rating) => Command::Rate(
                rating
                    .parse()
                    .map_err(|_| AppError::InvalidInput(format!("'{rating}' is not a rating")))?,
            ),
            ("add", "") => Command::Add,
            ("close", "") => Command::Close,
            ("watched" | "list", "") => Command::Watched,
            ("remove" | "rm", target) => Command::Remove(target.parse()?),
            ("stats", "") => Command::Stats,
            ("help" | "?", "") => Command::Help,
            ("quit" | "exit" | "q", "") => Command::Quit,
            _ => Command::Search(line.to_string()),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_commands() {
        let cases = vec![
            ("", Command::Clear),
            ("   ", Command::Clear),
            ("inception", Command::Search("inception".into())),
            ("the matrix reloaded", Command::Search("the matrix reloaded".into())),
            ("search add", Command::Search("add".into())),
            ("open 2", Command::Open(Target::Index(2))),
            ("open tt1375666", Command::Open(Target::Id("tt1375666".into()))),
            ("rate 9", Command::Rate(9)),
            ("ADD", Command::Add),
            ("close", Command::Close),
            ("watched", Command::Watched),
            ("remove tt1375666", Command::Remove(Target::Id("tt1375666".into()))),
            ("stats", Command::Stats),
            ("quit", Command::Quit),
        ];

        for (input, expected) in cases {
            assert_eq!(input.parse::<Command>().unwrap(), expected, "input {input:?}");
        }
    }

    #[test]
    fn test_verbs_with_unexpected_arguments_are_searches() {
        assert_eq!("close encounters".parse::<Command>().unwrap(), Command::Search("close encounters".into()));
        assert_eq!("stats of war".parse::<Command>().unwrap(), Command::Search("stats of war".into()));
    }

    #[test]
    fn test_bad_arguments() {
        assert_matches!("open".parse::<Command>(), Err(AppError::InvalidInput(_)));
        assert_matches!("open 0".parse::<Command>(), Err(AppError::InvalidInput(_)));
        assert_matches!("rate ten".parse::<Command>(), Err(AppError::InvalidInput(_)));
    }
}
