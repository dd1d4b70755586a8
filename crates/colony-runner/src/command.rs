//! Operator commands read from stdin.

use colony_core::{Antibiotic, Error};
use std::str::FromStr;

/// One line of operator input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Restart,
    Dose(Antibiotic),
    Stats,
    Quit,
}

impl FromStr for Command {
    type Err = Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim().to_ascii_lowercase();
        let mut words = line.split_whitespace();
        let head = words
            .next()
            .ok_or_else(|| Error::Validation("empty command".to_string()))?;

        let command = match head {
            "restart" | "r" => Command::Restart,
            "stats" | "s" => Command::Stats,
            "quit" | "q" | "exit" => Command::Quit,
            "dose" | "d" => {
                let kind = words.next().ok_or_else(|| {
                    Error::Validation("dose needs an antibiotic (a or b)".to_string())
                })?;
                Command::Dose(kind.parse()?)
            }
            other => Command::Dose(other.parse().map_err(|_| {
                Error::Validation(format!("unknown command '{}'", other))
            })?),
        };

        if let Some(extra) = words.next() {
            return Err(Error::Validation(format!("unexpected argument '{}'", extra)));
        }
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!("restart".parse::<Command>().unwrap(), Command::Restart);
        assert_eq!(" R ".parse::<Command>().unwrap(), Command::Restart);
        assert_eq!("stats".parse::<Command>().unwrap(), Command::Stats);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn test_parse_doses() {
        assert_eq!(
            "dose a".parse::<Command>().unwrap(),
            Command::Dose(Antibiotic::A)
        );
        assert_eq!(
            "DOSE B".parse::<Command>().unwrap(),
            Command::Dose(Antibiotic::B)
        );
        assert_eq!("1".parse::<Command>().unwrap(), Command::Dose(Antibiotic::A));
        assert_eq!("b".parse::<Command>().unwrap(), Command::Dose(Antibiotic::B));
    }

    #[test]
    fn test_parse_errors() {
        assert!("".parse::<Command>().is_err());
        assert!("dose".parse::<Command>().is_err());
        assert!("dose c".parse::<Command>().is_err());
        assert!("restart now".parse::<Command>().is_err());
        assert!("jump".parse::<Command>().is_err());
    }
}
