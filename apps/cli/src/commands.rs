//! Line commands understood by `browse`.

use anyhow::{anyhow, bail, Context};
use shared::domain::{PersonId, SortCriteria, SortDirection, SortField};

pub const HELP: &str = "\
commands:
  n | next              select the next row
  p | prev              select the previous row
  year <YYYY | ->       filter by birth year, '-' clears
  text <QUERY | ->      filter by name or description, '-' clears
  sort <year | name> [asc | desc]
  select <ID>           select a person by id
  link                  print a deep link for the selection
  reload                fetch the date again
  reset                 clear the session after an error
  help
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseCommand {
    Next,
    Previous,
    Year(Option<i32>),
    Text(Option<String>),
    Sort(SortCriteria),
    Select(PersonId),
    Link,
    Reload,
    Reset,
    Help,
    Quit,
}

impl BrowseCommand {
    /// Commands still accepted while a failed fetch blocks the list.
    pub fn allowed_when_blocked(&self) -> bool {
        matches!(self, Self::Reset | Self::Help | Self::Quit)
    }
}

pub fn parse(line: &str) -> anyhow::Result<BrowseCommand> {
    let line = line.trim();
    let (word, rest) = line
        .split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim()))
        .unwrap_or((line, ""));

    let command = match word.to_ascii_lowercase().as_str() {
        "n" | "next" | "j" => BrowseCommand::Next,
        "p" | "prev" | "k" => BrowseCommand::Previous,
        "year" => BrowseCommand::Year(parse_clearable(rest, "year")?
            .map(|year| year.parse::<i32>().with_context(|| format!("invalid year '{year}'")))
            .transpose()?),
        "text" => BrowseCommand::Text(parse_clearable(rest, "text")?.map(str::to_string)),
        "sort" => BrowseCommand::Sort(parse_sort(rest)?),
        "select" => {
            if rest.is_empty() {
                bail!("select needs a person id");
            }
            BrowseCommand::Select(PersonId::from(rest))
        }
        "link" => BrowseCommand::Link,
        "reload" => BrowseCommand::Reload,
        "reset" => BrowseCommand::Reset,
        "help" | "?" => BrowseCommand::Help,
        "q" | "quit" | "exit" => BrowseCommand::Quit,
        "" => bail!("empty command; type 'help'"),
        other => bail!("unknown command '{other}'; type 'help'"),
    };
    Ok(command)
}

fn parse_clearable<'a>(rest: &'a str, name: &str) -> anyhow::Result<Option<&'a str>> {
    match rest {
        "" => Err(anyhow!("{name} needs a value or '-'")),
        "-" => Ok(None),
        value => Ok(Some(value)),
    }
}

fn parse_sort(rest: &str) -> anyhow::Result<SortCriteria> {
    let mut parts = rest.split_whitespace();
    let field: SortField = parts
        .next()
        .ok_or_else(|| anyhow!("sort needs 'year' or 'name'"))?
        .parse()?;
    let direction: SortDirection = match parts.next() {
        Some(direction) => direction.parse()?,
        None => SortDirection::Asc,
    };
    if let Some(extra) = parts.next() {
        bail!("unexpected '{extra}' after sort direction");
    }
    Ok(SortCriteria::new(field, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_navigation_and_control_words() {
        assert_eq!(parse("n").expect("n"), BrowseCommand::Next);
        assert_eq!(parse(" NEXT ").expect("next"), BrowseCommand::Next);
        assert_eq!(parse("prev").expect("prev"), BrowseCommand::Previous);
        assert_eq!(parse("reset").expect("reset"), BrowseCommand::Reset);
        assert_eq!(parse("q").expect("q"), BrowseCommand::Quit);
    }

    #[test]
    fn parses_filters() {
        assert_eq!(parse("year 1929").expect("year"), BrowseCommand::Year(Some(1929)));
        assert_eq!(parse("year -").expect("clear"), BrowseCommand::Year(None));
        assert_eq!(
            parse("text  Frédéric Chopin ").expect("text"),
            BrowseCommand::Text(Some("Frédéric Chopin".into()))
        );
        assert_eq!(parse("text -").expect("clear"), BrowseCommand::Text(None));
        assert!(parse("year nineteen").is_err());
        assert!(parse("text").is_err());
    }

    #[test]
    fn parses_sort() {
        assert_eq!(
            parse("sort name desc").expect("sort"),
            BrowseCommand::Sort(SortCriteria::new(SortField::SortKey, SortDirection::Desc))
        );
        assert_eq!(
            parse("sort year").expect("sort"),
            BrowseCommand::Sort(SortCriteria::default())
        );
        assert!(parse("sort height").is_err());
        assert!(parse("sort year asc please").is_err());
    }

    #[test]
    fn select_needs_an_id() {
        assert_eq!(
            parse("select pageid-4077").expect("select"),
            BrowseCommand::Select(PersonId::from("pageid-4077"))
        );
        assert!(parse("select").is_err());
    }

    #[test]
    fn rejects_unknown_and_empty_lines() {
        assert!(parse("").is_err());
        assert!(parse("dance").is_err());
    }

    #[test]
    fn only_recovery_commands_pass_when_blocked() {
        assert!(BrowseCommand::Reset.allowed_when_blocked());
        assert!(BrowseCommand::Quit.allowed_when_blocked());
        assert!(!BrowseCommand::Next.allowed_when_blocked());
        assert!(!BrowseCommand::Reload.allowed_when_blocked());
    }
}
