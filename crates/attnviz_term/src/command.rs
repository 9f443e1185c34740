//! Line commands typed at the terminal host.
//!
//!   tab flash          switch panels (any tab id or alias)
//!   seq 1024           set the sequence length
//!   head 128           set the head dimension
//!   ceiling 8192       performance panel only
//!   show | series | help | quit

use attnviz::tutorial::Event;

use crate::error::TermError;

pub const USAGE: &str = "commands: tab <id> | seq <n> | head <n> | ceiling <n> | show | series | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Engine(Event),
    Show,
    Series,
    Help,
    Quit,
}

/// `Ok(None)` for a blank line.
pub fn parse_command(line: &str) -> Result<Option<Command>, TermError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();
    if words.next().is_some() {
        return Err(TermError::Usage(format!("too many arguments to `{head}`")));
    }

    let cmd = match head.to_ascii_lowercase().as_str() {
        "tab" => Command::Engine(Event::SelectTab(required(head, arg)?.to_string())),
        "seq" | "sequence" => Command::Engine(Event::SetSequenceLength(number(head, arg)?)),
        "head" | "dim" => Command::Engine(Event::SetHeadDimension(number(head, arg)?)),
        "ceiling" => Command::Engine(Event::SetSeriesCeiling(number(head, arg)?)),
        "show" => Command::Show,
        "series" => Command::Series,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(TermError::Usage(format!("unknown command `{other}`; {USAGE}"))),
    };
    Ok(Some(cmd))
}

fn required<'a>(cmd: &str, arg: Option<&'a str>) -> Result<&'a str, TermError> {
    arg.ok_or_else(|| TermError::Usage(format!("`{cmd}` needs an argument")))
}

fn number(cmd: &str, arg: Option<&str>) -> Result<u32, TermError> {
    let raw = required(cmd, arg)?;
    raw.parse()
        .map_err(|_| TermError::Usage(format!("`{cmd}` expects a whole number, got `{raw}`")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_lines_are_ignored() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   \t").unwrap(), None);
    }

    #[test]
    fn engine_commands_map_to_events() {
        assert_eq!(
            parse_command("tab flash2").unwrap(),
            Some(Command::Engine(Event::SelectTab("flash2".into())))
        );
        assert_eq!(
            parse_command("  SEQ 1024 ").unwrap(),
            Some(Command::Engine(Event::SetSequenceLength(1024)))
        );
        assert_eq!(
            parse_command("head 96").unwrap(),
            Some(Command::Engine(Event::SetHeadDimension(96)))
        );
        assert_eq!(
            parse_command("ceiling 8192").unwrap(),
            Some(Command::Engine(Event::SetSeriesCeiling(8192)))
        );
    }

    #[test]
    fn host_commands() {
        assert_eq!(parse_command("show").unwrap(), Some(Command::Show));
        assert_eq!(parse_command("series").unwrap(), Some(Command::Series));
        assert_eq!(parse_command("?").unwrap(), Some(Command::Help));
        assert_eq!(parse_command("q").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn bad_input_is_a_usage_error() {
        for line in ["seq", "seq many", "seq -5", "tab", "head 64 64", "zoom 2"] {
            let err = parse_command(line).unwrap_err();
            assert!(matches!(err, TermError::Usage(_)), "{line}");
        }
    }

    #[test]
    fn unknown_tab_is_left_to_the_engine() {
        // The engine falls back to `basic`, so the host does not reject it.
        assert_eq!(
            parse_command("tab nope").unwrap(),
            Some(Command::Engine(Event::SelectTab("nope".into())))
        );
    }
}
