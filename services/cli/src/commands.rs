//! Parsing of REPL input lines.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text for the agent.
    Chat(String),
    /// List titles bolded in the latest reply.
    Titles,
    Add(String),
    /// Add every title from the latest reply.
    AddAll,
    /// Remove the candidate at this 1-based position.
    Remove(usize),
    Wheel,
    Spin,
    Help,
    Quit,
    Invalid(String),
}

pub const HELP: &str = "\
Type a message to chat with MovieGenius, or use one of:
  /titles        list the movies bolded in the latest reply
  /add <title>   put a movie on the wheel
  /add-all       put every movie from the latest reply on the wheel
  /remove <n>    take movie number n off the wheel
  /wheel         show the wheel
  /spin          spin the wheel
  /help          show this help
  /quit          leave";

/// Parses one line of input. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Some(Command::Chat(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match (name, arg) {
        ("titles", "") => Command::Titles,
        ("add-all", "") => Command::AddAll,
        ("add", title) if !title.is_empty() => Command::Add(title.to_string()),
        ("add", _) => Command::Invalid("/add needs a title".to_string()),
        ("remove", n) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::Remove(n),
            _ => Command::Invalid("/remove needs a number from /wheel".to_string()),
        },
        ("wheel", "") => Command::Wheel,
        ("spin", "") => Command::Spin,
        ("help", _) => Command::Help,
        ("quit" | "exit", _) => Command::Quit,
        _ => Command::Invalid(format!("Unknown command '/{name}'. Try /help.")),
    };
    Some(command)
}
