use twenty48_rules::Direction;

/// One keypress, decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Direction),
    Undo,
    NewGame,
    Quit,
}

/// Map a key identifier to a command. Unknown keys yield `None`.
///
/// Accepts browser-style arrow names, WASD and vi keys.
pub fn parse_key(key: &str) -> Option<Command> {
    let command = match key {
        "ArrowUp" | "w" | "k" => Command::Move(Direction::Up),
        "ArrowDown" | "s" | "j" => Command::Move(Direction::Down),
        "ArrowLeft" | "a" | "h" => Command::Move(Direction::Left),
        "ArrowRight" | "d" | "l" => Command::Move(Direction::Right),
        "u" => Command::Undo,
        "n" => Command::NewGame,
        "q" => Command::Quit,
        _ => return None,
    };
    Some(command)
}

/// Split one input line into keys: whitespace-separated words, and words
/// made only of single-letter keys are split per character (`"wasd"`).
pub fn keys_in_line(line: &str) -> Vec<Command> {
    line.split_whitespace()
        .flat_map(|word| match parse_key(word) {
            Some(cmd) => vec![cmd],
            None => word
                .chars()
                .map(|c| parse_key(c.encode_utf8(&mut [0; 4])))
                .collect::<Option<Vec<_>>>()
                .unwrap_or_default(),
        })
        .collect()
}
