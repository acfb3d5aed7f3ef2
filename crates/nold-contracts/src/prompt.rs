pub const DEFAULT_PROMPT: &str = include_str!("../resources/default_prompt.txt");
