use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum ViewerCommand {
    Top,
    Bottom,
    Scroll { lines: i64 },
    Position,
    Search { pattern: String },
    Goto { cursor: String },
}

#[derive(Debug, Clone)]
pub enum CommandResponse {
    Ok(Option<String>),
    Error(String),
}

impl fmt::Display for CommandResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandResponse::Ok(None) => write!(f, "OK"),
            CommandResponse::Ok(Some(msg)) => write!(f, "OK {}", msg),
            CommandResponse::Error(msg) => write!(f, "ERROR {}", msg),
        }
    }
}

pub fn parse_command(input: &str) -> Result<ViewerCommand, String> {
    let input = input.trim();
    let parts: Vec<&str> = input.split_whitespace().collect();

    if parts.is_empty() {
        return Err("empty command".to_string());
    }

    match parts[0].to_lowercase().as_str() {
        "top" => {
            if parts.len() != 1 {
                return Err("usage: top".to_string());
            }
            Ok(ViewerCommand::Top)
        }
        "bottom" => {
            if parts.len() != 1 {
                return Err("usage: bottom".to_string());
            }
            Ok(ViewerCommand::Bottom)
        }
        "scroll" => {
            if parts.len() != 2 {
                return Err("usage: scroll <lines>".to_string());
            }
            let lines: i64 = parts[1]
                .parse()
                .map_err(|_| format!("invalid line count: {}", parts[1]))?;
            Ok(ViewerCommand::Scroll { lines })
        }
        "position" => {
            if parts.len() != 1 {
                return Err("usage: position".to_string());
            }
            Ok(ViewerCommand::Position)
        }
        "search" => {
            if parts.len() < 2 {
                return Err("usage: search <pattern>".to_string());
            }
            Ok(ViewerCommand::Search {
                pattern: parts[1..].join(" "),
            })
        }
        "goto" => {
            if parts.len() != 2 {
                return Err("usage: goto <cursor>".to_string());
            }
            Ok(ViewerCommand::Goto {
                cursor: parts[1].to_string(),
            })
        }
        cmd => Err(format!("unknown command: {}", cmd)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_top_and_bottom() {
        assert_eq!(parse_command("top"), Ok(ViewerCommand::Top));
        assert_eq!(parse_command("TOP"), Ok(ViewerCommand::Top));
        assert_eq!(parse_command("  bottom  "), Ok(ViewerCommand::Bottom));
        assert!(parse_command("top extra").is_err());
        assert!(parse_command("bottom 3").is_err());
    }

    #[test]
    fn test_parse_scroll() {
        assert_eq!(
            parse_command("scroll 10"),
            Ok(ViewerCommand::Scroll { lines: 10 })
        );
        assert_eq!(
            parse_command("scroll -25"),
            Ok(ViewerCommand::Scroll { lines: -25 })
        );
        assert_eq!(
            parse_command("  SCROLL   1  "),
            Ok(ViewerCommand::Scroll { lines: 1 })
        );
        assert!(parse_command("scroll").is_err());
        assert!(parse_command("scroll abc").is_err());
        assert!(parse_command("scroll 1 2").is_err());
    }

    #[test]
    fn test_parse_position() {
        assert_eq!(parse_command("position"), Ok(ViewerCommand::Position));
        assert!(parse_command("position now").is_err());
    }

    #[test]
    fn test_parse_search() {
        assert_eq!(
            parse_command("search error"),
            Ok(ViewerCommand::Search {
                pattern: "error".to_string()
            })
        );
        assert_eq!(
            parse_command("search failed to start"),
            Ok(ViewerCommand::Search {
                pattern: "failed to start".to_string()
            })
        );
        assert!(parse_command("search").is_err());
    }

    #[test]
    fn test_parse_goto() {
        assert_eq!(
            parse_command("goto s=abc;i=1f"),
            Ok(ViewerCommand::Goto {
                cursor: "s=abc;i=1f".to_string()
            })
        );
        assert!(parse_command("goto").is_err());
        assert!(parse_command("goto a b").is_err());
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_command("").is_err());
        assert!(parse_command("   ").is_err());
        assert!(parse_command("jump 3").is_err());
    }

    #[test]
    fn test_response_format() {
        assert_eq!(format!("{}", CommandResponse::Ok(None)), "OK");
        assert_eq!(
            format!(
                "{}",
                CommandResponse::Ok(Some("chunk 1/2; line 1/500".to_string()))
            ),
            "OK chunk 1/2; line 1/500"
        );
        assert_eq!(
            format!("{}", CommandResponse::Error("failed".to_string())),
            "ERROR failed"
        );
    }
}
