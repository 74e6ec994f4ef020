/// Parse a dev-server port (1-65535).
pub fn parse_port(s: &str) -> Result<u16, String> {
    let port: u16 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{s}' is not a valid port number (1-65535)"))?;
    if port == 0 {
        return Err("port must be between 1 and 65535".to_string());
    }
    Ok(port)
}

/// Parse an external command line such as `npx webpack --config webpack.js`.
pub fn parse_command(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err("command cannot be empty".to_string());
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_port() {
        assert_eq!(parse_port("8080"), Ok(8080));
        assert!(parse_port("0").is_err());
        assert!(parse_port("70000").is_err());
        assert!(parse_port("http").is_err());
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("  npx webpack "), Ok("npx webpack".to_string()));
        assert!(parse_command("   ").is_err());
    }
}
