use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "lazydiary", version, about = "Terminal diary with retrospects")]
pub struct Args {
    /// Diary file to open instead of the configured one
    #[arg(short, long, value_name = "PATH")]
    pub diary: Option<PathBuf>,

    /// Theme name (e.g., "Catppuccin Latte")
    #[arg(short, long, value_name = "NAME")]
    pub theme: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_overrides() {
        let args = Args::parse_from(["lazydiary", "--diary", "/tmp/d.json", "-t", "Catppuccin Latte"]);
        assert_eq!(args.diary, Some(PathBuf::from("/tmp/d.json")));
        assert_eq!(args.theme.as_deref(), Some("Catppuccin Latte"));
    }

    #[test]
    fn test_no_arguments() {
        let args = Args::parse_from(["lazydiary"]);
        assert!(args.diary.is_none());
        assert!(args.theme.is_none());
    }
}
