//! # HREF Subcommand
//!
//! `capsule href encode '<json>'` renders an HREF v1 line from its JSON
//! description; `capsule href parse '<line>'` does the reverse.

use anyhow::{anyhow, Context, Result};
use clap::{Args, Subcommand};

use capsule_core::HrefV1;

use crate::print_json;

/// Arguments for `capsule href`.
#[derive(Args, Debug)]
pub struct HrefArgs {
    #[command(subcommand)]
    pub command: HrefCommand,
}

#[derive(Subcommand, Debug)]
pub enum HrefCommand {
    /// Render a line from a JSON object with `comp`, `pc`, `cap`, `head`
    /// and `hot`.
    Encode {
        #[arg(value_name = "JSON")]
        json: String,
    },
    /// Parse a line into its JSON description.
    Parse {
        #[arg(value_name = "LINE")]
        line: String,
    },
}

pub fn run_href(args: &HrefArgs) -> Result<u8> {
    match &args.command {
        HrefCommand::Encode { json } => println!("{}", encode(json)?),
        HrefCommand::Parse { line } => print_json(&parse(line)?)?,
    }
    Ok(0)
}

fn encode(json: &str) -> Result<String> {
    let href: HrefV1 = serde_json::from_str(json).context("invalid HREF description")?;
    Ok(href.to_string())
}

fn parse(line: &str) -> Result<HrefV1> {
    HrefV1::parse(line).ok_or_else(|| anyhow!("not an HREF v1 line: {line:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_parse() {
        let line = encode(
            r#"{"comp": "c1", "pc": "pc_ab", "cap": "cap_cd",
                "head": {"lambda": 0.5, "mode": "GTD"}, "hot": ["a", "b"]}"#,
        )
        .unwrap();
        assert!(line.starts_with("〔HREF:v1〕"));
        let href = parse(&line).unwrap();
        assert_eq!(href.comp, "c1");
        assert_eq!(href.cap, "cap_cd");
        assert_eq!(href.head.lambda, Some(0.5));
        assert_eq!(href.hot, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn rejects_garbage() {
        assert!(encode("{}").is_err());
        assert!(parse("comp=x").is_err());
    }
}
