//! # HREF v1 — Pasteable Capsule References
//!
//! A single human-readable line that names a companion, a policy hash, a
//! capsule hash, and a small state "head":
//!
//! ```text
//! 〔HREF:v1〕comp=Stranger pc=pc_7d3a cap=cap_19b2 head=λ1.65 π0.86 ε0.74 HP=lite mode=presence OHI=warm(0.71) hot=a,b
//! ```
//!
//! Parsing is tolerant: extra whitespace is ignored, unknown head tokens are
//! skipped, and unrecognized enum values fall back to absent (or `unknown`
//! for the OHI state). Numbers render with at most six decimals.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::canonical::canonical_f64;

/// Line prefix identifying an HREF v1 reference.
pub const HREF_PREFIX: &str = "〔HREF:v1〕";

/// At most this many hot entries are encoded.
pub const MAX_HOT: usize = 12;

const HREF_KEYS: [&str; 5] = ["comp=", "pc=", "cap=", "head=", "hot="];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HpMode {
    Off,
    Lite,
    Full,
}

impl HpMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Lite => "lite",
            Self::Full => "full",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "off" => Some(Self::Off),
            "lite" => Some(Self::Lite),
            "full" => Some(Self::Full),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    #[serde(rename = "presence")]
    Presence,
    #[serde(rename = "GTD")]
    Gtd,
    #[serde(rename = "story")]
    Story,
    #[serde(rename = "intimacy")]
    Intimacy,
    #[serde(rename = "sensual")]
    Sensual,
    #[serde(rename = "narrative")]
    Narrative,
    #[serde(rename = "unknown")]
    Unknown,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Presence => "presence",
            Self::Gtd => "GTD",
            Self::Story => "story",
            Self::Intimacy => "intimacy",
            Self::Sensual => "sensual",
            Self::Narrative => "narrative",
            Self::Unknown => "unknown",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        [
            Self::Presence,
            Self::Gtd,
            Self::Story,
            Self::Intimacy,
            Self::Sensual,
            Self::Narrative,
            Self::Unknown,
        ]
        .into_iter()
        .find(|m| m.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OhiState {
    Tight,
    Warm,
    AtRisk,
    Cold,
    Unknown,
}

impl OhiState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tight => "tight",
            Self::Warm => "warm",
            Self::AtRisk => "at_risk",
            Self::Cold => "cold",
            Self::Unknown => "unknown",
        }
    }

    fn parse(s: &str) -> Self {
        match s {
            "tight" => Self::Tight,
            "warm" => Self::Warm,
            "at_risk" => Self::AtRisk,
            "cold" => Self::Cold,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohi {
    pub state: OhiState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// The state head carried by an HREF.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HrefHead {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lambda: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permeability: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy: Option<f64>,
    #[serde(rename = "HP", skip_serializing_if = "Option::is_none")]
    pub hp: Option<HpMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<Mode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ohi: Option<Ohi>,
}

/// A parsed or to-be-encoded HREF v1 reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrefV1 {
    pub comp: String,
    pub pc: String,
    pub cap: String,
    #[serde(default)]
    pub head: HrefHead,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hot: Vec<String>,
}

impl HrefV1 {
    /// Parse an HREF line. Returns `None` if the prefix is missing or any of
    /// `comp`, `pc`, `cap` is absent.
    pub fn parse(input: &str) -> Option<Self> {
        let body = input.trim().strip_prefix(HREF_PREFIX)?;
        let tokens: Vec<&str> = body.split_whitespace().collect();

        let mut comp = None;
        let mut pc = None;
        let mut cap = None;
        let mut head_bits: Vec<&str> = Vec::new();
        let mut hot = Vec::new();

        let mut i = 0;
        while i < tokens.len() {
            let t = tokens[i];
            if let Some(v) = t.strip_prefix("comp=") {
                comp = Some(v.to_string());
            } else if let Some(v) = t.strip_prefix("pc=") {
                pc = Some(v.to_string());
            } else if let Some(v) = t.strip_prefix("cap=") {
                cap = Some(v.to_string());
            } else if let Some(v) = t.strip_prefix("hot=") {
                hot = v
                    .split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
            } else if let Some(v) = t.strip_prefix("head=") {
                // The head spans tokens until the next key.
                head_bits.clear();
                head_bits.push(v);
                while i + 1 < tokens.len() && !is_key(tokens[i + 1]) {
                    i += 1;
                    head_bits.push(tokens[i]);
                }
            }
            i += 1;
        }

        Some(Self {
            comp: non_empty(comp)?,
            pc: non_empty(pc)?,
            cap: non_empty(cap)?,
            head: parse_head(&head_bits),
            hot,
        })
    }
}

impl fmt::Display for HrefV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{HREF_PREFIX} comp={} pc={} cap={}", self.comp, self.pc, self.cap)?;

        let h = &self.head;
        let mut head: Vec<String> = Vec::new();
        for (symbol, value) in [("λ", h.lambda), ("π", h.permeability), ("ε", h.entropy)] {
            if let Some(n) = value.and_then(trim6) {
                head.push(format!("{symbol}{n}"));
            }
        }
        if let Some(hp) = h.hp {
            head.push(format!("HP={}", hp.as_str()));
        }
        if let Some(mode) = h.mode {
            head.push(format!("mode={}", mode.as_str()));
        }
        if let Some(ohi) = &h.ohi {
            let value = ohi
                .value
                .and_then(trim6)
                .map(|v| format!("({v})"))
                .unwrap_or_default();
            head.push(format!("OHI={}{value}", ohi.state.as_str()));
        }
        if !head.is_empty() {
            write!(f, " head={}", head.join(" "))?;
        }

        if !self.hot.is_empty() {
            let hot: Vec<&str> = self.hot.iter().take(MAX_HOT).map(String::as_str).collect();
            write!(f, " hot={}", hot.join(","))?;
        }
        Ok(())
    }
}

fn is_key(token: &str) -> bool {
    HREF_KEYS.iter().any(|k| token.starts_with(k))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

fn trim6(n: f64) -> Option<String> {
    canonical_f64(n, 6).ok()
}

fn parse_num(s: &str) -> Option<f64> {
    s.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_head(bits: &[&str]) -> HrefHead {
    let mut head = HrefHead::default();
    for bit in bits.iter().filter(|b| !b.is_empty()) {
        if let Some(v) = bit.strip_prefix('λ') {
            head.lambda = parse_num(v);
        } else if let Some(v) = bit.strip_prefix('π') {
            head.permeability = parse_num(v);
        } else if let Some(v) = bit.strip_prefix('ε') {
            head.entropy = parse_num(v);
        } else if let Some(v) = bit.strip_prefix("HP=") {
            head.hp = HpMode::parse(v);
        } else if let Some(v) = bit.strip_prefix("mode=") {
            head.mode = Mode::parse(v);
        } else if let Some(v) = bit.strip_prefix("OHI=") {
            head.ohi = parse_ohi(v);
        }
    }
    head
}

/// `warm(0.71)` or `warm`.
fn parse_ohi(s: &str) -> Option<Ohi> {
    let (name, value) = match s.split_once('(') {
        Some((name, rest)) => (name, Some(rest.strip_suffix(')')?)),
        None => (s, None),
    };
    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphabetic() || c == '_') {
        return None;
    }
    Some(Ohi {
        state: OhiState::parse(name),
        value: value.and_then(parse_num),
    })
}
