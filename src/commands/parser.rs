//! Admin command parsing
//!
//! Turns command-line arguments into a [`Command`]. A known command with the
//! wrong number of arguments parses as `Unknown`.

use serde_json::Value;

/// An administrative operation against the store
#[derive(Debug, PartialEq)]
pub enum Command {
    Provision(String),
    Docs(String),
    Read { tenant_id: String, filename: String },
    Update { tenant_id: String, filename: String, json: String },
    Upload { tenant_id: String, filename: String, source: String },
    Images(String),
    RmImage { tenant_id: String, filename: String },
    Pair { tenant_id: String, base_name: String },
    Unpair { tenant_id: String, base_name: String },
    Sweep,
    Help,
    Unknown(String),
}

/// Outcome status of a command
#[derive(Debug, PartialEq)]
pub enum CommandStatus {
    Success,
    /// HTTP-style status code of the failure
    Failure(u16),
}

/// Full result of a command: status plus the JSON body to print
#[derive(Debug)]
pub struct CommandResult {
    pub status: CommandStatus,
    pub body: Value,
}

impl CommandResult {
    pub fn is_success(&self) -> bool {
        self.status == CommandStatus::Success
    }
}

pub const USAGE: &[&str] = &[
    "PROVISION <tenant>",
    "DOCS <tenant>",
    "READ <tenant> <file>",
    "UPDATE <tenant> <file> <json>",
    "UPLOAD <tenant> <file> <local-path>",
    "IMAGES <tenant>",
    "RMIMAGE <tenant> <file>",
    "PAIR <tenant> <base>",
    "UNPAIR <tenant> <base>",
    "SWEEP",
];

/// Parse command-line arguments (program name excluded)
pub fn parse_command<S: AsRef<str>>(args: &[S]) -> Command {
    let args: Vec<&str> = args.iter().map(|a| a.as_ref().trim()).collect();
    let Some((cmd, rest)) = args.split_first() else {
        return Command::Help;
    };
    let owned = |i: usize| rest[i].to_string();

    match (cmd.to_ascii_uppercase().as_str(), rest.len()) {
        ("PROVISION", 1) => Command::Provision(owned(0)),
        ("DOCS", 1) => Command::Docs(owned(0)),
        ("READ", 2) => Command::Read {
            tenant_id: owned(0),
            filename: owned(1),
        },
        // JSON may arrive split across several shell words
        ("UPDATE", n) if n >= 3 => Command::Update {
            tenant_id: owned(0),
            filename: owned(1),
            json: rest[2..].join(" "),
        },
        ("UPLOAD", 3) => Command::Upload {
            tenant_id: owned(0),
            filename: owned(1),
            source: owned(2),
        },
        ("IMAGES", 1) => Command::Images(owned(0)),
        ("RMIMAGE", 2) => Command::RmImage {
            tenant_id: owned(0),
            filename: owned(1),
        },
        ("PAIR", 2) => Command::Pair {
            tenant_id: owned(0),
            base_name: owned(1),
        },
        ("UNPAIR", 2) => Command::Unpair {
            tenant_id: owned(0),
            base_name: owned(1),
        },
        ("SWEEP", 0) => Command::Sweep,
        ("HELP" | "-H" | "--HELP", _) => Command::Help,
        _ => Command::Unknown(args.join(" ")),
    }
}
