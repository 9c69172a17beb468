//! The shell command table and argument parsing.
//!
//! A line is matched against [`COMMANDS`] word by word; the longest name
//! whose words prefix the line wins, so `save as` beats `save` and
//! `list rel` beats `list`. Whatever follows the name is handed to the
//! command as [`Args`].

use std::str::FromStr;

use gatesim_core::{CoreError, NodeRef, RelId};

/// What a matched command does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddComponent,
    AddGate,
    AddInput,
    AddOutput,
    AddTimer,
    New,
    Open,
    Close,
    Save,
    SaveAs,
    Install,
    Include,
    Connect,
    Disconnect,
    Remove,
    Duplicate,
    Move,
    Toggle,
    Increment,
    Decrement,
    Context,
    Run,
    Tick,
    List,
    ShowNode,
    ShowRel,
    Info,
    Loops,
    SetName,
    SetAuthor,
    SetDesc,
    Help,
    Exit,
}

/// One entry of the command table.
#[derive(Debug, Clone, Copy)]
pub struct Command {
    pub name: &'static str,
    /// Argument shape shown by `help`; a trailing `?` marks it optional.
    pub args: &'static str,
    pub about: &'static str,
    pub action: Action,
}

const fn cmd(name: &'static str, args: &'static str, about: &'static str, action: Action) -> Command {
    Command {
        name,
        args,
        about,
        action,
    }
}

pub const COMMANDS: &[Command] = &[
    cmd("add component", "<dependency>", "Add a component node, including its dependency.", Action::AddComponent),
    cmd("add gate", "<type> <int>?", "Add a gate: AND OR NAND NOR XOR XNOR NOT.", Action::AddGate),
    cmd("add input", "<bool>?", "Add an input.", Action::AddInput),
    cmd("add output", "", "Add an output.", Action::AddOutput),
    cmd("add timer", "<int>?", "Add a timer, period in tenths.", Action::AddTimer),
    cmd("new", "<string>?", "Create a new scene.", Action::New),
    cmd("open", "<path>", "Open a saved scene.", Action::Open),
    cmd("close", "", "Close the active scene.", Action::Close),
    cmd("save", "", "Save the active scene.", Action::Save),
    cmd("save as", "<path>", "Save the active scene to a new path.", Action::SaveAs),
    cmd("install", "", "Install the active component into the library.", Action::Install),
    cmd("include", "<dependency>", "Import a dependency into the active scene.", Action::Include),
    cmd("connect", "<node> <int> <node> <int>", "Connect to:socket from:socket.", Action::Connect),
    cmd("disconnect", "<int>", "Sever a relation.", Action::Disconnect),
    cmd("remove", "<node>", "Delete a node.", Action::Remove),
    cmd("duplicate", "<node>", "Copy a node without its relations.", Action::Duplicate),
    cmd("move", "<node> <int> <int>", "Move a node to x y.", Action::Move),
    cmd("toggle", "<node>", "Toggle an input.", Action::Toggle),
    cmd("increment", "<node>", "Add an input socket to a gate.", Action::Increment),
    cmd("decrement", "<node>", "Drop the last input socket of a gate.", Action::Decrement),
    cmd("context", "<int> <int>", "Make the scene a component with n inputs and m outputs.", Action::Context),
    cmd("run", "<mask>", "Evaluate the component for one input bitmask.", Action::Run),
    cmd("tick", "<float>", "Advance the clock by seconds.", Action::Tick),
    cmd("list", "<kind>?", "List nodes: gate input output component rel.", Action::List),
    cmd("show node", "<node>", "Display a node.", Action::ShowNode),
    cmd("show rel", "<int>", "Display a relation.", Action::ShowRel),
    cmd("info", "", "Print a JSON summary of the active scene.", Action::Info),
    cmd("loops", "", "List feedback loops.", Action::Loops),
    cmd("set name", "<string>", "Set the scene name.", Action::SetName),
    cmd("set author", "<string>", "Set the scene author.", Action::SetAuthor),
    cmd("set desc", "<string>", "Set the scene description.", Action::SetDesc),
    cmd("help", "", "Display this table.", Action::Help),
    cmd("exit", "", "Leave the shell.", Action::Exit),
];

/// Finds the command for `line` and returns it with the argument text.
pub fn lookup(line: &str) -> Option<(&'static Command, Args<'_>)> {
    let line = line.trim();
    COMMANDS
        .iter()
        .filter_map(|c| strip_words(line, c.name).map(|rest| (c, rest)))
        .max_by_key(|(c, _)| c.name.len())
        .map(|(c, rest)| (c, Args::new(rest)))
}

/// Strips `name` from the front of `line` if it matches on whole words.
fn strip_words<'a>(line: &'a str, name: &str) -> Option<&'a str> {
    let mut rest = line;
    for word in name.split(' ') {
        rest = rest.trim_start();
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        if &rest[..end] != word {
            return None;
        }
        rest = &rest[end..];
    }
    Some(rest.trim())
}

/// Whitespace separated argument tokens of one command line.
#[derive(Debug, Clone)]
pub struct Args<'a> {
    text: &'a str,
    rest: &'a str,
}

impl<'a> Args<'a> {
    pub fn new(text: &'a str) -> Self {
        Args { text, rest: text }
    }

    /// The whole argument text, spaces included.
    pub fn text(&self) -> &'a str {
        self.text
    }

    fn token(&mut self) -> Option<&'a str> {
        let rest = self.rest.trim_start();
        if rest.is_empty() {
            return None;
        }
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.rest = &rest[end..];
        Some(&rest[..end])
    }

    /// The next token parsed as `T`, or `None` when the line is exhausted.
    pub fn optional<T>(&mut self) -> Result<Option<T>, CoreError>
    where
        T: FromStr,
    {
        match self.token() {
            None => Ok(None),
            Some(token) => token.parse::<T>().map(Some).map_err(|_| {
                CoreError::invalid_argument(format!(
                    "expected {}, found '{}'",
                    short_type_name::<T>(),
                    token
                ))
            }),
        }
    }

    pub fn next<T>(&mut self) -> Result<T, CoreError>
    where
        T: FromStr,
    {
        self.optional()?.ok_or(CoreError::NoArgument)
    }

    pub fn node(&mut self) -> Result<NodeRef, CoreError> {
        let token = self.token().ok_or(CoreError::NoArgument)?;
        token.parse()
    }

    pub fn rel(&mut self) -> Result<RelId, CoreError> {
        self.next::<u32>().map(RelId)
    }

    /// A boolean literal: `true`/`false`, `1`/`0`, `on`/`off`.
    pub fn flag(&mut self) -> Result<Option<bool>, CoreError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        match token.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" => Ok(Some(true)),
            "false" | "0" | "off" => Ok(Some(false)),
            _ => Err(CoreError::invalid_argument(format!(
                "expected bool, found '{token}'"
            ))),
        }
    }

    /// A run bitmask in decimal, `0b` binary or `0x` hex.
    pub fn mask(&mut self) -> Result<u64, CoreError> {
        let token = self.token().ok_or(CoreError::NoArgument)?;
        let parsed = if let Some(bits) = token.strip_prefix("0b") {
            u64::from_str_radix(&bits.replace('_', ""), 2)
        } else if let Some(hex) = token.strip_prefix("0x") {
            u64::from_str_radix(hex, 16)
        } else {
            token.parse()
        };
        parsed.map_err(|_| CoreError::invalid_argument(format!("invalid bitmask '{token}'")))
    }

    /// Fails on leftover tokens.
    pub fn finish(&mut self) -> Result<(), CoreError> {
        match self.token() {
            None => Ok(()),
            Some(extra) => Err(CoreError::invalid_argument(format!(
                "unexpected argument '{extra}'"
            ))),
        }
    }
}

fn short_type_name<T>() -> &'static str {
    let name = std::any::type_name::<T>();
    name.rsplit("::").next().unwrap_or(name)
}

/// The `help` listing.
pub fn help() -> String {
    let mut out = String::from("commands (a trailing ? marks an optional argument):\n");
    for c in COMMANDS {
        out.push_str(&format!("  {:<15} {:<26} {}\n", c.name, c.args, c.about));
    }
    out
}
