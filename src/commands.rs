use std::str::FromStr;
use thiserror::Error;

/// One line of input to the headless editor
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Add(String),
    Bouquet(String),
    Remove,
    Clear,
    Pick { x: f32, y: f32 },
    Deselect,
    Delete,
    Replace(String),
    Orbit { dx: f32, dy: f32 },
    Zoom(f32),
    ResetCamera,
    View { theta: f32, phi: f32, distance: f32 },
    Status,
    Slots,
    Types,
    Help,
    Quit,
}

impl Command {
    /// Whether the command can change counts or selection
    pub fn mutates_bouquet(&self) -> bool {
        matches!(
            self,
            Command::Add(_)
                | Command::Bouquet(_)
                | Command::Remove
                | Command::Clear
                | Command::Delete
                | Command::Replace(_)
        )
    }
}

pub const HELP: &str = "\
commands:
  add <type>              add one flower in the next free slot
  bouquet <type>          fill every slot with <type>
  remove                  remove the most recently added flower
  clear                   remove all flowers
  pick <x> <y>            select the flower under a screen point
  deselect                clear the selection
  delete                  delete the selected flower
  replace <type>          swap the selected flower for <type>
  orbit <dx> <dy>         drag the camera by a pixel delta
  zoom <delta>            move the camera in or out
  reset-camera            return to the default view
  view <theta> <phi> <d>  set the camera angles and distance
  status | slots | types | help | quit";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCommandError {
    #[error("empty command")]
    Empty,

    #[error("unknown command '{0}', try 'help'")]
    Unknown(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("not a number: '{0}'")]
    BadNumber(String),

    #[error("unexpected input: '{0}'")]
    TrailingInput(String),
}

struct Args<'a> {
    words: std::str::SplitWhitespace<'a>,
}

impl<'a> Args<'a> {
    fn word(&mut self, what: &'static str) -> Result<&'a str, ParseCommandError> {
        self.words.next().ok_or(ParseCommandError::MissingArgument(what))
    }

    fn number(&mut self, what: &'static str) -> Result<f32, ParseCommandError> {
        let text = self.word(what)?;
        text.parse()
            .map_err(|_| ParseCommandError::BadNumber(text.to_string()))
    }

    fn finish(mut self) -> Result<(), ParseCommandError> {
        match self.words.next() {
            None => Ok(()),
            Some(extra) => Err(ParseCommandError::TrailingInput(extra.to_string())),
        }
    }
}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseCommandError::Empty)?;
        let mut args = Args { words };

        let command = match name.to_ascii_lowercase().as_str() {
            "add" => Command::Add(args.word("flower type")?.to_string()),
            "bouquet" => Command::Bouquet(args.word("flower type")?.to_string()),
            "remove" => Command::Remove,
            "clear" => Command::Clear,
            "pick" => Command::Pick {
                x: args.number("x")?,
                y: args.number("y")?,
            },
            "deselect" | "close" => Command::Deselect,
            "delete" => Command::Delete,
            "replace" => Command::Replace(args.word("flower type")?.to_string()),
            "orbit" => Command::Orbit {
                dx: args.number("dx")?,
                dy: args.number("dy")?,
            },
            "zoom" => Command::Zoom(args.number("delta")?),
            "reset-camera" => Command::ResetCamera,
            "view" => Command::View {
                theta: args.number("theta")?,
                phi: args.number("phi")?,
                distance: args.number("distance")?,
            },
            "status" => Command::Status,
            "slots" => Command::Slots,
            "types" => Command::Types,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ParseCommandError::Unknown(other.to_string())),
        };
        args.finish()?;
        Ok(command)
    }
}
