use std::ops::Range;

use crate::error::DrillError;
use crate::session::pool::FULL_RANGE;
use crate::session::quiz::Mode;

/// One console line. Command words are case-sensitive so ordinary answers
/// such as `load` or `merge` still reach the quiz.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Load(String),
    Select { name: String, range: Range<usize> },
    Add(String),
    Merge,
    Rand,
    Order,
    Testcount(usize),
    Mode(Mode),
    Restart,
    Wordcount,
    Print(Option<String>),
    Save(Option<String>),
    SaveList,
    Dump(Option<String>),
    Writeback,
    Report,
    Help,
    Quit,
    Answer(String),
}

pub const HELP: &[&str] = &[
    "load word book:      Load book-name",
    "select word book:    Select book-name [range_from range_to)",
    "add word book:       Add book-name",
    "print word book:     Print [book-name]",
    "word count:          Wordcount",
    "max words per run:   Testcount count",
    "merge all books:     Merge",
    "restart:             Restart",
    "random order:        Rand",
    "sequential order:    Order",
    "quiz mode:           Mode spell|recognize",
    "save all words:      Save [filename]",
    "save word list:      SaveList",
    "dump word wall:      Dump [filename]",
    "rewrite sources:     Writeback",
    "show score:          Report",
    "quit:                Quit or q",
];

impl Command {
    pub fn parse(line: &str) -> Result<Self, DrillError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((&head, args)) = tokens.split_first() else {
            return Ok(Command::Answer(String::new()));
        };
        let arg = |usage: &'static str| -> Result<String, DrillError> {
            args.first()
                .map(|s| s.to_string())
                .ok_or(DrillError::Usage(usage))
        };
        let opt_arg = || args.first().map(|s| s.to_string());

        let command = match head {
            "Quit" | "q" => Command::Quit,
            "Load" => Command::Load(arg("Load book-name")?),
            "Select" => {
                let name = arg("Select book-name [range_from range_to)")?;
                let range = parse_range(&args[1..])?;
                Command::Select { name, range }
            }
            "Add" => Command::Add(arg("Add book-name")?),
            "Merge" => Command::Merge,
            "Rand" => Command::Rand,
            "Order" => Command::Order,
            "Testcount" => {
                let raw = arg("Testcount count")?;
                match raw.parse::<usize>() {
                    Ok(n) if n > 0 => Command::Testcount(n),
                    _ => return Err(DrillError::InvalidMaxAttempts(raw)),
                }
            }
            "Mode" => {
                let raw = arg("Mode spell|recognize")?;
                let mode = Mode::from_name(&raw).ok_or(DrillError::Usage("Mode spell|recognize"))?;
                Command::Mode(mode)
            }
            "Restart" => Command::Restart,
            "Wordcount" => Command::Wordcount,
            "Print" => Command::Print(opt_arg()),
            "Save" => Command::Save(opt_arg()),
            "SaveList" => Command::SaveList,
            "Dump" => Command::Dump(opt_arg()),
            "Writeback" => Command::Writeback,
            "Report" => Command::Report,
            "Help" => Command::Help,
            _ => Command::Answer(line.trim().to_string()),
        };
        Ok(command)
    }
}

/// `[]` is the whole book, `[from]` runs to the end, `[from, to]` is half-open.
fn parse_range(args: &[&str]) -> Result<Range<usize>, DrillError> {
    let invalid = || DrillError::InvalidRange {
        from: args.first().unwrap_or(&"").to_string(),
        to: args.get(1).unwrap_or(&"").to_string(),
    };
    match args {
        [] => Ok(FULL_RANGE),
        [from] => {
            let from = from.parse::<usize>().map_err(|_| invalid())?;
            Ok(from..usize::MAX)
        }
        [from, to, ..] => {
            let from = from.parse::<usize>().map_err(|_| invalid())?;
            let to = to.parse::<usize>().map_err(|_| invalid())?;
            if from > to {
                return Err(invalid());
            }
            Ok(from..to)
        }
    }
}
