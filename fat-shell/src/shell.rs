use std::io::{self, BufRead, Write};
use std::sync::Arc;

use block_dev::BlockDevice;
use derive_more::Display;
use fat::FatFileSystem;
use vfs::{DirEntry, DirEntryType};

/// Every command with its arguments, as shown by `help`.
static USAGE: [(&str, &str); 14] = [
    ("format", "format"),
    ("create", "create <file>  (content follows, ends with an empty line)"),
    ("cat", "cat <file>"),
    ("ls", "ls"),
    ("cp", "cp <source> <destination>"),
    ("mv", "mv <source> <destination>"),
    ("rm", "rm <path>"),
    ("append", "append <source> <destination>"),
    ("mkdir", "mkdir <directory>"),
    ("cd", "cd <directory>"),
    ("pwd", "pwd"),
    ("chmod", "chmod <0-7> <path>"),
    ("help", "help"),
    ("quit", "quit"),
];

/// Width of the name column of `ls`.
const NAME_COLUMN: usize = 56;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command<'a> {
    Format,
    Create(&'a str),
    Cat(&'a str),
    Ls,
    Cp(&'a str, &'a str),
    Mv(&'a str, &'a str),
    Rm(&'a str),
    Append(&'a str, &'a str),
    Mkdir(&'a str),
    Cd(&'a str),
    Pwd,
    Chmod(&'a str, &'a str),
    Help,
    Quit,
}

#[derive(Debug, Display, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[display(fmt = "unknown command {:?}, try `help`", _0)]
    Unknown(String),
    #[display(fmt = "usage: {}", _0)]
    Usage(&'static str),
}

impl<'a> Command<'a> {
    /// Parses one input line; `None` for a blank one.
    pub fn parse(line: &'a str) -> Result<Option<Self>, ParseError> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = words.collect();

        let cmd = match (name, args.as_slice()) {
            ("format", []) => Self::Format,
            ("create", &[path]) => Self::Create(path),
            ("cat", &[path]) => Self::Cat(path),
            ("ls", []) => Self::Ls,
            ("cp", &[src, dst]) => Self::Cp(src, dst),
            ("mv", &[src, dst]) => Self::Mv(src, dst),
            ("rm", &[path]) => Self::Rm(path),
            ("append", &[src, dst]) => Self::Append(src, dst),
            ("mkdir", &[path]) => Self::Mkdir(path),
            ("cd", &[path]) => Self::Cd(path),
            ("pwd", []) => Self::Pwd,
            ("chmod", &[mode, path]) => Self::Chmod(mode, path),
            ("help", []) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            (name, _) => {
                let usage = USAGE.iter().find(|(cmd, _)| *cmd == name);
                return Err(match usage {
                    Some(&(_, usage)) => ParseError::Usage(usage),
                    None => ParseError::Unknown(name.to_owned()),
                });
            }
        };
        Ok(Some(cmd))
    }
}

/// What a successful command prints.
enum Output {
    Nothing,
    Bytes(Vec<u8>),
    Line(String),
    Listing(Vec<DirEntry>),
}

impl Output {
    fn print(self, out: &mut impl Write) -> io::Result<()> {
        match self {
            Self::Nothing => Ok(()),
            Self::Bytes(data) => out.write_all(&data),
            Self::Line(line) => writeln!(out, "{line}"),
            Self::Listing(entries) => {
                writeln!(out, "{:<NAME_COLUMN$}type\taccess rights\tsize", "name")?;
                for entry in entries {
                    let ty = match entry.ty {
                        DirEntryType::Regular => "file",
                        DirEntryType::Directory => "dir",
                    };
                    let size = entry.size.map_or_else(|| "-".to_owned(), |size| size.to_string());
                    writeln!(
                        out,
                        "{:<NAME_COLUMN$}{ty}\t{}\t\t{size}",
                        entry.name, entry.perm
                    )?;
                }
                Ok(())
            }
        }
    }
}

/// Reads commands line by line and runs them against one volume.
pub struct Shell {
    dev: Arc<dyn BlockDevice>,
    fs: FatFileSystem,
}

impl Shell {
    pub fn new(dev: Arc<dyn BlockDevice>, fs: FatFileSystem) -> Self {
        Self { dev, fs }
    }

    /// Runs until `quit` or the end of `input`. Only host I/O errors end the
    /// loop early; a failed command is reported and the next one is read.
    pub fn run(&mut self, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
        let mut lines = input.lines();
        loop {
            let cwd = self.fs.pwd().unwrap_or_else(|_| "?".to_owned());
            write!(out, "{cwd} $ ")?;
            out.flush()?;

            let Some(line) = lines.next() else {
                writeln!(out)?;
                return Ok(());
            };
            let line = line?;

            let cmd = match Command::parse(&line) {
                Ok(Some(Command::Quit)) => return Ok(()),
                Ok(Some(cmd)) => cmd,
                Ok(None) => continue,
                Err(err) => {
                    writeln!(out, "{err}")?;
                    continue;
                }
            };

            let content = match cmd {
                Command::Create(_) => read_content(&mut lines)?,
                _ => Vec::new(),
            };
            match self.exec(cmd, &content) {
                Ok(output) => output.print(&mut out)?,
                Err(err) => writeln!(out, "{err}")?,
            }
        }
    }

    fn exec(&mut self, cmd: Command<'_>, content: &[String]) -> vfs::Result<Output> {
        log::debug!("{cmd:?}");
        let fs = &mut self.fs;
        match cmd {
            Command::Format => {
                *fs = FatFileSystem::format(&self.dev)?;
                Ok(Output::Nothing)
            }
            Command::Create(path) => fs.create(path, content).map(|()| Output::Nothing),
            Command::Cat(path) => fs.cat(path).map(Output::Bytes),
            Command::Ls => fs.ls().map(Output::Listing),
            Command::Cp(src, dst) => fs.cp(src, dst).map(|()| Output::Nothing),
            Command::Mv(src, dst) => fs.mv(src, dst).map(|()| Output::Nothing),
            Command::Rm(path) => fs.rm(path).map(|()| Output::Nothing),
            Command::Append(src, dst) => fs.append(src, dst).map(|()| Output::Nothing),
            Command::Mkdir(path) => fs.mkdir(path).map(|()| Output::Nothing),
            Command::Cd(path) => fs.cd(path).map(|()| Output::Nothing),
            Command::Pwd => fs.pwd().map(Output::Line),
            Command::Chmod(mode, path) => fs.chmod(mode, path).map(|()| Output::Nothing),
            Command::Help => Ok(Output::Line(
                USAGE
                    .iter()
                    .map(|(_, usage)| *usage)
                    .collect::<Vec<_>>()
                    .join("\n"),
            )),
            Command::Quit => Ok(Output::Nothing),
        }
    }
}

/// The lines following `create`, up to but not including the first empty one.
fn read_content(lines: &mut impl Iterator<Item = io::Result<String>>) -> io::Result<Vec<String>> {
    let mut content = Vec::new();
    for line in lines {
        let line = line?;
        if line.is_empty() {
            break;
        }
        content.push(line);
    }
    Ok(content)
}
