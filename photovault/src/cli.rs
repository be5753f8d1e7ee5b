//! Terminal front-end: the command loop and its stdin plumbing.
//!
//! Commands map one-to-one onto [`Workflow`] actions and each runs to
//! completion before the next prompt is shown, so at most one action is in
//! flight at a time.

use crate::media::{ContentRef, MediaIndex, MediaPicker};
use crate::workflow::{Notifier, Workflow};
use async_trait::async_trait;
use std::io::Write as _;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

const HELP: &str = "\
Commands:
  register          create an account
  login             log in to an existing account
  pick              choose a photo and upload it
  list              show your backed-up files
  download <file>   fetch a backed-up file
  help              show this message
  quit              exit";

/// Line-oriented stdin access, shared between the command loop and the
/// interactive picker.
pub struct Console {
    lines: tokio::sync::Mutex<Lines<BufReader<Stdin>>>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            lines: tokio::sync::Mutex::new(BufReader::new(tokio::io::stdin()).lines()),
        }
    }

    /// Print `prompt` and read one trimmed line. `None` means stdin hit EOF.
    pub async fn read_line(&self, prompt: &str) -> std::io::Result<Option<String>> {
        print!("{prompt}");
        std::io::stdout().flush()?;
        let line = self.lines.lock().await.next_line().await?;
        Ok(line.map(|l| l.trim().to_string()))
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

/// [`MediaPicker`] that lists the indexed photos and asks for a number.
pub struct PromptPicker {
    index: Arc<MediaIndex>,
    console: Arc<Console>,
}

impl PromptPicker {
    pub fn new(index: Arc<MediaIndex>, console: Arc<Console>) -> Self {
        Self { index, console }
    }
}

#[async_trait]
impl MediaPicker for PromptPicker {
    async fn pick(&self) -> Option<ContentRef> {
        if self.index.is_empty() {
            println!("No photos found in {}.", self.index.root().display());
            return None;
        }

        println!("Photos in {}:", self.index.root().display());
        for (i, entry) in self.index.entries().iter().enumerate() {
            println!("  [{i}] {}", entry.file_name());
        }

        let line = match self.console.read_line("Pick a photo (blank to cancel): ").await {
            Ok(Some(line)) => line,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(error = %e, "Could not read pick selection");
                return None;
            }
        };
        if line.is_empty() {
            return None;
        }

        let choice: usize = match line.parse() {
            Ok(n) => n,
            Err(_) => {
                println!("Not a number: {line}");
                return None;
            }
        };
        match self.index.entries().get(choice) {
            Some(entry) => Some(entry.content.clone()),
            None => {
                println!("No photo numbered {choice}.");
                None
            }
        }
    }
}

/// [`Notifier`] printing straight to the terminal.
#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn notify(&self, message: &str) {
        println!("{message}");
    }

    fn show_files(&self, files: &[String]) {
        if files.is_empty() {
            println!("No files backed up yet.");
            return;
        }
        println!("Backed-up files:");
        for name in files {
            println!("  {name}");
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Command {
    Register,
    Login,
    Pick,
    List,
    Download(Option<String>),
    Help,
    Quit,
    Empty,
    Unknown(String),
}

fn parse_command(line: &str) -> Command {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => Command::Empty,
        Some("register") => Command::Register,
        Some("login") => Command::Login,
        Some("pick") => Command::Pick,
        Some("list") => Command::List,
        Some("download") => Command::Download(parts.next().map(str::to_string)),
        Some("help") => Command::Help,
        Some("quit") | Some("exit") => Command::Quit,
        Some(other) => Command::Unknown(other.to_string()),
    }
}

/// Drive the workflow from stdin until `quit` or EOF.
pub async fn run(mut workflow: Workflow, console: Arc<Console>) -> std::io::Result<()> {
    println!("photovault - type 'help' for commands");
    loop {
        let Some(line) = console.read_line("photovault> ").await? else {
            break;
        };
        match parse_command(&line) {
            Command::Register => {
                let Some((username, password)) = read_credentials(&console).await? else {
                    break;
                };
                workflow.register(&username, &password).await;
            }
            Command::Login => {
                let Some((username, password)) = read_credentials(&console).await? else {
                    break;
                };
                workflow.login(&username, &password).await;
            }
            Command::Pick => workflow.pick_requested().await,
            Command::List => workflow.list_requested().await,
            Command::Download(Some(filename)) => workflow.download_requested(&filename).await,
            Command::Download(None) => println!("Usage: download <file>"),
            Command::Help => println!("{HELP}"),
            Command::Quit => break,
            Command::Empty => {}
            Command::Unknown(other) => println!("Unknown command: {other} (try 'help')"),
        }
    }
    Ok(())
}

async fn read_credentials(console: &Console) -> std::io::Result<Option<(String, String)>> {
    let Some(username) = console.read_line("Username: ").await? else {
        return Ok(None);
    };
    let Some(password) = console.read_line("Password: ").await? else {
        return Ok(None);
    };
    Ok(Some((username, password)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse() {
        assert_eq!(parse_command("register"), Command::Register);
        assert_eq!(parse_command("login"), Command::Login);
        assert_eq!(parse_command("pick"), Command::Pick);
        assert_eq!(parse_command("list"), Command::List);
        assert_eq!(parse_command("help"), Command::Help);
        assert_eq!(parse_command("quit"), Command::Quit);
        assert_eq!(parse_command("exit"), Command::Quit);
    }

    #[test]
    fn download_takes_a_filename() {
        assert_eq!(
            parse_command("download cat.jpg"),
            Command::Download(Some("cat.jpg".to_string()))
        );
        assert_eq!(parse_command("download"), Command::Download(None));
        assert_eq!(
            parse_command("download   spaced.jpg  "),
            Command::Download(Some("spaced.jpg".to_string()))
        );
    }

    #[test]
    fn blank_and_unknown_input() {
        assert_eq!(parse_command(""), Command::Empty);
        assert_eq!(parse_command("   "), Command::Empty);
        assert_eq!(
            parse_command("selfie"),
            Command::Unknown("selfie".to_string())
        );
    }
}
