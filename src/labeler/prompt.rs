use anyhow::{bail, Context};
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::{debug, warn};

use super::{normalize_answer, LabelError, LabelItem, Labeler};

/// Default audio player command, e.g. `ffplay -nodisp -autoexit -loglevel quiet`
pub const ENV_PLAYER: &str = "RAIL_AUDIO_PLAYER";

/// External command used to play a file before prompting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    program: String,
    args: Vec<String>,
}

impl Player {
    /// Split a command line on whitespace; the file path is appended when playing
    pub fn from_command_line(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Play a file and wait for the player to exit
    pub fn play(&self, path: &Path) -> anyhow::Result<()> {
        debug!(program = %self.program, file = ?path, "Playing audio");

        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("could not start player '{}'", self.program))?;

        if !status.success() {
            bail!("player '{}' exited with {}", self.program, status);
        }

        Ok(())
    }
}

/// Reads labels from a line-oriented input, optionally playing audio first
pub struct PromptLabeler<R, W> {
    input: R,
    output: W,
    player: Option<Player>,
}

impl PromptLabeler<io::StdinLock<'static>, io::Stderr> {
    /// Prompt on stderr and read answers from stdin
    pub fn stdio(player: Option<Player>) -> Self {
        Self::new(io::stdin().lock(), io::stderr(), player)
    }
}

impl<R: BufRead, W: Write> PromptLabeler<R, W> {
    pub fn new(input: R, output: W, player: Option<Player>) -> Self {
        Self {
            input,
            output,
            player,
        }
    }
}

impl<R: BufRead, W: Write> Labeler for PromptLabeler<R, W> {
    fn present_for_labeling(&mut self, item: &LabelItem) -> Result<Option<String>, LabelError> {
        if let (Some(player), Some(audio)) = (&self.player, &item.audio) {
            if let Err(e) = player.play(audio) {
                warn!("Could not play {:?}: {:#}", audio, e);
            }
        }

        write!(self.output, "{}: ", item.prompt)?;
        self.output.flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line)?;

        if read == 0 {
            debug!("Input closed, treating as skip");
            writeln!(self.output)?;
            return Ok(None);
        }

        Ok(normalize_answer(&line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_player_from_command_line() {
        let player = Player::from_command_line("ffplay -nodisp -autoexit").unwrap();
        assert_eq!(player.program, "ffplay");
        assert_eq!(player.args, vec!["-nodisp", "-autoexit"]);

        assert!(Player::from_command_line("   ").is_none());
    }

    #[test]
    fn test_prompt_reads_answer() {
        let mut output = Vec::new();
        let answer = {
            let mut labeler = PromptLabeler::new(Cursor::new("platform one\n"), &mut output, None);
            labeler
                .present_for_labeling(&LabelItem::new("Name file (0001.wav)"))
                .unwrap()
        };

        assert_eq!(answer, Some("platform one".to_string()));
        assert_eq!(String::from_utf8(output).unwrap(), "Name file (0001.wav): ");
    }

    #[test]
    fn test_prompt_blank_answer_skips() {
        let mut labeler = PromptLabeler::new(Cursor::new(" \nnext\n"), Vec::new(), None);
        let item = LabelItem::new("Enter CRS for nowhere");

        assert_eq!(labeler.present_for_labeling(&item).unwrap(), None);
        assert_eq!(
            labeler.present_for_labeling(&item).unwrap(),
            Some("next".to_string())
        );
    }

    #[test]
    fn test_prompt_end_of_input_skips() {
        let mut labeler = PromptLabeler::new(Cursor::new(""), Vec::new(), None);
        let item = LabelItem::new("Name file");

        assert_eq!(labeler.present_for_labeling(&item).unwrap(), None);
    }

    #[test]
    fn test_missing_player_still_prompts() {
        let player = Player::from_command_line("definitely-not-a-real-player-binary");
        let mut labeler = PromptLabeler::new(Cursor::new("seven\n"), Vec::new(), player);
        let item = LabelItem::new("Name file").with_audio("/nonexistent/0007.wav");

        assert_eq!(
            labeler.present_for_labeling(&item).unwrap(),
            Some("seven".to_string())
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_player_exit_status() {
        let ok = Player::from_command_line("true").unwrap();
        assert!(ok.play(Path::new("/dev/null")).is_ok());

        let failing = Player::from_command_line("false").unwrap();
        assert!(failing.play(Path::new("/dev/null")).is_err());
    }
}
